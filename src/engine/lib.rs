//! The update engine: content pipeline, background poll monitor, and the
//! axum API surface.

pub mod api;
pub mod monitor;
pub mod pipeline;

#[cfg(test)]
mod tests;

pub use monitor::PollMonitor;
pub use pipeline::ContentPipeline;
