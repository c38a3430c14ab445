pub mod content;
pub mod delivery;

pub use content::{RawContent, StructuredContent};
pub use delivery::DeliveryAttempt;
