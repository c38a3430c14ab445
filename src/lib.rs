//! feedwatch: single-package entry point.
//! Each domain lives as a local module under `src/` with its own `lib.rs`.

pub mod prelude;

#[path = "common/lib.rs"]
pub mod common;
#[path = "converter/lib.rs"]
pub mod converter;
#[path = "downloader/lib.rs"]
pub mod downloader;
#[path = "engine/lib.rs"]
pub mod engine;
#[path = "errors/lib.rs"]
pub mod errors;
#[path = "notifier/lib.rs"]
pub mod notifier;
#[path = "utils/lib.rs"]
pub mod utils;
