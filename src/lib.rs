pub mod cache;
pub mod classify;
pub mod core;
pub mod debug_files;
pub mod fetch;
pub mod markdown;
pub mod metrics;
pub mod reddit;
pub mod summarize;

// --- Primary core exports ---
pub use core::types;
pub use core::types::*;
pub use core::AppState;

pub use fetch::batch::fetch_batch;
pub use fetch::fetch_url;
pub use markdown::html_to_markdown;
