//! PRIS Core Library
//!
//! Foundational utilities shared by every PRIS crate:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Configuration management
//! - Deadlines for external calls

pub mod config;
pub mod deadline;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::AppConfig;
pub use deadline::Deadline;
pub use error::{AppError, AppResult};
