//! # Aviary IO
//!
//! Persistence layer for the Aviary drone trainer.
//!
//! This crate provides:
//! - Structured error handling with custom error types
//! - JSON serialization helpers
//! - Controller save/load, optionally gzip-compressed
//! - Generation history logging (JSON lines)

/// Error types and result aliases for I/O operations
pub mod error;
/// Generation history and live event logging
pub mod history;
/// Controller weight files
pub mod persistence;
/// Validated JSON encoding helpers
pub mod serialization;

pub use error::{IoError, Result};
pub use history::HistoryLogger;
pub use persistence::{load_controller, load_weights, save_controller};
pub use serialization::{from_json, to_json};
