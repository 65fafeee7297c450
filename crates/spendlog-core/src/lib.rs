//! Core types and traits for Spendlog storage backends.
//!
//! This crate provides the `StorageBackend` trait, the expense record model and
//! its validation rule, enabling pluggable storage implementations in separate crates.

pub mod models;
pub mod storage;

// Re-export key types at crate root for convenience
pub use models::{format_date, parse_date, Dimension, ExpenseId, ExpenseTable, GroupTotal};
pub use models::write::{CreateExpenseCommand, ValidationError};
pub use models::read::ExpenseRecord;
pub use storage::{StorageBackend, StorageError};
