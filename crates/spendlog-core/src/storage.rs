use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{
    read::ExpenseRecord, write::CreateExpenseCommand, Dimension, ExpenseId, GroupTotal,
};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("database error: {0}")]
    Database(String),
    #[error("corrupt expense row {id}: {reason}")]
    CorruptRow { id: ExpenseId, reason: String },
    #[error("{0}")]
    Other(String),
}

/// Durable home of the expense log. Every mutating call commits before it returns
/// and either applies completely or leaves the store as it was.
pub trait StorageBackend: Send + Sync {
    /// Creates the expense table if absent. Safe to call on every startup.
    fn initialize(&self) -> Result<(), StorageError>;

    /// Persists a new expense and returns the id assigned to it.
    fn insert_expense(&self, command: &CreateExpenseCommand) -> Result<ExpenseId, StorageError>;

    /// Removes the expense with `id`. Removing an unknown id is not an error.
    fn delete_expense(&self, id: ExpenseId) -> Result<(), StorageError>;

    /// Removes every expense and restarts id numbering at 1.
    fn delete_all(&self) -> Result<(), StorageError>;

    /// All expenses in insertion order.
    fn list_expenses(&self) -> Result<Vec<ExpenseRecord>, StorageError>;

    /// Sum of all amounts, zero for an empty log.
    fn sum_amount(&self) -> Result<Decimal, StorageError>;

    /// Amount totals per distinct value of `dimension`, ordered by label.
    fn group_sum(&self, dimension: Dimension) -> Result<Vec<GroupTotal>, StorageError>;
}
