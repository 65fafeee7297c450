use std::sync::Arc;

use rust_decimal::Decimal;
use time::Date;

use super::ExpenseId;

/// One logged expenditure as persisted by a storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExpenseRecord {
    pub id: ExpenseId,
    pub date: Date,
    pub payee: Arc<str>,
    pub description: Arc<str>,
    pub category: Arc<str>,
    pub amount: Decimal,
    pub mode: Arc<str>,
}
