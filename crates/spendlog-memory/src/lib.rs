//! In-memory storage backend for Spendlog.
//!
//! Mirrors the SQLite backend's observable behaviour, including the id sequence that
//! survives single deletes and restarts at 1 after a full clear.

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicI64, Ordering},
        Arc, RwLock, RwLockReadGuard, RwLockWriteGuard,
    },
};

use rust_decimal::Decimal;
use spendlog_core::{
    format_date, CreateExpenseCommand, Dimension, ExpenseId, ExpenseRecord, GroupTotal,
    StorageBackend, StorageError,
};

pub struct InMemoryStorage {
    expenses: RwLock<BTreeMap<ExpenseId, ExpenseRecord>>,
    sequence_counter: AtomicI64,
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            expenses: RwLock::new(BTreeMap::new()),
            sequence_counter: AtomicI64::new(1),
        }
    }

    fn next_sequence(&self) -> ExpenseId {
        self.sequence_counter.fetch_add(1, Ordering::SeqCst)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<ExpenseId, ExpenseRecord>>, StorageError> {
        self.expenses
            .read()
            .map_err(|_| StorageError::Other("expense store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<ExpenseId, ExpenseRecord>>, StorageError> {
        self.expenses
            .write()
            .map_err(|_| StorageError::Other("expense store lock poisoned".to_string()))
    }
}

fn group_label(record: &ExpenseRecord, dimension: Dimension) -> Arc<str> {
    match dimension {
        Dimension::Payee => record.payee.clone(),
        Dimension::Category => record.category.clone(),
        Dimension::Mode => record.mode.clone(),
        Dimension::Month => {
            let date = format_date(record.date);
            Arc::from(&date[..7])
        }
    }
}

impl StorageBackend for InMemoryStorage {
    fn initialize(&self) -> Result<(), StorageError> {
        Ok(())
    }

    fn insert_expense(&self, command: &CreateExpenseCommand) -> Result<ExpenseId, StorageError> {
        let mut expenses = self.write()?;
        let id = self.next_sequence();
        expenses.insert(
            id,
            ExpenseRecord {
                id,
                date: command.date,
                payee: command.payee.clone(),
                description: command.description.clone(),
                category: command.category.clone(),
                amount: command.amount,
                mode: command.mode.clone(),
            },
        );
        tracing::debug!(id, "Expense stored in memory");
        Ok(id)
    }

    fn delete_expense(&self, id: ExpenseId) -> Result<(), StorageError> {
        let removed = self.write()?.remove(&id).is_some();
        tracing::debug!(id, removed, "Expense delete");
        Ok(())
    }

    fn delete_all(&self) -> Result<(), StorageError> {
        let mut expenses = self.write()?;
        expenses.clear();
        self.sequence_counter.store(1, Ordering::SeqCst);
        tracing::debug!("All expenses deleted, sequence reset");
        Ok(())
    }

    fn list_expenses(&self) -> Result<Vec<ExpenseRecord>, StorageError> {
        Ok(self.read()?.values().cloned().collect())
    }

    fn sum_amount(&self) -> Result<Decimal, StorageError> {
        Ok(self.read()?.values().map(|r| r.amount).sum())
    }

    fn group_sum(&self, dimension: Dimension) -> Result<Vec<GroupTotal>, StorageError> {
        let expenses = self.read()?;
        let mut groups: BTreeMap<Arc<str>, Decimal> = BTreeMap::new();
        for record in expenses.values() {
            *groups.entry(group_label(record, dimension)).or_insert(Decimal::ZERO) += record.amount;
        }
        Ok(groups
            .into_iter()
            .map(|(label, total)| GroupTotal { label, total })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use time::{Date, Month};

    fn expense(date: Date, payee: &str, category: &str, amount: Decimal, mode: &str) -> CreateExpenseCommand {
        CreateExpenseCommand {
            date,
            payee: Arc::from(payee),
            description: Arc::from("test"),
            category: Arc::from(category),
            amount,
            mode: Arc::from(mode),
        }
    }

    fn jan(day: u8) -> Date {
        Date::from_calendar_date(2024, Month::January, day).unwrap()
    }

    #[test]
    fn test_ids_are_not_reused_after_single_delete() {
        let storage = InMemoryStorage::new();
        let first = storage.insert_expense(&expense(jan(1), "A", "Food", dec!(10), "Cash")).unwrap();
        let second = storage.insert_expense(&expense(jan(2), "B", "Food", dec!(20), "Cash")).unwrap();
        assert_eq!((first, second), (1, 2));

        storage.delete_expense(second).unwrap();
        let third = storage.insert_expense(&expense(jan(3), "C", "Food", dec!(30), "Cash")).unwrap();
        assert_eq!(third, 3);
    }

    #[test]
    fn test_delete_all_resets_sequence() {
        let storage = InMemoryStorage::new();
        storage.insert_expense(&expense(jan(1), "A", "Food", dec!(10), "Cash")).unwrap();
        storage.insert_expense(&expense(jan(2), "B", "Food", dec!(20), "Cash")).unwrap();

        storage.delete_all().unwrap();
        assert!(storage.list_expenses().unwrap().is_empty());
        assert_eq!(storage.sum_amount().unwrap(), Decimal::ZERO);

        let id = storage.insert_expense(&expense(jan(3), "C", "Food", dec!(30), "Cash")).unwrap();
        assert_eq!(id, 1);
    }

    #[test]
    fn test_delete_unknown_id_is_noop() {
        let storage = InMemoryStorage::new();
        storage.insert_expense(&expense(jan(1), "A", "Food", dec!(10), "Cash")).unwrap();
        storage.delete_expense(42).unwrap();
        assert_eq!(storage.list_expenses().unwrap().len(), 1);
        assert_eq!(storage.sum_amount().unwrap(), dec!(10));
    }

    #[test]
    fn test_group_sum_by_each_dimension() {
        let storage = InMemoryStorage::new();
        storage.insert_expense(&expense(jan(5), "Landlord", "Bills", dec!(1200), "UPI")).unwrap();
        storage.insert_expense(&expense(jan(9), "Cafe", "Food", dec!(15.50), "Card")).unwrap();
        storage
            .insert_expense(&expense(
                Date::from_calendar_date(2024, Month::February, 1).unwrap(),
                "Cafe",
                "Food",
                dec!(4.50),
                "Cash",
            ))
            .unwrap();

        assert_eq!(
            storage.group_sum(Dimension::Category).unwrap(),
            vec![GroupTotal::new("Bills", dec!(1200)), GroupTotal::new("Food", dec!(20))]
        );
        assert_eq!(
            storage.group_sum(Dimension::Payee).unwrap(),
            vec![GroupTotal::new("Cafe", dec!(20)), GroupTotal::new("Landlord", dec!(1200))]
        );
        assert_eq!(
            storage.group_sum(Dimension::Mode).unwrap(),
            vec![
                GroupTotal::new("Card", dec!(15.50)),
                GroupTotal::new("Cash", dec!(4.50)),
                GroupTotal::new("UPI", dec!(1200)),
            ]
        );
        assert_eq!(
            storage.group_sum(Dimension::Month).unwrap(),
            vec![GroupTotal::new("2024-01", dec!(1215.50)), GroupTotal::new("2024-02", dec!(4.50))]
        );
    }

    #[test]
    fn test_list_preserves_insertion_order() {
        let storage = InMemoryStorage::new();
        storage.insert_expense(&expense(jan(20), "Z", "Food", dec!(1), "Cash")).unwrap();
        storage.insert_expense(&expense(jan(1), "A", "Food", dec!(2), "Cash")).unwrap();
        let payees: Vec<_> = storage
            .list_expenses()
            .unwrap()
            .into_iter()
            .map(|r| r.payee.to_string())
            .collect();
        assert_eq!(payees, vec!["Z", "A"]);
    }
}
