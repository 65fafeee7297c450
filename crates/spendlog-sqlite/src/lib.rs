//! SQLite storage backend for Spendlog.
//!
//! The `ExpenseLog` table layout and the `YYYY-MM-DD` date text are the on-disk
//! contract, so existing expense files open unchanged.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{params, Connection, Row};
use rust_decimal::{
    prelude::{FromPrimitive, ToPrimitive},
    Decimal,
};
use spendlog_core::{
    format_date, parse_date, CreateExpenseCommand, Dimension, ExpenseId, ExpenseRecord,
    GroupTotal, StorageBackend, StorageError,
};

const TABLE_NAME: &str = "ExpenseLog";

pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Opens (or creates) the expense file at `path` and makes sure the table exists.
    /// `":memory:"` opens a private in-memory database.
    pub fn new(path: &str) -> Result<Self, StorageError> {
        let conn = if path == ":memory:" {
            Connection::open_in_memory()
        } else {
            Connection::open(path)
        }
        .map_err(db_error)?;

        let storage = Self {
            conn: Mutex::new(conn),
        };
        storage.initialize()?;
        tracing::debug!(path, "SQLite expense store opened");
        Ok(storage)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Other("connection lock poisoned".to_string()))
    }
}

fn db_error(e: rusqlite::Error) -> StorageError {
    StorageError::Database(e.to_string())
}

fn decimal_from_real(value: Option<f64>) -> Decimal {
    value.and_then(Decimal::from_f64).unwrap_or(Decimal::ZERO)
}

/// SQL expression producing the group label for a dimension.
fn dimension_expr(dimension: Dimension) -> &'static str {
    match dimension {
        Dimension::Payee => "Payee",
        Dimension::Category => "Category",
        Dimension::Mode => "Mode",
        Dimension::Month => "strftime('%Y-%m', Date)",
    }
}

type RawExpenseRow = (
    ExpenseId,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<f64>,
    Option<String>,
);

fn read_row(row: &Row) -> rusqlite::Result<RawExpenseRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn into_record(raw: RawExpenseRow) -> Result<ExpenseRecord, StorageError> {
    let (id, date, payee, description, category, amount, mode) = raw;
    let date_text = date.unwrap_or_default();
    let date = parse_date(&date_text).ok_or_else(|| StorageError::CorruptRow {
        id,
        reason: format!("invalid date '{}'", date_text),
    })?;
    let text = |v: Option<String>| -> Arc<str> { Arc::from(v.unwrap_or_default()) };

    Ok(ExpenseRecord {
        id,
        date,
        payee: text(payee),
        description: text(description),
        category: text(category),
        amount: decimal_from_real(amount),
        mode: text(mode),
    })
}

impl StorageBackend for SqliteStorage {
    fn initialize(&self) -> Result<(), StorageError> {
        let conn = self.conn()?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS ExpenseLog (
                ID INTEGER PRIMARY KEY AUTOINCREMENT,
                Date TEXT,
                Payee TEXT,
                Description TEXT,
                Category TEXT,
                Amount REAL,
                Mode TEXT
            );
            ",
        )
        .map_err(db_error)?;
        Ok(())
    }

    fn insert_expense(&self, command: &CreateExpenseCommand) -> Result<ExpenseId, StorageError> {
        let amount = command
            .amount
            .to_f64()
            .ok_or_else(|| StorageError::Other(format!("amount out of range: {}", command.amount)))?;

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO ExpenseLog (Date, Payee, Description, Category, Amount, Mode) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                format_date(command.date),
                command.payee.as_ref(),
                command.description.as_ref(),
                command.category.as_ref(),
                amount,
                command.mode.as_ref()
            ],
        )
        .map_err(db_error)?;

        let id = conn.last_insert_rowid();
        tracing::debug!(id, "Expense inserted");
        Ok(id)
    }

    fn delete_expense(&self, id: ExpenseId) -> Result<(), StorageError> {
        let conn = self.conn()?;
        let removed = conn
            .execute("DELETE FROM ExpenseLog WHERE ID = ?1", params![id])
            .map_err(db_error)?;
        tracing::debug!(id, removed, "Expense delete");
        Ok(())
    }

    fn delete_all(&self) -> Result<(), StorageError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(db_error)?;
        tx.execute("DELETE FROM ExpenseLog", []).map_err(db_error)?;
        tx.execute(
            "DELETE FROM sqlite_sequence WHERE name = ?1",
            params![TABLE_NAME],
        )
        .map_err(db_error)?;
        tx.commit().map_err(db_error)?;
        tracing::debug!("All expenses deleted, sequence reset");
        Ok(())
    }

    fn list_expenses(&self) -> Result<Vec<ExpenseRecord>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT ID, Date, Payee, Description, Category, Amount, Mode
                 FROM ExpenseLog ORDER BY ID",
            )
            .map_err(db_error)?;

        let rows = stmt
            .query_map([], read_row)
            .map_err(db_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_error)?;

        rows.into_iter().map(into_record).collect()
    }

    fn sum_amount(&self) -> Result<Decimal, StorageError> {
        let conn = self.conn()?;
        let total: Option<f64> = conn
            .query_row("SELECT SUM(Amount) FROM ExpenseLog", [], |row| row.get(0))
            .map_err(db_error)?;
        Ok(decimal_from_real(total))
    }

    fn group_sum(&self, dimension: Dimension) -> Result<Vec<GroupTotal>, StorageError> {
        let conn = self.conn()?;
        let query = format!(
            "SELECT COALESCE({}, '') AS label, SUM(Amount)
             FROM ExpenseLog
             GROUP BY label
             ORDER BY label",
            dimension_expr(dimension)
        );
        let mut stmt = conn.prepare(&query).map_err(db_error)?;

        let rows = stmt
            .query_map([], |row| {
                let label: String = row.get(0)?;
                let total: Option<f64> = row.get(1)?;
                Ok((label, total))
            })
            .map_err(db_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_error)?;

        tracing::debug!(%dimension, groups = rows.len(), "Grouped expense totals");
        Ok(rows
            .into_iter()
            .map(|(label, total)| GroupTotal::new(label, decimal_from_real(total)))
            .collect())
    }
}
