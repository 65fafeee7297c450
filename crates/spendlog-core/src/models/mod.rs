use std::{fmt::Display, sync::Arc};

use prettytable::{row, Table};
use rust_decimal::Decimal;
use time::{Date, Month};

pub mod read;
pub mod write;

use read::ExpenseRecord;

pub type ExpenseId = i64;

/// Column headers shared by the table view and every export format.
pub const EXPENSE_COLUMNS: [&str; 7] =
    ["ID", "Date", "Payee", "Description", "Category", "Amount", "Mode"];

/// A field expenses can be grouped by when summing amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Payee,
    Category,
    Mode,
    /// Calendar year and month of the expense date, e.g. `2024-03`.
    Month,
}

impl Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Dimension::Payee => "payee",
            Dimension::Category => "category",
            Dimension::Mode => "mode",
            Dimension::Month => "month",
        })
    }
}

/// Sum of amounts for one distinct value of a dimension.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupTotal {
    pub label: Arc<str>,
    pub total: Decimal,
}

impl GroupTotal {
    pub fn new(label: impl Into<Arc<str>>, total: Decimal) -> Self {
        Self {
            label: label.into(),
            total,
        }
    }
}

/// The full expense log as shown to the user after every change.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExpenseTable {
    records: Vec<ExpenseRecord>,
}

impl ExpenseTable {
    pub fn new(records: Vec<ExpenseRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[ExpenseRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Display for ExpenseTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut table = Table::new();
        table.add_row(row![
            EXPENSE_COLUMNS[0],
            EXPENSE_COLUMNS[1],
            EXPENSE_COLUMNS[2],
            EXPENSE_COLUMNS[3],
            EXPENSE_COLUMNS[4],
            EXPENSE_COLUMNS[5],
            EXPENSE_COLUMNS[6]
        ]);
        table.add_empty_row();

        for r in &self.records {
            table.add_row(row![
                r.id,
                format_date(r.date),
                r.payee,
                r.description,
                r.category,
                r.amount,
                r.mode
            ]);
        }

        write!(f, "\n{}\n", table)
    }
}

/// Formats a date as ISO-8601 `YYYY-MM-DD`, the persisted text format.
pub fn format_date(d: Date) -> String {
    format!("{:04}-{:02}-{:02}", d.year(), d.month() as u8, d.day())
}

/// Parses `YYYY-MM-DD`. Returns `None` for anything else, including impossible dates.
pub fn parse_date(s: &str) -> Option<Date> {
    let mut parts = s.trim().splitn(3, '-');
    let year = parts.next()?.parse::<i32>().ok()?;
    let month = parts.next()?.parse::<u8>().ok()?;
    let day = parts.next()?.parse::<u8>().ok()?;
    Date::from_calendar_date(year, Month::try_from(month).ok()?, day).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_date_text_format() {
        let d = Date::from_calendar_date(2024, Month::March, 7).unwrap();
        assert_eq!(format_date(d), "2024-03-07");
        assert_eq!(parse_date("2024-03-07"), Some(d));
        assert_eq!(parse_date("2024-02-30"), None);
        assert_eq!(parse_date("07/03/2024"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_table_lists_every_record() {
        let table = ExpenseTable::new(vec![ExpenseRecord {
            id: 1,
            date: Date::from_calendar_date(2024, Month::January, 5).unwrap(),
            payee: Arc::from("Landlord"),
            description: Arc::from("Rent"),
            category: Arc::from("Bills"),
            amount: dec!(1200),
            mode: Arc::from("UPI"),
        }]);

        let rendered = table.to_string();
        for header in EXPENSE_COLUMNS {
            assert!(rendered.contains(header), "missing header {}", header);
        }
        assert!(rendered.contains("2024-01-05"));
        assert!(rendered.contains("Landlord"));
        assert!(rendered.contains("1200"));
        assert_eq!(table.len(), 1);
        assert_eq!(table.records()[0].id, 1);
    }
}
