use std::{fmt::Display, sync::Arc};

use clap::ValueEnum;
use rust_decimal::{prelude::ToPrimitive, Decimal};

use crate::storage::{StorageBackend, StorageError};
use spendlog_core::{Dimension, GroupTotal};

pub const CATEGORY_BREAKDOWN_TITLE: &str = "Expense Allocation by Category";

/// How the bar chart slices the expense log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum ViewMode {
    /// Totals per payment mode
    #[default]
    Method,
    /// Totals per payee
    Receiver,
    /// Totals per category
    Category,
    /// Totals per calendar month of the expense date
    Month,
}

impl ViewMode {
    /// Resolves a view by name, ignoring case. Anything unrecognised is the monthly view.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "method" => ViewMode::Method,
            "receiver" => ViewMode::Receiver,
            "category" => ViewMode::Category,
            _ => ViewMode::Month,
        }
    }

    pub fn dimension(&self) -> Dimension {
        match self {
            ViewMode::Method => Dimension::Mode,
            ViewMode::Receiver => Dimension::Payee,
            ViewMode::Category => Dimension::Category,
            ViewMode::Month => Dimension::Month,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ViewMode::Method => "Expenses by Payment Method",
            ViewMode::Receiver => "Expenses by Payee",
            ViewMode::Category => "Expenses by Category",
            ViewMode::Month => "Monthly Expense Overview",
        }
    }
}

impl Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ViewMode::Method => "Method",
            ViewMode::Receiver => "Receiver",
            ViewMode::Category => "Category",
            ViewMode::Month => "Month",
        })
    }
}

/// A titled, ordered series of group totals ready for a chart renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub title: Arc<str>,
    pub groups: Vec<GroupTotal>,
}

impl ChartData {
    pub fn labels(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.label.as_ref()).collect()
    }

    pub fn values(&self) -> Vec<Decimal> {
        self.groups.iter().map(|g| g.total).collect()
    }

    pub fn values_f64(&self) -> Vec<f64> {
        self.groups
            .iter()
            .map(|g| g.total.to_f64().unwrap_or_default())
            .collect()
    }

    pub fn get(&self, label: &str) -> Option<Decimal> {
        self.groups
            .iter()
            .find(|g| g.label.as_ref() == label)
            .map(|g| g.total)
    }

    pub fn total(&self) -> Decimal {
        self.groups.iter().map(|g| g.total).sum()
    }
}

pub struct Aggregator {
    storage: Arc<dyn StorageBackend>,
}

impl Aggregator {
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self { storage }
    }

    /// Group totals for a chart view. `None` means the log is empty.
    pub fn view(&self, mode: ViewMode) -> Result<Option<ChartData>, StorageError> {
        self.summarize(mode.dimension(), mode.title())
    }

    /// Category totals for proportional views.
    pub fn category_breakdown(&self) -> Result<Option<ChartData>, StorageError> {
        self.summarize(Dimension::Category, CATEGORY_BREAKDOWN_TITLE)
    }

    fn summarize(&self, dimension: Dimension, title: &str) -> Result<Option<ChartData>, StorageError> {
        let groups = self.storage.group_sum(dimension)?;
        if groups.is_empty() {
            return Ok(None);
        }

        Ok(Some(ChartData {
            title: Arc::from(title),
            groups,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStorage;
    use rust_decimal_macros::dec;
    use spendlog_core::CreateExpenseCommand;
    use time::{Date, Month};

    fn seeded() -> Aggregator {
        let storage = Arc::new(InMemoryStorage::new());
        for (month, payee, category, amount, mode) in [
            (Month::January, "Landlord", "Bills", dec!(1200), "UPI"),
            (Month::January, "Grocer", "Food", dec!(80), "Cash"),
            (Month::February, "Grocer", "Food", dec!(20), "Card"),
        ] {
            storage
                .insert_expense(&CreateExpenseCommand {
                    date: Date::from_calendar_date(2024, month, 10).unwrap(),
                    payee: Arc::from(payee),
                    description: Arc::from("seed"),
                    category: Arc::from(category),
                    amount,
                    mode: Arc::from(mode),
                })
                .unwrap();
        }
        Aggregator::new(storage)
    }

    #[test]
    fn test_view_names() {
        assert_eq!(ViewMode::from_name("Method"), ViewMode::Method);
        assert_eq!(ViewMode::from_name("receiver"), ViewMode::Receiver);
        assert_eq!(ViewMode::from_name(" CATEGORY "), ViewMode::Category);
        assert_eq!(ViewMode::from_name("Month"), ViewMode::Month);
        assert_eq!(ViewMode::from_name("weekly"), ViewMode::Month);
        assert_eq!(ViewMode::default(), ViewMode::Method);
    }

    #[test]
    fn test_each_view_uses_its_dimension_and_title() {
        let agg = seeded();

        let method = agg.view(ViewMode::Method).unwrap().unwrap();
        assert_eq!(method.title.as_ref(), "Expenses by Payment Method");
        assert_eq!(method.labels(), vec!["Card", "Cash", "UPI"]);

        let receiver = agg.view(ViewMode::Receiver).unwrap().unwrap();
        assert_eq!(receiver.title.as_ref(), "Expenses by Payee");
        assert_eq!(receiver.get("Grocer"), Some(dec!(100)));

        let category = agg.view(ViewMode::Category).unwrap().unwrap();
        assert_eq!(category.title.as_ref(), "Expenses by Category");
        assert_eq!(category.values(), vec![dec!(1200), dec!(100)]);

        let month = agg.view(ViewMode::Month).unwrap().unwrap();
        assert_eq!(month.title.as_ref(), "Monthly Expense Overview");
        assert_eq!(month.labels(), vec!["2024-01", "2024-02"]);
        assert_eq!(month.values_f64(), vec![1280.0, 20.0]);
        assert_eq!(month.total(), dec!(1300));
    }

    #[test]
    fn test_breakdown_is_category_view_with_its_own_title() {
        let agg = seeded();
        let breakdown = agg.category_breakdown().unwrap().unwrap();
        let category = agg.view(ViewMode::Category).unwrap().unwrap();
        assert_eq!(breakdown.title.as_ref(), CATEGORY_BREAKDOWN_TITLE);
        assert_eq!(breakdown.groups, category.groups);
    }

    #[test]
    fn test_empty_log_reports_no_data() {
        let agg = Aggregator::new(Arc::new(InMemoryStorage::new()));
        assert_eq!(agg.view(ViewMode::Month).unwrap(), None);
        assert_eq!(agg.category_breakdown().unwrap(), None);
    }
}
