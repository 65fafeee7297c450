use std::{fmt::Display, path::Path, sync::Arc};

use rust_decimal::Decimal;
use thiserror::Error;

use spendlog_core::{CreateExpenseCommand, ExpenseId, ExpenseTable, ValidationError};

use crate::{
    aggregation::{Aggregator, ChartData, ViewMode},
    export_registry::{ExportError, ExportFormat, ExporterRegistry},
    storage::{StorageBackend, StorageError},
};

pub const NOTHING_SELECTED: &str = "Choose an item to delete.";
pub const NO_CHART_DATA: &str = "Add expenses to generate a chart.";
pub const NO_BREAKDOWN_DATA: &str = "Pie chart requires logged expenses.";
pub const NO_EXPORT_DATA: &str = "No expense data to export.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Selection,
    NoData,
    Persistence,
    Export,
}

impl ErrorKind {
    /// Kinds caused by the user's input or an empty log rather than a failure.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ErrorKind::Validation | ErrorKind::Selection | ErrorKind::NoData)
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ErrorKind::Validation => "Incomplete Data",
            ErrorKind::Selection => "Select Entry",
            ErrorKind::NoData => "No Data",
            ErrorKind::Persistence => "Database Error",
            ErrorKind::Export => "Export Error",
        })
    }
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("Please provide complete expense details ({0}).")]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Selection(&'static str),
    #[error("{0}")]
    NoData(&'static str),
    #[error("storage failure: {0}")]
    Persistence(#[from] StorageError),
    #[error("export failed: {0}")]
    Export(#[from] ExportError),
}

impl ControllerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ControllerError::Validation(_) => ErrorKind::Validation,
            ControllerError::Selection(_) => ErrorKind::Selection,
            ControllerError::NoData(_) => ErrorKind::NoData,
            ControllerError::Persistence(_) => ErrorKind::Persistence,
            ControllerError::Export(_) => ErrorKind::Export,
        }
    }
}

/// Use-case layer between the presentation and the expense store. Holds no copy of the
/// log: every read goes back to storage.
pub struct ExpenseController {
    storage: Arc<dyn StorageBackend>,
    aggregator: Aggregator,
    exporters: Arc<ExporterRegistry>,
}

impl ExpenseController {
    pub fn new(storage: Arc<dyn StorageBackend>, exporters: Arc<ExporterRegistry>) -> Self {
        Self {
            aggregator: Aggregator::new(storage.clone()),
            storage,
            exporters,
        }
    }

    pub fn expenses(&self) -> Result<ExpenseTable, ControllerError> {
        Ok(ExpenseTable::new(self.storage.list_expenses()?))
    }

    pub fn add_expense(&self, command: &CreateExpenseCommand) -> Result<ExpenseTable, ControllerError> {
        if let Err(e) = command.validate() {
            tracing::warn!(reason = %e, "Expense rejected");
            return Err(e.into());
        }

        let id = self.storage.insert_expense(command)?;
        tracing::info!(id, amount = %command.amount, "Expense logged");
        self.expenses()
    }

    pub fn remove_expense(&self, id: Option<ExpenseId>) -> Result<ExpenseTable, ControllerError> {
        let id = id.ok_or(ControllerError::Selection(NOTHING_SELECTED))?;
        self.storage.delete_expense(id)?;
        tracing::info!(id, "Expense removed");
        self.expenses()
    }

    /// Deletes the whole log. Asking the user for confirmation is the caller's job.
    pub fn clear_all(&self) -> Result<ExpenseTable, ControllerError> {
        self.storage.delete_all()?;
        tracing::info!("Expense log cleared");
        self.expenses()
    }

    pub fn total_spent(&self) -> Result<Decimal, ControllerError> {
        Ok(self.storage.sum_amount()?)
    }

    pub fn chart_data(&self, mode: ViewMode) -> Result<ChartData, ControllerError> {
        self.aggregator
            .view(mode)?
            .ok_or(ControllerError::NoData(NO_CHART_DATA))
    }

    pub fn category_breakdown(&self) -> Result<ChartData, ControllerError> {
        self.aggregator
            .category_breakdown()?
            .ok_or(ControllerError::NoData(NO_BREAKDOWN_DATA))
    }

    /// Hands the full log to the exporter registered for `format`. Returns the number
    /// of records written.
    pub fn export_all(&self, format: ExportFormat, destination: &Path) -> Result<usize, ControllerError> {
        let records = self.storage.list_expenses()?;
        if records.is_empty() {
            return Err(ControllerError::NoData(NO_EXPORT_DATA));
        }

        let exporter = self
            .exporters
            .get_exporter(format)
            .ok_or(ExportError::UnsupportedFormat(format))?;
        exporter.export(&records, destination)?;

        tracing::info!(%format, path = %destination.display(), records = records.len(), "Expenses exported");
        Ok(records.len())
    }
}
