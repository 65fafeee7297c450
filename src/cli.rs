use std::path::PathBuf;

use clap::{Args, Subcommand};
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;
use time::{Date, OffsetDateTime};

use spendlog_core::{
    models::write::{DEFAULT_CATEGORY, DEFAULT_MODE, SUGGESTED_CATEGORIES, SUGGESTED_MODES},
    parse_date, CreateExpenseCommand, ExpenseId,
};

use crate::{
    aggregation::{ChartData, ViewMode},
    chart::{ChartError, ChartRenderer},
    config::ReportConfig,
    controller::{ControllerError, ErrorKind, ExpenseController},
    export_registry::ExportFormat,
};

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log a new expense
    Add(AddArgs),
    /// Show every logged expense
    List,
    /// Delete one expense by id
    Remove {
        /// Id of the expense to delete
        id: Option<ExpenseId>,
    },
    /// Delete every expense and restart id numbering
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show the total amount spent
    Total,
    /// Bar chart of totals for one view
    Chart {
        #[arg(short, long, value_enum, default_value_t = ViewMode::Method)]
        view: ViewMode,

        /// SVG file to write
        #[arg(short, long, default_value = "expenses-chart.svg")]
        out: PathBuf,

        /// Print the chart data as JSON instead of drawing it
        #[arg(long)]
        json: bool,
    },
    /// Pie chart of totals per category
    Pie {
        /// SVG file to write
        #[arg(short, long, default_value = "expenses-pie.svg")]
        out: PathBuf,

        /// Print the chart data as JSON instead of drawing it
        #[arg(long)]
        json: bool,
    },
    /// Write every expense to a CSV, Excel or PDF file
    Export {
        #[arg(short, long, value_enum)]
        format: ExportFormat,

        /// Destination file; the format's extension is added when missing
        #[arg(short, long)]
        out: PathBuf,
    },
}

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    /// Expense date as YYYY-MM-DD (defaults to today)
    #[arg(long, value_parser = parse_date_arg)]
    pub date: Option<Date>,

    #[arg(long, default_value = "")]
    pub payee: String,

    #[arg(long, default_value = "")]
    pub description: String,

    #[arg(long, default_value = DEFAULT_CATEGORY, help = suggestion_help("Category", &SUGGESTED_CATEGORIES))]
    pub category: String,

    #[arg(long, default_value = "0")]
    pub amount: Decimal,

    #[arg(long, default_value = DEFAULT_MODE, help = suggestion_help("Payment mode", &SUGGESTED_MODES))]
    pub mode: String,
}

impl AddArgs {
    pub fn into_command(self) -> CreateExpenseCommand {
        CreateExpenseCommand {
            date: self.date.unwrap_or_else(|| OffsetDateTime::now_utc().date()),
            payee: self.payee.into(),
            description: self.description.into(),
            category: self.category.into(),
            amount: self.amount,
            mode: self.mode.into(),
        }
    }
}

/// Help text listing the usual values of a free-text field.
fn suggestion_help(field: &str, suggestions: &[&str]) -> String {
    format!("{} (any text; usually one of: {})", field, suggestions.join(", "))
}

fn parse_date_arg(s: &str) -> Result<Date, String> {
    parse_date(s).ok_or_else(|| format!("'{}' is not a date in YYYY-MM-DD form", s))
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Controller(#[from] ControllerError),
    #[error(transparent)]
    Chart(#[from] ChartError),
    #[error("could not encode chart data: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            CliError::Controller(e) => Some(e.kind()),
            CliError::Chart(ChartError::Empty) => Some(ErrorKind::NoData),
            _ => None,
        }
    }

    /// Warnings are the user's to fix: bad input, no selection or an empty log.
    pub fn is_warning(&self) -> bool {
        self.kind().map_or(false, |k| k.is_recoverable())
    }

    /// The line shown on stderr, e.g. `warning: Select Entry: Choose an item to delete.`
    pub fn report(&self) -> String {
        let level = if self.is_warning() { "warning" } else { "error" };
        match self.kind() {
            Some(kind) => format!("{}: {}: {}", level, kind, self),
            None => format!("{}: {}", level, self),
        }
    }
}

/// Currency text rounded half away from zero to two places.
pub fn format_amount(symbol: &str, amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{}{:.2}", symbol, rounded)
}

fn chart_json(data: &ChartData) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serde_json::json!({
        "title": data.title.as_ref(),
        "labels": data.labels(),
        "values": data.values_f64(),
    }))
}

/// Runs one command against the controller and returns the text to show the user.
/// `confirm` is asked before destructive commands; returning false aborts them.
pub fn execute(
    controller: &ExpenseController,
    report: &ReportConfig,
    command: Command,
    confirm: &mut dyn FnMut(&str) -> bool,
) -> Result<String, CliError> {
    let output = match command {
        Command::Add(args) => {
            let table = controller.add_expense(&args.into_command())?;
            format!("Expense logged successfully.\n{}", table)
        }
        Command::List => controller.expenses()?.to_string(),
        Command::Remove { id } => {
            let table = controller.remove_expense(id)?;
            format!("Entry deleted.\n{}", table)
        }
        Command::Clear { yes } => {
            if !yes && !confirm("This will delete all entries. Proceed?") {
                return Ok("Nothing deleted.".to_string());
            }
            controller.clear_all()?;
            "All entries deleted.".to_string()
        }
        Command::Total => {
            let total = controller.total_spent()?;
            format!("Total Expenditure: {}", format_amount(&report.currency_symbol, total))
        }
        Command::Chart { view, out, json } => {
            let data = controller.chart_data(view)?;
            if json {
                chart_json(&data)?
            } else {
                ChartRenderer::new(report).render_bar(&data, &out)?;
                tracing::info!(%view, path = %out.display(), "Bar chart written");
                format!("Chart saved at: {}", out.display())
            }
        }
        Command::Pie { out, json } => {
            let data = controller.category_breakdown()?;
            if json {
                chart_json(&data)?
            } else {
                ChartRenderer::new(report).render_pie(&data, &out)?;
                tracing::info!(path = %out.display(), "Pie chart written");
                format!("Chart saved at: {}", out.display())
            }
        }
        Command::Export { format, mut out } => {
            if out.extension().is_none() {
                out.set_extension(format.extension());
            }
            controller.export_all(format, &out)?;
            format!("{} file saved at: {}", format, out.display())
        }
    };

    Ok(output)
}
