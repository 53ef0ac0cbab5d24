//! Report CLI commands

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::clock::Clock;
use crate::config::Settings;
use crate::error::{TrackerError, TrackerResult};
use crate::export::{export_report, ExportFormat};
use crate::reports::{DateSpec, RangeSpec, Report, ReportBuilder, ReportRequest};
use crate::services::CategoryService;
use crate::storage::Storage;

/// Where and how to write a report
#[derive(Args, Debug)]
pub struct OutputArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = ExportFormat::Text)]
    pub format: ExportFormat,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Report subcommands
#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Totals for one day
    Daily {
        /// Day to report on; defaults to today
        #[arg(short, long)]
        date: Option<String>,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Totals for the Monday-to-Sunday week containing a date
    Weekly {
        #[arg(short, long)]
        date: Option<String>,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Totals for the calendar month containing a date
    Monthly {
        #[arg(short, long)]
        date: Option<String>,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Totals for the calendar year containing a date
    Yearly {
        #[arg(short, long)]
        date: Option<String>,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Transactions of one category over a range (all time by default)
    Category {
        /// Category name or ID
        category: String,
        /// Range expression ("last month", "2024-01-01 to 2024-06-30")
        #[arg(short, long, conflicts_with_all = ["start", "end"])]
        range: Option<String>,
        /// First day (date or expression)
        #[arg(short, long)]
        start: Option<String>,
        /// Last day (date or expression); defaults to today
        #[arg(short, long, requires = "start")]
        end: Option<String>,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Compare two ranges
    Compare {
        /// Range to compare against
        #[arg(short, long)]
        baseline: String,
        /// Range being compared
        #[arg(short, long)]
        comparand: String,
        #[command(flatten)]
        output: OutputArgs,
    },
}

/// Handle a report command
pub fn handle_report_command(
    storage: &Storage,
    settings: &Settings,
    clock: &dyn Clock,
    cmd: ReportCommands,
) -> TrackerResult<()> {
    let anchor = |date: Option<String>| date.map(DateSpec::from);

    let (request, output) = match cmd {
        ReportCommands::Daily { date, output } => (
            ReportRequest::Daily {
                anchor: anchor(date),
            },
            output,
        ),
        ReportCommands::Weekly { date, output } => (
            ReportRequest::Weekly {
                anchor: anchor(date),
            },
            output,
        ),
        ReportCommands::Monthly { date, output } => (
            ReportRequest::Monthly {
                anchor: anchor(date),
            },
            output,
        ),
        ReportCommands::Yearly { date, output } => (
            ReportRequest::Yearly {
                anchor: anchor(date),
            },
            output,
        ),
        ReportCommands::Category {
            category,
            range,
            start,
            end,
            output,
        } => {
            let category = CategoryService::new(storage, settings).resolve(&category, None)?;
            let range = match (range, start, end) {
                (Some(range), _, _) => RangeSpec::Expression(range),
                (None, Some(start), end) => {
                    RangeSpec::bounds(start, end.unwrap_or_else(|| "today".to_string()))
                }
                (None, None, _) => RangeSpec::AllTime,
            };
            (
                ReportRequest::Category {
                    category_id: category.id,
                    range,
                },
                output,
            )
        }
        ReportCommands::Compare {
            baseline,
            comparand,
            output,
        } => (
            ReportRequest::Comparison {
                baseline: RangeSpec::Expression(baseline),
                comparand: RangeSpec::Expression(comparand),
            },
            output,
        ),
    };

    let report = ReportBuilder::new(storage, clock).build(&request)?;
    write_report(&report, settings, &output)
}

fn write_report(report: &Report, settings: &Settings, args: &OutputArgs) -> TrackerResult<()> {
    match &args.output {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                TrackerError::Export(format!("Failed to create {}: {}", path.display(), e))
            })?;
            let mut writer = BufWriter::new(file);
            export_report(report, args.format, settings, &mut writer)?;
            writer
                .flush()
                .map_err(|e| TrackerError::Export(e.to_string()))?;
            println!("Report written to: {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            export_report(report, args.format, settings, &mut handle)?;
        }
    }
    Ok(())
}
