use anyhow::Result;
use clap::{Parser, Subcommand};

use expense_tracker::cli::{
    handle_category_command, handle_config_command, handle_report_command,
    handle_transaction_command, CategoryCommands, ConfigCommands, ReportCommands,
    TransactionCommands,
};
use expense_tracker::clock::{Clock, SystemClock};
use expense_tracker::config::{Settings, TrackerPaths};
use expense_tracker::dates::DateResolver;
use expense_tracker::display::{format_audit_lines, format_resolved};
use expense_tracker::storage::{initialize_storage, Storage};

#[derive(Parser)]
#[command(
    name = "expense",
    version,
    about = "Track daily expenses and income, and report on any period",
    long_about = "Record expenses and income by category, then report on a day, week, \
                  month, year, category or a comparison of two ranges. Dates accept \
                  phrases such as 'yesterday', '3 days ago', 'last month' or \
                  '2024-01-01 to 2024-03-31'."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory and default categories
    Init,

    /// Show or change configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigCommands>,
    },

    /// Show what a date expression means
    Resolve {
        /// Date expression, e.g. "last week" or "01/13/2023"
        #[arg(required = true, num_args = 1..)]
        expression: Vec<String>,
    },

    /// Category management commands
    #[command(subcommand)]
    Category(CategoryCommands),

    /// Transaction management commands
    #[command(subcommand, alias = "txn")]
    Transaction(TransactionCommands),

    /// Daily, weekly, monthly, yearly, category and comparison reports
    #[command(subcommand)]
    Report(ReportCommands),

    /// Show the most recent changes from the audit log
    History {
        /// Number of entries to show
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = TrackerPaths::new()?;
    let mut settings = Settings::load_or_create(&paths)?;
    expense_tracker::init_tracing(&settings.log_filter);

    let storage = Storage::open(paths.clone())?;
    let clock = SystemClock;

    match cli.command {
        Some(Commands::Init) => {
            println!("Initializing expense tracker at: {}", paths.base_dir().display());
            let seeded = initialize_storage(&paths)?;
            settings.save(&paths)?;
            storage.load_all()?;
            println!("Initialization complete!");
            if seeded {
                println!();
                println!(
                    "{} default categories have been created.",
                    storage.categories.count()?
                );
                println!("Run 'expense category list' to see them.");
            }
        }
        Some(Commands::Config { action }) => {
            handle_config_command(&paths, &mut settings, action)?;
        }
        Some(Commands::Resolve { expression }) => {
            let expression = expression.join(" ");
            let resolved = DateResolver::new(&clock).resolve(&expression)?;
            println!("{}", format_resolved(&resolved, &settings, clock.today()));
        }
        Some(Commands::Category(cmd)) => {
            handle_category_command(&storage, &settings, cmd)?;
        }
        Some(Commands::Transaction(cmd)) => {
            handle_transaction_command(&storage, &settings, &clock, cmd)?;
        }
        Some(Commands::Report(cmd)) => {
            handle_report_command(&storage, &settings, &clock, cmd)?;
        }
        Some(Commands::History { limit }) => {
            let entries = storage
                .audit()
                .recent(limit.unwrap_or(settings.default_list_limit))?;
            if entries.is_empty() {
                println!("No changes recorded yet.");
            } else {
                print!("{}", format_audit_lines(&entries));
            }
        }
        None => {
            println!("Expense Tracker - daily expenses, income and reports");
            println!();
            println!("Run 'expense --help' for usage information.");
            println!("Run 'expense init' to get started.");
        }
    }

    Ok(())
}
