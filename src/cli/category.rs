//! Category CLI commands

use std::collections::HashMap;

use clap::Subcommand;

use crate::config::Settings;
use crate::display::format_category_list;
use crate::error::TrackerResult;
use crate::models::TransactionKind;
use crate::services::CategoryService;
use crate::storage::Storage;

/// Category subcommands
#[derive(Subcommand, Debug)]
pub enum CategoryCommands {
    /// Create a new category
    #[command(alias = "create")]
    Add {
        /// Category name
        name: String,
        /// Transaction type the category applies to (expense or income)
        #[arg(short = 't', long = "type", default_value = "expense")]
        kind: TransactionKind,
    },

    /// List categories with their transaction counts
    List {
        /// Only show categories of this type
        #[arg(short = 't', long = "type")]
        kind: Option<TransactionKind>,
    },

    /// Delete a category that no transaction uses
    Delete {
        /// Category name or ID
        category: String,
        /// Disambiguates a name used for both types
        #[arg(short = 't', long = "type")]
        kind: Option<TransactionKind>,
    },
}

/// Handle a category command
pub fn handle_category_command(
    storage: &Storage,
    settings: &Settings,
    cmd: CategoryCommands,
) -> TrackerResult<()> {
    let service = CategoryService::new(storage, settings);

    match cmd {
        CategoryCommands::Add { name, kind } => {
            let category = service.create(&name, kind)?;
            println!("Created category: {}", category.name);
            println!("  Type: {}", category.kind);
            println!("  ID: {}", category.id);
        }

        CategoryCommands::List { kind } => {
            let categories = service.list(kind)?;
            let usage = categories
                .iter()
                .map(|c| Ok((c.id, service.usage_count(c.id)?)))
                .collect::<TrackerResult<HashMap<_, _>>>()?;
            println!("{}", format_category_list(&categories, &usage));
        }

        CategoryCommands::Delete { category, kind } => {
            let found = service.resolve(&category, kind)?;
            service.delete(found.id)?;
            println!("Deleted category: {}", found.name);
        }
    }

    Ok(())
}
