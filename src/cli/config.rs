//! Settings CLI commands

use clap::Subcommand;

use crate::config::{Settings, TrackerPaths};
use crate::error::TrackerResult;

/// Config subcommands; without one the current configuration is shown
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show paths and settings
    Show,

    /// Change a setting
    Set {
        /// Setting name
        key: String,
        /// New value
        value: String,
    },
}

/// Handle a config command
pub fn handle_config_command(
    paths: &TrackerPaths,
    settings: &mut Settings,
    cmd: Option<ConfigCommands>,
) -> TrackerResult<()> {
    match cmd.unwrap_or(ConfigCommands::Show) {
        ConfigCommands::Show => {
            println!("Expense Tracker Configuration");
            println!("=============================");
            println!("Base directory:    {}", paths.base_dir().display());
            println!("Data directory:    {}", paths.data_dir().display());
            println!("Settings file:     {}", paths.settings_file().display());
            println!("Audit log:         {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  currency_symbol:          {}", settings.currency_symbol);
            println!("  date_format:              {}", settings.date_format);
            println!("  long_date_format:         {}", settings.long_date_format);
            println!("  short_date_format:        {}", settings.short_date_format);
            println!(
                "  max_amount:               {}",
                settings.max_amount.format_with_symbol(&settings.currency_symbol)
            );
            println!("  max_description_length:   {}", settings.max_description_length);
            println!("  max_category_name_length: {}", settings.max_category_name_length);
            println!("  default_list_limit:       {}", settings.default_list_limit);
            println!("  log_filter:               {}", settings.log_filter);
        }

        ConfigCommands::Set { key, value } => {
            settings.set(&key, &value)?;
            settings.save(paths)?;
            tracing::info!(%key, %value, "setting changed");
            println!("Set {} = {}", key, value);
        }
    }

    Ok(())
}
