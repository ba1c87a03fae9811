//! CLI definitions for reclink.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reclink_config::reclink_home;

/// reclink CLI.
#[derive(Parser)]
#[command(name = "reclink")]
#[command(about = "Collect class recording links from the UTEC schedule page")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (default: ~/.reclink/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| reclink_home().join("config.toml"))
    }
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub(crate) enum Commands {
    /// Interactive session in the foreground (default)
    Run,

    /// Run one extraction pass on the active tab and export the report
    Extract {
        /// Skip writing the JSON report
        #[arg(long)]
        no_export: bool,
    },

    /// Show whether the active tab is ready for extraction
    Status,

    /// Close every Zoom tab
    CloseTabs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_none() {
        let cli = Cli::try_parse_from(["reclink"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config_path().ends_with(".reclink/config.toml"));
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["reclink", "status", "--config", "/tmp/r.toml"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Status));
        assert_eq!(cli.config_path(), PathBuf::from("/tmp/r.toml"));
    }

    #[test]
    fn test_extract_flags() {
        let cli = Cli::try_parse_from(["reclink", "extract", "--no-export"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Extract { no_export: true }));

        let cli = Cli::try_parse_from(["reclink", "close-tabs"]).unwrap();
        assert_eq!(cli.command, Some(Commands::CloseTabs));
    }

    #[test]
    fn test_unknown_subcommand_rejected() {
        assert!(Cli::try_parse_from(["reclink", "daemon"]).is_err());
    }
}
