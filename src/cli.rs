use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Cultivation-themed daily practice tracker.
/// Every invocation starts a fresh session seeded with the starter practice list.
#[derive(Parser)]
#[command(name = "cultivate", version, about = "Daily practice tracker with ranks and experience")]
pub struct Cli {
    /// Path to a TOML config file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Append log lines to this file (the only log output while the UI runs).
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Defaults to `ui`.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_parses() {
        let cli = Cli::try_parse_from(["cultivate"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["cultivate", "list", "--config", "c.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
        assert!(matches!(cli.command, Some(Commands::List { .. })));
    }
}
