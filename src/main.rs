//! # cultivate - daily practice as cultivation
//!
//! A terminal task tracker themed around xianxia cultivation. Every task is a
//! practice item in one of four categories; completing one grants spiritual
//! experience toward the next realm.
//!
//! ## Key Features
//!
//! - **Practice list**: today's tasks with priority runes, reminders and daily repeat
//! - **Progression**: rank, stage, experience gauge and the rank ladder
//! - **Calendar**: month grid shaded by completions, streak and best day
//! - **Fellow cultivators**: leaderboard, public square, private chats, friend discovery
//! - **Settings**: privacy, reminder and notification switches
//!
//! ## Quick Start
//!
//! ```bash
//! # Launch the terminal interface
//! cultivate
//!
//! # Add a practice task
//! cultivate add "晨间打坐" --category focus --priority 3 --reminder 06:00
//!
//! # Today's list as JSON
//! cultivate list --json
//! ```
//!
//! Each invocation starts a fresh session from the starter data; nothing is
//! written to disk except an optional log file. See [`config`] for the TOML
//! keys accepted by `--config`.

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing::error;

pub mod calendar;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod fields;
pub mod logging;
pub mod progression;
pub mod session;
pub mod settings;
pub mod social;
pub mod store;
pub mod task;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod run;
    pub mod task_form;
    pub mod utils;
}

use cli::Cli;
use cmd::Commands;
use config::Config;
use logging::LogTarget;
use session::Session;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Ui);

    let config = match Config::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let target = match command {
        Commands::Ui => LogTarget::FileOnly,
        _ => LogTarget::Stderr,
    };
    if let Err(e) = logging::init(&config.logging, cli.log_file.as_deref(), target) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    let mut session = Session::new(&config);
    let delay = Duration::from_millis(config.progression.completion_delay_ms);

    match cmd::run(command, &mut session, delay) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "command failed");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
