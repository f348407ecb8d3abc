//! CLI for ttsgrab.

mod client;
mod commands;
mod control_socket;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use ttsgrab_core::config;
use ttsgrab_core::panel::Panel;
use ttsgrab_core::store::Store;

use client::Client;
use commands::{
    run_click, run_completions, run_counter, run_download, run_errors, run_history, run_man,
    run_names, run_serve, run_set_enabled, run_stats, run_toggle, run_voice,
};

/// Top-level CLI for ttsgrab.
#[derive(Debug, Parser)]
#[command(name = "ttsgrab")]
#[command(about = "ttsgrab: intercept TTS audio links and save them as numbered files per voice", long_about = None)]
pub struct Cli {
    /// Tab whose voice selection is used and changed.
    #[arg(long, global = true, default_value = "cli", value_name = "ID")]
    pub tab: String,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Run the orchestrator daemon and listen on the control socket.
    Serve,

    /// Download an audio URL under the tab's voice.
    Download {
        /// Direct HTTP/HTTPS URL of the .mp3 file.
        url: String,
    },

    /// Simulate a click on a link (interception rules apply).
    Click {
        /// Resolved href of the clicked link.
        href: String,
        /// Hrefs of links inserted into the page before the click (repeatable).
        #[arg(long = "inserted", value_name = "HREF")]
        inserted: Vec<String>,
    },

    /// Turn interception on.
    Enable,

    /// Turn interception off.
    Disable,

    /// Flip interception on/off.
    Toggle,

    /// Show the panel for the tab, or select a voice for it.
    Voice {
        /// Voice to select (built-in or custom).
        name: Option<String>,
    },

    /// Manage custom voice names.
    Names {
        #[command(subcommand)]
        action: NamesAction,
    },

    /// Show, set or reset a voice's file counter.
    Counter {
        #[command(subcommand)]
        action: CounterAction,
    },

    /// Show recent downloads, newest first.
    History {
        /// Delete the whole history.
        #[arg(long)]
        clear: bool,
        /// Confirm `--clear`.
        #[arg(long, short = 'y')]
        yes: bool,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Show download statistics.
    Stats {
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Show the most recent recorded errors.
    Errors {
        /// Number of entries to show.
        #[arg(long, default_value = "20", value_name = "N")]
        limit: usize,
    },

    /// Print shell completions to stdout.
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Print the man page to stdout.
    Man,
}

#[derive(Debug, Subcommand)]
pub enum NamesAction {
    /// List all voices (built-in and custom).
    List,
    /// Add a custom name and select it for the tab.
    Add {
        /// 1-50 letters, digits, `_` or `-`.
        name: String,
    },
    /// Remove a custom name.
    Remove { name: String },
}

#[derive(Debug, Subcommand)]
pub enum CounterAction {
    /// Show the next number for a voice (default: the tab's voice).
    Show { voice: Option<String> },
    /// Make the next download use exactly NUMBER.
    Set {
        number: i64,
        #[arg(long)]
        voice: Option<String>,
    },
    /// Forget the counter so numbering restarts at 1.
    Reset {
        voice: Option<String>,
        /// Confirm the reset.
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match &cli.command {
            CliCommand::Completions { shell } => return run_completions(*shell, &mut Cli::command()),
            CliCommand::Man => return run_man(Cli::command()),
            _ => {}
        }

        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        let store = Store::open_default().await?;
        let socket = control_socket::default_socket_path()?;

        if let CliCommand::Serve = cli.command {
            return run_serve(&cfg, store, &socket).await;
        }

        let client = Client::connect(&cfg, &store, socket).await?;
        let panel = Panel::new(
            store.clone(),
            &client,
            cfg.enabled_by_default,
            cfg.limits.history_view_limit,
        );
        let tab = cli.tab.as_str();
        let result = match cli.command {
            CliCommand::Download { url } => run_download(&client, &url, tab).await,
            CliCommand::Click { href, inserted } => {
                run_click(&cfg, &store, &client, &href, inserted, tab).await
            }
            CliCommand::Enable => run_set_enabled(&panel, true).await,
            CliCommand::Disable => run_set_enabled(&panel, false).await,
            CliCommand::Toggle => run_toggle(&client).await,
            CliCommand::Voice { name } => run_voice(&panel, tab, name.as_deref()).await,
            CliCommand::Names { action } => run_names(&panel, tab, action).await,
            CliCommand::Counter { action } => run_counter(&panel, tab, action).await,
            CliCommand::History { clear, yes, json } => run_history(&panel, clear, yes, json).await,
            CliCommand::Stats { json } => run_stats(&client, json).await,
            CliCommand::Errors { limit } => run_errors(&store, limit).await,
            CliCommand::Serve | CliCommand::Completions { .. } | CliCommand::Man => Ok(()),
        };
        client.finish().await;
        result
    }
}

#[cfg(test)]
mod tests;
