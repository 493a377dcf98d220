//! # worktodo
//!
//! A terminal client for a work todo list stored in a Baserow table. The
//! table is the single source of truth: the app lists, adds, completes and
//! deletes rows through the REST API and derives its stats from the last
//! list it fetched.
//!
//! ## Configuration
//!
//! Settings are read from `~/.config/worktodo/config.toml`, then
//! `./worktodo.toml`, then `WORKTODO_*` environment variables (a `.env` file
//! in the working directory is loaded first):
//!
//! ```toml
//! base_url = "https://api.baserow.io"
//! table_id = 623600
//! api_token = "<database token>"
//! timeout_secs = 30
//! ```
//!
//! The table needs the columns `task_name`, `status`, `priority`,
//! `category`, `admin_block`, `due_date` and `notes`.
//!
//! ## Usage
//!
//! ### Interactive Mode (TUI)
//!
//! ```bash
//! worktodo
//! # or explicitly
//! worktodo ui
//! ```
//!
//! *   `q`: Quit
//! *   `a`: Open the add form (`Tab` moves between fields, `Left`/`Right` change priority and block)
//! *   `Space`: Toggle the selected task between todo and completed
//! *   `d`: Delete selected task
//! *   `r`: Sync with the table
//! *   `f`: Cycle status filter (all, active, completed)
//! *   `b`: Cycle admin block filter (all, morning, afternoon)
//!
//! ### Command Line Interface (CLI)
//!
//! ```bash
//! worktodo add "Write report" --priority high --block morning --due 2025-12-01
//! worktodo list --status active --block morning
//! worktodo toggle 42
//! worktodo remove 42
//! worktodo stats
//! ```
//!
//! Logs go to stderr for CLI commands and to
//! `~/.local/share/worktodo/worktodo.log` while the TUI runs. Set
//! `WORKTODO_LOG=debug` for request-level detail.

use std::io;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};

use worktodo::client::TableClient;
use worktodo::commands::*;
use worktodo::config::Config;
use worktodo::logging::{self, LogTarget};
use worktodo::models::{AdminBlock, Priority, DEFAULT_CATEGORY};
use worktodo::state::Draft;
use worktodo::stats::{BlockFilter, StatusFilter};
use worktodo::tui::run_tui;

#[derive(Parser)]
#[command(name = "worktodo")]
#[command(about = "Work todo list backed by a Baserow table", long_about = None)]
struct Cli {
    /// Log debug detail
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        /// Task name (quoted if it has spaces)
        name: String,
        /// low, medium or high
        #[arg(short, long, default_value_t = Priority::Medium)]
        priority: Priority,
        /// Category, e.g. Meetings or Reports
        #[arg(short, long, default_value = DEFAULT_CATEGORY)]
        category: String,
        /// Admin block: morning (9-11am) or afternoon (2-5pm)
        #[arg(short, long, default_value_t = AdminBlock::Afternoon)]
        block: AdminBlock,
        /// Due date in YYYY-MM-DD or "YYYY-MM-DD HH:MM"
        #[arg(short, long)]
        due: Option<String>,
        /// Additional details
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// List tasks
    List {
        /// Filter by completion state
        #[arg(short, long, value_enum, default_value_t = StatusFilter::All)]
        status: StatusFilter,
        /// Filter by admin block
        #[arg(short, long, value_enum, default_value_t = BlockFilter::All)]
        block: BlockFilter,
    },
    /// Toggle a task between todo and completed
    Toggle {
        id: u64,
    },
    /// Remove a task
    Remove {
        id: u64,
    },
    /// Show totals and completion percentage
    Stats,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        shell: String,
    },
    /// Open interactive TUI
    Ui,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::Completions { shell }) = &cli.command {
        let shell_enum = match shell.as_str() {
            "bash" => Shell::Bash,
            "zsh" => Shell::Zsh,
            "fish" => Shell::Fish,
            "powershell" => Shell::PowerShell,
            "elvish" => Shell::Elvish,
            _ => anyhow::bail!("Unsupported shell: {}", shell),
        };
        let mut cmd = Cli::command();
        generate(shell_enum, &mut cmd, "worktodo", &mut io::stdout());
        return Ok(());
    }

    let target = match cli.command {
        Some(Commands::Ui) | None => LogTarget::File,
        _ => LogTarget::Stderr,
    };
    logging::init(target, cli.quiet, cli.verbose)?;

    let config = Config::load_with_dotenv().context("failed to load configuration")?;
    tracing::debug!(?config, "configuration loaded");
    let client = TableClient::new(&config).context("failed to build HTTP client")?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    match cli.command {
        Some(Commands::Add { name, priority, category, block, due, notes }) => {
            let draft = Draft {
                name,
                priority,
                category,
                admin_block: block,
                due_date: due.unwrap_or_default(),
                notes: notes.unwrap_or_default(),
            };
            runtime.block_on(cmd_add(&client, draft))
        }
        Some(Commands::List { status, block }) => runtime.block_on(cmd_list(&client, status, block)),
        Some(Commands::Toggle { id }) => runtime.block_on(cmd_toggle(&client, id)),
        Some(Commands::Remove { id }) => runtime.block_on(cmd_remove(&client, id)),
        Some(Commands::Stats) => runtime.block_on(cmd_stats(&client)),
        Some(Commands::Completions { .. }) => Ok(()),
        Some(Commands::Ui) | None => run_tui(client, runtime.handle().clone()),
    }
}
