#![forbid(unsafe_code)]

mod cmd;
mod output;

use std::env;
use std::path::PathBuf;

use cadence_core::{CoreError, Repository};
use clap::{Parser, Subcommand};
use output::{CliError, OutputMode, render_error};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "cadence: track recurring events and forecast the next one",
    long_about = None
)]
struct Cli {
    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Data directory (default: CADENCE_HOME, then the platform data dir).
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    const fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Create a new tracker",
        after_help = "EXAMPLES:\n    cad add \"water plants\""
    )]
    Add(cmd::add::AddArgs),

    #[command(about = "Delete a tracker")]
    Delete(cmd::delete::DeleteArgs),

    #[command(about = "Rename a tracker")]
    Rename(cmd::rename::RenameArgs),

    #[command(
        about = "Record a completion",
        after_help = "EXAMPLES:\n    # Record a completion right now\n    cad record 3\n\n    # Backdate, and bend the interval it closes by -1h\n    cad record 3 \"2025-03-01 8:00, -1h\""
    )]
    Record(cmd::record::RecordArgs),

    #[command(
        about = "Replace a tracker's entire history",
        after_help = "EXAMPLES:\n    cad set-history 3 \"2025-03-01 8:00; 2025-03-02 8:30, -10m\""
    )]
    SetHistory(cmd::history::SetHistoryArgs),

    #[command(about = "Remove one history entry by index")]
    HistoryRm(cmd::history::HistoryRmArgs),

    #[command(about = "Replace one history entry by index")]
    HistorySet(cmd::history::HistorySetArgs),

    #[command(
        about = "List trackers, one page at a time",
        after_help = "EXAMPLES:\n    cad list\n    cad list --page 1\n    cad list --json"
    )]
    List(cmd::list::ListArgs),

    #[command(
        about = "Show one tracker in full",
        after_help = "EXAMPLES:\n    cad show 3\n\n    # By page label, against the active page\n    cad show --label c"
    )]
    Show(cmd::show::ShowArgs),

    #[command(about = "Change the listing order (forecast, latest, name, id)")]
    Sort(cmd::sort::SortArgs),

    #[command(about = "Move the active page (next, prev, first)")]
    Page(cmd::page::PageArgs),

    #[command(about = "Show or change settings")]
    Settings {
        #[command(subcommand)]
        command: cmd::settings::SettingsCommand,
    },

    #[command(about = "Recompute every tracker's statistics")]
    Refresh(cmd::refresh::RefreshArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("CADENCE_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "cadence=debug,info"
        } else {
            "cadence=info,warn"
        })
    });

    let format = env::var("CADENCE_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

/// Resolve the data directory: `--home` flag, then `CADENCE_HOME`, then the
/// platform data directory, then the current directory.
fn resolve_home(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| env::var_os("CADENCE_HOME").map(PathBuf::from))
        .or_else(|| dirs::data_dir().map(|dir| dir.join("cadence")))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let output = cli.output_mode();
    let home = resolve_home(cli.home.clone());
    let db_path = home.join("cadence.db");

    let mut repo = Repository::open(&db_path);
    if repo.degraded() {
        warn!("running without persistence; this session's changes will be lost");
    }

    // The rollover hook fires at most once per calendar day, on whichever
    // invocation first sees the new date.
    match repo.on_day_rollover(chrono::Local::now().date_naive()) {
        Ok(true) => info!("daily rollover hook ran"),
        Ok(false) => {}
        Err(err) => warn!(error = %err, "daily rollover hook failed"),
    }

    let command_result = match cli.command {
        Commands::Add(ref args) => cmd::add::run_add(args, &mut repo, output),
        Commands::Delete(ref args) => cmd::delete::run_delete(args, &mut repo, output),
        Commands::Rename(ref args) => cmd::rename::run_rename(args, &mut repo, output),
        Commands::Record(ref args) => cmd::record::run_record(args, &mut repo, output),
        Commands::SetHistory(ref args) => cmd::history::run_set_history(args, &mut repo, output),
        Commands::HistoryRm(ref args) => cmd::history::run_history_rm(args, &mut repo, output),
        Commands::HistorySet(ref args) => cmd::history::run_history_set(args, &mut repo, output),
        Commands::List(ref args) => cmd::list::run_list(args, &mut repo, output),
        Commands::Show(ref args) => cmd::show::run_show(args, &mut repo, output),
        Commands::Sort(ref args) => cmd::sort::run_sort(args, &mut repo, output),
        Commands::Page(ref args) => cmd::page::run_page(args, &mut repo, output),
        Commands::Settings { ref command } => cmd::settings::run_settings(command, &mut repo, output),
        Commands::Refresh(ref args) => cmd::refresh::run_refresh(args, &mut repo, output),
    };

    // Close the store on both paths before reporting failure.
    let mut exit_code = 0;
    if let Err(err) = command_result {
        let cli_error = err
            .downcast_ref::<CoreError>()
            .map_or_else(|| CliError::new(err.to_string()), CliError::from);
        render_error(output, &cli_error)?;
        exit_code = 1;
    }

    repo.close()?;
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
    Ok(())
}
