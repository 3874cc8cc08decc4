//! whois-batch CLI Application
//!
//! Checks every name from an input file against one or more domain suffixes
//! using WHOIS, prints each result as it arrives and exports the full set to
//! CSV/JSON/HTML at the end.

mod ui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{CommandFactory, Parser};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use whois_batch_lib::{
    export_records, load_env_config, load_names, parse_suffixes, BatchChecker, ConfigManager,
    EnvConfig, ExportFormat, RunSummary, Settings, SystemWhoisClient,
    WhoisBatchError,
};

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// CLI arguments for whois-batch
#[derive(Parser, Debug)]
#[command(name = "whois-batch")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Check which names are still free under the given domain suffixes")]
#[command(
    long_about = "Check which names from a file are still free under the given domain suffixes.\n\nEvery name is combined with every suffix and looked up via WHOIS, with a global\nrate limit shared by all worker threads. WHOIS errors are reported as 'available'\nwith the error text, so nothing is silently dropped."
)]
#[command(styles = STYLES)]
pub struct Args {
    /// Domain suffix(es), e.g. .cz or ".com,.net" or ".cz .com"
    #[arg(value_name = "SUFFIXES", help_heading = "Input")]
    pub suffixes: Vec<String>,

    /// File with names, one per line [default: domains.txt]
    #[arg(short = 'f', long = "file", value_name = "FILE", help_heading = "Input")]
    pub file: Option<PathBuf>,

    /// Save CSV (default file: results.csv)
    #[arg(
        short = 'c',
        long = "csv",
        value_name = "FILE",
        num_args = 0..=1,
        default_missing_value = "results.csv",
        help_heading = "Output"
    )]
    pub csv: Option<PathBuf>,

    /// Do not write a CSV file
    #[arg(long = "no-csv", conflicts_with = "csv", help_heading = "Output")]
    pub no_csv: bool,

    /// Save JSON (default file: results.json)
    #[arg(
        short = 'j',
        long = "json",
        value_name = "FILE",
        num_args = 0..=1,
        default_missing_value = "results.json",
        help_heading = "Output"
    )]
    pub json: Option<PathBuf>,

    /// Save an HTML report (default file: results.html)
    #[arg(
        short = 'H',
        long = "html",
        value_name = "FILE",
        num_args = 0..=1,
        default_missing_value = "results.html",
        help_heading = "Output"
    )]
    pub html: Option<PathBuf>,

    /// Disable colored terminal output
    #[arg(long = "no-color", help_heading = "Output")]
    pub no_color: bool,

    /// Only print and save free domains
    #[arg(long = "only-free", help_heading = "Output")]
    pub only_free: bool,

    /// Number of worker threads, clamped to 1-100 [default: 10]
    #[arg(short = 't', long = "threads", value_name = "N", help_heading = "Performance")]
    pub threads: Option<usize>,

    /// Minimum delay between WHOIS queries in seconds, across all threads [default: 0.5].
    /// Raise it if registries start blocking you; 0 or less disables the limit
    #[arg(
        short = 'd',
        long = "delay",
        value_name = "SECONDS",
        allow_negative_numbers = true,
        help_heading = "Performance"
    )]
    pub delay: Option<f64>,

    /// whois executable to run
    #[arg(
        long = "whois-command",
        value_name = "PATH",
        default_value = "whois",
        help_heading = "Performance"
    )]
    pub whois_command: String,

    /// Use specific config file instead of automatic discovery
    #[arg(long = "config", value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<PathBuf>,

    /// Verbose logging to stderr
    #[arg(short = 'v', long = "verbose", help_heading = "Configuration")]
    pub verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args).await {
        match e.downcast_ref::<WhoisBatchError>() {
            Some(err) if err.is_cancelled() => {
                eprintln!("Interrupted by user.");
            }
            Some(err) if err.is_setup_error() => {
                eprintln!("Error: {}", e);
                eprintln!("{}", Args::command().render_usage());
            }
            _ => eprintln!("Error: {}", e),
        }
        // Exit without waiting for lookups still running on blocking threads
        process::exit(1);
    }
}

/// Install the tracing subscriber. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let env_config = load_env_config();
    let settings = build_settings(&args, &env_config)?;
    debug!(?settings, "resolved settings");

    if !settings.color {
        console::set_colors_enabled(false);
    }

    let raw_suffixes = settings.suffixes.as_deref().ok_or_else(|| {
        WhoisBatchError::config("Give at least one suffix (e.g. .cz or \".cz,.com\")")
    })?;
    let suffixes = parse_suffixes(raw_suffixes);
    if suffixes.is_empty() {
        return Err(WhoisBatchError::config(format!("Invalid suffixes: '{}'", raw_suffixes)).into());
    }

    let names = load_names(&settings.file)?;

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_token.cancel();
        }
    });

    let total = names.len() * suffixes.len();
    ui::print_header(total, names.len(), suffixes.len(), settings.delay);

    let checker = BatchChecker::new(
        SystemWhoisClient::with_program(args.whois_command.as_str()),
        settings.batch_config(),
    );
    let summary = checker
        .run(&names, &suffixes, ui::ConsoleReporter::new(), &cancel)
        .await?;

    write_exports(&settings.export_targets(), &summary, &cancel, ui::print_saved)?;

    ui::print_summary(&summary);
    Ok(())
}

/// Write every enabled export. An interrupt that arrives after the run
/// finished still skips the exports that have not been written yet.
fn write_exports<F>(
    targets: &[(ExportFormat, PathBuf)],
    summary: &RunSummary,
    cancel: &CancellationToken,
    mut on_saved: F,
) -> Result<(), WhoisBatchError>
where
    F: FnMut(ExportFormat, &Path),
{
    for (format, path) in targets {
        if cancel.is_cancelled() {
            return Err(WhoisBatchError::cancelled(summary.processed, summary.total));
        }
        export_records(*format, &summary.records, path)?;
        on_saved(*format, path);
    }
    Ok(())
}

/// Resolve settings from config file, environment and CLI arguments.
///
/// Precedence order (highest to lowest):
/// 1. CLI arguments
/// 2. Environment variables (WB_*)
/// 3. Config file (--config, WB_CONFIG, or discovered whois-batch.toml)
/// 4. Built-in defaults
fn build_settings(args: &Args, env_config: &EnvConfig) -> Result<Settings, WhoisBatchError> {
    let mut settings = Settings::default();
    let config_manager = ConfigManager::new();

    let explicit_config = args
        .config
        .clone()
        .or_else(|| env_config.config.as_ref().map(PathBuf::from));

    let file_config = match explicit_config {
        Some(path) => config_manager.load_file(&path)?,
        None => config_manager.discover_and_load(),
    };

    settings.apply_file_config(file_config);
    settings.apply_env_config(env_config);
    apply_cli_args(&mut settings, args);

    settings.validate()?;
    Ok(settings)
}

fn apply_cli_args(settings: &mut Settings, args: &Args) {
    if !args.suffixes.is_empty() {
        settings.suffixes = Some(args.suffixes.join(" "));
    }
    if let Some(file) = &args.file {
        settings.file = file.clone();
    }
    if let Some(csv) = &args.csv {
        settings.csv = Some(csv.clone());
    }
    if args.no_csv {
        settings.csv = None;
    }
    if let Some(json) = &args.json {
        settings.json = Some(json.clone());
    }
    if let Some(html) = &args.html {
        settings.html = Some(html.clone());
    }
    if let Some(threads) = args.threads {
        settings.threads = threads;
    }
    if let Some(delay) = args.delay {
        settings.delay = delay;
    }
    if args.no_color {
        settings.color = false;
    }
    if args.only_free {
        settings.only_free = true;
    }
}
