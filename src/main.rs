use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use snitch_config::alert::StderrAlert;
use snitch_config::config::{parse_document, ApplyOutcome, ConfigDocument, ConfigStore, Settings};
use snitch_config::{FileStore, HttpFetcher};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

/// Manage DOM Snitch scanner configuration
///
/// Applies configuration documents to the local settings store, exports the
/// current settings, and answers scope queries.
#[derive(Parser, Debug)]
#[command(name = "snitch-config")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Settings store file
    ///
    /// Defaults to `store_path` from the settings file, then
    /// <data_dir>/snitch-config/store.json
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Settings file to use instead of the standard lookup
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Log to file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply a configuration document
    ///
    /// Without --file, uses the cached document, else fetches from the
    /// configured URL or the bundled default.
    Apply {
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Print the current settings as a configuration document
    Export,

    /// Check whether a URL (and optionally a heuristic) is in scope
    Check {
        url: String,

        /// Heuristic display name; omitted means only the URL is checked
        #[arg(long)]
        heuristic: Option<String>,

        /// Skip the heuristic check even when --heuristic is given
        #[arg(long)]
        ignore_type: bool,
    },

    /// Set the location configuration documents are fetched from
    SetUrl { location: String },

    /// Allow configuration to be applied
    Enable,

    /// Block configuration from being applied
    Disable,

    /// Remove the cached configuration document
    ClearCache,
}

fn setup_logging(log_level: &str, log_file: Option<PathBuf>) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    if let Some(log_path) = log_file {
        let file = std::fs::File::create(log_path)?;
        subscriber.with_writer(file).init();
    } else {
        subscriber.with_writer(std::io::stderr).init();
    }

    Ok(())
}

fn print_document(config: &ConfigDocument) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let settings = match &args.settings {
        Some(path) => Settings::from_file(path)?,
        None => Settings::discover()?,
    };

    let store_path = match args.store.clone().or_else(|| settings.store_path.clone()) {
        Some(path) => path,
        None => FileStore::default_path()?,
    };
    let store = Arc::new(
        FileStore::open(&store_path)
            .with_context(|| format!("Failed to open store {}", store_path.display()))?,
    );

    let fetcher = Arc::new(HttpFetcher::new(settings.fetch_timeout())?);
    let mut config = ConfigStore::new(store, fetcher)
        .with_alert(Arc::new(StderrAlert))
        .with_unknown_heuristics(settings.unknown_heuristics());

    // The store's debug flag only applies when no level was requested
    let log_level = args
        .log_level
        .clone()
        .or_else(|| settings.log_level.clone())
        .unwrap_or_else(|| {
            if config.use_debugging() {
                "debug".to_string()
            } else {
                "warn".to_string()
            }
        });
    setup_logging(&log_level, args.log_file)?;

    info!("snitch-config v{} using store {}", env!("CARGO_PKG_VERSION"), store_path.display());

    match args.command {
        Command::Apply { file } => {
            let document = match file {
                Some(path) => {
                    let raw = std::fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read {}", path.display()))?;
                    Some(parse_document(&raw)?)
                }
                None => None,
            };

            match config.apply_config(document).await? {
                ApplyOutcome::Disabled => eprintln!("Configuration updates are disabled"),
                ApplyOutcome::Failed(reason) => {
                    bail!("Configuration could not be loaded: {}", reason)
                }
                outcome => {
                    if let Some(document) = outcome.document() {
                        print_document(document)?;
                    }
                }
            }
        }
        Command::Export => {
            print_document(&config.export_config()?)?;
        }
        Command::Check {
            url,
            heuristic,
            ignore_type,
        } => {
            let ignore_type = ignore_type || heuristic.is_none();
            let heuristic = heuristic.unwrap_or_default();
            if config.is_in_scope(&url, &heuristic, ignore_type)? {
                println!("in scope");
            } else {
                println!("out of scope");
            }
        }
        Command::SetUrl { location } => {
            config.set_config_url(&location)?;
            info!("Configuration source set to {}", location);
        }
        Command::Enable => config.set_config_enabled(true)?,
        Command::Disable => config.set_config_enabled(false)?,
        Command::ClearCache => config.clear_cached_config()?,
    }

    Ok(())
}
