//! Plugin loader command-line driver
//!
//! Loads one plugin library, instantiates its facade and prints the facade's
//! name and version.
//!
//! # Examples
//!
//! ```bash
//! # Load by path
//! plugin-loader ./target/debug/libexample_plugin.so
//!
//! # Machine-readable output
//! plugin-loader --json ./target/debug/libexample_plugin.so
//!
//! # Plugin exporting non-default factory names
//! plugin-loader --create-symbol make_facade --destroy-symbol drop_facade ./libcustom.so
//! ```

use anyhow::Context;
use clap::Parser;
use plugin_loader::{LoaderConfig, Plugin, PluginLoader, SymbolBinding};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Load a native plugin library and report its facade
#[derive(Parser, Debug)]
#[command(name = "plugin-loader")]
#[command(version = plugin_loader::VERSION)]
#[command(about = "Load a native plugin library and report its name and version", long_about = None)]
struct Cli {
    /// Path or name of the plugin library
    library: PathBuf,

    /// TOML configuration file
    #[arg(long, env = "PLUGIN_LOADER_CONFIG")]
    config: Option<PathBuf>,

    /// Exported name of the create-facade function
    #[arg(long)]
    create_symbol: Option<String>,

    /// Exported name of the destroy-facade function
    #[arg(long)]
    destroy_symbol: Option<String>,

    /// Symbol binding mode (lazy, now)
    #[arg(long)]
    binding: Option<SymbolBinding>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Log directory path (logs go to stderr only when unset)
    #[arg(long, env = "PLUGIN_LOADER_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", env = "PLUGIN_LOADER_LOG")]
    log_level: String,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // The guard flushes the file appender when dropped.
    let _guard = match setup_logging(&cli) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to set up logging: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            eprintln!("Configuration error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };
    debug!(?config, "Resolved loader configuration");

    let mut loader: PluginLoader<dyn Plugin> =
        PluginLoader::with_config(cli.library.clone(), config);
    if report(&mut loader, cli.json) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Setup logging to stderr and, optionally, a daily rolling file
fn setup_logging(cli: &Cli) -> anyhow::Result<Option<WorkerGuard>> {
    let log_level = cli
        .log_level
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::WARN);

    let (file_layer, guard) = match &cli.log_dir {
        Some(log_dir) => {
            std::fs::create_dir_all(log_dir)
                .with_context(|| format!("creating log directory {}", log_dir.display()))?;
            let file_appender =
                RollingFileAppender::new(Rotation::DAILY, log_dir, "plugin-loader.log");
            let (writer, guard) = tracing_appender::non_blocking(file_appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(!cli.no_color),
        )
        .with(file_layer)
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .init();

    Ok(guard)
}

/// Defaults, then config file, then environment, then command-line flags
fn resolve_config(cli: &Cli) -> anyhow::Result<LoaderConfig> {
    let config = match &cli.config {
        Some(path) => LoaderConfig::from_file(path)?,
        None => LoaderConfig::default(),
    };
    let mut config = config.merge_env()?;

    if let Some(create) = &cli.create_symbol {
        config.symbols.create = create.clone();
    }
    if let Some(destroy) = &cli.destroy_symbol {
        config.symbols.destroy = destroy.clone();
    }
    if let Some(binding) = cli.binding {
        config.binding = binding;
    }

    Ok(config)
}

/// Load the plugin and print the outcome. Returns true on success.
fn report(loader: &mut PluginLoader<dyn Plugin>, json: bool) -> bool {
    let library = loader.name().display().to_string();

    let outcome = loader
        .load()
        .and_then(|()| loader.instance().map(|p| p.map(|plugin| plugin.metadata())));
    let outcome = match outcome {
        Ok(Some(metadata)) => Ok(metadata),
        Ok(None) => Err(loader.error_msg().to_string()),
        Err(e) => Err(e.to_string()),
    };

    match outcome {
        Ok(metadata) => {
            info!(library = %library, name = %metadata.name, version = %metadata.version, "Plugin loaded");
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "library": library,
                        "name": metadata.name,
                        "version": metadata.version.to_string(),
                    })
                );
            } else {
                println!("Plugin name    = {}", metadata.name);
                println!("Plugin version = {}", metadata.version);
            }
            if let Err(e) = loader.unload() {
                error!(library = %library, error = %e, "Failed to unload plugin");
            }
            true
        }
        Err(reason) => {
            error!(library = %library, reason = %reason, "Failed to load plugin");
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "library": library,
                        "error": reason,
                    })
                );
            } else {
                println!("Failed to load plugin = {}", library);
                println!("Reason = {}", reason);
            }
            false
        }
    }
}
