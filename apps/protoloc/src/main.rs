//! protoloc - Locate protoc and its plugins for a build
//!
//! This is the CLI front end: it loads configuration, builds a resolution
//! engine for the running host, and renders what the engine resolved.

mod cli;
mod display;
mod error;
mod events;
mod logging;
mod setup;

use crate::cli::{Cli, Commands};
use crate::display::{CommandOutput, OutputRenderer};
use crate::error::CliError;
use crate::events::EventHandler;
use clap::Parser;
use protoloc_config::{load_descriptors, Config};
use protoloc_events::EventReceiver;
use protoloc_platform::HostPlatform;
use protoloc_resolver::ResolutionEngine;
use protoloc_types::{Coordinate, ExecutableSpecification, OutputFormat};
use std::path::PathBuf;
use std::process;
use tokio::select;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Parse command line arguments first to check for JSON mode
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    init_tracing(json_mode, cli.global.debug);

    if let Err(e) = run(cli).await {
        error!("Application error: {}", e);
        if !json_mode {
            eprintln!("Error: {e}");
        }
        process::exit(1);
    }
}

/// Main application logic
async fn run(cli: Cli) -> Result<(), CliError> {
    info!("Starting protoloc v{}", env!("CARGO_PKG_VERSION"));

    // 1. File config (or defaults), 2. environment, 3. CLI flags
    let mut config = Config::load_or_default(cli.global.config.as_deref()).await?;
    config.merge_env()?;
    apply_cli_config(&mut config, &cli.global)?;

    let json_output = cli.global.json || config.general.default_output == OutputFormat::Json;

    let (event_sender, event_receiver) = protoloc_events::channel();
    let engine = setup::build_engine(&config, &event_sender)?;
    drop(event_sender);

    let renderer = OutputRenderer::new(json_output);
    let mut event_handler = EventHandler::new(json_output);

    let output =
        execute_command_with_events(cli.command, &engine, event_receiver, &mut event_handler)
            .await?;

    renderer.render_result(&output)?;

    if let CommandOutput::Toolchain(toolchain) = &output {
        let failed = toolchain.failed();
        if failed > 0 {
            return Err(CliError::Incomplete { failed });
        }
    }

    info!("Command completed successfully");
    Ok(())
}

/// Execute command with concurrent event handling
async fn execute_command_with_events(
    command: Commands,
    engine: &ResolutionEngine,
    mut event_receiver: EventReceiver,
    event_handler: &mut EventHandler,
) -> Result<CommandOutput, CliError> {
    let mut command_future = Box::pin(execute_command(command, engine));

    loop {
        select! {
            result = &mut command_future => {
                // Drain any remaining events
                while let Ok(event) = event_receiver.try_recv() {
                    event_handler.handle_event(event);
                }
                return result;
            }

            event = event_receiver.recv() => {
                match event {
                    Some(event) => event_handler.handle_event(event),
                    None => { /* Channel closed: keep waiting for command to finish */ }
                }
            }
        }
    }
}

/// Execute the specified command
async fn execute_command(
    command: Commands,
    engine: &ResolutionEngine,
) -> Result<CommandOutput, CliError> {
    match command {
        Commands::Resolve {
            descriptors,
            fail_fast,
        } => {
            let descriptors = load_descriptors(&descriptors).await?;
            let toolchain = engine.resolve_toolchain(&descriptors).await?;
            if fail_fast {
                if let Err(e) = toolchain.clone().into_result() {
                    return Err(e.into());
                }
            }
            Ok(CommandOutput::Toolchain(toolchain))
        }

        Commands::Which { name } => {
            let resolved = engine
                .resolve(&ExecutableSpecification::path_search(name))
                .await?;
            Ok(CommandOutput::Executable(resolved))
        }

        Commands::Fetch {
            coordinate,
            classifier,
        } => {
            let mut coordinate: Coordinate = coordinate
                .parse()
                .map_err(|e| CliError::InvalidArguments(format!("{e}")))?;
            if let Some(classifier) = classifier {
                coordinate = coordinate.with_classifier(classifier);
            }
            let resolved = engine
                .resolve(&ExecutableSpecification::coordinate(coordinate))
                .await?;
            Ok(CommandOutput::Executable(resolved))
        }

        Commands::Platform => {
            let host = HostPlatform::current();
            Ok(CommandOutput::Platform {
                host: host.to_string(),
                classifier: host.classifier().map_err(|e| e.to_string()),
            })
        }
    }
}

/// Apply CLI configuration overrides (highest precedence)
fn apply_cli_config(config: &mut Config, global: &cli::GlobalArgs) -> Result<(), CliError> {
    if global.offline {
        config.general.offline = true;
    }
    if let Some(concurrency) = global.concurrency {
        config.general.concurrency = concurrency;
    }
    if let Some(local_repository) = &global.local_repository {
        config.paths.local_repository = Some(local_repository.clone());
    }
    config.validate()?;
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("protoloc")
        .join("logs")
}

/// Initialize tracing/logging
fn init_tracing(json_mode: bool, debug_enabled_flag: bool) {
    let debug_enabled = std::env::var("RUST_LOG").is_ok() || debug_enabled_flag;
    let debug_filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new(
                "info,protoloc=debug,protoloc_resolver=debug,protoloc_fetch=debug",
            )
        })
    };

    if debug_enabled {
        // Debug mode: structured JSON logs to file
        let log_dir = log_dir();
        if let Err(e) = std::fs::create_dir_all(&log_dir) {
            if !json_mode {
                eprintln!("Warning: Failed to create log directory: {e}");
            }
        }

        let log_file = log_dir.join(format!(
            "protoloc-{}.log",
            chrono::Utc::now().format("%Y%m%d-%H%M%S")
        ));

        match std::fs::File::create(&log_file) {
            Ok(file) => {
                tracing_subscriber::fmt()
                    .json()
                    .with_writer(file)
                    .with_env_filter(debug_filter())
                    .init();
                if !json_mode {
                    eprintln!("Debug logging enabled: {}", log_file.display());
                }
                return;
            }
            Err(e) => {
                if !json_mode {
                    eprintln!("Warning: Failed to create log file: {e}");
                }
            }
        }
    }

    if json_mode {
        // Keep stdout clean for the JSON document
        tracing_subscriber::fmt()
            .with_writer(std::io::sink)
            .with_env_filter("off")
            .init();
    } else {
        // Normal mode: minimal logging to stderr
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .init();
    }
}
