use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use faultline::config::{default_config_path, SettingsStore};
use faultline::error::{ErrorHandler, HandleOptions, Severity};
use faultline::ui::ConsoleNotifier;
use faultline::worker::{self, WorkerSignal};
use faultline::{AppError, SafeFileIo, Settings};
use std::io::{self, IsTerminal, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "faultline")]
#[command(about = "Fault-tolerant file operations with centralized error reporting")]
#[command(version = "1.0.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Settings file (JSON)
    #[arg(long, global = true, env = "FAULTLINE_CONFIG")]
    config: Option<PathBuf>,

    /// Never show notifications
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Write the handled-error history to this file before exiting
    #[arg(long, global = true)]
    export_errors: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a file's contents
    Read {
        path: PathBuf,

        /// Print the raw byte count instead of the text
        #[arg(long)]
        bytes: bool,
    },

    /// Replace a file's contents (reads stdin when no content is given)
    Write {
        path: PathBuf,

        content: Option<String>,
    },

    /// Remove files; missing files count as removed
    Remove {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Create a directory and its parents
    Mkdir { path: PathBuf },

    /// Allocate a temp file and print its path
    Temp {
        /// File name prefix (default from settings)
        #[arg(long)]
        prefix: Option<String>,

        /// File name suffix (default from settings)
        #[arg(long)]
        suffix: Option<String>,
    },
}

fn init_logging(debug: bool) -> Result<()> {
    let level = if debug { "faultline=debug" } else { "faultline=warn" };
    let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(
        level
            .parse()
            .map_err(|e| AppError::Configuration(format!("Invalid log directive: {}", e)))?,
    );

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    Ok(())
}

/// Run one command against the filesystem, emitting progress lines
fn execute(
    command: Commands,
    safe: &SafeFileIo,
    settings: &Settings,
    ctx: &worker::WorkerContext<String>,
) -> Result<String> {
    match command {
        Commands::Read { path, bytes } => {
            if bytes {
                let content = safe
                    .safe_read_bytes(&path)
                    .ok_or_else(|| failed("read", &path))?;
                Ok(format!("{} bytes", content.len()))
            } else {
                safe.safe_read(&path).ok_or_else(|| failed("read", &path))
            }
        }
        Commands::Write { path, content } => {
            let content = match content {
                Some(content) => content,
                None => {
                    let mut buf = String::new();
                    io::stdin()
                        .read_to_string(&mut buf)
                        .context("reading content from stdin")?;
                    buf
                }
            };
            if !safe.safe_write(&path, &content) {
                return Err(failed("write", &path));
            }
            Ok(format!("wrote {} bytes to {}", content.len(), path.display()))
        }
        Commands::Remove { paths } => {
            let total = paths.len();
            for (i, path) in paths.iter().enumerate() {
                if !safe.safe_remove(path) {
                    return Err(failed("remove", path));
                }
                ctx.update(format!("[{}/{}] removed {}", i + 1, total, path.display()));
            }
            Ok(format!("removed {} file(s)", total))
        }
        Commands::Mkdir { path } => {
            if !safe.ensure_directory(&path) {
                return Err(failed("create directory", &path));
            }
            Ok(path.display().to_string())
        }
        Commands::Temp { prefix, suffix } => {
            let prefix = prefix.unwrap_or_else(|| settings.io.temp_prefix.clone());
            let suffix = suffix.unwrap_or_else(|| settings.io.temp_suffix.clone());
            let path = safe.create_temp_file(&suffix, &prefix)?;
            Ok(path.display().to_string())
        }
    }
}

fn failed(operation: &str, path: &std::path::Path) -> anyhow::Error {
    io::Error::new(
        io::ErrorKind::Other,
        format!("cannot {} {}", operation, path.display()),
    )
    .into()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug)?;

    let settings = Settings::load_or_default(cli.config.as_deref())
        .context("loading settings")?;
    tracing::debug!(?settings, "Settings loaded");

    let notifier = Arc::new(ConsoleNotifier::new(io::stdin().is_terminal()));
    let mut handler = ErrorHandler::new(&settings.handler).with_notifier(notifier);
    if let Some(path) = cli.config.clone().or_else(default_config_path) {
        handler = handler.with_state_store(Arc::new(SettingsStore::new(settings.clone(), path)));
    }
    if cli.quiet {
        handler.set_suppress_dialogs(true);
    }
    let handler = Arc::new(handler);

    let safe = SafeFileIo::new(settings.io.retry_policy());
    let task_settings = settings.clone();
    let command = cli.command;
    let mut handle = worker::spawn(Arc::clone(&handler), move |ctx| {
        execute(command, &safe, &task_settings, ctx)
    });

    let mut succeeded = false;
    while let Some(signal) = handle.next_signal().await {
        match signal {
            WorkerSignal::Updated(progress) => eprintln!("{}", progress),
            WorkerSignal::Finished(output) => {
                let mut stdout = io::stdout().lock();
                writeln!(stdout, "{}", output)?;
                succeeded = true;
            }
            WorkerSignal::Failed(message) => {
                if !cli.quiet {
                    eprintln!("Error: {}", message);
                }
            }
        }
    }

    if let Some(path) = &cli.export_errors {
        if !handler.export_history(path) {
            handler.handle(
                &anyhow::anyhow!("cannot export error history to {}", path.display()),
                HandleOptions::new(Severity::Warning)
                    .with_context("Error history export")
                    .with_user_message("Could not export the error history"),
            );
        }
    }

    if !succeeded {
        std::process::exit(1);
    }
    Ok(())
}
