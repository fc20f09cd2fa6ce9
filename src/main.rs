use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use clap::Parser;

use plumber::actions::SystemActions;
use plumber::channels::{DispatchSettings, FileSource, spawn_dispatcher};
use plumber::config::{Framing, PlumberConfig};
use plumber::logging;
use plumber::rules::RuleEngine;

/// How long to wait for the dispatcher after an interrupt.
const SHUTDOWN_GRACE: std::time::Duration = std::time::Duration::from_secs(2);

#[derive(Parser)]
#[command(name = "plumber", version, about = "Route plumbing messages through a rule file")]
struct Args {
    /// Log file
    #[arg(short = 'l', value_name = "FILE")]
    log: Option<PathBuf>,

    /// Inbound channel written by plumb
    #[arg(short = 'p', value_name = "FILE")]
    plumb: Option<PathBuf>,

    /// Rules file
    #[arg(short = 'r', value_name = "FILE")]
    rules: Option<PathBuf>,

    /// Debug mode: log to stdout
    #[arg(short = 'd')]
    debug: bool,

    /// Pause between two reads of the inbound channel
    #[arg(long, value_name = "MS")]
    poll_interval_ms: Option<u64>,

    /// Maximum number of messages evaluated at once
    #[arg(long, value_name = "N")]
    max_concurrent: Option<usize>,

    /// Envelope framing on the inbound channel: blob or lines
    #[arg(long, value_name = "MODE")]
    framing: Option<Framing>,
}

impl Args {
    fn into_config(self) -> PlumberConfig {
        let mut config = PlumberConfig::from_env();
        if let Some(log) = self.log {
            config.log_file = log;
        }
        if let Some(plumb) = self.plumb {
            config.plumb_file = plumb;
        }
        if let Some(rules) = self.rules {
            config.rules_file = rules;
        }
        if let Some(ms) = self.poll_interval_ms {
            config.poll_interval = std::time::Duration::from_millis(ms);
        }
        if let Some(n) = self.max_concurrent {
            config.max_concurrent = n;
        }
        if let Some(framing) = self.framing {
            config.framing = framing;
        }
        config.debug = self.debug;
        config
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Args::parse().into_config();
    config.validate()?;

    // Select the log sink before anything else can fail.
    let _log_guard = logging::init(&config).unwrap_or_else(|e| {
        eprintln!("Plumber: can't start: {e}");
        std::process::exit(1);
    });

    eprintln!("plumber v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Rules: {}", config.rules_file.display());
    eprintln!("   Inbound: {}", config.plumb_file.display());
    if !config.debug {
        eprintln!("   Log: {}", config.log_file.display());
    }

    let source = FileSource::open(&config.plumb_file).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "Cannot open inbound channel");
        eprintln!("Plumber: can't start: {e}");
        std::process::exit(1);
    });

    let actions = Arc::new(SystemActions::from_config(&config));
    let engine = Arc::new(RuleEngine::new(config.rules_file.clone(), actions));

    let (handle, shutdown) =
        spawn_dispatcher(source, engine, DispatchSettings::from(&config));

    tokio::signal::ctrl_c().await?;
    tracing::info!("Interrupt received");
    shutdown.store(true, Ordering::Relaxed);
    // A drain can be stuck on a writer that keeps the pipe open.
    if tokio::time::timeout(SHUTDOWN_GRACE, handle).await.is_err() {
        tracing::warn!("Dispatcher did not stop in time");
    }

    Ok(())
}
