// Logging setup, driven by a context built once in `main`
use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{
    EnvFilter, fmt, prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt,
};

/// Where and how verbosely a process logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogContext {
    /// Base name of the log file.
    pub name: String,
    /// Log at debug level instead of info.
    pub debug: bool,
    /// Log to the console instead of a file.
    pub verbose: bool,
    pub log_dir: PathBuf,
}

impl LogContext {
    pub fn new(name: &str, debug: bool, verbose: bool, log_dir: PathBuf) -> Self {
        LogContext {
            name: name.to_string(),
            debug,
            verbose,
            log_dir,
        }
    }

    pub fn level(&self) -> &'static str {
        if self.debug { "debug" } else { "info" }
    }

    pub fn log_file(&self) -> PathBuf {
        let file_name = if self.debug {
            format!("{}.debug.log", self.name)
        } else {
            format!("{}.log", self.name)
        };
        self.log_dir.join(file_name)
    }
}

pub fn init_logging(ctx: &LogContext) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(ctx.level()));
    let registry = tracing_subscriber::registry().with(filter);

    if ctx.verbose {
        registry
            .with(fmt::layer().pretty().without_time())
            .try_init()
            .context("Failed to install console logger")?;
        return Ok(());
    }

    fs::create_dir_all(&ctx.log_dir)
        .with_context(|| format!("Failed to create log directory: {}", ctx.log_dir.display()))?;
    let path = ctx.log_file();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    registry
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_thread_ids(true)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .context("Failed to install file logger")?;
    Ok(())
}
