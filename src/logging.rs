//! Logging setup.
//!
//! Console output on stderr (text or JSON) plus an optional daily-rolling log
//! file. `RUST_LOG` takes precedence over the configured filter.

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::config::LoggingConfig;

const LOG_FILE_PREFIX: &str = "stargazer.log";

/// Keeps the file writer flushing until dropped. Hold it for the life of `main`.
#[must_use]
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Resolves the active filter: `env_override` (from `RUST_LOG`) wins over the configured one.
fn build_filter(env_override: Option<&str>, configured: &str) -> anyhow::Result<EnvFilter> {
    if let Some(directives) = env_override.filter(|d| !d.trim().is_empty()) {
        return EnvFilter::try_new(directives).context("Invalid RUST_LOG directives");
    }
    EnvFilter::try_new(configured).context("Invalid logging.filter directives")
}

pub fn init(config: &LoggingConfig) -> anyhow::Result<LogGuard> {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(env.as_deref(), &config.filter)?;

    let mut layers: Vec<BoxedLayer> = Vec::new();
    layers.push(if config.json {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer().with_target(false).with_writer(std::io::stderr).boxed()
    });

    let mut file_guard = None;
    if config.file {
        let dir = config.resolved_directory();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
        let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        layers.push(fmt::layer().with_ansi(false).with_writer(writer).boxed());
        file_guard = Some(guard);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    if config.file {
        tracing::debug!("Writing logs to {}", config.resolved_directory().display());
    }
    Ok(LogGuard { _file: file_guard })
}
