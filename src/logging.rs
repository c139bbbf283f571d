//! Tracing setup: human-readable stderr output plus a plain log file.
//!
//! File records are one line each, `timestamp - LEVEL - message`.

use std::fmt;
use std::fmt::Write as _;

use chrono::Local;
use tracing::{Event, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;
use crate::error::{NovaError, Result};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "nova=info";

/// Event format for the log file.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S,%3f");
        write!(writer, "{timestamp} - {} - ", event.metadata().level())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Install the global subscriber.
///
/// Keep the returned guard alive for the life of the process; dropping it
/// flushes and stops the file writer.
///
/// # Errors
///
/// Fails if the log directory cannot be created or a global subscriber is
/// already installed.
pub fn init(config: &LoggingConfig) -> Result<WorkerGuard> {
    std::fs::create_dir_all(&config.directory)?;
    let appender = tracing_appender::rolling::never(&config.directory, &config.file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(LineFormat)
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .try_init()
        .map_err(|e| NovaError::Config(format!("cannot install logger: {e}")))?;

    Ok(guard)
}
