//! This module provides logging and diagnostics hooks for lacuna.
//!
//! Library code talks only to the `log` facade. A binary or test harness that
//! wants to see the output calls [`init_logging`] once, which installs an
//! `env_logger` backend configured from [`LoggingConfig`].
//!
//! The `log_metric!` macro emits one structured key-value line per call at
//! `debug` level, and only in debug builds: the `#[cfg(debug_assertions)]`
//! gate compiles the call sites out of release builds entirely.

use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Once;

use crate::config::LoggingConfig;
use crate::error::Result;

/// Logs a structured key-value metric line, only in debug builds.
///
/// # Example
/// ```
/// use lacuna::log_metric;
/// let len = 4;
/// log_metric!("event"="make_collection", "strategy"="dual_array", "len"=&len);
/// ```
#[macro_export]
macro_rules! log_metric {
    ($($key:literal = $value:expr),+ $(,)?) => {
        #[cfg(debug_assertions)]
        {
            let mut parts = Vec::new();
            $(
                parts.push(format!("\"{}\": \"{}\"", $key, $value));
            )+
            log::debug!("LACUNA_METRIC: {{ {} }}", parts.join(", "));
        }
    };
}

static INIT_LOGGER: Once = Once::new();

/// Installs the global logger. Only the first call has any effect; later
/// calls (and a logger installed by someone else) are left alone.
///
/// # Errors
/// `Io` when `log_file` is set and cannot be opened for appending.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    if INIT_LOGGER.is_completed() {
        return Ok(());
    }

    let file = match &config.log_file {
        Some(path) => Some(OpenOptions::new().append(true).create(true).open(path)?),
        None => None,
    };

    INIT_LOGGER.call_once(|| {
        let mut builder = env_logger::Builder::new();

        builder.is_test(false);
        builder.parse_filters(&config.level);
        builder.parse_env("RUST_LOG");

        builder.format(|buf, record| {
            writeln!(buf, "[{}] {}", record.level(), record.args())?;
            buf.flush()?;
            Ok(())
        });

        if let Some(file) = file {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }

        let _ = builder.try_init();
    });
    Ok(())
}
