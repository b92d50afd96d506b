//! Structured logging for the pipeline.
//!
//! `RUST_LOG` controls the filter (default keeps this crate at info and
//! everything else quiet); `RUST_LOG_FORMAT=json` switches the stderr output
//! to JSON, which is what the ledger-watching automation consumes.

use tracing_subscriber::EnvFilter;

/// Pipeline stages log at info; the off-by-default floor keeps dependency
/// noise out of interactive runs.
const DEFAULT_DIRECTIVES: &str = "warn,tunescribe=info";

/// Output shape the subscriber was installed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Install the global subscriber and report which format was chosen.
///
/// Call once at startup; repeated calls are no-ops.
pub fn init() -> LogFormat {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));
    let format = format_from(std::env::var("RUST_LOG_FORMAT").ok().as_deref());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    match format {
        LogFormat::Json => {
            let _ = subscriber.json().try_init();
        }
        LogFormat::Text => {
            let _ = subscriber.try_init();
        }
    }
    format
}

fn format_from(value: Option<&str>) -> LogFormat {
    match value {
        Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
        _ => LogFormat::Text,
    }
}
