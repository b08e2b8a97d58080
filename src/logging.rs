use std::io::{self, IsTerminal};

use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "info";

/// Installs the global subscriber. Log lines go to stderr so command output on
/// stdout stays clean; colours are only used on a terminal.
///
/// Filter precedence: `directive` (from `--log-level`), then `RUST_LOG`, then `info`.
pub fn init_logging(directive: Option<&str>) {
    let (filter, rejected) = make_filter(directive);

    let stderr_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false);

    if tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .try_init()
        .is_ok()
    {
        if let Some((directive, error)) = rejected {
            warn!(%directive, %error, "ignoring invalid log level");
        }
    }
}

fn make_filter(directive: Option<&str>) -> (EnvFilter, Option<(String, String)>) {
    let mut rejected = None;
    if let Some(directive) = directive {
        match EnvFilter::try_new(directive) {
            Ok(filter) => return (filter, None),
            Err(error) => rejected = Some((directive.to_string(), error.to_string())),
        }
    }
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    (filter, rejected)
}
