//! # Logging
//!
//! One `tracing` subscriber for the `warden` binary. The vault crates log
//! under their own targets:
//!
//! | Target | What shows up |
//! |---|---|
//! | `warden` | subcommand progress, simulation steps |
//! | `warden_contracts` | init, withdrawals, sweeps, denied calls, smuggling warnings |
//! | `warden_protocol` | ledger transfers (`debug`), dynamic payload reads (`trace`) |
//!
//! Output goes to stderr. Stdout carries only command output (hex, JSON
//! reports) so it can be piped into other tools.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when neither `RUST_LOG` nor `--log-level` says otherwise.
pub const DEFAULT_FILTER: &str = "warden=info,warden_contracts=info,warden_protocol=warn";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines with target and source location.
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// `"json"` (any case) selects JSON; everything else is pretty.
    pub fn from_str_lossy(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Builds the filter: `RUST_LOG` if set and valid, otherwise `level`.
/// A `level` that does not parse falls back to [`DEFAULT_FILTER`].
fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber. Call once, first thing in `main()`.
///
/// `level` comes from `--log-level` / `WARDEN_LOG`, e.g.
/// `warden_contracts=debug` to see every permission grant, or
/// `warden_protocol=trace` to watch offsets being followed.
pub fn init_logging(level: &str, format: LogFormat) {
    let filter = build_filter(level);

    match format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(std::io::stderr).with_target(true))
                .init();
        }
    }

    tracing::debug!(?format, "warden logging ready");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parsing_is_lossy() {
        assert_eq!(LogFormat::from_str_lossy("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::from_str_lossy("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str_lossy("xml"), LogFormat::Pretty);
    }

    #[test]
    fn default_filter_names_workspace_crates() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
        for target in ["warden=", "warden_contracts=", "warden_protocol="] {
            assert!(DEFAULT_FILTER.contains(target), "{target} missing");
        }
    }
}
