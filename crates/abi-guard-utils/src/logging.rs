//! Structured logging setup, shared by every `abi-guard` subcommand.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}' (expected text|json)")),
        }
    }
}

/// Initialize the global tracing subscriber.
///
/// `verbose` raises the default filter from `info` to `debug` unless
/// `RUST_LOG` is already set, in which case the environment wins.
pub fn init_tracing(verbose: bool, format: LogFormat) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "abi_guard=debug,warn"
        } else {
            "abi_guard=info,warn"
        })
    });

    let registry = tracing_subscriber::registry().with(env_filter);
    match format {
        LogFormat::Text => registry
            .with(fmt::layer().with_target(false).with_level(true))
            .try_init()?,
        LogFormat::Json => registry.with(fmt::layer().json().with_target(true)).try_init()?,
    }
    Ok(())
}
