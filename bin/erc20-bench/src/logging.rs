//! Tracing subscriber setup.

use clap::{ArgAction, Args, ValueEnum};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum LogFormat {
    /// Timestamp, level, target and spans.
    #[default]
    Full,
    /// Level and message only.
    Compact,
    /// One JSON object per event.
    Json,
}

/// Logging flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub(crate) struct LogArgs {
    /// Increase logging verbosity: `-v` info, `-vv` debug, `-vvv` trace.
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub(crate) verbosity: u8,

    /// Log output format.
    #[arg(long = "log-format", value_enum, default_value_t = LogFormat::Full, global = true)]
    pub(crate) format: LogFormat,
}

impl LogArgs {
    /// Maps the verbosity count to a level filter. `RUST_LOG` overrides it.
    pub(crate) const fn level_filter(&self) -> LevelFilter {
        match self.verbosity {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }

    /// Installs the global subscriber.
    pub(crate) fn init_tracing(&self) -> eyre::Result<()> {
        let filter = EnvFilter::builder()
            .with_default_directive(self.level_filter().into())
            .from_env_lossy();
        let builder = tracing_subscriber::fmt().with_env_filter(filter);

        match self.format {
            LogFormat::Full => builder.try_init(),
            LogFormat::Compact => builder.compact().try_init(),
            LogFormat::Json => builder.json().try_init(),
        }
        .map_err(|error| eyre::eyre!("failed to initialize tracing: {error}"))
    }
}
