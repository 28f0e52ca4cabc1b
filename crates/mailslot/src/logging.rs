use clap::ValueEnum;
use tracing::level_filters::LevelFilter;

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Pick the effective level when `--log-level` was not given: the
/// long-running server logs its lifecycle at info, one-shot commands
/// stay quiet so their stderr carries diagnostics only.
pub fn resolve_level(explicit: Option<LogLevel>, long_running: bool) -> LogLevel {
    match explicit {
        Some(level) => level,
        None if long_running => LogLevel::Info,
        None => LogLevel::Warn,
    }
}

/// Install the global subscriber.
///
/// Logs go to stderr; stdout is reserved for message payloads (the read
/// command writes received bytes there verbatim). Text output drops
/// timestamps since one-shot commands have nothing to correlate; json
/// keeps them for serve logs shipped to a collector. Calling this more
/// than once is a no-op.
pub fn init_logging(format: LogFormat, level: LogLevel) {
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level.as_filter())
        .with_ansi(false)
        .with_target(false);

    match format {
        LogFormat::Text => {
            let _ = builder.without_time().try_init();
        }
        LogFormat::Json => {
            let _ = builder.json().try_init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_level_always_wins() {
        assert_eq!(resolve_level(Some(LogLevel::Trace), true), LogLevel::Trace);
        assert_eq!(resolve_level(Some(LogLevel::Error), false), LogLevel::Error);
    }

    #[test]
    fn server_defaults_to_info() {
        assert_eq!(resolve_level(None, true), LogLevel::Info);
    }

    #[test]
    fn one_shot_commands_default_to_warn() {
        assert_eq!(resolve_level(None, false), LogLevel::Warn);
    }
}
