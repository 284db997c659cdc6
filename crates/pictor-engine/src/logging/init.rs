use std::sync::Once;

use log::LevelFilter;

/// Log target prefix of every record the engine emits.
pub const ENGINE_TARGET: &str = "pictor_engine";

/// How a host wants engine diagnostics shown.
///
/// Paint failures and the fallback to black and white log at `warn`.
/// Ramp negotiation and painter cache activity log at `debug`; clipped
/// paints and shadow masks at `trace`.
///
/// `env_filter` uses the `env_logger` filter syntax and wins over
/// `RUST_LOG`. Without either, records log at `level` and the engine's own
/// at `engine_level`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub level: LevelFilter,
    pub engine_level: LevelFilter,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            level: LevelFilter::Info,
            engine_level: LevelFilter::Info,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    /// Also shows ramp negotiation and painter cache activity.
    pub fn verbose() -> Self {
        Self { engine_level: LevelFilter::Debug, ..Self::default() }
    }

    /// Filter directives to install, given the value of `RUST_LOG`.
    fn directives(&self, from_env: Option<String>) -> String {
        match self.env_filter.clone().or(from_env) {
            Some(filter) => filter,
            None => format!("{},{ENGINE_TARGET}={}", self.level, self.engine_level)
                .to_ascii_lowercase(),
        }
    }
}

static INIT: Once = Once::new();

/// Installs an `env_logger` backend once.
///
/// Later calls are ignored, as is a host that already installed its own
/// logger. The engine never calls this itself.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let directives = config.directives(std::env::var("RUST_LOG").ok());
        let mut builder = env_logger::Builder::new();
        builder.parse_filters(&directives).write_style(config.write_style);
        if builder.try_init().is_ok() {
            log::debug!("logging initialized ({directives})");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── directives ────────────────────────────────────────────────────────

    #[test]
    fn default_directives_name_the_engine() {
        let d = LoggingConfig::default().directives(None);
        assert_eq!(d, "info,pictor_engine=info");
        assert_eq!(LoggingConfig::verbose().directives(None), "info,pictor_engine=debug");
    }

    #[test]
    fn explicit_filter_beats_environment() {
        let config = LoggingConfig { env_filter: Some("warn".into()), ..LoggingConfig::verbose() };
        assert_eq!(config.directives(Some("trace".into())), "warn");
        assert_eq!(LoggingConfig::default().directives(Some("trace".into())), "trace");
    }

    #[test]
    fn repeated_init_is_harmless() {
        init_logging(LoggingConfig::default());
        init_logging(LoggingConfig::verbose());
        log::debug!(target: ENGINE_TARGET, "still logging");
    }
}
