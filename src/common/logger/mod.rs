use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::configs::Config;

/// Build the filter directive string from the logging section.
fn filter_directives(config: &Config) -> String {
    let log_level = config
        .logging
        .as_ref()
        .and_then(|l| l.level.as_deref())
        .unwrap_or("info");

    let filters = config
        .logging
        .as_ref()
        .and_then(|l| l.filters.as_deref())
        .unwrap_or("");

    if filters.is_empty() {
        log_level.to_string()
    } else {
        format!("{},{}", log_level, filters)
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the config file.
pub fn init(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(config)));

    let stdout_layer = fmt::layer().with_target(true).with_ansi(true);

    // A second init (tests, embedding apps) keeps the first subscriber.
    if let Err(e) = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .try_init()
    {
        tracing::debug!("keeping the installed subscriber: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configs::LoggingConfig;

    #[test]
    fn defaults_to_info() {
        assert_eq!(filter_directives(&Config::default()), "info");
    }

    #[test]
    fn appends_filters() {
        let config = Config {
            logging: Some(LoggingConfig {
                level: Some("debug".into()),
                filters: Some("avmuxer::audio::mix=trace".into()),
            }),
            ..Config::default()
        };
        assert_eq!(
            filter_directives(&config),
            "debug,avmuxer::audio::mix=trace"
        );
    }

    #[test]
    fn repeated_init_keeps_first_subscriber() {
        let config = Config::default();
        init(&config);
        init(&config);
        tracing::info!("still logging after a second init");
    }
}
