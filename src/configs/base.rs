use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::types::AnyResult;
use crate::configs::*;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub mixer: MixerConfig,
    #[serde(default)]
    pub pool: PoolConfig,
    pub logging: Option<LoggingConfig>,
    #[serde(default)]
    pub demo: DemoConfig,
}

impl Config {
    /// Load `path`, falling back to defaults when the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> AnyResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let config_str = std::fs::read_to_string(path)?;
        Self::from_toml(&config_str)
    }

    pub fn from_toml(config_str: &str) -> AnyResult<Self> {
        let config: Config = toml::from_str(config_str)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.mixer.sample_rate, 48_000);
        assert_eq!(config.mixer.channels, 2);
        assert_eq!(config.mixer.frame_duration_ms, 20);
        assert_eq!(config.mixer.codec, CodecKind::Opus);
        assert_eq!(config.mixer.buffering, Buffering::Ring);
        assert!(config.logging.is_none());
        assert!(config.demo.sources.is_empty());
    }

    #[test]
    fn parses_sections() {
        let config = Config::from_toml(
            r#"
            [mixer]
            sample_rate = 8000
            channels = 1
            codec = "ulaw"
            buffering = "flush"

            [pool]
            retain_ceiling = 4096

            [logging]
            level = "debug"

            [[demo.sources]]
            id = "left"
            path = "left.pcm"
            "#,
        )
        .unwrap();

        assert_eq!(config.mixer.sample_rate, 8000);
        assert_eq!(config.mixer.channels, 1);
        assert_eq!(config.mixer.frame_duration_ms, 20);
        assert_eq!(config.mixer.codec, CodecKind::Ulaw);
        assert_eq!(config.mixer.buffering, Buffering::Flush);
        assert_eq!(config.pool.retain_ceiling, 4096);
        assert_eq!(config.pool.max_entries, 64);
        assert_eq!(config.logging.unwrap().level.as_deref(), Some("debug"));
        assert_eq!(config.demo.sources.len(), 1);
        assert_eq!(config.demo.sources[0].id, "left");
    }

    #[test]
    fn missing_file_is_default() {
        let config = Config::load("does/not/exist.toml").unwrap();
        assert_eq!(config.mixer.ring_frames, 50);
    }
}
