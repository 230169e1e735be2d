use crate::model::SessionLimits;
use crate::task::TaskDelay;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Host tick period
    pub tick_rate_ms: u64,
    /// Quiet ticks before a create flow falls back to hotswap
    pub hotswap_delay_ticks: u32,
    /// Wall-clock hotswap delay; overrides `hotswap_delay_ticks` when set
    pub hotswap_delay_ms: Option<u64>,
    /// Columns per display segment
    pub display_segment_width: usize,
    /// YAML session to start with instead of the built-in demo
    pub session_file: Option<PathBuf>,
    pub track_limit: usize,
    pub return_track_limit: usize,
    pub scene_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        let limits = SessionLimits::default();
        Self {
            tick_rate_ms: 100,
            hotswap_delay_ticks: 10,
            hotswap_delay_ms: None,
            display_segment_width: 17,
            session_file: None,
            track_limit: limits.max_tracks,
            return_track_limit: limits.max_return_tracks,
            scene_limit: limits.max_scenes,
        }
    }
}

impl Config {
    pub fn config_dir() -> Option<PathBuf> {
        let home = env::var("HOME").ok()?;
        Some(PathBuf::from(home).join(".push-surface"))
    }

    fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.json"))
    }

    pub fn is_saved() -> bool {
        Self::config_path().is_some_and(|path| path.exists())
    }

    /// Saved config, or defaults when there is none or it cannot be read
    pub fn load() -> Config {
        let Some(config_path) = Self::config_path() else {
            return Config::default();
        };
        if !config_path.exists() {
            return Config::default();
        }

        match fs::read_to_string(&config_path)
            .map_err(anyhow::Error::from)
            .and_then(|contents| Self::from_json(&contents))
        {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %config_path.display(), "Ignoring config: {:#}", err);
                Config::default()
            }
        }
    }

    pub fn from_json(contents: &str) -> anyhow::Result<Config> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Save the config to disk
    pub fn save(&self) -> anyhow::Result<()> {
        let config_dir = Self::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)?;
        }

        let config_path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config path"))?;

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(&config_path, contents)?;

        Ok(())
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms.max(1))
    }

    pub fn hotswap_delay(&self) -> TaskDelay {
        match self.hotswap_delay_ms {
            Some(ms) => TaskDelay::Duration(Duration::from_millis(ms)),
            None => TaskDelay::Ticks(self.hotswap_delay_ticks),
        }
    }

    pub fn limits(&self) -> SessionLimits {
        SessionLimits {
            max_tracks: self.track_limit,
            max_return_tracks: self.return_track_limit,
            max_scenes: self.scene_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_take_defaults() {
        let config = Config::from_json(r#"{ "hotswap_delay_ticks": 4 }"#).unwrap();
        assert_eq!(config.hotswap_delay_ticks, 4);
        assert_eq!(config.tick_rate_ms, 100);
        assert_eq!(config.session_file, None);
        assert_eq!(config.limits().max_scenes, 128);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = Config {
            session_file: Some(PathBuf::from("/tmp/live.yaml")),
            track_limit: 8,
            ..Config::default()
        };
        let json = serde_json::to_string_pretty(&config).unwrap();
        assert_eq!(Config::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(Config::from_json("{ tick_rate_ms: }").is_err());
    }

    #[test]
    fn test_hotswap_delay_prefers_wall_clock() {
        let mut config = Config::from_json(r#"{ "hotswap_delay_ticks": 4 }"#).unwrap();
        assert_eq!(config.hotswap_delay(), TaskDelay::Ticks(4));

        config.hotswap_delay_ms = Some(750);
        assert_eq!(
            config.hotswap_delay(),
            TaskDelay::Duration(Duration::from_millis(750))
        );
    }

    #[test]
    fn test_zero_tick_rate_is_clamped() {
        let config = Config {
            tick_rate_ms: 0,
            ..Config::default()
        };
        assert_eq!(config.tick_rate(), Duration::from_millis(1));
    }
}
