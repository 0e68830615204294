use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::ConfigError;
use crate::types::Millis;

/// Parameters of the neural network background.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub node_count: usize,
    /// Degree cap applied when building connections.
    pub max_connections: usize,
    /// Pulse progress gained per baseline frame.
    pub pulse_speed: f32,
    /// Peak alpha of a freshly triggered pulse.
    pub pulse_intensity: f32,
    /// Pulse trigger probability per baseline frame.
    pub pulse_rate: f32,
    pub connection_distance: f32,
    /// Smallest node radius; each node adds up to 2px on top.
    pub node_radius: f32,
    /// Glow extent in pixels at `glow == 1`.
    pub glow_intensity: f32,
    pub pulse_colors: Vec<Color>,
    pub base_color: Color,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            node_count: 25,
            max_connections: 3,
            pulse_speed: 0.02,
            pulse_intensity: 0.8,
            pulse_rate: 0.02,
            connection_distance: 150.0,
            node_radius: 2.0,
            glow_intensity: 15.0,
            pulse_colors: vec![
                Color::rgb(0x38, 0xbd, 0xf8),
                Color::rgb(0x4a, 0xde, 0x80),
                Color::rgb(0xfb, 0xbf, 0x24),
                Color::rgb(0x81, 0x8c, 0xf8),
                Color::rgb(0xf4, 0x72, 0xb6),
            ],
            base_color: Color::rgba(56, 189, 248, 77),
        }
    }
}

/// Parameters of the memory stream panel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Milliseconds per revealed character.
    pub speed: Millis,
    /// Milliseconds between the end of one item and the start of the next.
    pub interval: Millis,
    /// HTTP(S) URL or filesystem path of the JSON batch.
    pub data_source: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            speed: 50,
            interval: 5000,
            data_source: "memories.json".to_owned(),
        }
    }
}

impl FeedConfig {
    /// Replaces a zero `speed` or `interval` with its default. A zero delay
    /// would let the reveal loop reschedule itself at the same instant.
    pub fn normalized(self) -> Self {
        let defaults = Self::default();
        Self {
            speed: if self.speed == 0 { defaults.speed } else { self.speed },
            interval: if self.interval == 0 {
                defaults.interval
            } else {
                self.interval
            },
            ..self
        }
    }
}

/// Top-level config file layout.
///
/// ```yaml
/// feed:
///   speed: 40
///   data_source: https://example.org/memories.json
/// network:
///   node_count: 40
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    pub feed: FeedConfig,
    pub network: NetworkConfig,
}

impl PortalConfig {
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg = Self::from_yaml_str(&text)?;
        log::info!("loaded config from {}", path.display());
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let cfg = PortalConfig::from_yaml_str(
            "feed:\n  speed: 20\nnetwork:\n  node_count: 40\n  base_color: \"#ffffff\"\n",
        )
        .unwrap();

        assert_eq!(cfg.feed.speed, 20);
        assert_eq!(cfg.feed.interval, 5000);
        assert_eq!(cfg.feed.data_source, "memories.json");
        assert_eq!(cfg.network.node_count, 40);
        assert_eq!(cfg.network.max_connections, 3);
        assert_eq!(cfg.network.base_color, Color::WHITE);
        assert_eq!(cfg.network.pulse_colors.len(), 5);
    }

    #[test]
    fn empty_document_is_all_defaults() {
        let cfg = PortalConfig::from_yaml_str("{}").unwrap();
        assert_eq!(cfg, PortalConfig::default());
    }

    #[test]
    fn zero_feed_timings_fall_back_to_defaults() {
        let cfg = PortalConfig::from_yaml_str("feed:\n  speed: 0\n  interval: 0\n").unwrap();
        let feed = cfg.feed.normalized();
        assert_eq!(feed.speed, 50);
        assert_eq!(feed.interval, 5000);

        let custom = FeedConfig {
            speed: 20,
            interval: 1000,
            ..FeedConfig::default()
        };
        assert_eq!(custom.clone().normalized(), custom);
    }

    #[test]
    fn bad_color_is_rejected() {
        let err = PortalConfig::from_yaml_str("network:\n  pulse_colors: [\"teal\"]\n");
        assert!(matches!(err, Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = PortalConfig::load(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.yaml"));
    }
}
