//! Configuration structs with sensible defaults and RON persistence.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name of the persisted configuration inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.ron";

/// Top-level HLOD configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Runtime LOD switching thresholds.
    pub lod: LodConfig,
    /// Hierarchy build settings.
    pub build: BuildConfig,
    /// Representation streaming strategy.
    pub streaming: StreamingConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Relative-height thresholds used by the cull update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LodConfig {
    /// Relative height above which the high representation is shown.
    pub lod_distance: f32,
    /// Relative height above which the low representation is shown.
    /// At or below it the node is culled.
    pub cull_distance: f32,
    /// Multiplier applied to the viewer's scale factor (higher keeps detail longer).
    pub lod_bias: f32,
}

impl LodConfig {
    /// Whether `lod_distance > cull_distance > 0`, the ordering the tri-state
    /// decision needs to behave sanely.
    pub fn is_ordered(&self) -> bool {
        self.lod_distance > self.cull_distance && self.cull_distance > 0.0
    }
}

/// Settings consumed when the hierarchy is generated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BuildConfig {
    /// Generate child HLOD nodes for sub-volumes.
    pub recursive_generation: bool,
    /// Smallest sub-volume edge that still gets its own node.
    pub min_size: f32,
    /// Objects smaller than this are left out of the low representation.
    pub threshold_size: f32,
    /// Key of the batching strategy.
    pub batcher_type: Option<String>,
    /// Key of the simplification strategy.
    pub simplifier_type: Option<String>,
    /// Polygon reduction settings.
    pub simplify: SimplifyConfig,
}

/// Polygon reduction settings handed to the simplifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimplifyConfig {
    /// Fraction of polygons kept (0.0 - 1.0).
    pub polygon_ratio: f32,
    /// Lower bound on the polygon count after simplification.
    pub min_polygon_count: u32,
    /// Upper bound on the polygon count after simplification.
    pub max_polygon_count: u32,
    /// Objects smaller than this are not simplified.
    pub threshold_size: f32,
}

/// Selection of the representation controller implementation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StreamingConfig {
    /// Registry key of the controller factory.
    pub streaming_type: String,
    /// Free-form options passed to the factory.
    pub options: BTreeMap<String, String>,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for LodConfig {
    fn default() -> Self {
        Self {
            lod_distance: 0.3,
            cull_distance: 0.01,
            lod_bias: 1.0,
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            recursive_generation: true,
            min_size: 30.0,
            threshold_size: 5.0,
            batcher_type: None,
            simplifier_type: None,
            simplify: SimplifyConfig::default(),
        }
    }
}

impl Default for SimplifyConfig {
    fn default() -> Self {
        Self {
            polygon_ratio: 0.8,
            min_polygon_count: 10,
            max_polygon_count: 500,
            threshold_size: 5.0,
        }
    }
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            streaming_type: "resident".to_string(),
            options: BTreeMap::new(),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Platform config directory for HLOD settings, e.g. `~/.config/hlod` on Linux.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("hlod"))
    }

    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            let config = Self::read(&config_path)?;
            log::info!("Loaded config from {}", config_path.display());
            config.warn_if_unordered();
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = Self::read(&config_dir.join(CONFIG_FILE_NAME))?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            new_config.warn_if_unordered();
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        ron::from_str(&contents).map_err(ConfigError::ParseError)
    }

    /// Warn if the LOD thresholds are not ordered. Returns whether they are.
    ///
    /// Not rejected: an unordered pair still yields a decision, just not a useful one.
    pub fn warn_if_unordered(&self) -> bool {
        let ordered = self.lod.is_ordered();
        if !ordered {
            log::warn!(
                "LOD thresholds are not ordered (lod_distance={}, cull_distance={}); \
                 expected lod_distance > cull_distance > 0",
                self.lod.lod_distance,
                self.lod.cull_distance
            );
        }
        ordered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("lod_distance"));
        assert!(ron_str.contains("simplify"));
        assert!(ron_str.contains("streaming_type: \"resident\""));
    }

    #[test]
    fn test_defaults_match_component_defaults() {
        let config = Config::default();
        assert_eq!(config.lod.cull_distance, 0.01);
        assert_eq!(config.build.min_size, 30.0);
        assert_eq!(config.build.simplify.max_polygon_count, 500);
        assert!(config.build.recursive_generation);
        assert!(config.build.batcher_type.is_none());
        assert!(config.lod.is_ordered());
    }

    #[test]
    fn test_unordered_thresholds_detected() {
        let lod = LodConfig {
            lod_distance: 0.01,
            cull_distance: 0.3,
            lod_bias: 1.0,
        };
        assert!(!lod.is_ordered());

        let zero_cull = LodConfig {
            cull_distance: 0.0,
            ..LodConfig::default()
        };
        assert!(!zero_cull.is_ordered());
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(lod: (lod_distance: 0.5))";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.lod.lod_distance, 0.5);
        assert_eq!(config.lod.cull_distance, 0.01);
        assert_eq!(config.build, BuildConfig::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_strategy_keys_persist() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.build.batcher_type = Some("simple".to_string());
        config.streaming.streaming_type = "delayed".to_string();
        config
            .streaming
            .options
            .insert("latency_frames".to_string(), "4".to_string());

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join(CONFIG_FILE_NAME).exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.lod.lod_distance = 0.6;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert_eq!(result.map(|c| c.lod.lod_distance), Some(0.6));
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        assert!(config.reload(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_default_dir_is_namespaced() {
        if let Some(dir) = Config::default_dir() {
            assert!(dir.ends_with("hlod"));
        }
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "{{not valid}}").unwrap();
        let result = Config::load_or_create(dir.path());
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}
