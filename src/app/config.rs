//! Configuration Management
//!
//! A single settings object the host may override before (re)initializing
//! the engine. TOML on disk; the host-facing option names from the
//! embedding API (`hoverDelay`, `scrollBackWindow`, …) are accepted as
//! aliases of the canonical snake_case fields.

use crate::arbiter::ArbiterConfig;
use crate::detect::cursor_hesitation::CursorHesitationConfig;
use crate::detect::exit_intent::ExitIntentConfig;
use crate::detect::hover_dwell::HoverDwellConfig;
use crate::detect::scroll_dynamics::ScrollDynamicsConfig;
use crate::time::Duration;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    /// Sampling floors
    pub sampler: SamplerSettings,
    /// Hover-dwell detection
    pub hover: HoverSettings,
    /// Scroll dynamics detection
    pub scroll: ScrollSettings,
    /// Cursor hesitation detection
    pub cursor: CursorSettings,
    /// Exit intent detection
    pub exit: ExitSettings,
    /// Augmentation service
    pub augment: AugmentSettings,
    /// Telemetry delivery
    pub telemetry: TelemetrySettings,
}

/// Sampler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerSettings {
    /// Minimum interval between accepted pointer-move samples (ms)
    pub pointer_interval_ms: u64,
    /// Minimum interval between accepted scroll samples (ms)
    pub scroll_interval_ms: u64,
}

/// Hover-dwell configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HoverSettings {
    /// Continuous hover required before firing (ms)
    #[serde(alias = "hoverDelay")]
    pub delay_ms: u64,
    /// Highlight auto-clear delay (ms); 0 persists until dismissal
    #[serde(alias = "hoverPersist")]
    pub persist_ms: u64,
    /// Minimum rendered area of a qualifying element (px²)
    pub min_target_area: f64,
}

/// Scroll dynamics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollSettings {
    /// Minimum |delta| for a skim-qualifying sample (px)
    #[serde(alias = "skimMinDelta")]
    pub skim_min_delta_px: f64,
    /// Qualifying samples required to fire a skim
    #[serde(alias = "skimScrollCount")]
    pub skim_count: usize,
    /// Skim sample window (ms)
    #[serde(alias = "skimTimeWindow")]
    pub skim_window_ms: u64,
    /// Minimum descent before a reversal counts (px)
    #[serde(alias = "scrollBackMinDelta")]
    pub back_min_delta_px: f64,
    /// Reversal window from descent start (ms)
    #[serde(alias = "scrollBackWindow")]
    pub back_window_ms: u64,
}

/// Cursor hesitation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorSettings {
    /// Position buffer capacity
    #[serde(alias = "cursorBuffer")]
    pub buffer_len: usize,
    /// Stillness variance threshold (px²)
    #[serde(alias = "cursorVarianceThreshold")]
    pub variance_threshold: f64,
    /// Periodic check interval (ms)
    #[serde(alias = "cursorCheckInterval")]
    pub check_interval_ms: u64,
    /// Minimum buffer time span before judging (ms)
    pub min_observation_ms: u64,
    /// Re-fire cooldown (ms)
    pub cooldown_ms: u64,
}

/// Exit intent configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExitSettings {
    /// Exit y-coordinate threshold from the top (px)
    #[serde(alias = "exitThresholdY")]
    pub threshold_y_px: f64,
}

/// Augmentation service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AugmentSettings {
    /// Service base URL
    pub base_url: String,
    /// Per-request timeout (ms)
    pub timeout_ms: u64,
    /// Attempts per request (including the first)
    pub max_attempts: u32,
}

/// Telemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetrySettings {
    /// Analytics endpoint URL
    pub endpoint: String,
    /// Disable delivery entirely
    pub enabled: bool,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self {
            pointer_interval_ms: 50,
            scroll_interval_ms: 100,
        }
    }
}

impl Default for HoverSettings {
    fn default() -> Self {
        Self {
            delay_ms: 1_500,
            persist_ms: 3_000,
            min_target_area: 1_600.0,
        }
    }
}

impl Default for ScrollSettings {
    fn default() -> Self {
        Self {
            skim_min_delta_px: 80.0,
            skim_count: 3,
            skim_window_ms: 5_000,
            back_min_delta_px: 100.0,
            back_window_ms: 3_000,
        }
    }
}

impl Default for CursorSettings {
    fn default() -> Self {
        Self {
            buffer_len: 20,
            variance_threshold: 5_000.0,
            check_interval_ms: 2_500,
            min_observation_ms: 2_000,
            cooldown_ms: 30_000,
        }
    }
}

impl Default for ExitSettings {
    fn default() -> Self {
        Self { threshold_y_px: 50.0 }
    }
}

impl Default for AugmentSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            timeout_ms: 10_000,
            max_attempts: 3,
        }
    }
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8000/api/analytics".to_string(),
            enabled: true,
        }
    }
}

impl EngineConfig {
    /// Validate config values are within acceptable ranges.
    /// Returns Ok(()) if valid, or Err naming the first invalid field.
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.sampler.pointer_interval_ms == 0 {
            return Err(crate::Error::Config(
                "sampler.pointer_interval_ms must be > 0".to_string(),
            ));
        }
        if self.sampler.scroll_interval_ms == 0 {
            return Err(crate::Error::Config(
                "sampler.scroll_interval_ms must be > 0".to_string(),
            ));
        }
        if self.hover.delay_ms == 0 {
            return Err(crate::Error::Config("hover.delay_ms must be > 0".to_string()));
        }
        if self.hover.min_target_area < 0.0 {
            return Err(crate::Error::Config(
                "hover.min_target_area must be >= 0".to_string(),
            ));
        }
        if self.scroll.skim_min_delta_px <= 0.0 {
            return Err(crate::Error::Config(
                "scroll.skim_min_delta_px must be > 0".to_string(),
            ));
        }
        if self.scroll.skim_count == 0 {
            return Err(crate::Error::Config(
                "scroll.skim_count must be > 0".to_string(),
            ));
        }
        if self.scroll.skim_window_ms == 0 {
            return Err(crate::Error::Config(
                "scroll.skim_window_ms must be > 0".to_string(),
            ));
        }
        if self.scroll.back_min_delta_px <= 0.0 {
            return Err(crate::Error::Config(
                "scroll.back_min_delta_px must be > 0".to_string(),
            ));
        }
        if self.scroll.back_window_ms == 0 {
            return Err(crate::Error::Config(
                "scroll.back_window_ms must be > 0".to_string(),
            ));
        }
        if self.cursor.buffer_len < 2 {
            return Err(crate::Error::Config(
                "cursor.buffer_len must be >= 2".to_string(),
            ));
        }
        if self.cursor.variance_threshold <= 0.0 {
            return Err(crate::Error::Config(
                "cursor.variance_threshold must be > 0".to_string(),
            ));
        }
        if self.cursor.check_interval_ms == 0 {
            return Err(crate::Error::Config(
                "cursor.check_interval_ms must be > 0".to_string(),
            ));
        }
        if self.exit.threshold_y_px < 0.0 {
            return Err(crate::Error::Config(
                "exit.threshold_y_px must be >= 0".to_string(),
            ));
        }
        if self.augment.base_url.trim().is_empty() {
            return Err(crate::Error::Config(
                "augment.base_url must not be empty".to_string(),
            ));
        }
        if self.augment.max_attempts == 0 {
            return Err(crate::Error::Config(
                "augment.max_attempts must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Load config from file
    pub fn load(path: &PathBuf) -> Result<Self, crate::Error> {
        let content = std::fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from the default location, falling back to defaults
    /// when no file exists.
    pub fn load_default() -> Result<Self, crate::Error> {
        let path = Self::default_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file
    pub fn save(&self, path: &PathBuf) -> Result<(), crate::Error> {
        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Default config path
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".reader_intent").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Generate TOML representation
    pub fn to_toml(&self) -> Result<String, crate::Error> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    // Typed views consumed by the pipeline constructors.

    pub fn hover_dwell(&self) -> HoverDwellConfig {
        HoverDwellConfig {
            dwell_delay: Duration::from_millis(self.hover.delay_ms),
            min_target_area: self.hover.min_target_area,
        }
    }

    pub fn scroll_dynamics(&self) -> ScrollDynamicsConfig {
        ScrollDynamicsConfig {
            skim_min_delta: self.scroll.skim_min_delta_px,
            skim_count: self.scroll.skim_count,
            skim_window: Duration::from_millis(self.scroll.skim_window_ms),
            back_min_delta: self.scroll.back_min_delta_px,
            back_window: Duration::from_millis(self.scroll.back_window_ms),
        }
    }

    pub fn cursor_hesitation(&self) -> CursorHesitationConfig {
        CursorHesitationConfig {
            buffer_len: self.cursor.buffer_len,
            variance_threshold: self.cursor.variance_threshold,
            check_interval: Duration::from_millis(self.cursor.check_interval_ms),
            min_observation: Duration::from_millis(self.cursor.min_observation_ms),
            cooldown: Duration::from_millis(self.cursor.cooldown_ms),
        }
    }

    pub fn exit_intent(&self) -> ExitIntentConfig {
        ExitIntentConfig {
            threshold_y: self.exit.threshold_y_px,
        }
    }

    pub fn arbiter(&self) -> ArbiterConfig {
        ArbiterConfig {
            hover_persist: Duration::from_millis(self.hover.persist_ms),
            hesitation_refire: Duration::from_millis(self.cursor.cooldown_ms),
            ..ArbiterConfig::default()
        }
    }
}

impl SamplerSettings {
    pub fn pointer_interval(&self) -> Duration {
        Duration::from_millis(self.pointer_interval_ms)
    }

    pub fn scroll_interval(&self) -> Duration {
        Duration::from_millis(self.scroll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.hover.delay_ms, 1_500);
        assert_eq!(config.hover.persist_ms, 3_000);
        assert_eq!(config.scroll.skim_count, 3);
        assert_eq!(config.scroll.back_window_ms, 3_000);
        assert_eq!(config.cursor.buffer_len, 20);
        assert_eq!(config.exit.threshold_y_px, 50.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = EngineConfig::default();
        let toml_str = config.to_toml().unwrap();
        assert!(toml_str.contains("[sampler]"));
        assert!(toml_str.contains("[hover]"));
        assert!(toml_str.contains("[scroll]"));
        assert!(toml_str.contains("[cursor]"));
        assert!(toml_str.contains("[exit]"));
        assert!(toml_str.contains("[augment]"));
        assert!(toml_str.contains("[telemetry]"));
    }

    #[test]
    fn test_roundtrip() {
        let mut config = EngineConfig::default();
        config.hover.delay_ms = 2_000;
        config.scroll.skim_count = 5;

        let toml_str = config.to_toml().unwrap();
        let back: EngineConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(back.hover.delay_ms, 2_000);
        assert_eq!(back.scroll.skim_count, 5);
    }

    #[test]
    fn test_host_facing_aliases() {
        let toml_str = r#"
[hover]
hoverDelay = 2500
hoverPersist = 4000

[scroll]
skimScrollCount = 4
skimTimeWindow = 2000
skimMinDelta = 120.0
scrollBackWindow = 1500
scrollBackMinDelta = 200.0

[cursor]
cursorBuffer = 30
cursorVarianceThreshold = 8000.0
cursorCheckInterval = 3000

[exit]
exitThresholdY = 25.0
"#;
        let config: EngineConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.hover.delay_ms, 2_500);
        assert_eq!(config.hover.persist_ms, 4_000);
        assert_eq!(config.scroll.skim_count, 4);
        assert_eq!(config.scroll.skim_window_ms, 2_000);
        assert_eq!(config.scroll.skim_min_delta_px, 120.0);
        assert_eq!(config.scroll.back_window_ms, 1_500);
        assert_eq!(config.scroll.back_min_delta_px, 200.0);
        assert_eq!(config.cursor.buffer_len, 30);
        assert_eq!(config.cursor.variance_threshold, 8_000.0);
        assert_eq!(config.cursor.check_interval_ms, 3_000);
        assert_eq!(config.exit.threshold_y_px, 25.0);
        // Unspecified sections keep defaults
        assert_eq!(config.sampler.scroll_interval_ms, 100);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().expect("tempdir");
        let path = temp_dir.path().join("config.toml");

        let mut config = EngineConfig::default();
        config.cursor.variance_threshold = 7_500.0;
        config.save(&path).expect("save");

        let loaded = EngineConfig::load(&path).expect("load");
        assert_eq!(loaded.cursor.variance_threshold, 7_500.0);
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let temp_dir = TempDir::new().expect("tempdir");
        let nested = temp_dir.path().join("a").join("b").join("config.toml");

        EngineConfig::default().save(&nested).expect("save");
        assert!(nested.exists());
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let temp_dir = TempDir::new().expect("tempdir");
        let path = temp_dir.path().join("bad.toml");
        std::fs::write(&path, "[scroll]\nskim_count = 0\n").expect("write");

        assert!(EngineConfig::load(&path).is_err());
    }

    #[test]
    fn test_validate_rejections() {
        let mut config = EngineConfig::default();
        config.hover.delay_ms = 0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.scroll.back_min_delta_px = 0.0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.cursor.buffer_len = 1;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.exit.threshold_y_px = -1.0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.augment.base_url = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.augment.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_typed_views() {
        let config = EngineConfig::default();

        let hover = config.hover_dwell();
        assert_eq!(hover.dwell_delay.as_millis(), 1_500);

        let scroll = config.scroll_dynamics();
        assert_eq!(scroll.skim_window.as_millis(), 5_000);

        let cursor = config.cursor_hesitation();
        assert_eq!(cursor.cooldown.as_millis(), 30_000);

        let arb = config.arbiter();
        assert_eq!(arb.hover_persist.as_millis(), 3_000);
        assert_eq!(arb.hesitation_refire.as_millis(), 30_000);
    }

    #[test]
    fn test_default_path() {
        let path = EngineConfig::default_path();
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: EngineConfig = toml::from_str("[hover]\ndelay_ms = 900\n").unwrap();
        assert_eq!(config.hover.delay_ms, 900);
        assert_eq!(config.hover.persist_ms, 3_000);
        assert_eq!(config.scroll.skim_count, 3);
    }
}
