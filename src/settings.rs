//! Host settings: defaults, optional config file, environment, CLI overrides.

use std::path::Path;
use std::time::Duration;

use config::{Config, ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use sharewatch_adapter::{ShareTarget, TargetError, DEFAULT_BASE_ENDPOINT};
use thiserror::Error;

/// Environment variable prefix (`SHAREWATCH_POLL_INTERVAL`, ...).
pub const ENV_PREFIX: &str = "SHAREWATCH";

/// Default seconds between refresh cycles.
pub const DEFAULT_POLL_INTERVAL: u64 = 60;
/// Shortest accepted poll interval in seconds.
pub const MIN_POLL_INTERVAL: u64 = 15;
/// Longest accepted poll interval in seconds.
pub const MAX_POLL_INTERVAL: u64 = 3600;
/// Default and maximum number of decimals kept in coordinates.
pub const MAX_COORD_PRECISION: u32 = 6;
/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Errors raised while loading or validating settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to load settings: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Poll interval {0}s is below the minimum of 15s")]
    PollIntervalTooLow(u64),

    #[error("Poll interval {0}s is above the maximum of 3600s")]
    PollIntervalTooHigh(u64),

    #[error("Coordinate precision {0} is out of range (0..=6)")]
    PrecisionOutOfRange(u32),

    #[error("Timeout must be at least one second")]
    InvalidTimeout,
}

/// Unit in which speeds are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SpeedUnit {
    /// Kilometres per hour, as reported by the API.
    #[default]
    Kmh,
    /// Miles per hour.
    Mph,
}

impl SpeedUnit {
    /// Configuration token for this unit.
    pub fn as_str(&self) -> &'static str {
        match self {
            SpeedUnit::Kmh => "kmh",
            SpeedUnit::Mph => "mph",
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            SpeedUnit::Kmh => "km/h",
            SpeedUnit::Mph => "mph",
        }
    }
}

/// Validated host settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub shared_code: Option<String>,
    #[serde(default)]
    pub share_url: Option<String>,
    /// Seconds between refresh cycles.
    pub poll_interval: u64,
    pub speed_unit: SpeedUnit,
    pub coord_precision: u32,
    pub timeout_secs: u64,
    pub base_endpoint: String,
}

/// Values given on the command line; they win over every other source.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub shared_code: Option<String>,
    pub share_url: Option<String>,
    pub poll_interval: Option<u64>,
    pub speed_unit: Option<SpeedUnit>,
    pub coord_precision: Option<u32>,
    pub timeout_secs: Option<u64>,
}

impl Settings {
    /// Load settings from defaults, an optional file, the process environment
    /// and the given overrides, in that order, then validate them.
    pub fn load(path: Option<&Path>, overrides: &Overrides) -> Result<Self, SettingsError> {
        Self::load_with_env(path, Environment::with_prefix(ENV_PREFIX), overrides)
    }

    fn load_with_env(
        path: Option<&Path>,
        env: Environment,
        overrides: &Overrides,
    ) -> Result<Self, SettingsError> {
        let mut builder = defaults()?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(env);
        builder = apply_overrides(builder, overrides)?;

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.poll_interval < MIN_POLL_INTERVAL {
            return Err(SettingsError::PollIntervalTooLow(self.poll_interval));
        }
        if self.poll_interval > MAX_POLL_INTERVAL {
            return Err(SettingsError::PollIntervalTooHigh(self.poll_interval));
        }
        if self.coord_precision > MAX_COORD_PRECISION {
            return Err(SettingsError::PrecisionOutOfRange(self.coord_precision));
        }
        if self.timeout_secs == 0 {
            return Err(SettingsError::InvalidTimeout);
        }
        Ok(())
    }

    /// Resolve the share inputs into a request target.
    pub fn target(&self) -> Result<ShareTarget, TargetError> {
        ShareTarget::resolve(
            self.shared_code.as_deref(),
            self.share_url.as_deref(),
            &self.base_endpoint,
        )
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            shared_code: None,
            share_url: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            speed_unit: SpeedUnit::Kmh,
            coord_precision: MAX_COORD_PRECISION,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            base_endpoint: DEFAULT_BASE_ENDPOINT.to_string(),
        }
    }
}

type Builder = ConfigBuilder<config::builder::DefaultState>;

fn defaults() -> Result<Builder, SettingsError> {
    let builder = Config::builder()
        .set_default("poll_interval", DEFAULT_POLL_INTERVAL as i64)?
        .set_default("speed_unit", SpeedUnit::Kmh.as_str())?
        .set_default("coord_precision", MAX_COORD_PRECISION as i64)?
        .set_default("timeout_secs", DEFAULT_TIMEOUT_SECS as i64)?
        .set_default("base_endpoint", DEFAULT_BASE_ENDPOINT)?;
    Ok(builder)
}

fn apply_overrides(builder: Builder, overrides: &Overrides) -> Result<Builder, SettingsError> {
    let builder = builder
        .set_override_option("shared_code", overrides.shared_code.clone())?
        .set_override_option("share_url", overrides.share_url.clone())?
        .set_override_option("poll_interval", overrides.poll_interval.map(|v| v as i64))?
        .set_override_option("speed_unit", overrides.speed_unit.map(|u| u.as_str()))?
        .set_override_option("coord_precision", overrides.coord_precision.map(i64::from))?
        .set_override_option("timeout_secs", overrides.timeout_secs.map(|v| v as i64))?;
    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: config::Map<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX).source(Some(map))
    }

    fn load(
        path: Option<&Path>,
        vars: &[(&str, &str)],
        overrides: &Overrides,
    ) -> Result<Settings, SettingsError> {
        Settings::load_with_env(path, env(vars), overrides)
    }

    #[test]
    fn test_defaults() {
        let settings = load(None, &[], &Overrides::default()).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.poll_interval(), Duration::from_secs(60));
        assert_eq!(settings.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_file_then_env_then_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sharewatch.toml");
        std::fs::write(
            &path,
            "shared_code = \"FromFile\"\npoll_interval = 120\nspeed_unit = \"mph\"\ncoord_precision = 4\n",
        )
        .unwrap();

        let settings = load(
            Some(&path),
            &[("SHAREWATCH_POLL_INTERVAL", "300")],
            &Overrides {
                coord_precision: Some(2),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(settings.shared_code.as_deref(), Some("FromFile"));
        assert_eq!(settings.poll_interval, 300);
        assert_eq!(settings.speed_unit, SpeedUnit::Mph);
        assert_eq!(settings.coord_precision, 2);
    }

    #[test]
    fn numeric_looking_code_stays_text() {
        let vars = [("SHAREWATCH_SHARED_CODE", "123456")];
        let settings = load(None, &vars, &Overrides::default()).unwrap();
        assert_eq!(settings.shared_code.as_deref(), Some("123456"));
    }

    #[test]
    fn test_poll_interval_bounds() {
        let too_low = Overrides {
            poll_interval: Some(14),
            ..Default::default()
        };
        assert!(matches!(
            load(None, &[], &too_low),
            Err(SettingsError::PollIntervalTooLow(14))
        ));

        let too_high = Overrides {
            poll_interval: Some(3601),
            ..Default::default()
        };
        assert!(matches!(
            load(None, &[], &too_high),
            Err(SettingsError::PollIntervalTooHigh(3601))
        ));

        for ok in [15, 3600] {
            let overrides = Overrides {
                poll_interval: Some(ok),
                ..Default::default()
            };
            assert_eq!(load(None, &[], &overrides).unwrap().poll_interval, ok);
        }
    }

    #[test]
    fn test_precision_and_timeout_validation() {
        let settings = Settings {
            coord_precision: 7,
            ..Settings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::PrecisionOutOfRange(7))
        ));

        let settings = Settings {
            timeout_secs: 0,
            ..Settings::default()
        };
        assert!(matches!(settings.validate(), Err(SettingsError::InvalidTimeout)));
    }

    #[test]
    fn unknown_speed_unit_is_rejected() {
        let result = load(None, &[("SHAREWATCH_SPEED_UNIT", "knots")], &Overrides::default());
        assert!(matches!(result, Err(SettingsError::Config(_))));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(matches!(
            load(Some(&path), &[], &Overrides::default()),
            Err(SettingsError::Config(_))
        ));
    }

    #[test]
    fn test_target_from_settings() {
        let settings = Settings {
            shared_code: Some("AbC".to_string()),
            base_endpoint: "https://api.example.com/info".to_string(),
            ..Settings::default()
        };
        let target = settings.target().unwrap();
        assert_eq!(target.request_url(), "https://api.example.com/info?shared_code=AbC");

        assert!(matches!(
            Settings::default().target(),
            Err(TargetError::MissingInput)
        ));
    }
}
