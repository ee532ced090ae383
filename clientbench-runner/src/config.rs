//! Configuration
//!
//! A run is governed by five immutable parameters. They come from a preset
//! and can be overridden from a `bench.toml` file, discovered by walking up
//! from the current directory.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors from loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML for `BenchFile`
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A duration string could not be parsed
    #[error("invalid duration: {0}")]
    InvalidDuration(String),

    /// A field violates its constraint
    #[error("invalid configuration: {field} {reason}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// Constraint it violates
        reason: &'static str,
    },
}

/// `Duration` as whole milliseconds
mod duration_ms_serde {
    use super::*;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// Parameters of one suite run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Passes run with verification before warmup
    pub verify_passes: u32,
    /// Unmeasured passes before iteration
    pub warmups: u32,
    /// Samples required before convergence is considered
    pub min_samples: usize,
    /// Hard ceiling on the iteration phase
    #[serde(rename = "max_duration_ms", with = "duration_ms_serde")]
    pub max_duration: Duration,
    /// Convergence threshold, in percent of the mean
    pub target_relative_margin_of_error: f64,
}

impl Configuration {
    /// Lightweight preset for fast local iteration
    pub fn quick() -> Self {
        Self {
            verify_passes: 1,
            warmups: 3,
            min_samples: 5,
            max_duration: Duration::from_secs(2),
            target_relative_margin_of_error: 10.0,
        }
    }

    /// Preset for publishable numbers
    pub fn rigorous() -> Self {
        Self {
            verify_passes: 1,
            warmups: 20,
            min_samples: 30,
            max_duration: Duration::from_secs(30),
            target_relative_margin_of_error: 1.0,
        }
    }

    /// Check the constraints on every field
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_samples == 0 {
            return Err(ConfigError::Invalid {
                field: "min_samples",
                reason: "must be positive",
            });
        }
        if self.max_duration.is_zero() {
            return Err(ConfigError::Invalid {
                field: "max_duration",
                reason: "must be positive",
            });
        }
        if !(self.target_relative_margin_of_error > 0.0
            && self.target_relative_margin_of_error.is_finite())
        {
            return Err(ConfigError::Invalid {
                field: "target_relative_margin_of_error",
                reason: "must be a positive percentage",
            });
        }
        Ok(())
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::quick()
    }
}

/// Named starting point for a configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// `Configuration::quick`
    #[default]
    Quick,
    /// `Configuration::rigorous`
    Rigorous,
}

impl Preset {
    /// The preset's configuration
    pub fn configuration(self) -> Configuration {
        match self {
            Preset::Quick => Configuration::quick(),
            Preset::Rigorous => Configuration::rigorous(),
        }
    }
}

/// `[runner]` table of `bench.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunnerSection {
    /// Starting point for the overrides below
    #[serde(default)]
    pub preset: Preset,
    /// Overrides `Configuration::verify_passes`
    #[serde(default)]
    pub verify_passes: Option<u32>,
    /// Overrides `Configuration::warmups`
    #[serde(default)]
    pub warmups: Option<u32>,
    /// Overrides `Configuration::min_samples`
    #[serde(default)]
    pub min_samples: Option<usize>,
    /// Overrides `Configuration::max_duration`, e.g. "2s", "500ms"
    #[serde(default)]
    pub max_duration: Option<String>,
    /// Overrides `Configuration::target_relative_margin_of_error`
    #[serde(default)]
    pub target_relative_margin_of_error: Option<f64>,
}

/// `[history]` table of `bench.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistorySection {
    /// JSON history file; recording is off when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Contents of a `bench.toml` file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BenchFile {
    /// `[runner]`
    #[serde(default)]
    pub runner: RunnerSection,
    /// `[history]`
    #[serde(default)]
    pub history: HistorySection,
}

impl BenchFile {
    /// File name looked up by `discover`
    pub const FILE_NAME: &'static str = "bench.toml";

    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(toml::from_str(&content)?)
    }

    /// Try to discover and load `bench.toml` by walking up from the current directory
    pub fn discover() -> Option<Self> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let path = dir.join(Self::FILE_NAME);
            if path.exists() {
                return match Self::load(&path) {
                    Ok(file) => Some(file),
                    Err(e) => {
                        tracing::warn!(path = %path.display(), "ignoring config: {}", e);
                        None
                    }
                };
            }
            if !dir.pop() {
                return None;
            }
        }
    }

    /// Preset with overrides applied, validated
    pub fn configuration(&self) -> Result<Configuration, ConfigError> {
        let runner = &self.runner;
        let mut config = runner.preset.configuration();

        if let Some(v) = runner.verify_passes {
            config.verify_passes = v;
        }
        if let Some(v) = runner.warmups {
            config.warmups = v;
        }
        if let Some(v) = runner.min_samples {
            config.min_samples = v;
        }
        if let Some(v) = &runner.max_duration {
            config.max_duration = parse_duration(v)?;
        }
        if let Some(v) = runner.target_relative_margin_of_error {
            config.target_relative_margin_of_error = v;
        }

        config.validate()?;
        Ok(config)
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# clientbench configuration

[runner]
# Starting point: "quick" or "rigorous"
preset = "quick"
# Passes run with verification before warmup
# verify_passes = 1
# Unmeasured passes before iteration
# warmups = 3
# Samples required before convergence is considered
# min_samples = 5
# Hard ceiling on the iteration phase
# max_duration = "2s"
# Convergence threshold, percent of the mean
# target_relative_margin_of_error = 10.0

[history]
# Append each pairing's mean duration to this JSON file (uncomment to enable)
# path = "target/clientbench/history.json"
"#
        .to_string()
    }
}

/// Parse duration string (e.g., "3s", "500ms", "2m")
pub fn parse_duration(s: &str) -> Result<Duration, ConfigError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(ConfigError::InvalidDuration("empty duration string".into()));
    }

    let (num_part, unit_part) = s
        .char_indices()
        .find(|(_, c)| c.is_alphabetic() || *c == 'µ')
        .map(|(i, _)| s.split_at(i))
        .unwrap_or((s, "ms"));

    let value: f64 = num_part
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidDuration(format!("bad number '{}'", num_part)))?;
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::InvalidDuration(format!("'{}' is negative", s)));
    }

    let nanos_per_unit: f64 = match unit_part.to_lowercase().as_str() {
        "ns" => 1.0,
        "us" | "µs" => 1e3,
        "ms" => 1e6,
        "s" => 1e9,
        "m" | "min" => 60e9,
        other => {
            return Err(ConfigError::InvalidDuration(format!(
                "unknown unit '{}'",
                other
            )));
        }
    };

    Ok(Duration::from_nanos((value * nanos_per_unit) as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_quick() {
        let config = Configuration::default();
        assert_eq!(config, Configuration::quick());
        assert!(config.validate().is_ok());
        assert!(Configuration::rigorous().validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let config = Configuration {
            min_samples: 0,
            ..Configuration::quick()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "min_samples",
                ..
            })
        ));

        let config = Configuration {
            max_duration: Duration::ZERO,
            ..Configuration::quick()
        };
        assert!(config.validate().is_err());

        let config = Configuration {
            target_relative_margin_of_error: f64::NAN,
            ..Configuration::quick()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("3s").unwrap(), Duration::from_secs(3));
        assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("100us").unwrap(), Duration::from_micros(100));
        assert_eq!(parse_duration("1000ns").unwrap(), Duration::from_nanos(1000));
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration("1.5s").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_duration("250").unwrap(), Duration::from_millis(250));
        assert!(parse_duration("").is_err());
        assert!(parse_duration("fast").is_err());
        assert!(parse_duration("3 weeks").is_err());
    }

    #[test]
    fn test_parse_toml_with_overrides() {
        let file: BenchFile = toml::from_str(
            r#"
            [runner]
            preset = "rigorous"
            warmups = 5
            max_duration = "10s"

            [history]
            path = "history.json"
        "#,
        )
        .unwrap();

        let config = file.configuration().unwrap();
        assert_eq!(config.warmups, 5);
        assert_eq!(config.max_duration, Duration::from_secs(10));
        assert_eq!(config.min_samples, Configuration::rigorous().min_samples);
        assert_eq!(file.history.path, Some(PathBuf::from("history.json")));
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let file: BenchFile = toml::from_str("[runner]\nmin_samples = 0\n").unwrap();
        assert!(file.configuration().is_err());
    }

    #[test]
    fn test_default_toml_parses() {
        let file: BenchFile = toml::from_str(&BenchFile::default_toml()).unwrap();
        assert_eq!(file.runner.preset, Preset::Quick);
        assert_eq!(file.configuration().unwrap(), Configuration::quick());
        assert!(file.history.path.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(BenchFile::FILE_NAME);
        std::fs::write(&path, "[runner]\ntarget_relative_margin_of_error = 2.5\n").unwrap();

        let file = BenchFile::load(&path).unwrap();
        assert!((file.configuration().unwrap().target_relative_margin_of_error - 2.5).abs() < 1e-12);
        assert!(matches!(
            BenchFile::load(dir.path().join("missing.toml")),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_configuration_serializes_millis() {
        let encoded = toml::to_string(&Configuration::quick()).unwrap();
        assert!(encoded.contains("max_duration_ms = 2000"));

        let decoded: Configuration = toml::from_str(&encoded).unwrap();
        assert_eq!(decoded, Configuration::quick());
    }
}
