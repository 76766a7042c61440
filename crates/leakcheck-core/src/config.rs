use crate::error::CoreError;
use config::{Config as ConfigLoader, Environment, File};
use serde::Deserialize;
use std::time::Duration;

// Helper for deserializing Duration from milliseconds
mod duration_ms_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

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
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

// Main configuration structure
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)] // Ensure fields default if missing in config source
pub struct Config {
    pub global: GlobalConfig,
    pub detection: DetectionConfig,
}

// Global settings
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct GlobalConfig {
    pub log_level: String,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// Leak detection endpoint configuration
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct DetectionConfig {
    /// Endpoint receiving single-credential lookup requests.
    pub endpoint_url: String,
    #[serde(with = "duration_ms_serde")]
    pub request_timeout: Duration,
    /// Upper bound on concurrently in-flight lookups per batch.
    pub max_concurrent_lookups: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            endpoint_url: "https://passwordsleakcheck-pa.googleapis.com/v1/leaks:lookupSingle"
                .to_string(),
            request_timeout: Duration::from_secs(30),
            max_concurrent_lookups: 10,
        }
    }
}

/// Loads configuration from default locations and environment variables.
///
/// Looks for `leakcheck.toml` (or `.json`, `.yaml`, etc.) in the current
/// directory. Overrides with environment variables prefixed with `LEAKCHECK_`.
/// (e.g., `LEAKCHECK_GLOBAL__LOG_LEVEL=debug`,
/// `LEAKCHECK_DETECTION__REQUEST_TIMEOUT_MS=10000`)
/// Note the double underscore `__` for nested fields when using `Environment`.
pub fn load_config() -> Result<Config, CoreError> {
    let builder = ConfigLoader::builder()
        // Set defaults for non-Option fields so partial files stay valid.
        .set_default("global.log_level", "info")?
        .set_default("detection.request_timeout", 30_000u64)?
        .set_default("detection.max_concurrent_lookups", 10u64)?
        // Load from `leakcheck.toml` (or other supported extensions) if it exists
        .add_source(File::with_name("leakcheck").required(false))
        // Load from environment variables (e.g., LEAKCHECK_GLOBAL__LOG_LEVEL)
        .add_source(
            Environment::with_prefix("LEAKCHECK")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    builder.try_deserialize().map_err(CoreError::ConfigLoad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_sensible() {
        let config = Config::default();
        assert_eq!(config.global.log_level, "info");
        assert_eq!(config.detection.request_timeout, Duration::from_secs(30));
        assert_eq!(config.detection.max_concurrent_lookups, 10);
        assert!(config.detection.endpoint_url.starts_with("https://"));
    }

    #[test]
    fn deserializes_from_toml_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("leakcheck.toml");
        let mut file = std::fs::File::create(&path).expect("create config file");
        writeln!(
            file,
            r#"
[global]
log_level = "debug"

[detection]
endpoint_url = "https://leaks.example.test/v1/lookup"
request_timeout = 5000
max_concurrent_lookups = 3
"#
        )
        .expect("write config file");

        let config: Config = ConfigLoader::builder()
            .add_source(File::from(path))
            .build()
            .expect("build config")
            .try_deserialize()
            .expect("deserialize config");

        assert_eq!(config.global.log_level, "debug");
        assert_eq!(
            config.detection.endpoint_url,
            "https://leaks.example.test/v1/lookup"
        );
        assert_eq!(config.detection.request_timeout, Duration::from_millis(5000));
        assert_eq!(config.detection.max_concurrent_lookups, 3);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: Config = ConfigLoader::builder()
            .add_source(config::File::from_str(
                r#"[global]
log_level = "trace"
"#,
                config::FileFormat::Toml,
            ))
            .build()
            .expect("build config")
            .try_deserialize()
            .expect("deserialize config");

        assert_eq!(config.global.log_level, "trace");
        assert_eq!(config.detection.max_concurrent_lookups, 10);
    }
}
