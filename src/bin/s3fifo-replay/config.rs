//! Configuration for the synthetic-workload replay driver.

use serde::Deserialize;
use std::path::Path;

/// Top-level configuration.
#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    pub cache: CacheConfig,
    #[serde(default)]
    pub workload: WorkloadConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// General replay settings.
#[derive(Debug, Deserialize)]
pub struct GeneralConfig {
    /// Number of requests to replay.
    #[serde(default = "GeneralConfig::default_requests")]
    pub requests: u64,
    /// Seed for the workload generator.
    #[serde(default = "GeneralConfig::default_seed")]
    pub seed: u64,
    /// Print an interval line every this many requests. 0 = no interval output.
    #[serde(default = "GeneralConfig::default_report_interval")]
    pub report_interval: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            requests: Self::default_requests(),
            seed: Self::default_seed(),
            report_interval: Self::default_report_interval(),
        }
    }
}

impl GeneralConfig {
    fn default_requests() -> u64 {
        1_000_000
    }

    fn default_seed() -> u64 {
        42
    }

    fn default_report_interval() -> u64 {
        100_000
    }
}

/// Policy under test.
#[derive(Debug, Deserialize)]
pub struct CacheConfig {
    /// Total cache capacity (e.g., "64MB").
    #[serde(deserialize_with = "deserialize_size")]
    pub capacity: u64,
    /// Policy parameter string (e.g., "size-threshold=65536,gamma=1.0").
    #[serde(default)]
    pub params: String,
}

/// Synthetic workload shape.
#[derive(Debug, Deserialize)]
pub struct WorkloadConfig {
    /// Number of distinct object ids.
    #[serde(default = "WorkloadConfig::default_keys")]
    pub keys: u64,
    /// Popularity skew. 1.0 is uniform, larger values favor low ids.
    #[serde(default = "WorkloadConfig::default_skew")]
    pub skew: f64,
    /// Fraction of ids that are large objects (0.0 - 1.0).
    #[serde(default = "WorkloadConfig::default_large_fraction")]
    pub large_fraction: f64,
    /// Size range for small objects.
    #[serde(default = "SizeRange::default_small")]
    pub small_size: SizeRange,
    /// Size range for large objects.
    #[serde(default = "SizeRange::default_large")]
    pub large_size: SizeRange,
    /// Range of reload costs assigned to objects.
    #[serde(default)]
    pub reload_cost: CostRange,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            keys: Self::default_keys(),
            skew: Self::default_skew(),
            large_fraction: Self::default_large_fraction(),
            small_size: SizeRange::default_small(),
            large_size: SizeRange::default_large(),
            reload_cost: CostRange::default(),
        }
    }
}

impl WorkloadConfig {
    fn default_keys() -> u64 {
        100_000
    }

    fn default_skew() -> f64 {
        2.0
    }

    fn default_large_fraction() -> f64 {
        0.05
    }
}

/// Inclusive byte range.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SizeRange {
    #[serde(deserialize_with = "deserialize_size")]
    pub min: u64,
    #[serde(deserialize_with = "deserialize_size")]
    pub max: u64,
}

impl SizeRange {
    fn default_small() -> Self {
        Self { min: 64, max: 4096 }
    }

    fn default_large() -> Self {
        Self {
            min: 64 * 1024,
            max: 1024 * 1024,
        }
    }
}

/// Inclusive reload-cost range.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CostRange {
    pub min: f64,
    pub max: f64,
}

impl Default for CostRange {
    fn default() -> Self {
        Self { min: 0.0, max: 0.0 }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Log format: "pretty", "json", or "compact".
    #[serde(default = "LoggingConfig::default_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            format: Self::default_format(),
        }
    }
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }

    fn default_format() -> String {
        "pretty".to_string()
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::parse(&contents)?;
        Ok(config)
    }

    pub fn parse(contents: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        let workload = &self.workload;

        if self.cache.capacity == 0 {
            return Err("cache capacity must be non-zero".to_string());
        }
        if workload.keys == 0 {
            return Err("workload keys must be non-zero".to_string());
        }
        if !workload.skew.is_finite() || workload.skew < 1.0 {
            return Err(format!("workload skew must be >= 1.0 (got {})", workload.skew));
        }
        if !(0.0..=1.0).contains(&workload.large_fraction) {
            return Err(format!(
                "workload large_fraction must be within 0.0 - 1.0 (got {})",
                workload.large_fraction
            ));
        }
        for (name, range) in [
            ("small_size", workload.small_size),
            ("large_size", workload.large_size),
        ] {
            if range.min == 0 || range.min > range.max {
                return Err(format!(
                    "workload {name} must satisfy 0 < min <= max (got {} - {})",
                    range.min, range.max
                ));
            }
        }
        let cost = workload.reload_cost;
        if !cost.min.is_finite() || !cost.max.is_finite() || !(0.0..=cost.max).contains(&cost.min) {
            return Err(format!(
                "workload reload_cost must satisfy 0 <= min <= max (got {} - {})",
                cost.min, cost.max
            ));
        }

        Ok(())
    }
}

/// Deserialize a size from a human-readable string (e.g., "1GB", "512MB")
/// or a plain integer.
fn deserialize_size<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Size {
        Bytes(u64),
        Text(String),
    }

    match Size::deserialize(deserializer)? {
        Size::Bytes(bytes) => Ok(bytes),
        Size::Text(s) => parse_size(&s).map_err(serde::de::Error::custom),
    }
}

/// Parse a size string like "1GB", "512MB", "4KB" into bytes.
fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty size string".to_string());
    }

    let num_end = s
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(s.len());

    let (num_str, suffix) = s.split_at(num_end);
    let num: f64 = num_str
        .parse()
        .map_err(|e| format!("invalid number '{}': {}", num_str, e))?;

    let multiplier: u64 = match suffix.trim().to_uppercase().as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1024,
        "MB" | "M" => 1024 * 1024,
        "GB" | "G" => 1024 * 1024 * 1024,
        "TB" | "T" => 1024 * 1024 * 1024 * 1024,
        other => return Err(format!("unknown size suffix '{}'", other)),
    };

    Ok((num * multiplier as f64) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("64MB"), Ok(64 * 1024 * 1024));
        assert_eq!(parse_size("4k"), Ok(4096));
        assert_eq!(parse_size("1.5KB"), Ok(1536));
        assert_eq!(parse_size("100"), Ok(100));
        assert!(parse_size("").is_err());
        assert!(parse_size("12XB").is_err());
    }

    #[test]
    fn test_minimal_config() {
        let config = Config::parse("[cache]\ncapacity = \"1MB\"\n").unwrap();
        assert_eq!(config.cache.capacity, 1024 * 1024);
        assert!(config.cache.params.is_empty());
        assert_eq!(config.general.seed, 42);
        assert_eq!(config.workload.keys, 100_000);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_full_config() {
        let config = Config::parse(
            r#"
            [general]
            requests = 5000
            seed = 7
            report_interval = 0

            [cache]
            capacity = 65536
            params = "size-threshold=1024,gamma=0.5"

            [workload]
            keys = 500
            skew = 1.5
            large_fraction = 0.2
            small_size = { min = 16, max = "1KB" }
            large_size = { min = "2KB", max = "8KB" }
            reload_cost = { min = 0.0, max = 3.0 }

            [logging]
            level = "debug"
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.general.requests, 5000);
        assert_eq!(config.cache.capacity, 65536);
        assert_eq!(config.workload.small_size.max, 1024);
        assert_eq!(config.workload.large_size.min, 2048);
        assert_eq!(config.workload.reload_cost.max, 3.0);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_invalid_workload_rejected() {
        let base = "[cache]\ncapacity = \"1MB\"\n[workload]\n";
        assert!(Config::parse(&format!("{base}skew = 0.5\n")).is_err());
        assert!(Config::parse(&format!("{base}large_fraction = 1.5\n")).is_err());
        assert!(Config::parse(&format!("{base}small_size = {{ min = 10, max = 5 }}\n")).is_err());
        assert!(Config::parse(&format!("{base}reload_cost = {{ min = -1.0, max = 1.0 }}\n")).is_err());
        assert!(Config::parse("[cache]\ncapacity = 0\n").is_err());
    }
}
