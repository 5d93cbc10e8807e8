/*
 *  config.rs
 *
 *  smart-display - weather & clock panel
 *  (c) 2020-26 Stuart Hunter
 *
 *  Configuration: defaults, YAML file, CLI overrides, validation
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}};
use thiserror::Error;

use crate::clock::WeekdayLabels;
use crate::forecast::MAX_FORECAST_DAYS;

pub const DEFAULT_TIME_URL: &str = "https://digidates.de/api/v1/unixtime";
pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Effective application configuration.
///
/// Every key is optional in the YAML document; missing keys keep the
/// value from `Default`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: String,
    pub time_url: String,
    pub forecast_url: String,
    /// Forecast coordinates. When unset the location service decides.
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Fixed offset applied to every authoritative time fetch
    pub utc_offset_secs: i64,
    pub tick_interval_ms: u64,
    pub sync_interval_secs: u64,
    pub forecast_interval_secs: u64,
    pub forecast_days: usize,
    pub http_timeout_ms: u64,
    pub http_retries: u8,
    pub language: WeekdayLabels,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            time_url: DEFAULT_TIME_URL.to_string(),
            forecast_url: DEFAULT_FORECAST_URL.to_string(),
            latitude: None,
            longitude: None,
            utc_offset_secs: 3600,
            tick_interval_ms: 1000,
            sync_interval_secs: 60,
            forecast_interval_secs: 300,
            forecast_days: 7,
            http_timeout_ms: 5000,
            http_retries: 1,
            language: WeekdayLabels::En,
        }
    }
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone, Default)]
#[command(name = "smart-display", version, about = "Weather & clock panel driver")]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(short = 'c', long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    /// Enable debug log level
    #[arg(short = 'v', long, alias = "verbose", action = ArgAction::SetTrue)]
    pub debug: bool,
    #[arg(long)]
    pub log_level: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub latitude: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    pub longitude: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    pub utc_offset_secs: Option<i64>,
    #[arg(long)]
    pub sync_interval_secs: Option<u64>,
    #[arg(long)]
    pub forecast_interval_secs: Option<u64>,
    /// Weekday label set
    #[arg(short = 'l', long, value_enum)]
    pub language: Option<WeekdayLabels>,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// Public entry point: parse CLI, read YAML, merge, validate.
pub fn load() -> Result<Config, ConfigError> {
    let cli = Cli::parse();
    let cfg = load_with(&cli)?;

    if cli.dump_config {
        let s = serde_yaml::to_string(&cfg)?;
        println!("{s}");
        std::process::exit(0);
    }

    Ok(cfg)
}

/// Layer defaults, the YAML file and `cli` (highest precedence), then validate.
pub fn load_with(cli: &Cli) -> Result<Config, ConfigError> {
    let mut cfg = if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            read_yaml(p)?
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        read_yaml(&p)?
    } else {
        Config::default()
    };

    apply_cli_overrides(&mut cfg, cli);
    validate(&cfg)?;
    Ok(cfg)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    if let Some(home) = home_dir() {
        let p = home.join(".config/smart-display/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/smart-display.yaml");
        if p.exists() { return Some(p) }
    }
    for candidate in &["smart-display.yaml", "config.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    parse_yaml(&s)
}

/// Parse a YAML document; absent keys keep their defaults.
pub fn parse_yaml(s: &str) -> Result<Config, ConfigError> {
    // an empty document deserializes to unit, not to a map
    if s.trim().is_empty() {
        return Ok(Config::default());
    }
    Ok(serde_yaml::from_str(s)?)
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if let Some(level) = cli.log_level.as_ref() { cfg.log_level = level.clone(); }
    if cli.debug                                { cfg.log_level = "debug".to_string(); }
    if cli.latitude.is_some()                   { cfg.latitude = cli.latitude; }
    if cli.longitude.is_some()                  { cfg.longitude = cli.longitude; }
    if let Some(v) = cli.utc_offset_secs        { cfg.utc_offset_secs = v; }
    if let Some(v) = cli.sync_interval_secs     { cfg.sync_interval_secs = v; }
    if let Some(v) = cli.forecast_interval_secs { cfg.forecast_interval_secs = v; }
    if let Some(v) = cli.language               { cfg.language = v; }
}

/// Put any invariants here (required fields, ranges, etc.)
pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.tick_interval_ms == 0 || cfg.sync_interval_secs == 0 || cfg.forecast_interval_secs == 0 {
        return Err(ConfigError::Validation("intervals must be > 0".into()));
    }
    if !(1..=MAX_FORECAST_DAYS).contains(&cfg.forecast_days) {
        return Err(ConfigError::Validation(format!("forecast_days must be 1..={}", MAX_FORECAST_DAYS)));
    }
    if cfg.http_retries == 0 {
        return Err(ConfigError::Validation("http_retries must be >= 1".into()));
    }
    if cfg.utc_offset_secs.abs() > 14 * 3600 {
        return Err(ConfigError::Validation("utc_offset_secs must be within +/-14h".into()));
    }
    if let Some(lat) = cfg.latitude {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(ConfigError::Validation(format!("latitude {} out of range", lat)));
        }
    }
    if let Some(lng) = cfg.longitude {
        if !(-180.0..=180.0).contains(&lng) {
            return Err(ConfigError::Validation(format!("longitude {} out of range", lng)));
        }
    }
    if cfg.time_url.is_empty() || cfg.forecast_url.is_empty() {
        return Err(ConfigError::Validation("endpoint URLs must not be empty".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = Config::default();
        assert!(validate(&cfg).is_ok());
        assert_eq!(cfg.utc_offset_secs, 3600);
        assert_eq!(cfg.sync_interval_secs, 60);
        assert_eq!(cfg.forecast_interval_secs, 300);
        assert_eq!(cfg.forecast_days, 7);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let cfg = parse_yaml("latitude: 48.1\nlongitude: 11.6\nlanguage: de\n").unwrap();
        assert_eq!(cfg.latitude, Some(48.1));
        assert_eq!(cfg.longitude, Some(11.6));
        assert_eq!(cfg.language, WeekdayLabels::De);
        assert_eq!(cfg.time_url, DEFAULT_TIME_URL);
        assert_eq!(cfg.tick_interval_ms, 1000);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let cfg = parse_yaml("   \n").unwrap();
        assert_eq!(cfg.log_level, "info");
    }

    #[test]
    fn test_cli_overrides_win() {
        let mut cfg = parse_yaml("sync_interval_secs: 120\nlog_level: warn\n").unwrap();
        let cli = Cli {
            debug: true,
            sync_interval_secs: Some(30),
            latitude: Some(-33.9),
            ..Default::default()
        };
        apply_cli_overrides(&mut cfg, &cli);
        assert_eq!(cfg.sync_interval_secs, 30);
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.latitude, Some(-33.9));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut cfg = Config::default();
        cfg.forecast_days = 8;
        assert!(validate(&cfg).is_err());

        let mut cfg = Config::default();
        cfg.latitude = Some(91.0);
        assert!(validate(&cfg).is_err());

        let mut cfg = Config::default();
        cfg.sync_interval_secs = 0;
        assert!(validate(&cfg).is_err());

        let mut cfg = Config::default();
        cfg.http_retries = 0;
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn test_missing_config_file_is_error() {
        let cli = Cli {
            config: Some(PathBuf::from("/definitely/not/here.yaml")),
            ..Default::default()
        };
        assert!(matches!(load_with(&cli), Err(ConfigError::Validation(_))));
    }
}
