use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::core::tolerance::{area_band, year_band};
use crate::models::{AreaBand, ConfidenceTier, YearBand};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub matching: MatchingConfig,
    pub scoring: ScoringConfig,
    pub projection: ProjectionConfig,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            workers: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
    /// SRID the registry reprojects parcel geometries into (WGS84 for web maps)
    pub output_srid: i32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "postgres://postgres@localhost:5432/gurs_gnep".to_string(),
            max_connections: None,
            min_connections: None,
            acquire_timeout_secs: None,
            idle_timeout_secs: None,
            output_srid: 4326,
        }
    }
}

/// Candidate retrieval tolerances and result limits
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Relative parcel-area tolerance (0.01 = ±1%)
    pub parcel_area_tolerance: f64,
    /// Relative building floor-area tolerance
    pub building_area_tolerance: f64,
    /// Absolute construction-year tolerance in years
    pub construction_year_tolerance: i32,
    pub max_results: usize,
    /// Minimum confidence (0-100) a candidate needs to be returned
    pub min_confidence: f64,
    /// Carried for configuration compatibility; settlement matching is a
    /// substring test and does not consult it.
    pub settlement_fuzzy_threshold: u8,
    pub registry_timeout_secs: u64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            parcel_area_tolerance: 0.01,
            building_area_tolerance: 0.01,
            construction_year_tolerance: 1,
            max_results: 3,
            min_confidence: 50.0,
            settlement_fuzzy_threshold: 80,
            registry_timeout_secs: 10,
        }
    }
}

impl MatchingConfig {
    pub fn parcel_area_band(&self, area: f64) -> AreaBand {
        area_band(area, self.parcel_area_tolerance)
    }

    pub fn building_area_band(&self, area: f64) -> AreaBand {
        area_band(area, self.building_area_tolerance)
    }

    pub fn year_band(&self, year: i32) -> YearBand {
        year_band(year, self.construction_year_tolerance)
    }

    pub fn registry_timeout(&self) -> Duration {
        Duration::from_secs(self.registry_timeout_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        check_fraction("matching.parcel_area_tolerance", self.parcel_area_tolerance)?;
        check_fraction("matching.building_area_tolerance", self.building_area_tolerance)?;

        if self.construction_year_tolerance < 0 {
            return Err(invalid("matching.construction_year_tolerance", "must not be negative"));
        }
        if self.max_results == 0 {
            return Err(invalid("matching.max_results", "must be at least 1"));
        }
        if !(0.0..=100.0).contains(&self.min_confidence) {
            return Err(invalid("matching.min_confidence", "must be within 0-100"));
        }
        if self.settlement_fuzzy_threshold > 100 {
            return Err(invalid("matching.settlement_fuzzy_threshold", "must be within 0-100"));
        }
        if self.registry_timeout_secs == 0 {
            return Err(invalid("matching.registry_timeout_secs", "must be at least 1"));
        }
        Ok(())
    }
}

/// Scoring weights, bonuses and partial-match multipliers
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub parcel_area_weight: u32,
    pub construction_year_weight: u32,
    pub building_area_weight: u32,

    pub street_match_bonus: u32,
    pub building_type_bonus: u32,
    pub settlement_match_bonus: u32,

    /// Share of an area weight awarded for a near match
    pub area_near_match_multiplier: f64,
    /// Share of an area weight awarded for a fuzzy match
    pub area_fuzzy_match_multiplier: f64,
    /// Share of the year weight awarded for a ±1 year match
    pub year_near_match_multiplier: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            parcel_area_weight: 50,
            construction_year_weight: 30,
            building_area_weight: 40,
            street_match_bonus: 15,
            building_type_bonus: 10,
            settlement_match_bonus: 5,
            area_near_match_multiplier: 0.8,
            area_fuzzy_match_multiplier: 0.6,
            year_near_match_multiplier: 0.67,
        }
    }
}

impl ScoringConfig {
    /// Sum of every weight and bonus, regardless of which criteria apply
    pub fn max_possible_score(&self) -> u32 {
        self.points()
            .iter()
            .fold(0u32, |total, points| total.saturating_add(*points))
    }

    fn points(&self) -> [u32; 6] {
        [
            self.parcel_area_weight,
            self.construction_year_weight,
            self.building_area_weight,
            self.street_match_bonus,
            self.building_type_bonus,
            self.settlement_match_bonus,
        ]
    }

    /// Convert a score into a confidence percentage
    pub fn confidence(&self, score: u32) -> f64 {
        let max = self.max_possible_score();
        if max == 0 {
            return 0.0;
        }
        (score as f64 / max as f64 * 100.0).min(100.0)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("scoring.area_near_match_multiplier", self.area_near_match_multiplier),
            ("scoring.area_fuzzy_match_multiplier", self.area_fuzzy_match_multiplier),
            ("scoring.year_near_match_multiplier", self.year_near_match_multiplier),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(invalid(key, "must be within 0-1"));
            }
        }

        let total = self
            .points()
            .iter()
            .try_fold(0u32, |total, points| total.checked_add(*points));
        if total.is_none() {
            return Err(invalid("scoring", "weights and bonuses overflow the score range"));
        }
        Ok(())
    }
}

/// Hex colors per confidence tier
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TierColors {
    pub high: String,
    pub medium: String,
    pub low: String,
}

impl Default for TierColors {
    fn default() -> Self {
        Self {
            high: "#22c55e".to_string(),
            medium: "#eab308".to_string(),
            low: "#ef4444".to_string(),
        }
    }
}

/// Styling hints for the GeoJSON output
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    pub colors: TierColors,
    pub high_confidence_threshold: f64,
    pub medium_confidence_threshold: f64,
    /// Confidence at or above which features are drawn with `strong_opacity`
    pub opacity_threshold: f64,
    pub strong_opacity: f64,
    pub weak_opacity: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            colors: TierColors::default(),
            high_confidence_threshold: 90.0,
            medium_confidence_threshold: 70.0,
            opacity_threshold: 80.0,
            strong_opacity: 0.7,
            weak_opacity: 0.5,
        }
    }
}

impl ProjectionConfig {
    pub fn tier(&self, confidence: f64) -> ConfidenceTier {
        if confidence >= self.high_confidence_threshold {
            ConfidenceTier::High
        } else if confidence >= self.medium_confidence_threshold {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }

    pub fn color_for(&self, confidence: f64) -> &str {
        match self.tier(confidence) {
            ConfidenceTier::High => &self.colors.high,
            ConfidenceTier::Medium => &self.colors.medium,
            ConfidenceTier::Low => &self.colors.low,
        }
    }

    pub fn opacity_for(&self, confidence: f64) -> f64 {
        if confidence >= self.opacity_threshold {
            self.strong_opacity
        } else {
            self.weak_opacity
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.medium_confidence_threshold > self.high_confidence_threshold {
            return Err(invalid(
                "projection.medium_confidence_threshold",
                "must not exceed projection.high_confidence_threshold",
            ));
        }
        for (key, value) in [
            ("projection.strong_opacity", self.strong_opacity),
            ("projection.weak_opacity", self.weak_opacity),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(key, "must be within 0-1"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

/// Flat variable names used by earlier deployments, mapped onto config keys
const LEGACY_ENV_KEYS: [(&str, &str); 6] = [
    ("PARCEL_AREA_TOLERANCE", "matching.parcel_area_tolerance"),
    ("BUILDING_AREA_TOLERANCE", "matching.building_area_tolerance"),
    ("YEAR_TOLERANCE", "matching.construction_year_tolerance"),
    ("MAX_RESULTS", "matching.max_results"),
    ("MIN_CONFIDENCE", "matching.min_confidence"),
    ("DATABASE_URL", "database.url"),
];

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the structs
    /// 2. Configuration files (config/default.toml, config/local.toml)
    /// 3. Environment variables prefixed with PARCEL
    ///    e.g., PARCEL__MATCHING__MAX_RESULTS -> matching.max_results
    /// 4. Legacy flat variables (PARCEL_AREA_TOLERANCE, MAX_RESULTS, ...)
    ///
    /// A malformed or out-of-range value is an error; the service must not start.
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(environment())
            .build()?;

        let settings = apply_legacy_env(settings, |key| std::env::var(key).ok())?;

        Self::from_config(settings)
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?;

        Self::from_config(settings)
    }

    /// Deserialize and validate an already layered configuration
    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.matching.validate()?;
        self.scoring.validate()?;
        self.projection.validate()
    }
}

/// `PARCEL__SECTION__KEY` variables, e.g. PARCEL__MATCHING__MAX_RESULTS
fn environment() -> Environment {
    Environment::with_prefix("PARCEL")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Overlay legacy flat variables on top of `settings`
///
/// `lookup` resolves a variable name; blank values count as unset.
pub fn apply_legacy_env<F>(settings: Config, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut builder = Config::builder().add_source(settings);

    for (var, key) in LEGACY_ENV_KEYS {
        if let Some(value) = lookup(var).filter(|v| !v.trim().is_empty()) {
            builder = builder.set_override(key, value.trim().to_string())?;
        }
    }

    builder.build()
}

fn check_fraction(key: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (0.0..1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(key, "must be a fraction within 0-1"))
    }
}

fn invalid(key: &str, reason: &str) -> ConfigError {
    ConfigError::Message(format!("invalid configuration value for {}: {}", key, reason))
}
