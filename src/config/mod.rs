use std::collections::BTreeMap;
use std::env;

use serde::{Deserialize, Serialize};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the engine and its CLI.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub augmentation: AugmentationConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let endpoint = env::var("FOODPRINT_AI_ENDPOINT")
            .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string());
        let api_key = env::var("FOODPRINT_AI_API_KEY").ok().filter(|key| !key.is_empty());
        let model =
            env::var("FOODPRINT_AI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let timeout_ms = match env::var("FOODPRINT_AI_TIMEOUT_MS") {
            Ok(raw) => raw
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidTimeout { value: raw })?,
            Err(_) => 4_000,
        };

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            augmentation: AugmentationConfig {
                endpoint,
                api_key,
                model,
                timeout_ms,
            },
        })
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Settings for the optional generative-text insight augmentation.
///
/// Augmentation is considered available only when an API key is present; the
/// engine otherwise runs the deterministic insight path exclusively.
#[derive(Debug, Clone)]
pub struct AugmentationConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_ms: u64,
}

impl AugmentationConfig {
    pub fn is_available(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Reference baselines the scorers evaluate metrics against.
///
/// These are external configuration, not engine constants: a deployment can
/// swap in household- or region-specific targets without touching the rule
/// tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringBaselines {
    /// Expected share of weekly logged entries per category (sums to 1.0).
    pub expected_category_shares: BTreeMap<String, f64>,
    /// Nutrient gaps at or below this percentage are ignored.
    pub nutrient_gap_threshold: f64,
    /// Gaps above this percentage are treated as high severity.
    pub severe_gap_threshold: f64,
    /// Distinct category count at which the variety bonus saturates.
    pub variety_saturation: u32,
    /// Weekly log entries corresponding to the full regular-logging bonus.
    pub regular_logging_target: u32,
    /// Weekly vegetable/fruit servings corresponding to the full bonus.
    pub veg_fruit_target: u32,
    /// Weekly waste above this many grams triggers meal-planning advice.
    pub high_waste_grams: f64,
    /// Factor penalties at or beyond this magnitude drive an insight.
    pub material_penalty: f64,
}

impl Default for ScoringBaselines {
    fn default() -> Self {
        let expected_category_shares = BTreeMap::from([
            ("vegetable".to_string(), 0.30),
            ("fruit".to_string(), 0.20),
            ("grain".to_string(), 0.25),
            ("dairy".to_string(), 0.10),
            ("meat".to_string(), 0.10),
            ("other".to_string(), 0.05),
        ]);

        Self {
            expected_category_shares,
            nutrient_gap_threshold: 20.0,
            severe_gap_threshold: 30.0,
            variety_saturation: 6,
            regular_logging_target: 14,
            veg_fruit_target: 10,
            high_waste_grams: 300.0,
            material_penalty: 5.0,
        }
    }
}

/// Component weights used by the overall combiner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub waste: f64,
    pub nutrition: f64,
    pub sustainability: f64,
}

impl ScoreWeights {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sum = self.waste + self.nutrition + self.sustainability;
        let non_negative =
            self.waste >= 0.0 && self.nutrition >= 0.0 && self.sustainability >= 0.0;
        if !non_negative || (sum - 1.0).abs() > 1e-6 {
            return Err(ConfigError::InvalidWeights { sum });
        }
        Ok(())
    }

    pub fn combine(&self, waste: f64, nutrition: f64, sustainability: f64) -> f64 {
        (self.waste * waste + self.nutrition * nutrition + self.sustainability * sustainability)
            .clamp(0.0, 100.0)
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            waste: 0.40,
            nutrition: 0.35,
            sustainability: 0.25,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("FOODPRINT_AI_TIMEOUT_MS must be a valid u64, got '{value}'")]
    InvalidTimeout { value: String },
    #[error("score weights must be non-negative and sum to 1.0, got sum {sum}")]
    InvalidWeights { sum: f64 },
}
