use crate::config::ConfigError;
use crate::scoring::ScoreError;
use crate::telemetry::TelemetryError;

/// Crate-level error aggregation for binaries embedding the engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("metrics file error: {0}")]
    MetricsFile(#[from] serde_json::Error),
    #[error(transparent)]
    Score(#[from] ScoreError),
}
