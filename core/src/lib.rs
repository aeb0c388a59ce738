pub mod analyze_session;
pub mod cli;
pub mod config;
pub mod error;
pub mod fatigue;
pub mod gait;
pub mod ingest;
pub mod metrics;
pub mod models;
pub mod scoring;
pub mod signal;
pub mod smoothing;
pub mod stats;
pub mod steps;
pub mod storage;
pub mod synthetic;
pub mod types;

#[cfg(feature = "python")]
mod py;

pub use analyze_session::{analyze_session, SessionAnalyzer};
pub use config::{AnalysisConfig, DeviceProfile, DeviceRegistry, FilterConstants};
pub use error::{AnalysisError, Result};
pub use models::{RawAccelSample, RawGpsSample, SessionInput};
pub use scoring::{recommendations, SessionAssessment};
pub use storage::{HistorySummary, SessionHistory};
pub use types::{AnalysisResult, FatigueTrend, HistoryRecord, StepEvent, Tier, Validity};

/// JSON inn → analyse → JSON ut (AnalysisResult).
///
/// `config_json` overstyrer standardkonfigurasjonen når den er satt.
pub fn analyze_session_json(input_json: &str, config_json: Option<&str>) -> Result<String> {
    let input = SessionInput::from_json_str(input_json)?;
    let owned;
    let config = match config_json {
        Some(c) => {
            owned = AnalysisConfig::from_json_str(c)?;
            &owned
        }
        None => AnalysisConfig::shared_default(),
    };
    let result = SessionAnalyzer::new(config).analyze(&input)?;
    Ok(serde_json::to_string(&result)?)
}
