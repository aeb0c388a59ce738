use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::stats::RoundTo;

/// Lavpassfiltrerte akser + gravitasjonskompensert magnitude.
/// Samme lengde som rå-serien; bygges én gang per økt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilteredSeries {
    pub time: Vec<f64>,
    pub x: Option<Vec<f64>>,
    pub y: Option<Vec<f64>>,
    pub z: Vec<f64>,
    /// √(x² + y² + (z − g)²), eller |z − g| når laterale akser mangler
    pub magnitude: Vec<f64>,
    /// Estimert samplingsrate (Hz)
    pub fs: u32,
}

impl FilteredSeries {
    pub fn len(&self) -> usize {
        self.z.len()
    }

    pub fn is_empty(&self) -> bool {
        self.z.is_empty()
    }

    /// Tid fra første til siste sample (sek).
    pub fn duration_secs(&self) -> f64 {
        match (self.time.first(), self.time.last()) {
            (Some(a), Some(b)) => (b - a).max(0.0),
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepEvent {
    pub time: f64,    // sek (samme tidsbase som rå-serien)
    pub impact: f64,  // m/s², |båndpasset signal| i toppen
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FatigueWindow {
    pub time_min: f64, // vindusstart, minutter fra øktstart
    pub value: f64,
}

/// Glattet kadens over tid (kun for visning, klemt til 100–230 spm).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CadencePoint {
    pub time: f64,    // sek
    pub cadence: f64, // steg/min
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FatigueTrend {
    Increasing,
    Improving,
    Stable,
}

impl FatigueTrend {
    pub fn label(&self) -> &'static str {
        match self {
            FatigueTrend::Increasing => "increasing fatigue",
            FatigueTrend::Improving => "improving",
            FatigueTrend::Stable => "stable",
        }
    }
}

/// Statusnivå for en metrikk (grønn/gul/rød i UI).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Optimal,
    Moderate,
    Review,
}

impl Tier {
    pub fn label(&self) -> &'static str {
        match self {
            Tier::Optimal => "optimal",
            Tier::Moderate => "moderate",
            Tier::Review => "review",
        }
    }
}

/// Om en metrikk er beregnet fra tilstrekkelig data eller satt til standardverdi.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Validity {
    Computed,
    Defaulted,
}

impl Validity {
    pub fn from_sufficient(sufficient: bool) -> Self {
        if sufficient { Validity::Computed } else { Validity::Defaulted }
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, Validity::Computed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricQuality {
    pub cadence: Validity,
    pub asymmetry: Validity,
    pub rei_consistency: Validity,
    pub ground_shock: Validity,
    pub fatigue_trend: Validity,
    pub cadence_series: Validity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub rei: f64,          // 0–100, 1 desimal
    pub gss: f64,          // m/s², 2 desimaler
    pub cadence: f64,      // spm, 1 desimal
    pub asymmetry: f64,    // %, 2 desimaler
    pub fatigue_series: Vec<FatigueWindow>,
    pub fatigue_slope: f64,
    pub fatigue_trend: FatigueTrend,
    pub cadence_series: Vec<CadencePoint>,
    pub step_count: usize,
    pub duration_min: f64,
    pub avg_speed: f64,    // m/s
    pub device_name: String,
    pub gss_good: (f64, f64),
    pub gss_warn: (f64, f64),
    /// Navnet på toppdeteksjons-policyen som ga stegene (None = ingen)
    pub peak_policy: Option<String>,
    pub quality: MetricQuality,
    pub filtered: FilteredSeries,
    pub steps: Vec<StepEvent>,
    pub generated_at: DateTime<Utc>,
}

impl AnalysisResult {
    /// Bygger historikk-posten som appendes til øktloggen.
    pub fn history_record(&self) -> HistoryRecord {
        HistoryRecord {
            date: self.generated_at.format(HistoryRecord::DATE_FORMAT).to_string(),
            duration: self.duration_min.round_to(1),
            steps: self.step_count,
            device: self.device_name.clone(),
            rei: self.rei,
            gss: self.gss,
            cadence: self.cadence,
            asymmetry: self.asymmetry,
            fatigue_slope: self.fatigue_slope,
            speed: self.avg_speed.round_to(2),
        }
    }
}

/// Én linje i den persisterte økthistorikken (append-only).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub date: String,
    pub duration: f64,   // minutter
    pub steps: usize,
    pub device: String,
    pub rei: f64,
    pub gss: f64,
    pub cadence: f64,
    pub asymmetry: f64,
    pub fatigue_slope: f64,
    pub speed: f64,      // m/s
}

impl HistoryRecord {
    pub const DATE_FORMAT: &'static str = "%Y-%m-%d %H:%M";
}
