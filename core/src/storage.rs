use std::path::{Path, PathBuf};

use log::{info, warn};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::stats::mean;
use crate::types::HistoryRecord;

/// Append-only økthistorikk lagret som JSON-liste på disk.
#[derive(Debug, Clone)]
pub struct SessionHistory {
    path: PathBuf,
}

impl SessionHistory {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Leser historikken. Hvis filen ikke finnes, returneres tom liste.
    pub fn load(&self) -> Result<Vec<HistoryRecord>> {
        if !self.path.exists() {
            warn!("history: {} not found, starting empty", self.path.display());
            return Ok(Vec::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        let records: Vec<HistoryRecord> = serde_json::from_str(&contents)?;
        Ok(records)
    }

    /// Les – legg til – skriv (pretty-print). Eksisterende poster endres aldri.
    pub fn append(&self, record: HistoryRecord) -> Result<usize> {
        let mut records = self.load()?;
        records.push(record);
        let json = serde_json::to_string_pretty(&records)?;
        std::fs::write(&self.path, json)?;
        info!("history: appended session #{} to {}", records.len(), self.path.display());
        Ok(records.len())
    }

    /// De n siste postene, i opprinnelig rekkefølge.
    pub fn last_n(&self, n: usize) -> Result<Vec<HistoryRecord>> {
        let records = self.load()?;
        let skip = records.len().saturating_sub(n);
        Ok(records.into_iter().skip(skip).collect())
    }
}

/// Akkumulert statistikk over hele historikken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HistorySummary {
    pub sessions: usize,
    pub mean_rei: f64,
    pub mean_cadence: f64,
    pub best_rei: Option<f64>,
    pub total_hours: f64,
    /// speed (m/s) · duration (min) · 60 / 1000, summert
    pub estimated_km: f64,
}

impl HistorySummary {
    pub fn from_records(records: &[HistoryRecord]) -> Self {
        if records.is_empty() {
            return Self::default();
        }
        let rei: Vec<f64> = records.iter().map(|r| r.rei).collect();
        let cad: Vec<f64> = records.iter().map(|r| r.cadence).collect();
        Self {
            sessions: records.len(),
            mean_rei: mean(&rei),
            mean_cadence: mean(&cad),
            best_rei: rei.iter().copied().max_by_key(|v| OrderedFloat(*v)),
            total_hours: records.iter().map(|r| r.duration).sum::<f64>() / 60.0,
            estimated_km: records.iter().map(|r| r.speed * r.duration * 60.0 / 1000.0).sum(),
        }
    }
}
