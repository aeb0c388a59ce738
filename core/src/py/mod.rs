// PyO3-bindinger for Streamlit/Python-fronten. Bygges kun med `--features python`.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::wrap_pyfunction;

use serde_json as json;
use serde_path_to_error as spte;

use crate::config::AnalysisConfig;
use crate::types::AnalysisResult;

// ──────────────────────────────────────────────────────────────────────────────
// Analyse: SessionInput-JSON (+ valgfri konfig) → AnalysisResult-JSON
// ──────────────────────────────────────────────────────────────────────────────

#[pyfunction]
#[pyo3(signature = (json_in, config_json=None))]
fn analyze_session_json(json_in: &str, config_json: Option<&str>) -> PyResult<String> {
    crate::analyze_session_json(json_in, config_json).map_err(|e| PyValueError::new_err(e.to_string()))
}

// ──────────────────────────────────────────────────────────────────────────────
// Historikk: AnalysisResult-JSON → HistoryRecord-JSON (Python appender selv)
// ──────────────────────────────────────────────────────────────────────────────

#[pyfunction]
fn history_record_json(result_json: &str) -> PyResult<String> {
    let mut de = json::Deserializer::from_str(result_json);
    let result: AnalysisResult = spte::deserialize(&mut de).map_err(|e| {
        PyValueError::new_err(format!("parse error (AnalysisResult) at {}: {}", e.path(), e))
    })?;
    json::to_string(&result.history_record()).map_err(|e| PyValueError::new_err(e.to_string()))
}

#[pyfunction]
fn device_positions() -> Vec<String> {
    AnalysisConfig::shared_default().devices.names().map(str::to_owned).collect()
}

// ──────────────────────────────────────────────────────────────────────────────
// PyO3-MODUL
// ──────────────────────────────────────────────────────────────────────────────

#[pymodule]
fn rungraph_core(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(analyze_session_json, m)?)?;
    m.add_function(wrap_pyfunction!(history_record_json, m)?)?;
    m.add_function(wrap_pyfunction!(device_positions, m)?)?;
    Ok(())
}
