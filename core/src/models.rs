use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// Ett rått akselerometer-sample. Laterale akser kan mangle (kun z logget).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawAccelSample {
    #[serde(alias = "time", alias = "seconds_elapsed")]
    pub t: f64,                 // sek
    #[serde(default, alias = "accel_x")]
    pub x: Option<f64>,         // m/s²
    #[serde(default, alias = "accel_y")]
    pub y: Option<f64>,         // m/s²
    #[serde(alias = "accel_z")]
    pub z: f64,                 // m/s² (antatt ~vertikal)
}

impl RawAccelSample {
    pub fn new(t: f64, x: f64, y: f64, z: f64) -> Self {
        Self { t, x: Some(x), y: Some(y), z }
    }

    /// Kun vertikal akse (f.eks. enkle loggere uten x/y).
    pub fn vertical(t: f64, z: f64) -> Self {
        Self { t, x: None, y: None, z }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawGpsSample {
    #[serde(alias = "time", alias = "seconds_elapsed")]
    pub t: f64,       // sek
    #[serde(alias = "velocity")]
    pub speed: f64,   // m/s
}

/// Alt kjernen trenger for én økt: rå akselerometerserie, valgfri GPS og
/// navnet på sensorposisjonen (DeviceProfile).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInput {
    #[serde(alias = "accel_samples")]
    pub accel: Vec<RawAccelSample>,
    #[serde(default, alias = "gps_samples")]
    pub gps: Option<Vec<RawGpsSample>>,
    #[serde(alias = "device_name", alias = "device_position")]
    pub device: String,
}

impl SessionInput {
    pub fn new(accel: Vec<RawAccelSample>, gps: Option<Vec<RawGpsSample>>, device: impl Into<String>) -> Self {
        Self { accel, gps, device: device.into() }
    }

    /// Parse fra JSON med sti i feilmeldingen (serde_path_to_error).
    pub fn from_json_str(json_in: &str) -> Result<Self> {
        let mut de = serde_json::Deserializer::from_str(json_in);
        serde_path_to_error::deserialize(&mut de).map_err(|e| AnalysisError::parse("SessionInput", e))
    }

    /// Fail-fast validering: tom serie, ikke-endelige verdier, tid som går bakover.
    pub fn validate(&self) -> Result<()> {
        validate_accel(&self.accel)?;
        if let Some(gps) = &self.gps {
            validate_gps(gps)?;
        }
        Ok(())
    }
}

/// Har serien laterale akser (x og y) i minst ett sample?
pub fn has_lateral_axes(samples: &[RawAccelSample]) -> bool {
    samples.iter().any(|s| s.x.is_some()) && samples.iter().any(|s| s.y.is_some())
}

fn check_time(series: &'static str, index: usize, prev: Option<f64>, t: f64) -> Result<()> {
    if !t.is_finite() {
        return Err(AnalysisError::NonFinite { series, field: "time", index });
    }
    match prev {
        Some(p) if t < p => Err(AnalysisError::NonMonotonicTime {
            series,
            index,
            previous: p,
            current: t,
        }),
        _ => Ok(()),
    }
}

pub fn validate_accel(samples: &[RawAccelSample]) -> Result<()> {
    if samples.is_empty() {
        return Err(AnalysisError::EmptySeries { series: "accel" });
    }
    let mut prev = None;
    for (i, s) in samples.iter().enumerate() {
        check_time("accel", i, prev, s.t)?;
        if !s.z.is_finite() {
            return Err(AnalysisError::NonFinite { series: "accel", field: "z", index: i });
        }
        // Manglende x/y er lov (fylles med 0), men oppgitte verdier må være endelige
        if s.x.is_some_and(|v| !v.is_finite()) {
            return Err(AnalysisError::NonFinite { series: "accel", field: "x", index: i });
        }
        if s.y.is_some_and(|v| !v.is_finite()) {
            return Err(AnalysisError::NonFinite { series: "accel", field: "y", index: i });
        }
        prev = Some(s.t);
    }
    Ok(())
}

pub fn validate_gps(samples: &[RawGpsSample]) -> Result<()> {
    if samples.is_empty() {
        return Err(AnalysisError::EmptySeries { series: "gps" });
    }
    let mut prev = None;
    for (i, s) in samples.iter().enumerate() {
        check_time("gps", i, prev, s.t)?;
        if !s.speed.is_finite() {
            return Err(AnalysisError::NonFinite { series: "gps", field: "speed", index: i });
        }
        prev = Some(s.t);
    }
    Ok(())
}
