// core/src/config.rs
use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// GSS-terskler for én sensorposisjon. Brukes kun til klassifisering,
/// aldri til selve GSS-beregningen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceProfile {
    pub good: (f64, f64),
    pub warn: (f64, f64),
}

impl DeviceProfile {
    pub const fn new(good: (f64, f64), warn: (f64, f64)) -> Self {
        Self { good, warn }
    }
}

/// Navn → DeviceProfile. Skrivebeskyttet etter konstruksjon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceRegistry {
    profiles: BTreeMap<String, DeviceProfile>,
}

impl DeviceRegistry {
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, DeviceProfile)>,
        S: Into<String>,
    {
        Self {
            profiles: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&DeviceProfile> {
        self.profiles.get(name)
    }

    /// Som `get`, men ukjent navn er en datafeil.
    pub fn lookup(&self, name: &str) -> Result<&DeviceProfile> {
        self.get(name).ok_or_else(|| AnalysisError::UnknownDevice { name: name.to_string() })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::from_entries([
            ("chest_harness", DeviceProfile::new((0.0, 3.0), (3.0, 6.0))),
            ("wrist", DeviceProfile::new((1.0, 4.0), (4.0, 8.0))),
            ("waist_pocket", DeviceProfile::new((2.0, 6.0), (6.0, 10.0))),
            ("backpack", DeviceProfile::new((4.0, 9.0), (9.0, 13.0))),
            ("handheld", DeviceProfile::new((3.0, 8.0), (8.0, 14.0))),
        ])
    }
}

/// Ett trinn i kjeden av terskel-policyer for toppdeteksjon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakPolicy {
    pub name: String,
    pub height: HeightRule,
    /// Minste prominens som andel av envelope-standardavviket
    pub prominence_std_factor: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum HeightRule {
    /// Høyde ≥ gitt persentil av envelope
    Percentile(f64),
    /// Høyde ≥ snittet av envelope
    Mean,
}

/// Faste konstanter for filtrering, stegdeteksjon og vindusberegninger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConstants {
    pub gravity: f64,
    pub fallback_fs: u32,
    pub min_samples_for_fs: usize,
    pub filter_order: usize,
    pub lowpass_cap_hz: f64,
    pub step_band_hz: (f64, f64),
    pub envelope_window_s: f64,
    pub min_step_spacing_s: f64,
    pub min_viable_steps: usize,
    pub peak_policies: Vec<PeakPolicy>,
    /// Gyldig intervall for kadens/asymmetri (sek)
    pub cadence_interval_s: (f64, f64),
    /// Gyldig intervall for kadens-over-tid (sek)
    pub cadence_series_interval_s: (f64, f64),
    pub cadence_window: usize,
    pub cadence_window_min: usize,
    pub cadence_smoothing_sigma: f64,
    pub cadence_display_clamp: (f64, f64),
    pub fatigue_window_min: f64,
    pub fatigue_span_cap_min: f64,
    pub fatigue_min_impacts: usize,
    pub trend_epsilon: f64,
}

impl Default for FilterConstants {
    fn default() -> Self {
        Self {
            gravity: 9.81,
            fallback_fs: 100,
            min_samples_for_fs: 11,
            filter_order: 4,
            lowpass_cap_hz: 20.0,
            step_band_hz: (1.5, 4.0),
            envelope_window_s: 0.1,
            min_step_spacing_s: 0.27,
            min_viable_steps: 4,
            peak_policies: vec![
                PeakPolicy {
                    name: "strict".into(),
                    height: HeightRule::Percentile(65.0),
                    prominence_std_factor: 0.5,
                },
                PeakPolicy {
                    name: "relaxed".into(),
                    height: HeightRule::Mean,
                    prominence_std_factor: 0.2,
                },
            ],
            cadence_interval_s: (0.25, 1.0),
            cadence_series_interval_s: (0.27, 1.0),
            cadence_window: 40,
            cadence_window_min: 10,
            cadence_smoothing_sigma: 6.0,
            cadence_display_clamp: (100.0, 230.0),
            fatigue_window_min: 2.0,
            fatigue_span_cap_min: 60.0,
            fatigue_min_impacts: 4,
            trend_epsilon: 1e-4,
        }
    }
}

/// Øvre grenser for overstyrte verdier; over dette blir løkkene urimelig lange.
const MAX_FILTER_ORDER: usize = 8;
const MAX_ENVELOPE_WINDOW_S: f64 = 5.0;
const MAX_STEP_SPACING_S: f64 = 10.0;
const MAX_SMOOTHING_SIGMA: f64 = 100.0;
const MAX_FATIGUE_WINDOWS: f64 = 1000.0;

fn invalid(field: &'static str, reason: impl Into<String>) -> AnalysisError {
    AnalysisError::InvalidConfig { field, reason: reason.into() }
}

fn positive(field: &'static str, v: f64) -> Result<()> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be finite and > 0, got {v}")))
    }
}

fn ordered_range(field: &'static str, (lo, hi): (f64, f64), allow_equal: bool) -> Result<()> {
    let (ordered, op) = if allow_equal { (lo <= hi, "<=") } else { (lo < hi, "<") };
    if lo.is_finite() && hi.is_finite() && lo >= 0.0 && ordered {
        Ok(())
    } else {
        Err(invalid(field, format!("expected 0 <= lo {op} hi, got ({lo}, {hi})")))
    }
}

impl PeakPolicy {
    pub fn validate(&self) -> Result<()> {
        if let HeightRule::Percentile(q) = self.height {
            if !(0.0..=100.0).contains(&q) {
                return Err(invalid("peak_policies.height", format!("percentile {q} outside [0, 100]")));
            }
        }
        if !(self.prominence_std_factor.is_finite() && self.prominence_std_factor >= 0.0) {
            return Err(invalid(
                "peak_policies.prominence_std_factor",
                format!("must be finite and >= 0, got {}", self.prominence_std_factor),
            ));
        }
        Ok(())
    }
}

impl FilterConstants {
    /// Avvis verdier som gir meningsløse eller ubegrensede beregninger
    /// (tomme policy-kjeder, nullbredde-vinduer, omvendte bånd).
    pub fn validate(&self) -> Result<()> {
        positive("gravity", self.gravity)?;
        if self.fallback_fs == 0 {
            return Err(invalid("fallback_fs", "must be >= 1"));
        }
        if !(1..=MAX_FILTER_ORDER).contains(&self.filter_order) {
            return Err(invalid("filter_order", format!("must be in 1..={MAX_FILTER_ORDER}, got {}", self.filter_order)));
        }
        positive("lowpass_cap_hz", self.lowpass_cap_hz)?;
        let (lo, hi) = self.step_band_hz;
        if !(lo.is_finite() && hi.is_finite() && lo > 0.0 && lo < hi) {
            return Err(invalid("step_band_hz", format!("expected 0 < lo < hi, got ({lo}, {hi})")));
        }
        if !(self.envelope_window_s.is_finite() && (0.0..=MAX_ENVELOPE_WINDOW_S).contains(&self.envelope_window_s)) {
            return Err(invalid(
                "envelope_window_s",
                format!("must be in [0, {MAX_ENVELOPE_WINDOW_S}], got {}", self.envelope_window_s),
            ));
        }
        positive("min_step_spacing_s", self.min_step_spacing_s)?;
        if self.min_step_spacing_s > MAX_STEP_SPACING_S {
            return Err(invalid("min_step_spacing_s", format!("must be <= {MAX_STEP_SPACING_S}")));
        }
        if self.min_viable_steps == 0 {
            return Err(invalid("min_viable_steps", "must be >= 1"));
        }
        if self.peak_policies.is_empty() {
            return Err(invalid("peak_policies", "at least one policy is required"));
        }
        self.peak_policies.iter().try_for_each(PeakPolicy::validate)?;

        ordered_range("cadence_interval_s", self.cadence_interval_s, false)?;
        ordered_range("cadence_series_interval_s", self.cadence_series_interval_s, false)?;
        if self.cadence_window_min == 0 {
            return Err(invalid("cadence_window_min", "must be >= 1"));
        }
        if self.cadence_window < self.cadence_window_min {
            return Err(invalid(
                "cadence_window",
                format!("{} is below cadence_window_min {}", self.cadence_window, self.cadence_window_min),
            ));
        }
        if !(self.cadence_smoothing_sigma.is_finite()
            && (0.0..=MAX_SMOOTHING_SIGMA).contains(&self.cadence_smoothing_sigma))
        {
            return Err(invalid(
                "cadence_smoothing_sigma",
                format!("must be in [0, {MAX_SMOOTHING_SIGMA}], got {}", self.cadence_smoothing_sigma),
            ));
        }
        ordered_range("cadence_display_clamp", self.cadence_display_clamp, true)?;

        positive("fatigue_window_min", self.fatigue_window_min)?;
        positive("fatigue_span_cap_min", self.fatigue_span_cap_min)?;
        let windows = self.fatigue_span_cap_min / self.fatigue_window_min;
        if !(windows <= MAX_FATIGUE_WINDOWS) {
            return Err(invalid(
                "fatigue_window_min",
                format!("span cap / window = {windows:.0} exceeds {MAX_FATIGUE_WINDOWS} windows"),
            ));
        }
        if self.fatigue_min_impacts == 0 {
            return Err(invalid("fatigue_min_impacts", "must be >= 1"));
        }
        if !(self.trend_epsilon.is_finite() && self.trend_epsilon >= 0.0) {
            return Err(invalid("trend_epsilon", format!("must be finite and >= 0, got {}", self.trend_epsilon)));
        }
        Ok(())
    }
}

/// Eksplisitt, uforanderlig konfigurasjon som sendes inn i SessionAnalyzer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub filters: FilterConstants,
    pub devices: DeviceRegistry,
}

static SHARED_DEFAULT: Lazy<AnalysisConfig> = Lazy::new(AnalysisConfig::default);

impl AnalysisConfig {
    /// Prosess-delt standardkonfig, bygget én gang og aldri mutert.
    pub fn shared_default() -> &'static AnalysisConfig {
        &SHARED_DEFAULT
    }

    /// Parse og valider en overstyring.
    pub fn from_json_str(json_in: &str) -> Result<Self> {
        let mut de = serde_json::Deserializer::from_str(json_in);
        let config: Self =
            serde_path_to_error::deserialize(&mut de).map_err(|e| AnalysisError::parse("AnalysisConfig", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.filters.validate()?;
        for name in self.devices.names() {
            if let Some(p) = self.devices.get(name) {
                ordered_range("devices.good", p.good, true)?;
                ordered_range("devices.warn", p.warn, true)?;
            }
        }
        Ok(())
    }
}
