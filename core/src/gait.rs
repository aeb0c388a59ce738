use crate::config::{DeviceProfile, FilterConstants};
use crate::scoring::classify_inverted;
use crate::stats::{diff, mean, median, percentile, std_dev, variance, RoundTo, EPS};
use crate::types::{StepEvent, Tier, Validity};

/// Running Economy Index (0–100, høyere er bedre):
/// 60 % vertikal stabilitet + 40 % impact-konsistens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rei {
    pub value: f64,
    pub stability: f64,
    pub consistency: f64,
    pub consistency_validity: Validity,
}

pub fn running_economy_index(filtered_z: &[f64], impacts: &[f64], gravity: f64) -> Rei {
    let dev: Vec<f64> = filtered_z.iter().map(|z| z - gravity).collect();
    let abs_dev: Vec<f64> = dev.iter().map(|v| v.abs()).collect();
    let sr = percentile(&abs_dev, 95.0).max(EPS);
    let stability = (1.0 - variance(&dev) / (sr * sr) * 3.0).max(0.0);

    // For få steg => nøytral konsistens (0.5)
    let (consistency, consistency_validity) = if impacts.len() > 4 {
        let abs_imp: Vec<f64> = impacts.iter().map(|v| v.abs()).collect();
        let rel_std = std_dev(impacts) / (mean(&abs_imp) + EPS);
        ((1.0 - rel_std * 2.0).max(0.0), Validity::Computed)
    } else {
        (0.5, Validity::Defaulted)
    };

    let value = (100.0 * (0.6 * stability + 0.4 * consistency)).round_to(1).clamp(0.0, 100.0);
    Rei { value, stability, consistency, consistency_validity }
}

/// Ground Shock Score: snitt av |impact| over alle steg (2 desimaler).
/// Ingen steg => 0.0
pub fn ground_shock_score(impacts: &[f64]) -> f64 {
    if impacts.is_empty() {
        return 0.0;
    }
    let abs_imp: Vec<f64> = impacts.iter().map(|v| v.abs()).collect();
    mean(&abs_imp).round_to(2)
}

/// Invertert skala: ≤ good_hi => optimal, ≤ warn_hi => moderate, ellers review.
pub fn classify_gss(gss: f64, profile: &DeviceProfile) -> Tier {
    classify_inverted(gss, profile.good, profile.warn)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CadenceAsymmetry {
    pub cadence: f64,
    pub asymmetry: f64,
    pub validity: Validity,
}

impl CadenceAsymmetry {
    fn insufficient() -> Self {
        Self { cadence: 0.0, asymmetry: 0.0, validity: Validity::Defaulted }
    }
}

/// Kadens (spm) og venstre/høyre-asymmetri (%) fra stegtider.
///
/// Side-splitt ved partall/oddetall-indeks antar perfekt veksling mellom
/// føttene; feil- eller manglende deteksjoner forskyver splitten uten at det
/// kan oppdages.
pub fn cadence_and_asymmetry(step_times: &[f64], consts: &FilterConstants) -> CadenceAsymmetry {
    if step_times.len() < consts.min_viable_steps {
        return CadenceAsymmetry::insufficient();
    }
    let intervals = diff(step_times);
    let (lo, hi) = consts.cadence_interval_s;
    let valid: Vec<f64> = intervals.iter().copied().filter(|iv| (lo..=hi).contains(iv)).collect();
    // Færre enn 3 gyldige => bruk alle intervaller ufiltrert
    let used = if valid.len() > 2 { valid } else { intervals };

    let med = median(&used);
    if med <= 0.0 {
        return CadenceAsymmetry::insufficient();
    }
    let cadence = (60.0 / med).round_to(1);

    let left: Vec<f64> = used.iter().copied().step_by(2).collect();
    let right: Vec<f64> = used.iter().copied().skip(1).step_by(2).collect();
    let n = left.len().min(right.len());
    let asymmetry = if n > 0 {
        ((mean(&left[..n]) - mean(&right[..n])).abs() / med * 100.0).round_to(2)
    } else {
        0.0
    };

    CadenceAsymmetry { cadence, asymmetry, validity: Validity::Computed }
}

/// Hjelper: impact-verdier fra steg.
pub fn impacts(steps: &[StepEvent]) -> Vec<f64> {
    steps.iter().map(|s| s.impact).collect()
}

/// Hjelper: tidspunkter fra steg.
pub fn step_times(steps: &[StepEvent]) -> Vec<f64> {
    steps.iter().map(|s| s.time).collect()
}
