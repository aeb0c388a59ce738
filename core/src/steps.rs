// core/src/steps.rs
use log::{debug, warn};

use crate::config::{FilterConstants, HeightRule, PeakPolicy};
use crate::signal::bandpass;
use crate::smoothing::moving_average;
use crate::stats::{mean, percentile, std_dev};
use crate::types::{FilteredSeries, StepEvent};

/// Resultat fra stegdeteksjonen, inkl. mellomsignalene (til plotting/debug).
#[derive(Debug, Clone, PartialEq)]
pub struct StepDetection {
    pub steps: Vec<StepEvent>,
    /// Navn på policyen som ga stegene (None hvis ingen ga nok topper)
    pub policy: Option<String>,
    /// Om en reserve-policy (ikke første i kjeden) ble brukt
    pub used_fallback: bool,
    pub band_signal: Vec<f64>,
    pub envelope: Vec<f64>,
}

/// Lokale maksima. Flate topper gir midtpunktet (venstre midt ved partall).
pub fn local_maxima(xs: &[f64]) -> Vec<usize> {
    let n = xs.len();
    let mut peaks = Vec::new();
    if n < 3 {
        return peaks;
    }
    let mut i = 1;
    while i < n - 1 {
        if xs[i - 1] < xs[i] {
            let mut j = i + 1;
            while j < n - 1 && xs[j] == xs[i] {
                j += 1;
            }
            if xs[j] < xs[i] {
                peaks.push((i + j - 1) / 2);
                i = j;
                continue;
            }
        }
        i += 1;
    }
    peaks
}

/// Prominens: høyden over det høyeste av de to laveste punktene man må
/// ned til (mot venstre og høyre) før man møter et høyere punkt.
pub fn prominence(xs: &[f64], peak: usize) -> f64 {
    let h = xs[peak];
    let left_min = xs[..=peak]
        .iter()
        .rev()
        .take_while(|&&v| v <= h)
        .fold(h, |m, &v| m.min(v));
    let right_min = xs[peak..]
        .iter()
        .take_while(|&&v| v <= h)
        .fold(h, |m, &v| m.min(v));
    h - left_min.max(right_min)
}

/// Toppdeteksjon med høyde- og prominens-krav, deretter minsteavstand
/// håndhevet i tidsrekkefølge (første kvalifiserte topp etter pausen vinner).
pub fn find_peaks(xs: &[f64], min_height: f64, min_distance: usize, min_prominence: f64) -> Vec<usize> {
    let min_distance = min_distance.max(1);
    let mut kept: Vec<usize> = Vec::new();
    for p in local_maxima(xs) {
        if xs[p] < min_height || prominence(xs, p) < min_prominence {
            continue;
        }
        match kept.last() {
            Some(&last) if p - last < min_distance => {}
            _ => kept.push(p),
        }
    }
    kept
}

fn policy_threshold(policy: &PeakPolicy, envelope: &[f64]) -> (f64, f64) {
    let height = match policy.height {
        HeightRule::Percentile(q) => percentile(envelope, q),
        HeightRule::Mean => mean(envelope),
    };
    (height, std_dev(envelope) * policy.prominence_std_factor)
}

/// Rå-signalet for stegdeteksjon: vektormagnitude av de filtrerte aksene,
/// eller filtrert z hvis x/y mangler.
fn step_source(series: &FilteredSeries) -> Vec<f64> {
    match (&series.x, &series.y) {
        (Some(x), Some(y)) => x
            .iter()
            .zip(y.iter())
            .zip(series.z.iter())
            .map(|((a, b), c)| (a * a + b * b + c * c).sqrt())
            .collect(),
        _ => series.z.clone(),
    }
}

/// Minste stegavstand i sampler, rundet opp. 1e-9 tar flyttallsstøy
/// (100 · 0.27 = 27.000000000000004) slik at eksakte produkter ikke runder opp.
pub fn min_spacing_samples(fs: f64, spacing_s: f64) -> f64 {
    (fs * spacing_s - 1e-9).ceil()
}

/// Detekter steg: båndpass (1.5–4 Hz) → |·| → glidende snitt (~0.1 s) →
/// policy-kjede (streng, så avslappet) til minst `min_viable_steps` topper.
pub fn detect_steps(series: &FilteredSeries, consts: &FilterConstants) -> StepDetection {
    let fs = series.fs as f64;
    let raw = step_source(series);
    let (lo, hi) = consts.step_band_hz;
    let band_signal = bandpass(&raw, lo, hi, fs, consts.filter_order);
    let rectified: Vec<f64> = band_signal.iter().map(|v| v.abs()).collect();
    let window = ((fs * consts.envelope_window_s) as usize).max(1);
    let envelope = moving_average(&rectified, window);
    // Rund opp: avstanden i sampler må aldri bli kortere enn min_step_spacing_s
    let min_distance = (min_spacing_samples(fs, consts.min_step_spacing_s) as usize).max(1);

    let mut chosen: Option<(usize, Vec<usize>)> = None;
    for (tier, policy) in consts.peak_policies.iter().enumerate() {
        let (height, prom) = policy_threshold(policy, &envelope);
        let peaks = find_peaks(&envelope, height, min_distance, prom);
        debug!(
            "detect_steps: policy={} height>={:.4} prominence>={:.4} distance={} -> {} peaks",
            policy.name,
            height,
            prom,
            min_distance,
            peaks.len()
        );
        let enough = peaks.len() >= consts.min_viable_steps;
        chosen = Some((tier, peaks));
        if enough {
            break;
        }
    }

    let (policy, used_fallback, peaks) = match chosen {
        Some((tier, peaks)) if !peaks.is_empty() => {
            (Some(consts.peak_policies[tier].name.clone()), tier > 0, peaks)
        }
        Some((tier, _)) => (None, tier > 0, Vec::new()),
        None => (None, false, Vec::new()),
    };
    if peaks.len() < consts.min_viable_steps {
        warn!("detect_steps: only {} steps after all policies", peaks.len());
    } else if used_fallback {
        warn!("detect_steps: fallback policy {:?} used ({} steps)", policy, peaks.len());
    }

    let steps = peaks
        .into_iter()
        .map(|p| StepEvent { time: series.time[p], impact: band_signal[p].abs() })
        .collect();

    StepDetection { steps, policy, used_fallback, band_signal, envelope }
}
