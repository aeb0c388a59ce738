use log::debug;

use crate::config::FilterConstants;
use crate::smoothing::gaussian_smooth;
use crate::stats::{diff, mean, median, ols_slope, std_dev, RoundTo};
use crate::types::{CadencePoint, FatigueTrend, FatigueWindow, StepEvent};

/// Glidende kadens over tid, Gauss-glattet og klemt til visningsområdet.
/// Klemmingen er kosmetisk og brukes ikke i andre metrikker.
///
/// Tom serie ved < 5 steg eller < 3 gyldige vinduer.
pub fn cadence_over_time(step_times: &[f64], consts: &FilterConstants) -> Vec<CadencePoint> {
    if step_times.len() < 5 {
        return Vec::new();
    }
    let mut ws = consts.cadence_window;
    if step_times.len() < ws + 1 {
        ws = consts.cadence_window_min.max(step_times.len() / 3);
    }
    let intervals = diff(step_times);
    if ws == 0 || intervals.len() < ws {
        return Vec::new();
    }
    let mids = &step_times[1..];
    let (lo, hi) = consts.cadence_series_interval_s;

    let mut times = Vec::new();
    let mut cads = Vec::new();
    for (i, w) in intervals.windows(ws).enumerate() {
        let valid: Vec<f64> = w.iter().copied().filter(|iv| (lo..=hi).contains(iv)).collect();
        if valid.len() as f64 > ws as f64 * 0.5 {
            let med = median(&valid);
            if med > 0.0 {
                cads.push(60.0 / med);
                times.push(mids[i + ws / 2]);
            }
        }
    }
    debug!("cadence_over_time: window={} points={}", ws, cads.len());
    if cads.len() < 3 {
        return Vec::new();
    }

    let (cmin, cmax) = consts.cadence_display_clamp;
    gaussian_smooth(&cads, consts.cadence_smoothing_sigma)
        .into_iter()
        .zip(times)
        .map(|(c, t)| CadencePoint { time: t, cadence: c.clamp(cmin, cmax) })
        .collect()
}

/// Fatigue-indeks per faste vindu (standard 2 min, maks 60 min totalt).
/// Vinduer med færre enn 4 impacts utelates (hull er lov, aldri null-fylt).
pub fn fatigue_index(
    steps: &[StepEvent],
    session_start: f64,
    duration_secs: f64,
    consts: &FilterConstants,
) -> Vec<FatigueWindow> {
    let width = consts.fatigue_window_min * 60.0;
    if !(width > 0.0) {
        return Vec::new();
    }
    let span = duration_secs.min(consts.fatigue_span_cap_min * 60.0);

    let mut out = Vec::new();
    let mut k = 0usize;
    loop {
        let start = k as f64 * width;
        if start >= span {
            break;
        }
        let (a, b) = (session_start + start, session_start + start + width);
        let window: Vec<f64> = steps
            .iter()
            .filter(|s| s.time >= a && s.time < b)
            .map(|s| s.impact)
            .collect();
        if window.len() >= consts.fatigue_min_impacts {
            let abs_imp: Vec<f64> = window.iter().map(|v| v.abs()).collect();
            let value = (0.6 * mean(&abs_imp) + 0.4 * std_dev(&window)).round_to(3);
            out.push(FatigueWindow { time_min: start / 60.0, value });
        }
        k += 1;
    }
    out
}

/// OLS-stigning av fatigue mot tid (min). None ved < 2 punkter.
pub fn fatigue_slope(series: &[FatigueWindow]) -> Option<f64> {
    let xs: Vec<f64> = series.iter().map(|w| w.time_min).collect();
    let ys: Vec<f64> = series.iter().map(|w| w.value).collect();
    ols_slope(&xs, &ys)
}

/// > ε => økende fatigue, < −ε => bedring, ellers stabil.
pub fn classify_trend(slope: f64, epsilon: f64) -> FatigueTrend {
    if slope > epsilon {
        FatigueTrend::Increasing
    } else if slope < -epsilon {
        FatigueTrend::Improving
    } else {
        FatigueTrend::Stable
    }
}
