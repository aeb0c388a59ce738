//! Signalkondisjonering: estimering av samplingsrate og nullfase
//! Butterworth-filtrering av rå akser til en gravitasjonskompensert
//! magnitude-serie.
//!
//! Filtrene er kaskader av andreordens seksjoner (biquads) designet med
//! bilineær transformasjon, og kjøres forover + bakover (filtfilt) slik at
//! faseforsinkelsen kanselleres. Det krever hele serien i minnet.

use log::debug;

use crate::config::FilterConstants;
use crate::models::{has_lateral_axes, RawAccelSample};
use crate::stats::{diff, median};
use crate::types::FilteredSeries;

/// Cutoff klemmes til maks 0.99 × Nyquist.
const MAX_NYQUIST_FRACTION: f64 = 0.99;

/// Estimer samplingsrate (Hz) som 1/median(Δt), avrundet.
/// Faller tilbake til `fallback` ved for få sampler eller ikke-positiv median.
pub fn estimate_sample_rate(times: &[f64], min_samples: usize, fallback: u32) -> u32 {
    if times.len() < min_samples.max(2) {
        return fallback;
    }
    let dt = median(&diff(times));
    if !(dt > 0.0) {
        return fallback;
    }
    let fs = (1.0 / dt).round();
    if fs >= 1.0 && fs.is_finite() {
        fs as u32
    } else {
        fallback
    }
}

/// Andreordens seksjon, normalisert slik at a0 = 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Biquad {
    pub b: [f64; 3],
    pub a: [f64; 3],
}

impl Biquad {
    fn normalized(b: [f64; 3], a: [f64; 3]) -> Self {
        let a0 = a[0];
        Self {
            b: [b[0] / a0, b[1] / a0, b[2] / a0],
            a: [1.0, a[1] / a0, a[2] / a0],
        }
    }

    /// DC-forsterkning (z = 1).
    fn dc_gain(&self) -> f64 {
        let den = self.a[0] + self.a[1] + self.a[2];
        if den.abs() < f64::EPSILON {
            0.0
        } else {
            (self.b[0] + self.b[1] + self.b[2]) / den
        }
    }

    /// Stasjonær tilstand (transponert direkte form II) for enhetssprang.
    fn step_state(&self) -> [f64; 2] {
        let g = self.dc_gain();
        let z2 = self.b[2] - self.a[2] * g;
        let z1 = self.b[1] - self.a[1] * g + z2;
        [z1, z2]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Low,
    High,
}

/// Butterworth av gitt orden som kaskade av seksjoner.
/// `wn` er cutoff som andel av Nyquist (0, 1).
fn butterworth_sections(pass: Pass, order: usize, wn: f64) -> Vec<Biquad> {
    let order = order.max(1);
    let w0 = std::f64::consts::PI * wn;
    let (sin_w0, cos_w0) = w0.sin_cos();
    let mut sections = Vec::with_capacity(order / 2 + 1);

    // Polpar: Q_k = 1 / (2 sin((2k+1)π / 2N))
    for k in 0..order / 2 {
        let q = 1.0 / (2.0 * ((2 * k + 1) as f64 * std::f64::consts::PI / (2 * order) as f64).sin());
        let alpha = sin_w0 / (2.0 * q);
        let b = match pass {
            Pass::Low => [(1.0 - cos_w0) / 2.0, 1.0 - cos_w0, (1.0 - cos_w0) / 2.0],
            Pass::High => [(1.0 + cos_w0) / 2.0, -(1.0 + cos_w0), (1.0 + cos_w0) / 2.0],
        };
        sections.push(Biquad::normalized(b, [1.0 + alpha, -2.0 * cos_w0, 1.0 - alpha]));
    }

    // Odde orden: én førsteordens seksjon (b2 = a2 = 0)
    if order % 2 == 1 {
        let k = (w0 / 2.0).tan();
        let b = match pass {
            Pass::Low => [k, k, 0.0],
            Pass::High => [1.0, -1.0, 0.0],
        };
        sections.push(Biquad::normalized(b, [1.0 + k, k - 1.0, 0.0]));
    }
    sections
}

fn normalized_cutoff(cutoff_hz: f64, fs: f64) -> Option<f64> {
    let nyq = fs / 2.0;
    if !(nyq > 0.0) || !(cutoff_hz > 0.0) {
        return None;
    }
    Some((cutoff_hz / nyq).min(MAX_NYQUIST_FRACTION))
}

/// Kjør kaskaden kausalt, med starttilstand skalert til første verdi.
fn sosfilt(sections: &[Biquad], xs: &[f64]) -> Vec<f64> {
    let Some(&x0) = xs.first() else {
        return Vec::new();
    };

    let mut state: Vec<[f64; 2]> = Vec::with_capacity(sections.len());
    let mut scale = x0;
    for s in sections {
        let zi = s.step_state();
        state.push([zi[0] * scale, zi[1] * scale]);
        scale *= s.dc_gain();
    }

    xs.iter()
        .map(|&x| {
            let mut v = x;
            for (s, z) in sections.iter().zip(state.iter_mut()) {
                let y = s.b[0] * v + z[0];
                z[0] = s.b[1] * v - s.a[1] * y + z[1];
                z[1] = s.b[2] * v - s.a[2] * y;
                v = y;
            }
            v
        })
        .collect()
}

/// Nullfase-filtrering: odde speiling i endene, forover, bakover.
fn filtfilt(sections: &[Biquad], xs: &[f64]) -> Vec<f64> {
    let n = xs.len();
    if n < 2 || sections.is_empty() {
        return xs.to_vec();
    }
    let pad = (3 * (2 * sections.len() + 1)).min(n - 1);
    let first = xs[0];
    let last = xs[n - 1];

    let mut ext = Vec::with_capacity(n + 2 * pad);
    ext.extend((0..pad).map(|i| 2.0 * first - xs[pad - i]));
    ext.extend_from_slice(xs);
    ext.extend((0..pad).map(|i| 2.0 * last - xs[n - 2 - i]));

    let mut y = sosfilt(sections, &ext);
    y.reverse();
    let mut y = sosfilt(sections, &y);
    y.reverse();
    y[pad..pad + n].to_vec()
}

/// Nullfase Butterworth lavpass. Ugyldig cutoff/fs => kopi av input.
pub fn lowpass(data: &[f64], cutoff_hz: f64, fs: f64, order: usize) -> Vec<f64> {
    match normalized_cutoff(cutoff_hz, fs) {
        Some(wn) => filtfilt(&butterworth_sections(Pass::Low, order, wn), data),
        None => data.to_vec(),
    }
}

/// Nullfase båndpass: høypass(lo) og lavpass(hi) i samme kaskade.
pub fn bandpass(data: &[f64], lo_hz: f64, hi_hz: f64, fs: f64, order: usize) -> Vec<f64> {
    let mut sections = Vec::new();
    if let Some(wn) = normalized_cutoff(lo_hz, fs) {
        sections.extend(butterworth_sections(Pass::High, order, wn));
    }
    if let Some(wn) = normalized_cutoff(hi_hz, fs) {
        sections.extend(butterworth_sections(Pass::Low, order, wn));
    }
    filtfilt(&sections, data)
}

/// Kondisjoner rå akselerometerdata: estimer fs, lavpass hver akse
/// (cutoff = min(cap, fs/2 − 1)), og bygg magnitude med z avbiaset for g.
///
/// Antar at z-aksen er omtrent vertikal; orienteringskorreksjon gjøres ikke.
pub fn condition(samples: &[RawAccelSample], consts: &FilterConstants) -> FilteredSeries {
    let time: Vec<f64> = samples.iter().map(|s| s.t).collect();
    let fs = estimate_sample_rate(&time, consts.min_samples_for_fs, consts.fallback_fs);
    let fs_f = fs as f64;
    let cutoff = consts.lowpass_cap_hz.min(fs_f / 2.0 - 1.0);
    debug!("condition: n={} fs={}Hz lowpass_cutoff={:.2}Hz", samples.len(), fs, cutoff);

    let lateral = has_lateral_axes(samples);
    let axis = |f: fn(&RawAccelSample) -> Option<f64>| -> Vec<f64> {
        let raw: Vec<f64> = samples.iter().map(|s| f(s).unwrap_or(0.0)).collect();
        lowpass(&raw, cutoff, fs_f, consts.filter_order)
    };

    let z = axis(|s| Some(s.z));
    let (x, y) = if lateral {
        (Some(axis(|s| s.x)), Some(axis(|s| s.y)))
    } else {
        (None, None)
    };

    let g = consts.gravity;
    let magnitude = match (&x, &y) {
        (Some(xf), Some(yf)) => xf
            .iter()
            .zip(yf.iter())
            .zip(z.iter())
            .map(|((a, b), c)| (a * a + b * b + (c - g) * (c - g)).sqrt())
            .collect(),
        _ => z.iter().map(|c| (c - g).abs()).collect(),
    };

    FilteredSeries { time, x, y, z, magnitude, fs }
}
