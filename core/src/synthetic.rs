use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

use crate::error::{AnalysisError, Result};
use crate::models::{RawAccelSample, RawGpsSample, SessionInput};

/// Stegfrekvens i demo-økten (Hz) ≈ 170 spm
pub const DEMO_STEP_HZ: f64 = 2.83;
const GRAVITY: f64 = 9.81;

/// Støy-σ (m/s²) for z, x og y
const NOISE_SIGMA: [f64; 3] = [0.15, 0.10, 0.08];

fn noise(sigma: f64) -> Result<Normal<f64>> {
    Normal::new(0.0, sigma).map_err(|e| AnalysisError::InvalidConfig {
        field: "noise_sigma",
        reason: e.to_string(),
    })
}

/// Demo-økt: 2.83 Hz steg, vertikal amplitude som øker ×1.0→×1.4 (fatigue),
/// laterale komponenter med faseforskyvning, støy, og 1 Hz GPS-fart.
/// Deterministisk for gitt seed.
pub fn demo_session(duration_s: u32, fs: u32, seed: u64, device: &str) -> Result<SessionInput> {
    let mut rng = StdRng::seed_from_u64(seed);
    let [nz, nx, ny] = [noise(NOISE_SIGMA[0])?, noise(NOISE_SIGMA[1])?, noise(NOISE_SIGMA[2])?];
    let n = (duration_s as usize) * (fs as usize);
    let dur = duration_s as f64;
    let w = 2.0 * PI * DEMO_STEP_HZ;

    let accel = (0..n)
        .map(|i| {
            // linspace(0, dur, n)
            let t = if n > 1 { dur * i as f64 / (n - 1) as f64 } else { 0.0 };
            let fat = if n > 1 { 1.0 + 0.4 * i as f64 / (n - 1) as f64 } else { 1.0 };
            let z = (w * t).sin() * 0.8 * fat + nz.sample(&mut rng) + GRAVITY;
            let x = (w * t + PI / 4.0).sin() * 0.3 * fat + nx.sample(&mut rng);
            let y = (w * t + PI / 2.0).sin() * 0.15 + ny.sample(&mut rng);
            RawAccelSample::new(t, x, y, z)
        })
        .collect();

    let gps = (0..duration_s)
        .map(|s| {
            let t = s as f64;
            RawGpsSample { t, speed: 3.0 + 0.5 * (2.0 * PI * t / 120.0).sin() }
        })
        .collect();

    Ok(SessionInput::new(accel, Some(gps), device))
}

/// Ren vertikal sinus rundt g (x = y = 0), uten støy.
pub fn vertical_sine(duration_s: f64, fs: u32, freq_hz: f64, amplitude: f64) -> Vec<RawAccelSample> {
    let n = (duration_s * fs as f64).round() as usize;
    (0..n)
        .map(|i| {
            let t = i as f64 / fs as f64;
            RawAccelSample::new(t, 0.0, 0.0, GRAVITY + amplitude * (2.0 * PI * freq_hz * t).sin())
        })
        .collect()
}
