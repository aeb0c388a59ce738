// core/src/stats.rs
use ordered_float::OrderedFloat;

/// Liten epsilon for divisjonsvakter (median-intervall, snitt-impact osv.)
pub const EPS: f64 = 1e-6;

// --- RoundTo trait (offentlig, brukt av alle metrikk-moduler) ---
pub trait RoundTo {
    fn round_to(self, dp: u32) -> f64;
}

impl RoundTo for f64 {
    #[inline]
    fn round_to(self, dp: u32) -> f64 {
        if dp == 0 { return self.round(); }
        let factor = 10_f64.powi(dp as i32);
        (self * factor).round() / factor
    }
}

/// Aritmetisk snitt. Tom slice => 0.0
pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Populasjonsvarians (ddof = 0).
pub fn variance(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    let m = mean(xs);
    xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / xs.len() as f64
}

/// Populasjonsstandardavvik (ddof = 0).
pub fn std_dev(xs: &[f64]) -> f64 {
    variance(xs).sqrt()
}

fn sorted(xs: &[f64]) -> Vec<f64> {
    let mut v = xs.to_vec();
    v.sort_by_key(|x| OrderedFloat(*x));
    v
}

/// Robust median. Tom slice => 0.0
pub fn median(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    let v = sorted(xs);
    let n = v.len();
    if n % 2 == 1 {
        v[n / 2]
    } else {
        (v[n / 2 - 1] + v[n / 2]) / 2.0
    }
}

/// Persentil med lineær interpolasjon mellom nærmeste rangerte verdier
/// (q i [0, 100]). Tom slice => 0.0
pub fn percentile(xs: &[f64], q: f64) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    let v = sorted(xs);
    let rank = (q.clamp(0.0, 100.0) / 100.0) * (v.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = (lo + 1).min(v.len() - 1);
    let frac = rank - lo as f64;
    v[lo] + (v[hi] - v[lo]) * frac
}

/// Minste kvadraters stigningstall for y mot x.
/// None ved færre enn 2 punkter eller degenerert x-spredning.
pub fn ols_slope(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }
    let mx = mean(&xs[..n]);
    let my = mean(&ys[..n]);
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (x, y) in xs.iter().zip(ys.iter()).take(n) {
        sxy += (x - mx) * (y - my);
        sxx += (x - mx).powi(2);
    }
    if sxx <= f64::EPSILON {
        return None;
    }
    Some(sxy / sxx)
}

/// Differanser mellom påfølgende verdier (lengde n-1).
pub fn diff(xs: &[f64]) -> Vec<f64> {
    xs.windows(2).map(|w| w[1] - w[0]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]), 2.5);
        assert_eq!(median(&[]), 0.0);
    }

    #[test]
    fn percentile_interpolates_linearly() {
        let xs = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert!((percentile(&xs, 50.0) - 3.0).abs() < 1e-12);
        assert!((percentile(&xs, 95.0) - 4.8).abs() < 1e-12);
        assert!((percentile(&xs, 65.0) - 3.6).abs() < 1e-12);
        assert_eq!(percentile(&xs, 100.0), 5.0);
    }

    #[test]
    fn population_variance() {
        let xs = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((variance(&xs) - 4.0).abs() < 1e-12);
        assert!((std_dev(&xs) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn slope_of_line() {
        let xs = [0.0, 2.0, 4.0, 6.0];
        let ys: Vec<f64> = xs.iter().map(|x| 0.5 * x + 1.0).collect();
        assert!((ols_slope(&xs, &ys).unwrap() - 0.5).abs() < 1e-12);
        assert!(ols_slope(&[1.0], &[2.0]).is_none());
    }

    #[test]
    fn round_to_decimals() {
        assert_eq!(171.428_571.round_to(1), 171.4);
        assert_eq!(0.004_9.round_to(2), 0.0);
        assert_eq!(2.5_f64.round_to(0), 3.0);
    }
}
