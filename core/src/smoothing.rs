/// Speilet indeks ("reflect": d c b a | a b c d | d c b a).
/// Holder lengden uten å anta noe om signalet utenfor endene.
#[inline]
fn reflect_index(i: isize, n: usize) -> usize {
    let n = n as isize;
    let mut i = i;
    // Løkke for vinduer som er lengre enn serien
    loop {
        if i < 0 {
            i = -i - 1;
        } else if i >= n {
            i = 2 * n - i - 1;
        } else {
            return i as usize;
        }
    }
}

/// Glidende snitt over `size` sampler, sentrert (size/2 til venstre),
/// speilet i endene. Brukes som envelope for stegdeteksjon.
pub fn moving_average(xs: &[f64], size: usize) -> Vec<f64> {
    if xs.is_empty() || size <= 1 {
        return xs.to_vec();
    }
    let n = xs.len();
    let left = (size / 2) as isize;
    let mut out = Vec::with_capacity(n);

    // Første vindu summeres fullt, deretter rullende sum
    let mut sum: f64 = (0..size as isize)
        .map(|k| xs[reflect_index(k - left, n)])
        .sum();
    out.push(sum / size as f64);

    for i in 1..n as isize {
        let enter = i - left + size as isize - 1;
        let leave = i - left - 1;
        sum += xs[reflect_index(enter, n)] - xs[reflect_index(leave, n)];
        out.push(sum / size as f64);
    }
    out
}

/// Gauss-glatting (σ i sampler), kjernen kuttes ved 4σ, speilede ender.
pub fn gaussian_smooth(xs: &[f64], sigma: f64) -> Vec<f64> {
    if xs.is_empty() || sigma <= 0.0 {
        return xs.to_vec();
    }
    let radius = (4.0 * sigma + 0.5) as isize;
    let mut kernel: Vec<f64> = (-radius..=radius)
        .map(|k| (-0.5 * (k as f64 / sigma).powi(2)).exp())
        .collect();
    let norm: f64 = kernel.iter().sum();
    kernel.iter_mut().for_each(|w| *w /= norm);

    let n = xs.len();
    (0..n as isize)
        .map(|i| {
            kernel
                .iter()
                .zip(-radius..=radius)
                .map(|(w, k)| w * xs[reflect_index(i + k, n)])
                .sum()
        })
        .collect()
}
