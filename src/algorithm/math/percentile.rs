/// Percentile of a sample using linear interpolation between the two
/// closest order statistics. An empty sample yields `0.0`.
///
/// `p` is expressed in percent and clamped into `[0, 100]`.
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|left, right| left.total_cmp(right));

    let n = sorted.len();
    let index = (p.clamp(0.0, 100.0) / 100.0) * (n - 1) as f64;

    if index.fract() == 0.0 {
        return sorted[index as usize];
    }

    let lower = index.floor() as usize;
    let upper = lower + 1;

    if upper >= n {
        return sorted[n - 1];
    }

    let weight = index - lower as f64;
    sorted[lower] + weight * (sorted[upper] - sorted[lower])
}
