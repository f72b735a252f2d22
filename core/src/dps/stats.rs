//! Sample statistics for DPS and survival figures.

/// Arithmetic mean, zero for no samples.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Median, averaging the two middle values for even counts. Zero for no samples.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Population standard deviation.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Steadiness score in `0..=100`: `round((1 - stddev / average) * 100)`.
///
/// A single sample, or a non-positive average, scores a perfect 100.
pub fn consistency(samples: &[f64], average: f64) -> i32 {
    if samples.len() < 2 || average <= 0.0 {
        return 100;
    }
    let score = ((1.0 - std_dev(samples) / average) * 100.0).round();
    score.clamp(0.0, 100.0) as i32
}
