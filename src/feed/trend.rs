// Trend classification: least-squares slope over the recent window, in units per second.

use crate::models::{Sample, Trend};

/// Least-squares slope of value over time (units/s). `None` with fewer than two samples or
/// when every sample shares one timestamp.
pub fn least_squares_slope(samples: &[Sample]) -> Option<f64> {
    if samples.len() < 2 {
        return None;
    }
    let t0 = samples[0].timestamp;
    let n = samples.len() as f64;
    let xs: Vec<f64> = samples
        .iter()
        .map(|s| s.timestamp.saturating_sub(t0).as_secs_f64())
        .collect();
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = samples.iter().map(|s| s.value).sum::<f64>() / n;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (x, s) in xs.iter().zip(samples) {
        let dx = x - mean_x;
        sxy += dx * (s.value - mean_y);
        sxx += dx * dx;
    }
    (sxx > 0.0).then(|| sxy / sxx)
}

/// `Up` above `+epsilon`, `Down` below `-epsilon`, otherwise `Stable`.
pub fn classify_samples(samples: &[Sample], epsilon: f64) -> Trend {
    match least_squares_slope(samples) {
        Some(slope) if slope > epsilon => Trend::Up,
        Some(slope) if slope < -epsilon => Trend::Down,
        _ => Trend::Stable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn series(values: &[f64], step_ms: u64) -> Vec<Sample> {
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| Sample {
                value,
                timestamp: Duration::from_millis(i as u64 * step_ms),
            })
            .collect()
    }

    #[test]
    fn slope_of_linear_series() {
        let s = series(&[0.0, 2.0, 4.0, 6.0], 500);
        let slope = least_squares_slope(&s).unwrap();
        assert!((slope - 4.0).abs() < 1e-9);
    }

    #[test]
    fn slope_needs_two_distinct_instants() {
        assert!(least_squares_slope(&series(&[1.0], 1000)).is_none());
        assert!(least_squares_slope(&series(&[1.0, 2.0], 0)).is_none());
    }

    #[test]
    fn noisy_flat_series_is_stable() {
        let s = series(&[100.0, 100.0, 101.0, 99.0, 100.0], 1000);
        assert!((least_squares_slope(&s).unwrap() + 0.1).abs() < 1e-9);
        assert_eq!(classify_samples(&s, 1.0), Trend::Stable);
    }

    #[test]
    fn falling_series_is_down() {
        let s = series(&[50.0, 40.0, 30.0], 1000);
        assert_eq!(classify_samples(&s, 1.0), Trend::Down);
    }
}
