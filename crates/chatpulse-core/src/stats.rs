//! Descriptive statistics shared by the analyzers and the metric binder

/// Arithmetic mean, 0.0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation, 0.0 for an empty slice
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let avg = mean(values);
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Coefficient of variation (stddev / mean), 0.0 when the mean is 0
pub fn coefficient_of_variation(values: &[f64]) -> f64 {
    let avg = mean(values);
    if avg == 0.0 {
        0.0
    } else {
        std_dev(values) / avg
    }
}

/// Ordinary least squares slope with x = 0..n-1
///
/// Returns 0.0 for fewer than two points.
pub fn linear_regression_slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = mean(values);

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        numerator += dx * (y - y_mean);
        denominator += dx * dx;
    }

    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Consistency score in 0..=100 penalizing day-to-day volatility
///
/// Fewer than three days are trivially consistent.
pub fn consistency_score(values: &[f64]) -> f64 {
    if values.len() < 3 {
        return 100.0;
    }
    let cv = coefficient_of_variation(values);
    (100.0 - cv * 60.0).clamp(0.0, 100.0)
}

/// Percentage change from `from` to `to`, 0.0 when `from` is 0
pub fn percent_change(from: f64, to: f64) -> f64 {
    if from == 0.0 {
        0.0
    } else {
        (to - from) / from * 100.0
    }
}
