//! Lifestyle ↔ performance correlations
//!
//! Five fixed metric pairs are analysed with the Pearson correlation
//! coefficient. Two of them are lagged: the lifestyle metric on day *i* is
//! paired with the performance metric on day *i+1* of the series.
//!
//! These are heuristics for coaching, not significance tests: no p-values or
//! confidence intervals are produced.

use tracing::debug;

use crate::insights::{correlation_insight, correlation_recommendation};
use crate::models::{
    CorrelationDirection, CorrelationResult, CorrelationStrength, CorrelationType,
    HealthDataPoint,
};

/// Below this many daily points no correlations are reported
pub const MIN_CORRELATION_DAYS: usize = 7;

/// Pearson correlation coefficient of two equal-length vectors
///
/// r = (nΣxy − ΣxΣy) / √[(nΣx² − (Σx)²)(nΣy² − (Σy)²)]
///
/// Returns 0.0 when fewer than three pairs are available, when the lengths
/// differ, or when either vector has zero variance.
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len();
    if n < 3 || n != y.len() || is_constant(x) || is_constant(y) {
        return 0.0;
    }

    let n_f = n as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_x2, mut sum_y2) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for (&a, &b) in x.iter().zip(y) {
        sum_x += a;
        sum_y += b;
        sum_xy += a * b;
        sum_x2 += a * a;
        sum_y2 += b * b;
    }

    let numerator = n_f * sum_xy - sum_x * sum_y;
    let denominator =
        ((n_f * sum_x2 - sum_x * sum_x) * (n_f * sum_y2 - sum_y * sum_y)).sqrt();

    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }

    (numerator / denominator).clamp(-1.0, 1.0)
}

// Summation error can leave a constant vector with a tiny non-zero variance
fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

/// Round to two decimal places, never returning negative zero
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0 + 0.0
}

/// Paired vectors for one correlation type
///
/// Same-day pairs use all `n` days; lagged pairs use days `0..n-1` for X and
/// `1..n` for Y.
pub fn metric_vectors(
    correlation_type: CorrelationType,
    series: &[HealthDataPoint],
) -> (Vec<f64>, Vec<f64>) {
    let (x_metric, y_metric): (fn(&HealthDataPoint) -> f64, fn(&HealthDataPoint) -> f64) =
        match correlation_type {
            CorrelationType::NutritionRecovery => (|d| d.nutrition_score, |d| d.recovery_score),
            CorrelationType::SleepPerformance => (|d| d.sleep_hours, |d| d.workout_volume),
            CorrelationType::VolumeRecovery => (|d| d.workout_volume, |d| d.recovery_score),
            CorrelationType::SleepWorkoutQuality => (|d| d.sleep_hours, |d| d.workout_quality),
            CorrelationType::StressPerformance => (|d| d.stress_level, |d| d.workout_volume),
        };

    if correlation_type.is_lagged() {
        let x = series[..series.len().saturating_sub(1)]
            .iter()
            .map(x_metric)
            .collect();
        let y = series.iter().skip(1).map(y_metric).collect();
        (x, y)
    } else {
        (
            series.iter().map(x_metric).collect(),
            series.iter().map(y_metric).collect(),
        )
    }
}

/// Computes the fixed set of metric-pair correlations over a daily series
#[derive(Debug, Clone, Copy, Default)]
pub struct CorrelationEngine;

impl CorrelationEngine {
    pub fn new() -> Self {
        Self
    }

    /// All five correlations, or an empty list when the series holds fewer
    /// than [`MIN_CORRELATION_DAYS`] points
    pub fn analyze(&self, series: &[HealthDataPoint]) -> Vec<CorrelationResult> {
        if series.len() < MIN_CORRELATION_DAYS {
            debug!(
                data_points = series.len(),
                "Not enough daily data for correlations"
            );
            return Vec::new();
        }

        CorrelationType::ALL
            .into_iter()
            .map(|t| self.correlate(t, series))
            .collect()
    }

    /// Compute and classify a single correlation type
    pub fn correlate(
        &self,
        correlation_type: CorrelationType,
        series: &[HealthDataPoint],
    ) -> CorrelationResult {
        let (x, y) = metric_vectors(correlation_type, series);
        let correlation = round2(pearson_correlation(&x, &y));
        Self::classify(correlation_type, correlation, x.len())
    }

    /// Attach strength, direction and template text to a coefficient
    pub fn classify(
        correlation_type: CorrelationType,
        correlation: f64,
        data_points: usize,
    ) -> CorrelationResult {
        let strength = CorrelationStrength::from_coefficient(correlation);
        let direction = CorrelationDirection::from_coefficient(correlation);

        CorrelationResult {
            correlation_type,
            correlation,
            strength,
            direction,
            insight: correlation_insight(correlation_type, strength, direction).to_string(),
            data_points,
            recommendation: correlation_recommendation(correlation_type, strength, direction)
                .map(str::to_string),
        }
    }
}
