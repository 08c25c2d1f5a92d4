//! Composite health score
//!
//! Five component scores (sleep, recovery, consistency, nutrition, stress)
//! are computed over the most recent week and combined with fixed weights
//! into a 0-100 overall score. Recovery over the recent week is compared
//! against the preceding 23 days to label the trend.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use tracing::debug;

use crate::insights::score_insights;
use crate::models::{DateRange, HealthDataPoint, HealthScore, HealthTrend, ScoreComponents};

/// Length of the recent scoring window in days
pub const RECENT_WINDOW_DAYS: u32 = 7;

/// Total lookback covered by the recent and older windows together
pub const TREND_LOOKBACK_DAYS: u32 = 30;

/// Score used when a component has no data
pub const NEUTRAL_SCORE: f64 = 50.0;

/// Target training frequency: four sessions per seven days
pub const IDEAL_WORKOUT_RATIO: f64 = 4.0 / 7.0;

/// Recent average must exceed the older one by this factor to count as improving
const IMPROVING_FACTOR: f64 = 1.05;
const DECLINING_FACTOR: f64 = 0.95;

/// Target range for a "higher is better" metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetRange {
    pub min: f64,
    pub ideal: f64,
    pub max: f64,
}

impl TargetRange {
    pub const SLEEP_HOURS: TargetRange = TargetRange { min: 0.0, ideal: 8.0, max: 10.0 };
    pub const RECOVERY: TargetRange = TargetRange { min: 0.0, ideal: 85.0, max: 100.0 };
    pub const NUTRITION: TargetRange = TargetRange { min: 0.0, ideal: 80.0, max: 100.0 };
    pub const STRESS: TargetRange = TargetRange { min: 0.0, ideal: 0.0, max: 100.0 };
}

/// Score a list of values against a target range (0-100)
///
/// An empty list scores [`NEUTRAL_SCORE`]. An average at or above the ideal
/// scores 100, otherwise the score is the average as a percentage of ideal.
pub fn component_score(values: &[f64], range: TargetRange) -> f64 {
    if values.is_empty() {
        return NEUTRAL_SCORE;
    }

    let avg = values.iter().mean();
    if avg >= range.ideal || range.ideal <= 0.0 {
        return 100.0;
    }

    (avg / range.ideal * 100.0).clamp(0.0, 100.0)
}

/// Training consistency (0-100) from the share of window days with a workout
///
/// The ratio is taken over the whole [`RECENT_WINDOW_DAYS`] window, so days
/// without any record count as rest days. Fewer than three days of data
/// scores [`NEUTRAL_SCORE`].
pub fn consistency_score(series: &[HealthDataPoint]) -> f64 {
    if series.len() < 3 {
        return NEUTRAL_SCORE;
    }

    let workout_days = series.iter().filter(|d| d.workout_count > 0).count();
    consistency_from_ratio(workout_days as f64 / RECENT_WINDOW_DAYS as f64)
}

/// A ratio within 90%-120% of the ideal scores 100, otherwise the ratio as a
/// percentage of the ideal
pub fn consistency_from_ratio(ratio: f64) -> f64 {
    if ratio >= IDEAL_WORKOUT_RATIO * 0.9 && ratio <= IDEAL_WORKOUT_RATIO * 1.2 {
        100.0
    } else {
        (ratio / IDEAL_WORKOUT_RATIO * 100.0).clamp(0.0, 100.0)
    }
}

fn mean_or_zero(values: impl Iterator<Item = f64>) -> f64 {
    let values: Vec<f64> = values.collect();
    if values.is_empty() {
        0.0
    } else {
        values.mean()
    }
}

fn to_score(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

/// Computes the composite health score from the recent and older windows
#[derive(Debug, Clone, Copy, Default)]
pub struct HealthScoreCalculator;

impl HealthScoreCalculator {
    pub fn new() -> Self {
        Self
    }

    /// The recent window (last 7 days including `today`) and the older
    /// window (the 23 days before it)
    pub fn windows(today: NaiveDate) -> (DateRange, DateRange) {
        let recent = DateRange::ending_on(today, RECENT_WINDOW_DAYS);
        let older_end = recent.start - Duration::days(1);
        let older = DateRange::ending_on(older_end, TREND_LOOKBACK_DAYS - RECENT_WINDOW_DAYS);
        (recent, older)
    }

    /// Component scores over the recent window
    pub fn components(&self, recent: &[HealthDataPoint]) -> ScoreComponents {
        let values = |metric: fn(&HealthDataPoint) -> f64| -> Vec<f64> {
            recent.iter().map(metric).collect()
        };

        ScoreComponents {
            sleep: to_score(component_score(&values(|d| d.sleep_hours), TargetRange::SLEEP_HOURS)),
            recovery: to_score(component_score(
                &values(|d| d.recovery_score),
                TargetRange::RECOVERY,
            )),
            consistency: to_score(consistency_score(recent)),
            nutrition: to_score(component_score(
                &values(|d| d.nutrition_score),
                TargetRange::NUTRITION,
            )),
            stress: to_score(
                100.0 - component_score(&values(|d| d.stress_level), TargetRange::STRESS),
            ),
        }
    }

    /// Compare mean recovery of the recent window against the older window
    pub fn trend(&self, recent: &[HealthDataPoint], older: &[HealthDataPoint]) -> HealthTrend {
        let recent_avg = mean_or_zero(recent.iter().map(|d| d.recovery_score));
        let older_avg = mean_or_zero(older.iter().map(|d| d.recovery_score));

        if recent_avg > older_avg * IMPROVING_FACTOR {
            HealthTrend::Improving
        } else if recent_avg < older_avg * DECLINING_FACTOR {
            HealthTrend::Declining
        } else {
            HealthTrend::Stable
        }
    }

    /// Full health score from the two aggregated windows
    pub fn calculate(&self, recent: &[HealthDataPoint], older: &[HealthDataPoint]) -> HealthScore {
        let components = self.components(recent);
        let overall = components.overall();
        let trend = self.trend(recent, older);
        let insights = score_insights(&components);

        debug!(
            recent_days = recent.len(),
            older_days = older.len(),
            overall,
            %trend,
            "Calculated health score"
        );

        HealthScore {
            overall,
            components,
            trend,
            insights,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::SLEEP_INSIGHT;

    fn day(offset: i64, f: impl Fn(&mut HealthDataPoint)) -> HealthDataPoint {
        let mut point = HealthDataPoint {
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap() + Duration::days(offset),
            sleep_hours: 8.0,
            sleep_quality: 80.0,
            stress_level: 30.0,
            soreness_level: 20.0,
            energy_level: 75.0,
            motivation_level: 80.0,
            nutrition_score: 80.0,
            recovery_score: 85.0,
            workout_count: 0,
            workout_volume: 0.0,
            workout_quality: 75.0,
        };
        f(&mut point);
        point
    }

    fn week(f: impl Fn(usize, &mut HealthDataPoint)) -> Vec<HealthDataPoint> {
        (0..7).map(|i| day(i as i64, |p| f(i, p))).collect()
    }

    #[test]
    fn test_component_score_formula() {
        assert_eq!(component_score(&[], TargetRange::SLEEP_HOURS), 50.0);
        assert_eq!(component_score(&[8.0, 9.0], TargetRange::SLEEP_HOURS), 100.0);
        assert_eq!(component_score(&[4.0, 4.0], TargetRange::SLEEP_HOURS), 50.0);
        assert_eq!(component_score(&[0.0], TargetRange::RECOVERY), 0.0);
    }

    #[test]
    fn test_stress_is_inverted() {
        let calc = HealthScoreCalculator::new();
        assert_eq!(calc.components(&[]).stress, 50);
        // Any average stress meets an ideal of zero, so the inverted score bottoms out
        assert_eq!(calc.components(&week(|_, _| {})).stress, 0);
    }

    #[test]
    fn test_consistency_score() {
        assert_eq!(consistency_score(&week(|_, _| {})[..2]), 50.0);

        let four_of_seven = week(|i, p| p.workout_count = u32::from(i % 2 == 0));
        assert_eq!(consistency_score(&four_of_seven), 100.0);

        let daily = week(|_, p| p.workout_count = 1);
        assert_eq!(consistency_score(&daily), 100.0);

        let one_of_seven = week(|i, p| p.workout_count = u32::from(i == 3));
        assert_eq!(to_score(consistency_score(&one_of_seven)), 25);

        assert_eq!(consistency_score(&week(|_, _| {})), 0.0);
    }

    #[test]
    fn test_consistency_counts_missing_days_as_rest() {
        // Three workout-only days logged in a seven-day window
        let gapped: Vec<HealthDataPoint> = [0, 2, 4]
            .into_iter()
            .map(|offset| {
                day(offset, |p| {
                    p.workout_count = 1;
                    p.workout_volume = 4000.0;
                })
            })
            .collect();
        assert_eq!(to_score(consistency_score(&gapped)), 75);
        assert_eq!(HealthScoreCalculator::new().components(&gapped).consistency, 75);

        // One workout among three recorded days
        let sparse: Vec<HealthDataPoint> = (0..3)
            .map(|offset| day(offset, |p| p.workout_count = u32::from(offset == 1)))
            .collect();
        assert_eq!(to_score(consistency_score(&sparse)), 25);
    }

    #[test]
    fn test_consistency_band_edges() {
        assert_eq!(consistency_from_ratio(IDEAL_WORKOUT_RATIO * 0.9), 100.0);
        assert_eq!(consistency_from_ratio(IDEAL_WORKOUT_RATIO * 1.2), 100.0);
        assert_eq!(to_score(consistency_from_ratio(IDEAL_WORKOUT_RATIO * 0.85)), 85);
        assert_eq!(consistency_from_ratio(IDEAL_WORKOUT_RATIO * 1.25), 100.0);
        assert_eq!(consistency_from_ratio(0.0), 0.0);
    }

    #[test]
    fn test_empty_recent_window_is_neutral() {
        let score = HealthScoreCalculator::new().calculate(&[], &[]);
        assert_eq!(score.components.sleep, 50);
        assert_eq!(score.components.recovery, 50);
        assert_eq!(score.components.consistency, 50);
        assert_eq!(score.components.nutrition, 50);
        assert_eq!(score.components.stress, 50);
        assert_eq!(score.overall, 50);
        assert_eq!(score.trend, HealthTrend::Stable);
        // Neutral sleep is still below the sleep threshold
        assert_eq!(score.insights, vec![SLEEP_INSIGHT.to_string()]);
    }

    #[test]
    fn test_poor_sleep_is_flagged() {
        let recent = week(|_, p| {
            p.sleep_hours = 5.0;
            p.recovery_score = 60.0;
            p.nutrition_score = 60.0;
            p.stress_level = 50.0;
        });
        let score = HealthScoreCalculator::new().calculate(&recent, &[]);

        assert!(score.components.sleep < 70);
        assert!(score
            .insights
            .iter()
            .any(|i| i.to_lowercase().contains("sleep")));
    }

    #[test]
    fn test_overall_identity() {
        let recent = week(|i, p| {
            p.sleep_hours = 6.0 + i as f64 * 0.3;
            p.recovery_score = 55.0 + i as f64;
            p.workout_count = u32::from(i % 3 == 0);
        });
        let score = HealthScoreCalculator::new().calculate(&recent, &[]);
        let c = score.components;
        let expected = (0.25 * c.sleep as f64
            + 0.25 * c.recovery as f64
            + 0.20 * c.consistency as f64
            + 0.15 * c.nutrition as f64
            + 0.15 * c.stress as f64)
            .round() as u8;
        assert_eq!(score.overall, expected);
    }

    #[test]
    fn test_trend_detection() {
        let calc = HealthScoreCalculator::new();
        let older: Vec<HealthDataPoint> = (0..10).map(|i| day(i, |p| p.recovery_score = 60.0)).collect();

        let better = week(|_, p| p.recovery_score = 70.0);
        assert_eq!(calc.trend(&better, &older), HealthTrend::Improving);

        let worse = week(|_, p| p.recovery_score = 50.0);
        assert_eq!(calc.trend(&worse, &older), HealthTrend::Declining);

        let same = week(|_, p| p.recovery_score = 62.0);
        assert_eq!(calc.trend(&same, &older), HealthTrend::Stable);

        assert_eq!(calc.trend(&better, &[]), HealthTrend::Improving);
    }

    #[test]
    fn test_windows() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let (recent, older) = HealthScoreCalculator::windows(today);
        assert_eq!(recent.start, NaiveDate::from_ymd_opt(2024, 6, 24).unwrap());
        assert_eq!(recent.end, today);
        assert_eq!(older.end, NaiveDate::from_ymd_opt(2024, 6, 23).unwrap());
        assert_eq!(older.start, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
    }
}
