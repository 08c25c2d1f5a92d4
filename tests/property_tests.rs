//! Property tests for the scoring and correlation invariants

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;

use healthintel::correlation::{pearson_correlation, round2};
use healthintel::{
    CorrelationDirection, CorrelationEngine, CorrelationStrength, HealthDataPoint,
    HealthScoreCalculator,
};

fn data_point() -> impl Strategy<Value = HealthDataPoint> {
    (
        0.0f64..12.0,
        0.0f64..100.0,
        0.0f64..100.0,
        0.0f64..100.0,
        0.0f64..100.0,
        0u32..3,
        0.0f64..20_000.0,
    )
        .prop_map(|(sleep, stress, energy, nutrition, recovery, count, volume)| {
            HealthDataPoint {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                sleep_hours: sleep,
                sleep_quality: 50.0,
                stress_level: stress,
                soreness_level: 50.0,
                energy_level: energy,
                motivation_level: 50.0,
                nutrition_score: nutrition,
                recovery_score: recovery,
                workout_count: count,
                workout_volume: if count == 0 { 0.0 } else { volume },
                workout_quality: energy,
            }
        })
}

fn series(max_len: usize) -> impl Strategy<Value = Vec<HealthDataPoint>> {
    prop::collection::vec(data_point(), 0..max_len).prop_map(|mut days| {
        for (i, day) in days.iter_mut().enumerate() {
            day.date += Duration::days(i as i64);
        }
        days
    })
}

proptest! {
    #[test]
    fn score_is_bounded_and_weighted(recent in series(8), older in series(24)) {
        let score = HealthScoreCalculator::new().calculate(&recent, &older);
        let c = score.components;

        for value in [c.sleep, c.recovery, c.consistency, c.nutrition, c.stress] {
            prop_assert!(value <= 100);
        }
        prop_assert!(score.overall <= 100);

        let expected = (0.25 * c.sleep as f64
            + 0.25 * c.recovery as f64
            + 0.20 * c.consistency as f64
            + 0.15 * c.nutrition as f64
            + 0.15 * c.stress as f64)
            .round() as u8;
        prop_assert_eq!(score.overall, expected);
        prop_assert!(!score.insights.is_empty());
    }

    #[test]
    fn correlations_are_bounded_and_consistent(days in series(40)) {
        let results = CorrelationEngine::new().analyze(&days);

        if days.len() < 7 {
            prop_assert!(results.is_empty());
        } else {
            prop_assert_eq!(results.len(), 5);
        }

        for result in results {
            prop_assert!((-1.0..=1.0).contains(&result.correlation));
            prop_assert_eq!(result.correlation, round2(result.correlation));
            prop_assert_eq!(result.strength, CorrelationStrength::from_coefficient(result.correlation));
            prop_assert_eq!(result.direction, CorrelationDirection::from_coefficient(result.correlation));
        }
    }

    #[test]
    fn constant_vector_has_zero_correlation(value in -100.0f64..100.0, ys in prop::collection::vec(0.0f64..100.0, 3..30)) {
        let xs = vec![value; ys.len()];
        prop_assert_eq!(pearson_correlation(&xs, &ys), 0.0);
    }
}
