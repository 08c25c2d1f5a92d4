//! Daily health series aggregation
//!
//! Turns raw readiness check-ins and workout sessions into one
//! [`HealthDataPoint`] per calendar day. Days without any record are
//! omitted rather than zero-filled, so the series may contain gaps.

use chrono::NaiveDate;
use statrs::statistics::Statistics;
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::Result;
use crate::models::{
    DateRange, HealthDataPoint, HealthRecords, ReadinessCheckIn, WorkoutSession,
};

/// Read-only access to a user's stored health records
pub trait HealthRecordSource {
    /// Load every check-in and workout session for `user_id` whose date lies
    /// within `range` (inclusive). Implementations perform a single read.
    fn load_records(&self, user_id: &str, range: DateRange) -> Result<HealthRecords>;
}

impl<T: HealthRecordSource + ?Sized> HealthRecordSource for &T {
    fn load_records(&self, user_id: &str, range: DateRange) -> Result<HealthRecords> {
        (**self).load_records(user_id, range)
    }
}

impl<T: HealthRecordSource + ?Sized> HealthRecordSource for std::sync::Arc<T> {
    fn load_records(&self, user_id: &str, range: DateRange) -> Result<HealthRecords> {
        (**self).load_records(user_id, range)
    }
}

/// Vector-backed record source for tests and demos
#[derive(Debug, Clone, Default)]
pub struct InMemoryHealthStore {
    records: HealthRecords,
}

impl InMemoryHealthStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_check_in(&mut self, check_in: ReadinessCheckIn) {
        self.records.check_ins.push(check_in);
    }

    pub fn add_workout(&mut self, workout: WorkoutSession) {
        self.records.workouts.push(workout);
    }
}

impl HealthRecordSource for InMemoryHealthStore {
    fn load_records(&self, user_id: &str, range: DateRange) -> Result<HealthRecords> {
        Ok(HealthRecords {
            check_ins: self
                .records
                .check_ins
                .iter()
                .filter(|c| c.user_id == user_id && range.contains(c.date))
                .cloned()
                .collect(),
            workouts: self
                .records
                .workouts
                .iter()
                .filter(|w| w.user_id == user_id && range.contains(w.date))
                .cloned()
                .collect(),
        })
    }
}

/// Builds the ordered daily series consumed by the analysis engines
pub struct HealthDataAggregator<S> {
    source: S,
}

impl<S: HealthRecordSource> HealthDataAggregator<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Aggregate a user's records between `start` and `end` (inclusive)
    /// into one data point per recorded day, ascending by date
    pub fn aggregate(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<HealthDataPoint>> {
        let records = self.source.load_records(user_id, DateRange::new(start, end))?;
        let series = aggregate_records(&records);

        debug!(
            user_id,
            %start,
            %end,
            check_ins = records.check_ins.len(),
            workouts = records.workouts.len(),
            days = series.len(),
            "Aggregated daily health series"
        );

        Ok(series)
    }
}

#[derive(Default)]
struct DayBucket<'a> {
    check_ins: Vec<&'a ReadinessCheckIn>,
    workout_count: u32,
    workout_volume: f64,
}

/// Group raw records by calendar day
///
/// Readiness fields are averaged over the check-ins that reported them;
/// a field nobody reported that day is 0. Volume is summed over every set.
pub fn aggregate_records(records: &HealthRecords) -> Vec<HealthDataPoint> {
    let mut days: BTreeMap<NaiveDate, DayBucket<'_>> = BTreeMap::new();

    for check_in in &records.check_ins {
        days.entry(check_in.date).or_default().check_ins.push(check_in);
    }

    for workout in &records.workouts {
        let bucket = days.entry(workout.date).or_default();
        bucket.workout_count += 1;
        bucket.workout_volume += workout.volume();
    }

    days.into_iter()
        .map(|(date, bucket)| {
            let field = |get: fn(&ReadinessCheckIn) -> Option<f64>| {
                daily_mean(bucket.check_ins.iter().filter_map(|c| get(c)))
            };
            let energy_level = field(|c| c.energy_level);

            HealthDataPoint {
                date,
                sleep_hours: field(|c| c.sleep_hours),
                sleep_quality: field(|c| c.sleep_quality),
                stress_level: field(|c| c.stress_level),
                soreness_level: field(|c| c.soreness_level),
                energy_level,
                motivation_level: field(|c| c.motivation_level),
                nutrition_score: field(|c| c.nutrition_score),
                recovery_score: field(|c| c.recovery_score),
                workout_count: bucket.workout_count,
                workout_volume: bucket.workout_volume,
                workout_quality: energy_level,
            }
        })
        .collect()
}

fn daily_mean(values: impl Iterator<Item = f64>) -> f64 {
    let values: Vec<f64> = values.filter(|v| v.is_finite()).collect();
    if values.is_empty() {
        0.0
    } else {
        values.mean()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WorkoutSet;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    fn check_in(user: &str, day: u32, sleep: f64, recovery: Option<f64>) -> ReadinessCheckIn {
        let mut c = ReadinessCheckIn::new(user, date(day));
        c.sleep_hours = Some(sleep);
        c.energy_level = Some(60.0);
        c.recovery_score = recovery;
        c
    }

    #[test]
    fn test_daily_means_and_missing_fields() {
        let mut store = InMemoryHealthStore::new();
        store.add_check_in(check_in("u1", 1, 6.0, Some(70.0)));
        store.add_check_in(check_in("u1", 1, 8.0, None));

        let aggregator = HealthDataAggregator::new(store);
        let series = aggregator.aggregate("u1", date(1), date(31)).unwrap();

        assert_eq!(series.len(), 1);
        let day = &series[0];
        assert_eq!(day.sleep_hours, 7.0);
        assert_eq!(day.recovery_score, 70.0);
        assert_eq!(day.nutrition_score, 0.0);
        assert_eq!(day.workout_count, 0);
        assert_eq!(day.workout_quality, day.energy_level);
    }

    #[test]
    fn test_workout_volume_and_count() {
        let mut store = InMemoryHealthStore::new();
        store.add_workout(WorkoutSession::new(
            "u1",
            date(2),
            vec![WorkoutSet::new(100.0, 5), WorkoutSet::new(80.0, 10)],
        ));
        store.add_workout(WorkoutSession::new("u1", date(2), vec![WorkoutSet::new(20.0, 10)]));

        let series = HealthDataAggregator::new(store)
            .aggregate("u1", date(1), date(31))
            .unwrap();

        assert_eq!(series.len(), 1);
        assert_eq!(series[0].workout_count, 2);
        assert_eq!(series[0].workout_volume, 1500.0);
        // Workout-only day: readiness defaults to zero
        assert_eq!(series[0].sleep_hours, 0.0);
    }

    #[test]
    fn test_gaps_ordering_and_filters() {
        let mut store = InMemoryHealthStore::new();
        store.add_check_in(check_in("u1", 9, 7.0, Some(80.0)));
        store.add_check_in(check_in("u1", 3, 7.0, Some(80.0)));
        store.add_check_in(check_in("u2", 4, 7.0, Some(80.0)));
        store.add_check_in(check_in("u1", 20, 7.0, Some(80.0)));

        let series = HealthDataAggregator::new(&store)
            .aggregate("u1", date(1), date(10))
            .unwrap();

        let dates: Vec<NaiveDate> = series.iter().map(|d| d.date).collect();
        assert_eq!(dates, vec![date(3), date(9)]);
    }

    #[test]
    fn test_empty_records() {
        assert!(aggregate_records(&HealthRecords::default()).is_empty());
    }
}
