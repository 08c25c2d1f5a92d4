use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Self-reported daily readiness check-in
///
/// Every readiness field is optional: a user may skip a question. Scales are
/// 0-100 except `sleep_hours`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessCheckIn {
    /// Unique identifier for this check-in
    pub id: String,

    /// Owner of the check-in
    pub user_id: String,

    /// Calendar date the check-in belongs to
    pub date: NaiveDate,

    /// Hours slept the previous night
    pub sleep_hours: Option<f64>,

    /// Perceived sleep quality (0-100)
    pub sleep_quality: Option<f64>,

    /// Perceived stress (0-100, higher is more stressed)
    pub stress_level: Option<f64>,

    /// Muscle soreness (0-100)
    pub soreness_level: Option<f64>,

    /// Energy level (0-100)
    pub energy_level: Option<f64>,

    /// Motivation to train (0-100)
    pub motivation_level: Option<f64>,

    /// Nutrition quality (0-100)
    pub nutrition_score: Option<f64>,

    /// Recovery score (0-100)
    pub recovery_score: Option<f64>,
}

impl ReadinessCheckIn {
    /// Create an empty check-in for the given user and date
    pub fn new(user_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            date,
            sleep_hours: None,
            sleep_quality: None,
            stress_level: None,
            soreness_level: None,
            energy_level: None,
            motivation_level: None,
            nutrition_score: None,
            recovery_score: None,
        }
    }
}

/// A single logged set within a workout session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSet {
    /// Load in kilograms
    pub weight: f64,

    /// Repetitions performed
    pub reps: u32,
}

impl WorkoutSet {
    pub fn new(weight: f64, reps: u32) -> Self {
        Self { weight, reps }
    }

    /// Training volume of this set (weight × reps)
    pub fn volume(&self) -> f64 {
        self.weight * self.reps as f64
    }
}

impl FromStr for WorkoutSet {
    type Err = String;

    /// Parse `WEIGHTxREPS`, e.g. `100x5` or `62.5X8`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (weight, reps) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("Invalid set '{}', expected WEIGHTxREPS", s))?;

        let weight: f64 = weight
            .trim()
            .parse()
            .map_err(|_| format!("Invalid weight in set '{}'", s))?;
        let reps: u32 = reps
            .trim()
            .parse()
            .map_err(|_| format!("Invalid reps in set '{}'", s))?;

        if !weight.is_finite() || weight < 0.0 {
            return Err(format!("Weight must be non-negative in set '{}'", s));
        }

        Ok(WorkoutSet { weight, reps })
    }
}

/// A logged workout session and its sets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSession {
    /// Unique identifier for this session
    pub id: String,

    /// Owner of the session
    pub user_id: String,

    /// Calendar date the session was performed on
    pub date: NaiveDate,

    /// Sets logged during the session
    pub sets: Vec<WorkoutSet>,
}

impl WorkoutSession {
    pub fn new(user_id: impl Into<String>, date: NaiveDate, sets: Vec<WorkoutSet>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            date,
            sets,
        }
    }

    /// Total volume across all sets
    pub fn volume(&self) -> f64 {
        self.sets.iter().map(WorkoutSet::volume).sum()
    }
}

/// Raw records returned by a single read against the data source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthRecords {
    pub check_ins: Vec<ReadinessCheckIn>,
    pub workouts: Vec<WorkoutSession>,
}

impl HealthRecords {
    pub fn is_empty(&self) -> bool {
        self.check_ins.is_empty() && self.workouts.is_empty()
    }
}

/// Inclusive calendar date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The `days` calendar days ending on (and including) `end`
    pub fn ending_on(end: NaiveDate, days: u32) -> Self {
        let start = end - chrono::Duration::days(days.saturating_sub(1) as i64);
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// One aggregated calendar day of readiness and training telemetry
///
/// Produced fresh by the aggregator on every request and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthDataPoint {
    pub date: NaiveDate,
    pub sleep_hours: f64,
    pub sleep_quality: f64,
    pub stress_level: f64,
    pub soreness_level: f64,
    pub energy_level: f64,
    pub motivation_level: f64,
    pub nutrition_score: f64,
    pub recovery_score: f64,

    /// Number of workout sessions logged (0 on rest days)
    pub workout_count: u32,

    /// Sum of weight × reps across all sets that day
    pub workout_volume: f64,

    /// Proxy for session quality; mirrors `energy_level`
    pub workout_quality: f64,
}

/// Supported correlation lookback periods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnalysisPeriod {
    Week,
    Fortnight,
    Month,
    TwoMonths,
}

impl AnalysisPeriod {
    pub const ALL: [AnalysisPeriod; 4] = [
        AnalysisPeriod::Week,
        AnalysisPeriod::Fortnight,
        AnalysisPeriod::Month,
        AnalysisPeriod::TwoMonths,
    ];

    pub fn days(&self) -> u32 {
        match self {
            AnalysisPeriod::Week => 7,
            AnalysisPeriod::Fortnight => 14,
            AnalysisPeriod::Month => 30,
            AnalysisPeriod::TwoMonths => 60,
        }
    }

    pub fn from_days(days: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.days() == days)
    }
}

impl Default for AnalysisPeriod {
    fn default() -> Self {
        AnalysisPeriod::Month
    }
}

impl fmt::Display for AnalysisPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} days", self.days())
    }
}

impl FromStr for AnalysisPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let days: u32 = s
            .trim()
            .trim_end_matches('d')
            .parse()
            .map_err(|_| format!("Invalid period: {}", s))?;
        Self::from_days(days)
            .ok_or_else(|| format!("Unsupported period: {} (expected 7, 14, 30 or 60)", days))
    }
}

/// The fixed set of metric pairs the correlation engine analyses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationType {
    NutritionRecovery,
    SleepPerformance,
    VolumeRecovery,
    SleepWorkoutQuality,
    StressPerformance,
}

impl CorrelationType {
    /// All correlation types in reporting order
    pub const ALL: [CorrelationType; 5] = [
        CorrelationType::NutritionRecovery,
        CorrelationType::SleepPerformance,
        CorrelationType::VolumeRecovery,
        CorrelationType::SleepWorkoutQuality,
        CorrelationType::StressPerformance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CorrelationType::NutritionRecovery => "nutrition_recovery",
            CorrelationType::SleepPerformance => "sleep_performance",
            CorrelationType::VolumeRecovery => "volume_recovery",
            CorrelationType::SleepWorkoutQuality => "sleep_workout_quality",
            CorrelationType::StressPerformance => "stress_performance",
        }
    }

    /// Whether X on day i is paired with Y on day i+1
    pub fn is_lagged(&self) -> bool {
        matches!(
            self,
            CorrelationType::SleepPerformance | CorrelationType::VolumeRecovery
        )
    }
}

impl fmt::Display for CorrelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strength bucket of a correlation coefficient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationStrength {
    Weak,
    Moderate,
    Strong,
}

impl CorrelationStrength {
    /// weak: |r| < 0.3, moderate: 0.3 ≤ |r| < 0.6, strong: |r| ≥ 0.6
    pub fn from_coefficient(r: f64) -> Self {
        let magnitude = r.abs();
        if magnitude >= 0.6 {
            CorrelationStrength::Strong
        } else if magnitude >= 0.3 {
            CorrelationStrength::Moderate
        } else {
            CorrelationStrength::Weak
        }
    }
}

impl fmt::Display for CorrelationStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorrelationStrength::Weak => write!(f, "weak"),
            CorrelationStrength::Moderate => write!(f, "moderate"),
            CorrelationStrength::Strong => write!(f, "strong"),
        }
    }
}

/// Sign of a correlation coefficient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationDirection {
    Positive,
    Negative,
    None,
}

impl CorrelationDirection {
    /// none: |r| < 0.1, otherwise the sign of r
    pub fn from_coefficient(r: f64) -> Self {
        if r.abs() < 0.1 {
            CorrelationDirection::None
        } else if r > 0.0 {
            CorrelationDirection::Positive
        } else {
            CorrelationDirection::Negative
        }
    }
}

impl fmt::Display for CorrelationDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorrelationDirection::Positive => write!(f, "positive"),
            CorrelationDirection::Negative => write!(f, "negative"),
            CorrelationDirection::None => write!(f, "none"),
        }
    }
}

/// Outcome of one metric-pair correlation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationResult {
    #[serde(rename = "type")]
    pub correlation_type: CorrelationType,

    /// Pearson coefficient rounded to two decimals
    pub correlation: f64,

    pub strength: CorrelationStrength,
    pub direction: CorrelationDirection,
    pub insight: String,

    /// Number of samples the coefficient was computed over
    pub data_points: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

/// Direction of recent recovery relative to the preceding weeks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthTrend {
    Improving,
    Declining,
    Stable,
}

impl fmt::Display for HealthTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthTrend::Improving => write!(f, "improving"),
            HealthTrend::Declining => write!(f, "declining"),
            HealthTrend::Stable => write!(f, "stable"),
        }
    }
}

/// The five component scores, each 0-100
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScoreComponents {
    pub sleep: u8,
    pub recovery: u8,
    pub consistency: u8,
    pub nutrition: u8,
    pub stress: u8,
}

impl ScoreComponents {
    pub const SLEEP_WEIGHT: f64 = 0.25;
    pub const RECOVERY_WEIGHT: f64 = 0.25;
    pub const CONSISTENCY_WEIGHT: f64 = 0.20;
    pub const NUTRITION_WEIGHT: f64 = 0.15;
    pub const STRESS_WEIGHT: f64 = 0.15;

    /// Weighted overall score, rounded to the nearest integer
    pub fn overall(&self) -> u8 {
        let weighted = self.sleep as f64 * Self::SLEEP_WEIGHT
            + self.recovery as f64 * Self::RECOVERY_WEIGHT
            + self.consistency as f64 * Self::CONSISTENCY_WEIGHT
            + self.nutrition as f64 * Self::NUTRITION_WEIGHT
            + self.stress as f64 * Self::STRESS_WEIGHT;
        weighted.round().clamp(0.0, 100.0) as u8
    }

    /// Components keyed by name, in a stable order
    pub fn as_map(&self) -> BTreeMap<&'static str, u8> {
        BTreeMap::from([
            ("sleep", self.sleep),
            ("recovery", self.recovery),
            ("consistency", self.consistency),
            ("nutrition", self.nutrition),
            ("stress", self.stress),
        ])
    }
}

/// Composite 0-100 wellness score with trend and insights
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthScore {
    pub overall: u8,
    pub components: ScoreComponents,
    pub trend: HealthTrend,

    /// Never empty
    pub insights: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workout_set_parsing() {
        let set: WorkoutSet = "100x5".parse().unwrap();
        assert_eq!(set, WorkoutSet::new(100.0, 5));
        assert_eq!(set.volume(), 500.0);

        let set: WorkoutSet = "62.5X8".parse().unwrap();
        assert_eq!(set.volume(), 500.0);

        assert!("100".parse::<WorkoutSet>().is_err());
        assert!("-5x10".parse::<WorkoutSet>().is_err());
        assert!("abcx10".parse::<WorkoutSet>().is_err());
    }

    #[test]
    fn test_analysis_period_parsing() {
        assert_eq!("7".parse::<AnalysisPeriod>().unwrap(), AnalysisPeriod::Week);
        assert_eq!("60d".parse::<AnalysisPeriod>().unwrap(), AnalysisPeriod::TwoMonths);
        assert!("10".parse::<AnalysisPeriod>().is_err());
        assert!("-7".parse::<AnalysisPeriod>().is_err());
        assert_eq!(AnalysisPeriod::default().days(), 30);
    }

    #[test]
    fn test_date_range_ending_on() {
        let end = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let range = DateRange::ending_on(end, 7);
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
        assert!(range.contains(end));
        assert!(!range.contains(NaiveDate::from_ymd_opt(2024, 3, 3).unwrap()));
    }

    #[test]
    fn test_strength_and_direction_buckets() {
        assert_eq!(CorrelationStrength::from_coefficient(0.29), CorrelationStrength::Weak);
        assert_eq!(CorrelationStrength::from_coefficient(-0.3), CorrelationStrength::Moderate);
        assert_eq!(CorrelationStrength::from_coefficient(0.6), CorrelationStrength::Strong);

        assert_eq!(CorrelationDirection::from_coefficient(0.09), CorrelationDirection::None);
        assert_eq!(CorrelationDirection::from_coefficient(-0.1), CorrelationDirection::Negative);
        assert_eq!(CorrelationDirection::from_coefficient(0.45), CorrelationDirection::Positive);
    }

    #[test]
    fn test_overall_weighting() {
        let components = ScoreComponents {
            sleep: 100,
            recovery: 80,
            consistency: 60,
            nutrition: 40,
            stress: 20,
        };
        // 25 + 20 + 12 + 6 + 3
        assert_eq!(components.overall(), 66);
        assert_eq!(components.as_map().len(), 5);
    }

    #[test]
    fn test_correlation_result_serialization() {
        let result = CorrelationResult {
            correlation_type: CorrelationType::SleepPerformance,
            correlation: 0.42,
            strength: CorrelationStrength::Moderate,
            direction: CorrelationDirection::Positive,
            insight: "text".to_string(),
            data_points: 13,
            recommendation: None,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["type"], "sleep_performance");
        assert_eq!(json["dataPoints"], 13);
        assert_eq!(json["strength"], "moderate");
        assert!(json.get("recommendation").is_none());
    }
}
