//! Insight and recommendation templates
//!
//! Correlation text is selected from explicit lookup tables keyed by
//! (type, strength, direction). A combination missing from a table falls
//! back to the per-type default sentence.

use crate::models::{
    CorrelationDirection as Dir, CorrelationStrength as Str, CorrelationType, ScoreComponents,
};

type TemplateRow = (Str, Dir, &'static str);

const NUTRITION_RECOVERY: &[TemplateRow] = &[
    (
        Str::Strong,
        Dir::Positive,
        "Your nutrition quality strongly influences your recovery. Days you eat well are followed by noticeably better recovery.",
    ),
    (
        Str::Moderate,
        Dir::Positive,
        "Better nutrition tends to go hand in hand with better recovery for you.",
    ),
    (
        Str::Strong,
        Dir::Negative,
        "Your recovery drops on days with higher nutrition scores, which is unusual. Check how you rate your meals.",
    ),
];

const SLEEP_PERFORMANCE: &[TemplateRow] = &[
    (
        Str::Strong,
        Dir::Positive,
        "More sleep strongly predicts higher training volume the next day.",
    ),
    (
        Str::Moderate,
        Dir::Positive,
        "Nights with more sleep are usually followed by better training sessions.",
    ),
    (
        Str::Moderate,
        Dir::Negative,
        "Longer nights are not translating into bigger sessions. Sleep timing or quality may matter more than duration.",
    ),
];

const VOLUME_RECOVERY: &[TemplateRow] = &[
    (
        Str::Strong,
        Dir::Negative,
        "High-volume days are strongly followed by poorer recovery. Plan lighter days after big sessions.",
    ),
    (
        Str::Moderate,
        Dir::Negative,
        "Heavier training days tend to lower your recovery the following day.",
    ),
    (
        Str::Moderate,
        Dir::Positive,
        "You recover well even after high-volume days, a sign of good work capacity.",
    ),
];

const SLEEP_WORKOUT_QUALITY: &[TemplateRow] = &[
    (
        Str::Strong,
        Dir::Positive,
        "Sleep duration has a strong effect on how good your workouts feel.",
    ),
    (
        Str::Moderate,
        Dir::Positive,
        "Your workout quality improves on days after more sleep.",
    ),
];

const STRESS_PERFORMANCE: &[TemplateRow] = &[
    (
        Str::Strong,
        Dir::Negative,
        "Stress strongly reduces your training output. Stress management could unlock performance.",
    ),
    (
        Str::Moderate,
        Dir::Negative,
        "Higher stress days tend to come with lower training volume.",
    ),
    (
        Str::Moderate,
        Dir::Positive,
        "You tend to train more on stressful days. Training may be working as a stress outlet.",
    ),
];

const RECOMMENDATIONS: &[(CorrelationType, Str, Dir, &str)] = &[
    (
        CorrelationType::NutritionRecovery,
        Str::Strong,
        Dir::Positive,
        "Prioritise protein and whole foods, especially after hard sessions.",
    ),
    (
        CorrelationType::NutritionRecovery,
        Str::Moderate,
        Dir::Positive,
        "Keep meal quality consistent through the week to support recovery.",
    ),
    (
        CorrelationType::SleepPerformance,
        Str::Strong,
        Dir::Positive,
        "Protect 7-9 hours of sleep before your most important sessions.",
    ),
    (
        CorrelationType::SleepPerformance,
        Str::Moderate,
        Dir::Positive,
        "Aim for an earlier bedtime the night before heavy training days.",
    ),
    (
        CorrelationType::VolumeRecovery,
        Str::Strong,
        Dir::Negative,
        "Follow high-volume sessions with a rest or mobility day.",
    ),
    (
        CorrelationType::VolumeRecovery,
        Str::Moderate,
        Dir::Negative,
        "Spread volume more evenly across the week.",
    ),
    (
        CorrelationType::SleepWorkoutQuality,
        Str::Strong,
        Dir::Positive,
        "Treat sleep as part of training: keep a consistent sleep schedule.",
    ),
    (
        CorrelationType::StressPerformance,
        Str::Strong,
        Dir::Negative,
        "Add breathing work or a short walk on high-stress days before training.",
    ),
    (
        CorrelationType::StressPerformance,
        Str::Moderate,
        Dir::Negative,
        "Schedule lighter sessions on days you expect to be stressful.",
    ),
];

fn table(correlation_type: CorrelationType) -> &'static [TemplateRow] {
    match correlation_type {
        CorrelationType::NutritionRecovery => NUTRITION_RECOVERY,
        CorrelationType::SleepPerformance => SLEEP_PERFORMANCE,
        CorrelationType::VolumeRecovery => VOLUME_RECOVERY,
        CorrelationType::SleepWorkoutQuality => SLEEP_WORKOUT_QUALITY,
        CorrelationType::StressPerformance => STRESS_PERFORMANCE,
    }
}

/// Sentence used when no specific (strength, direction) row matches
pub fn default_insight(correlation_type: CorrelationType) -> &'static str {
    match correlation_type {
        CorrelationType::NutritionRecovery => {
            "No clear link between your nutrition and recovery yet. Keep logging to learn more."
        }
        CorrelationType::SleepPerformance => {
            "Sleep duration does not yet show a clear effect on next-day training volume."
        }
        CorrelationType::VolumeRecovery => {
            "Training volume is not clearly affecting your next-day recovery."
        }
        CorrelationType::SleepWorkoutQuality => {
            "Sleep and workout quality show no clear relationship so far."
        }
        CorrelationType::StressPerformance => {
            "Stress levels do not appear to affect your training volume."
        }
    }
}

/// Insight sentence for a classified correlation
pub fn correlation_insight(
    correlation_type: CorrelationType,
    strength: Str,
    direction: Dir,
) -> &'static str {
    table(correlation_type)
        .iter()
        .find(|(s, d, _)| *s == strength && *d == direction)
        .map(|(_, _, text)| *text)
        .unwrap_or_else(|| default_insight(correlation_type))
}

/// Actionable recommendation, only for moderate or strong correlations
pub fn correlation_recommendation(
    correlation_type: CorrelationType,
    strength: Str,
    direction: Dir,
) -> Option<&'static str> {
    RECOMMENDATIONS
        .iter()
        .find(|(t, s, d, _)| *t == correlation_type && *s == strength && *d == direction)
        .map(|(_, _, _, text)| *text)
}

pub const SLEEP_INSIGHT: &str =
    "Your sleep is below target. Aim for 7-9 hours per night to improve recovery and performance.";
pub const RECOVERY_INSIGHT: &str =
    "Recovery is low. Consider an extra rest day or lighter sessions this week.";
pub const CONSISTENCY_PRAISE: &str =
    "Great training consistency! Keep up the regular schedule.";
pub const CONSISTENCY_INSIGHT: &str =
    "Try to train more consistently. Around 4 sessions per week is a good target.";
pub const STRESS_INSIGHT: &str =
    "Stress is weighing on your health score. Breathing exercises, walks and a regular sleep routine can help.";
pub const GENERIC_INSIGHT: &str =
    "You're doing well overall. Keep maintaining your healthy habits.";

/// Threshold rules evaluated in order; each appends at most one message
pub fn score_insights(components: &ScoreComponents) -> Vec<String> {
    let rules: [(bool, &str); 5] = [
        (components.sleep < 60, SLEEP_INSIGHT),
        (components.recovery < 50, RECOVERY_INSIGHT),
        (components.consistency > 80, CONSISTENCY_PRAISE),
        (components.consistency < 50, CONSISTENCY_INSIGHT),
        (components.stress < 50, STRESS_INSIGHT),
    ];

    let mut insights: Vec<String> = rules
        .iter()
        .filter(|(triggered, _)| *triggered)
        .map(|(_, text)| text.to_string())
        .collect();

    if insights.is_empty() {
        insights.push(GENERIC_INSIGHT.to_string());
    }

    insights
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_specific_rows_are_selected() {
        let text = correlation_insight(CorrelationType::NutritionRecovery, Str::Strong, Dir::Positive);
        assert!(text.starts_with("Your nutrition quality strongly influences your recovery"));

        let text = correlation_insight(CorrelationType::VolumeRecovery, Str::Moderate, Dir::Negative);
        assert!(text.contains("lower your recovery"));
    }

    #[test]
    fn test_default_row_for_unmatched_combinations() {
        for t in CorrelationType::ALL {
            assert_eq!(correlation_insight(t, Str::Weak, Dir::None), default_insight(t));
        }
    }

    #[test]
    fn test_every_table_has_two_or_three_rows() {
        for t in CorrelationType::ALL {
            let rows = table(t).len();
            assert!((2..=3).contains(&rows), "{} has {} rows", t, rows);
        }
    }

    #[test]
    fn test_recommendations_only_for_meaningful_results() {
        for t in CorrelationType::ALL {
            for d in [Dir::Positive, Dir::Negative, Dir::None] {
                assert!(correlation_recommendation(t, Str::Weak, d).is_none());
            }
        }
        assert!(correlation_recommendation(
            CorrelationType::StressPerformance,
            Str::Strong,
            Dir::Negative
        )
        .is_some());
    }

    #[test]
    fn test_score_rules_order_and_fallback() {
        let poor = ScoreComponents {
            sleep: 40,
            recovery: 30,
            consistency: 20,
            nutrition: 70,
            stress: 10,
        };
        assert_eq!(
            score_insights(&poor),
            vec![SLEEP_INSIGHT, RECOVERY_INSIGHT, CONSISTENCY_INSIGHT, STRESS_INSIGHT]
        );

        let fine = ScoreComponents {
            sleep: 80,
            recovery: 80,
            consistency: 70,
            nutrition: 80,
            stress: 80,
        };
        assert_eq!(score_insights(&fine), vec![GENERIC_INSIGHT]);

        let consistent = ScoreComponents { consistency: 100, ..fine };
        assert_eq!(score_insights(&consistent), vec![CONSISTENCY_PRAISE]);
    }
}
