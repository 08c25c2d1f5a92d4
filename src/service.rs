//! Public operations of the health intelligence engine
//!
//! Every call recomputes from the store; nothing is cached, so repeated
//! calls over unchanged data return identical results.

use chrono::{NaiveDate, Utc};
use tracing::{error, info, instrument};

use crate::aggregator::{HealthDataAggregator, HealthRecordSource};
use crate::correlation::CorrelationEngine;
use crate::error::Result;
use crate::health_score::HealthScoreCalculator;
use crate::models::{AnalysisPeriod, CorrelationResult, DateRange, HealthScore};
use crate::narrator::{InsightNarrator, INSUFFICIENT_DATA_MESSAGE};

/// Correlations, health score and narrated insights for a user
pub struct HealthIntelligenceService<S> {
    aggregator: HealthDataAggregator<S>,
    correlations: CorrelationEngine,
    scores: HealthScoreCalculator,
    narrator: InsightNarrator,
}

impl<S: HealthRecordSource> HealthIntelligenceService<S> {
    /// Service without AI narration
    pub fn new(source: S) -> Self {
        Self::with_narrator(source, InsightNarrator::disabled())
    }

    pub fn with_narrator(source: S, narrator: InsightNarrator) -> Self {
        Self {
            aggregator: HealthDataAggregator::new(source),
            correlations: CorrelationEngine::new(),
            scores: HealthScoreCalculator::new(),
            narrator,
        }
    }

    pub fn source(&self) -> &S {
        self.aggregator.source()
    }

    /// Correlations over the period ending today
    pub fn get_correlations(
        &self,
        user_id: &str,
        period: AnalysisPeriod,
    ) -> Result<Vec<CorrelationResult>> {
        self.get_correlations_at(user_id, period, today())
    }

    /// Correlations over the `period` days ending on `today`
    #[instrument(skip(self), fields(period_days = period.days()))]
    pub fn get_correlations_at(
        &self,
        user_id: &str,
        period: AnalysisPeriod,
        today: NaiveDate,
    ) -> Result<Vec<CorrelationResult>> {
        let range = DateRange::ending_on(today, period.days());
        let series = self.aggregator.aggregate(user_id, range.start, range.end)?;
        let results = self.correlations.analyze(&series);

        info!(
            data_points = series.len(),
            correlations = results.len(),
            "Computed correlations"
        );
        Ok(results)
    }

    /// Health score for the windows ending today
    pub fn get_health_score(&self, user_id: &str) -> Result<HealthScore> {
        self.get_health_score_at(user_id, today())
    }

    /// Health score with the recent window ending on `today`
    #[instrument(skip(self))]
    pub fn get_health_score_at(&self, user_id: &str, today: NaiveDate) -> Result<HealthScore> {
        let (recent_range, older_range) = HealthScoreCalculator::windows(today);
        let recent = self
            .aggregator
            .aggregate(user_id, recent_range.start, recent_range.end)?;
        let older = self
            .aggregator
            .aggregate(user_id, older_range.start, older_range.end)?;

        let score = self.scores.calculate(&recent, &older);
        info!(overall = score.overall, trend = %score.trend, "Computed health score");
        Ok(score)
    }

    /// Narrated insights for the period ending today; never fails
    pub async fn generate_ai_insights(&self, user_id: &str, period: AnalysisPeriod) -> String {
        self.generate_ai_insights_at(user_id, period, today()).await
    }

    /// Narrated insights for the period ending on `today`; never fails
    ///
    /// A store failure is logged and reported as insufficient data.
    pub async fn generate_ai_insights_at(
        &self,
        user_id: &str,
        period: AnalysisPeriod,
        today: NaiveDate,
    ) -> String {
        // Store reads are synchronous and block this worker until they finish.
        // They complete before the narrator's await, so no store borrow crosses it.
        let analysis = self
            .get_correlations_at(user_id, period, today)
            .and_then(|correlations| {
                Ok((correlations, self.get_health_score_at(user_id, today)?))
            });

        match analysis {
            Ok((correlations, score)) => self.narrator.narrate(&score, &correlations).await,
            Err(e) => {
                error!(user_id, error = %e, "Failed to load health data for insights");
                INSUFFICIENT_DATA_MESSAGE.to_string()
            }
        }
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}
