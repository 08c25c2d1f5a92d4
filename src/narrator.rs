//! Optional free-text elaboration of computed health insights
//!
//! The narrator asks an external text generator to expand on the score and
//! correlations. It never fails: missing data short-circuits to a fixed
//! message and any generator failure degrades to the template insights.

use async_trait::async_trait;
use std::fmt::Write as _;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::GenerationError;
use crate::models::{CorrelationResult, HealthScore};

/// Returned when there are not enough days of data to correlate
pub const INSUFFICIENT_DATA_MESSAGE: &str =
    "Not enough data yet to generate insights. Keep logging your daily check-ins and workouts for at least a week.";

/// System instruction sent with every generation request
pub const SYSTEM_INSTRUCTION: &str = "You are an experienced sports scientist and strength coach. \
Using the athlete's health score and the correlations between their lifestyle and training metrics, \
give concise, practical, evidence-based advice in 3 to 5 sentences. \
Do not invent data that is not provided.";

/// Default bound on a single generation call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// External free-text generation capability
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Short provider name for logs
    fn name(&self) -> &str;

    /// Generate text for `prompt` under the given system instruction
    async fn generate(
        &self,
        system_instruction: &str,
        prompt: &str,
    ) -> Result<String, GenerationError>;
}

/// Build the user prompt embedding the score and correlations
pub fn build_prompt(score: &HealthScore, correlations: &[CorrelationResult]) -> String {
    let mut prompt = String::new();

    let _ = writeln!(prompt, "Health score: {}/100 (trend: {})", score.overall, score.trend);
    let _ = writeln!(prompt, "Components:");
    for (name, value) in score.components.as_map() {
        let _ = writeln!(prompt, "- {}: {}/100", name, value);
    }

    let _ = writeln!(prompt, "Correlations:");
    for c in correlations {
        let _ = writeln!(
            prompt,
            "- {}: {} {} (r = {:.2}, n = {})",
            c.correlation_type, c.strength, c.direction, c.correlation, c.data_points
        );
    }

    let _ = write!(
        prompt,
        "Explain what these patterns mean for this athlete and what they should change first."
    );
    prompt
}

/// Deterministic text used when generation is unavailable
pub fn fallback_text(score: &HealthScore) -> String {
    score.insights.join(" ")
}

/// Narrates health insights through an optional text generator
pub struct InsightNarrator {
    generator: Option<Box<dyn TextGenerator>>,
    timeout: Duration,
}

impl InsightNarrator {
    pub fn new(generator: Box<dyn TextGenerator>, timeout: Duration) -> Self {
        Self {
            generator: Some(generator),
            timeout,
        }
    }

    /// Narrator that always uses the template fallback
    pub fn disabled() -> Self {
        Self {
            generator: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.generator.is_some()
    }

    /// Produce narrative text; never fails
    pub async fn narrate(&self, score: &HealthScore, correlations: &[CorrelationResult]) -> String {
        if correlations.is_empty() {
            debug!("No correlations available, skipping text generation");
            return INSUFFICIENT_DATA_MESSAGE.to_string();
        }

        match self.request(score, correlations).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Text generation failed, using template insights");
                fallback_text(score)
            }
        }
    }

    async fn request(
        &self,
        score: &HealthScore,
        correlations: &[CorrelationResult],
    ) -> Result<String, GenerationError> {
        let generator = self.generator.as_ref().ok_or(GenerationError::NotConfigured)?;
        let prompt = build_prompt(score, correlations);

        info!(generator = generator.name(), timeout_secs = self.timeout.as_secs(), "Requesting AI insights");

        let text = tokio::time::timeout(self.timeout, generator.generate(SYSTEM_INSTRUCTION, &prompt))
            .await
            .map_err(|_| GenerationError::Timeout {
                seconds: self.timeout.as_secs(),
            })??;

        let text = text.trim();
        if text.is_empty() {
            return Err(GenerationError::MalformedResponse {
                provider: generator.name().to_string(),
                reason: "empty text".to_string(),
            });
        }

        Ok(text.to_string())
    }
}
