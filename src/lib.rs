// Library interface for HealthIntel modules
// This allows integration tests to access the core functionality

pub mod aggregator;
pub mod config;
pub mod correlation;
pub mod database;
pub mod error;
pub mod health_score;
pub mod insights;
pub mod llm;
pub mod logging;
pub mod models;
pub mod narrator;
pub mod service;

// Re-export commonly used types for convenience
pub use models::*;
pub use aggregator::{HealthDataAggregator, HealthRecordSource, InMemoryHealthStore};
pub use correlation::CorrelationEngine;
pub use database::SqliteHealthStore;
pub use health_score::HealthScoreCalculator;
pub use narrator::{InsightNarrator, TextGenerator};
pub use service::HealthIntelligenceService;
pub use error::{HealthIntelError, Result};
pub use logging::{LogConfig, LogLevel, LogFormat};
