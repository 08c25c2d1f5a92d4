use anyhow::Result;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use tabled::{Table, Tabled};

use healthintel::config::AppConfig;
use healthintel::llm::OpenAiCompatibleGenerator;
use healthintel::logging::{init_logging, LogLevel};
use healthintel::{
    AnalysisPeriod, CorrelationDirection, CorrelationResult, HealthIntelligenceService,
    HealthScore, HealthTrend, InsightNarrator, ReadinessCheckIn, SqliteHealthStore,
    WorkoutSession, WorkoutSet,
};

/// HealthIntel - Training Readiness Analysis CLI
///
/// Correlates daily readiness check-ins with training volume and derives a
/// composite health score with trend and coaching insights.
#[derive(Parser)]
#[command(name = "healthintel")]
#[command(author = "HealthIntel Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Training readiness analysis CLI", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Overrides the database path from the config file
    #[arg(long, value_name = "FILE")]
    db: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log a daily readiness check-in
    Checkin {
        #[arg(short, long)]
        user: String,

        /// Check-in date (YYYY-MM-DD, default: today)
        #[arg(short, long)]
        date: Option<NaiveDate>,

        #[arg(long)]
        sleep_hours: Option<f64>,
        #[arg(long)]
        sleep_quality: Option<f64>,
        #[arg(long)]
        stress: Option<f64>,
        #[arg(long)]
        soreness: Option<f64>,
        #[arg(long)]
        energy: Option<f64>,
        #[arg(long)]
        motivation: Option<f64>,
        #[arg(long)]
        nutrition: Option<f64>,
        #[arg(long)]
        recovery: Option<f64>,
    },

    /// Log a workout session
    Workout {
        #[arg(short, long)]
        user: String,

        /// Workout date (YYYY-MM-DD, default: today)
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Sets as WEIGHTxREPS, repeatable (e.g. --set 100x5 --set 90x8)
        #[arg(short, long = "set")]
        sets: Vec<WorkoutSet>,
    },

    /// Show lifestyle/performance correlations
    Correlations {
        #[arg(short, long)]
        user: String,

        /// Lookback period in days (7, 14, 30 or 60)
        #[arg(short, long, default_value = "30")]
        period: AnalysisPeriod,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show the composite health score
    Score {
        #[arg(short, long)]
        user: String,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Generate narrated coaching insights
    Insights {
        #[arg(short, long)]
        user: String,

        /// Lookback period in days (7, 14, 30 or 60)
        #[arg(short, long, default_value = "30")]
        period: AnalysisPeriod,
    },

    /// Manage the configuration file
    Config {
        /// Write a default configuration file
        #[arg(long)]
        init: bool,

        /// Print the active configuration
        #[arg(long)]
        show: bool,
    },
}

#[derive(Tabled)]
struct CorrelationRow {
    #[tabled(rename = "Correlation")]
    name: String,
    #[tabled(rename = "r")]
    coefficient: String,
    #[tabled(rename = "Strength")]
    strength: String,
    #[tabled(rename = "Direction")]
    direction: String,
    #[tabled(rename = "Days")]
    data_points: usize,
}

impl From<&CorrelationResult> for CorrelationRow {
    fn from(result: &CorrelationResult) -> Self {
        CorrelationRow {
            name: result.correlation_type.to_string(),
            coefficient: format!("{:+.2}", result.correlation),
            strength: result.strength.to_string(),
            direction: result.direction.to_string(),
            data_points: result.data_points,
        }
    }
}

#[derive(Tabled)]
struct ComponentRow {
    #[tabled(rename = "Component")]
    name: &'static str,
    #[tabled(rename = "Score")]
    score: u8,
}

fn build_narrator(config: &AppConfig) -> InsightNarrator {
    if !config.narrator.enabled {
        return InsightNarrator::disabled();
    }

    match OpenAiCompatibleGenerator::from_settings(&config.narrator) {
        Ok(generator) => InsightNarrator::new(Box::new(generator), config.narrator.timeout()),
        Err(e) => {
            tracing::warn!(error = %e, "Text generator unavailable, narration disabled");
            InsightNarrator::disabled()
        }
    }
}

fn print_correlations(results: &[CorrelationResult]) {
    if results.is_empty() {
        println!(
            "{}",
            "Not enough data: at least 7 days of check-ins or workouts are needed.".yellow()
        );
        return;
    }

    let rows: Vec<CorrelationRow> = results.iter().map(CorrelationRow::from).collect();
    println!("{}", Table::new(rows));

    for result in results {
        let marker = match result.direction {
            CorrelationDirection::Positive => "▲".green(),
            CorrelationDirection::Negative => "▼".red(),
            CorrelationDirection::None => "•".dimmed(),
        };
        println!("{} {}", marker, result.insight);
        if let Some(recommendation) = &result.recommendation {
            println!("    {}", recommendation.cyan());
        }
    }
}

fn print_score(score: &HealthScore) {
    let overall = score.overall.to_string();
    let overall = match score.overall {
        80..=100 => overall.green().bold(),
        50..=79 => overall.yellow().bold(),
        _ => overall.red().bold(),
    };
    let trend = match score.trend {
        HealthTrend::Improving => score.trend.to_string().green(),
        HealthTrend::Declining => score.trend.to_string().red(),
        HealthTrend::Stable => score.trend.to_string().normal(),
    };

    println!("Health score: {}/100 ({})", overall, trend);

    let rows: Vec<ComponentRow> = score
        .components
        .as_map()
        .into_iter()
        .map(|(name, score)| ComponentRow { name, score })
        .collect();
    println!("{}", Table::new(rows));

    for insight in &score.insights {
        println!("  • {}", insight);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    if let Some(level) = LogLevel::from_verbosity(cli.verbose) {
        config.logging.level = level;
    }
    if let Some(db) = &cli.db {
        config.database.path = db.clone();
    }
    init_logging(&config.logging)?;

    let today = Utc::now().date_naive();

    match cli.command {
        Commands::Config { init, show } => {
            if init {
                let path = cli.config.clone().unwrap_or_else(AppConfig::default_config_path);
                config.save_to_file(&path)?;
                println!("{} {}", "✓ Configuration written to".green(), path.display());
            }
            if show || !init {
                println!("{}", toml::to_string_pretty(&config)?);
            }
            return Ok(());
        }

        Commands::Checkin {
            user,
            date,
            sleep_hours,
            sleep_quality,
            stress,
            soreness,
            energy,
            motivation,
            nutrition,
            recovery,
        } => {
            let store = open_store(&config)?;
            let mut check_in = ReadinessCheckIn::new(user, date.unwrap_or(today));
            check_in.sleep_hours = sleep_hours;
            check_in.sleep_quality = sleep_quality;
            check_in.stress_level = stress;
            check_in.soreness_level = soreness;
            check_in.energy_level = energy;
            check_in.motivation_level = motivation;
            check_in.nutrition_score = nutrition;
            check_in.recovery_score = recovery;

            store.record_check_in(&check_in)?;
            println!("{} {}", "✓ Check-in recorded for".green(), check_in.date);
        }

        Commands::Workout { user, date, sets } => {
            let mut store = open_store(&config)?;
            let workout = WorkoutSession::new(user, date.unwrap_or(today), sets);
            store.record_workout(&workout)?;
            println!(
                "{} {} ({} sets, volume {:.0})",
                "✓ Workout recorded for".green(),
                workout.date,
                workout.sets.len(),
                workout.volume()
            );
        }

        Commands::Correlations { user, period, json } => {
            let service = HealthIntelligenceService::new(open_store(&config)?);
            let results = service.get_correlations(&user, period)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                println!("{} {}", "Correlations over".blue().bold(), period);
                print_correlations(&results);
            }
        }

        Commands::Score { user, json } => {
            let service = HealthIntelligenceService::new(open_store(&config)?);
            let score = service.get_health_score(&user)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&score)?);
            } else {
                print_score(&score);
            }
        }

        Commands::Insights { user, period } => {
            let service =
                HealthIntelligenceService::with_narrator(open_store(&config)?, build_narrator(&config));
            let text = service.generate_ai_insights(&user, period).await;
            println!("{}", text);
        }
    }

    Ok(())
}

fn open_store(config: &AppConfig) -> Result<SqliteHealthStore> {
    SqliteHealthStore::open(&config.database.path).map_err(|e| {
        anyhow::anyhow!(e.user_message()).context(format!(
            "Failed to open database at {}",
            config.database.path.display()
        ))
    })
}
