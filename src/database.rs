use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

use crate::aggregator::HealthRecordSource;
use crate::error::Result;
use crate::models::{DateRange, HealthRecords, ReadinessCheckIn, WorkoutSession, WorkoutSet};

/// SQLite-backed store of readiness check-ins and workouts
pub struct SqliteHealthStore {
    conn: Connection,
}

impl SqliteHealthStore {
    /// Create or open a database at the specified path
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        if let Some(parent) = db_path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(&db_path)?;
        let store = Self { conn };
        store.init_schema()?;

        info!(path = %db_path.as_ref().display(), "Opened health database");
        Ok(store)
    }

    /// In-memory database, mainly for tests
    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Initialize database schema with tables and indexes
    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS readiness_checkins (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                date DATE NOT NULL,
                sleep_hours REAL,
                sleep_quality REAL,
                stress_level REAL,
                soreness_level REAL,
                energy_level REAL,
                motivation_level REAL,
                nutrition_score REAL,
                recovery_score REAL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE TABLE IF NOT EXISTS workout_sessions (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                date DATE NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE TABLE IF NOT EXISTS workout_sets (
                session_id TEXT NOT NULL,
                set_index INTEGER NOT NULL,
                weight REAL NOT NULL,
                reps INTEGER NOT NULL,
                PRIMARY KEY (session_id, set_index),
                FOREIGN KEY (session_id) REFERENCES workout_sessions (id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_checkins_user_date ON readiness_checkins (user_id, date);
            CREATE INDEX IF NOT EXISTS idx_sessions_user_date ON workout_sessions (user_id, date);
            "#,
        )?;
        Ok(())
    }

    /// Store a readiness check-in
    pub fn record_check_in(&self, check_in: &ReadinessCheckIn) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO readiness_checkins (
                id, user_id, date, sleep_hours, sleep_quality, stress_level, soreness_level,
                energy_level, motivation_level, nutrition_score, recovery_score
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                check_in.id,
                check_in.user_id,
                check_in.date,
                check_in.sleep_hours,
                check_in.sleep_quality,
                check_in.stress_level,
                check_in.soreness_level,
                check_in.energy_level,
                check_in.motivation_level,
                check_in.nutrition_score,
                check_in.recovery_score,
            ],
        )?;

        debug!(user_id = %check_in.user_id, date = %check_in.date, "Recorded check-in");
        Ok(())
    }

    /// Store a workout session and its sets in one transaction
    pub fn record_workout(&mut self, workout: &WorkoutSession) -> Result<()> {
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO workout_sessions (id, user_id, date) VALUES (?1, ?2, ?3)",
            params![workout.id, workout.user_id, workout.date],
        )?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO workout_sets (session_id, set_index, weight, reps) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (index, set) in workout.sets.iter().enumerate() {
                stmt.execute(params![workout.id, index as i64, set.weight, set.reps])?;
            }
        }

        tx.commit()?;

        debug!(
            user_id = %workout.user_id,
            date = %workout.date,
            sets = workout.sets.len(),
            "Recorded workout"
        );
        Ok(())
    }

    /// Number of stored check-ins for a user
    pub fn count_check_ins(&self, user_id: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM readiness_checkins WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Number of stored workout sessions for a user
    pub fn count_workouts(&self, user_id: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM workout_sessions WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn check_in_from_row(row: &Row) -> rusqlite::Result<ReadinessCheckIn> {
        Ok(ReadinessCheckIn {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            date: row.get("date")?,
            sleep_hours: row.get("sleep_hours")?,
            sleep_quality: row.get("sleep_quality")?,
            stress_level: row.get("stress_level")?,
            soreness_level: row.get("soreness_level")?,
            energy_level: row.get("energy_level")?,
            motivation_level: row.get("motivation_level")?,
            nutrition_score: row.get("nutrition_score")?,
            recovery_score: row.get("recovery_score")?,
        })
    }

    fn load_check_ins(
        conn: &Connection,
        user_id: &str,
        range: DateRange,
    ) -> rusqlite::Result<Vec<ReadinessCheckIn>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT id, user_id, date, sleep_hours, sleep_quality, stress_level, soreness_level,
                   energy_level, motivation_level, nutrition_score, recovery_score
            FROM readiness_checkins
            WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3
            ORDER BY date, created_at
            "#,
        )?;

        let rows = stmt.query_map(params![user_id, range.start, range.end], Self::check_in_from_row)?;
        rows.collect()
    }

    fn load_workouts(
        conn: &Connection,
        user_id: &str,
        range: DateRange,
    ) -> rusqlite::Result<Vec<WorkoutSession>> {
        // Sessions without sets still count as workouts, hence the LEFT JOIN
        let mut stmt = conn.prepare(
            r#"
            SELECT s.id, s.date, ws.weight, ws.reps
            FROM workout_sessions s
            LEFT JOIN workout_sets ws ON ws.session_id = s.id
            WHERE s.user_id = ?1 AND s.date BETWEEN ?2 AND ?3
            ORDER BY s.date, s.id, ws.set_index
            "#,
        )?;

        let mut sessions: Vec<WorkoutSession> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        let mut rows = stmt.query(params![user_id, range.start, range.end])?;
        while let Some(row) = rows.next()? {
            let id: String = row.get(0)?;
            let date: NaiveDate = row.get(1)?;
            let weight: Option<f64> = row.get(2)?;
            let reps: Option<u32> = row.get(3)?;

            let position = *positions.entry(id.clone()).or_insert_with(|| {
                sessions.push(WorkoutSession {
                    id,
                    user_id: user_id.to_string(),
                    date,
                    sets: Vec::new(),
                });
                sessions.len() - 1
            });

            if let (Some(weight), Some(reps)) = (weight, reps) {
                sessions[position].sets.push(WorkoutSet { weight, reps });
            }
        }

        Ok(sessions)
    }
}

impl HealthRecordSource for SqliteHealthStore {
    fn load_records(&self, user_id: &str, range: DateRange) -> Result<HealthRecords> {
        // Both selects share one read transaction so they see the same snapshot
        let tx = self.conn.unchecked_transaction()?;
        let records = HealthRecords {
            check_ins: Self::load_check_ins(&tx, user_id, range)?,
            workouts: Self::load_workouts(&tx, user_id, range)?,
        };
        tx.commit()?;

        Ok(records)
    }
}
