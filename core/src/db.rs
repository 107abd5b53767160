use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, params};

use crate::day::DayRange;
use crate::models::{DailySummary, FoodEntry, NewFoodEntry};

/// Storage format for `logged_at`: UTC with fixed-width microseconds, so
/// lexicographic comparison in SQL equals chronological comparison.
const INSTANT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

fn fmt_instant(instant: DateTime<Utc>) -> String {
    instant.format(INSTANT_FORMAT).to_string()
}

fn parse_instant(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))
}

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS food_entries (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    calories INTEGER NOT NULL,
                    logged_at TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_food_entries_logged_at ON food_entries(logged_at);

                PRAGMA user_version = 1;",
            )?;
        }

        Ok(())
    }

    fn entry_from_row(row: &rusqlite::Row) -> rusqlite::Result<FoodEntry> {
        let logged_at: String = row.get(3)?;
        let logged_at = parse_instant(&logged_at).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
        })?;
        Ok(FoodEntry {
            id: row.get(0)?,
            name: row.get(1)?,
            calories: row.get(2)?,
            logged_at,
        })
    }

    /// Append one entry. `logged_at` defaults to the current instant;
    /// the id is assigned by SQLite and never reused.
    pub fn insert_entry(&self, entry: &NewFoodEntry) -> Result<FoodEntry> {
        let logged_at = entry.logged_at.unwrap_or_else(Utc::now);
        self.conn.execute(
            "INSERT INTO food_entries (name, calories, logged_at) VALUES (?1, ?2, ?3)",
            params![entry.name, entry.calories, fmt_instant(logged_at)],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_entry(id)
    }

    pub fn get_entry(&self, id: i64) -> Result<FoodEntry> {
        self.conn
            .query_row(
                "SELECT id, name, calories, logged_at FROM food_entries WHERE id = ?1",
                params![id],
                Self::entry_from_row,
            )
            .context("Food entry not found")
    }

    /// All entries with `start <= logged_at < end`, ascending by `logged_at`
    /// with id as the tiebreak (insertion order for equal timestamps).
    pub fn entries_in_range(&self, range: DayRange) -> Result<Vec<FoodEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, calories, logged_at FROM food_entries
             WHERE logged_at >= ?1 AND logged_at < ?2
             ORDER BY logged_at, id",
        )?;
        let entries = stmt
            .query_map(
                params![fmt_instant(range.start), fmt_instant(range.end)],
                Self::entry_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn entries_for_date(&self, date: NaiveDate) -> Result<Vec<FoodEntry>> {
        self.entries_in_range(DayRange::for_date(date))
    }

    /// Sum calories over one day's entries. An empty day yields a total of
    /// zero and an empty entry list, not an error.
    pub fn build_daily_summary(&self, date: NaiveDate) -> Result<DailySummary> {
        let entries = self.entries_for_date(date)?;
        let total_calories = entries.iter().map(|e| e.calories).sum();
        Ok(DailySummary {
            date: date.format("%Y-%m-%d").to_string(),
            total_calories,
            entries,
        })
    }
}
