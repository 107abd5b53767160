use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};

use crate::day::{self, parse_date_label};
use crate::db::Database;
use crate::models::{DailySummary, FoodEntry, NewFoodEntry, validate_entry_input};

/// Facade over the record store. Each call is an independent, short-lived
/// operation; validation happens here before any store access.
pub struct NibbleService {
    db: Database,
}

impl NibbleService {
    pub fn new(db_path: &Path) -> Result<Self> {
        let db = Database::open(db_path)?;
        Ok(Self { db })
    }

    pub fn new_in_memory() -> Result<Self> {
        let db = Database::open_in_memory()?;
        Ok(Self { db })
    }

    /// Create an entry logged at the current instant.
    pub fn create_entry(&self, name: &str, calories: i64) -> Result<FoodEntry> {
        let name = validate_entry_input(name, calories)?;
        self.db.insert_entry(&NewFoodEntry {
            name,
            calories,
            logged_at: None,
        })
    }

    /// Create an entry with an explicit timestamp (backdated logging).
    pub fn create_entry_at(
        &self,
        name: &str,
        calories: i64,
        logged_at: DateTime<Utc>,
    ) -> Result<FoodEntry> {
        let name = validate_entry_input(name, calories)?;
        self.db.insert_entry(&NewFoodEntry {
            name,
            calories,
            logged_at: Some(logged_at),
        })
    }

    /// Entries for a `YYYY-MM-DD` date label, ascending by `logged_at`.
    pub fn entries_by_date(&self, label: &str) -> Result<Vec<FoodEntry>> {
        let date = parse_date_label(label)?;
        self.db.entries_for_date(date)
    }

    pub fn entries_for(&self, date: NaiveDate) -> Result<Vec<FoodEntry>> {
        self.db.entries_for_date(date)
    }

    /// Daily summary for a `YYYY-MM-DD` date label.
    pub fn daily_summary(&self, label: &str) -> Result<DailySummary> {
        let date = parse_date_label(label)?;
        self.db.build_daily_summary(date)
    }

    pub fn summary_for(&self, date: NaiveDate) -> Result<DailySummary> {
        self.db.build_daily_summary(date)
    }

    /// Summary for the server-local calendar day, through the same range
    /// resolution as an explicit date.
    pub fn today_summary(&self) -> Result<DailySummary> {
        self.db.build_daily_summary(day::today())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_entry_returns_full_row() {
        let svc = NibbleService::new_in_memory().unwrap();
        let before = Utc::now();
        let entry = svc.create_entry("Apple", 95).unwrap();
        let after = Utc::now();

        assert!(entry.id > 0);
        assert_eq!(entry.name, "Apple");
        assert_eq!(entry.calories, 95);
        assert!(entry.logged_at >= before && entry.logged_at <= after);
    }

    #[test]
    fn test_create_entry_rejects_bad_input_before_store() {
        let svc = NibbleService::new_in_memory().unwrap();
        assert!(svc.create_entry("  ", 100).is_err());
        assert!(svc.create_entry("Apple", -5).is_err());

        // Nothing was persisted.
        let summary = svc.today_summary().unwrap();
        assert_eq!(summary.total_calories, 0);
        assert!(summary.entries.is_empty());
    }

    #[test]
    fn test_create_entry_trims_name() {
        let svc = NibbleService::new_in_memory().unwrap();
        let entry = svc.create_entry("  Banana  ", 105).unwrap();
        assert_eq!(entry.name, "Banana");
    }

    #[test]
    fn test_daily_summary_by_label() {
        let svc = NibbleService::new_in_memory().unwrap();
        let at = "2024-01-15T10:00:00Z".parse().unwrap();
        svc.create_entry_at("Apple", 95, at).unwrap();
        svc.create_entry_at("Banana", 105, at).unwrap();
        svc.create_entry_at("Orange", 62, at).unwrap();

        let summary = svc.daily_summary("2024-01-15").unwrap();
        assert_eq!(summary.date, "2024-01-15");
        assert_eq!(summary.total_calories, 262);
        assert_eq!(summary.entries.len(), 3);
    }

    #[test]
    fn test_entries_by_date_ordering() {
        let svc = NibbleService::new_in_memory().unwrap();
        svc.create_entry_at("Dinner", 600, "2024-01-15T19:00:00Z".parse().unwrap())
            .unwrap();
        svc.create_entry_at("Breakfast", 300, "2024-01-15T07:00:00Z".parse().unwrap())
            .unwrap();

        let entries = svc.entries_by_date("2024-01-15").unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Breakfast", "Dinner"]);
    }

    #[test]
    fn test_malformed_label_is_error() {
        let svc = NibbleService::new_in_memory().unwrap();
        assert!(svc.daily_summary("15-01-2024").is_err());
        assert!(svc.entries_by_date("tomorrow").is_err());
    }

    #[test]
    fn test_today_summary_covers_todays_label_range() {
        let svc = NibbleService::new_in_memory().unwrap();
        // Seed at the label's own UTC bounds rather than Utc::now(), so the
        // test holds near local midnight in zones offset from UTC.
        let range = crate::day::DayRange::for_date(day::today());
        svc.create_entry_at("Toast", 150, range.start).unwrap();
        svc.create_entry_at(
            "Late snack",
            90,
            range.end - chrono::Duration::microseconds(1),
        )
        .unwrap();
        svc.create_entry_at("Tomorrow", 500, range.end).unwrap();

        let summary = svc.today_summary().unwrap();
        assert_eq!(summary.date, day::today().format("%Y-%m-%d").to_string());
        assert_eq!(summary.total_calories, 240);
        assert_eq!(summary.entries.len(), 2);
    }
}
