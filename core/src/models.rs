use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One logged food item. Rows are append-only: entries are never updated
/// or deleted once persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodEntry {
    pub id: i64,
    pub name: String,
    pub calories: i64,
    pub logged_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewFoodEntry {
    pub name: String,
    pub calories: i64,
    /// Explicit timestamp for backdated entries; `None` logs at the current instant.
    pub logged_at: Option<DateTime<Utc>>,
}

/// Aggregated view of one calendar day: total calories plus the matching
/// entries ordered by `logged_at`. Computed fresh on every query, never stored.
#[derive(Debug, Clone, Serialize)]
pub struct DailySummary {
    pub date: String,
    pub total_calories: i64,
    pub entries: Vec<FoodEntry>,
}

/// Validate creation input and return the trimmed name.
/// Rejects empty/whitespace-only names and negative calories before any store access.
pub fn validate_entry_input(name: &str, calories: i64) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        bail!("Food name must not be empty");
    }
    if calories < 0 {
        bail!("calories must not be negative");
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_entry_input_valid() {
        assert_eq!(validate_entry_input("Apple", 95).unwrap(), "Apple");
        assert_eq!(validate_entry_input("Water", 0).unwrap(), "Water");
    }

    #[test]
    fn test_validate_entry_input_trims_name() {
        assert_eq!(validate_entry_input("  Banana  ", 105).unwrap(), "Banana");
    }

    #[test]
    fn test_validate_entry_input_empty_name() {
        assert!(validate_entry_input("", 100).is_err());
        assert!(validate_entry_input("   ", 100).is_err());
    }

    #[test]
    fn test_validate_entry_input_negative_calories() {
        assert!(validate_entry_input("Apple", -1).is_err());
    }

    #[test]
    fn test_food_entry_serializes_logged_at_as_rfc3339() {
        let entry = FoodEntry {
            id: 1,
            name: "Apple".to_string(),
            calories: 95,
            logged_at: "2024-01-15T10:00:00Z".parse().unwrap(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["name"], "Apple");
        assert_eq!(json["calories"], 95);
        assert_eq!(json["logged_at"], "2024-01-15T10:00:00Z");
    }

    #[test]
    fn test_daily_summary_serializes_entries() {
        let summary = DailySummary {
            date: "2024-01-15".to_string(),
            total_calories: 0,
            entries: vec![],
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["date"], "2024-01-15");
        assert_eq!(json["total_calories"], 0);
        assert!(json["entries"].as_array().unwrap().is_empty());
    }
}
