use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use nibble_core::service::NibbleService;

pub(crate) fn cmd_log(
    svc: &NibbleService,
    name: &str,
    calories: i64,
    at: Option<String>,
    json: bool,
) -> Result<()> {
    let entry = match at {
        Some(s) => svc.create_entry_at(name, calories, parse_at(&s)?)?,
        None => svc.create_entry(name, calories)?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        println!(
            "Logged: {} — {} kcal at {}",
            entry.name,
            entry.calories,
            entry.logged_at.format("%Y-%m-%d %H:%M UTC")
        );
    }

    Ok(())
}

fn parse_at(s: &str) -> Result<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(s).with_context(|| {
        format!("Invalid timestamp '{s}' (expected RFC 3339, e.g. 2024-01-15T12:30:00Z)")
    })?;
    Ok(parsed.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_at_utc() {
        let instant = parse_at("2024-01-15T12:30:00Z").unwrap();
        assert_eq!(
            instant,
            Utc.with_ymd_and_hms(2024, 1, 15, 12, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_at_offset_normalized_to_utc() {
        let instant = parse_at("2024-01-15T12:30:00+02:00").unwrap();
        assert_eq!(
            instant,
            Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_at_rejects_garbage() {
        assert!(parse_at("yesterday at noon").is_err());
        assert!(parse_at("2024-01-15").is_err());
    }
}
