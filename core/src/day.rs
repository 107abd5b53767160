use anyhow::{Result, bail};
use chrono::{DateTime, Days, Local, NaiveDate, NaiveTime, Utc};

/// Half-open instant interval `[start, end)` spanning exactly one calendar day.
///
/// Every range is UTC midnight to the next UTC midnight, so each timestamp
/// belongs to exactly one day: an entry at `midnight(d)` falls in day `d`,
/// an entry at `midnight(d+1)` falls in day `d+1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayRange {
    #[must_use]
    pub fn for_date(date: NaiveDate) -> Self {
        let next = date
            .checked_add_days(Days::new(1))
            .unwrap_or(NaiveDate::MAX);
        DayRange {
            start: date.and_time(NaiveTime::MIN).and_utc(),
            end: next.and_time(NaiveTime::MIN).and_utc(),
        }
    }

    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// Parse a strict `YYYY-MM-DD` date label.
pub fn parse_date_label(label: &str) -> Result<NaiveDate> {
    let shaped = label.len() == 10
        && label.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shaped {
        bail!("Invalid date '{label}'. Use YYYY-MM-DD");
    }
    match NaiveDate::parse_from_str(label, "%Y-%m-%d") {
        Ok(date) => Ok(date),
        Err(_) => bail!("Invalid date '{label}'. Use YYYY-MM-DD"),
    }
}

/// The server-local calendar date. "Today" picks its calendar label from the
/// local clock; the resulting range is still resolved as a UTC day like any
/// explicit date.
#[must_use]
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
