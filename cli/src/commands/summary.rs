use anyhow::Result;
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use nibble_core::service::NibbleService;

use super::helpers::{parse_date, truncate};

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Calories")]
    calories: i64,
    #[tabled(rename = "Logged at")]
    logged_at: String,
}

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Calories")]
    calories: i64,
    #[tabled(rename = "Entries")]
    entries: usize,
}

pub(crate) fn cmd_summary(
    svc: &NibbleService,
    date_str: Option<String>,
    json: bool,
) -> Result<()> {
    let date = parse_date(date_str)?;
    let summary = svc.summary_for(date)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    if summary.entries.is_empty() {
        eprintln!("No entries for {}", summary.date);
        process::exit(2);
    }

    let date = &summary.date;
    println!("=== {date} ===\n");

    for entry in &summary.entries {
        println!(
            "  {:>5}  {:<30} {:>6} kcal",
            entry.logged_at.format("%H:%M"),
            truncate(&entry.name, 30),
            entry.calories
        );
    }
    println!();
    println!(
        "  TOTAL: {} kcal ({} entries)",
        summary.total_calories,
        summary.entries.len()
    );

    Ok(())
}

pub(crate) fn cmd_entries(
    svc: &NibbleService,
    date_str: Option<String>,
    json: bool,
) -> Result<()> {
    let date = parse_date(date_str)?;
    let entries = svc.entries_for(date)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        eprintln!("No entries for {date}");
        process::exit(2);
    }

    let rows: Vec<EntryRow> = entries
        .iter()
        .map(|e| EntryRow {
            id: e.id,
            name: truncate(&e.name, 40),
            calories: e.calories,
            logged_at: e.logged_at.format("%Y-%m-%d %H:%M UTC").to_string(),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..3)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    Ok(())
}

pub(crate) fn cmd_history(svc: &NibbleService, days: u32, json: bool) -> Result<()> {
    let today = nibble_core::day::today();
    let mut summaries = Vec::with_capacity(days as usize);

    for i in (0..i64::from(days)).rev() {
        let date = today - chrono::Duration::days(i);
        summaries.push(svc.summary_for(date)?);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    if summaries.iter().all(|s| s.entries.is_empty()) {
        eprintln!("No entries in the last {days} days");
        process::exit(2);
    }

    let rows: Vec<HistoryRow> = summaries
        .iter()
        .map(|s| HistoryRow {
            date: s.date.clone(),
            calories: s.total_calories,
            entries: s.entries.len(),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    Ok(())
}
