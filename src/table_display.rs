use chrono::{Local, TimeZone};
use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use crossterm::style::Stylize;
use jobscout::{JobRecord, SearchQuery};

fn header(names: &[&str]) -> Vec<Cell> {
    names
        .iter()
        .map(|name| Cell::new(name).add_attribute(Attribute::Bold))
        .collect()
}

/// Print listings with a 1-based index column and a saved marker.
pub fn display_jobs(jobs: &[JobRecord], is_saved: impl Fn(&str) -> bool) {
    if jobs.is_empty() {
        println!("{}", "No jobs to show.".yellow());
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header(&["#", "", "Title", "Company", "Location", "Budget", "Posted"]));

    for (i, job) in jobs.iter().enumerate() {
        let marker = if is_saved(&job.id) { "★" } else { "" };
        table.add_row(vec![
            (i + 1).to_string(),
            marker.to_string(),
            job.title.clone(),
            job.company.clone(),
            job.location.clone().unwrap_or_default(),
            job.budget.clone().unwrap_or_default(),
            job.posted_at.clone(),
        ]);
    }

    println!("{table}");
    println!("\n{}", format!("{} jobs", jobs.len()).green());
}

fn format_timestamp(millis: i64) -> String {
    Local
        .timestamp_millis_opt(millis)
        .single()
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| millis.to_string())
}

pub fn display_history(entries: &[SearchQuery]) {
    if entries.is_empty() {
        println!("{}", "No recent searches.".yellow());
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header(&["#", "Keyword", "Location", "Searched"]));

    for (i, entry) in entries.iter().enumerate() {
        let location = if entry.location.is_empty() {
            "Anywhere".to_string()
        } else {
            entry.location.clone()
        };
        table.add_row(vec![
            (i + 1).to_string(),
            entry.keyword.clone(),
            location,
            format_timestamp(entry.timestamp),
        ]);
    }

    println!("{table}");
}
