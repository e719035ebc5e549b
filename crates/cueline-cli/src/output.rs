//! Output formatting for CLI results (text or JSON)

use serde::Serialize;

use cueline_lib::core::captions::Cue;
use cueline_lib::core::{format_time_display, TimeSec};

/// Result of `check`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckReport {
    pub cue_count: usize,
    pub first_start: Option<TimeSec>,
    pub last_end: Option<TimeSec>,
}

/// Result of `next` / `prev`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundaryReport {
    pub at: TimeSec,
    pub boundary: Option<TimeSec>,
}

/// Result of `save` / `unsave`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedReport {
    pub key: String,
    pub saved_count: usize,
    pub unknown_ids: Vec<String>,
}

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn check_text(report: &CheckReport) -> String {
    match (report.first_start, report.last_end) {
        (Some(start), Some(end)) => format!(
            "{} cue(s), {} - {}",
            report.cue_count,
            format_time_display(start, true),
            format_time_display(end, true)
        ),
        _ => format!("{} cue(s)", report.cue_count),
    }
}

pub fn cue_line(cue: &Cue) -> String {
    format!(
        "[{}] {} - {}  {}",
        cue.id,
        format_time_display(cue.start_time, true),
        format_time_display(cue.end_time, true),
        cue.text.replace('\n', " / ")
    )
}

pub fn boundary_text(report: &BoundaryReport) -> String {
    match report.boundary {
        Some(time) => format!("{:.3}", time),
        None => "none".to_string(),
    }
}

pub fn saved_text(report: &SavedReport) -> String {
    let mut text = format!("{} saved cue(s) under '{}'", report.saved_count, report.key);
    if !report.unknown_ids.is_empty() {
        text.push_str(&format!(
            " (ignored unknown id(s): {})",
            report.unknown_ids.join(", ")
        ));
    }
    text
}
