use std::fmt::Write as _;
use std::io;

use dropfleet_core::core_api::{RunNote, ShipRecord, UpgradeRecord, WalkOutcome};
use serde::Serialize;
use serde_json::{Map as JsonMap, Value as JsonValue};

pub const SHIP_REPORT_FILE: &str = "ShipCardUpdateData.csv";
pub const SHIP_EXTRACT_REPORT_FILE: &str = "ShipCardData.csv";
pub const UPGRADE_REPORT_FILE: &str = "UpgradeCardUpdateData.csv";
pub const ERROR_LOG_FILE: &str = "update_errors.log";

const LOG_RULE: &str = "================";

pub const SHIP_COLUMNS: [&str; 13] = [
    "name",
    "faction",
    "baseScale",
    "health",
    "sig",
    "points",
    "modelImage",
    "new_model_url",
    "cardFrontImage",
    "new_card_front_url",
    "object_name",
    "object_guid",
    "container_path",
];

pub const UPGRADE_COLUMNS: [&str; 8] = [
    "name",
    "faction",
    "points",
    "cardImage",
    "new_card_url",
    "object_name",
    "object_guid",
    "container_path",
];

/// Repository details printed at the top of the error log.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogHeader {
    pub repository: String,
    pub base_url: String,
    pub url_style: String,
}

fn write_table<W: io::Write, R: Serialize>(
    writer: W,
    columns: &[&str],
    records: &[R],
) -> Result<(), csv::Error> {
    let mut out = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    out.write_record(columns)?;
    for record in records {
        out.serialize(record)?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_ship_report<W: io::Write>(
    writer: W,
    records: &[ShipRecord],
) -> Result<(), csv::Error> {
    write_table(writer, &SHIP_COLUMNS, records)
}

pub fn write_upgrade_report<W: io::Write>(
    writer: W,
    records: &[UpgradeRecord],
) -> Result<(), csv::Error> {
    write_table(writer, &UPGRADE_COLUMNS, records)
}

/// Plain-text log of errors and skips. Informational notes are left out.
pub fn render_error_log(header: &LogHeader, notes: &[RunNote]) -> String {
    let mut out = String::new();
    writeln!(out, "UPDATE ERRORS LOG").expect("writing to String cannot fail");
    writeln!(out, "{LOG_RULE}").expect("writing to String cannot fail");
    writeln!(out).expect("writing to String cannot fail");
    writeln!(out, "Repository: {}", header.repository).expect("writing to String cannot fail");
    writeln!(out, "Image path format: {}", header.base_url).expect("writing to String cannot fail");
    writeln!(out, "URL style: {}", header.url_style).expect("writing to String cannot fail");
    writeln!(out, "{LOG_RULE}").expect("writing to String cannot fail");
    writeln!(out).expect("writing to String cannot fail");
    for note in notes.iter().filter(|n| n.is_problem()) {
        writeln!(out, "{note}").expect("writing to String cannot fail");
    }
    out
}

pub fn render_summary(outcome: &WalkOutcome) -> String {
    let excluded = outcome
        .notes
        .iter()
        .filter(|n| matches!(n, RunNote::Excluded(_)))
        .count();
    let skipped = outcome
        .notes
        .iter()
        .filter(|n| matches!(n, RunNote::Skipped(_)))
        .count();

    let mut out = String::new();
    writeln!(out, "Objects visited:  {}", outcome.visited).expect("writing to String cannot fail");
    writeln!(out, "Ship cards:       {}", outcome.ships.len())
        .expect("writing to String cannot fail");
    writeln!(out, "Upgrade cards:    {}", outcome.upgrades.len())
        .expect("writing to String cannot fail");
    writeln!(out, "Errors:           {}", outcome.errors().count())
        .expect("writing to String cannot fail");
    writeln!(out, "Skipped:          {skipped}").expect("writing to String cannot fail");
    writeln!(out, "Ignored objects:  {excluded}").expect("writing to String cannot fail");
    write!(
        out,
        "Save changed:     {}",
        if outcome.modified { "yes" } else { "no" }
    )
    .expect("writing to String cannot fail");
    out
}

fn to_json_array<R: Serialize>(records: &[R]) -> JsonValue {
    JsonValue::Array(
        records
            .iter()
            .map(|r| serde_json::to_value(r).expect("report records always serialize"))
            .collect(),
    )
}

/// Machine-readable form of a walk: counters, records, then notes as log lines.
pub fn render_json(outcome: &WalkOutcome) -> JsonValue {
    let mut root = JsonMap::new();
    root.insert("visited".to_string(), JsonValue::from(outcome.visited));
    root.insert("modified".to_string(), JsonValue::Bool(outcome.modified));
    root.insert("ships".to_string(), to_json_array(&outcome.ships));
    root.insert("upgrades".to_string(), to_json_array(&outcome.upgrades));
    root.insert(
        "notes".to_string(),
        JsonValue::Array(
            outcome
                .notes
                .iter()
                .map(|n| JsonValue::String(n.to_string()))
                .collect(),
        ),
    );
    JsonValue::Object(root)
}
