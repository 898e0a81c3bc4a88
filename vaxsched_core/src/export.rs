//! Rendering of dose plans for display or export.

use crate::schedule::format_date_iso;
use crate::{DosePlan, DosePlanEntry, Error, Result};
use std::str::FromStr;

/// Output format for a dose plan
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PlanFormat {
    #[default]
    Table,
    Json,
    Csv,
}

impl FromStr for PlanFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "table" => Ok(PlanFormat::Table),
            "json" => Ok(PlanFormat::Json),
            "csv" => Ok(PlanFormat::Csv),
            other => Err(Error::Validation(format!(
                "unknown format '{}' (expected table, json or csv)",
                other
            ))),
        }
    }
}

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow<'a> {
    dose: u32,
    label: &'a str,
    appointment_date: String,
}

impl<'a> From<&'a DosePlanEntry> for CsvRow<'a> {
    fn from(entry: &'a DosePlanEntry) -> Self {
        CsvRow {
            dose: entry.dose_number,
            label: &entry.dose_label,
            appointment_date: format_date_iso(entry.appointment_date),
        }
    }
}

/// Render a plan under a heading (the vaccine's display label)
pub fn render_plan(heading: &str, plan: &DosePlan, format: PlanFormat) -> Result<String> {
    match format {
        PlanFormat::Table => Ok(render_table(heading, plan)),
        PlanFormat::Json => Ok(serde_json::to_string_pretty(plan)?),
        PlanFormat::Csv => render_csv(plan),
    }
}

fn render_table(heading: &str, plan: &DosePlan) -> String {
    let width = plan
        .iter()
        .map(|e| e.dose_label.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = format!("{}\n", heading);
    for entry in plan {
        let pad = width - entry.dose_label.chars().count();
        out.push_str(&format!(
            "  {}{}  {}\n",
            entry.dose_label,
            " ".repeat(pad),
            format_date_iso(entry.appointment_date)
        ));
    }
    out
}

fn render_csv(plan: &DosePlan) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for entry in plan {
        writer.serialize(CsvRow::from(entry))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| Error::Validation(format!("CSV is not UTF-8: {}", e)))
}
