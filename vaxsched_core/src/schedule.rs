//! Dose schedule calculator.
//!
//! Given a vaccine and the date of the first dose, computes the appointment
//! date of every dose in the course. All arithmetic is on calendar dates;
//! there is no time-of-day or time zone involved.

use crate::catalog::get_default_catalog;
use crate::{DosePlan, DosePlanEntry, Error, Result, VaccineDefinition, VaccineKind};
use chrono::{Days, Local, NaiveDate};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Compute the dose plan for a vaccine.
///
/// `start` is the date of the first dose; `None` means today in the local
/// calendar.
pub fn plan_for(kind: VaccineKind, start: Option<NaiveDate>) -> Result<DosePlan> {
    let definition = get_default_catalog()
        .get(kind)
        .ok_or_else(|| Error::InvalidVaccineKind(kind.to_string()))?;

    plan_for_definition(definition, start.unwrap_or_else(today))
}

/// Compute the dose plan for an arbitrary definition starting on `start`
pub fn plan_for_definition(definition: &VaccineDefinition, start: NaiveDate) -> Result<DosePlan> {
    let plan = definition
        .dose_offsets
        .iter()
        .enumerate()
        .map(|(i, &offset)| {
            let appointment_date = start
                .checked_add_days(Days::new(u64::from(offset)))
                .ok_or_else(|| {
                    Error::Schedule(format!(
                        "{} + {} days is outside the supported calendar",
                        format_date_iso(start),
                        offset
                    ))
                })?;

            let dose_number = i as u32 + 1;
            let dose_label = definition
                .dose_labels
                .get(i)
                .cloned()
                .unwrap_or_else(|| fallback_dose_label(dose_number));

            Ok(DosePlanEntry {
                dose_number,
                dose_label,
                appointment_date,
            })
        })
        .collect::<Result<DosePlan>>()?;

    tracing::debug!(
        "Planned {} doses of {} from {}",
        plan.len(),
        definition.kind,
        start
    );

    Ok(plan)
}

/// Label used when a definition has fewer labels than doses
pub fn fallback_dose_label(dose_number: u32) -> String {
    format!("เข็มที่ {}", dose_number)
}

/// Parse a free-form vaccine identifier (e.g. from a form field)
pub fn parse_vaccine_kind(s: &str) -> Result<VaccineKind> {
    s.parse()
}

/// Render a date as `YYYY-MM-DD`
pub fn format_date_iso(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date_iso(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(|_| Error::InvalidDate(s.to_string()))
}

/// Today's date in the local calendar
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
