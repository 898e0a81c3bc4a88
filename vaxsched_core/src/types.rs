//! Core domain types for the vaccination scheduling system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Vaccine kinds and their static definitions
//! - Dose plans derived from a definition and a start date
//! - Patients and staff sessions as the backend reports them
//! - Request payloads sent to the backend webhooks

use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Vaccine Types
// ============================================================================

/// A supported vaccine. The serde spelling is the identifier used on the wire.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum VaccineKind {
    Flu,
    HepB,
    Tetanus,
    Shingles,
    Hpv,
    Pneumonia,
    Chickenpox,
    Rabies,
}

impl VaccineKind {
    /// Every supported kind, in display order
    pub const ALL: [VaccineKind; 8] = [
        VaccineKind::Flu,
        VaccineKind::HepB,
        VaccineKind::Tetanus,
        VaccineKind::Shingles,
        VaccineKind::Hpv,
        VaccineKind::Pneumonia,
        VaccineKind::Chickenpox,
        VaccineKind::Rabies,
    ];

    /// Wire identifier (e.g. `hep_b`)
    pub fn as_str(&self) -> &'static str {
        match self {
            VaccineKind::Flu => "flu",
            VaccineKind::HepB => "hep_b",
            VaccineKind::Tetanus => "tetanus",
            VaccineKind::Shingles => "shingles",
            VaccineKind::Hpv => "hpv",
            VaccineKind::Pneumonia => "pneumonia",
            VaccineKind::Chickenpox => "chickenpox",
            VaccineKind::Rabies => "rabies",
        }
    }
}

impl fmt::Display for VaccineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VaccineKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        VaccineKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::InvalidVaccineKind(s.to_string()))
    }
}

/// Static description of one vaccine course
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct VaccineDefinition {
    pub kind: VaccineKind,
    pub label: String,
    /// Days after the first dose on which each dose is due. Starts at 0.
    pub dose_offsets: Vec<u32>,
    /// One label per dose; may be shorter than `dose_offsets`.
    pub dose_labels: Vec<String>,
}

impl VaccineDefinition {
    pub fn dose_count(&self) -> usize {
        self.dose_offsets.len()
    }
}

/// The complete table of supported vaccines
#[derive(Clone, Debug)]
pub struct Catalog {
    pub vaccines: BTreeMap<VaccineKind, VaccineDefinition>,
}

// ============================================================================
// Dose Plan Types
// ============================================================================

/// One computed appointment within a dose plan
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DosePlanEntry {
    pub dose_number: u32,
    pub dose_label: String,
    pub appointment_date: NaiveDate,
}

/// Ordered appointments for a vaccine course; display-only, never transmitted
pub type DosePlan = Vec<DosePlanEntry>;

// ============================================================================
// Patient and Staff Types
// ============================================================================

/// A patient record as returned by the search webhook
///
/// Spreadsheet-backed backends may send any column as a number, so scalar
/// values are accepted and kept as text.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Patient {
    #[serde(rename = "LineUserID", deserialize_with = "scalar_required")]
    pub line_user_id: String,
    #[serde(rename = "PatientName", default, deserialize_with = "scalar_optional")]
    pub patient_name: Option<String>,
    #[serde(rename = "PhoneNumber", default, deserialize_with = "scalar_optional")]
    pub phone_number: Option<String>,
    #[serde(rename = "Email", default, deserialize_with = "scalar_optional")]
    pub email: Option<String>,
}

impl Patient {
    /// Patient name, if the backend has a non-empty one
    pub fn name(&self) -> Option<&str> {
        self.patient_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }
}

/// Staff permission level reported by the login webhook
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(from = "String", into = "String")]
pub enum StaffRole {
    /// May search patients but not create schedules
    #[default]
    Reader,
    Staff,
    Admin,
    Other(String),
}

impl StaffRole {
    pub fn as_str(&self) -> &str {
        match self {
            StaffRole::Reader => "Reader",
            StaffRole::Staff => "Staff",
            StaffRole::Admin => "Admin",
            StaffRole::Other(s) => s,
        }
    }

    /// Whether this role may assign dose schedules
    pub fn can_assign(&self) -> bool {
        !matches!(self, StaffRole::Reader)
    }
}

impl From<String> for StaffRole {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "reader" => StaffRole::Reader,
            "staff" => StaffRole::Staff,
            "admin" => StaffRole::Admin,
            _ => StaffRole::Other(s),
        }
    }
}

impl From<StaffRole> for String {
    fn from(role: StaffRole) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for StaffRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a successful staff login, kept until logout
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StaffSession {
    pub token: String,
    #[serde(default)]
    pub role: StaffRole,
    pub name: String,
}

// ============================================================================
// Webhook Request Types
// ============================================================================

/// Patient registration submitted from the LINE mini-app
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPatient {
    pub line_user_id: String,
    pub patient_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl RegisterPatient {
    /// Build a registration from raw form input.
    ///
    /// The typed name wins over the LINE display name; blank phone and
    /// email are left out of the payload.
    pub fn from_form(
        line_user_id: &str,
        name: Option<&str>,
        display_name: Option<&str>,
        phone_number: Option<&str>,
        email: Option<&str>,
    ) -> Result<Self> {
        let line_user_id = required("LINE user id", line_user_id)?;
        let patient_name = non_blank(name)
            .or_else(|| non_blank(display_name))
            .ok_or_else(|| Error::Validation("patient name is required".into()))?;

        Ok(Self {
            line_user_id,
            patient_name,
            phone_number: non_blank(phone_number),
            email: non_blank(email),
        })
    }
}

/// Quick booking of a vaccine for a registered patient
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BookVaccine {
    pub line_user_id: String,
    pub vaccine: VaccineKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub register_date: Option<NaiveDate>,
}

impl BookVaccine {
    pub fn new(line_user_id: &str, vaccine: VaccineKind, register_date: Option<NaiveDate>) -> Result<Self> {
        Ok(Self {
            line_user_id: required("LINE user id", line_user_id)?,
            vaccine,
            register_date,
        })
    }
}

/// Actions accepted by the vaccine webhook, discriminated by `action`
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum VaccineWebhookRequest {
    Register(RegisterPatient),
    Book(BookVaccine),
}

/// Staff login form
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffCredentials {
    pub staff_id: String,
    pub password: String,
}

impl StaffCredentials {
    pub fn new(staff_id: &str, password: &str) -> Result<Self> {
        if password.is_empty() {
            return Err(Error::Validation("password is required".into()));
        }
        Ok(Self {
            staff_id: required("staff id", staff_id)?,
            password: password.to_string(),
        })
    }
}

impl fmt::Debug for StaffCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaffCredentials")
            .field("staff_id", &self.staff_id)
            .field("password", &"***")
            .finish()
    }
}

/// Patient search query
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatientSearch {
    pub query: String,
}

/// Dose schedule assignment made from the staff dashboard
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AssignSchedule {
    pub line_user_id: String,
    pub vaccine: VaccineKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_dose_date: Option<NaiveDate>,
}

impl AssignSchedule {
    pub fn new(line_user_id: &str, vaccine: VaccineKind, first_dose_date: Option<NaiveDate>) -> Result<Self> {
        Ok(Self {
            line_user_id: required("LINE user id", line_user_id)?,
            vaccine,
            first_dose_date,
        })
    }
}

fn required(field: &str, value: &str) -> Result<String> {
    non_blank(Some(value)).ok_or_else(|| Error::Validation(format!("{} is required", field)))
}

/// Text of a scalar JSON value; `None` for null, arrays and objects
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn scalar_optional<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(&Value::deserialize(deserializer)?))
}

fn scalar_required<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    scalar_text(&Value::deserialize(deserializer)?)
        .ok_or_else(|| de::Error::custom("expected a string or number"))
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
