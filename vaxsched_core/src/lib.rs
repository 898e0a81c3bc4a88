#![forbid(unsafe_code)]

//! Core domain model and business logic for the clinic vaccination system.
//!
//! This crate provides:
//! - Domain types (vaccine kinds, dose plans, patients, staff sessions)
//! - The vaccine catalog and dose schedule calculator
//! - A client for the workflow backend's webhooks
//! - Staff session persistence
//! - Plan export (table, JSON, CSV)

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod schedule;
pub mod client;
pub mod session;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog};
pub use config::{BackendConfig, Config};
pub use schedule::{
    format_date_iso, parse_date_iso, parse_vaccine_kind, plan_for, plan_for_definition, today,
};
pub use client::{BackendClient, HttpTransport, TransportResponse, WebhookTransport};
pub use session::session_path;
pub use export::{render_plan, PlanFormat};
