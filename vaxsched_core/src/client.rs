//! Client for the workflow backend's webhooks.
//!
//! Every call is a JSON POST. A non-2xx status is an error carrying the
//! response body; a 2xx body that is not JSON is read as `{}`. There are no
//! retries.

use crate::config::BackendConfig;
use crate::types::scalar_text;
use crate::{
    AssignSchedule, BookVaccine, Error, Patient, PatientSearch, RegisterPatient, Result,
    StaffCredentials, StaffRole, StaffSession, VaccineWebhookRequest,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw HTTP outcome of a webhook call
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport trait for posting JSON to a webhook
pub trait WebhookTransport {
    fn post_json(&self, url: &str, payload: &Value) -> Result<TransportResponse>;
}

/// Blocking HTTP transport backed by reqwest
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self { client })
    }
}

impl WebhookTransport for HttpTransport {
    fn post_json(&self, url: &str, payload: &Value) -> Result<TransportResponse> {
        let response = self.client.post(url).json(payload).send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        Ok(TransportResponse { status, body })
    }
}

/// Patient search webhook response
#[derive(Debug, Default, Deserialize)]
struct PatientSearchResponse {
    #[serde(default)]
    items: Value,
}

/// Typed access to the backend webhooks
pub struct BackendClient<T: WebhookTransport = HttpTransport> {
    config: BackendConfig,
    transport: T,
}

impl BackendClient<HttpTransport> {
    /// Client using real HTTP
    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::with_transport(config.clone(), transport))
    }
}

impl<T: WebhookTransport> BackendClient<T> {
    pub fn with_transport(config: BackendConfig, transport: T) -> Self {
        Self { config, transport }
    }

    /// POST `payload` to `path` and return the parsed JSON body
    fn post<P: Serialize>(&self, path: &str, payload: &P) -> Result<Value> {
        let url = self.config.endpoint_url(path)?;
        let payload = serde_json::to_value(payload)?;

        tracing::debug!("POST {}", url);
        let response = self.transport.post_json(&url, &payload)?;

        if !response.is_success() {
            tracing::warn!("POST {} failed with HTTP {}", url, response.status);
            return Err(Error::Http {
                status: response.status,
                body: response.body,
            });
        }

        tracing::info!("POST {} -> HTTP {}", url, response.status);
        Ok(serde_json::from_str::<Value>(&response.body)
            .unwrap_or_else(|_| Value::Object(Default::default())))
    }

    /// Register a patient through the vaccine webhook
    pub fn register_patient(&self, request: &RegisterPatient) -> Result<Value> {
        self.post(
            &self.config.vaccine_webhook_path,
            &VaccineWebhookRequest::Register(request.clone()),
        )
    }

    /// Book a vaccine through the vaccine webhook
    pub fn book_vaccine(&self, request: &BookVaccine) -> Result<Value> {
        self.post(
            &self.config.vaccine_webhook_path,
            &VaccineWebhookRequest::Book(request.clone()),
        )
    }

    /// Check staff credentials and build a session from the response
    ///
    /// The response is read field by field: `ok` counts as set when truthy
    /// (true, a non-zero number, a non-empty string, any array or object) and
    /// the other fields accept any scalar.
    pub fn check_staff(&self, credentials: &StaffCredentials) -> Result<StaffSession> {
        let value = self.post(&self.config.check_staff_path, credentials)?;
        let field = |key: &str| {
            value
                .get(key)
                .and_then(scalar_text)
                .filter(|text| !text.is_empty())
        };

        if !value.get("ok").is_some_and(is_truthy) {
            let message = field("message").unwrap_or_else(|| "เข้าสู่ระบบไม่สำเร็จ".to_string());
            tracing::warn!("Staff {} login rejected: {}", credentials.staff_id, message);
            return Err(Error::Auth(message));
        }

        let token = field("token")
            .ok_or_else(|| Error::Auth("backend did not return a token".into()))?;

        let session = StaffSession {
            token,
            role: field("role").map(StaffRole::from).unwrap_or_default(),
            name: field("name").unwrap_or_else(|| credentials.staff_id.clone()),
        };

        tracing::info!("Staff {} logged in as {}", session.name, session.role);
        Ok(session)
    }

    /// Search patients by name, phone number or LINE user id
    pub fn search_patients(&self, query: &str) -> Result<Vec<Patient>> {
        let value = self.post(
            &self.config.patient_search_path,
            &PatientSearch {
                query: query.to_string(),
            },
        )?;

        let response: PatientSearchResponse = serde_json::from_value(value).unwrap_or_default();
        let patients = match response.items {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| match serde_json::from_value::<Patient>(item) {
                    Ok(patient) => Some(patient),
                    Err(e) => {
                        tracing::warn!("Skipping malformed patient record: {}", e);
                        None
                    }
                })
                .collect(),
            _ => Vec::new(),
        };

        tracing::info!("Search '{}' matched {} patients", query, patients.len());
        Ok(patients)
    }

    /// Send a dose schedule assignment for the backend to store and notify
    pub fn assign_schedule(&self, request: &AssignSchedule) -> Result<Value> {
        self.post(&self.config.assign_schedule_path, request)
    }
}

/// JavaScript truthiness of a JSON value
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
