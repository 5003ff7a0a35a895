// src/hrms_client.rs

use chrono::NaiveDate;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

use crate::config::AppConfig;

// --- Error Handling ---

#[derive(Error, Debug)]
pub enum HrmsError {
    #[error("HTTP request failed")]
    Request(#[from] reqwest::Error),

    #[error("JSON processing error")]
    Json(#[from] serde_json::Error),

    #[error("File I/O error: {context}")]
    Io {
        #[source]
        source: std::io::Error,
        context: String,
    },

    #[error("URL parsing error")]
    UrlParse(#[from] url::ParseError),

    #[error("{message} (HTTP {status})")]
    Api { status: StatusCode, message: String },
}

// Helper to create context-aware IO errors
pub(crate) fn io_context<E: Into<std::io::Error>, S: Into<String>>(
    source: E,
    context: S,
) -> HrmsError {
    HrmsError::Io {
        source: source.into(),
        context: context.into(),
    }
}

/// Collapses whatever error body the backend produced into one displayable
/// string. Handles plain strings, `{"detail": ...}`,
/// `{"non_field_errors": [...]}` and per-field arrays such as
/// `{"email": ["Enter a valid email address."]}`; anything else passes
/// through as raw JSON text.
pub fn backend_error_message(body: &str) -> String {
    let value: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(_) => return body.to_string(),
    };
    match value {
        Value::String(s) => s,
        Value::Object(map) => {
            if let Some(detail) = map.get("detail").and_then(Value::as_str) {
                return detail.to_string();
            }
            if let Some(first) = map.get("non_field_errors").and_then(first_message) {
                return first;
            }
            // serde_json keeps object keys sorted, so the picked field is stable.
            for (field, field_value) in &map {
                if let Some(first) = first_message(field_value) {
                    return format!("{}: {}", capitalize(field), first);
                }
            }
            Value::Object(map).to_string()
        }
        other => other.to_string(),
    }
}

fn first_message(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => items.first().and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

fn capitalize(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

// --- Wire Types ---

/// Employee record as the backend returns it. The service has been
/// redeployed a few times and older rows still answer with `name` instead of
/// `full_name`, or without a numeric `id`, so every field the console joins
/// on is optional.
#[derive(Debug, Clone, Deserialize)]
pub struct Employee {
    pub id: Option<i64>,
    pub employee_id: Option<String>,
    pub full_name: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
}

impl Employee {
    /// Display name, whichever field the backend filled in.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.full_name.as_deref())
            .unwrap_or("N/A")
    }

    /// Identifier shown in tables: the human-assigned code when present,
    /// the numeric id otherwise.
    pub fn display_code(&self) -> String {
        if let Some(code) = self.employee_id.as_deref() {
            if !code.is_empty() {
                return code.to_string();
            }
        }
        match self.id {
            Some(id) => id.to_string(),
            None => "N/A".to_string(),
        }
    }
}

/// Payload for creating an employee. A blank employee code is omitted
/// entirely so the backend assigns its own.
#[derive(Debug, Clone, Serialize)]
pub struct NewEmployee {
    pub full_name: String,
    pub email: String,
    pub department: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
}

/// Employee reference on a raw attendance row. Some rows carry the numeric
/// employee id, others the human-assigned code; stale rows may reference
/// employees that no longer exist.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EmployeeRef {
    Id(i64),
    Code(String),
}

impl fmt::Display for EmployeeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmployeeRef::Id(id) => write!(f, "{}", id),
            EmployeeRef::Code(code) => f.write_str(code),
        }
    }
}

/// Attendance record id. Usually numeric, but the backend has returned
/// stringified ids before, so both forms compare numerically when possible.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Num(i64),
    Text(String),
}

impl RecordId {
    pub fn as_num(&self) -> Option<i64> {
        match self {
            RecordId::Num(n) => Some(*n),
            RecordId::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Num(n) => write!(f, "{}", n),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

/// Raw attendance row for one date. `status` may be missing, empty or
/// arbitrarily cased and `employee` may hold either identifier form.
/// Normalization happens in `reconcile`, nowhere else.
#[derive(Debug, Clone, Deserialize)]
pub struct AttendanceRecord {
    pub id: Option<RecordId>,
    pub employee: Option<EmployeeRef>,
    pub date: Option<String>,
    pub status: Option<String>,
}

/// Body for both attendance create and update. `employee` carries the
/// canonical employee key, `status` is sent exactly as displayed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendancePayload {
    pub employee: String,
    pub date: String,
    pub status: String,
}

// --- Client ---

/// Thin typed client over the HRMS REST backend.
#[derive(Clone)]
pub struct HrmsClient {
    http_client: Client,
    base_url: Url,
}

impl HrmsClient {
    pub fn new(config: &AppConfig) -> Result<Self, HrmsError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;
        // Exactly one trailing slash so Url::join treats the base as a directory.
        let base = format!("{}/", config.api_url.trim_end_matches('/'));
        let base_url = Url::parse(&base)?;
        Ok(Self {
            http_client,
            base_url,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, HrmsError> {
        Ok(self.base_url.join(path)?)
    }

    fn build_request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http_client
            .request(method, url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
    }

    /// Sends the request and maps any non-success response onto a single
    /// displayable message.
    async fn execute(
        &self,
        request_builder: RequestBuilder,
        context_msg: &str,
    ) -> Result<reqwest::Response, HrmsError> {
        let request = request_builder.build()?;
        let request_url = request.url().to_string();
        debug!("[REQUEST] {} {}", request.method(), request_url);

        let response = self.http_client.execute(request).await.map_err(|e| {
            error!(
                "HTTP execution failed for '{}' (URL: {}): {}",
                context_msg, request_url, e
            );
            HrmsError::Request(e)
        })?;

        let status = response.status();
        debug!("[RESPONSE] {} for '{}'", status, context_msg);

        if status.is_success() {
            return Ok(response);
        }

        let error_body = response
            .text()
            .await
            .unwrap_or_else(|e| format!("Failed to read error body: {}", e));
        error!(
            "API error response: Status={}, Body='{}' for URL: {}",
            status, error_body, request_url
        );
        Err(HrmsError::Api {
            status,
            message: backend_error_message(&error_body),
        })
    }

    async fn send_and_deserialize<T: DeserializeOwned>(
        &self,
        request_builder: RequestBuilder,
        context_msg: &str,
    ) -> Result<T, HrmsError> {
        let response = self.execute(request_builder, context_msg).await?;
        let bytes = response.bytes().await?;
        match serde_json::from_slice::<T>(&bytes) {
            Ok(data) => Ok(data),
            Err(e) => {
                error!(
                    "JSON deserialization failed for '{}': {}. Body: {}",
                    context_msg,
                    e,
                    String::from_utf8_lossy(&bytes)
                );
                Err(HrmsError::Json(e))
            }
        }
    }

    pub async fn list_employees(&self) -> Result<Vec<Employee>, HrmsError> {
        let url = self.endpoint("employees/")?;
        self.send_and_deserialize(self.build_request(Method::GET, url), "List Employees")
            .await
    }

    pub async fn create_employee(&self, payload: &NewEmployee) -> Result<Employee, HrmsError> {
        let url = self.endpoint("employees/")?;
        debug!("Employee payload: {}", serde_json::to_string(payload)?);
        self.send_and_deserialize(
            self.build_request(Method::POST, url).json(payload),
            "Create Employee",
        )
        .await
    }

    /// Deletes by whatever identifier the backend routes on (code or id).
    pub async fn delete_employee(&self, identifier: &str) -> Result<(), HrmsError> {
        let url = self.endpoint(&format!("employees/{}/", identifier))?;
        let _ = self
            .execute(self.build_request(Method::DELETE, url), "Delete Employee")
            .await?;
        Ok(())
    }

    pub async fn attendance_on(&self, date: NaiveDate) -> Result<Vec<AttendanceRecord>, HrmsError> {
        let mut url = self.endpoint("attendance/")?;
        url.query_pairs_mut().append_pair("date", &date.to_string());
        self.send_and_deserialize(self.build_request(Method::GET, url), "Get Attendance")
            .await
    }

    pub async fn create_attendance(
        &self,
        payload: &AttendancePayload,
    ) -> Result<AttendanceRecord, HrmsError> {
        let url = self.endpoint("attendance/")?;
        debug!("Attendance payload: {}", serde_json::to_string(payload)?);
        self.send_and_deserialize(
            self.build_request(Method::POST, url).json(payload),
            "Create Attendance",
        )
        .await
    }

    pub async fn update_attendance(
        &self,
        id: &RecordId,
        payload: &AttendancePayload,
    ) -> Result<AttendanceRecord, HrmsError> {
        let url = self.endpoint(&format!("attendance/{}/", id))?;
        debug!("Attendance payload: {}", serde_json::to_string(payload)?);
        self.send_and_deserialize(
            self.build_request(Method::PATCH, url).json(payload),
            "Update Attendance",
        )
        .await
    }
}
