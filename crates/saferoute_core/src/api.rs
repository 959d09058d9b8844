//! Use-case API for external callers.
//!
//! # Responsibility
//! - Map submit/list/health calls onto services with HTTP-style status codes.
//! - Turn service errors into structured, serializable error envelopes.
//!
//! # Invariants
//! - A `201` submit response always carries a record read back from the store.
//! - Store faults map to 5xx codes; only malformed input maps to `400`.

use crate::model::report::{Report, ReportValidationError};
use crate::model::shelter::{Position, Shelter};
use crate::repo::report_repo::SqliteReportRepository;
use crate::repo::shelter_repo::SqliteShelterRepository;
use crate::service::list_service::{ListError, ReportLister, ShelterLister};
use crate::service::verify_service::{ReportVerifier, VerifyError};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

pub const SERVICE_NAME: &str = "SafeRoute Backend";

/// Submit payload; also accepts the `lat`/`lng`/`type` names used by map clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitReportRequest {
    #[serde(alias = "lat")]
    pub latitude: f64,
    #[serde(alias = "lng", alias = "long")]
    pub longitude: f64,
    #[serde(alias = "type")]
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Successful response with its status code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub body: T,
}

/// Structured error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiError {
    pub status: u16,
    pub code: &'static str,
    pub message: String,
}

impl From<VerifyError> for ApiError {
    fn from(value: VerifyError) -> Self {
        let (status, code) = match &value {
            VerifyError::InvalidInput(_) => (400, "invalid_input"),
            VerifyError::PersistenceUnavailable(_) => (503, "persistence_unavailable"),
            VerifyError::PersistenceWriteFailed(_) => (500, "persistence_write_failed"),
        };
        Self {
            status,
            code,
            message: value.to_string(),
        }
    }
}

impl From<ReportValidationError> for ApiError {
    fn from(value: ReportValidationError) -> Self {
        Self {
            status: 400,
            code: "invalid_input",
            message: value.to_string(),
        }
    }
}

impl From<ListError> for ApiError {
    fn from(value: ListError) -> Self {
        Self {
            status: 503,
            code: "persistence_unavailable",
            message: value.to_string(),
        }
    }
}

/// Liveness check body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

pub fn health() -> HealthStatus {
    HealthStatus {
        status: "online",
        service: SERVICE_NAME,
        version: crate::core_version(),
    }
}

/// Verifies and stores one report.
pub fn submit_report(
    conn: &Connection,
    request: SubmitReportRequest,
) -> Result<ApiResponse<Report>, ApiError> {
    let verifier = ReportVerifier::new(SqliteReportRepository::new(conn));
    let report = verifier.submit(
        request.latitude,
        request.longitude,
        &request.category,
        request.description,
    )?;
    Ok(ApiResponse {
        status: 201,
        body: report,
    })
}

/// Returns the most recent reports, newest first.
pub fn list_reports(
    conn: &Connection,
    limit: Option<u32>,
) -> Result<ApiResponse<Vec<Report>>, ApiError> {
    let lister = ReportLister::new(SqliteReportRepository::new(conn));
    let result = lister.list_reports(limit)?;
    Ok(ApiResponse {
        status: 200,
        body: result.items,
    })
}

/// Returns every known shelter, nearest first when `near` is `(lat, lng)`.
pub fn list_shelters(
    conn: &Connection,
    near: Option<(f64, f64)>,
) -> Result<ApiResponse<Vec<Shelter>>, ApiError> {
    let near = near
        .map(|(latitude, longitude)| Position::new(latitude, longitude))
        .transpose()?;
    let lister = ShelterLister::new(SqliteShelterRepository::new(conn));
    Ok(ApiResponse {
        status: 200,
        body: lister.list_shelters(near)?,
    })
}
