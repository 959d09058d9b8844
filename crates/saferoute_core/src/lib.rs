//! Core domain logic for SafeRoute incident reporting.
//! Owns report verification and the storage contracts it relies on.

pub mod api;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::report::{
    NewReport, Report, ReportId, ReportValidationError, Verification, VerificationStatus,
    VERIFICATION_THRESHOLD,
};
pub use model::shelter::{
    Position, ResourceLevel, Shelter, ShelterResources, ShelterValidationError,
};
pub use repo::report_repo::{NearbyQuery, ReportRepository, SqliteReportRepository};
pub use repo::{RepoError, RepoResult};
pub use repo::shelter_repo::{import_shelters, ShelterRepository, SqliteShelterRepository};
pub use service::list_service::{ListError, ReportLister, ReportsListResult, ShelterLister};
pub use service::verify_service::{
    Clock, ReportVerifier, SystemClock, VerifyError, WriteFailure, PROXIMITY_DEGREES,
    VERIFICATION_WINDOW,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
