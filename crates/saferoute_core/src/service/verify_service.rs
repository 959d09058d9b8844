//! Report verification use case.
//!
//! # Responsibility
//! - Score a candidate report against recent nearby reports.
//! - Persist the candidate with its one-time verification snapshot.
//!
//! # Invariants
//! - Only reports created inside the trailing window can corroborate.
//! - The store applies the window and box before the row cap, so the cap
//!   only limits reports that already corroborate.
//! - Proximity is a fixed, strict ±0.002 degree box on both axes; no
//!   correction is applied near the poles or the antimeridian.
//! - A failed window fetch never leads to an insert.
//! - Success is returned only after the stored record is read back.

use crate::model::report::{NewReport, Report, ReportValidationError, Verification};
use crate::repo::report_repo::{NearbyQuery, ReportRepository};
use crate::repo::RepoError;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Trailing window in which prior reports can corroborate a new one.
pub const VERIFICATION_WINDOW: Duration = Duration::from_secs(30 * 60);
/// Half-width of the proximity box, in degrees, on each axis.
pub const PROXIMITY_DEGREES: f64 = 0.002;
/// Upper bound on corroborating rows fetched for one window scan.
pub const WINDOW_FETCH_CAP: u32 = 1000;

/// Source of the current time in Unix epoch milliseconds.
pub trait Clock {
    fn now_epoch_ms(&self) -> i64;
}

/// Wall clock backed by `SystemTime`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
            .unwrap_or(0)
    }
}

/// Verification failure surfaced to callers.
#[derive(Debug)]
pub enum VerifyError {
    /// Candidate coordinates or category are malformed.
    InvalidInput(ReportValidationError),
    /// The window fetch failed; nothing was written.
    PersistenceUnavailable(RepoError),
    /// The insert failed or could not be confirmed.
    PersistenceWriteFailed(WriteFailure),
}

/// Why a write was not confirmed.
#[derive(Debug)]
pub enum WriteFailure {
    Rejected(RepoError),
    /// The insert call returned but the record could not be read back.
    Unconfirmed(Option<RepoError>),
}

impl Display for VerifyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(err) => write!(f, "invalid report: {err}"),
            Self::PersistenceUnavailable(err) => write!(f, "report store unavailable: {err}"),
            Self::PersistenceWriteFailed(WriteFailure::Rejected(err)) => {
                write!(f, "report write failed: {err}")
            }
            Self::PersistenceWriteFailed(WriteFailure::Unconfirmed(Some(err))) => {
                write!(f, "report write not confirmed: {err}")
            }
            Self::PersistenceWriteFailed(WriteFailure::Unconfirmed(None)) => {
                f.write_str("report write not confirmed: stored record not found")
            }
        }
    }
}

impl Error for VerifyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidInput(err) => Some(err),
            Self::PersistenceUnavailable(err) => Some(err),
            Self::PersistenceWriteFailed(WriteFailure::Rejected(err))
            | Self::PersistenceWriteFailed(WriteFailure::Unconfirmed(Some(err))) => Some(err),
            Self::PersistenceWriteFailed(WriteFailure::Unconfirmed(None)) => None,
        }
    }
}

impl From<ReportValidationError> for VerifyError {
    fn from(value: ReportValidationError) -> Self {
        Self::InvalidInput(value)
    }
}

/// Returns whether `other` lies inside the proximity box around `(latitude, longitude)`.
///
/// Symmetric: swapping the two points never changes the answer.
pub fn is_nearby(latitude: f64, longitude: f64, other: &Report) -> bool {
    (other.latitude - latitude).abs() < PROXIMITY_DEGREES
        && (other.longitude - longitude).abs() < PROXIMITY_DEGREES
}

/// Counts reports inside the proximity box around `candidate`.
pub fn count_nearby(candidate: &NewReport, reports: &[Report]) -> u32 {
    let nearby = reports
        .iter()
        .filter(|report| is_nearby(candidate.latitude, candidate.longitude, report))
        .count();
    u32::try_from(nearby).unwrap_or(u32::MAX)
}

/// Verifies and stores incoming reports.
pub struct ReportVerifier<R: ReportRepository, C: Clock = SystemClock> {
    repo: R,
    clock: C,
}

impl<R: ReportRepository> ReportVerifier<R> {
    /// Creates a verifier reading time from the system clock.
    pub fn new(repo: R) -> Self {
        Self::with_clock(repo, SystemClock)
    }
}

impl<R: ReportRepository, C: Clock> ReportVerifier<R, C> {
    pub fn with_clock(repo: R, clock: C) -> Self {
        Self { repo, clock }
    }

    /// Validates raw input, then runs [`Self::submit_report`].
    pub fn submit(
        &self,
        latitude: f64,
        longitude: f64,
        category: &str,
        description: Option<String>,
    ) -> Result<Report, VerifyError> {
        let candidate = NewReport::new(latitude, longitude, category, description)
            .inspect_err(|err| {
                info!("event=report_submit module=verify status=rejected error_code=invalid_input error={err}");
            })?;
        self.submit_report(&candidate)
    }

    /// Scores `candidate` against the trailing window and stores it.
    ///
    /// # Errors
    /// - `PersistenceUnavailable` when the window fetch fails.
    /// - `PersistenceWriteFailed` when the insert fails or cannot be read back.
    pub fn submit_report(&self, candidate: &NewReport) -> Result<Report, VerifyError> {
        let started_at = Instant::now();
        let query = NearbyQuery {
            since_epoch_ms: self.window_start(),
            latitude: candidate.latitude,
            longitude: candidate.longitude,
            half_width_degrees: PROXIMITY_DEGREES,
            cap: WINDOW_FETCH_CAP,
        };

        let recent = self
            .repo
            .list_nearby_reports(&query)
            .map_err(|err| {
                error!(
                    "event=report_submit module=verify status=error stage=fetch error_code=persistence_unavailable busy={} error={}",
                    err.is_busy(),
                    err
                );
                VerifyError::PersistenceUnavailable(err)
            })?;

        if recent.len() >= WINDOW_FETCH_CAP as usize {
            warn!(
                "event=report_submit module=verify status=truncated stage=fetch cap={WINDOW_FETCH_CAP}"
            );
        }
        let verification = Verification::from_score(count_nearby(candidate, &recent));

        let id = self
            .repo
            .insert_report(candidate, verification)
            .map_err(|err| {
                error!(
                    "event=report_submit module=verify status=error stage=insert error_code=persistence_write_failed busy={} error={}",
                    err.is_busy(),
                    err
                );
                VerifyError::PersistenceWriteFailed(WriteFailure::Rejected(err))
            })?;

        let stored = match self.repo.get_report(id) {
            Ok(Some(report)) => report,
            Ok(None) => {
                error!("event=report_submit module=verify status=error stage=confirm error_code=persistence_write_failed report_id={id}");
                return Err(VerifyError::PersistenceWriteFailed(
                    WriteFailure::Unconfirmed(None),
                ));
            }
            Err(err) => {
                error!("event=report_submit module=verify status=error stage=confirm error_code=persistence_write_failed report_id={id} error={err}");
                return Err(VerifyError::PersistenceWriteFailed(
                    WriteFailure::Unconfirmed(Some(err)),
                ));
            }
        };

        info!(
            "event=report_submit module=verify status=ok report_id={} category={} nearby_rows={} verification_score={} verification_status={} duration_ms={}",
            stored.id,
            stored.category,
            recent.len(),
            stored.verification_score,
            stored.verification_status,
            started_at.elapsed().as_millis()
        );
        Ok(stored)
    }

    fn window_start(&self) -> i64 {
        let window_ms = i64::try_from(VERIFICATION_WINDOW.as_millis()).unwrap_or(i64::MAX);
        self.clock.now_epoch_ms().saturating_sub(window_ms)
    }
}
