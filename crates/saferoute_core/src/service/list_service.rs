//! Read-only report and shelter listing.
//!
//! # Invariants
//! - Listing never writes to the store.
//! - Store failures surface as `ListError`, never as an empty list, and are
//!   logged under their own event name.

use crate::model::report::Report;
use crate::model::shelter::{Position, Shelter};
use crate::repo::report_repo::ReportRepository;
use crate::repo::RepoError;
use crate::repo::shelter_repo::ShelterRepository;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Default and maximum number of reports returned by one list call.
pub const REPORT_LIST_LIMIT_MAX: u32 = 100;

/// Listing failure.
#[derive(Debug)]
pub enum ListError {
    PersistenceUnavailable(RepoError),
}

impl Display for ListError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PersistenceUnavailable(err) => write!(f, "store unavailable: {err}"),
        }
    }
}

impl Error for ListError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::PersistenceUnavailable(err) => Some(err),
        }
    }
}

/// Report list envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportsListResult {
    /// Sorted by `created_at DESC`, ties by id.
    pub items: Vec<Report>,
    pub applied_limit: u32,
}

/// Clamps a requested limit into `1..=REPORT_LIST_LIMIT_MAX`.
pub fn normalize_report_limit(limit: Option<u32>) -> u32 {
    limit
        .unwrap_or(REPORT_LIST_LIMIT_MAX)
        .clamp(1, REPORT_LIST_LIMIT_MAX)
}

pub struct ReportLister<R: ReportRepository> {
    repo: R,
}

impl<R: ReportRepository> ReportLister<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns the most recent reports.
    pub fn list_reports(&self, limit: Option<u32>) -> Result<ReportsListResult, ListError> {
        let applied_limit = normalize_report_limit(limit);
        match self.repo.list_recent_reports(applied_limit) {
            Ok(items) => {
                info!(
                    "event=reports_list module=list status=ok count={} applied_limit={}",
                    items.len(),
                    applied_limit
                );
                Ok(ReportsListResult {
                    items,
                    applied_limit,
                })
            }
            Err(err) => {
                error!("event=reports_list module=list status=error error_code=persistence_unavailable error={err}");
                Err(ListError::PersistenceUnavailable(err))
            }
        }
    }
}

pub struct ShelterLister<S: ShelterRepository> {
    repo: S,
}

impl<S: ShelterRepository> ShelterLister<S> {
    pub fn new(repo: S) -> Self {
        Self { repo }
    }

    /// Returns every known shelter, unfiltered.
    ///
    /// Ordered by id, or nearest first from `near` by squared degree
    /// distance with ties broken by id.
    pub fn list_shelters(&self, near: Option<Position>) -> Result<Vec<Shelter>, ListError> {
        match self.repo.list_shelters() {
            Ok(mut shelters) => {
                if let Some(position) = near {
                    sort_nearest_first(&mut shelters, position);
                }
                info!(
                    "event=shelters_list module=list status=ok count={} ranked={}",
                    shelters.len(),
                    near.is_some()
                );
                Ok(shelters)
            }
            Err(err) => {
                error!("event=shelters_list module=list status=error error_code=persistence_unavailable error={err}");
                Err(ListError::PersistenceUnavailable(err))
            }
        }
    }
}

fn sort_nearest_first(shelters: &mut [Shelter], from: Position) {
    shelters.sort_by(|a, b| {
        a.squared_degree_distance(from)
            .total_cmp(&b.squared_degree_distance(from))
            .then_with(|| a.id.cmp(&b.id))
    });
}
