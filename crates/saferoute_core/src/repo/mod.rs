//! Repository layer: the persistence collaborator seen by the core.
//!
//! # Responsibility
//! - Define the storage contracts the verifier and listers depend on.
//! - Isolate SQLite query details from verification logic.
//!
//! # Invariants
//! - Read paths reject persisted rows that violate model invariants.
//! - The store, not the caller, assigns report ids and `created_at`.

use crate::db::DbError;
use crate::model::shelter::ShelterValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod report_repo;
pub mod shelter_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for report and shelter persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    InvalidData(String),
    InvalidShelter(ShelterValidationError),
}

impl RepoError {
    /// Returns whether the store timed out waiting on a lock.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Db(err) if err.is_busy())
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::InvalidShelter(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
            Self::InvalidShelter(err) => Some(err),
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<ShelterValidationError> for RepoError {
    fn from(value: ShelterValidationError) -> Self {
        Self::InvalidShelter(value)
    }
}
