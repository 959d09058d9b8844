//! Report domain model.
//!
//! # Responsibility
//! - Define the stored report record and the candidate submitted by callers.
//! - Tie verification status to the corroboration score in one place.
//!
//! # Invariants
//! - `verification_status == Verified` iff `verification_score >= VERIFICATION_THRESHOLD`.
//! - Coordinates are finite and inside the WGS84 degree ranges.
//! - `category` is non-empty after whitespace normalization.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Stable identifier assigned by the store at insert time.
pub type ReportId = Uuid;

/// Minimum number of corroborating prior reports that verifies a new one.
pub const VERIFICATION_THRESHOLD: u32 = 2;

/// One-time verification snapshot taken when a report is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    /// Fewer than two corroborating reports were found.
    Unverified,
    /// At least two corroborating reports were found.
    Verified,
}

impl VerificationStatus {
    /// Maps a corroboration count to its status.
    pub fn from_score(score: u32) -> Self {
        if score >= VERIFICATION_THRESHOLD {
            Self::Verified
        } else {
            Self::Unverified
        }
    }

    /// Storage and wire label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unverified => "UNVERIFIED",
            Self::Verified => "VERIFIED",
        }
    }

    /// Parses a storage label; returns `None` for unknown values.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "UNVERIFIED" => Some(Self::Unverified),
            "VERIFIED" => Some(Self::Verified),
            _ => None,
        }
    }
}

impl Display for VerificationStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict computed by the verifier for a candidate before it is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verification {
    pub status: VerificationStatus,
    pub score: u32,
}

impl Verification {
    /// Builds a verdict whose status always agrees with `score`.
    pub fn from_score(score: u32) -> Self {
        Self {
            status: VerificationStatus::from_score(score),
            score,
        }
    }
}

/// Coordinate axis named in validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

impl Display for Axis {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Latitude => f.write_str("latitude"),
            Self::Longitude => f.write_str("longitude"),
        }
    }
}

/// Validation failures for report input and persisted report rows.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportValidationError {
    /// Coordinate is NaN or infinite.
    NonFiniteCoordinate(Axis),
    /// Coordinate is finite but outside the degree range of its axis.
    CoordinateOutOfRange { axis: Axis, value: f64 },
    /// Category is empty or whitespace only.
    EmptyCategory,
    /// Stored status disagrees with stored score.
    StatusScoreMismatch {
        status: VerificationStatus,
        score: u32,
    },
}

impl Display for ReportValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonFiniteCoordinate(axis) => write!(f, "{axis} must be a finite number"),
            Self::CoordinateOutOfRange { axis, value } => {
                write!(f, "{axis} {value} is out of range")
            }
            Self::EmptyCategory => f.write_str("category must not be empty"),
            Self::StatusScoreMismatch { status, score } => write!(
                f,
                "verification status {status} does not match verification score {score}"
            ),
        }
    }
}

impl Error for ReportValidationError {}

/// Candidate report as submitted by a caller, not yet stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReport {
    pub latitude: f64,
    pub longitude: f64,
    pub category: String,
    pub description: Option<String>,
}

impl NewReport {
    /// Normalizes and validates caller input.
    ///
    /// - `category` is trimmed and internal whitespace collapsed.
    /// - A blank `description` is treated as absent.
    pub fn new(
        latitude: f64,
        longitude: f64,
        category: impl AsRef<str>,
        description: Option<String>,
    ) -> Result<Self, ReportValidationError> {
        validate_coordinates(latitude, longitude)?;
        let category = normalize_category(category.as_ref());
        if category.is_empty() {
            return Err(ReportValidationError::EmptyCategory);
        }
        let description = description.and_then(|value| {
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        });

        Ok(Self {
            latitude,
            longitude,
            category,
            description,
        })
    }
}

/// Stored incident report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: ReportId,
    pub latitude: f64,
    pub longitude: f64,
    pub category: String,
    pub description: Option<String>,
    /// Unix epoch milliseconds, assigned by the store.
    pub created_at: i64,
    pub verification_status: VerificationStatus,
    /// Corroborating prior reports seen at creation time.
    pub verification_score: u32,
}

impl Report {
    /// Checks coordinate/category rules and the status/score invariant.
    pub fn validate(&self) -> Result<(), ReportValidationError> {
        validate_coordinates(self.latitude, self.longitude)?;
        if self.category.trim().is_empty() {
            return Err(ReportValidationError::EmptyCategory);
        }
        if VerificationStatus::from_score(self.verification_score) != self.verification_status {
            return Err(ReportValidationError::StatusScoreMismatch {
                status: self.verification_status,
                score: self.verification_score,
            });
        }
        Ok(())
    }

    pub fn is_verified(&self) -> bool {
        self.verification_status == VerificationStatus::Verified
    }
}

/// Rejects NaN/infinite values and values outside [-90, 90] / [-180, 180].
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), ReportValidationError> {
    check_axis(Axis::Latitude, latitude, 90.0)?;
    check_axis(Axis::Longitude, longitude, 180.0)
}

fn check_axis(axis: Axis, value: f64, bound: f64) -> Result<(), ReportValidationError> {
    if !value.is_finite() {
        return Err(ReportValidationError::NonFiniteCoordinate(axis));
    }
    if !(-bound..=bound).contains(&value) {
        return Err(ReportValidationError::CoordinateOutOfRange { axis, value });
    }
    Ok(())
}

fn normalize_category(value: &str) -> String {
    WHITESPACE_RE.replace_all(value.trim(), " ").into_owned()
}
