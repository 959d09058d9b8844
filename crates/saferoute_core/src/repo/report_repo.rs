//! Report repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Time-windowed, box-filtered reads for corroboration.
//! - Most-recent-first report reads for listing.
//! - Insert with store-assigned id and timestamp.
//!
//! # Invariants
//! - Reports are never updated or deleted through this contract.
//! - Rows failing `Report::validate()` surface as `RepoError::InvalidData`.

use crate::model::report::{NewReport, Report, ReportId, Verification, VerificationStatus};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const REPORT_SELECT_SQL: &str = "SELECT
    uuid,
    latitude,
    longitude,
    category,
    description,
    created_at,
    verification_status,
    verification_score
FROM user_reports";

/// Window-and-box scan used to find corroborating reports.
///
/// A row matches when `created_at >= since_epoch_ms` and both
/// `|latitude - row.latitude|` and `|longitude - row.longitude|` are strictly
/// below `half_width_degrees`. `cap` bounds matching rows, not scanned rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearbyQuery {
    pub since_epoch_ms: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub half_width_degrees: f64,
    pub cap: u32,
}

/// Storage contract for incident reports.
pub trait ReportRepository {
    /// Reports matching `query`, newest first, at most `query.cap` rows.
    fn list_nearby_reports(&self, query: &NearbyQuery) -> RepoResult<Vec<Report>>;
    /// Most recent reports, `created_at DESC` then id, at most `limit` rows.
    fn list_recent_reports(&self, limit: u32) -> RepoResult<Vec<Report>>;
    /// Stores a candidate with its verdict and returns the assigned id.
    fn insert_report(&self, report: &NewReport, verification: Verification)
        -> RepoResult<ReportId>;
    fn get_report(&self, id: ReportId) -> RepoResult<Option<Report>>;
}

impl<T: ReportRepository + ?Sized> ReportRepository for &T {
    fn list_nearby_reports(&self, query: &NearbyQuery) -> RepoResult<Vec<Report>> {
        (**self).list_nearby_reports(query)
    }

    fn list_recent_reports(&self, limit: u32) -> RepoResult<Vec<Report>> {
        (**self).list_recent_reports(limit)
    }

    fn insert_report(
        &self,
        report: &NewReport,
        verification: Verification,
    ) -> RepoResult<ReportId> {
        (**self).insert_report(report, verification)
    }

    fn get_report(&self, id: ReportId) -> RepoResult<Option<Report>> {
        (**self).get_report(id)
    }
}

/// SQLite-backed report repository.
pub struct SqliteReportRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteReportRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ReportRepository for SqliteReportRepository<'_> {
    fn list_nearby_reports(&self, query: &NearbyQuery) -> RepoResult<Vec<Report>> {
        let mut stmt = self.conn.prepare(&format!(
            "{REPORT_SELECT_SQL}
             WHERE created_at >= ?1
               AND abs(latitude - ?2) < ?4
               AND abs(longitude - ?3) < ?4
             ORDER BY created_at DESC, uuid ASC
             LIMIT ?5;"
        ))?;
        let mut rows = stmt.query(params![
            query.since_epoch_ms,
            query.latitude,
            query.longitude,
            query.half_width_degrees,
            i64::from(query.cap),
        ])?;
        collect_reports(&mut rows)
    }

    fn list_recent_reports(&self, limit: u32) -> RepoResult<Vec<Report>> {
        let mut stmt = self.conn.prepare(&format!(
            "{REPORT_SELECT_SQL}
             ORDER BY created_at DESC, uuid ASC
             LIMIT ?1;"
        ))?;
        let mut rows = stmt.query([i64::from(limit)])?;
        collect_reports(&mut rows)
    }

    fn insert_report(
        &self,
        report: &NewReport,
        verification: Verification,
    ) -> RepoResult<ReportId> {
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO user_reports (
                uuid,
                latitude,
                longitude,
                category,
                description,
                verification_status,
                verification_score
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                id.to_string(),
                report.latitude,
                report.longitude,
                report.category.as_str(),
                report.description.as_deref(),
                verification.status.as_str(),
                i64::from(verification.score),
            ],
        )?;
        Ok(id)
    }

    fn get_report(&self, id: ReportId) -> RepoResult<Option<Report>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{REPORT_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_report_row(row)?)),
            None => Ok(None),
        }
    }
}

fn collect_reports(rows: &mut rusqlite::Rows<'_>) -> RepoResult<Vec<Report>> {
    let mut reports = Vec::new();
    while let Some(row) = rows.next()? {
        reports.push(parse_report_row(row)?);
    }
    Ok(reports)
}

fn parse_report_row(row: &Row<'_>) -> RepoResult<Report> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in user_reports.uuid"))
    })?;

    let status_text: String = row.get("verification_status")?;
    let verification_status = VerificationStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid status `{status_text}` in user_reports.verification_status"
        ))
    })?;

    let raw_score: i64 = row.get("verification_score")?;
    let verification_score = u32::try_from(raw_score).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid score `{raw_score}` in user_reports.verification_score"
        ))
    })?;

    let report = Report {
        id,
        latitude: row.get("latitude")?,
        longitude: row.get("longitude")?,
        category: row.get("category")?,
        description: row.get("description")?,
        created_at: row.get("created_at")?,
        verification_status,
        verification_score,
    };
    report
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("report {id}: {err}")))?;
    Ok(report)
}
