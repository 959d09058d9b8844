use rusqlite::ffi;
use saferoute_core::db::DbError;
use saferoute_core::service::verify_service::is_nearby;
use saferoute_core::{
    Clock, NearbyQuery, NewReport, RepoError, RepoResult, Report, ReportId, ReportRepository,
    ReportVerifier, Verification, VerificationStatus, VerifyError, WriteFailure,
    PROXIMITY_DEGREES, VERIFICATION_WINDOW,
};
use std::cell::{Cell, RefCell};
use uuid::Uuid;

const NOW_MS: i64 = 1_760_000_000_000;
const MINUTE_MS: i64 = 60_000;

struct FixedClock(i64);

impl Clock for FixedClock {
    fn now_epoch_ms(&self) -> i64 {
        self.0
    }
}

/// In-process store with switchable failure modes.
#[derive(Default)]
struct FakeStore {
    reports: RefCell<Vec<Report>>,
    fail_fetch: bool,
    fail_insert: bool,
    lose_writes: bool,
    requested: Cell<Option<NearbyQuery>>,
    insert_calls: Cell<u32>,
}

impl FakeStore {
    fn with_reports(reports: Vec<Report>) -> Self {
        Self {
            reports: RefCell::new(reports),
            ..Self::default()
        }
    }
}

fn sqlite_failure(code: std::os::raw::c_int) -> RepoError {
    RepoError::Db(DbError::Sqlite(rusqlite::Error::SqliteFailure(
        ffi::Error::new(code),
        None,
    )))
}

impl ReportRepository for FakeStore {
    fn list_nearby_reports(&self, query: &NearbyQuery) -> RepoResult<Vec<Report>> {
        self.requested.set(Some(*query));
        if self.fail_fetch {
            return Err(sqlite_failure(ffi::SQLITE_BUSY));
        }
        Ok(self
            .reports
            .borrow()
            .iter()
            .filter(|report| report.created_at >= query.since_epoch_ms)
            .filter(|report| is_nearby(query.latitude, query.longitude, report))
            .take(query.cap as usize)
            .cloned()
            .collect())
    }

    fn list_recent_reports(&self, limit: u32) -> RepoResult<Vec<Report>> {
        let mut reports = self.reports.borrow().clone();
        reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        reports.truncate(limit as usize);
        Ok(reports)
    }

    fn insert_report(
        &self,
        report: &NewReport,
        verification: Verification,
    ) -> RepoResult<ReportId> {
        self.insert_calls.set(self.insert_calls.get() + 1);
        if self.fail_insert {
            return Err(sqlite_failure(ffi::SQLITE_READONLY));
        }
        let id = Uuid::new_v4();
        if !self.lose_writes {
            self.reports.borrow_mut().push(Report {
                id,
                latitude: report.latitude,
                longitude: report.longitude,
                category: report.category.clone(),
                description: report.description.clone(),
                created_at: NOW_MS,
                verification_status: verification.status,
                verification_score: verification.score,
            });
        }
        Ok(id)
    }

    fn get_report(&self, id: ReportId) -> RepoResult<Option<Report>> {
        Ok(self
            .reports
            .borrow()
            .iter()
            .find(|report| report.id == id)
            .cloned())
    }
}

fn prior(latitude: f64, longitude: f64, age_ms: i64) -> Report {
    Report {
        id: Uuid::new_v4(),
        latitude,
        longitude,
        category: "flood".to_string(),
        description: None,
        created_at: NOW_MS - age_ms,
        verification_status: VerificationStatus::Unverified,
        verification_score: 0,
    }
}

#[test]
fn scan_covers_trailing_window_and_candidate_box() {
    let store = FakeStore::default();
    let verifier = ReportVerifier::with_clock(&store, FixedClock(NOW_MS));
    verifier.submit(13.0828, 80.2709, "flood", None).unwrap();

    let window_ms = VERIFICATION_WINDOW.as_millis() as i64;
    assert_eq!(window_ms, 30 * MINUTE_MS);
    let query = store.requested.get().unwrap();
    assert_eq!(query.since_epoch_ms, NOW_MS - window_ms);
    assert_eq!(query.latitude, 13.0828);
    assert_eq!(query.longitude, 80.2709);
    assert_eq!(query.half_width_degrees, PROXIMITY_DEGREES);
}

#[test]
fn report_exactly_at_window_start_still_counts() {
    let window_ms = VERIFICATION_WINDOW.as_millis() as i64;
    let store = FakeStore::with_reports(vec![
        prior(13.0, 80.0, window_ms),
        prior(13.0, 80.0, window_ms + 1),
        prior(13.0, 80.0, 10 * MINUTE_MS),
    ]);
    let verifier = ReportVerifier::with_clock(&store, FixedClock(NOW_MS));

    let report = verifier.submit(13.0, 80.0, "flood", None).unwrap();
    assert_eq!(report.verification_score, 2);
    assert_eq!(report.verification_status, VerificationStatus::Verified);
}

#[test]
fn fetch_failure_is_unavailable_and_skips_insert() {
    let store = FakeStore {
        fail_fetch: true,
        ..FakeStore::default()
    };
    let verifier = ReportVerifier::with_clock(&store, FixedClock(NOW_MS));

    match verifier.submit(13.0, 80.0, "flood", None).unwrap_err() {
        VerifyError::PersistenceUnavailable(source) => assert!(source.is_busy()),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(store.insert_calls.get(), 0);
}

#[test]
fn insert_failure_is_write_failed() {
    let store = FakeStore {
        fail_insert: true,
        ..FakeStore::default()
    };
    let verifier = ReportVerifier::with_clock(&store, FixedClock(NOW_MS));

    let err = verifier.submit(13.0, 80.0, "flood", None).unwrap_err();
    assert!(matches!(
        err,
        VerifyError::PersistenceWriteFailed(WriteFailure::Rejected(_))
    ));
    assert_eq!(store.insert_calls.get(), 1);
}

#[test]
fn unconfirmed_write_is_never_reported_as_success() {
    let store = FakeStore {
        lose_writes: true,
        ..FakeStore::default()
    };
    let verifier = ReportVerifier::with_clock(&store, FixedClock(NOW_MS));

    let err = verifier.submit(13.0, 80.0, "flood", None).unwrap_err();
    assert!(matches!(
        err,
        VerifyError::PersistenceWriteFailed(WriteFailure::Unconfirmed(None))
    ));
}

#[test]
fn score_near_the_pole_uses_plain_degree_box() {
    let store = FakeStore::with_reports(vec![
        prior(89.9995, 10.0, MINUTE_MS),
        prior(89.9995, 10.0019, MINUTE_MS),
    ]);
    let verifier = ReportVerifier::with_clock(&store, FixedClock(NOW_MS));

    let report = verifier.submit(89.9999, 10.0, "avalanche", None).unwrap();
    assert_eq!(report.verification_score, 2);
}
