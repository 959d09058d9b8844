use rusqlite::{params, Connection};
use saferoute_core::db::open_db_in_memory;
use saferoute_core::{
    import_shelters, ListError, Position, RepoError, ReportLister, ReportVerifier, ResourceLevel,
    Shelter, ShelterLister, ShelterRepository, ShelterResources, SqliteReportRepository,
    SqliteShelterRepository,
};

fn shelter(id: i64, name: &str, kind: &str) -> Shelter {
    Shelter {
        id,
        name: name.to_string(),
        latitude: 13.0109,
        longitude: 80.2354,
        capacity: 8000,
        occupied: 300,
        incoming: 200,
        kind: kind.to_string(),
        resources: ShelterResources {
            food: ResourceLevel::High,
            medical: ResourceLevel::Med,
            water: ResourceLevel::High,
        },
    }
}

fn shelter_at(id: i64, latitude: f64, longitude: f64) -> Shelter {
    Shelter {
        latitude,
        longitude,
        ..shelter(id, &format!("Shelter {id}"), "Govt Hall")
    }
}

fn submit_many(conn: &Connection, count: usize) {
    let verifier = ReportVerifier::new(SqliteReportRepository::new(conn));
    for index in 0..count {
        verifier
            .submit(10.0 + index as f64 * 0.01, 78.0, "flood", None)
            .unwrap();
    }
}

fn table_count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

#[test]
fn reports_are_listed_newest_first() {
    let conn = open_db_in_memory().unwrap();
    submit_many(&conn, 3);
    let ids: Vec<String> = {
        let mut stmt = conn.prepare("SELECT uuid FROM user_reports;").unwrap();
        stmt.query_map([], |row| row.get(0))
            .unwrap()
            .map(Result::unwrap)
            .collect()
    };
    for (offset, id) in ids.iter().enumerate() {
        conn.execute(
            "UPDATE user_reports SET created_at = ?1 WHERE uuid = ?2;",
            params![1_000 + offset as i64, id],
        )
        .unwrap();
    }

    let lister = ReportLister::new(SqliteReportRepository::new(&conn));
    let result = lister.list_reports(None).unwrap();

    assert_eq!(result.applied_limit, 100);
    let created: Vec<i64> = result.items.iter().map(|r| r.created_at).collect();
    assert_eq!(created, vec![1_002, 1_001, 1_000]);
}

#[test]
fn report_listing_honors_limit_and_does_not_mutate() {
    let conn = open_db_in_memory().unwrap();
    submit_many(&conn, 5);
    let lister = ReportLister::new(SqliteReportRepository::new(&conn));

    let first = lister.list_reports(Some(2)).unwrap();
    let second = lister.list_reports(Some(2)).unwrap();

    assert_eq!(first.items.len(), 2);
    assert_eq!(first, second);
    assert_eq!(table_count(&conn, "user_reports"), 5);
}

#[test]
fn corrupt_row_is_an_error_not_an_empty_list() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO user_reports (uuid, latitude, longitude, category, verification_status, verification_score)
         VALUES ('not-a-uuid', 1.0, 1.0, 'flood', 'UNVERIFIED', 0);",
        [],
    )
    .unwrap();

    let lister = ReportLister::new(SqliteReportRepository::new(&conn));
    let err = lister.list_reports(None).unwrap_err();
    assert!(matches!(
        err,
        ListError::PersistenceUnavailable(RepoError::InvalidData(_))
    ));
}

#[test]
fn stored_status_score_mismatch_is_rejected_on_read() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO user_reports (uuid, latitude, longitude, category, verification_status, verification_score)
         VALUES ('11111111-2222-4333-8444-555555555555', 1.0, 1.0, 'flood', 'VERIFIED', 1);",
        [],
    )
    .unwrap();

    let lister = ReportLister::new(SqliteReportRepository::new(&conn));
    assert!(lister.list_reports(None).is_err());
}

#[test]
fn shelters_import_upserts_and_lists_by_id() {
    let mut conn = open_db_in_memory().unwrap();
    let written = import_shelters(
        &mut conn,
        &[
            shelter(3, "Anna University (Guindy)", "College"),
            shelter(1, "Phoenix Marketcity (Velachery)", "Mall"),
        ],
    )
    .unwrap();
    assert_eq!(written, 2);

    let mut updated = shelter(3, "Anna University (Guindy)", "College");
    updated.occupied = 7990;
    updated.resources.water = ResourceLevel::Low;
    import_shelters(&mut conn, &[updated]).unwrap();

    let lister = ShelterLister::new(SqliteShelterRepository::new(&conn));
    let shelters = lister.list_shelters(None).unwrap();
    assert_eq!(shelters.len(), 2);
    assert_eq!(shelters[0].id, 1);
    assert_eq!(shelters[1].occupied, 7990);
    assert_eq!(shelters[1].resources.water, ResourceLevel::Low);
    assert_eq!(shelters[1].available_capacity(), 10);
}

#[test]
fn invalid_shelter_aborts_whole_import() {
    let mut conn = open_db_in_memory().unwrap();
    let mut broken = shelter(2, "Chennai Trade Centre", "Govt Hall");
    broken.latitude = f64::NAN;

    let err = import_shelters(
        &mut conn,
        &[shelter(1, "Phoenix Marketcity (Velachery)", "Mall"), broken],
    )
    .unwrap_err();
    assert!(matches!(err, RepoError::InvalidShelter(_)));
    assert_eq!(table_count(&conn, "shelters"), 0);
}

#[test]
fn listing_shelters_twice_is_stable() {
    let mut conn = open_db_in_memory().unwrap();
    import_shelters(&mut conn, &[shelter(9, "NIT Trichy Campus", "College")]).unwrap();

    let repo = SqliteShelterRepository::new(&conn);
    let first = repo.list_shelters().unwrap();
    let second = repo.list_shelters().unwrap();
    assert_eq!(first, second);
    assert_eq!(table_count(&conn, "shelters"), 1);
}

#[test]
fn shelters_near_position_sort_closest_first_ties_by_id() {
    let mut conn = open_db_in_memory().unwrap();
    import_shelters(
        &mut conn,
        &[
            shelter_at(4, 13.5, 80.0),
            shelter_at(1, 14.0, 81.0),
            shelter_at(2, 13.0, 80.5),
            shelter_at(3, 13.25, 80.0),
        ],
    )
    .unwrap();

    let lister = ShelterLister::new(SqliteShelterRepository::new(&conn));
    let near = Position::new(13.0, 80.0).unwrap();
    let ids: Vec<i64> = lister
        .list_shelters(Some(near))
        .unwrap()
        .iter()
        .map(|shelter| shelter.id)
        .collect();
    assert_eq!(ids, vec![3, 2, 4, 1]);
}

#[test]
fn shelters_without_position_keep_id_order_and_nothing_is_dropped() {
    let mut conn = open_db_in_memory().unwrap();
    import_shelters(
        &mut conn,
        &[
            shelter_at(2, 9.9312, 78.1394),
            shelter_at(1, 13.0801, 80.2764),
        ],
    )
    .unwrap();

    let lister = ShelterLister::new(SqliteShelterRepository::new(&conn));
    let by_id: Vec<i64> = lister
        .list_shelters(None)
        .unwrap()
        .iter()
        .map(|shelter| shelter.id)
        .collect();
    assert_eq!(by_id, vec![1, 2]);

    let far_away = Position::new(-33.8688, 151.2093).unwrap();
    assert_eq!(lister.list_shelters(Some(far_away)).unwrap().len(), 2);
}

#[test]
fn stored_shelter_failing_validation_is_rejected_on_read() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO shelters (
            id, name, latitude, longitude, capacity, occupied, incoming,
            kind, food_level, medical_level, water_level
        ) VALUES (?1, '', 13.0, 80.0, 100, 0, 0, 'Govt Hall', 'low', 'low', 'low');",
        params![7],
    )
    .unwrap();

    let lister = ShelterLister::new(SqliteShelterRepository::new(&conn));
    let err = lister.list_shelters(None).unwrap_err();
    assert!(matches!(
        err,
        ListError::PersistenceUnavailable(RepoError::InvalidData(_))
    ));
}

#[test]
fn stored_shelter_with_out_of_range_latitude_is_rejected_on_read() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO shelters (
            id, name, latitude, longitude, capacity, occupied, incoming,
            kind, food_level, medical_level, water_level
        ) VALUES (?1, 'Drifted', 120.0, 80.0, 100, 0, 0, 'Govt Hall', 'low', 'low', 'low');",
        params![8],
    )
    .unwrap();

    let repo = SqliteShelterRepository::new(&conn);
    assert!(matches!(repo.list_shelters(), Err(RepoError::InvalidData(_))));
}
