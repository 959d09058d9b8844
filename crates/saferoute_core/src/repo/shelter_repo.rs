//! Shelter repository contract and SQLite implementation.
//!
//! # Invariants
//! - `list_shelters` returns every row ordered by id, unfiltered.
//! - Rows failing `Shelter::validate()` surface as `RepoError::InvalidData`.
//! - Imports are validated before any row is written and applied in one
//!   transaction.

use crate::model::shelter::{ResourceLevel, Shelter, ShelterResources};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const SHELTER_SELECT_SQL: &str = "SELECT
    id,
    name,
    latitude,
    longitude,
    capacity,
    occupied,
    incoming,
    kind,
    food_level,
    medical_level,
    water_level
FROM shelters";

/// Read contract for shelters used by the lister.
pub trait ShelterRepository {
    fn list_shelters(&self) -> RepoResult<Vec<Shelter>>;
}

/// SQLite-backed shelter repository.
pub struct SqliteShelterRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteShelterRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ShelterRepository for SqliteShelterRepository<'_> {
    fn list_shelters(&self) -> RepoResult<Vec<Shelter>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SHELTER_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut shelters = Vec::new();
        while let Some(row) = rows.next()? {
            shelters.push(parse_shelter_row(row)?);
        }
        Ok(shelters)
    }
}

/// Inserts or replaces shelters by id; returns the number of rows written.
///
/// All entries are validated first so a bad entry never leaves a partial import.
pub fn import_shelters(conn: &mut Connection, shelters: &[Shelter]) -> RepoResult<usize> {
    for shelter in shelters {
        shelter.validate()?;
    }

    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO shelters (
                id, name, latitude, longitude, capacity, occupied, incoming,
                kind, food_level, medical_level, water_level
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                latitude = excluded.latitude,
                longitude = excluded.longitude,
                capacity = excluded.capacity,
                occupied = excluded.occupied,
                incoming = excluded.incoming,
                kind = excluded.kind,
                food_level = excluded.food_level,
                medical_level = excluded.medical_level,
                water_level = excluded.water_level;",
        )?;
        for shelter in shelters {
            stmt.execute(params![
                shelter.id,
                shelter.name.trim(),
                shelter.latitude,
                shelter.longitude,
                shelter.capacity,
                shelter.occupied,
                shelter.incoming,
                shelter.kind.as_str(),
                shelter.resources.food.to_db(),
                shelter.resources.medical.to_db(),
                shelter.resources.water.to_db(),
            ])?;
        }
    }
    tx.commit()?;

    Ok(shelters.len())
}

fn parse_shelter_row(row: &Row<'_>) -> RepoResult<Shelter> {
    let id: i64 = row.get("id")?;
    let shelter = Shelter {
        id,
        name: row.get("name")?,
        latitude: row.get("latitude")?,
        longitude: row.get("longitude")?,
        capacity: row.get("capacity")?,
        occupied: row.get("occupied")?,
        incoming: row.get("incoming")?,
        kind: row.get("kind")?,
        resources: ShelterResources {
            food: parse_level(row, "food_level", id)?,
            medical: parse_level(row, "medical_level", id)?,
            water: parse_level(row, "water_level", id)?,
        },
    };
    shelter
        .validate()
        .map_err(|err| RepoError::InvalidData(err.to_string()))?;
    Ok(shelter)
}

fn parse_level(row: &Row<'_>, column: &str, id: i64) -> RepoResult<ResourceLevel> {
    let value: String = row.get(column)?;
    ResourceLevel::from_db(&value).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid level `{value}` in shelters.{column} for shelter {id}"
        ))
    })
}
