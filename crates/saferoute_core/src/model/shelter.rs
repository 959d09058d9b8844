//! Shelter domain model.
//!
//! Shelters are managed outside the verification core. The only write path
//! is the administrative import used to seed a store.

use crate::model::report::{validate_coordinates, ReportValidationError};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Caller position used to rank shelters by proximity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    /// Applies the same coordinate rules as report submission.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ReportValidationError> {
        validate_coordinates(latitude, longitude)?;
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// Coarse stock level for one shelter resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceLevel {
    Low,
    Med,
    High,
}

impl ResourceLevel {
    pub(crate) fn to_db(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Med => "med",
            Self::High => "high",
        }
    }

    pub(crate) fn from_db(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "med" => Some(Self::Med),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShelterResources {
    pub food: ResourceLevel,
    pub medical: ResourceLevel,
    pub water: ResourceLevel,
}

/// Known shelter location and occupancy metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shelter {
    pub id: i64,
    pub name: String,
    #[serde(alias = "lat")]
    pub latitude: f64,
    #[serde(alias = "lng")]
    pub longitude: f64,
    pub capacity: u32,
    #[serde(default)]
    pub occupied: u32,
    /// People currently heading to this shelter.
    #[serde(default)]
    pub incoming: u32,
    /// Venue kind such as `Hospital` or `Mall`; serialized as `type`.
    #[serde(rename = "type")]
    pub kind: String,
    pub resources: ShelterResources,
}

impl Shelter {
    /// Free places left, never negative when a shelter is over capacity.
    pub fn available_capacity(&self) -> u32 {
        self.capacity.saturating_sub(self.occupied)
    }

    /// Squared planar distance in degrees; only meaningful for ranking.
    pub fn squared_degree_distance(&self, from: Position) -> f64 {
        let d_lat = self.latitude - from.latitude;
        let d_lng = self.longitude - from.longitude;
        d_lat * d_lat + d_lng * d_lng
    }

    pub fn validate(&self) -> Result<(), ShelterValidationError> {
        if self.name.trim().is_empty() {
            return Err(ShelterValidationError::EmptyName(self.id));
        }
        validate_coordinates(self.latitude, self.longitude)
            .map_err(|source| ShelterValidationError::Location { id: self.id, source })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShelterValidationError {
    EmptyName(i64),
    Location {
        id: i64,
        source: ReportValidationError,
    },
}

impl Display for ShelterValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName(id) => write!(f, "shelter {id} has an empty name"),
            Self::Location { id, source } => write!(f, "shelter {id} location invalid: {source}"),
        }
    }
}

impl Error for ShelterValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::EmptyName(_) => None,
            Self::Location { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Position, ResourceLevel, Shelter, ShelterValidationError};

    fn hospital() -> Shelter {
        serde_json::from_value(serde_json::json!({
            "id": 2,
            "name": "Rajiv Gandhi Govt Hospital",
            "lat": 13.0801,
            "lng": 80.2764,
            "capacity": 2000,
            "occupied": 1800,
            "incoming": 10,
            "type": "Hospital",
            "resources": { "food": "Med", "medical": "High", "water": "High" }
        }))
        .unwrap()
    }

    #[test]
    fn deserializes_original_dataset_shape() {
        let shelter = hospital();
        assert_eq!(shelter.kind, "Hospital");
        assert_eq!(shelter.resources.medical, ResourceLevel::High);
        assert_eq!(shelter.available_capacity(), 200);
    }

    #[test]
    fn available_capacity_saturates_when_overfull() {
        let mut shelter = hospital();
        shelter.occupied = 2500;
        assert_eq!(shelter.available_capacity(), 0);
    }

    #[test]
    fn validate_rejects_blank_name() {
        let mut shelter = hospital();
        shelter.name = "  ".to_string();
        assert_eq!(
            shelter.validate().unwrap_err(),
            ShelterValidationError::EmptyName(2)
        );
    }

    #[test]
    fn squared_degree_distance_is_planar() {
        let shelter = hospital();
        let here = Position::new(13.0801, 80.2764).unwrap();
        assert_eq!(shelter.squared_degree_distance(here), 0.0);

        let there = Position::new(13.0801 - 3.0, 80.2764 + 4.0).unwrap();
        assert!((shelter.squared_degree_distance(there) - 25.0).abs() < 1e-9);
    }

    #[test]
    fn position_rejects_non_finite_coordinates() {
        assert!(Position::new(f64::NAN, 80.0).is_err());
        assert!(Position::new(13.0, 181.0).is_err());
    }
}
