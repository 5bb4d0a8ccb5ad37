//! Star system and planet records.
//!
//! Plain data; `validate_system` is the only behavior attached.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{BlackHoleType, LuminosityClass, RawResource, Season, SpectralClass, StarType};

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(SystemId);
string_id!(PlanetId);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: f64,
    pub y: f64,
}

/// Central body of a system. Class fields exist only on the variant they apply to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "star_type", rename_all = "snake_case")]
pub enum StarBody {
    Star {
        spectral_class: SpectralClass,
        luminosity_class: LuminosityClass,
    },
    BlackHole {
        black_hole_type: BlackHoleType,
    },
    NeutronStar,
    Wormhole,
}

impl StarBody {
    pub fn star_type(&self) -> StarType {
        match self {
            StarBody::Star { .. } => StarType::Star,
            StarBody::BlackHole { .. } => StarType::BlackHole,
            StarBody::NeutronStar => StarType::NeutronStar,
            StarBody::Wormhole => StarType::Wormhole,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemData {
    pub id: SystemId,
    pub name: String,
    pub coordinates: Coordinates,
    #[serde(flatten)]
    pub body: StarBody,
    pub planets: Vec<PlanetData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanetData {
    pub id: PlanetId,
    pub name: String,
    /// Abundance per resource in [0, 1]. Absent resources do not occur.
    pub resources: BTreeMap<RawResource, f64>,
    /// Mean surface temperature, °C.
    pub temperature: f64,
    /// 1 to 10.
    pub radiation_level: f64,
    /// In g (Earth = 1).
    pub gravity: f64,
    /// Percent of Earth's surface pressure.
    pub pressure: f64,
    /// 0 to 10.
    pub toxicity_level: f64,
    /// Hours.
    pub day_length: f64,
    /// Days per year.
    pub year_length: f64,
    /// 0 to 10.
    pub tectonic_activity: f64,
    /// Microtesla.
    pub magnetic_field: f64,
    /// Radius as a fraction of the base planet size.
    pub size: f64,
    pub season: Season,
    pub orbital_position: Coordinates,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordError {
    #[error("{record} has an empty name")]
    EmptyName { record: String },
    #[error("{record}: {field} = {value} is outside {min}..={max}")]
    OutOfRange {
        record: String,
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("system '{system}' lists planet id '{planet}' more than once")]
    DuplicatePlanet { system: SystemId, planet: PlanetId },
}

fn check_range(
    record: &str,
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), RecordError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(RecordError::OutOfRange {
            record: record.to_string(),
            field,
            value,
            min,
            max,
        })
    }
}

fn validate_planet(planet: &PlanetData) -> Result<(), RecordError> {
    let record = format!("planet '{}'", planet.id);
    if planet.name.trim().is_empty() {
        return Err(RecordError::EmptyName { record });
    }
    check_range(&record, "radiation_level", planet.radiation_level, 1.0, 10.0)?;
    check_range(&record, "toxicity_level", planet.toxicity_level, 0.0, 10.0)?;
    check_range(&record, "tectonic_activity", planet.tectonic_activity, 0.0, 10.0)?;
    check_range(&record, "gravity", planet.gravity, 0.0, f64::MAX)?;
    check_range(&record, "pressure", planet.pressure, 0.0, f64::MAX)?;
    check_range(&record, "magnetic_field", planet.magnetic_field, 0.0, f64::MAX)?;
    check_range(&record, "size", planet.size, f64::MIN_POSITIVE, f64::MAX)?;
    check_range(&record, "day_length", planet.day_length, f64::MIN_POSITIVE, f64::MAX)?;
    check_range(&record, "year_length", planet.year_length, f64::MIN_POSITIVE, f64::MAX)?;
    check_range(&record, "temperature", planet.temperature, -273.15, f64::MAX)?;
    for (resource, &abundance) in &planet.resources {
        check_range(
            &format!("{record} resource '{resource}'"),
            "abundance",
            abundance,
            0.0,
            1.0,
        )?;
    }
    Ok(())
}

/// Checks the physical ranges of a system record and its planets.
///
/// Reports the first violation found. Non-finite values are out of every range.
pub fn validate_system(system: &SystemData) -> Result<(), RecordError> {
    if system.name.trim().is_empty() {
        return Err(RecordError::EmptyName {
            record: format!("system '{}'", system.id),
        });
    }
    let mut seen = HashSet::new();
    for planet in &system.planets {
        if !seen.insert(&planet.id) {
            return Err(RecordError::DuplicatePlanet {
                system: system.id.clone(),
                planet: planet.id.clone(),
            });
        }
        validate_planet(planet)?;
    }
    Ok(())
}
