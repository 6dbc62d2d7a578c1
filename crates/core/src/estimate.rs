//! Material quantity estimates
//!
//! Rough shopping-list numbers derived from the current reading.

use crate::derive::Reading;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coverage of one liter of paint, in square units
pub const PAINT_COVERAGE: f64 = 10.0;

/// Area of one 30x30 cm tile, in square meters
pub const TILE_COVERAGE: f64 = 0.09;

/// Volume filled by one bag of concrete
pub const CONCRETE_COVERAGE: f64 = 0.1;

/// Material to estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Material {
    #[default]
    Paint,
    Tiles,
    Concrete,
}

/// Estimated quantity of a material
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum MaterialEstimate {
    /// Liters, rounded to one decimal
    Paint { liters: f64 },
    Tiles { count: u64 },
    Concrete { bags: u64 },
}

impl MaterialEstimate {
    /// Estimate a material from a reading
    ///
    /// Paint and tiles read the area (the volume in volume mode); concrete
    /// reads the volume. Readings without either count as zero.
    pub fn from_reading(material: Material, reading: &Reading) -> Self {
        match material {
            Material::Paint => {
                let area = reading.area().or_else(|| reading.volume()).unwrap_or(0.0);
                MaterialEstimate::Paint {
                    liters: (area / PAINT_COVERAGE * 10.0).round() / 10.0,
                }
            }
            Material::Tiles => {
                let area = reading.area().or_else(|| reading.volume()).unwrap_or(0.0);
                MaterialEstimate::Tiles {
                    count: whole_units(area / TILE_COVERAGE),
                }
            }
            Material::Concrete => MaterialEstimate::Concrete {
                bags: whole_units(reading.volume().unwrap_or(0.0) / CONCRETE_COVERAGE),
            },
        }
    }
}

// Round up; NaN and negatives become zero
fn whole_units(quantity: f64) -> u64 {
    if quantity > 0.0 {
        quantity.ceil() as u64
    } else {
        0
    }
}

impl fmt::Display for MaterialEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaterialEstimate::Paint { liters } => write!(f, "{liters} Liters of Paint"),
            MaterialEstimate::Tiles { count } => write!(f, "{count} Tiles (30x30cm)"),
            MaterialEstimate::Concrete { bags } => write!(f, "{bags} Bags (Standard)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area(value: f64) -> Reading {
        Reading::Area {
            width: value,
            length: 1.0,
            area: value,
        }
    }

    #[test]
    fn test_paint() {
        let estimate = MaterialEstimate::from_reading(Material::Paint, &area(25.0));
        assert_eq!(estimate, MaterialEstimate::Paint { liters: 2.5 });
        assert_eq!(estimate.to_string(), "2.5 Liters of Paint");

        let estimate = MaterialEstimate::from_reading(Material::Paint, &area(40.0));
        assert_eq!(estimate.to_string(), "4 Liters of Paint");
    }

    #[test]
    fn test_tiles_round_up() {
        let estimate = MaterialEstimate::from_reading(Material::Tiles, &area(1.0));
        assert_eq!(estimate, MaterialEstimate::Tiles { count: 12 });
        assert_eq!(estimate.to_string(), "12 Tiles (30x30cm)");
    }

    #[test]
    fn test_room_counts_floor_area() {
        let room = Reading::Room {
            wall: 3.0,
            floor_area: 9.0,
        };
        assert_eq!(
            MaterialEstimate::from_reading(Material::Tiles, &room),
            MaterialEstimate::Tiles { count: 100 }
        );
    }

    #[test]
    fn test_concrete_uses_volume() {
        let volume = Reading::Volume {
            width: 1.0,
            depth: 1.0,
            height: 0.25,
            volume: 0.25,
            oversize: false,
        };
        let estimate = MaterialEstimate::from_reading(Material::Concrete, &volume);
        assert_eq!(estimate.to_string(), "3 Bags (Standard)");
        assert_eq!(
            MaterialEstimate::from_reading(Material::Concrete, &area(50.0)),
            MaterialEstimate::Concrete { bags: 0 }
        );
    }

    #[test]
    fn test_unrelated_readings_are_zero() {
        let level = Reading::Level {
            roll_deg: 2.0,
            level: true,
        };
        assert_eq!(
            MaterialEstimate::from_reading(Material::Paint, &level).to_string(),
            "0 Liters of Paint"
        );
        assert_eq!(
            MaterialEstimate::from_reading(Material::Tiles, &level),
            MaterialEstimate::Tiles { count: 0 }
        );
    }
}
