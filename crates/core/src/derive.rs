//! Mode derivation
//!
//! Turns points, calibration, unit, orientation and the selected preset into
//! the measurement shown on screen. Everything here is a pure function of
//! [`DerivationInput`]; the session re-runs it after every mutation.
//!
//! Axes, all measured from P1:
//! - width: P1-P2, never perspective-corrected in area/volume/furniture
//! - depth: P1-P3, always corrected
//! - height: P1-P4, corrected only in height mode
//!
//! Distance, height and the room wall apply the correction to the whole
//! reading.

use crate::calibration::{CalibrationScale, ReferenceObject};
use crate::furniture::FurniturePreset;
use crate::mode::Mode;
use crate::orientation::Orientation;
use crate::perspective::correction_factor;
use crate::points::{PointId, PointStore};
use crate::units::Unit;
use serde::{Deserialize, Serialize};

/// Everything a derivation reads
#[derive(Debug, Clone, Copy)]
pub struct DerivationInput<'a> {
    pub points: &'a PointStore,
    pub scale: CalibrationScale,
    pub unit: Unit,
    pub mode: Mode,
    pub orientation: Orientation,
    pub furniture: &'a FurniturePreset,
    /// Active calibration session, which overrides the mode output
    pub calibrating: Option<ReferenceObject>,
    pub level_tolerance_deg: f64,
}

/// The displayed measurement: three unit-labelled lines
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DerivedMeasurement {
    pub primary: String,
    pub secondary: String,
    pub extra: String,
}

impl DerivedMeasurement {
    /// Create a measurement from its three lines
    pub fn new(
        primary: impl Into<String>,
        secondary: impl Into<String>,
        extra: impl Into<String>,
    ) -> Self {
        Self {
            primary: primary.into(),
            secondary: secondary.into(),
            extra: extra.into(),
        }
    }

    fn single(primary: String) -> Self {
        Self {
            primary,
            ..Self::default()
        }
    }
}

/// Numeric values behind a [`DerivedMeasurement`], in the display unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    /// Calibration overlay: what the current scale thinks P1-P2 is
    Calibration { current_cm: f64, target_cm: f64 },
    Distance { length: f64 },
    Height { height: f64 },
    /// Floor area assumes a square room
    Room { wall: f64, floor_area: f64 },
    Area { width: f64, length: f64, area: f64 },
    Volume {
        width: f64,
        depth: f64,
        height: f64,
        volume: f64,
        oversize: bool,
    },
    Furniture {
        preset: FurniturePreset,
        width: f64,
        depth: f64,
        height: f64,
        fits: bool,
    },
    Level { roll_deg: f64, level: bool },
}

impl Reading {
    /// Surface area carried by the reading, if any
    pub fn area(&self) -> Option<f64> {
        match *self {
            Reading::Area { area, .. } => Some(area),
            Reading::Room { floor_area, .. } => Some(floor_area),
            _ => None,
        }
    }

    /// Volume carried by the reading, if any
    pub fn volume(&self) -> Option<f64> {
        match *self {
            Reading::Volume { volume, .. } => Some(volume),
            _ => None,
        }
    }

    /// Render the reading as display text
    pub fn format(&self, unit: Unit) -> DerivedMeasurement {
        match *self {
            Reading::Calibration {
                current_cm,
                target_cm,
            } => DerivedMeasurement::new(
                format!("{current_cm:.2} cm"),
                format!("Target: {target_cm} cm"),
                "Align points to width of object",
            ),
            Reading::Distance { length } => DerivedMeasurement::single(format!("{length:.2} {unit}")),
            Reading::Height { height } => DerivedMeasurement::single(format!("{height:.2} {unit}")),
            Reading::Room { wall, floor_area } => DerivedMeasurement::new(
                format!("{wall:.2} {unit}"),
                format!("Ceiling: {}", unit.ceiling_label()),
                format!("Floor Area: {floor_area:.2} {unit}²"),
            ),
            Reading::Area {
                width,
                length,
                area,
            } => DerivedMeasurement::new(
                format!("W: {width:.1} {unit}"),
                format!("L: {length:.1} {unit}"),
                format!("Area: {area:.2} {unit}²"),
            ),
            Reading::Volume {
                width,
                depth,
                height,
                volume,
                oversize,
            } => {
                let shipping = if oversize { "Oversize" } else { "Standard" };
                DerivedMeasurement::new(
                    format!("{width:.1}x{depth:.1}"),
                    format!("H: {height:.1}"),
                    format!("{volume:.2} {unit}³ | {shipping}"),
                )
            }
            Reading::Furniture { preset, fits, .. } => DerivedMeasurement::new(
                preset.name,
                preset.dimensions_label(),
                if fits { "Fits" } else { "Too Tight" },
            ),
            Reading::Level { roll_deg, level } => DerivedMeasurement::new(
                format!("{}°", roll_deg.abs().round()),
                if level { "Level" } else { "Tilted" },
                "",
            ),
        }
    }
}

/// A reading together with its display text
#[derive(Debug, Clone, PartialEq)]
pub struct Derivation {
    pub reading: Reading,
    pub measurement: DerivedMeasurement,
}

/// Derive the current measurement
pub fn derive(input: &DerivationInput<'_>) -> Derivation {
    let reading = read(input);
    Derivation {
        measurement: reading.format(input.unit),
        reading,
    }
}

/// Compute the numeric reading for the active mode
pub fn read(input: &DerivationInput<'_>) -> Reading {
    let points = input.points;
    let width_px = points.distance(PointId::P1, PointId::P2);

    if let Some(reference) = input.calibrating {
        return Reading::Calibration {
            current_cm: input.scale.to_cm(width_px),
            target_cm: reference.width_cm(),
        };
    }

    let unit = input.unit;
    let correction = correction_factor(input.orientation.pitch_deg);
    let to_unit = |pixels: f64| unit.from_cm(input.scale.to_cm(pixels));

    let width = to_unit(width_px);
    let depth = to_unit(points.distance(PointId::P1, PointId::P3)) * correction;
    let height = to_unit(points.distance(PointId::P1, PointId::P4));

    match input.mode {
        Mode::Distance => Reading::Distance {
            length: width * correction,
        },
        Mode::Height => Reading::Height {
            height: height * correction,
        },
        Mode::Room => {
            let wall = width * correction;
            Reading::Room {
                wall,
                floor_area: wall * wall,
            }
        }
        Mode::Area => Reading::Area {
            width,
            length: depth,
            area: width * depth,
        },
        Mode::Volume => Reading::Volume {
            width,
            depth,
            height,
            volume: width * depth * height,
            oversize: width + depth + height > unit.shipping_threshold(),
        },
        Mode::Furniture => {
            let preset = *input.furniture;
            let fits = width >= unit.from_cm(preset.width_cm)
                && depth >= unit.from_cm(preset.depth_cm)
                && height >= unit.from_cm(preset.height_cm);
            Reading::Furniture {
                preset,
                width,
                depth,
                height,
                fits,
            }
        }
        Mode::Level => Reading::Level {
            roll_deg: input.orientation.roll_deg,
            level: input.orientation.is_level(input.level_tolerance_deg),
        },
    }
}
