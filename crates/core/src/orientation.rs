//! Device orientation from the motion sensor
//!
//! The sensor feed is an external collaborator sampling roughly every 100 ms.
//! Only the latest reading matters; a missing sensor reads as flat.

use serde::{Deserialize, Serialize};

/// Roll magnitude (degrees) above which the camera faces a vertical surface
pub const VERTICAL_SURFACE_ROLL_DEG: f64 = 60.0;

/// Device tilt in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Orientation {
    /// Side-to-side tilt, read by the level
    pub roll_deg: f64,
    /// Forward/back tilt, read by perspective correction
    pub pitch_deg: f64,
}

impl Orientation {
    /// Create an orientation from degrees
    pub fn new(roll_deg: f64, pitch_deg: f64) -> Self {
        Self { roll_deg, pitch_deg }
    }

    /// Create an orientation from the sensor's rotation angles in radians
    /// (gamma is roll, beta is pitch)
    pub fn from_rotation_radians(gamma: f64, beta: f64) -> Self {
        Self::new(gamma.to_degrees(), beta.to_degrees())
    }

    /// Whether the roll is within `tolerance_deg` of level
    pub fn is_level(&self, tolerance_deg: f64) -> bool {
        self.roll_deg.abs() < tolerance_deg
    }

    /// Whether the roll sits in the narrow band that earns a "snap" tick
    pub fn is_snap_level(&self) -> bool {
        let roll = self.roll_deg.abs();
        roll > 0.1 && roll < 0.5
    }

    /// Kind of surface the camera is most likely facing
    pub fn surface(&self) -> SurfaceKind {
        if self.roll_deg.abs() > VERTICAL_SURFACE_ROLL_DEG {
            SurfaceKind::Vertical
        } else {
            SurfaceKind::Flat
        }
    }
}

/// Surface classification used in scan status text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    Flat,
    Vertical,
}

impl SurfaceKind {
    /// Human-readable name
    pub fn label(self) -> &'static str {
        match self {
            SurfaceKind::Flat => "Flat Surface",
            SurfaceKind::Vertical => "Vertical Surface",
        }
    }
}

/// Latest-value-wins holder for the sensor feed
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OrientationFeed {
    latest: Option<Orientation>,
}

impl OrientationFeed {
    /// Replace the reading; `None` marks the sensor as unavailable
    ///
    /// Non-finite angles from a faulty sensor read as 0.
    pub fn update(&mut self, reading: Option<Orientation>) {
        self.latest = reading.map(|orientation| {
            Orientation::new(
                finite_or_zero(orientation.roll_deg),
                finite_or_zero(orientation.pitch_deg),
            )
        });
    }

    /// Current orientation, flat when the sensor is missing
    pub fn current(&self) -> Orientation {
        self.latest.unwrap_or_default()
    }

    /// Whether a reading has been received
    pub fn is_available(&self) -> bool {
        self.latest.is_some()
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
