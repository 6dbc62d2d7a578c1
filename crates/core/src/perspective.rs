//! Perspective correction for off-axis viewing
//!
//! A surface viewed at a pitch looks foreshortened along the viewing
//! direction. Between 15° and 75° of pitch the depth axis is stretched by
//! `1 / sin(pitch)`, capped at 1.5.

/// Pitch magnitude (degrees) above which correction starts
pub const CORRECTION_MIN_PITCH_DEG: f64 = 15.0;

/// Pitch magnitude (degrees) at which correction stops
pub const CORRECTION_MAX_PITCH_DEG: f64 = 75.0;

/// Upper bound of the correction factor
pub const MAX_CORRECTION: f64 = 1.5;

/// Correction factor for a device pitch in degrees
///
/// Outside the open band (15°, 75°) the factor is exactly 1.
pub fn correction_factor(pitch_deg: f64) -> f64 {
    let pitch = pitch_deg.abs();
    if pitch > CORRECTION_MIN_PITCH_DEG && pitch < CORRECTION_MAX_PITCH_DEG {
        (1.0 / pitch.to_radians().sin()).min(MAX_CORRECTION)
    } else {
        1.0
    }
}
