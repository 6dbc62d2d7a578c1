//! Pixel-to-centimeter calibration
//!
//! The user lines P1 and P2 up with the edges of an object of known width;
//! the scale becomes `reference width / pixel distance`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum pixel span accepted for calibration
pub const CALIBRATION_FLOOR_PX: f64 = 10.0;

/// Scale used before any calibration has happened
pub const DEFAULT_CM_PER_PIXEL: f64 = 0.05;

/// Error types for calibration
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalibrationError {
    #[error("pixel width {pixel_width:.1} is below the {floor:.1} px calibration floor")]
    Degenerate { pixel_width: f64, floor: f64 },

    #[error("scale must be a positive finite number, got {0}")]
    InvalidScale(f64),
}

pub type CalibrationResult<T> = Result<T, CalibrationError>;

/// Objects of standard width used as calibration references
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceObject {
    /// ID-1 card (credit card, ID card)
    #[default]
    Card,
    /// A4 sheet, short edge
    A4,
    /// US dollar bill, long edge (approximate)
    Money,
}

impl ReferenceObject {
    /// All reference objects in selector order
    pub const ALL: [ReferenceObject; 3] =
        [ReferenceObject::Card, ReferenceObject::A4, ReferenceObject::Money];

    /// Known width in centimeters
    pub fn width_cm(self) -> f64 {
        match self {
            ReferenceObject::Card => 8.56,
            ReferenceObject::A4 => 21.0,
            ReferenceObject::Money => 15.6,
        }
    }

    /// Human-readable name
    pub fn name(self) -> &'static str {
        match self {
            ReferenceObject::Card => "Credit Card",
            ReferenceObject::A4 => "A4 Paper",
            ReferenceObject::Money => "Bank Note",
        }
    }
}

/// Centimeters represented by one screen pixel. Always positive and finite.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct CalibrationScale(f64);

impl CalibrationScale {
    /// Create a scale, rejecting zero, negative and non-finite values
    pub fn new(cm_per_pixel: f64) -> CalibrationResult<Self> {
        if cm_per_pixel.is_finite() && cm_per_pixel > 0.0 {
            Ok(Self(cm_per_pixel))
        } else {
            Err(CalibrationError::InvalidScale(cm_per_pixel))
        }
    }

    /// Centimeters per pixel
    pub fn cm_per_pixel(self) -> f64 {
        self.0
    }

    /// Convert a pixel distance to centimeters
    pub fn to_cm(self, pixels: f64) -> f64 {
        pixels * self.0
    }
}

impl Default for CalibrationScale {
    fn default() -> Self {
        Self(DEFAULT_CM_PER_PIXEL)
    }
}

impl fmt::Display for CalibrationScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4} cm/px", self.0)
    }
}

/// Derive a scale from a reference object spanning `pixel_width` pixels
pub fn calibrate(reference: ReferenceObject, pixel_width: f64) -> CalibrationResult<CalibrationScale> {
    calibrate_with_floor(reference, pixel_width, CALIBRATION_FLOOR_PX)
}

/// Same as [`calibrate`] with a custom noise floor
pub fn calibrate_with_floor(
    reference: ReferenceObject,
    pixel_width: f64,
    floor: f64,
) -> CalibrationResult<CalibrationScale> {
    if pixel_width.is_nan() || pixel_width < floor {
        return Err(CalibrationError::Degenerate { pixel_width, floor });
    }
    CalibrationScale::new(reference.width_cm() / pixel_width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_calibration() {
        let scale = calibrate(ReferenceObject::Card, 100.0).unwrap();
        assert!((scale.cm_per_pixel() - 0.0856).abs() < 1e-12);
        assert_eq!(format!("{:.2}", scale.to_cm(100.0)), "8.56");
    }

    #[test]
    fn test_reference_widths() {
        assert_eq!(ReferenceObject::Card.width_cm(), 8.56);
        assert_eq!(ReferenceObject::A4.width_cm(), 21.0);
        assert_eq!(ReferenceObject::Money.width_cm(), 15.6);
    }

    #[test]
    fn test_below_floor_is_degenerate() {
        for reference in ReferenceObject::ALL {
            let err = calibrate(reference, 9.99).unwrap_err();
            assert_eq!(
                err,
                CalibrationError::Degenerate {
                    pixel_width: 9.99,
                    floor: CALIBRATION_FLOOR_PX
                }
            );
        }
        assert!(calibrate(ReferenceObject::A4, f64::NAN).is_err());
        assert!(calibrate(ReferenceObject::A4, 10.0).is_ok());
    }

    #[test]
    fn test_scale_must_be_positive() {
        assert!(CalibrationScale::new(0.0).is_err());
        assert!(CalibrationScale::new(-1.0).is_err());
        assert!(CalibrationScale::new(f64::INFINITY).is_err());
        assert_eq!(CalibrationScale::default().cm_per_pixel(), 0.05);
    }
}
