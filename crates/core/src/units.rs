//! Display units
//!
//! Every derivation works in centimeters internally; a [`Unit`] is a pure
//! multiplicative factor applied at the end.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when parsing a unit or mode name fails
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value:?}")]
pub struct UnknownVariant {
    /// What was being parsed ("unit", "mode", ...)
    pub kind: &'static str,
    /// The rejected input
    pub value: String,
}

/// Display unit for lengths, areas and volumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Cm,
    M,
    Inch,
    Ft,
}

impl Unit {
    /// All units in selector order
    pub const ALL: [Unit; 4] = [Unit::Cm, Unit::M, Unit::Inch, Unit::Ft];

    /// Conversion factor from centimeters
    pub fn ratio(self) -> f64 {
        match self {
            Unit::Cm => 1.0,
            Unit::M => 0.01,
            Unit::Inch => 0.3937,
            Unit::Ft => 0.0328,
        }
    }

    /// Label appended to formatted values
    pub fn label(self) -> &'static str {
        match self {
            Unit::Cm => "cm",
            Unit::M => "m",
            Unit::Inch => "inch",
            Unit::Ft => "ft",
        }
    }

    /// Convert a centimeter quantity into this unit
    pub fn from_cm(self, cm: f64) -> f64 {
        cm * self.ratio()
    }

    /// Whether this is a metric unit
    pub fn is_metric(self) -> bool {
        matches!(self, Unit::Cm | Unit::M)
    }

    /// Assumed ceiling height shown in room mode
    pub fn ceiling_label(self) -> &'static str {
        if self.is_metric() {
            "2.4 m"
        } else {
            "8.0 ft"
        }
    }

    /// Sum of W+D+H above which a parcel counts as oversize
    ///
    /// Only centimeters get the large threshold; every other unit is compared
    /// against 130.
    pub fn shipping_threshold(self) -> f64 {
        match self {
            Unit::Cm => 300.0,
            Unit::M | Unit::Inch | Unit::Ft => 130.0,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Unit {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cm" => Ok(Unit::Cm),
            "m" => Ok(Unit::M),
            "inch" | "in" => Ok(Unit::Inch),
            "ft" => Ok(Unit::Ft),
            _ => Err(UnknownVariant {
                kind: "unit",
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratios() {
        assert_eq!(Unit::Cm.from_cm(8.56), 8.56);
        assert_eq!(Unit::M.ratio(), 0.01);
        assert_eq!(Unit::Inch.ratio(), 0.3937);
        assert_eq!(Unit::Ft.ratio(), 0.0328);
    }

    #[test]
    fn test_ceiling_and_threshold() {
        assert_eq!(Unit::Cm.ceiling_label(), "2.4 m");
        assert_eq!(Unit::M.ceiling_label(), "2.4 m");
        assert_eq!(Unit::Inch.ceiling_label(), "8.0 ft");
        assert_eq!(Unit::Ft.ceiling_label(), "8.0 ft");

        assert_eq!(Unit::Cm.shipping_threshold(), 300.0);
        assert_eq!(Unit::M.shipping_threshold(), 130.0);
        assert_eq!(Unit::Ft.shipping_threshold(), 130.0);
    }

    #[test]
    fn test_parse() {
        assert_eq!("CM".parse::<Unit>(), Ok(Unit::Cm));
        assert_eq!(" in ".parse::<Unit>(), Ok(Unit::Inch));
        let err = "yd".parse::<Unit>().unwrap_err();
        assert_eq!(err.to_string(), "unknown unit: \"yd\"");
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&Unit::Inch).unwrap(), "\"inch\"");
        assert_eq!(serde_json::from_str::<Unit>("\"ft\"").unwrap(), Unit::Ft);
    }
}
