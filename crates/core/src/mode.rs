//! Measurement modes

use crate::points::PointId;
use crate::units::UnknownVariant;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The active interpretation of the on-screen points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Straight line P1-P2
    #[default]
    Distance,
    /// Vertical span P1-P4
    Height,
    /// P1-P2 as one wall of a square room
    Room,
    /// Rectangle spanned by P1-P2 (width) and P1-P3 (depth)
    Area,
    /// Box spanned by P1-P2, P1-P3 and P1-P4
    Volume,
    /// Box compared against a furniture preset
    Furniture,
    /// Bubble level from the roll sensor; ignores points
    Level,
}

impl Mode {
    /// All modes in selector order
    pub const ALL: [Mode; 7] = [
        Mode::Distance,
        Mode::Height,
        Mode::Room,
        Mode::Area,
        Mode::Volume,
        Mode::Furniture,
        Mode::Level,
    ];

    /// Stable identifier used in records and exports
    pub fn id(self) -> &'static str {
        match self {
            Mode::Distance => "distance",
            Mode::Height => "height",
            Mode::Room => "room",
            Mode::Area => "area",
            Mode::Volume => "volume",
            Mode::Furniture => "furniture",
            Mode::Level => "level",
        }
    }

    /// Selector title
    pub fn title(self) -> &'static str {
        match self {
            Mode::Distance => "Distance",
            Mode::Height => "Height",
            Mode::Room => "Room",
            Mode::Area => "Area",
            Mode::Volume => "Volume",
            Mode::Furniture => "Fit Check",
            Mode::Level => "Level",
        }
    }

    /// Points that carry meaning in this mode
    pub fn relevant_points(self) -> &'static [PointId] {
        match self {
            Mode::Distance | Mode::Room => &[PointId::P1, PointId::P2],
            Mode::Height => &[PointId::P1, PointId::P4],
            Mode::Area => &[PointId::P1, PointId::P2, PointId::P3],
            Mode::Volume | Mode::Furniture => &PointId::ALL,
            Mode::Level => &[],
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Mode {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Mode::ALL
            .into_iter()
            .find(|mode| mode.id() == wanted)
            .ok_or_else(|| UnknownVariant {
                kind: "mode",
                value: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_ids() {
        for mode in Mode::ALL {
            assert_eq!(mode.id().parse::<Mode>(), Ok(mode));
        }
        assert!("blueprint".parse::<Mode>().is_err());
    }

    #[test]
    fn test_level_uses_no_points() {
        assert!(Mode::Level.relevant_points().is_empty());
        assert_eq!(Mode::Height.relevant_points(), &[PointId::P1, PointId::P4]);
        assert_eq!(Mode::Volume.relevant_points().len(), 4);
    }

    #[test]
    fn test_selector_titles() {
        let titles: Vec<&str> = Mode::ALL.into_iter().map(Mode::title).collect();
        assert_eq!(
            titles,
            ["Distance", "Height", "Room", "Area", "Volume", "Fit Check", "Level"]
        );
    }
}
