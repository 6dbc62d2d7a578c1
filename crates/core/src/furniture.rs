//! Furniture presets for the fit check

use serde::Serialize;

/// A catalog item with its footprint in centimeters
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FurniturePreset {
    pub id: &'static str,
    pub name: &'static str,
    pub width_cm: f64,
    pub height_cm: f64,
    pub depth_cm: f64,
}

/// The static preset catalog; the first entry is the default selection
pub const FURNITURE_PRESETS: [FurniturePreset; 4] = [
    FurniturePreset {
        id: "sofa",
        name: "Sofa (3-Seater)",
        width_cm: 220.0,
        height_cm: 90.0,
        depth_cm: 100.0,
    },
    FurniturePreset {
        id: "fridge",
        name: "Double Door Fridge",
        width_cm: 90.0,
        height_cm: 180.0,
        depth_cm: 80.0,
    },
    FurniturePreset {
        id: "bed",
        name: "Queen Size Bed",
        width_cm: 155.0,
        height_cm: 50.0,
        depth_cm: 205.0,
    },
    FurniturePreset {
        id: "desk",
        name: "Office Desk",
        width_cm: 140.0,
        height_cm: 75.0,
        depth_cm: 70.0,
    },
];

impl FurniturePreset {
    /// Look a preset up by id
    pub fn find(id: &str) -> Option<&'static FurniturePreset> {
        FURNITURE_PRESETS.iter().find(|preset| preset.id == id)
    }

    /// The preset selected when a session starts
    pub fn default_preset() -> &'static FurniturePreset {
        &FURNITURE_PRESETS[0]
    }

    /// Dimensions as `W x D x H cm`
    pub fn dimensions_label(&self) -> String {
        format!("{}x{}x{} cm", self.width_cm, self.depth_cm, self.height_cm)
    }
}
