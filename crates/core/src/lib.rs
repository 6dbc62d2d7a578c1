//! SnapMeasure Core Library
//!
//! Measurement geometry and interaction engine: four draggable screen
//! points, a pixel-to-centimeter calibration, seven measurement modes,
//! perspective correction, a scripted auto-scan and voice command matching.
//! Everything the measuring screen shows is derived from a
//! [`MeasureSession`].

pub mod calibration;
pub mod config;
pub mod derive;
pub mod estimate;
pub mod export;
pub mod furniture;
pub mod geometry;
pub mod mode;
pub mod orientation;
pub mod persistence;
pub mod perspective;
pub mod points;
pub mod scan;
pub mod session;
pub mod units;
pub mod voice;

pub use calibration::{
    calibrate, CalibrationError, CalibrationResult, CalibrationScale, ReferenceObject,
};
pub use config::{ConfigError, ConfigResult, EngineConfig};
pub use derive::{derive, Derivation, DerivationInput, DerivedMeasurement, Reading};
pub use estimate::{Material, MaterialEstimate};
pub use export::{
    CsvExportConfig, CsvSink, ExportError, ExportFormat, ExportResult, ExportSink, ExportSnapshot,
};
pub use furniture::{FurniturePreset, FURNITURE_PRESETS};
pub use geometry::{ScreenPoint, Viewport};
pub use mode::Mode;
pub use orientation::{Orientation, OrientationFeed, SurfaceKind};
pub use persistence::{
    JsonFileStore, MeasurementRecord, MeasurementStore, MemoryStore, StoreError, StoreResult,
};
pub use perspective::correction_factor;
pub use points::{PointCommand, PointId, PointStore};
pub use scan::{AutoScan, ScanPhase, ScanResult, ScanSchedule, ScanStage, ScanStep, ScanTarget};
pub use session::{MeasureSession, SessionEvent, SessionObserver, SessionTimer, SubscriptionId};
pub use units::{Unit, UnknownVariant};
pub use voice::{match_phrase, VoiceAction, VoiceListener};
