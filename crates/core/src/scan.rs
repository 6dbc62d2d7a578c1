//! Auto-scan state machine
//!
//! A scripted pseudo-detection: three status stages on a fixed schedule,
//! then a randomized result that snaps the points onto a plausible outline.
//! The machine itself holds no timers; the session schedules the
//! [`ScanStep`]s returned by [`ScanSchedule::steps`] and feeds them back.

use crate::geometry::{ScreenPoint, Viewport};
use crate::mode::Mode;
use crate::orientation::{Orientation, SurfaceKind};
use crate::points::PointId;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Status shown before any scan has run
pub const IDLE_STATUS: &str = "Tap 'Auto' to scan";

/// Inclusive confidence range of a finished scan
pub const CONFIDENCE_RANGE: std::ops::RangeInclusive<u8> = 85..=99;

/// Intermediate stage of a running scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanStage {
    Locating,
    Analyzing,
    Estimating,
}

/// Where the scan state machine is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanPhase {
    #[default]
    Idle,
    Scanning(ScanStage),
}

/// What the scan pretends to look for, chosen from the mode at start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanTarget {
    /// A standing person (height mode)
    Stature,
    /// A box or parcel (volume mode)
    Package,
    /// Wall-to-wall floor span (room mode)
    Room,
    /// Generic object on a surface; every other mode scans as area
    Surface(SurfaceKind),
}

impl ScanTarget {
    /// Pick the target for a mode, along with the mode the scan runs in
    pub fn for_mode(mode: Mode, orientation: Orientation) -> (Self, Mode) {
        match mode {
            Mode::Height => (ScanTarget::Stature, Mode::Height),
            Mode::Volume => (ScanTarget::Package, Mode::Volume),
            Mode::Room => (ScanTarget::Room, Mode::Room),
            _ => (ScanTarget::Surface(orientation.surface()), Mode::Area),
        }
    }

    /// Status text for a stage
    pub fn status(self, stage: ScanStage) -> String {
        let text = match (self, stage) {
            (ScanTarget::Stature, ScanStage::Locating) => "Detecting Pose...",
            (ScanTarget::Stature, ScanStage::Analyzing) => "Identifying Head & Feet...",
            (ScanTarget::Stature, ScanStage::Estimating) => "Calculating Stature...",
            (ScanTarget::Package, ScanStage::Locating) => "Locating Box...",
            (ScanTarget::Package, ScanStage::Analyzing) => "Detecting Corners (AI)...",
            (ScanTarget::Package, ScanStage::Estimating) => "Computing Volume...",
            (ScanTarget::Room, ScanStage::Locating) => "Mapping Room Perimeter...",
            (ScanTarget::Room, ScanStage::Analyzing) => "Scanning Floor Plan...",
            (ScanTarget::Room, ScanStage::Estimating) => "Estimating Ceiling Height...",
            (ScanTarget::Surface(surface), ScanStage::Locating) => {
                return format!("Analyzing {}...", surface.label());
            }
            (ScanTarget::Surface(_), ScanStage::Analyzing) => "Analyzing Contours & Edges...",
            (ScanTarget::Surface(_), ScanStage::Estimating) => "Estimating Dimensions...",
        };
        text.to_string()
    }

    /// Labels the detector may report
    pub fn candidates(self) -> &'static [&'static str] {
        match self {
            ScanTarget::Stature => &["Person (Standing)"],
            ScanTarget::Package => &["Shipping Box", "Wooden Crate", "Suitcase"],
            ScanTarget::Room => &["Room Perimeter"],
            ScanTarget::Surface(_) => &[
                "Dining Table",
                "Office Chair",
                "Monitor",
                "Door Frame",
                "Window",
            ],
        }
    }

    /// Hint shown next to the result
    pub fn suggestion(self) -> &'static str {
        match self {
            ScanTarget::Stature => "Ensure feet are visible",
            ScanTarget::Package => "Check corner alignment",
            ScanTarget::Room => "Scan from corner for best accuracy",
            ScanTarget::Surface(_) => "Align with straight edges",
        }
    }

    /// Where the points land once the scan finishes
    ///
    /// Points not listed keep their position.
    pub fn snap_targets(self, viewport: Viewport) -> Vec<(PointId, ScreenPoint)> {
        let center = viewport.center();
        match self {
            ScanTarget::Stature => {
                let half = viewport.height * 0.4;
                vec![
                    (PointId::P1, ScreenPoint::new(center.x, center.y - half)),
                    (PointId::P4, ScreenPoint::new(center.x, center.y + half)),
                ]
            }
            ScanTarget::Room => {
                let half = viewport.width * 0.45;
                let floor = center.y + viewport.height * 0.3;
                vec![
                    (PointId::P1, ScreenPoint::new(center.x - half, floor)),
                    (PointId::P2, ScreenPoint::new(center.x + half, floor)),
                ]
            }
            ScanTarget::Package | ScanTarget::Surface(_) => {
                let half_w = viewport.width * 0.75 / 2.0;
                let half_h = viewport.height * 0.55 / 2.0;
                vec![
                    (PointId::P1, ScreenPoint::new(center.x - half_w, center.y + half_h)),
                    (PointId::P2, ScreenPoint::new(center.x + half_w, center.y + half_h)),
                    (PointId::P3, ScreenPoint::new(center.x - half_w, center.y - half_h)),
                ]
            }
        }
    }

    /// Status text once the scan has finished
    pub fn final_status(self, confidence: u8, label: &str) -> String {
        match self {
            ScanTarget::Stature => format!("Subject Identified ({confidence}%)"),
            ScanTarget::Package => "Package Identified".to_string(),
            ScanTarget::Room => "Room Mapped Successfully".to_string(),
            ScanTarget::Surface(_) => format!("Object Detected: {label}"),
        }
    }
}

/// Stage offsets from the moment a scan starts, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSchedule {
    pub analyzing_ms: u64,
    pub estimating_ms: u64,
    pub finalize_ms: u64,
}

impl Default for ScanSchedule {
    fn default() -> Self {
        Self {
            analyzing_ms: 800,
            estimating_ms: 1600,
            finalize_ms: 2500,
        }
    }
}

impl ScanSchedule {
    /// Timed steps after the start, in firing order
    pub fn steps(&self) -> [(Duration, ScanStep); 3] {
        [
            (
                Duration::from_millis(self.analyzing_ms),
                ScanStep::Advance(ScanStage::Analyzing),
            ),
            (
                Duration::from_millis(self.estimating_ms),
                ScanStep::Advance(ScanStage::Estimating),
            ),
            (Duration::from_millis(self.finalize_ms), ScanStep::Finalize),
        ]
    }

    /// Offsets must be strictly increasing
    pub fn is_ordered(&self) -> bool {
        self.analyzing_ms < self.estimating_ms && self.estimating_ms < self.finalize_ms
    }
}

/// A scheduled scan transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStep {
    Advance(ScanStage),
    Finalize,
}

/// Outcome of a finished scan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanResult {
    /// Percentage in [`CONFIDENCE_RANGE`]
    pub confidence: u8,
    pub detected_label: String,
    pub suggestion: String,
    /// Point positions to apply, in order
    pub snapped: Vec<(PointId, ScreenPoint)>,
}

/// The auto-scan state machine
#[derive(Debug, Clone)]
pub struct AutoScan {
    phase: ScanPhase,
    target: Option<ScanTarget>,
    status: String,
    result: Option<ScanResult>,
}

impl Default for AutoScan {
    fn default() -> Self {
        Self::new()
    }
}

impl AutoScan {
    pub fn new() -> Self {
        Self {
            phase: ScanPhase::Idle,
            target: None,
            status: IDLE_STATUS.to_string(),
            result: None,
        }
    }

    /// Begin a scan
    ///
    /// Returns the mode the scan runs in, or `None` if a scan is already
    /// running, in which case nothing changes.
    pub fn start(&mut self, mode: Mode, orientation: Orientation) -> Option<Mode> {
        if self.is_active() {
            return None;
        }
        let (target, scan_mode) = ScanTarget::for_mode(mode, orientation);
        self.phase = ScanPhase::Scanning(ScanStage::Locating);
        self.target = Some(target);
        self.result = None;
        self.status = target.status(ScanStage::Locating);
        Some(scan_mode)
    }

    /// Move to an intermediate stage, returning the new status
    ///
    /// Ignored when no scan is running.
    pub fn advance(&mut self, stage: ScanStage) -> Option<&str> {
        let target = self.running_target()?;
        self.phase = ScanPhase::Scanning(stage);
        self.status = target.status(stage);
        Some(&self.status)
    }

    /// Finish the running scan
    ///
    /// Draws confidence and label from `rng` and returns the result; the
    /// caller applies `snapped` to its points.
    pub fn finalize<R: Rng>(&mut self, rng: &mut R, viewport: Viewport) -> Option<ScanResult> {
        let target = self.running_target()?;
        let confidence = rng.gen_range(CONFIDENCE_RANGE);
        let label = target
            .candidates()
            .choose(rng)
            .copied()
            .unwrap_or("Object");

        let result = ScanResult {
            confidence,
            detected_label: label.to_string(),
            suggestion: target.suggestion().to_string(),
            snapped: target.snap_targets(viewport),
        };
        self.phase = ScanPhase::Idle;
        self.status = target.final_status(confidence, label);
        self.result = Some(result.clone());
        Some(result)
    }

    fn running_target(&self) -> Option<ScanTarget> {
        match self.phase {
            ScanPhase::Scanning(_) => self.target,
            ScanPhase::Idle => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, ScanPhase::Scanning(_))
    }

    pub fn phase(&self) -> ScanPhase {
        self.phase
    }

    pub fn target(&self) -> Option<ScanTarget> {
        self.target
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Result of the last finished scan
    pub fn result(&self) -> Option<&ScanResult> {
        self.result.as_ref()
    }

    /// Drop a running scan without a result
    ///
    /// Returns `false` when no scan was running. The last finished result
    /// is kept.
    pub fn abort(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.phase = ScanPhase::Idle;
        self.target = None;
        self.status = IDLE_STATUS.to_string();
        true
    }

    /// Overwrite the status line (calibration, gallery images)
    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_abort_returns_to_idle() {
        let mut scan = AutoScan::new();
        assert!(!scan.abort());
        scan.start(Mode::Room, Orientation::default());
        scan.advance(ScanStage::Analyzing);
        assert!(scan.abort());
        assert_eq!(scan.phase(), ScanPhase::Idle);
        assert_eq!(scan.status(), IDLE_STATUS);
        assert!(scan.advance(ScanStage::Estimating).is_none());
        assert!(scan.finalize(&mut StdRng::seed_from_u64(1), Viewport::new(10.0, 10.0)).is_none());
    }

    #[test]
    fn test_mode_coercion() {
        let flat = Orientation::default();
        assert_eq!(ScanTarget::for_mode(Mode::Height, flat), (ScanTarget::Stature, Mode::Height));
        assert_eq!(ScanTarget::for_mode(Mode::Volume, flat).1, Mode::Volume);
        assert_eq!(ScanTarget::for_mode(Mode::Room, flat).1, Mode::Room);
        for mode in [Mode::Distance, Mode::Area, Mode::Furniture, Mode::Level] {
            assert_eq!(
                ScanTarget::for_mode(mode, flat),
                (ScanTarget::Surface(SurfaceKind::Flat), Mode::Area)
            );
        }
        let wall = Orientation::new(-75.0, 0.0);
        assert_eq!(
            ScanTarget::for_mode(Mode::Distance, wall).0,
            ScanTarget::Surface(SurfaceKind::Vertical)
        );
    }

    #[test]
    fn test_status_per_stage() {
        let surface = ScanTarget::Surface(SurfaceKind::Vertical);
        assert_eq!(surface.status(ScanStage::Locating), "Analyzing Vertical Surface...");
        assert_eq!(surface.status(ScanStage::Analyzing), "Analyzing Contours & Edges...");
        assert_eq!(ScanTarget::Stature.status(ScanStage::Estimating), "Calculating Stature...");
        assert_eq!(ScanTarget::Room.status(ScanStage::Analyzing), "Scanning Floor Plan...");
    }

    #[test]
    fn test_start_is_idempotent_while_running() {
        let mut scan = AutoScan::new();
        assert_eq!(scan.status(), IDLE_STATUS);
        assert_eq!(scan.start(Mode::Height, Orientation::default()), Some(Mode::Height));
        scan.advance(ScanStage::Analyzing);

        assert_eq!(scan.start(Mode::Volume, Orientation::default()), None);
        assert_eq!(scan.phase(), ScanPhase::Scanning(ScanStage::Analyzing));
        assert_eq!(scan.target(), Some(ScanTarget::Stature));
        assert_eq!(scan.status(), "Identifying Head & Feet...");
    }

    #[test]
    fn test_steps_are_ignored_when_idle() {
        let mut scan = AutoScan::new();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(scan.advance(ScanStage::Estimating).is_none());
        assert!(scan.finalize(&mut rng, Viewport::default()).is_none());
        assert_eq!(scan.phase(), ScanPhase::Idle);
        assert_eq!(scan.status(), IDLE_STATUS);
    }

    #[test]
    fn test_finalize_height() {
        let mut scan = AutoScan::new();
        let mut rng = StdRng::seed_from_u64(7);
        scan.start(Mode::Height, Orientation::default());
        let result = scan.finalize(&mut rng, Viewport::new(400.0, 800.0)).unwrap();

        assert!(CONFIDENCE_RANGE.contains(&result.confidence));
        assert_eq!(result.detected_label, "Person (Standing)");
        assert_eq!(result.suggestion, "Ensure feet are visible");
        assert_eq!(
            result.snapped,
            vec![
                (PointId::P1, ScreenPoint::new(200.0, 80.0)),
                (PointId::P4, ScreenPoint::new(200.0, 720.0)),
            ]
        );
        assert_eq!(scan.status(), format!("Subject Identified ({}%)", result.confidence));
        assert!(!scan.is_active());
        assert_eq!(scan.result(), Some(&result));
    }

    #[test]
    fn test_snap_targets_room_and_box() {
        let viewport = Viewport::new(400.0, 800.0);
        assert_eq!(
            ScanTarget::Room.snap_targets(viewport),
            vec![
                (PointId::P1, ScreenPoint::new(20.0, 640.0)),
                (PointId::P2, ScreenPoint::new(380.0, 640.0)),
            ]
        );
        assert_eq!(
            ScanTarget::Package.snap_targets(Viewport::new(400.0, 1000.0)),
            vec![
                (PointId::P1, ScreenPoint::new(50.0, 775.0)),
                (PointId::P2, ScreenPoint::new(350.0, 775.0)),
                (PointId::P3, ScreenPoint::new(50.0, 225.0)),
            ]
        );
    }

    #[test]
    fn test_seeded_scans_repeat() {
        let run = |seed| {
            let mut scan = AutoScan::new();
            let mut rng = StdRng::seed_from_u64(seed);
            scan.start(Mode::Distance, Orientation::default());
            scan.finalize(&mut rng, Viewport::default()).unwrap()
        };
        let result = run(42);
        assert_eq!(result, run(42));
        assert!(ScanTarget::Surface(SurfaceKind::Flat)
            .candidates()
            .contains(&result.detected_label.as_str()));
    }

    #[test]
    fn test_confidence_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut scan = AutoScan::new();
        for _ in 0..200 {
            scan.start(Mode::Volume, Orientation::default());
            let result = scan.finalize(&mut rng, Viewport::default()).unwrap();
            assert!((85..=99).contains(&result.confidence));
            assert_eq!(scan.status(), "Package Identified");
        }
    }

    #[test]
    fn test_default_schedule() {
        let schedule = ScanSchedule::default();
        assert!(schedule.is_ordered());
        let steps = schedule.steps();
        assert_eq!(steps[0], (Duration::from_millis(800), ScanStep::Advance(ScanStage::Analyzing)));
        assert_eq!(steps[2], (Duration::from_millis(2500), ScanStep::Finalize));
    }
}
