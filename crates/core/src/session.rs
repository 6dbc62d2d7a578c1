//! Measurement session
//!
//! [`MeasureSession`] is the context object behind the measuring screen. It
//! owns the points, calibration, mode, unit, scan and voice state, and
//! re-derives the displayed measurement after every mutation. Observers
//! subscribe to [`SessionEvent`]s instead of polling.
//!
//! Time is virtual: the host calls [`MeasureSession::advance_to`] from its
//! frame or event loop, and scheduled scan and voice steps fire in deadline
//! order as the clock passes them.

use crate::calibration::{calibrate_with_floor, CalibrationScale, ReferenceObject};
use crate::config::{ConfigError, ConfigResult, EngineConfig};
use crate::derive::{derive, Derivation, DerivationInput, DerivedMeasurement, Reading};
use crate::estimate::{Material, MaterialEstimate};
use crate::export::{ExportFormat, ExportResult, ExportSink, ExportSnapshot};
use crate::furniture::FurniturePreset;
use crate::geometry::{ScreenPoint, Viewport};
use crate::mode::Mode;
use crate::orientation::{Orientation, OrientationFeed};
use crate::persistence::{MeasurementRecord, MeasurementStore, StoreError, StoreResult};
use crate::points::{PointCommand, PointId, PointStore};
use crate::scan::{AutoScan, ScanPhase, ScanResult, ScanStep, IDLE_STATUS};
use crate::units::Unit;
use crate::voice::{match_phrase, simulated_phrase, VoiceAction, VoiceListener};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use snapmeasure_scheduler::{SchedulerStats, TimerScheduler};
use std::time::Duration;
use uuid::Uuid;

/// Status shown after a successful calibration
pub const CALIBRATED_STATUS: &str = "Calibrated Successfully";

/// Status shown while a gallery image is being measured
pub const GALLERY_STATUS: &str = "Measuring Gallery Image";

/// Something observers may react to
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The displayed measurement was re-derived
    Recomputed(DerivedMeasurement),
    PointMoved { id: PointId, position: ScreenPoint },
    ModeChanged(Mode),
    UnitChanged(Unit),
    CalibrationStarted(ReferenceObject),
    Calibrated {
        reference: ReferenceObject,
        scale: CalibrationScale,
    },
    /// The status line changed
    Status(String),
    ScanCompleted(ScanResult),
    /// Roll landed in the narrow snap band; hosts play a haptic tick
    LevelSnap,
    ListeningChanged(bool),
    VoiceHeard {
        phrase: String,
        action: Option<VoiceAction>,
    },
    Saved(MeasurementRecord),
    ExportMenu(bool),
    Exported(ExportFormat),
}

/// Receives session events
pub trait SessionObserver: Send {
    fn on_event(&mut self, event: &SessionEvent);
}

impl<F> SessionObserver for F
where
    F: FnMut(&SessionEvent) + Send,
{
    fn on_event(&mut self, event: &SessionEvent) {
        self(event)
    }
}

/// Handle returned by [`MeasureSession::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Payload of a scheduled session step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionTimer {
    Scan(ScanStep),
    /// The simulated recognizer hears a phrase
    VoiceRecognize,
    /// Listening switches off after a recognition
    VoiceReset,
}

impl SessionTimer {
    fn is_voice(&self) -> bool {
        matches!(self, SessionTimer::VoiceRecognize | SessionTimer::VoiceReset)
    }
}

/// A measuring session
pub struct MeasureSession {
    id: Uuid,
    config: EngineConfig,
    points: PointStore,
    scale: CalibrationScale,
    unit: Unit,
    mode: Mode,
    furniture: &'static FurniturePreset,
    calibrating: Option<ReferenceObject>,
    orientation: OrientationFeed,
    scan: AutoScan,
    voice: VoiceListener,
    label: String,
    project_id: Option<String>,
    gallery_image: Option<String>,
    export_menu_open: bool,
    derivation: Derivation,
    timers: TimerScheduler<SessionTimer>,
    now: Duration,
    rng: StdRng,
    store: Option<Box<dyn MeasurementStore>>,
    observers: Vec<(SubscriptionId, Box<dyn SessionObserver>)>,
    next_subscription: u64,
}

impl MeasureSession {
    /// Create a session from a configuration
    ///
    /// The RNG is seeded from `rng_seed` when set, otherwise from entropy.
    pub fn new(config: EngineConfig) -> ConfigResult<Self> {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }

    /// Create a session with an explicit RNG
    pub fn with_rng(config: EngineConfig, rng: StdRng) -> ConfigResult<Self> {
        config.validate()?;
        let scale = CalibrationScale::new(config.initial_scale)
            .map_err(|_| ConfigError::InvalidValue("initial_scale".to_string()))?;
        let points = PointStore::with_viewport(config.viewport);
        let furniture = FurniturePreset::default_preset();

        let derivation = derive(&DerivationInput {
            points: &points,
            scale,
            unit: config.initial_unit,
            mode: config.initial_mode,
            orientation: Orientation::default(),
            furniture,
            calibrating: None,
            level_tolerance_deg: config.level_tolerance_deg,
        });

        let session = Self {
            id: Uuid::new_v4(),
            points,
            scale,
            unit: config.initial_unit,
            mode: config.initial_mode,
            furniture,
            calibrating: None,
            orientation: OrientationFeed::default(),
            scan: AutoScan::new(),
            voice: VoiceListener::default(),
            label: config.default_label.clone(),
            project_id: None,
            gallery_image: None,
            export_menu_open: false,
            derivation,
            timers: TimerScheduler::new(),
            now: Duration::ZERO,
            rng,
            store: None,
            observers: Vec::new(),
            next_subscription: 0,
            config,
        };
        log::debug!("Session {} started in {} mode", session.id, session.mode);
        Ok(session)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn scale(&self) -> CalibrationScale {
        self.scale
    }

    pub fn points(&self) -> &PointStore {
        &self.points
    }

    pub fn point(&self, id: PointId) -> ScreenPoint {
        self.points.point(id)
    }

    pub fn furniture(&self) -> &'static FurniturePreset {
        self.furniture
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation.current()
    }

    /// The displayed measurement
    pub fn measurement(&self) -> &DerivedMeasurement {
        &self.derivation.measurement
    }

    /// Numeric values behind the displayed measurement
    pub fn reading(&self) -> &Reading {
        &self.derivation.reading
    }

    /// The status line
    pub fn status(&self) -> &str {
        self.scan.status()
    }

    pub fn scan_phase(&self) -> ScanPhase {
        self.scan.phase()
    }

    pub fn is_scanning(&self) -> bool {
        self.scan.is_active()
    }

    /// Result of the last finished scan
    pub fn scan_result(&self) -> Option<&ScanResult> {
        self.scan.result()
    }

    pub fn is_calibrating(&self) -> bool {
        self.calibrating.is_some()
    }

    pub fn is_listening(&self) -> bool {
        self.voice.is_listening()
    }

    pub fn last_voice_command(&self) -> Option<&str> {
        self.voice.last_command()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    pub fn gallery_image(&self) -> Option<&str> {
        self.gallery_image.as_deref()
    }

    pub fn is_export_menu_open(&self) -> bool {
        self.export_menu_open
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of scheduled steps not yet fired
    pub fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    pub fn timer_stats(&self) -> SchedulerStats {
        self.timers.stats()
    }

    pub fn is_shut_down(&self) -> bool {
        self.timers.is_shut_down()
    }

    /// Register an observer
    pub fn subscribe(&mut self, observer: impl SessionObserver + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove an observer. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(subscription, _)| *subscription != id);
        self.observers.len() != before
    }

    fn emit(&mut self, event: SessionEvent) {
        for (_, observer) in &mut self.observers {
            observer.on_event(&event);
        }
    }

    fn recompute(&mut self) {
        self.derivation = derive(&DerivationInput {
            points: &self.points,
            scale: self.scale,
            unit: self.unit,
            mode: self.mode,
            orientation: self.orientation.current(),
            furniture: self.furniture,
            calibrating: self.calibrating,
            level_tolerance_deg: self.config.level_tolerance_deg,
        });
        self.emit(SessionEvent::Recomputed(self.derivation.measurement.clone()));
    }

    fn set_status(&mut self, status: &str) {
        self.scan.set_status(status);
        self.emit(SessionEvent::Status(status.to_string()));
    }

    /// Apply a drag or placement to one point
    pub fn apply(&mut self, command: PointCommand) -> ScreenPoint {
        let position = self.place(command);
        self.recompute();
        position
    }

    fn place(&mut self, command: PointCommand) -> ScreenPoint {
        let position = self.points.apply(command);
        self.emit(SessionEvent::PointMoved {
            id: command.target(),
            position,
        });
        position
    }

    /// Translate a point by a drag delta
    pub fn move_point(&mut self, id: PointId, dx: f64, dy: f64) -> ScreenPoint {
        self.apply(PointCommand::Move { id, dx, dy })
    }

    /// Switch mode; points stay where they are
    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            log::debug!("Mode {} -> {}", self.mode, mode);
            self.mode = mode;
            self.emit(SessionEvent::ModeChanged(mode));
        }
        self.recompute();
    }

    pub fn set_unit(&mut self, unit: Unit) {
        if self.unit != unit {
            self.unit = unit;
            self.emit(SessionEvent::UnitChanged(unit));
        }
        self.recompute();
    }

    /// Select a furniture preset by id. Returns `false` for unknown ids.
    pub fn select_furniture(&mut self, id: &str) -> bool {
        match FurniturePreset::find(id) {
            Some(preset) => {
                self.furniture = preset;
                self.recompute();
                true
            }
            None => {
                log::debug!("Unknown furniture preset {id:?}");
                false
            }
        }
    }

    /// Feed a sensor reading; `None` marks the sensor as unavailable
    pub fn set_orientation(&mut self, reading: Option<Orientation>) {
        self.orientation.update(reading);
        if reading.is_some_and(|orientation| orientation.is_snap_level()) {
            self.emit(SessionEvent::LevelSnap);
        }
        self.recompute();
    }

    /// Enter calibration against a reference object
    pub fn begin_calibration(&mut self, reference: ReferenceObject) {
        self.calibrating = Some(reference);
        self.emit(SessionEvent::CalibrationStarted(reference));
        self.recompute();
    }

    /// Leave calibration without changing the scale
    pub fn cancel_calibration(&mut self) {
        if self.calibrating.take().is_some() {
            self.recompute();
        }
    }

    /// Commit calibration from the current P1-P2 span
    ///
    /// Returns `false` and changes nothing when no calibration is active or
    /// the span is below the configured floor.
    pub fn calibrate(&mut self) -> bool {
        let Some(reference) = self.calibrating else {
            return false;
        };
        let pixel_width = self.points.distance(PointId::P1, PointId::P2);

        match calibrate_with_floor(reference, pixel_width, self.config.calibration_floor_px) {
            Ok(scale) => {
                log::info!("Calibrated against {}: {}", reference.name(), scale);
                self.scale = scale;
                self.calibrating = None;
                self.emit(SessionEvent::Calibrated { reference, scale });
                self.set_status(CALIBRATED_STATUS);
                self.recompute();
                true
            }
            Err(err) => {
                log::debug!("Calibration ignored: {err}");
                false
            }
        }
    }

    /// Start an auto-scan
    ///
    /// Returns `false` if a scan is already running or the session is shut
    /// down; the running schedule is left untouched.
    pub fn start_scan(&mut self) -> bool {
        if self.timers.is_shut_down() {
            return false;
        }
        let Some(scan_mode) = self.scan.start(self.mode, self.orientation.current()) else {
            log::debug!("Scan already running");
            return false;
        };

        for (offset, step) in self.config.scan.steps() {
            self.timers.schedule_at(self.now + offset, SessionTimer::Scan(step));
        }
        log::debug!("Scan started in {scan_mode} mode");

        let status = self.scan.status().to_string();
        self.emit(SessionEvent::Status(status));
        self.set_mode(scan_mode);
        true
    }

    /// Advance the virtual clock, firing every step that falls due
    ///
    /// Steps fire one at a time in deadline order, each seeing the clock at
    /// its own deadline. Moving the clock backwards does nothing.
    pub fn advance_to(&mut self, now: Duration) {
        while let Some(timer) = self.timers.pop_due(now) {
            self.now = self.now.max(timer.deadline);
            self.fire(timer.payload);
        }
        self.now = self.now.max(now);
    }

    /// Advance the virtual clock by `delta`
    pub fn advance_by(&mut self, delta: Duration) {
        self.advance_to(self.now + delta);
    }

    fn fire(&mut self, timer: SessionTimer) {
        match timer {
            SessionTimer::Scan(ScanStep::Advance(stage)) => {
                if let Some(status) = self.scan.advance(stage) {
                    let status = status.to_string();
                    self.emit(SessionEvent::Status(status));
                }
            }
            SessionTimer::Scan(ScanStep::Finalize) => self.finish_scan(),
            SessionTimer::VoiceRecognize => {
                let phrase = simulated_phrase(&mut self.rng);
                log::debug!("Heard {phrase:?}");
                self.voice.heard(phrase);
                let reset_at = self.now + Duration::from_millis(self.config.voice_reset_ms);
                self.timers.schedule_at(reset_at, SessionTimer::VoiceReset);
                self.dispatch_voice(phrase);
            }
            SessionTimer::VoiceReset => {
                self.voice.stop();
                self.emit(SessionEvent::ListeningChanged(false));
            }
        }
    }

    fn finish_scan(&mut self) {
        let Some(result) = self.scan.finalize(&mut self.rng, self.config.viewport) else {
            return;
        };
        for &(id, position) in &result.snapped {
            self.place(PointCommand::Set {
                id,
                x: position.x,
                y: position.y,
            });
        }
        log::info!(
            "Scan finished: {} ({}%)",
            result.detected_label,
            result.confidence
        );

        let status = self.scan.status().to_string();
        self.emit(SessionEvent::ScanCompleted(result));
        self.emit(SessionEvent::Status(status));
        self.recompute();
    }

    /// Toggle the simulated voice recognizer
    ///
    /// Turning it on schedules a recognition; turning it off drops any
    /// pending recognition or reset. Returns the new listening state.
    pub fn toggle_listening(&mut self) -> bool {
        if self.timers.is_shut_down() {
            return false;
        }
        let listening = self.voice.toggle();
        if listening {
            let at = self.now + Duration::from_millis(self.config.voice_listen_ms);
            self.timers.schedule_at(at, SessionTimer::VoiceRecognize);
        } else {
            let dropped = self.timers.cancel_where(SessionTimer::is_voice);
            log::debug!("Stopped listening, dropped {dropped} pending voice steps");
        }
        self.emit(SessionEvent::ListeningChanged(listening));
        listening
    }

    /// Dispatch a recognized phrase
    ///
    /// Returns the action taken, or `None` if no keyword matched.
    pub fn dispatch_voice(&mut self, phrase: &str) -> Option<VoiceAction> {
        let action = match_phrase(phrase);
        self.emit(SessionEvent::VoiceHeard {
            phrase: phrase.to_string(),
            action,
        });

        match action {
            Some(VoiceAction::StartScan) => {
                self.start_scan();
            }
            Some(VoiceAction::Save) => {
                if let Err(err) = self.save() {
                    log::warn!("Voice save failed: {err}");
                }
            }
            Some(VoiceAction::OpenExport) => self.open_export_menu(),
            Some(VoiceAction::SetMode(mode)) => self.set_mode(mode),
            None => log::debug!("No voice command matches {phrase:?}"),
        }
        action
    }

    /// Attach the persistence collaborator
    pub fn attach_store(&mut self, store: impl MeasurementStore + 'static) {
        self.store = Some(Box::new(store));
    }

    /// Detach and return the persistence collaborator
    pub fn detach_store(&mut self) -> Option<Box<dyn MeasurementStore>> {
        self.store.take()
    }

    /// The current measurement as a persistence record
    pub fn record(&self) -> MeasurementRecord {
        MeasurementRecord::new(
            self.mode,
            self.derivation.measurement.clone(),
            &self.label,
            self.project_id.clone(),
        )
    }

    /// Persist the current measurement
    pub fn save(&mut self) -> StoreResult<MeasurementRecord> {
        let record = self.record();
        let store = self.store.as_mut().ok_or(StoreError::Unavailable)?;
        store.save(record.clone())?;
        log::info!("Saved {} measurement", record.mode);
        self.emit(SessionEvent::Saved(record.clone()));
        Ok(record)
    }

    /// The current measurement as an export snapshot
    pub fn snapshot(&self) -> ExportSnapshot {
        ExportSnapshot {
            mode: self.mode,
            derived: self.derivation.measurement.clone(),
            label: self.label.clone(),
            project_id: self.project_id.clone(),
            taken_at: Utc::now(),
        }
    }

    /// Export the current measurement and close the export menu
    pub fn export(&mut self, format: ExportFormat, sink: &mut dyn ExportSink) -> ExportResult<()> {
        let snapshot = self.snapshot();
        if let Err(err) = sink.export(format, &snapshot) {
            log::warn!("Export as {format:?} failed: {err}");
            return Err(err);
        }
        self.close_export_menu();
        self.emit(SessionEvent::Exported(format));
        Ok(())
    }

    pub fn open_export_menu(&mut self) {
        if !self.export_menu_open {
            self.export_menu_open = true;
            self.emit(SessionEvent::ExportMenu(true));
        }
    }

    pub fn close_export_menu(&mut self) {
        if self.export_menu_open {
            self.export_menu_open = false;
            self.emit(SessionEvent::ExportMenu(false));
        }
    }

    /// Estimate a material from the current reading
    pub fn estimate(&self, material: Material) -> MaterialEstimate {
        MaterialEstimate::from_reading(material, &self.derivation.reading)
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn set_project_id(&mut self, project_id: Option<String>) {
        self.project_id = project_id;
    }

    /// Measure on a still image instead of the live camera
    pub fn set_gallery_image(&mut self, image: Option<String>) {
        let measuring = image.is_some();
        self.gallery_image = image;
        if measuring {
            self.set_status(GALLERY_STATUS);
        }
    }

    /// Resize the screen; points go back to the default layout
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.config.viewport = viewport;
        self.reset_points();
    }

    /// Put the points back in the default layout
    pub fn reset_points(&mut self) {
        self.points.layout(self.config.viewport);
        let moved: Vec<_> = self.points.iter().collect();
        for (id, position) in moved {
            self.emit(SessionEvent::PointMoved { id, position });
        }
        self.recompute();
    }

    /// Cancel every pending step; nothing fires afterwards. Idempotent.
    pub fn shutdown(&mut self) {
        if self.timers.is_shut_down() {
            return;
        }
        let cancelled = self.timers.shutdown();
        self.voice.stop();
        if self.scan.abort() {
            self.emit(SessionEvent::Status(IDLE_STATUS.to_string()));
        }
        log::debug!("Session {} shut down, {cancelled} pending steps cancelled", self.id);
    }
}

impl Drop for MeasureSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}
