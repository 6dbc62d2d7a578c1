//! SnapMeasure Scheduler Library
//!
//! Deadline-ordered, cancellable timers on a virtual clock.
//!
//! The measurement engine runs on a single update stream, so nothing here
//! spawns threads. The host advances a clock and drains whatever became due;
//! every timer carries a [`CancellationToken`] so pending work can be dropped
//! when the owner is torn down.
//!
//! # Example
//!
//! ```
//! use snapmeasure_scheduler::TimerScheduler;
//! use std::time::Duration;
//!
//! let scheduler = TimerScheduler::new();
//! scheduler.schedule_at(Duration::from_millis(800), "stage 1");
//! scheduler.schedule_at(Duration::from_millis(2500), "finalize");
//!
//! while let Some(timer) = scheduler.pop_due(Duration::from_millis(1000)) {
//!     assert_eq!(timer.payload, "stage 1");
//! }
//!
//! // Teardown: the finalize timer never fires.
//! scheduler.shutdown();
//! assert!(scheduler.pop_due(Duration::from_secs(10)).is_none());
//! ```

mod cancel;
mod scheduler;
mod timer;

pub use cancel::{CancellationRegistry, CancellationToken};
pub use scheduler::{SchedulerStats, TimerScheduler};
pub use timer::{Timer, TimerId, TimerQueue};
