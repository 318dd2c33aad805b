//! Heartbeat monitoring
//!
//! The checker applies the edge-triggered online/offline state machine to each
//! configured URL; the scheduler fires one invocation per interval.

pub mod checker;
pub mod scheduler;

pub use checker::{Monitor, MonitorError, RunReport, Transition, UrlFailure, UrlOutcome};
pub use scheduler::{run_once, HeartbeatWorker, LastRun};
