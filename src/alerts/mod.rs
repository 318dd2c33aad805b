//! Alert delivery
//!
//! A topic that fans each heartbeat alert out to its subscribed targets.

pub mod config;
pub mod notifier;

pub use config::{NotifyTarget, TopicConfig};
pub use notifier::{format_alert, Notifier, NotifierError, TopicNotifier};
