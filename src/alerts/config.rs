//! Notification topic configuration types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Topic that alerts are published to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicConfig {
    /// Topic identity
    pub name: String,
    /// Alert destination passed along to relays
    pub email: Option<String>,
    /// Subscribed targets
    pub targets: Vec<NotifyTarget>,
}

impl TopicConfig {
    /// Create a topic with a single log target
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
            targets: vec![NotifyTarget::Log],
        }
    }

    /// Set the alert destination email
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Add a subscribed target
    pub fn with_target(mut self, target: NotifyTarget) -> Self {
        self.targets.push(target);
        self
    }
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self::new("HeartbeatNotifications")
    }
}

/// Notification target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NotifyTarget {
    /// Log to tracing
    Log,
    /// HTTP webhook relay
    Webhook {
        url: String,
        #[serde(default)]
        headers: HashMap<String, String>,
    },
}

impl NotifyTarget {
    /// Webhook target without extra headers
    pub fn webhook(url: impl Into<String>) -> Self {
        NotifyTarget::Webhook {
            url: url.into(),
            headers: HashMap::new(),
        }
    }
}
