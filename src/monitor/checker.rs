//! Per-URL transition logic

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::alerts::{format_alert, Notifier, NotifierError};
use crate::probe::{classify, Classification, Prober};
use crate::store::{OfflineStore, StoreError};

/// Result of checking one URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transition {
    /// Offline record existed and the URL answered below 400
    WentOnline,
    /// No offline record existed and the URL failed or answered 400+
    WentOffline { status_code: u16 },
    /// Classification matches the stored state
    Unchanged,
}

impl Transition {
    /// Alert text for this transition, if it warrants one
    pub fn message(&self) -> Option<String> {
        match self {
            Transition::WentOnline => Some("URL is now online".to_string()),
            Transition::WentOffline { status_code } => {
                Some(format!("URL is now offline (status code {})", status_code))
            }
            Transition::Unchanged => None,
        }
    }
}

/// Outcome of a successfully processed URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlOutcome {
    pub url: String,
    pub status_code: u16,
    pub classification: Classification,
    pub transition: Transition,
}

/// A URL whose check could not complete
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlFailure {
    pub url: String,
    pub error: String,
}

/// Summary of one invocation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    /// Start timestamp (epoch ms)
    pub started_at: i64,
    /// Finish timestamp (epoch ms)
    pub finished_at: i64,
    pub outcomes: Vec<UrlOutcome>,
    pub failures: Vec<UrlFailure>,
}

impl RunReport {
    /// Number of transitions that produced a notification
    pub fn transition_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.transition != Transition::Unchanged)
            .count()
    }
}

/// Runs the online/offline state machine over a fixed set of URLs
pub struct Monitor {
    urls: Vec<String>,
    prober: Arc<dyn Prober>,
    store: Arc<dyn OfflineStore>,
    notifier: Arc<dyn Notifier>,
}

impl Monitor {
    pub fn new(
        urls: Vec<String>,
        prober: Arc<dyn Prober>,
        store: Arc<dyn OfflineStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            urls,
            prober,
            store,
            notifier,
        }
    }

    /// Check every URL once, in order
    ///
    /// A store or notifier failure on one URL is recorded in the report and the
    /// remaining URLs are still checked.
    pub async fn run(&self) -> RunReport {
        tracing::info!(urls = self.urls.len(), "Heartbeat invocation started");

        let mut report = RunReport {
            started_at: chrono::Utc::now().timestamp_millis(),
            ..Default::default()
        };

        for url in &self.urls {
            match self.check_url(url).await {
                Ok(outcome) => report.outcomes.push(outcome),
                Err(e) => {
                    tracing::error!(url = %url, error = %e, "Heartbeat check failed");
                    report.failures.push(UrlFailure {
                        url: url.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        report.finished_at = chrono::Utc::now().timestamp_millis();
        tracing::info!(
            checked = report.outcomes.len(),
            transitions = report.transition_count(),
            failures = report.failures.len(),
            "Heartbeat invocation finished"
        );

        report
    }

    /// Probe a URL and apply the transition logic against its offline record
    ///
    /// The alert is published before the store is touched, so a failed publish
    /// leaves the record as it was and the transition is seen again next run.
    pub async fn check_url(&self, url: &str) -> Result<UrlOutcome, MonitorError> {
        tracing::debug!(url = %url, "Checking status");
        let status_code = self.prober.probe(url).await;
        tracing::debug!(url = %url, status_code, "Check returned status code");

        let record = self.store.get(url).await?;
        let classification = classify(status_code);

        let transition = match (classification, record.is_some()) {
            (Classification::Online, true) => Transition::WentOnline,
            (Classification::Offline, false) => Transition::WentOffline { status_code },
            _ => Transition::Unchanged,
        };

        if let Some(message) = transition.message() {
            tracing::info!(url = %url, status_code, "Status change detected: {}", message);
            self.notifier.publish(&format_alert(url, &message)).await?;
        } else {
            tracing::debug!(url = %url, %classification, "No status change detected");
        }

        match transition {
            Transition::WentOnline => self.store.delete(url).await?,
            Transition::WentOffline { .. } => {
                self.store
                    .put(url, chrono::Utc::now().timestamp_millis())
                    .await?
            }
            Transition::Unchanged => {}
        }

        Ok(UrlOutcome {
            url: url.to_string(),
            status_code,
            classification,
            transition,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Notification error: {0}")]
    Notify(#[from] NotifierError),

    #[error("Invocation timed out after {0:?}")]
    Timeout(std::time::Duration),
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::probe::PROBE_FAILED;
    use crate::store::OfflineRecord;
    use parking_lot::Mutex;
    use std::collections::{HashMap, HashSet};

    /// Prober answering from a fixed table; unknown URLs fail
    #[derive(Default)]
    pub struct FakeProber {
        codes: Mutex<HashMap<String, u16>>,
    }

    impl FakeProber {
        pub fn set(&self, url: &str, code: u16) {
            self.codes.lock().insert(url.to_string(), code);
        }
    }

    #[async_trait::async_trait]
    impl Prober for FakeProber {
        async fn probe(&self, url: &str) -> u16 {
            self.codes.lock().get(url).copied().unwrap_or(PROBE_FAILED)
        }
    }

    /// Notifier that records published messages
    #[derive(Default)]
    pub struct RecordingNotifier {
        pub messages: Mutex<Vec<String>>,
        pub fail: Mutex<bool>,
    }

    impl RecordingNotifier {
        pub fn take(&self) -> Vec<String> {
            std::mem::take(&mut *self.messages.lock())
        }
    }

    #[async_trait::async_trait]
    impl Notifier for RecordingNotifier {
        async fn publish(&self, message: &str) -> Result<(), NotifierError> {
            if *self.fail.lock() {
                return Err(NotifierError::Webhook("relay down".to_string()));
            }
            self.messages.lock().push(message.to_string());
            Ok(())
        }
    }

    /// Store wrapper that fails every operation on selected URLs and counts mutations
    #[derive(Default)]
    pub struct FlakyStore {
        pub inner: crate::store::MemoryStore,
        pub broken: Mutex<HashSet<String>>,
        pub mutations: Mutex<usize>,
    }

    impl FlakyStore {
        fn check(&self, url: &str) -> Result<(), StoreError> {
            if self.broken.lock().contains(url) {
                return Err(StoreError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "table unavailable",
                )));
            }
            Ok(())
        }
    }

    #[async_trait::async_trait]
    impl OfflineStore for FlakyStore {
        async fn get(&self, url: &str) -> Result<Option<OfflineRecord>, StoreError> {
            self.check(url)?;
            self.inner.get(url).await
        }

        async fn put(&self, url: &str, timestamp: i64) -> Result<(), StoreError> {
            self.check(url)?;
            *self.mutations.lock() += 1;
            self.inner.put(url, timestamp).await
        }

        async fn delete(&self, url: &str) -> Result<(), StoreError> {
            self.check(url)?;
            *self.mutations.lock() += 1;
            self.inner.delete(url).await
        }

        async fn list(&self) -> Result<Vec<OfflineRecord>, StoreError> {
            self.inner.list().await
        }
    }
}
