//! URL probing and online/offline classification

pub mod http;

pub use http::HttpProber;

use serde::{Deserialize, Serialize};

/// Status code reported when a probe could not get any response
pub const PROBE_FAILED: u16 = 0;

/// First status code classified as offline
pub const OFFLINE_STATUS_CODE: u16 = 400;

/// Issues a single check against a URL
#[async_trait::async_trait]
pub trait Prober: Send + Sync {
    /// Return the response status code, or [`PROBE_FAILED`] if the request failed outright
    async fn probe(&self, url: &str) -> u16;
}

/// Online/offline state derived from a probe outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Online,
    Offline,
}

impl Classification {
    pub fn is_online(self) -> bool {
        matches!(self, Classification::Online)
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Classification::Online => write!(f, "online"),
            Classification::Offline => write!(f, "offline"),
        }
    }
}

/// Classify a probe outcome
pub fn classify(status_code: u16) -> Classification {
    if status_code == PROBE_FAILED || status_code >= OFFLINE_STATUS_CODE {
        Classification::Offline
    } else {
        Classification::Online
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(classify(399), Classification::Online);
        assert_eq!(classify(400), Classification::Offline);
        assert_eq!(classify(PROBE_FAILED), Classification::Offline);
    }

    #[test]
    fn test_classify_ranges() {
        for code in [100, 101, 200, 204, 301, 302, 304] {
            assert!(classify(code).is_online(), "{} should be online", code);
        }
        for code in [401, 404, 429, 500, 502, 503, 599] {
            assert!(!classify(code).is_online(), "{} should be offline", code);
        }
    }

    #[test]
    fn test_classification_display() {
        assert_eq!(Classification::Online.to_string(), "online");
        assert_eq!(Classification::Offline.to_string(), "offline");
    }
}
