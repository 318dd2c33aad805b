//! Notification publishing for heartbeat alerts

use std::collections::HashMap;

use super::config::{NotifyTarget, TopicConfig};

/// Render the alert body sent for a transition
pub fn format_alert(url: &str, message: &str) -> String {
    format!("===== Heartbeat Alert =====\nURL: {}\n{}", url, message)
}

/// Publishes alert messages
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn publish(&self, message: &str) -> Result<(), NotifierError>;
}

/// Notifier that fans each message out to every target of a topic
pub struct TopicNotifier {
    client: reqwest::Client,
    topic: TopicConfig,
}

impl TopicNotifier {
    pub fn new(topic: TopicConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            topic,
        }
    }

    /// Send a message to a single target
    async fn notify_target(&self, target: &NotifyTarget, message: &str) -> Result<(), NotifierError> {
        match target {
            NotifyTarget::Log => {
                tracing::warn!(topic = %self.topic.name, "Heartbeat alert:\n{}", message);
                Ok(())
            }
            NotifyTarget::Webhook { url, headers } => self.send_webhook(url, headers, message).await,
        }
    }

    async fn send_webhook(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
        message: &str,
    ) -> Result<(), NotifierError> {
        let payload = serde_json::json!({
            "topic": self.topic.name,
            "subject": "Heartbeat Alert",
            "message": message,
            "email": self.topic.email,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        let mut request = self.client.post(url).json(&payload);

        for (key, value) in headers {
            request = request.header(key, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| NotifierError::Webhook(format!("Failed to send webhook: {}", e)))?;

        if !response.status().is_success() {
            return Err(NotifierError::Webhook(format!(
                "Webhook returned status {}",
                response.status()
            )));
        }

        tracing::debug!(topic = %self.topic.name, url = %url, "Webhook notification sent");

        Ok(())
    }
}

#[async_trait::async_trait]
impl Notifier for TopicNotifier {
    async fn publish(&self, message: &str) -> Result<(), NotifierError> {
        let sends = self
            .topic
            .targets
            .iter()
            .map(|target| self.notify_target(target, message));

        let errors: Vec<NotifierError> = futures::future::join_all(sends)
            .await
            .into_iter()
            .filter_map(Result::err)
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(NotifierError::Multiple(errors))
        }
    }
}

/// Notifier errors
#[derive(Debug, thiserror::Error)]
pub enum NotifierError {
    #[error("Webhook error: {0}")]
    Webhook(String),

    #[error("Multiple notification failures: {0:?}")]
    Multiple(Vec<NotifierError>),
}
