use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single email to deliver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body_text: String,
    pub body_html: Option<String>,
}

/// Subject and bodies of a notification, independent of its recipient.
///
/// Stored as JSON in the automation log so a failed attempt can be replayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub subject: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_body: Option<String>,
}

impl NotificationPayload {
    pub fn to_email(&self, target: &str) -> EmailMessage {
        EmailMessage {
            to: target.to_string(),
            subject: self.subject.clone(),
            body_text: self.body.clone(),
            body_html: self.html_body.clone(),
        }
    }
}

/// Why a notification could not be delivered.
///
/// The display strings end up in the automation log, where an operator reads
/// them before deciding to retry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotificationError {
    #[error("Mail transport is not configured ({0}); check mail credentials")]
    NotConfigured(String),

    #[error("Invalid email address '{0}'")]
    InvalidAddress(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Timed out after {}s waiting for the mail transport", .0.as_secs())]
    Timeout(Duration),
}

#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotificationError>;
}

/// Sender used when no transport credentials are available.
///
/// Every attempt fails with a configuration error so the automation log shows
/// the operator what to fix.
#[derive(Debug, Clone)]
pub struct UnconfiguredSender {
    reason: String,
}

impl UnconfiguredSender {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl NotificationSender for UnconfiguredSender {
    async fn send(&self, _message: &EmailMessage) -> Result<(), NotificationError> {
        Err(NotificationError::NotConfigured(self.reason.clone()))
    }
}

/// Mock sender for testing - records every attempt and fails on demand.
#[derive(Clone, Default)]
pub struct MockNotificationSender {
    sent: Arc<Mutex<Vec<EmailMessage>>>,
    failure: Arc<Mutex<Option<NotificationError>>>,
    delay: Arc<Mutex<Option<Duration>>>,
}

impl MockNotificationSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent sends fail with `error` until [`Self::succeed`] is called.
    pub fn fail_with(&self, error: NotificationError) {
        *self.failure.lock().unwrap_or_else(|e| e.into_inner()) = Some(error);
    }

    pub fn succeed(&self) {
        *self.failure.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    /// Delays every send, to exercise timeouts.
    pub fn delay_by(&self, delay: Duration) {
        *self.delay.lock().unwrap_or_else(|e| e.into_inner()) = Some(delay);
    }

    /// Returns all attempted messages, failed ones included.
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn len(&self) -> usize {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl NotificationSender for MockNotificationSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotificationError> {
        let delay = *self.delay.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(message.clone());
        match self
            .failure
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
        {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
