//! Automation log domain models.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::notifications::NotificationPayload;

/// Channel of an automated notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AutomationLogType {
    Email,
    Message,
}

impl AutomationLogType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AutomationLogType::Email => "EMAIL",
            AutomationLogType::Message => "MESSAGE",
        }
    }
}

impl FromStr for AutomationLogType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "EMAIL" => Ok(AutomationLogType::Email),
            "MESSAGE" => Ok(AutomationLogType::Message),
            _ => Err(format!("Unknown automation log type: {}", s)),
        }
    }
}

impl fmt::Display for AutomationLogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivery state of a log row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AutomationLogStatus {
    Pending,
    Success,
    Failed,
}

impl AutomationLogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AutomationLogStatus::Pending => "PENDING",
            AutomationLogStatus::Success => "SUCCESS",
            AutomationLogStatus::Failed => "FAILED",
        }
    }
}

impl FromStr for AutomationLogStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(AutomationLogStatus::Pending),
            "SUCCESS" => Ok(AutomationLogStatus::Success),
            "FAILED" => Ok(AutomationLogStatus::Failed),
            _ => Err(format!("Unknown automation log status: {}", s)),
        }
    }
}

impl fmt::Display for AutomationLogStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audit row for one attempted outbound notification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AutomationLog {
    pub id: i64,
    #[serde(rename = "type")]
    pub log_type: AutomationLogType,
    pub target: String,
    pub status: AutomationLogStatus,
    pub payload: NotificationPayload,
    pub error: Option<String>,
    pub retry_count: i32,
    pub order_id: Option<i64>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl AutomationLog {
    pub fn is_retryable(&self) -> bool {
        self.log_type == AutomationLogType::Email && self.status != AutomationLogStatus::Success
    }
}

/// Input model for a new log row
#[derive(Debug, Clone, PartialEq)]
pub struct NewAutomationLog {
    pub log_type: AutomationLogType,
    pub target: String,
    pub status: AutomationLogStatus,
    pub payload: NotificationPayload,
    pub order_id: Option<i64>,
}

/// Result of a delivery attempt, applied to an existing row.
#[derive(Debug, Clone, PartialEq)]
pub struct LogOutcome {
    pub status: AutomationLogStatus,
    pub error: Option<String>,
    pub count_retry: bool,
}

/// A notification the workflow wants delivered and audited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequest {
    #[serde(rename = "type")]
    pub log_type: AutomationLogType,
    pub target: String,
    pub payload: NotificationPayload,
    pub order_id: Option<i64>,
}

impl NotificationRequest {
    pub fn email(target: impl Into<String>, payload: NotificationPayload, order_id: i64) -> Self {
        Self {
            log_type: AutomationLogType::Email,
            target: target.into(),
            payload,
            order_id: Some(order_id),
        }
    }
}
