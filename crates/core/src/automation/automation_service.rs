use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};

use super::automation_model::{
    AutomationLog, AutomationLogStatus, AutomationLogType, LogOutcome, NewAutomationLog,
    NotificationRequest,
};
use super::automation_traits::{AutomationLogRepositoryTrait, AutomationServiceTrait};
use crate::constants::{DEFAULT_LOG_PAGE_SIZE, DEFAULT_NOTIFICATION_TIMEOUT_SECS};
use crate::errors::{Error, Result};
use crate::notifications::{NotificationError, NotificationPayload, NotificationSender};

pub struct AutomationService {
    log_repository: Arc<dyn AutomationLogRepositoryTrait>,
    sender: Arc<dyn NotificationSender>,
    send_timeout: Duration,
}

impl AutomationService {
    pub fn new(
        log_repository: Arc<dyn AutomationLogRepositoryTrait>,
        sender: Arc<dyn NotificationSender>,
    ) -> Self {
        AutomationService {
            log_repository,
            sender,
            send_timeout: Duration::from_secs(DEFAULT_NOTIFICATION_TIMEOUT_SECS),
        }
    }

    pub fn with_send_timeout(mut self, send_timeout: Duration) -> Self {
        self.send_timeout = send_timeout;
        self
    }

    /// One bounded delivery attempt; a timeout counts as a failure.
    async fn attempt(
        &self,
        target: &str,
        payload: &NotificationPayload,
    ) -> std::result::Result<(), NotificationError> {
        let email = payload.to_email(target);
        match tokio::time::timeout(self.send_timeout, self.sender.send(&email)).await {
            Ok(result) => result,
            Err(_) => Err(NotificationError::Timeout(self.send_timeout)),
        }
    }

    fn outcome(result: &std::result::Result<(), NotificationError>, count_retry: bool) -> LogOutcome {
        match result {
            Ok(()) => LogOutcome {
                status: AutomationLogStatus::Success,
                error: None,
                count_retry,
            },
            Err(e) => LogOutcome {
                status: AutomationLogStatus::Failed,
                error: Some(e.to_string()),
                count_retry,
            },
        }
    }
}

#[async_trait]
impl AutomationServiceTrait for AutomationService {
    async fn record(&self, request: NotificationRequest) -> Result<AutomationLog> {
        if request.log_type != AutomationLogType::Email {
            return Err(Error::UnsupportedLogType(request.log_type.to_string()));
        }

        let log = self
            .log_repository
            .insert_log(NewAutomationLog {
                log_type: request.log_type,
                target: request.target.clone(),
                status: AutomationLogStatus::Pending,
                payload: request.payload.clone(),
                order_id: request.order_id,
            })
            .await?;

        let result = self.attempt(&request.target, &request.payload).await;
        if let Err(e) = &result {
            warn!(
                "Notification {} to {} failed: {}",
                log.id, request.target, e
            );
        } else {
            debug!("Notification {} delivered to {}", log.id, request.target);
        }

        self.log_repository
            .settle_log(log.id, Self::outcome(&result, false))
            .await
    }

    async fn retry(&self, log_id: i64) -> Result<AutomationLog> {
        let log = self.get_log(log_id)?;
        if log.log_type != AutomationLogType::Email {
            return Err(Error::UnsupportedLogType(format!(
                "{} rows cannot be retried",
                log.log_type
            )));
        }

        let result = self.attempt(&log.target, &log.payload).await;
        let updated = self
            .log_repository
            .settle_log(log.id, Self::outcome(&result, true))
            .await?;

        match result {
            Ok(()) => Ok(updated),
            Err(e) => {
                warn!(
                    "Retry {} of notification {} failed: {}",
                    updated.retry_count, log.id, e
                );
                Err(Error::Notification(e.to_string()))
            }
        }
    }

    fn get_log(&self, log_id: i64) -> Result<AutomationLog> {
        self.log_repository
            .get_log(log_id)?
            .ok_or_else(|| Error::not_found(format!("Automation log {}", log_id)))
    }

    fn list_logs(
        &self,
        status: Option<AutomationLogStatus>,
        limit: Option<i64>,
    ) -> Result<Vec<AutomationLog>> {
        let limit = limit
            .filter(|l| *l > 0)
            .unwrap_or(DEFAULT_LOG_PAGE_SIZE);
        self.log_repository.list_logs(status, limit)
    }

    /// Oldest first, so the notification history of an order reads in order.
    fn list_logs_for_order(&self, order_id: i64) -> Result<Vec<AutomationLog>> {
        self.log_repository.list_logs_for_order(order_id)
    }
}
