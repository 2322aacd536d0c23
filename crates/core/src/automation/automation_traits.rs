use crate::automation::{
    AutomationLog, AutomationLogStatus, LogOutcome, NewAutomationLog, NotificationRequest,
};
use crate::errors::Result;
use async_trait::async_trait;

/// Trait for automation log repository operations
#[async_trait]
pub trait AutomationLogRepositoryTrait: Send + Sync {
    fn get_log(&self, log_id: i64) -> Result<Option<AutomationLog>>;
    /// Newest first, optionally restricted to one status.
    fn list_logs(
        &self,
        status: Option<AutomationLogStatus>,
        limit: i64,
    ) -> Result<Vec<AutomationLog>>;
    fn list_logs_for_order(&self, order_id: i64) -> Result<Vec<AutomationLog>>;
    async fn insert_log(&self, new_log: NewAutomationLog) -> Result<AutomationLog>;
    /// Overwrites status and error of an existing row, optionally counting a retry.
    async fn settle_log(&self, log_id: i64, outcome: LogOutcome) -> Result<AutomationLog>;
}

/// Trait for automation service operations
#[async_trait]
pub trait AutomationServiceTrait: Send + Sync {
    /// Attempts a notification and records exactly one log row for it.
    ///
    /// Delivery failures are recorded on the row, not returned as errors.
    async fn record(&self, request: NotificationRequest) -> Result<AutomationLog>;
    /// Re-sends the stored payload of an EMAIL row, updating the same row.
    async fn retry(&self, log_id: i64) -> Result<AutomationLog>;
    fn get_log(&self, log_id: i64) -> Result<AutomationLog>;
    fn list_logs(
        &self,
        status: Option<AutomationLogStatus>,
        limit: Option<i64>,
    ) -> Result<Vec<AutomationLog>>;
    fn list_logs_for_order(&self, order_id: i64) -> Result<Vec<AutomationLog>>;
}
