//! Automation log - audit trail of outbound notifications with manual retry.

mod automation_model;
mod automation_service;
mod automation_traits;


pub use automation_model::{
    AutomationLog, AutomationLogStatus, AutomationLogType, LogOutcome, NewAutomationLog,
    NotificationRequest,
};
pub use automation_service::AutomationService;
pub use automation_traits::{AutomationLogRepositoryTrait, AutomationServiceTrait};
