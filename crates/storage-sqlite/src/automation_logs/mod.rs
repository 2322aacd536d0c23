//! SQLite storage implementation for the notification audit log.

mod model;
mod repository;

pub use model::{AutomationLogDB, NewAutomationLogDB};
pub use repository::AutomationLogRepository;
