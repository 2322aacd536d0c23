//! Database models for automation log rows.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use bookloop_core::automation::{AutomationLog, NewAutomationLog};

use crate::errors::StorageError;
use crate::utils::parse_column;

#[derive(Queryable, Identifiable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::automation_logs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AutomationLogDB {
    pub id: i64,
    pub log_type: String,
    pub target: String,
    pub status: String,
    /// JSON-encoded `NotificationPayload`
    pub payload: String,
    pub error: Option<String>,
    pub retry_count: i32,
    pub order_id: Option<i64>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::automation_logs)]
pub struct NewAutomationLogDB {
    pub log_type: String,
    pub target: String,
    pub status: String,
    pub payload: String,
    pub retry_count: i32,
    pub order_id: Option<i64>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<AutomationLogDB> for AutomationLog {
    type Error = StorageError;

    fn try_from(db: AutomationLogDB) -> Result<Self, Self::Error> {
        let payload = serde_json::from_str(&db.payload).map_err(|e| {
            StorageError::Corrupt(format!("automation_logs.payload of row {}: {}", db.id, e))
        })?;
        Ok(Self {
            log_type: parse_column(&db.log_type, "automation_logs.log_type")?,
            status: parse_column(&db.status, "automation_logs.status")?,
            payload,
            id: db.id,
            target: db.target,
            error: db.error,
            retry_count: db.retry_count,
            order_id: db.order_id,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

impl NewAutomationLogDB {
    pub fn new(log: NewAutomationLog, now: NaiveDateTime) -> Result<Self, StorageError> {
        let payload = serde_json::to_string(&log.payload)
            .map_err(|e| StorageError::Corrupt(format!("notification payload: {}", e)))?;
        Ok(Self {
            log_type: log.log_type.as_str().to_string(),
            target: log.target,
            status: log.status.as_str().to_string(),
            payload,
            retry_count: 0,
            order_id: log.order_id,
            created_at: now,
            updated_at: now,
        })
    }
}
