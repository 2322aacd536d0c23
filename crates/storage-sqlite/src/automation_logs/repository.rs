use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;

use bookloop_core::automation::{
    AutomationLog, AutomationLogRepositoryTrait, AutomationLogStatus, LogOutcome,
    NewAutomationLog,
};
use bookloop_core::errors::Error;
use bookloop_core::Result;

use super::model::{AutomationLogDB, NewAutomationLogDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::automation_logs;

pub struct AutomationLogRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl AutomationLogRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        AutomationLogRepository { pool, writer }
    }
}

fn to_logs(rows: Vec<AutomationLogDB>) -> Result<Vec<AutomationLog>> {
    rows.into_iter()
        .map(|row| AutomationLog::try_from(row).map_err(Into::into))
        .collect()
}

#[async_trait]
impl AutomationLogRepositoryTrait for AutomationLogRepository {
    fn get_log(&self, log_id: i64) -> Result<Option<AutomationLog>> {
        let mut conn = get_connection(&self.pool)?;
        let row = automation_logs::table
            .find(log_id)
            .select(AutomationLogDB::as_select())
            .first::<AutomationLogDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(AutomationLog::try_from).transpose()?)
    }

    fn list_logs(
        &self,
        status: Option<AutomationLogStatus>,
        limit: i64,
    ) -> Result<Vec<AutomationLog>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = automation_logs::table
            .select(AutomationLogDB::as_select())
            .into_boxed();
        if let Some(status) = status {
            query = query.filter(automation_logs::status.eq(status.as_str()));
        }
        let rows = query
            .order(automation_logs::id.desc())
            .limit(limit)
            .load::<AutomationLogDB>(&mut conn)
            .map_err(StorageError::from)?;
        to_logs(rows)
    }

    fn list_logs_for_order(&self, order_id: i64) -> Result<Vec<AutomationLog>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = automation_logs::table
            .filter(automation_logs::order_id.eq(order_id))
            .order(automation_logs::id.asc())
            .select(AutomationLogDB::as_select())
            .load::<AutomationLogDB>(&mut conn)
            .map_err(StorageError::from)?;
        to_logs(rows)
    }

    async fn insert_log(&self, new_log: NewAutomationLog) -> Result<AutomationLog> {
        let row = NewAutomationLogDB::new(new_log, Utc::now().naive_utc())?;
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<AutomationLog> {
                let log = diesel::insert_into(automation_logs::table)
                    .values(&row)
                    .returning(AutomationLogDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(AutomationLog::try_from(log)?)
            })
            .await
    }

    async fn settle_log(&self, log_id: i64, outcome: LogOutcome) -> Result<AutomationLog> {
        let now = Utc::now().naive_utc();
        let increment = i32::from(outcome.count_retry);
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<AutomationLog> {
                let log = diesel::update(automation_logs::table.find(log_id))
                    .set((
                        automation_logs::status.eq(outcome.status.as_str()),
                        automation_logs::error.eq(outcome.error),
                        automation_logs::retry_count.eq(automation_logs::retry_count + increment),
                        automation_logs::updated_at.eq(now),
                    ))
                    .returning(AutomationLogDB::as_returning())
                    .get_result(conn)
                    .optional()
                    .map_err(StorageError::from)?
                    .ok_or_else(|| Error::not_found(format!("Automation log {}", log_id)))?;
                Ok(AutomationLog::try_from(log)?)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, init, run_migrations, spawn_writer};
    use bookloop_core::automation::AutomationLogType;
    use bookloop_core::notifications::NotificationPayload;
    use tempfile::TempDir;

    async fn repository() -> (TempDir, AutomationLogRepository) {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("bookloop.db");
        let db_path = init(db_path.to_str().unwrap()).unwrap();
        let pool = create_pool(&db_path).unwrap();
        run_migrations(&pool).unwrap();
        let writer = spawn_writer(pool.as_ref().clone());
        (dir, AutomationLogRepository::new(pool, writer))
    }

    fn new_log(target: &str) -> NewAutomationLog {
        NewAutomationLog {
            log_type: AutomationLogType::Email,
            target: target.to_string(),
            status: AutomationLogStatus::Pending,
            payload: NotificationPayload {
                subject: "Order #1 confirmed".to_string(),
                body: "Hello".to_string(),
                html_body: Some("<p>Hello</p>".to_string()),
            },
            order_id: None,
        }
    }

    #[tokio::test]
    async fn test_payload_is_stored_and_retries_are_counted() {
        let (_dir, repo) = repository().await;
        let log = repo.insert_log(new_log("amy@example.com")).await.unwrap();
        assert_eq!(log.status, AutomationLogStatus::Pending);
        assert_eq!(log.payload.html_body.as_deref(), Some("<p>Hello</p>"));

        let failed = repo
            .settle_log(
                log.id,
                LogOutcome {
                    status: AutomationLogStatus::Failed,
                    error: Some("Transport error: refused".to_string()),
                    count_retry: false,
                },
            )
            .await
            .unwrap();
        assert_eq!(failed.retry_count, 0);
        assert_eq!(failed.error.as_deref(), Some("Transport error: refused"));

        let retried = repo
            .settle_log(
                log.id,
                LogOutcome {
                    status: AutomationLogStatus::Success,
                    error: None,
                    count_retry: true,
                },
            )
            .await
            .unwrap();
        assert_eq!(retried.retry_count, 1);
        assert!(retried.error.is_none());
        assert_eq!(retried.status, AutomationLogStatus::Success);
    }

    #[tokio::test]
    async fn test_settle_unknown_log_is_not_found() {
        let (_dir, repo) = repository().await;
        let result = repo
            .settle_log(
                77,
                LogOutcome {
                    status: AutomationLogStatus::Success,
                    error: None,
                    count_retry: true,
                },
            )
            .await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_logs_newest_first_with_status_filter() {
        let (_dir, repo) = repository().await;
        let first = repo.insert_log(new_log("amy@example.com")).await.unwrap();
        repo.insert_log(new_log("sam@example.com")).await.unwrap();
        repo.settle_log(
            first.id,
            LogOutcome {
                status: AutomationLogStatus::Failed,
                error: Some("boom".to_string()),
                count_retry: false,
            },
        )
        .await
        .unwrap();

        let all = repo.list_logs(None, 10).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].target, "sam@example.com");

        let failed = repo
            .list_logs(Some(AutomationLogStatus::Failed), 10)
            .unwrap();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].id, first.id);

        assert_eq!(repo.list_logs(None, 1).unwrap().len(), 1);
    }
}
