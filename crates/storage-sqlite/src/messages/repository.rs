use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;

use bookloop_core::messages::{Message, MessageRepositoryTrait, NewMessage};
use bookloop_core::Result;

use super::model::{MessageDB, NewMessageDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::messages;

pub struct MessageRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl MessageRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        MessageRepository { pool, writer }
    }
}

#[async_trait]
impl MessageRepositoryTrait for MessageRepository {
    async fn create_message(&self, new_message: NewMessage) -> Result<Message> {
        let row = NewMessageDB::new(new_message, Utc::now().naive_utc());
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Message> {
                let message = diesel::insert_into(messages::table)
                    .values(&row)
                    .returning(MessageDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(Message::from(message))
            })
            .await
    }

    fn list_messages_for_user(&self, user_id: i64) -> Result<Vec<Message>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = messages::table
            .filter(messages::receiver_id.eq(user_id))
            .order((messages::created_at.desc(), messages::id.desc()))
            .select(MessageDB::as_select())
            .load::<MessageDB>(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(Message::from).collect())
    }

    fn list_messages_for_order(&self, order_id: i64) -> Result<Vec<Message>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = messages::table
            .filter(messages::order_id.eq(order_id))
            .order(messages::id.asc())
            .select(MessageDB::as_select())
            .load::<MessageDB>(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(Message::from).collect())
    }
}
