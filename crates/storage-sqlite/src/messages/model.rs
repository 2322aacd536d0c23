//! Database models for in-app messages.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use bookloop_core::messages::{Message, NewMessage};

#[derive(Queryable, Identifiable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::messages)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MessageDB {
    pub id: i64,
    pub sender_id: Option<i64>,
    pub receiver_id: i64,
    pub order_id: Option<i64>,
    pub content: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::messages)]
pub struct NewMessageDB {
    pub sender_id: Option<i64>,
    pub receiver_id: i64,
    pub order_id: Option<i64>,
    pub content: String,
    pub created_at: NaiveDateTime,
}

impl From<MessageDB> for Message {
    fn from(db: MessageDB) -> Self {
        Self {
            id: db.id,
            sender_id: db.sender_id,
            receiver_id: db.receiver_id,
            order_id: db.order_id,
            content: db.content,
            created_at: db.created_at,
        }
    }
}

impl NewMessageDB {
    pub fn new(message: NewMessage, created_at: NaiveDateTime) -> Self {
        Self {
            sender_id: message.sender_id,
            receiver_id: message.receiver_id,
            order_id: message.order_id,
            content: message.content,
            created_at,
        }
    }
}
