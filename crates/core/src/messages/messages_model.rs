use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: i64,
    /// `None` for messages generated by the automation itself.
    pub sender_id: Option<i64>,
    pub receiver_id: i64,
    pub order_id: Option<i64>,
    pub content: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewMessage {
    pub sender_id: Option<i64>,
    pub receiver_id: i64,
    pub order_id: Option<i64>,
    pub content: String,
}

impl NewMessage {
    pub fn system(receiver_id: i64, order_id: i64, content: impl Into<String>) -> Self {
        Self {
            sender_id: None,
            receiver_id,
            order_id: Some(order_id),
            content: content.into(),
        }
    }
}
