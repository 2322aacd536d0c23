//! Database models for orders.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use bookloop_core::orders::{Order, OrderStatus, OrderStatusChange, PlacedOrder};

use crate::errors::StorageError;
use crate::utils::{parse_amount, parse_column};

#[derive(Queryable, Identifiable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::orders)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OrderDB {
    pub id: i64,
    pub buyer_id: i64,
    pub book_id: i64,
    pub status: String,
    pub total_amount: String,
    pub remarks: Option<String>,
    pub admin_note: Option<String>,
    pub follow_up_start_time: Option<NaiveDateTime>,
    pub last_follow_up_sent_at: Option<NaiveDateTime>,
    pub is_completed: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::orders)]
pub struct NewOrderDB {
    pub buyer_id: i64,
    pub book_id: i64,
    pub status: String,
    pub total_amount: String,
    pub remarks: Option<String>,
    pub is_completed: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Columns touched by a status transition. `None` leaves a column as is.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::orders)]
pub struct OrderStatusChangeDB {
    pub status: String,
    pub is_completed: Option<bool>,
    pub follow_up_start_time: Option<Option<NaiveDateTime>>,
    pub admin_note: Option<Option<String>>,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<OrderDB> for Order {
    type Error = StorageError;

    fn try_from(db: OrderDB) -> Result<Self, Self::Error> {
        Ok(Self {
            status: parse_column(&db.status, "orders.status")?,
            total_amount: parse_amount(&db.total_amount, "orders.total_amount")?,
            id: db.id,
            buyer_id: db.buyer_id,
            book_id: db.book_id,
            remarks: db.remarks,
            admin_note: db.admin_note,
            follow_up_start_time: db.follow_up_start_time,
            last_follow_up_sent_at: db.last_follow_up_sent_at,
            is_completed: db.is_completed,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

impl From<PlacedOrder> for NewOrderDB {
    fn from(placed: PlacedOrder) -> Self {
        Self {
            buyer_id: placed.buyer_id,
            book_id: placed.book_id,
            status: OrderStatus::Pending.as_str().to_string(),
            total_amount: placed.total_amount.to_string(),
            remarks: placed.remarks,
            is_completed: false,
            created_at: placed.placed_at,
            updated_at: placed.placed_at,
        }
    }
}

impl From<&OrderStatusChange> for OrderStatusChangeDB {
    fn from(change: &OrderStatusChange) -> Self {
        // A freshly scheduled follow-up re-opens the order for the scheduler.
        let is_completed = if change.complete {
            Some(true)
        } else if change.follow_up_start_time.is_some() {
            Some(false)
        } else {
            None
        };
        Self {
            status: change.to.as_str().to_string(),
            is_completed,
            follow_up_start_time: change.follow_up_start_time.map(Some),
            admin_note: change.admin_note.clone().map(Some),
            updated_at: change.changed_at,
        }
    }
}
