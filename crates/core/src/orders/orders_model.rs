//! Order domain models.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::books::BookEffect;

/// Canonical order status shared by every transition path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
    Confirmed,
    Delivered,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Accepted => "accepted",
            OrderStatus::Rejected => "rejected",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Delivered => "delivered",
        }
    }

    /// No transition leaves a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Rejected | OrderStatus::Cancelled | OrderStatus::Delivered
        )
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "accepted" => Ok(OrderStatus::Accepted),
            "rejected" => Ok(OrderStatus::Rejected),
            "cancelled" | "canceled" => Ok(OrderStatus::Cancelled),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "delivered" => Ok(OrderStatus::Delivered),
            _ => Err(format!("Unknown order status: {}", s)),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role under which an actor requests a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Buyer,
    Seller,
    Admin,
}

impl ActorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorRole::Buyer => "buyer",
            ActorRole::Seller => "seller",
            ActorRole::Admin => "admin",
        }
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain model representing an order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub buyer_id: i64,
    pub book_id: i64,
    pub status: OrderStatus,
    pub total_amount: Decimal,
    pub remarks: Option<String>,
    pub admin_note: Option<String>,
    pub follow_up_start_time: Option<NaiveDateTime>,
    pub last_follow_up_sent_at: Option<NaiveDateTime>,
    pub is_completed: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Checkout input from a buyer
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub buyer_id: i64,
    pub book_id: i64,
    pub remarks: Option<String>,
}

/// A validated checkout handed to the repository.
///
/// The repository holds the book and inserts the order in one transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedOrder {
    pub buyer_id: i64,
    pub book_id: i64,
    pub total_amount: Decimal,
    pub remarks: Option<String>,
    pub placed_at: NaiveDateTime,
}

/// Transition request as received from a buyer, seller or admin.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TransitionRequest {
    pub order_id: i64,
    pub requested_status: OrderStatus,
    pub actor_role: ActorRole,
    pub actor_id: i64,
    #[serde(default)]
    pub admin_note: Option<String>,
}

/// Compare-and-set write applied atomically by the repository.
///
/// The order row is only updated while its status still equals `from`; the
/// book effect is applied in the same transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderStatusChange {
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub book_effect: BookEffect,
    pub complete: bool,
    pub follow_up_start_time: Option<NaiveDateTime>,
    pub admin_note: Option<String>,
    pub changed_at: NaiveDateTime,
}

/// Dashboard filter; all criteria are optional and combined with AND.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct OrderFilter {
    pub buyer_id: Option<i64>,
    pub seller_id: Option<i64>,
    pub status: Option<OrderStatus>,
}
