//! Book domain models.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Availability of a listed book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookStatus {
    Available,
    OnHold,
    Sold,
}

impl BookStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Available => "available",
            BookStatus::OnHold => "on_hold",
            BookStatus::Sold => "sold",
        }
    }
}

impl FromStr for BookStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "available" => Ok(BookStatus::Available),
            "on_hold" | "on-hold" => Ok(BookStatus::OnHold),
            "sold" => Ok(BookStatus::Sold),
            _ => Err(format!("Unknown book status: {}", s)),
        }
    }
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain model representing a listed book
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i64,
    pub seller_id: i64,
    pub title: String,
    pub author: Option<String>,
    pub price: Decimal,
    pub status: BookStatus,
    pub is_archived: bool,
}

impl Book {
    /// Whether the book belongs to the public listing of purchasable books.
    pub fn is_listed(&self) -> bool {
        self.status == BookStatus::Available && !self.is_archived
    }
}

/// Input model for listing a new book
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    pub seller_id: i64,
    pub title: String,
    pub author: Option<String>,
    pub price: Decimal,
}

/// Change applied to the ordered book together with an order status write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookEffect {
    Unchanged,
    Release,
    MarkSold,
    /// Sold and removed from the listing; the row is kept for order history.
    Archive,
}

impl BookEffect {
    /// Resulting `(status, is_archived)` pair, or `None` when the book is untouched.
    pub fn target_state(&self) -> Option<(BookStatus, bool)> {
        match self {
            BookEffect::Unchanged => None,
            BookEffect::Release => Some((BookStatus::Available, false)),
            BookEffect::MarkSold => Some((BookStatus::Sold, false)),
            BookEffect::Archive => Some((BookStatus::Sold, true)),
        }
    }
}
