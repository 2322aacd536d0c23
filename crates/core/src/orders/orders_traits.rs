use crate::errors::Result;
use crate::orders::{
    NewOrder, Order, OrderFilter, OrderStatusChange, PlacedOrder, TransitionRequest,
};
use async_trait::async_trait;
use chrono::NaiveDateTime;

/// Trait for order repository operations
#[async_trait]
pub trait OrderRepositoryTrait: Send + Sync {
    fn get_order(&self, order_id: i64) -> Result<Option<Order>>;
    fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>>;

    /// Holds the book and inserts the order atomically.
    ///
    /// Returns `None` when the book is no longer available.
    async fn insert_order(&self, placed: PlacedOrder) -> Result<Option<Order>>;

    /// Applies `change` only while the order is still in `change.from`.
    ///
    /// Returns `None` when another writer moved the order first; nothing is
    /// written in that case.
    async fn apply_status_change(
        &self,
        order_id: i64,
        book_id: i64,
        change: OrderStatusChange,
    ) -> Result<Option<Order>>;

    async fn delete_order(&self, order_id: i64) -> Result<usize>;

    /// Selects every order due for a follow-up and stamps it with `now` in
    /// one atomic statement.
    ///
    /// Due means confirmed, not completed, `follow_up_start_time <= now` and
    /// never followed up or last followed up before `cooldown_cutoff`.
    async fn claim_due_follow_ups(
        &self,
        now: NaiveDateTime,
        cooldown_cutoff: NaiveDateTime,
    ) -> Result<Vec<Order>>;
}

/// Trait for order service operations
#[async_trait]
pub trait OrderServiceTrait: Send + Sync {
    fn get_order(&self, order_id: i64) -> Result<Order>;
    fn list_orders(&self, filter: OrderFilter) -> Result<Vec<Order>>;
    async fn place_order(&self, new_order: NewOrder) -> Result<Order>;
    async fn transition(&self, request: TransitionRequest) -> Result<Order>;
    async fn delete_order(&self, order_id: i64, buyer_id: i64) -> Result<()>;
}
