//! SQLite storage implementation for orders.

mod model;
mod repository;

pub use model::{NewOrderDB, OrderDB, OrderStatusChangeDB};
pub use repository::OrderRepository;
