//! Orders module - domain models, state machine, services, and traits.

mod orders_model;
mod orders_service;
mod orders_traits;
pub mod transitions;


pub use orders_model::{
    ActorRole, NewOrder, Order, OrderFilter, OrderStatus, OrderStatusChange, PlacedOrder,
    TransitionRequest,
};
pub use orders_service::{OrderService, OrderServiceConfig};
pub use orders_traits::{OrderRepositoryTrait, OrderServiceTrait};
pub use transitions::{allowed_targets, plan_transition, TransitionNotice, TransitionRule};
