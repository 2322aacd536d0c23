//! Users module - the minimal view of marketplace members the order workflow needs.

mod users_model;
mod users_traits;

pub use users_model::{NewUser, User};
pub use users_traits::UserRepositoryTrait;
