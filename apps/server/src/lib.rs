pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod mailer;
mod main_lib;
pub mod scheduler;

pub use main_lib::{build_state, build_state_with_sender, init_tracing, AppState};
