//! Follow-ups module - scheduled check-ins asking buyers to confirm delivery.

mod followups_service;


pub use followups_service::{FollowUpConfig, FollowUpReport, FollowUpService, FollowUpServiceTrait};
