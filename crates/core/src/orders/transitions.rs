//! Order status state machine.
//!
//! [`TRANSITIONS`] is the single table of legal `(role, from, to)` moves and
//! the side effects attached to each. Everything else asks [`plan_transition`].

use crate::books::BookEffect;
use crate::errors::{Error, Result};
use crate::orders::{ActorRole, OrderStatus};

/// Notifications fired after a transition commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionNotice {
    Silent,
    /// Contact exchange between buyer and seller, by message and email.
    Confirmed,
    /// Final messages and emails to buyer and seller.
    Delivered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRule {
    pub role: ActorRole,
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub book_effect: BookEffect,
    pub completes: bool,
    pub schedules_follow_up: bool,
    pub notice: TransitionNotice,
}

const fn rule(
    role: ActorRole,
    from: OrderStatus,
    to: OrderStatus,
    book_effect: BookEffect,
    notice: TransitionNotice,
) -> TransitionRule {
    let completes = matches!(notice, TransitionNotice::Delivered);
    let schedules_follow_up = matches!(notice, TransitionNotice::Confirmed);
    TransitionRule {
        role,
        from,
        to,
        book_effect,
        completes,
        schedules_follow_up,
        notice,
    }
}

use crate::orders::ActorRole::{Admin, Buyer, Seller};
use crate::orders::OrderStatus::{Accepted, Cancelled, Confirmed, Delivered, Pending, Rejected};

pub const TRANSITIONS: &[TransitionRule] = &[
    rule(Buyer, Pending, Cancelled, BookEffect::Release, TransitionNotice::Silent),
    rule(Seller, Pending, Accepted, BookEffect::Unchanged, TransitionNotice::Silent),
    rule(Seller, Pending, Rejected, BookEffect::Release, TransitionNotice::Silent),
    rule(Admin, Pending, Confirmed, BookEffect::MarkSold, TransitionNotice::Confirmed),
    rule(Admin, Accepted, Confirmed, BookEffect::MarkSold, TransitionNotice::Confirmed),
    rule(Buyer, Accepted, Delivered, BookEffect::Archive, TransitionNotice::Delivered),
    rule(Buyer, Confirmed, Delivered, BookEffect::Archive, TransitionNotice::Delivered),
    rule(Admin, Accepted, Delivered, BookEffect::Archive, TransitionNotice::Delivered),
    rule(Admin, Confirmed, Delivered, BookEffect::Archive, TransitionNotice::Delivered),
];

/// Looks up the rule for a requested move, or fails with `InvalidTransition`.
pub fn plan_transition(role: ActorRole, from: OrderStatus, to: OrderStatus) -> Result<TransitionRule> {
    TRANSITIONS
        .iter()
        .find(|r| r.role == role && r.from == from && r.to == to)
        .copied()
        .ok_or(Error::InvalidTransition { from, to })
}

/// Statuses `role` may move an order to from `from`.
pub fn allowed_targets(role: ActorRole, from: OrderStatus) -> Vec<OrderStatus> {
    TRANSITIONS
        .iter()
        .filter(|r| r.role == role && r.from == from)
        .map(|r| r.to)
        .collect()
}
