use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use log::{info, warn};

use super::orders_model::{
    ActorRole, NewOrder, Order, OrderFilter, OrderStatusChange, PlacedOrder, TransitionRequest,
};
use super::orders_traits::{OrderRepositoryTrait, OrderServiceTrait};
use super::transitions::{plan_transition, TransitionNotice};
use crate::automation::{AutomationServiceTrait, NotificationRequest};
use crate::books::{Book, BookRepositoryTrait};
use crate::constants::DEFAULT_FOLLOW_UP_DELAY_SECS;
use crate::errors::{Error, Result, ValidationError};
use crate::messages::{MessageRepositoryTrait, NewMessage};
use crate::notifications::{templates, NotificationPayload};
use crate::users::{User, UserRepositoryTrait};
use crate::utils::{Clock, SystemClock};

#[derive(Debug, Clone)]
pub struct OrderServiceConfig {
    /// Time between admin confirmation and the first allowed follow-up.
    pub follow_up_delay: Duration,
}

impl Default for OrderServiceConfig {
    fn default() -> Self {
        Self {
            follow_up_delay: Duration::seconds(DEFAULT_FOLLOW_UP_DELAY_SECS),
        }
    }
}

pub struct OrderService {
    order_repository: Arc<dyn OrderRepositoryTrait>,
    book_repository: Arc<dyn BookRepositoryTrait>,
    user_repository: Arc<dyn UserRepositoryTrait>,
    message_repository: Arc<dyn MessageRepositoryTrait>,
    automation_service: Arc<dyn AutomationServiceTrait>,
    clock: Arc<dyn Clock>,
    config: OrderServiceConfig,
}

impl OrderService {
    pub fn new(
        order_repository: Arc<dyn OrderRepositoryTrait>,
        book_repository: Arc<dyn BookRepositoryTrait>,
        user_repository: Arc<dyn UserRepositoryTrait>,
        message_repository: Arc<dyn MessageRepositoryTrait>,
        automation_service: Arc<dyn AutomationServiceTrait>,
    ) -> Self {
        OrderService {
            order_repository,
            book_repository,
            user_repository,
            message_repository,
            automation_service,
            clock: Arc::new(SystemClock),
            config: OrderServiceConfig::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_config(mut self, config: OrderServiceConfig) -> Self {
        self.config = config;
        self
    }

    fn load_book(&self, book_id: i64) -> Result<Book> {
        self.book_repository
            .get_book(book_id)?
            .ok_or_else(|| Error::not_found(format!("Book {}", book_id)))
    }

    /// Ownership checks run before any state check.
    fn authorize(request: &TransitionRequest, order: &Order, book: &Book) -> Result<()> {
        match request.actor_role {
            ActorRole::Buyer if order.buyer_id != request.actor_id => Err(Error::unauthorized(
                format!(
                    "order {} does not belong to buyer {}",
                    order.id, request.actor_id
                ),
            )),
            ActorRole::Seller if book.seller_id != request.actor_id => Err(Error::unauthorized(
                format!(
                    "book {} of order {} is not listed by seller {}",
                    book.id, order.id, request.actor_id
                ),
            )),
            // Admin sessions are verified at the API boundary.
            _ => Ok(()),
        }
    }

    fn load_party(&self, user_id: i64, order_id: i64) -> Option<User> {
        match self.user_repository.get_user(user_id) {
            Ok(Some(user)) => Some(user),
            Ok(None) => {
                warn!(
                    "User {} of order {} no longer exists; skipping notifications",
                    user_id, order_id
                );
                None
            }
            Err(e) => {
                warn!("Failed to load user {} of order {}: {}", user_id, order_id, e);
                None
            }
        }
    }

    /// In-app messages are best-effort and never fail the transition.
    async fn post_message(&self, message: NewMessage) {
        let receiver_id = message.receiver_id;
        if let Err(e) = self.message_repository.create_message(message).await {
            warn!("Failed to create in-app message for user {}: {}", receiver_id, e);
        }
    }

    /// Delivery failures end up on the automation log row, not here.
    async fn send_email(&self, recipient: &User, payload: NotificationPayload, order_id: i64) {
        let request = NotificationRequest::email(recipient.email.clone(), payload, order_id);
        if let Err(e) = self.automation_service.record(request).await {
            warn!(
                "Failed to record notification for order {} to {}: {}",
                order_id, recipient.email, e
            );
        }
    }

    async fn notify_confirmed(&self, order: &Order, book: &Book) {
        let (Some(buyer), Some(seller)) = (
            self.load_party(order.buyer_id, order.id),
            self.load_party(book.seller_id, order.id),
        ) else {
            return;
        };

        self.post_message(NewMessage::system(
            buyer.id,
            order.id,
            templates::confirmed_message_for_buyer(order.id, book, &seller),
        ))
        .await;
        self.post_message(NewMessage::system(
            seller.id,
            order.id,
            templates::confirmed_message_for_seller(order.id, book, &buyer),
        ))
        .await;

        self.send_email(
            &buyer,
            templates::order_confirmed_for_buyer(order.id, book, order.total_amount, &seller),
            order.id,
        )
        .await;
        self.send_email(
            &seller,
            templates::order_confirmed_for_seller(order.id, book, &buyer),
            order.id,
        )
        .await;
    }

    async fn notify_delivered(&self, order: &Order, book: &Book) {
        let buyer = self.load_party(order.buyer_id, order.id);
        let seller = self.load_party(book.seller_id, order.id);

        if let Some(buyer) = &buyer {
            self.post_message(NewMessage::system(
                buyer.id,
                order.id,
                templates::delivered_message_for_buyer(order.id, book),
            ))
            .await;
        }
        if let Some(seller) = &seller {
            self.post_message(NewMessage::system(
                seller.id,
                order.id,
                templates::delivered_message_for_seller(order.id, book),
            ))
            .await;
        }

        if let Some(buyer) = &buyer {
            self.send_email(
                buyer,
                templates::order_delivered_for_buyer(order.id, book),
                order.id,
            )
            .await;
        }
        if let Some(seller) = &seller {
            self.send_email(
                seller,
                templates::order_delivered_for_seller(order.id, book),
                order.id,
            )
            .await;
        }
    }
}

#[async_trait]
impl OrderServiceTrait for OrderService {
    fn get_order(&self, order_id: i64) -> Result<Order> {
        self.order_repository
            .get_order(order_id)?
            .ok_or_else(|| Error::not_found(format!("Order {}", order_id)))
    }

    fn list_orders(&self, filter: OrderFilter) -> Result<Vec<Order>> {
        self.order_repository.list_orders(&filter)
    }

    async fn place_order(&self, new_order: NewOrder) -> Result<Order> {
        let book = self.load_book(new_order.book_id)?;
        if book.seller_id == new_order.buyer_id {
            return Err(Error::ConstraintViolation(
                "sellers cannot order their own book".to_string(),
            ));
        }
        if !book.is_listed() {
            return Err(Error::ConstraintViolation(format!(
                "book {} is not available",
                book.id
            )));
        }
        if self.user_repository.get_user(new_order.buyer_id)?.is_none() {
            return Err(Error::not_found(format!("Buyer {}", new_order.buyer_id)));
        }

        let placed = PlacedOrder {
            buyer_id: new_order.buyer_id,
            book_id: book.id,
            total_amount: book.price,
            remarks: new_order
                .remarks
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty()),
            placed_at: self.clock.now_naive(),
        };

        let order = self
            .order_repository
            .insert_order(placed)
            .await?
            .ok_or_else(|| {
                Error::ConstraintViolation(format!("book {} is not available", book.id))
            })?;
        info!(
            "Order {} placed by buyer {} for book {}",
            order.id, order.buyer_id, order.book_id
        );
        Ok(order)
    }

    async fn transition(&self, request: TransitionRequest) -> Result<Order> {
        let order = self.get_order(request.order_id)?;
        let book = self.load_book(order.book_id)?;
        Self::authorize(&request, &order, &book)?;

        let rule = plan_transition(request.actor_role, order.status, request.requested_status)?;
        let now = self.clock.now_naive();
        let follow_up_start_time = if rule.schedules_follow_up {
            let start = now
                .checked_add_signed(self.config.follow_up_delay)
                .ok_or_else(|| {
                    Error::Validation(ValidationError::InvalidInput(format!(
                        "follow-up delay of {}s is out of range",
                        self.config.follow_up_delay.num_seconds()
                    )))
                })?;
            Some(start)
        } else {
            None
        };
        let change = OrderStatusChange {
            from: order.status,
            to: rule.to,
            book_effect: rule.book_effect,
            complete: rule.completes,
            follow_up_start_time,
            admin_note: request
                .admin_note
                .filter(|_| request.actor_role == ActorRole::Admin)
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            changed_at: now,
        };

        let Some(updated) = self
            .order_repository
            .apply_status_change(order.id, order.book_id, change)
            .await?
        else {
            // Lost the compare-and-set against a concurrent request.
            let current = self.get_order(order.id)?;
            warn!(
                "Order {} changed to {} while {} {} requested {}",
                order.id,
                current.status,
                request.actor_role,
                request.actor_id,
                request.requested_status
            );
            return Err(Error::InvalidTransition {
                from: current.status,
                to: request.requested_status,
            });
        };

        info!(
            "Order {} moved from {} to {} by {} {}",
            updated.id, order.status, updated.status, request.actor_role, request.actor_id
        );

        match rule.notice {
            TransitionNotice::Silent => {}
            TransitionNotice::Confirmed => self.notify_confirmed(&updated, &book).await,
            TransitionNotice::Delivered => self.notify_delivered(&updated, &book).await,
        }

        Ok(updated)
    }

    async fn delete_order(&self, order_id: i64, buyer_id: i64) -> Result<()> {
        let order = self.get_order(order_id)?;
        if order.buyer_id != buyer_id {
            return Err(Error::unauthorized(format!(
                "order {} does not belong to buyer {}",
                order_id, buyer_id
            )));
        }
        if !order.status.is_terminal() {
            return Err(Error::ConstraintViolation(format!(
                "order {} is still {}; only delivered, cancelled or rejected orders can be removed",
                order_id, order.status
            )));
        }
        self.order_repository.delete_order(order_id).await?;
        info!("Order {} removed by buyer {}", order_id, buyer_id);
        Ok(())
    }
}
