//! In-memory repositories shared by the service tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDateTime, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::automation::{
    AutomationLog, AutomationLogRepositoryTrait, AutomationLogStatus, LogOutcome,
    NewAutomationLog,
};
use crate::books::{Book, BookRepositoryTrait, BookStatus, NewBook};
use crate::errors::{DatabaseError, Error, Result};
use crate::messages::{Message, MessageRepositoryTrait, NewMessage};
use crate::orders::{
    Order, OrderFilter, OrderRepositoryTrait, OrderStatus, OrderStatusChange, PlacedOrder,
};
use crate::users::{NewUser, User, UserRepositoryTrait};

pub fn t0() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

#[derive(Default)]
struct State {
    users: Vec<User>,
    books: Vec<Book>,
    orders: Vec<Order>,
    messages: Vec<Message>,
    logs: Vec<AutomationLog>,
    next_id: i64,
    fail_messages: bool,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// One store implementing every repository trait, with the same
/// compare-and-set semantics as the SQLite repositories.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Row timestamps are not under test here.
    fn stamp(&self) -> NaiveDateTime {
        t0().naive_utc()
    }

    pub fn add_user(&self, id: i64, name: &str, email: &str) -> User {
        let user = User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            phone: Some(format!("555-01{:02}", id % 100)),
        };
        self.state.lock().unwrap().users.push(user.clone());
        user
    }

    pub fn add_book(&self, id: i64, seller_id: i64, title: &str, price: Decimal) -> Book {
        let book = Book {
            id,
            seller_id,
            title: title.to_string(),
            author: None,
            price,
            status: BookStatus::Available,
            is_archived: false,
        };
        self.state.lock().unwrap().books.push(book.clone());
        book
    }

    pub fn add_order(&self, id: i64, buyer_id: i64, book_id: i64, status: OrderStatus) -> Order {
        let mut state = self.state.lock().unwrap();
        let price = state
            .books
            .iter_mut()
            .find(|b| b.id == book_id)
            .map(|b| {
                b.status = BookStatus::OnHold;
                b.price
            })
            .unwrap_or_default();
        let order = Order {
            id,
            buyer_id,
            book_id,
            status,
            total_amount: price,
            remarks: None,
            admin_note: None,
            follow_up_start_time: None,
            last_follow_up_sent_at: None,
            is_completed: false,
            created_at: t0().naive_utc(),
            updated_at: t0().naive_utc(),
        };
        state.orders.push(order.clone());
        order
    }

    /// Simulates another request winning the race on an order.
    pub fn force_status(&self, order_id: i64, status: OrderStatus) {
        let mut state = self.state.lock().unwrap();
        if let Some(order) = state.orders.iter_mut().find(|o| o.id == order_id) {
            order.status = status;
        }
    }

    pub fn fail_messages(&self, fail: bool) {
        self.state.lock().unwrap().fail_messages = fail;
    }

    pub fn order(&self, order_id: i64) -> Order {
        self.state
            .lock()
            .unwrap()
            .orders
            .iter()
            .find(|o| o.id == order_id)
            .cloned()
            .unwrap()
    }

    pub fn book(&self, book_id: i64) -> Book {
        self.state
            .lock()
            .unwrap()
            .books
            .iter()
            .find(|b| b.id == book_id)
            .cloned()
            .unwrap()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.state.lock().unwrap().messages.clone()
    }

    pub fn logs(&self) -> Vec<AutomationLog> {
        self.state.lock().unwrap().logs.clone()
    }

    pub fn insert_raw_log(&self, log: AutomationLog) {
        self.state.lock().unwrap().logs.push(log);
    }
}

#[async_trait]
impl UserRepositoryTrait for InMemoryStore {
    fn get_user(&self, user_id: i64) -> Result<Option<User>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.id == user_id)
            .cloned())
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User> {
        let mut state = self.state.lock().unwrap();
        let user = User {
            id: state.next_id(),
            name: new_user.name,
            email: new_user.email,
            phone: new_user.phone,
        };
        state.users.push(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl BookRepositoryTrait for InMemoryStore {
    fn get_book(&self, book_id: i64) -> Result<Option<Book>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .books
            .iter()
            .find(|b| b.id == book_id)
            .cloned())
    }

    fn list_available_books(&self) -> Result<Vec<Book>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .books
            .iter()
            .filter(|b| b.is_listed())
            .cloned()
            .collect())
    }

    async fn create_book(&self, new_book: NewBook) -> Result<Book> {
        let mut state = self.state.lock().unwrap();
        let book = Book {
            id: state.next_id(),
            seller_id: new_book.seller_id,
            title: new_book.title,
            author: new_book.author,
            price: new_book.price,
            status: BookStatus::Available,
            is_archived: false,
        };
        state.books.push(book.clone());
        Ok(book)
    }
}

#[async_trait]
impl OrderRepositoryTrait for InMemoryStore {
    fn get_order(&self, order_id: i64) -> Result<Option<Order>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .orders
            .iter()
            .find(|o| o.id == order_id)
            .cloned())
    }

    fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .orders
            .iter()
            .filter(|o| filter.buyer_id.map_or(true, |b| o.buyer_id == b))
            .filter(|o| filter.status.map_or(true, |s| o.status == s))
            .filter(|o| {
                filter.seller_id.map_or(true, |s| {
                    state
                        .books
                        .iter()
                        .any(|b| b.id == o.book_id && b.seller_id == s)
                })
            })
            .cloned()
            .collect())
    }

    async fn insert_order(&self, placed: PlacedOrder) -> Result<Option<Order>> {
        let mut state = self.state.lock().unwrap();
        let Some(book) = state
            .books
            .iter_mut()
            .find(|b| b.id == placed.book_id && b.is_listed())
        else {
            return Ok(None);
        };
        book.status = BookStatus::OnHold;
        let order = Order {
            id: state.next_id(),
            buyer_id: placed.buyer_id,
            book_id: placed.book_id,
            status: OrderStatus::Pending,
            total_amount: placed.total_amount,
            remarks: placed.remarks,
            admin_note: None,
            follow_up_start_time: None,
            last_follow_up_sent_at: None,
            is_completed: false,
            created_at: placed.placed_at,
            updated_at: placed.placed_at,
        };
        state.orders.push(order.clone());
        Ok(Some(order))
    }

    async fn apply_status_change(
        &self,
        order_id: i64,
        book_id: i64,
        change: OrderStatusChange,
    ) -> Result<Option<Order>> {
        let mut state = self.state.lock().unwrap();
        let Some(order) = state
            .orders
            .iter_mut()
            .find(|o| o.id == order_id && o.status == change.from)
        else {
            return Ok(None);
        };
        order.status = change.to;
        if change.complete {
            order.is_completed = true;
        }
        if change.follow_up_start_time.is_some() {
            order.follow_up_start_time = change.follow_up_start_time;
            order.is_completed = false;
        }
        if change.admin_note.is_some() {
            order.admin_note = change.admin_note.clone();
        }
        order.updated_at = change.changed_at;
        let updated = order.clone();

        if let Some((status, archived)) = change.book_effect.target_state() {
            if let Some(book) = state.books.iter_mut().find(|b| b.id == book_id) {
                book.status = status;
                book.is_archived = archived;
            }
        }
        Ok(Some(updated))
    }

    async fn delete_order(&self, order_id: i64) -> Result<usize> {
        let mut state = self.state.lock().unwrap();
        let before = state.orders.len();
        state.orders.retain(|o| o.id != order_id);
        Ok(before - state.orders.len())
    }

    async fn claim_due_follow_ups(
        &self,
        now: NaiveDateTime,
        cooldown_cutoff: NaiveDateTime,
    ) -> Result<Vec<Order>> {
        let mut state = self.state.lock().unwrap();
        let mut claimed = Vec::new();
        for order in state.orders.iter_mut() {
            let due = order.status == OrderStatus::Confirmed
                && !order.is_completed
                && order.follow_up_start_time.is_some_and(|t| t <= now)
                && order
                    .last_follow_up_sent_at
                    .map_or(true, |last| last < cooldown_cutoff);
            if due {
                order.last_follow_up_sent_at = Some(now);
                order.updated_at = now;
                claimed.push(order.clone());
            }
        }
        Ok(claimed)
    }
}

#[async_trait]
impl MessageRepositoryTrait for InMemoryStore {
    async fn create_message(&self, new_message: NewMessage) -> Result<Message> {
        let created_at = self.stamp();
        let mut state = self.state.lock().unwrap();
        if state.fail_messages {
            return Err(Error::Database(DatabaseError::QueryFailed(
                "messages table is locked".to_string(),
            )));
        }
        let message = Message {
            id: state.next_id(),
            sender_id: new_message.sender_id,
            receiver_id: new_message.receiver_id,
            order_id: new_message.order_id,
            content: new_message.content,
            created_at,
        };
        state.messages.push(message.clone());
        Ok(message)
    }

    fn list_messages_for_user(&self, user_id: i64) -> Result<Vec<Message>> {
        let mut messages: Vec<Message> = self
            .state
            .lock()
            .unwrap()
            .messages
            .iter()
            .filter(|m| m.receiver_id == user_id)
            .cloned()
            .collect();
        messages.reverse();
        Ok(messages)
    }

    fn list_messages_for_order(&self, order_id: i64) -> Result<Vec<Message>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .messages
            .iter()
            .filter(|m| m.order_id == Some(order_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AutomationLogRepositoryTrait for InMemoryStore {
    fn get_log(&self, log_id: i64) -> Result<Option<AutomationLog>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .logs
            .iter()
            .find(|l| l.id == log_id)
            .cloned())
    }

    fn list_logs(
        &self,
        status: Option<AutomationLogStatus>,
        limit: i64,
    ) -> Result<Vec<AutomationLog>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .logs
            .iter()
            .rev()
            .filter(|l| status.map_or(true, |s| l.status == s))
            .take(limit as usize)
            .cloned()
            .collect())
    }

    fn list_logs_for_order(&self, order_id: i64) -> Result<Vec<AutomationLog>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .logs
            .iter()
            .filter(|l| l.order_id == Some(order_id))
            .cloned()
            .collect())
    }

    async fn insert_log(&self, new_log: NewAutomationLog) -> Result<AutomationLog> {
        let created_at = self.stamp();
        let mut state = self.state.lock().unwrap();
        let log = AutomationLog {
            id: state.next_id(),
            log_type: new_log.log_type,
            target: new_log.target,
            status: new_log.status,
            payload: new_log.payload,
            error: None,
            retry_count: 0,
            order_id: new_log.order_id,
            created_at,
            updated_at: created_at,
        };
        state.logs.push(log.clone());
        Ok(log)
    }

    async fn settle_log(&self, log_id: i64, outcome: LogOutcome) -> Result<AutomationLog> {
        let updated_at = self.stamp();
        let mut state = self.state.lock().unwrap();
        let log = state
            .logs
            .iter_mut()
            .find(|l| l.id == log_id)
            .ok_or_else(|| Error::not_found(format!("Automation log {}", log_id)))?;
        log.status = outcome.status;
        log.error = outcome.error;
        if outcome.count_retry {
            log.retry_count += 1;
        }
        log.updated_at = updated_at;
        Ok(log.clone())
    }
}
