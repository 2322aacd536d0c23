use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::debug;

use bookloop_core::books::BookStatus;
use bookloop_core::orders::{
    Order, OrderFilter, OrderRepositoryTrait, OrderStatus, OrderStatusChange, PlacedOrder,
};
use bookloop_core::Result;

use super::model::{NewOrderDB, OrderDB, OrderStatusChangeDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{books, orders};

pub struct OrderRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl OrderRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        OrderRepository { pool, writer }
    }
}

fn to_orders(rows: Vec<OrderDB>) -> Result<Vec<Order>> {
    rows.into_iter()
        .map(|row| Order::try_from(row).map_err(Into::into))
        .collect()
}

#[async_trait]
impl OrderRepositoryTrait for OrderRepository {
    fn get_order(&self, order_id: i64) -> Result<Option<Order>> {
        let mut conn = get_connection(&self.pool)?;
        let order = orders::table
            .find(order_id)
            .select(OrderDB::as_select())
            .first::<OrderDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(order.map(Order::try_from).transpose()?)
    }

    fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = orders::table
            .inner_join(books::table)
            .select(OrderDB::as_select())
            .into_boxed();

        if let Some(buyer_id) = filter.buyer_id {
            query = query.filter(orders::buyer_id.eq(buyer_id));
        }
        if let Some(seller_id) = filter.seller_id {
            query = query.filter(books::seller_id.eq(seller_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(orders::status.eq(status.as_str()));
        }

        let rows = query
            .order((orders::created_at.desc(), orders::id.desc()))
            .load::<OrderDB>(&mut conn)
            .map_err(StorageError::from)?;
        to_orders(rows)
    }

    async fn insert_order(&self, placed: PlacedOrder) -> Result<Option<Order>> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Option<Order>> {
                // Hold the book first; a listing can back one open order only.
                let held = diesel::update(
                    books::table
                        .find(placed.book_id)
                        .filter(books::status.eq(BookStatus::Available.as_str()))
                        .filter(books::is_archived.eq(false)),
                )
                .set((
                    books::status.eq(BookStatus::OnHold.as_str()),
                    books::updated_at.eq(placed.placed_at),
                ))
                .execute(conn)
                .map_err(StorageError::from)?;
                if held == 0 {
                    return Ok(None);
                }

                let row = diesel::insert_into(orders::table)
                    .values(NewOrderDB::from(placed))
                    .returning(OrderDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(Some(Order::try_from(row)?))
            })
            .await
    }

    async fn apply_status_change(
        &self,
        order_id: i64,
        book_id: i64,
        change: OrderStatusChange,
    ) -> Result<Option<Order>> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Option<Order>> {
                let updated = diesel::update(
                    orders::table
                        .find(order_id)
                        .filter(orders::status.eq(change.from.as_str())),
                )
                .set(OrderStatusChangeDB::from(&change))
                .returning(OrderDB::as_returning())
                .get_result(conn)
                .optional()
                .map_err(StorageError::from)?;

                let Some(updated) = updated else {
                    debug!(
                        "Order {} is no longer {}; skipping move to {}",
                        order_id, change.from, change.to
                    );
                    return Ok(None);
                };

                if let Some((status, archived)) = change.book_effect.target_state() {
                    diesel::update(books::table.find(book_id))
                        .set((
                            books::status.eq(status.as_str()),
                            books::is_archived.eq(archived),
                            books::updated_at.eq(change.changed_at),
                        ))
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }

                Ok(Some(Order::try_from(updated)?))
            })
            .await
    }

    async fn delete_order(&self, order_id: i64) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                Ok(diesel::delete(orders::table.find(order_id))
                    .execute(conn)
                    .map_err(StorageError::from)?)
            })
            .await
    }

    async fn claim_due_follow_ups(
        &self,
        now: NaiveDateTime,
        cooldown_cutoff: NaiveDateTime,
    ) -> Result<Vec<Order>> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Vec<Order>> {
                let rows = diesel::update(
                    orders::table
                        .filter(orders::status.eq(OrderStatus::Confirmed.as_str()))
                        .filter(orders::is_completed.eq(false))
                        .filter(orders::follow_up_start_time.le(now))
                        .filter(
                            orders::last_follow_up_sent_at
                                .is_null()
                                .or(orders::last_follow_up_sent_at.lt(cooldown_cutoff)),
                        ),
                )
                .set((
                    orders::last_follow_up_sent_at.eq(now),
                    orders::updated_at.eq(now),
                ))
                .returning(OrderDB::as_returning())
                .get_results(conn)
                .map_err(StorageError::from)?;
                to_orders(rows)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::books::BookRepository;
    use crate::db::{create_pool, init, run_migrations, spawn_writer};
    use crate::users::UserRepository;
    use bookloop_core::books::{BookEffect, BookRepositoryTrait, NewBook};
    use bookloop_core::users::{NewUser, UserRepositoryTrait};
    use chrono::{Duration, NaiveDate};
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    struct Harness {
        _dir: TempDir,
        orders: OrderRepository,
        books: BookRepository,
        buyer_id: i64,
        book_id: i64,
    }

    fn t(minutes: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
            + Duration::minutes(minutes)
    }

    async fn harness() -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("bookloop.db");
        let db_path = init(db_path.to_str().unwrap()).unwrap();
        let pool = create_pool(&db_path).unwrap();
        run_migrations(&pool).unwrap();
        let writer = spawn_writer(pool.as_ref().clone());

        let users = UserRepository::new(pool.clone(), writer.clone());
        let books = BookRepository::new(pool.clone(), writer.clone());
        let orders = OrderRepository::new(pool, writer);

        let seller = users
            .create_user(NewUser {
                name: "Sam Shelf".to_string(),
                email: "sam@example.com".to_string(),
                phone: None,
            })
            .await
            .unwrap();
        let buyer = users
            .create_user(NewUser {
                name: "Amy Reader".to_string(),
                email: "amy@example.com".to_string(),
                phone: Some("555-0101".to_string()),
            })
            .await
            .unwrap();
        let book = books
            .create_book(NewBook {
                seller_id: seller.id,
                title: "Dune".to_string(),
                author: Some("Frank Herbert".to_string()),
                price: dec!(12.50),
            })
            .await
            .unwrap();

        Harness {
            _dir: dir,
            orders,
            books,
            buyer_id: buyer.id,
            book_id: book.id,
        }
    }

    fn placed(h: &Harness) -> PlacedOrder {
        PlacedOrder {
            buyer_id: h.buyer_id,
            book_id: h.book_id,
            total_amount: dec!(12.50),
            remarks: None,
            placed_at: t(0),
        }
    }

    fn change(from: OrderStatus, to: OrderStatus, effect: BookEffect) -> OrderStatusChange {
        OrderStatusChange {
            from,
            to,
            book_effect: effect,
            complete: to == OrderStatus::Delivered,
            follow_up_start_time: (to == OrderStatus::Confirmed).then(|| t(2)),
            admin_note: None,
            changed_at: t(0),
        }
    }

    #[tokio::test]
    async fn test_insert_order_holds_book_once() {
        let h = harness().await;

        let order = h.orders.insert_order(placed(&h)).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total_amount, dec!(12.50));
        assert_eq!(
            h.books.get_book(h.book_id).unwrap().unwrap().status,
            BookStatus::OnHold
        );

        let second = h.orders.insert_order(placed(&h)).await.unwrap();
        assert!(second.is_none());
        assert!(h.books.list_available_books().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_status_change_is_compare_and_set() {
        let h = harness().await;
        let order = h.orders.insert_order(placed(&h)).await.unwrap().unwrap();

        let first = h
            .orders
            .apply_status_change(
                order.id,
                h.book_id,
                change(OrderStatus::Pending, OrderStatus::Cancelled, BookEffect::Release),
            )
            .await
            .unwrap();
        assert_eq!(first.unwrap().status, OrderStatus::Cancelled);

        // Same precondition again: the row no longer matches.
        let second = h
            .orders
            .apply_status_change(
                order.id,
                h.book_id,
                change(OrderStatus::Pending, OrderStatus::Accepted, BookEffect::Unchanged),
            )
            .await
            .unwrap();
        assert!(second.is_none());
        assert_eq!(
            h.orders.get_order(order.id).unwrap().unwrap().status,
            OrderStatus::Cancelled
        );

        let book = h.books.get_book(h.book_id).unwrap().unwrap();
        assert_eq!(book.status, BookStatus::Available);
    }

    #[tokio::test]
    async fn test_confirm_and_deliver_update_book_in_same_write() {
        let h = harness().await;
        let order = h.orders.insert_order(placed(&h)).await.unwrap().unwrap();

        let confirmed = h
            .orders
            .apply_status_change(
                order.id,
                h.book_id,
                change(OrderStatus::Pending, OrderStatus::Confirmed, BookEffect::MarkSold),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(confirmed.follow_up_start_time, Some(t(2)));
        assert!(!confirmed.is_completed);
        assert_eq!(
            h.books.get_book(h.book_id).unwrap().unwrap().status,
            BookStatus::Sold
        );

        let delivered = h
            .orders
            .apply_status_change(
                order.id,
                h.book_id,
                change(OrderStatus::Confirmed, OrderStatus::Delivered, BookEffect::Archive),
            )
            .await
            .unwrap()
            .unwrap();
        assert!(delivered.is_completed);
        assert_eq!(delivered.follow_up_start_time, Some(t(2)));
        assert!(h.books.get_book(h.book_id).unwrap().unwrap().is_archived);
    }

    #[tokio::test]
    async fn test_claim_due_follow_ups_honours_delay_and_cooldown() {
        let h = harness().await;
        let order = h.orders.insert_order(placed(&h)).await.unwrap().unwrap();
        h.orders
            .apply_status_change(
                order.id,
                h.book_id,
                change(OrderStatus::Pending, OrderStatus::Confirmed, BookEffect::MarkSold),
            )
            .await
            .unwrap();
        let cooldown = Duration::minutes(5);

        let claim = |now: NaiveDateTime| h.orders.claim_due_follow_ups(now, now - cooldown);

        assert!(claim(t(1)).await.unwrap().is_empty());

        let claimed = claim(t(3)).await.unwrap();
        assert_eq!(claimed.len(), 1);
        assert_eq!(claimed[0].last_follow_up_sent_at, Some(t(3)));

        assert!(claim(t(4)).await.unwrap().is_empty());
        assert_eq!(claim(t(9)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_orders_filters_by_seller_and_status() {
        let h = harness().await;
        let order = h.orders.insert_order(placed(&h)).await.unwrap().unwrap();
        let seller_id = h.books.get_book(h.book_id).unwrap().unwrap().seller_id;

        let by_seller = h
            .orders
            .list_orders(&OrderFilter {
                seller_id: Some(seller_id),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(by_seller.len(), 1);
        assert_eq!(by_seller[0].id, order.id);

        let delivered = h
            .orders
            .list_orders(&OrderFilter {
                status: Some(OrderStatus::Delivered),
                ..Default::default()
            })
            .unwrap();
        assert!(delivered.is_empty());

        assert_eq!(h.orders.delete_order(order.id).await.unwrap(), 1);
        assert!(h.orders.get_order(order.id).unwrap().is_none());
    }
}
