use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;

use bookloop_core::books::{Book, BookRepositoryTrait, BookStatus, NewBook};
use bookloop_core::Result;

use super::model::{BookDB, NewBookDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::books;

pub struct BookRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl BookRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        BookRepository { pool, writer }
    }
}

#[async_trait]
impl BookRepositoryTrait for BookRepository {
    fn get_book(&self, book_id: i64) -> Result<Option<Book>> {
        let mut conn = get_connection(&self.pool)?;
        let book = books::table
            .find(book_id)
            .select(BookDB::as_select())
            .first::<BookDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(book.map(Book::try_from).transpose()?)
    }

    fn list_available_books(&self) -> Result<Vec<Book>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = books::table
            .filter(books::status.eq(BookStatus::Available.as_str()))
            .filter(books::is_archived.eq(false))
            .order(books::created_at.desc())
            .select(BookDB::as_select())
            .load::<BookDB>(&mut conn)
            .map_err(StorageError::from)?;
        rows.into_iter()
            .map(|row| Book::try_from(row).map_err(Into::into))
            .collect()
    }

    async fn create_book(&self, new_book: NewBook) -> Result<Book> {
        let row = NewBookDB::new(new_book, Utc::now().naive_utc());
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Book> {
                let book = diesel::insert_into(books::table)
                    .values(&row)
                    .returning(BookDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(Book::try_from(book)?)
            })
            .await
    }
}
