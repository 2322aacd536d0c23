//! Database models for book listings.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use bookloop_core::books::{Book, BookStatus, NewBook};

use crate::errors::StorageError;
use crate::utils::{parse_amount, parse_column};

#[derive(Queryable, Identifiable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::books)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BookDB {
    pub id: i64,
    pub seller_id: i64,
    pub title: String,
    pub author: Option<String>,
    pub price: String,
    pub status: String,
    pub is_archived: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::books)]
pub struct NewBookDB {
    pub seller_id: i64,
    pub title: String,
    pub author: Option<String>,
    pub price: String,
    pub status: String,
    pub is_archived: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<BookDB> for Book {
    type Error = StorageError;

    fn try_from(db: BookDB) -> Result<Self, Self::Error> {
        Ok(Self {
            price: parse_amount(&db.price, "books.price")?,
            status: parse_column(&db.status, "books.status")?,
            id: db.id,
            seller_id: db.seller_id,
            title: db.title,
            author: db.author,
            is_archived: db.is_archived,
        })
    }
}

impl NewBookDB {
    pub fn new(book: NewBook, now: NaiveDateTime) -> Self {
        Self {
            seller_id: book.seller_id,
            title: book.title.trim().to_string(),
            author: book.author.filter(|a| !a.trim().is_empty()),
            price: book.price.to_string(),
            status: BookStatus::Available.as_str().to_string(),
            is_archived: false,
            created_at: now,
            updated_at: now,
        }
    }
}
