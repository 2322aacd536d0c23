//! Database models for users.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use bookloop_core::users::{NewUser, User};

#[derive(Queryable, Identifiable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserDB {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUserDB {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: NaiveDateTime,
}

impl From<UserDB> for User {
    fn from(db: UserDB) -> Self {
        Self {
            id: db.id,
            name: db.name,
            email: db.email,
            phone: db.phone,
        }
    }
}

impl NewUserDB {
    pub fn new(user: NewUser, created_at: NaiveDateTime) -> Self {
        Self {
            name: user.name.trim().to_string(),
            email: user.email.trim().to_lowercase(),
            phone: user.phone.filter(|p| !p.trim().is_empty()),
            created_at,
        }
    }
}
