use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;

use bookloop_core::users::{NewUser, User, UserRepositoryTrait};
use bookloop_core::Result;

use super::model::{NewUserDB, UserDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::users;

pub struct UserRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl UserRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        UserRepository { pool, writer }
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    fn get_user(&self, user_id: i64) -> Result<Option<User>> {
        let mut conn = get_connection(&self.pool)?;
        let user = users::table
            .find(user_id)
            .select(UserDB::as_select())
            .first::<UserDB>(&mut conn)
            .optional()
            .into_core()?;
        Ok(user.map(User::from))
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User> {
        let row = NewUserDB::new(new_user, Utc::now().naive_utc());
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<User> {
                let user = diesel::insert_into(users::table)
                    .values(&row)
                    .returning(UserDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(User::from(user))
            })
            .await
    }
}
