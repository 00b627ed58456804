//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Accounts span two tables (`users` and `user_profiles`); reads join them
//! and creation writes both inside one transaction.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::auth::{UserAccount, Username};
use crate::domain::ports::{PersistenceError, StoredCredentials, UserRepository};
use crate::domain::role::Role;

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::models::{
    row_to_credentials, rows_to_account, NewUserProfileRow, NewUserRow, UserRow,
};
use super::pool::DbPool;
use super::schema::{user_profiles, users};

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn collect_accounts(rows: Vec<(UserRow, Option<String>)>) -> Vec<UserAccount> {
    rows.into_iter()
        .map(|(user, role)| rows_to_account(user, role))
        .collect()
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find(&self, id: Uuid) -> Result<Option<UserAccount>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<(UserRow, Option<String>)> = users::table
            .left_join(user_profiles::table)
            .filter(users::id.eq(id))
            .select((UserRow::as_select(), user_profiles::role.nullable()))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(|(user, role)| rows_to_account(user, role)))
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<StoredCredentials>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::username.eq(username))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_credentials))
    }

    async fn username_taken(&self, username: &str) -> Result<bool, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let existing: Option<Uuid> = users::table
            .filter(users::username.eq(username))
            .select(users::id)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(existing.is_some())
    }

    async fn create(
        &self,
        username: &Username,
        password_hash: &str,
        role: Role,
    ) -> Result<UserAccount, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: UserRow = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    let row: UserRow = diesel::insert_into(users::table)
                        .values(&NewUserRow {
                            id: Uuid::new_v4(),
                            username: username.as_str(),
                            password_hash,
                            is_superuser: false,
                        })
                        .returning(UserRow::as_returning())
                        .get_result(conn)
                        .await?;

                    diesel::insert_into(user_profiles::table)
                        .values(&NewUserProfileRow {
                            user_id: row.id,
                            role: role.as_str(),
                        })
                        .execute(conn)
                        .await?;

                    Ok(row)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        Ok(UserAccount {
            id: row.id,
            username: row.username,
            role: Some(role),
            is_superuser: row.is_superuser,
            created_at: row.created_at,
        })
    }

    async fn delete(&self, id: Uuid) -> Result<bool, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // The profile and assignments cascade; authored fault cases, notes,
        // and warnings keep their rows with the author nulled.
        let deleted = diesel::delete(users::table.filter(users::id.eq(id)))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(deleted > 0)
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<UserAccount>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<(UserRow, Option<String>)> = users::table
            .inner_join(user_profiles::table)
            .filter(user_profiles::role.eq(role.as_str()))
            .select((UserRow::as_select(), user_profiles::role.nullable()))
            .order(users::username.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(collect_accounts(rows))
    }

    async fn list_deletable(&self, requester: Uuid) -> Result<Vec<UserAccount>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<(UserRow, Option<String>)> = users::table
            .left_join(user_profiles::table)
            .filter(users::is_superuser.eq(false))
            .filter(users::id.ne(requester))
            .select((UserRow::as_select(), user_profiles::role.nullable()))
            .order(users::username.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(collect_accounts(rows))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use chrono::Utc;
    use rstest::rstest;

    #[rstest]
    fn joined_rows_collect_into_accounts() {
        let make = |name: &str, role: Option<&str>| {
            (
                UserRow {
                    id: Uuid::new_v4(),
                    username: name.to_owned(),
                    password_hash: "$argon2id$stub".to_owned(),
                    is_superuser: false,
                    created_at: Utc::now(),
                },
                role.map(str::to_owned),
            )
        };

        let accounts = collect_accounts(vec![
            make("alice", Some("Manager")),
            make("bob", None),
            make("carol", Some("Janitor")),
        ]);

        assert_eq!(accounts.len(), 3);
        assert_eq!(accounts[0].role, Some(Role::Manager));
        assert_eq!(accounts[1].role, None);
        // An unrecognised stored label degrades to a roleless account.
        assert_eq!(accounts[2].role, None);
    }
}
