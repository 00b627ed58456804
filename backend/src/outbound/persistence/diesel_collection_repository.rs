//! PostgreSQL-backed `CollectionRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::collection::{Collection, CollectionName};
use crate::domain::ports::{CollectionRepository, PersistenceError};

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::models::{row_to_collection, CollectionRow, NewCollectionMachineRow, NewCollectionRow};
use super::pool::DbPool;
use super::schema::{collection_machines, collections};

/// Diesel-backed implementation of the `CollectionRepository` port.
#[derive(Clone)]
pub struct DieselCollectionRepository {
    pool: DbPool,
}

impl DieselCollectionRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CollectionRepository for DieselCollectionRepository {
    async fn list(&self) -> Result<Vec<Collection>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<CollectionRow> = collections::table
            .select(CollectionRow::as_select())
            .order(collections::name.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(row_to_collection).collect())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Collection>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<CollectionRow> = collections::table
            .filter(collections::id.eq(id))
            .select(CollectionRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_collection))
    }

    async fn get_or_create(&self, name: &CollectionName) -> Result<Collection, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // Race-safe upsert: the conflict target is the unique name index,
        // so concurrent creators converge on one row.
        diesel::insert_into(collections::table)
            .values(&NewCollectionRow {
                id: Uuid::new_v4(),
                name: name.as_str(),
            })
            .on_conflict(collections::name)
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let row: CollectionRow = collections::table
            .filter(collections::name.eq(name.as_str()))
            .select(CollectionRow::as_select())
            .first(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(row_to_collection(row))
    }

    async fn add_machine(
        &self,
        collection_id: Uuid,
        machine_id: Uuid,
    ) -> Result<bool, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let result = diesel::insert_into(collection_machines::table)
            .values(&NewCollectionMachineRow {
                id: Uuid::new_v4(),
                collection_id,
                machine_id,
            })
            .on_conflict((
                collection_machines::collection_id,
                collection_machines::machine_id,
            ))
            .do_nothing()
            .execute(&mut conn)
            .await;

        match result {
            // Zero rows means the link already existed; that is fine.
            Ok(_) => Ok(true),
            Err(diesel::result::Error::DatabaseError(
                DatabaseErrorKind::ForeignKeyViolation,
                _,
            )) => Ok(false),
            Err(err) => Err(map_diesel_error(err)),
        }
    }

    async fn names_for_machine(&self, machine_id: Uuid) -> Result<Vec<String>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        collections::table
            .inner_join(collection_machines::table)
            .filter(collection_machines::machine_id.eq(machine_id))
            .select(collections::name)
            .order(collections::name.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)
    }
}
