//! PostgreSQL-backed `WarningRepository` implementation using Diesel ORM.
//!
//! Warning creation and deletion carry the machine status transitions of
//! [`crate::domain::rules`] inside the same transaction as the row write,
//! so the duplicate check and the status can never observe a torn state.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{PersistenceError, WarningCreation, WarningRepository};
use crate::domain::rules;
use crate::domain::warning::{Warning, WarningText};

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::models::{row_to_warning, NewWarningRow, WarningRow};
use super::pool::DbPool;
use super::schema::{machines, warnings};

/// Diesel-backed implementation of the `WarningRepository` port.
#[derive(Clone)]
pub struct DieselWarningRepository {
    pool: DbPool,
}

impl DieselWarningRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WarningRepository for DieselWarningRepository {
    async fn create_active(
        &self,
        machine_id: Uuid,
        text: WarningText,
        created_by: Uuid,
    ) -> Result<Option<WarningCreation>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let outcome = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    // The status write doubles as the existence check and
                    // fires even for suppressed duplicates.
                    let touched =
                        diesel::update(machines::table.filter(machines::id.eq(machine_id)))
                            .set((
                                machines::status
                                    .eq(rules::status_after_warning_created().as_str()),
                                machines::updated_at.eq(diesel::dsl::now),
                            ))
                            .execute(conn)
                            .await?;
                    if touched == 0 {
                        return Ok(None);
                    }

                    let existing: Vec<String> = warnings::table
                        .filter(warnings::machine_id.eq(machine_id))
                        .filter(warnings::active.eq(true))
                        .select(warnings::warning_text)
                        .load(conn)
                        .await?;
                    if rules::is_duplicate_warning(&existing, text.as_str()) {
                        return Ok(Some(WarningCreation::DuplicateSuppressed));
                    }

                    let new_row = NewWarningRow {
                        id: Uuid::new_v4(),
                        machine_id,
                        warning_text: text.as_str(),
                        created_by: Some(created_by),
                        active: true,
                    };
                    diesel::insert_into(warnings::table)
                        .values(&new_row)
                        .execute(conn)
                        .await?;
                    Ok(Some(WarningCreation::Created))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        Ok(outcome)
    }

    async fn delete(&self, warning_id: Uuid) -> Result<bool, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    let machine_id: Option<Uuid> =
                        diesel::delete(warnings::table.filter(warnings::id.eq(warning_id)))
                            .returning(warnings::machine_id)
                            .get_result(conn)
                            .await
                            .optional()?;
                    let Some(machine_id) = machine_id else {
                        return Ok(false);
                    };

                    let remaining: i64 = warnings::table
                        .filter(warnings::machine_id.eq(machine_id))
                        .filter(warnings::active.eq(true))
                        .count()
                        .get_result(conn)
                        .await?;
                    let remaining = usize::try_from(remaining).unwrap_or(0);

                    if let Some(status) = rules::status_after_warning_deleted(remaining) {
                        diesel::update(machines::table.filter(machines::id.eq(machine_id)))
                            .set((
                                machines::status.eq(status.as_str()),
                                machines::updated_at.eq(diesel::dsl::now),
                            ))
                            .execute(conn)
                            .await?;
                    }
                    Ok(true)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        Ok(deleted)
    }

    async fn list_active(&self) -> Result<Vec<Warning>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<WarningRow> = warnings::table
            .filter(warnings::active.eq(true))
            .select(WarningRow::as_select())
            .order(warnings::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(row_to_warning).collect())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use chrono::Utc;
    use rstest::rstest;

    #[rstest]
    fn rows_convert_without_loss() {
        let now = Utc::now();
        let author = Uuid::new_v4();
        let row = WarningRow {
            id: Uuid::new_v4(),
            machine_id: Uuid::new_v4(),
            warning_text: "oil low".to_owned(),
            created_by: Some(author),
            active: true,
            created_at: now,
        };
        let id = row.id;

        let warning = row_to_warning(row);
        assert_eq!(warning.id, id);
        assert_eq!(warning.warning_text, "oil low");
        assert_eq!(warning.created_by, Some(author));
        assert!(warning.active);
    }
}
