//! PostgreSQL-backed `AssignmentRepository` implementation using Diesel ORM.
//!
//! The exclusive role-slot semantics (clear every holder of the role, then
//! add the target) run inside one transaction so two concurrent
//! re-assignments cannot leave a machine with two technicians.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::auth::UserAccount;
use crate::domain::ports::{AssignmentOutcome, AssignmentRepository, PersistenceError};
use crate::domain::role::Role;

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::models::{rows_to_account, NewMachineAssignmentRow, UserRow};
use super::pool::DbPool;
use super::schema::{machine_assignments, machines, user_profiles, users};

/// Diesel-backed implementation of the `AssignmentRepository` port.
#[derive(Clone)]
pub struct DieselAssignmentRepository {
    pool: DbPool,
}

impl DieselAssignmentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AssignmentRepository for DieselAssignmentRepository {
    async fn assign_exclusive(
        &self,
        machine_id: Uuid,
        target_user_id: Uuid,
        role: Role,
    ) -> Result<AssignmentOutcome, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let outcome = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    let machine_exists: Option<Uuid> = machines::table
                        .filter(machines::id.eq(machine_id))
                        .select(machines::id)
                        .first(conn)
                        .await
                        .optional()?;
                    if machine_exists.is_none() {
                        return Ok(AssignmentOutcome::MachineNotFound);
                    }

                    // Clear every current holder of the role slot. This
                    // happens even when the target below turns out invalid.
                    let role_holders = user_profiles::table
                        .filter(user_profiles::role.eq(role.as_str()))
                        .select(user_profiles::user_id);
                    diesel::delete(
                        machine_assignments::table
                            .filter(machine_assignments::machine_id.eq(machine_id))
                            .filter(machine_assignments::user_id.eq_any(role_holders)),
                    )
                    .execute(conn)
                    .await?;

                    let target_holds_role: Option<Uuid> = user_profiles::table
                        .filter(user_profiles::user_id.eq(target_user_id))
                        .filter(user_profiles::role.eq(role.as_str()))
                        .select(user_profiles::user_id)
                        .first(conn)
                        .await
                        .optional()?;
                    if target_holds_role.is_none() {
                        return Ok(AssignmentOutcome::ClearedOnly);
                    }

                    diesel::insert_into(machine_assignments::table)
                        .values(&NewMachineAssignmentRow {
                            id: Uuid::new_v4(),
                            machine_id,
                            user_id: target_user_id,
                        })
                        .on_conflict((
                            machine_assignments::machine_id,
                            machine_assignments::user_id,
                        ))
                        .do_nothing()
                        .execute(conn)
                        .await?;
                    Ok(AssignmentOutcome::Assigned)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        Ok(outcome)
    }

    async fn assigned_users(&self, machine_id: Uuid) -> Result<Vec<UserAccount>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<(UserRow, Option<String>)> = users::table
            .inner_join(machine_assignments::table)
            .left_join(user_profiles::table)
            .filter(machine_assignments::machine_id.eq(machine_id))
            .select((UserRow::as_select(), user_profiles::role.nullable()))
            .order(users::username.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows
            .into_iter()
            .map(|(user, role)| rows_to_account(user, role))
            .collect())
    }
}
