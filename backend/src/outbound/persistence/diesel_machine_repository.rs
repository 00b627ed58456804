//! PostgreSQL-backed `MachineRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::machine::{Machine, MachineStatus, NewMachine};
use crate::domain::ports::{MachineRepository, PersistenceError};

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::models::{row_to_machine, MachineRow, NewMachineRow};
use super::pool::DbPool;
use super::schema::{collection_machines, machine_assignments, machines};

/// Diesel-backed implementation of the `MachineRepository` port.
///
/// Machines are created healthy; status transitions happen inside the
/// fault and warning repositories, never here.
#[derive(Clone)]
pub struct DieselMachineRepository {
    pool: DbPool,
}

impl DieselMachineRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn collect_machines(rows: Vec<MachineRow>) -> Result<Vec<Machine>, PersistenceError> {
    rows.into_iter().map(row_to_machine).collect()
}

#[async_trait]
impl MachineRepository for DieselMachineRepository {
    async fn create(&self, machine: NewMachine) -> Result<Machine, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewMachineRow {
            id: Uuid::new_v4(),
            name: &machine.name,
            description: &machine.description,
            status: MachineStatus::Ok.as_str(),
            image_path: machine.image_path.as_deref(),
        };

        let row: MachineRow = diesel::insert_into(machines::table)
            .values(&new_row)
            .returning(MachineRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_machine(row)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Machine>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<MachineRow> = machines::table
            .filter(machines::id.eq(id))
            .select(MachineRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_machine).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Machine>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<MachineRow> = machines::table
            .select(MachineRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        collect_machines(rows)
    }

    async fn list_in_collection(
        &self,
        collection_id: Uuid,
    ) -> Result<Vec<Machine>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<MachineRow> = machines::table
            .inner_join(collection_machines::table)
            .filter(collection_machines::collection_id.eq(collection_id))
            .select(MachineRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        collect_machines(rows)
    }

    async fn list_assigned_to(&self, user_id: Uuid) -> Result<Vec<Machine>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<MachineRow> = machines::table
            .inner_join(machine_assignments::table)
            .filter(machine_assignments::user_id.eq(user_id))
            .select(MachineRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        collect_machines(rows)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // Fault cases, notes, warnings, assignments, and collection links
        // cascade at the database level.
        let deleted = diesel::delete(machines::table.filter(machines::id.eq(id)))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use chrono::Utc;
    use rstest::rstest;

    fn row(status: &str) -> MachineRow {
        let now = Utc::now();
        MachineRow {
            id: Uuid::new_v4(),
            name: "press-1".to_owned(),
            description: String::new(),
            status: status.to_owned(),
            image_path: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    fn collects_all_rows_when_labels_are_known() {
        let machines = collect_machines(vec![row("OK"), row("Fault")]).expect("known labels");
        assert_eq!(machines.len(), 2);
    }

    #[rstest]
    fn a_single_drifted_row_fails_the_listing() {
        let err = collect_machines(vec![row("OK"), row("exploded")])
            .expect_err("drifted label must surface");
        assert!(matches!(err, PersistenceError::Query { .. }));
    }
}
