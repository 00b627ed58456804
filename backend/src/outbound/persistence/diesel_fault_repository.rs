//! PostgreSQL-backed `FaultCaseRepository` implementation using Diesel ORM.
//!
//! Reporting and resolving faults must move the owning machine's status in
//! the same breath, so those methods wrap both writes in one transaction.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::fault::{FaultCase, FaultNote, FaultStatus, NoteContent};
use crate::domain::ports::{FaultCaseRepository, PersistenceError};
use crate::domain::rules;

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::models::{
    row_to_fault_case, row_to_fault_note, FaultCaseRow, FaultNoteRow, NewFaultCaseRow,
    NewFaultNoteRow,
};
use super::pool::DbPool;
use super::schema::{fault_cases, fault_notes, machine_assignments, machines};

/// Statuses that count as outstanding work.
const OUTSTANDING: [&str; 2] = [FaultStatus::Open.as_str(), FaultStatus::InProgress.as_str()];

/// Diesel-backed implementation of the `FaultCaseRepository` port.
#[derive(Clone)]
pub struct DieselFaultRepository {
    pool: DbPool,
}

impl DieselFaultRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn collect_fault_cases(rows: Vec<FaultCaseRow>) -> Result<Vec<FaultCase>, PersistenceError> {
    rows.into_iter().map(row_to_fault_case).collect()
}

#[async_trait]
impl FaultCaseRepository for DieselFaultRepository {
    async fn create_open(
        &self,
        machine_id: Uuid,
        reported_by: Uuid,
        title: Option<String>,
    ) -> Result<Option<FaultCase>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<FaultCaseRow> = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    // Touching the machine first doubles as the existence
                    // check: zero rows means the id did not resolve.
                    let touched =
                        diesel::update(machines::table.filter(machines::id.eq(machine_id)))
                            .set((
                                machines::status
                                    .eq(rules::status_after_fault_reported().as_str()),
                                machines::updated_at.eq(diesel::dsl::now),
                            ))
                            .execute(conn)
                            .await?;
                    if touched == 0 {
                        return Ok(None);
                    }

                    let new_row = NewFaultCaseRow {
                        id: Uuid::new_v4(),
                        machine_id,
                        reported_by: Some(reported_by),
                        status: FaultStatus::Open.as_str(),
                        title: title.as_deref(),
                    };
                    let row = diesel::insert_into(fault_cases::table)
                        .values(&new_row)
                        .returning(FaultCaseRow::as_returning())
                        .get_result(conn)
                        .await?;
                    Ok(Some(row))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        row.map(row_to_fault_case).transpose()
    }

    async fn start_progress(&self, fault_id: Uuid) -> Result<bool, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // Only open cases move forward; repeated submissions are no-ops.
        let updated = diesel::update(
            fault_cases::table
                .filter(fault_cases::id.eq(fault_id))
                .filter(fault_cases::status.eq(FaultStatus::Open.as_str())),
        )
        .set((
            fault_cases::status.eq(FaultStatus::InProgress.as_str()),
            fault_cases::updated_at.eq(diesel::dsl::now),
        ))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(updated > 0)
    }

    async fn resolve(&self, fault_id: Uuid) -> Result<bool, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let machine_id: Option<Uuid> = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    let machine_id =
                        diesel::update(fault_cases::table.filter(fault_cases::id.eq(fault_id)))
                            .set((
                                fault_cases::status.eq(FaultStatus::Resolved.as_str()),
                                fault_cases::updated_at.eq(diesel::dsl::now),
                            ))
                            .returning(fault_cases::machine_id)
                            .get_result::<Uuid>(conn)
                            .await
                            .optional()?;

                    if let Some(machine_id) = machine_id {
                        diesel::update(machines::table.filter(machines::id.eq(machine_id)))
                            .set((
                                machines::status
                                    .eq(rules::status_after_fault_resolved().as_str()),
                                machines::updated_at.eq(diesel::dsl::now),
                            ))
                            .execute(conn)
                            .await?;
                    }
                    Ok(machine_id)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        Ok(machine_id.is_some())
    }

    async fn add_note(
        &self,
        fault_id: Uuid,
        content: NoteContent,
        created_by: Uuid,
    ) -> Result<Option<FaultNote>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<FaultNoteRow> = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    let exists: Option<Uuid> = fault_cases::table
                        .filter(fault_cases::id.eq(fault_id))
                        .select(fault_cases::id)
                        .first(conn)
                        .await
                        .optional()?;
                    if exists.is_none() {
                        return Ok(None);
                    }

                    let new_row = NewFaultNoteRow {
                        id: Uuid::new_v4(),
                        fault_case_id: fault_id,
                        note: &content.note,
                        image_path: content.image_path.as_deref(),
                        created_by: Some(created_by),
                    };
                    let row = diesel::insert_into(fault_notes::table)
                        .values(&new_row)
                        .returning(FaultNoteRow::as_returning())
                        .get_result(conn)
                        .await?;
                    Ok(Some(row))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_fault_note))
    }

    async fn list_outstanding(&self) -> Result<Vec<FaultCase>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<FaultCaseRow> = fault_cases::table
            .filter(fault_cases::status.eq_any(OUTSTANDING))
            .select(FaultCaseRow::as_select())
            .order(fault_cases::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        collect_fault_cases(rows)
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<FaultCase>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<FaultCaseRow> = fault_cases::table
            .select(FaultCaseRow::as_select())
            .order(fault_cases::created_at.desc())
            .limit(limit)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        collect_fault_cases(rows)
    }

    async fn list_outstanding_for_actor(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<FaultCase>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let assigned_machines = machine_assignments::table
            .filter(machine_assignments::user_id.eq(user_id))
            .select(machine_assignments::machine_id);

        let rows: Vec<FaultCaseRow> = fault_cases::table
            .filter(fault_cases::status.eq_any(OUTSTANDING))
            .filter(
                fault_cases::reported_by
                    .eq(Some(user_id))
                    .or(fault_cases::machine_id.eq_any(assigned_machines)),
            )
            .select(FaultCaseRow::as_select())
            .order(fault_cases::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        collect_fault_cases(rows)
    }

    async fn list_notes(&self, fault_id: Uuid) -> Result<Vec<FaultNote>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<FaultNoteRow> = fault_notes::table
            .filter(fault_notes::fault_case_id.eq(fault_id))
            .select(FaultNoteRow::as_select())
            .order(fault_notes::created_at.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(row_to_fault_note).collect())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use chrono::Utc;
    use rstest::rstest;

    fn row(status: &str) -> FaultCaseRow {
        let now = Utc::now();
        FaultCaseRow {
            id: Uuid::new_v4(),
            machine_id: Uuid::new_v4(),
            reported_by: None,
            status: status.to_owned(),
            title: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    fn outstanding_labels_match_the_lifecycle() {
        for label in OUTSTANDING {
            let status: FaultStatus = label.parse().expect("label parses");
            assert!(status.is_outstanding());
        }
        assert!(!OUTSTANDING.contains(&FaultStatus::Resolved.as_str()));
    }

    #[rstest]
    fn collects_all_rows_when_labels_are_known() {
        let cases =
            collect_fault_cases(vec![row("open"), row("in_progress")]).expect("known labels");
        assert_eq!(cases.len(), 2);
    }

    #[rstest]
    fn a_single_drifted_row_fails_the_listing() {
        let err = collect_fault_cases(vec![row("open"), row("Open")])
            .expect_err("labels are case-sensitive");
        assert!(matches!(err, PersistenceError::Query { .. }));
    }
}
