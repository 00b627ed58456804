//! Role-gated dashboard queries and report rows.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use super::machine::Machine;
use super::ports::{
    map_persistence_error, AssignmentRepository, CollectionRepository, DashboardQuery,
    FaultCaseRepository, MachineRepository, PersistenceError, UserRepository, WarningRepository,
};
use super::role::{authorize, Actor, Dashboard, Role};
use super::rules;
use super::views::{
    ManagerOverview, RepairBoard, ReportFilter, ReportRow, StatusBoard, StatusCounts,
    TechnicianBoard,
};
use super::Error;

/// How many recent fault cases the manager overview shows.
const RECENT_FAULT_LIMIT: i64 = 5;

/// Dashboard read-side backed by the repository ports.
#[derive(Clone)]
pub struct DashboardService {
    machines: Arc<dyn MachineRepository>,
    faults: Arc<dyn FaultCaseRepository>,
    warnings: Arc<dyn WarningRepository>,
    collections: Arc<dyn CollectionRepository>,
    users: Arc<dyn UserRepository>,
    assignments: Arc<dyn AssignmentRepository>,
}

/// Parameter object bundling the repositories the dashboard reads from.
pub struct DashboardPorts {
    /// Machine listings.
    pub machines: Arc<dyn MachineRepository>,
    /// Fault case listings.
    pub faults: Arc<dyn FaultCaseRepository>,
    /// Warning listings.
    pub warnings: Arc<dyn WarningRepository>,
    /// Collection listings and membership names.
    pub collections: Arc<dyn CollectionRepository>,
    /// Account listings.
    pub users: Arc<dyn UserRepository>,
    /// Assignment listings.
    pub assignments: Arc<dyn AssignmentRepository>,
}

impl DashboardService {
    /// Create a new service from the repository bundle.
    pub fn new(ports: DashboardPorts) -> Self {
        Self {
            machines: ports.machines,
            faults: ports.faults,
            warnings: ports.warnings,
            collections: ports.collections,
            users: ports.users,
            assignments: ports.assignments,
        }
    }

    async fn sorted_all_machines(&self) -> Result<Vec<Machine>, PersistenceError> {
        let mut machines = self.machines.list_all().await?;
        rules::sort_machines(&mut machines);
        Ok(machines)
    }

    async fn sorted_assigned_machines(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Machine>, PersistenceError> {
        let mut machines = self.machines.list_assigned_to(user_id).await?;
        rules::sort_machines(&mut machines);
        Ok(machines)
    }

    async fn machines_for_filter(
        &self,
        filter: ReportFilter,
    ) -> Result<Vec<Machine>, PersistenceError> {
        let mut machines = match filter {
            ReportFilter::All => self.machines.list_all().await?,
            ReportFilter::Machine(id) => self.machines.find(id).await?.into_iter().collect(),
            ReportFilter::Collection(id) => self.machines.list_in_collection(id).await?,
        };
        rules::sort_machines(&mut machines);
        Ok(machines)
    }
}

#[async_trait]
impl DashboardQuery for DashboardService {
    async fn manager_overview(
        &self,
        actor: &Actor,
        collection_filter: Option<Uuid>,
    ) -> Result<ManagerOverview, Error> {
        authorize(Dashboard::Manager, actor)?;

        let all_machines = self.sorted_all_machines().await.map_err(map_persistence_error)?;
        // Counts always summarise the whole fleet, even when the listing
        // below is collection-filtered.
        let counts = StatusCounts::tally(&all_machines);
        let machines = match collection_filter {
            Some(collection_id) => {
                let mut filtered = self
                    .machines
                    .list_in_collection(collection_id)
                    .await
                    .map_err(map_persistence_error)?;
                rules::sort_machines(&mut filtered);
                filtered
            }
            None => all_machines,
        };

        let recent_fault_cases = self
            .faults
            .list_recent(RECENT_FAULT_LIMIT)
            .await
            .map_err(map_persistence_error)?;
        let collections = self.collections.list().await.map_err(map_persistence_error)?;
        let technicians = self
            .users
            .list_by_role(Role::Technician)
            .await
            .map_err(map_persistence_error)?;
        let repair_personnel = self
            .users
            .list_by_role(Role::Repair)
            .await
            .map_err(map_persistence_error)?;
        let users = self
            .users
            .list_deletable(actor.user_id)
            .await
            .map_err(map_persistence_error)?;

        Ok(ManagerOverview {
            counts,
            recent_fault_cases,
            collections,
            machines,
            technicians,
            repair_personnel,
            users,
        })
    }

    async fn technician_board(&self, actor: &Actor) -> Result<TechnicianBoard, Error> {
        authorize(Dashboard::Technician, actor)?;
        let assigned_machines = self
            .sorted_assigned_machines(actor.user_id)
            .await
            .map_err(map_persistence_error)?;
        let all_machines = self.sorted_all_machines().await.map_err(map_persistence_error)?;
        let open_fault_cases = self
            .faults
            .list_outstanding_for_actor(actor.user_id)
            .await
            .map_err(map_persistence_error)?;
        Ok(TechnicianBoard {
            assigned_machines,
            all_machines,
            open_fault_cases,
        })
    }

    async fn repair_board(&self, actor: &Actor) -> Result<RepairBoard, Error> {
        authorize(Dashboard::Repair, actor)?;
        let assigned_machines = self
            .sorted_assigned_machines(actor.user_id)
            .await
            .map_err(map_persistence_error)?;
        let all_machines = self.sorted_all_machines().await.map_err(map_persistence_error)?;
        let repair_cases = self
            .faults
            .list_outstanding()
            .await
            .map_err(map_persistence_error)?;
        let warnings = self.warnings.list_active().await.map_err(map_persistence_error)?;
        Ok(RepairBoard {
            assigned_machines,
            all_machines,
            repair_cases,
            warnings,
        })
    }

    async fn viewonly_board(&self, actor: &Actor) -> Result<StatusBoard, Error> {
        authorize(Dashboard::ViewOnly, actor)?;
        let machines = self.sorted_all_machines().await.map_err(map_persistence_error)?;
        let counts = StatusCounts::tally(&machines);
        Ok(StatusBoard { machines, counts })
    }

    async fn report_rows(
        &self,
        actor: &Actor,
        filter: ReportFilter,
    ) -> Result<Vec<ReportRow>, Error> {
        // Export carries the same gate as the status board: any
        // authenticated actor.
        authorize(Dashboard::ViewOnly, actor)?;
        let machines = self
            .machines_for_filter(filter)
            .await
            .map_err(map_persistence_error)?;

        let mut rows = Vec::with_capacity(machines.len());
        for machine in machines {
            let collections = self
                .collections
                .names_for_machine(machine.id)
                .await
                .map_err(map_persistence_error)?;
            let assigned = self
                .assignments
                .assigned_users(machine.id)
                .await
                .map_err(map_persistence_error)?
                .into_iter()
                .map(|account| account.username)
                .collect();
            rows.push(ReportRow {
                name: machine.name,
                status: machine.status.as_str().to_owned(),
                description: machine.description,
                collections,
                assigned,
            });
        }
        Ok(rows)
    }
}
