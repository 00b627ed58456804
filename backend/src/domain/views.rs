//! Read models served by the dashboard and reporting queries.

use serde::Serialize;
use utoipa::ToSchema;

use super::auth::UserAccount;
use super::collection::Collection;
use super::fault::FaultCase;
use super::machine::Machine;
use super::warning::Warning;

/// Machine counts per status bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    /// Machines with status `OK`.
    pub ok: usize,
    /// Machines with status `Warning`.
    pub warning: usize,
    /// Machines with status `Fault`.
    pub fault: usize,
}

impl StatusCounts {
    /// Tally counts from a machine listing.
    pub fn tally(machines: &[Machine]) -> Self {
        use crate::domain::machine::MachineStatus;
        let mut counts = Self::default();
        for machine in machines {
            match machine.status {
                MachineStatus::Ok => counts.ok += 1,
                MachineStatus::Warning => counts.warning += 1,
                MachineStatus::Fault => counts.fault += 1,
            }
        }
        counts
    }
}

/// Manager dashboard payload.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManagerOverview {
    /// Status summary across all machines.
    pub counts: StatusCounts,
    /// The five most recently reported fault cases.
    pub recent_fault_cases: Vec<FaultCase>,
    /// All collections, for the filter control.
    pub collections: Vec<Collection>,
    /// Machines (optionally collection-filtered), priority-ordered.
    pub machines: Vec<Machine>,
    /// Accounts holding the Technician role.
    pub technicians: Vec<UserAccount>,
    /// Accounts holding the Repair role.
    pub repair_personnel: Vec<UserAccount>,
    /// Deletable accounts: non-superusers other than the requester.
    pub users: Vec<UserAccount>,
}

/// Technician dashboard payload.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TechnicianBoard {
    /// Machines assigned to the actor, priority-ordered.
    pub assigned_machines: Vec<Machine>,
    /// All machines for broader context, priority-ordered.
    pub all_machines: Vec<Machine>,
    /// Outstanding fault cases the actor reported or owns via assignment.
    pub open_fault_cases: Vec<FaultCase>,
}

/// Repair dashboard payload.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RepairBoard {
    /// Machines assigned to the actor, priority-ordered.
    pub assigned_machines: Vec<Machine>,
    /// All machines, priority-ordered.
    pub all_machines: Vec<Machine>,
    /// All outstanding fault cases.
    pub repair_cases: Vec<FaultCase>,
    /// All active warnings.
    pub warnings: Vec<Warning>,
}

/// View-only dashboard payload.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusBoard {
    /// All machines, priority-ordered.
    pub machines: Vec<Machine>,
    /// Status summary.
    pub counts: StatusCounts,
}

/// Report scope selector for CSV export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFilter {
    /// Every machine.
    #[default]
    All,
    /// A single machine by id.
    Machine(uuid::Uuid),
    /// Machines in a collection, each exactly once.
    Collection(uuid::Uuid),
}

/// One exported machine row.
///
/// Collections and assigned usernames are comma-joined by the CSV adapter;
/// their order here is deterministic per run (sorted by name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ReportRow {
    /// Machine name.
    pub name: String,
    /// Status label (`OK`, `Warning`, `Fault`).
    pub status: String,
    /// Machine description.
    pub description: String,
    /// Names of containing collections.
    pub collections: Vec<String>,
    /// Usernames of assigned personnel.
    pub assigned: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::machine::MachineStatus;
    use chrono::Utc;
    use rstest::rstest;
    use uuid::Uuid;

    fn machine(status: MachineStatus) -> Machine {
        let now = Utc::now();
        Machine {
            id: Uuid::new_v4(),
            name: "press".to_owned(),
            description: String::new(),
            status,
            image_path: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    fn tally_counts_each_bucket() {
        let machines = vec![
            machine(MachineStatus::Ok),
            machine(MachineStatus::Ok),
            machine(MachineStatus::Warning),
            machine(MachineStatus::Fault),
        ];
        let counts = StatusCounts::tally(&machines);
        assert_eq!(
            counts,
            StatusCounts {
                ok: 2,
                warning: 1,
                fault: 1
            }
        );
    }
}
