//! Status rules engine.
//!
//! Machine status is derived from fault and warning lifecycle events rather
//! than computed from scratch on every read. The original system spread the
//! transitions across its request handlers; every transition now lives here
//! and the persistence adapters apply these functions inside the same
//! transaction as the triggering write, so the call sites cannot drift.

use chrono::{DateTime, Utc};

use super::machine::{Machine, MachineStatus};

/// Ordering priority for a machine status. Lower sorts first.
///
/// `None` covers status labels the schema no longer recognises and sorts
/// last; persisted rows are constrained to the known labels, so the branch
/// only matters across schema drift.
pub const fn priority(status: Option<MachineStatus>) -> u8 {
    match status {
        Some(MachineStatus::Fault) => 1,
        Some(MachineStatus::Warning) => 2,
        Some(MachineStatus::Ok) => 3,
        None => 4,
    }
}

/// Sort key for machine listings and exports: faulty machines first, then
/// warnings, then healthy, each group oldest-first.
pub const fn sort_key(status: MachineStatus, created_at: DateTime<Utc>) -> (u8, DateTime<Utc>) {
    (priority(Some(status)), created_at)
}

/// Order machines by (priority ascending, created_at ascending).
///
/// The sort is stable, so machines with equal status and creation time keep
/// their fetch order.
pub fn sort_machines(machines: &mut [Machine]) {
    machines.sort_by_key(|machine| sort_key(machine.status, machine.created_at));
}

/// Status applied to a machine when a fault case is reported against it.
/// Unconditional: any prior status becomes `Fault`.
pub const fn status_after_fault_reported() -> MachineStatus {
    MachineStatus::Fault
}

/// Status applied to a machine when an active warning is raised.
///
/// Unconditional, which means a machine already in `Fault` is downgraded to
/// `Warning`. The source system behaves this way and the behaviour is kept
/// as-is; see DESIGN.md before changing it.
pub const fn status_after_warning_created() -> MachineStatus {
    MachineStatus::Warning
}

/// Status applied to a machine when one of its fault cases is resolved.
///
/// Unconditional even when other open fault cases or active warnings remain
/// on the machine. Known simplification carried over from the source
/// system; see DESIGN.md.
pub const fn status_after_fault_resolved() -> MachineStatus {
    MachineStatus::Ok
}

/// Status change after a warning is deleted, given how many active warnings
/// remain on the machine. `None` means the status is left unchanged.
pub const fn status_after_warning_deleted(remaining_active: usize) -> Option<MachineStatus> {
    if remaining_active == 0 {
        Some(MachineStatus::Ok)
    } else {
        None
    }
}

/// Whether `text` duplicates one of the machine's existing active warnings.
///
/// Matching is a case-insensitive exact comparison with Unicode folding,
/// so "ÖL NIEDRIG" and "öl niedrig" are the same warning. A duplicate
/// suppresses row creation without raising an error, but the status
/// transition of [`status_after_warning_created`] still fires.
pub fn is_duplicate_warning<S: AsRef<str>>(existing_active: &[S], text: &str) -> bool {
    let folded = text.to_lowercase();
    existing_active
        .iter()
        .any(|current| current.as_ref().to_lowercase() == folded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;
    use uuid::Uuid;

    fn machine(status: MachineStatus, created_minute: u32) -> Machine {
        let created_at = Utc
            .with_ymd_and_hms(2026, 3, 1, 8, created_minute, 0)
            .single()
            .expect("valid fixture timestamp");
        Machine {
            id: Uuid::new_v4(),
            name: format!("machine-{created_minute}"),
            description: String::new(),
            status,
            image_path: None,
            created_at,
            updated_at: created_at,
        }
    }

    #[rstest]
    fn priority_is_total_and_ordered() {
        let fault = priority(Some(MachineStatus::Fault));
        let warning = priority(Some(MachineStatus::Warning));
        let ok = priority(Some(MachineStatus::Ok));
        let unknown = priority(None);
        assert!(fault < warning && warning < ok && ok < unknown);
    }

    #[rstest]
    fn sorts_by_priority_then_oldest_first() {
        let mut machines = vec![
            machine(MachineStatus::Ok, 1),
            machine(MachineStatus::Fault, 30),
            machine(MachineStatus::Warning, 10),
            machine(MachineStatus::Fault, 5),
        ];
        sort_machines(&mut machines);

        let order: Vec<(MachineStatus, u32)> = machines
            .iter()
            .map(|m| (m.status, m.created_at.format("%M").to_string().parse().expect("minute")))
            .collect();
        assert_eq!(
            order,
            vec![
                (MachineStatus::Fault, 5),
                (MachineStatus::Fault, 30),
                (MachineStatus::Warning, 10),
                (MachineStatus::Ok, 1),
            ]
        );
    }

    #[rstest]
    fn fault_report_always_forces_fault() {
        assert_eq!(status_after_fault_reported(), MachineStatus::Fault);
    }

    #[rstest]
    fn warning_creation_forces_warning_even_over_fault() {
        // Downgrade from Fault is deliberate source-compatible behaviour.
        assert_eq!(status_after_warning_created(), MachineStatus::Warning);
    }

    #[rstest]
    fn resolve_always_resets_to_ok() {
        assert_eq!(status_after_fault_resolved(), MachineStatus::Ok);
    }

    #[rstest]
    #[case(0, Some(MachineStatus::Ok))]
    #[case(1, None)]
    #[case(4, None)]
    fn warning_deletion_resets_only_when_last(
        #[case] remaining: usize,
        #[case] expected: Option<MachineStatus>,
    ) {
        assert_eq!(status_after_warning_deleted(remaining), expected);
    }

    #[rstest]
    #[case(&["oil low"], "Oil Low", true)]
    #[case(&["oil low"], "OIL LOW", true)]
    #[case(&["oil low"], "oil low", true)]
    #[case(&["oil low"], "oil very low", false)]
    #[case(&["ÖL NIEDRIG"], "öl niedrig", true)]
    #[case(&["öl niedrig"], "ÖL NIEDRIG", true)]
    #[case(&[], "oil low", false)]
    fn duplicate_check_is_case_insensitive(
        #[case] existing: &[&str],
        #[case] text: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(is_duplicate_warning(existing, text), expected);
    }
}
