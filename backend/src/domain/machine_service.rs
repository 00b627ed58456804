//! Machine administration: creation with collection membership, deletion.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use super::collection::CollectionName;
use super::ports::{
    map_persistence_error, CollectionRepository, MachineAdmin, MachineRepository, MutationOutcome,
};
use super::machine::NewMachine;
use super::role::{Actor, Role};
use super::Error;

/// Machine administration use-cases.
#[derive(Clone)]
pub struct MachineService {
    machines: Arc<dyn MachineRepository>,
    collections: Arc<dyn CollectionRepository>,
}

impl MachineService {
    /// Create a new service with the given repositories.
    pub fn new(
        machines: Arc<dyn MachineRepository>,
        collections: Arc<dyn CollectionRepository>,
    ) -> Self {
        Self {
            machines,
            collections,
        }
    }

    fn require_manager(actor: &Actor) -> Result<(), Error> {
        if actor.superuser || actor.role == Some(Role::Manager) {
            Ok(())
        } else {
            Err(Error::forbidden("you are not authorized to manage machines"))
        }
    }
}

#[async_trait]
impl MachineAdmin for MachineService {
    async fn add_machine(
        &self,
        actor: &Actor,
        machine: NewMachine,
        collection_ids: Vec<Uuid>,
        new_collections: Vec<String>,
    ) -> Result<MutationOutcome, Error> {
        Self::require_manager(actor)?;
        let machine = self
            .machines
            .create(machine)
            .await
            .map_err(map_persistence_error)?;

        // Membership links are tolerant: an unknown collection id or an
        // invalid new name skips that entry without failing the creation.
        for collection_id in collection_ids {
            let linked = self
                .collections
                .add_machine(collection_id, machine.id)
                .await
                .map_err(map_persistence_error)?;
            if !linked {
                debug!(%collection_id, machine_id = %machine.id, "unknown collection id skipped");
            }
        }
        for name in new_collections {
            let Ok(name) = CollectionName::new(name.trim()) else {
                debug!(machine_id = %machine.id, "invalid collection name skipped");
                continue;
            };
            let collection = self
                .collections
                .get_or_create(&name)
                .await
                .map_err(map_persistence_error)?;
            self.collections
                .add_machine(collection.id, machine.id)
                .await
                .map_err(map_persistence_error)?;
        }

        debug!(machine_id = %machine.id, name = %machine.name, "machine created");
        Ok(MutationOutcome::Applied)
    }

    async fn delete_machine(
        &self,
        actor: &Actor,
        machine_id: Uuid,
    ) -> Result<MutationOutcome, Error> {
        Self::require_manager(actor)?;
        let deleted = self
            .machines
            .delete(machine_id)
            .await
            .map_err(map_persistence_error)?;
        Ok(if deleted {
            MutationOutcome::Applied
        } else {
            MutationOutcome::NoOp
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::collection::Collection;
    use crate::domain::machine::{Machine, MachineStatus};
    use crate::domain::ports::{MockCollectionRepository, MockMachineRepository};
    use crate::domain::ErrorCode;
    use chrono::Utc;
    use rstest::rstest;

    fn manager() -> Actor {
        Actor {
            user_id: Uuid::new_v4(),
            username: "boss".to_owned(),
            role: Some(Role::Manager),
            superuser: false,
        }
    }

    fn created_machine(spec: NewMachine) -> Machine {
        let now = Utc::now();
        Machine {
            id: Uuid::new_v4(),
            name: spec.name,
            description: spec.description,
            status: MachineStatus::Ok,
            image_path: spec.image_path,
            created_at: now,
            updated_at: now,
        }
    }

    fn new_machine() -> NewMachine {
        NewMachine {
            name: "lathe-7".to_owned(),
            description: "spindle lathe".to_owned(),
            image_path: None,
        }
    }

    fn service(
        machines: MockMachineRepository,
        collections: MockCollectionRepository,
    ) -> MachineService {
        MachineService::new(Arc::new(machines), Arc::new(collections))
    }

    #[rstest]
    #[case(Some(Role::Technician))]
    #[case(Some(Role::Repair))]
    #[case(Some(Role::ViewOnly))]
    #[case(None)]
    #[actix_rt::test]
    async fn creation_requires_the_manager_role(#[case] role: Option<Role>) {
        let actor = Actor {
            role,
            ..manager()
        };
        let err = service(MockMachineRepository::new(), MockCollectionRepository::new())
            .add_machine(&actor, new_machine(), vec![], vec![])
            .await
            .expect_err("gate must hold");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[actix_rt::test]
    async fn invalid_new_collection_names_are_skipped() {
        let mut machines = MockMachineRepository::new();
        machines.expect_create().return_once(|spec| Ok(created_machine(spec)));
        let mut collections = MockCollectionRepository::new();
        // Only the valid name reaches get_or_create.
        collections
            .expect_get_or_create()
            .withf(|name| name.as_str() == "presses")
            .return_once(|name| {
                Ok(Collection {
                    id: Uuid::new_v4(),
                    name: name.as_str().to_owned(),
                })
            });
        collections.expect_add_machine().return_once(|_, _| Ok(true));

        let outcome = service(machines, collections)
            .add_machine(
                &manager(),
                new_machine(),
                vec![],
                vec!["presses".to_owned(), "north wing!".to_owned()],
            )
            .await
            .expect("creation succeeds");
        assert_eq!(outcome, MutationOutcome::Applied);
    }

    #[actix_rt::test]
    async fn unknown_collection_ids_do_not_fail_creation() {
        let mut machines = MockMachineRepository::new();
        machines.expect_create().return_once(|spec| Ok(created_machine(spec)));
        let mut collections = MockCollectionRepository::new();
        collections.expect_add_machine().return_once(|_, _| Ok(false));

        let outcome = service(machines, collections)
            .add_machine(&manager(), new_machine(), vec![Uuid::new_v4()], vec![])
            .await
            .expect("creation tolerates stale ids");
        assert_eq!(outcome, MutationOutcome::Applied);
    }

    #[actix_rt::test]
    async fn deleting_a_missing_machine_is_a_noop() {
        let mut machines = MockMachineRepository::new();
        machines.expect_delete().return_once(|_| Ok(false));

        let outcome = service(machines, MockCollectionRepository::new())
            .delete_machine(&manager(), Uuid::new_v4())
            .await
            .expect("missing target must not error");
        assert_eq!(outcome, MutationOutcome::NoOp);
    }

    #[actix_rt::test]
    async fn superusers_may_delete_machines() {
        let actor = Actor {
            role: None,
            superuser: true,
            ..manager()
        };
        let mut machines = MockMachineRepository::new();
        machines.expect_delete().return_once(|_| Ok(true));

        let outcome = service(machines, MockCollectionRepository::new())
            .delete_machine(&actor, Uuid::new_v4())
            .await
            .expect("superusers bypass the role gate");
        assert_eq!(outcome, MutationOutcome::Applied);
    }
}
