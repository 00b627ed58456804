//! Account directory: login, registration, and user administration.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, warn};
use uuid::Uuid;

use super::auth::{LoginCredentials, Registration, UserAccount};
use super::ports::{
    map_persistence_error, AccountCommand, MutationOutcome, PasswordHashError, PasswordHasher,
    UserRepository,
};
use super::role::{Actor, Role};
use super::Error;

/// Account use-cases backed by the user repository and password hasher.
#[derive(Clone)]
pub struct DirectoryService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl DirectoryService {
    /// Create a new service with the given ports.
    pub fn new(users: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { users, hasher }
    }

    fn map_hash_error(error: PasswordHashError) -> Error {
        let PasswordHashError::Crypto { message } = error;
        Error::internal(format!("password hashing failed: {message}"))
    }

    fn actor_from_account(account: UserAccount) -> Actor {
        Actor {
            user_id: account.id,
            username: account.username,
            role: account.role,
            superuser: account.is_superuser,
        }
    }

    /// Only managers (or superusers) may administer accounts.
    fn require_manager(actor: &Actor) -> Result<(), Error> {
        if actor.superuser || actor.role == Some(Role::Manager) {
            Ok(())
        } else {
            Err(Error::forbidden("you are not authorized to manage users"))
        }
    }
}

#[async_trait]
impl AccountCommand for DirectoryService {
    async fn login(&self, credentials: &LoginCredentials) -> Result<Actor, Error> {
        let stored = self
            .users
            .find_credentials(credentials.username())
            .await
            .map_err(map_persistence_error)?;
        // Identical failure for unknown usernames and wrong passwords so
        // the login form does not leak which usernames exist.
        let Some(stored) = stored else {
            return Err(Error::unauthorized("invalid username or password"));
        };
        let verified = self
            .hasher
            .verify(credentials.password(), &stored.password_hash)
            .map_err(Self::map_hash_error)?;
        if !verified {
            return Err(Error::unauthorized("invalid username or password"));
        }
        let account = self
            .users
            .find(stored.user_id)
            .await
            .map_err(map_persistence_error)?
            .ok_or_else(|| Error::internal("credentials resolved to a missing account"))?;
        if account.role.is_none() {
            warn!(username = %account.username, "account has no recognised role");
        }
        Ok(Self::actor_from_account(account))
    }

    async fn actor(&self, user_id: Uuid) -> Result<Option<Actor>, Error> {
        let account = self
            .users
            .find(user_id)
            .await
            .map_err(map_persistence_error)?;
        Ok(account.map(Self::actor_from_account))
    }

    async fn register(
        &self,
        actor: &Actor,
        registration: Registration,
    ) -> Result<UserAccount, Error> {
        Self::require_manager(actor)?;
        // Uniqueness is re-checked by the unique index at insert time; this
        // early check produces the friendlier field-level error.
        let taken = self
            .users
            .username_taken(registration.username().as_str())
            .await
            .map_err(map_persistence_error)?;
        if taken {
            return Err(Error::conflict("username already registered")
                .with_details(json!({ "field": "username", "code": "username_taken" })));
        }
        let hash = self
            .hasher
            .hash(registration.password())
            .map_err(Self::map_hash_error)?;
        let account = self
            .users
            .create(registration.username(), &hash, registration.role())
            .await
            .map_err(map_persistence_error)?;
        debug!(username = %account.username, role = ?account.role, "account registered");
        Ok(account)
    }

    async fn delete_user(&self, actor: &Actor, user_id: Uuid) -> Result<MutationOutcome, Error> {
        Self::require_manager(actor)?;
        let target = self
            .users
            .find(user_id)
            .await
            .map_err(map_persistence_error)?;
        let Some(target) = target else {
            return Ok(MutationOutcome::NoOp);
        };
        if target.id == actor.user_id || target.is_superuser {
            return Err(Error::forbidden("you cannot delete this user"));
        }
        let deleted = self
            .users
            .delete(target.id)
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
    use crate::domain::ports::{MockPasswordHasher, MockUserRepository, StoredCredentials};
    use crate::domain::ErrorCode;
    use chrono::Utc;
    use rstest::rstest;

    fn account(id: Uuid, role: Option<Role>, superuser: bool) -> UserAccount {
        UserAccount {
            id,
            username: "casey".to_owned(),
            role,
            is_superuser: superuser,
            created_at: Utc::now(),
        }
    }

    fn manager_actor() -> Actor {
        Actor {
            user_id: Uuid::new_v4(),
            username: "boss".to_owned(),
            role: Some(Role::Manager),
            superuser: false,
        }
    }

    fn service(users: MockUserRepository, hasher: MockPasswordHasher) -> DirectoryService {
        DirectoryService::new(Arc::new(users), Arc::new(hasher))
    }

    #[actix_rt::test]
    async fn login_succeeds_with_matching_password() {
        let user_id = Uuid::new_v4();
        let mut users = MockUserRepository::new();
        users.expect_find_credentials().return_once(move |_| {
            Ok(Some(StoredCredentials {
                user_id,
                password_hash: "$argon2id$stub".to_owned(),
            }))
        });
        users
            .expect_find()
            .return_once(move |id| Ok(Some(account(id, Some(Role::Technician), false))));
        let mut hasher = MockPasswordHasher::new();
        hasher.expect_verify().return_once(|_, _| Ok(true));

        let creds = LoginCredentials::try_from_parts("casey", "hunter2").expect("valid");
        let actor = service(users, hasher).login(&creds).await.expect("logs in");
        assert_eq!(actor.user_id, user_id);
        assert_eq!(actor.role, Some(Role::Technician));
    }

    #[rstest]
    #[case(false)]
    #[case(true)]
    #[actix_rt::test]
    async fn login_failures_are_indistinguishable(#[case] username_exists: bool) {
        let mut users = MockUserRepository::new();
        let mut hasher = MockPasswordHasher::new();
        if username_exists {
            users.expect_find_credentials().return_once(|_| {
                Ok(Some(StoredCredentials {
                    user_id: Uuid::new_v4(),
                    password_hash: "$argon2id$stub".to_owned(),
                }))
            });
            hasher.expect_verify().return_once(|_, _| Ok(false));
        } else {
            users.expect_find_credentials().return_once(|_| Ok(None));
        }

        let creds = LoginCredentials::try_from_parts("casey", "wrong").expect("valid");
        let err = service(users, hasher)
            .login(&creds)
            .await
            .expect_err("must fail");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
        assert_eq!(err.message(), "invalid username or password");
    }

    #[actix_rt::test]
    async fn registration_rejects_taken_usernames_without_writing() {
        let mut users = MockUserRepository::new();
        users.expect_username_taken().return_once(|_| Ok(true));
        // No create expectation: a write attempt would panic the mock.

        let registration =
            Registration::try_from_parts("casey", "pw", "pw", "Repair").expect("valid form");
        let err = service(users, MockPasswordHasher::new())
            .register(&manager_actor(), registration)
            .await
            .expect_err("duplicate must fail");
        assert_eq!(err.code(), ErrorCode::Conflict);
        assert_eq!(
            err.details().and_then(|d| d.get("field")),
            Some(&serde_json::json!("username"))
        );
    }

    #[actix_rt::test]
    async fn registration_requires_the_manager_role() {
        let actor = Actor {
            role: Some(Role::Technician),
            ..manager_actor()
        };
        let registration =
            Registration::try_from_parts("casey", "pw", "pw", "Repair").expect("valid form");
        let err = service(MockUserRepository::new(), MockPasswordHasher::new())
            .register(&actor, registration)
            .await
            .expect_err("technicians cannot register users");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[actix_rt::test]
    async fn deleting_a_superuser_is_forbidden() {
        let mut users = MockUserRepository::new();
        users
            .expect_find()
            .return_once(|id| Ok(Some(account(id, Some(Role::Manager), true))));

        let err = service(users, MockPasswordHasher::new())
            .delete_user(&manager_actor(), Uuid::new_v4())
            .await
            .expect_err("superusers are protected");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[actix_rt::test]
    async fn self_deletion_is_forbidden() {
        let actor = manager_actor();
        let self_id = actor.user_id;
        let mut users = MockUserRepository::new();
        users
            .expect_find()
            .return_once(move |_| Ok(Some(account(self_id, Some(Role::Manager), false))));

        let err = service(users, MockPasswordHasher::new())
            .delete_user(&actor, self_id)
            .await
            .expect_err("self-deletion is blocked");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[actix_rt::test]
    async fn deleting_a_missing_user_is_a_noop() {
        let mut users = MockUserRepository::new();
        users.expect_find().return_once(|_| Ok(None));

        let outcome = service(users, MockPasswordHasher::new())
            .delete_user(&manager_actor(), Uuid::new_v4())
            .await
            .expect("missing target must not error");
        assert_eq!(outcome, MutationOutcome::NoOp);
    }
}
