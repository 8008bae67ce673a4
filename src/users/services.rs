use std::sync::Arc;

use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::CreateUserRequest,
    error::{UserError, UserResult},
    password::hash_password,
    repo::UserStore,
    repo_types::{NewUser, UserPatch, UserRecord},
};

/// User record lifecycle on top of a [`UserStore`].
///
/// Only [`UserService::create`] hashes. [`UserService::update_by_id`] writes the patch as
/// given, so a password sent through it is stored in plaintext.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    work_factor: u32,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, work_factor: u32) -> Self {
        Self { store, work_factor }
    }

    pub fn work_factor(&self) -> u32 {
        self.work_factor
    }

    #[instrument(skip(self))]
    pub async fn list_all(&self) -> UserResult<Vec<UserRecord>> {
        self.store.find_all().await.map_err(|e| {
            error!(error = ?e, "list users failed");
            UserError::Storage(e)
        })
    }

    /// Expects a candidate that already passed validation.
    #[instrument(skip(self, candidate), fields(email = %candidate.email))]
    pub async fn create(&self, candidate: CreateUserRequest) -> UserResult<UserRecord> {
        let CreateUserRequest {
            name,
            email,
            password,
        } = candidate;

        // Pre-persist step: the password field is always newly set on create.
        let password_hash = self.hash(password).await?;

        let user = self
            .store
            .insert(NewUser {
                name,
                email,
                password_hash,
            })
            .await
            .map_err(|e| {
                error!(error = ?e, "insert user failed");
                UserError::Storage(e)
            })?;

        info!(user_id = %user.id, "user created");
        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: Uuid) -> UserResult<UserRecord> {
        match self.store.find_by_id(id).await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => {
                warn!(user_id = %id, "user not found");
                Err(UserError::NotFound(id))
            }
            Err(e) => {
                error!(error = ?e, user_id = %id, "find user failed");
                Err(UserError::Storage(e))
            }
        }
    }

    /// Writes the supplied fields verbatim: no validation, no hashing.
    #[instrument(skip(self, patch))]
    pub async fn update_by_id(&self, id: Uuid, patch: UserPatch) -> UserResult<UserRecord> {
        if patch.password.is_some() {
            warn!(user_id = %id, "password set through update is stored without hashing");
        }
        match self.store.update_by_id(id, &patch).await {
            Ok(Some(user)) => {
                info!(user_id = %id, "user updated");
                Ok(user)
            }
            Ok(None) => {
                warn!(user_id = %id, "update of unknown user");
                Err(UserError::NotFound(id))
            }
            Err(e) => {
                error!(error = ?e, user_id = %id, "update user failed");
                Err(UserError::Storage(e))
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn delete_by_id(&self, id: Uuid) -> UserResult<()> {
        match self.store.delete_by_id(id).await {
            Ok(true) => {
                info!(user_id = %id, "user deleted");
                Ok(())
            }
            Ok(false) => {
                warn!(user_id = %id, "delete of unknown user");
                Err(UserError::NotFound(id))
            }
            Err(e) => {
                error!(error = ?e, user_id = %id, "delete user failed");
                Err(UserError::Storage(e))
            }
        }
    }

    // Argon2 is deliberately slow; keep it off the async workers.
    async fn hash(&self, password: String) -> UserResult<String> {
        let work_factor = self.work_factor;
        tokio::task::spawn_blocking(move || hash_password(&password, work_factor))
            .await
            .map_err(|e| {
                error!(error = %e, "hashing task failed");
                UserError::Hashing(e.to_string())
            })?
    }
}
