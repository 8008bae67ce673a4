use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::repo_types::{NewUser, UserPatch, UserRecord};

/// Persistence capability the user service depends on.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a record and return it with its generated id.
    async fn insert(&self, new: NewUser) -> anyhow::Result<UserRecord>;
    /// All records in insertion order.
    async fn find_all(&self) -> anyhow::Result<Vec<UserRecord>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<UserRecord>>;
    /// Apply `patch` and return the updated record, `None` if `id` is unknown.
    async fn update_by_id(&self, id: Uuid, patch: &UserPatch)
        -> anyhow::Result<Option<UserRecord>>;
    /// `false` if `id` is unknown.
    async fn delete_by_id(&self, id: Uuid) -> anyhow::Result<bool>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, new: NewUser) -> anyhow::Result<UserRecord> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, password_hash
            "#,
        )
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.password_hash)
        .fetch_one(&self.db)
        .await
        .context("insert user")?;
        Ok(user)
    }

    async fn find_all(&self) -> anyhow::Result<Vec<UserRecord>> {
        let rows = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, name, email, password_hash
              FROM users
             ORDER BY seq ASC
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("list users")?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, name, email, password_hash
              FROM users
             WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find user by id")?;
        Ok(user)
    }

    async fn update_by_id(
        &self,
        id: Uuid,
        patch: &UserPatch,
    ) -> anyhow::Result<Option<UserRecord>> {
        // NULL binds keep the stored column.
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            UPDATE users
               SET name          = COALESCE($2, name),
                   email         = COALESCE($3, email),
                   password_hash = COALESCE($4, password_hash)
             WHERE id = $1
            RETURNING id, name, email, password_hash
            "#,
        )
        .bind(id)
        .bind(patch.name.as_deref())
        .bind(patch.email.as_deref())
        .bind(patch.password.as_deref())
        .fetch_optional(&self.db)
        .await
        .context("update user")?;
        Ok(user)
    }

    async fn delete_by_id(&self, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete user")?;
        Ok(result.rows_affected() > 0)
    }
}

/// Process-local store, used by tests and `STORE_BACKEND=memory`.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<Vec<UserRecord>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, new: NewUser) -> anyhow::Result<UserRecord> {
        let user = UserRecord {
            id: Uuid::new_v4(),
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
        };
        self.users.write().await.push(user.clone());
        Ok(user)
    }

    async fn find_all(&self) -> anyhow::Result<Vec<UserRecord>> {
        Ok(self.users.read().await.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<UserRecord>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn update_by_id(
        &self,
        id: Uuid,
        patch: &UserPatch,
    ) -> anyhow::Result<Option<UserRecord>> {
        let mut users = self.users.write().await;
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        patch.apply(user);
        Ok(Some(user.clone()))
    }

    async fn delete_by_id(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() < before)
    }
}
