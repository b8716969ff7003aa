//! User repository for database operations.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use escrowd_core::identity::{NewUser, Role, User};
use escrowd_core::store::{IdentityStore, StoreError};

use crate::entities::users;
use crate::repositories::backend_error;

/// User repository backed by the users table.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Checks if an email is already registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        let count = users::Entity::find()
            .filter(users::Column::Email.eq(email.to_lowercase()))
            .count(&self.db)
            .await
            .map_err(backend_error)?;

        Ok(count > 0)
    }
}

fn into_domain(model: users::Model) -> Result<User, StoreError> {
    let role = Role::parse(&model.role)
        .ok_or_else(|| StoreError::Backend(format!("unknown role in store: {}", model.role)))?;

    Ok(User {
        id: model.id,
        name: model.name,
        email: model.email,
        password_hash: model.password_hash,
        role,
        avatar: model.avatar,
        is_banned: model.is_banned,
        created_at: model.created_at.to_utc(),
        updated_at: model.updated_at.to_utc(),
    })
}

#[async_trait]
impl IdentityStore for UserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(backend_error)?
            .map(into_domain)
            .transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email.to_lowercase()))
            .one(&self.db)
            .await
            .map_err(backend_error)?
            .map(into_domain)
            .transpose()
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let email = user.email.to_lowercase();
        if self.email_exists(&email).await? {
            return Err(StoreError::DuplicateEmail);
        }

        let now = Utc::now().into();
        let record = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(user.name),
            email: Set(email),
            password_hash: Set(user.password_hash),
            role: Set(Role::User.as_str().to_string()),
            avatar: Set(user.avatar),
            is_banned: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        };

        into_domain(record.insert(&self.db).await.map_err(backend_error)?)
    }

    async fn list_all(&self) -> Result<Vec<User>, StoreError> {
        users::Entity::find()
            .order_by_desc(users::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(backend_error)?
            .into_iter()
            .map(into_domain)
            .collect()
    }

    async fn set_banned(&self, id: Uuid, banned: bool) -> Result<User, StoreError> {
        let user = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(backend_error)?
            .ok_or(StoreError::NotFound)?;

        let mut active: users::ActiveModel = user.into();
        active.is_banned = Set(banned);
        active.updated_at = Set(Utc::now().into());

        into_domain(active.update(&self.db).await.map_err(backend_error)?)
    }
}
