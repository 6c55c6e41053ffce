use crate::entities::profile_entity as profiles;
use crate::error::{AppError, AppResult};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

#[derive(Clone)]
pub struct ProfileService {
    pool: DatabaseConnection,
}

impl ProfileService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn get_profile(&self, user_id: Uuid) -> AppResult<profiles::Model> {
        profiles::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))
    }

    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<profiles::Model>> {
        let found = profiles::Entity::find()
            .filter(profiles::Column::Email.eq(email.trim().to_lowercase()))
            .one(&self.pool)
            .await?;
        Ok(found)
    }

    /// Looks a gift recipient up by email, creating a bare profile when none exists.
    pub async fn find_or_create_recipient(
        &self,
        email: &str,
        full_name: Option<&str>,
        wallet_address: Option<&str>,
    ) -> AppResult<profiles::Model> {
        let email = email.trim().to_lowercase();
        if email.is_empty() {
            return Err(AppError::ValidationError(
                "Recipient email is required".to_string(),
            ));
        }

        if let Some(existing) = self.find_by_email(&email).await? {
            return Ok(existing);
        }

        let created = profiles::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email.clone()),
            full_name: Set(full_name.map(str::to_string)),
            wallet_address: Set(wallet_address.map(str::to_string)),
            created_at: Set(Utc::now()),
        }
        .insert(&self.pool)
        .await?;

        log::info!("Created recipient profile {} for {}", created.id, email);
        Ok(created)
    }
}
