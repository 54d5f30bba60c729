use crate::{
    error::{AppError, Result},
    models::profile::*,
    services::database::DocumentStore,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

const TABLE: &str = "profile";

#[derive(Clone)]
pub struct ProfileService {
    db: Arc<dyn DocumentStore>,
}

impl ProfileService {
    pub fn new(db: Arc<dyn DocumentStore>) -> Self {
        Self { db }
    }

    /// 获取全部用户档案，按创建时间排序
    pub async fn list_profiles(&self) -> Result<Vec<Profile>> {
        let mut profiles = self
            .db
            .list(TABLE)
            .await?
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<Profile>, _>>()?;
        profiles.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(profiles)
    }

    pub async fn get_profile(&self, profile_id: &str) -> Result<Profile> {
        let doc = self
            .db
            .get(TABLE, profile_id)
            .await?
            .ok_or_else(|| AppError::not_found("Profile"))?;
        Ok(serde_json::from_value(doc)?)
    }

    pub async fn create_profile(&self, request: CreateProfileRequest) -> Result<Profile> {
        debug!("Creating profile: {}", request.name);

        request.validate()?;

        let now = Utc::now();
        let profile = Profile {
            id: Uuid::new_v4().to_string(),
            name: request.name,
            avatar: request.avatar,
            color: request.color,
            created_at: now,
            updated_at: now,
        };
        self.db
            .put(TABLE, &profile.id, serde_json::to_value(&profile)?)
            .await?;

        info!("Created profile: {} ({})", profile.name, profile.id);
        Ok(profile)
    }

    pub async fn update_profile(&self, profile_id: &str, request: UpdateProfileRequest) -> Result<Profile> {
        debug!("Updating profile: {}", profile_id);

        request.validate()?;

        let mut profile = self.get_profile(profile_id).await?;
        profile.apply(request);
        self.db
            .put(TABLE, &profile.id, serde_json::to_value(&profile)?)
            .await?;

        Ok(profile)
    }

    pub async fn delete_profile(&self, profile_id: &str) -> Result<()> {
        if !self.db.delete(TABLE, profile_id).await? {
            return Err(AppError::not_found("Profile"));
        }

        info!("Deleted profile: {}", profile_id);
        Ok(())
    }
}
