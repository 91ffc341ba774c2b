use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{GymError, GymResult};

/// Fallback portrait used when a trainer is created without one.
pub const DEFAULT_TRAINER_IMAGE_URL: &str = "https://placehold.co/300x300.png";

/// A trainer profile. `name` is a denormalized copy of the owning user's
/// name and is kept in sync on either side of an update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trainer {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub specialty: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerWithEmail {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub specialty: String,
    pub image_url: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTrainerRequest {
    pub name: String,
    pub email: String,
    pub specialty: String,
    pub image_url: Option<String>,
}

impl CreateTrainerRequest {
    pub fn validate(&self) -> GymResult<()> {
        if self.name.trim().len() < 2 {
            return Err(GymError::Validation(
                "Name must be at least 2 characters".to_string(),
            ));
        }
        if !self.email.contains('@') {
            return Err(GymError::Validation("Invalid email address".to_string()));
        }
        if self.specialty.trim().is_empty() {
            return Err(GymError::Validation("Specialty is required".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTrainerRequest {
    pub name: String,
    pub specialty: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerResponse {
    pub message: String,
    pub trainer: TrainerWithEmail,
}
