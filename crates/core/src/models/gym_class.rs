use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{GymError, GymResult};
use crate::models::day::DayOfWeek;

/// A recurring weekly class offering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GymClass {
    pub id: Uuid,
    pub service_title: String,
    pub trainer_id: Option<Uuid>,
    pub day_of_week: DayOfWeek,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub capacity: i32,
    pub created_at: DateTime<Utc>,
}

/// A class annotated with its trainer's name (if assigned) and the live
/// booking count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassWithDetails {
    pub id: Uuid,
    pub service_title: String,
    pub trainer_id: Option<Uuid>,
    pub trainer_name: Option<String>,
    pub day_of_week: DayOfWeek,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub capacity: i32,
    pub booked_count: i64,
    pub created_at: DateTime<Utc>,
}

impl ClassWithDetails {
    /// Seats still open, clamped at zero.
    pub fn spots_remaining(&self) -> i64 {
        (self.capacity as i64 - self.booked_count).max(0)
    }
}

fn validate_class_fields(
    service_title: &str,
    start_time: NaiveTime,
    end_time: NaiveTime,
    capacity: i32,
) -> GymResult<()> {
    if service_title.trim().is_empty() {
        return Err(GymError::Validation(
            "Service title is required".to_string(),
        ));
    }
    if capacity < 1 {
        return Err(GymError::Validation(
            "Capacity must be at least 1".to_string(),
        ));
    }
    if start_time >= end_time {
        return Err(GymError::Validation(
            "Start time must be before end time".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateClassRequest {
    pub service_title: String,
    pub trainer_id: Option<Uuid>,
    pub day_of_week: DayOfWeek,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub capacity: i32,
}

impl CreateClassRequest {
    pub fn validate(&self) -> GymResult<()> {
        validate_class_fields(
            &self.service_title,
            self.start_time,
            self.end_time,
            self.capacity,
        )
    }
}

/// Partial update. Omitted fields keep their stored values; the merged
/// result is validated before anything is written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateClassRequest {
    pub service_title: Option<String>,
    /// `Some(None)` unassigns the trainer, `None` leaves it unchanged.
    #[serde(default, with = "double_option")]
    pub trainer_id: Option<Option<Uuid>>,
    pub day_of_week: Option<DayOfWeek>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub capacity: Option<i32>,
}

impl UpdateClassRequest {
    /// Applies this patch over the stored class and validates the result.
    pub fn merge_into(&self, current: &GymClass) -> GymResult<GymClass> {
        let merged = GymClass {
            id: current.id,
            service_title: self
                .service_title
                .clone()
                .unwrap_or_else(|| current.service_title.clone()),
            trainer_id: match self.trainer_id {
                Some(t) => t,
                None => current.trainer_id,
            },
            day_of_week: self.day_of_week.unwrap_or(current.day_of_week),
            start_time: self.start_time.unwrap_or(current.start_time),
            end_time: self.end_time.unwrap_or(current.end_time),
            capacity: self.capacity.unwrap_or(current.capacity),
            created_at: current.created_at,
        };
        validate_class_fields(
            &merged.service_title,
            merged.start_time,
            merged.end_time,
            merged.capacity,
        )?;
        Ok(merged)
    }
}

/// Distinguishes "field absent" from "field set to null" for the trainer
/// assignment in a class patch.
mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T, S>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassResponse {
    pub message: String,
    pub class: ClassWithDetails,
}
