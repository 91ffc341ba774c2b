use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use gymdesk_core::errors::GymResult;
use gymdesk_core::models::booking::{Booking, BookingWithClass};
use gymdesk_core::models::day::DayOfWeek;
use gymdesk_core::models::gym_class::{ClassWithDetails, GymClass};
use gymdesk_core::models::user::{Role, User};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub requires_password_change: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbUser {
    pub fn role(&self) -> GymResult<Role> {
        self.role.parse()
    }

    /// Strips credential material for API exposure.
    pub fn into_user(self) -> GymResult<User> {
        Ok(User {
            role: self.role.parse()?,
            id: self.id,
            name: self.name,
            email: self.email,
            requires_password_change: self.requires_password_change,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSession {
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbTrainer {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub specialty: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbTrainerWithEmail {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub specialty: String,
    pub image_url: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbGymClass {
    pub id: Uuid,
    pub service_title: String,
    pub trainer_id: Option<Uuid>,
    pub day_of_week: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub capacity: i32,
    pub created_at: DateTime<Utc>,
}

impl DbGymClass {
    pub fn into_class(self) -> GymResult<GymClass> {
        Ok(GymClass {
            day_of_week: self.day_of_week.parse::<DayOfWeek>()?,
            id: self.id,
            service_title: self.service_title,
            trainer_id: self.trainer_id,
            start_time: self.start_time,
            end_time: self.end_time,
            capacity: self.capacity,
            created_at: self.created_at,
        })
    }
}

/// Row shape for the class list join: trainer name and live booking count
/// come back alongside the class columns.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbClassWithDetails {
    pub id: Uuid,
    pub service_title: String,
    pub trainer_id: Option<Uuid>,
    pub trainer_name: Option<String>,
    pub day_of_week: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub capacity: i32,
    pub booked_count: i64,
    pub created_at: DateTime<Utc>,
}

impl DbClassWithDetails {
    pub fn into_details(self) -> GymResult<ClassWithDetails> {
        Ok(ClassWithDetails {
            day_of_week: self.day_of_week.parse::<DayOfWeek>()?,
            id: self.id,
            service_title: self.service_title,
            trainer_id: self.trainer_id,
            trainer_name: self.trainer_name,
            start_time: self.start_time,
            end_time: self.end_time,
            capacity: self.capacity,
            booked_count: self.booked_count,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbBooking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub class_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl DbBooking {
    pub fn into_booking(self) -> Booking {
        Booking {
            id: self.id,
            user_id: self.user_id,
            class_id: self.class_id,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbBookingWithClass {
    pub id: Uuid,
    pub user_id: Uuid,
    pub class_id: Uuid,
    pub service_title: String,
    pub trainer_name: Option<String>,
    pub day_of_week: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub created_at: DateTime<Utc>,
}

impl DbBookingWithClass {
    pub fn into_details(self) -> GymResult<BookingWithClass> {
        Ok(BookingWithClass {
            day_of_week: self.day_of_week.parse::<DayOfWeek>()?,
            id: self.id,
            class_id: self.class_id,
            service_title: self.service_title,
            trainer_name: self.trainer_name,
            start_time: self.start_time,
            end_time: self.end_time,
            created_at: self.created_at,
        })
    }
}
