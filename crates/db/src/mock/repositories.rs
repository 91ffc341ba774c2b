use chrono::NaiveTime;
use mockall::mock;
use uuid::Uuid;

use gymdesk_core::errors::GymResult;
use gymdesk_core::models::day::DayOfWeek;
use gymdesk_core::models::user::Role;

use crate::models::{
    DbBooking, DbBookingWithClass, DbClassWithDetails, DbGymClass, DbSession, DbTrainer,
    DbTrainerWithEmail, DbUser,
};

// Mock repositories for testing
mock! {
    pub UserRepo {
        pub async fn find_by_email(&self, email: &'static str) -> eyre::Result<Option<DbUser>>;

        pub async fn find_by_id(&self, id: Uuid) -> eyre::Result<Option<DbUser>>;

        pub async fn create_user(
            &self,
            name: &'static str,
            email: &'static str,
            password_hash: &'static str,
            role: Role,
            requires_password_change: bool,
        ) -> GymResult<DbUser>;

        pub async fn update_name(&self, id: Uuid, name: &'static str) -> eyre::Result<DbUser>;

        pub async fn update_password(
            &self,
            id: Uuid,
            password_hash: &'static str,
        ) -> eyre::Result<DbUser>;
    }
}

mock! {
    pub SessionRepo {
        pub async fn create_session(
            &self,
            token: &'static str,
            user_id: Uuid,
        ) -> eyre::Result<DbSession>;

        pub async fn find_user_by_token(
            &self,
            token: &'static str,
        ) -> eyre::Result<Option<DbUser>>;

        pub async fn delete_session(&self, token: &'static str) -> eyre::Result<()>;

        pub async fn delete_sessions_for_user(&self, user_id: Uuid) -> eyre::Result<()>;
    }
}

mock! {
    pub TrainerRepo {
        pub async fn list_trainers(&self) -> eyre::Result<Vec<DbTrainerWithEmail>>;

        pub async fn find_by_id(&self, id: Uuid) -> eyre::Result<Option<DbTrainer>>;

        pub async fn create_with_user(
            &self,
            name: &'static str,
            email: &'static str,
            password_hash: &'static str,
            specialty: &'static str,
            image_url: &'static str,
        ) -> GymResult<DbTrainerWithEmail>;

        pub async fn update_trainer(
            &self,
            id: Uuid,
            name: &'static str,
            specialty: &'static str,
            image_url: &'static str,
        ) -> eyre::Result<Option<DbTrainerWithEmail>>;

        pub async fn sync_name_for_user(
            &self,
            user_id: Uuid,
            name: &'static str,
        ) -> eyre::Result<()>;

        pub async fn delete_trainer(&self, id: Uuid) -> eyre::Result<bool>;
    }
}

mock! {
    pub GymClassRepo {
        pub async fn create_class(
            &self,
            service_title: &'static str,
            trainer_id: Option<Uuid>,
            day_of_week: DayOfWeek,
            start_time: NaiveTime,
            end_time: NaiveTime,
            capacity: i32,
        ) -> eyre::Result<DbGymClass>;

        pub async fn get_class_by_id(&self, id: Uuid) -> eyre::Result<Option<DbGymClass>>;

        pub async fn update_class(
            &self,
            id: Uuid,
            service_title: &'static str,
            trainer_id: Option<Uuid>,
            day_of_week: DayOfWeek,
            start_time: NaiveTime,
            end_time: NaiveTime,
            capacity: i32,
        ) -> eyre::Result<Option<DbGymClass>>;

        pub async fn delete_class(&self, id: Uuid) -> eyre::Result<bool>;

        pub async fn list_with_details(&self) -> eyre::Result<Vec<DbClassWithDetails>>;

        pub async fn get_details_by_id(&self, id: Uuid) -> eyre::Result<Option<DbClassWithDetails>>;

        pub async fn unassign_trainer(&self, trainer_id: Uuid) -> eyre::Result<u64>;
    }
}

mock! {
    pub BookingRepo {
        pub async fn reserve(&self, user_id: Uuid, class_id: Uuid) -> GymResult<DbBooking>;

        pub async fn get_booking_by_id(&self, id: Uuid) -> eyre::Result<Option<DbBooking>>;

        pub async fn cancel_owned(&self, booking_id: Uuid, user_id: Uuid) -> GymResult<()>;

        pub async fn delete_booking(&self, booking_id: Uuid, user_id: Uuid) -> eyre::Result<bool>;

        pub async fn list_for_user(&self, user_id: Uuid) -> eyre::Result<Vec<DbBookingWithClass>>;

        pub async fn occupancy(&self, class_id: Uuid) -> eyre::Result<i64>;

        pub async fn booked_class_ids(&self, user_id: Uuid) -> eyre::Result<Vec<Uuid>>;
    }
}
