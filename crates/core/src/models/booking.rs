use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{GymError, GymResult};
use crate::models::day::DayOfWeek;

/// One reserved seat: a (user, class) pair. At most one exists per pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub class_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A booking joined with its class and trainer for the member dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingWithClass {
    pub id: Uuid,
    pub class_id: Uuid,
    pub service_title: String,
    pub trainer_name: Option<String>,
    pub day_of_week: DayOfWeek,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub created_at: DateTime<Utc>,
}

/// Admission check for a reservation. The precedence mirrors the commit
/// path: an existing booking wins over a full class, so a double-book
/// attempt on a full class reports AlreadyBooked, not ClassFull.
///
/// The storage layer calls this with counts read inside the same
/// transaction that performs the insert; callers must never feed it stale
/// client-side counts.
pub fn check_reservation(capacity: i32, booked_count: i64, already_booked: bool) -> GymResult<()> {
    if already_booked {
        return Err(GymError::AlreadyBooked(
            "You have already booked this class".to_string(),
        ));
    }
    if booked_count >= capacity as i64 {
        return Err(GymError::ClassFull(
            "Sorry, this class is already full".to_string(),
        ));
    }
    Ok(())
}

/// Orders bookings for display: weekday in calendar order, then start time.
pub fn sort_for_display(bookings: &mut [BookingWithClass]) {
    bookings.sort_by_key(|b| (b.day_of_week.index(), b.start_time));
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReserveBookingRequest {
    pub class_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReserveBookingResponse {
    pub message: String,
    pub booking: Booking,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListBookingsResponse {
    pub bookings: Vec<BookingWithClass>,
}
