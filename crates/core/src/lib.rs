//! # GymDesk Core
//!
//! Domain types shared by the GymDesk service: users and roles, trainer
//! profiles, scheduled classes, bookings, and the error taxonomy. The pure
//! decision logic lives here too — the weekday ordering used for schedule
//! display, the reservation admission check, and the schedule projection —
//! so it can be exercised without a database.

pub mod errors;
pub mod models;
