pub mod booking;
pub mod day;
pub mod gym_class;
pub mod schedule;
pub mod trainer;
pub mod user;
