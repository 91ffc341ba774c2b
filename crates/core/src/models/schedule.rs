use std::collections::HashSet;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::day::DayOfWeek;
use crate::models::gym_class::ClassWithDetails;

/// Whether the viewing user could book a given class right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingEligibility {
    Available,
    Full,
    AlreadyBooked,
}

/// One class as shown on the public schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleClass {
    pub id: Uuid,
    pub service_title: String,
    pub trainer_name: Option<String>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub capacity: i32,
    pub booked_count: i64,
    pub spots_remaining: i64,
    /// Present only when the caller is signed in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eligibility: Option<BookingEligibility>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleDay {
    pub day: DayOfWeek,
    pub classes: Vec<ScheduleClass>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleResponse {
    pub days: Vec<ScheduleDay>,
}

/// Projects the flat class list into the weekly schedule: grouped by day in
/// calendar order (Monday first — not alphabetical), each day sorted by
/// start time. Days without classes are omitted. Pure; never mutates
/// anything.
///
/// `booked_class_ids` is the viewing user's current bookings, or `None`
/// for an anonymous caller (eligibility is then left out entirely).
pub fn project_schedule(
    classes: Vec<ClassWithDetails>,
    booked_class_ids: Option<&HashSet<Uuid>>,
) -> Vec<ScheduleDay> {
    let mut days: Vec<ScheduleDay> = Vec::new();

    for day in DayOfWeek::ALL {
        let mut group: Vec<ScheduleClass> = classes
            .iter()
            .filter(|c| c.day_of_week == day)
            .map(|c| {
                let spots = c.spots_remaining();
                let eligibility = booked_class_ids.map(|booked| {
                    if booked.contains(&c.id) {
                        BookingEligibility::AlreadyBooked
                    } else if spots == 0 {
                        BookingEligibility::Full
                    } else {
                        BookingEligibility::Available
                    }
                });
                ScheduleClass {
                    id: c.id,
                    service_title: c.service_title.clone(),
                    trainer_name: c.trainer_name.clone(),
                    start_time: c.start_time,
                    end_time: c.end_time,
                    capacity: c.capacity,
                    booked_count: c.booked_count,
                    spots_remaining: spots,
                    eligibility,
                }
            })
            .collect();

        if group.is_empty() {
            continue;
        }
        group.sort_by_key(|c| c.start_time);
        days.push(ScheduleDay { day, classes: group });
    }

    days
}
