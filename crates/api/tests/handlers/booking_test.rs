use chrono::Utc;
use mockall::predicate;
use uuid::Uuid;

use gymdesk_core::errors::{GymError, GymResult};
use gymdesk_core::models::booking::check_reservation;
use gymdesk_db::models::{DbBooking, DbGymClass};

use crate::test_utils::TestContext;

fn sample_class(id: Uuid, capacity: i32) -> DbGymClass {
    DbGymClass {
        id,
        service_title: "Yoga".to_string(),
        trainer_id: None,
        day_of_week: "MONDAY".to_string(),
        start_time: chrono::NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        end_time: chrono::NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        capacity,
        created_at: Utc::now(),
    }
}

fn sample_booking(user_id: Uuid, class_id: Uuid) -> DbBooking {
    DbBooking {
        id: Uuid::new_v4(),
        user_id,
        class_id,
        created_at: Utc::now(),
    }
}

// Mirrors the reserve decision sequence against the mocks: resolve the
// class, take fresh duplicate/occupancy reads, run the admission check,
// then commit through the repository.
async fn test_reserve_wrapper(
    ctx: &mut TestContext,
    user_id: Uuid,
    class_id: Uuid,
) -> GymResult<DbBooking> {
    let class = ctx
        .gym_class_repo
        .get_class_by_id(class_id)
        .await
        .map_err(GymError::Database)?;

    let Some(class) = class else {
        return Err(GymError::NotFound("Class not found".to_string()));
    };

    let already_booked = ctx
        .booking_repo
        .booked_class_ids(user_id)
        .await
        .map_err(GymError::Database)?
        .contains(&class_id);

    let booked_count = ctx
        .booking_repo
        .occupancy(class_id)
        .await
        .map_err(GymError::Database)?;

    check_reservation(class.capacity, booked_count, already_booked)?;

    ctx.booking_repo.reserve(user_id, class_id).await
}

// Mirrors the cancel decision sequence: resolve, check ownership, delete
// scoped to (id, user).
async fn test_cancel_wrapper(
    ctx: &mut TestContext,
    booking_id: Uuid,
    user_id: Uuid,
) -> GymResult<()> {
    let booking = ctx
        .booking_repo
        .get_booking_by_id(booking_id)
        .await
        .map_err(GymError::Database)?;

    let Some(booking) = booking else {
        return Err(GymError::NotFound("Booking not found".to_string()));
    };

    if booking.user_id != user_id {
        return Err(GymError::Forbidden(
            "You are not authorized to cancel this booking".to_string(),
        ));
    }

    let deleted = ctx
        .booking_repo
        .delete_booking(booking_id, user_id)
        .await
        .map_err(GymError::Database)?;

    if !deleted {
        return Err(GymError::NotFound("Booking not found".to_string()));
    }

    Ok(())
}

#[tokio::test]
async fn test_reserve_unknown_class_not_found() {
    let mut ctx = TestContext::new();
    let user_id = Uuid::new_v4();
    let class_id = Uuid::new_v4();

    ctx.gym_class_repo
        .expect_get_class_by_id()
        .with(predicate::eq(class_id))
        .returning(|_| Ok(None));

    // Nothing may be inserted when the class does not resolve
    ctx.booking_repo.expect_reserve().times(0);

    let result = test_reserve_wrapper(&mut ctx, user_id, class_id).await;
    assert!(matches!(result, Err(GymError::NotFound(_))));
}

#[tokio::test]
async fn test_reserve_duplicate_already_booked() {
    let mut ctx = TestContext::new();
    let user_id = Uuid::new_v4();
    let class_id = Uuid::new_v4();

    ctx.gym_class_repo
        .expect_get_class_by_id()
        .returning(move |id| Ok(Some(sample_class(id, 10))));
    ctx.booking_repo
        .expect_booked_class_ids()
        .with(predicate::eq(user_id))
        .returning(move |_| Ok(vec![class_id]));
    ctx.booking_repo
        .expect_occupancy()
        .returning(|_| Ok(3));

    ctx.booking_repo.expect_reserve().times(0);

    let result = test_reserve_wrapper(&mut ctx, user_id, class_id).await;
    assert!(matches!(result, Err(GymError::AlreadyBooked(_))));
}

#[tokio::test]
async fn test_reserve_full_class_rejected() {
    let mut ctx = TestContext::new();
    let user_id = Uuid::new_v4();
    let class_id = Uuid::new_v4();

    ctx.gym_class_repo
        .expect_get_class_by_id()
        .returning(move |id| Ok(Some(sample_class(id, 5))));
    ctx.booking_repo
        .expect_booked_class_ids()
        .returning(|_| Ok(vec![]));
    ctx.booking_repo
        .expect_occupancy()
        .returning(|_| Ok(5));

    ctx.booking_repo.expect_reserve().times(0);

    let result = test_reserve_wrapper(&mut ctx, user_id, class_id).await;
    assert!(matches!(result, Err(GymError::ClassFull(_))));
}

#[tokio::test]
async fn test_reserve_success() {
    let mut ctx = TestContext::new();
    let user_id = Uuid::new_v4();
    let class_id = Uuid::new_v4();

    ctx.gym_class_repo
        .expect_get_class_by_id()
        .returning(move |id| Ok(Some(sample_class(id, 5))));
    ctx.booking_repo
        .expect_booked_class_ids()
        .returning(|_| Ok(vec![]));
    ctx.booking_repo
        .expect_occupancy()
        .returning(|_| Ok(4));
    ctx.booking_repo
        .expect_reserve()
        .with(predicate::eq(user_id), predicate::eq(class_id))
        .times(1)
        .returning(|user_id, class_id| Ok(sample_booking(user_id, class_id)));

    let result = test_reserve_wrapper(&mut ctx, user_id, class_id).await;

    let booking = result.expect("reserve should succeed with a free seat");
    assert_eq!(booking.user_id, user_id);
    assert_eq!(booking.class_id, class_id);
}

#[tokio::test]
async fn test_reserve_raced_duplicate_reports_already_booked() {
    // The admission check passes on the pre-insert reads, but the unique
    // (user, class) constraint rejects the raced insert. That surfaces as
    // AlreadyBooked, never as a storage error.
    let mut ctx = TestContext::new();
    let user_id = Uuid::new_v4();
    let class_id = Uuid::new_v4();

    ctx.gym_class_repo
        .expect_get_class_by_id()
        .returning(move |id| Ok(Some(sample_class(id, 5))));
    ctx.booking_repo
        .expect_booked_class_ids()
        .returning(|_| Ok(vec![]));
    ctx.booking_repo
        .expect_occupancy()
        .returning(|_| Ok(0));
    ctx.booking_repo
        .expect_reserve()
        .returning(|_, _| {
            Err(GymError::AlreadyBooked(
                "You have already booked this class".to_string(),
            ))
        });

    let result = test_reserve_wrapper(&mut ctx, user_id, class_id).await;
    assert!(matches!(result, Err(GymError::AlreadyBooked(_))));
}

#[tokio::test]
async fn test_capacity_one_scenario() {
    // Capacity-1 "Yoga": A reserves, B is turned away, A cancels, B gets in
    let class_id = Uuid::new_v4();
    let user_a = Uuid::new_v4();
    let user_b = Uuid::new_v4();

    // A reserves an empty class
    let mut ctx = TestContext::new();
    ctx.gym_class_repo
        .expect_get_class_by_id()
        .returning(move |id| Ok(Some(sample_class(id, 1))));
    ctx.booking_repo
        .expect_booked_class_ids()
        .returning(|_| Ok(vec![]));
    ctx.booking_repo.expect_occupancy().returning(|_| Ok(0));
    ctx.booking_repo
        .expect_reserve()
        .times(1)
        .returning(|user_id, class_id| Ok(sample_booking(user_id, class_id)));
    let booking_a = test_reserve_wrapper(&mut ctx, user_a, class_id)
        .await
        .expect("user A should get the only seat");

    // B finds the class full
    let mut ctx = TestContext::new();
    ctx.gym_class_repo
        .expect_get_class_by_id()
        .returning(move |id| Ok(Some(sample_class(id, 1))));
    ctx.booking_repo
        .expect_booked_class_ids()
        .returning(|_| Ok(vec![]));
    ctx.booking_repo.expect_occupancy().returning(|_| Ok(1));
    ctx.booking_repo.expect_reserve().times(0);
    let result = test_reserve_wrapper(&mut ctx, user_b, class_id).await;
    assert!(matches!(result, Err(GymError::ClassFull(_))));

    // A cancels
    let mut ctx = TestContext::new();
    let booking_a_clone = booking_a.clone();
    ctx.booking_repo
        .expect_get_booking_by_id()
        .returning(move |_| Ok(Some(booking_a_clone.clone())));
    ctx.booking_repo
        .expect_delete_booking()
        .with(predicate::eq(booking_a.id), predicate::eq(user_a))
        .times(1)
        .returning(|_, _| Ok(true));
    test_cancel_wrapper(&mut ctx, booking_a.id, user_a)
        .await
        .expect("owner cancel should succeed");

    // B reserves the freed seat
    let mut ctx = TestContext::new();
    ctx.gym_class_repo
        .expect_get_class_by_id()
        .returning(move |id| Ok(Some(sample_class(id, 1))));
    ctx.booking_repo
        .expect_booked_class_ids()
        .returning(|_| Ok(vec![]));
    ctx.booking_repo.expect_occupancy().returning(|_| Ok(0));
    ctx.booking_repo
        .expect_reserve()
        .times(1)
        .returning(|user_id, class_id| Ok(sample_booking(user_id, class_id)));
    let booking_b = test_reserve_wrapper(&mut ctx, user_b, class_id)
        .await
        .expect("user B should get the freed seat");
    assert_eq!(booking_b.user_id, user_b);
}

#[tokio::test]
async fn test_cancel_unknown_booking_not_found() {
    let mut ctx = TestContext::new();

    ctx.booking_repo
        .expect_get_booking_by_id()
        .returning(|_| Ok(None));
    ctx.booking_repo.expect_delete_booking().times(0);

    let result = test_cancel_wrapper(&mut ctx, Uuid::new_v4(), Uuid::new_v4()).await;
    assert!(matches!(result, Err(GymError::NotFound(_))));
}

#[tokio::test]
async fn test_cancel_foreign_booking_forbidden() {
    let mut ctx = TestContext::new();
    let owner = Uuid::new_v4();
    let intruder = Uuid::new_v4();
    let booking = sample_booking(owner, Uuid::new_v4());
    let booking_id = booking.id;

    ctx.booking_repo
        .expect_get_booking_by_id()
        .returning(move |_| Ok(Some(booking.clone())));
    // The booking must remain intact
    ctx.booking_repo.expect_delete_booking().times(0);

    let result = test_cancel_wrapper(&mut ctx, booking_id, intruder).await;
    assert!(matches!(result, Err(GymError::Forbidden(_))));
}

#[tokio::test]
async fn test_cancel_twice_second_not_found() {
    let user_id = Uuid::new_v4();
    let booking = sample_booking(user_id, Uuid::new_v4());
    let booking_id = booking.id;

    // First cancel succeeds
    let mut ctx = TestContext::new();
    let first = booking.clone();
    ctx.booking_repo
        .expect_get_booking_by_id()
        .returning(move |_| Ok(Some(first.clone())));
    ctx.booking_repo
        .expect_delete_booking()
        .times(1)
        .returning(|_, _| Ok(true));
    test_cancel_wrapper(&mut ctx, booking_id, user_id)
        .await
        .expect("first cancel should succeed");

    // Second cancel of the same id reports NotFound, not silent success
    let mut ctx = TestContext::new();
    ctx.booking_repo
        .expect_get_booking_by_id()
        .returning(|_| Ok(None));
    ctx.booking_repo.expect_delete_booking().times(0);
    let result = test_cancel_wrapper(&mut ctx, booking_id, user_id).await;
    assert!(matches!(result, Err(GymError::NotFound(_))));
}

#[tokio::test]
async fn test_cancel_raced_delete_not_found() {
    // The booking resolves but another cancel wins the delete race
    let mut ctx = TestContext::new();
    let user_id = Uuid::new_v4();
    let booking = sample_booking(user_id, Uuid::new_v4());
    let booking_id = booking.id;

    ctx.booking_repo
        .expect_get_booking_by_id()
        .returning(move |_| Ok(Some(booking.clone())));
    ctx.booking_repo
        .expect_delete_booking()
        .returning(|_, _| Ok(false));

    let result = test_cancel_wrapper(&mut ctx, booking_id, user_id).await;
    assert!(matches!(result, Err(GymError::NotFound(_))));
}
