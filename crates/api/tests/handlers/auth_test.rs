use chrono::Utc;
use mockall::predicate;
use uuid::Uuid;

use gymdesk_api::middleware::auth;
use gymdesk_core::errors::{GymError, GymResult};
use gymdesk_core::models::user::Role;
use gymdesk_db::models::{DbSession, DbUser};

use crate::test_utils::TestContext;

fn sample_user(role: Role, requires_password_change: bool, password_hash: &str) -> DbUser {
    let now = Utc::now();
    DbUser {
        id: Uuid::new_v4(),
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
        password_hash: password_hash.to_string(),
        role: role.as_str().to_string(),
        requires_password_change,
        created_at: now,
        updated_at: now,
    }
}

fn sample_session(user_id: Uuid, token: &str) -> DbSession {
    DbSession {
        token: token.to_string(),
        user_id,
        created_at: Utc::now(),
    }
}

// Mirrors the sign-up decision sequence: duplicate pre-check, then create
// as MEMBER with no pending password change.
async fn test_sign_up_wrapper(
    ctx: &mut TestContext,
    name: &'static str,
    email: &'static str,
    password_hash: &'static str,
) -> GymResult<DbUser> {
    let existing = ctx
        .user_repo
        .find_by_email(email)
        .await
        .map_err(GymError::Database)?;

    if existing.is_some() {
        return Err(GymError::Conflict(
            "User with this email already exists".to_string(),
        ));
    }

    ctx.user_repo
        .create_user(name, email, password_hash, Role::Member, false)
        .await
}

// Mirrors the sign-in decision sequence: resolve by email, verify the
// credential, then establish a session.
async fn test_sign_in_wrapper(
    ctx: &mut TestContext,
    email: &'static str,
    password: &str,
    token: &'static str,
) -> GymResult<(DbUser, DbSession)> {
    let user = ctx
        .user_repo
        .find_by_email(email)
        .await
        .map_err(GymError::Database)?;

    let Some(user) = user else {
        return Err(GymError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    };

    if !auth::verify_password(password, &user.password_hash) {
        return Err(GymError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let session = ctx
        .session_repo
        .create_session(token, user.id)
        .await
        .map_err(GymError::Database)?;

    Ok((user, session))
}

// Mirrors change-password: the current password is always verified, even
// while a forced change is pending.
async fn test_change_password_wrapper(
    ctx: &mut TestContext,
    user: &DbUser,
    current_password: &str,
    new_hash: &'static str,
) -> GymResult<DbUser> {
    if !auth::verify_password(current_password, &user.password_hash) {
        return Err(GymError::Unauthorized(
            "Current password is incorrect".to_string(),
        ));
    }

    ctx.user_repo
        .update_password(user.id, new_hash)
        .await
        .map_err(GymError::Database)
}

// Mirrors forced setup: gated on the flag, skips current-password
// verification, rotates sessions.
async fn test_set_password_wrapper(
    ctx: &mut TestContext,
    user: &DbUser,
    new_hash: &'static str,
    new_token: &'static str,
) -> GymResult<(DbUser, DbSession)> {
    if !user.requires_password_change {
        return Err(GymError::Validation(
            "No password change is pending for this account".to_string(),
        ));
    }

    let updated = ctx
        .user_repo
        .update_password(user.id, new_hash)
        .await
        .map_err(GymError::Database)?;

    ctx.session_repo
        .delete_sessions_for_user(user.id)
        .await
        .map_err(GymError::Database)?;
    let session = ctx
        .session_repo
        .create_session(new_token, user.id)
        .await
        .map_err(GymError::Database)?;

    Ok((updated, session))
}

#[tokio::test]
async fn test_sign_up_duplicate_email_conflict() {
    let mut ctx = TestContext::new();

    ctx.user_repo
        .expect_find_by_email()
        .with(predicate::eq("alice@example.com"))
        .returning(|_| Ok(Some(sample_user(Role::Member, false, "hash"))));

    // No user may be created on a duplicate email
    ctx.user_repo.expect_create_user().times(0);

    let result =
        test_sign_up_wrapper(&mut ctx, "Alice", "alice@example.com", "hash").await;
    assert!(matches!(result, Err(GymError::Conflict(_))));
}

#[tokio::test]
async fn test_sign_up_creates_member_without_pending_change() {
    let mut ctx = TestContext::new();

    ctx.user_repo
        .expect_find_by_email()
        .returning(|_| Ok(None));
    ctx.user_repo
        .expect_create_user()
        .with(
            predicate::eq("Alice"),
            predicate::eq("alice@example.com"),
            predicate::always(),
            predicate::eq(Role::Member),
            predicate::eq(false),
        )
        .times(1)
        .returning(|_, _, hash, role, flag| {
            let mut user = sample_user(role, flag, hash);
            user.name = "Alice".to_string();
            Ok(user)
        });

    let user = test_sign_up_wrapper(&mut ctx, "Alice", "alice@example.com", "hash")
        .await
        .expect("sign up should succeed for a new email");

    assert_eq!(user.role, "MEMBER");
    assert!(!user.requires_password_change);
}

#[tokio::test]
async fn test_sign_in_unknown_email_unauthorized() {
    let mut ctx = TestContext::new();

    ctx.user_repo
        .expect_find_by_email()
        .returning(|_| Ok(None));
    ctx.session_repo.expect_create_session().times(0);

    let result = test_sign_in_wrapper(&mut ctx, "ghost@example.com", "pw", "token").await;
    assert!(matches!(result, Err(GymError::Unauthorized(_))));
}

#[tokio::test]
async fn test_sign_in_wrong_password_unauthorized() {
    let mut ctx = TestContext::new();
    let stored_hash = auth::hash_password("correct horse").unwrap();

    ctx.user_repo
        .expect_find_by_email()
        .returning(move |_| Ok(Some(sample_user(Role::Member, false, &stored_hash))));

    // No session may be established on a failed verification
    ctx.session_repo.expect_create_session().times(0);

    let result =
        test_sign_in_wrapper(&mut ctx, "alice@example.com", "battery staple", "token").await;
    assert!(matches!(result, Err(GymError::Unauthorized(_))));
}

#[tokio::test]
async fn test_sign_in_success_establishes_session() {
    let mut ctx = TestContext::new();
    let stored_hash = auth::hash_password("correct horse").unwrap();

    ctx.user_repo
        .expect_find_by_email()
        .returning(move |_| Ok(Some(sample_user(Role::Member, false, &stored_hash))));
    ctx.session_repo
        .expect_create_session()
        .with(predicate::eq("token-1"), predicate::always())
        .times(1)
        .returning(|token, user_id| Ok(sample_session(user_id, token)));

    let (user, session) =
        test_sign_in_wrapper(&mut ctx, "alice@example.com", "correct horse", "token-1")
            .await
            .expect("sign in should succeed with the right password");

    assert_eq!(session.user_id, user.id);
    assert_eq!(session.token, "token-1");
}

#[tokio::test]
async fn test_change_password_wrong_current_rejected_even_when_flagged() {
    // The pending-change flag never weakens the normal change-password
    // path; only the dedicated forced-setup flow skips verification.
    let mut ctx = TestContext::new();
    let stored_hash = auth::hash_password("provisioned").unwrap();
    let user = sample_user(Role::Trainer, true, &stored_hash);

    ctx.user_repo.expect_update_password().times(0);

    let result = test_change_password_wrapper(&mut ctx, &user, "wrong guess", "newhash").await;
    assert!(matches!(result, Err(GymError::Unauthorized(_))));
}

#[tokio::test]
async fn test_change_password_success_clears_flag() {
    let mut ctx = TestContext::new();
    let stored_hash = auth::hash_password("old password").unwrap();
    let user = sample_user(Role::Member, false, &stored_hash);
    let user_id = user.id;

    ctx.user_repo
        .expect_update_password()
        .with(predicate::eq(user_id), predicate::eq("newhash"))
        .times(1)
        .returning(|id, hash| {
            let mut updated = sample_user(Role::Member, false, hash);
            updated.id = id;
            Ok(updated)
        });

    let updated = test_change_password_wrapper(&mut ctx, &user, "old password", "newhash")
        .await
        .expect("change should succeed with the right current password");

    assert!(!updated.requires_password_change);
}

#[tokio::test]
async fn test_forced_setup_skips_current_password_and_clears_flag() {
    let mut ctx = TestContext::new();
    // Provisioned trainer: flag set, default credential hashed normally
    let stored_hash = auth::hash_password("changeme").unwrap();
    let user = sample_user(Role::Trainer, true, &stored_hash);
    let user_id = user.id;

    ctx.user_repo
        .expect_update_password()
        .with(predicate::eq(user_id), predicate::eq("newhash"))
        .times(1)
        .returning(|id, hash| {
            let mut updated = sample_user(Role::Trainer, false, hash);
            updated.id = id;
            Ok(updated)
        });
    // Old sessions die, a fresh one is issued: the caller is
    // re-authenticated under the new credential
    ctx.session_repo
        .expect_delete_sessions_for_user()
        .with(predicate::eq(user_id))
        .times(1)
        .returning(|_| Ok(()));
    ctx.session_repo
        .expect_create_session()
        .with(predicate::eq("fresh-token"), predicate::eq(user_id))
        .times(1)
        .returning(|token, user_id| Ok(sample_session(user_id, token)));

    let (updated, session) = test_set_password_wrapper(&mut ctx, &user, "newhash", "fresh-token")
        .await
        .expect("forced setup should succeed while the flag is set");

    assert!(!updated.requires_password_change);
    assert_eq!(session.user_id, user_id);
}

#[tokio::test]
async fn test_forced_setup_rejected_when_no_change_pending() {
    let mut ctx = TestContext::new();
    let user = sample_user(Role::Member, false, "hash");

    ctx.user_repo.expect_update_password().times(0);
    ctx.session_repo.expect_delete_sessions_for_user().times(0);
    ctx.session_repo.expect_create_session().times(0);

    let result = test_set_password_wrapper(&mut ctx, &user, "newhash", "token").await;
    assert!(matches!(result, Err(GymError::Validation(_))));
}

#[tokio::test]
async fn test_provisioned_trainer_requires_password_change() {
    // Trainer provisioning creates the user with the rotation flag set
    let mut ctx = TestContext::new();

    ctx.user_repo
        .expect_create_user()
        .with(
            predicate::always(),
            predicate::always(),
            predicate::always(),
            predicate::eq(Role::Trainer),
            predicate::eq(true),
        )
        .times(1)
        .returning(|_, _, hash, role, flag| Ok(sample_user(role, flag, hash)));

    let user = ctx
        .user_repo
        .create_user("Jordan", "jordan@gym.com", "hash", Role::Trainer, true)
        .await
        .expect("provisioning should succeed");

    assert_eq!(user.role, "TRAINER");
    assert!(user.requires_password_change);
}
