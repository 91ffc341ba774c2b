pub mod booking;
pub mod gym_class;
pub mod session;
pub mod trainer;
pub mod user;

/// Postgres SQLSTATE for unique-constraint violations. Raced duplicate
/// inserts surface with this code and are translated to typed errors at
/// the repository boundary.
pub(crate) const UNIQUE_VIOLATION: &str = "23505";

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION)
    )
}
