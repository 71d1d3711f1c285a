use chrono::naive::NaiveDateTime;
use uuid::Uuid;

/// How long a session stays valid after login
pub const SESSION_LIFETIME_HOURS: i64 = 24;

/// A server-side session, referenced by the token in the session cookie
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Session {
    pub token: Uuid,
    pub user_id: i64,
    pub created_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
}
