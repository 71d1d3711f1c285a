use chrono::naive::NaiveDateTime;

/// A registered user account
///
/// Deliberately not `Serialize`: the password hash must never reach a
/// response body, profile data goes out through the profile response type
/// instead.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: NaiveDateTime,
}
