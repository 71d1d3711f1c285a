//! User profile and statistics endpoints

use axum::Extension;
use chrono::naive::NaiveDateTime;
use serde::Serialize;

use crate::storage::Storage;
use crate::trips::TripStats;
use crate::users::User;

use super::CurrentUser;
use super::Error;
use super::Success;

/// The user profile information
///
/// A subset of all the information, ready to be serialized for the outside
/// world. The password hash never leaves the storage layer.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    /// The user ID
    pub id: i64,

    /// The username
    pub username: String,

    /// The email address
    pub email: String,

    /// Optional first name
    pub first_name: Option<String>,

    /// Optional last name
    pub last_name: Option<String>,

    /// Creation date
    pub created_at: NaiveDateTime,
}

impl ProfileResponse {
    /// Create a profile response from a [`User`](User)
    pub fn from_user(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            created_at: user.created_at,
        }
    }
}

/// Get the current user's profile
///
/// Request:
/// ```sh
/// curl -v -b 'travelease_session=<token>' http://localhost:5000/api/user
/// ```
///
/// Response:
/// ```json
/// { "id": 1, "username": "wanderer", "email": "wanderer@example.com", ... }
/// ```
pub async fn profile<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
) -> Result<Success<ProfileResponse>, Error> {
    let user = storage
        .find_single_user_by_id(current_user.user_id())
        .await
        .map_err(|err| Error::storage(&err))?
        .map_or_else(|| Err(Error::not_found("User not found")), Ok)?;

    Ok(Success::ok(ProfileResponse::from_user(user)))
}

/// Get the aggregate trip statistics of the current user
///
/// Request:
/// ```sh
/// curl -v -b 'travelease_session=<token>' http://localhost:5000/api/user/stats
/// ```
///
/// Response:
/// ```json
/// { "total_trips": 3, "upcoming_trips": 1, "unique_destinations": 4, "days_traveling": 17 }
/// ```
pub async fn stats<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
) -> Result<Success<TripStats>, Error> {
    let stats = storage
        .user_stats(current_user.user_id())
        .await
        .map_err(|err| Error::storage(&err))?;

    Ok(Success::ok(stats))
}
