//! Authentication endpoints
//!
//! Register, login and logout manage the server side sessions and the
//! HTTP-only cookie that carries the session token

use axum::Extension;
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::password::hash;
use crate::password::verify;
use crate::storage::CreateUserValues;
use crate::storage::Storage;

use super::current_user::apply_session_cookie;
use super::current_user::clear_session_cookie;
use super::current_user::SESSION_COOKIE;
use super::users::ProfileResponse;
use super::Error;
use super::Form;
use super::Message;
use super::Success;

/// Register form
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    /// Username of the new user
    username: Option<String>,

    /// Email address of the new user
    email: Option<String>,

    /// Password of the new user
    password: Option<String>,

    /// Optional first name
    first_name: Option<String>,

    /// Optional last name
    last_name: Option<String>,
}

/// Login form
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    /// Username of the user
    username: Option<String>,

    /// Password of the user
    password: Option<String>,
}

/// Response for a successful register or login
#[derive(Serialize)]
pub struct AuthResponse {
    /// Human readable outcome
    message: &'static str,

    /// The authenticated user
    user: ProfileResponse,
}

/// Register a new user
///
/// A session is created right away, no separate login needed
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -d '{ "username": "wanderer", "email": "wanderer@example.com", "password": "verysecret" }' \
///     http://localhost:5000/api/auth/register
/// ```
///
/// Response:
/// ```json
/// { "message": "User registered successfully", "user": { "id": 1, "username": "wanderer", ... } }
/// ```
pub async fn register<S: Storage>(
    Extension(storage): Extension<S>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<(CookieJar, Success<AuthResponse>), Error> {
    let (Some(username), Some(email), Some(password)) = (
        non_empty(form.username.as_deref()),
        non_empty(form.email.as_deref()),
        non_empty(form.password.as_deref()),
    ) else {
        return Err(Error::bad_request("Username, email and password are required"));
    };

    let existing = storage
        .find_single_user_by_username(username)
        .await
        .map_err(|err| Error::storage(&err))?;

    if existing.is_some() {
        return Err(Error::bad_request("Username already exists"));
    }

    let existing = storage
        .find_single_user_by_email(email)
        .await
        .map_err(|err| Error::storage(&err))?;

    if existing.is_some() {
        return Err(Error::bad_request("Email already exists"));
    }

    let password_hash = hash(password);

    let values = CreateUserValues {
        username,
        email,
        password_hash: &password_hash,
        first_name: non_empty(form.first_name.as_deref()),
        last_name: non_empty(form.last_name.as_deref()),
    };

    let user = storage
        .create_user(&values)
        .await
        .map_err(|err| Error::storage(&err))?;

    let session = storage
        .create_session(user.id)
        .await
        .map_err(|err| Error::storage(&err))?;

    let jar = apply_session_cookie(jar, &session);

    Ok((
        jar,
        Success::created(AuthResponse {
            message: "User registered successfully",
            user: ProfileResponse::from_user(user),
        }),
    ))
}

/// Log a user in
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -d '{ "username": "wanderer", "password": "verysecret" }' \
///     http://localhost:5000/api/auth/login
/// ```
///
/// Response:
/// ```json
/// { "message": "Login successful", "user": { "id": 1, "username": "wanderer", ... } }
/// ```
pub async fn login<S: Storage>(
    Extension(storage): Extension<S>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<(CookieJar, Success<AuthResponse>), Error> {
    let (Some(username), Some(password)) = (
        non_empty(form.username.as_deref()),
        non_empty(form.password.as_deref()),
    ) else {
        return Err(Error::bad_request("Username and password are required"));
    };

    let user = storage
        .find_single_user_by_username(username)
        .await
        .map_err(|err| Error::storage(&err))?;

    let Some(user) = user.filter(|user| verify(&user.password_hash, password)) else {
        return Err(Error::unauthorized("Invalid username or password"));
    };

    let session = storage
        .create_session(user.id)
        .await
        .map_err(|err| Error::storage(&err))?;

    let jar = apply_session_cookie(jar, &session);

    Ok((
        jar,
        Success::ok(AuthResponse {
            message: "Login successful",
            user: ProfileResponse::from_user(user),
        }),
    ))
}

/// Log the user out
///
/// Destroys the session when there is one, succeeds either way
///
/// Request:
/// ```sh
/// curl -v -XPOST -b 'travelease_session=<token>' \
///     http://localhost:5000/api/auth/logout
/// ```
pub async fn logout<S: Storage>(
    Extension(storage): Extension<S>,
    jar: CookieJar,
) -> Result<(CookieJar, Success<Message>), Error> {
    let token = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok());

    if let Some(token) = token {
        storage
            .delete_session(&token)
            .await
            .map_err(|err| Error::storage(&err))?;
    }

    Ok((
        clear_session_cookie(jar),
        Success::ok(Message {
            message: "Logged out successfully",
        }),
    ))
}

/// Treat absent and empty string values the same
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}
