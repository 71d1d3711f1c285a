//! Current user service
//!
//! Get the current user from the request based on the session cookie

use std::marker::PhantomData;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::Extension;
use axum::RequestPartsExt;
use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::cookie::SameSite;
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use crate::api::Error;
use crate::sessions::Session;
use crate::storage::Storage;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "travelease_session";

/// The authenticated user of the request
///
/// Extracting this guards the endpoint: requests without a valid, unexpired
/// session are rejected before the handler body runs
pub struct CurrentUser<S> {
    /// ID of the authenticated user
    user_id: i64,

    /// The storage backend the session was resolved against
    storage: PhantomData<fn() -> S>,
}

impl<S> CurrentUser<S> {
    pub fn user_id(&self) -> i64 {
        self.user_id
    }
}

#[async_trait]
impl<B, S> FromRequestParts<B> for CurrentUser<S>
where
    B: Send + Sync,
    S: Storage,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &B) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_request_parts(parts, state)
            .await
            .unwrap_or_default();

        let token = jar
            .get(SESSION_COOKIE)
            .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
            .ok_or_else(|| Error::unauthorized("Authentication required"))?;

        let Extension(storage) = parts
            .extract::<Extension<S>>()
            .await
            .map_err(|_| Error::internal_server_error("Could not get a storage"))?;

        let session = storage
            .find_session(&token)
            .await
            .map_err(|err| Error::storage(&err))?;

        match session {
            Some(session) => Ok(Self {
                user_id: session.user_id,
                storage: PhantomData,
            }),
            None => Err(Error::unauthorized("Authentication required")),
        }
    }
}

/// Attach the session cookie to the response
pub fn apply_session_cookie(jar: CookieJar, session: &Session) -> CookieJar {
    let cookie = Cookie::build((SESSION_COOKIE, session.token.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);

    jar.add(cookie)
}

/// Drop the session cookie from the response
pub fn clear_session_cookie(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}
