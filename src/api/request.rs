//! API request helpers

use axum::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::extract::rejection::PathRejection;
use axum::extract::FromRequest;
use axum::extract::FromRequestParts;
use axum::extract::Json;
use axum::extract::Path;
use axum::extract::Request;
use axum::http::request::Parts;
use chrono::naive::NaiveDate;
use chrono::naive::NaiveTime;
use serde::de::DeserializeOwned;

use super::Error;

/// Parse a calendar date in `YYYY-MM-DD` form
pub fn parse_date(value: &str) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| Error::bad_request("Invalid date format. Use YYYY-MM-DD"))
}

/// Parse an optional date field
///
/// Absent values and empty strings both count as "no date"
pub fn parse_date_field(value: Option<&str>) -> Result<Option<NaiveDate>, Error> {
    match value {
        Some(value) if !value.is_empty() => parse_date(value).map(Some),
        _ => Ok(None),
    }
}

/// Parse a clearable date field of a partial update
///
/// The outer `Option` is "was the field provided at all", the inner one
/// carries the explicit null (or empty string) that clears the stored date
pub fn parse_clearable_date(
    value: Option<Option<&str>>,
) -> Result<Option<Option<NaiveDate>>, Error> {
    match value {
        None => Ok(None),
        Some(value) => parse_date_field(value).map(Some),
    }
}

/// Parse a time of day, with or without seconds
pub fn parse_time(value: &str) -> Result<NaiveTime, Error> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| Error::bad_request("Invalid time format. Use HH:MM"))
}

/// Parse an optional time field
pub fn parse_time_field(value: Option<&str>) -> Result<Option<NaiveTime>, Error> {
    match value {
        Some(value) if !value.is_empty() => parse_time(value).map(Some),
        _ => Ok(None),
    }
}

fn parse_json<J>(json: Result<Json<J>, JsonRejection>) -> Result<J, Error> {
    match json {
        Ok(Json(json)) => Ok(json),
        Err(err) => match err {
            JsonRejection::JsonDataError(err) => {
                Err(Error::bad_request("Data error").with_description(err))
            }
            JsonRejection::JsonSyntaxError(err) => {
                Err(Error::bad_request("JSON syntax error").with_description(err))
            }
            JsonRejection::MissingJsonContentType(_err) => Err(Error::bad_request(
                "Missing `application/json` content type",
            )),
            JsonRejection::BytesRejection(err) => {
                Err(Error::bad_request("Invalid characters in JSON").with_description(err))
            }
            err => Err(Error::bad_request("Unknown JSON error").with_description(err)),
        },
    }
}

/// Wrapper for the JSON extractor
pub struct Form<F>(pub F);

#[async_trait]
impl<S, F> FromRequest<S> for Form<F>
where
    S: Send + Sync,
    F: DeserializeOwned + Send,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let json = Result::<Json<F>, JsonRejection>::from_request(req, state)
            .await
            .map_err(|_| Error::internal_server_error("Could not extract form"))?;

        parse_json(json).map(Form)
    }
}

fn parse_path<P>(path: Result<Path<P>, PathRejection>) -> Result<P, Error> {
    match path {
        Ok(Path(path)) => Ok(path),
        Err(err) => match err {
            PathRejection::FailedToDeserializePathParams(err) => {
                Err(Error::bad_request("Invalid path parameter").with_description(err))
            }
            PathRejection::MissingPathParams(err) => {
                Err(Error::bad_request("Missing path parameter").with_description(err))
            }
            err => Err(Error::bad_request("Unknown path error").with_description(err)),
        },
    }
}

pub struct PathParameters<P>(pub P);

#[async_trait]
impl<S, P> FromRequestParts<S> for PathParameters<P>
where
    S: Send + Sync,
    P: DeserializeOwned + Send,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let path = Result::<Path<P>, PathRejection>::from_request_parts(parts, state)
            .await
            .map_err(|_| Error::internal_server_error("Could not extract path"))?;

        parse_path(path).map(PathParameters)
    }
}
