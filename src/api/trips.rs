//! Trip aggregate endpoints
//!
//! Every operation is scoped to the authenticated user; a trip that exists
//! but belongs to somebody else answers exactly like a missing one

use axum::Extension;
use serde::Deserialize;
use serde::Serialize;

use crate::storage::CreateAccommodationValues;
use crate::storage::CreateActivityValues;
use crate::storage::CreateDestinationValues;
use crate::storage::CreateTripValues;
use crate::storage::Storage;
use crate::storage::UpdateTripValues;
use crate::trips::AccommodationDetail;
use crate::trips::ActivityDetail;
use crate::trips::Trip;
use crate::trips::TripDestination;
use crate::trips::TripSummary;

use super::request::parse_clearable_date;
use super::request::parse_date_field;
use super::request::parse_time_field;
use super::CurrentUser;
use super::Error;
use super::Form;
use super::Message;
use super::PathParameters;
use super::Success;

/// Create trip form
#[derive(Debug, Deserialize)]
pub struct CreateTripForm {
    /// Title of the trip, the only required field
    title: Option<String>,

    /// Description of the trip
    description: Option<String>,

    /// First day of the trip, `YYYY-MM-DD`
    start_date: Option<String>,

    /// Last day of the trip, `YYYY-MM-DD`
    end_date: Option<String>,

    /// Number of travelers
    travelers_count: Option<i32>,
}

/// Update trip form
///
/// All fields optional; the double `Option` on the clearable fields keeps
/// "field not in the body" apart from an explicit `null`
#[derive(Debug, Deserialize)]
pub struct UpdateTripForm {
    /// New title, `null` is treated the same as absent
    title: Option<String>,

    /// New description, `null` clears it
    #[serde(default, with = "serde_with::rust::double_option")]
    description: Option<Option<String>>,

    /// New start date, `null` clears it
    #[serde(default, with = "serde_with::rust::double_option")]
    start_date: Option<Option<String>>,

    /// New end date, `null` clears it
    #[serde(default, with = "serde_with::rust::double_option")]
    end_date: Option<Option<String>>,

    /// New number of travelers
    travelers_count: Option<i32>,
}

/// Create destination form
#[derive(Debug, Deserialize)]
pub struct CreateDestinationForm {
    /// Name of the destination, the only required field
    destination_name: Option<String>,

    /// Country of the destination
    country: Option<String>,

    /// Arrival day, `YYYY-MM-DD`
    arrival_date: Option<String>,

    /// Departure day, `YYYY-MM-DD`
    departure_date: Option<String>,

    /// Free-form notes
    notes: Option<String>,
}

/// Create activity form
#[derive(Debug, Deserialize)]
pub struct CreateActivityForm {
    /// Link to a destination of the same trip
    destination_id: Option<i64>,

    /// Name of the activity, the only required field
    activity_name: Option<String>,

    /// Day of the activity, `YYYY-MM-DD`
    activity_date: Option<String>,

    /// Time of day, `HH:MM` or `HH:MM:SS`
    activity_time: Option<String>,

    /// Free-form notes
    notes: Option<String>,
}

/// Create accommodation form
#[derive(Debug, Deserialize)]
pub struct CreateAccommodationForm {
    /// Link to a destination of the same trip
    destination_id: Option<i64>,

    /// Name of the accommodation, the only required field
    accommodation_name: Option<String>,

    /// Check-in day, `YYYY-MM-DD`
    check_in: Option<String>,

    /// Check-out day, `YYYY-MM-DD`
    check_out: Option<String>,

    /// Street address
    address: Option<String>,

    /// Booking confirmation number
    confirmation_number: Option<String>,

    /// Free-form notes
    notes: Option<String>,
}

/// Response for a created trip
#[derive(Serialize)]
pub struct TripCreated {
    message: &'static str,
    trip_id: i64,
}

/// Response for a created destination
#[derive(Serialize)]
pub struct DestinationCreated {
    message: &'static str,
    destination_id: i64,
}

/// Response for a created activity
#[derive(Serialize)]
pub struct ActivityCreated {
    message: &'static str,
    activity_id: i64,
}

/// Response for a created accommodation
#[derive(Serialize)]
pub struct AccommodationCreated {
    message: &'static str,
    accommodation_id: i64,
}

/// The full trip aggregate
#[derive(Serialize)]
pub struct TripDetail {
    trip: Trip,
    destinations: Vec<TripDestination>,
    activities: Vec<ActivityDetail>,
    accommodations: Vec<AccommodationDetail>,
}

/// List all trips of the current user, newest first
///
/// Request:
/// ```sh
/// curl -v -b 'travelease_session=<token>' http://localhost:5000/api/trips
/// ```
///
/// Response:
/// ```json
/// [ { "id": 1, "title": "Summer in Lisbon", "destination_count": 2, ... } ]
/// ```
pub async fn list<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
) -> Result<Success<Vec<TripSummary>>, Error> {
    let trips = storage
        .find_all_trips_by_user(current_user.user_id())
        .await
        .map_err(|err| Error::storage(&err))?;

    Ok(Success::ok(trips))
}

/// Create a trip based on the [`CreateTripForm`](CreateTripForm) form
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -b 'travelease_session=<token>' \
///     -d '{ "title": "Summer in Lisbon", "start_date": "2025-07-01" }' \
///     http://localhost:5000/api/trips
/// ```
///
/// Response:
/// ```json
/// { "message": "Trip created successfully", "trip_id": 1 }
/// ```
pub async fn create<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    Form(form): Form<CreateTripForm>,
) -> Result<Success<TripCreated>, Error> {
    let title = form
        .title
        .as_deref()
        .filter(|title| !title.is_empty())
        .ok_or_else(|| Error::bad_request("Trip title is required"))?;

    let start_date = parse_date_field(form.start_date.as_deref())?;
    let end_date = parse_date_field(form.end_date.as_deref())?;

    let values = CreateTripValues {
        user_id: current_user.user_id(),
        title,
        description: form.description.as_deref().unwrap_or(""),
        start_date,
        end_date,
        travelers_count: form.travelers_count.unwrap_or(1),
    };

    let trip = storage
        .create_trip(&values)
        .await
        .map_err(|err| Error::storage(&err))?;

    Ok(Success::created(TripCreated {
        message: "Trip created successfully",
        trip_id: trip.id,
    }))
}

/// Get a single trip with all its destinations, activities and accommodations
///
/// Request:
/// ```sh
/// curl -v -b 'travelease_session=<token>' http://localhost:5000/api/trips/1
/// ```
///
/// Response:
/// ```json
/// { "trip": { ... }, "destinations": [ ... ], "activities": [ ... ], "accommodations": [ ... ] }
/// ```
pub async fn single<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters(trip_id): PathParameters<i64>,
) -> Result<Success<TripDetail>, Error> {
    let trip = fetch_trip(&storage, current_user.user_id(), trip_id).await?;

    let destinations = storage
        .find_all_destinations_by_trip(trip.id)
        .await
        .map_err(|err| Error::storage(&err))?;

    let activities = storage
        .find_all_activities_by_trip(trip.id)
        .await
        .map_err(|err| Error::storage(&err))?;

    let accommodations = storage
        .find_all_accommodations_by_trip(trip.id)
        .await
        .map_err(|err| Error::storage(&err))?;

    Ok(Success::ok(TripDetail {
        trip,
        destinations,
        activities,
        accommodations,
    }))
}

/// Partially update a trip based on the [`UpdateTripForm`](UpdateTripForm) form
///
/// Fields absent from the body are left alone; an explicit `null` clears the
/// description and the dates. A body without any recognized field is a no-op
/// that still answers 200 when the trip exists.
///
/// Request:
/// ```sh
/// curl -v -XPUT -H 'Content-Type: application/json' \
///     -b 'travelease_session=<token>' \
///     -d '{ "title": "Autumn in Lisbon", "end_date": null }' \
///     http://localhost:5000/api/trips/1
/// ```
///
/// Response:
/// ```json
/// { "message": "Trip updated successfully" }
/// ```
pub async fn update<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters(trip_id): PathParameters<i64>,
    Form(form): Form<UpdateTripForm>,
) -> Result<Success<Message>, Error> {
    let start_date = parse_clearable_date(form.start_date.as_ref().map(Option::as_deref))?;
    let end_date = parse_clearable_date(form.end_date.as_ref().map(Option::as_deref))?;

    let values = UpdateTripValues {
        title: form.title.as_deref().filter(|title| !title.is_empty()),
        description: form.description.as_ref().map(Option::as_deref),
        start_date,
        end_date,
        travelers_count: form.travelers_count,
    };

    let found = storage
        .update_trip(current_user.user_id(), trip_id, &values)
        .await
        .map_err(|err| Error::storage(&err))?;

    if found {
        Ok(Success::ok(Message {
            message: "Trip updated successfully",
        }))
    } else {
        Err(Error::not_found("Trip not found"))
    }
}

/// Delete a trip and everything attached to it
///
/// Request:
/// ```sh
/// curl -v -XDELETE -b 'travelease_session=<token>' http://localhost:5000/api/trips/1
/// ```
///
/// Response:
/// ```json
/// { "message": "Trip deleted successfully" }
/// ```
pub async fn delete<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters(trip_id): PathParameters<i64>,
) -> Result<Success<Message>, Error> {
    let found = storage
        .delete_trip(current_user.user_id(), trip_id)
        .await
        .map_err(|err| Error::storage(&err))?;

    if found {
        Ok(Success::ok(Message {
            message: "Trip deleted successfully",
        }))
    } else {
        Err(Error::not_found("Trip not found"))
    }
}

/// Add a destination to a trip
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -b 'travelease_session=<token>' \
///     -d '{ "destination_name": "Lisbon", "country": "Portugal" }' \
///     http://localhost:5000/api/trips/1/destinations
/// ```
///
/// Response:
/// ```json
/// { "message": "Destination added successfully", "destination_id": 2 }
/// ```
pub async fn create_destination<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters(trip_id): PathParameters<i64>,
    Form(form): Form<CreateDestinationForm>,
) -> Result<Success<DestinationCreated>, Error> {
    let trip = fetch_trip(&storage, current_user.user_id(), trip_id).await?;

    let destination_name = form
        .destination_name
        .as_deref()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| Error::bad_request("Destination name is required"))?;

    let values = CreateDestinationValues {
        destination_name,
        country: form.country.as_deref(),
        arrival_date: parse_date_field(form.arrival_date.as_deref())?,
        departure_date: parse_date_field(form.departure_date.as_deref())?,
        notes: form.notes.as_deref(),
    };

    let destination = storage
        .create_destination(trip.id, &values)
        .await
        .map_err(|err| Error::storage(&err))?;

    Ok(Success::created(DestinationCreated {
        message: "Destination added successfully",
        destination_id: destination.id,
    }))
}

/// Delete a destination of a trip
///
/// Activities and accommodations that pointed at it lose the link but stay
///
/// Request:
/// ```sh
/// curl -v -XDELETE -b 'travelease_session=<token>' \
///     http://localhost:5000/api/trips/1/destinations/2
/// ```
pub async fn delete_destination<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters((trip_id, destination_id)): PathParameters<(i64, i64)>,
) -> Result<Success<Message>, Error> {
    let trip = fetch_trip(&storage, current_user.user_id(), trip_id).await?;

    let found = storage
        .delete_destination(trip.id, destination_id)
        .await
        .map_err(|err| Error::storage(&err))?;

    if found {
        Ok(Success::ok(Message {
            message: "Destination deleted successfully",
        }))
    } else {
        Err(Error::not_found("Destination not found"))
    }
}

/// Add an activity to a trip
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -b 'travelease_session=<token>' \
///     -d '{ "activity_name": "Tram 28 ride", "activity_date": "2025-07-02", "activity_time": "14:30" }' \
///     http://localhost:5000/api/trips/1/activities
/// ```
///
/// Response:
/// ```json
/// { "message": "Activity added successfully", "activity_id": 3 }
/// ```
pub async fn create_activity<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters(trip_id): PathParameters<i64>,
    Form(form): Form<CreateActivityForm>,
) -> Result<Success<ActivityCreated>, Error> {
    let trip = fetch_trip(&storage, current_user.user_id(), trip_id).await?;

    let activity_name = form
        .activity_name
        .as_deref()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| Error::bad_request("Activity name is required"))?;

    verify_destination_link(&storage, trip.id, form.destination_id).await?;

    let values = CreateActivityValues {
        destination_id: form.destination_id,
        activity_name,
        activity_date: parse_date_field(form.activity_date.as_deref())?,
        activity_time: parse_time_field(form.activity_time.as_deref())?,
        notes: form.notes.as_deref(),
    };

    let activity = storage
        .create_activity(trip.id, &values)
        .await
        .map_err(|err| Error::storage(&err))?;

    Ok(Success::created(ActivityCreated {
        message: "Activity added successfully",
        activity_id: activity.id,
    }))
}

/// Delete an activity of a trip
///
/// Request:
/// ```sh
/// curl -v -XDELETE -b 'travelease_session=<token>' \
///     http://localhost:5000/api/trips/1/activities/3
/// ```
pub async fn delete_activity<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters((trip_id, activity_id)): PathParameters<(i64, i64)>,
) -> Result<Success<Message>, Error> {
    let trip = fetch_trip(&storage, current_user.user_id(), trip_id).await?;

    let found = storage
        .delete_activity(trip.id, activity_id)
        .await
        .map_err(|err| Error::storage(&err))?;

    if found {
        Ok(Success::ok(Message {
            message: "Activity deleted successfully",
        }))
    } else {
        Err(Error::not_found("Activity not found"))
    }
}

/// Add an accommodation to a trip
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -b 'travelease_session=<token>' \
///     -d '{ "accommodation_name": "Hotel Mundial", "check_in": "2025-07-01" }' \
///     http://localhost:5000/api/trips/1/accommodations
/// ```
///
/// Response:
/// ```json
/// { "message": "Accommodation added successfully", "accommodation_id": 4 }
/// ```
pub async fn create_accommodation<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters(trip_id): PathParameters<i64>,
    Form(form): Form<CreateAccommodationForm>,
) -> Result<Success<AccommodationCreated>, Error> {
    let trip = fetch_trip(&storage, current_user.user_id(), trip_id).await?;

    let accommodation_name = form
        .accommodation_name
        .as_deref()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| Error::bad_request("Accommodation name is required"))?;

    verify_destination_link(&storage, trip.id, form.destination_id).await?;

    let values = CreateAccommodationValues {
        destination_id: form.destination_id,
        accommodation_name,
        check_in: parse_date_field(form.check_in.as_deref())?,
        check_out: parse_date_field(form.check_out.as_deref())?,
        address: form.address.as_deref(),
        confirmation_number: form.confirmation_number.as_deref(),
        notes: form.notes.as_deref(),
    };

    let accommodation = storage
        .create_accommodation(trip.id, &values)
        .await
        .map_err(|err| Error::storage(&err))?;

    Ok(Success::created(AccommodationCreated {
        message: "Accommodation added successfully",
        accommodation_id: accommodation.id,
    }))
}

/// Delete an accommodation of a trip
///
/// Request:
/// ```sh
/// curl -v -XDELETE -b 'travelease_session=<token>' \
///     http://localhost:5000/api/trips/1/accommodations/4
/// ```
pub async fn delete_accommodation<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters((trip_id, accommodation_id)): PathParameters<(i64, i64)>,
) -> Result<Success<Message>, Error> {
    let trip = fetch_trip(&storage, current_user.user_id(), trip_id).await?;

    let found = storage
        .delete_accommodation(trip.id, accommodation_id)
        .await
        .map_err(|err| Error::storage(&err))?;

    if found {
        Ok(Success::ok(Message {
            message: "Accommodation deleted successfully",
        }))
    } else {
        Err(Error::not_found("Accommodation not found"))
    }
}

/// Fetch a trip from storage, combined existence and ownership check
async fn fetch_trip<S: Storage>(storage: &S, user_id: i64, trip_id: i64) -> Result<Trip, Error> {
    storage
        .find_single_trip(user_id, trip_id)
        .await
        .map_err(|err| Error::storage(&err))?
        .map_or_else(|| Err(Error::not_found("Trip not found")), Ok)
}

/// Verify that a linked destination belongs to the given trip
async fn verify_destination_link<S: Storage>(
    storage: &S,
    trip_id: i64,
    destination_id: Option<i64>,
) -> Result<(), Error> {
    let Some(destination_id) = destination_id else {
        return Ok(());
    };

    let destination = storage
        .find_single_destination(trip_id, destination_id)
        .await
        .map_err(|err| Error::storage(&err))?;

    if destination.is_some() {
        Ok(())
    } else {
        Err(Error::bad_request("Destination does not belong to this trip"))
    }
}
