//! All things related to the storage of users, sessions and trip aggregates
//!
//! The [`Storage`](Storage) trait is the seam between the HTTP layer and the
//! actual store. The default backend is an in-memory one, the `postgres`
//! feature swaps in a real database. Ownership checks live in the queries
//! themselves: every trip lookup and mutation is scoped to a user id, a trip
//! owned by somebody else is indistinguishable from a missing one.

use axum::async_trait;
use chrono::naive::NaiveDate;
use chrono::naive::NaiveTime;
use thiserror::Error;
use uuid::Uuid;

use crate::sessions::Session;
use crate::trips::Accommodation;
use crate::trips::AccommodationDetail;
use crate::trips::Activity;
use crate::trips::ActivityDetail;
use crate::trips::Trip;
use crate::trips::TripDestination;
use crate::trips::TripStats;
use crate::trips::TripSummary;
use crate::users::User;

pub use memory::Memory;

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

/// Setup the storage
#[cfg(not(feature = "postgres"))]
#[allow(clippy::unused_async)]
pub async fn setup() -> Memory {
    Memory::new()
}

/// Setup the storage
#[cfg(feature = "postgres")]
pub async fn setup() -> postgres::Postgres {
    postgres::Postgres::new().await
}

/// Storage errors
#[derive(Debug, Error)]
pub enum Error {
    /// A connection error with the storage
    #[error("Connection error: {0}")]
    Connection(String),
}

/// Result type for all storage interactions
pub type Result<T> = core::result::Result<T, Error>;

/// Values to create a User
pub struct CreateUserValues<'a> {
    /// The username, unique across all users
    pub username: &'a str,

    /// The email address, unique across all users
    pub email: &'a str,

    /// The argon2-hashed password
    pub password_hash: &'a str,

    /// Optional first name
    pub first_name: Option<&'a str>,

    /// Optional last name
    pub last_name: Option<&'a str>,
}

/// Values to create a Trip
pub struct CreateTripValues<'a> {
    /// The owning user
    pub user_id: i64,

    /// Title of the trip, already validated to be non-empty
    pub title: &'a str,

    /// Description, empty string when not provided
    pub description: &'a str,

    /// First day of the trip
    pub start_date: Option<NaiveDate>,

    /// Last day of the trip
    pub end_date: Option<NaiveDate>,

    /// Number of travelers, 1 when not provided
    pub travelers_count: i32,
}

/// Values to update a Trip
///
/// The outer `Option` distinguishes "not provided, leave alone" from
/// "provided"; for the clearable fields the inner `Option` carries an
/// explicit null that resets the column.
#[derive(Default)]
pub struct UpdateTripValues<'a> {
    /// New title
    pub title: Option<&'a str>,

    /// New description, `Some(None)` clears it
    pub description: Option<Option<&'a str>>,

    /// New start date, `Some(None)` clears it
    pub start_date: Option<Option<NaiveDate>>,

    /// New end date, `Some(None)` clears it
    pub end_date: Option<Option<NaiveDate>>,

    /// New number of travelers
    pub travelers_count: Option<i32>,
}

impl UpdateTripValues<'_> {
    /// Whether the update carries no recognized fields at all
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.travelers_count.is_none()
    }
}

/// Values to create a `TripDestination`
pub struct CreateDestinationValues<'a> {
    /// Name of the destination, already validated to be non-empty
    pub destination_name: &'a str,

    /// Optional country
    pub country: Option<&'a str>,

    /// Arrival day at this destination
    pub arrival_date: Option<NaiveDate>,

    /// Departure day from this destination
    pub departure_date: Option<NaiveDate>,

    /// Free-form notes
    pub notes: Option<&'a str>,
}

/// Values to create an Activity
pub struct CreateActivityValues<'a> {
    /// Optional link to a destination of the same trip
    pub destination_id: Option<i64>,

    /// Name of the activity, already validated to be non-empty
    pub activity_name: &'a str,

    /// Day of the activity
    pub activity_date: Option<NaiveDate>,

    /// Time of day of the activity
    pub activity_time: Option<NaiveTime>,

    /// Free-form notes
    pub notes: Option<&'a str>,
}

/// Values to create an Accommodation
pub struct CreateAccommodationValues<'a> {
    /// Optional link to a destination of the same trip
    pub destination_id: Option<i64>,

    /// Name of the accommodation, already validated to be non-empty
    pub accommodation_name: &'a str,

    /// Check-in day
    pub check_in: Option<NaiveDate>,

    /// Check-out day
    pub check_out: Option<NaiveDate>,

    /// Street address
    pub address: Option<&'a str>,

    /// Booking confirmation number
    pub confirmation_number: Option<&'a str>,

    /// Free-form notes
    pub notes: Option<&'a str>,
}

/// Storage with all supported operations
#[async_trait]
pub trait Storage: Clone + Send + Sync + 'static {
    /// Finds a single user by its ID
    async fn find_single_user_by_id(&self, id: i64) -> Result<Option<User>>;

    /// Finds a single user by its username
    async fn find_single_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Finds a single user by its email address
    async fn find_single_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Create a single user
    async fn create_user(&self, values: &CreateUserValues) -> Result<User>;

    /// Create a session for a user
    ///
    /// The session expires [`SESSION_LIFETIME_HOURS`](crate::sessions::SESSION_LIFETIME_HOURS)
    /// after creation
    async fn create_session(&self, user_id: i64) -> Result<Session>;

    /// Find a session by its token
    ///
    /// Expired sessions are never returned
    async fn find_session(&self, token: &Uuid) -> Result<Option<Session>>;

    /// Delete a session, logging the user out
    async fn delete_session(&self, token: &Uuid) -> Result<()>;

    /// Find all trips of a user, newest first, each with its destination count
    async fn find_all_trips_by_user(&self, user_id: i64) -> Result<Vec<TripSummary>>;

    /// Find a single trip, combined existence and ownership check
    ///
    /// A trip that exists but belongs to another user is reported as absent
    async fn find_single_trip(&self, user_id: i64, trip_id: i64) -> Result<Option<Trip>>;

    /// Create a trip
    async fn create_trip(&self, values: &CreateTripValues) -> Result<Trip>;

    /// Apply a partial update to a trip as one atomic unit
    ///
    /// Returns whether a trip owned by `user_id` was found; an update without
    /// any fields still performs the combined existence and ownership check
    async fn update_trip(
        &self,
        user_id: i64,
        trip_id: i64,
        values: &UpdateTripValues,
    ) -> Result<bool>;

    /// Delete a trip and, by cascade, all its destinations, activities and
    /// accommodations
    ///
    /// Returns whether a trip owned by `user_id` was found
    async fn delete_trip(&self, user_id: i64, trip_id: i64) -> Result<bool>;

    /// Find all destinations of a trip, ordered by arrival date ascending,
    /// undated ones last
    async fn find_all_destinations_by_trip(&self, trip_id: i64) -> Result<Vec<TripDestination>>;

    /// Find a single destination of a trip
    async fn find_single_destination(
        &self,
        trip_id: i64,
        destination_id: i64,
    ) -> Result<Option<TripDestination>>;

    /// Create a destination under a trip
    async fn create_destination(
        &self,
        trip_id: i64,
        values: &CreateDestinationValues,
    ) -> Result<TripDestination>;

    /// Delete a destination of a trip
    ///
    /// Activities and accommodations referencing it survive with their
    /// `destination_id` set to null. Returns whether the destination existed
    async fn delete_destination(&self, trip_id: i64, destination_id: i64) -> Result<bool>;

    /// Find all activities of a trip with their destination names, ordered by
    /// day and time of day ascending, undated ones last
    async fn find_all_activities_by_trip(&self, trip_id: i64) -> Result<Vec<ActivityDetail>>;

    /// Create an activity under a trip
    async fn create_activity(
        &self,
        trip_id: i64,
        values: &CreateActivityValues,
    ) -> Result<Activity>;

    /// Delete an activity of a trip, returns whether it existed
    async fn delete_activity(&self, trip_id: i64, activity_id: i64) -> Result<bool>;

    /// Find all accommodations of a trip with their destination names,
    /// ordered by check-in day ascending, undated ones last
    async fn find_all_accommodations_by_trip(
        &self,
        trip_id: i64,
    ) -> Result<Vec<AccommodationDetail>>;

    /// Create an accommodation under a trip
    async fn create_accommodation(
        &self,
        trip_id: i64,
        values: &CreateAccommodationValues,
    ) -> Result<Accommodation>;

    /// Delete an accommodation of a trip, returns whether it existed
    async fn delete_accommodation(&self, trip_id: i64, accommodation_id: i64) -> Result<bool>;

    /// Compute the aggregate statistics for a user's trips
    async fn user_stats(&self, user_id: i64) -> Result<TripStats>;
}
