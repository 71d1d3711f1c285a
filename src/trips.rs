//! Trip aggregate models
//!
//! A trip owns its destinations, activities and accommodations; the whole
//! aggregate is only ever visible to the owning user. All date and time
//! fields serialize to ISO 8601 strings.

use chrono::naive::NaiveDate;
use chrono::naive::NaiveDateTime;
use chrono::naive::NaiveTime;
use serde::Serialize;

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct Trip {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub travelers_count: i32,
    pub created_at: NaiveDateTime,
}

/// A trip row as it appears in the trip list, augmented with the number of
/// destinations attached to it
#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct TripSummary {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub trip: Trip,
    pub destination_count: i64,
}

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct TripDestination {
    pub id: i64,
    pub trip_id: i64,
    pub destination_name: String,
    pub country: Option<String>,
    pub arrival_date: Option<NaiveDate>,
    pub departure_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct Activity {
    pub id: i64,
    pub trip_id: i64,
    /// Nulled out when the referenced destination is deleted
    pub destination_id: Option<i64>,
    pub activity_name: String,
    pub activity_date: Option<NaiveDate>,
    pub activity_time: Option<NaiveTime>,
    pub notes: Option<String>,
}

/// An activity enriched with the name of its destination, if it still has one
#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct ActivityDetail {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub activity: Activity,
    pub destination_name: Option<String>,
}

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct Accommodation {
    pub id: i64,
    pub trip_id: i64,
    /// Nulled out when the referenced destination is deleted
    pub destination_id: Option<i64>,
    pub accommodation_name: String,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub address: Option<String>,
    pub confirmation_number: Option<String>,
    pub notes: Option<String>,
}

/// An accommodation enriched with the name of its destination
#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct AccommodationDetail {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub accommodation: Accommodation,
    pub destination_name: Option<String>,
}

/// Aggregate statistics over all trips of one user
///
/// `days_traveling` sums `(end - start) + 1` per trip, falling back to a
/// single day when `end_date` is missing; trips without a `start_date` do
/// not contribute at all. Date order is not validated on write, so a trip
/// with `end_date` before `start_date` contributes a negative span.
#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct TripStats {
    pub total_trips: i64,
    pub upcoming_trips: i64,
    pub unique_destinations: i64,
    pub days_traveling: i64,
}
