//! Postgres storage

use std::time::Duration;

use axum::async_trait;
use chrono::Duration as ChronoDuration;
use chrono::Utc;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use sqlx::QueryBuilder;
use uuid::Uuid;

use crate::sessions::Session;
use crate::sessions::SESSION_LIFETIME_HOURS;
use crate::trips::Accommodation;
use crate::trips::AccommodationDetail;
use crate::trips::Activity;
use crate::trips::ActivityDetail;
use crate::trips::Trip;
use crate::trips::TripDestination;
use crate::trips::TripStats;
use crate::trips::TripSummary;
use crate::users::User;

use super::CreateAccommodationValues;
use super::CreateActivityValues;
use super::CreateDestinationValues;
use super::CreateTripValues;
use super::CreateUserValues;
use super::Error;
use super::Result;
use super::Storage;
use super::UpdateTripValues;

/// Migrator to run migrations on startup
static MIGRATOR: Migrator = sqlx::migrate!();

/// Postgres storage
#[derive(Clone)]
pub struct Postgres {
    /// Pool of connections
    connection_pool: PgPool,
}

impl Postgres {
    /// Create Postgres storage
    ///
    /// Use the `DATABASE_URL` environment variable
    ///
    /// Migrations will be run
    pub async fn new() -> Self {
        let database_connection_string = std::env::var("DATABASE_URL").expect("Valid DATABASE_URL");

        let connection_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_connection_string)
            .await
            .expect("Valid connection");

        Self::new_with_pool(connection_pool).await
    }

    /// Create Postgres storage with existing pool
    ///
    /// Migrations will be run
    pub async fn new_with_pool(connection_pool: PgPool) -> Self {
        let migration_result = MIGRATOR.run(&connection_pool).await;

        if let Err(err) = migration_result {
            panic!("Migrations could not run: {err}");
        }

        Self { connection_pool }
    }
}

#[async_trait]
impl Storage for Postgres {
    async fn find_single_user_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r"
            SELECT *
            FROM users
            WHERE id = $1
            LIMIT 1
            ",
        )
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(user)
    }

    async fn find_single_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r"
            SELECT *
            FROM users
            WHERE username = $1
            LIMIT 1
            ",
        )
        .bind(username)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(user)
    }

    async fn find_single_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r"
            SELECT *
            FROM users
            WHERE email = $1
            LIMIT 1
            ",
        )
        .bind(email)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(user)
    }

    async fn create_user(&self, values: &CreateUserValues) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r"
            INSERT INTO users (username, email, password_hash, first_name, last_name)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            ",
        )
        .bind(values.username)
        .bind(values.email)
        .bind(values.password_hash)
        .bind(values.first_name)
        .bind(values.last_name)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(user)
    }

    async fn create_session(&self, user_id: i64) -> Result<Session> {
        let expires_at = Utc::now().naive_utc() + ChronoDuration::hours(SESSION_LIFETIME_HOURS);

        let session = sqlx::query_as::<_, Session>(
            r"
            INSERT INTO sessions (token, user_id, expires_at)
            VALUES ($1, $2, $3)
            RETURNING *
            ",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(expires_at)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(session)
    }

    async fn find_session(&self, token: &Uuid) -> Result<Option<Session>> {
        let session = sqlx::query_as::<_, Session>(
            r"
            SELECT *
            FROM sessions
            WHERE token = $1 AND expires_at > CURRENT_TIMESTAMP
            LIMIT 1
            ",
        )
        .bind(token)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(session)
    }

    async fn delete_session(&self, token: &Uuid) -> Result<()> {
        sqlx::query(
            r"
            DELETE FROM sessions
            WHERE token = $1
            ",
        )
        .bind(token)
        .execute(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(())
    }

    async fn find_all_trips_by_user(&self, user_id: i64) -> Result<Vec<TripSummary>> {
        let trips = sqlx::query_as::<_, TripSummary>(
            r"
            SELECT
                t.*,
                (
                    SELECT COUNT(*)
                    FROM trip_destinations td
                    WHERE td.trip_id = t.id
                ) AS destination_count
            FROM trips t
            WHERE t.user_id = $1
            ORDER BY t.created_at DESC, t.id DESC
            ",
        )
        .bind(user_id)
        .fetch_all(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(trips)
    }

    async fn find_single_trip(&self, user_id: i64, trip_id: i64) -> Result<Option<Trip>> {
        let trip = sqlx::query_as::<_, Trip>(
            r"
            SELECT *
            FROM trips
            WHERE id = $1 AND user_id = $2
            LIMIT 1
            ",
        )
        .bind(trip_id)
        .bind(user_id)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(trip)
    }

    async fn create_trip(&self, values: &CreateTripValues) -> Result<Trip> {
        let trip = sqlx::query_as::<_, Trip>(
            r"
            INSERT INTO trips (user_id, title, description, start_date, end_date, travelers_count)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            ",
        )
        .bind(values.user_id)
        .bind(values.title)
        .bind(values.description)
        .bind(values.start_date)
        .bind(values.end_date)
        .bind(values.travelers_count)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(trip)
    }

    async fn update_trip(
        &self,
        user_id: i64,
        trip_id: i64,
        values: &UpdateTripValues,
    ) -> Result<bool> {
        if values.is_empty() {
            // nothing to set, only the existence and ownership check remains
            return Ok(self.find_single_trip(user_id, trip_id).await?.is_some());
        }

        let mut builder = QueryBuilder::<sqlx::Postgres>::new("UPDATE trips SET ");
        let mut fields = builder.separated(", ");

        if let Some(title) = values.title {
            fields.push("title = ").push_bind_unseparated(title);
        }

        if let Some(description) = values.description {
            fields
                .push("description = ")
                .push_bind_unseparated(description);
        }

        if let Some(start_date) = values.start_date {
            fields
                .push("start_date = ")
                .push_bind_unseparated(start_date);
        }

        if let Some(end_date) = values.end_date {
            fields.push("end_date = ").push_bind_unseparated(end_date);
        }

        if let Some(travelers_count) = values.travelers_count {
            fields
                .push("travelers_count = ")
                .push_bind_unseparated(travelers_count);
        }

        builder
            .push(" WHERE id = ")
            .push_bind(trip_id)
            .push(" AND user_id = ")
            .push_bind(user_id);

        let result = builder
            .build()
            .execute(&self.connection_pool)
            .await
            .map_err(connection_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_trip(&self, user_id: i64, trip_id: i64) -> Result<bool> {
        let result = sqlx::query(
            r"
            DELETE FROM trips
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(trip_id)
        .bind(user_id)
        .execute(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_all_destinations_by_trip(&self, trip_id: i64) -> Result<Vec<TripDestination>> {
        let destinations = sqlx::query_as::<_, TripDestination>(
            r"
            SELECT *
            FROM trip_destinations
            WHERE trip_id = $1
            ORDER BY arrival_date ASC NULLS LAST, id ASC
            ",
        )
        .bind(trip_id)
        .fetch_all(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(destinations)
    }

    async fn find_single_destination(
        &self,
        trip_id: i64,
        destination_id: i64,
    ) -> Result<Option<TripDestination>> {
        let destination = sqlx::query_as::<_, TripDestination>(
            r"
            SELECT *
            FROM trip_destinations
            WHERE id = $1 AND trip_id = $2
            LIMIT 1
            ",
        )
        .bind(destination_id)
        .bind(trip_id)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(destination)
    }

    async fn create_destination(
        &self,
        trip_id: i64,
        values: &CreateDestinationValues,
    ) -> Result<TripDestination> {
        let destination = sqlx::query_as::<_, TripDestination>(
            r"
            INSERT INTO trip_destinations
                (trip_id, destination_name, country, arrival_date, departure_date, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            ",
        )
        .bind(trip_id)
        .bind(values.destination_name)
        .bind(values.country)
        .bind(values.arrival_date)
        .bind(values.departure_date)
        .bind(values.notes)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(destination)
    }

    async fn delete_destination(&self, trip_id: i64, destination_id: i64) -> Result<bool> {
        let result = sqlx::query(
            r"
            DELETE FROM trip_destinations
            WHERE id = $1 AND trip_id = $2
            ",
        )
        .bind(destination_id)
        .bind(trip_id)
        .execute(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_all_activities_by_trip(&self, trip_id: i64) -> Result<Vec<ActivityDetail>> {
        let activities = sqlx::query_as::<_, ActivityDetail>(
            r"
            SELECT
                a.*,
                td.destination_name AS destination_name
            FROM activities a
            LEFT JOIN trip_destinations td ON td.id = a.destination_id
            WHERE a.trip_id = $1
            ORDER BY
                a.activity_date ASC NULLS LAST,
                a.activity_time ASC NULLS LAST,
                a.id ASC
            ",
        )
        .bind(trip_id)
        .fetch_all(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(activities)
    }

    async fn create_activity(
        &self,
        trip_id: i64,
        values: &CreateActivityValues,
    ) -> Result<Activity> {
        let activity = sqlx::query_as::<_, Activity>(
            r"
            INSERT INTO activities
                (trip_id, destination_id, activity_name, activity_date, activity_time, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            ",
        )
        .bind(trip_id)
        .bind(values.destination_id)
        .bind(values.activity_name)
        .bind(values.activity_date)
        .bind(values.activity_time)
        .bind(values.notes)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(activity)
    }

    async fn delete_activity(&self, trip_id: i64, activity_id: i64) -> Result<bool> {
        let result = sqlx::query(
            r"
            DELETE FROM activities
            WHERE id = $1 AND trip_id = $2
            ",
        )
        .bind(activity_id)
        .bind(trip_id)
        .execute(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_all_accommodations_by_trip(
        &self,
        trip_id: i64,
    ) -> Result<Vec<AccommodationDetail>> {
        let accommodations = sqlx::query_as::<_, AccommodationDetail>(
            r"
            SELECT
                a.*,
                td.destination_name AS destination_name
            FROM accommodations a
            LEFT JOIN trip_destinations td ON td.id = a.destination_id
            WHERE a.trip_id = $1
            ORDER BY a.check_in ASC NULLS LAST, a.id ASC
            ",
        )
        .bind(trip_id)
        .fetch_all(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(accommodations)
    }

    async fn create_accommodation(
        &self,
        trip_id: i64,
        values: &CreateAccommodationValues,
    ) -> Result<Accommodation> {
        let accommodation = sqlx::query_as::<_, Accommodation>(
            r"
            INSERT INTO accommodations
                (trip_id, destination_id, accommodation_name, check_in, check_out,
                 address, confirmation_number, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            ",
        )
        .bind(trip_id)
        .bind(values.destination_id)
        .bind(values.accommodation_name)
        .bind(values.check_in)
        .bind(values.check_out)
        .bind(values.address)
        .bind(values.confirmation_number)
        .bind(values.notes)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(accommodation)
    }

    async fn delete_accommodation(&self, trip_id: i64, accommodation_id: i64) -> Result<bool> {
        let result = sqlx::query(
            r"
            DELETE FROM accommodations
            WHERE id = $1 AND trip_id = $2
            ",
        )
        .bind(accommodation_id)
        .bind(trip_id)
        .execute(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn user_stats(&self, user_id: i64) -> Result<TripStats> {
        let stats = sqlx::query_as::<_, TripStats>(
            r"
            SELECT
                (
                    SELECT COUNT(*)
                    FROM trips
                    WHERE user_id = $1
                ) AS total_trips,
                (
                    SELECT COUNT(*)
                    FROM trips
                    WHERE user_id = $1 AND start_date > CURRENT_DATE
                ) AS upcoming_trips,
                (
                    SELECT COUNT(DISTINCT td.destination_name)
                    FROM trip_destinations td
                    JOIN trips t ON t.id = td.trip_id
                    WHERE t.user_id = $1
                ) AS unique_destinations,
                (
                    SELECT COALESCE(SUM(COALESCE(end_date, start_date) - start_date + 1), 0)
                    FROM trips
                    WHERE user_id = $1 AND start_date IS NOT NULL
                ) AS days_traveling
            ",
        )
        .bind(user_id)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(stats)
    }
}

/// Convert `SQLx` to storage connection error
fn connection_error<E>(err: E) -> Error
where
    E: std::error::Error,
{
    Error::Connection(err.to_string())
}
