//! Memory storage
//!
//! The default backend and the test double. Everything lives behind one
//! lock, which gives mutations the same atomicity the database backend gets
//! from single statements. Will be destroyed on system shutdown.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;

use axum::async_trait;
use chrono::naive::NaiveDateTime;
use chrono::Duration;
use chrono::Utc;
use tokio::sync::Mutex;
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
use super::Result;
use super::Storage;
use super::UpdateTripValues;

/// An in-memory storage
#[derive(Clone, Debug)]
pub struct Memory {
    /// All tables behind a single lock
    state: Arc<Mutex<State>>,
}

#[derive(Debug, Default)]
struct State {
    last_id: i64,
    users: HashMap<i64, User>,
    sessions: HashMap<Uuid, Session>,
    trips: HashMap<i64, Trip>,
    destinations: HashMap<i64, TripDestination>,
    activities: HashMap<i64, Activity>,
    accommodations: HashMap<i64, Accommodation>,
}

impl State {
    /// Hand out row ids the way a sequence would
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn destination_name(&self, destination_id: Option<i64>) -> Option<String> {
        destination_id
            .and_then(|id| self.destinations.get(&id))
            .map(|destination| destination.destination_name.clone())
    }
}

impl Memory {
    /// Create a new empty Memory storage
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
        }
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Compare two optional sort keys, missing values sort after present ones
fn nulls_last<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[async_trait]
impl Storage for Memory {
    async fn find_single_user_by_id(&self, id: i64) -> Result<Option<User>> {
        Ok(self.state.lock().await.users.get(&id).cloned())
    }

    async fn find_single_user_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .state
            .lock()
            .await
            .users
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn find_single_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .state
            .lock()
            .await
            .users
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn create_user(&self, values: &CreateUserValues) -> Result<User> {
        let mut state = self.state.lock().await;

        let user = User {
            id: state.next_id(),
            username: values.username.to_string(),
            email: values.email.to_string(),
            password_hash: values.password_hash.to_string(),
            first_name: values.first_name.map(ToString::to_string),
            last_name: values.last_name.map(ToString::to_string),
            created_at: now(),
        };

        state.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn create_session(&self, user_id: i64) -> Result<Session> {
        let created_at = now();
        let session = Session {
            token: Uuid::new_v4(),
            user_id,
            created_at,
            expires_at: created_at + Duration::hours(SESSION_LIFETIME_HOURS),
        };

        self.state
            .lock()
            .await
            .sessions
            .insert(session.token, session.clone());

        Ok(session)
    }

    async fn find_session(&self, token: &Uuid) -> Result<Option<Session>> {
        Ok(self
            .state
            .lock()
            .await
            .sessions
            .get(token)
            .filter(|session| session.expires_at > now())
            .cloned())
    }

    async fn delete_session(&self, token: &Uuid) -> Result<()> {
        self.state.lock().await.sessions.remove(token);

        Ok(())
    }

    #[allow(clippy::cast_possible_wrap)]
    async fn find_all_trips_by_user(&self, user_id: i64) -> Result<Vec<TripSummary>> {
        let state = self.state.lock().await;

        let mut trips = state
            .trips
            .values()
            .filter(|trip| trip.user_id == user_id)
            .cloned()
            .collect::<Vec<Trip>>();

        trips.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        Ok(trips
            .into_iter()
            .map(|trip| {
                let destination_count = state
                    .destinations
                    .values()
                    .filter(|destination| destination.trip_id == trip.id)
                    .count() as i64;

                TripSummary {
                    trip,
                    destination_count,
                }
            })
            .collect())
    }

    async fn find_single_trip(&self, user_id: i64, trip_id: i64) -> Result<Option<Trip>> {
        Ok(self
            .state
            .lock()
            .await
            .trips
            .get(&trip_id)
            .filter(|trip| trip.user_id == user_id)
            .cloned())
    }

    async fn create_trip(&self, values: &CreateTripValues) -> Result<Trip> {
        let mut state = self.state.lock().await;

        let trip = Trip {
            id: state.next_id(),
            user_id: values.user_id,
            title: values.title.to_string(),
            description: Some(values.description.to_string()),
            start_date: values.start_date,
            end_date: values.end_date,
            travelers_count: values.travelers_count,
            created_at: now(),
        };

        state.trips.insert(trip.id, trip.clone());

        Ok(trip)
    }

    async fn update_trip(
        &self,
        user_id: i64,
        trip_id: i64,
        values: &UpdateTripValues,
    ) -> Result<bool> {
        let mut state = self.state.lock().await;

        let Some(trip) = state
            .trips
            .get_mut(&trip_id)
            .filter(|trip| trip.user_id == user_id)
        else {
            return Ok(false);
        };

        if let Some(title) = values.title {
            trip.title = title.to_string();
        }

        if let Some(description) = values.description {
            trip.description = description.map(ToString::to_string);
        }

        if let Some(start_date) = values.start_date {
            trip.start_date = start_date;
        }

        if let Some(end_date) = values.end_date {
            trip.end_date = end_date;
        }

        if let Some(travelers_count) = values.travelers_count {
            trip.travelers_count = travelers_count;
        }

        Ok(true)
    }

    async fn delete_trip(&self, user_id: i64, trip_id: i64) -> Result<bool> {
        let mut state = self.state.lock().await;

        let owned = state
            .trips
            .get(&trip_id)
            .is_some_and(|trip| trip.user_id == user_id);

        if !owned {
            return Ok(false);
        }

        state.trips.remove(&trip_id);

        // cascade like the foreign keys would
        state
            .destinations
            .retain(|_, destination| destination.trip_id != trip_id);
        state
            .activities
            .retain(|_, activity| activity.trip_id != trip_id);
        state
            .accommodations
            .retain(|_, accommodation| accommodation.trip_id != trip_id);

        Ok(true)
    }

    async fn find_all_destinations_by_trip(&self, trip_id: i64) -> Result<Vec<TripDestination>> {
        let mut destinations = self
            .state
            .lock()
            .await
            .destinations
            .values()
            .filter(|destination| destination.trip_id == trip_id)
            .cloned()
            .collect::<Vec<TripDestination>>();

        destinations.sort_by(|a, b| {
            nulls_last(a.arrival_date, b.arrival_date).then_with(|| a.id.cmp(&b.id))
        });

        Ok(destinations)
    }

    async fn find_single_destination(
        &self,
        trip_id: i64,
        destination_id: i64,
    ) -> Result<Option<TripDestination>> {
        Ok(self
            .state
            .lock()
            .await
            .destinations
            .get(&destination_id)
            .filter(|destination| destination.trip_id == trip_id)
            .cloned())
    }

    async fn create_destination(
        &self,
        trip_id: i64,
        values: &CreateDestinationValues,
    ) -> Result<TripDestination> {
        let mut state = self.state.lock().await;

        let destination = TripDestination {
            id: state.next_id(),
            trip_id,
            destination_name: values.destination_name.to_string(),
            country: values.country.map(ToString::to_string),
            arrival_date: values.arrival_date,
            departure_date: values.departure_date,
            notes: values.notes.map(ToString::to_string),
        };

        state.destinations.insert(destination.id, destination.clone());

        Ok(destination)
    }

    async fn delete_destination(&self, trip_id: i64, destination_id: i64) -> Result<bool> {
        let mut state = self.state.lock().await;

        let found = state
            .destinations
            .get(&destination_id)
            .is_some_and(|destination| destination.trip_id == trip_id);

        if !found {
            return Ok(false);
        }

        state.destinations.remove(&destination_id);

        // set-null like the foreign keys would, referencing rows survive
        for activity in state.activities.values_mut() {
            if activity.destination_id == Some(destination_id) {
                activity.destination_id = None;
            }
        }

        for accommodation in state.accommodations.values_mut() {
            if accommodation.destination_id == Some(destination_id) {
                accommodation.destination_id = None;
            }
        }

        Ok(true)
    }

    async fn find_all_activities_by_trip(&self, trip_id: i64) -> Result<Vec<ActivityDetail>> {
        let state = self.state.lock().await;

        let mut activities = state
            .activities
            .values()
            .filter(|activity| activity.trip_id == trip_id)
            .map(|activity| ActivityDetail {
                destination_name: state.destination_name(activity.destination_id),
                activity: activity.clone(),
            })
            .collect::<Vec<ActivityDetail>>();

        activities.sort_by(|a, b| {
            nulls_last(a.activity.activity_date, b.activity.activity_date)
                .then_with(|| nulls_last(a.activity.activity_time, b.activity.activity_time))
                .then_with(|| a.activity.id.cmp(&b.activity.id))
        });

        Ok(activities)
    }

    async fn create_activity(
        &self,
        trip_id: i64,
        values: &CreateActivityValues,
    ) -> Result<Activity> {
        let mut state = self.state.lock().await;

        let activity = Activity {
            id: state.next_id(),
            trip_id,
            destination_id: values.destination_id,
            activity_name: values.activity_name.to_string(),
            activity_date: values.activity_date,
            activity_time: values.activity_time,
            notes: values.notes.map(ToString::to_string),
        };

        state.activities.insert(activity.id, activity.clone());

        Ok(activity)
    }

    async fn delete_activity(&self, trip_id: i64, activity_id: i64) -> Result<bool> {
        let mut state = self.state.lock().await;

        let found = state
            .activities
            .get(&activity_id)
            .is_some_and(|activity| activity.trip_id == trip_id);

        if found {
            state.activities.remove(&activity_id);
        }

        Ok(found)
    }

    async fn find_all_accommodations_by_trip(
        &self,
        trip_id: i64,
    ) -> Result<Vec<AccommodationDetail>> {
        let state = self.state.lock().await;

        let mut accommodations = state
            .accommodations
            .values()
            .filter(|accommodation| accommodation.trip_id == trip_id)
            .map(|accommodation| AccommodationDetail {
                destination_name: state.destination_name(accommodation.destination_id),
                accommodation: accommodation.clone(),
            })
            .collect::<Vec<AccommodationDetail>>();

        accommodations.sort_by(|a, b| {
            nulls_last(a.accommodation.check_in, b.accommodation.check_in)
                .then_with(|| a.accommodation.id.cmp(&b.accommodation.id))
        });

        Ok(accommodations)
    }

    async fn create_accommodation(
        &self,
        trip_id: i64,
        values: &CreateAccommodationValues,
    ) -> Result<Accommodation> {
        let mut state = self.state.lock().await;

        let accommodation = Accommodation {
            id: state.next_id(),
            trip_id,
            destination_id: values.destination_id,
            accommodation_name: values.accommodation_name.to_string(),
            check_in: values.check_in,
            check_out: values.check_out,
            address: values.address.map(ToString::to_string),
            confirmation_number: values.confirmation_number.map(ToString::to_string),
            notes: values.notes.map(ToString::to_string),
        };

        state
            .accommodations
            .insert(accommodation.id, accommodation.clone());

        Ok(accommodation)
    }

    async fn delete_accommodation(&self, trip_id: i64, accommodation_id: i64) -> Result<bool> {
        let mut state = self.state.lock().await;

        let found = state
            .accommodations
            .get(&accommodation_id)
            .is_some_and(|accommodation| accommodation.trip_id == trip_id);

        if found {
            state.accommodations.remove(&accommodation_id);
        }

        Ok(found)
    }

    #[allow(clippy::cast_possible_wrap)]
    async fn user_stats(&self, user_id: i64) -> Result<TripStats> {
        let state = self.state.lock().await;
        let today = Utc::now().date_naive();

        let trips = state
            .trips
            .values()
            .filter(|trip| trip.user_id == user_id)
            .collect::<Vec<&Trip>>();

        let total_trips = trips.len() as i64;

        let upcoming_trips = trips
            .iter()
            .filter(|trip| trip.start_date.is_some_and(|start| start > today))
            .count() as i64;

        let unique_destinations = state
            .destinations
            .values()
            .filter(|destination| {
                trips.iter().any(|trip| trip.id == destination.trip_id)
            })
            .map(|destination| destination.destination_name.as_str())
            .collect::<HashSet<&str>>()
            .len() as i64;

        let days_traveling = trips
            .iter()
            .filter_map(|trip| {
                trip.start_date.map(|start| {
                    let end = trip.end_date.unwrap_or(start);
                    (end - start).num_days() + 1
                })
            })
            .sum();

        Ok(TripStats {
            total_trips,
            upcoming_trips,
            unique_destinations,
            days_traveling,
        })
    }
}
