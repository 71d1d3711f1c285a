mod auth;
mod helper;
mod profile;
mod trip_detail;
