//! vitals — fetches personal body metrics (weight, BMI, body fat) from a
//! fitness-tracking API via OAuth2, normalizes them into a local CSV, and
//! serves an interactive dashboard.

pub mod auth;
pub mod clean;
pub mod cli;
pub mod config;
pub mod fetch;
pub mod runlog;
pub mod table;
pub mod utils;
pub mod web;
