pub mod auth;
pub mod config;
pub mod error;
pub mod google_calendar;
pub mod shutdown;
pub mod startup;
pub mod web;
