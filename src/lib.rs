//! FlightScout - weekend flight search client.
//!
//! Submits searches to the FlightScout backend, polls them to completion
//! and turns the raw deal stream into grouped, classified views.

pub mod api;
pub mod config;
pub mod engine;
pub mod job;
pub mod model;
pub mod store;
