//! Public restroom finder server.
//!
//! A location-based service that answers: "where is the nearest usable
//! restroom?" It merges Seoul's open subway-restroom dataset with
//! user-submitted records, ranks everything by distance, and exposes the
//! result over a JSON API with accounts, ratings, and edit requests.

pub mod auth;
pub mod domain;
pub mod geocode;
pub mod pipeline;
pub mod seoul;
pub mod stations;
pub mod store;
pub mod sync;
pub mod web;
