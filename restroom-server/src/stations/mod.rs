//! Subway station directory and nearest-station lookup.
//!
//! The directory is an immutable table built once at startup and passed by
//! handle to everything that needs it. Tests construct their own small
//! tables; production uses [`seoul_stations`].

mod directory;
mod seoul;

pub use directory::{NearestStation, Station, StationDirectory};
pub use seoul::seoul_stations;
