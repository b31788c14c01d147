//! Turning raw directory records into ranked, located restrooms.

mod rank;
mod resolve;

pub use rank::{nearby, RankedRestroom, DEFAULT_NEARBY_LIMIT};
pub use resolve::{resolve_coordinate, resolve_many, RESOLVE_CONCURRENCY};
