//! Core domain types.
//!
//! Value types are valid by construction: a `Coordinate` is always a finite
//! point on the globe, a `RatingScore` is always in 1..=5. Parsing happens
//! once at the boundary; the rest of the crate never re-validates.

mod coordinate;
mod edit_request;
mod rating;
mod toilet;
mod user;

pub use coordinate::{Coordinate, InvalidCoordinate, distance_km};
pub use edit_request::{EditRequest, EditStatus};
pub use rating::{InvalidScore, Rating, RatingScore};
pub use toilet::{ApprovalStatus, RestroomSummary, Toilet, ToiletSource};
pub use user::{Role, User};
