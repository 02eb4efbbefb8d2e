pub mod body;
pub mod snapshot;

pub use body::{Body, EARTH_RADIUS, G0};
pub use snapshot::TickSnapshot;
