pub mod config;
pub mod dynamics;
pub mod error;
pub mod geo;
pub mod gnc;
pub mod io;
pub mod sim;

pub use config::CruiseConfig;
pub use dynamics::{Body, TickSnapshot};
pub use error::{ConfigError, TransitionRefused};
pub use geo::Waypoint;
pub use gnc::{CruiseController, CruiseMode, GuidanceCommand, HeightMode};
