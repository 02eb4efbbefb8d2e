pub mod altitude;
pub mod cruise;
pub mod guidance;
pub mod interfaces;
pub mod modes;
pub mod pid;
pub mod turn;

pub use altitude::{AltitudeCommand, AltitudeRegime, VerticalRegulator};
pub use cruise::{CruiseController, GuidanceCommand};
pub use interfaces::{AttitudeGuidance, Notice, NoticeLog, NoticeSink, ThrustControl};
pub use modes::{CruiseMode, ForcedTransition, HeightMode};
pub use pid::{Pid, PidGains};
pub use turn::limit_wide_turn;
