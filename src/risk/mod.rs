//! Risk management module
//!
//! Admission control (the kill switch), its state, and the fixed limits it
//! enforces.

pub mod clock;
pub mod limits;
mod kill_switch;
mod state;
mod status;
mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use kill_switch::KillSwitch;
pub use state::{hourly_window_key, RiskState};
pub use status::RiskStatus;
pub use types::{Decision, DenyReason, HardStopReason, RiskError, SoftStop};
