pub mod phase_timer;
pub mod timer;

pub use phase_timer::{secs, Deadline, PhaseTimer};
pub use timer::{HighPrecisionTimer, ManualTimer, Timer};
