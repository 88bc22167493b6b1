pub mod chunk;
pub mod error;
pub mod input;
pub mod phase;
pub mod stimulus;
pub mod testing;
pub mod trial;

pub use chunk::{ChunkSequencer, DEFAULT_MASK};
pub use error::{ChunkError, DisplayError, TrialSpecError};
pub use input::{InputSource, KeyPress};
pub use phase::{PhaseResult, PhaseType, RecallDir, TrialStage};
pub use stimulus::{Align, Color, Display, Position, Stimulus};
pub use trial::{ResponseRecord, ResultLog, TrialRuntimeState, TrialSpec};
