pub mod config;
pub mod design;
pub mod encoding;
pub mod retrieval;
pub mod score;
mod screen;
pub mod state;
pub mod trial;

pub use config::{ConfigError, ExperimentConfig, Layout};
pub use design::TargetDesign;
pub use encoding::EncodingPresenter;
pub use retrieval::RetrievalRecorder;
pub use score::{RunSummary, ScoringRules};
pub use screen::show_scoreboard;
pub use state::{RunOutcome, TrialScheduler};
pub use trial::{Trial, TrialDurations, TrialPlan};
