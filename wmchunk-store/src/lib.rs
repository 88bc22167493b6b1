//! CSV persistence for target files and subject result files.

mod columns;
pub mod error;
pub mod results;
pub mod targets;

pub use error::StoreError;
pub use results::{append_results, load_results, read_results, write_results};
pub use targets::{load_trial_specs, read_trial_specs, write_trial_specs};
