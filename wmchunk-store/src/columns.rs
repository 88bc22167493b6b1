use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use wmchunk_core::{PhaseType, RecallDir, TrialSpec, TrialSpecError};

/// The trial-definition columns shared by target and result files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct SpecColumns {
    pub run_number: u32,
    pub phase_type: u8,
    pub seq_str: String,
    pub chunk: usize,
    pub recall_dir: u8,
    pub item_dur: f64,
    pub iti_dur: f64,
    pub feedback_dur: f64,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub trial_dur: Option<f64>,
    #[serde(deserialize_with = "flexible_bool")]
    pub display_trial_feedback: bool,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub seq_length: Option<usize>,
}

impl SpecColumns {
    pub fn into_spec(self, row: usize) -> Result<TrialSpec, TrialSpecError> {
        let spec = TrialSpec {
            run_number: self.run_number,
            phase_type: PhaseType::try_from(self.phase_type)?,
            seq_str: self.seq_str,
            chunk_size: self.chunk,
            recall_dir: RecallDir::try_from(self.recall_dir)?,
            item_dur: self.item_dur,
            iti_dur: self.iti_dur,
            feedback_dur: self.feedback_dur,
            trial_dur: self.trial_dur.filter(|d| !d.is_nan()),
            display_feedback: self.display_trial_feedback,
            seq_length: self.seq_length,
        };
        spec.validate(row)?;
        Ok(spec)
    }
}

impl From<&TrialSpec> for SpecColumns {
    fn from(spec: &TrialSpec) -> Self {
        Self {
            run_number: spec.run_number,
            phase_type: spec.phase_type.into(),
            seq_str: spec.seq_str.clone(),
            chunk: spec.chunk_size,
            recall_dir: spec.recall_dir.into(),
            item_dur: spec.item_dur,
            iti_dur: spec.iti_dur,
            feedback_dur: spec.feedback_dur,
            trial_dur: spec.trial_dur,
            display_trial_feedback: spec.display_feedback,
            seq_length: spec.seq_length,
        }
    }
}

/// Accepts `true`/`false` in any case as well as `1`/`0`.
pub(crate) fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "1.0" => Ok(true),
        "false" | "0" | "0.0" => Ok(false),
        other => Err(de::Error::custom(format!("invalid boolean {other:?}"))),
    }
}
