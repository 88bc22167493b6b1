use std::time::Duration;

use serde::{Deserialize, Serialize};
use wmchunk_timing::secs;

use crate::error::TrialSpecError;
use crate::phase::{PhaseResult, PhaseType, RecallDir};

/// One row of a trial file. Durations are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialSpec {
    pub run_number: u32,
    pub phase_type: PhaseType,
    pub seq_str: String,
    pub chunk_size: usize,
    pub recall_dir: RecallDir,
    pub item_dur: f64,
    pub iti_dur: f64,
    pub feedback_dur: f64,
    pub trial_dur: Option<f64>,
    pub display_feedback: bool,
    pub seq_length: Option<usize>,
}

impl TrialSpec {
    /// An encoding row with the task's usual timing: 2 s per chunk, 1 s ITI,
    /// no feedback.
    pub fn encoding(run_number: u32, seq_str: &str, chunk_size: usize, recall_dir: RecallDir) -> Self {
        let item_dur = 2.0;
        Self {
            run_number,
            phase_type: PhaseType::Encoding,
            seq_str: seq_str.to_owned(),
            chunk_size,
            recall_dir,
            item_dur,
            iti_dur: 1.0,
            feedback_dur: 0.0,
            trial_dur: Some(chunk_size as f64 * item_dur),
            display_feedback: false,
            seq_length: Some(seq_str.split_whitespace().count()),
        }
    }

    /// The retrieval row paired with `encoding`, showing `seq_str` and giving
    /// 0.5 s of feedback.
    pub fn retrieval_for(encoding: &TrialSpec, seq_str: &str) -> Self {
        Self {
            phase_type: PhaseType::Retrieval,
            seq_str: seq_str.to_owned(),
            trial_dur: None,
            feedback_dur: 0.5,
            display_feedback: true,
            seq_length: Some(seq_str.split_whitespace().count()),
            ..encoding.clone()
        }
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.seq_str.split_whitespace().collect()
    }

    pub fn len(&self) -> usize {
        self.seq_str.split_whitespace().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_fully_masked(&self, mask: char) -> bool {
        let symbols = self.symbols();
        !symbols.is_empty() && symbols.iter().all(|s| s.chars().eq([mask]))
    }

    /// Checks the row on its own; `row` is used in error messages only.
    pub fn validate(&self, row: usize) -> Result<(), TrialSpecError> {
        let symbols = self.symbols();
        if symbols.is_empty() {
            return Err(TrialSpecError::EmptySequence { row });
        }
        if let Some(symbol) = symbols.iter().find(|s| s.chars().count() != 1) {
            return Err(TrialSpecError::MultiCharSymbol {
                row,
                symbol: symbol.to_string(),
            });
        }
        if self.chunk_size == 0 {
            return Err(TrialSpecError::ZeroChunkSize { row });
        }
        match self.seq_length {
            Some(declared) if declared != symbols.len() => {
                return Err(TrialSpecError::LengthMismatch {
                    row,
                    declared,
                    actual: symbols.len(),
                });
            }
            _ => {}
        }

        let durations = [
            ("item_dur", Some(self.item_dur)),
            ("iti_dur", Some(self.iti_dur)),
            ("feedback_dur", Some(self.feedback_dur)),
            ("trial_dur", self.trial_dur),
        ];
        for (field, value) in durations {
            match value {
                Some(value) if secs(value).is_none() => {
                    return Err(TrialSpecError::InvalidDuration { row, field, value });
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Mutable bookkeeping for the trial being run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrialRuntimeState {
    pub trial_index: usize,
    pub responses: Vec<String>,
    pub response_times: Vec<Duration>,
    pub correct_count: usize,
    pub is_error: bool,
    pub points: u32,
}

impl TrialRuntimeState {
    pub fn new(trial_index: usize) -> Self {
        Self {
            trial_index,
            ..Self::default()
        }
    }

    pub fn push_response(&mut self, key: String, at: Duration) {
        self.responses.push(key);
        self.response_times.push(at);
    }

    /// Seconds from first to last response. NaN when there are none.
    pub fn movement_time(&self) -> f64 {
        match (self.response_times.first(), self.response_times.last()) {
            (Some(first), Some(last)) => last.saturating_sub(*first).as_secs_f64(),
            _ => f64::NAN,
        }
    }
}

/// Outcome of one executed trial as written to the results file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub trial_index: usize,
    pub spec: TrialSpec,
    pub responses: Vec<String>,
    pub response_times: Vec<f64>,
    pub movement_time: f64,
    pub is_error: bool,
    pub correct_count: usize,
    pub points: u32,
    /// The response window closed before the sequence was complete.
    #[serde(default)]
    pub timed_out: bool,
    /// Collection was stopped by the operator; such trials are not scored.
    #[serde(default)]
    pub interrupted: bool,
    #[serde(default)]
    pub overflow: usize,
}

impl ResponseRecord {
    pub fn new(spec: &TrialSpec, state: TrialRuntimeState, result: &PhaseResult) -> Self {
        Self {
            trial_index: state.trial_index,
            spec: spec.clone(),
            response_times: state
                .response_times
                .iter()
                .map(Duration::as_secs_f64)
                .collect(),
            responses: state.responses,
            movement_time: result.movement_time(),
            is_error: state.is_error,
            correct_count: state.correct_count,
            points: state.points,
            timed_out: result.timed_out(),
            interrupted: result.interrupted(),
            overflow: result.overflow(),
        }
    }

    /// Whether the trial counts towards the run summary.
    pub fn is_scored(&self) -> bool {
        !self.interrupted
    }
}

/// Append-only log of the records produced by a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultLog {
    records: Vec<ResponseRecord>,
}

impl ResultLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ResponseRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[ResponseRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<ResponseRecord> {
        self.records
    }
}

impl From<Vec<ResponseRecord>> for ResultLog {
    fn from(records: Vec<ResponseRecord>) -> Self {
        Self { records }
    }
}
