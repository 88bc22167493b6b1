use std::time::Duration;

use wmchunk_core::{ChunkSequencer, PhaseType, TrialSpec, TrialSpecError};
use wmchunk_timing::secs;

/// A validated trial, ready to run.
#[derive(Debug, Clone)]
pub struct Trial {
    pub id: usize,
    pub spec: TrialSpec,
    /// Symbols the subject must reproduce, in presentation order.
    pub expected: Vec<String>,
    /// Reveal schedule; present on encoding trials only.
    pub chunks: Option<ChunkSequencer>,
    pub durations: TrialDurations,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialDurations {
    pub item: Duration,
    pub iti: Duration,
    pub feedback: Duration,
}

impl TrialDurations {
    fn from_spec(spec: &TrialSpec, row: usize) -> Result<Self, TrialSpecError> {
        let field = |field: &'static str, value: f64| {
            secs(value).ok_or(TrialSpecError::InvalidDuration { row, field, value })
        };
        Ok(Self {
            item: field("item_dur", spec.item_dur)?,
            iti: field("iti_dur", spec.iti_dur)?,
            feedback: field("feedback_dur", spec.feedback_dur)?,
        })
    }
}

/// The ordered trials of a run, checked as a whole before anything runs.
#[derive(Debug, Clone)]
pub struct TrialPlan {
    trials: Vec<Trial>,
}

impl TrialPlan {
    /// Validates every row and pairs masked retrieval rows with the encoding
    /// row before them. Any malformed row rejects the whole plan.
    pub fn new(specs: Vec<TrialSpec>, mask: char) -> Result<Self, TrialSpecError> {
        if specs.is_empty() {
            return Err(TrialSpecError::EmptyPlan);
        }

        let mut trials = Vec::with_capacity(specs.len());
        let mut last_encoding: Option<Vec<String>> = None;

        for (row, spec) in specs.into_iter().enumerate() {
            spec.validate(row)?;
            let durations = TrialDurations::from_spec(&spec, row)?;
            let symbols: Vec<String> = spec.symbols().into_iter().map(str::to_owned).collect();

            let (expected, chunks) = match spec.phase_type {
                PhaseType::Encoding => {
                    let chunks = ChunkSequencer::new(&symbols, spec.chunk_size, mask)
                        .map_err(|_| TrialSpecError::ZeroChunkSize { row })?;
                    last_encoding = Some(symbols.clone());
                    (symbols, Some(chunks))
                }
                PhaseType::Retrieval => {
                    if let Some(encoding) = &last_encoding {
                        if encoding.len() != symbols.len() {
                            return Err(TrialSpecError::PairLengthMismatch {
                                row,
                                encoding: encoding.len(),
                                retrieval: symbols.len(),
                            });
                        }
                    }
                    let expected = if spec.is_fully_masked(mask) {
                        last_encoding
                            .clone()
                            .ok_or(TrialSpecError::UnpairedRetrieval { row })?
                    } else {
                        symbols
                    };
                    (expected, None)
                }
            };

            trials.push(Trial {
                id: row,
                spec,
                expected,
                chunks,
                durations,
            });
        }

        Ok(Self { trials })
    }

    pub fn trials(&self) -> &[Trial] {
        &self.trials
    }

    pub fn len(&self) -> usize {
        self.trials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }

    /// Lower bound on run length: all timed waits, excluding response time.
    pub fn minimum_duration(&self) -> Duration {
        self.trials
            .iter()
            .map(|t| {
                let reveal = t.chunks.as_ref().map_or(0, ChunkSequencer::len) as u32;
                let feedback = if t.spec.display_feedback {
                    t.durations.feedback
                } else {
                    Duration::ZERO
                };
                t.durations.item * reveal + feedback + t.durations.iti
            })
            .sum()
    }
}
