//! Trial points and the end-of-run scoreboard.

use std::fmt;

use serde::{Deserialize, Serialize};
use wmchunk_core::{ResponseRecord, TrialRuntimeState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringRules {
    /// Points awarded for a trial with every position correct, replacing the
    /// one-point-per-digit tally.
    pub perfect_trial_points: u32,
    /// Mean movement time (seconds) at or under which the run total is
    /// multiplied.
    pub bonus_mt_threshold: f64,
    pub bonus_multiplier: u32,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            perfect_trial_points: 10,
            bonus_mt_threshold: 8.0,
            bonus_multiplier: 2,
        }
    }
}

impl ScoringRules {
    /// Applies the perfect-trial override once responses are complete.
    pub fn finalize_trial(&self, state: &mut TrialRuntimeState, seq_length: usize) {
        if seq_length > 0 && state.correct_count == seq_length {
            state.points = self.perfect_trial_points;
        }
    }

    /// Interrupted trials are left out; every other trial counts, with an
    /// unanswered or timed-out retrieval counted as an error.
    pub fn summarize(&self, records: &[ResponseRecord]) -> RunSummary {
        let records: Vec<&ResponseRecord> = records.iter().filter(|r| r.is_scored()).collect();
        let trials = records.len();
        let errors = records.iter().filter(|r| r.is_error).count();
        let raw_points: u64 = records.iter().map(|r| u64::from(r.points)).sum();

        let percent_correct = if trials == 0 {
            0.0
        } else {
            (1.0 - errors as f64 / trials as f64) * 100.0
        };

        let movement_times: Vec<f64> = records
            .iter()
            .map(|r| r.movement_time)
            .filter(|mt| !mt.is_nan())
            .collect();
        let mean_movement_time = if movement_times.is_empty() {
            f64::NAN
        } else {
            movement_times.iter().sum::<f64>() / movement_times.len() as f64
        };

        // NaN never satisfies the comparison, so a run without timings earns no bonus
        let bonus_applied = mean_movement_time <= self.bonus_mt_threshold;
        let total_points = if bonus_applied {
            raw_points * u64::from(self.bonus_multiplier)
        } else {
            raw_points
        };

        RunSummary {
            trials,
            errors,
            percent_correct,
            mean_movement_time,
            raw_points,
            total_points,
            bonus_applied,
        }
    }

    /// Summary over the records of one run in a file that may hold several.
    pub fn summarize_run(&self, records: &[ResponseRecord], run_number: u32) -> RunSummary {
        let run: Vec<ResponseRecord> = records
            .iter()
            .filter(|r| r.spec.run_number == run_number)
            .cloned()
            .collect();
        self.summarize(&run)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub trials: usize,
    pub errors: usize,
    pub percent_correct: f64,
    pub mean_movement_time: f64,
    pub raw_points: u64,
    pub total_points: u64,
    pub bonus_applied: bool,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Total points: {}\n\n% correct {:.2}\n\nMT {:.2}",
            self.total_points, self.percent_correct, self.mean_movement_time
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wmchunk_core::{RecallDir, TrialSpec};

    fn record(run: u32, is_error: bool, points: u32, mt: f64) -> ResponseRecord {
        let enc = TrialSpec::encoding(run, "1 2 3 4", 2, RecallDir::Forward);
        ResponseRecord {
            trial_index: 0,
            spec: TrialSpec::retrieval_for(&enc, "# # # #"),
            responses: vec![],
            response_times: vec![],
            movement_time: mt,
            is_error,
            correct_count: 0,
            points,
            timed_out: false,
            interrupted: false,
            overflow: 0,
        }
    }

    #[test]
    fn perfect_trial_overrides_points() {
        let rules = ScoringRules::default();
        let mut state = TrialRuntimeState::new(0);
        state.correct_count = 4;
        state.points = 4;
        rules.finalize_trial(&mut state, 4);
        assert_eq!(state.points, 10);
    }

    #[test]
    fn imperfect_trial_keeps_tally() {
        let rules = ScoringRules::default();
        let mut state = TrialRuntimeState::new(0);
        state.correct_count = 5;
        state.points = 5;
        state.is_error = true;
        rules.finalize_trial(&mut state, 6);
        assert_eq!(state.points, 5);
    }

    #[test]
    fn two_errors_in_ten_trials_is_eighty_percent() {
        let records: Vec<_> = (0..10).map(|i| record(1, i < 2, 1, 1.0)).collect();
        let summary = ScoringRules::default().summarize(&records);
        assert!((summary.percent_correct - 80.0).abs() < 1e-9);
        assert_eq!(summary.errors, 2);
    }

    #[test]
    fn bonus_depends_on_mean_movement_time() {
        let rules = ScoringRules::default();

        let fast = [record(1, false, 10, 7.0), record(1, false, 5, 8.0)];
        let summary = rules.summarize(&fast);
        assert_eq!(summary.mean_movement_time, 7.5);
        assert!(summary.bonus_applied);
        assert_eq!(summary.total_points, 30);

        let slow = [record(1, false, 10, 8.0), record(1, false, 5, 9.0)];
        let summary = rules.summarize(&slow);
        assert_eq!(summary.mean_movement_time, 8.5);
        assert!(!summary.bonus_applied);
        assert_eq!(summary.total_points, 15);
    }

    #[test]
    fn nan_movement_times_are_skipped() {
        let records = [record(1, true, 0, f64::NAN), record(1, false, 3, 4.0)];
        let summary = ScoringRules::default().summarize(&records);
        assert_eq!(summary.mean_movement_time, 4.0);
        assert_eq!(summary.total_points, 6);
    }

    #[test]
    fn interrupted_trials_are_not_scored() {
        let mut stopped = record(1, true, 1, 0.0);
        stopped.interrupted = true;
        let records = [record(1, false, 10, 2.0), stopped];

        let summary = ScoringRules::default().summarize(&records);
        assert_eq!(summary.trials, 1);
        assert_eq!(summary.errors, 0);
        assert_eq!(summary.percent_correct, 100.0);
        assert_eq!(summary.mean_movement_time, 2.0);
        assert_eq!(summary.total_points, 20);
    }

    #[test]
    fn empty_run_has_no_bonus() {
        let summary = ScoringRules::default().summarize(&[]);
        assert_eq!(summary.trials, 0);
        assert!(summary.mean_movement_time.is_nan());
        assert!(!summary.bonus_applied);
        assert_eq!(summary.total_points, 0);
    }

    #[test]
    fn summarize_run_filters_by_run_number() {
        let records = [
            record(1, true, 2, 3.0),
            record(2, false, 10, 3.0),
            record(2, false, 10, 5.0),
        ];
        let summary = ScoringRules::default().summarize_run(&records, 2);
        assert_eq!(summary.trials, 2);
        assert_eq!(summary.total_points, 40);
        assert_eq!(
            summary.to_string(),
            "Total points: 40\n\n% correct 100.00\n\nMT 4.00"
        );
    }
}
