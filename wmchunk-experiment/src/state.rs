use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info};
use wmchunk_core::{
    Color, Display, InputSource, PhaseResult, ResponseRecord, ResultLog, TrialRuntimeState,
    TrialStage,
};
use wmchunk_timing::{PhaseTimer, Timer};

use super::config::ExperimentConfig;
use super::encoding::EncodingPresenter;
use super::retrieval::RetrievalRecorder;
use super::screen::show;
use super::trial::{Trial, TrialPlan};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    pub completed: usize,
    pub aborted: bool,
}

/// Runs a validated plan trial by trial and collects a record per trial.
pub struct TrialScheduler<T, D, I>
where
    T: Timer,
    D: Display,
    I: InputSource,
{
    pub timer: T,
    pub display: D,
    pub input: I,
    pub config: ExperimentConfig,
    plan: TrialPlan,
    results: ResultLog,
    abort: Option<Arc<AtomicBool>>,
    trial_number: usize,
}

impl<T, D, I> TrialScheduler<T, D, I>
where
    T: Timer,
    D: Display,
    I: InputSource,
{
    pub fn new(plan: TrialPlan, config: ExperimentConfig, timer: T, display: D, input: I) -> Self {
        Self {
            timer,
            display,
            input,
            config,
            plan,
            results: ResultLog::new(),
            abort: None,
            trial_number: 0,
        }
    }

    /// Flag checked between trials; once set the run stops before the next
    /// trial starts.
    pub fn with_abort_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.abort = Some(flag);
        self
    }

    /// Runs every remaining trial in order.
    pub fn run(&mut self) -> RunOutcome {
        info!(trials = self.plan.len(), "run started");
        while self.trial_number < self.plan.len() {
            if self.abort_requested() {
                info!(completed = self.trial_number, "run aborted between trials");
                return RunOutcome {
                    completed: self.trial_number,
                    aborted: true,
                };
            }
            self.run_next_trial();
        }
        info!(completed = self.trial_number, "run finished");
        RunOutcome {
            completed: self.trial_number,
            aborted: false,
        }
    }

    /// Runs a single trial and appends its record. Returns `None` once the
    /// plan is exhausted.
    pub fn run_next_trial(&mut self) -> Option<&ResponseRecord> {
        let Self {
            timer,
            display,
            input,
            config,
            plan,
            results,
            trial_number,
            ..
        } = self;
        let trial = plan.trials().get(*trial_number)?;

        timer.reset();
        let timer: &T = timer;
        let config: &ExperimentConfig = config;
        let mut state = TrialRuntimeState::new(trial.id);
        info!(
            trial = trial.id,
            phase = ?trial.spec.phase_type,
            seq = %trial.spec.seq_str,
            "trial started"
        );

        let mut stage = TrialStage::Setup;
        let mut result = PhaseResult::Encoding { chunks_shown: 0 };
        while let Some(next) = stage.next(&trial.spec) {
            stage = next;
            debug!(trial = trial.id, ?stage, at = ?timer.now(), "stage");
            match stage {
                TrialStage::Encoding => {
                    result =
                        EncodingPresenter::new(timer, display, config).run(trial, &mut state);
                    if let PhaseResult::Encoding { chunks_shown } = result {
                        debug!(trial = trial.id, chunks_shown, "encoding finished");
                    }
                }
                TrialStage::Retrieval => {
                    result = RetrievalRecorder::new(timer, display, input, config)
                        .run(trial, &mut state);
                }
                TrialStage::Feedback => show_feedback(timer, display, config, trial, &state),
                TrialStage::Iti => {
                    PhaseTimer::new(timer).wait(trial.durations.iti);
                }
                TrialStage::Setup | TrialStage::Complete => {}
            }
        }

        let record = ResponseRecord::new(&trial.spec, state, &result);
        info!(
            trial = record.trial_index,
            points = record.points,
            is_error = record.is_error,
            timed_out = record.timed_out,
            interrupted = record.interrupted,
            mt = record.movement_time,
            "trial complete"
        );
        results.push(record);
        *trial_number += 1;
        results.records().last()
    }

    fn abort_requested(&self) -> bool {
        self.abort
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    pub fn results(&self) -> &ResultLog {
        &self.results
    }

    pub fn into_results(self) -> ResultLog {
        self.results
    }

    pub fn trial_progress(&self) -> (usize, usize) {
        (self.trial_number, self.plan.len())
    }

    pub fn is_finished(&self) -> bool {
        self.trial_number >= self.plan.len()
    }
}

/// Shows the trial's points for `feedback_dur`.
fn show_feedback<T: Timer, D: Display>(
    timer: &T,
    display: &mut D,
    config: &ExperimentConfig,
    trial: &Trial,
    state: &TrialRuntimeState,
) {
    let layout = &config.layout;
    let text = format!("+{}", state.points);
    show(display, "feedback", |d| {
        layout.centered(d, &text, 0.0)?;
        layout.frame(d, Color::Green)?;
        layout.cue(d, trial.spec.recall_dir)
    });
    PhaseTimer::new(timer).wait(trial.durations.feedback);
}
