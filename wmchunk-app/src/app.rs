use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use anyhow::{Context, Result};
use tracing::{info, warn};
use wmchunk_core::ResponseRecord;
use wmchunk_experiment::{
    ExperimentConfig, RunOutcome, RunSummary, ScoringRules, TrialPlan, TrialScheduler,
    show_scoreboard,
};
use wmchunk_timing::HighPrecisionTimer;

use crate::terminal::{Keyboard, TerminalScreen};

/// A loaded, validated session ready to be shown to a subject.
pub struct App {
    config: ExperimentConfig,
    plan: TrialPlan,
    run_number: u32,
    results_path: PathBuf,
}

impl App {
    pub fn new(config: ExperimentConfig, target: &Path, results_path: PathBuf) -> Result<Self> {
        let specs = wmchunk_store::load_trial_specs(target)
            .with_context(|| format!("loading target file {}", target.display()))?;
        let run_number = specs.first().map_or(0, |s| s.run_number);
        let plan = TrialPlan::new(specs, config.mask_symbol)
            .with_context(|| format!("invalid target file {}", target.display()))?;

        info!(
            trials = plan.len(),
            run_number,
            minimum_secs = plan.minimum_duration().as_secs_f64(),
            "session loaded"
        );
        Ok(Self {
            config,
            plan,
            run_number,
            results_path,
        })
    }

    /// Runs every trial on the terminal, saves the results and shows the
    /// scoreboard until a key is pressed.
    pub fn run(self) -> Result<RunSummary> {
        let abort = Arc::new(AtomicBool::new(false));
        let screen = TerminalScreen::enter().context("failed to set up the terminal")?;
        let keyboard = Keyboard::new(Arc::clone(&abort));

        let mut scheduler = TrialScheduler::new(
            self.plan,
            self.config.clone(),
            HighPrecisionTimer::new(),
            screen,
            keyboard,
        )
        .with_abort_flag(abort);

        let RunOutcome { completed, aborted } = scheduler.run();
        if aborted {
            warn!(completed, "run stopped early; saving completed trials");
        }

        let summary = save_and_score(
            &self.results_path,
            &self.config.scoring,
            self.run_number,
            scheduler.results().records(),
        )?;
        show_scoreboard(&mut scheduler.display, &self.config.layout, &summary);
        if !aborted {
            scheduler.input.wait_for_key()?;
        }
        Ok(summary)
    }

    pub fn run_number(&self) -> u32 {
        self.run_number
    }

    pub fn trial_count(&self) -> usize {
        self.plan.len()
    }
}

/// Appends this session's records to the subject's file and scores the run
/// from everything the file now holds for it, so a run repeated into the
/// same file is scored as a whole.
fn save_and_score(
    path: &Path,
    scoring: &ScoringRules,
    run_number: u32,
    records: &[ResponseRecord],
) -> Result<RunSummary> {
    let stored = wmchunk_store::append_results(path, records)
        .with_context(|| format!("saving results to {}", path.display()))?;
    info!(path = %path.display(), stored = stored.len(), "results saved");
    Ok(scoring.summarize_run(&stored, run_number))
}
