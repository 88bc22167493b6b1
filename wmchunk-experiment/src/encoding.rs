//! Encoding phase: reveal the sequence chunk by chunk, masking each chunk once
//! its display time is up.

use tracing::debug;
use wmchunk_core::{Color, Display, PhaseResult, TrialRuntimeState};
use wmchunk_timing::{PhaseTimer, Timer};

use crate::config::ExperimentConfig;
use crate::screen::show;
use crate::trial::Trial;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingStep {
    Reveal(usize),
    Mask(usize),
}

impl EncodingStep {
    pub fn next(self, chunk_count: usize) -> Option<Self> {
        match self {
            Self::Reveal(i) => Some(Self::Mask(i)),
            Self::Mask(i) if i + 1 < chunk_count => Some(Self::Reveal(i + 1)),
            Self::Mask(_) => None,
        }
    }
}

pub struct EncodingPresenter<'a, T: Timer, D: Display> {
    timer: &'a T,
    display: &'a mut D,
    config: &'a ExperimentConfig,
}

impl<'a, T: Timer, D: Display> EncodingPresenter<'a, T, D> {
    pub fn new(timer: &'a T, display: &'a mut D, config: &'a ExperimentConfig) -> Self {
        Self {
            timer,
            display,
            config,
        }
    }

    /// Runs the reveal/mask cycle. Encoding never records responses, so
    /// `state` is left as created.
    pub fn run(&mut self, trial: &Trial, _state: &mut TrialRuntimeState) -> PhaseResult {
        let Some(chunks) = trial.chunks.as_ref() else {
            return PhaseResult::Encoding { chunks_shown: 0 };
        };
        let layout = &self.config.layout;
        let wait = PhaseTimer::new(self.timer);

        let mut shown = 0;
        let mut step = (!chunks.is_empty()).then_some(EncodingStep::Reveal(0));
        while let Some(current) = step {
            let text = match current {
                EncodingStep::Reveal(i) => chunks.reveal(i),
                EncodingStep::Mask(i) => chunks.masked(i),
            }
            .unwrap_or_default();

            show(self.display, "encoding", |d| {
                layout.frame(d, Color::Red)?;
                layout.sequence(d, &text)
            });
            debug!(trial = trial.id, step = ?current, %text, at = ?self.timer.now(), "encoding frame");

            if let EncodingStep::Reveal(_) = current {
                wait.wait(trial.durations.item);
                shown += 1;
            }
            step = current.next(chunks.len());
        }

        PhaseResult::Encoding {
            chunks_shown: shown,
        }
    }
}
