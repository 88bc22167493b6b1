//! Retrieval phase: collect key presses until the whole sequence has been
//! typed, colouring each recalled position green or red as it is scored.

use tracing::{debug, warn};
use wmchunk_core::{Color, Display, InputSource, KeyPress, PhaseResult, TrialRuntimeState};
use wmchunk_timing::{Deadline, Timer};

use crate::config::ExperimentConfig;
use crate::screen::show;
use crate::trial::Trial;

pub struct RetrievalRecorder<'a, T: Timer, D: Display, I: InputSource> {
    timer: &'a T,
    display: &'a mut D,
    input: &'a mut I,
    config: &'a ExperimentConfig,
}

impl<'a, T, D, I> RetrievalRecorder<'a, T, D, I>
where
    T: Timer,
    D: Display,
    I: InputSource,
{
    pub fn new(
        timer: &'a T,
        display: &'a mut D,
        input: &'a mut I,
        config: &'a ExperimentConfig,
    ) -> Self {
        Self {
            timer,
            display,
            input,
            config,
        }
    }

    pub fn run(&mut self, trial: &Trial, state: &mut TrialRuntimeState) -> PhaseResult {
        let seq_length = trial.expected.len();
        let shown = trial.spec.symbols();
        let mut colors = vec![Color::Black; shown.len()];

        // anything typed before the response window opened does not count
        self.input.clear_events();
        self.render(trial, &shown, &colors);

        let deadline = self
            .config
            .response_timeout()
            .map(|timeout| Deadline::after(self.timer, timeout));
        let mut timed_out = false;
        let mut interrupted = false;
        let mut overflow = 0;

        while state.responses.len() < seq_length {
            if self.input.interrupted() {
                interrupted = true;
                warn!(
                    trial = trial.id,
                    responses = state.responses.len(),
                    "response collection interrupted"
                );
                break;
            }
            let presses = self.input.poll_events(self.timer);
            if presses.is_empty() {
                if deadline.is_some_and(|d| d.expired(self.timer)) {
                    timed_out = true;
                    warn!(
                        trial = trial.id,
                        responses = state.responses.len(),
                        seq_length,
                        "response window timed out"
                    );
                    break;
                }
                self.timer.sleep(self.config.poll_interval());
                continue;
            }

            for press in presses {
                match Self::score(trial, state, press, &mut colors) {
                    Scored::Position => {}
                    Scored::Overflow => overflow += 1,
                }
            }
            self.render(trial, &shown, &colors);
        }

        // positions never answered count against the trial
        if state.responses.len() < seq_length {
            state.is_error = true;
        }
        self.config.scoring.finalize_trial(state, seq_length);

        let movement_time = state.movement_time();
        if movement_time.is_nan() {
            warn!(trial = trial.id, "no responses recorded; movement time undefined");
        }
        debug!(
            trial = trial.id,
            correct = state.correct_count,
            points = state.points,
            is_error = state.is_error,
            movement_time,
            "retrieval finished"
        );

        PhaseResult::Retrieval {
            movement_time,
            timed_out,
            interrupted,
            overflow,
        }
    }

    /// Logs one press and scores it against the position it recalls.
    fn score(
        trial: &Trial,
        state: &mut TrialRuntimeState,
        press: KeyPress,
        colors: &mut [Color],
    ) -> Scored {
        let seq_length = trial.expected.len();
        let k = state.responses.len();
        debug!(trial = trial.id, key = %press.key, at = ?press.timestamp, k, "response");

        if k >= seq_length {
            state.push_response(press.key, press.timestamp);
            debug!(trial = trial.id, k, "response beyond sequence length, not scored");
            return Scored::Overflow;
        }

        let index = trial.spec.recall_dir.display_index(seq_length, k);
        let correct = press.key == trial.expected[index];
        if let Some(color) = colors.get_mut(index) {
            *color = if correct { Color::Green } else { Color::Red };
        }
        state.push_response(press.key, press.timestamp);

        if correct {
            state.correct_count += 1;
            state.points += 1;
        } else {
            state.is_error = true;
        }
        Scored::Position
    }

    fn render(&mut self, trial: &Trial, shown: &[&str], colors: &[Color]) {
        let layout = &self.config.layout;
        show(self.display, "retrieval", |d| {
            layout.frame(d, Color::Green)?;
            layout.cue(d, trial.spec.recall_dir)?;
            layout.items(d, shown, colors)
        });
    }
}

enum Scored {
    Position,
    Overflow,
}
