//! Headless port implementations: a scripted subject and a display that
//! records every presented frame.

use std::collections::VecDeque;
use std::time::Duration;

use wmchunk_timing::Timer;

use crate::error::DisplayError;
use crate::input::{InputSource, KeyPress};
use crate::stimulus::{Color, Display, Position, Stimulus};

/// Replays key presses at fixed trial-clock times.
///
/// A press is delivered by the first poll at or after its timestamp. Since the
/// trial clock restarts every trial, a script for several retrieval trials is
/// simply the presses of each trial in order: a timestamp earlier than the
/// previous delivered press starts the next trial's script, which is held back
/// until `clear_events` opens a new response window.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    queue: VecDeque<KeyPress>,
    last: Option<Duration>,
    pub clears: usize,
}

impl ScriptedInput {
    pub fn new<I, K>(presses: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        Self {
            queue: presses
                .into_iter()
                .map(|(key, at)| KeyPress::new(key, Duration::from_secs_f64(at)))
                .collect(),
            last: None,
            clears: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl InputSource for ScriptedInput {
    fn poll_events<T: Timer>(&mut self, timer: &T) -> Vec<KeyPress> {
        let now = timer.now();
        let mut due = Vec::new();
        while let Some(at) = self.queue.front().map(|p| p.timestamp) {
            if at > now || self.last.is_some_and(|l| at < l) {
                break;
            }
            self.last = Some(at);
            due.extend(self.queue.pop_front());
        }
        due
    }

    fn clear_events(&mut self) {
        self.last = None;
        self.clears += 1;
    }
}

pub type DrawCall = (Stimulus, Position, Color);

#[derive(Debug, Default)]
pub struct RecordingDisplay {
    pending: Vec<DrawCall>,
    frames: Vec<Vec<DrawCall>>,
    fail: bool,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// A display whose every call fails, for exercising error paths.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn frames(&self) -> &[Vec<DrawCall>] {
        &self.frames
    }

    /// Text contents of every presented frame, in order.
    pub fn texts(&self) -> Vec<Vec<String>> {
        self.frames
            .iter()
            .map(|frame| {
                frame
                    .iter()
                    .filter_map(|(stim, _, _)| match stim {
                        Stimulus::Text { content, .. } => Some(content.clone()),
                        _ => None,
                    })
                    .collect()
            })
            .collect()
    }
}

impl Display for RecordingDisplay {
    fn draw(
        &mut self,
        stimulus: &Stimulus,
        pos: Position,
        color: Color,
    ) -> Result<(), DisplayError> {
        if self.fail {
            return Err(DisplayError::Unavailable("recording display set to fail".into()));
        }
        self.pending.push((stimulus.clone(), pos, color));
        Ok(())
    }

    fn present(&mut self) -> Result<(), DisplayError> {
        if self.fail {
            return Err(DisplayError::Unavailable("recording display set to fail".into()));
        }
        self.frames.push(std::mem::take(&mut self.pending));
        Ok(())
    }
}
