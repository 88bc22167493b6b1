use std::time::Duration;

use wmchunk_timing::Timer;

/// One key press stamped on the trial clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    pub key: String,
    pub timestamp: Duration,
}

impl KeyPress {
    pub fn new(key: impl Into<String>, timestamp: Duration) -> Self {
        Self {
            key: key.into(),
            timestamp,
        }
    }
}

/// Source of subject key presses.
pub trait InputSource {
    /// Returns every key pressed since the last call, oldest first.
    /// Never blocks.
    fn poll_events<T: Timer>(&mut self, timer: &T) -> Vec<KeyPress>;

    /// Drops any presses not yet delivered.
    fn clear_events(&mut self);

    /// Set once the operator has asked to stop. A retrieval phase stops
    /// waiting for responses when this turns true.
    fn interrupted(&self) -> bool {
        false
    }
}

impl<I: InputSource + ?Sized> InputSource for &mut I {
    fn poll_events<T: Timer>(&mut self, timer: &T) -> Vec<KeyPress> {
        (**self).poll_events(timer)
    }

    fn clear_events(&mut self) {
        (**self).clear_events()
    }

    fn interrupted(&self) -> bool {
        (**self).interrupted()
    }
}
