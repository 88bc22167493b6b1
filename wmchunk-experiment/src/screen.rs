use wmchunk_core::{Align, Color, Display, DisplayError, RecallDir, Stimulus};

use crate::config::Layout;
use crate::score::RunSummary;

/// Draws one frame and presents it. A failing display is logged and the
/// trial carries on.
pub(crate) fn show<D, F>(display: &mut D, what: &'static str, draw: F)
where
    D: Display,
    F: FnOnce(&mut D) -> Result<(), DisplayError>,
{
    if let Err(err) = draw(display).and_then(|()| display.present()) {
        tracing::warn!(%err, frame = what, "display update failed");
    }
}

impl Layout {
    pub(crate) fn frame<D: Display>(&self, display: &mut D, color: Color) -> Result<(), DisplayError> {
        display.draw(
            &Stimulus::Frame {
                width: self.frame_width,
                height: self.frame_height,
            },
            (0.0, 0.0),
            color,
        )
    }

    /// Filled box left of the frame: blue for backward, yellow for forward.
    pub(crate) fn cue<D: Display>(&self, display: &mut D, dir: RecallDir) -> Result<(), DisplayError> {
        let color = match dir {
            RecallDir::Backward => Color::Blue,
            RecallDir::Forward => Color::Yellow,
        };
        display.draw(
            &Stimulus::FilledBox {
                width: self.cue_size,
                height: self.cue_size,
            },
            (self.cue_x, 0.0),
            color,
        )
    }

    pub(crate) fn sequence<D: Display>(&self, display: &mut D, text: &str) -> Result<(), DisplayError> {
        display.draw(
            &Stimulus::text(text, Align::Left),
            (self.sequence_x, 0.0),
            Color::Black,
        )
    }

    /// One text item per position so each can be recoloured on its own.
    pub(crate) fn items<D: Display>(
        &self,
        display: &mut D,
        items: &[&str],
        colors: &[Color],
    ) -> Result<(), DisplayError> {
        for (i, (item, color)) in items.iter().zip(colors).enumerate() {
            let x = self.sequence_x + i as f32 * self.item_spacing;
            display.draw(&Stimulus::text(*item, Align::Left), (x, 0.0), *color)?;
        }
        Ok(())
    }

    pub(crate) fn centered<D: Display>(&self, display: &mut D, text: &str, y: f32) -> Result<(), DisplayError> {
        display.draw(&Stimulus::text(text, Align::Center), (0.0, y), Color::Black)
    }
}

/// End-of-run scoreboard.
pub fn show_scoreboard<D: Display>(display: &mut D, layout: &Layout, summary: &RunSummary) {
    show(display, "scoreboard", |d| {
        layout.centered(d, &summary.to_string(), layout.scoreboard_y)
    });
}
