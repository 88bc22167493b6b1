//! Terminal front end: the display and keyboard ports backed by crossterm.

use std::io::{self, Stdout, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{self, Print, ResetColor, SetForegroundColor};
use crossterm::{cursor, execute, queue, terminal};
use tracing::{debug, info, warn};
use wmchunk_core::{Align, Color, Display, DisplayError, InputSource, KeyPress, Position, Stimulus};
use wmchunk_timing::Timer;

/// Character cells per display unit.
const COLS_PER_UNIT: f32 = 4.0;
const ROWS_PER_UNIT: f32 = 2.0;

/// Full-screen terminal in raw mode. The terminal is restored on drop.
pub struct TerminalScreen {
    out: Stdout,
    cols: u16,
    rows: u16,
    frame_started: bool,
}

impl TerminalScreen {
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut out = io::stdout();
        execute!(out, terminal::EnterAlternateScreen, cursor::Hide)?;
        let (cols, rows) = terminal::size()?;
        info!(cols, rows, "terminal display ready");
        Ok(Self {
            out,
            cols,
            rows,
            frame_started: false,
        })
    }

    /// Maps a position in display units (origin at the centre, y up) to a
    /// character cell.
    fn cell(&self, (x, y): Position) -> (i32, i32) {
        let col = f32::from(self.cols) / 2.0 + x * COLS_PER_UNIT;
        let row = f32::from(self.rows) / 2.0 - y * ROWS_PER_UNIT;
        (col.round() as i32, row.round() as i32)
    }

    fn put(&mut self, col: i32, row: i32, text: &str) -> io::Result<()> {
        if row < 0 || row >= i32::from(self.rows) {
            return Ok(());
        }
        let col = col.clamp(0, i32::from(self.cols.saturating_sub(1)));
        queue!(self.out, cursor::MoveTo(col as u16, row as u16), Print(text))
    }

    fn rect(&mut self, (col, row): (i32, i32), width: f32, height: f32, filled: bool) -> io::Result<()> {
        let w = ((width * COLS_PER_UNIT).round() as usize).max(2);
        let h = ((height * ROWS_PER_UNIT).round() as usize).max(2);
        let left = col - w as i32 / 2;
        let top = row - h as i32 / 2;

        for dy in 0..h {
            let line = if filled {
                "█".repeat(w)
            } else if dy == 0 {
                format!("┌{}┐", "─".repeat(w - 2))
            } else if dy == h - 1 {
                format!("└{}┘", "─".repeat(w - 2))
            } else {
                format!("│{}│", " ".repeat(w - 2))
            };
            self.put(left, top + dy as i32, &line)?;
        }
        Ok(())
    }
}

fn term_color(color: Color) -> style::Color {
    match color {
        Color::Black => style::Color::Reset,
        other => {
            let [r, g, b, _] = other.rgba();
            style::Color::Rgb { r, g, b }
        }
    }
}

impl Display for TerminalScreen {
    fn draw(&mut self, stimulus: &Stimulus, pos: Position, color: Color) -> Result<(), DisplayError> {
        if !self.frame_started {
            queue!(self.out, terminal::Clear(terminal::ClearType::All))?;
            self.frame_started = true;
        }
        queue!(self.out, SetForegroundColor(term_color(color)))?;

        let origin = self.cell(pos);
        match stimulus {
            Stimulus::Frame { width, height } => self.rect(origin, *width, *height, false)?,
            Stimulus::FilledBox { width, height } => self.rect(origin, *width, *height, true)?,
            Stimulus::Text { content, align } => {
                let lines: Vec<&str> = content.lines().collect();
                let top = origin.1 - lines.len() as i32 / 2;
                for (i, line) in lines.iter().enumerate() {
                    let col = match align {
                        Align::Left => origin.0,
                        Align::Center => origin.0 - line.chars().count() as i32 / 2,
                    };
                    self.put(col, top + i as i32, line)?;
                }
            }
        }
        queue!(self.out, ResetColor)?;
        Ok(())
    }

    fn present(&mut self) -> Result<(), DisplayError> {
        self.frame_started = false;
        self.out.flush()?;
        Ok(())
    }
}

impl Drop for TerminalScreen {
    fn drop(&mut self) {
        let restored = execute!(self.out, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)
            .and_then(|()| terminal::disable_raw_mode());
        if let Err(err) = restored {
            warn!(%err, "failed to restore terminal");
        }
    }
}

/// Keyboard input read from the terminal event queue.
///
/// Escape or Ctrl-C raise the shared abort flag instead of being delivered
/// as responses.
pub struct Keyboard {
    abort: Arc<AtomicBool>,
}

impl Keyboard {
    pub fn new(abort: Arc<AtomicBool>) -> Self {
        Self { abort }
    }

    /// Blocks until any key is pressed.
    pub fn wait_for_key(&mut self) -> io::Result<()> {
        loop {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(());
                }
            }
        }
    }

    /// Drains pending terminal events, returning the printable keys pressed.
    fn drain(&mut self) -> Vec<char> {
        let mut keys = Vec::new();
        loop {
            match event::poll(Duration::ZERO) {
                Ok(true) => {}
                Ok(false) => break,
                Err(err) => {
                    warn!(%err, "keyboard poll failed");
                    break;
                }
            }
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    if let Some(c) = self.classify(key) {
                        keys.push(c);
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(%err, "keyboard read failed");
                    break;
                }
            }
        }
        keys
    }

    fn classify(&self, key: KeyEvent) -> Option<char> {
        match key.code {
            KeyCode::Esc => {
                self.request_abort("escape");
                None
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.request_abort("ctrl-c");
                None
            }
            KeyCode::Char(c) => Some(c),
            _ => None,
        }
    }

    fn request_abort(&self, via: &str) {
        if !self.abort.swap(true, Ordering::SeqCst) {
            info!(via, "stop requested; ending after the current trial");
        }
    }
}

impl InputSource for Keyboard {
    fn poll_events<T: Timer>(&mut self, timer: &T) -> Vec<KeyPress> {
        let keys = self.drain();
        if keys.is_empty() {
            return Vec::new();
        }
        let now = timer.now();
        keys.into_iter()
            .map(|c| KeyPress::new(c.to_string(), now))
            .collect()
    }

    fn clear_events(&mut self) {
        let dropped = self.drain();
        if !dropped.is_empty() {
            debug!(count = dropped.len(), "discarded early key presses");
        }
    }

    fn interrupted(&self) -> bool {
        self.abort.load(Ordering::SeqCst)
    }
}
