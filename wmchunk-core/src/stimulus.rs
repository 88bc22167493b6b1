use crate::error::DisplayError;

/// Screen coordinates in display units, origin at the centre.
pub type Position = (f32, f32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Black,
    Red,
    Green,
    Blue,
    Yellow,
}

impl Color {
    pub fn rgba(self) -> [u8; 4] {
        match self {
            Color::Black => [0, 0, 0, 255],
            Color::Red => [255, 0, 0, 255],
            Color::Green => [0, 255, 0, 255],
            Color::Blue => [0, 0, 255, 255],
            Color::Yellow => [255, 255, 0, 255],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    Left,
    #[default]
    Center,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stimulus {
    /// Outlined rectangle enclosing the sequence.
    Frame { width: f32, height: f32 },
    /// Solid square cueing the recall direction.
    FilledBox { width: f32, height: f32 },
    Text { content: String, align: Align },
}

impl Stimulus {
    pub fn text(content: impl Into<String>, align: Align) -> Self {
        Stimulus::Text {
            content: content.into(),
            align,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Stimulus::Text { .. })
    }
}

/// Rendering surface. Draw calls are buffered until `present`.
pub trait Display {
    fn draw(&mut self, stimulus: &Stimulus, pos: Position, color: Color)
    -> Result<(), DisplayError>;
    fn present(&mut self) -> Result<(), DisplayError>;
}

impl<D: Display + ?Sized> Display for &mut D {
    fn draw(
        &mut self,
        stimulus: &Stimulus,
        pos: Position,
        color: Color,
    ) -> Result<(), DisplayError> {
        (**self).draw(stimulus, pos, color)
    }

    fn present(&mut self) -> Result<(), DisplayError> {
        (**self).present()
    }
}
