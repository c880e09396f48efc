use std::fmt;

/// Pointer click in surface coordinates.
///
/// Grid-style surfaces report tile row/column here rather than pixels; the
/// router does not care which.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct PointerClick {
    pub x: i32,
    pub y: i32,
}

impl PointerClick {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Truncates fractional surface coordinates (after zoom scaling, say).
    pub fn from_scaled(x: f64, y: f64) -> Self {
        Self {
            x: x as i32,
            y: y as i32,
        }
    }
}

/// Platform-agnostic input events delivered by a surface.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum InputEvent {
    /// A character was typed.
    KeyTyped(char),

    /// The pointer was clicked.
    PointerClicked(PointerClick),
}

/// Which handler an `InputEvent` is routed to.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum InputKind {
    Key,
    Pointer,
}

impl InputEvent {
    pub fn kind(&self) -> InputKind {
        match self {
            InputEvent::KeyTyped(_) => InputKind::Key,
            InputEvent::PointerClicked(_) => InputKind::Pointer,
        }
    }
}

impl InputKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputKind::Key => "key",
            InputKind::Pointer => "pointer",
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
