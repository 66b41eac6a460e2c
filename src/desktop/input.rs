//! Pointer input through enigo

use enigo::{Button, Coordinate, Direction, Enigo, Mouse, Settings};

use super::{ActuationError, Pointer};

/// Real mouse driven through the OS input injection API
pub struct DesktopPointer {
    enigo: Enigo,
}

impl DesktopPointer {
    /// Connect to the platform input backend
    pub fn new() -> Result<Self, ActuationError> {
        let enigo =
            Enigo::new(&Settings::default()).map_err(|e| ActuationError::Backend(e.to_string()))?;
        Ok(Self { enigo })
    }
}

impl Pointer for DesktopPointer {
    fn move_to(&mut self, x: i32, y: i32) -> Result<(), ActuationError> {
        self.enigo
            .move_mouse(x, y, Coordinate::Abs)
            .map_err(|e| ActuationError::Move {
                x,
                y,
                reason: e.to_string(),
            })
    }

    fn click(&mut self) -> Result<(), ActuationError> {
        self.enigo
            .button(Button::Left, Direction::Click)
            .map_err(|e| ActuationError::Click(e.to_string()))
    }
}
