use glam::Vec2;

use super::PointerButton;

/// Physical input of the local process, sampled once per tick.
pub trait InputSource {
    fn action_pressed(&self, action: &str) -> bool;

    fn pointer_pressed(&self, button: PointerButton) -> bool;

    fn pointer_position(&self) -> Vec2;
}
