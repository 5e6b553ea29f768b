/// Core game interface driven by the engine loop
use std::time::Duration;

use crossterm::event::KeyEvent;

use crate::core::input::InputState;

/// Main game trait. The engine feeds it key presses as they arrive, steps it
/// in fixed slices, then draws it once per frame.
pub trait Game {
    /// Length of one simulation slice.
    fn tick_rate(&self) -> Duration;

    /// Longest wall-clock gap a single frame may feed into the simulation.
    fn max_frame_delta(&self) -> Duration;

    /// Edge-triggered key handling (toggles, menu, pause). Held-key movement is
    /// read from `input` during `on_tick` instead.
    fn handle_key(&mut self, key: KeyEvent, input: &mut InputState);

    /// Advances the game by `dt` seconds.
    fn on_tick(&mut self, dt: f32, input: &InputState);

    fn render(&self, frame: &mut ratatui::Frame);

    fn should_quit(&self) -> bool;
}
