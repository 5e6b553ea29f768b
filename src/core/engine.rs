use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers};
use futures_util::StreamExt;
use ratatui::DefaultTerminal;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::core::game::Game;
use crate::core::input::InputState;

/// Upper bound on simulation slices run for a single frame.
pub const MAX_TICKS_PER_FRAME: u32 = 5;

/// Turns wall-clock frame gaps into a whole number of fixed simulation slices.
#[derive(Debug)]
pub struct FrameClock {
    step: Duration,
    max_frame: Duration,
    acc: Duration,
}

impl FrameClock {
    /// The frame cap never drops below one slice, otherwise every frame would
    /// lose time and the simulation would lag the wall clock.
    pub fn new(step: Duration, max_frame: Duration) -> Self {
        Self { step, max_frame: max_frame.max(step), acc: Duration::ZERO }
    }

    pub fn step_secs(&self) -> f32 {
        self.step.as_secs_f32()
    }

    /// Adds a frame's delta (clamped to the frame cap) and returns how many
    /// slices are due. Leftover time carries into the next frame.
    pub fn advance(&mut self, delta: Duration) -> u32 {
        self.acc += delta.min(self.max_frame);
        let mut due = 0;
        while self.acc >= self.step && due < MAX_TICKS_PER_FRAME {
            self.acc -= self.step;
            due += 1;
        }
        if due == MAX_TICKS_PER_FRAME {
            self.acc = self.acc.min(self.step);
        }
        due
    }
}

pub struct Engine<G: Game> {
    game: G,
    input: InputState,
}

impl<G: Game> Engine<G> {
    pub fn new(game: G, input: InputState) -> Self {
        Self { game, input }
    }

    pub async fn run(mut self, terminal: &mut DefaultTerminal) -> Result<G> {
        let mut events = EventStream::new();
        let mut clock = FrameClock::new(self.game.tick_rate(), self.game.max_frame_delta());
        let mut frames = tokio::time::interval(self.game.tick_rate());
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut last_frame = Instant::now();

        info!(
            tick = ?self.game.tick_rate(),
            releases = self.input.reports_releases(),
            "engine started"
        );
        terminal.draw(|f| self.game.render(f))?;

        loop {
            tokio::select! {
                maybe_event = events.next() => match maybe_event {
                    Some(Ok(event)) => {
                        if let Flow::Stop = self.handle_event(event, Instant::now()) {
                            break;
                        }
                    }
                    Some(Err(e)) => return Err(e.into()),
                    None => break,
                },

                _ = frames.tick() => {
                    let now = Instant::now();
                    self.input.expire(now);
                    let due = clock.advance(now.saturating_duration_since(last_frame));
                    last_frame = now;
                    for _ in 0..due {
                        self.game.on_tick(clock.step_secs(), &self.input);
                    }
                    terminal.draw(|f| self.game.render(f))?;
                }
            }

            if self.game.should_quit() {
                debug!("game asked to quit");
                break;
            }
        }

        Ok(self.game)
    }

    /// Routes one terminal event to the input state and the game.
    fn handle_event(&mut self, event: Event, now: Instant) -> Flow {
        match event {
            Event::Key(key) => {
                let ctrl_c = key.kind == KeyEventKind::Press
                    && key.code == KeyCode::Char('c')
                    && key.modifiers.contains(KeyModifiers::CONTROL);
                if ctrl_c {
                    info!("interrupted");
                    return Flow::Stop;
                }
                self.input.apply(&key, now);
                self.game.handle_key(key, &mut self.input);
            }
            // Releases sent while unfocused never reach us.
            Event::FocusLost => self.input.clear(),
            _ => {}
        }
        Flow::Continue
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cave::geometry::Vec2;
    use crate::core::input::HeldKey;
    use crossterm::event::KeyEvent;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn steady_frames_run_one_slice_each() {
        let mut clock = FrameClock::new(ms(20), ms(50));
        assert_eq!(clock.advance(ms(20)), 1);
        assert_eq!(clock.advance(ms(20)), 1);
    }

    #[test]
    fn leftover_time_carries_over() {
        let mut clock = FrameClock::new(ms(20), ms(50));
        assert_eq!(clock.advance(ms(30)), 1);
        assert_eq!(clock.advance(ms(10)), 1);
        assert_eq!(clock.advance(ms(5)), 0);
    }

    #[test]
    fn long_stalls_are_clamped() {
        let mut clock = FrameClock::new(ms(20), ms(50));
        assert_eq!(clock.advance(Duration::from_secs(5)), 2);
        assert_eq!(clock.advance(ms(10)), 1);
    }

    #[test]
    fn frame_cap_below_one_slice_keeps_pace() {
        let mut clock = FrameClock::new(ms(100), ms(50));
        let slices: u32 = (0..10).map(|_| clock.advance(ms(100))).sum();
        assert_eq!(slices, 10);
    }

    #[test]
    fn slice_count_is_bounded() {
        let mut clock = FrameClock::new(ms(1), ms(50));
        assert_eq!(clock.advance(ms(50)), MAX_TICKS_PER_FRAME);
        assert!(clock.advance(ms(0)) <= 1);
    }

    #[derive(Default)]
    struct Recorder {
        keys: Vec<KeyCode>,
    }

    impl Game for Recorder {
        fn tick_rate(&self) -> Duration {
            ms(20)
        }

        fn max_frame_delta(&self) -> Duration {
            ms(50)
        }

        fn handle_key(&mut self, key: KeyEvent, _input: &mut InputState) {
            self.keys.push(key.code);
        }

        fn on_tick(&mut self, _dt: f32, _input: &InputState) {}

        fn render(&self, _frame: &mut ratatui::Frame) {}

        fn should_quit(&self) -> bool {
            false
        }
    }

    fn press(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new_with_kind(code, modifiers, KeyEventKind::Press))
    }

    #[test]
    fn losing_focus_drops_held_keys() {
        let mut engine = Engine::new(Recorder::default(), InputState::new(true));
        let now = Instant::now();
        let flow = engine.handle_event(press(KeyCode::Char('d'), KeyModifiers::NONE), now);
        assert_eq!(flow, Flow::Continue);
        assert!(engine.input.is_held(HeldKey::Char('d')));
        assert_eq!(engine.game.keys, vec![KeyCode::Char('d')]);

        engine.handle_event(Event::FocusLost, now);
        assert!(!engine.input.is_held(HeldKey::Char('d')));
        assert_eq!(engine.input.move_intent(), Vec2::ZERO);
    }

    #[test]
    fn ctrl_c_stops_without_reaching_the_game() {
        let mut engine = Engine::new(Recorder::default(), InputState::new(true));
        let flow = engine.handle_event(press(KeyCode::Char('c'), KeyModifiers::CONTROL), Instant::now());
        assert_eq!(flow, Flow::Stop);
        assert!(engine.game.keys.is_empty());
    }
}
