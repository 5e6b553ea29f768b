use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::cave::hud::format_time;
use crate::cave::renderer::CaveRenderer;
use crate::cave::world::{StepOutcome, World};
use crate::config::GameConfig;
use crate::core::game::Game;
use crate::core::input::InputState;
use crate::core::menu::{MenuAction, MenuState};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ending {
    Won { time: f32 },
    Fell,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    Menu,
    Playing,
    Paused,
    /// Run is over; the message stays up for `remaining` seconds.
    Ended { ending: Ending, remaining: f32 },
}

pub struct CaveGame {
    config: GameConfig,
    rng: StdRng,
    world: World,
    phase: Phase,
    menu: MenuState,
    quit: bool,
}

impl CaveGame {
    pub fn new(config: GameConfig, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let world = World::new(&config, &mut rng);
        Self { config, rng, world, phase: Phase::Menu, menu: MenuState::new(), quit: false }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn menu(&self) -> &MenuState {
        &self.menu
    }

    pub fn in_menu(&self) -> bool {
        self.phase == Phase::Menu
    }

    /// Resets the cave and starts a fresh run.
    pub fn start(&mut self) {
        self.world = World::new(&self.config, &mut self.rng);
        self.menu.panel = None;
        self.phase = Phase::Playing;
        info!(crystals = self.world.target(), "run started");
    }

    pub fn toggle_pause(&mut self) {
        self.phase = match self.phase {
            Phase::Playing => Phase::Paused,
            Phase::Paused => Phase::Playing,
            other => other,
        };
        info!(phase = ?self.phase, "pause toggled");
    }

    /// Centre-screen message for the current phase, if any.
    pub fn message(&self) -> Option<String> {
        match self.phase {
            Phase::Paused => Some("PAUSED".to_string()),
            Phase::Ended { ending: Ending::Won { time }, .. } => {
                Some(format!("YOU WIN! Time: {}", format_time(time)))
            }
            Phase::Ended { ending: Ending::Fell, .. } => Some("You fell! Defeat.".to_string()),
            Phase::Menu | Phase::Playing => None,
        }
    }

    fn end(&mut self, ending: Ending) {
        info!(?ending, elapsed = self.world.elapsed, collected = self.world.collected(), "run ended");
        self.phase = Phase::Ended { ending, remaining: self.config.message_secs };
    }
}

impl Game for CaveGame {
    fn tick_rate(&self) -> Duration {
        self.config.tick()
    }

    fn max_frame_delta(&self) -> Duration {
        Duration::from_secs_f32(self.config.max_frame_dt)
    }

    fn handle_key(&mut self, key: KeyEvent, input: &mut InputState) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        match self.phase {
            Phase::Menu => match self.menu.handle_key(key.code) {
                Some(MenuAction::Start) => {
                    input.clear();
                    self.start();
                }
                Some(MenuAction::Quit) => self.quit = true,
                None => {}
            },
            Phase::Playing => match key.code {
                KeyCode::Esc => {
                    input.clear();
                    self.toggle_pause();
                }
                KeyCode::Char(c) if c.eq_ignore_ascii_case(&'l') => {
                    self.world.toggle_lantern();
                }
                _ => {}
            },
            Phase::Paused => match key.code {
                KeyCode::Esc => {
                    input.clear();
                    self.toggle_pause();
                }
                KeyCode::Char(c) if c.eq_ignore_ascii_case(&'q') => {
                    info!("run abandoned");
                    self.phase = Phase::Menu;
                }
                _ => {}
            },
            Phase::Ended { .. } => {}
        }
    }

    fn on_tick(&mut self, dt: f32, input: &InputState) {
        match self.phase {
            Phase::Playing => match self.world.step(dt, input.move_intent()) {
                StepOutcome::Won => self.end(Ending::Won { time: self.world.elapsed }),
                StepOutcome::Fell => self.end(Ending::Fell),
                StepOutcome::Continue => {}
            },
            Phase::Ended { ending, remaining } => {
                let remaining = remaining - dt;
                self.phase = if remaining <= 0.0 {
                    Phase::Menu
                } else {
                    Phase::Ended { ending, remaining }
                };
            }
            Phase::Menu | Phase::Paused => {}
        }
    }

    fn render(&self, frame: &mut ratatui::Frame) {
        CaveRenderer::render(frame, self);
    }

    fn should_quit(&self) -> bool {
        self.quit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cave::geometry::Vec2;
    use crossterm::event::{KeyEventState, KeyModifiers};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn started() -> (CaveGame, InputState) {
        let mut game = CaveGame::new(GameConfig::default(), 3);
        let mut input = InputState::new(true);
        game.handle_key(press(KeyCode::Enter), &mut input);
        assert_eq!(game.phase(), Phase::Playing);
        (game, input)
    }

    #[test]
    fn starts_in_menu_and_quits_from_it() {
        let mut game = CaveGame::new(GameConfig::default(), 1);
        let mut input = InputState::new(true);
        assert!(game.in_menu());
        game.on_tick(0.1, &input);
        assert_eq!(game.world().elapsed, 0.0);
        game.handle_key(press(KeyCode::Char('q')), &mut input);
        assert!(game.should_quit());
    }

    #[test]
    fn pause_freezes_simulation() {
        let (mut game, mut input) = started();
        game.on_tick(0.5, &input);
        game.handle_key(press(KeyCode::Esc), &mut input);
        assert_eq!(game.message().as_deref(), Some("PAUSED"));
        let before = game.world().elapsed;
        game.on_tick(1.0, &input);
        assert_eq!(game.world().elapsed, before);
        game.handle_key(press(KeyCode::Esc), &mut input);
        assert_eq!(game.phase(), Phase::Playing);
        assert_eq!(game.message(), None);
    }

    #[test]
    fn lantern_key_toggles_only_while_playing() {
        let (mut game, mut input) = started();
        game.handle_key(press(KeyCode::Char('L')), &mut input);
        assert!(!game.world().lantern.is_on());
        game.handle_key(press(KeyCode::Esc), &mut input);
        game.handle_key(press(KeyCode::Char('l')), &mut input);
        assert!(!game.world().lantern.is_on());
    }

    #[test]
    fn win_shows_time_then_returns_to_menu() {
        let (mut game, input) = started();
        let pos = game.world().player.pos;
        let target = game.world().target();
        game.world_mut().crystals = (0..target)
            .map(|_| crate::cave::world::Crystal { pos, radius: 14.0, picked: false })
            .collect();
        game.on_tick(0.25, &input);
        assert!(matches!(game.phase(), Phase::Ended { ending: Ending::Won { .. }, .. }));
        assert_eq!(game.message().as_deref(), Some("YOU WIN! Time: 00:00.25"));
        for _ in 0..2 {
            game.on_tick(1.0, &input);
        }
        assert!(!game.in_menu());
        game.on_tick(1.0, &input);
        assert!(game.in_menu());
    }

    #[test]
    fn falling_into_pit_ends_run() {
        let (mut game, input) = started();
        game.world_mut().player.pos = Vec2::new(260.0, 540.0);
        game.on_tick(0.01, &input);
        assert_eq!(game.message().as_deref(), Some("You fell! Defeat."));
    }

    #[test]
    fn restart_resets_the_world() {
        let (mut game, mut input) = started();
        game.on_tick(2.0, &input);
        game.handle_key(press(KeyCode::Esc), &mut input);
        game.handle_key(press(KeyCode::Char('q')), &mut input);
        assert!(game.in_menu());
        game.handle_key(press(KeyCode::Char('s')), &mut input);
        assert_eq!(game.world().elapsed, 0.0);
        assert_eq!(game.world().lantern.percent(), 100);
        assert_eq!(game.world().collected(), 0);
    }
}
