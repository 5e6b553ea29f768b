use std::time::Instant;

use caverna::cave::geometry::{Rect, Vec2};
use caverna::cave::{CaveGame, CaveRenderer, Ending, Phase};
use caverna::config::GameConfig;
use caverna::core::input::InputState;
use caverna::Game;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
use ratatui::{backend::TestBackend, Terminal};

const DT: f32 = 1.0 / 60.0;

fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
    KeyEvent { code, modifiers: KeyModifiers::NONE, kind, state: KeyEventState::NONE }
}

fn send(game: &mut CaveGame, input: &mut InputState, code: KeyCode, kind: KeyEventKind) {
    let event = key(code, kind);
    input.apply(&event, Instant::now());
    game.handle_key(event, input);
}

fn hold(game: &mut CaveGame, input: &mut InputState, code: KeyCode, down: bool) {
    let kind = if down { KeyEventKind::Press } else { KeyEventKind::Release };
    send(game, input, code, kind);
}

/// Holds the arrow keys that point from the player toward `target`.
fn steer(game: &mut CaveGame, input: &mut InputState, target: Vec2) {
    let pos = game.world().player.pos;
    let (dx, dy) = (target.x - pos.x, target.y - pos.y);
    hold(game, input, KeyCode::Right, dx > 2.0);
    hold(game, input, KeyCode::Left, dx < -2.0);
    hold(game, input, KeyCode::Down, dy > 2.0);
    hold(game, input, KeyCode::Up, dy < -2.0);
}

fn screen(game: &CaveGame) -> String {
    let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
    terminal.draw(|f| CaveRenderer::render(f, game)).unwrap();
    terminal.backend().buffer().content().iter().map(|c| c.symbol()).collect()
}

#[test]
fn collecting_every_crystal_wins_the_run() {
    let config = GameConfig { pits: vec![], obstacles: vec![], ..GameConfig::default() };
    let mut game = CaveGame::new(config, 42);
    let mut input = InputState::new(true);

    send(&mut game, &mut input, KeyCode::Char('s'), KeyEventKind::Press);
    assert_eq!(game.phase(), Phase::Playing);

    for _ in 0..60 * 60 {
        if game.phase() != Phase::Playing {
            break;
        }
        let target = game
            .world()
            .crystals
            .iter()
            .find(|c| !c.picked)
            .map(|c| c.pos)
            .expect("an unpicked crystal while playing");
        steer(&mut game, &mut input, target);
        game.on_tick(DT, &input);
    }

    match game.phase() {
        Phase::Ended { ending: Ending::Won { time }, .. } => {
            assert!(time > 0.0);
            assert_eq!(game.world().collected(), 3);
        }
        other => panic!("expected a win, got {other:?}"),
    }
    let text = screen(&game);
    assert!(text.contains("YOU WIN! Time:"));
    assert!(text.contains("Crystals: 3 / 3"));
}

#[test]
fn walking_into_a_pit_loses_and_returns_to_menu() {
    let config = GameConfig {
        pits: vec![Rect::new(560.0, 300.0, 100.0, 100.0)],
        obstacles: vec![],
        ..GameConfig::default()
    };
    let mut game = CaveGame::new(config, 9);
    let mut input = InputState::new(true);
    send(&mut game, &mut input, KeyCode::Enter, KeyEventKind::Press);
    // Keep crystals out of the walk east from the start.
    for crystal in &mut game.world_mut().crystals {
        crystal.pos = Vec2::new(150.0, 150.0);
    }

    hold(&mut game, &mut input, KeyCode::Char('d'), true);
    let mut ticks = 0;
    while game.phase() == Phase::Playing && ticks < 600 {
        game.on_tick(DT, &input);
        ticks += 1;
    }
    assert!(matches!(game.phase(), Phase::Ended { ending: Ending::Fell, .. }));
    assert!(screen(&game).contains("You fell! Defeat."));

    for _ in 0..(3.5 / DT) as usize {
        game.on_tick(DT, &input);
    }
    assert!(game.in_menu());
    assert!(screen(&game).contains("Start"));
}

#[test]
fn lantern_drains_only_while_lit() {
    let config = GameConfig { pits: vec![], obstacles: vec![], ..GameConfig::default() };
    let mut game = CaveGame::new(config, 5);
    let mut input = InputState::new(true);
    send(&mut game, &mut input, KeyCode::Enter, KeyEventKind::Press);

    for _ in 0..60 {
        game.on_tick(DT, &input);
    }
    let lit = game.world().lantern.battery();
    assert!(lit < 10.0);

    send(&mut game, &mut input, KeyCode::Char('l'), KeyEventKind::Press);
    assert!(screen(&game).contains("LANTERN OFF"));
    for _ in 0..60 {
        game.on_tick(DT, &input);
    }
    assert!(game.world().lantern.battery() > lit);
}
