use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::cave::geometry::Vec2;

/// How long a key counts as held after its last press or auto-repeat, on
/// terminals that never send release events.
pub const HOLD_WINDOW: Duration = Duration::from_millis(500);

/// A key we track for held-state, normalised so `W` and `w` are the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeldKey {
    Char(char),
    Up,
    Down,
    Left,
    Right,
}

impl HeldKey {
    pub fn from_code(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::Char(c) => Some(HeldKey::Char(c.to_ascii_lowercase())),
            KeyCode::Up => Some(HeldKey::Up),
            KeyCode::Down => Some(HeldKey::Down),
            KeyCode::Left => Some(HeldKey::Left),
            KeyCode::Right => Some(HeldKey::Right),
            _ => None,
        }
    }
}

/// Currently-held keys. Fed by the event stream, read once per simulation tick.
#[derive(Debug)]
pub struct InputState {
    held: HashMap<HeldKey, Instant>,
    /// When true the terminal reports releases, so keys never expire on their own.
    releases: bool,
    window: Duration,
}

impl InputState {
    pub fn new(releases: bool) -> Self {
        Self { held: HashMap::new(), releases, window: HOLD_WINDOW }
    }

    pub fn reports_releases(&self) -> bool {
        self.releases
    }

    pub fn apply(&mut self, key: &KeyEvent, now: Instant) {
        let Some(k) = HeldKey::from_code(key.code) else { return };
        match key.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => {
                self.held.insert(k, now);
            }
            KeyEventKind::Release => {
                self.held.remove(&k);
            }
        }
    }

    /// Drops keys whose press has gone stale. No-op when releases are reported.
    pub fn expire(&mut self, now: Instant) {
        if self.releases {
            return;
        }
        let window = self.window;
        self.held.retain(|_, at| now.saturating_duration_since(*at) < window);
    }

    pub fn is_held(&self, key: HeldKey) -> bool {
        self.held.contains_key(&key)
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }

    fn any(&self, keys: &[HeldKey]) -> bool {
        keys.iter().any(|k| self.is_held(*k))
    }

    /// Raw movement direction from WASD and arrows; opposite keys cancel.
    pub fn move_intent(&self) -> Vec2 {
        let mut dir = Vec2::ZERO;
        if self.any(&[HeldKey::Char('w'), HeldKey::Up]) {
            dir.y -= 1.0;
        }
        if self.any(&[HeldKey::Char('s'), HeldKey::Down]) {
            dir.y += 1.0;
        }
        if self.any(&[HeldKey::Char('a'), HeldKey::Left]) {
            dir.x -= 1.0;
        }
        if self.any(&[HeldKey::Char('d'), HeldKey::Right]) {
            dir.x += 1.0;
        }
        dir
    }
}
