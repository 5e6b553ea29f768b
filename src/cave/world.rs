use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cave::geometry::{Rect, Vec2};
use crate::cave::lantern::{Lantern, LanternEvent};
use crate::config::GameConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crystal {
    pub pos: Vec2,
    pub radius: f32,
    pub picked: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub w: f32,
    pub h: f32,
}

impl Player {
    pub fn bounds(&self) -> Rect {
        Rect::centered(self.pos, self.w, self.h)
    }

    /// Reach used for crystal pickup, on top of the crystal radius.
    pub fn reach(&self) -> f32 {
        self.w.max(self.h) / 2.0
    }
}

/// Static layout of the cave.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub width: f32,
    pub height: f32,
    pub pits: Vec<Rect>,
    pub obstacles: Vec<Rect>,
}

impl Scene {
    pub fn in_pit(&self, p: Vec2) -> bool {
        self.pits.iter().any(|pit| pit.contains_strict(p))
    }

    pub fn in_obstacle(&self, p: Vec2) -> bool {
        self.obstacles.iter().any(|ob| ob.contains_strict(p))
    }

    pub fn blocks(&self, body: &Rect) -> bool {
        self.obstacles.iter().any(|ob| ob.overlaps(body))
    }
}

/// Result of one simulation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    Won,
    Fell,
}

#[derive(Debug, Clone)]
pub struct World {
    pub scene: Scene,
    pub player: Player,
    pub lantern: Lantern,
    pub crystals: Vec<Crystal>,
    /// Simulated seconds since the run started.
    pub elapsed: f32,
    config: GameConfig,
}

impl World {
    pub fn new<R: Rng + ?Sized>(config: &GameConfig, rng: &mut R) -> Self {
        let mut world = Self::empty(config);
        world.spawn_crystals(config.crystal_count, rng);
        world
    }

    /// Builds a world with crystals at fixed spots instead of random ones.
    #[doc(hidden)]
    pub fn with_crystals(config: &GameConfig, positions: &[Vec2]) -> Self {
        let mut world = Self::empty(config);
        world.crystals = positions
            .iter()
            .map(|&pos| Crystal { pos, radius: config.crystal_radius, picked: false })
            .collect();
        world
    }

    fn empty(config: &GameConfig) -> Self {
        Self {
            scene: Scene {
                width: config.width,
                height: config.height,
                pits: config.pits.clone(),
                obstacles: config.obstacles.clone(),
            },
            player: Player {
                pos: Vec2::new(config.width / 2.0, config.height / 2.0),
                vel: Vec2::ZERO,
                w: config.player_width,
                h: config.player_height,
            },
            lantern: Lantern::new(config.lantern_max),
            crystals: Vec::with_capacity(config.crystal_count),
            elapsed: 0.0,
            config: config.clone(),
        }
    }

    fn spawn_crystals<R: Rng + ?Sized>(&mut self, n: usize, rng: &mut R) {
        let margin = self.config.spawn_margin;
        let span_x = self.scene.width - 2.0 * margin;
        let span_y = self.scene.height - 2.0 * margin;
        for _ in 0..n {
            let mut attempts = 0;
            // Last sample outside every obstacle; a crystal inside one can never be reached.
            let mut reachable = None;
            let pos = loop {
                let p = Vec2::new(
                    margin + rng.random::<f32>() * span_x,
                    margin + rng.random::<f32>() * span_y,
                );
                attempts += 1;
                let in_obstacle = self.scene.in_obstacle(p);
                if !in_obstacle {
                    reachable = Some(p);
                }
                let blocked = in_obstacle
                    || self.scene.in_pit(p)
                    || p.distance(self.player.pos) < self.config.spawn_clearance;
                if !blocked {
                    break p;
                }
                if attempts >= self.config.spawn_attempts {
                    let p = reachable.or_else(|| self.config.open_spawn_point()).unwrap_or(p);
                    debug!(x = p.x, y = p.y, "crystal placed after exhausting attempts");
                    break p;
                }
            };
            self.crystals.push(Crystal {
                pos,
                radius: self.config.crystal_radius,
                picked: false,
            });
        }
    }

    pub fn collected(&self) -> usize {
        self.crystals.iter().filter(|c| c.picked).count()
    }

    pub fn target(&self) -> usize {
        self.config.crystal_count
    }

    pub fn is_won(&self) -> bool {
        self.collected() >= self.config.crystal_count
    }

    pub fn toggle_lantern(&mut self) -> bool {
        let on = self.lantern.toggle();
        debug!(on, battery = self.lantern.battery(), "lantern toggled");
        on
    }

    /// Advances the simulation by `dt` seconds. `intent` is the raw direction
    /// from held keys; it is normalised so diagonals are not faster.
    pub fn step(&mut self, dt: f32, intent: Vec2) -> StepOutcome {
        self.elapsed += dt;

        let cfg = &self.config;
        self.player.vel = intent.normalize_or_zero().scale(cfg.player_speed);
        self.move_axis(self.player.vel.x * dt, 0.0);
        self.move_axis(0.0, self.player.vel.y * dt);

        let cfg = &self.config;
        let m = cfg.bounds_margin;
        self.player.pos.x = self.player.pos.x.clamp(m, self.scene.width - m);
        self.player.pos.y = self.player.pos.y.clamp(m, self.scene.height - m);

        match self.lantern.tick(dt, cfg.lantern_drain, cfg.lantern_recharge) {
            LanternEvent::Depleted => info!("lantern battery depleted"),
            LanternEvent::Recharged => debug!("lantern fully recharged"),
            LanternEvent::Steady => {}
        }

        let reach = self.player.reach();
        let player_pos = self.player.pos;
        for crystal in self.crystals.iter_mut().filter(|c| !c.picked) {
            if crystal.pos.distance(player_pos) < crystal.radius + reach {
                crystal.picked = true;
                info!(x = crystal.pos.x, y = crystal.pos.y, "crystal collected");
            }
        }

        if self.is_won() {
            return StepOutcome::Won;
        }
        if self.scene.in_pit(self.player.pos) {
            return StepOutcome::Fell;
        }
        StepOutcome::Continue
    }

    fn move_axis(&mut self, dx: f32, dy: f32) {
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        let from = self.player.pos;
        self.player.pos = Vec2::new(from.x + dx, from.y + dy);
        let was_clear = !self.scene.blocks(&Rect::centered(from, self.player.w, self.player.h));
        if was_clear && self.scene.blocks(&self.player.bounds()) {
            self.player.pos = from;
        }
    }
}
