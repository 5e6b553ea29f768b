use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cave::geometry::{Rect, Vec2};

/// Grid spacing used when searching the spawn area for open ground.
const SPAWN_SCAN_STEP: f32 = 10.0;

/// Tunables for a cave run. Every field falls back to the stock value, so a
/// config file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub width: f32,
    pub height: f32,
    pub crystal_count: usize,
    /// Pixels per second.
    pub player_speed: f32,
    pub player_width: f32,
    pub player_height: f32,
    /// Distance the player centre keeps from the plane edges.
    pub bounds_margin: f32,
    /// Full battery, in seconds of light.
    pub lantern_max: f32,
    pub lantern_drain: f32,
    pub lantern_recharge: f32,
    pub crystal_radius: f32,
    pub spawn_margin: f32,
    pub spawn_clearance: f32,
    pub spawn_attempts: u32,
    pub max_frame_dt: f32,
    pub tick_hz: u32,
    pub message_secs: f32,
    pub pits: Vec<Rect>,
    pub obstacles: Vec<Rect>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 700.0,
            crystal_count: 3,
            player_speed: 160.0,
            player_width: 34.0,
            player_height: 42.0,
            bounds_margin: 20.0,
            lantern_max: 10.0,
            lantern_drain: 1.2,
            lantern_recharge: 0.8,
            crystal_radius: 14.0,
            spawn_margin: 120.0,
            spawn_clearance: 100.0,
            spawn_attempts: 50,
            max_frame_dt: 0.05,
            tick_hz: 60,
            message_secs: 3.0,
            pits: vec![
                Rect::new(150.0, 480.0, 220.0, 120.0),
                Rect::new(680.0, 120.0, 260.0, 160.0),
            ],
            obstacles: vec![Rect::new(420.0, 300.0, 60.0, 160.0)],
        }
    }
}

impl GameConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: GameConfig = serde_json::from_str(&raw)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid config {}", path.display()))?;
        info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width <= 0.0 || self.height <= 0.0 {
            bail!("plane size must be positive, got {}x{}", self.width, self.height);
        }
        if self.crystal_count == 0 {
            bail!("crystal_count must be at least 1");
        }
        if self.player_speed <= 0.0 || self.player_width <= 0.0 || self.player_height <= 0.0 {
            bail!("player speed and size must be positive");
        }
        if self.lantern_max <= 0.0 {
            bail!("lantern_max must be positive, got {}", self.lantern_max);
        }
        if self.lantern_drain < 0.0 || self.lantern_recharge < 0.0 {
            bail!("lantern rates cannot be negative");
        }
        if self.tick_hz == 0 {
            bail!("tick_hz must be at least 1");
        }
        if self.max_frame_dt <= 0.0 {
            bail!("max_frame_dt must be positive");
        }
        if self.max_frame_dt < 1.0 / self.tick_hz as f32 {
            bail!(
                "max_frame_dt {} is shorter than one tick at {} Hz",
                self.max_frame_dt,
                self.tick_hz
            );
        }
        if self.spawn_margin < 0.0
            || self.width - 2.0 * self.spawn_margin <= 0.0
            || self.height - 2.0 * self.spawn_margin <= 0.0
        {
            bail!("spawn_margin {} leaves no room to place crystals", self.spawn_margin);
        }
        if self.bounds_margin < 0.0
            || 2.0 * self.bounds_margin >= self.width
            || 2.0 * self.bounds_margin >= self.height
        {
            bail!("bounds_margin {} leaves no room to move", self.bounds_margin);
        }
        if self.open_spawn_point().is_none() {
            bail!("obstacles cover the whole crystal spawn area");
        }
        Ok(())
    }

    /// First point of the crystal spawn area, scanning row by row, that no
    /// obstacle covers.
    pub fn open_spawn_point(&self) -> Option<Vec2> {
        let m = self.spawn_margin;
        let (mut y, mut found) = (m, None);
        while found.is_none() && y < self.height - m {
            let mut x = m;
            while x < self.width - m {
                let p = Vec2::new(x, y);
                if !self.obstacles.iter().any(|ob| ob.contains_strict(p)) {
                    found = Some(p);
                    break;
                }
                x += SPAWN_SCAN_STEP;
            }
            y += SPAWN_SCAN_STEP;
        }
        found
    }

    /// Length of one simulation slice.
    pub fn tick(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.tick_hz))
    }

    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
