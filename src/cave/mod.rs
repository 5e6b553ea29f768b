//! The cave crawler: world simulation, lantern, HUD and drawing.
pub mod game;
pub mod geometry;
pub mod hud;
pub mod lantern;
pub mod renderer;
pub mod world;

pub use game::{CaveGame, Ending, Phase};
pub use renderer::CaveRenderer;
pub use world::{StepOutcome, World};
