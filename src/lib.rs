pub mod core {
	pub mod engine;
	pub mod game;
	pub mod input;
	pub mod menu;
	pub mod terminal;
}

pub mod cave;
pub mod cli;
pub mod config;

// Re-export for convenience
pub use crate::cave::CaveGame;
pub use crate::core::game::Game;
