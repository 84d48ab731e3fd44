//! Data-driven content loading for Starlane.
//!
//! Reads rules, ship designs, and species from RON, TOML, or JSON files.

pub mod loader;
pub mod schema;

pub use loader::{DataLoadError, GameData, load_game_data};
