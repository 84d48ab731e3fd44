//! Starlane Core -- the turn-resolution engine for a turn-based 4X space
//! strategy game.
//!
//! A game is a single [`state::GameState`] value. Ending a turn hands the
//! previous state to [`engine::TurnEngine::end_turn`], which returns the
//! next one; the previous value is never mutated.
//!
//! # Turn Pipeline
//!
//! Each turn resolves, for every player in order (human first):
//!
//! 1. **Commands** -- Apply queued player and reactive commands.
//! 2. **Economy** -- Factories produce resources, mines extract and deplete.
//! 3. **Research** -- Generated points advance the selected tech field.
//! 4. **Population** -- Logistic growth, or die-off on hostile worlds.
//! 5. **Build** -- Pay for and complete queued projects, then run governors.
//! 6. **Fleets** -- Refuel, then resolve standing orders head first.
//! 7. **Bookkeeping** -- Advance the turn counter.
//! 8. **Scanning** -- Refresh each player's scan reports.
//!
//! # Key Types
//!
//! - [`engine::TurnEngine`] -- Owns rules, designs, and the event bus;
//!   orchestrates the pipeline.
//! - [`state::GameState`] -- Stars, players, fleets, and saved designs.
//! - [`fleet::FleetOrder`] -- Standing orders resolved by
//!   [`fleet::movement`].
//! - [`build::BuildItem`] -- Colony build queue entries.
//! - [`registry::DesignRegistry`] -- Immutable table of compiled ship stats
//!   (frozen at startup).
//! - [`fixed::Fixed64`] -- Q32.32 fixed-point type for research points.
//! - [`event::EventBus`] -- Subscription-based event bus with buffered delivery.
//! - [`snapshot`] -- Versioned bitcode snapshots and turn history.

pub mod build;
pub mod command;
pub mod config;
pub mod design;
pub mod economy;
pub mod engine;
pub mod event;
pub mod fixed;
pub mod fleet;
pub mod habitability;
pub mod id;
pub mod minerals;
pub mod registry;
pub mod research;
pub mod scanning;
pub mod sim;
pub mod snapshot;
pub mod state;
pub mod tech;
pub mod validation;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
