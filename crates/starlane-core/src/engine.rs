//! The turn engine: resolves one turn of the whole galaxy.
//!
//! # Architecture
//!
//! The `TurnEngine` owns everything that outlives a single turn:
//! - the [`RulesConfig`] constants
//! - the frozen [`DesignRegistry`] shared by every game
//! - the [`Habitability`] calculator
//! - an [`EventBus`] for typed turn events
//! - a [`CommandQueue`] of player commands waiting for the next turn
//! - an optional [`TurnHistory`] of encoded snapshots
//!
//! # Phases
//!
//! [`TurnEngine::end_turn`] clones the previous state and runs, for every
//! player in order (human first):
//! 1. **Commands** -- apply queued and reactive commands
//! 2. **Economy** -- production, mining depletion, research generation
//! 3. **Research** -- route each player's points into their selected field
//! 4. **Population** -- growth, die-off, abandonment
//! 5. **Build** -- build queues, then governors
//! 6. **Fleets** -- refuel, resolve orders, remove empty fleets
//! 7. **Bookkeeping** -- advance the turn counter
//! 8. **Scanning** -- refresh every player's scan reports
//! 9. **Post-turn** -- hash, record history, deliver events
//!
//! A turn either completes or leaves nothing behind: on error the previous
//! state is untouched and the turn's buffered events are discarded.

use crate::build::governor::run_governors;
use crate::build::queue::process_all_queues;
use crate::command::{Command, CommandContext, CommandQueue, apply_commands};
use crate::config::RulesConfig;
use crate::design::DesignCatalog;
use crate::economy::{PopulationChange, produce, update_population};
use crate::event::{Event, EventBus, EventKind};
use crate::fixed::Fixed64;
use crate::fleet::FleetError;
use crate::fleet::movement::{FleetContext, process_fleets};
use crate::habitability::{EnvironmentHabitability, Habitability};
use crate::id::PlayerId;
use crate::registry::DesignRegistry;
use crate::research::{apply_research, colony_research_output};
use crate::scanning::scan_all;
use crate::snapshot::{SnapshotError, TurnHistory};
use crate::state::GameState;

#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    #[error("fleet invariant violated: {0}")]
    Fleet(#[from] FleetError),
    #[error("could not record turn history: {0}")]
    Snapshot(#[from] SnapshotError),
}

// ---------------------------------------------------------------------------
// TurnEngine
// ---------------------------------------------------------------------------

pub struct TurnEngine {
    pub rules: RulesConfig,
    registry: DesignRegistry,
    habitability: Box<dyn Habitability>,
    /// Typed events of the most recent turn, delivered at its end.
    pub events: EventBus,
    /// Commands applied at the start of the next turn.
    pub commands: CommandQueue,
    history: Option<TurnHistory>,
    last_state_hash: u64,
}

impl std::fmt::Debug for TurnEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnEngine")
            .field("rules", &self.rules)
            .field("registry", &self.registry)
            .field("events", &self.events)
            .field("commands", &self.commands)
            .field("history", &self.history)
            .field("last_state_hash", &self.last_state_hash)
            .finish_non_exhaustive()
    }
}

impl TurnEngine {
    /// An engine using [`EnvironmentHabitability`] and no turn history.
    pub fn new(rules: RulesConfig, registry: DesignRegistry) -> Self {
        Self {
            rules,
            registry,
            habitability: Box::new(EnvironmentHabitability),
            events: EventBus::default(),
            commands: CommandQueue::new(),
            history: None,
            last_state_hash: 0,
        }
    }

    pub fn with_habitability(mut self, habitability: Box<dyn Habitability>) -> Self {
        self.habitability = habitability;
        self
    }

    /// Keep encoded snapshots of the last `capacity` resolved turns.
    pub fn with_history(mut self, capacity: usize) -> Self {
        self.history = Some(TurnHistory::new(capacity));
        self
    }

    pub fn registry(&self) -> &DesignRegistry {
        &self.registry
    }

    pub fn history(&self) -> Option<&TurnHistory> {
        self.history.as_ref()
    }

    /// Hash of the state returned by the last successful turn.
    pub fn last_state_hash(&self) -> u64 {
        self.last_state_hash
    }

    /// Queue a command for the next turn.
    pub fn submit(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn suppress_event(&mut self, kind: EventKind) {
        self.events.suppress(kind);
    }

    /// Apply every pending command to `state` right away. Returns how many
    /// changed it.
    pub fn apply_commands(&mut self, state: &mut GameState) -> usize {
        self.commands.push_batch(self.events.drain_commands());
        let commands = self.commands.drain(state.turn);
        self.apply_to(state, commands)
    }

    fn apply_to(&self, state: &mut GameState, commands: Vec<Command>) -> usize {
        let designs = state.ship_designs.clone();
        let catalog = DesignCatalog::new(&designs, &self.registry);
        let ctx = CommandContext {
            resolver: &catalog,
            limits: &self.rules.limits,
        };
        apply_commands(state, commands, &ctx)
    }

    // -----------------------------------------------------------------------
    // Turn resolution
    // -----------------------------------------------------------------------

    /// Resolve one turn and return the next state.
    ///
    /// On error the pending commands are kept for the next attempt, ahead of
    /// anything submitted in the meantime.
    pub fn end_turn(&mut self, previous: &GameState) -> Result<GameState, TurnError> {
        let mut state = previous.clone();
        self.commands.push_batch(self.events.drain_commands());
        let commands = self.commands.take_pending();
        if let Err(err) = self.resolve(&mut state, commands.clone()) {
            log::warn!("turn {} aborted: {err}", previous.turn);
            self.events.clear_all();
            self.commands.requeue_front(commands);
            return Err(err);
        }
        self.commands.record(previous.turn, &commands);

        self.last_state_hash = state.state_hash();
        log::info!(
            "turn {} resolved, now turn {} (hash {:016x})",
            previous.turn,
            state.turn,
            self.last_state_hash
        );
        if let Some(history) = self.history.as_mut() {
            history.record(&state)?;
        }

        self.events.deliver();
        self.commands.push_batch(self.events.drain_commands());
        Ok(state)
    }

    fn resolve(&mut self, state: &mut GameState, commands: Vec<Command>) -> Result<(), TurnError> {
        let turn = state.turn;
        self.apply_to(state, commands);

        let research = self.phase_economy(state);
        self.phase_research(state, research, turn);
        self.phase_population(state, turn);

        let designs = state.ship_designs.clone();
        let catalog = DesignCatalog::new(&designs, &self.registry);

        process_all_queues(state, &catalog, &self.rules, &mut self.events, turn)?;
        run_governors(state, &self.rules.build.costs, &mut self.events, turn);

        let ctx = FleetContext {
            resolver: &catalog,
            habitability: self.habitability.as_ref(),
            rules: &self.rules,
            turn,
        };
        process_fleets(state, &ctx, &mut self.events);

        state.turn += 1;

        for (player, count) in scan_all(state, &catalog, &self.rules.scanning) {
            self.events.emit(Event::StarsScanned {
                player,
                count,
                turn,
            });
        }
        Ok(())
    }

    /// Production and depletion on every owned colony. Returns the research
    /// each player generated, in player order.
    fn phase_economy(&mut self, state: &mut GameState) -> Vec<(PlayerId, Fixed64)> {
        let mut totals = Vec::new();
        for player in state.player_ids() {
            let modifier = state
                .player(player)
                .map_or(Fixed64::ZERO, |p| p.species.traits.research);
            let mut points = Fixed64::ZERO;
            for star in state.stars.iter_mut().filter(|s| s.is_owned_by(player)) {
                let output = produce(star, &self.rules.economy);
                log::debug!(
                    "{}: +{} resources, mined {:?}",
                    star.id,
                    output.resources,
                    output.minerals
                );
                points = points.saturating_add(colony_research_output(star.research, modifier));
            }
            totals.push((player, points));
        }
        totals
    }

    fn phase_research(&mut self, state: &mut GameState, totals: Vec<(PlayerId, Fixed64)>, turn: u32) {
        for (player_id, points) in totals {
            if player_id == state.human_player.id {
                let total = &mut state.player_economy.research;
                *total = total.saturating_add(points);
            }
            let Some(player) = state.player_mut(player_id) else {
                continue;
            };
            if let Some(advance) = apply_research(&mut player.tech, points, &self.rules.research) {
                self.events.emit(Event::ResearchAdvanced {
                    player: player_id,
                    field: advance.field,
                    level: advance.level,
                    turn,
                });
            }
        }
    }

    fn phase_population(&mut self, state: &mut GameState, turn: u32) {
        for player_id in state.player_ids() {
            let Some(species) = state.player(player_id).map(|p| p.species.clone()) else {
                continue;
            };
            for star in state.stars.iter_mut().filter(|s| s.is_owned_by(player_id)) {
                let habitability = self.habitability.habitability(star, &species);
                match update_population(star, habitability, &self.rules.population) {
                    PopulationChange::Grew { from, to } | PopulationChange::Declined { from, to } => {
                        self.events.emit(Event::PopulationChanged {
                            star: star.id,
                            from,
                            to,
                            turn,
                        });
                    }
                    PopulationChange::Abandoned => {
                        log::debug!("{} abandoned by {player_id}", star.id);
                        self.events.emit(Event::ColonyAbandoned {
                            star: star.id,
                            previous_owner: player_id,
                            turn,
                        });
                    }
                    PopulationChange::Unchanged => {}
                }
            }
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
