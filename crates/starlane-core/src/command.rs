//! Player commands applied between turns.
//!
//! Commands are queued by the client (UI, AI scripts, reactive event
//! handlers) and applied to the state before the next turn resolves. A
//! command that refers to something the player does not own, or to an index
//! that does not exist, changes nothing.

use crate::build::BuildItem;
use crate::build::queue::{add_to_queue, remove_from_queue, set_governor};
use crate::config::FleetLimits;
use crate::design::DesignResolver;
use crate::fleet::transfer::{merge_fleets, separate_fleet, split_fleet, transfer};
use crate::fleet::{FleetError, FleetOrder, TransferSpec};
use crate::id::{FleetId, PlayerId, StarId};
use crate::state::{GameState, Governor};
use crate::tech::TechField;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Command enum
// ---------------------------------------------------------------------------

/// A single mutation requested by a player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Append an item to a colony's build queue.
    AddToQueue {
        player: PlayerId,
        star: StarId,
        item: BuildItem,
    },
    /// Remove the queue entry at `index`.
    RemoveFromQueue {
        player: PlayerId,
        star: StarId,
        index: usize,
    },
    /// `None` means manual.
    SetGovernor {
        player: PlayerId,
        star: StarId,
        governor: Option<Governor>,
    },
    /// Replace a fleet's standing orders.
    SetFleetOrders {
        player: PlayerId,
        fleet: FleetId,
        orders: Vec<FleetOrder>,
    },
    /// Direct all future research into `field`.
    SetResearchField { player: PlayerId, field: TechField },
    /// Move the ships, fuel, and cargo in `spec` into a new fleet.
    SplitFleet {
        player: PlayerId,
        fleet: FleetId,
        spec: TransferSpec,
    },
    /// One fleet per ship, leaving a single ship in the original.
    SeparateFleet { player: PlayerId, fleet: FleetId },
    MergeFleets {
        player: PlayerId,
        source: FleetId,
        target: FleetId,
    },
    /// Trade ships, fuel, and cargo between two co-located fleets.
    TransferBetweenFleets {
        player: PlayerId,
        source: FleetId,
        target: FleetId,
        spec: TransferSpec,
    },
}

impl Command {
    pub fn player(&self) -> PlayerId {
        match self {
            Command::AddToQueue { player, .. }
            | Command::RemoveFromQueue { player, .. }
            | Command::SetGovernor { player, .. }
            | Command::SetFleetOrders { player, .. }
            | Command::SetResearchField { player, .. }
            | Command::SplitFleet { player, .. }
            | Command::SeparateFleet { player, .. }
            | Command::MergeFleets { player, .. }
            | Command::TransferBetweenFleets { player, .. } => *player,
        }
    }
}

/// What fleet commands need to check hard limits and tank sizes.
#[derive(Clone, Copy)]
pub struct CommandContext<'a> {
    pub resolver: &'a dyn DesignResolver,
    pub limits: &'a FleetLimits,
}

fn owns_fleet(state: &GameState, player: PlayerId, fleet: FleetId) -> bool {
    state.fleets.get(fleet).is_some_and(|f| f.owner == player)
}

/// A refused fleet mutation leaves the state as it was; the command is
/// reported and skipped.
fn fleet_outcome<T>(player: PlayerId, what: &str, result: Result<T, FleetError>) -> bool {
    match result {
        Ok(_) => true,
        Err(err) => {
            log::warn!("{player}: {what} refused: {err}");
            false
        }
    }
}

/// Apply one command. Returns whether it changed anything.
pub fn apply_command(state: &mut GameState, command: Command, ctx: &CommandContext<'_>) -> bool {
    match command {
        Command::AddToQueue { player, star, item } => add_to_queue(state, player, star, item),
        Command::RemoveFromQueue {
            player,
            star,
            index,
        } => remove_from_queue(state, player, star, index).is_some(),
        Command::SetGovernor {
            player,
            star,
            governor,
        } => set_governor(state, player, star, governor),
        Command::SetFleetOrders {
            player,
            fleet,
            orders,
        } => match state.fleets.get_mut(fleet).filter(|f| f.owner == player) {
            Some(fleet) => {
                fleet.orders = orders;
                true
            }
            None => {
                log::warn!("{player} cannot order fleet {fleet:?}");
                false
            }
        },
        Command::SetResearchField { player, field } => match state.player_mut(player) {
            Some(p) => {
                p.tech.selected_field = field;
                true
            }
            None => {
                log::warn!("{player} does not exist");
                false
            }
        },
        Command::SplitFleet {
            player,
            fleet,
            spec,
        } => {
            if !owns_fleet(state, player, fleet) {
                log::warn!("{player} cannot split fleet {fleet:?}");
                return false;
            }
            let result = split_fleet(state, fleet, &spec, ctx.resolver, ctx.limits);
            fleet_outcome(player, "split", result)
        }
        Command::SeparateFleet { player, fleet } => {
            if !owns_fleet(state, player, fleet) {
                log::warn!("{player} cannot separate fleet {fleet:?}");
                return false;
            }
            let result = separate_fleet(state, fleet, ctx.resolver, ctx.limits);
            fleet_outcome(player, "separate", result)
        }
        Command::MergeFleets {
            player,
            source,
            target,
        } => {
            if !owns_fleet(state, player, source) {
                log::warn!("{player} cannot merge fleet {source:?}");
                return false;
            }
            let result = merge_fleets(state, source, target, ctx.resolver, ctx.limits);
            fleet_outcome(player, "merge", result)
        }
        Command::TransferBetweenFleets {
            player,
            source,
            target,
            spec,
        } => {
            if !owns_fleet(state, player, source) {
                log::warn!("{player} cannot transfer from fleet {source:?}");
                return false;
            }
            let result = transfer(state, source, target, &spec, ctx.resolver, ctx.limits);
            fleet_outcome(player, "transfer", result)
        }
    }
}

/// Apply commands in order. Returns how many changed the state.
pub fn apply_commands(
    state: &mut GameState,
    commands: impl IntoIterator<Item = Command>,
    ctx: &CommandContext<'_>,
) -> usize {
    let mut applied = 0;
    for command in commands {
        if apply_command(state, command, ctx) {
            applied += 1;
        }
    }
    applied
}

// ---------------------------------------------------------------------------
// CommandQueue
// ---------------------------------------------------------------------------

/// Commands waiting for the next turn boundary, with optional history of
/// what was applied before which turn.
#[derive(Debug, Default)]
pub struct CommandQueue {
    pending: Vec<Command>,
    /// Applied commands as (turn, command).
    history: Vec<(u32, Command)>,
    /// Maximum history entries to retain. 0 = no history.
    max_history: usize,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_history(max_history: usize) -> Self {
        Self {
            max_history,
            ..Self::default()
        }
    }

    pub fn push(&mut self, command: Command) {
        self.pending.push(command);
    }

    pub fn push_batch(&mut self, commands: impl IntoIterator<Item = Command>) {
        self.pending.extend(commands);
    }

    /// Take all pending commands in submission order, recording them in the
    /// history under `turn`.
    pub fn drain(&mut self, turn: u32) -> Vec<Command> {
        let commands = self.take_pending();
        self.record(turn, &commands);
        commands
    }

    /// Take all pending commands without recording them. Pair with
    /// [`record`](Self::record) once they have stuck, or hand them back with
    /// [`requeue_front`](Self::requeue_front).
    pub fn take_pending(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.pending)
    }

    /// Put `commands` back ahead of anything submitted since they were taken.
    pub fn requeue_front(&mut self, commands: Vec<Command>) {
        let later = std::mem::replace(&mut self.pending, commands);
        self.pending.extend(later);
    }

    /// Record `commands` as applied before `turn`.
    pub fn record(&mut self, turn: u32, commands: &[Command]) {
        if self.max_history == 0 {
            return;
        }
        self.history
            .extend(commands.iter().map(|cmd| (turn, cmd.clone())));
        let excess = self.history.len().saturating_sub(self.max_history);
        if excess > 0 {
            self.history.drain(..excess);
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn history(&self) -> &[(u32, Command)] {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

// ===========================================================================
// Tests
// ===========================================================================
