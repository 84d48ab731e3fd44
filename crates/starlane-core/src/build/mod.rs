//! Colony build queues.
//!
//! - [`payment`]: paying the head item from the colony's stockpiles.
//! - [`starbase`]: scrap credit when a starbase replaces an older one.
//! - [`project`]: what a completed project does to the colony.
//! - [`queue`]: the per-turn queue loop and player-facing queue edits.
//! - [`governor`]: automatic queueing for colonies with an empty queue.

pub mod governor;
pub mod payment;
pub mod project;
pub mod queue;
pub mod starbase;

use crate::config::ProjectCosts;
use crate::id::DesignId;
use crate::minerals::Cost;
use serde::{Deserialize, Serialize};

/// What a build item produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectKind {
    Mine,
    Factory,
    Defense,
    Research,
    Terraform,
    Scanner,
    Ship,
}

impl ProjectKind {
    pub const ALL: [ProjectKind; 7] = [
        ProjectKind::Mine,
        ProjectKind::Factory,
        ProjectKind::Defense,
        ProjectKind::Research,
        ProjectKind::Terraform,
        ProjectKind::Scanner,
        ProjectKind::Ship,
    ];
}

fn one() -> u32 {
    1
}

/// One entry in a colony's build queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildItem {
    pub project: ProjectKind,
    /// Cost of a single unit.
    pub cost: Cost,
    /// Paid so far toward the current unit. Created on first payment.
    #[serde(default)]
    pub paid: Option<Cost>,
    #[serde(default)]
    pub ship_design: Option<DesignId>,
    /// Queued by a governor rather than the player.
    #[serde(default)]
    pub is_auto: bool,
    /// Units still to build.
    #[serde(default = "one")]
    pub count: u32,
    /// An earlier unit already replaced the colony's old starbase. Later
    /// units are built at full cost and scrap nothing.
    #[serde(default)]
    pub replaced_starbase: bool,
}

impl BuildItem {
    pub fn new(project: ProjectKind, cost: Cost) -> Self {
        Self {
            project,
            cost,
            paid: None,
            ship_design: None,
            is_auto: false,
            count: 1,
            replaced_starbase: false,
        }
    }

    /// A non-ship project at its configured cost. `None` for ships.
    pub fn project(project: ProjectKind, costs: &ProjectCosts) -> Option<Self> {
        costs.for_project(project).map(|cost| Self::new(project, cost))
    }

    pub fn ship(design: impl Into<DesignId>, cost: Cost) -> Self {
        Self {
            ship_design: Some(design.into()),
            ..Self::new(ProjectKind::Ship, cost)
        }
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count.max(1);
        self
    }

    pub fn auto(mut self) -> Self {
        self.is_auto = true;
        self
    }
}
