//! Bot AI: per-turn tactical planning
//!
//! Architecture: trait + pipeline
//! - `Battlefield` is the read-only view of terrain, movement and combat the
//!   planner is given; `StandardBattlefield` backs it with a `BattleMap`
//! - `DecisionContext` holds the per-pass facts every rule reads
//! - `ScoringPipeline` turns a candidate into a named, auditable breakdown
//!
//! Nothing persists between turns: a plan is a pure function of the input.

pub mod decision_context;
pub mod planner;
pub mod scoring;

pub use decision_context::{DecisionContext, Occupancy, PlannerInput, StandardBattlefield};
pub use planner::{movement_allowance, plan_bot_turn, ActionKind, PlannedAction};
pub use scoring::{Candidate, ScoreBreakdown, ScoreTerm, ScoringPipeline, ScoringRule};

use crate::battle::combat::{Combatant, ExchangeEstimate};
use crate::battle::hex::HexCoord;
use crate::battle::terrain::{MoveType, TerrainDefinition};
use crate::battle::unit_type::UnitTypeDefinition;

/// What the planner may ask about the battlefield
pub trait Battlefield {
    fn in_bounds(&self, hex: HexCoord) -> bool;

    fn terrain_at(&self, hex: HexCoord) -> Option<TerrainDefinition>;

    /// Cost of entering `hex`; `None` if the move type cannot
    fn movement_cost(&self, hex: HexCoord, move_type: MoveType) -> Option<f32>;

    /// Can a unit of this type at `from` see `to`?
    fn los_allows(&self, from: HexCoord, to: HexCoord, viewer: &UnitTypeDefinition) -> bool;

    /// Expected attack from `from` and the return fire it draws
    fn estimate_attack(&self, attacker: Combatant, from: HexCoord, defender: Combatant) -> ExchangeEstimate;
}
