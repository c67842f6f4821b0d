//! Battle system - the tactical core
//!
//! Hex geometry, terrain and units at the bottom; line of sight and combat
//! resolution on top of them; the bot planner calls into both.

pub mod ai;
pub mod battle_map;
pub mod combat;
pub mod hex;
pub mod pathfinding;
pub mod terrain;
pub mod unit_type;
pub mod units;
pub mod visibility;

// Re-exports for convenient access
pub use ai::{plan_bot_turn, ActionKind, Battlefield, PlannedAction, PlannerInput, StandardBattlefield};
pub use battle_map::{BattleHex, BattleMap, Objective};
pub use combat::{
    estimate_exchange, resolve_attack, ArmorFacing, AttackRequest, AttackResult, CombatPenalty, Combatant,
    ExchangeContext, ExchangeEstimate,
};
pub use hex::{HexCoord, HexDirection};
pub use pathfinding::{find_path, reachable_hexes, MoveBudget, ReachableHex};
pub use terrain::{MoveType, TerrainDefinition, TerrainKind, TerrainLookup};
pub use unit_type::{Armor, UnitCatalog, UnitClass, UnitTrait, UnitTypeDefinition};
pub use units::{UnitRuntimeState, ENTRENCH_MAX, STRENGTH_MAX};
pub use visibility::is_visible;
