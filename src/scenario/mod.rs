//! Scenario snapshots: the battle state a turn engine hands the core
//!
//! A snapshot is plain data (JSON or TOML) with string keys for hexes,
//! terrain and unit types; `Scenario::resolve` checks every key against the
//! catalogs and builds the runtime map and units.

pub mod loader;
pub mod snapshot;

pub use loader::ResolvedScenario;
pub use snapshot::{MapSpec, ObjectiveSpec, Scenario, SupplySpec, UnitSpec};
