//! Supply network - connectivity, truck routes and out-of-supply attrition
//!
//! Runs once per logistics tick, independent of combat. A network is rebuilt
//! from the map and a side's source hexes whenever it is needed; nothing here
//! keeps state between ticks.

pub mod attrition;
pub mod network;
pub mod route;

pub use attrition::{supply_tick, AttritionEvent};
pub use network::{has_supply_path, SupplyMap, SupplyNetwork};
pub use route::{find_supply_route, RouteSummary, UnitMoveProfile};
