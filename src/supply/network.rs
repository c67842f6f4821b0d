//! Supply sources and line-of-supply connectivity

use std::collections::VecDeque;

use ahash::{AHashMap, AHashSet};

use crate::battle::battle_map::BattleMap;
use crate::battle::hex::HexCoord;
use crate::battle::terrain::{MoveType, TerrainLookup};
use crate::core::config::Tuning;

/// Map accessor the supply code needs on top of terrain lookup
pub trait SupplyMap: TerrainLookup {
    fn in_bounds(&self, hex: HexCoord) -> bool;

    fn is_road(&self, hex: HexCoord) -> bool;

    /// Can a supply line cross this hex at all?
    fn is_passable(&self, hex: HexCoord) -> bool {
        if !self.in_bounds(hex) {
            return false;
        }
        let terrain = self.terrain_or_fallback(hex);
        self.is_road(hex)
            || [MoveType::Leg, MoveType::Wheel, MoveType::Track]
                .into_iter()
                .any(|mt| terrain.is_passable_for(mt))
    }
}

impl SupplyMap for BattleMap {
    fn in_bounds(&self, hex: HexCoord) -> bool {
        BattleMap::in_bounds(self, hex)
    }

    fn is_road(&self, hex: HexCoord) -> bool {
        BattleMap::is_road(self, hex)
    }
}

/// One side's supply sources over a map
#[derive(Debug, Clone)]
pub struct SupplyNetwork<'a, M: SupplyMap + ?Sized> {
    pub sources: AHashSet<HexCoord>,
    pub map: &'a M,
}

impl<'a, M: SupplyMap + ?Sized> SupplyNetwork<'a, M> {
    pub fn new(map: &'a M, sources: impl IntoIterator<Item = HexCoord>) -> Self {
        Self {
            sources: sources.into_iter().collect(),
            map,
        }
    }

    pub fn is_source(&self, hex: HexCoord) -> bool {
        self.sources.contains(&hex)
    }
}

/// Budget spent by a partial supply line
#[derive(Debug, Clone, Copy, PartialEq)]
struct LineState {
    road_steps: u32,
    offroad: f32,
}

impl LineState {
    fn dominates(&self, other: &LineState) -> bool {
        self.road_steps <= other.road_steps && self.offroad <= other.offroad
    }
}

/// Is `hex` connected to any source of the network?
///
/// Breadth-first from the unit outward. Road hexes spend the road-range
/// budget one step at a time; any other hex spends `offroad_step_cost` of the
/// off-road budget. A hex is re-expanded only with a budget combination no
/// earlier visit already beat on both counts.
pub fn has_supply_path<M: SupplyMap + ?Sized>(hex: HexCoord, network: &SupplyNetwork<M>, tuning: &Tuning) -> bool {
    if network.is_source(hex) {
        return true;
    }
    if network.sources.is_empty() {
        return false;
    }

    let supply = &tuning.supply;
    let mut visited: AHashMap<HexCoord, Vec<LineState>> = AHashMap::new();
    let mut queue = VecDeque::new();

    let start = LineState {
        road_steps: 0,
        offroad: 0.0,
    };
    visited.insert(hex, vec![start]);
    queue.push_back((hex, start));

    while let Some((current, state)) = queue.pop_front() {
        for neighbor in current.neighbors() {
            if !network.map.is_passable(neighbor) {
                continue;
            }

            let next = if network.map.is_road(neighbor) {
                LineState {
                    road_steps: state.road_steps + 1,
                    ..state
                }
            } else {
                LineState {
                    offroad: state.offroad + supply.offroad_step_cost,
                    ..state
                }
            };

            if next.road_steps > supply.road_range || next.offroad > supply.offroad_budget {
                continue;
            }

            if network.is_source(neighbor) {
                return true;
            }

            let seen = visited.entry(neighbor).or_default();
            if seen.iter().any(|s| s.dominates(&next)) {
                continue;
            }
            seen.retain(|s| !next.dominates(s));
            seen.push(next);
            queue.push_back((neighbor, next));
        }
    }

    false
}
