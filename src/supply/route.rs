//! Weighted supply routes for trucks and convoys

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use crate::battle::hex::HexCoord;
use crate::battle::pathfinding::Frontier;
use crate::battle::terrain::MoveType;
use crate::battle::unit_type::UnitTypeDefinition;
use crate::core::config::Tuning;
use crate::supply::network::{SupplyMap, SupplyNetwork};

/// How the convoy travels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitMoveProfile {
    pub move_type: MoveType,
    /// Larger road ranges make each road step cheaper
    pub road_range: u32,
}

impl UnitMoveProfile {
    pub fn new(move_type: MoveType, road_range: u32) -> Self {
        Self { move_type, road_range }
    }

    /// Profile of a unit type moving on the standard road range
    pub fn for_unit(def: &UnitTypeDefinition, tuning: &Tuning) -> Self {
        Self::new(def.move_type, tuning.supply.road_range)
    }
}

/// A resolved supply route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    /// Source first, target last
    pub path: Vec<HexCoord>,
    pub total_cost: f32,
    /// Road hexes entered along the path
    pub road_steps: u32,
    pub travel_hours: f32,
}

/// Cost of entering `hex`, or `None` if the convoy cannot
fn edge_cost<M: SupplyMap + ?Sized>(map: &M, hex: HexCoord, profile: &UnitMoveProfile, tuning: &Tuning) -> Option<f32> {
    if !map.in_bounds(hex) {
        return None;
    }

    let supply = &tuning.supply;
    let cost = if map.is_road(hex) {
        let road = 1.0 / (1.0 + profile.road_range as f32 * supply.road_range_discount);
        road - supply.road_preference_bonus
    } else {
        match map.terrain_at(hex) {
            Some(terrain) => terrain.movement_cost(profile.move_type)?,
            None => 1.0,
        }
    };

    Some(cost.max(supply.min_edge_cost))
}

/// Travel time for a route: half an hour per cost point, shortened by up to
/// 30% for road travel
pub fn travel_hours(total_cost: f32, road_steps: u32, tuning: &Tuning) -> f32 {
    let supply = &tuning.supply;
    let bonus = (road_steps as f32 * supply.road_time_bonus_per_step).min(supply.road_time_bonus_cap);
    total_cost * supply.hours_per_cost * (1.0 - bonus)
}

/// Cheapest route from `source` to `target`.
///
/// Dijkstra over the map with road steps discounted by the profile's road
/// range. Returns `None` when the target cannot be reached within the
/// configured maximum route cost.
pub fn find_supply_route<M: SupplyMap + ?Sized>(
    source: HexCoord,
    target: HexCoord,
    network: &SupplyNetwork<M>,
    profile: &UnitMoveProfile,
    tuning: &Tuning,
) -> Option<RouteSummary> {
    if source == target {
        return Some(RouteSummary {
            path: vec![source],
            total_cost: 0.0,
            road_steps: 0,
            travel_hours: 0.0,
        });
    }

    let mut best: AHashMap<HexCoord, f32> = AHashMap::new();
    let mut came_from: AHashMap<HexCoord, HexCoord> = AHashMap::new();
    let mut settled: AHashSet<HexCoord> = AHashSet::new();
    let mut frontier = Frontier::new();

    best.insert(source, 0.0);
    frontier.push(source, 0.0);

    while let Some((current, cost)) = frontier.pop() {
        if current == target {
            let path = rebuild(&came_from, source, target);
            let road_steps = path.iter().skip(1).filter(|h| network.map.is_road(**h)).count() as u32;
            return Some(RouteSummary {
                travel_hours: travel_hours(cost, road_steps, tuning),
                path,
                total_cost: cost,
                road_steps,
            });
        }
        if !settled.insert(current) {
            continue;
        }

        for neighbor in current.neighbors() {
            if settled.contains(&neighbor) {
                continue;
            }
            let Some(step) = edge_cost(network.map, neighbor, profile, tuning) else {
                continue;
            };

            let next = cost + step;
            if next > tuning.supply.max_route_cost {
                continue;
            }
            if next < *best.get(&neighbor).unwrap_or(&f32::INFINITY) {
                best.insert(neighbor, next);
                came_from.insert(neighbor, current);
                frontier.push(neighbor, next);
            }
        }
    }

    tracing::debug!(%source, %target, "no supply route");
    None
}

fn rebuild(came_from: &AHashMap<HexCoord, HexCoord>, source: HexCoord, target: HexCoord) -> Vec<HexCoord> {
    let mut path = vec![target];
    let mut current = target;
    while current != source {
        match came_from.get(&current) {
            Some(&prev) => {
                path.push(prev);
                current = prev;
            }
            None => break,
        }
    }
    path.reverse();
    path
}
