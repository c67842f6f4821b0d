//! Movement searches over the hex grid
//!
//! Dijkstra for "where can this unit get to this turn" and A* for "how does it
//! get there eventually". Both share a binary-heap frontier whose ties pop in
//! insertion order, so equal-cost results come out the same way every run.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ahash::{AHashMap, AHashSet};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::battle::hex::HexCoord;

const COST_EPSILON: f32 = 1e-6;

/// Entry in the open set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FrontierEntry {
    priority: OrderedFloat<f32>,
    seq: u64,
    hex: HexCoord,
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap; earlier insertion wins ties
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-priority queue of hexes with stable tie-breaks
#[derive(Debug, Default)]
pub struct Frontier {
    heap: BinaryHeap<FrontierEntry>,
    next_seq: u64,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, hex: HexCoord, priority: f32) {
        self.heap.push(FrontierEntry {
            priority: OrderedFloat(priority),
            seq: self.next_seq,
            hex,
        });
        self.next_seq += 1;
    }

    pub fn pop(&mut self) -> Option<(HexCoord, f32)> {
        self.heap.pop().map(|e| (e.hex, e.priority.into_inner()))
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

/// A hex a unit can end its move on, with the cheapest way there
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReachableHex {
    pub hex: HexCoord,
    pub cost: f32,
    /// Start hex first, `hex` last
    pub path: Vec<HexCoord>,
}

/// Rules for one reachability search
#[derive(Debug, Clone, Copy)]
pub struct MoveBudget {
    pub allowance: f32,
    /// Aircraft fly over occupied hexes but still cannot stop on them
    pub fly_over_occupied: bool,
}

impl MoveBudget {
    pub fn ground(allowance: f32) -> Self {
        Self {
            allowance,
            fly_over_occupied: false,
        }
    }
}

/// Every hex reachable from `start` within the allowance.
///
/// `step_cost` returns the cost of entering a hex or `None` if the unit cannot
/// enter it (off the map, impassable terrain). Occupied hexes are never
/// destinations. The start hex is always included at cost 0. Results are in
/// the order the search settles them.
pub fn reachable_hexes<C, O>(start: HexCoord, budget: MoveBudget, step_cost: C, occupied: O) -> Vec<ReachableHex>
where
    C: Fn(HexCoord) -> Option<f32>,
    O: Fn(HexCoord) -> bool,
{
    let mut best: AHashMap<HexCoord, f32> = AHashMap::new();
    let mut came_from: AHashMap<HexCoord, HexCoord> = AHashMap::new();
    let mut settled: AHashSet<HexCoord> = AHashSet::new();
    let mut order: Vec<(HexCoord, f32)> = Vec::new();
    let mut frontier = Frontier::new();

    best.insert(start, 0.0);
    frontier.push(start, 0.0);

    while let Some((hex, cost)) = frontier.pop() {
        if !settled.insert(hex) {
            continue;
        }

        if hex == start || !occupied(hex) {
            order.push((hex, cost));
        }

        for neighbor in hex.neighbors() {
            if settled.contains(&neighbor) {
                continue;
            }
            if neighbor != start && occupied(neighbor) && !budget.fly_over_occupied {
                continue;
            }
            let Some(step) = step_cost(neighbor) else {
                continue;
            };

            let next = cost + step.max(0.0);
            if next > budget.allowance + COST_EPSILON {
                continue;
            }

            if next + COST_EPSILON < *best.get(&neighbor).unwrap_or(&f32::INFINITY) {
                best.insert(neighbor, next);
                came_from.insert(neighbor, hex);
                frontier.push(neighbor, next);
            }
        }
    }

    order
        .into_iter()
        .map(|(hex, cost)| ReachableHex {
            hex,
            cost,
            path: reconstruct_path(&came_from, hex),
        })
        .collect()
}

/// Find path using A* algorithm
///
/// Ignores movement allowance; returns None if no path exists. The goal may
/// be occupied (approach paths end next to or on their target).
pub fn find_path<C, O>(start: HexCoord, goal: HexCoord, step_cost: C, occupied: O) -> Option<Vec<HexCoord>>
where
    C: Fn(HexCoord) -> Option<f32>,
    O: Fn(HexCoord) -> bool,
{
    if start == goal {
        return Some(vec![start]);
    }

    let mut open_set = Frontier::new();
    let mut came_from: AHashMap<HexCoord, HexCoord> = AHashMap::new();
    let mut g_scores: AHashMap<HexCoord, f32> = AHashMap::new();
    let mut closed: AHashSet<HexCoord> = AHashSet::new();

    g_scores.insert(start, 0.0);
    open_set.push(start, start.distance(&goal) as f32);

    while let Some((current, _)) = open_set.pop() {
        if current == goal {
            return Some(reconstruct_path(&came_from, current));
        }
        if !closed.insert(current) {
            continue;
        }

        let current_g = *g_scores.get(&current).unwrap_or(&f32::INFINITY);

        for neighbor in current.neighbors() {
            if neighbor != goal && occupied(neighbor) {
                continue;
            }
            let Some(move_cost) = step_cost(neighbor) else {
                continue;
            };

            let tentative_g = current_g + move_cost.max(0.0);
            if tentative_g + COST_EPSILON < *g_scores.get(&neighbor).unwrap_or(&f32::INFINITY) {
                came_from.insert(neighbor, current);
                g_scores.insert(neighbor, tentative_g);
                let f_cost = tentative_g + neighbor.distance(&goal) as f32;
                open_set.push(neighbor, f_cost);
            }
        }
    }

    None
}

fn reconstruct_path(came_from: &AHashMap<HexCoord, HexCoord>, mut current: HexCoord) -> Vec<HexCoord> {
    let mut path = vec![current];
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}
