//! Battle map with hex grid, terrain, roads and objectives
//!
//! The map is the reference implementation of every read-only accessor the
//! engines consume: terrain lookup, bounds, roads and passability.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::battle::hex::HexCoord;
use crate::battle::terrain::{TerrainDefinition, TerrainKind, TerrainLookup};
use crate::battle::unit_type::UnitClass;
use crate::battle::visibility::is_visible;
use crate::core::types::Side;

/// Largest map a scenario may declare, in hexes
pub const MAX_MAP_HEXES: usize = 65_536;

/// A single hex on the battle map
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BattleHex {
    pub coord: HexCoord,
    pub terrain: TerrainKind,
    /// Road overlay; supply lines and trucks travel these cheaply
    pub road: bool,
}

impl BattleHex {
    pub fn new(coord: HexCoord, terrain: TerrainKind) -> Self {
        Self {
            coord,
            terrain,
            road: terrain == TerrainKind::Road,
        }
    }

    pub fn definition(&self) -> TerrainDefinition {
        self.terrain.definition()
    }
}

/// Objective on the battle map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    pub hex: HexCoord,
    pub name: String,
    pub victory_points: u32,
    /// Side currently holding the objective
    #[serde(default)]
    pub controller: Option<Side>,
}

impl Objective {
    pub fn new(hex: HexCoord, name: impl Into<String>, victory_points: u32) -> Self {
        Self {
            hex,
            name: name.into(),
            victory_points,
            controller: None,
        }
    }

    pub fn held_by(mut self, side: Side) -> Self {
        self.controller = Some(side);
        self
    }

    /// Still worth taking for `side`
    pub fn is_active_for(&self, side: Side) -> bool {
        self.controller != Some(side)
    }
}

/// The full battle map
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleMap {
    pub hexes: AHashMap<HexCoord, BattleHex>,
    pub width: u32,
    pub height: u32,
    pub objectives: Vec<Objective>,
}

impl BattleMap {
    /// Create a new battle map with open terrain
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, TerrainKind::Plains)
    }

    /// Create a map covered in one terrain type
    pub fn filled(width: u32, height: u32, terrain: TerrainKind) -> Self {
        let mut hexes = AHashMap::with_capacity(width as usize * height as usize);

        for q in 0..width as i32 {
            for r in 0..height as i32 {
                let coord = HexCoord::new(q, r);
                hexes.insert(coord, BattleHex::new(coord, terrain));
            }
        }

        Self {
            hexes,
            width,
            height,
            objectives: Vec::new(),
        }
    }

    /// Get a hex at the given coordinate
    pub fn get_hex(&self, coord: HexCoord) -> Option<&BattleHex> {
        self.hexes.get(&coord)
    }

    /// Get a mutable hex at the given coordinate
    pub fn get_hex_mut(&mut self, coord: HexCoord) -> Option<&mut BattleHex> {
        self.hexes.get_mut(&coord)
    }

    /// Check if coordinate is within map bounds
    pub fn in_bounds(&self, coord: HexCoord) -> bool {
        coord.q >= 0
            && coord.r >= 0
            && coord.q < self.width as i32
            && coord.r < self.height as i32
    }

    /// Set terrain at a coordinate
    pub fn set_terrain(&mut self, coord: HexCoord, terrain: TerrainKind) {
        if let Some(hex) = self.get_hex_mut(coord) {
            hex.terrain = terrain;
            if terrain == TerrainKind::Road {
                hex.road = true;
            }
        }
    }

    /// Lay or lift a road overlay
    pub fn set_road(&mut self, coord: HexCoord, road: bool) {
        if let Some(hex) = self.get_hex_mut(coord) {
            hex.road = road;
        }
    }

    pub fn is_road(&self, coord: HexCoord) -> bool {
        self.get_hex(coord).is_some_and(|h| h.road)
    }

    pub fn add_objective(&mut self, objective: Objective) {
        self.objectives.push(objective);
    }

    /// All hexes within `range` that a unit of `class` at `from` can see
    pub fn visible_hexes(&self, from: HexCoord, range: u32, class: UnitClass, airborne: bool) -> Vec<HexCoord> {
        from.hexes_in_range(range)
            .into_iter()
            .filter(|coord| self.in_bounds(*coord) && is_visible(from, *coord, class, airborne, self))
            .collect()
    }
}

impl TerrainLookup for BattleMap {
    fn terrain_at(&self, hex: HexCoord) -> Option<TerrainDefinition> {
        self.get_hex(hex).map(BattleHex::definition)
    }
}
