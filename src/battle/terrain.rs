//! Terrain types and their effects
//!
//! Terrain is a closed catalog: every hex on a map names one `TerrainKind`,
//! and each kind has one immutable `TerrainDefinition` shared by the LOS,
//! combat, supply and planning code.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::battle::hex::HexCoord;
use crate::core::error::FrontlineError;

/// How a unit travels; selects the terrain movement cost column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MoveType {
    #[default]
    Leg,
    Wheel,
    Track,
    Air,
}

/// Movement cost per move type; `None` = impassable
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoveCosts {
    pub leg: Option<f32>,
    pub wheel: Option<f32>,
    pub track: Option<f32>,
    pub air: Option<f32>,
}

impl MoveCosts {
    pub const fn new(leg: Option<f32>, wheel: Option<f32>, track: Option<f32>, air: Option<f32>) -> Self {
        Self { leg, wheel, track, air }
    }

    pub fn cost_for(&self, move_type: MoveType) -> Option<f32> {
        match move_type {
            MoveType::Leg => self.leg,
            MoveType::Wheel => self.wheel,
            MoveType::Track => self.track,
            MoveType::Air => self.air,
        }
    }
}

/// Terrain catalog key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TerrainKind {
    #[default]
    Plains,
    Road,
    Forest,
    Hill,
    Mountain,
    Urban,
    Bocage,
    Marsh,
    River,
    Beach,
    Water,
    FortificationLight,
    FortificationHeavy,
}

/// Static profile of a terrain type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerrainDefinition {
    pub kind: TerrainKind,
    pub movement: MoveCosts,
    /// Flat defense bonus for units standing here
    pub defense: i32,
    /// Percent change to incoming accuracy (negative = harder to hit)
    pub accuracy_modifier: i32,
    pub blocks_los: bool,
}

/// (defense, accuracy_modifier) profiles of raised ground: hill, mountain
const ELEVATED_SIGNATURES: [(i32, i32); 2] = [(2, -10), (3, -25)];

impl TerrainDefinition {
    /// Terrain assumed where a lookup has no data: passable, no modifiers
    pub fn fallback() -> Self {
        TerrainKind::Plains.definition()
    }

    /// Is this raised ground (hill/mountain)?
    pub fn is_elevated(&self) -> bool {
        ELEVATED_SIGNATURES.contains(&(self.defense, self.accuracy_modifier))
    }

    pub fn movement_cost(&self, move_type: MoveType) -> Option<f32> {
        self.movement.cost_for(move_type)
    }

    pub fn is_passable_for(&self, move_type: MoveType) -> bool {
        self.movement_cost(move_type).is_some()
    }
}

impl TerrainKind {
    pub fn all() -> [TerrainKind; 13] {
        [
            TerrainKind::Plains,
            TerrainKind::Road,
            TerrainKind::Forest,
            TerrainKind::Hill,
            TerrainKind::Mountain,
            TerrainKind::Urban,
            TerrainKind::Bocage,
            TerrainKind::Marsh,
            TerrainKind::River,
            TerrainKind::Beach,
            TerrainKind::Water,
            TerrainKind::FortificationLight,
            TerrainKind::FortificationHeavy,
        ]
    }

    /// Built-in definition for this terrain
    pub fn definition(&self) -> TerrainDefinition {
        let (movement, defense, accuracy_modifier, blocks_los) = match self {
            TerrainKind::Plains => (MoveCosts::new(Some(1.0), Some(1.0), Some(1.0), Some(1.0)), 0, 0, false),
            TerrainKind::Road => (MoveCosts::new(Some(1.0), Some(1.0), Some(1.0), Some(1.0)), 0, 0, false),
            TerrainKind::Forest => (MoveCosts::new(Some(2.0), Some(3.0), Some(2.0), Some(1.0)), 2, -20, true),
            TerrainKind::Hill => (MoveCosts::new(Some(2.0), Some(2.0), Some(2.0), Some(1.0)), 2, -10, true),
            TerrainKind::Mountain => (MoveCosts::new(Some(3.0), None, Some(4.0), Some(1.0)), 3, -25, true),
            TerrainKind::Urban => (MoveCosts::new(Some(1.0), Some(1.0), Some(2.0), Some(1.0)), 3, -20, true),
            TerrainKind::Bocage => (MoveCosts::new(Some(2.0), Some(3.0), Some(3.0), Some(1.0)), 2, -15, true),
            TerrainKind::Marsh => (MoveCosts::new(Some(3.0), None, Some(3.0), Some(1.0)), -1, 0, false),
            TerrainKind::River => (MoveCosts::new(Some(3.0), None, None, Some(1.0)), -1, 0, false),
            TerrainKind::Beach => (MoveCosts::new(Some(2.0), Some(2.0), Some(2.0), Some(1.0)), -1, 0, false),
            TerrainKind::Water => (MoveCosts::new(None, None, None, Some(1.0)), 0, 0, false),
            TerrainKind::FortificationLight => {
                (MoveCosts::new(Some(1.0), Some(2.0), Some(2.0), Some(1.0)), 3, -15, false)
            }
            TerrainKind::FortificationHeavy => {
                (MoveCosts::new(Some(2.0), None, Some(3.0), Some(1.0)), 4, -30, true)
            }
        };

        TerrainDefinition {
            kind: *self,
            movement,
            defense,
            accuracy_modifier,
            blocks_los,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            TerrainKind::Plains => "plains",
            TerrainKind::Road => "road",
            TerrainKind::Forest => "forest",
            TerrainKind::Hill => "hill",
            TerrainKind::Mountain => "mountain",
            TerrainKind::Urban => "urban",
            TerrainKind::Bocage => "bocage",
            TerrainKind::Marsh => "marsh",
            TerrainKind::River => "river",
            TerrainKind::Beach => "beach",
            TerrainKind::Water => "water",
            TerrainKind::FortificationLight => "fortification_light",
            TerrainKind::FortificationHeavy => "fortification_heavy",
        }
    }
}

impl fmt::Display for TerrainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for TerrainKind {
    type Err = FrontlineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        TerrainKind::all()
            .into_iter()
            .find(|kind| kind.key() == key)
            .ok_or_else(|| FrontlineError::UnknownTerrain(s.to_string()))
    }
}

/// Read access to the terrain of a hex.
///
/// Returning `None` means "no data"; callers treat that as open,
/// non-blocking terrain.
pub trait TerrainLookup {
    fn terrain_at(&self, hex: HexCoord) -> Option<TerrainDefinition>;

    fn terrain_or_fallback(&self, hex: HexCoord) -> TerrainDefinition {
        self.terrain_at(hex).unwrap_or_else(TerrainDefinition::fallback)
    }
}

impl<F> TerrainLookup for F
where
    F: Fn(HexCoord) -> Option<TerrainDefinition>,
{
    fn terrain_at(&self, hex: HexCoord) -> Option<TerrainDefinition> {
        self(hex)
    }
}
