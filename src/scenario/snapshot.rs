//! Serialized scenario layout

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::battle::hex::HexDirection;
use crate::core::error::{FrontlineError, Result};
use crate::core::types::{Difficulty, Side};

/// A battle snapshot as written on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub map: MapSpec,
    #[serde(default)]
    pub units: Vec<UnitSpec>,
    #[serde(default)]
    pub objectives: Vec<ObjectiveSpec>,
    #[serde(default)]
    pub supply: SupplySpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSpec {
    pub width: u32,
    pub height: u32,
    /// Terrain key for every hex not overridden
    #[serde(default = "default_terrain")]
    pub terrain: String,
    /// `"q,r"` -> terrain key
    #[serde(default)]
    pub overrides: BTreeMap<String, String>,
    /// `"q,r"` keys of road hexes
    #[serde(default)]
    pub roads: Vec<String>,
}

fn default_terrain() -> String {
    "plains".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSpec {
    pub id: String,
    #[serde(rename = "type")]
    pub unit_type: String,
    pub side: Side,
    pub hex: String,
    /// Full strength if omitted
    #[serde(default)]
    pub strength: Option<f32>,
    #[serde(default)]
    pub experience: u8,
    /// Full load if omitted
    #[serde(default)]
    pub ammo: Option<u32>,
    #[serde(default)]
    pub fuel: Option<u32>,
    #[serde(default)]
    pub entrenchment: u8,
    #[serde(default)]
    pub facing: HexDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveSpec {
    pub hex: String,
    pub name: String,
    #[serde(alias = "victory_points")]
    pub vp: u32,
    #[serde(default)]
    pub controller: Option<Side>,
}

/// Supply source hexes per side
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupplySpec {
    #[serde(default)]
    pub player: Vec<String>,
    #[serde(default)]
    pub bot: Vec<String>,
}

impl SupplySpec {
    pub fn for_side(&self, side: Side) -> &[String] {
        match side {
            Side::Player => &self.player,
            Side::Bot => &self.bot,
        }
    }
}

impl Scenario {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_toml_str(toml: &str) -> Result<Self> {
        Ok(toml::from_str(toml)?)
    }

    /// Load a snapshot from disk; the format follows the file extension
    pub fn load(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let parse: fn(&str) -> Result<Self> = match extension.as_str() {
            "json" => Self::from_json_str,
            "toml" => Self::from_toml_str,
            _ => return Err(FrontlineError::UnsupportedFormat(path.display().to_string())),
        };
        parse(&std::fs::read_to_string(path)?)
    }
}
