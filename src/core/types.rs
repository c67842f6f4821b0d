//! Core type definitions used throughout the codebase

use std::fmt;
use std::str::FromStr;

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

use crate::core::error::FrontlineError;

/// Identifier of a unit instance within a battle (scenario-assigned)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From)]
#[serde(transparent)]
pub struct UnitId(pub String);

impl UnitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UnitId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Which side of the battle a unit or objective belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Player,
    Bot,
}

impl Side {
    pub fn opponent(&self) -> Self {
        match self {
            Side::Player => Side::Bot,
            Side::Bot => Side::Player,
        }
    }
}

/// Bot difficulty setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn all() -> [Difficulty; 3] {
        [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard]
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        };
        f.write_str(name)
    }
}

impl FromStr for Difficulty {
    type Err = FrontlineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "normal" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(FrontlineError::UnknownDifficulty(s.to_string())),
        }
    }
}

/// Commander-granted combat bonuses, in percent
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CommanderBonus {
    pub accuracy_pct: f32,
    pub damage_pct: f32,
}

impl CommanderBonus {
    pub fn new(accuracy_pct: f32, damage_pct: f32) -> Self {
        Self {
            accuracy_pct,
            damage_pct,
        }
    }

    pub fn accuracy_scalar(&self) -> f32 {
        1.0 + self.accuracy_pct / 100.0
    }

    pub fn damage_scalar(&self) -> f32 {
        (1.0 + self.damage_pct / 100.0).max(0.0)
    }
}
