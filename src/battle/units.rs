//! Per-instance unit state
//!
//! The turn engine owns these; the core reads them and, for supply
//! attrition only, mutates them in place.

use serde::{Deserialize, Serialize};

use crate::battle::hex::{HexCoord, HexDirection};
use crate::battle::unit_type::UnitTypeDefinition;
use crate::core::types::{Side, UnitId};

/// Maximum entrenchment pips
pub const ENTRENCH_MAX: u8 = 5;

/// Full strength
pub const STRENGTH_MAX: f32 = 100.0;

/// Mutable state of one unit on the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitRuntimeState {
    pub id: UnitId,
    pub type_key: String,
    pub side: Side,
    pub hex: HexCoord,
    /// 0.0 - 100.0
    pub strength: f32,
    /// Experience stars
    pub experience: u8,
    pub ammo: u32,
    pub fuel: u32,
    /// 0 - ENTRENCH_MAX
    pub entrenchment: u8,
    pub facing: HexDirection,
    /// Moved at full speed this turn; loses terrain cover
    #[serde(default)]
    pub rushing: bool,
}

impl UnitRuntimeState {
    /// Fresh unit at full strength with full ammo and fuel
    pub fn new(id: impl Into<UnitId>, def: &UnitTypeDefinition, side: Side, hex: HexCoord) -> Self {
        Self {
            id: id.into(),
            type_key: def.key.clone(),
            side,
            hex,
            strength: STRENGTH_MAX,
            experience: 0,
            ammo: def.ammo,
            fuel: def.fuel,
            entrenchment: 0,
            facing: HexDirection::default(),
            rushing: false,
        }
    }

    pub fn with_strength(mut self, strength: f32) -> Self {
        self.set_strength(strength);
        self
    }

    pub fn with_experience(mut self, stars: u8) -> Self {
        self.experience = stars;
        self
    }

    pub fn with_facing(mut self, facing: HexDirection) -> Self {
        self.facing = facing;
        self
    }

    pub fn with_supplies(mut self, ammo: u32, fuel: u32) -> Self {
        self.ammo = ammo;
        self.fuel = fuel;
        self
    }

    pub fn with_entrenchment(mut self, pips: u8) -> Self {
        self.entrenchment = pips.min(ENTRENCH_MAX);
        self
    }

    pub fn set_strength(&mut self, strength: f32) {
        self.strength = strength.clamp(0.0, STRENGTH_MAX);
    }

    pub fn is_destroyed(&self) -> bool {
        self.strength <= 0.0
    }

    pub fn has_ammo(&self) -> bool {
        self.ammo > 0
    }

    /// Clamp ammo/fuel to the type's capacity and entrenchment to the max
    pub fn clamp_to(&mut self, def: &UnitTypeDefinition) {
        self.ammo = self.ammo.min(def.ammo);
        self.fuel = self.fuel.min(def.fuel);
        self.entrenchment = self.entrenchment.min(ENTRENCH_MAX);
        self.set_strength(self.strength);
    }
}
