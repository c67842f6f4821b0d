//! Unit classes and the static unit-type catalog
//!
//! A unit type is an immutable combat profile. Scenarios refer to types by
//! key (`"Panzer_IV"`), the engines work on resolved `UnitTypeDefinition`s.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::battle::terrain::MoveType;

/// Broad unit class; selects accuracy curves, shot counts and damage tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitClass {
    Infantry,
    Engineer,
    Recon,
    Vehicle,
    Tank,
    AntiTank,
    Artillery,
    Air,
    Bomber,
}

impl UnitClass {
    pub fn all() -> [UnitClass; 9] {
        [
            UnitClass::Infantry,
            UnitClass::Engineer,
            UnitClass::Recon,
            UnitClass::Vehicle,
            UnitClass::Tank,
            UnitClass::AntiTank,
            UnitClass::Artillery,
            UnitClass::Air,
            UnitClass::Bomber,
        ]
    }

    /// Air classes that can strike ground targets
    pub fn is_strike_air(&self) -> bool {
        matches!(self, UnitClass::Air | UnitClass::Bomber)
    }

    /// Plunging fire / air attack: always hits top armor
    pub fn is_top_attack(&self) -> bool {
        matches!(self, UnitClass::Artillery | UnitClass::Air | UnitClass::Bomber)
    }

    /// Default target softness for attacks against this class
    pub fn is_soft_target(&self) -> bool {
        matches!(
            self,
            UnitClass::Infantry | UnitClass::Engineer | UnitClass::Recon | UnitClass::Artillery
        )
    }
}

/// Armor values by facing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Armor {
    pub front: u32,
    pub side: u32,
    pub top: u32,
}

impl Armor {
    pub const fn new(front: u32, side: u32, top: u32) -> Self {
        Self { front, side, top }
    }
}

/// Special rules carried by a unit type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitTrait {
    /// Exerts zone of control on adjacent hexes (enforced by the turn engine)
    ZoneOfControl,
    /// Flies: uses airborne line of sight and ignores ground occupancy rules
    Airborne,
    /// Shares what it sees with every friendly unit
    Spotter,
    /// Can fly standing combat air patrols
    CombatAirPatrol,
}

/// Static combat profile of a unit type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitTypeDefinition {
    pub key: String,
    pub class: UnitClass,
    pub movement: u32,
    pub move_type: MoveType,
    pub vision: u32,
    pub ammo: u32,
    pub fuel: u32,
    pub range_min: u32,
    pub range_max: u32,
    pub armor: Armor,
    pub hard_attack: u32,
    pub soft_attack: u32,
    /// Armor penetration before experience
    pub ap: u32,
    pub accuracy_base: f32,
    #[serde(default)]
    pub traits: Vec<UnitTrait>,
    pub cost: u32,
}

impl UnitTypeDefinition {
    pub fn has_trait(&self, t: UnitTrait) -> bool {
        self.traits.contains(&t)
    }

    pub fn is_airborne(&self) -> bool {
        self.move_type == MoveType::Air || self.has_trait(UnitTrait::Airborne)
    }

    /// Can this type engage a target at `distance` hexes?
    pub fn in_range(&self, distance: u32) -> bool {
        distance >= self.range_min && distance <= self.range_max
    }

    /// Does this type reveal enemies for the whole side?
    pub fn is_spotter(&self) -> bool {
        self.class == UnitClass::Recon || self.is_airborne() || self.has_trait(UnitTrait::Spotter)
    }
}

/// Lookup table of unit types by key
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnitCatalog {
    types: AHashMap<String, UnitTypeDefinition>,
}

impl UnitCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in WWII roster
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        for def in standard_roster() {
            catalog.insert(def);
        }
        catalog
    }

    pub fn insert(&mut self, def: UnitTypeDefinition) {
        self.types.insert(def.key.clone(), def);
    }

    pub fn get(&self, key: &str) -> Option<&UnitTypeDefinition> {
        self.types.get(key)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Keys in sorted order
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.types.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

#[allow(clippy::too_many_arguments)]
fn def(
    key: &str,
    class: UnitClass,
    movement: u32,
    move_type: MoveType,
    vision: u32,
    (ammo, fuel): (u32, u32),
    (range_min, range_max): (u32, u32),
    armor: Armor,
    (hard_attack, soft_attack, ap): (u32, u32, u32),
    accuracy_base: f32,
    traits: &[UnitTrait],
    cost: u32,
) -> UnitTypeDefinition {
    UnitTypeDefinition {
        key: key.to_string(),
        class,
        movement,
        move_type,
        vision,
        ammo,
        fuel,
        range_min,
        range_max,
        armor,
        hard_attack,
        soft_attack,
        ap,
        accuracy_base,
        traits: traits.to_vec(),
        cost,
    }
}

fn standard_roster() -> Vec<UnitTypeDefinition> {
    use MoveType::{Leg, Track, Wheel};
    use UnitClass::*;
    use UnitTrait::*;

    vec![
        def("Infantry_42", Infantry, 3, Leg, 3, (6, 0), (1, 1), Armor::new(1, 1, 1), (2, 6, 2), 60.0, &[ZoneOfControl], 100),
        def("Infantry_Elite", Infantry, 3, Leg, 4, (7, 0), (1, 1), Armor::new(2, 2, 1), (3, 8, 3), 65.0, &[ZoneOfControl], 160),
        def("Engineers_43", Engineer, 3, Leg, 3, (5, 0), (1, 1), Armor::new(1, 1, 1), (6, 7, 6), 60.0, &[ZoneOfControl], 140),
        def("Recon_Scout", Recon, 6, Wheel, 6, (5, 8), (1, 1), Armor::new(2, 1, 1), (2, 4, 3), 55.0, &[Spotter], 120),
        def("Supply_Truck", Vehicle, 6, Wheel, 2, (0, 10), (0, 0), Armor::new(1, 1, 0), (0, 0, 0), 0.0, &[], 80),
        def("Panzer_IV", Tank, 5, Track, 3, (8, 8), (1, 2), Armor::new(8, 4, 2), (9, 6, 9), 70.0, &[ZoneOfControl], 350),
        def("Sherman_M4", Tank, 5, Track, 3, (8, 9), (1, 2), Armor::new(7, 4, 2), (8, 7, 8), 70.0, &[ZoneOfControl], 320),
        def("Pak_40", AntiTank, 2, Leg, 3, (7, 0), (1, 2), Armor::new(3, 1, 0), (12, 3, 11), 75.0, &[], 200),
        def("Artillery_105mm", Artillery, 2, Wheel, 2, (6, 6), (2, 6), Armor::new(0, 0, 0), (6, 10, 6), 55.0, &[], 250),
        def("Artillery_155mm", Artillery, 1, Wheel, 2, (5, 6), (3, 8), Armor::new(0, 0, 0), (8, 12, 8), 50.0, &[], 320),
        def("Recon_Plane", Recon, 10, MoveType::Air, 8, (2, 6), (1, 1), Armor::new(0, 0, 0), (1, 2, 1), 40.0, &[Airborne, Spotter], 180),
        def("Interceptor", Air, 10, MoveType::Air, 5, (4, 5), (1, 1), Armor::new(1, 1, 1), (6, 5, 6), 60.0, &[Airborne, CombatAirPatrol], 300),
        def("Bomber", Bomber, 8, MoveType::Air, 4, (3, 6), (1, 1), Armor::new(2, 2, 2), (12, 14, 10), 50.0, &[Airborne], 400),
    ]
}
