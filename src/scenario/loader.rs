//! Resolve a snapshot's string keys into runtime values

use crate::battle::ai::{Battlefield, PlannerInput};
use crate::battle::battle_map::{BattleMap, Objective, MAX_MAP_HEXES};
use crate::battle::combat::Combatant;
use crate::battle::hex::HexCoord;
use crate::battle::terrain::TerrainKind;
use crate::battle::unit_type::UnitCatalog;
use crate::battle::units::UnitRuntimeState;
use crate::core::config::Tuning;
use crate::core::error::{FrontlineError, Result};
use crate::core::types::{Difficulty, Side};
use crate::scenario::snapshot::{Scenario, UnitSpec};

/// A snapshot with every key checked against the catalogs
#[derive(Debug, Clone)]
pub struct ResolvedScenario {
    pub name: String,
    pub difficulty: Difficulty,
    /// Carries the objectives
    pub map: BattleMap,
    pub units: Vec<UnitRuntimeState>,
    pub player_sources: Vec<HexCoord>,
    pub bot_sources: Vec<HexCoord>,
}

impl Scenario {
    /// Build the runtime map and units.
    ///
    /// Fails on an oversized map, then on the first malformed hex key,
    /// unknown terrain key or unknown unit type.
    pub fn resolve(&self, catalog: &UnitCatalog) -> Result<ResolvedScenario> {
        let (width, height) = (self.map.width, self.map.height);
        if width as usize * height as usize > MAX_MAP_HEXES {
            return Err(FrontlineError::MapTooLarge {
                width,
                height,
                max: MAX_MAP_HEXES,
            });
        }

        let base: TerrainKind = self.map.terrain.parse()?;
        let mut map = BattleMap::filled(width, height, base);

        for (key, terrain) in &self.map.overrides {
            map.set_terrain(key.parse()?, terrain.parse()?);
        }
        for key in &self.map.roads {
            map.set_road(key.parse()?, true);
        }
        for spec in &self.objectives {
            let mut objective = Objective::new(spec.hex.parse()?, spec.name.clone(), spec.vp);
            objective.controller = spec.controller;
            map.add_objective(objective);
        }

        let units = self
            .units
            .iter()
            .map(|spec| resolve_unit(spec, catalog))
            .collect::<Result<Vec<_>>>()?;

        Ok(ResolvedScenario {
            name: self.name.clone(),
            difficulty: self.difficulty,
            map,
            units,
            player_sources: parse_hexes(self.supply.for_side(Side::Player))?,
            bot_sources: parse_hexes(self.supply.for_side(Side::Bot))?,
        })
    }
}

fn resolve_unit(spec: &UnitSpec, catalog: &UnitCatalog) -> Result<UnitRuntimeState> {
    let def = catalog
        .get(&spec.unit_type)
        .ok_or_else(|| FrontlineError::UnknownUnitType(spec.unit_type.clone()))?;

    let mut unit = UnitRuntimeState::new(spec.id.as_str(), def, spec.side, spec.hex.parse()?)
        .with_experience(spec.experience)
        .with_entrenchment(spec.entrenchment)
        .with_facing(spec.facing);
    if let Some(strength) = spec.strength {
        unit.set_strength(strength);
    }
    if let Some(ammo) = spec.ammo {
        unit.ammo = ammo;
    }
    if let Some(fuel) = spec.fuel {
        unit.fuel = fuel;
    }
    unit.clamp_to(def);
    Ok(unit)
}

fn parse_hexes(keys: &[String]) -> Result<Vec<HexCoord>> {
    keys.iter().map(|key| key.parse()).collect()
}

impl ResolvedScenario {
    pub fn unit(&self, id: &str) -> Result<&UnitRuntimeState> {
        self.units
            .iter()
            .find(|u| u.id.as_str() == id)
            .ok_or_else(|| FrontlineError::UnknownUnit(id.to_string()))
    }

    pub fn sources(&self, side: Side) -> &[HexCoord] {
        match side {
            Side::Player => &self.player_sources,
            Side::Bot => &self.bot_sources,
        }
    }

    pub fn objectives(&self) -> &[Objective] {
        &self.map.objectives
    }

    /// Units of `side` paired with their definitions
    pub fn combatants<'a>(&'a self, catalog: &'a UnitCatalog, side: Side) -> Vec<Combatant<'a>> {
        self.units
            .iter()
            .filter(|u| u.side == side)
            .filter_map(|u| catalog.get(&u.type_key).map(|def| Combatant::new(def, u)))
            .collect()
    }

    /// Planner input for the bot side
    pub fn planner_input<'a>(
        &'a self,
        catalog: &'a UnitCatalog,
        battlefield: &'a dyn Battlefield,
        tuning: &'a Tuning,
    ) -> PlannerInput<'a> {
        let side = Side::Bot;
        PlannerInput::new(
            self.combatants(catalog, side),
            self.combatants(catalog, side.opponent()),
            self.objectives(),
            self.difficulty,
            battlefield,
            tuning,
        )
    }
}
