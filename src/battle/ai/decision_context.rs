//! The bot's view of the battle for one planning pass
//!
//! `PlannerInput` is what the turn engine hands over; `DecisionContext` adds
//! the per-pass derived facts (difficulty weights, which enemies are spotted)
//! that every scoring rule reads.

use ahash::{AHashMap, AHashSet};

use crate::battle::ai::Battlefield;
use crate::battle::battle_map::{BattleMap, Objective};
use crate::battle::combat::{estimate_exchange, CombatPenalty, Combatant, ExchangeContext, ExchangeEstimate};
use crate::battle::hex::HexCoord;
use crate::battle::terrain::{MoveType, TerrainDefinition, TerrainLookup};
use crate::battle::unit_type::UnitTypeDefinition;
use crate::battle::visibility::is_visible;
use crate::core::config::{DifficultyWeights, Tuning};
use crate::core::types::{Difficulty, Side, UnitId};

/// Which side stands on which hex
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Occupancy {
    hexes: AHashMap<HexCoord, Side>,
}

impl Occupancy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Occupancy of every living unit
    pub fn from_units<'u>(units: impl IntoIterator<Item = Combatant<'u>>) -> Self {
        let mut occupancy = Self::new();
        for unit in units {
            if !unit.state.is_destroyed() {
                occupancy.occupy(unit.state.hex, unit.state.side);
            }
        }
        occupancy
    }

    pub fn occupy(&mut self, hex: HexCoord, side: Side) {
        self.hexes.insert(hex, side);
    }

    pub fn vacate(&mut self, hex: HexCoord) {
        self.hexes.remove(&hex);
    }

    pub fn side_at(&self, hex: HexCoord) -> Option<Side> {
        self.hexes.get(&hex).copied()
    }

    pub fn is_occupied(&self, hex: HexCoord) -> bool {
        self.hexes.contains_key(&hex)
    }
}

/// Battlefield backed by a `BattleMap` and the built-in engines
#[derive(Debug, Clone)]
pub struct StandardBattlefield<'a> {
    pub map: &'a BattleMap,
    pub tuning: &'a Tuning,
    /// Conditions applied to every estimated exchange
    pub exchange: ExchangeContext,
}

impl<'a> StandardBattlefield<'a> {
    pub fn new(map: &'a BattleMap, tuning: &'a Tuning) -> Self {
        Self {
            map,
            tuning,
            exchange: ExchangeContext::default(),
        }
    }

    /// Apply the difficulty's combat handicap to the bot's own attacks
    pub fn for_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.exchange.attacker_penalty = CombatPenalty::from_difficulty(self.tuning.difficulty.get(difficulty));
        self
    }

    pub fn with_exchange(mut self, exchange: ExchangeContext) -> Self {
        self.exchange = exchange;
        self
    }
}

impl Battlefield for StandardBattlefield<'_> {
    fn in_bounds(&self, hex: HexCoord) -> bool {
        self.map.in_bounds(hex)
    }

    fn terrain_at(&self, hex: HexCoord) -> Option<TerrainDefinition> {
        self.map.terrain_at(hex)
    }

    fn movement_cost(&self, hex: HexCoord, move_type: MoveType) -> Option<f32> {
        if !self.map.in_bounds(hex) {
            return None;
        }
        // Roads and bridges carry ground traffic at the base rate
        if move_type != MoveType::Air && self.map.is_road(hex) {
            return Some(1.0);
        }
        self.map.terrain_or_fallback(hex).movement_cost(move_type)
    }

    fn los_allows(&self, from: HexCoord, to: HexCoord, viewer: &UnitTypeDefinition) -> bool {
        is_visible(from, to, viewer.class, viewer.is_airborne(), self.map)
    }

    fn estimate_attack(&self, attacker: Combatant, from: HexCoord, defender: Combatant) -> ExchangeEstimate {
        estimate_exchange(attacker, from, defender, self.map, &self.exchange, self.tuning)
    }
}

/// Everything one bot turn is planned from
pub struct PlannerInput<'a> {
    pub bot_units: Vec<Combatant<'a>>,
    pub enemy_units: Vec<Combatant<'a>>,
    pub objectives: &'a [Objective],
    pub occupancy: Occupancy,
    pub difficulty: Difficulty,
    pub battlefield: &'a dyn Battlefield,
    pub tuning: &'a Tuning,
}

impl<'a> PlannerInput<'a> {
    /// Input with occupancy derived from the two unit lists
    pub fn new(
        bot_units: Vec<Combatant<'a>>,
        enemy_units: Vec<Combatant<'a>>,
        objectives: &'a [Objective],
        difficulty: Difficulty,
        battlefield: &'a dyn Battlefield,
        tuning: &'a Tuning,
    ) -> Self {
        let occupancy = Occupancy::from_units(bot_units.iter().chain(enemy_units.iter()).copied());
        Self {
            bot_units,
            enemy_units,
            objectives,
            occupancy,
            difficulty,
            battlefield,
            tuning,
        }
    }
}

/// Per-pass facts shared by every scoring rule
pub struct DecisionContext<'a> {
    pub input: &'a PlannerInput<'a>,
    pub weights: &'a DifficultyWeights,
    /// Enemies some friendly air or recon unit can currently see
    spotted: AHashSet<UnitId>,
}

impl<'a> DecisionContext<'a> {
    pub fn new(input: &'a PlannerInput<'a>) -> Self {
        let weights = input.tuning.difficulty.get(input.difficulty);
        let mut context = Self {
            input,
            weights,
            spotted: AHashSet::new(),
        };

        let spotted: AHashSet<UnitId> = input
            .enemy_units
            .iter()
            .filter(|enemy| !enemy.state.is_destroyed())
            .filter(|enemy| {
                context
                    .living_allies()
                    .filter(|ally| ally.def.is_spotter())
                    .any(|ally| context.can_see(*ally, ally.state.hex, enemy.state.hex))
            })
            .map(|enemy| enemy.state.id.clone())
            .collect();
        context.spotted = spotted;
        context
    }

    pub fn battlefield(&self) -> &'a dyn Battlefield {
        self.input.battlefield
    }

    pub fn tuning(&self) -> &'a Tuning {
        self.input.tuning
    }

    pub fn tactical_enabled(&self) -> bool {
        self.weights.tactical_enabled
    }

    pub fn living_allies(&self) -> impl Iterator<Item = &Combatant<'a>> + '_ {
        self.input.bot_units.iter().filter(|u| !u.state.is_destroyed())
    }

    /// Other living bot units
    pub fn allies_of<'s>(&'s self, unit: &'s UnitId) -> impl Iterator<Item = &'s Combatant<'a>> + 's {
        self.living_allies().filter(move |u| &u.state.id != unit)
    }

    pub fn living_enemies(&self) -> impl Iterator<Item = &Combatant<'a>> + '_ {
        self.input.enemy_units.iter().filter(|u| !u.state.is_destroyed())
    }

    /// Objectives the bot still wants
    pub fn active_objectives(&self) -> impl Iterator<Item = &'a Objective> + 'a {
        active_for_bot(self.input.objectives)
    }

    pub fn nearest_active_objective(&self, from: HexCoord) -> Option<&'a Objective> {
        // min_by_key keeps the first of equals
        self.active_objectives().min_by_key(|o| from.distance(&o.hex))
    }

    /// Within vision range and line of sight
    pub fn can_see(&self, viewer: Combatant, from: HexCoord, target: HexCoord) -> bool {
        from.distance(&target) <= viewer.def.vision && self.battlefield().los_allows(from, target, viewer.def)
    }

    pub fn is_spotted(&self, enemy: &UnitId) -> bool {
        self.spotted.contains(enemy)
    }
}

fn active_for_bot(objectives: &[Objective]) -> impl Iterator<Item = &Objective> {
    objectives.iter().filter(|o| o.is_active_for(Side::Bot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::terrain::TerrainKind;
    use crate::battle::unit_type::UnitCatalog;
    use crate::battle::units::UnitRuntimeState;

    #[test]
    fn test_occupancy_tracks_living_units() {
        let catalog = UnitCatalog::standard();
        let def = catalog.get("Infantry_42").unwrap();
        let alive = UnitRuntimeState::new("a", def, Side::Bot, HexCoord::new(1, 1));
        let dead = UnitRuntimeState::new("d", def, Side::Player, HexCoord::new(2, 2)).with_strength(0.0);

        let mut occupancy = Occupancy::from_units([Combatant::new(def, &alive), Combatant::new(def, &dead)]);
        assert_eq!(occupancy.side_at(HexCoord::new(1, 1)), Some(Side::Bot));
        assert!(!occupancy.is_occupied(HexCoord::new(2, 2)));

        occupancy.vacate(HexCoord::new(1, 1));
        assert!(!occupancy.is_occupied(HexCoord::new(1, 1)));
    }

    #[test]
    fn test_roads_bridge_rivers() {
        let mut map = BattleMap::new(5, 5);
        map.set_terrain(HexCoord::new(2, 2), TerrainKind::River);
        let tuning = Tuning::default();
        let field = StandardBattlefield::new(&map, &tuning);
        assert_eq!(field.movement_cost(HexCoord::new(2, 2), MoveType::Wheel), None);

        map.set_road(HexCoord::new(2, 2), true);
        let field = StandardBattlefield::new(&map, &tuning);
        assert_eq!(field.movement_cost(HexCoord::new(2, 2), MoveType::Wheel), Some(1.0));
        assert_eq!(field.movement_cost(HexCoord::new(9, 9), MoveType::Leg), None);
    }

    #[test]
    fn test_exchange_conditions_reach_estimates() {
        let map = BattleMap::new(6, 6);
        let tuning = Tuning::default();
        let catalog = UnitCatalog::standard();
        let def = catalog.get("Infantry_42").unwrap();
        let shooter = UnitRuntimeState::new("b", def, Side::Bot, HexCoord::new(2, 2));
        let target = UnitRuntimeState::new("p", def, Side::Player, HexCoord::new(3, 2));
        let (a, d) = (Combatant::new(def, &shooter), Combatant::new(def, &target));

        let plain = StandardBattlefield::new(&map, &tuning).estimate_attack(a, shooter.hex, d);
        let spotted = StandardBattlefield::new(&map, &tuning)
            .with_exchange(ExchangeContext {
                spotted_only: true,
                ..ExchangeContext::default()
            })
            .estimate_attack(a, shooter.hex, d);
        assert!(spotted.expected_damage() < plain.expected_damage());
    }

    #[test]
    fn test_spotted_by_recon_plane() {
        let mut map = BattleMap::new(12, 3);
        map.set_terrain(HexCoord::new(3, 0), TerrainKind::Forest);
        let tuning = Tuning::default();
        let catalog = UnitCatalog::standard();
        let plane = catalog.get("Recon_Plane").unwrap();
        let inf = catalog.get("Infantry_42").unwrap();

        let spotter = UnitRuntimeState::new("p", plane, Side::Bot, HexCoord::new(0, 0));
        let hidden = UnitRuntimeState::new("e", inf, Side::Player, HexCoord::new(6, 0));
        let far = UnitRuntimeState::new("f", inf, Side::Player, HexCoord::new(11, 2));

        let field = StandardBattlefield::new(&map, &tuning);
        let input = PlannerInput::new(
            vec![Combatant::new(plane, &spotter)],
            vec![Combatant::new(inf, &hidden), Combatant::new(inf, &far)],
            &[],
            Difficulty::Normal,
            &field,
            &tuning,
        );
        let context = DecisionContext::new(&input);
        assert!(context.is_spotted(&UnitId::new("e")));
        assert!(!context.is_spotted(&UnitId::new("f")));
    }
}
