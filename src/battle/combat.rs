//! Combat resolution: accuracy, armor facing and expected damage
//!
//! Everything here reports expected values. Nothing is rolled and nothing is
//! mutated; the turn engine decides how to apply an `AttackResult`.

use serde::{Deserialize, Serialize};

use crate::battle::hex::{HexCoord, HexDirection};
use crate::battle::terrain::{TerrainDefinition, TerrainLookup};
use crate::battle::unit_type::{Armor, UnitClass, UnitTypeDefinition};
use crate::battle::units::{UnitRuntimeState, STRENGTH_MAX};
use crate::battle::visibility::is_visible;
use crate::core::config::{DifficultyWeights, RangePoint, Tuning};
use crate::core::types::CommanderBonus;

/// Which armor plate an attack strikes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArmorFacing {
    Front,
    Side,
    Top,
}

/// Flat handicaps applied to one side's attacks (easy bots)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CombatPenalty {
    /// Accuracy points removed before clamping
    pub accuracy: f32,
    /// Percent of damage per hit removed
    pub damage_pct: f32,
}

impl CombatPenalty {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn from_difficulty(weights: &DifficultyWeights) -> Self {
        Self {
            accuracy: weights.accuracy_penalty,
            damage_pct: weights.damage_penalty_pct,
        }
    }

    fn damage_scalar(&self) -> f32 {
        (1.0 - self.damage_pct / 100.0).max(0.0)
    }
}

/// Everything needed to resolve one attack
#[derive(Debug, Clone)]
pub struct AttackRequest<'a> {
    pub attacker: &'a UnitTypeDefinition,
    pub attacker_experience: u8,
    pub attacker_strength: f32,
    pub attacker_pos: HexCoord,
    pub defender: &'a UnitTypeDefinition,
    pub defender_pos: HexCoord,
    pub defender_facing: HexDirection,
    pub target_is_soft: bool,
    /// Terrain under the defender; `None` = open ground
    pub defender_terrain: Option<TerrainDefinition>,
    pub defender_rushing: bool,
    /// Target is only known through a friendly spotter
    pub spotted_only: bool,
    pub commander: CommanderBonus,
    pub penalty: CombatPenalty,
}

impl<'a> AttackRequest<'a> {
    pub fn new(
        attacker: &'a UnitTypeDefinition,
        attacker_state: &UnitRuntimeState,
        defender: &'a UnitTypeDefinition,
        defender_state: &UnitRuntimeState,
    ) -> Self {
        Self {
            attacker,
            attacker_experience: attacker_state.experience,
            attacker_strength: attacker_state.strength,
            attacker_pos: attacker_state.hex,
            defender,
            defender_pos: defender_state.hex,
            defender_facing: defender_state.facing,
            target_is_soft: defender.class.is_soft_target(),
            defender_terrain: None,
            defender_rushing: defender_state.rushing,
            spotted_only: false,
            commander: CommanderBonus::default(),
            penalty: CombatPenalty::none(),
        }
    }

    /// Fire from a hex other than the attacker's current one
    pub fn from_hex(mut self, hex: HexCoord) -> Self {
        self.attacker_pos = hex;
        self
    }

    pub fn with_terrain(mut self, terrain: Option<TerrainDefinition>) -> Self {
        self.defender_terrain = terrain;
        self
    }

    pub fn with_soft_target(mut self, soft: bool) -> Self {
        self.target_is_soft = soft;
        self
    }

    pub fn with_spotted_only(mut self, spotted_only: bool) -> Self {
        self.spotted_only = spotted_only;
        self
    }

    pub fn with_commander(mut self, commander: CommanderBonus) -> Self {
        self.commander = commander;
        self
    }

    pub fn with_penalty(mut self, penalty: CombatPenalty) -> Self {
        self.penalty = penalty;
        self
    }

    pub fn distance(&self) -> u32 {
        self.attacker_pos.distance(&self.defender_pos)
    }
}

/// How the accuracy figure was built
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccuracyBreakdown {
    pub distance: u32,
    pub base: f32,
    pub experience: f32,
    pub commander_scalar: f32,
    pub terrain_multiplier: f32,
    pub spotting_multiplier: f32,
    pub difficulty_penalty: f32,
    /// Before clamping
    pub raw: f32,
    pub final_accuracy: f32,
}

/// How damage per hit was built
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageBreakdown {
    pub table_value: f32,
    /// AP minus facing armor; `None` for soft targets
    pub penetration_margin: Option<i64>,
    pub experience_scalar: f32,
    pub commander_scalar: f32,
    pub difficulty_scalar: f32,
    pub final_damage: f32,
}

/// Expected outcome of one attack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackResult {
    /// Percent
    pub accuracy: f32,
    pub shots: u32,
    pub damage_per_hit: f32,
    pub expected_hits: f32,
    pub expected_damage: f32,
    pub expected_suppression: f32,
    pub effective_ap: u32,
    pub facing: ArmorFacing,
    pub facing_armor: u32,
    pub accuracy_breakdown: AccuracyBreakdown,
    pub damage_breakdown: DamageBreakdown,
}

/// Hit probability at `distance` from a sorted curve.
///
/// Linear between bracketing entries, flat before the first and after the
/// last entry. Entries that repeat a distance are skipped.
pub fn base_accuracy(curve: &[RangePoint], distance: u32) -> f32 {
    let (Some(first), Some(last)) = (curve.first(), curve.last()) else {
        return 0.0;
    };

    if distance <= first.distance {
        return first.accuracy;
    }

    for pair in curve.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if b.distance <= a.distance {
            continue;
        }
        if distance <= b.distance {
            let span = (b.distance - a.distance) as f32;
            let t = (distance - a.distance) as f32 / span;
            return a.accuracy + (b.accuracy - a.accuracy) * t;
        }
    }

    last.accuracy
}

/// Final hit probability for a request, with its breakdown
pub fn compute_accuracy(request: &AttackRequest, tuning: &Tuning) -> AccuracyBreakdown {
    let distance = request.distance();
    let base = base_accuracy(tuning.accuracy_curve(request.attacker.class), distance);
    let experience = request.attacker_experience as f32 * tuning.accuracy.experience_per_star;
    let commander_scalar = request.commander.accuracy_scalar();

    let terrain_modifier = if request.defender_rushing {
        0
    } else {
        request
            .defender_terrain
            .map_or(0, |t| t.accuracy_modifier)
    };
    let terrain_multiplier = 1.0 + terrain_modifier as f32 / 100.0;

    let spotting_multiplier = if request.spotted_only {
        tuning.accuracy.spotted_only_multiplier
    } else {
        1.0
    };

    let scaled = base * commander_scalar + experience * commander_scalar;
    let raw = scaled * terrain_multiplier * spotting_multiplier - request.penalty.accuracy;
    // Upper bound wins if the band is inverted
    let final_accuracy = raw.max(tuning.accuracy.min).min(tuning.accuracy.max);

    AccuracyBreakdown {
        distance,
        base,
        experience,
        commander_scalar,
        terrain_multiplier,
        spotting_multiplier,
        difficulty_penalty: request.penalty.accuracy,
        raw,
        final_accuracy,
    }
}

/// Armor plate struck by an attacker at `attacker_pos`.
///
/// Only an attack arriving exactly along the defender's facing hits the
/// front; every other bearing hits the side.
pub fn resolve_facing(
    attacker_class: UnitClass,
    attacker_pos: HexCoord,
    defender_pos: HexCoord,
    defender_facing: HexDirection,
    armor: &Armor,
) -> (ArmorFacing, u32) {
    if attacker_class.is_top_attack() {
        return (ArmorFacing::Top, armor.top);
    }

    match defender_pos.direction_to(&attacker_pos) {
        Some(inbound) if inbound.index() != defender_facing.index() => (ArmorFacing::Side, armor.side),
        _ => (ArmorFacing::Front, armor.front),
    }
}

/// Shots fired this turn, scaled by remaining strength
pub fn shot_count(class: UnitClass, strength: f32, tuning: &Tuning) -> u32 {
    let full = *tuning.damage.shots.get(class) as f32;
    let fraction = strength.clamp(0.0, STRENGTH_MAX) / STRENGTH_MAX;
    (full * fraction).round() as u32
}

pub fn effective_ap(def: &UnitTypeDefinition, experience: u8, tuning: &Tuning) -> u32 {
    def.ap + experience as u32 * tuning.damage.ap_per_star
}

fn damage_per_hit(request: &AttackRequest, ap: u32, facing_armor: u32, tuning: &Tuning) -> DamageBreakdown {
    let profile = tuning.damage.profiles.get(request.attacker.class);

    let (table_value, penetration_margin) = if request.target_is_soft {
        (profile.soft, None)
    } else {
        let margin = ap as i64 - facing_armor as i64;
        let value = if margin < 0 { profile.hard_partial } else { profile.hard_full };
        (value, Some(margin))
    };

    let experience_scalar =
        1.0 + request.attacker_experience as f32 * tuning.damage.experience_scalar_per_star;
    let commander_scalar = request.commander.damage_scalar();
    let difficulty_scalar = request.penalty.damage_scalar();

    let final_damage = (table_value * experience_scalar * commander_scalar * difficulty_scalar)
        .max(tuning.damage.min_damage_per_hit);

    DamageBreakdown {
        table_value,
        penetration_margin,
        experience_scalar,
        commander_scalar,
        difficulty_scalar,
        final_damage,
    }
}

/// Resolve one attack into expected hits, damage and suppression
pub fn resolve_attack(request: &AttackRequest, tuning: &Tuning) -> AttackResult {
    let accuracy_breakdown = compute_accuracy(request, tuning);
    let (facing, facing_armor) = resolve_facing(
        request.attacker.class,
        request.attacker_pos,
        request.defender_pos,
        request.defender_facing,
        &request.defender.armor,
    );
    let ap = effective_ap(request.attacker, request.attacker_experience, tuning);
    let shots = shot_count(request.attacker.class, request.attacker_strength, tuning);
    let damage_breakdown = damage_per_hit(request, ap, facing_armor, tuning);

    let accuracy = accuracy_breakdown.final_accuracy;
    let expected_hits = accuracy / 100.0 * shots as f32;
    let expected_damage = expected_hits * damage_breakdown.final_damage;
    let expected_suppression = expected_hits * tuning.damage.suppression_per_hit;

    tracing::trace!(
        attacker = %request.attacker.key,
        defender = %request.defender.key,
        accuracy,
        shots,
        ?facing,
        expected_damage,
        "resolved attack"
    );

    AttackResult {
        accuracy,
        shots,
        damage_per_hit: damage_breakdown.final_damage,
        expected_hits,
        expected_damage,
        expected_suppression,
        effective_ap: ap,
        facing,
        facing_armor,
        accuracy_breakdown,
        damage_breakdown,
    }
}

/// A unit definition paired with its current state
#[derive(Debug, Clone, Copy)]
pub struct Combatant<'a> {
    pub def: &'a UnitTypeDefinition,
    pub state: &'a UnitRuntimeState,
}

impl<'a> Combatant<'a> {
    pub fn new(def: &'a UnitTypeDefinition, state: &'a UnitRuntimeState) -> Self {
        Self { def, state }
    }
}

/// Side conditions for an attack and the return fire it draws
#[derive(Debug, Clone, Copy, Default)]
pub struct ExchangeContext {
    pub attacker_commander: CommanderBonus,
    pub defender_commander: CommanderBonus,
    pub attacker_penalty: CombatPenalty,
    pub defender_penalty: CombatPenalty,
    pub spotted_only: bool,
}

/// Expected attack plus the defender's expected return fire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeEstimate {
    pub attack: Option<AttackResult>,
    pub retaliation: Option<AttackResult>,
}

impl ExchangeEstimate {
    pub fn none() -> Self {
        Self {
            attack: None,
            retaliation: None,
        }
    }

    pub fn expected_damage(&self) -> f32 {
        self.attack.as_ref().map_or(0.0, |a| a.expected_damage)
    }

    pub fn expected_retaliation(&self) -> f32 {
        self.retaliation.as_ref().map_or(0.0, |r| r.expected_damage)
    }
}

/// Estimate an attack from `from` and the return fire it draws.
///
/// The defender answers only if it survives the expected damage, has ammo,
/// has the attacker in range and can see it. Return fire is computed at the
/// defender's reduced strength.
pub fn estimate_exchange(
    attacker: Combatant,
    from: HexCoord,
    defender: Combatant,
    terrain: &(impl TerrainLookup + ?Sized),
    context: &ExchangeContext,
    tuning: &Tuning,
) -> ExchangeEstimate {
    if !attacker.state.has_ammo() {
        return ExchangeEstimate::none();
    }

    let request = AttackRequest::new(attacker.def, attacker.state, defender.def, defender.state)
        .from_hex(from)
        .with_terrain(terrain.terrain_at(defender.state.hex))
        .with_spotted_only(context.spotted_only)
        .with_commander(context.attacker_commander)
        .with_penalty(context.attacker_penalty);
    let attack = resolve_attack(&request, tuning);

    let remaining = defender.state.strength - attack.expected_damage;
    let distance = from.distance(&defender.state.hex);
    let can_answer = remaining > 0.0
        && defender.state.has_ammo()
        && defender.def.in_range(distance)
        && is_visible(
            defender.state.hex,
            from,
            defender.def.class,
            defender.def.is_airborne(),
            terrain,
        );

    let retaliation = can_answer.then(|| {
        let attacker_facing = from
            .direction_to(&defender.state.hex)
            .unwrap_or(attacker.state.facing);
        let mut answer = AttackRequest::new(defender.def, defender.state, attacker.def, attacker.state)
            .with_terrain(terrain.terrain_at(from))
            .with_commander(context.defender_commander)
            .with_penalty(context.defender_penalty);
        answer.attacker_strength = remaining;
        answer.defender_pos = from;
        answer.defender_facing = attacker_facing;
        answer.defender_rushing = false;
        resolve_attack(&answer, tuning)
    });

    ExchangeEstimate {
        attack: Some(attack),
        retaliation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::battle_map::BattleMap;
    use crate::battle::terrain::TerrainKind;
    use crate::battle::unit_type::UnitCatalog;
    use crate::core::types::Side;
    use proptest::prelude::*;

    fn unit(catalog: &UnitCatalog, key: &str, side: Side, q: i32, r: i32) -> UnitRuntimeState {
        UnitRuntimeState::new(key, catalog.get(key).unwrap(), side, HexCoord::new(q, r))
    }

    #[test]
    fn test_base_accuracy_interpolates() {
        let curve = [
            RangePoint { distance: 1, accuracy: 70.0 },
            RangePoint { distance: 3, accuracy: 60.0 },
        ];
        assert_eq!(base_accuracy(&curve, 0), 70.0);
        assert_eq!(base_accuracy(&curve, 1), 70.0);
        assert_eq!(base_accuracy(&curve, 2), 65.0);
        assert_eq!(base_accuracy(&curve, 3), 60.0);
        assert_eq!(base_accuracy(&curve, 10), 60.0);
        assert_eq!(base_accuracy(&[], 3), 0.0);
    }

    #[test]
    fn test_base_accuracy_repeated_distance() {
        let curve = [
            RangePoint { distance: 1, accuracy: 70.0 },
            RangePoint { distance: 3, accuracy: 60.0 },
            RangePoint { distance: 3, accuracy: 50.0 },
            RangePoint { distance: 6, accuracy: 35.0 },
        ];
        assert_eq!(base_accuracy(&curve, 2), 65.0);
        assert_eq!(base_accuracy(&curve, 3), 60.0);
        assert!((base_accuracy(&curve, 4) - 45.0).abs() < 1e-4);
        assert!((0..10).all(|d| base_accuracy(&curve, d).is_finite()));
    }

    #[test]
    fn test_inverted_band_does_not_panic() {
        let mut tuning = Tuning::default();
        tuning.accuracy.min = 99.0;
        let catalog = UnitCatalog::standard();
        let inf = catalog.get("Infantry_42").unwrap();
        let attacker = unit(&catalog, "Infantry_42", Side::Bot, 0, 0);
        let defender = unit(&catalog, "Infantry_42", Side::Player, 1, 0);

        let acc = compute_accuracy(&AttackRequest::new(inf, &attacker, inf, &defender), &tuning);
        assert_eq!(acc.final_accuracy, tuning.accuracy.max);
    }

    #[test]
    fn test_infantry_range_drop_is_ten_points() {
        let tuning = Tuning::default();
        let catalog = UnitCatalog::standard();
        let inf = catalog.get("Infantry_42").unwrap();
        let attacker = unit(&catalog, "Infantry_42", Side::Bot, 0, 0);
        let near = unit(&catalog, "Infantry_42", Side::Player, 1, 0);
        let far = unit(&catalog, "Infantry_42", Side::Player, 3, 0);
        let plains = Some(TerrainKind::Plains.definition());

        let a1 = compute_accuracy(&AttackRequest::new(inf, &attacker, inf, &near).with_terrain(plains), &tuning);
        let a3 = compute_accuracy(&AttackRequest::new(inf, &attacker, inf, &far).with_terrain(plains), &tuning);
        assert!((a1.final_accuracy - a3.final_accuracy - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_accuracy_components() {
        let tuning = Tuning::default();
        let catalog = UnitCatalog::standard();
        let inf = catalog.get("Infantry_42").unwrap();
        let attacker = unit(&catalog, "Infantry_42", Side::Bot, 0, 0).with_experience(2);
        let defender = unit(&catalog, "Infantry_42", Side::Player, 1, 0);

        let request = AttackRequest::new(inf, &attacker, inf, &defender)
            .with_terrain(Some(TerrainKind::Forest.definition()))
            .with_commander(CommanderBonus::new(10.0, 0.0));
        let acc = compute_accuracy(&request, &tuning);
        // (70 * 1.1 + 10 * 1.1) * 0.8
        assert!((acc.final_accuracy - 70.4).abs() < 1e-3);
        assert_eq!(acc.experience, 10.0);

        let spotted = compute_accuracy(&request.clone().with_spotted_only(true), &tuning);
        assert!((spotted.final_accuracy - 35.2).abs() < 1e-3);
    }

    #[test]
    fn test_rushing_defender_loses_cover() {
        let tuning = Tuning::default();
        let catalog = UnitCatalog::standard();
        let inf = catalog.get("Infantry_42").unwrap();
        let attacker = unit(&catalog, "Infantry_42", Side::Bot, 0, 0);
        let mut defender = unit(&catalog, "Infantry_42", Side::Player, 1, 0);
        let forest = Some(TerrainKind::Forest.definition());

        let covered = compute_accuracy(&AttackRequest::new(inf, &attacker, inf, &defender).with_terrain(forest), &tuning);
        defender.rushing = true;
        let exposed = compute_accuracy(&AttackRequest::new(inf, &attacker, inf, &defender).with_terrain(forest), &tuning);
        assert_eq!(exposed.terrain_multiplier, 1.0);
        assert!(exposed.final_accuracy > covered.final_accuracy);
    }

    #[test]
    fn test_easy_penalty_lowers_accuracy_and_damage() {
        let tuning = Tuning::default();
        let catalog = UnitCatalog::standard();
        let inf = catalog.get("Infantry_42").unwrap();
        let attacker = unit(&catalog, "Infantry_42", Side::Bot, 0, 0);
        let defender = unit(&catalog, "Infantry_42", Side::Player, 1, 0);
        let penalty = CombatPenalty::from_difficulty(tuning.difficulty.get(crate::core::types::Difficulty::Easy));

        let normal = resolve_attack(&AttackRequest::new(inf, &attacker, inf, &defender), &tuning);
        let easy = resolve_attack(&AttackRequest::new(inf, &attacker, inf, &defender).with_penalty(penalty), &tuning);
        assert!((normal.accuracy - easy.accuracy - 10.0).abs() < 1e-4);
        assert!(easy.damage_per_hit < normal.damage_per_hit);
    }

    #[test]
    fn test_top_attack_uses_top_armor() {
        let armor = Armor::new(8, 4, 2);
        let (facing, value) = resolve_facing(
            UnitClass::Artillery,
            HexCoord::new(0, 0),
            HexCoord::new(3, 0),
            HexDirection::West,
            &armor,
        );
        assert_eq!(facing, ArmorFacing::Top);
        assert_eq!(value, 2);
    }

    #[test]
    fn test_frontal_and_side_facing() {
        let armor = Armor::new(8, 4, 2);
        let defender = HexCoord::new(5, 5);
        // Attacker due west, defender facing west: front
        let (facing, value) = resolve_facing(UnitClass::Tank, HexCoord::new(3, 5), defender, HexDirection::West, &armor);
        assert_eq!((facing, value), (ArmorFacing::Front, 8));
        // Attacker due east of a west-facing defender: rear counts as side
        let (facing, value) = resolve_facing(UnitClass::Tank, HexCoord::new(7, 5), defender, HexDirection::West, &armor);
        assert_eq!((facing, value), (ArmorFacing::Side, 4));
        // Adjacent but one direction off: side
        let (facing, _) = resolve_facing(UnitClass::Tank, HexCoord::new(4, 6), defender, HexDirection::West, &armor);
        assert_eq!(facing, ArmorFacing::Side);
    }

    #[test]
    fn test_shots_scale_with_strength() {
        let tuning = Tuning::default();
        assert_eq!(shot_count(UnitClass::Infantry, 100.0, &tuning), 4);
        assert_eq!(shot_count(UnitClass::Infantry, 50.0, &tuning), 2);
        assert_eq!(shot_count(UnitClass::Infantry, 40.0, &tuning), 2);
        assert_eq!(shot_count(UnitClass::Infantry, 10.0, &tuning), 0);
    }

    #[test]
    fn test_under_penetration_uses_partial_damage() {
        let tuning = Tuning::default();
        let catalog = UnitCatalog::standard();
        let inf = catalog.get("Infantry_42").unwrap();
        let tank = catalog.get("Panzer_IV").unwrap();
        let attacker = unit(&catalog, "Infantry_42", Side::Player, 0, 0);
        let defender = unit(&catalog, "Panzer_IV", Side::Bot, 1, 0).with_facing(HexDirection::West);

        let result = resolve_attack(&AttackRequest::new(inf, &attacker, tank, &defender), &tuning);
        assert_eq!(result.damage_breakdown.penetration_margin, Some(2 - 8));
        assert_eq!(result.damage_breakdown.table_value, tuning.damage.profiles.infantry.hard_partial);
        assert_eq!(result.facing, ArmorFacing::Front);
    }

    #[test]
    fn test_anti_tank_penetrates() {
        let tuning = Tuning::default();
        let catalog = UnitCatalog::standard();
        let pak = catalog.get("Pak_40").unwrap();
        let tank = catalog.get("Panzer_IV").unwrap();
        let attacker = unit(&catalog, "Pak_40", Side::Player, 0, 0).with_experience(1);
        let defender = unit(&catalog, "Panzer_IV", Side::Bot, 2, 0).with_facing(HexDirection::West);

        let result = resolve_attack(&AttackRequest::new(pak, &attacker, tank, &defender), &tuning);
        assert_eq!(result.effective_ap, pak.ap + 1);
        assert_eq!(result.damage_breakdown.penetration_margin, Some(12 - 8));
        // 22 * 1.1
        assert!((result.damage_per_hit - 24.2).abs() < 1e-3);
        let expected_hits = result.accuracy / 100.0 * result.shots as f32;
        assert!((result.expected_hits - expected_hits).abs() < 1e-5);
        assert!((result.expected_damage - expected_hits * result.damage_per_hit).abs() < 1e-4);
        assert!((result.expected_suppression - expected_hits * 8.0).abs() < 1e-4);
    }

    #[test]
    fn test_damage_never_zero() {
        let tuning = Tuning::default();
        let catalog = UnitCatalog::standard();
        let inf = catalog.get("Infantry_42").unwrap();
        let attacker = unit(&catalog, "Infantry_42", Side::Bot, 0, 0);
        let defender = unit(&catalog, "Infantry_42", Side::Player, 1, 0);
        let request = AttackRequest::new(inf, &attacker, inf, &defender)
            .with_commander(CommanderBonus::new(0.0, -100.0));
        let result = resolve_attack(&request, &tuning);
        assert_eq!(result.damage_per_hit, tuning.damage.min_damage_per_hit);
    }

    #[test]
    fn test_exchange_retaliation_when_in_range() {
        let tuning = Tuning::default();
        let catalog = UnitCatalog::standard();
        let map = BattleMap::new(10, 10);
        let inf = catalog.get("Infantry_42").unwrap();
        let attacker = unit(&catalog, "Infantry_42", Side::Bot, 0, 0);
        let defender = unit(&catalog, "Infantry_42", Side::Player, 2, 0);

        let estimate = estimate_exchange(
            Combatant::new(inf, &attacker),
            HexCoord::new(1, 0),
            Combatant::new(inf, &defender),
            &map,
            &ExchangeContext::default(),
            &tuning,
        );
        assert!(estimate.expected_damage() > 0.0);
        assert!(estimate.expected_retaliation() > 0.0);
        // Return fire comes from a weakened defender
        assert!(estimate.expected_retaliation() <= estimate.expected_damage());
    }

    #[test]
    fn test_exchange_no_retaliation_out_of_range() {
        let tuning = Tuning::default();
        let catalog = UnitCatalog::standard();
        let map = BattleMap::new(12, 12);
        let arty = catalog.get("Artillery_105mm").unwrap();
        let inf = catalog.get("Infantry_42").unwrap();
        let attacker = unit(&catalog, "Artillery_105mm", Side::Bot, 0, 0);
        let defender = unit(&catalog, "Infantry_42", Side::Player, 4, 0);

        let estimate = estimate_exchange(
            Combatant::new(arty, &attacker),
            attacker.hex,
            Combatant::new(inf, &defender),
            &map,
            &ExchangeContext::default(),
            &tuning,
        );
        assert!(estimate.attack.is_some());
        assert!(estimate.retaliation.is_none());
    }

    #[test]
    fn test_exchange_without_ammo() {
        let tuning = Tuning::default();
        let catalog = UnitCatalog::standard();
        let map = BattleMap::new(10, 10);
        let inf = catalog.get("Infantry_42").unwrap();
        let attacker = unit(&catalog, "Infantry_42", Side::Bot, 0, 0).with_supplies(0, 0);
        let defender = unit(&catalog, "Infantry_42", Side::Player, 1, 0);

        let estimate = estimate_exchange(
            Combatant::new(inf, &attacker),
            attacker.hex,
            Combatant::new(inf, &defender),
            &map,
            &ExchangeContext::default(),
            &tuning,
        );
        assert_eq!(estimate, ExchangeEstimate::none());
    }

    proptest! {
        #[test]
        fn prop_accuracy_within_band(stars in 0u8..=255, cmd in -500.0f32..500.0, dist in 0i32..20, spotted: bool) {
            let tuning = Tuning::default();
            let catalog = UnitCatalog::standard();
            let inf = catalog.get("Infantry_42").unwrap();
            let attacker = unit(&catalog, "Infantry_42", Side::Bot, 0, 0).with_experience(stars);
            let defender = unit(&catalog, "Infantry_42", Side::Player, dist, 0);
            let request = AttackRequest::new(inf, &attacker, inf, &defender)
                .with_commander(CommanderBonus::new(cmd, 0.0))
                .with_spotted_only(spotted)
                .with_terrain(Some(TerrainKind::FortificationHeavy.definition()));
            let acc = compute_accuracy(&request, &tuning).final_accuracy;
            prop_assert!(acc >= tuning.accuracy.min && acc <= tuning.accuracy.max);
        }

        #[test]
        fn prop_accuracy_monotonic_falloff(d1 in 0u32..15, d2 in 0u32..15) {
            let tuning = Tuning::default();
            let (near, far) = if d1 <= d2 { (d1, d2) } else { (d2, d1) };
            for class in [UnitClass::Infantry, UnitClass::Tank, UnitClass::Artillery, UnitClass::Recon] {
                let curve = tuning.accuracy_curve(class);
                prop_assert!(base_accuracy(curve, near) >= base_accuracy(curve, far));
            }
        }
    }
}
