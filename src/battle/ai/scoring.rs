//! Candidate scoring pipeline
//!
//! A score is the sum of independent rules, each contributing one named term.
//! The breakdown keeps every non-zero term so a decision can be audited after
//! the fact.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::battle::ai::decision_context::DecisionContext;
use crate::battle::ai::planner::ActionKind;
use crate::battle::battle_map::Objective;
use crate::battle::combat::{Combatant, ExchangeEstimate};
use crate::battle::hex::{cosine, HexCoord};
use crate::battle::pathfinding::ReachableHex;
use crate::battle::unit_type::UnitClass;

/// One scored proposal: a unit, where it ends up, and what it does there
#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    pub kind: ActionKind,
    pub unit: Combatant<'a>,
    pub destination: &'a ReachableHex,
    /// Attack target
    pub target: Option<Combatant<'a>>,
    /// Objective being advanced on
    pub objective: Option<&'a Objective>,
    /// Hex the move heads for; steers tie-breaks
    pub aim: Option<HexCoord>,
    /// Steps gained along an approach path
    pub approach_progress: u32,
    pub estimate: ExchangeEstimate,
}

impl<'a> Candidate<'a> {
    pub fn attack(unit: Combatant<'a>, destination: &'a ReachableHex, target: Combatant<'a>, estimate: ExchangeEstimate) -> Self {
        Self {
            kind: ActionKind::Attack,
            unit,
            destination,
            target: Some(target),
            objective: None,
            aim: Some(target.state.hex),
            approach_progress: 0,
            estimate,
        }
    }

    pub fn movement(kind: ActionKind, unit: Combatant<'a>, destination: &'a ReachableHex, aim: Option<HexCoord>) -> Self {
        Self {
            kind,
            unit,
            destination,
            target: None,
            objective: None,
            aim,
            approach_progress: 0,
            estimate: ExchangeEstimate::none(),
        }
    }

    pub fn with_objective(mut self, objective: &'a Objective) -> Self {
        self.objective = Some(objective);
        self.aim = Some(objective.hex);
        self
    }

    pub fn with_progress(mut self, steps: u32) -> Self {
        self.approach_progress = steps;
        self
    }

    pub fn start(&self) -> HexCoord {
        self.unit.state.hex
    }

    pub fn hex(&self) -> HexCoord {
        self.destination.hex
    }

    pub fn is_attack(&self) -> bool {
        self.kind == ActionKind::Attack
    }
}

/// A named contribution to a score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreTerm {
    pub name: String,
    pub value: f32,
}

/// Every non-zero term behind a score
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub terms: Vec<ScoreTerm>,
}

impl ScoreBreakdown {
    pub fn push(&mut self, name: &str, value: f32) {
        if value != 0.0 {
            self.terms.push(ScoreTerm {
                name: name.to_string(),
                value,
            });
        }
    }

    pub fn total(&self) -> f32 {
        self.terms.iter().map(|t| t.value).sum()
    }

    pub fn get(&self, name: &str) -> Option<f32> {
        self.terms.iter().find(|t| t.name == name).map(|t| t.value)
    }
}

impl fmt::Display for ScoreBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "nothing to gain");
        }
        let parts: Vec<String> = self.terms.iter().map(|t| format!("{} {:+.2}", t.name, t.value)).collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// One independent scoring strategy
pub trait ScoringRule {
    fn name(&self) -> &'static str;

    /// Tactical rules only run on difficulties that enable them and are
    /// scaled by the difficulty's tactical weight
    fn is_tactical(&self) -> bool {
        false
    }

    fn score(&self, candidate: &Candidate, context: &DecisionContext) -> f32;
}

/// Ordered rule set applied to every candidate
pub struct ScoringPipeline {
    rules: Vec<Box<dyn ScoringRule>>,
}

impl ScoringPipeline {
    pub fn new(rules: Vec<Box<dyn ScoringRule>>) -> Self {
        Self { rules }
    }

    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(ExpectedDamage),
            Box::new(Retaliation),
            Box::new(PurposeAlignment),
            Box::new(AttackOpportunity),
            Box::new(MobilityPenalty),
            Box::new(ObjectiveAdvance),
            Box::new(Approach),
            Box::new(Pressure),
            Box::new(FocusFire),
            Box::new(Flanking),
            Box::new(CombinedArms),
            Box::new(ArtilleryBanding),
            Box::new(TerrainPositioning),
            Box::new(ReconSpotting),
            Box::new(Steering),
        ])
    }

    pub fn score(&self, candidate: &Candidate, context: &DecisionContext) -> ScoreBreakdown {
        let mut breakdown = ScoreBreakdown::default();
        for rule in &self.rules {
            let value = if rule.is_tactical() {
                if !context.tactical_enabled() {
                    continue;
                }
                rule.score(candidate, context) * context.weights.tactical_weight
            } else {
                rule.score(candidate, context)
            };
            breakdown.push(rule.name(), value);
        }
        breakdown
    }
}

impl Default for ScoringPipeline {
    fn default() -> Self {
        Self::standard()
    }
}

// === ATTACK TERMS ===

pub struct ExpectedDamage;

impl ScoringRule for ExpectedDamage {
    fn name(&self) -> &'static str {
        "damage"
    }

    fn score(&self, candidate: &Candidate, context: &DecisionContext) -> f32 {
        candidate.estimate.expected_damage() * context.weights.damage_weight
    }
}

pub struct Retaliation;

impl ScoringRule for Retaliation {
    fn name(&self) -> &'static str {
        "retaliation"
    }

    fn score(&self, candidate: &Candidate, context: &DecisionContext) -> f32 {
        -candidate.estimate.expected_retaliation() * context.weights.retaliation_weight
    }
}

/// Hitting a unit that sits on or near an objective the bot wants
pub struct PurposeAlignment;

impl ScoringRule for PurposeAlignment {
    fn name(&self) -> &'static str {
        "purpose"
    }

    fn score(&self, candidate: &Candidate, context: &DecisionContext) -> f32 {
        let Some(target) = candidate.target else {
            return 0.0;
        };
        let tuning = &context.tuning().planner;
        let near_objective = context
            .active_objectives()
            .any(|o| o.hex.distance(&target.state.hex) <= tuning.objective_radius);
        if near_objective {
            tuning.purpose_alignment_bonus * context.weights.purpose_weight
        } else {
            0.0
        }
    }
}

/// Any attack beats idling; valuable and finishable targets more so
pub struct AttackOpportunity;

impl ScoringRule for AttackOpportunity {
    fn name(&self) -> &'static str {
        "opportunity"
    }

    fn score(&self, candidate: &Candidate, context: &DecisionContext) -> f32 {
        let Some(target) = candidate.target else {
            return 0.0;
        };
        let tuning = &context.tuning().planner;
        let mut bonus = tuning.attack_opportunity_base + target.def.cost as f32 / tuning.attack_cost_scale;
        if candidate.estimate.expected_damage() >= target.state.strength {
            bonus += tuning.lethal_bonus;
        }
        bonus * context.weights.opportunity_weight
    }
}

/// Ranged units should not walk closer than their weapon needs
pub struct MobilityPenalty;

impl ScoringRule for MobilityPenalty {
    fn name(&self) -> &'static str {
        "overshoot"
    }

    fn score(&self, candidate: &Candidate, context: &DecisionContext) -> f32 {
        let Some(target) = candidate.target else {
            return 0.0;
        };
        let def = candidate.unit.def;
        if def.range_max <= 1 || candidate.hex() == candidate.start() {
            return 0.0;
        }
        let distance = candidate.hex().distance(&target.state.hex);
        let overshoot = def.range_max.saturating_sub(distance);
        -(overshoot as f32) * context.tuning().planner.mobility_penalty_per_hex * context.weights.mobility_weight
    }
}

// === MOVEMENT TERMS ===

pub struct ObjectiveAdvance;

impl ScoringRule for ObjectiveAdvance {
    fn name(&self) -> &'static str {
        "objective"
    }

    fn score(&self, candidate: &Candidate, context: &DecisionContext) -> f32 {
        let (ActionKind::ObjectiveAdvance, Some(objective)) = (candidate.kind, candidate.objective) else {
            return 0.0;
        };
        let tuning = &context.tuning().planner;
        let reduction = distance_reduction(candidate.start(), candidate.hex(), objective.hex);
        let value = objective.victory_points as f32 / tuning.vp_scale;
        reduction * tuning.objective_weight * value * context.weights.objective_weight
    }
}

pub struct Approach;

impl ScoringRule for Approach {
    fn name(&self) -> &'static str {
        "approach"
    }

    fn score(&self, candidate: &Candidate, context: &DecisionContext) -> f32 {
        if candidate.kind != ActionKind::Approach {
            return 0.0;
        }
        candidate.approach_progress as f32 * context.tuning().planner.approach_weight * context.weights.approach_weight
    }
}

pub struct Pressure;

impl ScoringRule for Pressure {
    fn name(&self) -> &'static str {
        "pressure"
    }

    fn score(&self, candidate: &Candidate, context: &DecisionContext) -> f32 {
        let (ActionKind::Pressure, Some(aim)) = (candidate.kind, candidate.aim) else {
            return 0.0;
        };
        let reduction = distance_reduction(candidate.start(), candidate.hex(), aim);
        reduction * context.tuning().planner.pressure_weight * context.weights.pressure_weight
    }
}

// === TACTICAL TERMS ===

/// Pile onto units that are already hurt
pub struct FocusFire;

impl ScoringRule for FocusFire {
    fn name(&self) -> &'static str {
        "focus_fire"
    }

    fn is_tactical(&self) -> bool {
        true
    }

    fn score(&self, candidate: &Candidate, context: &DecisionContext) -> f32 {
        let Some(target) = candidate.target else {
            return 0.0;
        };
        let [light, heavy, critical] = context.tuning().planner.focus_fire_bonus;
        match target.state.strength {
            s if s <= 25.0 => critical,
            s if s <= 50.0 => heavy,
            s if s <= 75.0 => light,
            _ => 0.0,
        }
    }
}

/// Attack angle against the defender's facing
pub struct Flanking;

impl ScoringRule for Flanking {
    fn name(&self) -> &'static str {
        "flanking"
    }

    fn is_tactical(&self) -> bool {
        true
    }

    fn score(&self, candidate: &Candidate, context: &DecisionContext) -> f32 {
        let Some(target) = candidate.target else {
            return 0.0;
        };
        let tuning = &context.tuning().planner;
        let inbound = target.state.hex.vector_to(&candidate.hex());
        let angle = cosine(inbound, target.state.facing.unit_vector());
        if angle <= tuning.rear_cosine {
            tuning.flanking_bonus
        } else if angle < tuning.side_cosine {
            tuning.flanking_bonus * 0.5
        } else {
            0.0
        }
    }
}

/// Friendly units already around the target
pub struct CombinedArms;

impl ScoringRule for CombinedArms {
    fn name(&self) -> &'static str {
        "combined_arms"
    }

    fn is_tactical(&self) -> bool {
        true
    }

    fn score(&self, candidate: &Candidate, context: &DecisionContext) -> f32 {
        let Some(target) = candidate.target else {
            return 0.0;
        };
        let tuning = &context.tuning().planner;
        let total: f32 = context
            .allies_of(&candidate.unit.state.id)
            .map(|ally| match ally.state.hex.distance(&target.state.hex) {
                1 => tuning.combined_arms_adjacent,
                d if d <= tuning.support_range => tuning.combined_arms_support,
                _ => 0.0,
            })
            .sum();
        total.min(tuning.combined_arms_cap)
    }
}

/// Guns want to fire from the edge of their range and stay out of contact
pub struct ArtilleryBanding;

impl ScoringRule for ArtilleryBanding {
    fn name(&self) -> &'static str {
        "artillery_band"
    }

    fn is_tactical(&self) -> bool {
        true
    }

    fn score(&self, candidate: &Candidate, context: &DecisionContext) -> f32 {
        if candidate.unit.def.class != UnitClass::Artillery {
            return 0.0;
        }
        let tuning = &context.tuning().planner;
        let mut value = 0.0;

        if let Some(target) = candidate.target {
            let distance = candidate.hex().distance(&target.state.hex);
            if distance + 1 >= candidate.unit.def.range_max {
                value += tuning.artillery_range_bonus;
            }
        }

        let threatened = context
            .living_enemies()
            .any(|e| e.state.hex.distance(&candidate.hex()) <= tuning.artillery_danger_radius);
        if threatened {
            value -= tuning.artillery_danger_penalty;
        }

        value
    }
}

/// Cover at the end of a non-attacking move
pub struct TerrainPositioning;

impl ScoringRule for TerrainPositioning {
    fn name(&self) -> &'static str {
        "terrain"
    }

    fn is_tactical(&self) -> bool {
        true
    }

    fn score(&self, candidate: &Candidate, context: &DecisionContext) -> f32 {
        if candidate.is_attack() || candidate.unit.def.is_airborne() {
            return 0.0;
        }
        let defense = context
            .battlefield()
            .terrain_at(candidate.hex())
            .map_or(0, |t| t.defense);
        defense as f32 * context.tuning().planner.terrain_defense_weight
    }
}

/// Spotters earn credit for every ally that gains a target they reveal
pub struct ReconSpotting;

impl ScoringRule for ReconSpotting {
    fn name(&self) -> &'static str {
        "spotting"
    }

    fn is_tactical(&self) -> bool {
        true
    }

    fn score(&self, candidate: &Candidate, context: &DecisionContext) -> f32 {
        if !candidate.unit.def.is_spotter() {
            return 0.0;
        }
        let tuning = &context.tuning().planner;

        let revealed: Vec<HexCoord> = context
            .living_enemies()
            .filter(|e| !context.is_spotted(&e.state.id))
            .filter(|e| context.can_see(candidate.unit, candidate.hex(), e.state.hex))
            .map(|e| e.state.hex)
            .collect();
        if revealed.is_empty() {
            return 0.0;
        }

        let benefiting = context
            .allies_of(&candidate.unit.state.id)
            .filter(|ally| ally.def.range_max > 0 && ally.state.has_ammo())
            .filter(|ally| {
                let reach = ally.def.range_max + ally.def.movement;
                revealed.iter().any(|hex| ally.state.hex.distance(hex) <= reach)
            })
            .count();

        (benefiting as f32 * tuning.recon_per_ally).min(tuning.recon_cap)
    }
}

/// Small tie-break toward moves whose first step points at the aim
pub struct Steering;

impl ScoringRule for Steering {
    fn name(&self) -> &'static str {
        "steering"
    }

    fn score(&self, candidate: &Candidate, context: &DecisionContext) -> f32 {
        let Some(aim) = candidate.aim else {
            return 0.0;
        };
        steering_bias(&candidate.destination.path, aim) * context.tuning().planner.steering_scale
    }
}

/// Cosine between the first step of `path` and the direction to `aim`,
/// in [-1, 1]. Zero for paths that do not move.
pub fn steering_bias(path: &[HexCoord], aim: HexCoord) -> f32 {
    let (Some(start), Some(first)) = (path.first(), path.get(1)) else {
        return 0.0;
    };
    cosine(start.vector_to(first), start.vector_to(&aim))
}

fn distance_reduction(start: HexCoord, destination: HexCoord, goal: HexCoord) -> f32 {
    start.distance(&goal) as f32 - destination.distance(&goal) as f32
}
