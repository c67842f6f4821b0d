//! Tuning table with documented constants
//!
//! Every number the combat, supply and planning code depends on lives here.
//! The table is baked in and immutable for the lifetime of a battle; engines
//! take it by reference so tests can exercise alternative values.

use serde::{Deserialize, Serialize};

use crate::battle::unit_type::UnitClass;
use crate::core::error::{FrontlineError, Result};
use crate::core::types::Difficulty;

/// One value per unit class.
///
/// A closed struct instead of a map: adding a `UnitClass` variant is a
/// compile error here until every table has an entry for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassTable<T> {
    pub infantry: T,
    pub engineer: T,
    pub recon: T,
    pub vehicle: T,
    pub tank: T,
    pub anti_tank: T,
    pub artillery: T,
    pub air: T,
    pub bomber: T,
}

impl<T> ClassTable<T> {
    pub fn get(&self, class: UnitClass) -> &T {
        match class {
            UnitClass::Infantry => &self.infantry,
            UnitClass::Engineer => &self.engineer,
            UnitClass::Recon => &self.recon,
            UnitClass::Vehicle => &self.vehicle,
            UnitClass::Tank => &self.tank,
            UnitClass::AntiTank => &self.anti_tank,
            UnitClass::Artillery => &self.artillery,
            UnitClass::Air => &self.air,
            UnitClass::Bomber => &self.bomber,
        }
    }
}

/// One entry of a hit-probability-by-distance curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangePoint {
    pub distance: u32,
    /// Hit probability in percent
    pub accuracy: f32,
}

const fn rp(distance: u32, accuracy: f32) -> RangePoint {
    RangePoint { distance, accuracy }
}

/// Damage per hit by target kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageProfile {
    /// Against soft targets
    pub soft: f32,
    /// Against hard targets when AP >= armor
    pub hard_full: f32,
    /// Against hard targets when AP < armor
    pub hard_partial: f32,
}

const fn dmg(soft: f32, hard_full: f32, hard_partial: f32) -> DamageProfile {
    DamageProfile {
        soft,
        hard_full,
        hard_partial,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracyTuning {
    /// Lower clamp for final accuracy (percent)
    pub min: f32,
    /// Upper clamp for final accuracy (percent)
    pub max: f32,
    /// Accuracy points per experience star
    pub experience_per_star: f32,
    /// Multiplier when the target is only seen through a spotter
    pub spotted_only_multiplier: f32,
    /// Hit probability curves. `None` borrows the infantry curve.
    pub curves: ClassTable<Option<Vec<RangePoint>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageTuning {
    /// Armor penetration gained per experience star
    pub ap_per_star: u32,
    /// Damage scalar gained per experience star (1 + stars * this)
    pub experience_scalar_per_star: f32,
    /// Damage per hit never drops below this
    pub min_damage_per_hit: f32,
    /// Suppression inflicted per expected hit
    pub suppression_per_hit: f32,
    /// Shots per turn at full strength
    pub shots: ClassTable<u32>,
    pub profiles: ClassTable<DamageProfile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplyTuning {
    /// Road steps a supply line may run
    pub road_range: u32,
    /// Off-road cost a supply line may accumulate
    pub offroad_budget: f32,
    /// Cost of each off-road hex against `offroad_budget`
    pub offroad_step_cost: f32,
    /// Per-tick losses for units out of supply
    pub ammo_loss: u32,
    pub fuel_loss: u32,
    pub entrench_loss: u8,
    /// Strength lost when ammo or fuel is exhausted
    pub strength_loss: f32,
    /// Road cost = 1 / (1 + road_range * this)
    pub road_range_discount: f32,
    /// Subtracted from every road step when routing
    pub road_preference_bonus: f32,
    /// Floor on any route edge weight
    pub min_edge_cost: f32,
    /// Route cost to hours
    pub hours_per_cost: f32,
    /// Travel time reduction per road step (fraction of base time)
    pub road_time_bonus_per_step: f32,
    /// Cap on the road travel time reduction
    pub road_time_bonus_cap: f32,
    /// Routes costing more than this are abandoned
    pub max_route_cost: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerTuning {
    /// Focus-fire bonus at <=75%, <=50%, <=25% defender strength
    pub focus_fire_bonus: [f32; 3],
    /// Flanking bonus for rear attacks (side attacks get half)
    pub flanking_bonus: f32,
    /// Cosine at or below which an attack counts as from the rear
    pub rear_cosine: f32,
    /// Cosine below which an attack counts as from the side
    pub side_cosine: f32,
    /// Per allied unit adjacent to the target
    pub combined_arms_adjacent: f32,
    /// Per allied unit within `support_range` of the target
    pub combined_arms_support: f32,
    pub support_range: u32,
    pub combined_arms_cap: f32,
    /// Artillery firing within one hex of its max range
    pub artillery_range_bonus: f32,
    /// Enemies this close to an artillery destination are a threat
    pub artillery_danger_radius: u32,
    pub artillery_danger_penalty: f32,
    /// Per point of terrain defense at a non-attacking destination
    pub terrain_defense_weight: f32,
    /// Per ally that gains targets from a recon move
    pub recon_per_ally: f32,
    pub recon_cap: f32,
    /// Attacking a unit that holds an active objective
    pub purpose_alignment_bonus: f32,
    pub objective_radius: u32,
    /// Flat bonus for any attack, plus target cost / `attack_cost_scale`
    pub attack_opportunity_base: f32,
    pub attack_cost_scale: f32,
    /// Expected damage finishes the target
    pub lethal_bonus: f32,
    /// Per hex a ranged unit closes beyond what its weapon needs
    pub mobility_penalty_per_hex: f32,
    /// Per hex of distance reduction toward an objective
    pub objective_weight: f32,
    /// Victory points are divided by this before weighting
    pub vp_scale: f32,
    /// Steering-only approach score
    pub approach_weight: f32,
    /// Per hex of distance reduction toward the nearest enemy
    pub pressure_weight: f32,
    /// Enemies within this radius trigger the pressure fallback
    pub proximity_radius: u32,
    /// Scale of the [-1, 1] steering tie-break
    pub steering_scale: f32,
}

/// Weights for one difficulty level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyWeights {
    pub damage_weight: f32,
    pub retaliation_weight: f32,
    pub purpose_weight: f32,
    pub opportunity_weight: f32,
    /// Scales the overshoot penalty
    pub mobility_weight: f32,
    pub objective_weight: f32,
    pub approach_weight: f32,
    pub pressure_weight: f32,
    /// Scales every tactical bonus
    pub tactical_weight: f32,
    pub tactical_enabled: bool,
    /// Flat accuracy points removed from the bot's attacks
    pub accuracy_penalty: f32,
    /// Percent of damage removed from the bot's attacks
    pub damage_penalty_pct: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyTable {
    pub easy: DifficultyWeights,
    pub normal: DifficultyWeights,
    pub hard: DifficultyWeights,
}

impl DifficultyTable {
    pub fn get(&self, difficulty: Difficulty) -> &DifficultyWeights {
        match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Normal => &self.normal,
            Difficulty::Hard => &self.hard,
        }
    }
}

/// The full tuning table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tuning {
    pub accuracy: AccuracyTuning,
    pub damage: DamageTuning,
    pub supply: SupplyTuning,
    pub planner: PlannerTuning,
    pub difficulty: DifficultyTable,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            accuracy: AccuracyTuning {
                min: 0.1,
                max: 95.0,
                experience_per_star: 5.0,
                spotted_only_multiplier: 0.5,
                curves: ClassTable {
                    // Baseline: 10 points lost between 1 and 3 hexes
                    infantry: Some(vec![rp(1, 70.0), rp(3, 60.0), rp(6, 35.0)]),
                    engineer: None,
                    recon: Some(vec![rp(1, 65.0), rp(3, 55.0), rp(6, 40.0)]),
                    vehicle: Some(vec![rp(1, 65.0), rp(3, 55.0), rp(5, 40.0)]),
                    tank: Some(vec![rp(1, 75.0), rp(3, 65.0), rp(6, 50.0), rp(8, 35.0)]),
                    anti_tank: Some(vec![rp(1, 80.0), rp(3, 70.0), rp(6, 55.0), rp(8, 40.0)]),
                    artillery: Some(vec![rp(1, 55.0), rp(6, 45.0), rp(12, 30.0)]),
                    air: Some(vec![rp(1, 60.0), rp(4, 50.0)]),
                    bomber: Some(vec![rp(1, 50.0), rp(4, 40.0)]),
                },
            },
            damage: DamageTuning {
                ap_per_star: 1,
                experience_scalar_per_star: 0.1,
                min_damage_per_hit: 0.01,
                suppression_per_hit: 8.0,
                shots: ClassTable {
                    infantry: 4,
                    engineer: 4,
                    recon: 3,
                    vehicle: 3,
                    tank: 2,
                    anti_tank: 2,
                    artillery: 3,
                    air: 2,
                    bomber: 2,
                },
                profiles: ClassTable {
                    infantry: dmg(10.0, 4.0, 1.0),
                    engineer: dmg(12.0, 8.0, 2.0),
                    recon: dmg(8.0, 4.0, 1.0),
                    vehicle: dmg(10.0, 6.0, 2.0),
                    tank: dmg(12.0, 18.0, 5.0),
                    anti_tank: dmg(6.0, 22.0, 6.0),
                    artillery: dmg(18.0, 10.0, 4.0),
                    air: dmg(12.0, 16.0, 5.0),
                    bomber: dmg(20.0, 20.0, 8.0),
                },
            },
            supply: SupplyTuning {
                road_range: 12,
                offroad_budget: 6.0,
                offroad_step_cost: 1.5,
                ammo_loss: 1,
                fuel_loss: 1,
                entrench_loss: 1,
                strength_loss: 10.0,
                road_range_discount: 0.05,
                road_preference_bonus: 0.1,
                min_edge_cost: 0.05,
                hours_per_cost: 0.5,
                road_time_bonus_per_step: 0.02,
                road_time_bonus_cap: 0.3,
                max_route_cost: 250.0,
            },
            planner: PlannerTuning {
                focus_fire_bonus: [2.0, 4.0, 6.0],
                flanking_bonus: 6.0,
                rear_cosine: -0.5,
                side_cosine: 0.5,
                combined_arms_adjacent: 2.0,
                combined_arms_support: 1.0,
                support_range: 3,
                combined_arms_cap: 6.0,
                artillery_range_bonus: 3.0,
                artillery_danger_radius: 2,
                artillery_danger_penalty: 8.0,
                terrain_defense_weight: 1.0,
                recon_per_ally: 1.5,
                recon_cap: 6.0,
                purpose_alignment_bonus: 3.0,
                objective_radius: 3,
                attack_opportunity_base: 2.0,
                attack_cost_scale: 100.0,
                lethal_bonus: 5.0,
                mobility_penalty_per_hex: 1.5,
                objective_weight: 4.0,
                vp_scale: 10.0,
                approach_weight: 1.0,
                pressure_weight: 2.0,
                proximity_radius: 6,
                steering_scale: 0.05,
            },
            difficulty: DifficultyTable {
                easy: DifficultyWeights {
                    damage_weight: 0.8,
                    retaliation_weight: 0.5,
                    purpose_weight: 0.5,
                    opportunity_weight: 0.8,
                    mobility_weight: 0.5,
                    objective_weight: 0.8,
                    approach_weight: 0.8,
                    pressure_weight: 0.6,
                    tactical_weight: 0.0,
                    tactical_enabled: false,
                    accuracy_penalty: 10.0,
                    damage_penalty_pct: 15.0,
                },
                normal: DifficultyWeights {
                    damage_weight: 1.0,
                    retaliation_weight: 1.0,
                    purpose_weight: 1.0,
                    opportunity_weight: 1.0,
                    mobility_weight: 1.0,
                    objective_weight: 1.0,
                    approach_weight: 1.0,
                    pressure_weight: 1.0,
                    tactical_weight: 1.0,
                    tactical_enabled: true,
                    accuracy_penalty: 0.0,
                    damage_penalty_pct: 0.0,
                },
                hard: DifficultyWeights {
                    damage_weight: 1.2,
                    retaliation_weight: 1.3,
                    purpose_weight: 1.5,
                    opportunity_weight: 1.2,
                    mobility_weight: 1.3,
                    objective_weight: 1.2,
                    approach_weight: 1.2,
                    pressure_weight: 1.2,
                    tactical_weight: 1.5,
                    tactical_enabled: true,
                    accuracy_penalty: 0.0,
                    damage_penalty_pct: 0.0,
                },
            },
        }
    }
}

impl Tuning {
    /// The baked-in table shared by every battle, checked once on first use
    pub fn standard() -> &'static Tuning {
        TUNING.get_or_init(|| {
            let tuning = Tuning::default();
            if let Err(e) = tuning.validate() {
                tracing::error!("built-in tuning table rejected: {}", e);
            }
            tuning
        })
    }

    /// Hit curve for a class, falling back to infantry's
    pub fn accuracy_curve(&self, class: UnitClass) -> &[RangePoint] {
        self.accuracy
            .curves
            .get(class)
            .as_deref()
            .or(self.accuracy.curves.infantry.as_deref())
            .unwrap_or(&[])
    }

    /// Check the invariants the engines rely on
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(FrontlineError::InvalidTuning(msg));

        if self.accuracy.min > self.accuracy.max {
            return invalid(format!(
                "accuracy.min ({}) must be <= accuracy.max ({})",
                self.accuracy.min, self.accuracy.max
            ));
        }

        if self.accuracy.curves.infantry.as_ref().map_or(true, |c| c.is_empty()) {
            return invalid("infantry accuracy curve is the fallback and must not be empty".into());
        }

        for class in UnitClass::all() {
            let curve = self.accuracy_curve(class);
            if curve.windows(2).any(|pair| pair[0].distance >= pair[1].distance) {
                return invalid(format!("{class:?} accuracy curve distances must strictly increase"));
            }
        }

        if self.damage.min_damage_per_hit <= 0.0 {
            return invalid("min_damage_per_hit must be positive".into());
        }

        if self.supply.min_edge_cost <= 0.0 {
            return invalid("supply.min_edge_cost must be positive".into());
        }

        let [a, b, c] = self.planner.focus_fire_bonus;
        if !(a <= b && b <= c) {
            return invalid("focus_fire_bonus must grow as the target weakens".into());
        }

        Ok(())
    }
}

// === GLOBAL TUNING ACCESS ===

use std::sync::OnceLock;

static TUNING: OnceLock<Tuning> = OnceLock::new();
