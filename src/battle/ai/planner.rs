//! Turn planning for bot units
//!
//! Each unit, in input order: search where it can move, try every attack it
//! could make from there, and fall back to objective, approach, pressure and
//! finally hold moves when no attack is worth it.

use std::cmp::Reverse;
use std::fmt;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::battle::ai::decision_context::{DecisionContext, Occupancy, PlannerInput};
use crate::battle::ai::scoring::{Candidate, ScoreBreakdown, ScoringPipeline};
use crate::battle::combat::Combatant;
use crate::battle::hex::HexCoord;
use crate::battle::pathfinding::{find_path, reachable_hexes, MoveBudget, ReachableHex};
use crate::battle::terrain::MoveType;
use crate::core::types::{Side, UnitId};

/// What a planned action does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Attack,
    ObjectiveAdvance,
    Approach,
    Pressure,
    Hold,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionKind::Attack => "attack",
            ActionKind::ObjectiveAdvance => "advance",
            ActionKind::Approach => "approach",
            ActionKind::Pressure => "pressure",
            ActionKind::Hold => "hold",
        };
        write!(f, "{name}")
    }
}

/// One unit's decision for the turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedAction {
    pub unit_id: UnitId,
    pub kind: ActionKind,
    pub destination: HexCoord,
    /// Start hex first, destination last
    pub path: Vec<HexCoord>,
    pub target: Option<UnitId>,
    pub expected_damage: f32,
    pub expected_retaliation: f32,
    pub score: f32,
    pub breakdown: ScoreBreakdown,
    pub rationale: String,
}

/// Movement points a unit may spend this turn.
///
/// Vehicles and aircraft with empty tanks stay put.
pub fn movement_allowance(unit: Combatant) -> f32 {
    if unit.state.is_destroyed() {
        return 0.0;
    }
    if unit.def.move_type != MoveType::Leg && unit.state.fuel == 0 {
        return 0.0;
    }
    unit.def.movement as f32
}

/// Plan every living bot unit's action for this turn, best first.
///
/// Units are planned in input order; each one's destination is reserved
/// before the next unit searches.
pub fn plan_bot_turn(input: &PlannerInput) -> Vec<PlannedAction> {
    let context = DecisionContext::new(input);
    let pipeline = ScoringPipeline::standard();
    let mut occupancy = input.occupancy.clone();
    let mut actions = Vec::with_capacity(input.bot_units.len());

    for unit in &input.bot_units {
        if unit.state.is_destroyed() {
            continue;
        }

        let reachable = reachable_for(*unit, &context, &occupancy);
        let action = plan_unit(*unit, &reachable, &context, &pipeline, &occupancy);

        tracing::debug!(
            unit = %action.unit_id,
            kind = %action.kind,
            destination = %action.destination,
            score = action.score,
            rationale = %action.rationale,
            "planned bot action"
        );

        occupancy.vacate(unit.state.hex);
        occupancy.occupy(action.destination, Side::Bot);
        actions.push(action);
    }

    // Stable: equal scores keep input order
    actions.sort_by_key(|a| Reverse(OrderedFloat(a.score)));
    actions
}

fn reachable_for(unit: Combatant, context: &DecisionContext, occupancy: &Occupancy) -> Vec<ReachableHex> {
    let battlefield = context.battlefield();
    let move_type = unit.def.move_type;
    let budget = MoveBudget {
        allowance: movement_allowance(unit),
        fly_over_occupied: unit.def.is_airborne(),
    };
    reachable_hexes(
        unit.state.hex,
        budget,
        |hex| {
            if !battlefield.in_bounds(hex) {
                return None;
            }
            battlefield.movement_cost(hex, move_type)
        },
        |hex| occupancy.is_occupied(hex),
    )
}

struct Scored<'a> {
    candidate: Candidate<'a>,
    breakdown: ScoreBreakdown,
    total: f32,
}

/// Highest total wins; the first of equals is kept
fn pick_best<'a>(
    candidates: impl IntoIterator<Item = Candidate<'a>>,
    context: &DecisionContext,
    pipeline: &ScoringPipeline,
) -> Option<Scored<'a>> {
    let mut best: Option<Scored<'a>> = None;
    for candidate in candidates {
        let breakdown = pipeline.score(&candidate, context);
        let total = breakdown.total();
        if best.as_ref().map_or(true, |b| total > b.total) {
            best = Some(Scored {
                candidate,
                breakdown,
                total,
            });
        }
    }
    best
}

fn plan_unit<'a>(
    unit: Combatant<'a>,
    reachable: &'a [ReachableHex],
    context: &DecisionContext<'a>,
    pipeline: &ScoringPipeline,
    occupancy: &Occupancy,
) -> PlannedAction {
    if let Some(attack) = best_attack(unit, reachable, context, pipeline) {
        if attack.total >= 0.0 {
            return into_action(attack);
        }
    }

    let start = unit.state.hex;
    let moved = |scored: &Scored, term: &str| {
        scored.candidate.hex() != start && scored.breakdown.get(term).is_some_and(|v| v > 0.0) && scored.total > 0.0
    };

    if let Some(objective) = context.nearest_active_objective(start) {
        let advance = pick_best(
            reachable.iter().map(|dest| {
                Candidate::movement(ActionKind::ObjectiveAdvance, unit, dest, None).with_objective(objective)
            }),
            context,
            pipeline,
        );
        if let Some(advance) = advance.filter(|s| moved(s, "objective")) {
            return into_action(advance);
        }

        let battlefield = context.battlefield();
        let route = find_path(
            start,
            objective.hex,
            |hex| {
                if !battlefield.in_bounds(hex) {
                    return None;
                }
                battlefield.movement_cost(hex, unit.def.move_type)
            },
            |hex| hex != start && occupancy.is_occupied(hex),
        );
        if let Some(route) = route {
            let approach = pick_best(
                reachable.iter().filter_map(|dest| {
                    let progress = route.iter().position(|hex| *hex == dest.hex)?;
                    Some(
                        Candidate::movement(ActionKind::Approach, unit, dest, None)
                            .with_objective(objective)
                            .with_progress(progress as u32),
                    )
                }),
                context,
                pipeline,
            );
            if let Some(approach) = approach.filter(|s| moved(s, "approach")) {
                return into_action(approach);
            }
        }
    }

    if unit.def.range_max > 0 {
        if let Some(enemy) = pressure_target(unit, context) {
            let pressure = pick_best(
                reachable
                    .iter()
                    .map(|dest| Candidate::movement(ActionKind::Pressure, unit, dest, Some(enemy))),
                context,
                pipeline,
            );
            if let Some(pressure) = pressure.filter(|s| moved(s, "pressure")) {
                return into_action(pressure);
            }
        }
    }

    let hold = Candidate::movement(ActionKind::Hold, unit, &reachable[0], None);
    let breakdown = pipeline.score(&hold, context);
    into_action(Scored {
        total: breakdown.total(),
        candidate: hold,
        breakdown,
    })
}

fn best_attack<'a>(
    unit: Combatant<'a>,
    reachable: &'a [ReachableHex],
    context: &DecisionContext<'a>,
    pipeline: &ScoringPipeline,
) -> Option<Scored<'a>> {
    if !unit.state.has_ammo() || unit.def.range_max == 0 {
        return None;
    }
    let battlefield = context.battlefield();

    let mut candidates = Vec::new();
    for dest in reachable {
        for enemy in context.living_enemies() {
            let distance = dest.hex.distance(&enemy.state.hex);
            if !unit.def.in_range(distance) || !battlefield.los_allows(dest.hex, enemy.state.hex, unit.def) {
                continue;
            }
            let estimate = battlefield.estimate_attack(unit, dest.hex, *enemy);
            candidates.push(Candidate::attack(unit, dest, *enemy, estimate));
        }
    }

    pick_best(candidates, context, pipeline)
}

/// Nearest enemy the unit knows about: close by, in its own sight, or
/// spotted by friendly air or recon
fn pressure_target(unit: Combatant, context: &DecisionContext) -> Option<HexCoord> {
    let start = unit.state.hex;
    let radius = context.tuning().planner.proximity_radius;
    context
        .living_enemies()
        .filter(|e| {
            start.distance(&e.state.hex) <= radius
                || context.can_see(unit, start, e.state.hex)
                || context.is_spotted(&e.state.id)
        })
        .min_by_key(|e| start.distance(&e.state.hex))
        .map(|e| e.state.hex)
}

fn into_action(scored: Scored) -> PlannedAction {
    let Scored {
        candidate,
        breakdown,
        total,
    } = scored;

    let detail = match (candidate.kind, candidate.target, candidate.objective) {
        (ActionKind::Attack, Some(target), _) => format!("{} from {}", target.state.id, candidate.hex()),
        (ActionKind::ObjectiveAdvance | ActionKind::Approach, _, Some(objective)) => {
            format!("toward {} at {}", objective.name, objective.hex)
        }
        (ActionKind::Pressure, _, _) => match candidate.aim {
            Some(aim) => format!("toward enemy at {aim}"),
            None => String::new(),
        },
        _ => format!("at {}", candidate.hex()),
    };

    PlannedAction {
        unit_id: candidate.unit.state.id.clone(),
        kind: candidate.kind,
        destination: candidate.hex(),
        path: candidate.destination.path.clone(),
        target: candidate.target.map(|t| t.state.id.clone()),
        expected_damage: candidate.estimate.expected_damage(),
        expected_retaliation: candidate.estimate.expected_retaliation(),
        score: total,
        rationale: format!("{} {}: {}", candidate.kind, detail, breakdown),
        breakdown,
    }
}
