//! Frontline - command-line front end for the tactical core
//!
//! Loads a scenario snapshot and runs one engine over it: the bot planner,
//! a line-of-sight check, an attack estimate, supply connectivity or a
//! supply route.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use frontline::battle::ai::{plan_bot_turn, Battlefield, StandardBattlefield};
use frontline::battle::{
    is_visible, CombatPenalty, Combatant, ExchangeContext, HexCoord, UnitCatalog, UnitRuntimeState,
};
use frontline::core::{Difficulty, FrontlineError, Result, Side, Tuning};
use frontline::scenario::{ResolvedScenario, Scenario};
use frontline::supply::{find_supply_route, has_supply_path, supply_tick, SupplyNetwork, UnitMoveProfile};

#[derive(Parser, Debug)]
#[command(name = "frontline")]
#[command(about = "Run the tactical core over a battle snapshot")]
struct Args {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Plan the bot side's turn
    Plan {
        /// Scenario snapshot (.json or .toml)
        scenario: PathBuf,
        /// Override the scenario's difficulty
        #[arg(long)]
        difficulty: Option<Difficulty>,
    },
    /// Check whether a unit can see a hex
    Los {
        scenario: PathBuf,
        /// Viewing unit id
        unit: String,
        /// Target hex as "q,r"
        target: HexCoord,
    },
    /// Estimate an attack and the return fire it draws
    Attack {
        scenario: PathBuf,
        attacker: String,
        defender: String,
        /// Fire from this hex instead of the attacker's own
        #[arg(long)]
        from: Option<HexCoord>,
    },
    /// Report which units are in supply, optionally applying one tick
    Supply {
        scenario: PathBuf,
        /// Apply attrition to cut-off units
        #[arg(long)]
        tick: bool,
        /// Supply loss reduction from logistics upgrades
        #[arg(long, default_value_t = 0)]
        mitigation: u32,
    },
    /// Cheapest supply route between two hexes
    Route {
        scenario: PathBuf,
        from: HexCoord,
        to: HexCoord,
        /// Unit type whose movement the convoy uses
        #[arg(long, default_value = "Supply_Truck")]
        unit_type: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    // Logs go to stderr so JSON output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("frontline=info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let catalog = UnitCatalog::standard();
    let tuning = Tuning::standard();
    tuning.validate()?;

    match &args.command {
        Command::Plan { scenario, difficulty } => {
            let mut battle = load(scenario, &catalog)?;
            if let Some(difficulty) = difficulty {
                battle.difficulty = *difficulty;
            }
            run_plan(&battle, &catalog, tuning, args.format)
        }
        Command::Los { scenario, unit, target } => {
            let battle = load(scenario, &catalog)?;
            run_los(&battle, &catalog, unit, *target, args.format)
        }
        Command::Attack {
            scenario,
            attacker,
            defender,
            from,
        } => {
            let battle = load(scenario, &catalog)?;
            run_attack(&battle, &catalog, tuning, attacker, defender, *from, args.format)
        }
        Command::Supply {
            scenario,
            tick,
            mitigation,
        } => {
            let battle = load(scenario, &catalog)?;
            run_supply(&battle, &catalog, tuning, *tick, *mitigation, args.format)
        }
        Command::Route {
            scenario,
            from,
            to,
            unit_type,
        } => {
            let battle = load(scenario, &catalog)?;
            run_route(&battle, &catalog, tuning, *from, *to, unit_type, args.format)
        }
    }
}

fn load(path: &Path, catalog: &UnitCatalog) -> Result<ResolvedScenario> {
    let battle = Scenario::load(path)?.resolve(catalog)?;
    tracing::info!(
        scenario = %battle.name,
        units = battle.units.len(),
        difficulty = %battle.difficulty,
        "scenario loaded"
    );
    Ok(battle)
}

fn emit<T: Serialize>(format: OutputFormat, value: &T, text: impl FnOnce() -> String) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => println!("{}", text()),
    }
    Ok(())
}

fn combatant<'a>(battle: &'a ResolvedScenario, catalog: &'a UnitCatalog, id: &str) -> Result<Combatant<'a>> {
    let state = battle.unit(id)?;
    let def = catalog
        .get(&state.type_key)
        .ok_or_else(|| FrontlineError::UnknownUnitType(state.type_key.clone()))?;
    Ok(Combatant::new(def, state))
}

fn run_plan(battle: &ResolvedScenario, catalog: &UnitCatalog, tuning: &Tuning, format: OutputFormat) -> Result<()> {
    let field = StandardBattlefield::new(&battle.map, tuning).for_difficulty(battle.difficulty);
    let input = battle.planner_input(catalog, &field, tuning);
    let actions = plan_bot_turn(&input);

    emit(format, &actions, || {
        let lines: Vec<String> = actions
            .iter()
            .map(|a| {
                format!(
                    "{:<8} {:<8} -> {:<7} {:>7.2}  {}",
                    a.unit_id.as_str(),
                    a.kind.to_string(),
                    a.destination.to_string(),
                    a.score,
                    a.rationale
                )
            })
            .collect();
        lines.join("\n")
    })
}

#[derive(Serialize)]
struct LosReport<'a> {
    unit: &'a str,
    from: HexCoord,
    target: HexCoord,
    distance: u32,
    visible: bool,
    in_vision: bool,
    /// Opposing units inside the viewer's vision range and line of sight
    enemies_seen: Vec<&'a str>,
}

fn run_los(
    battle: &ResolvedScenario,
    catalog: &UnitCatalog,
    unit: &str,
    target: HexCoord,
    format: OutputFormat,
) -> Result<()> {
    let viewer = combatant(battle, catalog, unit)?;
    let from = viewer.state.hex;
    let seen = battle
        .map
        .visible_hexes(from, viewer.def.vision, viewer.def.class, viewer.def.is_airborne());
    let enemy = viewer.state.side.opponent();
    let report = LosReport {
        unit,
        from,
        target,
        distance: from.distance(&target),
        visible: is_visible(from, target, viewer.def.class, viewer.def.is_airborne(), &battle.map),
        in_vision: from.distance(&target) <= viewer.def.vision,
        enemies_seen: battle
            .units
            .iter()
            .filter(|u| u.side == enemy && !u.is_destroyed() && seen.contains(&u.hex))
            .map(|u| u.id.as_str())
            .collect(),
    };

    emit(format, &report, || {
        let sight = if report.visible { "clear" } else { "blocked" };
        let spotted = if report.enemies_seen.is_empty() {
            "none".to_string()
        } else {
            report.enemies_seen.join(", ")
        };
        format!(
            "{} at {} -> {}: line {} at distance {} (vision {})\nenemies in sight: {}",
            unit, from, target, sight, report.distance, viewer.def.vision, spotted
        )
    })
}

fn run_attack(
    battle: &ResolvedScenario,
    catalog: &UnitCatalog,
    tuning: &Tuning,
    attacker: &str,
    defender: &str,
    from: Option<HexCoord>,
    format: OutputFormat,
) -> Result<()> {
    let attacker = combatant(battle, catalog, attacker)?;
    let defender = combatant(battle, catalog, defender)?;
    let from = from.unwrap_or(attacker.state.hex);

    // The difficulty handicap only ever applies to the bot's fire
    let penalty_for = |side: Side| match side {
        Side::Bot => CombatPenalty::from_difficulty(tuning.difficulty.get(battle.difficulty)),
        Side::Player => CombatPenalty::none(),
    };
    let field = StandardBattlefield::new(&battle.map, tuning).with_exchange(ExchangeContext {
        attacker_penalty: penalty_for(attacker.state.side),
        defender_penalty: penalty_for(defender.state.side),
        ..ExchangeContext::default()
    });
    let estimate = field.estimate_attack(attacker, from, defender);

    emit(format, &estimate, || {
        let Some(attack) = &estimate.attack else {
            return format!("{} cannot attack: no ammo", attacker.state.id);
        };
        let mut text = format!(
            "{} -> {} from {}: accuracy {:.1}%, {} shots, {:.2} expected damage, {:.2} suppression ({:?} armor {})",
            attacker.state.id,
            defender.state.id,
            from,
            attack.accuracy,
            attack.shots,
            attack.expected_damage,
            attack.expected_suppression,
            attack.facing,
            attack.facing_armor,
        );
        match &estimate.retaliation {
            Some(reply) => text.push_str(&format!("\nreturn fire: {:.2} expected damage", reply.expected_damage)),
            None => text.push_str("\nno return fire"),
        }
        text
    })
}

#[derive(Serialize)]
struct SupplyRow<'a> {
    unit: &'a str,
    side: Side,
    hex: HexCoord,
    supplied: bool,
}

fn run_supply(
    battle: &ResolvedScenario,
    catalog: &UnitCatalog,
    tuning: &Tuning,
    tick: bool,
    mitigation: u32,
    format: OutputFormat,
) -> Result<()> {
    let network_for = |side: Side| SupplyNetwork::new(&battle.map, battle.sources(side).iter().copied());

    if tick {
        let mut events = Vec::new();
        for side in [Side::Player, Side::Bot] {
            let mut units: Vec<UnitRuntimeState> =
                battle.units.iter().filter(|u| u.side == side).cloned().collect();
            events.extend(supply_tick(&mut units, &network_for(side), catalog, mitigation, tuning));
        }
        return emit(format, &events, || {
            if events.is_empty() {
                return "every unit is in supply".to_string();
            }
            let lines: Vec<String> = events
                .iter()
                .map(|e| {
                    format!(
                        "{} at {}: -{} ammo, -{} fuel, -{} entrenchment, -{:.0} strength",
                        e.unit, e.hex, e.ammo_lost, e.fuel_lost, e.entrenchment_lost, e.strength_lost
                    )
                })
                .collect();
            lines.join("\n")
        });
    }

    let rows: Vec<SupplyRow> = battle
        .units
        .iter()
        .map(|u| SupplyRow {
            unit: u.id.as_str(),
            side: u.side,
            hex: u.hex,
            supplied: has_supply_path(u.hex, &network_for(u.side), tuning),
        })
        .collect();

    emit(format, &rows, || {
        let lines: Vec<String> = rows
            .iter()
            .map(|r| {
                let status = if r.supplied { "in supply" } else { "CUT OFF" };
                format!("{:<8} {:<7} {:<7} {}", r.unit, format!("{:?}", r.side), r.hex.to_string(), status)
            })
            .collect();
        lines.join("\n")
    })
}

fn run_route(
    battle: &ResolvedScenario,
    catalog: &UnitCatalog,
    tuning: &Tuning,
    from: HexCoord,
    to: HexCoord,
    unit_type: &str,
    format: OutputFormat,
) -> Result<()> {
    let def = catalog
        .get(unit_type)
        .ok_or_else(|| FrontlineError::UnknownUnitType(unit_type.to_string()))?;
    let network = SupplyNetwork::new(&battle.map, [from]);
    let route = find_supply_route(from, to, &network, &UnitMoveProfile::for_unit(def, tuning), tuning);

    emit(format, &route, || match &route {
        Some(route) => {
            let path: Vec<String> = route.path.iter().map(HexCoord::to_string).collect();
            format!(
                "cost {:.2}, {} road steps, {:.1} h\n{}",
                route.total_cost,
                route.road_steps,
                route.travel_hours,
                path.join(" -> ")
            )
        }
        None => format!("no route from {from} to {to}"),
    })
}
