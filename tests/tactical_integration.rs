//! Tactical core integration tests: the engines working together through the
//! public API

use frontline::battle::ai::{plan_bot_turn, ActionKind, PlannerInput, StandardBattlefield};
use frontline::battle::combat::{compute_accuracy, AttackRequest};
use frontline::battle::*;
use frontline::core::{CommanderBonus, Difficulty, Side, Tuning, UnitId};
use frontline::supply::{find_supply_route, has_supply_path, supply_tick, SupplyNetwork, UnitMoveProfile};

fn unit(catalog: &UnitCatalog, id: &str, key: &str, side: Side, q: i32, r: i32) -> UnitRuntimeState {
    UnitRuntimeState::new(id, catalog.get(key).unwrap(), side, HexCoord::new(q, r))
}

fn combatants<'a>(catalog: &'a UnitCatalog, units: &'a [UnitRuntimeState]) -> Vec<Combatant<'a>> {
    units
        .iter()
        .map(|u| Combatant::new(catalog.get(&u.type_key).unwrap(), u))
        .collect()
}

#[test]
fn test_line_of_sight_rules() {
    let mut map = BattleMap::new(20, 5);
    map.set_terrain(HexCoord::new(3, 0), TerrainKind::Forest);

    // Forest between two ground units three hexes apart
    assert!(!is_visible(HexCoord::new(1, 0), HexCoord::new(4, 0), UnitClass::Infantry, false, &map));
    // Adjacent is always visible, even into the forest
    assert!(is_visible(HexCoord::new(2, 0), HexCoord::new(3, 0), UnitClass::Infantry, false, &map));
    // Recon planes look over low blocking terrain
    assert!(is_visible(HexCoord::new(0, 0), HexCoord::new(6, 0), UnitClass::Recon, true, &map));

    // A hill in the way stops even the plane
    map.set_terrain(HexCoord::new(4, 0), TerrainKind::Hill);
    assert!(!is_visible(HexCoord::new(0, 0), HexCoord::new(6, 0), UnitClass::Recon, true, &map));
}

#[test]
fn test_recon_needs_two_blocking_hexes() {
    let mut map = BattleMap::new(20, 5);
    map.set_terrain(HexCoord::new(3, 0), TerrainKind::Forest);
    let (from, to) = (HexCoord::new(0, 0), HexCoord::new(6, 0));

    assert!(is_visible(from, to, UnitClass::Recon, false, &map));
    assert!(!is_visible(from, to, UnitClass::Tank, false, &map));

    map.set_terrain(HexCoord::new(4, 0), TerrainKind::Urban);
    assert!(!is_visible(from, to, UnitClass::Recon, false, &map));
}

#[test]
fn test_accuracy_falls_with_distance() {
    let catalog = UnitCatalog::standard();
    let tuning = Tuning::default();
    let inf = catalog.get("Infantry_42").unwrap();
    let attacker = unit(&catalog, "a", "Infantry_42", Side::Bot, 0, 0);

    let mut last = f32::INFINITY;
    for q in 1..=8 {
        let defender = unit(&catalog, "d", "Infantry_42", Side::Player, q, 0);
        let accuracy = compute_accuracy(&AttackRequest::new(inf, &attacker, inf, &defender), &tuning).final_accuracy;
        assert!(accuracy <= last, "accuracy rose at distance {q}");
        last = accuracy;
    }

    let near = unit(&catalog, "d", "Infantry_42", Side::Player, 1, 0);
    let far = unit(&catalog, "d", "Infantry_42", Side::Player, 3, 0);
    let at_one = compute_accuracy(&AttackRequest::new(inf, &attacker, inf, &near), &tuning).final_accuracy;
    let at_three = compute_accuracy(&AttackRequest::new(inf, &attacker, inf, &far), &tuning).final_accuracy;
    assert!((at_one - at_three - 10.0).abs() < 1e-4);
}

#[test]
fn test_accuracy_clamped_for_extremes() {
    let catalog = UnitCatalog::standard();
    let tuning = Tuning::default();
    let at = catalog.get("Pak_40").unwrap();
    let tank = catalog.get("Panzer_IV").unwrap();
    let gun = unit(&catalog, "g", "Pak_40", Side::Bot, 0, 0).with_experience(u8::MAX);
    let target = unit(&catalog, "t", "Panzer_IV", Side::Player, 1, 0);

    let hot = AttackRequest::new(at, &gun, tank, &target).with_commander(CommanderBonus::new(500.0, 0.0));
    assert_eq!(compute_accuracy(&hot, &tuning).final_accuracy, tuning.accuracy.max);

    let cold = AttackRequest::new(at, &gun, tank, &target).with_commander(CommanderBonus::new(-100.0, 0.0));
    assert_eq!(compute_accuracy(&cold, &tuning).final_accuracy, tuning.accuracy.min);
}

#[test]
fn test_exchange_through_battlefield() {
    let mut map = BattleMap::new(10, 10);
    map.set_terrain(HexCoord::new(5, 5), TerrainKind::Urban);
    let tuning = Tuning::default();
    let catalog = UnitCatalog::standard();

    let tank = unit(&catalog, "b1", "Panzer_IV", Side::Bot, 3, 5);
    let defender = unit(&catalog, "p1", "Infantry_42", Side::Player, 5, 5);
    let tank_def = catalog.get("Panzer_IV").unwrap();
    let inf_def = catalog.get("Infantry_42").unwrap();

    let field = StandardBattlefield::new(&map, &tuning);
    let from_range = field.estimate_attack(Combatant::new(tank_def, &tank), tank.hex, Combatant::new(inf_def, &defender));
    assert!(from_range.expected_damage() > 0.0);
    // Infantry cannot answer at two hexes
    assert!(from_range.retaliation.is_none());

    let adjacent = field.estimate_attack(
        Combatant::new(tank_def, &tank),
        HexCoord::new(4, 5),
        Combatant::new(inf_def, &defender),
    );
    assert!(adjacent.retaliation.is_some());
}

#[test]
fn test_supply_cut_and_tick() {
    let mut map = BattleMap::new(20, 3);
    for q in 0..6 {
        map.set_road(HexCoord::new(q, 1), true);
    }
    let catalog = UnitCatalog::standard();
    let tuning = Tuning::default();
    let network = SupplyNetwork::new(&map, [HexCoord::new(0, 1)]);

    let mut units = vec![
        unit(&catalog, "near", "Panzer_IV", Side::Bot, 5, 1).with_supplies(3, 3).with_entrenchment(2),
        unit(&catalog, "far", "Panzer_IV", Side::Bot, 18, 1).with_supplies(3, 3).with_entrenchment(2),
    ];
    assert!(has_supply_path(units[0].hex, &network, &tuning));
    assert!(!has_supply_path(units[1].hex, &network, &tuning));

    let events = supply_tick(&mut units, &network, &catalog, 0, &tuning);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].unit, UnitId::new("far"));
    assert_eq!((units[1].ammo, units[1].fuel, units[1].entrenchment), (2, 2, 1));
    assert_eq!(units[1].strength, 100.0);
    assert_eq!((units[0].ammo, units[0].fuel, units[0].entrenchment), (3, 3, 2));
}

#[test]
fn test_cut_off_exhaustion() {
    let map = BattleMap::new(12, 3);
    let catalog = UnitCatalog::standard();
    let tuning = Tuning::default();
    let network = SupplyNetwork::new(&map, [HexCoord::new(0, 1)]);

    let mut units = vec![
        unit(&catalog, "tank", "Panzer_IV", Side::Bot, 11, 0).with_supplies(5, 1),
        unit(&catalog, "rifles", "Infantry_42", Side::Bot, 11, 2).with_supplies(5, 0),
    ];
    let events = supply_tick(&mut units, &network, &catalog, 0, &tuning);
    assert_eq!(events.len(), 2);

    // Last drop of fuel gone: the tank bleeds
    assert_eq!((units[0].ammo, units[0].fuel), (4, 0));
    assert_eq!(units[0].strength, 90.0);

    // Foot infantry never carried fuel, so an empty tank means nothing
    assert_eq!((units[1].ammo, units[1].fuel), (4, 0));
    assert_eq!(units[1].strength, 100.0);
    assert_eq!(events[1].strength_lost, 0.0);
}

#[test]
fn test_route_from_source_to_itself() {
    let map = BattleMap::new(6, 6);
    let tuning = Tuning::default();
    let network = SupplyNetwork::new(&map, [HexCoord::new(2, 2)]);
    let truck = UnitMoveProfile::for_unit(UnitCatalog::standard().get("Supply_Truck").unwrap(), &tuning);

    let route = find_supply_route(HexCoord::new(2, 2), HexCoord::new(2, 2), &network, &truck, &tuning).unwrap();
    assert_eq!(route.total_cost, 0.0);
    assert_eq!(route.path, vec![HexCoord::new(2, 2)]);
}

#[test]
fn test_bot_turn_end_to_end() {
    let mut map = BattleMap::new(14, 10);
    map.set_terrain(HexCoord::new(8, 4), TerrainKind::Forest);
    map.set_terrain(HexCoord::new(8, 5), TerrainKind::Forest);
    for q in 0..14 {
        map.set_road(HexCoord::new(q, 7), true);
    }
    let objectives = [Objective::new(HexCoord::new(11, 7), "Bridge", 20)];
    let tuning = Tuning::default();
    let catalog = UnitCatalog::standard();

    let bots = vec![
        unit(&catalog, "b_inf", "Infantry_42", Side::Bot, 2, 4),
        unit(&catalog, "b_tank", "Panzer_IV", Side::Bot, 3, 7),
        unit(&catalog, "b_dead", "Infantry_42", Side::Bot, 1, 1).with_strength(0.0),
    ];
    let enemies = vec![
        unit(&catalog, "p_inf", "Infantry_42", Side::Player, 6, 4).with_strength(40.0),
        unit(&catalog, "p_at", "Pak_40", Side::Player, 10, 6),
    ];

    let field = StandardBattlefield::new(&map, &tuning).for_difficulty(Difficulty::Normal);
    let input = PlannerInput::new(
        combatants(&catalog, &bots),
        combatants(&catalog, &enemies),
        &objectives,
        Difficulty::Normal,
        &field,
        &tuning,
    );

    let actions = plan_bot_turn(&input);
    assert_eq!(actions.len(), 2);
    assert!(actions.windows(2).all(|w| w[0].score >= w[1].score));

    let infantry = actions.iter().find(|a| a.unit_id == UnitId::new("b_inf")).unwrap();
    assert_eq!(infantry.kind, ActionKind::Attack);
    assert_eq!(infantry.target, Some(UnitId::new("p_inf")));
    assert_eq!(infantry.breakdown.get("focus_fire"), Some(4.0));

    // No two units end on the same hex
    assert_ne!(actions[0].destination, actions[1].destination);
    for action in &actions {
        assert!(!enemies.iter().any(|e| e.hex == action.destination));
        assert!(!action.rationale.is_empty());
    }

    assert_eq!(plan_bot_turn(&input), actions);
}
