//! Out-of-supply attrition

use serde::{Deserialize, Serialize};

use crate::battle::hex::HexCoord;
use crate::battle::unit_type::UnitCatalog;
use crate::battle::units::UnitRuntimeState;
use crate::core::config::Tuning;
use crate::core::types::UnitId;
use crate::supply::network::{has_supply_path, SupplyMap, SupplyNetwork};

/// What one unit lost to a supply tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttritionEvent {
    pub unit: UnitId,
    pub hex: HexCoord,
    pub ammo_lost: u32,
    pub fuel_lost: u32,
    pub entrenchment_lost: u8,
    pub strength_lost: f32,
}

/// Apply one logistics tick to every unit cut off from `network`.
///
/// Ammo and fuel fall by the configured losses minus `mitigation`,
/// entrenchment by its own loss; all floor at zero. A unit left with no ammo,
/// or no fuel when its type carries fuel, also loses strength. Units of a
/// type missing from the catalog are treated as carrying both.
pub fn supply_tick<M: SupplyMap + ?Sized>(
    units: &mut [UnitRuntimeState],
    network: &SupplyNetwork<M>,
    catalog: &UnitCatalog,
    mitigation: u32,
    tuning: &Tuning,
) -> Vec<AttritionEvent> {
    let supply = &tuning.supply;
    let ammo_rate = supply.ammo_loss.saturating_sub(mitigation);
    let fuel_rate = supply.fuel_loss.saturating_sub(mitigation);
    let mut events = Vec::new();

    for unit in units.iter_mut() {
        if unit.is_destroyed() || has_supply_path(unit.hex, network, tuning) {
            continue;
        }

        let ammo_before = unit.ammo;
        let fuel_before = unit.fuel;
        let entrench_before = unit.entrenchment;

        unit.ammo = unit.ammo.saturating_sub(ammo_rate);
        unit.fuel = unit.fuel.saturating_sub(fuel_rate);
        unit.entrenchment = unit.entrenchment.saturating_sub(supply.entrench_loss);

        let carries_fuel = catalog.get(&unit.type_key).map_or(true, |def| def.fuel > 0);
        let exhausted = unit.ammo == 0 || (carries_fuel && unit.fuel == 0);

        let strength_before = unit.strength;
        if exhausted {
            unit.set_strength(unit.strength - supply.strength_loss);
        }

        let event = AttritionEvent {
            unit: unit.id.clone(),
            hex: unit.hex,
            ammo_lost: ammo_before - unit.ammo,
            fuel_lost: fuel_before - unit.fuel,
            entrenchment_lost: entrench_before - unit.entrenchment,
            strength_lost: strength_before - unit.strength,
        };
        tracing::debug!(
            unit = %event.unit,
            hex = %event.hex,
            ammo_lost = event.ammo_lost,
            fuel_lost = event.fuel_lost,
            strength_lost = event.strength_lost,
            "out of supply"
        );
        events.push(event);
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::battle_map::BattleMap;
    use crate::core::types::Side;

    fn cut_off_tank(catalog: &UnitCatalog) -> UnitRuntimeState {
        let def = catalog.get("Panzer_IV").unwrap();
        UnitRuntimeState::new("t1", def, Side::Bot, HexCoord::new(9, 0))
            .with_supplies(3, 3)
            .with_entrenchment(2)
    }

    #[test]
    fn test_tick_reduces_supplies() {
        let map = BattleMap::new(10, 1);
        let network = SupplyNetwork::new(&map, [HexCoord::new(0, 0)]);
        let catalog = UnitCatalog::standard();
        let mut units = vec![cut_off_tank(&catalog)];

        let events = supply_tick(&mut units, &network, &catalog, 0, &Tuning::default());
        assert_eq!(units[0].ammo, 2);
        assert_eq!(units[0].fuel, 2);
        assert_eq!(units[0].entrenchment, 1);
        assert_eq!(units[0].strength, 100.0);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].strength_lost, 0.0);
    }

    #[test]
    fn test_supplied_units_untouched() {
        let map = BattleMap::new(10, 1);
        let network = SupplyNetwork::new(&map, [HexCoord::new(8, 0)]);
        let catalog = UnitCatalog::standard();
        let mut units = vec![cut_off_tank(&catalog)];
        let before = units.clone();

        let events = supply_tick(&mut units, &network, &catalog, 0, &Tuning::default());
        assert!(events.is_empty());
        assert_eq!(units, before);
    }

    #[test]
    fn test_exhaustion_costs_strength() {
        let map = BattleMap::new(10, 1);
        let network = SupplyNetwork::new(&map, []);
        let catalog = UnitCatalog::standard();
        let mut units = vec![cut_off_tank(&catalog).with_supplies(1, 5)];

        supply_tick(&mut units, &network, &catalog, 0, &Tuning::default());
        assert_eq!(units[0].ammo, 0);
        assert_eq!(units[0].strength, 90.0);

        // Still empty next tick: keeps bleeding, counters stay at zero
        supply_tick(&mut units, &network, &catalog, 0, &Tuning::default());
        assert_eq!(units[0].ammo, 0);
        assert_eq!(units[0].strength, 80.0);
    }

    #[test]
    fn test_empty_tank_costs_strength() {
        let map = BattleMap::new(10, 1);
        let network = SupplyNetwork::new(&map, []);
        let catalog = UnitCatalog::standard();
        let mut units = vec![cut_off_tank(&catalog).with_supplies(5, 1)];

        let events = supply_tick(&mut units, &network, &catalog, 0, &Tuning::default());
        assert_eq!((units[0].ammo, units[0].fuel), (4, 0));
        assert_eq!(units[0].strength, 90.0);
        assert_eq!(events[0].fuel_lost, 1);
        assert_eq!(events[0].strength_lost, 10.0);
    }

    #[test]
    fn test_foot_infantry_without_fuel_not_exhausted() {
        let map = BattleMap::new(10, 1);
        let network = SupplyNetwork::new(&map, []);
        let catalog = UnitCatalog::standard();
        let def = catalog.get("Infantry_42").unwrap();
        let mut units = vec![UnitRuntimeState::new("i1", def, Side::Player, HexCoord::new(5, 0))];

        supply_tick(&mut units, &network, &catalog, 0, &Tuning::default());
        assert_eq!(units[0].fuel, 0);
        assert_eq!(units[0].strength, 100.0);
    }

    #[test]
    fn test_mitigation_never_adds_supplies() {
        let map = BattleMap::new(10, 1);
        let network = SupplyNetwork::new(&map, []);
        let catalog = UnitCatalog::standard();
        let mut units = vec![cut_off_tank(&catalog)];

        let events = supply_tick(&mut units, &network, &catalog, 5, &Tuning::default());
        assert_eq!(units[0].ammo, 3);
        assert_eq!(units[0].fuel, 3);
        // Entrenchment erodes regardless
        assert_eq!(units[0].entrenchment, 1);
        assert_eq!(events[0].ammo_lost, 0);
    }
}
