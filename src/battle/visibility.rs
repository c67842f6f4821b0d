//! Line of sight between two hexes
//!
//! Pure queries: nothing here mutates state, so independent calls can run in
//! any order.

use crate::battle::hex::HexCoord;
use crate::battle::terrain::TerrainLookup;
use crate::battle::unit_type::UnitClass;

/// Airborne recon ignores low blocking terrain out to this distance
pub const AIR_RECON_LOS_RANGE: u32 = 8;

/// Strike aircraft ignore low blocking terrain out to this distance
pub const AIR_STRIKE_LOS_RANGE: u32 = 4;

/// Can a unit at `attacker` see `target`?
///
/// Adjacent hexes are always visible. Airborne recon (within 8) and strike
/// aircraft (within 4) look over blocking terrain unless it is raised
/// ground. Ground units are blocked by any blocking interior hex, except
/// that recon needs two in a row, and a unit on raised ground looks over a
/// raised hex directly in front of it.
pub fn is_visible(
    attacker: HexCoord,
    target: HexCoord,
    attacker_class: UnitClass,
    is_airborne: bool,
    terrain: &(impl TerrainLookup + ?Sized),
) -> bool {
    let line = attacker.line_to(&target);
    if line.len() <= 2 {
        return true;
    }

    let distance = (line.len() - 1) as u32;
    let interior = &line[1..line.len() - 1];

    if is_airborne && has_enhanced_air_view(attacker_class, distance) {
        return !interior
            .iter()
            .filter_map(|hex| terrain.terrain_at(*hex))
            .any(|t| t.blocks_los && t.is_elevated());
    }

    let attacker_elevated = terrain
        .terrain_at(attacker)
        .is_some_and(|t| t.is_elevated());
    let is_recon = attacker_class == UnitClass::Recon;

    let mut consecutive = 0;
    for (i, hex) in interior.iter().enumerate() {
        let blocking = match terrain.terrain_at(*hex) {
            Some(t) if t.blocks_los => {
                !(i == 0 && attacker_elevated && t.is_elevated())
            }
            _ => false,
        };

        if !blocking {
            consecutive = 0;
            continue;
        }

        consecutive += 1;
        if !is_recon || consecutive >= 2 {
            return false;
        }
    }

    true
}

fn has_enhanced_air_view(class: UnitClass, distance: u32) -> bool {
    (class == UnitClass::Recon && distance <= AIR_RECON_LOS_RANGE)
        || (class.is_strike_air() && distance <= AIR_STRIKE_LOS_RANGE)
}
