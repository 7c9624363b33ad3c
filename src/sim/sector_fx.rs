//! Sector floor-damage application: walks every shootable mobj's
//! [`Touching`] sector list each tic and applies
//! [`crate::specials::damage_for_special`]'s damage, gated by a per-mobj
//! cooldown (`P_PlayerInSpecialSector`, generalized from players-only to
//! every mobj standing in the sector).

use std::collections::HashMap;

use hecs::{Entity, World};

use super::components::{Health, Touching};
use crate::specials::damage::{DAMAGE_COOLDOWN_TICS, damage_for_special};
use crate::world::Level;

pub fn sector_damage_system(world: &mut World, level: &Level, cooldowns: &mut HashMap<Entity, i32>) {
    cooldowns.retain(|&e, _| world.contains(e));

    for (entity, (health, touching)) in world.query_mut::<(&mut Health, &Touching)>() {
        let cooldown = cooldowns.entry(entity).or_insert(0);
        if *cooldown > 0 {
            *cooldown -= 1;
            continue;
        }

        let Some(damage) = touching
            .0
            .iter()
            .filter_map(|&sector| damage_for_special(level.sectors[sector as usize].special))
            .max_by_key(|d| d.amount)
        else {
            continue;
        };

        health.0 -= damage.amount;
        if damage.instant_death {
            health.0 = health.0.min(0);
        }
        *cooldown = DAMAGE_COOLDOWN_TICS;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::components::RefCount;
    use crate::world::geometry::{Level as GeomLevel, Sector, Subsector};
    use smallvec::smallvec;

    fn level_with_damaging_sector(special: i16) -> GeomLevel {
        GeomLevel {
            name: "T".into(),
            things: vec![],
            linedefs: vec![],
            sidedefs: vec![],
            vertices: vec![],
            segs: vec![],
            subsectors: vec![Subsector {
                seg_count: 0,
                first_seg: 0,
                sector: 0,
                things: vec![],
            }],
            nodes: vec![],
            sectors: vec![Sector {
                id: 0,
                floor_h: 0.0,
                ceil_h: 128.0,
                floor_tex: 0,
                ceil_tex: 0,
                light: 160.0,
                special,
                tag: 0,
                ext_flags: Default::default(),
                lines: vec![],
                extrafloors: vec![],
                floor_slope: None,
                ceil_slope: None,
            }],
            blockmap: None,
            reject: None,
        }
    }

    #[test]
    fn damage_applies_once_then_waits_for_cooldown() {
        let level = level_with_damaging_sector(7); // 5 dmg/application
        let mut world = World::new();
        let mut cooldowns = HashMap::new();
        let ent = world.spawn((Health(100), Touching(smallvec![0]), RefCount(0)));

        sector_damage_system(&mut world, &level, &mut cooldowns);
        assert_eq!(world.get::<&Health>(ent).unwrap().0, 95);

        sector_damage_system(&mut world, &level, &mut cooldowns);
        assert_eq!(
            world.get::<&Health>(ent).unwrap().0,
            95,
            "cooldown should suppress immediate re-damage"
        );
    }

    #[test]
    fn non_damaging_sector_leaves_health_untouched() {
        let level = level_with_damaging_sector(0);
        let mut world = World::new();
        let mut cooldowns = HashMap::new();
        let ent = world.spawn((Health(100), Touching(smallvec![0]), RefCount(0)));

        sector_damage_system(&mut world, &level, &mut cooldowns);
        assert_eq!(world.get::<&Health>(ent).unwrap().0, 100);
    }
}
