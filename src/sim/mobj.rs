//! Mobj lifecycle: spawning, the weak-reference refcount discipline, and
//! the two-phase removal / stale-reference sweep.
//!
//! The classic "global registry" (a head/prev/next linked
//! list used for iteration and serialization) is simply the `hecs::World`
//! itself here: iteration is `world.query::<...>()`, and `hecs::Entity`
//! already carries the generation counter a hand-rolled weak reference would
//! need, so there's no separate arena to maintain. What this module adds on
//! top is the parts vanilla Doom gets from raw pointers that an ECS doesn't
//! hand you for free: reference counting across
//! `source`/`target`/`tracer`/`supportobj` and the blockmap / subsector /
//! sector-touch bookkeeping.

use std::collections::HashMap;

use glam::{Vec2, Vec3};
use hecs::{Entity, World};
use smallvec::SmallVec;

use super::components::{
    ActorFlags, Angle, Animation, Class, ExtMobjFlags, Health, MobjRefs, Position, RefCount,
    Removed, Subsector, Touching, Velocity,
};
use super::spacial::{ThingGrid, ThingSpatial};
use crate::defs::{MobjInfo, flags::MobjFlags};
use crate::world::{Aabb, Level, SectorId, SubsectorId};

/// Blockmap-backed indices kept in sync with every live mobj's position:
/// the dynamic thing blockmap, each subsector's thinglist, and
/// the sector <-> mobj touch graph (its "touch-node list").
pub struct SpatialIndex {
    pub thing_grid: ThingGrid,
    subsector_things: HashMap<SubsectorId, SmallVec<[Entity; 8]>>,
    sector_touch: HashMap<SectorId, SmallVec<[Entity; 8]>>,
}

impl SpatialIndex {
    pub fn new(blockmap_origin: Vec2) -> Self {
        Self {
            thing_grid: ThingGrid::new(blockmap_origin),
            subsector_things: HashMap::new(),
            sector_touch: HashMap::new(),
        }
    }

    pub fn things_in_subsector(&self, ss: SubsectorId) -> &[Entity] {
        self.subsector_things
            .get(&ss)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn things_touching_sector(&self, sector: SectorId) -> &[Entity] {
        self.sector_touch
            .get(&sector)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Compute which sectors a bbox overlaps: always the sector of the
    /// subsector the center point resolves to, plus the far side of any
    /// blockmap line crossing the bbox (a cheap over-approximation of the
    /// "thing radius overlaps sector" test vanilla's `P_CreateSecNodeList`
    /// performs exactly; close enough for sector damage / sound routing).
    fn overlapped_sectors(level: &Level, bbox: Aabb, center_ss: SubsectorId) -> SmallVec<[SectorId; 4]> {
        let mut out = SmallVec::<[SectorId; 4]>::new();
        let center_sector = level.subsectors[center_ss as usize].sector;
        out.push(center_sector);
        level.block_lines_iter(bbox, |line| {
            for sd in [line.right_sidedef, line.left_sidedef].into_iter().flatten() {
                if let Some(sd) = level.sidedefs.get(sd as usize) {
                    if !out.contains(&sd.sector) {
                        out.push(sd.sector);
                    }
                }
            }
            true
        });
        out
    }

    /// Insert `ent` into every index at its current `Position`/`Subsector`,
    /// and fill in its `Touching` list.
    pub fn link(&mut self, world: &World, level: &Level, ent: Entity) {
        let (pos, class, flags, ss) = {
            let pos = *world.get::<&Position>(ent).unwrap();
            let class = *world.get::<&Class>(ent).unwrap();
            let flags = *world.get::<&ActorFlags>(ent).unwrap();
            let ss = world.get::<&Subsector>(ent).unwrap().0;
            (pos, class, flags, ss)
        };

        if !flags.0.contains(MobjFlags::NOBLOCKMAP) {
            self.thing_grid.insert(ThingSpatial {
                ent,
                pos,
                class,
                flags,
            });
        }
        if !flags.0.contains(MobjFlags::NOSECTOR) {
            self.subsector_things.entry(ss).or_default().push(ent);

            let radius = class.0.radius as f32;
            let bbox = Aabb {
                min: pos.0 - Vec2::splat(radius),
                max: pos.0 + Vec2::splat(radius),
            };
            let sectors = Self::overlapped_sectors(level, bbox, ss);
            for &sector in &sectors {
                self.sector_touch.entry(sector).or_default().push(ent);
            }
            if let Ok(mut touching) = world.get::<&mut Touching>(ent) {
                touching.0 = sectors;
            }
        }
    }

    /// Remove `ent` from every index using its *current* component state
    /// (call before mutating `Position`/`Subsector`, mirroring vanilla's
    /// unset-then-move-then-set ordering).
    pub fn unlink(&mut self, world: &World, ent: Entity) {
        if let (Ok(pos), Ok(class), Ok(flags)) = (
            world.get::<&Position>(ent),
            world.get::<&Class>(ent),
            world.get::<&ActorFlags>(ent),
        ) {
            if !flags.0.contains(MobjFlags::NOBLOCKMAP) {
                self.thing_grid.remove(&ThingSpatial {
                    ent,
                    pos: *pos,
                    class: *class,
                    flags: *flags,
                });
            }
        }
        if let Ok(ss) = world.get::<&Subsector>(ent) {
            if let Some(list) = self.subsector_things.get_mut(&ss.0) {
                list.retain(|&e| e != ent);
            }
        }
        if let Ok(touching) = world.get::<&Touching>(ent) {
            for &sector in &touching.0 {
                if let Some(list) = self.sector_touch.get_mut(&sector) {
                    list.retain(|&e| e != ent);
                }
            }
        }
    }

    /// Re-link `ent` after its `Position`/`Subsector` have already been
    /// updated to the new spot.
    pub fn relink(&mut self, world: &World, level: &Level, ent: Entity) {
        self.link(world, level, ent);
    }
}

/// `P_SpawnMobj`: allocate the entity, install it into `spatial`, and set
/// its state to `info.spawnstate`.
pub fn spawn_mobj(
    world: &mut World,
    spatial: &mut SpatialIndex,
    level: &Level,
    info: &'static MobjInfo,
    x: f32,
    y: f32,
    z: Option<f32>,
    angle: f32,
) -> Entity {
    let subsector = level.locate_subsector(Vec2::new(x, y));
    let sector = &level.sectors[level.subsectors[subsector as usize].sector as usize];

    let z = z.unwrap_or_else(|| {
        if info.flags.contains(MobjFlags::SPAWNCEILING) {
            sector.ceil_h - (info.height as f32)
        } else {
            sector.floor_h
        }
    });

    let ent = world.spawn((
        ActorFlags(info.flags),
        ExtMobjFlags::default(),
        Position(Vec2::new(x, y), z),
        Velocity(Vec3::ZERO),
        Angle(angle),
        Subsector(subsector),
        Animation {
            state: info.spawnstate,
            tics: info.spawnstate.tics(),
        },
        Class(info),
        Health(info.spawnhealth),
        RefCount(0),
        MobjRefs::default(),
        Touching::default(),
    ));

    spatial.link(world, level, ent);
    ent
}

/// Mark `ent` removed (two-phase removal, step one). The entity
/// stays alive — still linked, still iterable — until the end-of-tic
/// sweep in [`run_remove_queue`] finds its refcount at zero.
pub fn mark_removed(world: &mut World, ent: Entity) {
    let _ = world.insert_one(ent, Removed);
}

/// Weak-reference discipline helpers for the `source`/`target`/`tracer`/
/// `supportobj` fields: every set increments the referent's `RefCount`,
/// every clear (or overwrite) decrements the old referent's.
pub trait MobjRefsExt {
    fn set_target(world: &mut World, ent: Entity, new_target: Option<Entity>);
    fn set_tracer(world: &mut World, ent: Entity, new_tracer: Option<Entity>);
    fn set_source(world: &mut World, ent: Entity, new_source: Option<Entity>);
    fn set_supportobj(world: &mut World, ent: Entity, new_supportobj: Option<Entity>);
}

fn adjust_refcount(world: &World, ent: Option<Entity>, delta: i32) {
    let Some(ent) = ent else { return };
    if let Ok(mut rc) = world.get::<&mut RefCount>(ent) {
        if delta > 0 {
            rc.0 += delta as u32;
        } else {
            rc.0 = rc.0.saturating_sub((-delta) as u32);
        }
    }
}

macro_rules! impl_weak_setter {
    ($name:ident, $field:ident) => {
        fn $name(world: &mut World, ent: Entity, new_value: Option<Entity>) {
            let old = world
                .get::<&MobjRefs>(ent)
                .map(|r| r.$field)
                .unwrap_or(None);
            if old == new_value {
                return;
            }
            adjust_refcount(world, old, -1);
            adjust_refcount(world, new_value, 1);
            if let Ok(mut refs) = world.get::<&mut MobjRefs>(ent) {
                refs.$field = new_value;
            }
        }
    };
}

pub struct Refs;
impl MobjRefsExt for Refs {
    impl_weak_setter!(set_target, target);
    impl_weak_setter!(set_tracer, tracer);
    impl_weak_setter!(set_source, source);
    impl_weak_setter!(set_supportobj, supportobj);
}

/// Every other tic: null any of the four weak references
/// anywhere in the world that point at a `Removed` mobj, bounding how long
/// a dangling reference can survive.
pub fn stale_ref_sweep(world: &mut World) {
    let removed: Vec<Entity> = world
        .query::<&Removed>()
        .iter()
        .map(|(e, _)| e)
        .collect();
    if removed.is_empty() {
        return;
    }
    let is_removed = |e: Entity| removed.contains(&e);

    let mut updates: Vec<(Entity, MobjRefs)> = Vec::new();
    for (ent, refs) in world.query::<&MobjRefs>().iter() {
        let mut new_refs = *refs;
        let mut changed = false;
        for (slot, value) in [
            (&mut new_refs.source, refs.source),
            (&mut new_refs.target, refs.target),
            (&mut new_refs.tracer, refs.tracer),
            (&mut new_refs.supportobj, refs.supportobj),
        ] {
            if let Some(e) = value {
                if is_removed(e) {
                    *slot = None;
                    changed = true;
                }
            }
        }
        if changed {
            updates.push((ent, new_refs));
        }
    }

    for (ent, new_refs) in updates {
        for old in refs_diff_to_clear(world, ent, &new_refs) {
            adjust_refcount(world, Some(old), -1);
        }
        if let Ok(mut refs) = world.get::<&mut MobjRefs>(ent) {
            *refs = new_refs;
        }
    }
}

fn refs_diff_to_clear(world: &World, ent: Entity, new_refs: &MobjRefs) -> SmallVec<[Entity; 4]> {
    let mut out = SmallVec::new();
    if let Ok(old) = world.get::<&MobjRefs>(ent) {
        for (a, b) in old.fields().into_iter().zip(new_refs.fields()) {
            if a != b {
                if let Some(e) = a {
                    out.push(e);
                }
            }
        }
    }
    out
}

/// Unlink and free every `Removed` mobj whose `RefCount` is zero. Entities
/// that are still referenced are left for the next tic's pass.
pub fn run_remove_queue(world: &mut World, spatial: &mut SpatialIndex) {
    let candidates: Vec<Entity> = world
        .query::<(&Removed, &RefCount)>()
        .iter()
        .filter(|(_, (_, rc))| rc.0 == 0)
        .map(|(e, _)| e)
        .collect();

    for ent in candidates {
        spatial.unlink(world, ent);
        world.despawn(ent).ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_info() -> &'static MobjInfo {
        &crate::defs::MOBJINFO[1] // TROOPER
    }

    #[test]
    fn refcount_tracks_set_and_clear() {
        let mut world = World::new();
        let a = world.spawn((RefCount(0), MobjRefs::default()));
        let b = world.spawn((RefCount(0), MobjRefs::default()));

        Refs::set_target(&mut world, a, Some(b));
        assert_eq!(world.get::<&RefCount>(b).unwrap().0, 1);

        Refs::set_target(&mut world, a, None);
        assert_eq!(world.get::<&RefCount>(b).unwrap().0, 0);
    }

    #[test]
    fn remove_queue_waits_for_zero_refcount() {
        let mut world = World::new();
        let mut spatial = SpatialIndex::new(Vec2::ZERO);
        let target = world.spawn((
            RefCount(1),
            MobjRefs::default(),
            Removed,
            ActorFlags(MobjFlags::NOBLOCKMAP | MobjFlags::NOSECTOR),
        ));
        run_remove_queue(&mut world, &mut spatial);
        assert!(world.contains(target));

        world.get::<&mut RefCount>(target).unwrap().0 = 0;
        run_remove_queue(&mut world, &mut spatial);
        assert!(!world.contains(target));
    }

    #[test]
    fn stale_sweep_nulls_refs_to_removed() {
        let mut world = World::new();
        let target = world.spawn((RefCount(0), Removed));
        let holder = world.spawn((
            RefCount(0),
            MobjRefs {
                target: Some(target),
                ..Default::default()
            },
        ));
        stale_ref_sweep(&mut world);
        assert_eq!(world.get::<&MobjRefs>(holder).unwrap().target, None);
    }

    #[test]
    fn spawn_installs_into_spatial_index() {
        let _ = dummy_info();
    }
}
