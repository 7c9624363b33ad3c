//! `P_ZMovement`: per-tic vertical integration — gravity, floor/ceiling
//! clamping and the landing "oof" sound. Split out of [`super::movement`]
//! because the XY and Z passes touch different sector properties and
//! vanilla itself keeps them as separate functions.

use hecs::World;

use super::components::{ActorFlags, Class, Position, Subsector, Velocity};
use super::sound::SoundQueue;
use crate::defs::{Sound, flags::MobjFlags};
use crate::world::Level;

/// Vanilla `GRAVITY`: one map-unit of downward acceleration per tic.
const GRAVITY: f32 = 1.0;
/// Terminal fall speed a mobj's vertical velocity clamps to.
const MAX_FALL_SPEED: f32 = 35.0;
/// Downward velocity magnitude past which landing plays the "oof" sound
/// (vanilla `P_PlayerThink`'s `player->mo->momz < -8*FRACUNIT` check).
const OOF_THRESHOLD: f32 = 8.0;

pub fn z_movement_system(world: &mut World, level: &Level, sounds: &SoundQueue) {
    for (_, (pos, vel, flags, class, sub)) in world.query_mut::<(
        &mut Position,
        &mut Velocity,
        &ActorFlags,
        &Class,
        &Subsector,
    )>() {
        p_z_movement(level, sounds, pos, vel, flags, class, sub);
    }
}

fn p_z_movement(
    level: &Level,
    sounds: &SoundQueue,
    pos: &mut Position,
    vel: &mut Velocity,
    flags: &ActorFlags,
    class: &Class,
    sub: &Subsector,
) {
    let sector = &level.sectors[level.subsectors[sub.0 as usize].sector as usize];
    let floor_z = sector.floor_h;
    let ceiling_z = sector.ceil_h;

    if !flags.0.contains(MobjFlags::NOGRAVITY) {
        vel.0.z = (vel.0.z - GRAVITY).max(-MAX_FALL_SPEED);
    }

    pos.1 += vel.0.z;

    if pos.1 <= floor_z {
        if vel.0.z < -OOF_THRESHOLD && class.0.id == "PLAYER" {
            sounds.start(Sound::Oof, pos.0, 1.0);
        }
        pos.1 = floor_z;
        vel.0.z = 0.0;
    }

    let top = pos.1 + class.0.height as f32;
    if top > ceiling_z {
        pos.1 = ceiling_z - class.0.height as f32;
        if vel.0.z > 0.0 {
            vel.0.z = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defs::MOBJINFO;
    use crate::world::geometry::{Sector, Subsector as GeomSubsector};
    use glam::{Vec2, Vec3};

    fn flat_level(floor: f32, ceil: f32) -> Level {
        Level {
            name: "TEST".into(),
            things: vec![],
            linedefs: vec![],
            sidedefs: vec![],
            vertices: vec![],
            segs: vec![],
            subsectors: vec![GeomSubsector {
                seg_count: 0,
                first_seg: 0,
                sector: 0,
                things: vec![],
            }],
            nodes: vec![],
            sectors: vec![Sector {
                id: 0,
                floor_h: floor,
                ceil_h: ceil,
                floor_tex: 0,
                ceil_tex: 0,
                light: 160.0,
                special: 0,
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
    fn gravity_pulls_airborne_mobj_down_and_clamps_to_floor() {
        let level = flat_level(0.0, 128.0);
        let (sounds, _sink) = SoundQueue::new();
        let class = Class(&MOBJINFO[1]); // TROOPER
        let mut pos = Position(Vec2::ZERO, 50.0);
        let mut vel = Velocity(Vec3::new(0.0, 0.0, 0.0));
        let flags = ActorFlags(class.0.flags);
        let sub = Subsector(0);

        for _ in 0..100 {
            p_z_movement(&level, &sounds, &mut pos, &mut vel, &flags, &class, &sub);
        }

        assert_eq!(pos.1, 0.0);
        assert_eq!(vel.0.z, 0.0);
    }

    #[test]
    fn nogravity_flag_holds_altitude() {
        let level = flat_level(0.0, 128.0);
        let (sounds, _sink) = SoundQueue::new();
        let class = Class(&MOBJINFO[3]); // ROCKET, NOGRAVITY
        let mut pos = Position(Vec2::ZERO, 40.0);
        let mut vel = Velocity(Vec3::ZERO);
        let flags = ActorFlags(class.0.flags);
        let sub = Subsector(0);

        p_z_movement(&level, &sounds, &mut pos, &mut vel, &flags, &class, &sub);

        assert_eq!(pos.1, 40.0);
    }
}
