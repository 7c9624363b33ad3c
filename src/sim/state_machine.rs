//! `P_SetMobjState` and the action dispatch it drives.
//!
//! Actions are plain functions keyed off an enum (see [`crate::defs::action`])
//! rather than function pointers or a class hierarchy: every mobj type's
//! behaviour is just which states its `MobjInfo` points into, and which
//! `Action` each of those states names.

use glam::Vec2;
use hecs::{Entity, World};

use super::components::{
    ActorFlags, Angle, Animation, Class, Health, MobjRefs, Position, Subsector,
};
use super::mobj::{MobjRefsExt, Refs, SpatialIndex, mark_removed};
use super::rng::Rng;
use super::sound::SoundQueue;
use crate::defs::action::Action;
use crate::defs::flags::MobjFlags;
use crate::defs::sound::Sound;
use crate::defs::State;
use crate::world::Level;

/// Everything an action needs that isn't already on the entity itself:
/// the static world, the dynamic spatial index (for sight/attack checks),
/// the shared RNG (attacks and pain chance must draw from the single
/// deterministic stream), the sound-event queue, and which entities are
/// live player bodies (what `Look`/`Chase` search for).
pub struct ActorCtx<'a> {
    pub level: &'a Level,
    pub spatial: &'a SpatialIndex,
    pub rng: &'a mut Rng,
    pub sounds: &'a SoundQueue,
    pub players: &'a [Entity],
}

const MAX_STATE_CHAIN: u32 = 1000;

/// Advance `ent` to `new_state`, running that state's action, and keep
/// following `next_state` through every `tics == 0` frame until reaching
/// one that actually holds (`tics != 0`) or the chain bottoms out at
/// `S_NULL` (which removes the mobj). `MAX_STATE_CHAIN` guards against a
/// content-authored cycle of all-zero-tic states looping forever.
pub fn set_mobj_state(world: &mut World, ent: Entity, new_state: State) -> bool {
    let mut ctx = None;
    set_mobj_state_inner(world, ent, new_state, &mut ctx)
}

/// Same as [`set_mobj_state`] but with full AI context, so states whose
/// action needs sight checks or the RNG (`Look`, `Chase`, `FaceTarget`,
/// `PosAttack`) actually run instead of being skipped.
pub fn set_mobj_state_with_ctx(
    world: &mut World,
    ent: Entity,
    new_state: State,
    ctx: &mut ActorCtx,
) -> bool {
    let mut ctx = Some(ctx);
    set_mobj_state_inner(world, ent, new_state, &mut ctx)
}

fn set_mobj_state_inner(
    world: &mut World,
    ent: Entity,
    new_state: State,
    ctx: &mut Option<&mut ActorCtx>,
) -> bool {
    let mut state = new_state;
    for _ in 0..MAX_STATE_CHAIN {
        if state == State::S_NULL {
            mark_removed(world, ent);
            return false;
        }

        let info = state.info();
        if let Ok(mut anim) = world.get::<&mut Animation>(ent) {
            anim.state = state;
            anim.tics = info.tics;
        } else {
            return false;
        }

        match ctx {
            Some(ctx) => run(info.action, world, ent, ctx),
            None => run_stateless(info.action, world, ent),
        }

        if info.tics != 0 {
            return true;
        }
        state = info.next_state;
    }
    false
}

/// Actions that need no external context: safe to run even when the
/// caller (e.g. [`super::movement`]) has no [`ActorCtx`] handy.
fn run_stateless(action: Action, world: &mut World, ent: Entity) {
    match action {
        Action::None | Action::Look | Action::Chase | Action::FaceTarget | Action::PosAttack => {}
        Action::Fall => a_fall(world, ent),
        Action::Scream => {}
        Action::XScream => {}
        Action::Explode => {}
    }
}

fn run(action: Action, world: &mut World, ent: Entity, ctx: &mut ActorCtx) {
    match action {
        Action::None => {}
        Action::Look => a_look(world, ent, ctx),
        Action::Chase => a_chase(world, ent, ctx),
        Action::FaceTarget => a_face_target(world, ent),
        Action::PosAttack => a_pos_attack(world, ent, ctx),
        Action::Scream => a_scream(world, ent, ctx),
        Action::XScream => a_xscream(world, ent, ctx),
        Action::Fall => a_fall(world, ent),
        Action::Explode => a_explode(world, ent, ctx),
    }
}

pub fn mobj_eye(world: &World, ent: Entity) -> Option<(Vec2, f32)> {
    let pos = world.get::<&Position>(ent).ok()?;
    Some((pos.0, pos.1 + 32.0))
}

/// `A_Look`: scan the live player bodies for one this mobj can see; if
/// found, latch it as `target` and jump straight to `seestate`.
fn a_look(world: &mut World, ent: Entity, ctx: &mut ActorCtx) {
    let Some(eye) = mobj_eye(world, ent) else {
        return;
    };

    for &player in ctx.players {
        if player == ent || !world.contains(player) {
            continue;
        }
        let Some(player_eye) = mobj_eye(world, player) else {
            continue;
        };
        if ctx.level.sight_check(eye, player_eye) {
            Refs::set_target(world, ent, Some(player));
            let see_state = world.get::<&Class>(ent).unwrap().0.seestate;
            let see_sound = world.get::<&Class>(ent).unwrap().0.seesound;
            ctx.sounds.start(see_sound, eye.0 - Vec2::new(0.0, eye.1), 1.0);
            set_mobj_state_with_ctx(world, ent, see_state, ctx);
            return;
        }
    }
}

/// `A_Chase`: step toward `target`, occasionally rolling into the melee
/// or missile state when within range (approximated — vanilla's distance
/// thresholds and meleerange constant are folded into one check here).
fn a_chase(world: &mut World, ent: Entity, ctx: &mut ActorCtx) {
    let target = world.get::<&MobjRefs>(ent).ok().and_then(|r| r.target);
    let Some(target) = target.filter(|&t| world.contains(t)) else {
        // Lost the target: go back to idle scanning.
        let spawn = world.get::<&Class>(ent).unwrap().0.spawnstate;
        set_mobj_state_with_ctx(world, ent, spawn, ctx);
        return;
    };

    let (self_pos, target_pos) = {
        let sp = world.get::<&Position>(ent).unwrap().0;
        let tp = world.get::<&Position>(target).unwrap().0;
        (sp, tp)
    };

    let delta = target_pos - self_pos;
    let dist = delta.length();
    let info = world.get::<&Class>(ent).unwrap().0;

    if dist < 64.0 && info.meleestate != State::S_NULL {
        set_mobj_state_with_ctx(world, ent, info.meleestate, ctx);
        return;
    }
    if info.missilestate != State::S_NULL && ctx.rng.chance(40) {
        set_mobj_state_with_ctx(world, ent, info.missilestate, ctx);
        return;
    }

    if dist > 1.0 {
        let step = delta.normalize() * (info.speed as f32);
        if let Ok(mut pos) = world.get::<&mut Position>(ent) {
            pos.0 += step;
        }
        if let Ok(mut angle) = world.get::<&mut Angle>(ent) {
            angle.0 = delta.y.atan2(delta.x);
        }
    }
}

/// `A_FaceTarget`: snap angle to point at `target`.
fn a_face_target(world: &mut World, ent: Entity) {
    let Some(target) = world.get::<&MobjRefs>(ent).ok().and_then(|r| r.target) else {
        return;
    };
    if !world.contains(target) {
        return;
    }
    let delta = {
        let sp = world.get::<&Position>(ent).unwrap().0;
        let tp = world.get::<&Position>(target).unwrap().0;
        tp - sp
    };
    if let Ok(mut angle) = world.get::<&mut Angle>(ent) {
        angle.0 = delta.y.atan2(delta.x);
    }
}

/// `A_PosAttack`: a single hitscan shot at `target` with a little spread,
/// rolled through the shared RNG so replays stay deterministic.
fn a_pos_attack(world: &mut World, ent: Entity, ctx: &mut ActorCtx) {
    let Some(target) = world.get::<&MobjRefs>(ent).ok().and_then(|r| r.target) else {
        return;
    };
    if !world.contains(target) {
        return;
    }

    let spread = (ctx.rng.random_signed() as f32 / 255.0) * 0.1;
    let (origin, aim) = {
        let sp = world.get::<&Position>(ent).unwrap().0;
        let tp = world.get::<&Position>(target).unwrap().0;
        let delta = tp - sp;
        let base_angle = delta.y.atan2(delta.x);
        let angle = base_angle + spread;
        (sp, Vec2::new(angle.cos(), angle.sin()))
    };
    let dest = origin + aim * 2048.0;

    let mut hit_target = false;
    ctx.level.path_traverse(origin.x, origin.y, dest.x, dest.y, |_intercept| {
        // Line-only traversal for now; thing intercepts would need the
        // spatial index fed into path_traverse to resolve entities.
        false
    });
    if ctx.level.sight_check((origin, 32.0), (world.get::<&Position>(target).unwrap().0, 32.0)) {
        hit_target = true;
    }

    if hit_target {
        if let Ok(mut health) = world.get::<&mut Health>(target) {
            health.0 -= 3 + (ctx.rng.below(4) as i32);
        }
    }
}

fn a_scream(world: &mut World, ent: Entity, ctx: &mut ActorCtx) {
    play_death_sound(world, ent, ctx);
}

fn a_xscream(world: &mut World, ent: Entity, ctx: &mut ActorCtx) {
    play_death_sound(world, ent, ctx);
}

fn play_death_sound(world: &mut World, ent: Entity, ctx: &mut ActorCtx) {
    let (sound, pos) = {
        let class = world.get::<&Class>(ent).unwrap();
        let pos = world.get::<&Position>(ent).unwrap();
        (class.0.deathsound, pos.0)
    };
    if !matches!(sound, Sound::None) {
        ctx.sounds.start(sound, pos, 1.0);
    }
}

/// `A_Fall`: corpse no longer blocks movement.
fn a_fall(world: &mut World, ent: Entity) {
    if let Ok(mut flags) = world.get::<&mut ActorFlags>(ent) {
        flags.0.remove(MobjFlags::SOLID);
    }
}

/// `A_Explode`: radius damage to anything touching the blast's sector(s).
fn a_explode(world: &mut World, ent: Entity, ctx: &mut ActorCtx) {
    let Ok(pos) = world.get::<&Position>(ent) else {
        return;
    };
    let origin = pos.0;
    drop(pos);

    let ss = world.get::<&Subsector>(ent).map(|s| s.0).unwrap_or(0);
    let sector = ctx.level.subsectors[ss as usize].sector;
    for &victim in ctx.spatial.things_touching_sector(sector) {
        if victim == ent || !world.contains(victim) {
            continue;
        }
        let Ok(vpos) = world.get::<&Position>(victim) else {
            continue;
        };
        let dist = (vpos.0 - origin).length();
        drop(vpos);
        if dist > 128.0 {
            continue;
        }
        let damage = (128.0 - dist).max(0.0) as i32;
        if let Ok(mut health) = world.get::<&mut Health>(victim) {
            health.0 -= damage;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::components::{Animation, Class, Health, MobjRefs, RefCount, Touching};
    use crate::sim::mobj::SpatialIndex;
    use crate::sim::sound::SoundQueue;

    fn trooper() -> &'static crate::defs::MobjInfo {
        &crate::defs::MOBJINFO[1]
    }

    #[test]
    fn set_state_stops_at_nonzero_tics() {
        let mut world = World::new();
        let ent = world.spawn((Animation {
            state: State::S_NULL,
            tics: 0,
        },));
        let advanced = set_mobj_state(&mut world, ent, State::S_POSS_STND);
        assert!(advanced);
        assert_eq!(world.get::<&Animation>(ent).unwrap().state, State::S_POSS_STND);
    }

    #[test]
    fn set_state_to_null_marks_removed() {
        let mut world = World::new();
        let ent = world.spawn((Animation {
            state: State::S_POSS_STND,
            tics: -1,
        },));
        let advanced = set_mobj_state(&mut world, ent, State::S_NULL);
        assert!(!advanced);
        assert!(world.get::<&super::super::components::Removed>(ent).is_ok());
    }

    #[test]
    fn fall_clears_solid_flag() {
        let mut world = World::new();
        let ent = world.spawn((
            Animation {
                state: State::S_POSS_STND,
                tics: -1,
            },
            ActorFlags(MobjFlags::SOLID),
        ));
        a_fall(&mut world, ent);
        assert!(!world.get::<&ActorFlags>(ent).unwrap().0.contains(MobjFlags::SOLID));
    }

    #[test]
    fn explode_damages_nearby_things_in_same_sector() {
        let mut world = World::new();
        let mut rng = Rng::new(0);
        let (sounds, _sink) = SoundQueue::new();
        let level = crate::world::Level {
            name: "T".into(),
            things: vec![],
            linedefs: vec![],
            sidedefs: vec![],
            vertices: vec![],
            segs: vec![],
            subsectors: vec![crate::world::geometry::Subsector {
                seg_count: 0,
                first_seg: 0,
                sector: 0,
                things: vec![],
            }],
            nodes: vec![],
            sectors: vec![crate::world::geometry::Sector {
                id: 0,
                floor_h: 0.0,
                ceil_h: 128.0,
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
        };
        let mut spatial = SpatialIndex::new(Vec2::ZERO);

        let bomb = world.spawn((
            Position(Vec2::ZERO, 0.0),
            Subsector(0),
            Class(trooper()),
            ActorFlags(MobjFlags::empty()),
            Touching::default(),
            RefCount(0),
            MobjRefs::default(),
        ));
        let victim = world.spawn((
            Position(Vec2::new(10.0, 0.0), 0.0),
            Subsector(0),
            Class(trooper()),
            ActorFlags(MobjFlags::empty()),
            Health(100),
            Touching::default(),
            RefCount(0),
            MobjRefs::default(),
        ));
        spatial.link(&world, &level, bomb);
        spatial.link(&world, &level, victim);

        let mut ctx = ActorCtx {
            level: &level,
            spatial: &spatial,
            rng: &mut rng,
            sounds: &sounds,
            players: &[],
        };
        a_explode(&mut world, bomb, &mut ctx);
        assert!(world.get::<&Health>(victim).unwrap().0 < 100);
    }
}
