//! `P_XYMovement`: per-tic XY integration, wall/thing collision and
//! sliding, friction, and missile impact. Z movement (gravity, floor
//! clamp, stairs) is handled separately in [`super::zmovement`].

use glam::{Vec2, Vec3};
use hecs::{Entity, World};
use smallvec::SmallVec;

use super::components::{ActorFlags, Animation, Class, Position, Subsector, Velocity};
use super::spacial::{ThingGrid, ThingSpatial};
use super::state_machine::set_mobj_state;
use crate::defs::{State, flags::MobjFlags};
use crate::world::{Aabb, Level, Linedef, LinedefFlags, LinedefId};

pub const MAX_MOVE: f32 = 32.0; // vanilla 0x10000
pub const MAX_STEP_HEIGHT: f32 = 24.0; // vanilla 24*FRACUNIT
const STOP_SPEED: f32 = 0.125; // vanilla FRACUNIT/8
const FRICTION: f32 = 0.90625; // vanilla 0xE800/FRACUNIT

/// Side effects deferred out of the movement query so the borrow checker
/// doesn't have to reason about re-entering `World` mid-iteration.
enum Deferred {
    SetState { entity: Entity, new_state: State },
    Explode { entity: Entity },
    CrossLine { entity: Entity, line: LinedefId },
}
type Deferrals = SmallVec<[Deferred; 4]>;

pub fn xy_movement_system(
    world: &mut World,
    thing_grid: &mut ThingGrid,
    level: &Level,
    mut on_cross_line: impl FnMut(Entity, LinedefId),
) {
    let mut queue = Deferrals::new();

    {
        let query = world.query_mut::<(
            &mut Position,
            &mut Velocity,
            &mut ActorFlags,
            &Class,
            &mut Subsector,
            &Animation,
        )>();

        for (e, (p, v, f, c, ss, an)) in query {
            p_xy_movement(level, thing_grid, e, p, v, f, c, ss, an, &mut queue);
        }
    }

    for act in queue {
        match act {
            Deferred::SetState { entity, new_state } => {
                set_mobj_state(world, entity, new_state);
            }
            Deferred::Explode { entity } => p_explode_missile(world, entity),
            Deferred::CrossLine { entity, line } => on_cross_line(entity, line),
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn p_xy_movement(
    level: &Level,
    thing_grid: &mut ThingGrid,
    ent: Entity,
    pos: &mut Position,
    vel: &mut Velocity,
    flags: &mut ActorFlags,
    class: &Class,
    subsector: &mut Subsector,
    anim: &Animation,
    queue: &mut Deferrals,
) {
    if vel.0.x == 0.0 && vel.0.y == 0.0 {
        if flags.0.contains(MobjFlags::SKULLFLY) {
            flags.0.remove(MobjFlags::SKULLFLY);
            vel.0 = Vec3::ZERO;
            queue.push(Deferred::SetState {
                entity: ent,
                new_state: class.0.spawnstate,
            });
        }
        return;
    }

    let is_player = class.0.id == "PLAYER";

    vel.0.x = vel.0.x.clamp(-MAX_MOVE, MAX_MOVE);
    vel.0.y = vel.0.y.clamp(-MAX_MOVE, MAX_MOVE);
    let (mut xmove, mut ymove) = (vel.0.x, vel.0.y);

    while xmove != 0.0 || ymove != 0.0 {
        let mut step = Vec2::new(xmove, ymove);
        if step.x.abs() > MAX_MOVE * 0.5 || step.y.abs() > MAX_MOVE * 0.5 {
            step *= 0.5;
        }
        xmove -= step.x;
        ymove -= step.y;

        let dest = pos.0 + step;

        let outcome = p_try_move(
            level,
            thing_grid,
            ent,
            pos,
            subsector,
            flags,
            class,
            is_player,
            dest,
            queue,
        );

        if let Err(blocking_line) = outcome {
            if is_player {
                p_slide_move(level, blocking_line, pos, vel);
            } else if flags.0.contains(MobjFlags::MISSILE) {
                queue.push(Deferred::Explode { entity: ent });
                vel.0 = Vec3::ZERO;
            } else {
                vel.0.x = 0.0;
                vel.0.y = 0.0;
            }
            break;
        }
    }

    if !flags.0.intersects(MobjFlags::MISSILE | MobjFlags::SKULLFLY)
        && pos.1 <= get_floor_z(level, subsector)
    {
        if vel.0.x.abs() < STOP_SPEED && vel.0.y.abs() < STOP_SPEED {
            if is_player
                && (anim.state as usize) >= (State::S_PLAY_RUN1 as usize)
                && (anim.state as usize) <= (State::S_PLAY_RUN4 as usize)
            {
                queue.push(Deferred::SetState {
                    entity: ent,
                    new_state: State::S_PLAY,
                });
            }
            vel.0.x = 0.0;
            vel.0.y = 0.0;
        } else {
            vel.0.x *= FRICTION;
            vel.0.y *= FRICTION;
        }
    }
}

fn get_floor_z(level: &Level, sub: &Subsector) -> f32 {
    level.sectors[level.subsectors[sub.0 as usize].sector as usize].floor_h
}

fn line_bbox(level: &Level, line: &Linedef) -> Aabb {
    let v1 = level.vertices[line.v1 as usize].pos;
    let v2 = level.vertices[line.v2 as usize].pos;
    Aabb {
        min: v1.min(v2),
        max: v1.max(v2),
    }
}

#[allow(clippy::too_many_arguments)]
fn p_try_move(
    level: &Level,
    grid: &mut ThingGrid,
    ent: Entity,
    pos: &mut Position,
    sub: &mut Subsector,
    flags: &mut ActorFlags,
    class: &Class,
    is_player: bool,
    dest: Vec2,
    queue: &mut Deferrals,
) -> Result<(), Option<LinedefId>> {
    let mut thing = ThingSpatial {
        ent,
        pos: *pos,
        class: *class,
        flags: *flags,
    };

    let check = p_check_position(level, grid, &thing, is_player, dest);

    if check.blocked
        || check.ceiling_z - check.floor_z < class.0.height as f32
        || check.floor_z - pos.1 > MAX_STEP_HEIGHT
        || check.floor_z - check.dropoff_z > MAX_STEP_HEIGHT
    {
        return Err(check.blocking_line);
    }

    for &line in &check.special_lines {
        queue.push(Deferred::CrossLine { entity: ent, line });
    }

    p_unset_thing_position(grid, &thing);
    pos.0 = dest;
    pos.1 = check.floor_z;
    sub.0 = check.subsector;
    thing.pos = *pos;
    p_set_thing_position(grid, thing);

    Ok(())
}

fn box_on_line_side(b: &Aabb, v1: Vec2, v2: Vec2) -> i32 {
    let dx = v2.x - v1.x;
    let dy = v2.y - v1.y;
    let mut front = false;
    let mut back = false;

    for &x in &[b.min.x, b.max.x] {
        for &y in &[b.min.y, b.max.y] {
            let cross = dx * (y - v1.y) - (x - v1.x) * dy;
            if cross >= 0.0 {
                front = true
            } else {
                back = true
            }
            if front && back {
                return -1;
            }
        }
    }
    if front { 0 } else { 1 }
}

/// `(open_top, open_bottom, open_range, low_floor)` for a two-sided line;
/// `open_range <= 0` for a one-sided line, which callers treat as blocked.
#[inline]
pub fn line_opening(level: &Level, line: &Linedef) -> (f32, f32, f32, f32) {
    let (front_sd, back_sd) = match (line.right_sidedef, line.left_sidedef) {
        (Some(f), Some(b)) => (f as usize, b as usize),
        _ => return (0.0, 0.0, 0.0, 0.0),
    };

    let front_sec = &level.sectors[level.sidedefs[front_sd].sector as usize];
    let back_sec = &level.sectors[level.sidedefs[back_sd].sector as usize];

    let open_top = front_sec.ceil_h.min(back_sec.ceil_h);
    let (open_bottom, low_floor) = if front_sec.floor_h > back_sec.floor_h {
        (front_sec.floor_h, back_sec.floor_h)
    } else {
        (back_sec.floor_h, front_sec.floor_h)
    };

    (open_top, open_bottom, open_top - open_bottom, low_floor)
}

#[derive(Default)]
struct CheckCtx {
    bbox: Aabb,
    floor_z: f32,
    ceiling_z: f32,
    dropoff_z: f32,
    ceilingline: Option<LinedefId>,
    blocking_line: Option<LinedefId>,
    thing_is_missile: bool,
    thing_is_player: bool,
    special_lines: SmallVec<[LinedefId; 4]>,
}

/// Returns `false` if `line` blocks the move outright.
fn pit_check_line(level: &Level, line: &Linedef, ctx: &mut CheckCtx) -> bool {
    let lbb = line_bbox(level, line);
    if ctx.bbox.max.x <= lbb.min.x
        || ctx.bbox.min.x >= lbb.max.x
        || ctx.bbox.max.y <= lbb.min.y
        || ctx.bbox.min.y >= lbb.max.y
    {
        return true;
    }

    let v1 = level.vertices[line.v1 as usize].pos;
    let v2 = level.vertices[line.v2 as usize].pos;
    if box_on_line_side(&ctx.bbox, v1, v2) != -1 {
        return true;
    }

    if !line.flags.contains(LinedefFlags::TWO_SIDED) {
        ctx.blocking_line = Some(line.id);
        return false;
    }
    if !ctx.thing_is_missile {
        if line.flags.contains(LinedefFlags::IMPASSABLE) {
            ctx.blocking_line = Some(line.id);
            return false;
        }
        if !ctx.thing_is_player && line.flags.contains(LinedefFlags::BLOCK_MONSTERS) {
            ctx.blocking_line = Some(line.id);
            return false;
        }
    }

    let (open_top, open_bottom, _, low_floor) = line_opening(level, line);

    if open_top < ctx.ceiling_z {
        ctx.ceiling_z = open_top;
        ctx.ceilingline = Some(line.id);
    }
    if open_bottom > ctx.floor_z {
        ctx.floor_z = open_bottom;
    }
    if low_floor < ctx.dropoff_z {
        ctx.dropoff_z = low_floor;
    }

    if line.special != 0 {
        ctx.special_lines.push(line.id);
    }
    true
}

struct CheckResult {
    blocked: bool,
    floor_z: f32,
    ceiling_z: f32,
    dropoff_z: f32,
    subsector: u16,
    special_lines: SmallVec<[LinedefId; 4]>,
    blocking_line: Option<LinedefId>,
}

fn p_check_position(
    level: &Level,
    grid: &ThingGrid,
    thing: &ThingSpatial,
    is_player: bool,
    dest: Vec2,
) -> CheckResult {
    let radius = thing.class.0.radius as f32;

    let ss_idx = level.locate_subsector(dest);
    let ssd = &level.subsectors[ss_idx as usize];
    let sector = &level.sectors[ssd.sector as usize];

    let bbox = Aabb {
        min: dest - Vec2::splat(radius),
        max: dest + Vec2::splat(radius),
    };

    let mut ctx = CheckCtx {
        bbox,
        floor_z: sector.floor_h,
        ceiling_z: sector.ceil_h,
        dropoff_z: sector.floor_h,
        ceilingline: None,
        blocking_line: None,
        thing_is_missile: thing.class.0.flags.contains(MobjFlags::MISSILE),
        thing_is_player: is_player,
        special_lines: SmallVec::new(),
    };

    let things_clear = grid.for_each_in_bbox(bbox, |other| pit_check_thing(thing, other, dest));
    let lines_clear = level.block_lines_iter(bbox, |ld| pit_check_line(level, ld, &mut ctx));

    CheckResult {
        blocked: !things_clear || !lines_clear,
        floor_z: ctx.floor_z,
        ceiling_z: ctx.ceiling_z,
        dropoff_z: ctx.dropoff_z,
        subsector: ss_idx,
        special_lines: ctx.special_lines,
        blocking_line: ctx.blocking_line,
    }
}

/// Returns `false` if `other` blocks the move at `dest`.
fn pit_check_thing(self_stub: &ThingSpatial, other: &ThingSpatial, dest: Vec2) -> bool {
    if !other
        .flags
        .0
        .intersects(MobjFlags::SOLID | MobjFlags::SPECIAL | MobjFlags::SHOOTABLE)
    {
        return true;
    }
    if other.ent == self_stub.ent {
        return true;
    }

    let block_dist = (other.class.0.radius + self_stub.class.0.radius) as f32;
    if (other.pos.0.x - dest.x).abs() >= block_dist || (other.pos.0.y - dest.y).abs() >= block_dist
    {
        return true;
    }

    if self_stub.flags.0.contains(MobjFlags::SKULLFLY) {
        return false;
    }

    if self_stub.flags.0.contains(MobjFlags::MISSILE) {
        if self_stub.pos.1 > other.pos.1 + other.class.0.height as f32 {
            return true;
        }
        if self_stub.pos.1 + self_stub.class.0.height as f32 < other.pos.1 {
            return true;
        }
        if !other.flags.0.contains(MobjFlags::SHOOTABLE) {
            return !other.flags.0.contains(MobjFlags::SOLID);
        }
        return false;
    }

    if other.flags.0.contains(MobjFlags::SPECIAL) {
        return !other.flags.0.contains(MobjFlags::SOLID);
    }

    !other.flags.0.contains(MobjFlags::SOLID)
}

fn p_unset_thing_position(grid: &mut ThingGrid, thing: &ThingSpatial) {
    if !thing.flags.0.contains(MobjFlags::NOBLOCKMAP) {
        grid.remove(thing);
    }
}

fn p_set_thing_position(grid: &mut ThingGrid, thing: ThingSpatial) {
    if !thing.flags.0.contains(MobjFlags::NOBLOCKMAP) {
        grid.insert(thing);
    }
}

/// `P_SlideMove`: project the velocity onto the blocking line's tangent,
/// discarding the component driving the actor into the wall so it slides
/// along it instead of stopping dead. Blocked by a thing rather than a
/// line (`blocking_line == None`) has no wall to follow, so it just stops.
fn p_slide_move(level: &Level, blocking_line: Option<LinedefId>, _pos: &mut Position, vel: &mut Velocity) {
    let wall = blocking_line.and_then(|id| {
        let line = &level.linedefs[id as usize];
        let v1 = level.vertices[line.v1 as usize].pos;
        let v2 = level.vertices[line.v2 as usize].pos;
        let dir = v2 - v1;
        (dir.length_squared() > 1e-6).then(|| dir.normalize())
    });

    let Some(wall) = wall else {
        vel.0.x = 0.0;
        vel.0.y = 0.0;
        return;
    };

    let v = Vec2::new(vel.0.x, vel.0.y);
    let along = wall * v.dot(wall);
    vel.0.x = along.x;
    vel.0.y = along.y;
}

fn p_explode_missile(world: &mut World, entity: Entity) {
    if let Ok(mut anim) = world.get::<&mut Animation>(entity) {
        let class = *world.get::<&Class>(entity).unwrap();
        anim.state = class.0.deathstate;
        anim.tics = anim.state.tics();
    }
    if let Ok(mut vel) = world.get::<&mut Velocity>(entity) {
        vel.0 = Vec3::ZERO;
    }
    if let Ok(mut flags) = world.get::<&mut ActorFlags>(entity) {
        flags.0.remove(MobjFlags::MISSILE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_opening_one_sided_is_closed() {
        let level = Level {
            name: "TEST".into(),
            things: vec![],
            linedefs: vec![Linedef {
                id: 0,
                v1: 0,
                v2: 1,
                flags: LinedefFlags::IMPASSABLE,
                special: 0,
                tag: 0,
                right_sidedef: Some(0),
                left_sidedef: None,
                ext_flags: Default::default(),
            }],
            sidedefs: vec![crate::world::geometry::Sidedef {
                x_off: 0.0,
                y_off: 0.0,
                upper: 0,
                lower: 0,
                middle: 0,
                sector: 0,
            }],
            vertices: vec![
                crate::world::geometry::Vertex { pos: Vec2::ZERO },
                crate::world::geometry::Vertex {
                    pos: Vec2::new(64.0, 0.0),
                },
            ],
            segs: vec![],
            subsectors: vec![],
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
        let (_, _, range, _) = line_opening(&level, &level.linedefs[0]);
        assert_eq!(range, 0.0);
    }
}
