//! Play simulation: the ECS world of mobjs, the tick scheduler, movement,
//! the state machine driving animation/AI, and the player/weapon model.

mod components;
mod driver;
mod mobj;
mod movement;
mod player;
mod rng;
mod scheduler;
mod sector_fx;
mod sound;
mod spacial;
mod state_machine;
mod ticcmd;
mod weapon;
mod zmovement;

pub use components::{
    ActorFlags, Angle, Animation, Class, ExtMobjFlags, Health, InputCmd, MobjRefs, PlayerBody,
    Position, RefCount, Removed, Touching, Velocity,
};
pub use driver::Sim;
pub use mobj::{
    MobjRefsExt, SpatialIndex, mark_removed, run_remove_queue, spawn_mobj, stale_ref_sweep,
};
pub use movement::{MAX_MOVE, MAX_STEP_HEIGHT, xy_movement_system};
pub use player::{Cards, Player, Stock};
pub use rng::Rng;
pub use scheduler::{BACKUPTICS, MAX_PLAYERS, TICRATE, TickScheduler};
pub use sound::{SoundEvent, SoundQueue, SoundSink};
pub use spacial::{Bx, By, ThingGrid, ThingSpatial};
pub use state_machine::{ActorCtx, mobj_eye, set_mobj_state, set_mobj_state_with_ctx};
pub use ticcmd::{ButtonFlags, ExtButtonFlags, Ticcmd};
pub use weapon::{AmmoKind, RaiseState, WEAPON_TABLE, WeaponInfo, WeaponRig, WeaponState};
pub use zmovement::z_movement_system;
