use glam::{Vec2, Vec3};
use hecs::Entity;
use smallvec::SmallVec;

use crate::defs::{MobjFlags, MobjInfo, State};
use crate::world::{SectorId, SubsectorId};

/// World‑space position.  z is separate to match Doom’s 2½‑D maths.
#[derive(Debug, Clone, Copy)]
pub struct Position(pub Vec2, pub f32);

#[derive(Debug, Clone, Copy, Default)]
pub struct Velocity(pub Vec3);

impl Velocity {
    #[inline]
    pub fn zero_xy(&mut self) {
        self.0.x = 0.0;
        self.0.y = 0.0;
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Angle(pub f32);

#[derive(Debug, Clone, Copy)]
pub struct Subsector(pub SubsectorId);

#[derive(Debug, Copy, Clone)]
pub struct Class(pub &'static MobjInfo);

#[derive(Debug, Clone, Copy)]
pub struct Animation {
    pub state: State,
    pub tics: i32,
}

/// Player-size flag wrapper – fill in later
#[derive(Clone, Copy, Debug)]
pub struct ActorFlags(pub MobjFlags);

#[derive(Clone, Copy, Debug, Default)]
pub struct InputCmd {
    pub forward: f32,       // –1 … +1
    pub strafe: f32,        // –1 … +1  (left / right)
    pub turn: f32,          // –1 … +1  (right / left)
    pub run: bool,          // Shift
    pub fire: bool,         // Ctrl
    pub use_act: bool,      // Space
    pub weapon: Option<u8>, // 1-7 if pressed this tic
}

/// Opaque carrier for the extension bitfields some formats call a "flags
/// triple" (`flags`/`extendedflags`/`hyperflags`). The core only ever
/// copies, tests and clears these bits; MBF21/UDMF content interprets
/// them, and their bit layouts stay opaque to the core.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtMobjFlags {
    pub extended: u32,
    pub hyper: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct Health(pub i32);

/// Two-phase removal marker. Setting this flags the mobj for
/// unlinking; the entity is only actually despawned by the end-of-tic
/// remove queue once its `RefCount` has dropped to zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct Removed;

/// Number of live weak references (`source`/`target`/`tracer`/`supportobj`
/// fields anywhere in the world) pointing at this entity. The remove queue
/// never frees an entity while this is nonzero.
#[derive(Debug, Clone, Copy, Default)]
pub struct RefCount(pub u32);

/// The four weak references every mobj carries, plus the refcount
/// discipline: setting a field increments the
/// referent's `RefCount`, clearing (or overwriting) decrements it. Use
/// [`crate::sim::mobj::MobjRefsExt`] rather than writing these fields
/// directly so the discipline can't be skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct MobjRefs {
    pub source: Option<Entity>,
    pub target: Option<Entity>,
    pub tracer: Option<Entity>,
    pub supportobj: Option<Entity>,
}

impl MobjRefs {
    pub(crate) fn fields(&self) -> [Option<Entity>; 4] {
        [self.source, self.target, self.tracer, self.supportobj]
    }
}

/// Which player slot (if any) this mobj is the live body of.
#[derive(Debug, Clone, Copy)]
pub struct PlayerBody(pub usize);

/// Sectors this mobj's radius currently overlaps, mirrored into each
/// sector's touch list. Kept as a component so unlinking a removed mobj is
/// just "walk this list and remove me from each sector's vec".
#[derive(Debug, Clone, Default)]
pub struct Touching(pub SmallVec<[SectorId; 4]>);
