//! Sector-special thinkers and line-trigger dispatch: the small pieces of
//! `p_spec.c`/`p_doors.c`/`p_plats.c` that outlive a single tic. Generalized
//! off the original's static, fixed-size C arrays (`MAXCEILINGS`-style caps)
//! onto plain `Vec`s sized to whatever the loaded level actually needs.

pub mod damage;
pub mod door;
pub mod plat;
pub mod scroller;
pub mod triggers;

use crate::world::{Level, LinedefId};

pub use damage::{DAMAGE_COOLDOWN_TICS, SectorDamage, damage_for_special};
pub use door::{Door, DoorKind, DoorState};
pub use plat::{Plat, PlatKind, PlatState};
pub use scroller::Scroller;
pub use triggers::{ActivationClass, LineTrigger, TriggerTag};

/// Tics a vertical door holds fully open before it starts closing again
/// (`VDOORWAIT`).
pub const DOOR_WAIT_TICS: i32 = 35 * 4;

/// Every sector-special thinker currently active in a level, plus the
/// parsed line-trigger table. Owned by [`crate::sim::Sim`] and ticked once
/// per simulation tic alongside the ECS systems.
#[derive(Default)]
pub struct SpecialsState {
    pub doors: Vec<Door>,
    pub plats: Vec<Plat>,
    pub scrollers: Vec<Scroller>,
    pub triggers: Vec<LineTrigger>,
}

impl SpecialsState {
    pub fn new(level: &Level) -> Self {
        Self {
            doors: Vec::new(),
            plats: Vec::new(),
            scrollers: Scroller::collect(level),
            triggers: LineTrigger::collect(level),
        }
    }

    /// Advance every active thinker one tic.
    pub fn tick(&mut self, level: &mut Level) {
        for door in &mut self.doors {
            door.tick(level);
        }
        self.doors.retain(|d| !d.is_finished());

        for plat in &mut self.plats {
            plat.tick(level);
        }
        self.plats.retain(|p| !p.is_finished());

        for scroller in &self.scrollers {
            scroller.tick(level);
        }
    }

    /// `P_CrossSpecialLine`: a mobj's movement crossed a tagged linedef.
    /// Monsters may only trigger walkover specials.
    pub fn cross_line(&mut self, level: &mut Level, line: LinedefId, is_player: bool) {
        triggers::cross_line(self, level, line, is_player);
    }

    /// `P_UseSpecialLine`: the `USE` button was pressed against this line.
    /// Returns whether a special actually fired.
    pub fn use_line(&mut self, level: &mut Level, line: LinedefId, is_player: bool) -> bool {
        triggers::use_line(self, level, line, is_player)
    }
}
