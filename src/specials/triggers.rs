//! Line-special trigger dispatch: classic Doom's `W1`/`WR`/`S1`/`SR`
//! activation-class convention (`P_CrossSpecialLine`/`P_UseSpecialLine` in
//! `p_spec.c`), generalized off the original's one-switch-per-special-number
//! function onto a small declarative table plus the thinkers this module
//! already owns.
//!
//! The table below is not the full ~90-entry vanilla special list — it
//! covers the door and platform families this crate implements end to end.
//! Extending it to more special numbers is just adding table rows; the
//! dispatch logic itself doesn't change.

use crate::world::{Level, LinedefId, SectorId};

use super::door::{Door, DoorKind};
use super::plat::{Plat, PlatKind};
use super::SpecialsState;

/// Which input activates a line, and whether the line is reusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationClass {
    WalkOnce,
    WalkRepeat,
    SwitchOnce,
    SwitchRepeat,
}

impl ActivationClass {
    /// Whether the special is cleared (set to 0) after firing once.
    fn consumes(self) -> bool {
        matches!(self, Self::WalkOnce | Self::SwitchOnce)
    }

    /// Only walkover specials admit monster crossings
    /// (`P_CrossSpecialLine`'s `!thing->player && special's class != W*`
    /// gate).
    fn monsters_allowed(self) -> bool {
        matches!(self, Self::WalkOnce | Self::WalkRepeat)
    }
}

/// The thinker a trigger spawns once its tagged sectors are found.
#[derive(Debug, Clone, Copy)]
pub enum TriggerTag {
    Door { kind: DoorKind, speed: f32 },
    Plat { kind: PlatKind, speed: f32 },
}

#[derive(Debug, Clone, Copy)]
pub struct LineTrigger {
    pub line: LinedefId,
    pub class: ActivationClass,
    pub effect: TriggerTag,
}

const LINE_SPECIALS: &[(u16, ActivationClass, TriggerTag)] = &[
    (
        1,
        ActivationClass::SwitchRepeat,
        TriggerTag::Door {
            kind: DoorKind::Normal,
            speed: 2.0,
        },
    ),
    (
        4,
        ActivationClass::WalkOnce,
        TriggerTag::Door {
            kind: DoorKind::Normal,
            speed: 2.0,
        },
    ),
    (
        31,
        ActivationClass::SwitchOnce,
        TriggerTag::Door {
            kind: DoorKind::OpenOnly,
            speed: 2.0,
        },
    ),
    (
        63,
        ActivationClass::SwitchRepeat,
        TriggerTag::Door {
            kind: DoorKind::Normal,
            speed: 2.0,
        },
    ),
    (
        90,
        ActivationClass::WalkRepeat,
        TriggerTag::Door {
            kind: DoorKind::Normal,
            speed: 2.0,
        },
    ),
    (
        62,
        ActivationClass::SwitchRepeat,
        TriggerTag::Plat {
            kind: PlatKind::DownWaitUpStay,
            speed: 4.0,
        },
    ),
    (
        88,
        ActivationClass::WalkRepeat,
        TriggerTag::Plat {
            kind: PlatKind::DownWaitUpStay,
            speed: 4.0,
        },
    ),
];

impl LineTrigger {
    pub fn collect(level: &Level) -> Vec<LineTrigger> {
        level
            .linedefs
            .iter()
            .filter(|l| l.special != 0)
            .filter_map(|l| {
                LINE_SPECIALS
                    .iter()
                    .find(|(special, ..)| *special == l.special)
                    .map(|&(_, class, effect)| LineTrigger {
                        line: l.id,
                        class,
                        effect,
                    })
            })
            .collect()
    }
}

/// `findLowestCeilingSurrounding`: the lowest ceiling of any sector
/// neighboring `sector` across its bordering lines, minus the vanilla
/// 4-unit door-frame clearance.
fn lowest_neighbor_ceiling(level: &Level, sector: SectorId) -> f32 {
    neighbor_heights(level, sector, |s| s.ceil_h)
        .fold(f32::INFINITY, f32::min)
        - 4.0
}

/// `findLowestFloorSurrounding`: the lowest floor of any neighboring
/// sector, used as a lift's resting height.
fn lowest_neighbor_floor(level: &Level, sector: SectorId) -> f32 {
    neighbor_heights(level, sector, |s| s.floor_h).fold(f32::INFINITY, f32::min)
}

fn neighbor_heights<'a>(
    level: &'a Level,
    sector: SectorId,
    pick: impl Fn(&crate::world::Sector) -> f32 + 'a,
) -> impl Iterator<Item = f32> + 'a {
    level.sectors[sector as usize].lines.iter().filter_map(move |&lid| {
        let line = &level.linedefs[lid as usize];
        [line.right_sidedef, line.left_sidedef]
            .into_iter()
            .flatten()
            .find_map(|sd| {
                let other = level.sidedefs[sd as usize].sector;
                (other != sector).then(|| pick(&level.sectors[other as usize]))
            })
    })
}

fn activate(state: &mut SpecialsState, level: &Level, trig: LineTrigger, sector: SectorId) {
    match trig.effect {
        TriggerTag::Door { kind, speed } => {
            let top = lowest_neighbor_ceiling(level, sector);
            state.doors.push(Door::start(level, sector, kind, speed, top));
        }
        TriggerTag::Plat { kind, speed } => {
            let high = level.sectors[sector as usize].floor_h;
            let low = lowest_neighbor_floor(level, sector);
            state.plats.push(Plat::start(level, sector, kind, speed, low, high));
        }
    }
}

/// `P_CrossSpecialLine`, invoked once per tic a mobj's movement query
/// reports a crossed special line.
pub fn cross_line(state: &mut SpecialsState, level: &mut Level, line_id: LinedefId, is_player: bool) {
    dispatch(state, level, line_id, is_player, |c| {
        matches!(c, ActivationClass::WalkOnce | ActivationClass::WalkRepeat)
    });
}

/// `P_UseSpecialLine`. Returns whether a special actually fired.
pub fn use_line(state: &mut SpecialsState, level: &mut Level, line_id: LinedefId, is_player: bool) -> bool {
    dispatch(state, level, line_id, is_player, |c| {
        matches!(c, ActivationClass::SwitchOnce | ActivationClass::SwitchRepeat)
    })
}

fn dispatch(
    state: &mut SpecialsState,
    level: &mut Level,
    line_id: LinedefId,
    is_player: bool,
    wants_class: impl Fn(ActivationClass) -> bool,
) -> bool {
    let Some(idx) = state
        .triggers
        .iter()
        .position(|t| t.line == line_id && wants_class(t.class))
    else {
        return false;
    };
    let trig = state.triggers[idx];
    if !is_player && !trig.class.monsters_allowed() {
        return false;
    }

    let tag = level.linedefs[line_id as usize].tag;
    let targets: Vec<SectorId> = level
        .sectors
        .iter()
        .filter(|s| s.tag == tag)
        .map(|s| s.id)
        .collect();
    for sector in targets {
        activate(state, level, trig, sector);
    }

    if trig.class.consumes() {
        state.triggers.remove(idx);
        level.linedefs[line_id as usize].special = 0;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::geometry::{
        Level as GeomLevel, Linedef, LinedefFlags, Sector, Sidedef, Vertex,
    };

    fn two_sector_level(special: u16, class_tag: u16) -> GeomLevel {
        GeomLevel {
            name: "T".into(),
            things: vec![],
            linedefs: vec![Linedef {
                id: 0,
                v1: 0,
                v2: 1,
                flags: LinedefFlags::TWO_SIDED,
                special,
                tag: class_tag,
                right_sidedef: Some(0),
                left_sidedef: Some(1),
                ext_flags: Default::default(),
            }],
            sidedefs: vec![
                Sidedef {
                    x_off: 0.0,
                    y_off: 0.0,
                    upper: 0,
                    lower: 0,
                    middle: 0,
                    sector: 0,
                },
                Sidedef {
                    x_off: 0.0,
                    y_off: 0.0,
                    upper: 0,
                    lower: 0,
                    middle: 0,
                    sector: 1,
                },
            ],
            vertices: vec![
                Vertex { pos: Default::default() },
                Vertex { pos: Default::default() },
            ],
            segs: vec![],
            subsectors: vec![],
            nodes: vec![],
            sectors: vec![
                Sector {
                    id: 0,
                    floor_h: 0.0,
                    ceil_h: 0.0,
                    floor_tex: 0,
                    ceil_tex: 0,
                    light: 160.0,
                    special: 0,
                    tag: class_tag as i16,
                    ext_flags: Default::default(),
                    lines: vec![0],
                    extrafloors: vec![],
                    floor_slope: None,
                    ceil_slope: None,
                },
                Sector {
                    id: 1,
                    floor_h: 0.0,
                    ceil_h: 96.0,
                    floor_tex: 0,
                    ceil_tex: 0,
                    light: 160.0,
                    special: 0,
                    tag: 0,
                    ext_flags: Default::default(),
                    lines: vec![0],
                    extrafloors: vec![],
                    floor_slope: None,
                    ceil_slope: None,
                },
            ],
            blockmap: None,
            reject: None,
        }
    }

    #[test]
    fn walk_once_door_fires_and_consumes_special() {
        let mut level = two_sector_level(4, 1);
        let mut state = SpecialsState::new(&level);
        cross_line(&mut state, &mut level, 0, true);
        assert_eq!(state.doors.len(), 1);
        assert_eq!(level.linedefs[0].special, 0);

        // A second crossing shouldn't spawn another door: the trigger was
        // removed once it fired.
        cross_line(&mut state, &mut level, 0, true);
        assert_eq!(state.doors.len(), 1);
    }

    #[test]
    fn monsters_cannot_fire_switch_specials() {
        let mut level = two_sector_level(1, 1);
        let mut state = SpecialsState::new(&level);
        assert!(!use_line(&mut state, &mut level, 0, false));
        assert_eq!(state.doors.len(), 0);
        assert!(use_line(&mut state, &mut level, 0, true));
        assert_eq!(state.doors.len(), 1);
    }
}
