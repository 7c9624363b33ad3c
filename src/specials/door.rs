//! Vertical door thinker: `{waiting, opening, open, closing}` with a
//! per-state velocity and tic counter, transitioning on reaching its
//! target height or timing out. Grounded in classic `p_doors.c`'s
//! `T_VerticalDoor`, generalized off hardcoded sector index lookups onto
//! this crate's `SectorId`.

use crate::world::{Level, SectorId};

use super::DOOR_WAIT_TICS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorState {
    Opening,
    Open,
    Closing,
    Waiting,
}

/// Whether the door opens once and stays open, or cycles open/closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorKind {
    Normal,
    OpenOnly,
    CloseOnly,
}

#[derive(Debug, Clone)]
pub struct Door {
    pub sector: SectorId,
    pub kind: DoorKind,
    pub state: DoorState,
    pub speed: f32,
    pub top_height: f32,
    pub bottom_height: f32,
    pub wait_tics: i32,
    finished: bool,
}

impl Door {
    /// `target_top` is the door's open-ceiling height (classically the
    /// lowest neighboring sector's ceiling — `findLowestCeilingSurrounding`
    /// — resolved by the caller before activating the thinker).
    pub fn start(
        level: &Level,
        sector: SectorId,
        kind: DoorKind,
        speed: f32,
        target_top: f32,
    ) -> Self {
        let bottom = level.sectors[sector as usize].floor_h;
        let state = match kind {
            DoorKind::CloseOnly => DoorState::Closing,
            _ => DoorState::Opening,
        };
        Self {
            sector,
            kind,
            state,
            speed,
            top_height: target_top,
            bottom_height: bottom,
            wait_tics: DOOR_WAIT_TICS,
            finished: false,
        }
    }

    /// True once the door has settled into its terminal state and can be
    /// dropped from the active-thinker list.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn tick(&mut self, level: &mut Level) {
        let sector = &mut level.sectors[self.sector as usize];
        match self.state {
            DoorState::Opening => {
                sector.ceil_h += self.speed;
                if sector.ceil_h >= self.top_height {
                    sector.ceil_h = self.top_height;
                    match self.kind {
                        DoorKind::OpenOnly => self.finished = true,
                        _ => {
                            self.state = DoorState::Open;
                            self.wait_tics = DOOR_WAIT_TICS;
                        }
                    }
                }
            }
            DoorState::Open => {
                self.wait_tics -= 1;
                if self.wait_tics <= 0 {
                    self.state = DoorState::Closing;
                }
            }
            DoorState::Closing => {
                sector.ceil_h -= self.speed;
                if sector.ceil_h <= self.bottom_height {
                    sector.ceil_h = self.bottom_height;
                    self.finished = true;
                }
            }
            DoorState::Waiting => {
                self.wait_tics -= 1;
                if self.wait_tics <= 0 {
                    self.state = DoorState::Opening;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::geometry::{Level as GeomLevel, Sector, Subsector};

    fn level_with_sector(floor: f32, ceil: f32) -> GeomLevel {
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
    fn door_opens_waits_then_closes() {
        let mut level = level_with_sector(0.0, 0.0); // starts shut
        let mut door = Door::start(&level, 0, DoorKind::Normal, 8.0, 64.0);

        while door.state == DoorState::Opening {
            door.tick(&mut level);
        }
        assert_eq!(level.sectors[0].ceil_h, 64.0);
        assert_eq!(door.state, DoorState::Open);

        door.wait_tics = 1;
        door.tick(&mut level);
        assert_eq!(door.state, DoorState::Closing);

        while door.state == DoorState::Closing {
            door.tick(&mut level);
        }
        assert_eq!(level.sectors[0].ceil_h, 0.0);
        assert!(door.is_finished());
    }

    #[test]
    fn open_only_door_finishes_without_closing() {
        let mut level = level_with_sector(0.0, 64.0);
        level.sectors[0].ceil_h = 0.0;
        let mut door = Door::start(&level, 0, DoorKind::OpenOnly, 8.0, 64.0);
        door.top_height = 64.0;
        door.tick(&mut level);
        assert!(door.is_finished());
    }
}
