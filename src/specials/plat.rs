//! Platform/lift thinker: floor moves between a low and high height with a
//! wait at each end, grounded in `p_plats.c`'s `T_PlatRaise`.

use crate::world::{Level, SectorId};

const PLAT_WAIT_TICS: i32 = 35 * 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatState {
    Up,
    Down,
    Waiting,
}

/// What the platform does once it reaches its high position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatKind {
    /// Drop to `low`, wait, rise back to `high`, then stop.
    DownWaitUpStay,
    /// Rise to `high` and stay (used for "raise floor and change texture").
    RaiseAndChange,
    /// Cycle between `low` and `high` forever, waiting at each end.
    PerpetualRaise,
}

#[derive(Debug, Clone)]
pub struct Plat {
    pub sector: SectorId,
    pub kind: PlatKind,
    pub state: PlatState,
    pub speed: f32,
    pub low: f32,
    pub high: f32,
    pub wait_tics: i32,
    going_up: bool,
    finished: bool,
}

impl Plat {
    pub fn start(
        level: &Level,
        sector: SectorId,
        kind: PlatKind,
        speed: f32,
        low: f32,
        high: f32,
    ) -> Self {
        let floor = level.sectors[sector as usize].floor_h;
        let going_up = kind == PlatKind::RaiseAndChange || floor <= low;
        Self {
            sector,
            kind,
            state: if going_up { PlatState::Up } else { PlatState::Down },
            speed,
            low,
            high,
            wait_tics: PLAT_WAIT_TICS,
            going_up,
            finished: false,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn tick(&mut self, level: &mut Level) {
        let sector = &mut level.sectors[self.sector as usize];
        match self.state {
            PlatState::Down => {
                sector.floor_h -= self.speed;
                if sector.floor_h <= self.low {
                    sector.floor_h = self.low;
                    self.state = PlatState::Waiting;
                    self.going_up = true;
                    self.wait_tics = PLAT_WAIT_TICS;
                }
            }
            PlatState::Up => {
                sector.floor_h += self.speed;
                if sector.floor_h >= self.high {
                    sector.floor_h = self.high;
                    if self.kind == PlatKind::PerpetualRaise {
                        self.state = PlatState::Waiting;
                        self.going_up = false;
                        self.wait_tics = PLAT_WAIT_TICS;
                    } else {
                        self.finished = true;
                    }
                }
            }
            PlatState::Waiting => {
                self.wait_tics -= 1;
                if self.wait_tics <= 0 {
                    self.state = if self.going_up {
                        PlatState::Up
                    } else {
                        PlatState::Down
                    };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::geometry::{Level as GeomLevel, Sector, Subsector};

    fn level_with_sector(floor: f32) -> GeomLevel {
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
        }
    }

    #[test]
    fn down_wait_up_stay_round_trips_and_finishes() {
        let mut level = level_with_sector(64.0);
        let mut plat = Plat::start(&level, 0, PlatKind::DownWaitUpStay, 8.0, 0.0, 64.0);

        while plat.state == PlatState::Down {
            plat.tick(&mut level);
        }
        assert_eq!(level.sectors[0].floor_h, 0.0);

        plat.wait_tics = 1;
        plat.tick(&mut level);
        assert_eq!(plat.state, PlatState::Up);

        while plat.state == PlatState::Up {
            plat.tick(&mut level);
        }
        assert_eq!(level.sectors[0].floor_h, 64.0);
        assert!(plat.is_finished());
    }

    #[test]
    fn perpetual_raise_never_finishes() {
        let mut level = level_with_sector(0.0);
        let mut plat = Plat::start(&level, 0, PlatKind::PerpetualRaise, 16.0, 0.0, 32.0);
        for _ in 0..500 {
            plat.tick(&mut level);
            assert!(!plat.is_finished());
        }
    }
}
