//! Wall-texture scroller: nudges a sidedef's texture offset every tic
//! (`T_Scroll` in `p_spec.c`). Collected once at level load from lines
//! tagged with the scroll special; vanilla only ever scrolls the line's
//! right (front) sidedef.

use crate::world::{Level, SidedefId};

const SCROLL_LINE_SPECIAL: u16 = 48;
const SCROLL_SPEED: f32 = 1.0;

#[derive(Debug, Clone, Copy)]
pub struct Scroller {
    pub sidedef: SidedefId,
    pub dx: f32,
    pub dy: f32,
}

impl Scroller {
    pub fn collect(level: &Level) -> Vec<Scroller> {
        level
            .linedefs
            .iter()
            .filter(|l| l.special == SCROLL_LINE_SPECIAL)
            .filter_map(|l| l.right_sidedef)
            .map(|sidedef| Scroller {
                sidedef,
                dx: -SCROLL_SPEED,
                dy: 0.0,
            })
            .collect()
    }

    pub fn tick(&self, level: &mut Level) {
        let sd = &mut level.sidedefs[self.sidedef as usize];
        sd.x_off += self.dx;
        sd.y_off += self.dy;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::geometry::{
        Level as GeomLevel, Linedef, LinedefFlags, Sector, Sidedef, Vertex,
    };

    fn level_with_scroll_line() -> GeomLevel {
        GeomLevel {
            name: "T".into(),
            things: vec![],
            linedefs: vec![Linedef {
                id: 0,
                v1: 0,
                v2: 1,
                flags: LinedefFlags::IMPASSABLE,
                special: 48,
                tag: 0,
                right_sidedef: Some(0),
                left_sidedef: None,
                ext_flags: Default::default(),
            }],
            sidedefs: vec![Sidedef {
                x_off: 0.0,
                y_off: 0.0,
                upper: 0,
                lower: 0,
                middle: 0,
                sector: 0,
            }],
            vertices: vec![
                Vertex { pos: Default::default() },
                Vertex { pos: Default::default() },
            ],
            segs: vec![],
            subsectors: vec![],
            nodes: vec![],
            sectors: vec![Sector {
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
        }
    }

    #[test]
    fn collect_finds_tagged_line_front_side() {
        let level = level_with_scroll_line();
        let scrollers = Scroller::collect(&level);
        assert_eq!(scrollers.len(), 1);
        assert_eq!(scrollers[0].sidedef, 0);
    }

    #[test]
    fn tick_advances_x_offset() {
        let mut level = level_with_scroll_line();
        let scroller = Scroller::collect(&level).remove(0);
        scroller.tick(&mut level);
        assert_eq!(level.sidedefs[0].x_off, -SCROLL_SPEED);
    }
}
