//! Rendering abstraction layer — the play simulation and the frame driver
//! never touch a pixel buffer directly. They hand a BSP-ordered list of
//! segments to a backend implementing [`Renderer`] and let it rasterize.

pub mod software;

use crate::world::geometry::{Level, SegmentId};
use crate::world::texture::TextureId;

/// 0xAARRGGBB pixel.
pub type Rgba = u32;

/// Per-side sector properties a wall-segment pass needs, resolved once per
/// segment rather than re-walked per column.
#[derive(Clone, Copy, Debug)]
pub struct SectorCS {
    pub light: f32,
    pub floor_h: f32,
    pub ceil_h: f32,
    pub floor_tex: TextureId,
    pub ceil_tex: TextureId,
}

/// Camera-space view of one `Segment`, resolved against its linedef and
/// sidedef(s) so the rasterizer never has to chase those indices itself.
#[derive(Clone, Copy, Debug)]
pub struct SegmentCS {
    pub front_sector: SectorCS,
    pub back_sector: SectorCS,
    pub two_sided: bool,
    pub middle_texture: TextureId,
    pub upper_texture: TextureId,
    pub low_texture: TextureId,
    pub upper_unpegged: bool,
    pub lower_unpegged: bool,
    pub y_offset: f32,
}

impl SegmentCS {
    /// Resolve a `Segment`'s linedef/sidedef pair into the per-wall data a
    /// rasterizer pass needs. Picks the sidedef on the side the seg's
    /// `dir` flag says faces the camera; the opposite sidedef (if any)
    /// supplies `back_sector` for a two-sided line.
    pub fn build(level: &Level, seg_idx: SegmentId) -> Option<Self> {
        let seg = &level.segs[seg_idx as usize];
        let line = &level.linedefs[seg.linedef as usize];

        let (front_sd, back_sd) = if seg.dir == 0 {
            (line.right_sidedef, line.left_sidedef)
        } else {
            (line.left_sidedef, line.right_sidedef)
        };
        let front_sd = front_sd?;
        let front_side = &level.sidedefs[front_sd as usize];
        let front_sector = &level.sectors[front_side.sector as usize];

        let two_sided = line
            .flags
            .contains(crate::world::geometry::LinedefFlags::TWO_SIDED)
            && back_sd.is_some();

        let back_sector_cs = if let Some(back_sd) = back_sd {
            let back_side = &level.sidedefs[back_sd as usize];
            let back_sector = &level.sectors[back_side.sector as usize];
            SectorCS {
                light: back_sector.light,
                floor_h: back_sector.floor_h,
                ceil_h: back_sector.ceil_h,
                floor_tex: back_sector.floor_tex,
                ceil_tex: back_sector.ceil_tex,
            }
        } else {
            SectorCS {
                light: front_sector.light,
                floor_h: front_sector.floor_h,
                ceil_h: front_sector.ceil_h,
                floor_tex: front_sector.floor_tex,
                ceil_tex: front_sector.ceil_tex,
            }
        };

        Some(Self {
            front_sector: SectorCS {
                light: front_sector.light,
                floor_h: front_sector.floor_h,
                ceil_h: front_sector.ceil_h,
                floor_tex: front_sector.floor_tex,
                ceil_tex: front_sector.ceil_tex,
            },
            back_sector: back_sector_cs,
            two_sided,
            middle_texture: front_side.middle,
            upper_texture: front_side.upper,
            low_texture: front_side.lower,
            upper_unpegged: line
                .flags
                .contains(crate::world::geometry::LinedefFlags::UPPER_UNPEGGED),
            lower_unpegged: line
                .flags
                .contains(crate::world::geometry::LinedefFlags::LOWER_UNPEGGED),
            y_offset: front_side.y_off,
        })
    }
}

/*──────────────────────────── Renderer trait ─────────────────────────*/

/// A backend that turns a BSP-ordered segment list plus a camera into
/// pixels. `begin_frame`/`end_frame` bracket exactly one `draw_segments`
/// call per rendered view.
pub trait Renderer {
    fn begin_frame(&mut self, w: usize, h: usize);

    fn draw_segments(
        &mut self,
        segments: &[SegmentId],
        level: &Level,
        camera: &crate::world::camera::Camera,
        texture_bank: &crate::world::texture::TextureBank,
    );

    fn draw_things(
        &mut self,
        subsectors: &[crate::world::geometry::SubsectorId],
        level: &Level,
        camera: &crate::world::camera::Camera,
        texture_bank: &crate::world::texture::TextureBank,
    );

    fn end_frame<F>(&mut self, submit: F)
    where
        F: FnOnce(&[Rgba], usize, usize);
}
