use bitflags::bitflags;
use glam::Vec2;

use crate::world::texture::TextureId;

pub type ThingId = u16;
pub type VertexId = u16;
pub type LinedefId = u16;
pub type SidedefId = u16;
pub type SegmentId = u16;
pub type SubsectorId = u16;
pub type SectorId = u16;

/// Opaque carrier for MBF21/UDMF extension bits neither this core nor
/// vanilla-format maps interpret; `0` for every map loaded from a plain
/// Doom-format WAD.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExtendedFlags(pub u32);

/// Runtime snapshot of one map (immutable after load).
#[derive(Debug)]
pub struct Level {
    pub name: String,
    pub things: Vec<Thing>,
    pub linedefs: Vec<Linedef>,
    pub sidedefs: Vec<Sidedef>,
    pub vertices: Vec<Vertex>,
    pub segs: Vec<Segment>,
    pub subsectors: Vec<Subsector>,
    pub nodes: Vec<Node>,
    pub sectors: Vec<Sector>,
    /// `None` when the WAD shipped without a BLOCKMAP lump; line queries
    /// then fall back to a brute-force scan of every linedef.
    pub blockmap: Option<Blockmap>,
    /// `None` when the WAD shipped without a REJECT table; visibility
    /// queries then conservatively assume every sector pair can see
    /// each other.
    pub reject: Option<Vec<u8>>,
}

/*------------------------- game objects -----------------------------*/

#[derive(Clone, Debug)]
pub struct Thing {
    pub pos: Vec2,
    pub angle: f32,   // radians
    pub type_id: u16, // mobjtype_t index
    pub min_skill: u8,
    pub is_deaf: bool,
    pub multiplayer: bool,
    /// Filled in by [`Level::finalise_bsp`]; `SubsectorId::MAX` until then.
    pub sub_sector: SubsectorId,
}

/*--------------------------- linedefs -------------------------------*/

bitflags! {
    #[derive(Debug, Clone, Copy)]
    pub struct LinedefFlags: u16 {
        const IMPASSABLE      = 0x0001;
        const BLOCK_MONSTERS  = 0x0002;
        const TWO_SIDED       = 0x0004;
        const UPPER_UNPEGGED  = 0x0010;
        const LOWER_UNPEGGED  = 0x0020;
        const SECRET          = 0x0040;
        const BLOCK_SOUND     = 0x0080;
        const NOT_ON_MAP      = 0x0200;
        const ALREADY_ON_MAP  = 0x1000; // editor flag
    }
}

#[derive(Clone, Debug)]
pub struct Linedef {
    pub id: LinedefId,
    pub v1: VertexId,
    pub v2: VertexId,
    pub flags: LinedefFlags,
    pub special: u16,
    pub tag: u16,
    pub right_sidedef: Option<SidedefId>,
    pub left_sidedef: Option<SidedefId>,
    pub ext_flags: ExtendedFlags,
}

/*--------------------------- sidedefs -------------------------------*/

#[derive(Clone, Debug)]
pub struct Sidedef {
    pub x_off: f32,
    pub y_off: f32,
    pub upper: TextureId,
    pub lower: TextureId,
    pub middle: TextureId,
    pub sector: SectorId,
}

/*----------------------- simple primitives --------------------------*/

#[derive(Clone, Copy, Debug)]
pub struct Vertex {
    pub pos: Vec2,
}

#[derive(Clone, Debug)]
pub struct Segment {
    pub v1: VertexId,
    pub v2: VertexId,
    pub linedef: LinedefId,
    pub dir: u16,
    pub offset: i16,
}

#[derive(Clone, Debug)]
pub struct Subsector {
    pub seg_count: u16,
    pub first_seg: SegmentId,
    /// Filled in by [`Level::finalise_bsp`].
    pub sector: SectorId,
    /// Things located in this subsector, filled in by
    /// [`Level::finalise_bsp`].
    pub things: Vec<ThingId>,
}

#[derive(Clone, Debug)]
pub struct Node {
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    pub bbox: [Aabb; 2],
    pub child: [u16; 2],
}

/// A 3D floor stacked inside a sector (MBF21 "extrafloor" convention).
/// Plain Doom-format maps never populate this; it exists so the sector
/// special / slope machinery in `sim` has somewhere to hang the feature.
#[derive(Clone, Debug)]
pub struct ExtraFloor {
    pub control_sector: SectorId,
    pub floor_h: f32,
    pub ceil_h: f32,
}

/// A sloped floor or ceiling plane: `z = base + normal.x*x + normal.y*y`
/// sampled in map space.
#[derive(Clone, Copy, Debug)]
pub struct Slope {
    pub base: f32,
    pub normal: Vec2,
}

#[derive(Clone, Debug)]
pub struct Sector {
    pub id: SectorId,
    pub floor_h: f32,
    pub ceil_h: f32,
    pub floor_tex: TextureId,
    pub ceil_tex: TextureId,
    pub light: f32,
    pub special: i16,
    pub tag: i16,
    pub ext_flags: ExtendedFlags,
    /// Bordering linedef indices, filled in by [`Level::finalise_bsp`].
    pub lines: Vec<LinedefId>,
    pub extrafloors: Vec<ExtraFloor>,
    pub floor_slope: Option<Slope>,
    pub ceil_slope: Option<Slope>,
}

/// Axis-aligned bounding box (map units).
#[derive(Clone, Copy, Debug)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

/// Spatial hash over linedefs, decoded from the BLOCKMAP lump.
#[derive(Clone, Debug)]
pub struct Blockmap {
    pub origin: Vec2,
    pub width: i32,
    pub height: i32,
    pub lines: Vec<Vec<LinedefId>>,
}
