mod camera;
mod geometry;
mod helpers;
mod spatial;
mod texture;

pub use geometry::{
    Aabb, Blockmap, Level, Linedef, LinedefFlags, LinedefId, Node, Sector, SectorId, Segment,
    SegmentId, Sidedef, SidedefId, Subsector, SubsectorId, Thing, ThingId, Vertex, VertexId,
};

pub use camera::Camera;

pub use spatial::{
    DEFAULT_FRICTION, DEFAULT_GRAVITY, Intercept, InterceptKind, RegionProps, SpecialType,
};

pub use texture::{Colormap, NO_TEXTURE, Palette, Texture, TextureBank, TextureError, TextureId};
