//! Doom **map-lump parser** — builds on [`crate::wad::raw::Wad`].
//!
//! Classic Doom stores each playable map as a zero-length marker lump
//! (`E1M1`, `MAP01`, …) followed by a fixed run of data lumps:
//!
//! ```text
//! [marker] THINGS LINEDEFS SIDEDEFS VERTEXES SEGS SSECTORS NODES SECTORS
//!          REJECT BLOCKMAP
//! ```
//!
//! This module decodes that run into the `Raw*` structures `wad::loader`
//! converts into `world::geometry` types. Names carry the `Raw` prefix so
//! they're never confused with the post-conversion `world` types, which add
//! derived fields (texture ids, resolved f32 coordinates, self-indices)
//! this layer doesn't know about.

use crate::wad::raw::Wad;
use byteorder::{LittleEndian as LE, ReadBytesExt};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::{Cursor, Read};

#[derive(Clone, Debug)]
pub struct RawThing {
    pub x: i16,
    pub y: i16,
    pub angle: i16,
    pub type_: i16,
    pub options: i16,
}

#[derive(Clone, Debug)]
pub struct RawLinedef {
    pub v1: i16,
    pub v2: i16,
    pub flags: i16,
    pub special: i16,
    pub tag: i16,
    /// `-1` means "no sidedef", matching vanilla's `0xFFFF` sentinel.
    pub sidenum: [i32; 2],
}

#[derive(Clone, Debug)]
pub struct RawSidedef {
    pub x_off: i16,
    pub y_off: i16,
    pub top_tex: [u8; 8],
    pub bottom_tex: [u8; 8],
    pub mid_tex: [u8; 8],
    pub sector: i16,
}

#[derive(Clone, Debug)]
pub struct RawVertex {
    pub x: i16,
    pub y: i16,
}

#[derive(Clone, Debug)]
pub struct RawSeg {
    pub v1: i16,
    pub v2: i16,
    pub angle: i16,
    pub linedef: i16,
    pub side: i16,
    pub offset: i16,
}

#[derive(Clone, Debug)]
pub struct RawSubsector {
    pub seg_count: i16,
    pub first_seg: i16,
}

#[derive(Clone, Debug)]
pub struct RawNode {
    pub x: i16,
    pub y: i16,
    pub dx: i16,
    pub dy: i16,
    pub bbox: [[i16; 4]; 2],
    pub child: [u16; 2],
}

#[derive(Clone, Debug)]
pub struct RawSector {
    pub floor_h: i16,
    pub ceil_h: i16,
    pub floor_tex: [u8; 8],
    pub ceil_tex: [u8; 8],
    pub light: i16,
    pub special: i16,
    pub tag: i16,
}

/// The BLOCKMAP lump, still in its on-disk shape: a uniform grid over the
/// map's bounding box, each cell holding the indices of every linedef that
/// crosses it. `world::helpers` turns this into query-friendly form; core
/// doesn't interpret the per-cell lists itself.
#[derive(Clone, Debug)]
pub struct RawBlockmap {
    pub origin_x: i16,
    pub origin_y: i16,
    pub columns: i16,
    pub rows: i16,
    pub cells: Vec<Vec<i16>>,
}

/// Raw decode of one map's worth of lumps, before texture/geometry
/// resolution.
#[derive(Clone, Debug)]
pub struct RawLevel {
    pub name: String,
    pub things: Vec<RawThing>,
    pub linedefs: Vec<RawLinedef>,
    pub sidedefs: Vec<RawSidedef>,
    pub vertices: Vec<RawVertex>,
    pub segs: Vec<RawSeg>,
    pub subsectors: Vec<RawSubsector>,
    pub nodes: Vec<RawNode>,
    pub sectors: Vec<RawSector>,
    /// `None` when the map ships without a REJECT table (legal, if rare).
    pub reject: Option<Vec<u8>>,
    /// `None` when BLOCKMAP is absent or malformed; callers fall back to
    /// brute-force line iteration in that case.
    pub blockmap: Option<RawBlockmap>,
}

#[derive(thiserror::Error, Debug)]
pub enum LevelError {
    #[error("level marker idx {0} out of range")]
    MarkerOob(usize),
    #[error("required lump {0} missing between markers")]
    Missing(&'static str),
    #[error("truncated lump {0}")]
    Truncated(&'static str),
    #[error(transparent)]
    Wad(#[from] crate::wad::raw::WadError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Wad {
    /// Return directory indices of every map marker (`E#M#`, `MAP##`).
    pub fn level_indices(&self) -> Vec<usize> {
        static RE: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"^(E[1-4]M[1-9]|MAP[0-3][0-9])$").unwrap());

        self.lumps()
            .iter()
            .enumerate()
            .filter(|(_, l)| l.size == 0 && RE.is_match(Wad::lump_name_str(&l.name)))
            .map(|(i, _)| i)
            .collect()
    }

    /// Deserialize the lumps that form one map into [`RawLevel`].
    pub fn parse_level(&self, marker_idx: usize) -> Result<RawLevel, LevelError> {
        let lumps = self.lumps();
        if marker_idx >= lumps.len() {
            return Err(LevelError::MarkerOob(marker_idx));
        }

        let mut span_end = lumps.len();
        for i in marker_idx + 1..lumps.len() {
            if lumps[i].size == 0 {
                span_end = i;
                break;
            }
        }

        let find = |name: &str| -> Option<usize> {
            lumps[marker_idx + 1..span_end]
                .iter()
                .position(|l| Wad::lump_name_str(&l.name) == name)
                .map(|rel| rel + marker_idx + 1)
        };

        const NEED: &[&str] = &[
            "THINGS", "LINEDEFS", "SIDEDEFS", "VERTEXES", "SEGS", "SSECTORS", "NODES", "SECTORS",
        ];
        for &n in NEED {
            if find(n).is_none() {
                return Err(LevelError::Missing(n));
            }
        }

        macro_rules! parse_vec {
            ($buf:expr, $size:expr, $body:expr) => {{
                if $buf.len() % $size != 0 {
                    return Err(LevelError::Truncated(stringify!($body)));
                }
                let mut cur = Cursor::new($buf);
                let mut v = Vec::with_capacity($buf.len() / $size);
                while (cur.position() as usize) < $buf.len() {
                    v.push($body(&mut cur)?);
                }
                v
            }};
        }

        let read_tex = |c: &mut Cursor<&[u8]>| -> std::io::Result<[u8; 8]> {
            let mut t = [0u8; 8];
            c.read_exact(&mut t)?;
            Ok(t)
        };

        let things = {
            let buf = self.lump_bytes(find("THINGS").unwrap())?;
            parse_vec!(
                buf,
                10,
                |c: &mut Cursor<&[u8]>| -> std::io::Result<RawThing> {
                    Ok(RawThing {
                        x: c.read_i16::<LE>()?,
                        y: c.read_i16::<LE>()?,
                        angle: c.read_i16::<LE>()?,
                        type_: c.read_i16::<LE>()?,
                        options: c.read_i16::<LE>()?,
                    })
                }
            )
        };

        let linedefs = {
            let buf = self.lump_bytes(find("LINEDEFS").unwrap())?;
            parse_vec!(
                buf,
                14,
                |c: &mut Cursor<&[u8]>| -> std::io::Result<RawLinedef> {
                    let v1 = c.read_u16::<LE>()? as i16;
                    let v2 = c.read_u16::<LE>()? as i16;
                    let flags = c.read_i16::<LE>()?;
                    let special = c.read_i16::<LE>()?;
                    let tag = c.read_i16::<LE>()?;
                    let side_from = |raw: u16| -> i32 {
                        if raw == 0xFFFF { -1 } else { raw as i32 }
                    };
                    let right = side_from(c.read_u16::<LE>()?);
                    let left = side_from(c.read_u16::<LE>()?);
                    Ok(RawLinedef {
                        v1,
                        v2,
                        flags,
                        special,
                        tag,
                        sidenum: [right, left],
                    })
                }
            )
        };

        let sidedefs = {
            let buf = self.lump_bytes(find("SIDEDEFS").unwrap())?;
            parse_vec!(
                buf,
                30,
                |c: &mut Cursor<&[u8]>| -> std::io::Result<RawSidedef> {
                    Ok(RawSidedef {
                        x_off: c.read_i16::<LE>()?,
                        y_off: c.read_i16::<LE>()?,
                        top_tex: read_tex(c)?,
                        bottom_tex: read_tex(c)?,
                        mid_tex: read_tex(c)?,
                        sector: c.read_i16::<LE>()?,
                    })
                }
            )
        };

        let vertices = {
            let buf = self.lump_bytes(find("VERTEXES").unwrap())?;
            parse_vec!(
                buf,
                4,
                |c: &mut Cursor<&[u8]>| -> std::io::Result<RawVertex> {
                    Ok(RawVertex {
                        x: c.read_i16::<LE>()?,
                        y: c.read_i16::<LE>()?,
                    })
                }
            )
        };

        let segs = {
            let buf = self.lump_bytes(find("SEGS").unwrap())?;
            parse_vec!(
                buf,
                12,
                |c: &mut Cursor<&[u8]>| -> std::io::Result<RawSeg> {
                    Ok(RawSeg {
                        v1: c.read_u16::<LE>()? as i16,
                        v2: c.read_u16::<LE>()? as i16,
                        angle: c.read_i16::<LE>()?,
                        linedef: c.read_u16::<LE>()? as i16,
                        side: c.read_i16::<LE>()?,
                        offset: c.read_i16::<LE>()?,
                    })
                }
            )
        };

        let subsectors = {
            let buf = self.lump_bytes(find("SSECTORS").unwrap())?;
            parse_vec!(
                buf,
                4,
                |c: &mut Cursor<&[u8]>| -> std::io::Result<RawSubsector> {
                    Ok(RawSubsector {
                        seg_count: c.read_u16::<LE>()? as i16,
                        first_seg: c.read_u16::<LE>()? as i16,
                    })
                }
            )
        };

        let nodes = {
            let buf = self.lump_bytes(find("NODES").unwrap())?;
            parse_vec!(
                buf,
                28,
                |c: &mut Cursor<&[u8]>| -> std::io::Result<RawNode> {
                    Ok(RawNode {
                        x: c.read_i16::<LE>()?,
                        y: c.read_i16::<LE>()?,
                        dx: c.read_i16::<LE>()?,
                        dy: c.read_i16::<LE>()?,
                        bbox: [
                            [
                                c.read_i16::<LE>()?,
                                c.read_i16::<LE>()?,
                                c.read_i16::<LE>()?,
                                c.read_i16::<LE>()?,
                            ],
                            [
                                c.read_i16::<LE>()?,
                                c.read_i16::<LE>()?,
                                c.read_i16::<LE>()?,
                                c.read_i16::<LE>()?,
                            ],
                        ],
                        child: [c.read_u16::<LE>()?, c.read_u16::<LE>()?],
                    })
                }
            )
        };

        let sectors = {
            let buf = self.lump_bytes(find("SECTORS").unwrap())?;
            parse_vec!(
                buf,
                26,
                |c: &mut Cursor<&[u8]>| -> std::io::Result<RawSector> {
                    Ok(RawSector {
                        floor_h: c.read_i16::<LE>()?,
                        ceil_h: c.read_i16::<LE>()?,
                        floor_tex: read_tex(c)?,
                        ceil_tex: read_tex(c)?,
                        light: c.read_i16::<LE>()?,
                        special: c.read_i16::<LE>()?,
                        tag: c.read_i16::<LE>()?,
                    })
                }
            )
        };

        let reject = find("REJECT").and_then(|i| self.lump_bytes(i).ok()).map(|b| b.to_vec());

        let blockmap = find("BLOCKMAP")
            .and_then(|i| self.lump_bytes(i).ok())
            .and_then(parse_blockmap);

        Ok(RawLevel {
            name: Wad::lump_name_str(&lumps[marker_idx].name).to_owned(),
            things,
            linedefs,
            sidedefs,
            vertices,
            segs,
            subsectors,
            nodes,
            sectors,
            reject,
            blockmap,
        })
    }
}

/// Parse a BLOCKMAP lump. Returns `None` on any structural inconsistency
/// (short header, offset table past the end of the lump) rather than
/// erroring the whole level load — callers degrade to brute-force search.
fn parse_blockmap(bytes: &[u8]) -> Option<RawBlockmap> {
    if bytes.len() < 8 {
        return None;
    }
    let mut header = Cursor::new(&bytes[0..8]);
    let origin_x = header.read_i16::<LE>().ok()?;
    let origin_y = header.read_i16::<LE>().ok()?;
    let columns = header.read_i16::<LE>().ok()?;
    let rows = header.read_i16::<LE>().ok()?;

    let num_blocks = columns as usize * rows as usize;
    let offsets_end = 8 + num_blocks * 2;
    if bytes.len() < offsets_end {
        return None;
    }

    let mut offs = Cursor::new(&bytes[8..offsets_end]);
    let mut cells = Vec::with_capacity(num_blocks);
    for _ in 0..num_blocks {
        let off = offs.read_u16::<LE>().ok()? as usize * 2;
        if off + 2 > bytes.len() {
            cells.push(Vec::new());
            continue;
        }
        let mut cur = Cursor::new(&bytes[off..]);
        // each list opens with a 0x0000 marker and closes with 0xFFFF
        let _leading_zero = cur.read_i16::<LE>().ok()?;
        let mut list = Vec::new();
        loop {
            match cur.read_i16::<LE>() {
                Ok(-1) | Err(_) => break,
                Ok(n) => list.push(n),
            }
        }
        cells.push(list);
    }

    Some(RawBlockmap {
        origin_x,
        origin_y,
        columns,
        rows,
        cells,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn doom_wad() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("assets")
            .join("doom1.wad")
    }

    #[test]
    fn first_map_parses() {
        let wad = Wad::from_file(doom_wad()).expect("doom1.wad");
        let first_marker = wad
            .level_indices()
            .first()
            .copied()
            .expect("no map markers found");
        let level = wad.parse_level(first_marker).expect("parse");
        assert!(level.vertices.len() > 100, "suspiciously small map");
        assert_eq!(level.things[0].type_, 1, "player 1 start missing?");
    }

    #[test]
    fn blockmap_cells_cover_grid() {
        let wad = Wad::from_file(doom_wad()).expect("doom1.wad");
        let first_marker = wad.level_indices()[0];
        let level = wad.parse_level(first_marker).expect("parse");
        if let Some(bm) = level.blockmap {
            assert_eq!(bm.cells.len(), bm.columns as usize * bm.rows as usize);
        }
    }
}
