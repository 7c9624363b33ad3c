//! Versioned save/load for game state: a small header (magic, format
//! version) followed by one bincode-encoded body — a GLOB record for
//! scheduler/player/global state plus per-mobj and per-sector records.
//! The body is guarded by a CRC32 so a truncated or hand-edited file is
//! rejected instead of silently mis-parsed.

use bincode::{Decode, Encode};
use thiserror::Error;

pub const SAVE_MAGIC: [u8; 4] = *b"YDSV";
pub const SAVE_VERSION: u16 = 1;

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("not a save file (bad magic)")]
    BadMagic,
    #[error("save format version {found} unsupported (expected {expected})")]
    VersionMismatch { found: u16, expected: u16 },
    #[error("chunk checksum mismatch: expected {expected:08x}, got {actual:08x}")]
    Corrupt { expected: u32, actual: u32 },
    #[error("encode error: {0}")]
    Encode(#[from] bincode::error::EncodeError),
    #[error("decode error: {0}")]
    Decode(#[from] bincode::error::DecodeError),
}

/// Global, map-independent state: everything that must survive a hub
/// transition even though the map's mobjs/sectors don't.
#[derive(Debug, Clone, Encode, Decode)]
pub struct GlobRecord {
    pub gametic: i32,
    pub skill: u8,
    pub map_name: String,
    pub players: Vec<PlayerRecord>,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct PlayerRecord {
    pub health: i32,
    pub armor: i32,
    pub ammo: [i32; 4],
    pub max_ammo: [i32; 4],
    pub weapon_owned: [bool; 9],
    pub ready_weapon: u8,
    pub cards: u8,
}

/// One mobj's persistent state. Entities are respawned fresh on load and
/// re-linked into the ECS/spatial index by `sim::spawn_mobj`; only the
/// fields a thinker needs to resume are kept, transient ones (e.g.
/// `Touching`) get rebuilt at spawn.
#[derive(Debug, Clone, Encode, Decode)]
pub struct MobjRecord {
    pub doomednum: i32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub angle: f32,
    pub health: i32,
    pub state_index: u32,
    pub state_tics: i32,
}

/// Sector-special runtime state a full-map save must restore exactly —
/// floor/ceiling heights mid-motion, since a door or platform can be
/// paused partway through its travel.
#[derive(Debug, Clone, Encode, Decode, Default)]
pub struct SectorRecord {
    pub floor_h: f32,
    pub ceil_h: f32,
}

/// Whether a save captures the full live map (an ordinary save) or only
/// the GLOB-level state carried across a hub transition into a
/// different map, which has nothing of the old map's mobjs/sectors to
/// restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub enum SaveKind {
    Full,
    HubHandoff,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct SaveFile {
    pub kind: SaveKind,
    pub glob: GlobRecord,
    pub mobjs: Vec<MobjRecord>,
    pub sectors: Vec<SectorRecord>,
}

impl SaveFile {
    pub fn write(&self, out: &mut impl std::io::Write) -> Result<(), SaveError> {
        out.write_all(&SAVE_MAGIC)?;
        out.write_all(&SAVE_VERSION.to_le_bytes())?;

        let body = bincode::encode_to_vec(self, bincode::config::standard())?;
        let crc = crc32(&body);
        out.write_all(&crc.to_le_bytes())?;
        out.write_all(&(body.len() as u32).to_le_bytes())?;
        out.write_all(&body)?;
        Ok(())
    }

    pub fn read(input: &mut impl std::io::Read) -> Result<Self, SaveError> {
        let mut magic = [0u8; 4];
        input.read_exact(&mut magic)?;
        if magic != SAVE_MAGIC {
            return Err(SaveError::BadMagic);
        }

        let mut version_buf = [0u8; 2];
        input.read_exact(&mut version_buf)?;
        let version = u16::from_le_bytes(version_buf);
        if version != SAVE_VERSION {
            return Err(SaveError::VersionMismatch {
                found: version,
                expected: SAVE_VERSION,
            });
        }

        let mut crc_buf = [0u8; 4];
        input.read_exact(&mut crc_buf)?;
        let expected_crc = u32::from_le_bytes(crc_buf);

        let mut len_buf = [0u8; 4];
        input.read_exact(&mut len_buf)?;
        let len = u32::from_le_bytes(len_buf) as usize;

        let mut body = vec![0u8; len];
        input.read_exact(&mut body)?;

        let actual_crc = crc32(&body);
        if actual_crc != expected_crc {
            return Err(SaveError::Corrupt {
                expected: expected_crc,
                actual: actual_crc,
            });
        }

        let (save, _) = bincode::decode_from_slice(&body, bincode::config::standard())?;
        Ok(save)
    }

    pub fn save_to_file(&self, path: impl AsRef<std::path::Path>) -> Result<(), SaveError> {
        let mut f = std::fs::File::create(path)?;
        self.write(&mut f)
    }

    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Self, SaveError> {
        let mut f = std::fs::File::open(path)?;
        Self::read(&mut f)
    }
}

/// Standard CRC-32 (IEEE 802.3 polynomial), table-driven. Hand-rolled
/// rather than pulling in a dependency for one checksum.
fn crc32(data: &[u8]) -> u32 {
    const TABLE: [u32; 256] = build_table();
    let mut crc = 0xFFFF_FFFFu32;
    for &byte in data {
        let idx = ((crc ^ byte as u32) & 0xFF) as usize;
        crc = TABLE[idx] ^ (crc >> 8);
    }
    !crc
}

const fn build_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut c = i as u32;
        let mut k = 0;
        while k < 8 {
            c = if c & 1 != 0 {
                0xEDB8_8320 ^ (c >> 1)
            } else {
                c >> 1
            };
            k += 1;
        }
        table[i] = c;
        i += 1;
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SaveFile {
        SaveFile {
            kind: SaveKind::Full,
            glob: GlobRecord {
                gametic: 1234,
                skill: 3,
                map_name: "E1M1".into(),
                players: vec![PlayerRecord {
                    health: 80,
                    armor: 0,
                    ammo: [50, 0, 0, 0],
                    max_ammo: [200, 50, 300, 50],
                    weapon_owned: [true, true, false, false, false, false, false, false, false],
                    ready_weapon: 1,
                    cards: 0,
                }],
            },
            mobjs: vec![MobjRecord {
                doomednum: 3004,
                x: 128.0,
                y: 256.0,
                z: 0.0,
                angle: 0.0,
                health: 20,
                state_index: 7,
                state_tics: 10,
            }],
            sectors: vec![SectorRecord {
                floor_h: 0.0,
                ceil_h: 128.0,
            }],
        }
    }

    #[test]
    fn round_trips_through_bytes() {
        let save = sample();
        let mut buf = Vec::new();
        save.write(&mut buf).unwrap();

        let loaded = SaveFile::read(&mut buf.as_slice()).unwrap();
        assert_eq!(loaded.glob.gametic, 1234);
        assert_eq!(loaded.mobjs.len(), 1);
        assert_eq!(loaded.mobjs[0].doomednum, 3004);
    }

    #[test]
    fn rejects_bad_magic() {
        let bytes = vec![0u8; 16];
        assert!(matches!(
            SaveFile::read(&mut bytes.as_slice()),
            Err(SaveError::BadMagic)
        ));
    }

    #[test]
    fn rejects_corrupted_body() {
        let save = sample();
        let mut buf = Vec::new();
        save.write(&mut buf).unwrap();

        let last = buf.len() - 1;
        buf[last] ^= 0xFF;

        assert!(matches!(
            SaveFile::read(&mut buf.as_slice()),
            Err(SaveError::Corrupt { .. })
        ));
    }

    #[test]
    fn round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save1.ysv");
        let save = sample();
        save.save_to_file(&path).unwrap();

        let loaded = SaveFile::load_from_file(&path).unwrap();
        assert_eq!(loaded.glob.map_name, "E1M1");
    }
}
