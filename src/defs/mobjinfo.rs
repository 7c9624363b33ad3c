// AUTO-GENERATED - see tools/gen_mobjinfo

use crate::defs::flags::MobjFlags as MF;
use crate::defs::{sound::Sound, state::State};

#[derive(Debug, Clone)]
pub struct MobjInfo {
    pub id: &'static str,
    pub doomednum: i32,
    /* state chain */
    pub spawnstate: State,
    pub spawnhealth: i32,
    pub seestate: State,
    pub seesound: Sound,
    pub reactiontime: i32,
    pub attacksound: Sound,
    pub painstate: State,
    pub painchance: i32,
    pub painsound: Sound,
    pub meleestate: State,
    pub missilestate: State,
    pub deathstate: State,
    pub xdeathstate: State,
    pub deathsound: Sound,
    /* physics & damage */
    pub speed: i32,
    pub radius: i32,
    pub height: i32,
    pub mass: i32,
    pub damage: i32,
    /* ambience & behaviour */
    pub activesound: Sound,
    pub flags: MF,
    pub raisestate: State,
}

pub const MOBJINFO: &[MobjInfo] = &[
    MobjInfo { id: "PLAYER", doomednum: -1, spawnstate: State::S_PLAY, spawnhealth: 100, seestate: State::S_NULL, seesound: Sound::None, reactiontime: 0, attacksound: Sound::None, painstate: State::S_PLAY_PAIN, painchance: 255, painsound: Sound::None, meleestate: State::S_NULL, missilestate: State::S_PLAY_ATK1, deathstate: State::S_PLAY_DIE1, xdeathstate: State::S_PLAY_XDIE1, deathsound: Sound::Pldeth, speed: 0, radius: 16, height: 56, mass: 100, damage: 0, activesound: Sound::None, flags: MF::from_bits_truncate(MF::SOLID.bits() | MF::SHOOTABLE.bits() | MF::DROPOFF.bits() | MF::PICKUP.bits() | MF::NOTDMATCH.bits()), raisestate: State::S_NULL },
    MobjInfo { id: "TROOPER", doomednum: 3004, spawnstate: State::S_POSS_STND, spawnhealth: 20, seestate: State::S_POSS_RUN1, seesound: Sound::Possit, reactiontime: 8, attacksound: Sound::None, painstate: State::S_POSS_PAIN, painchance: 200, painsound: Sound::None, meleestate: State::S_NULL, missilestate: State::S_POSS_ATK1, deathstate: State::S_POSS_DIE1, xdeathstate: State::S_POSS_XDIE1, deathsound: Sound::Podth1, speed: 8, radius: 20, height: 56, mass: 100, damage: 0, activesound: Sound::Posact, flags: MF::from_bits_truncate(MF::SOLID.bits() | MF::SHOOTABLE.bits() | MF::COUNTKILL.bits()), raisestate: State::S_POSS_RAISE1 },
    MobjInfo { id: "BARREL", doomednum: 2035, spawnstate: State::S_BAR1, spawnhealth: 20, seestate: State::S_NULL, seesound: Sound::None, reactiontime: 8, attacksound: Sound::None, painstate: State::S_NULL, painchance: 0, painsound: Sound::None, meleestate: State::S_NULL, missilestate: State::S_NULL, deathstate: State::S_BEXP, xdeathstate: State::S_NULL, deathsound: Sound::Barexp, speed: 0, radius: 10, height: 42, mass: 100, damage: 0, activesound: Sound::None, flags: MF::from_bits_truncate(MF::SOLID.bits() | MF::SHOOTABLE.bits() | MF::NOBLOOD.bits()), raisestate: State::S_NULL },
    MobjInfo { id: "ROCKET", doomednum: -1, spawnstate: State::S_MISL, spawnhealth: 1000, seestate: State::S_NULL, seesound: Sound::Rlaunc, reactiontime: 8, attacksound: Sound::None, painstate: State::S_NULL, painchance: 0, painsound: Sound::None, meleestate: State::S_NULL, missilestate: State::S_NULL, deathstate: State::S_EXPLODE1, xdeathstate: State::S_NULL, deathsound: Sound::Rxplod, speed: 20, radius: 11, height: 8, mass: 100, damage: 20, activesound: Sound::None, flags: MF::from_bits_truncate(MF::MISSILE.bits() | MF::DROPOFF.bits() | MF::NOBLOCKMAP.bits() | MF::NOGRAVITY.bits()), raisestate: State::S_NULL },
    MobjInfo { id: "STIMPACK", doomednum: 2011, spawnstate: State::S_STIM, spawnhealth: 1000, seestate: State::S_NULL, seesound: Sound::None, reactiontime: 8, attacksound: Sound::None, painstate: State::S_NULL, painchance: 0, painsound: Sound::None, meleestate: State::S_NULL, missilestate: State::S_NULL, deathstate: State::S_NULL, xdeathstate: State::S_NULL, deathsound: Sound::None, speed: 0, radius: 20, height: 16, mass: 100, damage: 0, activesound: Sound::None, flags: MF::from_bits_truncate(MF::SPECIAL.bits()), raisestate: State::S_NULL },
    MobjInfo { id: "SHOTGUN", doomednum: 2001, spawnstate: State::S_SHOT, spawnhealth: 1000, seestate: State::S_NULL, seesound: Sound::None, reactiontime: 8, attacksound: Sound::None, painstate: State::S_NULL, painchance: 0, painsound: Sound::None, meleestate: State::S_NULL, missilestate: State::S_NULL, deathstate: State::S_NULL, xdeathstate: State::S_NULL, deathsound: Sound::None, speed: 0, radius: 20, height: 16, mass: 100, damage: 0, activesound: Sound::None, flags: MF::from_bits_truncate(MF::SPECIAL.bits()), raisestate: State::S_NULL },
];

/// Look up a `MobjInfo` by its symbolic id (e.g. `"PLAYER"`).
pub fn by_id(id: &str) -> Option<&'static MobjInfo> {
    MOBJINFO.iter().find(|m| m.id == id)
}

/// Look up a `MobjInfo` by its WAD thing-type (`doomednum`). Things with no
/// map-placeable form (projectiles, the player) use `-1` and are never
/// matched here.
pub fn by_doomednum(doomednum: i32) -> Option<&'static MobjInfo> {
    if doomednum < 0 {
        return None;
    }
    MOBJINFO.iter().find(|m| m.doomednum == doomednum)
}
