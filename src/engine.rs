//! Top-level frontend-facing facade: owns the level, the play simulation,
//! the HUD command queue, the music replayer and the one-shot SFX mixer,
//! and wires the pieces together the way a frame driver otherwise would by
//! hand. [`crate::sim::Sim`] stays usable on its own (`src/bin/view_sw.rs`
//! drives it directly); `Engine` is for callers that want sound and
//! save/load for free.

use std::collections::HashMap;

use glam::Vec2;
use tracing::{info, warn};

use crate::config::Config;
use crate::defs::Sound;
use crate::hud::HudState;
use crate::mixer::{pan_to_gains, LoopMode, Mixer, SampleData};
use crate::save::{GlobRecord, MobjRecord, PlayerRecord, SaveError, SaveFile, SaveKind, SectorRecord};
use crate::sim::{Angle, Animation, Class, Health, Player, Position, Sim, SoundEvent, WeaponState};
use crate::tracker::{SongData, Tracker};
use crate::world::Level;

/// A loaded one-shot sound effect: raw PCM plus its loop behavior, keyed
/// by [`Sound`] at registration time.
pub struct SfxClip {
    pub pcm: Vec<i16>,
    pub loop_mode: LoopMode,
}

const MAX_SFX_VOICES: usize = 32;

/// Per-voice playback source for the SFX mixer: which clip a voice is
/// currently assigned to, so `render` knows which PCM to hand the
/// underlying [`Mixer`] each chunk (the mixer itself only knows about
/// voice slots, not sound identities).
struct VoiceAssignment {
    sound: usize,
}

/// Mixes one-shot sound effects (explosions, weapon fire, pain sounds)
/// that arrive as [`SoundEvent`]s off the simulation's sound queue, using
/// the same fixed-point [`Mixer`] the tracker replayer uses for music.
/// Distinct from the tracker's mixer instance: music and SFX run through
/// independent voice pools and get combined only at the final PCM stage.
pub struct AudioMixer {
    mixer: Mixer,
    clips: HashMap<usize, SfxClip>,
    assigned: Vec<Option<VoiceAssignment>>,
    replay_rate: u32,
    /// Set once a host audio backend reports device failure; `start_fx`
    /// then becomes a no-op rather than silently accumulating voices that
    /// will never be heard. Sound requests are dropped; the simulation
    /// keeps running regardless.
    device_ok: bool,
}

impl AudioMixer {
    pub fn new(replay_rate: u32) -> Self {
        Self {
            mixer: Mixer::new(MAX_SFX_VOICES),
            clips: HashMap::new(),
            assigned: (0..MAX_SFX_VOICES).map(|_| None).collect(),
            replay_rate,
            device_ok: true,
        }
    }

    pub fn register_sfx(&mut self, sound: Sound, clip: SfxClip) {
        self.clips.insert(sound as usize, clip);
    }

    pub fn mark_device_failed(&mut self) {
        if self.device_ok {
            warn!("audio device reported failure, dropping future sound effects");
        }
        self.device_ok = false;
    }

    /// Steal the first idle voice (or, failing that, voice 0) for `event`,
    /// panning by the origin's offset from `listener` along the X axis
    /// the way a simple stereo-only positional model would.
    pub fn start_fx(&mut self, event: SoundEvent, listener: Vec2) {
        if !self.device_ok || !self.clips.contains_key(&(event.sound as usize)) {
            return;
        }
        if event.sound as usize == Sound::None as usize {
            return;
        }

        let slot = self
            .assigned
            .iter()
            .position(|a| a.is_none())
            .unwrap_or(0);

        let clip = &self.clips[&(event.sound as usize)];
        let delta = ((C2_SFX_RATE as f64 / self.replay_rate as f64) * crate::mixer::FIXED_ONE as f64) as u32;
        let offset = (event.origin.x - listener.x).clamp(-512.0, 512.0);
        let pan = (((offset + 512.0) / 1024.0) * 255.0) as u8;
        let (gain_l, gain_r) = pan_to_gains(pan);

        let voice = &mut self.mixer.voices[slot];
        voice.trigger(delta.max(1));
        voice.set_volume(gain_l * event.volume, gain_r * event.volume, 1);
        self.assigned[slot] = Some(VoiceAssignment {
            sound: event.sound as usize,
        });
    }

    /// Additively mix `n_frames` of SFX into `out` (interleaved i16
    /// stereo, already holding the tracker's music for this chunk).
    pub fn mix_into(&mut self, out: &mut [i16], n_frames: usize) {
        let refs: Vec<Option<SampleData>> = self
            .assigned
            .iter()
            .map(|slot| {
                let assignment = slot.as_ref()?;
                let clip = self.clips.get(&assignment.sound)?;
                Some(SampleData {
                    data: &clip.pcm,
                    loop_start: 0,
                    loop_len: clip.pcm.len() as u32,
                    loop_mode: clip.loop_mode,
                })
            })
            .collect();

        let mut sfx_buf = vec![0i16; n_frames * 2];
        self.mixer.render(&refs, n_frames, &mut sfx_buf);

        for (dst, src) in out.iter_mut().zip(sfx_buf.iter()) {
            *dst = dst.saturating_add(*src);
        }

        for (slot, voice) in self.assigned.iter_mut().zip(self.mixer.voices.iter()) {
            if !voice.active {
                *slot = None;
            }
        }
    }
}

/// Reference rate one-shot SFX samples are authored at (matches the
/// tracker's `C2_RATE` convention so both mixers share one delta formula).
const C2_SFX_RATE: u32 = 11025;

/// Owns everything a frontend needs to run one map: the geometry, the
/// deterministic simulation, the HUD draw-command queue, an optional
/// tracker song and the SFX mixer. `frame()` advances the simulation and
/// drains its sound queue into the mixer; rendering video and audio stays
/// the caller's job (a window loop, a WASAPI/ALSA callback, or a test
/// harness).
pub struct Engine {
    pub level: Level,
    pub sim: Sim,
    pub hud: HudState,
    pub config: Config,
    pub tracker: Option<Tracker>,
    pub audio: AudioMixer,
    listener: Vec2,
}

impl Engine {
    pub fn new(level: Level, config: Config) -> Self {
        let sim = Sim::new(&level);
        Self {
            level,
            sim,
            hud: HudState::new(),
            audio: AudioMixer::new(44100),
            tracker: None,
            listener: Vec2::ZERO,
            config,
        }
    }

    /// Build an `Engine` whose simulation runs in singletics mode, for
    /// deterministic replay harnesses and save/load round-trip tests.
    pub fn new_singletics(level: Level, config: Config) -> Self {
        let sim = Sim::new_singletics(&level);
        Self {
            level,
            sim,
            hud: HudState::new(),
            audio: AudioMixer::new(44100),
            tracker: None,
            listener: Vec2::ZERO,
            config,
        }
    }

    pub fn load_song(&mut self, song: SongData) {
        self.tracker = Some(Tracker::new(song, 44100));
    }

    /// Advance the simulation by whatever tics real time (or, in
    /// singletics mode, exactly one tic) owes, then drain any sound
    /// events the tic produced into the SFX mixer.
    pub fn frame(&mut self) {
        self.sim.pump(&mut self.level);
        self.update_listener();
        self.drain_sounds();
    }

    fn update_listener(&mut self) {
        if let Some(body) = self.sim.players().first().and_then(|p| p.body) {
            if let Ok(pos) = self.sim.world().get::<&Position>(body) {
                self.listener = pos.0;
            }
        }
    }

    fn drain_sounds(&mut self) {
        let events = self.sim.sound_sink().drain();
        for event in events {
            self.audio.start_fx(event, self.listener);
        }
    }

    /// Fill `out` (interleaved i16 stereo) with the next audio chunk:
    /// tracker music, if any is loaded, with SFX voices mixed on top.
    pub fn render_audio(&mut self, out: &mut [i16]) {
        out.fill(0);
        if let Some(tracker) = &mut self.tracker {
            tracker.render(out);
        }
        self.audio.mix_into(out, out.len() / 2);
    }

    pub fn save_game(&self, path: impl AsRef<std::path::Path>) -> Result<(), SaveError> {
        let save = self.snapshot();
        save.save_to_file(path)?;
        info!(map = %self.level.name, "saved game");
        Ok(())
    }

    pub fn load_game(&mut self, path: impl AsRef<std::path::Path>) -> Result<(), SaveError> {
        let save = SaveFile::load_from_file(path)?;
        self.restore(&save);
        info!(map = %save.glob.map_name, kind = ?save.kind, "loaded game");
        Ok(())
    }

    /// Write a hub-transition save: player state only, since the destination
    /// map supplies its own mobjs and sector heights and the current map's
    /// sim is about to be torn down regardless.
    pub fn save_hub_handoff(&self, path: impl AsRef<std::path::Path>) -> Result<(), SaveError> {
        let save = self.snapshot_hub();
        save.save_to_file(path)?;
        info!(map = %self.level.name, "saved hub handoff");
        Ok(())
    }

    fn glob_record(&self) -> GlobRecord {
        let players = self
            .sim
            .players()
            .iter()
            .map(player_record)
            .collect();

        GlobRecord {
            gametic: self.sim.gametic() as i32,
            skill: self.config.skill,
            map_name: self.level.name.clone(),
            players,
        }
    }

    fn snapshot_hub(&self) -> SaveFile {
        SaveFile {
            kind: SaveKind::HubHandoff,
            glob: self.glob_record(),
            mobjs: Vec::new(),
            sectors: Vec::new(),
        }
    }

    fn snapshot(&self) -> SaveFile {
        let kind = SaveKind::Full;
        let glob = self.glob_record();

        let mut mobjs = Vec::new();
        for (_, (class, pos, angle, health, anim)) in self
            .sim
            .world()
            .query::<(&Class, &Position, &Angle, &Health, &Animation)>()
            .iter()
        {
            mobjs.push(MobjRecord {
                doomednum: class.0.doomednum,
                x: pos.0.x,
                y: pos.0.y,
                z: pos.1,
                angle: angle.0,
                health: health.0,
                state_index: anim.state as u32,
                state_tics: anim.tics,
            });
        }

        let sectors = self
            .level
            .sectors
            .iter()
            .map(|s| SectorRecord {
                floor_h: s.floor_h,
                ceil_h: s.ceil_h,
            })
            .collect();

        SaveFile {
            kind,
            glob,
            mobjs,
            sectors,
        }
    }

    /// Restore a full-map save: re-spawn every recorded mobj fresh (the
    /// entities themselves don't survive a save/load round-trip, only
    /// their persistent fields do), re-apply sector heights, and rebuild
    /// the player roster. A `HubHandoff` save only carries player state,
    /// since the destination map's own mobjs/sectors start fresh.
    fn restore(&mut self, save: &SaveFile) {
        if save.kind == SaveKind::Full {
            self.sim = Sim::new(&self.level);
            self.sim.reset_scheduler();

            for (i, rec) in save.sectors.iter().enumerate() {
                if let Some(sector) = self.level.sectors.get_mut(i) {
                    sector.floor_h = rec.floor_h;
                    sector.ceil_h = rec.ceil_h;
                }
            }

            for rec in &save.mobjs {
                // Player bodies carry `doomednum == -1` (spawned directly,
                // never placed via a THINGS lump entry) and are restored
                // separately below through `spawn_player`, which also
                // re-links the `PlayerBody` tag movement/input need.
                if rec.doomednum < 0 {
                    continue;
                }
                let Some(info) = crate::defs::by_doomednum(rec.doomednum) else {
                    warn!(doomednum = rec.doomednum, "unknown mobj in save, skipping");
                    continue;
                };
                let ent = self.sim.spawn_mobj(&self.level, info, rec.x, rec.y, rec.angle);
                apply_mobj_record(&mut self.sim, ent, rec);
            }
        }

        for (idx, rec) in save.glob.players.iter().enumerate() {
            if save.kind == SaveKind::Full {
                self.sim.spawn_player(&self.level, idx, 0.0, 0.0, 0.0);
            }
            if let Some(player) = self.sim.players_mut().get_mut(idx) {
                apply_player_record(player, rec);
            }
        }
    }
}

/// `WeaponState::Slot(n)` round-trips as `n`; `None`/`NoChange` both
/// collapse to 0 on save and come back as `None` on load, since a pending
/// weapon switch isn't worth preserving across a save/load boundary.
fn encode_weapon(state: WeaponState) -> u8 {
    state.slot().unwrap_or(0)
}

fn decode_weapon(slot: u8) -> WeaponState {
    if slot == 0 {
        WeaponState::None
    } else {
        WeaponState::Slot(slot)
    }
}

fn player_record(player: &Player) -> PlayerRecord {
    PlayerRecord {
        health: player.health,
        armor: player.armor,
        ammo: [
            player.ammo[0].count,
            player.ammo[1].count,
            player.ammo[2].count,
            player.ammo[3].count,
        ],
        max_ammo: [
            player.ammo[0].maximum,
            player.ammo[1].maximum,
            player.ammo[2].maximum,
            player.ammo[3].maximum,
        ],
        weapon_owned: player.weapons,
        ready_weapon: encode_weapon(player.ready_weapon),
        cards: player.cards.bits() as u8,
    }
}

fn apply_player_record(player: &mut Player, rec: &PlayerRecord) {
    player.health = rec.health;
    player.armor = rec.armor;
    for i in 0..4 {
        player.ammo[i].count = rec.ammo[i];
        player.ammo[i].maximum = rec.max_ammo[i];
    }
    player.weapons = rec.weapon_owned;
    player.ready_weapon = decode_weapon(rec.ready_weapon);
    player.cards = crate::sim::Cards::from_bits_truncate(rec.cards as u32);
}

fn apply_mobj_record(sim: &mut Sim, ent: hecs::Entity, rec: &MobjRecord) {
    let world = sim.world_mut();
    if let Ok(mut pos) = world.get::<&mut Position>(ent) {
        pos.1 = rec.z;
    }
    if let Ok(mut health) = world.get::<&mut Health>(ent) {
        health.0 = rec.health;
    }
    if let Ok(mut anim) = world.get::<&mut Animation>(ent) {
        if let Some(info) = crate::defs::states::STATES.get(rec.state_index as usize) {
            anim.state = info.state;
        }
        anim.tics = rec.state_tics;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::geometry::{Level as GeomLevel, Sector, Subsector};

    fn flat_level() -> GeomLevel {
        GeomLevel {
            name: "E1M1".into(),
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
    fn frame_runs_without_a_loaded_song() {
        let level = flat_level();
        let mut engine = Engine::new_singletics(level, Config::default());
        engine.sim.spawn_player(&engine.level, 0, 0.0, 0.0, 0.0);
        engine.frame();
        let mut out = vec![0i16; 2 * 512];
        engine.render_audio(&mut out);
        assert!(out.iter().all(|&s| s == 0));
    }

    #[test]
    fn save_then_load_round_trips_sector_heights() {
        let level = flat_level();
        let mut engine = Engine::new_singletics(level, Config::default());
        engine.level.sectors[0].floor_h = 32.0;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.ysv");
        engine.save_game(&path).unwrap();

        engine.level.sectors[0].floor_h = 0.0;
        engine.load_game(&path).unwrap();

        assert_eq!(engine.level.sectors[0].floor_h, 32.0);
    }

    #[test]
    fn hub_handoff_overlays_player_stats_without_resetting_sim() {
        let level = flat_level();
        let mut engine = Engine::new_singletics(level, Config::default());
        let ent = engine.sim.spawn_player(&engine.level, 0, 0.0, 0.0, 0.0);
        engine.sim.players_mut()[0].health = 42;
        engine.sim.players_mut()[0].ammo[0].count = 17;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hub.ysv");
        engine.save_hub_handoff(&path).unwrap();

        // Spawning a fresh engine for the destination map already put a
        // player in slot 0; the handoff should only overlay its stats, not
        // tear down the sim or respawn the body.
        engine.sim.players_mut()[0].health = 100;
        engine.load_game(&path).unwrap();

        assert_eq!(engine.sim.players()[0].health, 42);
        assert_eq!(engine.sim.players()[0].ammo[0].count, 17);
        assert_eq!(engine.sim.players()[0].body, Some(ent));
    }

    #[test]
    fn sfx_clip_with_unknown_sound_is_dropped() {
        let mut mixer = AudioMixer::new(44100);
        mixer.start_fx(
            SoundEvent {
                sound: Sound::Pistol,
                origin: Vec2::ZERO,
                volume: 1.0,
            },
            Vec2::ZERO,
        );
        assert!(mixer.assigned.iter().all(|a| a.is_none()));
    }
}
