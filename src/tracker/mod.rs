//! XM/MOD playback: static song data ([`song`]), the period/frequency
//! math ([`period`]), per-channel runtime state ([`channel`]), the effect
//! interpreter ([`effects`]) and the row/tick scheduler ([`engine`]).
//!
//! [`Tracker`] ties the four together with a [`crate::mixer::Mixer`] into
//! something an audio callback can just call `render` on, mirroring the
//! original `mainPlayer` callback's "tick the replayer, then mix however
//! many samples that tick is worth" structure.

mod channel;
mod effects;
mod engine;
mod load;
mod period;
mod song;

pub use channel::{Channel, PortaDir};
pub use engine::{ChannelOutput, TrackerEngine};
pub use load::{load_mod, load_module, load_xm, TrackerError};
pub use period::{
    amiga_period_to_note, note_to_period, period_to_freq, relocate_ton, MAX_RELOCATE_NOTE,
};
pub use song::{
    Cell, Envelope, FrequencyTable, Instrument, Pattern, SampleInfo, SongData, VibratoWaveform,
    NOTE_OFF,
};

use crate::mixer::{LoopMode, Mixer, SampleData};

/// Reference pitch for relative-note-zero, finetune-zero playback
/// (`C2FREQ` in the original — the standard Amiga/MOD middle-C rate).
const C2_RATE: u32 = 8363;

fn loop_mode(looping: bool, ping_pong: bool) -> LoopMode {
    if !looping {
        LoopMode::None
    } else if ping_pong {
        LoopMode::PingPong
    } else {
        LoopMode::Forward
    }
}

/// Owns a song, its scheduler and a mixer, and renders audio a chunk at a
/// time — the glue `mainPlayer()` provides in the original between the
/// replayer and the mix buffer.
pub struct Tracker {
    song: SongData,
    engine: TrackerEngine,
    mixer: Mixer,
    replay_rate: u32,
    outputs: Vec<ChannelOutput>,
    samples_until_tick: u32,
}

impl Tracker {
    pub fn new(song: SongData, replay_rate: u32) -> Self {
        let channels = song.channels;
        let mut tracker = Self {
            engine: TrackerEngine::new(&song),
            mixer: Mixer::new(channels),
            song,
            replay_rate,
            outputs: vec![ChannelOutput::default(); channels],
            samples_until_tick: 0,
        };
        tracker.samples_until_tick = tracker.engine.samples_per_tick(tracker.replay_rate);
        tracker
    }

    pub fn is_playing(&self) -> bool {
        self.engine.is_playing()
    }

    /// Fill `out` (interleaved i16 stereo, `out.len()` must be even) with
    /// the next `out.len() / 2` frames, ticking the scheduler as many
    /// times as the current tempo demands along the way.
    pub fn render(&mut self, out: &mut [i16]) {
        let total_frames = out.len() / 2;
        let mut rendered = 0usize;

        while rendered < total_frames {
            if self.samples_until_tick == 0 && self.engine.is_playing() {
                self.engine.tick(&self.song, &mut self.outputs);
                self.apply_outputs();
                self.samples_until_tick = self.engine.samples_per_tick(self.replay_rate).max(1);
            }

            let chunk = (total_frames - rendered).min(self.samples_until_tick as usize);
            if chunk == 0 {
                break;
            }

            let sample_refs = self.sample_refs();
            self.mixer.render(&sample_refs, chunk, &mut out[rendered * 2..(rendered + chunk) * 2]);

            rendered += chunk;
            self.samples_until_tick -= chunk as u32;
        }

        if rendered < total_frames {
            out[rendered * 2..].fill(0);
        }
    }

    /// Push this tick's [`ChannelOutput`] snapshots into the mixer's
    /// voices: trigger on a new note, otherwise just update frequency,
    /// volume and panning in place.
    fn apply_outputs(&mut self) {
        for (voice, output) in self.mixer.voices.iter_mut().zip(self.outputs.iter()) {
            if output.muted || output.period == 0 {
                voice.set_volume(0.0, 0.0, 64);
                continue;
            }

            let freq = period_to_freq(self.song.frequency_table, output.period, C2_RATE);
            let delta = ((freq / self.replay_rate as f64) * crate::mixer::FIXED_ONE as f64) as u32;

            if output.trigger {
                voice.trigger(delta.max(1));
            } else {
                voice.delta = delta.max(1);
            }

            let (pan_l, pan_r) = crate::mixer::pan_to_gains(output.panning);
            let vol_scale = output.volume as f32 / 64.0;
            voice.set_volume(pan_l * vol_scale, pan_r * vol_scale, 64);
        }
    }

    /// Borrow each active channel's current sample as a [`SampleData`]
    /// for this render chunk; `None` for channels with no resolved
    /// instrument/sample (silent slot, mixer skips them).
    fn sample_refs(&self) -> Vec<Option<SampleData<'_>>> {
        self.outputs
            .iter()
            .map(|output| {
                let instrument = self.song.instruments.iter().find(|i| {
                    i.sample_indices.iter().any(|&s| s == output.sample)
                })?;
                let sample = instrument.samples.get(output.sample as usize)?;
                Some(SampleData {
                    data: &sample.pcm,
                    loop_start: sample.loop_start,
                    loop_len: sample.loop_len,
                    loop_mode: loop_mode(sample.looping, sample.ping_pong),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn silent_song() -> SongData {
        SongData {
            name: "silence".into(),
            channels: 1,
            initial_speed: 6,
            initial_tempo: 125,
            restart_position: 0,
            frequency_table: FrequencyTable::Amiga,
            order: vec![0],
            patterns: vec![Pattern {
                rows: 1,
                channels: 1,
                cells: vec![Cell::default()],
            }],
            instruments: vec![],
            global_volume: 64,
        }
    }

    #[test]
    fn render_fills_buffer_with_no_crash_on_empty_song() {
        let song = silent_song();
        let mut tracker = Tracker::new(song, 44100);
        let mut out = vec![0i16; 2 * 512];
        tracker.render(&mut out);
        assert!(out.iter().all(|&s| s == 0));
    }
}
