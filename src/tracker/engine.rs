//! Pattern/row/tick scheduler: the engine that walks a [`SongData`]'s
//! order list row by row, dispatching effects each tick and handing the
//! mixer a period/volume/panning snapshot per channel. Grounded in
//! `pmp_main.c`'s `getNewNote`/`checkEffects`/`fixaEnvelopeVibrato`/
//! `GetNextPos` quartet.
//!
//! Effect bytes follow the standard base-36 encoding (`0`-`9` then
//! `A`-`Z`); [`fx`] names the ones this core dispatches. Volume-column
//! values are simplified to a single `1..=64` absolute-volume range
//! rather than the original's full set-volume/slide/vibrato/pan sub-bands.

use super::channel::Channel;
use super::effects::*;
use super::period::note_to_period;
use super::song::{Cell, FrequencyTable, Instrument, SongData, VibratoWaveform, NOTE_OFF};

mod fx {
    pub const ARPEGGIO: u8 = 0x0;
    pub const PORTA_UP: u8 = 0x1;
    pub const PORTA_DOWN: u8 = 0x2;
    pub const TONE_PORTA: u8 = 0x3;
    pub const VIBRATO: u8 = 0x4;
    pub const TREMOLO: u8 = 0x7;
    pub const SET_PANNING: u8 = 0x8;
    pub const VOLUME_SLIDE: u8 = 0xA;
    pub const POSITION_JUMP: u8 = 0xB;
    pub const SET_VOLUME: u8 = 0xC;
    pub const PATTERN_BREAK: u8 = 0xD;
    pub const EXTENDED: u8 = 0xE;
    pub const SET_SPEED_TEMPO: u8 = 0xF;
    pub const SET_GLOBAL_VOLUME: u8 = 16; // G
    pub const GLOBAL_VOLUME_SLIDE: u8 = 17; // H
    pub const SET_ENV_POSITION: u8 = 21; // L
    pub const PANNING_SLIDE: u8 = 25; // P
    pub const MULTI_RETRIG: u8 = 27; // R
    pub const TREMOR: u8 = 29; // T
    pub const EXTRA_FINE_PORTA: u8 = 33; // X
}

mod fx_extended {
    pub const FINE_PORTA_UP: u8 = 0x1;
    pub const FINE_PORTA_DOWN: u8 = 0x2;
    pub const SET_VIBRATO_CTRL: u8 = 0x4;
    pub const PATTERN_LOOP: u8 = 0x6;
    pub const SET_TREMOLO_CTRL: u8 = 0x7;
    pub const NOTE_CUT: u8 = 0xC;
    pub const NOTE_DELAY: u8 = 0xD;
    pub const PATTERN_DELAY: u8 = 0xE;
}

/// One channel's resolved playback parameters for this tick, handed to
/// the mixer to drive a [`crate::mixer::Voice`].
#[derive(Debug, Clone, Copy)]
pub struct ChannelOutput {
    pub sample: u8,
    pub period: u32,
    pub volume: u8,
    pub panning: u8,
    pub trigger: bool,
    pub muted: bool,
}

impl Default for ChannelOutput {
    fn default() -> Self {
        Self {
            sample: 0,
            period: 0,
            volume: 0,
            panning: 128,
            trigger: false,
            muted: false,
        }
    }
}

/// A row-level control effect (break/jump/delay/tempo) deferred until
/// after every channel in the row has been processed, since only one can
/// take effect and several channels could in principle carry one.
enum RowControl {
    PatternBreak(u16),
    PositionJump(u16),
    PatternDelay(u8),
    SetSpeedOrTempo(u8),
    PatternLoop(u16),
}

/// The replayer's row/tick position and timing state (`songpos`,
/// `pattpos`, `timer`, `tempo`, `speed`, `pBreakPos`, `pBreakFlag`,
/// `posJumpFlag`, `pattDelTime`, `pattDelTime2`, `globVol`).
pub struct TrackerEngine {
    pub channels: Vec<Channel>,

    pub songpos: u16,
    pub pattpos: u16,
    pub timer: u16,
    pub tempo: u16,
    pub speed: u16,
    pub global_volume: u8,

    p_break_pos: u16,
    p_break_flag: bool,
    pos_jump_flag: bool,
    patt_del_time: u8,
    patt_del_time2: u8,

    /// Ticks elapsed since the current row's tick-zero, reset every time a
    /// new row is read — arpeggio's 3-tick cycle is keyed off this rather
    /// than the free-running `timer` countdown.
    row_tick: u16,

    playing: bool,
}

impl TrackerEngine {
    pub fn new(song: &SongData) -> Self {
        Self {
            channels: vec![Channel::default(); song.channels],
            songpos: 0,
            pattpos: 0,
            timer: 0,
            tempo: song.initial_tempo,
            speed: song.initial_speed,
            global_volume: song.global_volume,
            p_break_pos: 0,
            p_break_flag: false,
            pos_jump_flag: false,
            patt_del_time: 0,
            patt_del_time2: 0,
            row_tick: 0,
            playing: true,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Samples-per-row-tick, `(replay_rate * 5 / 2) / tempo` — the chunk
    /// size the mixer consumes between calls to [`Self::tick`].
    pub fn samples_per_tick(&self, replay_rate: u32) -> u32 {
        if self.tempo == 0 {
            return replay_rate;
        }
        (replay_rate * 5 / 2) / self.tempo as u32
    }

    /// Advance one tick: decrement `timer`, and on the tick-zero boundary
    /// either read new pattern cells (`GetNewNote`) or advance running
    /// effects (`DoEffects`), then envelopes/auto-vibrato, then the row
    /// pointer.
    pub fn tick(&mut self, song: &SongData, outputs: &mut [ChannelOutput]) {
        if !self.playing {
            return;
        }

        self.timer = self.timer.saturating_sub(1);
        let tick_zero = self.timer == 0;
        if tick_zero {
            self.timer = self.speed.max(1);
        }

        let control = if tick_zero && self.patt_del_time2 == 0 {
            self.row_tick = 0;
            self.get_new_note(song, outputs)
        } else {
            if tick_zero {
                self.row_tick = 0;
            } else {
                self.row_tick = self.row_tick.wrapping_add(1);
            }
            self.do_effects(song, outputs);
            None
        };

        self.fixa_envelope_vibrato(song, outputs);

        if tick_zero {
            if let Some(control) = control {
                self.apply_control(control);
            }
            self.get_next_pos(song);
        }
    }

    /// `GetNewNote`: fetch this row's cell for every channel, start/change
    /// instruments, and apply tick-zero effects. Returns the last
    /// row-level control effect seen, if any.
    fn get_new_note(&mut self, song: &SongData, outputs: &mut [ChannelOutput]) -> Option<RowControl> {
        let Some(&pattern_idx) = song.order.get(self.songpos as usize) else {
            self.playing = false;
            return None;
        };
        let pattern = &song.patterns[pattern_idx as usize];
        if self.pattpos as usize >= pattern.rows || pattern.channels == 0 {
            return None;
        }

        let mut control = None;
        let current_row = self.pattpos;
        for (idx, ch) in self.channels.iter_mut().enumerate() {
            let cell = pattern.cell(self.pattpos as usize, idx.min(pattern.channels - 1));
            apply_cell(ch, &cell, song);
            let instrument = song.instruments.get(ch.instrument as usize);
            if let Some(c) = apply_tick_zero_effect(
                ch,
                cell.effect,
                cell.param,
                &mut self.global_volume,
                song.frequency_table,
                current_row,
                instrument,
            ) {
                control = Some(c);
            }
            outputs[idx] = snapshot(ch, cell.note != 0 || cell.instrument != 0);
        }
        control
    }

    /// `DoEffects`: tick>0 continuation of the current row's effect.
    fn do_effects(&mut self, song: &SongData, outputs: &mut [ChannelOutput]) {
        let table = song.frequency_table;
        let row_tick = self.row_tick;
        for (idx, ch) in self.channels.iter_mut().enumerate() {
            let effect = ch.last_effect;
            let param = ch.last_param;
            apply_running_effect(ch, effect, param, &mut self.global_volume, table, row_tick);
            outputs[idx] = snapshot(ch, false);
        }
    }

    /// `FixaEnvelopeVibrato`: advance volume/panning envelopes, fadeout and
    /// instrument auto-vibrato for every channel, folding the results into
    /// this tick's output volume/panning/period.
    fn fixa_envelope_vibrato(&mut self, song: &SongData, outputs: &mut [ChannelOutput]) {
        for (idx, ch) in self.channels.iter_mut().enumerate() {
            let Some(instrument) = song.instruments.get(ch.instrument as usize) else {
                continue;
            };

            let vol_amp = advance_envelope(
                &instrument.volume_envelope,
                &mut ch.env_vol_tick,
                &mut ch.env_vol_point,
                &mut ch.env_vol_amp,
                &mut ch.env_vol_ip,
                ch.env_sustain_active,
            );

            let pan_amp = advance_envelope(
                &instrument.panning_envelope,
                &mut ch.env_pan_tick,
                &mut ch.env_pan_point,
                &mut ch.env_pan_amp,
                &mut ch.env_pan_ip,
                ch.env_sustain_active,
            );

            if ch.key_off && instrument.fadeout > 0 {
                ch.fadeout_vol = ch.fadeout_vol.saturating_sub(instrument.fadeout);
            }

            let env_scale = (vol_amp.clamp(0, 64 * 256) as f32 / (64.0 * 256.0))
                * (ch.fadeout_vol as f32 / 65535.0);

            let autovib = auto_vibrato_delta(ch, instrument);

            if let Some(out) = outputs.get_mut(idx) {
                out.volume = (out.volume as f32 * env_scale) as u8;
                if instrument.panning_envelope.enabled {
                    // FT2's panning-envelope pull: the deviation from center
                    // (32) is scaled down the closer the base pan already
                    // is to an edge, so the envelope can't push panning
                    // past hard left/right.
                    let env_pan = (pan_amp >> 8) - 32;
                    let base = out.panning as i32;
                    let pulled = base + (env_pan * (128 - (base - 128).abs())) / 32;
                    out.panning = pulled.clamp(0, 255) as u8;
                }
                out.period = (out.period as i32 + autovib).max(1) as u32;
                if ch.note_cut == Some(0) {
                    out.muted = true;
                }
            }
        }
    }

    fn apply_control(&mut self, control: RowControl) {
        match control {
            RowControl::PatternBreak(row) => {
                self.p_break_pos = row;
                self.p_break_flag = true;
            }
            RowControl::PositionJump(pos) => {
                self.songpos = pos;
                self.pos_jump_flag = true;
            }
            RowControl::PatternDelay(rows) => {
                if self.patt_del_time2 == 0 {
                    self.patt_del_time = rows;
                }
            }
            RowControl::SetSpeedOrTempo(value) => {
                if value < 32 {
                    if value > 0 {
                        self.speed = value as u16;
                    }
                } else {
                    self.tempo = value as u16;
                }
            }
            RowControl::PatternLoop(row) => {
                self.p_break_pos = row;
                self.p_break_flag = true;
            }
        }
    }

    /// `GetNextPos`: advance the row pointer, handling pattern delay
    /// (`EEx`), pattern break (`Dxx`), and position jump (`Bxx`), wrapping
    /// songpos at the end of the order list.
    fn get_next_pos(&mut self, song: &SongData) {
        if self.patt_del_time2 > 0 {
            self.patt_del_time2 -= 1;
            return;
        }
        if self.patt_del_time > 0 {
            self.patt_del_time2 = self.patt_del_time;
            self.patt_del_time = 0;
        }

        let mut next_row = self.pattpos + 1;
        let mut next_pos = self.songpos;
        let mut advance_pos = self.pos_jump_flag;

        if self.p_break_flag {
            next_row = self.p_break_pos;
            self.p_break_flag = false;
        }
        self.pos_jump_flag = false;

        let pattern_idx = song.order.get(self.songpos as usize).copied().unwrap_or(0);
        let pattern_rows = song
            .patterns
            .get(pattern_idx as usize)
            .map(|p| p.rows as u16)
            .unwrap_or(64);

        if next_row >= pattern_rows {
            advance_pos = true;
            next_row = 0;
        }

        if advance_pos && next_pos == self.songpos {
            next_pos = next_pos.wrapping_add(1);
        }

        if next_pos as usize >= song.order.len() {
            next_pos = song.restart_position;
        }

        self.songpos = next_pos;
        self.pattpos = next_row;
    }
}

fn apply_cell(ch: &mut Channel, cell: &Cell, song: &SongData) {
    if cell.instrument != 0 {
        ch.instrument = cell.instrument - 1;
    }

    if cell.note == NOTE_OFF {
        ch.key_off = true;
        ch.last_effect = cell.effect;
        ch.last_param = cell.param;
        return;
    }

    if cell.note != 0 {
        if let Some(instrument) = song.instruments.get(ch.instrument as usize) {
            let slot = (cell.note as usize).saturating_sub(1).min(95);
            ch.sample = instrument.sample_indices[slot];
            if let Some(sample) = instrument.samples.get(ch.sample as usize) {
                ch.finetune = sample.finetune;
                ch.relative_note = sample.relative_note;
                ch.volume = sample.volume;
                ch.panning = sample.panning;
            }
        }
        let note = (cell.note as i32 + ch.relative_note as i32).clamp(1, 96) as u8;
        ch.note = note;
        ch.want_period = note_to_period(song.frequency_table, note, ch.finetune);
        // `3xx` tone portamento in the same cell as a new note retargets
        // the slide instead of snapping straight to it — `real_period`
        // only jumps to `want_period` here when there's no existing slide
        // in flight for this channel to continue.
        if cell.effect != fx::TONE_PORTA || !ch.playing {
            ch.real_period = ch.want_period;
            ch.out_period = ch.want_period;
        }
        ch.playing = true;
        ch.key_off = false;
        ch.fadeout_vol = 65535;
        ch.env_vol_tick = 0;
        ch.env_vol_point = 0;
        ch.env_vol_amp = 0;
        ch.env_pan_tick = 0;
        ch.env_pan_point = 0;
        ch.env_pan_amp = 0;
        ch.autovib_pos = 0;
        ch.autovib_sweep_pos = 0;
        ch.note_cut = None;
    }

    // Simplified volume column: 1..=64 is an absolute volume set; every
    // other sub-band (slides, vibrato, panning) the original packs into
    // this byte is left to the normal effect column instead.
    if (1..=64).contains(&cell.volume_column) {
        ch.volume = cell.volume_column - 1;
    }

    ch.last_effect = cell.effect;
    ch.last_param = cell.param;
}

fn apply_tick_zero_effect(
    ch: &mut Channel,
    effect: u8,
    param: u8,
    global_volume: &mut u8,
    table: FrequencyTable,
    current_row: u16,
    instrument: Option<&Instrument>,
) -> Option<RowControl> {
    match effect {
        fx::ARPEGGIO => ch.out_period = arpeggio(ch, param, table, 0),
        fx::PORTA_UP => porta_up(ch, param),
        fx::PORTA_DOWN => porta_down(ch, param),
        // `3xx` never slides on the row's own tick, but the speed nibble
        // still has to be memorized here or the running ticks that follow
        // (which always reuse the memorized speed) would never move.
        fx::TONE_PORTA => {
            if param != 0 {
                ch.tone_porta_speed = param;
            }
        }
        fx::VIBRATO => vibrato(ch, param),
        fx::TREMOLO => ch.volume = tremolo(ch, param),
        fx::SET_PANNING => set_panning(ch, param),
        fx::SET_VOLUME => set_volume(ch, param),
        fx::POSITION_JUMP => return Some(RowControl::PositionJump(param as u16)),
        fx::PATTERN_BREAK => return Some(RowControl::PatternBreak(((param >> 4) * 10 + (param & 0x0F)) as u16)),
        fx::SET_SPEED_TEMPO => return Some(RowControl::SetSpeedOrTempo(param)),
        fx::SET_GLOBAL_VOLUME => *global_volume = param.min(64),
        fx::SET_ENV_POSITION => {
            if let Some(instrument) = instrument {
                set_envelope_position(
                    &instrument.volume_envelope,
                    param,
                    &mut ch.env_vol_tick,
                    &mut ch.env_vol_point,
                    &mut ch.env_vol_amp,
                    &mut ch.env_vol_ip,
                );
                set_envelope_position(
                    &instrument.panning_envelope,
                    param,
                    &mut ch.env_pan_tick,
                    &mut ch.env_pan_point,
                    &mut ch.env_pan_amp,
                    &mut ch.env_pan_ip,
                );
            }
        }
        fx::EXTENDED => return apply_extended_tick_zero(ch, param, current_row),
        _ => {}
    }
    None
}

fn apply_extended_tick_zero(ch: &mut Channel, param: u8, current_row: u16) -> Option<RowControl> {
    let sub = param >> 4;
    let val = param & 0x0F;
    match sub {
        fx_extended::FINE_PORTA_UP => fine_porta_up(ch, val),
        fx_extended::FINE_PORTA_DOWN => fine_porta_down(ch, val),
        fx_extended::SET_VIBRATO_CTRL => ch.vibrato_waveform = VibratoWaveform::from_bits(val),
        fx_extended::PATTERN_LOOP => {
            if val == 0 {
                ch.pattern_loop_row = current_row;
            } else {
                if ch.pattern_loop_count == 0 {
                    ch.pattern_loop_count = val;
                } else {
                    ch.pattern_loop_count -= 1;
                }
                if ch.pattern_loop_count > 0 {
                    return Some(RowControl::PatternLoop(ch.pattern_loop_row));
                }
            }
        }
        fx_extended::SET_TREMOLO_CTRL => ch.tremolo_waveform = VibratoWaveform::from_bits(val),
        fx_extended::NOTE_CUT => ch.note_cut = Some(val),
        fx_extended::NOTE_DELAY => ch.note_delay = val,
        fx_extended::PATTERN_DELAY => return Some(RowControl::PatternDelay(val)),
        _ => {}
    }
    None
}

fn apply_running_effect(
    ch: &mut Channel,
    effect: u8,
    param: u8,
    global_volume: &mut u8,
    table: FrequencyTable,
    row_tick: u16,
) {
    match effect {
        fx::ARPEGGIO => ch.out_period = arpeggio(ch, param, table, row_tick as u32),
        fx::PORTA_UP => porta_up(ch, 0),
        fx::PORTA_DOWN => porta_down(ch, 0),
        fx::TONE_PORTA => tone_porta(ch, 0),
        fx::VIBRATO => vibrato(ch, param),
        fx::TREMOLO => ch.volume = tremolo(ch, param),
        fx::VOLUME_SLIDE => volume_slide(ch, param),
        fx::GLOBAL_VOLUME_SLIDE => global_volume_slide(ch, param, global_volume),
        fx::PANNING_SLIDE => panning_slide(ch, param),
        fx::MULTI_RETRIG => {
            if ch.retrig_speed != 0 || param != 0 {
                if param != 0 {
                    ch.retrig_vol_type = param >> 4;
                    ch.retrig_speed = param & 0x0F;
                }
                ch.retrig_count = ch.retrig_count.wrapping_add(1);
                if ch.retrig_speed != 0 && ch.retrig_count >= ch.retrig_speed {
                    ch.retrig_count = 0;
                    ch.volume = multi_retrig_volume(ch.volume, ch.retrig_vol_type);
                }
            }
        }
        fx::TREMOR => {
            let audible = tremor(ch, param);
            if !audible {
                ch.volume = 0;
            }
        }
        fx::EXTRA_FINE_PORTA => {
            let sub = param >> 4;
            let val = param & 0x0F;
            if sub == 0x1 {
                extra_fine_porta_up(ch, val);
            } else if sub == 0x2 {
                extra_fine_porta_down(ch, val);
            }
        }
        _ => {}
    }
}

fn snapshot(ch: &Channel, trigger: bool) -> ChannelOutput {
    ChannelOutput {
        sample: ch.sample,
        period: ch.out_period,
        volume: ch.volume,
        panning: ch.panning,
        trigger,
        muted: ch.note_cut == Some(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::song::{Envelope, FrequencyTable, Instrument, Pattern, SampleInfo};

    fn tiny_song() -> SongData {
        let cell_c4 = Cell {
            note: 49, // C-4
            instrument: 1,
            volume_column: 0,
            effect: 0,
            param: 0,
        };
        let pattern = Pattern {
            rows: 2,
            channels: 1,
            cells: vec![cell_c4, Cell::default()],
        };
        let instrument = Instrument {
            sample_indices: [0; 96],
            volume_envelope: Envelope::default(),
            panning_envelope: Envelope::default(),
            vibrato_waveform: VibratoWaveform::Sine,
            vibrato_speed: 0,
            vibrato_depth: 0,
            vibrato_sweep: 0,
            fadeout: 0,
            samples: vec![SampleInfo {
                relative_note: 0,
                finetune: 0,
                volume: 64,
                panning: 128,
                loop_start: 0,
                loop_len: 0,
                looping: false,
                ping_pong: false,
                pcm: vec![0; 8],
            }],
        };
        SongData {
            name: "test".into(),
            channels: 1,
            initial_speed: 6,
            initial_tempo: 125,
            restart_position: 0,
            frequency_table: FrequencyTable::Amiga,
            order: vec![0],
            patterns: vec![pattern],
            instruments: vec![instrument],
            global_volume: 64,
        }
    }

    #[test]
    fn tick_zero_triggers_note_and_advances_row() {
        let song = tiny_song();
        let mut engine = TrackerEngine::new(&song);
        let mut outputs = vec![ChannelOutput::default(); 1];

        engine.tick(&song, &mut outputs);
        assert!(outputs[0].trigger);
        assert!(outputs[0].period > 0);
        assert_eq!(engine.pattpos, 1, "row pointer pre-advances on the tick-zero that reads it");

        for _ in 0..(engine.speed - 1) {
            engine.tick(&song, &mut outputs);
        }
        assert_eq!(engine.pattpos, 1, "still inside the same row until the next tick-zero");
    }

    #[test]
    fn pattern_wraps_to_restart_position() {
        let song = tiny_song();
        let mut engine = TrackerEngine::new(&song);
        let mut outputs = vec![ChannelOutput::default(); 1];

        for _ in 0..(engine.speed as usize * 3) {
            engine.tick(&song, &mut outputs);
        }
        assert_eq!(engine.songpos, 0);
    }

    /// A new note sharing its row with `3xx` must retarget the existing
    /// slide instead of snapping straight to the new pitch — regression
    /// test for a bug where `apply_cell` unconditionally overwrote
    /// `real_period` before the tone-porta effect ever ran.
    #[test]
    fn tone_porta_with_new_note_slides_gradually_instead_of_snapping() {
        let mut song = tiny_song();
        song.initial_speed = 4;
        let pattern = &mut song.patterns[0];
        pattern.rows = 3;
        pattern.cells = vec![
            Cell { note: 49, instrument: 1, volume_column: 0, effect: 0, param: 0 },
            Cell { note: 61, instrument: 1, volume_column: 0, effect: fx::TONE_PORTA, param: 20 },
            Cell { note: 0, instrument: 0, volume_column: 0, effect: fx::TONE_PORTA, param: 0 },
        ];

        let mut engine = TrackerEngine::new(&song);
        let mut outputs = vec![ChannelOutput::default(); 1];

        let base_period = note_to_period(FrequencyTable::Amiga, 49, 0);
        let target_period = note_to_period(FrequencyTable::Amiga, 61, 0);
        assert_ne!(base_period, target_period, "test needs two distinct pitches");

        // Row 0: tick-zero trigger plus its 3 running ticks.
        for _ in 0..engine.speed {
            engine.tick(&song, &mut outputs);
        }
        assert_eq!(engine.channels[0].real_period, base_period);

        // Row 1, tick zero: the new note must not snap `real_period`.
        engine.tick(&song, &mut outputs);
        assert_eq!(
            engine.channels[0].want_period, target_period,
            "want_period still retargets on the new note"
        );
        assert_eq!(
            engine.channels[0].real_period, base_period,
            "real_period must keep sliding, not jump, when 3xx shares the cell with a note"
        );

        // Row 1's first running tick: the slide now closes in on the target.
        engine.tick(&song, &mut outputs);
        let after_one_running_tick = engine.channels[0].real_period;
        assert_ne!(after_one_running_tick, base_period, "the slide must move");
        assert_ne!(
            after_one_running_tick, target_period,
            "tone_porta_speed=20 shouldn't cover the whole gap in a single tick"
        );

        // Remaining ticks of row 1 plus row 2 (which continues the slide at
        // the memorized speed via `3xx` with `param == 0`) close the gap.
        for _ in 0..6 {
            engine.tick(&song, &mut outputs);
        }
        assert_eq!(
            engine.channels[0].real_period, target_period,
            "slide eventually reaches the target and holds there"
        );
    }

    /// `0xy` arpeggio must actually perturb the output period on the
    /// non-tick-zero ticks instead of being a dead dispatch arm.
    #[test]
    fn arpeggio_cycles_period_across_the_three_tick_pattern() {
        let mut song = tiny_song();
        song.initial_speed = 3;
        let pattern = &mut song.patterns[0];
        pattern.rows = 2;
        pattern.cells = vec![
            Cell { note: 49, instrument: 1, volume_column: 0, effect: fx::ARPEGGIO, param: 0x47 },
            Cell::default(),
        ];

        let mut engine = TrackerEngine::new(&song);
        let mut outputs = vec![ChannelOutput::default(); 1];
        let base_period = note_to_period(FrequencyTable::Amiga, 49, 0);

        engine.tick(&song, &mut outputs); // tick-zero, arp step 0
        assert_eq!(outputs[0].period, base_period);

        engine.tick(&song, &mut outputs); // running tick 1, +4 semitones
        assert_ne!(outputs[0].period, base_period);

        engine.tick(&song, &mut outputs); // running tick 2, +7 semitones
        assert_ne!(outputs[0].period, base_period);
    }

    /// `E6x` pattern loop must jump the row pointer back to the marked row
    /// exactly the requested number of times, not be ignored.
    #[test]
    fn pattern_loop_replays_marked_rows_once() {
        let mut song = tiny_song();
        song.initial_speed = 1;
        let pattern = &mut song.patterns[0];
        pattern.rows = 3;
        pattern.cells = vec![
            Cell { note: 0, instrument: 0, volume_column: 0, effect: fx::EXTENDED, param: 0x60 },
            Cell::default(),
            Cell { note: 0, instrument: 0, volume_column: 0, effect: fx::EXTENDED, param: 0x61 },
        ];

        let mut engine = TrackerEngine::new(&song);
        let mut outputs = vec![ChannelOutput::default(); 1];

        let mut rows_read = vec![];
        for _ in 0..6 {
            rows_read.push(engine.pattpos);
            engine.tick(&song, &mut outputs);
        }
        assert_eq!(rows_read, vec![0, 1, 2, 0, 1, 2], "loop replays rows 0-2 exactly once before moving on");
    }

    /// Vibrato and tremolo must be audible: the tick-zero dispatch arms
    /// used to be missing entirely, and the running-tick arms used to
    /// pass a hardcoded `0` instead of the cell's real parameter.
    #[test]
    fn vibrato_and_tremolo_perturb_period_and_volume() {
        let mut song = tiny_song();
        song.initial_speed = 4;
        let pattern = &mut song.patterns[0];
        pattern.rows = 1;
        pattern.cells = vec![Cell { note: 49, instrument: 1, volume_column: 0, effect: fx::VIBRATO, param: 0x48 }];

        let mut engine = TrackerEngine::new(&song);
        let mut outputs = vec![ChannelOutput::default(); 1];
        let base_period = note_to_period(FrequencyTable::Amiga, 49, 0);

        engine.tick(&song, &mut outputs);
        assert_eq!(engine.channels[0].vibrato_depth, 8);
        assert_eq!(engine.channels[0].vibrato_speed, 4);

        let mut saw_deviation = false;
        for _ in 0..(engine.speed - 1) {
            engine.tick(&song, &mut outputs);
            if outputs[0].period != base_period {
                saw_deviation = true;
            }
        }
        assert!(saw_deviation, "vibrato's running ticks must use the real depth/speed, not a hardcoded 0");

        let mut song = tiny_song();
        song.initial_speed = 4;
        // Start below max volume so a positive tremolo swing (the only
        // swing this short a run reaches) is visible instead of clamping.
        song.instruments[0].samples[0].volume = 32;
        let pattern = &mut song.patterns[0];
        pattern.rows = 1;
        pattern.cells = vec![Cell { note: 49, instrument: 1, volume_column: 0, effect: fx::TREMOLO, param: 0x48 }];

        let mut engine = TrackerEngine::new(&song);
        let mut outputs = vec![ChannelOutput::default(); 1];

        engine.tick(&song, &mut outputs); // tick-zero: note trigger, no swing yet (pos 0)
        let base_volume = engine.channels[0].volume;

        let mut saw_volume_change = false;
        for _ in 0..(engine.speed - 1) {
            engine.tick(&song, &mut outputs);
            if outputs[0].volume != base_volume {
                saw_volume_change = true;
            }
        }
        assert!(saw_volume_change, "tremolo's running ticks must use the real depth/speed, not a hardcoded 0");
    }
}
