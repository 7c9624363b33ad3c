//! Per-channel runtime playback state (`stmTyp` in the original): current
//! note/period/volume/panning, effect memory (most tracker effects reuse
//! the last nonzero parameter when given `00`), and envelope/vibrato
//! progress.

use super::song::VibratoWaveform;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortaDir {
    Idle,
    Up,
    Down,
}

/// Runtime state for one of the song's channels. Reset to defaults at
/// song start; most fields persist across rows (effect memory, envelope
/// progress) rather than resetting every row the way the note/instrument
/// fields do.
#[derive(Debug, Clone)]
pub struct Channel {
    pub instrument: u8,
    pub sample: u8,
    pub note: u8,
    pub relative_note: i8,
    pub finetune: i8,

    pub real_period: u32,
    pub out_period: u32,
    pub want_period: u32,

    pub volume: u8,
    pub panning: u8,
    pub global_vol_applied: u8,

    pub playing: bool,
    pub key_off: bool,

    pub porta_dir: PortaDir,
    pub porta_speed: u16,
    pub porta_up_speed: u16,
    pub porta_down_speed: u16,

    pub vibrato_waveform: VibratoWaveform,
    pub vibrato_pos: u8,
    pub vibrato_speed: u8,
    pub vibrato_depth: u8,

    pub tremolo_waveform: VibratoWaveform,
    pub tremolo_pos: u8,
    pub tremolo_speed: u8,
    pub tremolo_depth: u8,

    pub vol_slide_speed: u8,
    pub global_vol_slide_speed: u8,
    pub pan_slide_speed: u8,

    pub tone_porta_speed: u8,
    pub arp_note_1: u8,
    pub arp_note_2: u8,

    pub fine_porta_up: u8,
    pub fine_porta_down: u8,
    pub extra_fine_porta_up: u8,
    pub extra_fine_porta_down: u8,

    pub retrig_speed: u8,
    pub retrig_vol_type: u8,
    pub retrig_count: u8,

    pub tremor_on_ticks: u8,
    pub tremor_off_ticks: u8,
    pub tremor_pos: u8,

    pub note_delay: u8,
    pub note_cut: Option<u8>,
    pub pattern_loop_row: u16,
    pub pattern_loop_count: u8,

    /// This row's effect+param, held so a non-tick-zero tick can keep
    /// applying it (`DoEffects` re-dispatches off the current row's
    /// cell, not the previous row's).
    pub last_effect: u8,
    pub last_param: u8,

    pub env_vol_tick: u16,
    pub env_vol_amp: i32,
    pub env_vol_ip: i32,
    pub env_vol_point: usize,
    pub env_sustain_active: bool,
    pub fadeout_vol: u16,

    pub env_pan_tick: u16,
    pub env_pan_amp: i32,
    pub env_pan_ip: i32,
    pub env_pan_point: usize,

    /// Instrument auto-vibrato phase/sweep-in progress, separate from the
    /// `4xy` effect's own `vibrato_pos`.
    pub autovib_pos: u8,
    pub autovib_sweep_pos: u16,
}

impl Default for Channel {
    fn default() -> Self {
        Self {
            instrument: 0,
            sample: 0,
            note: 0,
            relative_note: 0,
            finetune: 0,
            real_period: 0,
            out_period: 0,
            want_period: 0,
            volume: 64,
            panning: 128,
            global_vol_applied: 64,
            playing: false,
            key_off: false,
            porta_dir: PortaDir::Idle,
            porta_speed: 0,
            porta_up_speed: 0,
            porta_down_speed: 0,
            vibrato_waveform: VibratoWaveform::Sine,
            vibrato_pos: 0,
            vibrato_speed: 0,
            vibrato_depth: 0,
            tremolo_waveform: VibratoWaveform::Sine,
            tremolo_pos: 0,
            tremolo_speed: 0,
            tremolo_depth: 0,
            vol_slide_speed: 0,
            global_vol_slide_speed: 0,
            pan_slide_speed: 0,
            tone_porta_speed: 0,
            arp_note_1: 0,
            arp_note_2: 0,
            fine_porta_up: 0,
            fine_porta_down: 0,
            extra_fine_porta_up: 0,
            extra_fine_porta_down: 0,
            retrig_speed: 0,
            retrig_vol_type: 0,
            retrig_count: 0,
            tremor_on_ticks: 0,
            tremor_off_ticks: 0,
            tremor_pos: 0,
            note_delay: 0,
            note_cut: None,
            pattern_loop_row: 0,
            pattern_loop_count: 0,
            last_effect: 0,
            last_param: 0,
            env_vol_tick: 0,
            env_vol_amp: 0,
            env_vol_ip: 0,
            env_vol_point: 0,
            env_sustain_active: true,
            fadeout_vol: 65535,
            env_pan_tick: 0,
            env_pan_amp: 0,
            env_pan_ip: 0,
            env_pan_point: 0,
            autovib_pos: 0,
            autovib_sweep_pos: 0,
        }
    }
}
