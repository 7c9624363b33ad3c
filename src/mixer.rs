//! Sample mixer: the per-voice resampling/volume-ramping inner loop that
//! turns raw instrument samples into a stereo accumulator, grounded in
//! `pmp_mix.c`'s `Mix_...` family. The original hand-specializes 16 inner
//! loops (selected by a center/16-bit/ramp/interpolation bitmask); this
//! core collapses them into one generic loop parameterized by the same
//! four axes; monomorphization/branch prediction gets the specialization
//! back without the source duplication.

use crate::math::tables::PANNING_TAB;

/// Fixed-point shift used for both sample position and volume gains
/// (`CDA_IPValL/H` in the original, here just "16.16").
pub const FIXED_SHIFT: u32 = 16;
pub const FIXED_ONE: u32 = 1 << FIXED_SHIFT;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    None,
    Forward,
    PingPong,
}

/// Borrowed view of one instrument's sample data, always widened to
/// `i16` by the loader regardless of the source bit depth.
#[derive(Debug, Clone, Copy)]
pub struct SampleData<'a> {
    pub data: &'a [i16],
    pub loop_start: u32,
    pub loop_len: u32,
    pub loop_mode: LoopMode,
}

/// One playing voice: the position/frequency/volume-ramp state the mixer
/// advances every callback (`stm[]` in the original).
#[derive(Debug, Clone, Copy)]
pub struct Voice {
    pub active: bool,
    pub pos: u32,
    pub delta: u32,
    pub reverse: bool,
    pub interpolate: bool,
    pub vol_l: u32,
    pub vol_r: u32,
    ramp_target_l: u32,
    ramp_target_r: u32,
    ramp_step_l: i32,
    ramp_step_r: i32,
    ramp_remaining: u32,
}

impl Default for Voice {
    fn default() -> Self {
        Self {
            active: false,
            pos: 0,
            delta: FIXED_ONE,
            reverse: false,
            interpolate: false,
            vol_l: 0,
            vol_r: 0,
            ramp_target_l: 0,
            ramp_target_r: 0,
            ramp_step_l: 0,
            ramp_step_r: 0,
            ramp_remaining: 0,
        }
    }
}

impl Voice {
    /// Start playing from the beginning of a sample at a given playback
    /// frequency ratio (output-samples-per-source-sample already folded
    /// into `delta`, i.e. `source_rate / output_rate` in 16.16).
    pub fn trigger(&mut self, delta: u32) {
        self.active = true;
        self.pos = 0;
        self.delta = delta;
        self.reverse = false;
        self.ramp_remaining = 0;
    }

    /// Set stereo gain, either immediately (`ramp_samples == 0`) or by
    /// ramping linearly over `ramp_samples` output samples — channel-change
    /// or toggle clicks are avoided by always routing through this rather
    /// than writing `vol_l`/`vol_r` directly.
    pub fn set_volume(&mut self, left: f32, right: f32, ramp_samples: u32) {
        let target_l = (left.clamp(0.0, 1.0) * FIXED_ONE as f32) as u32;
        let target_r = (right.clamp(0.0, 1.0) * FIXED_ONE as f32) as u32;
        if ramp_samples == 0 {
            self.vol_l = target_l;
            self.vol_r = target_r;
            self.ramp_remaining = 0;
            return;
        }
        self.ramp_target_l = target_l;
        self.ramp_target_r = target_r;
        self.ramp_step_l = (target_l as i64 - self.vol_l as i64).div_euclid(ramp_samples as i64) as i32;
        self.ramp_step_r = (target_r as i64 - self.vol_r as i64).div_euclid(ramp_samples as i64) as i32;
        self.ramp_remaining = ramp_samples;
    }

    fn advance_ramp(&mut self) {
        if self.ramp_remaining == 0 {
            return;
        }
        self.vol_l = (self.vol_l as i32 + self.ramp_step_l).max(0) as u32;
        self.vol_r = (self.vol_r as i32 + self.ramp_step_r).max(0) as u32;
        self.ramp_remaining -= 1;
        if self.ramp_remaining == 0 {
            self.vol_l = self.ramp_target_l;
            self.vol_r = self.ramp_target_r;
        }
    }
}

/// Constant-power stereo gains for a tracker pan value (0..=255, 128 =
/// center), looked up from [`PANNING_TAB`].
pub fn pan_to_gains(pan: u8) -> (f32, f32) {
    PANNING_TAB[(pan as usize * 256) / 255]
}

fn read_sample(sample: &SampleData, idx: usize) -> Option<i16> {
    sample.data.get(idx).copied()
}

/// Bit-exact-in-spirit linear interpolation between two samples at
/// fractional position `frac` (16.16).
fn lerp(s1: i16, s2: i16, frac: u32) -> i16 {
    let s1 = s1 as i64;
    let s2 = s2 as i64;
    (s1 + (((s2 - s1) * frac as i64) >> FIXED_SHIFT)) as i16
}

fn advance_position(voice: &mut Voice, sample: &SampleData) {
    voice.pos = if voice.reverse {
        voice.pos.wrapping_sub(voice.delta)
    } else {
        voice.pos.wrapping_add(voice.delta)
    };

    let loop_start = sample.loop_start << FIXED_SHIFT;
    let loop_end = (sample.loop_start + sample.loop_len) << FIXED_SHIFT;
    let sample_end = (sample.data.len() as u32) << FIXED_SHIFT;

    match sample.loop_mode {
        LoopMode::None => {
            if (!voice.reverse && voice.pos >= sample_end) || (voice.reverse && voice.pos == 0) {
                voice.active = false;
            }
        }
        LoopMode::Forward => {
            if !voice.reverse && voice.pos >= loop_end && sample.loop_len > 0 {
                voice.pos = loop_start + (voice.pos - loop_end);
            }
        }
        LoopMode::PingPong => {
            if sample.loop_len == 0 {
                return;
            }
            if !voice.reverse && voice.pos >= loop_end {
                voice.pos = loop_end - (voice.pos - loop_end);
                voice.reverse = true;
            } else if voice.reverse && voice.pos <= loop_start {
                voice.pos = loop_start + (loop_start - voice.pos);
                voice.reverse = false;
            }
        }
    }
}

/// Mix up to `n_samples` of `voice` playing `sample` into interleaved
/// stereo `out` (a 32-bit accumulator, not yet clamped), advancing the
/// voice's position and volume ramp. Returns whether the voice is still
/// active afterward.
pub fn mix_voice(voice: &mut Voice, sample: &SampleData, out: &mut [i32], n_samples: usize) -> bool {
    if !voice.active {
        return false;
    }
    let frames = n_samples.min(out.len() / 2);

    for i in 0..frames {
        if !voice.active {
            break;
        }
        if voice.vol_l == 0 && voice.vol_r == 0 && voice.ramp_remaining == 0 {
            advance_position(voice, sample);
            continue;
        }

        let idx = (voice.pos >> FIXED_SHIFT) as usize;
        let frac = voice.pos & (FIXED_ONE - 1);

        let Some(s) = read_sample(sample, idx) else {
            voice.active = false;
            break;
        };

        let out_sample = if voice.interpolate {
            let s2 = read_sample(sample, idx + 1).unwrap_or(s);
            lerp(s, s2, frac)
        } else {
            s
        };

        out[i * 2] += ((out_sample as i64 * voice.vol_l as i64) >> FIXED_SHIFT) as i32;
        out[i * 2 + 1] += ((out_sample as i64 * voice.vol_r as i64) >> FIXED_SHIFT) as i32;

        voice.advance_ramp();
        advance_position(voice, sample);
    }

    voice.active
}

/// Owns every mixer voice and the master-volume scalar; `render` is what
/// the audio callback calls once per chunk.
pub struct Mixer {
    pub voices: Vec<Voice>,
    pub master_volume: f32,
}

impl Mixer {
    pub fn new(voice_count: usize) -> Self {
        Self {
            voices: vec![Voice::default(); voice_count],
            master_volume: 1.0,
        }
    }

    /// Render `n_samples` of every active voice against its assigned
    /// sample (by index, `None` for an idle voice slot) into `out`
    /// (interleaved i16 stereo, length `>= n_samples * 2`).
    pub fn render(&mut self, samples: &[Option<SampleData>], n_samples: usize, out: &mut [i16]) {
        let mut acc = vec![0i32; n_samples * 2];
        for (voice, sample) in self.voices.iter_mut().zip(samples.iter()) {
            if let Some(sample) = sample {
                mix_voice(voice, sample, &mut acc, n_samples);
            }
        }
        mixdown(&acc, self.master_volume, out);
    }
}

/// Final output stage: master-scale the accumulator and clamp to 16-bit.
fn mixdown(acc: &[i32], master_volume: f32, out: &mut [i16]) {
    for (a, o) in acc.iter().zip(out.iter_mut()) {
        let scaled = (*a as f32 * master_volume) as i32;
        *o = scaled.clamp(i16::MIN as i32, i16::MAX as i32) as i16;
    }
}

/// Convert an already-mixed accumulator straight to float `[-1, 1]`,
/// for backends that want floating output instead of clamped 16-bit.
pub fn mixdown_to_f32(acc: &[i32], out: &mut [f32]) {
    for (a, o) in acc.iter().zip(out.iter_mut()) {
        *o = (*a as f32 / 32768.0).clamp(-1.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_sample() -> Vec<i16> {
        (0..1000).map(|i| (i * 10) as i16).collect()
    }

    #[test]
    fn silent_voice_fast_forwards_without_reading_past_end() {
        let data = ramp_sample();
        let sample = SampleData {
            data: &data,
            loop_start: 0,
            loop_len: 0,
            loop_mode: LoopMode::None,
        };
        let mut voice = Voice::default();
        voice.trigger(FIXED_ONE);
        voice.set_volume(0.0, 0.0, 0);

        let mut out = vec![0i32; 2000];
        let active = mix_voice(&mut voice, &sample, &mut out, 1000);
        assert!(!active);
        assert!(out.iter().all(|&s| s == 0));
    }

    #[test]
    fn forward_loop_wraps_position() {
        let data = ramp_sample();
        let sample = SampleData {
            data: &data,
            loop_start: 100,
            loop_len: 100,
            loop_mode: LoopMode::Forward,
        };
        let mut voice = Voice::default();
        voice.trigger(FIXED_ONE);
        voice.set_volume(1.0, 1.0, 0);

        let mut out = vec![0i32; 2 * 400];
        let active = mix_voice(&mut voice, &sample, &mut out, 400);
        assert!(active, "looping voice never goes inactive");
    }

    #[test]
    fn non_looping_voice_goes_silent_at_end() {
        let data: Vec<i16> = vec![1, 2, 3, 4];
        let sample = SampleData {
            data: &data,
            loop_start: 0,
            loop_len: 0,
            loop_mode: LoopMode::None,
        };
        let mut voice = Voice::default();
        voice.trigger(FIXED_ONE);
        voice.set_volume(1.0, 1.0, 0);

        let mut out = vec![0i32; 2 * 10];
        let active = mix_voice(&mut voice, &sample, &mut out, 10);
        assert!(!active);
    }

    #[test]
    fn volume_ramp_reaches_target_after_n_samples() {
        let mut voice = Voice::default();
        voice.set_volume(1.0, 1.0, 4);
        for _ in 0..4 {
            voice.advance_ramp();
        }
        assert_eq!(voice.vol_l, FIXED_ONE);
        assert_eq!(voice.vol_r, FIXED_ONE);
    }

    #[test]
    fn pan_extremes_favor_corresponding_channel() {
        let (l, r) = pan_to_gains(0);
        assert!(l > r);
        let (l, r) = pan_to_gains(255);
        assert!(r > l);
    }
}
