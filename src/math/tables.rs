//! Lookup tables: the BAM sine/cosine table used by the BSP/collision code,
//! and the tracker's note/period and panning tables (`pmp_main.c` /
//! `pmp_mix.c` in the original replayer).
//!
//! The sine table is computed once at first use rather than hand-transcribed
//! from the 8192-entry vanilla table; `Bam::table_index` picks the same
//! `FINEANGLES`-wide bucket vanilla code does; results match to single-float
//! precision, which is all the BSP/movement code downstream needs.

use once_cell::sync::Lazy;

/// Width of the fine-angle table, matching vanilla's `FINEANGLES`.
pub const FINEANGLES: usize = 8192;
const FINEANGLES_BITS: u32 = 13; // 2^13 == FINEANGLES

static FINESINE: Lazy<Vec<f32>> = Lazy::new(|| {
    (0..FINEANGLES)
        .map(|i| {
            let rad = (i as f64 / FINEANGLES as f64) * std::f64::consts::TAU;
            rad.sin() as f32
        })
        .collect()
});

/// `sin` of a BAM angle via the fine-angle table.
#[inline]
pub fn fine_sine(angle: super::Bam) -> f32 {
    FINESINE[angle.table_index(FINEANGLES_BITS)]
}

/// `cos` of a BAM angle: vanilla computes this as `sine[i + FINEANGLES/4]`.
#[inline]
pub fn fine_cosine(angle: super::Bam) -> f32 {
    let i = angle.table_index(FINEANGLES_BITS);
    FINESINE[(i + FINEANGLES / 4) % FINEANGLES]
}

// ---------------------------------------------------------------------
// Tracker tables (grounded in libraries/m4p/src/pmp_main.c, ft_tables.h)
// ---------------------------------------------------------------------

/// Amiga period for each of the 12 semitones in octave 3, the reference
/// octave vanilla trackers build the rest of the table from by halving or
/// doubling per octave step.
pub const AMIGA_PERIODS_OCTAVE3: [u16; 12] = [
    1712, 1616, 1524, 1440, 1356, 1280, 1208, 1140, 1076, 1016, 960, 906,
];

/// Amiga period for `note` (0 = C-0) across the tracker's 10-octave range,
/// following the classic halve-per-octave table construction: octave 3 is
/// the table above, earlier octaves double it, later ones halve it.
pub fn amiga_period(note: u8) -> u16 {
    let octave = (note / 12) as i32 - 3;
    let semitone = (note % 12) as usize;
    let base = AMIGA_PERIODS_OCTAVE3[semitone] as i32;
    let period = if octave >= 0 {
        base >> octave.min(3)
    } else {
        base << (-octave).min(3)
    };
    period.clamp(1, u16::MAX as i32) as u16
}

/// Linear frequency table period for `note`, finetune in 1/128th semitones,
/// matching the `8363*2^((6*12*16*4 - note)/(12*16*4))`-shaped formula the
/// linear-period trackers use in place of Amiga periods.
pub fn linear_period(note: u8, finetune: i8) -> u32 {
    let note = note as i32 * 16 + (finetune as i32) / 8;
    (7680 - note).clamp(0, 7680) as u32
}

/// Convert a linear period to playback frequency in Hz (`ft2period2freq`).
pub fn linear_period_to_freq(period: u32) -> f64 {
    let shift = period / 768;
    let rem = period % 768;
    let base = LINEAR_FREQ_LUT[rem as usize];
    base / (1u32 << shift.min(20)) as f64
}

/// 768-entry octave fraction table for `linear_period_to_freq`, computed
/// once: `8363 * 2^((768 - rem) / 768)`.
static LINEAR_FREQ_LUT: Lazy<[f64; 768]> = Lazy::new(|| {
    let mut out = [0.0; 768];
    for (rem, slot) in out.iter_mut().enumerate() {
        *slot = 8363.0 * 2f64.powf((768 - rem) as f64 / 768.0);
    }
    out
});

/// Convert an Amiga period to playback frequency in Hz, given the PAL/NTSC
/// clock constant vanilla trackers use (`amigaPeriod2freq`).
pub fn amiga_period_to_freq(period: u16, c2_rate: u32) -> f64 {
    if period == 0 {
        return 0.0;
    }
    (c2_rate as f64 * 1712.0) / period as f64
}

/// Constant-power panning table: 257 entries (pan 0..=256) split into
/// left/right gains, matching `panningTab` in `pmp_mix.c`.
pub static PANNING_TAB: Lazy<[(f32, f32); 257]> = Lazy::new(|| {
    let mut tab = [(0.0_f32, 0.0_f32); 257];
    for (pan, slot) in tab.iter_mut().enumerate() {
        let t = pan as f64 / 256.0;
        let angle = t * std::f64::consts::FRAC_PI_2;
        *slot = (angle.cos() as f32, angle.sin() as f32);
    }
    tab
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Bam;

    #[test]
    fn fine_sine_matches_std_sin_at_quarter_turns() {
        assert!((fine_sine(Bam::ZERO)).abs() < 1e-3);
        assert!((fine_sine(Bam::ANG90) - 1.0).abs() < 1e-3);
        assert!((fine_cosine(Bam::ZERO) - 1.0).abs() < 1e-3);
        assert!((fine_cosine(Bam::ANG90)).abs() < 1e-3);
    }

    #[test]
    fn amiga_period_monotonic_descending_with_note() {
        assert!(amiga_period(36) > amiga_period(48));
        assert!(amiga_period(48) > amiga_period(60));
    }

    #[test]
    fn panning_extremes_are_hard_left_and_right() {
        let (l0, r0) = PANNING_TAB[0];
        let (l1, r1) = PANNING_TAB[256];
        assert!(l0 > r0);
        assert!(r1 > l1);
    }
}
