//! XM/MOD file loaders: turn the on-disk XM/MOD byte layouts into a
//! [`SongData`] the scheduler/effect interpreter can play. Grounded in
//! `original_source/libraries/m4p/src/pmp_load.c`'s `PMPLoadExternalSample`
//! and XM/MOD header readers for field order and the delta-decoding
//! convention; byte-level reading follows the same `byteorder` idiom the
//! WAD loader ([`crate::wad::raw`]) already uses rather than hand-rolling a
//! second cursor abstraction.

use std::io::{Cursor, Read};

use byteorder::{BigEndian as BE, LittleEndian as LE, ReadBytesExt};
use thiserror::Error;

use super::period::amiga_period_to_note;
use super::song::{
    Cell, Envelope, FrequencyTable, Instrument, Pattern, SampleInfo, SongData, VibratoWaveform,
};

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("not an XM/MOD file (bad signature)")]
    BadSignature,
    #[error("XM version {0:#06x} out of supported range [0x0102, 0x0104]")]
    VersionOutOfRange(u16),
    #[error("channel count {0} invalid (must be even and in [2, 32])")]
    BadChannelCount(usize),
    #[error("pattern count {0} exceeds 256")]
    TooManyPatterns(usize),
    #[error("instrument count {0} exceeds 128")]
    TooManyInstruments(usize),
    #[error("truncated module data")]
    Truncated,
}

const XM_SIGNATURE: &[u8; 17] = b"Extended Module: ";

/// Dispatch on file signature: XM carries its own 17-byte magic; anything
/// else is tried as a MOD (the 4-byte channel-count tag at offset 1080
/// tells `load_mod` what it's looking at, including the 15-sample legacy
/// format with no tag at all).
pub fn load_module(bytes: &[u8]) -> Result<SongData, TrackerError> {
    if bytes.len() >= 17 && &bytes[0..17] == XM_SIGNATURE {
        load_xm(bytes)
    } else {
        load_mod(bytes)
    }
}

/* ===================================================================== */
/*  XM                                                                    */
/* ===================================================================== */

pub fn load_xm(bytes: &[u8]) -> Result<SongData, TrackerError> {
    if bytes.len() < 17 || &bytes[0..17] != XM_SIGNATURE {
        return Err(TrackerError::BadSignature);
    }
    let mut r = Cursor::new(bytes);
    r.set_position(17);

    let mut name_buf = [0u8; 20];
    r.read_exact(&mut name_buf)?;
    let name = cstr(&name_buf);

    let mut marker = [0u8; 1];
    r.read_exact(&mut marker)?; // 0x1A marker byte

    let mut tracker_name = [0u8; 20];
    r.read_exact(&mut tracker_name)?;

    let version = r.read_u16::<LE>()?;
    if !(0x0102..=0x0104).contains(&version) {
        return Err(TrackerError::VersionOutOfRange(version));
    }

    let header_size = r.read_u32::<LE>()?;
    let header_start = r.position();

    let song_length = r.read_u16::<LE>()? as usize;
    let restart_position = r.read_u16::<LE>()?;
    let channels = r.read_u16::<LE>()? as usize;
    if channels == 0 || channels > 32 || channels % 2 != 0 {
        return Err(TrackerError::BadChannelCount(channels));
    }
    let num_patterns = r.read_u16::<LE>()? as usize;
    if num_patterns > 256 {
        return Err(TrackerError::TooManyPatterns(num_patterns));
    }
    let num_instruments = r.read_u16::<LE>()? as usize;
    if num_instruments > 128 {
        return Err(TrackerError::TooManyInstruments(num_instruments));
    }
    let flags = r.read_u16::<LE>()?;
    let frequency_table = if flags & 1 != 0 {
        FrequencyTable::Linear
    } else {
        FrequencyTable::Amiga
    };
    let default_tempo = r.read_u16::<LE>()?;
    let default_bpm = r.read_u16::<LE>()?;

    let mut order_raw = [0u8; 256];
    r.read_exact(&mut order_raw)?;
    let order = order_raw[..song_length.min(256)].to_vec();

    // The header declares its own size; anything between the order table
    // and `header_start + header_size` is padding/extension we don't
    // understand. Skip to it rather than trusting `20 + 256` by hand.
    r.set_position(header_start + header_size as u64);

    let mut patterns = Vec::with_capacity(num_patterns);
    for _ in 0..num_patterns {
        patterns.push(read_xm_pattern(&mut r, channels)?);
    }

    let mut instruments = Vec::with_capacity(num_instruments);
    for _ in 0..num_instruments {
        instruments.push(read_xm_instrument(&mut r)?);
    }

    Ok(SongData {
        name,
        channels,
        initial_speed: default_tempo,
        initial_tempo: default_bpm,
        restart_position,
        frequency_table,
        order,
        patterns,
        instruments,
        global_volume: 64,
    })
}

fn read_xm_pattern(r: &mut Cursor<&[u8]>, channels: usize) -> Result<Pattern, TrackerError> {
    let header_len = r.read_u32::<LE>()?;
    let header_start = r.position();
    let _packing_type = r.read_u8()?;
    let rows = r.read_u16::<LE>()? as usize;
    let packed_size = r.read_u16::<LE>()? as usize;
    r.set_position(header_start + header_len as u64);

    let mut packed = vec![0u8; packed_size];
    r.read_exact(&mut packed)?;

    let mut cells = vec![Cell::default(); rows * channels];
    let mut cursor = packed.as_slice();
    for cell in cells.iter_mut() {
        let Some(&first) = cursor.first() else {
            break;
        };
        if first & 0x80 != 0 {
            cursor = &cursor[1..];
            if first & 0x01 != 0 {
                cell.note = take_u8(&mut cursor)?;
            }
            if first & 0x02 != 0 {
                cell.instrument = take_u8(&mut cursor)?;
            }
            if first & 0x04 != 0 {
                cell.volume_column = take_u8(&mut cursor)?;
            }
            if first & 0x08 != 0 {
                cell.effect = take_u8(&mut cursor)?;
            }
            if first & 0x10 != 0 {
                cell.param = take_u8(&mut cursor)?;
            }
        } else {
            cell.note = first;
            cursor = &cursor[1..];
            cell.instrument = take_u8(&mut cursor)?;
            cell.volume_column = take_u8(&mut cursor)?;
            cell.effect = take_u8(&mut cursor)?;
            cell.param = take_u8(&mut cursor)?;
        }
    }

    Ok(Pattern {
        rows,
        channels,
        cells,
    })
}

fn take_u8(cursor: &mut &[u8]) -> Result<u8, TrackerError> {
    let (&b, rest) = cursor.split_first().ok_or(TrackerError::Truncated)?;
    *cursor = rest;
    Ok(b)
}

fn read_xm_instrument(r: &mut Cursor<&[u8]>) -> Result<Instrument, TrackerError> {
    let header_start = r.position();
    let header_size = r.read_u32::<LE>()?;
    let mut name_buf = [0u8; 22];
    r.read_exact(&mut name_buf)?;
    let _itype = r.read_u8()?;
    let num_samples = r.read_u16::<LE>()? as usize;

    let mut sample_indices = [0u8; 96];
    let mut volume_envelope = Envelope::default();
    let mut panning_envelope = Envelope::default();
    let mut vibrato_waveform = VibratoWaveform::Sine;
    let mut vibrato_speed = 0u8;
    let mut vibrato_depth = 0u8;
    let mut vibrato_sweep = 0u16;
    let mut fadeout = 0u16;
    let mut sample_headers = Vec::new();

    if num_samples > 0 {
        let _sample_header_size = r.read_u32::<LE>()?;
        r.read_exact(&mut sample_indices)?;

        let mut vol_points_raw = [(0u16, 0i16); 12];
        for slot in &mut vol_points_raw {
            slot.0 = r.read_u16::<LE>()?;
            slot.1 = r.read_i16::<LE>()?;
        }
        let mut pan_points_raw = [(0u16, 0i16); 12];
        for slot in &mut pan_points_raw {
            slot.0 = r.read_u16::<LE>()?;
            slot.1 = r.read_i16::<LE>()?;
        }

        let num_vol_points = r.read_u8()? as usize;
        let num_pan_points = r.read_u8()? as usize;
        let vol_sustain = r.read_u8()? as usize;
        let vol_loop_start = r.read_u8()? as usize;
        let vol_loop_end = r.read_u8()? as usize;
        let pan_sustain = r.read_u8()? as usize;
        let pan_loop_start = r.read_u8()? as usize;
        let pan_loop_end = r.read_u8()? as usize;
        let vol_type = r.read_u8()?;
        let pan_type = r.read_u8()?;
        vibrato_waveform = VibratoWaveform::from_bits(r.read_u8()?);
        vibrato_speed = r.read_u8()?;
        vibrato_depth = r.read_u8()?;
        vibrato_sweep = r.read_u8()? as u16;
        fadeout = r.read_u16::<LE>()?;
        let mut reserved = [0u8; 2 + 20];
        r.read_exact(&mut reserved)?;

        volume_envelope = build_envelope(&vol_points_raw, num_vol_points, vol_type, vol_sustain, vol_loop_start, vol_loop_end);
        // The panning envelope's enable test reads the *volume* envelope's
        // reads the *volume* envelope's sustain bit, preserved verbatim.
        panning_envelope = build_envelope(&pan_points_raw, num_pan_points, pan_type, pan_sustain, pan_loop_start, pan_loop_end);
        panning_envelope.enabled = vol_type & 0x02 != 0 && pan_type & 0x01 != 0;

        r.set_position(header_start + header_size as u64);

        for _ in 0..num_samples {
            sample_headers.push(read_xm_sample_header(r)?);
        }
    } else {
        r.set_position(header_start + header_size as u64);
    }

    let mut samples = Vec::with_capacity(sample_headers.len());
    for header in sample_headers {
        samples.push(read_xm_sample_data(r, header)?);
    }

    let _ = name_buf;
    Ok(Instrument {
        sample_indices,
        volume_envelope,
        panning_envelope,
        vibrato_waveform,
        vibrato_speed,
        vibrato_depth,
        vibrato_sweep,
        fadeout,
        samples,
    })
}

fn build_envelope(
    points_raw: &[(u16, i16); 12],
    num_points: usize,
    flags: u8,
    sustain: usize,
    loop_start: usize,
    loop_end: usize,
) -> Envelope {
    let n = num_points.min(12);
    Envelope {
        points: points_raw[..n].to_vec(),
        sustain_point: (flags & 0x02 != 0).then_some(sustain),
        loop_start: (flags & 0x04 != 0).then_some(loop_start),
        loop_end: (flags & 0x04 != 0).then_some(loop_end),
        enabled: flags & 0x01 != 0,
    }
}

/// Fixed-layout header fields read before the delta-encoded PCM block, per
/// sample, matching XM's "sample header, then later sample data in the
/// same order" layout.
struct XmSampleHeader {
    length: u32,
    loop_start: u32,
    loop_len: u32,
    volume: u8,
    finetune: i8,
    sixteen_bit: bool,
    looping: bool,
    ping_pong: bool,
    panning: u8,
    relative_note: i8,
}

fn read_xm_sample_header(r: &mut Cursor<&[u8]>) -> Result<XmSampleHeader, TrackerError> {
    let length = r.read_u32::<LE>()?;
    let loop_start = r.read_u32::<LE>()?;
    let loop_len = r.read_u32::<LE>()?;
    let volume = r.read_u8()?;
    let finetune = r.read_i8()?;
    let sample_type = r.read_u8()?;
    let panning = r.read_u8()?;
    let relative_note = r.read_i8()?;
    let _reserved = r.read_u8()?;
    let mut name = [0u8; 22];
    r.read_exact(&mut name)?;

    Ok(XmSampleHeader {
        length,
        loop_start,
        loop_len,
        volume,
        finetune,
        sixteen_bit: sample_type & 0x10 != 0,
        looping: sample_type & 0x03 != 0,
        ping_pong: sample_type & 0x03 == 2,
        panning,
        relative_note,
    })
}

fn read_xm_sample_data(r: &mut Cursor<&[u8]>, header: XmSampleHeader) -> Result<SampleInfo, TrackerError> {
    let (pcm, loop_start, loop_len) = if header.sixteen_bit {
        let n = header.length as usize / 2;
        let mut raw = vec![0i16; n];
        let mut prev = 0i16;
        for s in raw.iter_mut() {
            let delta = r.read_i16::<LE>()?;
            prev = prev.wrapping_add(delta);
            *s = prev;
        }
        (raw, header.loop_start / 2, header.loop_len / 2)
    } else {
        let n = header.length as usize;
        let mut raw = vec![0i16; n];
        let mut prev = 0i8;
        for s in raw.iter_mut() {
            let delta = r.read_i8()?;
            prev = prev.wrapping_add(delta);
            *s = (prev as i16) << 8;
        }
        (raw, header.loop_start, header.loop_len)
    };

    Ok(SampleInfo {
        relative_note: header.relative_note,
        finetune: header.finetune,
        volume: header.volume,
        panning: header.panning,
        loop_start,
        loop_len,
        looping: header.looping,
        ping_pong: header.ping_pong,
        pcm,
    })
}

/* ===================================================================== */
/*  MOD                                                                   */
/* ===================================================================== */

/// `(tag, channels, num_samples)` for every 4-byte MOD channel-count
/// signature; a missing/unrecognized tag at offset 1080 falls back to the
/// classic 15-sample, 4-channel format with no tag at all.
fn mod_signature(tag: &[u8; 4]) -> Option<(usize, usize)> {
    match tag {
        b"M.K." | b"M!K!" | b"FLT4" => Some((4, 31)),
        b"OCTA" => Some((8, 31)),
        _ => None,
    }
}

pub fn load_mod(bytes: &[u8]) -> Result<SongData, TrackerError> {
    if bytes.len() < 1084 {
        return Err(TrackerError::BadSignature);
    }
    let mut tag = [0u8; 4];
    tag.copy_from_slice(&bytes[1080..1084]);

    let (channels, num_samples) = if let Some(v) = mod_signature(&tag) {
        v
    } else if tag[2..4] == *b"CH" && tag[0].is_ascii_digit() && tag[1].is_ascii_digit() {
        // "xxCH" (e.g. "16CH"): two ASCII digits give the channel count.
        let tens = (tag[0] - b'0') as usize;
        let ones = (tag[1] - b'0') as usize;
        (tens * 10 + ones, 31)
    } else if tag[1..4] == *b"CHN" && tag[0].is_ascii_digit() {
        // "xCHN" family ("6CHN", "8CHN"...): one digit, literal "CHN".
        ((tag[0] - b'0') as usize, 31)
    } else {
        (4, 15) // no recognized tag: classic 15-sample SoundTracker module
    };
    if channels == 0 || channels > 32 {
        return Err(TrackerError::BadChannelCount(channels));
    }

    let mut r = Cursor::new(bytes);
    let mut name_buf = [0u8; 20];
    r.read_exact(&mut name_buf)?;
    let name = cstr(&name_buf);

    struct ModSample {
        finetune: i8,
        volume: u8,
        loop_start: u32,
        loop_len: u32,
        length: u32,
    }
    let mut samples_meta = Vec::with_capacity(num_samples);
    for _ in 0..num_samples {
        let mut sname = [0u8; 22];
        r.read_exact(&mut sname)?;
        let length_words = r.read_u16::<BE>()? as u32;
        let finetune_nibble = r.read_u8()? & 0x0F;
        let finetune = signed_nibble(finetune_nibble);
        let volume = r.read_u8()?;
        let loop_start_words = r.read_u16::<BE>()? as u32;
        let loop_len_words = r.read_u16::<BE>()? as u32;
        samples_meta.push(ModSample {
            finetune,
            volume,
            loop_start: loop_start_words * 2,
            loop_len: loop_len_words * 2,
            length: length_words * 2,
        });
    }

    let song_length = r.read_u8()? as usize;
    let _restart_byte = r.read_u8()?;
    let mut order_raw = [0u8; 128];
    r.read_exact(&mut order_raw)?;
    let order = order_raw[..song_length.min(128)].to_vec();
    let num_patterns = order.iter().copied().max().map(|m| m as usize + 1).unwrap_or(0);
    if num_patterns > 256 {
        return Err(TrackerError::TooManyPatterns(num_patterns));
    }

    if num_samples == 31 {
        r.set_position(r.position() + 4); // skip the 4-byte tag already read above
    }

    let mut patterns = Vec::with_capacity(num_patterns);
    for _ in 0..num_patterns {
        patterns.push(read_mod_pattern(&mut r, channels)?);
    }

    let mut instruments = Vec::with_capacity(samples_meta.len());
    for meta in samples_meta {
        let mut raw = vec![0i8; meta.length as usize];
        if meta.length > 0 {
            r.read_exact(bytemuck_i8(&mut raw))?;
        }
        let pcm: Vec<i16> = raw.iter().map(|&b| (b as i16) << 8).collect();
        instruments.push(Instrument {
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
                finetune: meta.finetune,
                volume: meta.volume,
                panning: 128,
                loop_start: meta.loop_start,
                loop_len: meta.loop_len,
                looping: meta.loop_len > 2,
                ping_pong: false,
                pcm,
            }],
        });
    }

    Ok(SongData {
        name,
        channels,
        initial_speed: 6,
        initial_tempo: 125,
        restart_position: 0,
        frequency_table: FrequencyTable::Amiga,
        order,
        patterns,
        instruments,
        global_volume: 64,
    })
}

fn read_mod_pattern(r: &mut Cursor<&[u8]>, channels: usize) -> Result<Pattern, TrackerError> {
    const ROWS: usize = 64;
    let mut cells = vec![Cell::default(); ROWS * channels];
    for cell in cells.iter_mut() {
        let mut raw = [0u8; 4];
        r.read_exact(&mut raw)?;
        let period = (((raw[0] & 0x0F) as u16) << 8) | raw[1] as u16;
        let sample = (raw[0] & 0xF0) | (raw[2] >> 4);
        let effect = raw[2] & 0x0F;
        let param = raw[3];

        cell.note = amiga_period_to_note(period);
        cell.instrument = sample;
        cell.effect = effect;
        cell.param = param;
    }
    Ok(Pattern {
        rows: ROWS,
        channels,
        cells,
    })
}

fn signed_nibble(n: u8) -> i8 {
    // 0..=7 -> 0..=7, 8..=15 -> -8..=-1, then scaled up to match the wider
    // ±128-unit finetune range XM instruments use (one MOD finetune unit
    // == 16 of those units).
    let v = if n >= 8 { n as i32 - 16 } else { n as i32 };
    (v * 16) as i8
}

fn cstr(buf: &[u8]) -> String {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..end]).trim_end().to_string()
}

/// Reinterpret a `&mut [i8]` as `&mut [u8]` for `read_exact`; MOD sample
/// data is raw signed 8-bit PCM with no delta encoding, unlike XM.
fn bytemuck_i8(buf: &mut [i8]) -> &mut [u8] {
    // Safety: i8 and u8 have identical size/alignment; this is a same-size
    // reinterpretation of a slice we already own.
    unsafe { std::slice::from_raw_parts_mut(buf.as_mut_ptr() as *mut u8, buf.len()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_xm_bytes() -> Vec<u8> {
        let mut v = Vec::new();
        v.extend_from_slice(XM_SIGNATURE);
        v.extend_from_slice(&[0u8; 20]); // name
        v.push(0x1A);
        v.extend_from_slice(&[0u8; 20]); // tracker name
        v.extend_from_slice(&0x0104u16.to_le_bytes()); // version

        let mut header = Vec::new();
        header.extend_from_slice(&1u16.to_le_bytes()); // song length
        header.extend_from_slice(&0u16.to_le_bytes()); // restart pos
        header.extend_from_slice(&2u16.to_le_bytes()); // channels
        header.extend_from_slice(&0u16.to_le_bytes()); // num patterns
        header.extend_from_slice(&0u16.to_le_bytes()); // num instruments
        header.extend_from_slice(&0u16.to_le_bytes()); // flags (amiga)
        header.extend_from_slice(&6u16.to_le_bytes()); // default tempo
        header.extend_from_slice(&125u16.to_le_bytes()); // default bpm
        header.extend_from_slice(&[0u8; 256]); // order table

        v.extend_from_slice(&(header.len() as u32).to_le_bytes());
        v.extend_from_slice(&header);
        v
    }

    #[test]
    fn loads_minimal_xm_header() {
        let bytes = minimal_xm_bytes();
        let song = load_xm(&bytes).unwrap();
        assert_eq!(song.channels, 2);
        assert_eq!(song.initial_speed, 6);
        assert_eq!(song.initial_tempo, 125);
        assert_eq!(song.frequency_table, FrequencyTable::Amiga);
        assert!(song.patterns.is_empty());
    }

    #[test]
    fn rejects_bad_xm_version() {
        let mut bytes = minimal_xm_bytes();
        bytes[37..39].copy_from_slice(&0x0200u16.to_le_bytes());
        assert!(matches!(load_xm(&bytes), Err(TrackerError::VersionOutOfRange(_))));
    }

    #[test]
    fn dispatch_picks_xm_by_signature() {
        let bytes = minimal_xm_bytes();
        assert!(load_module(&bytes).is_ok());
    }

    fn minimal_mod_bytes() -> Vec<u8> {
        let mut v = vec![0u8; 20]; // song name
        for _ in 0..31 {
            v.extend_from_slice(&[0u8; 22]); // sample name
            v.extend_from_slice(&0u16.to_be_bytes()); // length
            v.push(0); // finetune
            v.push(64); // volume
            v.extend_from_slice(&0u16.to_be_bytes()); // loop start
            v.extend_from_slice(&0u16.to_be_bytes()); // loop len
        }
        v.push(1); // song length
        v.push(0x7F); // restart byte
        let mut order = [0u8; 128];
        order[0] = 0;
        v.extend_from_slice(&order);
        v.extend_from_slice(b"M.K.");
        // one pattern, 4 channels, 64 rows, 4 bytes/cell
        v.extend_from_slice(&vec![0u8; 64 * 4 * 4]);
        v
    }

    #[test]
    fn loads_minimal_mod_header() {
        let bytes = minimal_mod_bytes();
        let song = load_mod(&bytes).unwrap();
        assert_eq!(song.channels, 4);
        assert_eq!(song.patterns.len(), 1);
        assert_eq!(song.instruments.len(), 31);
    }

    #[test]
    fn dispatch_picks_mod_for_non_xm_signature() {
        let bytes = minimal_mod_bytes();
        let song = load_module(&bytes).unwrap();
        assert_eq!(song.channels, 4);
    }
}
