//! Packed per-player input record and the wire shape it travels in.
//!
//! `Ticcmd` is what `BuildTiccmds` produces from live input and what
//! `GrabTiccmds` copies into each player's live command.
//! The `ButtonFlags` bit layout matches the loopback wire protocol in
//! a fixed loopback wire protocol so `Ticcmd::to_wire`/`from_wire` round-trip without field
//! renumbering.

use bitflags::bitflags;

bitflags! {
    #[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ButtonFlags: u8 {
        const ATTACK        = 0x01;
        const USE           = 0x02;
        const CHANGE_WEAPON = 0x04;
        // bits 3..6 (0x08,0x10,0x20,0x40) are the pending weapon slot,
        // valid only when CHANGE_WEAPON is set.
        const WEAPON_MASK   = 0x78;
        const SPECIAL       = 0x80;
    }
}

bitflags! {
    #[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ExtButtonFlags: u16 {
        const CENTER           = 0x0001;
        const ATTACK2          = 0x0002;
        const ZOOM             = 0x0004;
        const RELOAD           = 0x0008;
        const USER_ACTION1     = 0x0010;
        const USER_ACTION2     = 0x0020;
        const INVENTORY_PREV   = 0x0040;
        const INVENTORY_USE    = 0x0080;
        const INVENTORY_NEXT   = 0x0100;
        const ATTACK3          = 0x0200;
        const ATTACK4          = 0x0400;
    }
}

/// One player's intent for one tic. Values are small deltas, not absolute
/// state, so replay is just "feed the same sequence of `Ticcmd`s again".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Ticcmd {
    pub angle_turn: i16,
    pub mlook_turn: i16,
    pub player_idx: i16,
    pub forward: i8,
    pub side: i8,
    pub up: i8,
    pub buttons: ButtonFlags,
    pub ext_buttons: ExtButtonFlags,
    pub chat_char: u8,
}

impl Ticcmd {
    /// Weapon slot encoded in `buttons` bits 3..6, valid only alongside
    /// `ButtonFlags::CHANGE_WEAPON`.
    #[inline]
    pub fn weapon_slot(&self) -> u8 {
        (self.buttons & ButtonFlags::WEAPON_MASK).bits() >> 3
    }

    pub fn set_weapon_slot(&mut self, slot: u8) {
        let bits = (self.buttons.bits() & !ButtonFlags::WEAPON_MASK.bits())
            | ((slot << 3) & ButtonFlags::WEAPON_MASK.bits());
        self.buttons = ButtonFlags::from_bits_truncate(bits);
    }

    /// Serialize to the loopback wire layout (16 bytes,
    /// little-endian, two reserved `u8`s after `chat_char`).
    pub fn to_wire(&self) -> [u8; 16] {
        let mut out = [0u8; 16];
        out[0..2].copy_from_slice(&self.angle_turn.to_le_bytes());
        out[2..4].copy_from_slice(&self.mlook_turn.to_le_bytes());
        // out[4..6] reserved
        out[6..8].copy_from_slice(&self.player_idx.to_le_bytes());
        out[8] = self.forward as u8;
        out[9] = self.side as u8;
        out[10] = self.up as u8;
        out[11] = self.buttons.bits();
        out[12..14].copy_from_slice(&self.ext_buttons.bits().to_le_bytes());
        out[14] = self.chat_char;
        // out[15] reserved
        out
    }

    pub fn from_wire(bytes: &[u8; 16]) -> Self {
        Self {
            angle_turn: i16::from_le_bytes([bytes[0], bytes[1]]),
            mlook_turn: i16::from_le_bytes([bytes[2], bytes[3]]),
            player_idx: i16::from_le_bytes([bytes[6], bytes[7]]),
            forward: bytes[8] as i8,
            side: bytes[9] as i8,
            up: bytes[10] as i8,
            buttons: ButtonFlags::from_bits_truncate(bytes[11]),
            ext_buttons: ExtButtonFlags::from_bits_truncate(u16::from_le_bytes([
                bytes[12], bytes[13],
            ])),
            chat_char: bytes[14],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_round_trip() {
        let mut cmd = Ticcmd {
            angle_turn: -1234,
            mlook_turn: 77,
            player_idx: 2,
            forward: -50,
            side: 25,
            up: 0,
            buttons: ButtonFlags::ATTACK | ButtonFlags::CHANGE_WEAPON,
            ext_buttons: ExtButtonFlags::ZOOM | ExtButtonFlags::INVENTORY_NEXT,
            chat_char: b'A',
        };
        cmd.set_weapon_slot(5);
        let wire = cmd.to_wire();
        let back = Ticcmd::from_wire(&wire);
        assert_eq!(cmd, back);
        assert_eq!(back.weapon_slot(), 5);
    }
}
