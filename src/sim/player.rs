//! Player state: the bits of a play session that live above any single
//! mobj body (ammo, keys, powerups, the weapon the body is currently
//! wielding) plus the per-tic application of a [`Ticcmd`] to that body.

use hecs::Entity;

use super::ticcmd::{ButtonFlags, Ticcmd};
use super::weapon::{WeaponRig, WeaponState};
use crate::math::bam::Bam;

pub const NUM_CARDS: u32 = 6;
pub const NUM_POWERS: usize = 6;

#[derive(Debug, Clone, Copy, Default)]
pub struct Stock {
    pub count: i32,
    pub maximum: i32,
}

impl Stock {
    pub fn add(&mut self, amount: i32) {
        self.count = (self.count + amount).min(self.maximum);
    }

    pub fn spend(&mut self, amount: i32) -> bool {
        if self.count < amount {
            return false;
        }
        self.count -= amount;
        true
    }
}

bitflags::bitflags! {
    #[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Cards: u32 {
        const BLUE_KEY    = 0x01;
        const YELLOW_KEY  = 0x02;
        const RED_KEY     = 0x04;
        const BLUE_SKULL  = 0x08;
        const YELLOW_SKULL = 0x10;
        const RED_SKULL   = 0x20;
    }
}

/// A session-lifetime player: the mobj it currently animates is looked up
/// by `body` each tic rather than owned directly, since the body can die
/// and respawn without the player itself going away.
pub struct Player {
    pub body: Option<Entity>,
    pub cmd: Ticcmd,

    pub view_height: f32,
    pub view_bob: f32,
    pub angle: Bam,

    pub health: i32,
    pub armor: i32,

    pub ammo: [Stock; 4],
    pub weapons: [bool; 9],
    pub ready_weapon: WeaponState,
    pub pending_weapon: WeaponState,
    pub weapon_rig: WeaponRig,

    pub cards: Cards,
    pub powers: [i32; NUM_POWERS],

    /// Nonzero while the damage-flash overlay should tint the HUD, decaying
    /// toward zero every tic it isn't refreshed.
    pub damage_count: i32,
    pub bonus_count: i32,

    pub attack_down: bool,
    pub use_down: bool,

    pub kill_count: i32,
    pub item_count: i32,
    pub secret_count: i32,
}

impl Player {
    pub fn new() -> Self {
        Self {
            body: None,
            cmd: Ticcmd::default(),
            view_height: 41.0,
            view_bob: 0.0,
            angle: Bam::ZERO,
            health: 100,
            armor: 0,
            ammo: [Stock::default(); 4],
            weapons: [false; 9],
            ready_weapon: WeaponState::None,
            pending_weapon: WeaponState::NoChange,
            weapon_rig: WeaponRig::default(),
            cards: Cards::empty(),
            powers: [0; NUM_POWERS],
            damage_count: 0,
            bonus_count: 0,
            attack_down: false,
            use_down: false,
            kill_count: 0,
            item_count: 0,
            secret_count: 0,
        }
    }

    /// `P_PlayerThink`'s per-tic bookkeeping that doesn't touch the body
    /// mobj directly: turning, latch tracking, counter decay.
    pub fn think(&mut self) {
        let turn = Bam::from_radians(
            self.cmd.angle_turn as f32 / 32768.0 * std::f32::consts::PI,
        );
        self.angle = self.angle + turn;

        self.attack_down = self.cmd.buttons.contains(ButtonFlags::ATTACK);
        self.use_down = self.cmd.buttons.contains(ButtonFlags::USE);

        if self.damage_count > 0 {
            self.damage_count -= 1;
        }
        if self.bonus_count > 0 {
            self.bonus_count -= 1;
        }
        for power in &mut self.powers {
            if *power > 0 {
                *power -= 1;
            }
        }
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_respects_maximum_and_spend() {
        let mut s = Stock {
            count: 0,
            maximum: 50,
        };
        s.add(200);
        assert_eq!(s.count, 50);
        assert!(s.spend(20));
        assert_eq!(s.count, 30);
        assert!(!s.spend(100));
    }

    #[test]
    fn think_decays_counters() {
        let mut p = Player::new();
        p.damage_count = 2;
        p.bonus_count = 1;
        p.powers[0] = 1;
        p.think();
        assert_eq!(p.damage_count, 1);
        assert_eq!(p.bonus_count, 0);
        assert_eq!(p.powers[0], 0);
    }
}
