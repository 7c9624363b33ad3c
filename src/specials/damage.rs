//! Sector floor-damage table: `P_PlayerInSpecialSector`'s damage switch in
//! `p_spec.c`, exposed as a lookup instead of a hardcoded branch so the
//! per-mobj cooldown bookkeeping (which needs the ECS world) can live in
//! `sim` without this module depending on `hecs`.

/// Tics between damage applications while standing in a damaging sector
/// (vanilla gates non-fatal damage on `leveltime & 0x1f`, i.e. every 32
/// tics).
pub const DAMAGE_COOLDOWN_TICS: i32 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectorDamage {
    pub amount: i32,
    /// True for the "crush to instant death" end-of-level sector special;
    /// vanilla clamps health to 0 rather than merely subtracting.
    pub instant_death: bool,
}

/// Damage dealt by standing in a sector whose `special` field is `special`,
/// or `None` if that special does no floor damage.
pub fn damage_for_special(special: i16) -> Option<SectorDamage> {
    match special {
        5 => Some(SectorDamage {
            amount: 10,
            instant_death: false,
        }),
        7 => Some(SectorDamage {
            amount: 5,
            instant_death: false,
        }),
        4 | 16 => Some(SectorDamage {
            amount: 20,
            instant_death: false,
        }),
        11 => Some(SectorDamage {
            amount: 20,
            instant_death: true,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmarked_sector_does_no_damage() {
        assert!(damage_for_special(0).is_none());
    }

    #[test]
    fn nukage_deals_five_per_application() {
        assert_eq!(damage_for_special(7).unwrap().amount, 5);
    }

    #[test]
    fn end_level_sector_is_instant_death() {
        assert!(damage_for_special(11).unwrap().instant_death);
    }
}
