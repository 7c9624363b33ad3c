// AUTO-GENERATED - see tools/gen_mobjinfo

#[repr(usize)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum State {
    S_NULL = 0,
    S_PLAY = 1,
    S_PLAY_RUN1 = 2,
    S_PLAY_RUN2 = 3,
    S_PLAY_RUN3 = 4,
    S_PLAY_RUN4 = 5,
    S_PLAY_ATK1 = 6,
    S_PLAY_ATK2 = 7,
    S_PLAY_PAIN = 8,
    S_PLAY_PAIN2 = 9,
    S_PLAY_DIE1 = 10,
    S_PLAY_DIE2 = 11,
    S_PLAY_DIE3 = 12,
    S_PLAY_DIE4 = 13,
    S_PLAY_DIE5 = 14,
    S_PLAY_DIE6 = 15,
    S_PLAY_DIE7 = 16,
    S_PLAY_XDIE1 = 17,
    S_PLAY_XDIE2 = 18,
    S_PLAY_XDIE3 = 19,
    S_PLAY_XDIE4 = 20,
    S_PLAY_XDIE5 = 21,
    S_PLAY_XDIE6 = 22,
    S_PLAY_XDIE7 = 23,
    S_PLAY_XDIE8 = 24,
    S_PLAY_XDIE9 = 25,
    S_POSS_STND = 26,
    S_POSS_STND2 = 27,
    S_POSS_RUN1 = 28,
    S_POSS_RUN2 = 29,
    S_POSS_RUN3 = 30,
    S_POSS_RUN4 = 31,
    S_POSS_RUN5 = 32,
    S_POSS_RUN6 = 33,
    S_POSS_RUN7 = 34,
    S_POSS_RUN8 = 35,
    S_POSS_ATK1 = 36,
    S_POSS_ATK2 = 37,
    S_POSS_ATK3 = 38,
    S_POSS_PAIN = 39,
    S_POSS_PAIN2 = 40,
    S_POSS_DIE1 = 41,
    S_POSS_DIE2 = 42,
    S_POSS_DIE3 = 43,
    S_POSS_DIE4 = 44,
    S_POSS_DIE5 = 45,
    S_POSS_XDIE1 = 46,
    S_POSS_XDIE2 = 47,
    S_POSS_XDIE3 = 48,
    S_POSS_XDIE4 = 49,
    S_POSS_XDIE5 = 50,
    S_POSS_XDIE6 = 51,
    S_POSS_XDIE7 = 52,
    S_POSS_XDIE8 = 53,
    S_POSS_XDIE9 = 54,
    S_POSS_RAISE1 = 55,
    S_POSS_RAISE2 = 56,
    S_POSS_RAISE3 = 57,
    S_POSS_RAISE4 = 58,
    S_BAR1 = 59,
    S_BAR2 = 60,
    S_BEXP = 61,
    S_BEXP2 = 62,
    S_BEXP3 = 63,
    S_BEXP4 = 64,
    S_BEXP5 = 65,
    S_MISL = 66,
    S_MISL2 = 67,
    S_EXPLODE1 = 68,
    S_EXPLODE2 = 69,
    S_EXPLODE3 = 70,
    S_STIM = 71,
    S_SHOT = 72,
}

impl State {
    #[inline(always)]
    pub fn info(self) -> &'static super::states::StateInfo {
        &super::states::STATES[self as usize]
    }
    #[inline(always)]
    pub fn tics(self) -> i32 {
        self.info().tics
    }
    #[inline(always)]
    pub fn next(self) -> State {
        self.info().next_state
    }
    #[inline(always)]
    pub fn sprite(self) -> &'static str {
        self.info().sprite
    }
    #[inline(always)]
    pub fn frame(self) -> u8 {
        self.info().frame
    }
}
