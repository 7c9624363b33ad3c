// AUTO-GENERATED - see tools/gen_mobjinfo

use crate::defs::action::Action;
use crate::defs::state::State;

#[derive(Debug, Copy, Clone)]
pub struct StateInfo {
    pub state: State,
    pub sprite: &'static str,
    pub frame: u8,
    pub tics: i32,
    pub action: Action,
    pub next_state: State,
    pub misc1: i32,
    pub misc2: i32,
}

pub const STATES: &[StateInfo] = &[
    StateInfo { state: State::S_NULL, sprite: "TROO", frame: 0, tics: -1, action: Action::None, next_state: State::S_NULL, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_PLAY, sprite: "PLAY", frame: 0, tics: -1, action: Action::None, next_state: State::S_PLAY, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_PLAY_RUN1, sprite: "PLAY", frame: 1, tics: 4, action: Action::None, next_state: State::S_PLAY_RUN2, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_PLAY_RUN2, sprite: "PLAY", frame: 2, tics: 4, action: Action::None, next_state: State::S_PLAY_RUN3, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_PLAY_RUN3, sprite: "PLAY", frame: 3, tics: 4, action: Action::None, next_state: State::S_PLAY_RUN4, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_PLAY_RUN4, sprite: "PLAY", frame: 0, tics: 4, action: Action::None, next_state: State::S_PLAY_RUN1, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_PLAY_ATK1, sprite: "PLAY", frame: 4, tics: 12, action: Action::None, next_state: State::S_PLAY, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_PLAY_ATK2, sprite: "PLAY", frame: 5, tics: 6, action: Action::FaceTarget, next_state: State::S_PLAY_ATK1, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_PLAY_PAIN, sprite: "PLAY", frame: 6, tics: 4, action: Action::None, next_state: State::S_PLAY_PAIN2, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_PLAY_PAIN2, sprite: "PLAY", frame: 6, tics: 4, action: Action::None, next_state: State::S_PLAY, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_PLAY_DIE1, sprite: "PLAY", frame: 7, tics: 10, action: Action::None, next_state: State::S_PLAY_DIE2, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_PLAY_DIE2, sprite: "PLAY", frame: 8, tics: 10, action: Action::Fall, next_state: State::S_PLAY_DIE3, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_PLAY_DIE3, sprite: "PLAY", frame: 9, tics: 10, action: Action::None, next_state: State::S_PLAY_DIE4, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_PLAY_DIE4, sprite: "PLAY", frame: 10, tics: 10, action: Action::None, next_state: State::S_PLAY_DIE5, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_PLAY_DIE5, sprite: "PLAY", frame: 11, tics: 10, action: Action::None, next_state: State::S_PLAY_DIE6, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_PLAY_DIE6, sprite: "PLAY", frame: 12, tics: 10, action: Action::None, next_state: State::S_PLAY_DIE7, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_PLAY_DIE7, sprite: "PLAY", frame: 13, tics: -1, action: Action::None, next_state: State::S_PLAY_DIE7, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_PLAY_XDIE1, sprite: "PLAY", frame: 14, tics: 5, action: Action::None, next_state: State::S_PLAY_XDIE2, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_PLAY_XDIE2, sprite: "PLAY", frame: 15, tics: 5, action: Action::Fall, next_state: State::S_PLAY_XDIE3, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_PLAY_XDIE3, sprite: "PLAY", frame: 16, tics: 5, action: Action::None, next_state: State::S_PLAY_XDIE4, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_PLAY_XDIE4, sprite: "PLAY", frame: 17, tics: 5, action: Action::None, next_state: State::S_PLAY_XDIE5, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_PLAY_XDIE5, sprite: "PLAY", frame: 18, tics: 5, action: Action::None, next_state: State::S_PLAY_XDIE6, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_PLAY_XDIE6, sprite: "PLAY", frame: 19, tics: 5, action: Action::None, next_state: State::S_PLAY_XDIE7, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_PLAY_XDIE7, sprite: "PLAY", frame: 20, tics: 5, action: Action::None, next_state: State::S_PLAY_XDIE8, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_PLAY_XDIE8, sprite: "PLAY", frame: 21, tics: 5, action: Action::None, next_state: State::S_PLAY_XDIE9, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_PLAY_XDIE9, sprite: "PLAY", frame: 22, tics: -1, action: Action::None, next_state: State::S_PLAY_XDIE9, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_POSS_STND, sprite: "POSS", frame: 0, tics: 10, action: Action::Look, next_state: State::S_POSS_STND2, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_POSS_STND2, sprite: "POSS", frame: 1, tics: 10, action: Action::Look, next_state: State::S_POSS_STND, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_POSS_RUN1, sprite: "POSS", frame: 0, tics: 4, action: Action::Chase, next_state: State::S_POSS_RUN2, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_POSS_RUN2, sprite: "POSS", frame: 0, tics: 4, action: Action::Chase, next_state: State::S_POSS_RUN3, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_POSS_RUN3, sprite: "POSS", frame: 1, tics: 4, action: Action::Chase, next_state: State::S_POSS_RUN4, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_POSS_RUN4, sprite: "POSS", frame: 1, tics: 4, action: Action::Chase, next_state: State::S_POSS_RUN5, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_POSS_RUN5, sprite: "POSS", frame: 2, tics: 4, action: Action::Chase, next_state: State::S_POSS_RUN6, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_POSS_RUN6, sprite: "POSS", frame: 2, tics: 4, action: Action::Chase, next_state: State::S_POSS_RUN7, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_POSS_RUN7, sprite: "POSS", frame: 3, tics: 4, action: Action::Chase, next_state: State::S_POSS_RUN8, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_POSS_RUN8, sprite: "POSS", frame: 3, tics: 4, action: Action::Chase, next_state: State::S_POSS_RUN1, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_POSS_ATK1, sprite: "POSS", frame: 4, tics: 10, action: Action::FaceTarget, next_state: State::S_POSS_ATK2, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_POSS_ATK2, sprite: "POSS", frame: 5, tics: 8, action: Action::PosAttack, next_state: State::S_POSS_ATK3, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_POSS_ATK3, sprite: "POSS", frame: 4, tics: 8, action: Action::None, next_state: State::S_POSS_RUN1, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_POSS_PAIN, sprite: "POSS", frame: 6, tics: 3, action: Action::None, next_state: State::S_POSS_PAIN2, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_POSS_PAIN2, sprite: "POSS", frame: 6, tics: 3, action: Action::None, next_state: State::S_POSS_RUN1, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_POSS_DIE1, sprite: "POSS", frame: 7, tics: 5, action: Action::None, next_state: State::S_POSS_DIE2, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_POSS_DIE2, sprite: "POSS", frame: 8, tics: 5, action: Action::Scream, next_state: State::S_POSS_DIE3, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_POSS_DIE3, sprite: "POSS", frame: 9, tics: 5, action: Action::Fall, next_state: State::S_POSS_DIE4, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_POSS_DIE4, sprite: "POSS", frame: 10, tics: 5, action: Action::None, next_state: State::S_POSS_DIE5, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_POSS_DIE5, sprite: "POSS", frame: 11, tics: -1, action: Action::None, next_state: State::S_POSS_DIE5, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_POSS_XDIE1, sprite: "POSS", frame: 12, tics: 5, action: Action::None, next_state: State::S_POSS_XDIE2, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_POSS_XDIE2, sprite: "POSS", frame: 13, tics: 5, action: Action::XScream, next_state: State::S_POSS_XDIE3, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_POSS_XDIE3, sprite: "POSS", frame: 14, tics: 5, action: Action::Fall, next_state: State::S_POSS_XDIE4, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_POSS_XDIE4, sprite: "POSS", frame: 15, tics: 5, action: Action::None, next_state: State::S_POSS_XDIE5, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_POSS_XDIE5, sprite: "POSS", frame: 16, tics: 5, action: Action::None, next_state: State::S_POSS_XDIE6, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_POSS_XDIE6, sprite: "POSS", frame: 17, tics: 5, action: Action::None, next_state: State::S_POSS_XDIE7, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_POSS_XDIE7, sprite: "POSS", frame: 18, tics: 5, action: Action::None, next_state: State::S_POSS_XDIE8, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_POSS_XDIE8, sprite: "POSS", frame: 19, tics: 5, action: Action::None, next_state: State::S_POSS_XDIE9, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_POSS_XDIE9, sprite: "POSS", frame: 20, tics: -1, action: Action::None, next_state: State::S_POSS_XDIE9, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_POSS_RAISE1, sprite: "POSS", frame: 11, tics: 5, action: Action::None, next_state: State::S_POSS_RAISE2, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_POSS_RAISE2, sprite: "POSS", frame: 10, tics: 5, action: Action::None, next_state: State::S_POSS_RAISE3, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_POSS_RAISE3, sprite: "POSS", frame: 9, tics: 5, action: Action::None, next_state: State::S_POSS_RAISE4, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_POSS_RAISE4, sprite: "POSS", frame: 8, tics: 5, action: Action::None, next_state: State::S_POSS_RUN1, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_BAR1, sprite: "BAR1", frame: 0, tics: 6, action: Action::None, next_state: State::S_BAR2, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_BAR2, sprite: "BAR1", frame: 1, tics: 6, action: Action::None, next_state: State::S_BAR1, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_BEXP, sprite: "BEXP", frame: 0, tics: 5, action: Action::None, next_state: State::S_BEXP2, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_BEXP2, sprite: "BEXP", frame: 1, tics: 5, action: Action::None, next_state: State::S_BEXP3, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_BEXP3, sprite: "BEXP", frame: 2, tics: 5, action: Action::Explode, next_state: State::S_BEXP4, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_BEXP4, sprite: "BEXP", frame: 3, tics: 10, action: Action::None, next_state: State::S_BEXP5, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_BEXP5, sprite: "BEXP", frame: 4, tics: 10, action: Action::None, next_state: State::S_NULL, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_MISL, sprite: "MISL", frame: 0, tics: 4, action: Action::None, next_state: State::S_MISL2, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_MISL2, sprite: "MISL", frame: 1, tics: 4, action: Action::None, next_state: State::S_MISL, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_EXPLODE1, sprite: "MISL", frame: 2, tics: 8, action: Action::Explode, next_state: State::S_EXPLODE2, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_EXPLODE2, sprite: "MISL", frame: 3, tics: 6, action: Action::None, next_state: State::S_EXPLODE3, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_EXPLODE3, sprite: "MISL", frame: 4, tics: 4, action: Action::None, next_state: State::S_NULL, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_STIM, sprite: "STIM", frame: 0, tics: -1, action: Action::None, next_state: State::S_STIM, misc1: 0, misc2: 0 },
    StateInfo { state: State::S_SHOT, sprite: "SHOT", frame: 0, tics: -1, action: Action::None, next_state: State::S_SHOT, misc1: 0, misc2: 0 },
];
