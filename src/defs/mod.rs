pub mod action;
pub mod flags;
pub mod mobjinfo;
pub mod sound;
pub mod state;
pub mod states;

pub use crate::defs::{
    action::Action,
    mobjinfo::{MOBJINFO, MobjInfo, by_doomednum, by_id},
    sound::Sound,
    state::State,
    states::{STATES, StateInfo},
};
