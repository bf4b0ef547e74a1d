//! Session orchestration: board construction, the board director, typed
//! question play, and the statistics seam.

pub use self::{
    board::*, builder::*, outcome::*, question_play::*, quiz::*, repository::*, session::*,
};

pub(crate) mod board;
pub(crate) mod builder;
pub(crate) mod outcome;
pub(crate) mod question_play;
pub(crate) mod quiz;
pub(crate) mod repository;
pub(crate) mod session;
