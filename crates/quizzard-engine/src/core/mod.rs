pub use self::{clue::*, question::*, scoring::*};

pub(crate) mod clue;
pub(crate) mod question;
pub(crate) mod scoring;
