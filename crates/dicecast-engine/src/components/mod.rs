pub mod card;
pub mod die;

pub use card::{CardPhase, RollCard};
pub use die::{DieParams, DiePhase, DieSprite, ExitStyle};
