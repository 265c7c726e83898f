//! Save-file row models.

mod cooldown;
mod value_slot;

pub use cooldown::*;
pub use value_slot::*;
