pub mod config;
pub mod error;
pub mod types;

pub use config::Tuning;
pub use error::{FrontlineError, Result};
pub use types::{CommanderBonus, Difficulty, Side, UnitId};
