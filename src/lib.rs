//! Frontline - deterministic tactical core for hex-grid WWII battles

pub mod battle;
pub mod core;
pub mod scenario;
pub mod supply;
