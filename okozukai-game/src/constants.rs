//! Centralized balance and tuning constants for the Okozukai engine.
//!
//! These are the defaults behind [`crate::GameConfig`]. Every value feeds a
//! computed outcome, so tests override them through the config struct rather
//! than by editing this file.

// Economy ------------------------------------------------------------------
pub const MONTHLY_ALLOWANCE: i64 = 500;
pub const MIN_GOAL_PRICE: i64 = 1500;
pub const MAX_GOAL_PRICE: i64 = 6000;

// Calendar -----------------------------------------------------------------
pub const MAX_MONTHS: u32 = 12;
pub const START_MONTH: u32 = 4;
pub const MONTHS_PER_YEAR: u32 = 12;

// Events -------------------------------------------------------------------
pub const TEMPTATION_PER_MONTH: u32 = 2;
pub const HAPPENING_PROBABILITY: f64 = 0.5;

// Persistence --------------------------------------------------------------
pub const SNAPSHOT_VERSION: u32 = 1;
pub const SAVE_FILE_NAME: &str = "okozukai.save.json";
/// Largest stream position a save may ask to fast-forward to.
pub const MAX_RESUME_DRAWS: u64 = 1_000_000;

// Randomness ---------------------------------------------------------------
pub(crate) const EVENT_STREAM_TAG: &[u8] = b"okozukai.events";

// Data files ---------------------------------------------------------------
pub const ITEMS_FILE: &str = "items.json";
pub const GOALS_FILE: &str = "goals.json";
pub const HAPPENINGS_FILE: &str = "happenings.json";
pub const CONFIG_FILE: &str = "config.json";
