//! Configuration files read by the game
//!
//! This module provides two layers:
//! - **store**: the `KEY=value` line format (parsing, escaping, in-place updates)
//! - **settings**: the localization, font and standard decor sections built on it

pub mod settings;
pub mod store;

// Re-export commonly used types
pub use settings::{FontSettings, Localization, StandardDecor};
pub use store::{ConfigEntry, ConfigSection, load_entries, update_or_add_line, write_section};
