//! Settings and custom decoration management for the SENSE game directory

#![forbid(unsafe_code)]

pub mod config;
pub mod constants;
pub mod decor;
pub mod font;
pub mod fs;
pub mod image;
pub mod intake;
pub mod session;

pub use session::{Session, SaveReport, SettingsSnapshot, default_game_dir};
