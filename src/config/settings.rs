//! In-memory settings persisted through the config store
//!
//! Three sections, one per file the game reads:
//! - **Localization**: every on-screen string (`localization.cfg`)
//! - **FontSettings**: custom font path and sizes (`font.cfg`)
//! - **StandardDecor**: which built-in decorations are shown (`decor.cfg`)

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::store::{ConfigEntry, ConfigSection, parse_positive_int};
use crate::constants::{decor, font, localization, paths, syntax};

/// Localization strings in the order the game lists them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Localization {
    entries: Vec<(String, String)>,
}

impl Default for Localization {
    fn default() -> Self {
        Self {
            entries: localization::DEFAULTS
                .iter()
                .map(|(key, text)| (key.to_string(), text.to_string()))
                .collect(),
        }
    }
}

impl Localization {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, text)| text.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Replace the text of a known key. Unknown keys are refused.
    pub fn set(&mut self, key: &str, text: &str) -> bool {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, current)) => {
                *current = text.to_string();
                true
            }
            None => false,
        }
    }
}

impl ConfigSection for Localization {
    fn file_name(&self) -> &'static str {
        paths::LOCALIZATION_FILE
    }

    fn header(&self) -> &'static [&'static str] {
        syntax::LOCALIZATION_HEADER
    }

    fn apply(&mut self, key: &str, value: &str) -> bool {
        // An empty string would blank the text in game; keep the current one
        if value.is_empty() {
            return false;
        }
        self.set(key, value)
    }

    fn entries(&self) -> Vec<ConfigEntry> {
        self.entries
            .iter()
            .map(|(key, text)| ConfigEntry::quoted(key.clone(), text.clone()))
            .collect()
    }
}

/// Font selection and sizes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontSettings {
    /// Custom font file; empty uses the game's default font
    #[serde(default)]
    pub font: String,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    #[serde(default = "default_other_text_font_size")]
    pub other_text_font_size: u32,
}

fn default_font_size() -> u32 {
    font::DEFAULT_FONT_SIZE
}

fn default_other_text_font_size() -> u32 {
    font::DEFAULT_OTHER_TEXT_FONT_SIZE
}

impl Default for FontSettings {
    fn default() -> Self {
        Self {
            font: String::new(),
            font_size: default_font_size(),
            other_text_font_size: default_other_text_font_size(),
        }
    }
}

impl FontSettings {
    /// Accept `size` only within the range the editor offers
    fn checked_size(key: &str, size: u32) -> Option<u32> {
        if (font::MIN_FONT_SIZE..=font::MAX_FONT_SIZE).contains(&size) {
            Some(size)
        } else {
            warn!(key = %key, size = size, max = font::MAX_FONT_SIZE, "Font size out of range, keeping previous value");
            None
        }
    }

    pub fn set_font_size(&mut self, size: u32) -> bool {
        match Self::checked_size(font::FONT_SIZE_KEY, size) {
            Some(size) => {
                self.font_size = size;
                true
            }
            None => false,
        }
    }

    pub fn set_other_text_font_size(&mut self, size: u32) -> bool {
        match Self::checked_size(font::OTHER_TEXT_FONT_SIZE_KEY, size) {
            Some(size) => {
                self.other_text_font_size = size;
                true
            }
            None => false,
        }
    }

    /// Bring both sizes back into range
    pub fn validate_and_clamp(&mut self) {
        for (key, size) in [
            (font::FONT_SIZE_KEY, &mut self.font_size),
            (font::OTHER_TEXT_FONT_SIZE_KEY, &mut self.other_text_font_size),
        ] {
            let clamped = (*size).clamp(font::MIN_FONT_SIZE, font::MAX_FONT_SIZE);
            if clamped != *size {
                warn!(key = %key, size = *size, clamped = clamped, "Font size out of range, clamping");
                *size = clamped;
            }
        }
    }
}

impl ConfigSection for FontSettings {
    fn file_name(&self) -> &'static str {
        paths::FONT_FILE
    }

    fn header(&self) -> &'static [&'static str] {
        syntax::FONT_HEADER
    }

    fn apply(&mut self, key: &str, value: &str) -> bool {
        match key {
            font::FONT_KEY => {
                if value.is_empty() {
                    return false;
                }
                info!(font = %value, "Using custom font");
                self.font = value.to_string();
                true
            }
            font::FONT_SIZE_KEY => parse_positive_int(value).is_some_and(|size| self.set_font_size(size)),
            font::OTHER_TEXT_FONT_SIZE_KEY => {
                parse_positive_int(value).is_some_and(|size| self.set_other_text_font_size(size))
            }
            _ => false,
        }
    }

    fn entries(&self) -> Vec<ConfigEntry> {
        vec![
            ConfigEntry::quoted(font::FONT_KEY, self.font.clone()),
            ConfigEntry::plain(font::FONT_SIZE_KEY, self.font_size.to_string()),
            ConfigEntry::plain(font::OTHER_TEXT_FONT_SIZE_KEY, self.other_text_font_size.to_string()),
        ]
    }
}

/// Visibility of the game's built-in decorations
///
/// A name missing from `decor.cfg` keeps its default (shown).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardDecor {
    entries: Vec<(String, bool)>,
}

impl Default for StandardDecor {
    fn default() -> Self {
        Self {
            entries: decor::STANDARD_DECOR
                .iter()
                .map(|name| (name.to_string(), true))
                .collect(),
        }
    }
}

impl StandardDecor {
    pub fn is_enabled(&self, name: &str) -> Option<bool> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, enabled)| *enabled)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.entries.iter().map(|(n, enabled)| (n.as_str(), *enabled))
    }

    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> bool {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some((_, current)) => {
                *current = enabled;
                true
            }
            None => false,
        }
    }
}

impl ConfigSection for StandardDecor {
    fn file_name(&self) -> &'static str {
        paths::DECOR_FILE
    }

    fn header(&self) -> &'static [&'static str] {
        syntax::DECOR_HEADER
    }

    fn apply(&mut self, key: &str, value: &str) -> bool {
        self.set_enabled(key, value == "true")
    }

    fn entries(&self) -> Vec<ConfigEntry> {
        self.entries
            .iter()
            .map(|(name, enabled)| ConfigEntry::plain(name.clone(), enabled.to_string()))
            .collect()
    }
}
