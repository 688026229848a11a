//! One editing session over a game directory
//!
//! [`Session`] owns everything the editor mutates: the three setting
//! sections, the custom decoration list and the platform collaborators.
//! Opening never fails; missing files are recreated from defaults and bad
//! values are logged and skipped.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::config::store::ensure_file;
use crate::config::{ConfigSection, FontSettings, Localization, StandardDecor, load_entries, write_section};
use crate::constants::{font, paths};
use crate::decor::{DecorCollection, ReconcileReport, reconcile};
use crate::font::{FontCheck, resolve_font_path, validate_font_file};
use crate::fs::FileSystem;
use crate::image::ImageLoader;
use crate::intake::{ImportQueue, ImportSender};

/// Game directory used when nothing else is configured
///
/// `SENSE_GAME_DIR` wins; otherwise `<data dir>/SENSE`.
pub fn default_game_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(paths::GAME_DIR_ENV).filter(|dir| !dir.is_empty()) {
        return PathBuf::from(dir);
    }

    match dirs::data_dir() {
        Some(dir) => dir.join(paths::GAME_DIR_NAME),
        None => {
            warn!("Could not determine data directory, using current directory");
            PathBuf::from(".")
        }
    }
}

/// What a save pass did
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SaveReport {
    /// Config files that could not be written
    pub config_failures: usize,
    pub decor: ReconcileReport,
}

impl SaveReport {
    pub fn is_clean(&self) -> bool {
        self.config_failures == 0 && self.decor.is_clean()
    }
}

/// Portable copy of every setting, exported as JSON
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsSnapshot {
    #[serde(default)]
    pub localization: BTreeMap<String, String>,
    #[serde(default)]
    pub font: Option<FontSettings>,
    #[serde(default)]
    pub standard_decor: BTreeMap<String, bool>,
}

pub struct Session {
    game_dir: PathBuf,
    fs: Box<dyn FileSystem>,
    loader: Box<dyn ImageLoader>,
    localization: Localization,
    font: FontSettings,
    custom_font: Option<FontCheck>,
    standard_decor: StandardDecor,
    decorations: DecorCollection,
    import_sender: ImportSender,
    imports: ImportQueue,
}

impl Session {
    /// Load all settings and decorations from `game_dir`, creating whatever is missing
    pub fn open(game_dir: impl Into<PathBuf>, fs: Box<dyn FileSystem>, loader: Box<dyn ImageLoader>) -> Self {
        let game_dir = game_dir.into();
        let (import_sender, imports) = ImportQueue::new();

        let mut session = Self {
            game_dir,
            fs,
            loader,
            localization: Localization::default(),
            font: FontSettings::default(),
            custom_font: None,
            standard_decor: StandardDecor::default(),
            decorations: DecorCollection::new(),
            import_sender,
            imports,
        };

        info!(dir = %session.game_dir.display(), "Opening game directory");
        if !session.fs.exists(&session.game_dir) {
            if let Err(e) = session.fs.create_directory(&session.game_dir) {
                error!(dir = %session.game_dir.display(), error = %format!("{e:#}"), "Failed to create game directory");
            }
        }

        session.purge_staging();

        let fs = session.fs.as_ref();
        load_section(fs, &session.game_dir, &mut session.localization);
        load_section(fs, &session.game_dir, &mut session.font);
        load_section(fs, &session.game_dir, &mut session.standard_decor);

        let decor_dir = session.decor_dir();
        if !fs.exists(&decor_dir) {
            if let Err(e) = fs.create_directory(&decor_dir) {
                error!(dir = %decor_dir.display(), error = %format!("{e:#}"), "Failed to create decor directory");
            }
        }
        if let Err(e) = session
            .decorations
            .scan_directory(&decor_dir, fs, session.loader.as_ref())
        {
            warn!(dir = %decor_dir.display(), error = %format!("{e:#}"), "Failed to scan decor directory");
        }
        session.check_custom_font();

        info!(
            decorations = session.decorations.len(),
            custom_font = session.custom_font.is_some(),
            "Session ready"
        );
        session
    }

    pub fn game_dir(&self) -> &Path {
        &self.game_dir
    }

    pub fn decor_dir(&self) -> PathBuf {
        self.game_dir.join(paths::DECOR_DIR)
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.game_dir.join(paths::STAGING_DIR)
    }

    pub fn localization(&self) -> &Localization {
        &self.localization
    }

    pub fn localization_mut(&mut self) -> &mut Localization {
        &mut self.localization
    }

    pub fn font(&self) -> &FontSettings {
        &self.font
    }

    pub fn font_mut(&mut self) -> &mut FontSettings {
        &mut self.font
    }

    /// The custom font, if `FONT` names a file that parses
    pub fn custom_font(&self) -> Option<&FontCheck> {
        self.custom_font.as_ref()
    }

    pub fn standard_decor(&self) -> &StandardDecor {
        &self.standard_decor
    }

    pub fn standard_decor_mut(&mut self) -> &mut StandardDecor {
        &mut self.standard_decor
    }

    pub fn decorations(&self) -> &DecorCollection {
        &self.decorations
    }

    pub fn decorations_mut(&mut self) -> &mut DecorCollection {
        &mut self.decorations
    }

    /// Handle for the image picker's callback thread
    pub fn import_sender(&self) -> ImportSender {
        self.import_sender.clone()
    }

    /// Turn every picked image received so far into a pending decoration
    pub fn pump_imports(&mut self) -> usize {
        let staging_dir = self.staging_dir();
        self.imports.drain(
            &mut self.decorations,
            &staging_dir,
            self.fs.as_ref(),
            self.loader.as_ref(),
        )
    }

    /// Drop a picked image that was never saved, along with its staged copy
    pub fn cancel_new(&mut self, index: usize) -> Result<()> {
        let record = self.decorations.cancel_new(index)?;
        if record.is_staged() {
            if let Err(e) = self.fs.delete_file(record.source_path()) {
                warn!(path = %record.source_path().display(), error = %format!("{e:#}"), "Failed to discard staged image");
            }
        }
        Ok(())
    }

    /// Staged copies only live for one session; anything left over is stale
    fn purge_staging(&self) {
        let staging_dir = self.staging_dir();
        if !self.fs.exists(&staging_dir) {
            return;
        }

        match self.fs.list_directory(&staging_dir) {
            Ok(entries) => {
                for path in entries {
                    match self.fs.delete_file(&path) {
                        Ok(()) => debug!(path = %path.display(), "Purged stale staged image"),
                        Err(e) => warn!(path = %path.display(), error = %format!("{e:#}"), "Failed to purge staged image"),
                    }
                }
            }
            Err(e) => warn!(dir = %staging_dir.display(), error = %format!("{e:#}"), "Failed to list staging directory"),
        }
    }

    /// Write all three config files and apply pending decoration edits
    pub fn save(&mut self) -> SaveReport {
        let mut report = SaveReport::default();
        self.pump_imports();

        let decor_dir = self.decor_dir();
        let fs = self.fs.as_ref();
        let sections: [&dyn ConfigSection; 3] = [&self.localization, &self.font, &self.standard_decor];
        for section in sections {
            let path = self.game_dir.join(section.file_name());
            if let Err(e) = write_section(fs, &path, section) {
                error!(file = section.file_name(), error = %format!("{e:#}"), "Failed to save config");
                report.config_failures += 1;
            }
        }

        report.decor = reconcile(&mut self.decorations, &decor_dir, fs);
        self.check_custom_font();

        info!(
            config_failures = report.config_failures,
            added = report.decor.added,
            removed = report.decor.removed,
            renamed = report.decor.renamed,
            failed = report.decor.failed,
            "Save finished"
        );
        report
    }

    pub fn snapshot(&self) -> SettingsSnapshot {
        SettingsSnapshot {
            localization: self
                .localization
                .iter()
                .map(|(key, text)| (key.to_string(), text.to_string()))
                .collect(),
            font: Some(self.font.clone()),
            standard_decor: self
                .standard_decor
                .iter()
                .map(|(name, enabled)| (name.to_string(), enabled))
                .collect(),
        }
    }

    /// Write every setting to `path` as JSON
    pub fn export_snapshot(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.snapshot()).context("Failed to serialize settings")?;
        self.fs.write_text(path, &json)?;
        info!(path = %path.display(), "Exported settings");
        Ok(())
    }

    /// Apply a snapshot written by [`Session::export_snapshot`]. Unknown keys
    /// and invalid values are skipped. Returns how many values were applied.
    pub fn import_snapshot(&mut self, path: &Path) -> Result<usize> {
        let json = self.fs.read_text(path)?;
        let snapshot: SettingsSnapshot = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse settings from {}", path.display()))?;

        let applied = self.apply_snapshot(&snapshot);
        self.check_custom_font();
        info!(path = %path.display(), applied = applied, "Imported settings");
        Ok(applied)
    }

    pub fn apply_snapshot(&mut self, snapshot: &SettingsSnapshot) -> usize {
        let mut applied = 0;

        for (key, text) in &snapshot.localization {
            if self.localization.apply(key, text) {
                applied += 1;
            } else {
                debug!(key = %key, "Skipped localization value");
            }
        }

        if let Some(font_settings) = &snapshot.font {
            let values = [
                (font::FONT_KEY, font_settings.font.clone()),
                (font::FONT_SIZE_KEY, font_settings.font_size.to_string()),
                (font::OTHER_TEXT_FONT_SIZE_KEY, font_settings.other_text_font_size.to_string()),
            ];
            for (key, value) in values {
                if self.font.apply(key, &value) {
                    applied += 1;
                }
            }
        }

        for (name, enabled) in &snapshot.standard_decor {
            if self.standard_decor.set_enabled(name, *enabled) {
                applied += 1;
            } else {
                debug!(decor = %name, "Skipped unknown standard decoration");
            }
        }

        applied
    }

    fn check_custom_font(&mut self) {
        self.custom_font = resolve_font_path(&self.game_dir, &self.font.font, self.fs.as_ref())
            .and_then(|path| match validate_font_file(&path) {
                Ok(check) => Some(check),
                Err(e) => {
                    warn!(error = %format!("{e:#}"), "Custom font is unusable, the game will fall back to its default");
                    None
                }
            });
    }
}

/// Make sure the section's file exists, then read it into `section`
fn load_section(fs: &dyn FileSystem, game_dir: &Path, section: &mut dyn ConfigSection) {
    let path = game_dir.join(section.file_name());

    if let Err(e) = ensure_file(fs, &path, section) {
        warn!(file = section.file_name(), error = %format!("{e:#}"), "Failed to create default config");
    }

    match load_entries(fs, &path, section) {
        Ok(entries) => debug!(file = section.file_name(), entries = entries.len(), "Loaded config"),
        Err(e) => warn!(file = section.file_name(), error = %format!("{e:#}"), "Failed to read config, using defaults"),
    }
}
