//! Custom font lookup and validation using fontdue (pure Rust)
//!
//! The game loads `FONT` itself; here we only make sure the configured path
//! points at something it will be able to parse.

use anyhow::{Context, Result};
use fontdue::{Font, FontSettings};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::fs::FileSystem;

/// A font file that parsed successfully
#[derive(Debug, Clone, PartialEq)]
pub struct FontCheck {
    pub path: PathBuf,
    pub glyph_count: u16,
}

/// Resolve `font` the way the game does: relative paths start at the game
/// directory. Returns `None` for the default font or a missing file.
pub fn resolve_font_path(game_dir: &Path, font: &str, fs: &dyn FileSystem) -> Option<PathBuf> {
    if font.is_empty() {
        return None;
    }

    let path = Path::new(font);
    let path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        game_dir.join(path)
    };

    if fs.exists(&path) {
        Some(path)
    } else {
        warn!(path = %path.display(), "Custom font file not found");
        None
    }
}

/// Parse the font file to make sure it is a usable TrueType/OpenType font
pub fn validate_font_file(path: &Path) -> Result<FontCheck> {
    let font_data = fs::read(path)
        .with_context(|| format!("Failed to read font file: {}", path.display()))?;

    let font = Font::from_bytes(font_data, FontSettings::default())
        .map_err(|e| anyhow::anyhow!("Failed to parse font {}: {}", path.display(), e))?;

    info!(path = %path.display(), glyphs = font.glyph_count(), "Custom font is valid");
    Ok(FontCheck {
        path: path.to_path_buf(),
        glyph_count: font.glyph_count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::StdFileSystem;

    #[test]
    fn test_empty_font_means_default() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(resolve_font_path(dir.path(), "", &StdFileSystem), None);
    }

    #[test]
    fn test_relative_path_resolves_against_game_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("fonts")).unwrap();
        fs::write(dir.path().join("fonts").join("pixel.ttf"), b"data").unwrap();

        let resolved = resolve_font_path(dir.path(), "fonts/pixel.ttf", &StdFileSystem);
        assert_eq!(resolved, Some(dir.path().join("fonts").join("pixel.ttf")));
    }

    #[test]
    fn test_absolute_path_used_as_is() {
        let dir = tempfile::tempdir().unwrap();
        let font = dir.path().join("abs.ttf");
        fs::write(&font, b"data").unwrap();

        let elsewhere = tempfile::tempdir().unwrap();
        let resolved = resolve_font_path(elsewhere.path(), font.to_str().unwrap(), &StdFileSystem);
        assert_eq!(resolved, Some(font));
    }

    #[test]
    fn test_missing_font_resolves_to_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(resolve_font_path(dir.path(), "gone.ttf", &StdFileSystem), None);
    }

    #[test]
    fn test_garbage_font_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ttf");
        fs::write(&path, b"definitely not a font").unwrap();

        let err = validate_font_file(&path).unwrap_err();
        assert!(format!("{err}").contains("broken.ttf"));
    }
}
