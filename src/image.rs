//! Image-loading collaborator
//!
//! The core only ever stores an [`ImageHandle`]; turning it into something
//! drawable is the renderer's business.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Seek};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque reference to a loaded image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageHandle {
    id: u64,
    width: u32,
    height: u32,
}

impl ImageHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Produces handles from raw bytes or files
pub trait ImageLoader {
    fn load_bytes(&self, bytes: &[u8]) -> Result<ImageHandle>;
    fn load_path(&self, path: &Path) -> Result<ImageHandle>;
}

/// Accepts PNG data only; validates the header and records the size
#[derive(Debug, Default)]
pub struct PngLoader {
    next_id: AtomicU64,
}

impl PngLoader {
    pub fn new() -> Self {
        Self::default()
    }

    fn decode<R: BufRead + Seek>(&self, reader: R) -> Result<ImageHandle> {
        let decoder = png::Decoder::new(reader);
        let reader = decoder.read_info().context("Not a valid PNG image")?;
        let info = reader.info();
        Ok(ImageHandle {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            width: info.width,
            height: info.height,
        })
    }
}

impl ImageLoader for PngLoader {
    fn load_bytes(&self, bytes: &[u8]) -> Result<ImageHandle> {
        self.decode(Cursor::new(bytes))
    }

    fn load_path(&self, path: &Path) -> Result<ImageHandle> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open image {}", path.display()))?;
        self.decode(BufReader::new(file))
            .with_context(|| format!("Failed to load image {}", path.display()))
    }
}

/// Encode a small RGBA image, for fixtures in other modules' tests
#[cfg(test)]
pub(crate) fn test_png(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut bytes, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer
            .write_image_data(&vec![0x7F; (width * height * 4) as usize])
            .unwrap();
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_bytes_reads_dimensions() {
        let loader = PngLoader::new();
        let handle = loader.load_bytes(&test_png(3, 2)).unwrap();
        assert_eq!(handle.dimensions(), (3, 2));
    }

    #[test]
    fn test_handles_are_distinct() {
        let loader = PngLoader::new();
        let bytes = test_png(1, 1);
        let a = loader.load_bytes(&bytes).unwrap();
        let b = loader.load_bytes(&bytes).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_rejects_non_png() {
        let loader = PngLoader::new();
        assert!(loader.load_bytes(b"GIF89a not a png").is_err());
    }

    #[test]
    fn test_load_path_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = PngLoader::new()
            .load_path(&dir.path().join("nope.png"))
            .unwrap_err();
        assert!(format!("{err}").contains("nope.png"));
    }
}
