//! Image import intake
//!
//! On platforms where the image picker answers on its own thread, the
//! callback only sends the raw bytes through an [`ImportSender`]. The GUI
//! thread calls [`ImportQueue::drain`] once per frame to stage the bytes on
//! disk and turn them into pending decorations.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use tracing::{error, info, warn};

use crate::constants::paths::DECOR_EXTENSION;
use crate::decor::{DecorCollection, sanitize_name};
use crate::fs::FileSystem;
use crate::image::{ImageHandle, ImageLoader};

/// An image delivered by the picker
#[derive(Debug, Clone)]
pub struct PickedImage {
    /// Name reported by the picker, used as the initial decoration name
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Producer side, safe to move to the picker's thread
#[derive(Debug, Clone)]
pub struct ImportSender {
    tx: Sender<PickedImage>,
}

impl ImportSender {
    pub fn send(&self, file_name: impl Into<String>, bytes: Vec<u8>) -> Result<()> {
        self.tx
            .send(PickedImage { file_name: file_name.into(), bytes })
            .context("Import queue was closed")
    }
}

/// Consumer side, owned by the GUI thread
#[derive(Debug)]
pub struct ImportQueue {
    rx: Receiver<PickedImage>,
}

impl ImportQueue {
    pub fn new() -> (ImportSender, ImportQueue) {
        let (tx, rx) = mpsc::channel();
        (ImportSender { tx }, ImportQueue { rx })
    }

    /// Stage every queued image into `staging_dir` and add it to `decor`.
    /// Returns how many decorations were added.
    pub fn drain(
        &self,
        decor: &mut DecorCollection,
        staging_dir: &Path,
        fs: &dyn FileSystem,
        loader: &dyn ImageLoader,
    ) -> usize {
        let mut added = 0;
        loop {
            let picked = match self.rx.try_recv() {
                Ok(picked) => picked,
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            };

            match stage(&picked, staging_dir, fs, loader) {
                Ok((name, path, handle)) => {
                    let index = decor.add_staged(&name, path, Some(handle));
                    if let Some(record) = decor.get(index) {
                        info!(decor = %record.name(), "Imported picked image");
                    }
                    added += 1;
                }
                Err(e) => error!(file = %picked.file_name, error = %format!("{e:#}"), "Failed to import picked image"),
            }
        }
        added
    }
}

fn stage(
    picked: &PickedImage,
    staging_dir: &Path,
    fs: &dyn FileSystem,
    loader: &dyn ImageLoader,
) -> Result<(String, PathBuf, ImageHandle)> {
    let handle = loader.load_bytes(&picked.bytes)?;

    let stem = Path::new(&picked.file_name)
        .file_stem()
        .map(|s| sanitize_name(&s.to_string_lossy()))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| {
            warn!(file = %picked.file_name, "Picked image has no usable name");
            crate::constants::decor::FALLBACK_NAME.to_string()
        });

    if !fs.exists(staging_dir) {
        fs.create_directory(staging_dir)?;
    }

    // Two picks with the same name must not overwrite each other's bytes
    let mut path = staging_dir.join(format!("{stem}.{DECOR_EXTENSION}"));
    let mut attempt = 2;
    while fs.exists(&path) {
        path = staging_dir.join(format!("{stem}-{attempt}.{DECOR_EXTENSION}"));
        attempt += 1;
    }

    fs.write_bytes(&path, &picked.bytes)?;
    Ok((stem, path, handle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decor::DecorationOperation;
    use crate::fs::StdFileSystem;
    use crate::image::{PngLoader, test_png};
    use std::thread;

    #[test]
    fn test_drain_stages_bytes_from_another_thread() {
        let dir = tempfile::tempdir().unwrap();
        let staging = dir.path().join("staging");
        let (sender, queue) = ImportQueue::new();

        let producer = {
            let sender = sender.clone();
            thread::spawn(move || {
                sender.send("sun.png", test_png(4, 4)).unwrap();
                sender.send("sun.png", test_png(2, 2)).unwrap();
            })
        };
        producer.join().unwrap();

        let mut decor = DecorCollection::new();
        let added = queue.drain(&mut decor, &staging, &StdFileSystem, &PngLoader::new());

        assert_eq!(added, 2);
        let names: Vec<&str> = decor.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["sun", "sun_new"]);

        let first = decor.get(0).unwrap();
        assert!(first.has_operation(DecorationOperation::Add));
        assert!(first.is_staged());
        assert_eq!(first.handle().unwrap().dimensions(), (4, 4));
        assert!(first.source_path().starts_with(&staging));
        assert_ne!(decor.get(0).unwrap().source_path(), decor.get(1).unwrap().source_path());
    }

    #[test]
    fn test_invalid_image_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let (sender, queue) = ImportQueue::new();
        sender.send("notes.png", b"text, not pixels".to_vec()).unwrap();

        let mut decor = DecorCollection::new();
        let added = queue.drain(&mut decor, dir.path(), &StdFileSystem, &PngLoader::new());

        assert_eq!(added, 0);
        assert!(decor.is_empty());
    }

    #[test]
    fn test_unsafe_file_name_is_sanitized() {
        let dir = tempfile::tempdir().unwrap();
        let (sender, queue) = ImportQueue::new();
        sender.send("we?ird*.png", test_png(1, 1)).unwrap();

        let mut decor = DecorCollection::new();
        queue.drain(&mut decor, dir.path(), &StdFileSystem, &PngLoader::new());

        assert_eq!(decor.get(0).unwrap().name(), "we_ird_");
    }

    #[test]
    fn test_drain_on_empty_queue_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let (_sender, queue) = ImportQueue::new();
        let mut decor = DecorCollection::new();
        assert_eq!(queue.drain(&mut decor, dir.path(), &StdFileSystem, &PngLoader::new()), 0);
    }
}
