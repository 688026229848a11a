//! One custom decoration and its pending edits

use std::path::{Path, PathBuf};
use tracing::debug;

use super::operation::{DecorationOperation, OperationSet};
use crate::constants::decor::{COLLISION_SUFFIX, FALLBACK_NAME, NAME_REPLACEMENT, UNSAFE_NAME_CHARS};
use crate::image::ImageHandle;

/// A user-supplied decoration image
#[derive(Debug, Clone)]
pub struct DecorationRecord {
    name: String,
    /// Stem of the file as it currently exists in the decor directory
    original_name: String,
    source_path: PathBuf,
    handle: Option<ImageHandle>,
    operations: OperationSet,
    committed: bool,
    /// `source_path` is a copy in the staging folder rather than the user's file
    staged: bool,
}

impl DecorationRecord {
    /// A freshly picked image that still has to be copied into the decor directory
    pub fn new_pending(name: impl Into<String>, source_path: PathBuf, handle: Option<ImageHandle>) -> Self {
        let name = name.into();
        Self {
            original_name: name.clone(),
            name,
            source_path,
            handle,
            operations: OperationSet::only(DecorationOperation::Add),
            committed: false,
            staged: false,
        }
    }

    /// Like [`DecorationRecord::new_pending`], for bytes the app copied into
    /// its staging folder. The staged copy is deleted once it is no longer needed.
    pub fn new_staged(name: impl Into<String>, source_path: PathBuf, handle: Option<ImageHandle>) -> Self {
        Self {
            staged: true,
            ..Self::new_pending(name, source_path, handle)
        }
    }

    /// An image already sitting in the decor directory
    pub fn from_disk(name: impl Into<String>, source_path: PathBuf, handle: Option<ImageHandle>) -> Self {
        let name = name.into();
        Self {
            original_name: name.clone(),
            name,
            source_path,
            handle,
            operations: OperationSet::default(),
            committed: true,
            staged: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn handle(&self) -> Option<ImageHandle> {
        self.handle
    }

    pub fn operations(&self) -> &[DecorationOperation] {
        self.operations.as_slice()
    }

    pub fn operation_set(&self) -> &OperationSet {
        &self.operations
    }

    pub fn has_operation(&self, op: DecorationOperation) -> bool {
        self.operations.contains(op)
    }

    /// Whether the file lives in the decor directory yet
    pub fn is_committed(&self) -> bool {
        self.committed
    }

    pub fn is_staged(&self) -> bool {
        self.staged
    }

    /// Record a pending operation, see [`OperationSet::apply`]
    pub fn add_operation(&mut self, op: DecorationOperation) {
        let name_is_original = self.committed && self.name == self.original_name;
        self.operations.apply(op, name_is_original);
        debug!(decor = %self.name, op = %op, ops = %self.operations, "Applied decoration operation");
    }

    pub fn restore_from_remove(&mut self) {
        self.operations.restore_from_remove();
        debug!(decor = %self.name, ops = %self.operations, "Restored decoration");
    }

    /// Change the display name without touching the operation set
    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Sanitize the name and make it unique against `taken`, the names of all
    /// other live records. A collision renames to `<base>_new`, `<base>_new2`,
    /// ... and marks the record for `Rename`.
    pub fn ensure_unique_name<'a, I>(&mut self, taken: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let taken: Vec<&str> = taken.into_iter().collect();

        let mut base = sanitize_name(&self.name);
        if base.is_empty() {
            base = FALLBACK_NAME.to_string();
        }

        if !taken.contains(&base.as_str()) {
            if base != self.name {
                debug!(from = %self.name, to = %base, "Sanitized decoration name");
                self.name = base;
                self.add_operation(DecorationOperation::Rename);
            }
            return;
        }

        let mut attempt = 1u32;
        let unique = loop {
            let candidate = if attempt == 1 {
                format!("{base}{COLLISION_SUFFIX}")
            } else {
                format!("{base}{COLLISION_SUFFIX}{attempt}")
            };
            if !taken.contains(&candidate.as_str()) {
                break candidate;
            }
            attempt += 1;
        };

        debug!(from = %base, to = %unique, "Resolved decoration name collision");
        self.name = unique;
        self.add_operation(DecorationOperation::Rename);
    }

    /// The file now lives at `path` under the current name
    pub(crate) fn mark_committed(&mut self, path: PathBuf) {
        self.source_path = path;
        self.original_name = self.name.clone();
        self.committed = true;
        self.staged = false;
        self.operations = OperationSet::default();
    }

    /// Point at a new location without committing the pending name
    pub(crate) fn set_source_path(&mut self, path: PathBuf) {
        self.source_path = path;
    }

    /// Clear pending state without moving anything
    pub(crate) fn clear_operations(&mut self) {
        self.operations = OperationSet::default();
    }

    /// Collapse to exactly `{Remove}` so the post-pass sweep drops the record
    pub(crate) fn settle_removed(&mut self) {
        self.operations = OperationSet::only(DecorationOperation::Remove);
    }
}

/// Replace characters that are not allowed in file names
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| if UNSAFE_NAME_CHARS.contains(&c) { NAME_REPLACEMENT } else { c })
        .collect()
}
