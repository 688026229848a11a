//! Commit-time application of pending decoration edits to disk
//!
//! Runs only when the user saves. Each record gets at most one filesystem
//! action, chosen in the order Add, Remove, Rename. A failed Add or Rename is
//! logged and keeps its operations so the next save retries it; the rest of
//! the pass carries on.
//!
//! Destinations can be files that other records are about to vacate (a rename
//! chain or a swap), so the pass runs in stages: removals and renames move
//! their files out of the way first, renames to a parked name, then adds are
//! copied in, then parked files move to their final names.

use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use super::collection::DecorCollection;
use super::operation::DecorationOperation;
use super::record::DecorationRecord;
use crate::constants::paths::{DECOR_EXTENSION, RENAME_PARK_EXTENSION};
use crate::fs::FileSystem;

/// What a reconcile pass did
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileReport {
    pub added: usize,
    pub removed: usize,
    pub renamed: usize,
    pub failed: usize,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Destination of a record inside the decor directory
pub fn target_path(decor_dir: &Path, name: &str) -> PathBuf {
    decor_dir.join(format!("{name}.{DECOR_EXTENSION}"))
}

/// Apply every record's pending operation, then drop records that were removed
pub fn reconcile(collection: &mut DecorCollection, decor_dir: &Path, fs: &dyn FileSystem) -> ReconcileReport {
    let mut report = ReconcileReport::default();

    if !fs.exists(decor_dir) {
        match fs.create_directory(decor_dir) {
            Ok(()) => info!(dir = %decor_dir.display(), "Created decor directory"),
            Err(e) => error!(dir = %decor_dir.display(), error = %e, "Failed to create decor directory"),
        }
    }

    info!(count = collection.len(), "Processing custom decorations");
    let records = collection.records_mut();

    let mut parked = Vec::new();
    for (index, record) in records.iter_mut().enumerate() {
        info!(decor = %record.name(), path = %record.source_path().display(), ops = %record.operation_set(), "Reconciling decoration");

        if record.has_operation(DecorationOperation::Add) {
            // copied in below, once renamed files are out of the way
        } else if record.has_operation(DecorationOperation::Remove) {
            apply_remove(record, fs, &mut report);
        } else if record.has_operation(DecorationOperation::Rename) {
            if let Some(parked_path) = park_for_rename(index, record, decor_dir, fs, &mut report) {
                parked.push((index, parked_path));
            }
        }
    }

    for record in records.iter_mut().filter(|record| record.has_operation(DecorationOperation::Add)) {
        apply_add(record, decor_dir, fs, &mut report);
    }

    for (index, parked_path) in parked {
        finish_rename(&mut records[index], &parked_path, decor_dir, fs, &mut report);
    }

    let dropped = collection.sweep_removed();
    if dropped > 0 {
        info!(dropped = dropped, remaining = collection.len(), "Removed decorations from list");
    }

    info!(added = report.added, removed = report.removed, renamed = report.renamed, failed = report.failed, "Custom decorations processed");
    report
}

fn apply_add(record: &mut DecorationRecord, decor_dir: &Path, fs: &dyn FileSystem, report: &mut ReconcileReport) {
    let dest = target_path(decor_dir, record.name());
    match fs.copy_file(record.source_path(), &dest, true) {
        Ok(()) => {
            info!(decor = %record.name(), dest = %dest.display(), "Added custom decor");
            let staged = record.is_staged().then(|| record.source_path().to_path_buf());
            record.mark_committed(dest);
            report.added += 1;
            if let Some(staged) = staged {
                discard_staged(&staged, fs);
            }
        }
        Err(e) => {
            error!(decor = %record.name(), error = %format!("{e:#}"), "Failed to add decor");
            report.failed += 1;
        }
    }
}

fn apply_remove(record: &mut DecorationRecord, fs: &dyn FileSystem, report: &mut ReconcileReport) {
    if record.is_committed() && fs.exists(record.source_path()) {
        match fs.delete_file(record.source_path()) {
            Ok(()) => info!(decor = %record.name(), path = %record.source_path().display(), "Removed custom decor"),
            Err(e) => {
                error!(decor = %record.name(), error = %format!("{e:#}"), "Failed to remove decor");
                report.failed += 1;
            }
        }
    } else if record.is_committed() {
        warn!(decor = %record.name(), path = %record.source_path().display(), "Decor file already gone");
    } else if record.is_staged() {
        discard_staged(record.source_path(), fs);
    }
    // A picked image that never made it into the decor folder and was not
    // staged by us is the user's own file; only forget it.

    record.settle_removed();
    report.removed += 1;
}

/// First half of a rename: move the file to a name no record can claim
fn park_for_rename(
    index: usize,
    record: &mut DecorationRecord,
    decor_dir: &Path,
    fs: &dyn FileSystem,
    report: &mut ReconcileReport,
) -> Option<PathBuf> {
    let dest = target_path(decor_dir, record.name());
    if dest == record.source_path() {
        record.clear_operations();
        return None;
    }

    let parked = decor_dir.join(format!(".{}.{index}.{RENAME_PARK_EXTENSION}", record.original_name()));
    match fs.rename_file(record.source_path(), &parked) {
        Ok(()) => Some(parked),
        Err(e) => {
            error!(decor = %record.name(), error = %format!("{e:#}"), "Failed to rename decor");
            report.failed += 1;
            None
        }
    }
}

fn finish_rename(
    record: &mut DecorationRecord,
    parked: &Path,
    decor_dir: &Path,
    fs: &dyn FileSystem,
    report: &mut ReconcileReport,
) {
    let dest = target_path(decor_dir, record.name());
    match fs.rename_file(parked, &dest) {
        Ok(()) => {
            info!(decor = %record.name(), dest = %dest.display(), "Renamed decor");
            record.mark_committed(dest);
            report.renamed += 1;
        }
        Err(e) => {
            error!(decor = %record.name(), error = %format!("{e:#}"), "Failed to rename decor");
            report.failed += 1;

            // Go back to the old file name unless another record has taken it
            let restored = !fs.exists(record.source_path()) && fs.rename_file(parked, record.source_path()).is_ok();
            if !restored {
                warn!(decor = %record.name(), path = %parked.display(), "Decor left at its parked name until the next save");
                record.set_source_path(parked.to_path_buf());
            }
        }
    }
}

/// Delete an intake copy that is no longer needed
fn discard_staged(path: &Path, fs: &dyn FileSystem) {
    match fs.delete_file(path) {
        Ok(()) => info!(path = %path.display(), "Discarded staged image"),
        Err(e) => warn!(path = %path.display(), error = %format!("{e:#}"), "Failed to discard staged image"),
    }
}
