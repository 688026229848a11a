//! The live list of custom decorations for one session

use anyhow::{Result, anyhow, bail};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::operation::DecorationOperation;
use super::record::DecorationRecord;
use crate::constants::paths::DECOR_EXTENSION;
use crate::fs::FileSystem;
use crate::image::{ImageHandle, ImageLoader};

/// Custom decorations in display order
#[derive(Debug, Default, Clone)]
pub struct DecorCollection {
    records: Vec<DecorationRecord>,
}

impl DecorCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&DecorationRecord> {
        self.records.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DecorationRecord> {
        self.records.iter()
    }

    pub fn find(&self, name: &str) -> Option<&DecorationRecord> {
        self.records.iter().find(|record| record.name() == name)
    }

    pub(crate) fn records_mut(&mut self) -> &mut [DecorationRecord] {
        &mut self.records
    }

    fn record_mut(&mut self, index: usize) -> Result<&mut DecorationRecord> {
        let len = self.records.len();
        self.records
            .get_mut(index)
            .ok_or_else(|| anyhow!("No decoration at index {index} (have {len})"))
    }

    /// Enforce name uniqueness for the record at `index` against every other record
    pub fn ensure_unique_name(&mut self, index: usize) -> Result<()> {
        let others: Vec<String> = self
            .records
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, record)| record.name().to_string())
            .collect();
        self.record_mut(index)?
            .ensure_unique_name(others.iter().map(String::as_str));
        Ok(())
    }

    /// Append a picked image, named after its file stem, pending `Add`
    pub fn add_new(&mut self, source_path: PathBuf, handle: Option<ImageHandle>) -> usize {
        let stem = file_stem(&source_path);
        let index = self.add_existing(DecorationRecord::new_pending(stem, source_path, handle));
        info!(decor = %self.records[index].name(), "Queued new decoration");
        index
    }

    /// Append bytes the intake staged under `name`, pending `Add`
    pub fn add_staged(&mut self, name: &str, staged_path: PathBuf, handle: Option<ImageHandle>) -> usize {
        let index = self.add_existing(DecorationRecord::new_staged(name, staged_path, handle));
        info!(decor = %self.records[index].name(), "Queued imported decoration");
        index
    }

    /// Append an already-built record, enforcing name uniqueness
    pub fn add_existing(&mut self, mut record: DecorationRecord) -> usize {
        record.ensure_unique_name(self.records.iter().map(DecorationRecord::name));
        self.records.push(record);
        self.records.len() - 1
    }

    /// Pick up every `.png` already in `dir` as a committed record.
    /// Files that are already tracked are skipped. Names are sanitized and
    /// made unique, so `leaf.png` next to `leaf.PNG` shows up as `leaf_new`
    /// and is renamed on the next save.
    pub fn scan_directory(&mut self, dir: &Path, fs: &dyn FileSystem, loader: &dyn ImageLoader) -> Result<usize> {
        if !fs.exists(dir) {
            return Ok(0);
        }

        let mut entries = fs.list_directory(dir)?;
        entries.sort();

        let mut found = 0;
        for path in entries {
            let is_png = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(DECOR_EXTENSION));
            if !is_png {
                continue;
            }

            if self.records.iter().any(|record| record.source_path() == path) {
                continue;
            }
            let name = file_stem(&path);

            let handle = loader
                .load_path(&path)
                .inspect_err(|e| warn!(path = %path.display(), error = %e, "Could not load decoration image"))
                .ok();
            let index = self.add_existing(DecorationRecord::from_disk(name.as_str(), path, handle));
            let record = &self.records[index];
            if record.name() != name {
                warn!(file = %record.source_path().display(), name = %record.name(), "Decoration file name is unsafe or taken, it will be renamed on save");
            }
            found += 1;
        }

        info!(dir = %dir.display(), found = found, "Scanned decor folder");
        Ok(found)
    }

    /// Rename the record at `index`; the final name may differ after sanitizing
    /// and collision handling.
    pub fn rename(&mut self, index: usize, new_name: &str) -> Result<()> {
        self.record_mut(index)?.set_name(new_name);
        self.ensure_unique_name(index)?;
        let record = self.record_mut(index)?;
        record.add_operation(DecorationOperation::Rename);
        info!(decor = %record.name(), ops = %record.operation_set(), "Renamed decoration");
        Ok(())
    }

    pub fn mark_remove(&mut self, index: usize) -> Result<()> {
        self.record_mut(index)?.add_operation(DecorationOperation::Remove);
        Ok(())
    }

    pub fn restore(&mut self, index: usize) -> Result<()> {
        self.record_mut(index)?.restore_from_remove();
        Ok(())
    }

    /// Drop a picked image that was never saved. Committed records have to go
    /// through `mark_remove` instead.
    pub fn cancel_new(&mut self, index: usize) -> Result<DecorationRecord> {
        if self.record_mut(index)?.is_committed() {
            bail!("Decoration '{}' is already saved; mark it for removal instead", self.records[index].name());
        }
        let record = self.records.remove(index);
        info!(decor = %record.name(), "Cancelled new decoration");
        Ok(record)
    }

    /// Drop every record whose operations are exactly `{Remove}`
    pub(crate) fn sweep_removed(&mut self) -> usize {
        let before = self.records.len();
        self.records
            .retain(|record| !record.operation_set().is_exactly(DecorationOperation::Remove));
        before - self.records.len()
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decor::operation::DecorationOperation::{Add, Remove, Rename};
    use crate::fs::StdFileSystem;
    use crate::image::{PngLoader, test_png};
    use std::fs;

    #[test]
    fn test_two_foos_end_up_distinct() {
        let mut decor = DecorCollection::new();
        decor.add_new(PathBuf::from("/pics/foo.png"), None);
        decor.add_new(PathBuf::from("/other/foo.png"), None);

        let names: Vec<&str> = decor.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["foo", "foo_new"]);
        assert_eq!(decor.get(1).unwrap().operations(), &[Add, Rename]);
    }

    #[test]
    fn test_ensure_unique_name_on_both_records() {
        let mut decor = DecorCollection::new();
        decor.records.push(DecorationRecord::new_pending("foo", PathBuf::from("a/foo.png"), None));
        decor.records.push(DecorationRecord::new_pending("foo", PathBuf::from("b/foo.png"), None));

        decor.ensure_unique_name(0).unwrap();
        decor.ensure_unique_name(1).unwrap();

        let a = decor.get(0).unwrap().name();
        let b = decor.get(1).unwrap().name();
        assert_ne!(a, b);
        assert!(a == "foo" || b == "foo");
    }

    #[test]
    fn test_rename_collision_and_cancel() {
        let mut decor = DecorCollection::new();
        decor.records.push(DecorationRecord::from_disk("tree", PathBuf::from("decor/tree.png"), None));
        decor.records.push(DecorationRecord::from_disk("bush", PathBuf::from("decor/bush.png"), None));

        decor.rename(0, "bush").unwrap();
        assert_eq!(decor.get(0).unwrap().name(), "bush_new");
        assert_eq!(decor.get(0).unwrap().operations(), &[Rename]);

        decor.rename(0, "tree").unwrap();
        assert_eq!(decor.get(0).unwrap().name(), "tree");
        assert_eq!(decor.get(0).unwrap().operations(), &[DecorationOperation::None]);
    }

    #[test]
    fn test_rename_while_removed_is_restored_later() {
        let mut decor = DecorCollection::new();
        decor.records.push(DecorationRecord::from_disk("tree", PathBuf::from("decor/tree.png"), None));

        decor.mark_remove(0).unwrap();
        decor.rename(0, "oak").unwrap();
        assert_eq!(decor.get(0).unwrap().operations(), &[Remove]);

        decor.restore(0).unwrap();
        assert_eq!(decor.get(0).unwrap().operations(), &[Rename]);
        assert_eq!(decor.get(0).unwrap().name(), "oak");
    }

    #[test]
    fn test_cancel_new_only_for_uncommitted() {
        let mut decor = DecorCollection::new();
        decor.records.push(DecorationRecord::from_disk("tree", PathBuf::from("decor/tree.png"), None));
        decor.add_new(PathBuf::from("/pics/bush.png"), None);

        assert!(decor.cancel_new(0).is_err());
        let cancelled = decor.cancel_new(1).unwrap();
        assert_eq!(cancelled.name(), "bush");
        assert_eq!(decor.len(), 1);
    }

    #[test]
    fn test_out_of_range_index_is_an_error() {
        let mut decor = DecorCollection::new();
        assert!(decor.rename(3, "x").is_err());
        assert!(decor.mark_remove(0).is_err());
    }

    #[test]
    fn test_scan_directory_picks_up_pngs_once() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("stone.png"), test_png(2, 2)).unwrap();
        fs::write(dir.path().join("leaf.PNG"), test_png(1, 1)).unwrap();
        fs::write(dir.path().join("notes.txt"), b"skip me").unwrap();
        fs::write(dir.path().join("broken.png"), b"not really").unwrap();

        let mut decor = DecorCollection::new();
        let found = decor.scan_directory(dir.path(), &StdFileSystem, &PngLoader::new()).unwrap();
        assert_eq!(found, 3);

        let stone = decor.find("stone").unwrap();
        assert!(stone.is_committed());
        assert_eq!(stone.operations(), &[DecorationOperation::None]);
        assert_eq!(stone.handle().unwrap().dimensions(), (2, 2));
        assert!(decor.find("broken").unwrap().handle().is_none());

        let again = decor.scan_directory(dir.path(), &StdFileSystem, &PngLoader::new()).unwrap();
        assert_eq!(again, 0);
        assert_eq!(decor.len(), 3);
    }

    #[test]
    fn test_scan_makes_disk_names_unique_and_safe() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("leaf.PNG"), test_png(1, 1)).unwrap();
        fs::write(dir.path().join("leaf.png"), test_png(2, 2)).unwrap();
        fs::write(dir.path().join("a:b.png"), test_png(1, 1)).unwrap();

        let mut decor = DecorCollection::new();
        let found = decor.scan_directory(dir.path(), &StdFileSystem, &PngLoader::new()).unwrap();
        assert_eq!(found, 3);

        let names: Vec<&str> = decor.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["a_b", "leaf", "leaf_new"]);
        assert_eq!(decor.find("a_b").unwrap().operations(), &[Rename]);
        assert_eq!(decor.find("leaf").unwrap().operations(), &[DecorationOperation::None]);
        let second = decor.find("leaf_new").unwrap();
        assert_eq!(second.operations(), &[Rename]);
        assert_eq!(second.source_path(), dir.path().join("leaf.png").as_path());

        // Each file is tracked once, whatever name it ended up with
        assert_eq!(decor.scan_directory(dir.path(), &StdFileSystem, &PngLoader::new()).unwrap(), 0);
    }

    #[test]
    fn test_add_staged_is_pending_and_unique() {
        let mut decor = DecorCollection::new();
        decor.add_existing(DecorationRecord::from_disk("moon", PathBuf::from("decor/moon.png"), None));
        let index = decor.add_staged("moon", PathBuf::from("decor_staging/moon-2.png"), None);

        let record = decor.get(index).unwrap();
        assert_eq!(record.name(), "moon_new");
        assert!(record.is_staged());
        assert_eq!(record.operations(), &[Add, Rename]);
    }

    #[test]
    fn test_scan_missing_directory_finds_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut decor = DecorCollection::new();
        let found = decor
            .scan_directory(&dir.path().join("decor"), &StdFileSystem, &PngLoader::new())
            .unwrap();
        assert_eq!(found, 0);
    }
}
