//! Pending-operation state machine for custom decorations
//!
//! An [`OperationSet`] holds the filesystem actions waiting for the next save.
//! `Remove` is dominant: while it is pending nothing else is live, but edits
//! made in the meantime are parked in a restore snapshot so undoing the
//! removal brings them back.

use std::fmt;

/// A filesystem action waiting for the next save
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecorationOperation {
    None,
    Add,
    Remove,
    Rename,
}

impl fmt::Display for DecorationOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DecorationOperation::None => "None",
            DecorationOperation::Add => "Add",
            DecorationOperation::Remove => "Remove",
            DecorationOperation::Rename => "Rename",
        };
        f.write_str(label)
    }
}

/// Ordered set of pending operations plus the pre-remove snapshot
///
/// Invariants: `ops` is never empty, and if it contains `Remove` it contains
/// nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationSet {
    ops: Vec<DecorationOperation>,
    before_remove: Option<Vec<DecorationOperation>>,
}

impl Default for OperationSet {
    fn default() -> Self {
        Self::only(DecorationOperation::None)
    }
}

impl OperationSet {
    /// A set holding exactly `op`
    pub fn only(op: DecorationOperation) -> Self {
        Self {
            ops: vec![op],
            before_remove: None,
        }
    }

    pub fn as_slice(&self) -> &[DecorationOperation] {
        &self.ops
    }

    pub fn contains(&self, op: DecorationOperation) -> bool {
        self.ops.contains(&op)
    }

    /// True when `op` is the single pending operation
    pub fn is_exactly(&self, op: DecorationOperation) -> bool {
        self.ops.len() == 1 && self.ops[0] == op
    }

    pub fn is_removed(&self) -> bool {
        self.contains(DecorationOperation::Remove)
    }

    /// Operations that `restore_from_remove` would bring back
    pub fn pending_before_remove(&self) -> Option<&[DecorationOperation]> {
        self.before_remove.as_deref()
    }

    /// Apply one event.
    ///
    /// `name_is_original` tells a `Rename` that the record's name currently
    /// matches its on-disk stem, which cancels the rename marker instead of
    /// adding it.
    pub fn apply(&mut self, op: DecorationOperation, name_is_original: bool) {
        use DecorationOperation::*;

        match (self.is_removed(), op) {
            (true, None) => {
                self.ops = vec![None];
                self.before_remove = Option::None;
            }
            (true, Remove) => {}
            (true, queued) => {
                let snapshot = self.before_remove.get_or_insert_with(Vec::new);
                snapshot.retain(|pending| *pending != None);
                if !snapshot.contains(&queued) {
                    snapshot.push(queued);
                }
            }
            (false, Remove) => {
                let snapshot = self.ops.iter().copied().filter(|pending| *pending != Remove).collect();
                self.before_remove = Some(snapshot);
                self.ops = vec![Remove];
            }
            (false, None) => {
                self.ops = vec![None];
            }
            (false, Rename) if name_is_original => {
                self.ops.retain(|pending| *pending != None && *pending != Rename);
                if self.ops.is_empty() {
                    self.ops.push(None);
                }
            }
            (false, other) => {
                self.ops.retain(|pending| *pending != None);
                if !self.ops.contains(&other) {
                    self.ops.push(other);
                }
            }
        }
    }

    /// Bring back the operations parked when `Remove` was applied
    pub fn restore_from_remove(&mut self) {
        self.ops = match self.before_remove.take() {
            Some(snapshot) if !snapshot.is_empty() => snapshot,
            _ => vec![DecorationOperation::None],
        };
    }
}

impl fmt::Display for OperationSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<String> = self.ops.iter().map(ToString::to_string).collect();
        write!(f, "[{}]", labels.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::DecorationOperation::*;
    use super::*;

    fn set_of(ops: &[DecorationOperation]) -> OperationSet {
        let mut set = OperationSet::default();
        for op in ops {
            set.apply(*op, false);
        }
        set
    }

    #[test]
    fn test_default_is_none() {
        assert!(OperationSet::default().is_exactly(None));
    }

    #[test]
    fn test_add_and_rename_strip_none_placeholder() {
        let set = set_of(&[Add, Rename]);
        assert_eq!(set.as_slice(), &[Add, Rename]);
    }

    #[test]
    fn test_no_duplicates() {
        let set = set_of(&[Rename, Rename, Add, Rename]);
        assert_eq!(set.as_slice(), &[Rename, Add]);
    }

    #[test]
    fn test_remove_is_exclusive_and_restorable() {
        for before in [&[][..], &[Add][..], &[Rename][..], &[Add, Rename][..]] {
            let mut set = set_of(before);
            let expected = set.as_slice().to_vec();

            set.apply(Remove, false);
            assert!(set.is_exactly(Remove));

            set.restore_from_remove();
            assert_eq!(set.as_slice(), expected.as_slice());
            assert!(set.pending_before_remove().is_none());
        }
    }

    #[test]
    fn test_edits_while_removed_are_parked() {
        let mut set = set_of(&[Remove]);

        set.apply(Rename, false);
        set.apply(Add, false);
        set.apply(Rename, false);
        assert!(set.is_exactly(Remove));
        assert_eq!(set.pending_before_remove(), Some(&[Rename, Add][..]));

        set.restore_from_remove();
        assert_eq!(set.as_slice(), &[Rename, Add]);
    }

    #[test]
    fn test_none_while_removed_clears_everything() {
        let mut set = set_of(&[Add, Remove]);
        set.apply(Rename, false);

        set.apply(None, false);
        assert!(set.is_exactly(None));
        assert!(set.pending_before_remove().is_none());
    }

    #[test]
    fn test_second_remove_keeps_first_snapshot() {
        let mut set = set_of(&[Rename, Remove]);
        set.apply(Remove, false);
        assert_eq!(set.pending_before_remove(), Some(&[Rename][..]));
    }

    #[test]
    fn test_none_resets_live_state() {
        let mut set = set_of(&[Add, Rename]);
        set.apply(None, false);
        assert!(set.is_exactly(None));
    }

    #[test]
    fn test_rename_back_to_original_cancels_marker() {
        let mut set = set_of(&[Rename]);
        set.apply(Rename, true);
        assert!(set.is_exactly(None));

        let mut set = set_of(&[Add, Rename]);
        set.apply(Rename, true);
        assert_eq!(set.as_slice(), &[Add]);
    }

    #[test]
    fn test_restore_without_snapshot_yields_none() {
        let mut set = OperationSet::only(Remove);
        set.restore_from_remove();
        assert!(set.is_exactly(None));
    }

    #[test]
    fn test_display_lists_operations() {
        assert_eq!(set_of(&[Add, Rename]).to_string(), "[Add, Rename]");
    }
}
