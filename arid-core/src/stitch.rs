//! Stitching block-local labellings into one global labelling.
//!
//! Large inputs are cut block by block. Each block's labels are first shifted
//! by [`offset_labels`] so no two blocks share an identifier. Labels seen
//! touching across a block boundary are then recorded in
//! [`LabelEquivalences`], which resolves them into a [`LabelMapping`] that
//! sends every label to the smallest label of its equivalence class.
//!
//! Label `0` is background and never takes part in an equivalence.

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;
use tracing::{Span, debug, field, instrument};

use crate::{disjoint_set::DisjointSet, error::define_error_codes};

/// Errors raised while stitching block labels.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum StitchError {
    /// Shifting a block's labels would exceed `u64::MAX`.
    #[error("offsetting block {block_id} (block length {block_len}) overflows label {label}")]
    OffsetOverflow {
        /// Identifier of the block being shifted.
        block_id: u64,
        /// Number of label slots reserved per block.
        block_len: u64,
        /// The label whose shifted value does not fit.
        label: u64,
    },
}

define_error_codes! {
    /// Stable codes describing [`StitchError`] variants.
    enum StitchErrorCode for StitchError {
        /// The block offset overflowed.
        OffsetOverflow => OffsetOverflow { .. } => "STITCH_OFFSET_OVERFLOW",
    }
}

/// Adds `block_id * block_len` to every label in place.
///
/// The buffer is left untouched when any shifted label would overflow.
///
/// # Errors
/// Returns [`StitchError::OffsetOverflow`] when the offset or a shifted label
/// does not fit in a `u64`.
///
/// # Examples
/// ```
/// use arid_core::offset_labels;
///
/// let mut labels = [1, 1, 3];
/// offset_labels(&mut labels, 2, 4)?;
/// assert_eq!(labels, [9, 9, 11]);
/// # Ok::<(), arid_core::StitchError>(())
/// ```
pub fn offset_labels(labels: &mut [u64], block_id: u64, block_len: u64) -> Result<(), StitchError> {
    let overflow = |label| StitchError::OffsetOverflow {
        block_id,
        block_len,
        label,
    };
    let offset = block_id.checked_mul(block_len).ok_or_else(|| overflow(0))?;
    if let Some(&label) = labels.iter().find(|label| label.checked_add(offset).is_none()) {
        return Err(overflow(label));
    }
    for label in labels.iter_mut() {
        *label += offset;
    }
    Ok(())
}

/// Pairs of labels known to belong to the same component.
#[derive(Clone, Debug, Default)]
pub struct LabelEquivalences {
    slots: HashMap<u64, usize>,
    labels: Vec<u64>,
    sets: DisjointSet,
}

impl LabelEquivalences {
    /// Creates an empty set of equivalences.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `left` and `right` name the same component.
    ///
    /// Pairs involving the background label `0` and pairs of a label with
    /// itself are ignored.
    pub fn insert(&mut self, left: u64, right: u64) {
        if left == 0 || right == 0 || left == right {
            return;
        }
        let left = self.slot(left);
        let right = self.slot(right);
        self.sets.merge(left, right);
    }

    /// Number of distinct labels recorded so far.
    #[must_use]
    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    /// Returns `true` when no pair has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Resolves the recorded pairs into a mapping from each label to the
    /// smallest label in its class.
    #[instrument(
        name = "stitch.resolve",
        skip(self),
        fields(labels = self.labels.len(), classes = field::Empty),
    )]
    pub fn resolve(mut self) -> LabelMapping {
        let mut smallest: Vec<Option<u64>> = vec![None; self.labels.len()];
        let roots: Vec<usize> = (0..self.labels.len())
            .map(|slot| self.sets.find(slot))
            .collect();
        for (&root, &label) in roots.iter().zip(&self.labels) {
            let entry = &mut smallest[root];
            *entry = Some(entry.map_or(label, |current| current.min(label)));
        }

        let targets = roots
            .iter()
            .zip(&self.labels)
            .filter_map(|(&root, &label)| smallest[root].map(|target| (label, target)))
            .collect::<BTreeMap<_, _>>();
        let classes = self.sets.set_count();
        Span::current().record("classes", classes);
        debug!(classes, "label classes resolved");
        LabelMapping { targets }
    }

    fn slot(&mut self, label: u64) -> usize {
        if let Some(&slot) = self.slots.get(&label) {
            return slot;
        }
        let slot = self.sets.push_singleton();
        self.slots.insert(label, slot);
        self.labels.push(label);
        slot
    }
}

impl Extend<(u64, u64)> for LabelEquivalences {
    fn extend<T: IntoIterator<Item = (u64, u64)>>(&mut self, pairs: T) {
        for (left, right) in pairs {
            self.insert(left, right);
        }
    }
}

impl FromIterator<(u64, u64)> for LabelEquivalences {
    fn from_iter<T: IntoIterator<Item = (u64, u64)>>(pairs: T) -> Self {
        let mut equivalences = Self::new();
        equivalences.extend(pairs);
        equivalences
    }
}

/// Replacement table produced by [`LabelEquivalences::resolve`].
///
/// # Examples
/// ```
/// use arid_core::LabelEquivalences;
///
/// let equivalences: LabelEquivalences = [(9, 4), (4, 12), (0, 7)].into_iter().collect();
/// let mapping = equivalences.resolve();
/// let mut labels = [12, 0, 9, 7, 4];
/// mapping.apply(&mut labels);
/// assert_eq!(labels, [4, 0, 4, 7, 4]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LabelMapping {
    targets: BTreeMap<u64, u64>,
}

impl LabelMapping {
    /// Returns the replacement for `label`, if it was part of any pair.
    #[must_use]
    pub fn get(&self, label: u64) -> Option<u64> {
        self.targets.get(&label).copied()
    }

    /// Number of labels the mapping knows about.
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Returns `true` when the mapping is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Iterates `(label, replacement)` pairs in ascending label order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.targets.iter().map(|(&label, &target)| (label, target))
    }

    /// Rewrites `labels` in place. Labels absent from the mapping are kept.
    pub fn apply(&self, labels: &mut [u64]) {
        for label in labels.iter_mut() {
            if let Some(target) = self.get(*label) {
                *label = target;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use arid_test_support::tracing::RecordingLayer;
    use rstest::rstest;
    use tracing_subscriber::layer::SubscriberExt;

    #[test]
    fn offset_shifts_every_label() {
        let mut labels = vec![0, 5, 5, 7];
        offset_labels(&mut labels, 3, 8).expect("offset fits");
        assert_eq!(labels, vec![24, 29, 29, 31]);
    }

    #[test]
    fn first_block_is_unchanged() {
        let mut labels = vec![1, 1, 3];
        offset_labels(&mut labels, 0, u64::MAX).expect("zero offset always fits");
        assert_eq!(labels, vec![1, 1, 3]);
    }

    #[rstest]
    #[case::offset_itself(u64::MAX, 2, vec![1], 0)]
    #[case::shifted_label(1, u64::MAX - 1, vec![0, 2, 1], 2)]
    fn offset_overflow_leaves_buffer_alone(
        #[case] block_id: u64,
        #[case] block_len: u64,
        #[case] labels: Vec<u64>,
        #[case] culprit: u64,
    ) {
        let mut buffer = labels.clone();
        let err = offset_labels(&mut buffer, block_id, block_len).expect_err("must overflow");
        assert_eq!(
            err,
            StitchError::OffsetOverflow {
                block_id,
                block_len,
                label: culprit
            }
        );
        assert_eq!(err.code().as_str(), "STITCH_OFFSET_OVERFLOW");
        assert_eq!(buffer, labels);
    }

    #[test]
    fn background_and_self_pairs_are_ignored() {
        let mut equivalences = LabelEquivalences::new();
        equivalences.insert(0, 4);
        equivalences.insert(4, 0);
        equivalences.insert(6, 6);
        assert!(equivalences.is_empty());
        assert!(equivalences.resolve().is_empty());
    }

    #[test]
    fn chained_pairs_collapse_to_smallest_label() {
        let mut equivalences = LabelEquivalences::new();
        equivalences.extend([(30, 20), (20, 50), (11, 12)]);
        assert_eq!(equivalences.label_count(), 5);

        let mapping = equivalences.resolve();
        let pairs: Vec<(u64, u64)> = mapping.iter().collect();
        assert_eq!(
            pairs,
            vec![(11, 11), (12, 11), (20, 20), (30, 20), (50, 20)]
        );
    }

    #[test]
    fn resolve_span_records_label_and_class_counts() {
        let layer = RecordingLayer::default();
        let subscriber = tracing_subscriber::registry().with(layer.clone());

        let mut equivalences = LabelEquivalences::new();
        equivalences.extend([(30, 20), (20, 50), (11, 12)]);
        let mapping = tracing::subscriber::with_default(subscriber, || equivalences.resolve());
        assert_eq!(mapping.len(), 5);

        let span = layer
            .span_named("stitch.resolve")
            .expect("resolve span must be recorded");
        assert_eq!(span.field("labels"), Some("5"));
        assert_eq!(span.field("classes"), Some("2"));

        let resolved = layer.events_with_message("label classes resolved");
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].field("classes"), Some("2"));
    }

    #[test]
    fn apply_leaves_unknown_labels_untouched() {
        let mapping: LabelMapping = [(8, 3), (3, 5)]
            .into_iter()
            .collect::<LabelEquivalences>()
            .resolve();
        let mut labels = vec![8, 1, 0, 5, 3, 99];
        mapping.apply(&mut labels);
        assert_eq!(labels, vec![3, 1, 0, 3, 3, 99]);
        assert_eq!(mapping.get(99), None);
        assert_eq!(mapping.len(), 3);
    }

    #[test]
    fn repeated_pairs_do_not_grow_the_table() {
        let equivalences: LabelEquivalences =
            [(2, 3), (3, 2), (2, 3)].into_iter().collect();
        assert_eq!(equivalences.label_count(), 2);
        assert_eq!(equivalences.resolve().get(3), Some(2));
    }
}
