//! Union-find (disjoint set union) over dense integer elements.
//!
//! Elements are the integers `0..len`. [`DisjointSet::find`] compresses paths
//! so every visited element points straight at its root, and
//! [`DisjointSet::union`] links by rank. The element type is generic so large
//! inputs can halve their bookkeeping with `u32` indices.

use std::fmt;

use thiserror::Error;

use crate::error::define_error_codes;

/// Integer types usable as disjoint-set elements.
pub trait SetElement: Copy + Eq + fmt::Debug {
    /// Largest number of elements the type can address.
    const CAPACITY: usize;

    /// Converts the element into a slot index.
    fn to_index(self) -> usize;

    /// Converts a slot index below [`Self::CAPACITY`] into an element.
    fn from_index(index: usize) -> Self;
}

macro_rules! impl_set_element {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl SetElement for $ty {
                const CAPACITY: usize = if (<$ty>::MAX as u128) < (usize::MAX as u128) {
                    <$ty>::MAX as usize
                } else {
                    usize::MAX
                };

                #[inline]
                fn to_index(self) -> usize {
                    usize::try_from(self).unwrap_or(usize::MAX)
                }

                #[inline]
                fn from_index(index: usize) -> Self {
                    <$ty>::try_from(index).unwrap_or(<$ty>::MAX)
                }
            }
        )+
    };
}

impl_set_element!(usize, u32, u64);

/// Errors returned when a union request breaks the representative contract.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum DisjointSetError {
    /// An element index was outside `0..len`.
    #[error("element {element} is out of bounds for a disjoint set of {len} elements")]
    OutOfBounds {
        /// The requested element index.
        element: usize,
        /// Number of elements tracked by the set.
        len: usize,
    },
    /// A union argument was not the root of its set.
    #[error("element {element} is not the representative of its set")]
    NotRepresentative {
        /// The non-root element passed to `union`.
        element: usize,
    },
    /// Both union arguments named the same set.
    #[error("cannot union set {representative} with itself")]
    SameSet {
        /// The shared representative.
        representative: usize,
    },
    /// The element type cannot address another element.
    #[error("element type can address at most {capacity} elements")]
    CapacityExceeded {
        /// Maximum number of addressable elements.
        capacity: usize,
    },
    /// The parent and rank arrays could not be allocated.
    #[error("cannot allocate a disjoint set of {len} elements")]
    AllocationFailed {
        /// Number of elements requested.
        len: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`DisjointSetError`] variants.
    enum DisjointSetErrorCode for DisjointSetError {
        /// An element index was outside the set.
        OutOfBounds => OutOfBounds { .. } => "DISJOINT_SET_OUT_OF_BOUNDS",
        /// A union argument was not a root.
        NotRepresentative => NotRepresentative { .. } => "DISJOINT_SET_NOT_REPRESENTATIVE",
        /// Both union arguments named the same set.
        SameSet => SameSet { .. } => "DISJOINT_SET_SAME_SET",
        /// The element type ran out of indices.
        CapacityExceeded => CapacityExceeded { .. } => "DISJOINT_SET_CAPACITY_EXCEEDED",
        /// The backing arrays could not be allocated.
        AllocationFailed => AllocationFailed { .. } => "DISJOINT_SET_ALLOCATION_FAILED",
    }
}

/// Partition of `0..len` into disjoint sets.
///
/// # Examples
/// ```
/// use arid_core::DisjointSet;
///
/// let mut sets: DisjointSet = DisjointSet::new(3);
/// let root = sets.union(0, 1)?;
/// assert_eq!(sets.find(0), root);
/// assert_eq!(sets.set_count(), 2);
/// # Ok::<(), arid_core::DisjointSetError>(())
/// ```
#[derive(Clone, Debug)]
pub struct DisjointSet<I = usize> {
    parent: Vec<I>,
    rank: Vec<u8>,
    sets: usize,
}

impl<I: SetElement> DisjointSet<I> {
    /// Creates `len` singleton sets.
    ///
    /// # Panics
    /// Panics when `len` exceeds [`SetElement::CAPACITY`] or the arrays
    /// cannot be allocated; use [`Self::try_new`] to handle those cases.
    #[must_use]
    pub fn new(len: usize) -> Self {
        match Self::try_new(len) {
            Ok(sets) => sets,
            Err(err) => panic!("{err}"),
        }
    }

    /// Creates `len` singleton sets.
    ///
    /// # Errors
    /// Returns [`DisjointSetError::CapacityExceeded`] when the element type
    /// cannot address `len` elements and
    /// [`DisjointSetError::AllocationFailed`] when the allocator refuses the
    /// parent or rank array.
    pub fn try_new(len: usize) -> Result<Self, DisjointSetError> {
        if len > I::CAPACITY {
            return Err(DisjointSetError::CapacityExceeded {
                capacity: I::CAPACITY,
            });
        }
        let allocation_failed = |_| DisjointSetError::AllocationFailed { len };

        let mut parent = Vec::new();
        parent.try_reserve_exact(len).map_err(allocation_failed)?;
        parent.extend((0..len).map(I::from_index));

        let mut rank = Vec::new();
        rank.try_reserve_exact(len).map_err(allocation_failed)?;
        rank.resize(len, 0);

        Ok(Self {
            parent,
            rank,
            sets: len,
        })
    }

    /// Appends a new singleton set and returns its element.
    ///
    /// # Errors
    /// Returns [`DisjointSetError::CapacityExceeded`] when the element type
    /// cannot address another element.
    pub fn make_set(&mut self) -> Result<I, DisjointSetError> {
        let index = self.parent.len();
        if index >= I::CAPACITY {
            return Err(DisjointSetError::CapacityExceeded {
                capacity: I::CAPACITY,
            });
        }
        let element = I::from_index(index);
        self.parent.push(element);
        self.rank.push(0);
        self.sets += 1;
        Ok(element)
    }

    /// Number of elements tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    /// Returns `true` when no elements are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Number of disjoint sets currently in the partition.
    #[must_use]
    pub fn set_count(&self) -> usize {
        self.sets
    }

    /// Returns `true` when `element` is the representative of its set.
    #[must_use]
    pub fn is_root(&self, element: I) -> bool {
        let index = element.to_index();
        self.parent
            .get(index)
            .is_some_and(|parent| parent.to_index() == index)
    }

    /// Returns the representative of `element`'s set, pointing every element
    /// on the visited path directly at it.
    ///
    /// # Panics
    /// Panics when `element` is not below [`Self::len`].
    pub fn find(&mut self, element: I) -> I {
        let start = element.to_index();
        let mut root = start;
        while self.parent[root].to_index() != root {
            root = self.parent[root].to_index();
        }

        let root_element = I::from_index(root);
        let mut node = start;
        while node != root {
            let next = self.parent[node].to_index();
            self.parent[node] = root_element;
            node = next;
        }

        root_element
    }

    /// Returns `true` when `left` and `right` belong to the same set.
    ///
    /// # Panics
    /// Panics when either element is not below [`Self::len`].
    pub fn same_set(&mut self, left: I, right: I) -> bool {
        self.find(left) == self.find(right)
    }

    /// Links the sets whose representatives are `left` and `right` and returns
    /// the representative of the merged set.
    ///
    /// The root with the strictly higher rank becomes the parent. On a tie
    /// `right` becomes the parent and its rank grows by one.
    ///
    /// # Errors
    /// Returns [`DisjointSetError::OutOfBounds`] or
    /// [`DisjointSetError::NotRepresentative`] when an argument is not a root,
    /// and [`DisjointSetError::SameSet`] when both arguments are the same root.
    pub fn union(&mut self, left: I, right: I) -> Result<I, DisjointSetError> {
        let left = self.ensure_root(left)?;
        let right = self.ensure_root(right)?;
        if left == right {
            return Err(DisjointSetError::SameSet {
                representative: left,
            });
        }
        Ok(I::from_index(self.link(left, right)))
    }

    /// Unions the sets containing `left` and `right`, which need not be roots.
    ///
    /// Returns the merged representative, or `None` when both elements were
    /// already in the same set.
    ///
    /// # Panics
    /// Panics when either element is not below [`Self::len`].
    pub fn merge(&mut self, left: I, right: I) -> Option<I> {
        let left = self.find(left).to_index();
        let right = self.find(right).to_index();
        (left != right).then(|| I::from_index(self.link(left, right)))
    }

    fn ensure_root(&self, element: I) -> Result<usize, DisjointSetError> {
        let index = element.to_index();
        match self.parent.get(index) {
            Some(parent) if parent.to_index() == index => Ok(index),
            Some(_) => Err(DisjointSetError::NotRepresentative { element: index }),
            None => Err(DisjointSetError::OutOfBounds {
                element: index,
                len: self.parent.len(),
            }),
        }
    }

    fn link(&mut self, left: usize, right: usize) -> usize {
        let left_rank = self.rank[left];
        let right_rank = self.rank[right];
        let (parent, child) = if left_rank > right_rank {
            (left, right)
        } else {
            (right, left)
        };
        self.parent[child] = I::from_index(parent);
        if left_rank == right_rank {
            self.rank[parent] = right_rank.saturating_add(1);
        }
        self.sets -= 1;
        parent
    }
}

impl<I: SetElement> Default for DisjointSet<I> {
    fn default() -> Self {
        Self {
            parent: Vec::new(),
            rank: Vec::new(),
            sets: 0,
        }
    }
}

impl DisjointSet<usize> {
    /// Appends a new singleton set and returns its element.
    ///
    /// `usize` elements can address every slot a `Vec` can hold, so unlike
    /// [`Self::make_set`] this cannot fail.
    pub fn push_singleton(&mut self) -> usize {
        let element = self.parent.len();
        self.parent.push(element);
        self.rank.push(0);
        self.sets += 1;
        element
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(16)]
    fn new_creates_singletons(#[case] len: usize) {
        let mut sets: DisjointSet = DisjointSet::new(len);
        assert_eq!(sets.len(), len);
        assert_eq!(sets.set_count(), len);
        for element in 0..len {
            assert_eq!(sets.find(element), element);
            assert!(sets.is_root(element));
        }
    }

    #[test]
    fn make_set_appends_singletons() {
        let mut sets: DisjointSet<u32> = DisjointSet::new(2);
        assert_eq!(sets.make_set(), Ok(2));
        assert_eq!(sets.len(), 3);
        assert_eq!(sets.set_count(), 3);
        assert_eq!(sets.find(2), 2);
    }

    #[test]
    fn tied_union_promotes_right_root() {
        let mut sets: DisjointSet = DisjointSet::new(2);
        assert_eq!(sets.union(0, 1), Ok(1));
        assert_eq!(sets.rank, vec![0, 1]);
        assert_eq!(sets.find(0), 1);
        assert_eq!(sets.set_count(), 1);
    }

    #[rstest]
    #[case::higher_left(true)]
    #[case::higher_right(false)]
    fn higher_rank_root_becomes_parent(#[case] tall_on_left: bool) {
        let mut sets: DisjointSet = DisjointSet::new(3);
        let tall = sets.union(0, 1).expect("distinct roots must union");
        let (left, right) = if tall_on_left { (tall, 2) } else { (2, tall) };
        assert_eq!(sets.union(left, right), Ok(tall));
        assert_eq!(sets.rank[tall], 1, "rank must not grow without a tie");
    }

    #[test]
    fn union_rejects_same_root() {
        let mut sets: DisjointSet = DisjointSet::new(2);
        let root = sets.union(0, 1).expect("distinct roots must union");
        assert_eq!(
            sets.union(root, root),
            Err(DisjointSetError::SameSet {
                representative: root
            })
        );
        assert_eq!(sets.set_count(), 1);
    }

    #[test]
    fn union_rejects_non_roots() {
        let mut sets: DisjointSet = DisjointSet::new(3);
        sets.union(0, 1).expect("distinct roots must union");
        assert_eq!(
            sets.union(0, 2),
            Err(DisjointSetError::NotRepresentative { element: 0 })
        );
        assert_eq!(
            sets.union(2, 7),
            Err(DisjointSetError::OutOfBounds { element: 7, len: 3 })
        );
    }

    #[test]
    fn find_compresses_paths() {
        let mut sets: DisjointSet = DisjointSet::new(4);
        // Hand-built chain 0 -> 1 -> 2 -> 3.
        sets.parent = vec![1, 2, 3, 3];
        sets.sets = 1;
        assert_eq!(sets.find(0), 3);
        assert_eq!(sets.parent, vec![3, 3, 3, 3]);
        assert_eq!(sets.rank, vec![0; 4], "find must not touch ranks");
    }

    #[test]
    fn merge_skips_elements_already_joined() {
        let mut sets: DisjointSet<u64> = DisjointSet::new(3);
        assert!(sets.merge(0, 1).is_some());
        assert!(sets.merge(1, 2).is_some());
        assert_eq!(sets.merge(0, 2), None);
        assert!(sets.same_set(0, 2));
        assert_eq!(sets.set_count(), 1);
    }

    #[test]
    fn push_singleton_grows_from_default() {
        let mut sets: DisjointSet = DisjointSet::default();
        assert!(sets.is_empty());
        assert_eq!(sets.push_singleton(), 0);
        assert_eq!(sets.push_singleton(), 1);
        assert_eq!(sets.set_count(), 2);
        assert_eq!(sets.merge(0, 1), Some(1));
    }

    #[test]
    fn error_codes_are_stable() {
        let error = DisjointSetError::SameSet { representative: 4 };
        assert_eq!(error.code().as_str(), "DISJOINT_SET_SAME_SET");
    }

    #[test]
    fn u32_capacity_matches_type_width() {
        assert_eq!(<u32 as SetElement>::CAPACITY, u32::MAX as usize);
        assert_eq!(<usize as SetElement>::CAPACITY, usize::MAX);
    }

    #[rstest]
    #[case::every_index(usize::MAX)]
    #[case::past_isize(usize::MAX / 4)]
    fn oversized_sets_report_allocation_failure(#[case] len: usize) {
        let err = DisjointSet::<usize>::try_new(len).expect_err("allocation must be refused");
        assert_eq!(err, DisjointSetError::AllocationFailed { len });
        assert_eq!(err.code().as_str(), "DISJOINT_SET_ALLOCATION_FAILED");
    }
}
