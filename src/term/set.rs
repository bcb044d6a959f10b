use std::cmp::Ordering;
use std::ops::{BitAnd, BitOr};

use smallvec::SmallVec;

use crate::TermId;

/// Patients are usually annotated with fewer than 20 terms
const DEFAULT_CAPACITY: usize = 16;

/// A sorted set of unique [`TermId`]s
///
/// The set is used for the directly annotated phenotypes of a patient
/// as well as for ancestor closures.
///
/// # Examples
///
/// ```
/// use phenocompare::{TermId, TermSet};
///
/// let mut set = TermSet::new();
/// assert!(set.insert(1250u32.into()));
/// assert!(set.insert(118u32.into()));
/// assert!(!set.insert(1250u32.into()));
///
/// assert_eq!(set.len(), 2);
/// // terms are always sorted
/// assert_eq!(set.iter().next(), Some(&TermId::from(118u32)));
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct TermSet {
    ids: SmallVec<[TermId; DEFAULT_CAPACITY]>,
}

impl TermSet {
    /// Constructs a new, empty [`TermSet`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Constructs a new, empty [`TermSet`] with the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: SmallVec::with_capacity(capacity),
        }
    }

    /// Returns `true` if the set contains no [`TermId`]s
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns the number of [`TermId`]s in the set
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Adds a new [`TermId`] to the set
    ///
    /// Returns whether the `TermId` was newly inserted.
    pub fn insert(&mut self, id: TermId) -> bool {
        match self.ids.binary_search(&id) {
            Ok(_) => false,
            Err(idx) => {
                self.ids.insert(idx, id);
                true
            }
        }
    }

    /// Returns `true` if the set contains the [`TermId`]
    pub fn contains(&self, id: &TermId) -> bool {
        self.ids.binary_search(id).is_ok()
    }

    /// Returns an Iterator of the [`TermId`]s in ascending order
    pub fn iter(&self) -> TermIds<'_> {
        TermIds::new(self.ids.iter())
    }

    /// Returns `true` if every term of `self` is also part of `other`
    pub fn is_subset(&self, other: &TermSet) -> bool {
        self.len() <= other.len() && self.ids.iter().all(|id| other.contains(id))
    }

    /// Counts the terms present in both sets without allocating a new set
    ///
    /// ```
    /// use phenocompare::TermSet;
    ///
    /// let a = TermSet::from_iter([1u32.into(), 2u32.into(), 3u32.into()]);
    /// let b = TermSet::from_iter([2u32.into(), 3u32.into(), 4u32.into()]);
    /// assert_eq!(a.intersection_len(&b), 2);
    /// ```
    pub fn intersection_len(&self, other: &TermSet) -> usize {
        let mut left = self.ids.iter().peekable();
        let mut right = other.ids.iter().peekable();
        let mut count = 0;
        while let (Some(a), Some(b)) = (left.peek(), right.peek()) {
            match a.cmp(b) {
                Ordering::Less => {
                    left.next();
                }
                Ordering::Greater => {
                    right.next();
                }
                Ordering::Equal => {
                    count += 1;
                    left.next();
                    right.next();
                }
            }
        }
        count
    }

    /// Number of terms present in at least one of the sets
    pub fn union_len(&self, other: &TermSet) -> usize {
        self.len() + other.len() - self.intersection_len(other)
    }
}

impl FromIterator<TermId> for TermSet {
    fn from_iter<T: IntoIterator<Item = TermId>>(iter: T) -> Self {
        let mut set = TermSet::new();
        set.extend(iter);
        set
    }
}

impl Extend<TermId> for TermSet {
    fn extend<T: IntoIterator<Item = TermId>>(&mut self, iter: T) {
        for id in iter {
            self.insert(id);
        }
    }
}

impl<'a> IntoIterator for &'a TermSet {
    type Item = &'a TermId;
    type IntoIter = TermIds<'a>;

    fn into_iter(self) -> TermIds<'a> {
        TermIds::new(self.ids.iter())
    }
}

/// An iterator over the [`TermId`]s of a [`TermSet`]
pub struct TermIds<'a> {
    inner: std::slice::Iter<'a, TermId>,
}

impl<'a> TermIds<'a> {
    fn new(inner: std::slice::Iter<'a, TermId>) -> Self {
        Self { inner }
    }
}

impl<'a> Iterator for TermIds<'a> {
    type Item = &'a TermId;
    fn next(&mut self) -> Option<&'a TermId> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for TermIds<'_> {}

impl BitOr for &TermSet {
    type Output = TermSet;

    fn bitor(self, rhs: &TermSet) -> TermSet {
        let (large, small) = if self.len() > rhs.len() {
            (self, rhs)
        } else {
            (rhs, self)
        };
        let mut set = large.clone();
        set.extend(small.ids.iter().cloned());
        set
    }
}

impl BitAnd for &TermSet {
    type Output = TermSet;

    fn bitand(self, rhs: &TermSet) -> TermSet {
        let (large, small) = if self.len() > rhs.len() {
            (self, rhs)
        } else {
            (rhs, self)
        };
        // `small` is sorted, so pushing in order keeps the invariant
        let mut set = TermSet::with_capacity(small.len());
        for id in &small.ids {
            if large.contains(id) {
                set.ids.push(id.clone());
            }
        }
        set
    }
}
