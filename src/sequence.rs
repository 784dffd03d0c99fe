//! Non-empty ordered resource sequences.
//!
//! [`ResourceSeq`] holds at least one element. Its order is the acquisition
//! order of a scope and the reverse of its release order. Building one from
//! an empty collection fails with [`UsageError::NoResources`], which is the
//! same check [`scope_all`](crate::scope_all) performs up front.
//!
//! # Examples
//!
//! ```
//! use ensconce::{ResourceSeq, UsageError};
//!
//! let seq = ResourceSeq::new(1, vec![2, 3]);
//! assert_eq!(seq.head(), &1);
//! assert_eq!(seq.tail(), &[2, 3]);
//! assert_eq!(seq.len(), 3);
//!
//! let empty = ResourceSeq::<i32>::from_vec(Vec::new());
//! assert_eq!(empty, Err(UsageError::NoResources));
//! ```

use crate::error::UsageError;

/// A sequence guaranteed to contain at least one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSeq<T> {
    head: T,
    tail: Vec<T>,
}

impl<T> ResourceSeq<T> {
    /// Create a sequence from its first element and the rest.
    pub fn new(head: T, tail: Vec<T>) -> Self {
        Self { head, tail }
    }

    /// Create a sequence holding a single element.
    ///
    /// ```
    /// use ensconce::ResourceSeq;
    ///
    /// let seq = ResourceSeq::singleton("only");
    /// assert_eq!(seq.len(), 1);
    /// ```
    pub fn singleton(value: T) -> Self {
        Self::new(value, Vec::new())
    }

    /// Try to create a sequence from a `Vec`.
    ///
    /// Returns [`UsageError::NoResources`] if the vector is empty.
    pub fn from_vec(mut vec: Vec<T>) -> Result<Self, UsageError> {
        if vec.is_empty() {
            return Err(UsageError::NoResources);
        }
        let head = vec.remove(0);
        Ok(Self::new(head, vec))
    }

    /// First element (always present).
    pub fn head(&self) -> &T {
        &self.head
    }

    /// All elements after the first.
    pub fn tail(&self) -> &[T] {
        &self.tail
    }

    /// Last element (always present).
    pub fn last(&self) -> &T {
        self.tail.last().unwrap_or(&self.head)
    }

    /// Number of elements. Always >= 1.
    pub fn len(&self) -> usize {
        1 + self.tail.len()
    }

    /// Always `false`.
    ///
    /// Exists to satisfy clippy's `len_without_is_empty` lint.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Append an element at the end.
    pub fn push(&mut self, value: T) {
        self.tail.push(value);
    }

    /// Split into the first element and the rest.
    pub fn into_parts(self) -> (T, Vec<T>) {
        (self.head, self.tail)
    }

    /// Iterate over the elements in order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        std::iter::once(&self.head).chain(self.tail.iter())
    }

    /// Map every element, preserving order.
    pub fn map<U, F>(self, mut f: F) -> ResourceSeq<U>
    where
        F: FnMut(T) -> U,
    {
        let head = f(self.head);
        ResourceSeq::new(head, self.tail.into_iter().map(f).collect())
    }
}

impl<T> IntoIterator for ResourceSeq<T> {
    type Item = T;
    type IntoIter = std::iter::Chain<std::iter::Once<T>, std::vec::IntoIter<T>>;

    fn into_iter(self) -> Self::IntoIter {
        std::iter::once(self.head).chain(self.tail)
    }
}

impl<T> TryFrom<Vec<T>> for ResourceSeq<T> {
    type Error = UsageError;

    fn try_from(vec: Vec<T>) -> Result<Self, UsageError> {
        Self::from_vec(vec)
    }
}

impl<T> From<ResourceSeq<T>> for Vec<T> {
    fn from(seq: ResourceSeq<T>) -> Vec<T> {
        seq.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_vec_rejects_empty() {
        assert_eq!(
            ResourceSeq::<u8>::from_vec(vec![]),
            Err(UsageError::NoResources)
        );
        assert_eq!(
            ResourceSeq::from_vec(vec![1, 2]),
            Ok(ResourceSeq::new(1, vec![2]))
        );
    }

    #[test]
    fn last_of_singleton_is_head() {
        let seq = ResourceSeq::singleton(7);
        assert_eq!(seq.last(), &7);
        assert!(!seq.is_empty());
    }

    #[test]
    fn push_and_iterate_in_order() {
        let mut seq = ResourceSeq::singleton("a");
        seq.push("b");
        seq.push("c");

        assert_eq!(seq.iter().copied().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(seq.last(), &"c");
        assert_eq!(Vec::from(seq), vec!["a", "b", "c"]);
    }

    #[test]
    fn map_preserves_order() {
        let seq = ResourceSeq::new(1, vec![2, 3]).map(|x| x * 10);
        assert_eq!(seq.into_parts(), (10, vec![20, 30]));
    }

    #[test]
    fn try_from_vec() {
        let seq: Result<ResourceSeq<i32>, _> = vec![4].try_into();
        assert_eq!(seq.map(|s| s.len()), Ok(1));
    }
}
