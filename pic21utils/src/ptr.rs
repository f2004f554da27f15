//!
//! # Shared-Pointer Types
//!

// Std-lib
use std::hash::{Hash, Hasher};
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, PoisonError, RwLock};

// Crates.io
use by_address::ByAddress;

///
/// # Ptr
///
/// Shared, reference-counted, lockable pointer.
/// Layout cells are held behind [Ptr]s so that one cell definition
/// can be instantiated many times, by many parents, while remaining a single object.
///
/// Access goes through the inner [RwLock]:
///
/// ```text
/// let cell = ptr.read()?;
/// let name = &cell.name;
/// ```
///
/// As with any lock guard, the guard generally wants its own `let` binding,
/// lest it be dropped mid-expression:
/// ```text
/// let name = &ptr.read()?.name; // Fails, guard dropped immediately
/// ```
///
/// Equality and hashing are *by address* (via [ByAddress]).
/// Two [Ptr]s are equal only if they point at the same allocation,
/// which is exactly the identity semantics wanted for shared cells:
/// hierarchy walkers key their hash-maps on cell pointers,
/// and two distinct-but-identical cells remain distinct.
///
#[derive(Debug, Default)]
pub struct Ptr<T: ?Sized>(ByAddress<Arc<RwLock<T>>>);

impl<T> Ptr<T> {
    /// Pointer Constructor
    pub fn new(i: T) -> Self {
        Self(ByAddress(Arc::new(RwLock::new(i))))
    }
    /// Create a new, independent [Ptr] holding a clone of our content.
    /// Unlike [Clone::clone], the result does *not* compare equal to `self`.
    pub fn duplicate(&self) -> Result<Self, PoisonError<()>>
    where
        T: Clone,
    {
        let guard = self.read().map_err(|_| PoisonError::new(()))?;
        Ok(Self::new(guard.clone()))
    }
    /// Number of strong references to our content.
    /// Handy for checking whether a cell is shared among several parents.
    pub fn strong_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }
}
impl<T> From<T> for Ptr<T> {
    fn from(t: T) -> Self {
        Self::new(t)
    }
}
impl<T> Deref for Ptr<T> {
    type Target = ByAddress<Arc<RwLock<T>>>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl<T> DerefMut for Ptr<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}
// The [Deref] implementation gets in the way of `derive`-ing these.
impl<T> Clone for Ptr<T> {
    fn clone(&self) -> Self {
        Self(ByAddress::clone(&self.0))
    }
}
impl<T> PartialEq for Ptr<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}
impl<T> Eq for Ptr<T> {}
impl<T> Hash for Ptr<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

///
/// # Pointer List
///
/// Newtype over [Vec<Ptr>] whose insertion methods hand back the new [Ptr].
/// Everything else forwards to the underlying [Vec] via [Deref] and [DerefMut].
///
#[derive(Debug, Clone)]
pub struct PtrList<T: ?Sized>(Vec<Ptr<T>>);

impl<T> PtrList<T> {
    /// Create a new and empty [PtrList]. Also available via [Default].
    pub fn new() -> Self {
        Self(Vec::new())
    }
    /// Create a [PtrList] from a [Vec] of [Ptr]s.
    pub fn from_ptrs(ptrs: Vec<Ptr<T>>) -> Self {
        Self(ptrs)
    }
    /// Add a `T`-convertible element, returning a [Ptr] to it.
    pub fn add(&mut self, t: impl Into<T>) -> Ptr<T> {
        let t = Ptr::new(t.into());
        self.0.push(t.clone());
        t
    }
    /// Whether `ptr` (by address) is already in the list
    pub fn contains_ptr(&self, ptr: &Ptr<T>) -> bool {
        self.0.iter().any(|p| p == ptr)
    }
}
impl<T> Default for PtrList<T> {
    fn default() -> Self {
        Self::new()
    }
}
impl<T> Deref for PtrList<T> {
    type Target = Vec<Ptr<T>>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl<T> DerefMut for PtrList<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}
impl<T> From<Vec<Ptr<T>>> for PtrList<T> {
    fn from(v: Vec<Ptr<T>>) -> Self {
        Self::from_ptrs(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ptr_identity() {
        let p1 = Ptr::new(String::from("ring"));
        let p2 = Ptr::new(String::from("ring"));
        assert_ne!(p1, p2);

        let p3 = p1.clone();
        assert_eq!(p3, p1);
        assert_eq!(p1.strong_count(), 2);
    }
    #[test]
    fn ptr_duplicate() {
        let p1 = Ptr::new(vec![1, 2, 3]);
        let p2 = p1.duplicate().unwrap();
        assert_ne!(p1, p2);
        p2.write().unwrap().push(4);
        assert_eq!(p1.read().unwrap().len(), 3);
        assert_eq!(p2.read().unwrap().len(), 4);
    }
    #[test]
    fn ptr_list() {
        let mut list = PtrList::<u32>::new();
        let p = list.add(7u32);
        assert_eq!(list.len(), 1);
        assert_eq!(*p.read().unwrap(), 7);
        assert!(list.contains_ptr(&p));
        assert!(!list.contains_ptr(&Ptr::new(7)));
    }
}
