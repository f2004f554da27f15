//!
//! # Dependency-Ordering Trait and Helpers
//!

// Std-lib
use std::collections::HashSet;
use std::marker::PhantomData;

///
/// # Dependency-Ordering Trait
///
/// Cell hierarchies are graphs: each cell depends on the cells it instantiates.
/// Stream formats want definitions written dependencies-first,
/// and hierarchy walkers want to know about cycles before recursing into them.
///
/// Implementers provide `process`, which visits a single `item`
/// and passes each of its direct dependencies to `orderer.push`.
/// [DepOrderer::push] recursively visits those dependencies first,
/// and reports a cycle through `fail` if it re-enters an item still being processed.
///
/// ```text
/// struct CellOrder;
/// impl DepOrder for CellOrder {
///     type Item = Ptr<Cell>;
///     type Error = MyError;
///     fn process(item: &Self::Item, orderer: &mut DepOrderer<Self>) -> Result<(), Self::Error> {
///         for child in item.read()?.children() {
///             orderer.push(&child)?;
///         }
///         Ok(())
///     }
///     fn fail() -> Result<(), Self::Error> {
///         Err(MyError::Cycle)
///     }
/// }
/// let ordered = CellOrder::order(&tops)?;
/// ```
///
pub trait DepOrder: Sized {
    /// Item Type. Typically pointers or keys to the nodes in the dependency graph.
    type Item: Clone + Eq + std::hash::Hash;
    /// Error Type
    type Error;

    /// Dependency-order all entries in slice `items`
    fn order(items: &[Self::Item]) -> Result<Vec<Self::Item>, Self::Error> {
        DepOrderer::<Self>::order(items)
    }

    /// Process a single `item`, pushing each of its dependencies
    fn process(item: &Self::Item, orderer: &mut DepOrderer<Self>) -> Result<(), Self::Error>;
    /// Failure-handler, called on cycles. Return our `Error` type.
    fn fail() -> Result<(), Self::Error>;
}

/// # Dependency Order Helper
/// Public solely for use in the call-signature of [DepOrder::process].
pub struct DepOrderer<P: DepOrder> {
    /// Ordered, completed items
    stack: Vec<P::Item>,
    /// Completed items, for quick membership tests
    seen: HashSet<P::Item>,
    /// Items with an open recursive frame, for cycle detection
    pending: HashSet<P::Item>,
    p: PhantomData<P>,
}
impl<P: DepOrder> DepOrderer<P> {
    /// Dependency-order all entries in slice `items`
    pub fn order(items: &[P::Item]) -> Result<Vec<P::Item>, P::Error> {
        let len = items.len();
        let mut this = Self {
            stack: Vec::with_capacity(len),
            seen: HashSet::with_capacity(len),
            pending: HashSet::new(),
            p: PhantomData,
        };
        for item in items.iter() {
            this.push(item)?;
        }
        Ok(this.stack)
    }
    /// Push `item`'s dependencies, and then itself, onto the stack
    pub fn push(&mut self, item: &P::Item) -> Result<(), P::Error> {
        if self.seen.contains(item) {
            return Ok(());
        }
        if self.pending.contains(item) {
            return P::fail();
        }
        self.pending.insert(item.clone());
        P::process(item, self)?;
        if !self.pending.remove(item) {
            return P::fail();
        }
        self.seen.insert(item.clone());
        self.stack.push(item.clone());
        Ok(())
    }
}
