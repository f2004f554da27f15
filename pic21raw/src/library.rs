//!
//! # Component Library
//!
//! The "layout context": an explicit registry of named, shared [Component]s.
//!

// Std-Lib
use std::collections::HashSet;

// Crates.io
use indexmap::IndexMap;

// Local imports
use crate::{
    data::Component,
    error::LayoutResult,
    utils::{Ptr, PtrList},
};

/// # Component Library
///
/// Owns a set of uniquely named [Component]s.
/// Registering a name already in use assigns it a suffixed name: `name_1`, `name_2`, and so on.
/// [Library::get_or_create] memoizes generators by name, so that identical parameters
/// (and hence identical names) produce one shared cell.
///
#[derive(Debug, Clone, Default)]
pub struct Library {
    /// Library Name
    pub name: String,
    /// Component Definitions, keyed by name
    cells: IndexMap<String, Ptr<Component>>,
    /// Every name ever assigned
    names: HashSet<String>,
}
impl Library {
    /// Create a new and empty Library
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
    /// Produce a name based on `base` which is not yet in use
    pub fn uniquify(&self, base: &str) -> String {
        if !self.names.contains(base) {
            return base.to_string();
        }
        let mut i = 1;
        loop {
            let name = format!("{}_{}", base, i);
            if !self.names.contains(&name) {
                return name;
            }
            i += 1;
        }
    }
    /// Add `comp`, renaming it if its name is already taken.
    /// Returns a shared pointer to the registered [Component].
    pub fn add(&mut self, mut comp: Component) -> Ptr<Component> {
        let name = self.uniquify(&comp.name);
        if name != comp.name {
            tracing::debug!("renaming component `{}` to `{}`", comp.name, name);
        }
        comp.name = name.clone();
        let ptr = Ptr::new(comp);
        self.names.insert(name.clone());
        self.cells.insert(name, ptr.clone());
        ptr
    }
    /// Get the [Component] named `name`, if present
    pub fn get(&self, name: &str) -> Option<Ptr<Component>> {
        self.cells.get(name).cloned()
    }
    /// Boolean indication of whether a [Component] named `name` is present
    pub fn contains(&self, name: &str) -> bool {
        self.cells.contains_key(name)
    }
    /// Get the [Component] named `name`, or create it with `build` if not present.
    /// The created [Component] is renamed to `name`.
    pub fn get_or_create<F>(&mut self, name: &str, build: F) -> LayoutResult<Ptr<Component>>
    where
        F: FnOnce() -> LayoutResult<Component>,
    {
        if let Some(ptr) = self.cells.get(name) {
            return Ok(ptr.clone());
        }
        let mut comp = build()?;
        comp.name = name.to_string();
        Ok(self.add(comp))
    }
    /// Number of registered components
    pub fn len(&self) -> usize {
        self.cells.len()
    }
    /// Boolean indication of whether we are empty
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
    /// All registered components, in registration order
    pub fn cells(&self) -> PtrList<Component> {
        PtrList::from_ptrs(self.cells.values().cloned().collect())
    }
    /// Convert to a GDSII library
    pub fn to_gds(&self) -> LayoutResult<gds21::GdsLibrary> {
        crate::gds::GdsExporter::export(self)
    }
    /// Export to GDSII file `fname`
    pub fn save_gds(&self, fname: impl AsRef<std::path::Path>) -> LayoutResult<()> {
        self.to_gds()?.save(fname)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniquify_names() {
        let mut lib = Library::new("lib");
        let a = lib.add(Component::new("ring"));
        let b = lib.add(Component::new("ring"));
        let c = lib.add(Component::new("ring"));
        assert_eq!(a.read().unwrap().name, "ring");
        assert_eq!(b.read().unwrap().name, "ring_1");
        assert_eq!(c.read().unwrap().name, "ring_2");
        assert_eq!(lib.len(), 3);
        assert!(a != b);
    }
    #[test]
    fn memoized_generators() -> LayoutResult<()> {
        let mut lib = Library::new("lib");
        let mut calls = 0;
        let a = lib.get_or_create("straight_L10", || {
            calls += 1;
            Ok(Component::new("anything"))
        })?;
        let b = lib.get_or_create("straight_L10", || {
            calls += 1;
            Ok(Component::new("anything"))
        })?;
        assert_eq!(calls, 1);
        assert!(a == b);
        assert_eq!(a.read()?.name, "straight_L10");
        Ok(())
    }
}
