//! Unit loading and the dispatch registry.
//!
//! # Architecture
//!
//! - **Loader**: [`UnitLoader`] turns a unit name into a freshly built [`Unit`]
//! - **Catalog**: [`UnitCatalog`] is the stock loader, a name → factory map
//! - **Registry**: [`DispatchRegistry`] holds one immutable snapshot per
//!   namespace and swaps it whole on re-registration

mod dispatch_registry;

pub use dispatch_registry::{DispatchRegistry, NamespaceEntry};

use crate::unit::Unit;
use std::collections::HashMap;
use std::sync::Arc;

/// Loads named units of code for registration.
pub trait UnitLoader: Send + Sync {
    /// Build the unit called `name`, or `None` if no such unit exists.
    fn load(&self, name: &str) -> Option<Unit>;

    /// Names this loader can build, sorted.
    fn available(&self) -> Vec<String>;
}

/// Factory producing a unit.
pub type UnitFactory = Arc<dyn Fn() -> Unit + Send + Sync>;

/// A name → factory map of loadable units.
#[derive(Clone, Default)]
pub struct UnitCatalog {
    factories: HashMap<String, UnitFactory>,
}

impl UnitCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a loadable unit, replacing any factory of the same name.
    pub fn with<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Unit + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}

impl UnitLoader for UnitCatalog {
    fn load(&self, name: &str) -> Option<Unit> {
        self.factories.get(name).map(|factory| factory())
    }

    fn available(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for UnitCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnitCatalog")
            .field("units", &self.available())
            .finish()
    }
}
