// SPDX-License-Identifier: MIT OR Apache-2.0
//! Process-wide table of easing strategies.
//!
//! Entries are keyed by the strategy's type identity and by display name, and
//! carry the factory used to build fresh instances. Plugins register their
//! strategies here; timelines only ever query it.

use crate::curve::Curve;
use crate::strategy::{EasingFunction, PrimitiveEasing};
use crate::{EasingError, Result};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::any::TypeId;
use std::fmt;
use std::sync::OnceLock;

/// Builds a fresh strategy instance
pub type EasingFactory = fn() -> Box<dyn EasingFunction>;

fn create_default<T: EasingFunction + Default>() -> Box<dyn EasingFunction> {
    Box::new(T::default())
}

/// Registry metadata for one strategy type
#[derive(Clone)]
pub struct EasingDescriptor {
    type_id: TypeId,
    name: String,
    options: &'static [&'static str],
    factory: EasingFactory,
}

impl EasingDescriptor {
    /// Describe strategy type `T`, built through its `Default` impl
    pub fn of<T: EasingFunction + Default>(name: impl Into<String>) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: name.into(),
            options: &[],
            factory: create_default::<T>,
        }
    }

    /// Describe strategy type `T` with an explicit factory
    pub fn with_factory<T: EasingFunction>(name: impl Into<String>, factory: EasingFactory) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: name.into(),
            options: &[],
            factory,
        }
    }

    /// Attach the selector options shown for the strategy's parameter
    pub fn with_options(mut self, options: &'static [&'static str]) -> Self {
        self.options = options;
        self
    }

    /// Type identity of the described strategy
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Get the display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter options for editors
    pub fn options(&self) -> &'static [&'static str] {
        self.options
    }

    /// Build a new strategy instance
    pub fn create(&self) -> Box<dyn EasingFunction> {
        (self.factory)()
    }
}

impl fmt::Debug for EasingDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EasingDescriptor")
            .field("name", &self.name)
            .field("options", &self.options.len())
            .finish_non_exhaustive()
    }
}

impl PartialEq for EasingDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.name == other.name
    }
}

/// Table of known easing strategies, in registration order
#[derive(Debug, Default)]
pub struct EasingRegistry {
    entries: IndexMap<TypeId, EasingDescriptor>,
}

impl EasingRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in strategies
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.entries.insert(
            TypeId::of::<PrimitiveEasing>(),
            EasingDescriptor::of::<PrimitiveEasing>(PrimitiveEasing::NAME).with_options(&Curve::NAMES),
        );
        registry
    }

    /// Add a strategy type.
    ///
    /// Fails if either the type or the display name is already taken.
    pub fn register(&mut self, descriptor: EasingDescriptor) -> Result<()> {
        if self.entries.contains_key(&descriptor.type_id) || self.contains_name(&descriptor.name) {
            return Err(EasingError::AlreadyRegistered(descriptor.name));
        }
        tracing::debug!(name = %descriptor.name, "registered easing strategy");
        self.entries.insert(descriptor.type_id, descriptor);
        Ok(())
    }

    /// Remove a strategy type, returning its descriptor
    pub fn unregister(&mut self, type_id: TypeId) -> Option<EasingDescriptor> {
        self.entries.shift_remove(&type_id)
    }

    /// Look up by type identity
    pub fn find(&self, type_id: TypeId) -> Option<&EasingDescriptor> {
        self.entries.get(&type_id)
    }

    /// Look up by display name
    pub fn find_by_name(&self, name: &str) -> Result<&EasingDescriptor> {
        tracing::trace!(name, "easing lookup");
        self.entries
            .values()
            .find(|d| d.name == name)
            .ok_or_else(|| EasingError::NotFound(name.to_string()))
    }

    /// Check whether a display name is taken
    pub fn contains_name(&self, name: &str) -> bool {
        self.entries.values().any(|d| d.name == name)
    }

    /// First registered entry
    pub fn default_descriptor(&self) -> Option<&EasingDescriptor> {
        self.entries.first().map(|(_, d)| d)
    }

    /// All entries in registration order
    pub fn descriptors(&self) -> impl Iterator<Item = &EasingDescriptor> {
        self.entries.values()
    }

    /// Get entry count
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the registry has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

static GLOBAL: OnceLock<RwLock<EasingRegistry>> = OnceLock::new();

/// The process-wide registry, seeded with the built-in strategies
pub fn global() -> &'static RwLock<EasingRegistry> {
    GLOBAL.get_or_init(|| RwLock::new(EasingRegistry::with_builtins()))
}
