//! Definition classes and instances.
//!
//! - [`DefinitionClass`]: initializer plus explicit ancestor list.
//! - [`Definition`]: an instance: properties in declaration order.
//! - [`DefinitionBuilder`]: what initializers declare properties on.

pub mod class;
pub mod instance;

pub use class::{ClassBuilder, ClassId, ConstructionError, DefinitionClass, Initializer};
pub use instance::{Definition, DefinitionBuilder, Property, Reference};

pub(crate) use instance::DefinitionKey;
