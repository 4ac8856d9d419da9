//! # stylescope
//!
//! Scoped, reference-counted style rules declared as values on a definition
//! graph.
//!
//! A [`DefinitionClass`] declares rules (classes, ids, keyframes, custom
//! properties, `@media` blocks, ...) as named properties. The [`Runtime`]
//! walks a definition, gives every nameable rule a collision-free scoped name
//! (reusing the names of inherited slots), and inserts the resulting rule text
//! into a [`StylingTarget`] while at least one activation is outstanding.
//!
//! ## Core Systems
//!
//! - **[`css`]**: Value serializer and selector builder: `StyleValue`, `Styleset`, `Selector`
//! - **[`rules`]**: Rule values with tagged kinds, and the name registry
//! - **[`definition`]**: Definition classes, instances and their properties
//! - **[`scope`]**: Graph walker, name resolver, ownership, activation engine
//! - **[`target`]**: Styling-target trait and an in-memory implementation
//!
//! ```
//! use stylescope::css::Styleset;
//! use stylescope::{DefinitionClass, Rule, Runtime};
//!
//! let theme = DefinitionClass::new("Theme", |d| {
//!     d.add("button", Rule::class(Styleset::new().with("color", "white")));
//!     Ok(())
//! });
//!
//! let mut runtime = Runtime::default();
//! let sheet = runtime.activate(&theme).unwrap();
//! assert_eq!(sheet.name_of("button").as_deref(), Some("Theme_button"));
//! assert_eq!(runtime.target().render(), ".Theme_button { color: white; }");
//!
//! runtime.deactivate(&sheet);
//! assert!(runtime.target().is_empty());
//! ```

// Collaborators
pub mod css;
pub mod target;

// Core systems
pub mod definition;
pub mod rules;
pub mod scope;

pub use definition::{ConstructionError, Definition, DefinitionBuilder, DefinitionClass, Property};
pub use rules::{NameOverride, NamingMode, Rule};
pub use scope::{Runtime, RuntimeConfig, ScopeError, StyleSheet};
pub use target::{MemoryTarget, StylingTarget};

// Proc macros (feature-gated)
#[cfg(feature = "macros")]
pub use stylescope_macros::styleset;
