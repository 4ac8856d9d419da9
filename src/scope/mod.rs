//! Definition processing and activation.
//!
//! - [`Runtime`]: process / activate / deactivate entry points.
//! - [`StyleSheet`]: handle to a processed definition.
//! - [`ContainerId`]: arena key of a container.
//! - [`ScopeError`]: why a processing request failed.

mod activation;
pub mod container;
pub mod error;
pub(crate) mod ownership;
mod resolve;
pub mod runtime;
pub mod sheet;
mod walker;

pub use container::ContainerId;
pub use error::ScopeError;
pub use runtime::{DefinitionSource, Runtime, RuntimeConfig};
pub use sheet::StyleSheet;
