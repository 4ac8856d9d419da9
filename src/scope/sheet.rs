//! Handle to a processed definition.

use super::container::ContainerId;
use crate::definition::Definition;
use crate::rules::Rule;

/// A processed definition: the instance plus the container built from it.
///
/// Returned by [`Runtime::process`](super::Runtime::process) and
/// [`Runtime::activate`](super::Runtime::activate). Cloning is cheap.
#[derive(Debug, Clone)]
pub struct StyleSheet {
    definition: Definition,
    container: ContainerId,
}

impl StyleSheet {
    pub(crate) fn new(definition: Definition, container: ContainerId) -> Self {
        Self {
            definition,
            container,
        }
    }

    /// The processed definition instance.
    pub fn definition(&self) -> &Definition {
        &self.definition
    }

    /// The rule processed under `property`.
    pub fn rule(&self, property: &str) -> Option<Rule> {
        self.definition.rule(property)
    }

    /// The name assigned to the rule under `property`.
    pub fn name_of(&self, property: &str) -> Option<String> {
        self.rule(property).and_then(|r| r.name())
    }

    /// The container handle.
    pub fn container_id(&self) -> ContainerId {
        self.container
    }
}

impl PartialEq for StyleSheet {
    fn eq(&self, other: &Self) -> bool {
        self.container == other.container && Definition::ptr_eq(&self.definition, &other.definition)
    }
}

impl Eq for StyleSheet {}
