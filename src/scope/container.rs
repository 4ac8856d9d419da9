//! Containers: the processed form of one definition instance.

use std::collections::HashSet;

use indexmap::IndexMap;
use slotmap::new_key_type;

use super::sheet::StyleSheet;
use crate::definition::Definition;
use crate::rules::{NameKind, Rule};
use crate::target::{ResourceId, TargetRuleId};

new_key_type! {
    /// Handle of a container in the runtime's arena.
    pub struct ContainerId;
}

/// A name assigned to a property slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NamedSlot {
    pub name: String,
    pub kind: NameKind,
}

/// Reference count and backing resource of a top-level container.
///
/// `resource` is `Some` exactly when `count > 0`.
#[derive(Debug, Default)]
pub(crate) struct Activation {
    pub count: usize,
    pub resource: Option<ResourceId>,
}

/// Classified rule buckets plus naming and activation state.
#[derive(Debug)]
pub(crate) struct Container {
    pub definition: Definition,
    pub name: String,
    pub parent: Option<ContainerId>,
    /// Top-level container of this hierarchy (itself for top-level containers).
    pub top: ContainerId,
    /// Skips ancestor name lookup.
    pub multiplex: bool,
    pub refs: Vec<StyleSheet>,
    pub vars: Vec<Rule>,
    pub early: Vec<Rule>,
    pub rules: Vec<Rule>,
    /// Containers of nested grouping definitions.
    pub children: Vec<ContainerId>,
    /// Names assigned per property, in assignment order.
    pub names: IndexMap<String, NamedSlot>,
    /// Every name assigned anywhere in this hierarchy. Kept on top-level
    /// containers only.
    pub taken: HashSet<String>,
    pub activation: Activation,
    /// Handle of the inserted `:root` variable block.
    pub var_block: Option<TargetRuleId>,
}

impl Container {
    pub fn new(
        definition: Definition,
        name: String,
        parent: Option<ContainerId>,
        top: ContainerId,
        multiplex: bool,
    ) -> Self {
        Self {
            definition,
            name,
            parent,
            top,
            multiplex,
            refs: Vec::new(),
            vars: Vec::new(),
            early: Vec::new(),
            rules: Vec::new(),
            children: Vec::new(),
            names: IndexMap::new(),
            taken: HashSet::new(),
            activation: Activation::default(),
            var_block: None,
        }
    }

    pub fn is_top_level(&self) -> bool {
        self.parent.is_none()
    }

    /// Every rule this container claimed, in bucket order.
    pub fn claimed_rules(&self) -> impl Iterator<Item = &Rule> {
        self.early.iter().chain(&self.vars).chain(&self.rules)
    }

    /// The aggregated `:root` block for the variable bucket, if non-empty.
    pub fn var_block_text(&self) -> Option<String> {
        let declarations: Vec<String> = self
            .vars
            .iter()
            .filter_map(Rule::var_declaration)
            .collect();
        if declarations.is_empty() {
            return None;
        }
        Some(format!(":root {{ {}; }}", declarations.join("; ")))
    }
}
