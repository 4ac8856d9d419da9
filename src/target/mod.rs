//! Styling targets: where activated rule text goes.
//!
//! The activation engine talks to a [`StylingTarget`] only through four
//! operations. [`MemoryTarget`] is an in-memory implementation that keeps the
//! inserted text as a tree and can render it back as stylesheet text.

pub mod memory;

pub use memory::{MemoryTarget, TargetStats};

use slotmap::new_key_type;

new_key_type! {
    /// Handle of a backing resource (one per active top-level container).
    pub struct ResourceId;
    /// Handle of one inserted rule.
    pub struct TargetRuleId;
}

/// Where a rule text is inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertParent {
    /// Top level of a backing resource.
    Resource(ResourceId),
    /// Inside a previously inserted grouping rule.
    Group(TargetRuleId),
}

/// Errors from a styling target.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("insert parent does not exist")]
    UnknownParent,
    #[error("rule text is empty")]
    EmptyRule,
    #[error("position {position} is out of range (len {len})")]
    OutOfRange { position: usize, len: usize },
    #[error("rule rejected: {reason}")]
    Rejected { reason: String },
}

/// A live destination for rule text, such as a browser stylesheet.
pub trait StylingTarget {
    /// Allocate a new backing resource. `name` identifies its owner.
    fn create_resource(&mut self, name: &str) -> ResourceId;

    /// Insert `text` under `parent` at `position` (appended when `None`).
    fn insert_rule_text(
        &mut self,
        parent: InsertParent,
        text: &str,
        position: Option<usize>,
    ) -> Result<TargetRuleId, TargetError>;

    /// Remove a previously inserted rule and everything inside it.
    fn remove_rule_text(&mut self, rule: TargetRuleId);

    /// Release a backing resource together with all its rules.
    fn destroy_resource(&mut self, resource: ResourceId);
}
