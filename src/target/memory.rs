//! In-memory styling target backed by slotmap arenas.
//!
//! Resources and rules live in two `SlotMap`s. Each rule records its parent so
//! that removal detaches it in O(siblings) and drops its subtree.

use std::collections::VecDeque;

use slotmap::SlotMap;

use super::{InsertParent, ResourceId, StylingTarget, TargetError, TargetRuleId};

#[derive(Debug)]
struct Resource {
    name: String,
    rules: Vec<TargetRuleId>,
}

#[derive(Debug)]
struct RuleNode {
    text: String,
    parent: InsertParent,
    children: Vec<TargetRuleId>,
}

/// Counters of target operations, for checking lifecycle guarantees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TargetStats {
    pub resources_created: usize,
    pub resources_destroyed: usize,
    pub rules_inserted: usize,
    pub rules_removed: usize,
}

/// A styling target that keeps everything in memory.
#[derive(Debug, Default)]
pub struct MemoryTarget {
    resources: SlotMap<ResourceId, Resource>,
    rules: SlotMap<TargetRuleId, RuleNode>,
    /// Live resources in creation order.
    order: Vec<ResourceId>,
    stats: TargetStats,
}

impl MemoryTarget {
    /// Create an empty target.
    pub fn new() -> Self {
        Self::default()
    }

    /// Operation counters.
    pub fn stats(&self) -> TargetStats {
        self.stats
    }

    /// Number of live resources.
    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    /// Number of live rules across all resources.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Whether no resource is live.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Names of live resources in creation order.
    pub fn resource_names(&self) -> Vec<&str> {
        self.order
            .iter()
            .filter_map(|id| self.resources.get(*id))
            .map(|r| r.name.as_str())
            .collect()
    }

    /// The live resource with the given name.
    pub fn resource_named(&self, name: &str) -> Option<ResourceId> {
        self.order
            .iter()
            .copied()
            .find(|id| self.resources.get(*id).is_some_and(|r| r.name == name))
    }

    /// The raw text of an inserted rule (grouping rules keep their `{}`).
    pub fn rule_text(&self, rule: TargetRuleId) -> Option<&str> {
        self.rules.get(rule).map(|r| r.text.as_str())
    }

    /// Top-level rule texts of a resource, one entry per rule, with grouping
    /// rules rendered including their children.
    pub fn rule_texts(&self, resource: ResourceId) -> Vec<String> {
        self.resources
            .get(resource)
            .map(|r| r.rules.iter().map(|id| self.render_rule(*id)).collect())
            .unwrap_or_default()
    }

    /// The whole resource as stylesheet text, one top-level rule per line.
    pub fn css_text(&self, resource: ResourceId) -> String {
        self.rule_texts(resource).join("\n")
    }

    /// Every live resource's text, separated by blank lines, in creation order.
    pub fn render(&self) -> String {
        self.order
            .iter()
            .map(|id| self.css_text(*id))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn render_rule(&self, id: TargetRuleId) -> String {
        let Some(node) = self.rules.get(id) else {
            return String::new();
        };
        if node.children.is_empty() {
            return node.text.clone();
        }
        let head = node.text.trim_end().trim_end_matches("{}").trim_end();
        let body = node
            .children
            .iter()
            .map(|child| self.render_rule(*child))
            .collect::<Vec<_>>()
            .join(" ");
        format!("{head} {{ {body} }}")
    }

    fn children_mut(&mut self, parent: InsertParent) -> Option<&mut Vec<TargetRuleId>> {
        match parent {
            InsertParent::Resource(id) => self.resources.get_mut(id).map(|r| &mut r.rules),
            InsertParent::Group(id) => self.rules.get_mut(id).map(|r| &mut r.children),
        }
    }

    /// Drop `root` and its subtree without touching the parent's child list.
    fn drop_subtree(&mut self, root: TargetRuleId) {
        let mut queue = VecDeque::from([root]);
        while let Some(current) = queue.pop_front() {
            if let Some(node) = self.rules.remove(current) {
                queue.extend(node.children);
                self.stats.rules_removed += 1;
            }
        }
    }
}

impl StylingTarget for MemoryTarget {
    fn create_resource(&mut self, name: &str) -> ResourceId {
        let id = self.resources.insert(Resource {
            name: name.to_owned(),
            rules: Vec::new(),
        });
        self.order.push(id);
        self.stats.resources_created += 1;
        id
    }

    fn insert_rule_text(
        &mut self,
        parent: InsertParent,
        text: &str,
        position: Option<usize>,
    ) -> Result<TargetRuleId, TargetError> {
        if text.trim().is_empty() {
            return Err(TargetError::EmptyRule);
        }
        let len = self
            .children_mut(parent)
            .ok_or(TargetError::UnknownParent)?
            .len();
        let position = position.unwrap_or(len);
        if position > len {
            return Err(TargetError::OutOfRange { position, len });
        }

        let id = self.rules.insert(RuleNode {
            text: text.to_owned(),
            parent,
            children: Vec::new(),
        });
        if let Some(siblings) = self.children_mut(parent) {
            siblings.insert(position, id);
        }
        self.stats.rules_inserted += 1;
        Ok(id)
    }

    fn remove_rule_text(&mut self, rule: TargetRuleId) {
        let Some(parent) = self.rules.get(rule).map(|r| r.parent) else {
            return;
        };
        if let Some(siblings) = self.children_mut(parent) {
            siblings.retain(|&child| child != rule);
        }
        self.drop_subtree(rule);
    }

    fn destroy_resource(&mut self, resource: ResourceId) {
        let Some(removed) = self.resources.remove(resource) else {
            return;
        };
        for rule in removed.rules {
            self.drop_subtree(rule);
        }
        self.order.retain(|&id| id != resource);
        self.stats.resources_destroyed += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn append_and_render() {
        let mut target = MemoryTarget::new();
        let sheet = target.create_resource("App");
        let parent = InsertParent::Resource(sheet);
        target.insert_rule_text(parent, ".a { color: red; }", None).unwrap();
        target.insert_rule_text(parent, ".b {}", None).unwrap();

        assert_eq!(target.css_text(sheet), ".a { color: red; }\n.b {}");
        assert_eq!(target.resource_names(), vec!["App"]);
        assert_eq!(target.resource_named("App"), Some(sheet));
    }

    #[test]
    fn insert_at_position() {
        let mut target = MemoryTarget::new();
        let sheet = target.create_resource("S");
        let parent = InsertParent::Resource(sheet);
        target.insert_rule_text(parent, ".b {}", None).unwrap();
        target.insert_rule_text(parent, ".a {}", Some(0)).unwrap();
        assert_eq!(target.rule_texts(sheet), vec![".a {}", ".b {}"]);

        let err = target.insert_rule_text(parent, ".c {}", Some(5)).unwrap_err();
        assert_eq!(err, TargetError::OutOfRange { position: 5, len: 2 });
    }

    #[test]
    fn rejects_empty_text_and_unknown_parent() {
        let mut target = MemoryTarget::new();
        let sheet = target.create_resource("S");
        assert_eq!(
            target.insert_rule_text(InsertParent::Resource(sheet), "  ", None),
            Err(TargetError::EmptyRule)
        );
        target.destroy_resource(sheet);
        assert_eq!(
            target.insert_rule_text(InsertParent::Resource(sheet), ".a {}", None),
            Err(TargetError::UnknownParent)
        );
    }

    #[test]
    fn grouping_rules_render_children() {
        let mut target = MemoryTarget::new();
        let sheet = target.create_resource("S");
        let media = target
            .insert_rule_text(InsertParent::Resource(sheet), "@media screen {}", None)
            .unwrap();
        target
            .insert_rule_text(InsertParent::Group(media), ".a { color: red; }", None)
            .unwrap();
        target
            .insert_rule_text(InsertParent::Group(media), ".b { color: blue; }", None)
            .unwrap();

        assert_eq!(
            target.css_text(sheet),
            "@media screen { .a { color: red; } .b { color: blue; } }"
        );
        assert_eq!(target.rule_text(media), Some("@media screen {}"));
    }

    #[test]
    fn remove_drops_subtree() {
        let mut target = MemoryTarget::new();
        let sheet = target.create_resource("S");
        let keep = target
            .insert_rule_text(InsertParent::Resource(sheet), ".keep {}", None)
            .unwrap();
        let media = target
            .insert_rule_text(InsertParent::Resource(sheet), "@media print {}", None)
            .unwrap();
        target
            .insert_rule_text(InsertParent::Group(media), ".a {}", None)
            .unwrap();

        target.remove_rule_text(media);
        assert_eq!(target.rule_count(), 1);
        assert_eq!(target.rule_texts(sheet), vec![".keep {}"]);
        assert_eq!(target.rule_text(keep), Some(".keep {}"));
        assert_eq!(target.stats().rules_removed, 2);

        // removing twice is harmless
        target.remove_rule_text(media);
        assert_eq!(target.rule_count(), 1);
    }

    #[test]
    fn destroy_resource_releases_everything() {
        let mut target = MemoryTarget::new();
        let a = target.create_resource("A");
        let b = target.create_resource("B");
        let media = target
            .insert_rule_text(InsertParent::Resource(a), "@media print {}", None)
            .unwrap();
        target
            .insert_rule_text(InsertParent::Group(media), ".x {}", None)
            .unwrap();
        target
            .insert_rule_text(InsertParent::Resource(b), ".y {}", None)
            .unwrap();

        target.destroy_resource(a);
        assert_eq!(target.resource_count(), 1);
        assert_eq!(target.rule_count(), 1);
        assert_eq!(target.render(), ".y {}");
        assert_eq!(
            target.stats(),
            TargetStats {
                resources_created: 2,
                resources_destroyed: 1,
                rules_inserted: 3,
                rules_removed: 2,
            }
        );

        target.destroy_resource(b);
        assert!(target.is_empty());
        assert_eq!(target.render(), "");
    }
}
