//! Reference-counted insertion into the styling target.
//!
//! Each top-level container is `Inactive` (count 0, no resource) or `Active`
//! (count > 0, one resource). Only the 0→1 and 1→0 transitions touch the
//! target. Insertion order within a resource is: early rules, the aggregated
//! variable block, then ordinary rules in declaration order, with grouping
//! rules inserted wrapper-first.

use super::container::ContainerId;
use super::runtime::Runtime;
use crate::rules::{Rule, RuleCategory};
use crate::target::{InsertParent, StylingTarget, TargetRuleId};

impl<T: StylingTarget> Runtime<T> {
    pub(super) fn activate_container(&mut self, id: ContainerId) {
        let Some(refs) = self.containers.get(id).map(|c| c.refs.clone()) else {
            return;
        };
        for sheet in &refs {
            self.activate_container(sheet.container_id());
        }

        let Some(container) = self.containers.get_mut(id) else {
            return;
        };
        container.activation.count += 1;
        if container.activation.count > 1 {
            return;
        }

        let name = container.name.clone();
        let resource = self.target.create_resource(&name);
        container.activation.resource = Some(resource);
        tracing::debug!(container = %name, "activated");
        self.insert_body(id, InsertParent::Resource(resource));
    }

    pub(super) fn deactivate_container(&mut self, id: ContainerId) {
        let Some(container) = self.containers.get_mut(id) else {
            return;
        };
        if container.activation.count == 0 {
            tracing::debug!(container = %container.name, "already inactive");
            return;
        }
        container.activation.count -= 1;
        let refs = container.refs.clone();

        if container.activation.count == 0 {
            let resource = container.activation.resource.take();
            let name = container.name.clone();
            self.clear_body(id);
            if let Some(resource) = resource {
                self.target.destroy_resource(resource);
            }
            tracing::debug!(container = %name, "deactivated");
        }

        for sheet in refs.iter().rev() {
            self.deactivate_container(sheet.container_id());
        }
    }

    /// Insert the rules of container `id` under `parent`.
    fn insert_body(&mut self, id: ContainerId, parent: InsertParent) {
        let Some(container) = self.containers.get(id) else {
            return;
        };
        let early = container.early.clone();
        let var_block = container.var_block_text();
        let rules = container.rules.clone();

        for rule in &early {
            match parent {
                InsertParent::Resource(_) => self.insert_texts(rule, parent),
                InsertParent::Group(_) => tracing::warn!(
                    kind = rule.kind_label(),
                    "skipping rule that cannot appear inside a grouping rule"
                ),
            }
        }

        if let Some(text) = var_block {
            let handle = self.insert_text(parent, &text);
            if let Some(container) = self.containers.get_mut(id) {
                container.var_block = handle;
            }
        }

        for rule in &rules {
            if rule.category() == RuleCategory::Grouping {
                self.insert_group(rule, parent);
            } else {
                self.insert_texts(rule, parent);
            }
        }
    }

    /// Insert the wrapper of a grouping rule, then its child's rules inside it.
    fn insert_group(&mut self, rule: &Rule, parent: InsertParent) {
        let (Some(text), Some(child)) = (rule.group_text(), rule.group_container()) else {
            return;
        };
        let Some(handle) = self.insert_text(parent, &text) else {
            return;
        };
        rule.push_inserted(handle);

        let refs = self
            .containers
            .get(child)
            .map(|c| c.refs.clone())
            .unwrap_or_default();
        for sheet in &refs {
            self.activate_container(sheet.container_id());
        }
        self.insert_body(child, InsertParent::Group(handle));
    }

    fn insert_texts(&mut self, rule: &Rule, parent: InsertParent) {
        for text in rule.css_texts() {
            if let Some(handle) = self.insert_text(parent, &text) {
                rule.push_inserted(handle);
            }
        }
    }

    fn insert_text(&mut self, parent: InsertParent, text: &str) -> Option<TargetRuleId> {
        match self.target.insert_rule_text(parent, text, None) {
            Ok(handle) => Some(handle),
            Err(err) => {
                tracing::warn!(error = %err, rule = text, "styling target rejected rule");
                None
            }
        }
    }

    /// Forget every inserted handle of container `id` and its children, and
    /// release the references activated for nested containers.
    fn clear_body(&mut self, id: ContainerId) {
        let Some(container) = self.containers.get_mut(id) else {
            return;
        };
        container.var_block = None;
        let rules: Vec<Rule> = container.claimed_rules().cloned().collect();

        for rule in &rules {
            // a rejected wrapper never activated its child's references
            let inserted = rule.is_inserted();
            rule.clear_inserted();
            if let Some(child) = rule.group_container().filter(|_| inserted) {
                self.clear_body(child);
                let refs = self
                    .containers
                    .get(child)
                    .map(|c| c.refs.clone())
                    .unwrap_or_default();
                for sheet in refs.iter().rev() {
                    self.deactivate_container(sheet.container_id());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::css::Styleset;
    use crate::definition::DefinitionClass;
    use crate::rules::Rule;
    use crate::scope::Runtime;
    use pretty_assertions::assert_eq;

    fn card() -> DefinitionClass {
        DefinitionClass::new("Card", |d| {
            d.add("body", Rule::class(Styleset::new().with("padding", "8px")));
            d.add("accent", Rule::var("color", "tomato"));
            Ok(())
        })
    }

    #[test]
    fn only_the_first_activation_inserts() {
        let mut rt = Runtime::default();
        let sheet = rt.activate(&card()).unwrap();
        rt.activate(&sheet).unwrap();

        assert_eq!(rt.activation_count(&sheet), 2);
        assert_eq!(rt.target().stats().resources_created, 1);
        insta::assert_snapshot!(rt.target().render(), @r"
        :root { --Card_accent: tomato; }
        .Card_body { padding: 8px; }
        ");
        assert!(sheet.rule("body").is_some_and(|r| r.is_inserted()));

        rt.deactivate(&sheet);
        assert!(rt.is_active(&sheet));
        assert_eq!(rt.target().resource_count(), 1);

        rt.deactivate(&sheet);
        assert!(!rt.is_active(&sheet));
        assert!(rt.target().is_empty());
        assert!(sheet.rule("body").is_some_and(|r| !r.is_inserted()));
        assert_eq!(rt.target().stats().resources_destroyed, 1);
    }

    #[test]
    fn extra_deactivate_is_a_noop() {
        let mut rt = Runtime::default();
        let sheet = rt.process(&card()).unwrap();
        rt.deactivate(&sheet);
        assert_eq!(rt.activation_count(&sheet), 0);
        assert_eq!(rt.target().stats().resources_destroyed, 0);
    }

    #[test]
    fn referenced_sheets_follow_their_referrers() {
        let base = card();
        let page = {
            let base = base.clone();
            DefinitionClass::new("Page", move |d| {
                d.add("card", &base);
                d.add("main", Rule::class(Styleset::new()));
                Ok(())
            })
        };
        let mut rt = Runtime::default();
        let page_sheet = rt.activate(&page).unwrap();
        let card_sheet = rt.sheet_for_class(&base).unwrap();

        assert_eq!(rt.activation_count(&card_sheet), 1);
        assert_eq!(rt.target().resource_names(), vec!["Card", "Page"]);

        rt.activate(&card_sheet).unwrap();
        rt.deactivate(&page_sheet);
        assert_eq!(rt.activation_count(&card_sheet), 1);
        assert_eq!(rt.target().resource_names(), vec!["Card"]);

        rt.deactivate(&card_sheet);
        assert!(rt.target().is_empty());
    }
}
