//! Graph walker: classifies a definition's properties into container buckets.

use super::container::{Container, ContainerId};
use super::error::ScopeError;
use super::ownership::{claim, Session};
use super::runtime::Runtime;
use super::sheet::StyleSheet;
use crate::definition::{Definition, DefinitionClass, Property, Reference};
use crate::rules::{Rule, RuleCategory};
use crate::target::StylingTarget;

impl<T: StylingTarget> Runtime<T> {
    /// Walk the definition of container `id` in declaration order.
    ///
    /// Each property is rewritten in place with what the container now owns:
    /// claimed rules (possibly copies) and processed sheets for references.
    pub(super) fn walk(&mut self, id: ContainerId, session: &mut Session) -> Result<(), ScopeError> {
        let Some(definition) = self.containers.get(id).map(|c| c.definition.clone()) else {
            return Ok(());
        };
        let properties = definition.properties();
        session
            .snapshots
            .push((definition.clone(), properties.clone()));

        for (property, value) in properties {
            let processed = self.classify(id, Some(&property), value, session)?;
            definition.set_property(&property, processed);
        }
        Ok(())
    }

    fn classify(
        &mut self,
        id: ContainerId,
        property: Option<&str>,
        value: Property,
        session: &mut Session,
    ) -> Result<Property, ScopeError> {
        match value {
            Property::Rule(rule) => {
                let owned = claim(&rule, id, session);
                self.route(id, property, &owned, session)?;
                Ok(Property::Rule(owned))
            }
            Property::Use(reference) => {
                let sheet = self.resolve_reference(reference)?;
                if let Some(container) = self.containers.get_mut(id) {
                    container.refs.push(sheet.clone());
                }
                Ok(Property::Use(Reference::Sheet(sheet)))
            }
            Property::List(items) => items
                .into_iter()
                .map(|item| self.classify(id, None, item, session))
                .collect::<Result<Vec<_>, _>>()
                .map(Property::List),
            Property::Value(value) => Ok(Property::Value(value)),
        }
    }

    fn resolve_reference(&mut self, reference: Reference) -> Result<StyleSheet, ScopeError> {
        match reference {
            Reference::Class(class) => self.obtain(&class),
            Reference::Definition(definition) => self.process_instance(&definition),
            Reference::Sheet(sheet) => {
                if self.containers.contains_key(sheet.container_id()) {
                    Ok(sheet)
                } else {
                    Err(ScopeError::UnknownSheet)
                }
            }
        }
    }

    fn route(
        &mut self,
        id: ContainerId,
        property: Option<&str>,
        rule: &Rule,
        session: &mut Session,
    ) -> Result<(), ScopeError> {
        match rule.category() {
            RuleCategory::Variable => {
                self.assign_name(id, property, rule)?;
                self.bucket(id, |c| &mut c.vars, rule);
            }
            RuleCategory::Nameable => {
                self.assign_name(id, property, rule)?;
                self.bucket(id, |c| &mut c.rules, rule);
            }
            RuleCategory::Early => self.bucket(id, |c| &mut c.early, rule),
            RuleCategory::Grouping => {
                self.build_group(id, rule, session)?;
                self.bucket(id, |c| &mut c.rules, rule);
            }
            RuleCategory::Other => self.bucket(id, |c| &mut c.rules, rule),
        }
        Ok(())
    }

    fn bucket(&mut self, id: ContainerId, pick: impl FnOnce(&mut Container) -> &mut Vec<Rule>, rule: &Rule) {
        if let Some(container) = self.containers.get_mut(id) {
            pick(container).push(rule.clone());
        }
    }

    fn assign_name(&mut self, id: ContainerId, property: Option<&str>, rule: &Rule) -> Result<(), ScopeError> {
        let Some(kind) = rule.name_kind() else {
            return Ok(());
        };
        let name = self.resolve_name(id, property, kind, rule.name_override())?;
        rule.set_name(name);
        Ok(())
    }

    /// Build the child container of a grouping rule under container `id`.
    fn build_group(&mut self, id: ContainerId, rule: &Rule, session: &mut Session) -> Result<(), ScopeError> {
        let Some(class) = rule.group_class().cloned() else {
            return Ok(());
        };
        let Some(parent) = self.containers.get(id) else {
            return Ok(());
        };
        let (parent_name, top, multiplex) = (parent.name.clone(), parent.top, parent.multiplex);

        let mut ancestor = Some(id);
        while let Some(current) = ancestor.and_then(|a| self.containers.get(a)) {
            if DefinitionClass::ptr_eq(current.definition.class(), &class) {
                return Err(ScopeError::CircularReference {
                    class: class.display_name().to_owned(),
                });
            }
            ancestor = current.parent;
        }

        let owner = self
            .containers
            .get(top)
            .map(|c| c.definition.clone())
            .ok_or(ScopeError::UnknownSheet)?;
        let nested = Definition::construct(&class, Some(&owner)).map_err(|source| {
            ScopeError::Construction {
                class: class.display_name().to_owned(),
                source,
            }
        })?;

        let name = self.group_container_name(id, &parent_name, class.name());
        let child = self.containers.insert(Container::new(
            nested.clone(),
            name.clone(),
            Some(id),
            top,
            multiplex,
        ));
        if let Some(parent) = self.containers.get_mut(id) {
            parent.children.push(child);
        }
        self.instances.insert(nested.key(), child);
        session.containers.push(child);
        session.instances.push(nested.key());
        tracing::debug!(container = %name, kind = rule.kind_label(), "nested container created");

        self.walk(child, session)?;
        rule.set_group(child, nested);
        Ok(())
    }

    /// `{parent}_{Class}`, or `{parent}_{unique}` for anonymous classes,
    /// compact mode, and names a sibling already uses.
    fn group_container_name(&mut self, parent: ContainerId, parent_name: &str, class: Option<&str>) -> String {
        let candidate = match class {
            Some(class) if !self.names.mode().is_compact() => format!("{parent_name}_{class}"),
            _ => return format!("{parent_name}_{}", self.names.unique()),
        };
        let taken = self.containers.get(parent).is_some_and(|p| {
            p.children
                .iter()
                .filter_map(|c| self.containers.get(*c))
                .any(|c| c.name == candidate)
        });
        if taken {
            format!("{parent_name}_{}", self.names.unique())
        } else {
            candidate
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::css::{Styleset, StyleValue};
    use crate::definition::{DefinitionClass, Property};
    use crate::rules::Rule;
    use crate::scope::{Runtime, ScopeError};
    use pretty_assertions::assert_eq;

    #[test]
    fn buckets_follow_declaration_order() {
        let class = DefinitionClass::new("Page", |d| {
            d.add("body", Rule::tag("body", Styleset::new().with("margin", 0)));
            d.add("fonts", Rule::import("fonts.css", None));
            d.add("accent", Rule::var("color", "teal"));
            d.add("card", Rule::class(Styleset::new()));
            d.add("size", StyleValue::px(4.0));
            d.add("svg", Rule::namespace("http://www.w3.org/2000/svg", Some("svg")));
            Ok(())
        });
        let mut rt = Runtime::default();
        let sheet = rt.process(&class).unwrap();
        let container = &rt.containers[sheet.container_id()];

        let labels = |rules: &[Rule]| rules.iter().map(Rule::kind_label).collect::<Vec<_>>();
        assert_eq!(labels(&container.early), vec!["import", "namespace"]);
        assert_eq!(labels(&container.vars), vec!["var"]);
        assert_eq!(labels(&container.rules), vec!["tag", "class"]);
        assert!(matches!(sheet.definition().get("size"), Some(Property::Value(_))));
    }

    #[test]
    fn lists_are_named_anonymously() {
        let class = DefinitionClass::new("List", |d| {
            d.add(
                "items",
                vec![Rule::class(Styleset::new()), Rule::class(Styleset::new())],
            );
            Ok(())
        });
        let mut rt = Runtime::default();
        let sheet = rt.process(&class).unwrap();
        let Some(Property::List(items)) = sheet.definition().get("items") else {
            panic!("items should stay a list");
        };
        let names: Vec<_> = items
            .iter()
            .filter_map(Property::as_rule)
            .filter_map(Rule::name)
            .collect();
        assert_eq!(names, vec!["n1", "n2"]);
    }

    #[test]
    fn references_are_processed_and_recorded() {
        let shared = DefinitionClass::new("Shared", |d| {
            d.add("base", Rule::class(Styleset::new()));
            Ok(())
        });
        let referrer = {
            let shared = shared.clone();
            DefinitionClass::new("Referrer", move |d| {
                d.add("shared", &shared);
                Ok(())
            })
        };
        let mut rt = Runtime::default();
        let sheet = rt.process(&referrer).unwrap();

        let shared_sheet = rt.sheet_for_class(&shared).expect("referenced class processed");
        assert_eq!(
            sheet.definition().get("shared").and_then(|p| p.as_sheet().cloned()),
            Some(shared_sheet.clone())
        );
        assert_eq!(rt.containers[sheet.container_id()].refs, vec![shared_sheet]);
    }

    #[test]
    fn grouping_rules_build_child_containers() {
        let narrow = DefinitionClass::new("Narrow", |d| {
            d.add("card", Rule::class(Styleset::new().with("padding", 0)));
            d.add("extra", Rule::class(Styleset::new()));
            Ok(())
        });
        let class = {
            let narrow = narrow.clone();
            DefinitionClass::new("App", move |d| {
                d.add("card", Rule::class(Styleset::new().with("padding", 8)));
                d.add("narrow", Rule::media("(max-width: 600px)", &narrow));
                Ok(())
            })
        };
        let mut rt = Runtime::default();
        let sheet = rt.process(&class).unwrap();

        let media = sheet.rule("narrow").unwrap();
        let nested = media.rules().expect("nested definition");
        let child = media.group_container().unwrap();
        assert_eq!(rt.containers[child].name, "App_Narrow");
        assert_eq!(rt.containers[child].top, sheet.container_id());
        // same property in an enclosing scope reuses its name
        assert_eq!(nested.rule("card").and_then(|r| r.name()).as_deref(), Some("App_card"));
        assert_eq!(nested.rule("extra").and_then(|r| r.name()).as_deref(), Some("App_Narrow_extra"));
        assert!(nested.owner().is_some());
    }

    #[test]
    fn self_nesting_groups_are_rejected() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let slot: Rc<RefCell<Option<DefinitionClass>>> = Rc::new(RefCell::new(None));
        let looping = {
            let slot = slot.clone();
            DefinitionClass::new("Looping", move |d| {
                if let Some(me) = slot.borrow().as_ref() {
                    d.add("again", Rule::media("print", me));
                }
                Ok(())
            })
        };
        *slot.borrow_mut() = Some(looping.clone());

        let mut rt = Runtime::default();
        assert_eq!(
            rt.process(&looping).unwrap_err(),
            ScopeError::CircularReference {
                class: "Looping".into()
            }
        );
        assert_eq!(rt.container_count(), 0);
        slot.borrow_mut().take();
    }
}
