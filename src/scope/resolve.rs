//! Name resolution for nameable rules.
//!
//! A property slot's name is looked up, in order, in the container itself,
//! its enclosing grouping containers, and the top-level containers of the
//! top-level class's ancestors. A hit is reused; a miss generates a fresh
//! scoped name. The resolved name is recorded on the container so that later
//! lookups (subclasses, nested groups) find it.

use super::container::{ContainerId, NamedSlot};
use super::error::ScopeError;
use super::runtime::Runtime;
use crate::rules::{NameKind, NameOverride};
use crate::target::StylingTarget;

impl<T: StylingTarget> Runtime<T> {
    pub(super) fn resolve_name(
        &mut self,
        id: ContainerId,
        property: Option<&str>,
        kind: NameKind,
        name_override: Option<&NameOverride>,
    ) -> Result<String, ScopeError> {
        let Some(property) = property else {
            let name = match name_override {
                Some(name_override) => overridden_name(name_override, "<anonymous>")?,
                None => self.names.unique(),
            };
            self.record_taken(id, &name);
            tracing::trace!(%name, %kind, "anonymous name assigned");
            return Ok(name);
        };

        let existing = self.lookup_slot(id, property);
        if let Some(slot) = &existing {
            if slot.kind != kind {
                return Err(ScopeError::KindMismatch {
                    property: property.to_owned(),
                    existing: slot.kind,
                    requested: kind,
                });
            }
        }

        let name = match (name_override, existing) {
            (Some(name_override), _) => overridden_name(name_override, property)?,
            (None, Some(slot)) => slot.name,
            (None, None) => self.generate_name(id, property),
        };

        if let Some(container) = self.containers.get_mut(id) {
            container.names.insert(
                property.to_owned(),
                NamedSlot {
                    name: name.clone(),
                    kind,
                },
            );
        }
        self.record_taken(id, &name);
        tracing::trace!(%property, %name, %kind, "name assigned");
        Ok(name)
    }

    /// A fresh name for `property`, distinct from every name already taken in
    /// the hierarchy of container `id`.
    ///
    /// `{scope}_{property}` can repeat across nesting levels (`Narrow_x` in
    /// `App` and `x` in `App_Narrow`); a clash falls back to `{scope}_{unique}`.
    fn generate_name(&mut self, id: ContainerId, property: &str) -> String {
        let Some(container) = self.containers.get(id) else {
            return self.names.unique();
        };
        let (scope, top) = (container.name.clone(), container.top);
        let mut name = self.names.scoped(&scope, property);
        while self
            .containers
            .get(top)
            .is_some_and(|t| t.taken.contains(&name))
        {
            name = format!("{scope}_{}", self.names.unique());
        }
        name
    }

    fn record_taken(&mut self, id: ContainerId, name: &str) {
        let top = self.containers.get(id).map(|c| c.top);
        if let Some(top) = top.and_then(|t| self.containers.get_mut(t)) {
            top.taken.insert(name.to_owned());
        }
    }

    /// The slot already named `property` in scope of container `id`.
    fn lookup_slot(&self, id: ContainerId, property: &str) -> Option<NamedSlot> {
        let mut current = Some(id);
        while let Some(container) = current.and_then(|c| self.containers.get(c)) {
            if let Some(slot) = container.names.get(property) {
                return Some(slot.clone());
            }
            current = container.parent;
        }

        let top = self.containers.get(id).and_then(|c| self.containers.get(c.top))?;
        if top.multiplex {
            return None;
        }
        top.definition
            .class()
            .ancestors()
            .iter()
            .filter_map(|ancestor| self.classes.get(&ancestor.id()))
            .filter_map(|sheet| self.containers.get(sheet.container_id()))
            .find_map(|container| container.names.get(property).cloned())
    }
}

fn overridden_name(name_override: &NameOverride, property: &str) -> Result<String, ScopeError> {
    match name_override {
        NameOverride::Literal(name) => Ok(name.clone()),
        NameOverride::From(rule) => rule.name().ok_or_else(|| ScopeError::UnresolvedNameOverride {
            property: property.to_owned(),
        }),
    }
}
