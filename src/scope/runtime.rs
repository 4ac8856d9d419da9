//! Public processing and activation surface.

use std::collections::{HashMap, HashSet};

use slotmap::SlotMap;

use super::container::{Container, ContainerId};
use super::error::ScopeError;
use super::ownership::Session;
use super::sheet::StyleSheet;
use crate::definition::{ClassId, Definition, DefinitionClass, DefinitionKey};
use crate::rules::{NameGenerator, NamingMode};
use crate::target::{MemoryTarget, StylingTarget};

// ---------------------------------------------------------------------------
// RuntimeConfig
// ---------------------------------------------------------------------------

/// Configuration for a [`Runtime`].
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    /// Naming mode at startup.
    pub naming: NamingMode,
}

impl RuntimeConfig {
    /// Create a new default config (verbose names).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the naming mode (builder).
    pub fn with_naming(mut self, naming: NamingMode) -> Self {
        self.naming = naming;
        self
    }

    /// Start in compact naming mode with an optional prefix (builder).
    pub fn with_optimized_names(mut self, prefix: Option<&str>) -> Self {
        self.naming = NamingMode::compact(prefix);
        self
    }
}

// ---------------------------------------------------------------------------
// DefinitionSource
// ---------------------------------------------------------------------------

/// Anything that can be processed: a class, an instance, or a processed sheet.
#[derive(Debug, Clone)]
pub enum DefinitionSource {
    Class(DefinitionClass),
    Definition(Definition),
    Sheet(StyleSheet),
}

impl From<&DefinitionClass> for DefinitionSource {
    fn from(class: &DefinitionClass) -> Self {
        DefinitionSource::Class(class.clone())
    }
}

impl From<DefinitionClass> for DefinitionSource {
    fn from(class: DefinitionClass) -> Self {
        DefinitionSource::Class(class)
    }
}

impl From<&Definition> for DefinitionSource {
    fn from(definition: &Definition) -> Self {
        DefinitionSource::Definition(definition.clone())
    }
}

impl From<Definition> for DefinitionSource {
    fn from(definition: Definition) -> Self {
        DefinitionSource::Definition(definition)
    }
}

impl From<&StyleSheet> for DefinitionSource {
    fn from(sheet: &StyleSheet) -> Self {
        DefinitionSource::Sheet(sheet.clone())
    }
}

impl From<StyleSheet> for DefinitionSource {
    fn from(sheet: StyleSheet) -> Self {
        DefinitionSource::Sheet(sheet)
    }
}

// ---------------------------------------------------------------------------
// Runtime
// ---------------------------------------------------------------------------

/// Owns the name registry, the container arena and the styling target.
///
/// Single-threaded: every call runs to completion before the next begins.
pub struct Runtime<T: StylingTarget = MemoryTarget> {
    pub(super) target: T,
    pub(super) names: NameGenerator,
    pub(super) containers: SlotMap<ContainerId, Container>,
    /// Memoized top-level sheets of non-multiplex classes.
    pub(super) classes: HashMap<ClassId, StyleSheet>,
    /// Every processed instance, by identity.
    pub(super) instances: HashMap<DefinitionKey, ContainerId>,
    /// Classes whose processing is under way.
    pub(super) in_progress: HashSet<ClassId>,
    /// Instances whose containers are being walked.
    pub(super) walking: HashSet<DefinitionKey>,
}

impl Default for Runtime<MemoryTarget> {
    fn default() -> Self {
        Self::new(MemoryTarget::new())
    }
}

impl<T: StylingTarget> Runtime<T> {
    /// Create a runtime with default configuration.
    pub fn new(target: T) -> Self {
        Self::with_config(target, RuntimeConfig::default())
    }

    /// Create a runtime with the given configuration.
    pub fn with_config(target: T, config: RuntimeConfig) -> Self {
        Self {
            target,
            names: NameGenerator::new(config.naming),
            containers: SlotMap::with_key(),
            classes: HashMap::new(),
            instances: HashMap::new(),
            in_progress: HashSet::new(),
            walking: HashSet::new(),
        }
    }

    // -- public surface -----------------------------------------------------

    /// Process a definition, building its container on first request.
    ///
    /// Non-multiplex classes and explicit instances are memoized; a second
    /// request returns the same sheet and assigns no names.
    pub fn process(&mut self, source: impl Into<DefinitionSource>) -> Result<StyleSheet, ScopeError> {
        let result = match source.into() {
            DefinitionSource::Class(class) => self.obtain(&class),
            DefinitionSource::Definition(definition) => self.process_instance(&definition),
            DefinitionSource::Sheet(sheet) => self.check_sheet(&sheet).map(|_| sheet),
        };
        if let Err(err) = &result {
            tracing::error!(error = %err, "definition processing failed");
        }
        result
    }

    /// Process (if needed) and activate a definition.
    ///
    /// The first net activation creates a backing resource and inserts the
    /// container's rules; later activations only bump the reference count.
    pub fn activate(&mut self, source: impl Into<DefinitionSource>) -> Result<StyleSheet, ScopeError> {
        let sheet = self.process(source)?;
        let container = self.check_sheet(&sheet)?;
        if !container.is_top_level() {
            return Err(ScopeError::NotTopLevel {
                name: container.name.clone(),
            });
        }
        self.activate_container(sheet.container_id());
        Ok(sheet)
    }

    /// Release one activation. A no-op for inactive or unknown sheets.
    pub fn deactivate(&mut self, sheet: &StyleSheet) {
        match self.containers.get(sheet.container_id()) {
            Some(container) if container.is_top_level() => {
                self.deactivate_container(sheet.container_id());
            }
            Some(container) => {
                tracing::debug!(container = %container.name, "ignoring deactivate of nested sheet");
            }
            None => tracing::debug!("ignoring deactivate of unknown sheet"),
        }
    }

    /// Switch between verbose and compact names. Names already assigned are
    /// kept.
    pub fn use_optimized_names(&mut self, enable: bool, prefix: Option<&str>) {
        let mode = if enable {
            NamingMode::compact(prefix)
        } else {
            NamingMode::Verbose
        };
        self.names.set_mode(mode);
    }

    /// The current naming mode.
    pub fn naming_mode(&self) -> &NamingMode {
        self.names.mode()
    }

    /// Drop an inactive, unreferenced sheet that is not memoized by its class.
    ///
    /// Its rules are released so they can be claimed again. Returns whether
    /// anything was removed.
    pub fn discard(&mut self, sheet: &StyleSheet) -> bool {
        let id = sheet.container_id();
        let Some(container) = self.containers.get(id) else {
            return false;
        };
        let memoized = self
            .classes
            .get(&container.definition.class().id())
            .is_some_and(|s| s.container_id() == id);
        if !container.is_top_level() || container.activation.count > 0 || memoized {
            return false;
        }
        // references are not indexed, so this scans every container
        let referenced = self
            .containers
            .values()
            .any(|c| c.refs.iter().any(|r| r.container_id() == id));
        if referenced {
            return false;
        }

        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(removed) = self.containers.remove(current) else {
                continue;
            };
            self.instances.remove(&removed.definition.key());
            for rule in removed.claimed_rules() {
                rule.release();
            }
            stack.extend(removed.children);
        }
        tracing::debug!(container = ?id, "discarded sheet");
        true
    }

    // -- queries ------------------------------------------------------------

    /// Whether the sheet currently holds a backing resource.
    pub fn is_active(&self, sheet: &StyleSheet) -> bool {
        self.activation_count(sheet) > 0
    }

    /// Net activation count of the sheet.
    pub fn activation_count(&self, sheet: &StyleSheet) -> usize {
        self.containers
            .get(sheet.container_id())
            .map_or(0, |c| c.activation.count)
    }

    /// The container name (the scope of its generated names).
    pub fn container_name(&self, sheet: &StyleSheet) -> Option<&str> {
        self.containers
            .get(sheet.container_id())
            .map(|c| c.name.as_str())
    }

    /// The memoized sheet of a non-multiplex class, if processed.
    pub fn sheet_for_class(&self, class: &DefinitionClass) -> Option<StyleSheet> {
        self.classes.get(&class.id()).cloned()
    }

    /// Number of live containers, nested ones included.
    pub fn container_count(&self) -> usize {
        self.containers.len()
    }

    /// The styling target.
    pub fn target(&self) -> &T {
        &self.target
    }

    /// The styling target, mutably.
    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    // -- processing ---------------------------------------------------------

    fn check_sheet(&self, sheet: &StyleSheet) -> Result<&Container, ScopeError> {
        self.containers
            .get(sheet.container_id())
            .filter(|c| Definition::ptr_eq(&c.definition, sheet.definition()))
            .ok_or(ScopeError::UnknownSheet)
    }

    /// The sheet of a class: memoized unless multiplex.
    pub(super) fn obtain(&mut self, class: &DefinitionClass) -> Result<StyleSheet, ScopeError> {
        if !class.is_multiplex() {
            if let Some(sheet) = self.classes.get(&class.id()) {
                return Ok(sheet.clone());
            }
        }
        if !self.in_progress.insert(class.id()) {
            return Err(ScopeError::CircularReference {
                class: class.display_name().to_owned(),
            });
        }
        let result = self.build_class(class);
        self.in_progress.remove(&class.id());

        let sheet = result?;
        if !class.is_multiplex() {
            self.classes.insert(class.id(), sheet.clone());
        }
        Ok(sheet)
    }

    fn build_class(&mut self, class: &DefinitionClass) -> Result<StyleSheet, ScopeError> {
        if !class.is_multiplex() {
            self.process_ancestors(class)?;
        }
        let definition = Definition::construct(class, None).map_err(|source| {
            ScopeError::Construction {
                class: class.display_name().to_owned(),
                source,
            }
        })?;
        let name = self.class_container_name(class);
        self.build_top_level(definition, name, class.is_multiplex())
    }

    /// Explicit instances are memoized by identity.
    pub(super) fn process_instance(&mut self, definition: &Definition) -> Result<StyleSheet, ScopeError> {
        if self.walking.contains(&definition.key()) {
            return Err(ScopeError::CircularReference {
                class: definition.class().display_name().to_owned(),
            });
        }
        if let Some(&id) = self.instances.get(&definition.key()) {
            return Ok(StyleSheet::new(definition.clone(), id));
        }
        let class = definition.class();
        if definition.owner().is_some() {
            return Err(ScopeError::NotTopLevel {
                name: class.display_name().to_owned(),
            });
        }
        if !class.is_multiplex() {
            self.process_ancestors(class)?;
        }
        let name = self.instance_container_name(class);
        self.build_top_level(definition.clone(), name, class.is_multiplex())
    }

    /// Ancestor containers must exist before their names can be inherited.
    fn process_ancestors(&mut self, class: &DefinitionClass) -> Result<(), ScopeError> {
        for ancestor in class.ancestors().iter().rev() {
            if !ancestor.is_multiplex() {
                self.obtain(ancestor)?;
            }
        }
        Ok(())
    }

    fn build_top_level(
        &mut self,
        definition: Definition,
        name: String,
        multiplex: bool,
    ) -> Result<StyleSheet, ScopeError> {
        let key = definition.key();
        let id = self.containers.insert_with_key(|id| {
            Container::new(definition.clone(), name.clone(), None, id, multiplex)
        });
        self.instances.insert(key, id);
        tracing::debug!(container = %name, multiplex, "container created");

        let mut session = Session::default();
        session.containers.push(id);
        session.instances.push(key);
        self.walking.insert(key);
        let walked = self.walk(id, &mut session);
        self.walking.remove(&key);
        match walked {
            Ok(()) => Ok(StyleSheet::new(definition, id)),
            Err(err) => {
                self.rollback(session);
                Err(err)
            }
        }
    }

    /// Undo everything a failed request registered.
    fn rollback(&mut self, session: Session) {
        for key in &session.instances {
            self.instances.remove(key);
        }
        for id in session.containers.iter().rev() {
            self.containers.remove(*id);
        }
        for rule in &session.rules {
            rule.release();
        }
        for (definition, properties) in session.snapshots {
            definition.replace_properties(properties.into_iter().collect());
        }
    }

    // -- container names ----------------------------------------------------

    fn class_container_name(&mut self, class: &DefinitionClass) -> String {
        if self.names.mode().is_compact() {
            return self.names.unique();
        }
        match class.name() {
            Some(name) if class.is_multiplex() => format!("{}_{name}", self.names.unique()),
            Some(name) if self.top_level_name_taken(name) => {
                format!("{}_{name}", self.names.unique())
            }
            Some(name) => name.to_owned(),
            None => self.names.unique(),
        }
    }

    fn instance_container_name(&mut self, class: &DefinitionClass) -> String {
        let unique = self.names.unique();
        match class.name() {
            Some(name) if !self.names.mode().is_compact() => format!("{unique}_{name}"),
            _ => unique,
        }
    }

    fn top_level_name_taken(&self, name: &str) -> bool {
        self.containers
            .values()
            .any(|c| c.is_top_level() && c.name == name)
    }
}

impl<T: StylingTarget> std::fmt::Debug for Runtime<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("naming", self.names.mode())
            .field("containers", &self.containers.len())
            .field("classes", &self.classes.len())
            .finish()
    }
}
