//! Definition classes: named, optionally derived rule-set blueprints.
//!
//! A [`DefinitionClass`] pairs an initializer closure with an explicit,
//! precomputed ancestor list. Constructing an instance runs the initializers
//! root-first, so a subclass sees (and may override) everything its bases
//! declared, the same way field initializers of a derived class run after
//! those of its base.

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::instance::DefinitionBuilder;

/// Identity of a definition class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u64);

static NEXT_CLASS_ID: AtomicU64 = AtomicU64::new(1);

impl ClassId {
    fn next() -> Self {
        ClassId(NEXT_CLASS_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Failure raised by a definition initializer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ConstructionError {
    message: String,
}

impl ConstructionError {
    /// Create a construction error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for ConstructionError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for ConstructionError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Initializer that declares a class's properties.
pub type Initializer = dyn Fn(&mut DefinitionBuilder) -> Result<(), ConstructionError>;

struct ClassInner {
    id: ClassId,
    name: Option<String>,
    multiplex: bool,
    /// Nearest base first.
    ancestors: Vec<DefinitionClass>,
    init: Box<Initializer>,
}

/// A definition class. Cloning shares the same class.
#[derive(Clone)]
pub struct DefinitionClass {
    inner: Rc<ClassInner>,
}

impl DefinitionClass {
    /// A named, non-multiplex class without a base.
    pub fn new<F>(name: impl Into<String>, init: F) -> Self
    where
        F: Fn(&mut DefinitionBuilder) -> Result<(), ConstructionError> + 'static,
    {
        ClassBuilder::new().named(name).build(init)
    }

    /// An anonymous class. Its containers get generated names.
    pub fn anonymous<F>(init: F) -> Self
    where
        F: Fn(&mut DefinitionBuilder) -> Result<(), ConstructionError> + 'static,
    {
        ClassBuilder::new().build(init)
    }

    /// A named class deriving from `self`.
    pub fn derive<F>(&self, name: impl Into<String>, init: F) -> Self
    where
        F: Fn(&mut DefinitionBuilder) -> Result<(), ConstructionError> + 'static,
    {
        ClassBuilder::new().named(name).extends(self).build(init)
    }

    /// Start building a class with more options.
    pub fn builder() -> ClassBuilder {
        ClassBuilder::new()
    }

    /// The class identity.
    pub fn id(&self) -> ClassId {
        self.inner.id
    }

    /// The class name, if any.
    pub fn name(&self) -> Option<&str> {
        self.inner.name.as_deref()
    }

    /// Whether every processing request creates a fresh instance.
    pub fn is_multiplex(&self) -> bool {
        self.inner.multiplex
    }

    /// The immediate base class.
    pub fn base(&self) -> Option<&DefinitionClass> {
        self.inner.ancestors.first()
    }

    /// All ancestors, nearest first.
    pub fn ancestors(&self) -> &[DefinitionClass] {
        &self.inner.ancestors
    }

    /// Whether two handles refer to the same class.
    pub fn ptr_eq(a: &DefinitionClass, b: &DefinitionClass) -> bool {
        Rc::ptr_eq(&a.inner, &b.inner)
    }

    /// Run the initializers of every ancestor (root first) and then this class.
    pub(crate) fn initialize(&self, builder: &mut DefinitionBuilder) -> Result<(), ConstructionError> {
        for ancestor in self.inner.ancestors.iter().rev() {
            (ancestor.inner.init)(builder)?;
        }
        (self.inner.init)(builder)
    }

    /// Name used in logs: the class name or `<anonymous>`.
    pub(crate) fn display_name(&self) -> &str {
        self.name().unwrap_or("<anonymous>")
    }
}

impl fmt::Debug for DefinitionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefinitionClass")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("multiplex", &self.inner.multiplex)
            .field("ancestors", &self.inner.ancestors.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// ClassBuilder
// ---------------------------------------------------------------------------

/// Builder for [`DefinitionClass`].
#[derive(Debug, Default)]
pub struct ClassBuilder {
    name: Option<String>,
    base: Option<DefinitionClass>,
    multiplex: bool,
}

impl ClassBuilder {
    /// Create a builder for an anonymous, base-less, non-multiplex class.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the class name (builder).
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the base class (builder).
    pub fn extends(mut self, base: &DefinitionClass) -> Self {
        self.base = Some(base.clone());
        self
    }

    /// Mark the class multiplex (builder).
    pub fn multiplex(mut self) -> Self {
        self.multiplex = true;
        self
    }

    /// Finish the class with its initializer.
    pub fn build<F>(self, init: F) -> DefinitionClass
    where
        F: Fn(&mut DefinitionBuilder) -> Result<(), ConstructionError> + 'static,
    {
        let ancestors = match self.base {
            Some(base) => {
                let mut list = Vec::with_capacity(base.ancestors().len() + 1);
                list.push(base.clone());
                list.extend(base.ancestors().iter().cloned());
                list
            }
            None => Vec::new(),
        };

        DefinitionClass {
            inner: Rc::new(ClassInner {
                id: ClassId::next(),
                name: self.name.filter(|n| !n.is_empty()),
                multiplex: self.multiplex,
                ancestors,
                init: Box::new(init),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::Styleset;
    use crate::definition::Definition;
    use crate::rules::Rule;

    #[test]
    fn ids_are_distinct() {
        let a = DefinitionClass::new("A", |_| Ok(()));
        let b = DefinitionClass::new("A", |_| Ok(()));
        assert_ne!(a.id(), b.id());
        assert!(!DefinitionClass::ptr_eq(&a, &b));
        assert!(DefinitionClass::ptr_eq(&a, &a.clone()));
    }

    #[test]
    fn ancestors_nearest_first() {
        let a = DefinitionClass::new("A", |_| Ok(()));
        let b = a.derive("B", |_| Ok(()));
        let c = b.derive("C", |_| Ok(()));

        let names: Vec<_> = c.ancestors().iter().map(|k| k.name()).collect();
        assert_eq!(names, vec![Some("B"), Some("A")]);
        assert_eq!(c.base().and_then(DefinitionClass::name), Some("B"));
        assert!(a.base().is_none());
    }

    #[test]
    fn builder_options() {
        let base = DefinitionClass::anonymous(|_| Ok(()));
        let row = DefinitionClass::builder()
            .named("Row")
            .extends(&base)
            .multiplex()
            .build(|_| Ok(()));
        assert!(row.is_multiplex());
        assert_eq!(row.name(), Some("Row"));
        assert_eq!(row.ancestors().len(), 1);
        assert!(base.name().is_none());
        assert_eq!(base.display_name(), "<anonymous>");
    }

    #[test]
    fn empty_name_is_anonymous() {
        let class = DefinitionClass::new("", |_| Ok(()));
        assert!(class.name().is_none());
    }

    #[test]
    fn initializers_run_root_first_and_overrides_keep_position() {
        let base = DefinitionClass::new("Base", |d| {
            d.add("a", Rule::class(Styleset::new()));
            d.add("b", Rule::class(Styleset::new().with("color", "red")));
            Ok(())
        });
        let derived = base.derive("Derived", |d| {
            assert!(d.rule("a").is_some(), "base properties are visible");
            d.add("c", Rule::class(Styleset::new()));
            d.add("b", Rule::id(Styleset::new()));
            Ok(())
        });

        let instance = Definition::new(&derived).expect("construct");
        assert_eq!(instance.property_names(), vec!["a", "b", "c"]);
        assert_eq!(instance.rule("b").map(|r| r.kind_label()), Some("id"));
    }

    #[test]
    fn construction_error_propagates() {
        let broken = DefinitionClass::new("Broken", |_| Err("no theme".into()));
        let err = Definition::new(&broken).expect_err("should fail");
        assert_eq!(err.message(), "no theme");
        assert_eq!(err.to_string(), "no theme");
    }
}
