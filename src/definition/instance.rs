//! Definition instances and their declared properties.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use super::class::{ConstructionError, DefinitionClass};
use crate::css::StyleValue;
use crate::rules::Rule;
use crate::scope::StyleSheet;

// ---------------------------------------------------------------------------
// Property
// ---------------------------------------------------------------------------

/// A cross-reference from one definition to another.
#[derive(Debug, Clone)]
pub enum Reference {
    /// A class, obtained through the registry when the referrer is processed.
    Class(DefinitionClass),
    /// An instance, processed when the referrer is processed.
    Definition(Definition),
    /// An already processed definition.
    Sheet(StyleSheet),
}

/// The value of one declared property.
#[derive(Debug, Clone)]
pub enum Property {
    /// A rule.
    Rule(Rule),
    /// A reference to another definition; activated before the referrer.
    Use(Reference),
    /// Rules, references or nested lists, processed without a name hint.
    List(Vec<Property>),
    /// Plain data; ignored by processing.
    Value(StyleValue),
}

impl Property {
    /// The rule, if this property holds one.
    pub fn as_rule(&self) -> Option<&Rule> {
        match self {
            Property::Rule(rule) => Some(rule),
            _ => None,
        }
    }

    /// The processed sheet, if this property is a processed reference.
    pub fn as_sheet(&self) -> Option<&StyleSheet> {
        match self {
            Property::Use(Reference::Sheet(sheet)) => Some(sheet),
            _ => None,
        }
    }
}

impl From<Rule> for Property {
    fn from(rule: Rule) -> Self {
        Property::Rule(rule)
    }
}

impl From<&Rule> for Property {
    fn from(rule: &Rule) -> Self {
        Property::Rule(rule.clone())
    }
}

impl From<Vec<Rule>> for Property {
    fn from(rules: Vec<Rule>) -> Self {
        Property::List(rules.into_iter().map(Property::Rule).collect())
    }
}

impl From<Vec<Property>> for Property {
    fn from(items: Vec<Property>) -> Self {
        Property::List(items)
    }
}

impl From<&DefinitionClass> for Property {
    fn from(class: &DefinitionClass) -> Self {
        Property::Use(Reference::Class(class.clone()))
    }
}

impl From<Definition> for Property {
    fn from(definition: Definition) -> Self {
        Property::Use(Reference::Definition(definition))
    }
}

impl From<StyleSheet> for Property {
    fn from(sheet: StyleSheet) -> Self {
        Property::Use(Reference::Sheet(sheet))
    }
}

impl From<StyleValue> for Property {
    fn from(value: StyleValue) -> Self {
        Property::Value(value)
    }
}

// ---------------------------------------------------------------------------
// DefinitionBuilder
// ---------------------------------------------------------------------------

/// Collects the properties declared by a class's initializers.
pub struct DefinitionBuilder {
    properties: IndexMap<String, Property>,
    owner: Option<Definition>,
}

impl DefinitionBuilder {
    fn new(owner: Option<Definition>) -> Self {
        Self {
            properties: IndexMap::new(),
            owner,
        }
    }

    /// Declare a property. Redeclaring replaces the value and keeps the
    /// position of the first declaration.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<Property>) -> &mut Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// A property declared so far (including by base classes).
    pub fn get(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }

    /// A rule declared so far under `name`.
    pub fn rule(&self, name: &str) -> Option<Rule> {
        self.get(name).and_then(Property::as_rule).cloned()
    }

    /// The top-level definition this nested definition belongs to.
    ///
    /// `None` for top-level definitions.
    pub fn owner(&self) -> Option<&Definition> {
        self.owner.as_ref()
    }
}

impl fmt::Debug for DefinitionBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefinitionBuilder")
            .field("properties", &self.properties.keys().collect::<Vec<_>>())
            .field("nested", &self.owner.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Definition
// ---------------------------------------------------------------------------

struct DefinitionInner {
    class: DefinitionClass,
    owner: Option<Weak<DefinitionInner>>,
    properties: RefCell<IndexMap<String, Property>>,
}

/// An instance of a definition class. Cloning shares the same instance.
#[derive(Clone)]
pub struct Definition {
    inner: Rc<DefinitionInner>,
}

/// Identity of a definition instance, used as a side-table key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct DefinitionKey(usize);

impl Definition {
    /// Construct a standalone top-level instance of `class`.
    pub fn new(class: &DefinitionClass) -> Result<Self, ConstructionError> {
        Self::construct(class, None)
    }

    /// Construct an instance; `owner` is the top-level definition for nested
    /// grouping definitions.
    pub(crate) fn construct(
        class: &DefinitionClass,
        owner: Option<&Definition>,
    ) -> Result<Self, ConstructionError> {
        let mut builder = DefinitionBuilder::new(owner.cloned());
        class.initialize(&mut builder)?;
        Ok(Self {
            inner: Rc::new(DefinitionInner {
                class: class.clone(),
                owner: owner.map(|o| Rc::downgrade(&o.inner)),
                properties: RefCell::new(builder.properties),
            }),
        })
    }

    /// The class this instance was built from.
    pub fn class(&self) -> &DefinitionClass {
        &self.inner.class
    }

    /// The top-level definition owning this nested one.
    pub fn owner(&self) -> Option<Definition> {
        self.inner
            .owner
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|inner| Definition { inner })
    }

    /// A declared property.
    pub fn get(&self, name: &str) -> Option<Property> {
        self.inner.properties.borrow().get(name).cloned()
    }

    /// The rule declared under `name`.
    ///
    /// After processing this is the rule the container owns, which may be a
    /// copy of the value the initializer supplied.
    pub fn rule(&self, name: &str) -> Option<Rule> {
        self.get(name).and_then(|p| p.as_rule().cloned())
    }

    /// Property names in declaration order.
    pub fn property_names(&self) -> Vec<String> {
        self.inner.properties.borrow().keys().cloned().collect()
    }

    /// Snapshot of all properties in declaration order.
    pub fn properties(&self) -> Vec<(String, Property)> {
        self.inner
            .properties
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Whether two handles refer to the same instance.
    pub fn ptr_eq(a: &Definition, b: &Definition) -> bool {
        Rc::ptr_eq(&a.inner, &b.inner)
    }

    pub(crate) fn key(&self) -> DefinitionKey {
        DefinitionKey(Rc::as_ptr(&self.inner) as usize)
    }

    /// Overwrite a property in place, keeping its position.
    pub(crate) fn set_property(&self, name: &str, value: Property) {
        self.inner
            .properties
            .borrow_mut()
            .insert(name.to_owned(), value);
    }

    pub(crate) fn replace_properties(&self, properties: IndexMap<String, Property>) {
        *self.inner.properties.borrow_mut() = properties;
    }
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Definition");
        s.field("class", &self.inner.class.display_name());
        if let Ok(props) = self.inner.properties.try_borrow() {
            s.field("properties", &props.keys().collect::<Vec<_>>());
        }
        s.finish()
    }
}
