//! Stylesets: ordered property declarations with nested sub-blocks.
//!
//! A [`Styleset`] is the payload of every style-bearing rule. Property names
//! may be given in camelCase (`backgroundColor`) or kebab-case
//! (`background-color`); both serialize to kebab-case. Custom properties
//! (`--name`) are emitted as written.

use heck::ToKebabCase;

use super::value::StyleValue;

/// A single property declaration, e.g. `color: red !important`.
#[derive(Debug, Clone)]
pub struct Declaration {
    /// The property name as given by the author.
    pub property: String,
    /// The property value.
    pub value: StyleValue,
    /// Whether `!important` is emitted after the value.
    pub important: bool,
}

impl Declaration {
    /// Create a new declaration.
    pub fn new(property: impl Into<String>, value: impl Into<StyleValue>, important: bool) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
            important,
        }
    }

    /// Serialize as `name: value` (with `!important` when flagged).
    pub fn to_css(&self) -> String {
        let mut text = format!("{}: {}", css_property_name(&self.property), self.value.to_css());
        if self.important {
            text.push_str(" !important");
        }
        text
    }
}

/// An ordered block of declarations plus nested selector blocks.
///
/// Nested blocks are keyed either by a suffix appended to the owning rule's
/// selector (`":hover"`, `"::after"`) or by a template where `&` stands for
/// that selector (`"li > &"`).
#[derive(Debug, Clone, Default)]
pub struct Styleset {
    declarations: Vec<Declaration>,
    nested: Vec<(String, Styleset)>,
}

impl Styleset {
    /// Create an empty styleset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property (builder). Re-setting a property replaces its value in place.
    pub fn with(mut self, property: impl Into<String>, value: impl Into<StyleValue>) -> Self {
        self.set(Declaration::new(property, value, false));
        self
    }

    /// Set a property flagged `!important` (builder).
    pub fn with_important(
        mut self,
        property: impl Into<String>,
        value: impl Into<StyleValue>,
    ) -> Self {
        self.set(Declaration::new(property, value, true));
        self
    }

    /// Add a nested block (builder).
    pub fn with_nested(mut self, selector: impl Into<String>, styleset: Styleset) -> Self {
        self.nested.push((selector.into(), styleset));
        self
    }

    /// Insert or replace a declaration, keeping the original position on replace.
    pub fn set(&mut self, declaration: Declaration) {
        match self
            .declarations
            .iter_mut()
            .find(|d| d.property == declaration.property)
        {
            Some(existing) => *existing = declaration,
            None => self.declarations.push(declaration),
        }
    }

    /// The declarations in insertion order.
    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    /// Look up a declaration by property name.
    pub fn get(&self, property: &str) -> Option<&Declaration> {
        self.declarations.iter().find(|d| d.property == property)
    }

    /// Whether there are no declarations and no nested blocks.
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty() && self.nested.is_empty()
    }

    /// Serialize the declarations as a `{ ... }` block.
    pub fn to_css_block(&self) -> String {
        if self.declarations.is_empty() {
            return "{}".to_owned();
        }
        let body: String = self
            .declarations
            .iter()
            .map(|d| format!("{}; ", d.to_css()))
            .collect();
        format!("{{ {body}}}")
    }

    /// Produce the rule texts for `selector`: the block itself, then every
    /// nested block depth-first in declaration order.
    pub fn to_css_rules(&self, selector: &str) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_rules(selector, &mut out);
        out
    }

    fn collect_rules(&self, selector: &str, out: &mut Vec<String>) {
        out.push(format!("{selector} {}", self.to_css_block()));
        for (key, nested) in &self.nested {
            let nested_selector = if key.contains('&') {
                key.replace('&', selector)
            } else {
                format!("{selector}{key}")
            };
            nested.collect_rules(&nested_selector, out);
        }
    }
}

/// Convert an author property name to its CSS form.
pub fn css_property_name(property: &str) -> String {
    if property.starts_with("--") {
        property.to_owned()
    } else {
        property.to_kebab_case()
    }
}
