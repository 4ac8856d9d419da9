//! Selector builder: a token accumulator that can reference named rules.
//!
//! Class and ID items hold the [`Rule`] itself, so a selector built before
//! processing picks up the generated name when it is serialized.

use crate::rules::Rule;

/// One item of a selector.
#[derive(Debug, Clone)]
pub enum SelectorItem {
    /// Verbatim selector text (`li`, ` > `, `:hover`).
    Text(String),
    /// `.name` of a class rule.
    Class(Rule),
    /// `#name` of an ID rule.
    Id(Rule),
}

/// A selector assembled from text and rule references.
#[derive(Debug, Clone, Default)]
pub struct Selector {
    items: Vec<SelectorItem>,
}

impl Selector {
    /// Create an empty selector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append verbatim text (builder).
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.items.push(SelectorItem::Text(text.into()));
        self
    }

    /// Append a class reference (builder).
    pub fn class(mut self, rule: &Rule) -> Self {
        self.items.push(SelectorItem::Class(rule.clone()));
        self
    }

    /// Append an ID reference (builder).
    pub fn id(mut self, rule: &Rule) -> Self {
        self.items.push(SelectorItem::Id(rule.clone()));
        self
    }

    /// Append a child combinator (builder).
    pub fn child(self) -> Self {
        self.text(" > ")
    }

    /// Append a descendant combinator (builder).
    pub fn descendant(self) -> Self {
        self.text(" ")
    }

    /// The items in order.
    pub fn items(&self) -> &[SelectorItem] {
        &self.items
    }

    /// Serialize to selector text.
    pub fn to_selector_text(&self) -> String {
        self.items
            .iter()
            .map(|item| match item {
                SelectorItem::Text(text) => text.clone(),
                SelectorItem::Class(rule) => format!(".{}", rule.name().unwrap_or_default()),
                SelectorItem::Id(rule) => format!("#{}", rule.name().unwrap_or_default()),
            })
            .collect()
    }
}

impl From<&str> for Selector {
    fn from(text: &str) -> Self {
        Selector::new().text(text)
    }
}

impl From<String> for Selector {
    fn from(text: String) -> Self {
        Selector::new().text(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::Styleset;

    #[test]
    fn plain_text() {
        assert_eq!(Selector::from("ul > li").to_selector_text(), "ul > li");
    }

    #[test]
    fn rule_references_use_assigned_names() {
        let nav = Rule::class(Styleset::new());
        let main = Rule::id(Styleset::new());
        let selector = Selector::new().id(&main).descendant().class(&nav).text(":hover");

        nav.set_name("App_nav".into());
        main.set_name("App_main".into());

        assert_eq!(selector.to_selector_text(), "#App_main .App_nav:hover");
        assert_eq!(selector.items().len(), 4);
    }

    #[test]
    fn child_combinator() {
        let selector = Selector::new().text("ul").child().text("li");
        assert_eq!(selector.to_selector_text(), "ul > li");
    }
}
