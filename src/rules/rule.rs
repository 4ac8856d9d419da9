//! Rule values: tagged rule kinds with per-instance processing state.
//!
//! A [`Rule`] is a cheap, shareable handle. Authors may place the same handle
//! in several definitions; the processing state (owner, name, inserted
//! handles) lives behind the handle, and a second owner receives a structural
//! copy instead (see [`crate::scope::ownership`]).

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::css::{Selector, StyleValue, Styleset};
use crate::definition::{Definition, DefinitionClass};
use crate::scope::ContainerId;
use crate::target::TargetRuleId;

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Bucket a rule is routed to while walking a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleCategory {
    /// Carries a generated name (class, ID, keyframes, counter).
    Nameable,
    /// Custom CSS property; emitted in one aggregated `:root` block.
    Variable,
    /// Must precede every other rule in the resource (`@import`, `@namespace`).
    Early,
    /// Wraps a nested definition (`@media`, `@supports`).
    Grouping,
    /// Anything else (tag, selector, `@font-face`, `@page`).
    Other,
}

/// The kind of name a nameable rule carries.
///
/// Two slots sharing a property name must agree on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Class,
    Id,
    Animation,
    Counter,
    Var,
}

impl fmt::Display for NameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NameKind::Class => "class",
            NameKind::Id => "id",
            NameKind::Animation => "animation",
            NameKind::Counter => "counter",
            NameKind::Var => "var",
        })
    }
}

/// Explicit name for a nameable rule instead of a generated one.
#[derive(Debug, Clone)]
pub enum NameOverride {
    /// Use this name verbatim.
    Literal(String),
    /// Reuse the name already assigned to another rule.
    From(Rule),
}

impl From<&str> for NameOverride {
    fn from(name: &str) -> Self {
        NameOverride::Literal(name.to_owned())
    }
}

impl From<String> for NameOverride {
    fn from(name: String) -> Self {
        NameOverride::Literal(name)
    }
}

impl From<&Rule> for NameOverride {
    fn from(rule: &Rule) -> Self {
        NameOverride::From(rule.clone())
    }
}

// ---------------------------------------------------------------------------
// Keyframes
// ---------------------------------------------------------------------------

/// Position of a keyframe within an animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Waypoint {
    From,
    To,
    Percent(f64),
}

impl fmt::Display for Waypoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Waypoint::From => f.write_str("from"),
            Waypoint::To => f.write_str("to"),
            Waypoint::Percent(p) => write!(f, "{p}%"),
        }
    }
}

/// A single keyframe of a `@keyframes` rule.
#[derive(Debug, Clone)]
pub struct Keyframe {
    pub waypoint: Waypoint,
    pub style: Styleset,
}

impl Keyframe {
    /// Create a keyframe.
    pub fn new(waypoint: Waypoint, style: Styleset) -> Self {
        Self { waypoint, style }
    }
}

// ---------------------------------------------------------------------------
// RuleKind
// ---------------------------------------------------------------------------

/// Kind-specific payload of a rule.
#[derive(Debug, Clone)]
pub enum RuleKind {
    Class {
        style: Styleset,
        name: Option<NameOverride>,
    },
    Id {
        style: Styleset,
        name: Option<NameOverride>,
    },
    Tag {
        tag: String,
        style: Styleset,
    },
    Style {
        selector: Selector,
        style: Styleset,
    },
    Keyframes {
        frames: Vec<Keyframe>,
        name: Option<NameOverride>,
    },
    Var {
        /// Property whose value syntax the variable follows, e.g. `"color"`.
        template: String,
        value: StyleValue,
        name: Option<NameOverride>,
    },
    Counter {
        name: Option<NameOverride>,
    },
    Import {
        url: String,
        media: Option<String>,
    },
    Namespace {
        namespace: String,
        prefix: Option<String>,
    },
    FontFace {
        descriptors: Styleset,
    },
    Page {
        pseudo: Option<String>,
        style: Styleset,
    },
    Media {
        query: String,
        definition: DefinitionClass,
    },
    Supports {
        condition: String,
        definition: DefinitionClass,
    },
}

impl RuleKind {
    /// Bucket this kind is routed to.
    pub fn category(&self) -> RuleCategory {
        match self {
            RuleKind::Class { .. }
            | RuleKind::Id { .. }
            | RuleKind::Keyframes { .. }
            | RuleKind::Counter { .. } => RuleCategory::Nameable,
            RuleKind::Var { .. } => RuleCategory::Variable,
            RuleKind::Import { .. } | RuleKind::Namespace { .. } => RuleCategory::Early,
            RuleKind::Media { .. } | RuleKind::Supports { .. } => RuleCategory::Grouping,
            RuleKind::Tag { .. }
            | RuleKind::Style { .. }
            | RuleKind::FontFace { .. }
            | RuleKind::Page { .. } => RuleCategory::Other,
        }
    }

    /// The kind of name this rule carries, if nameable.
    pub fn name_kind(&self) -> Option<NameKind> {
        match self {
            RuleKind::Class { .. } => Some(NameKind::Class),
            RuleKind::Id { .. } => Some(NameKind::Id),
            RuleKind::Keyframes { .. } => Some(NameKind::Animation),
            RuleKind::Counter { .. } => Some(NameKind::Counter),
            RuleKind::Var { .. } => Some(NameKind::Var),
            _ => None,
        }
    }

    /// Short label used in logs and debug output.
    pub fn label(&self) -> &'static str {
        match self {
            RuleKind::Class { .. } => "class",
            RuleKind::Id { .. } => "id",
            RuleKind::Tag { .. } => "tag",
            RuleKind::Style { .. } => "style",
            RuleKind::Keyframes { .. } => "keyframes",
            RuleKind::Var { .. } => "var",
            RuleKind::Counter { .. } => "counter",
            RuleKind::Import { .. } => "import",
            RuleKind::Namespace { .. } => "namespace",
            RuleKind::FontFace { .. } => "font-face",
            RuleKind::Page { .. } => "page",
            RuleKind::Media { .. } => "media",
            RuleKind::Supports { .. } => "supports",
        }
    }

    fn name_override(&self) -> Option<&NameOverride> {
        match self {
            RuleKind::Class { name, .. }
            | RuleKind::Id { name, .. }
            | RuleKind::Keyframes { name, .. }
            | RuleKind::Var { name, .. }
            | RuleKind::Counter { name } => name.as_ref(),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Rule
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct RuleState {
    owner: Option<ContainerId>,
    name: Option<String>,
    group: Option<GroupLink>,
    inserted: Vec<TargetRuleId>,
}

/// Child container built for a grouping rule.
#[derive(Debug, Clone)]
struct GroupLink {
    container: ContainerId,
    definition: Definition,
}

struct RuleInner {
    kind: RuleKind,
    state: RefCell<RuleState>,
}

/// A styling rule. Cloning the handle shares the same rule.
#[derive(Clone)]
pub struct Rule {
    inner: Rc<RuleInner>,
}

impl Rule {
    /// Wrap a kind into a fresh, unowned rule.
    pub fn from_kind(kind: RuleKind) -> Self {
        Self {
            inner: Rc::new(RuleInner {
                kind,
                state: RefCell::new(RuleState::default()),
            }),
        }
    }

    /// A class rule (`.name { ... }`).
    pub fn class(style: Styleset) -> Self {
        Self::from_kind(RuleKind::Class { style, name: None })
    }

    /// A class rule with an explicit name.
    pub fn class_named(style: Styleset, name: impl Into<NameOverride>) -> Self {
        Self::from_kind(RuleKind::Class {
            style,
            name: Some(name.into()),
        })
    }

    /// An ID rule (`#name { ... }`).
    pub fn id(style: Styleset) -> Self {
        Self::from_kind(RuleKind::Id { style, name: None })
    }

    /// An ID rule with an explicit name.
    pub fn id_named(style: Styleset, name: impl Into<NameOverride>) -> Self {
        Self::from_kind(RuleKind::Id {
            style,
            name: Some(name.into()),
        })
    }

    /// A rule for an element tag.
    pub fn tag(tag: impl Into<String>, style: Styleset) -> Self {
        Self::from_kind(RuleKind::Tag {
            tag: tag.into(),
            style,
        })
    }

    /// A rule for an arbitrary selector.
    pub fn style(selector: impl Into<Selector>, style: Styleset) -> Self {
        Self::from_kind(RuleKind::Style {
            selector: selector.into(),
            style,
        })
    }

    /// A `@keyframes` rule.
    pub fn keyframes(frames: Vec<Keyframe>) -> Self {
        Self::from_kind(RuleKind::Keyframes { frames, name: None })
    }

    /// A `@keyframes` rule with an explicit name.
    pub fn keyframes_named(frames: Vec<Keyframe>, name: impl Into<NameOverride>) -> Self {
        Self::from_kind(RuleKind::Keyframes {
            frames,
            name: Some(name.into()),
        })
    }

    /// A custom CSS property.
    pub fn var(template: impl Into<String>, value: impl Into<StyleValue>) -> Self {
        Self::from_kind(RuleKind::Var {
            template: template.into(),
            value: value.into(),
            name: None,
        })
    }

    /// A custom CSS property with an explicit name.
    pub fn var_named(
        template: impl Into<String>,
        value: impl Into<StyleValue>,
        name: impl Into<NameOverride>,
    ) -> Self {
        Self::from_kind(RuleKind::Var {
            template: template.into(),
            value: value.into(),
            name: Some(name.into()),
        })
    }

    /// A named counter. Counters produce no CSS text.
    pub fn counter() -> Self {
        Self::from_kind(RuleKind::Counter { name: None })
    }

    /// A counter with an explicit name.
    pub fn counter_named(name: impl Into<NameOverride>) -> Self {
        Self::from_kind(RuleKind::Counter {
            name: Some(name.into()),
        })
    }

    /// An `@import` rule.
    pub fn import(url: impl Into<String>, media: Option<&str>) -> Self {
        Self::from_kind(RuleKind::Import {
            url: url.into(),
            media: media.map(str::to_owned),
        })
    }

    /// A `@namespace` rule.
    pub fn namespace(namespace: impl Into<String>, prefix: Option<&str>) -> Self {
        Self::from_kind(RuleKind::Namespace {
            namespace: namespace.into(),
            prefix: prefix.map(str::to_owned),
        })
    }

    /// A `@font-face` rule.
    pub fn font_face(descriptors: Styleset) -> Self {
        Self::from_kind(RuleKind::FontFace { descriptors })
    }

    /// A `@page` rule, optionally for a page pseudo-class such as `:first`.
    pub fn page(pseudo: Option<&str>, style: Styleset) -> Self {
        Self::from_kind(RuleKind::Page {
            pseudo: pseudo.map(str::to_owned),
            style,
        })
    }

    /// A `@media` rule wrapping the rules of `definition`.
    pub fn media(query: impl Into<String>, definition: &DefinitionClass) -> Self {
        Self::from_kind(RuleKind::Media {
            query: query.into(),
            definition: definition.clone(),
        })
    }

    /// A `@supports` rule wrapping the rules of `definition`.
    pub fn supports(condition: impl Into<String>, definition: &DefinitionClass) -> Self {
        Self::from_kind(RuleKind::Supports {
            condition: condition.into(),
            definition: definition.clone(),
        })
    }

    // -- inspection ---------------------------------------------------------

    /// The kind-specific payload.
    pub fn kind(&self) -> &RuleKind {
        &self.inner.kind
    }

    /// Bucket this rule is routed to.
    pub fn category(&self) -> RuleCategory {
        self.inner.kind.category()
    }

    /// The kind of name this rule carries, if nameable.
    pub fn name_kind(&self) -> Option<NameKind> {
        self.inner.kind.name_kind()
    }

    /// Short kind label.
    pub fn kind_label(&self) -> &'static str {
        self.inner.kind.label()
    }

    /// The assigned name, without any CSS prefix.
    pub fn name(&self) -> Option<String> {
        self.inner.state.borrow().name.clone()
    }

    /// The assigned name as used in CSS: `.cls`, `#id`, `--var`, or the bare
    /// name for animations and counters.
    pub fn css_name(&self) -> Option<String> {
        let name = self.name()?;
        Some(match self.name_kind() {
            Some(NameKind::Class) => format!(".{name}"),
            Some(NameKind::Id) => format!("#{name}"),
            Some(NameKind::Var) => format!("--{name}"),
            _ => name,
        })
    }

    /// The container that processed this rule.
    pub fn owner(&self) -> Option<ContainerId> {
        self.inner.state.borrow().owner
    }

    /// Whether the rule has been claimed by a container.
    pub fn is_processed(&self) -> bool {
        self.owner().is_some()
    }

    /// Whether the rule currently has text in a styling target.
    pub fn is_inserted(&self) -> bool {
        !self.inner.state.borrow().inserted.is_empty()
    }

    /// The nested definition of a processed grouping rule.
    pub fn rules(&self) -> Option<Definition> {
        self.inner
            .state
            .borrow()
            .group
            .as_ref()
            .map(|g| g.definition.clone())
    }

    /// Whether two handles point to the same rule.
    pub fn ptr_eq(a: &Rule, b: &Rule) -> bool {
        Rc::ptr_eq(&a.inner, &b.inner)
    }

    // -- processing state ---------------------------------------------------

    pub(crate) fn name_override(&self) -> Option<&NameOverride> {
        self.inner.kind.name_override()
    }

    pub(crate) fn group_class(&self) -> Option<&DefinitionClass> {
        match &self.inner.kind {
            RuleKind::Media { definition, .. } | RuleKind::Supports { definition, .. } => {
                Some(definition)
            }
            _ => None,
        }
    }

    pub(crate) fn group_container(&self) -> Option<ContainerId> {
        self.inner.state.borrow().group.as_ref().map(|g| g.container)
    }

    pub(crate) fn set_owner(&self, owner: ContainerId) {
        self.inner.state.borrow_mut().owner = Some(owner);
    }

    pub(crate) fn set_name(&self, name: String) {
        self.inner.state.borrow_mut().name = Some(name);
    }

    pub(crate) fn set_group(&self, container: ContainerId, definition: Definition) {
        self.inner.state.borrow_mut().group = Some(GroupLink {
            container,
            definition,
        });
    }

    pub(crate) fn push_inserted(&self, handle: TargetRuleId) {
        self.inner.state.borrow_mut().inserted.push(handle);
    }

    pub(crate) fn clear_inserted(&self) {
        self.inner.state.borrow_mut().inserted.clear();
    }

    /// Drop all processing state so the rule can be claimed again.
    pub(crate) fn release(&self) {
        *self.inner.state.borrow_mut() = RuleState::default();
    }

    /// A structurally equal, unowned, unnamed copy.
    pub(crate) fn duplicate(&self) -> Rule {
        Rule::from_kind(self.inner.kind.clone())
    }

    // -- serialization ------------------------------------------------------

    /// Rule texts to insert, in order. Empty for variables, counters and
    /// grouping rules.
    pub(crate) fn css_texts(&self) -> Vec<String> {
        let name = self.name().unwrap_or_default();
        match &self.inner.kind {
            RuleKind::Class { style, .. } => style.to_css_rules(&format!(".{name}")),
            RuleKind::Id { style, .. } => style.to_css_rules(&format!("#{name}")),
            RuleKind::Tag { tag, style } => style.to_css_rules(tag),
            RuleKind::Style { selector, style } => {
                style.to_css_rules(&selector.to_selector_text())
            }
            RuleKind::Keyframes { frames, .. } => {
                let body: String = frames
                    .iter()
                    .map(|f| format!("{} {} ", f.waypoint, f.style.to_css_block()))
                    .collect();
                vec![format!("@keyframes {name} {{ {body}}}")]
            }
            RuleKind::Import { url, media } => match media {
                Some(media) => vec![format!("@import url({url}) {media};")],
                None => vec![format!("@import url({url});")],
            },
            RuleKind::Namespace { namespace, prefix } => match prefix {
                Some(prefix) => vec![format!("@namespace {prefix} url({namespace});")],
                None => vec![format!("@namespace url({namespace});")],
            },
            RuleKind::FontFace { descriptors } => {
                vec![format!("@font-face {}", descriptors.to_css_block())]
            }
            RuleKind::Page { pseudo, style } => match pseudo {
                Some(pseudo) => vec![format!("@page {pseudo} {}", style.to_css_block())],
                None => vec![format!("@page {}", style.to_css_block())],
            },
            RuleKind::Var { .. }
            | RuleKind::Counter { .. }
            | RuleKind::Media { .. }
            | RuleKind::Supports { .. } => Vec::new(),
        }
    }

    /// Empty wrapper text of a grouping rule: `@media screen {}`.
    pub(crate) fn group_text(&self) -> Option<String> {
        match &self.inner.kind {
            RuleKind::Media { query, .. } => Some(format!("@media {query} {{}}")),
            RuleKind::Supports { condition, .. } => Some(format!("@supports {condition} {{}}")),
            _ => None,
        }
    }

    /// `--name: value` for a variable rule.
    pub(crate) fn var_declaration(&self) -> Option<String> {
        match &self.inner.kind {
            RuleKind::Var { value, .. } => Some(format!(
                "--{}: {}",
                self.name().unwrap_or_default(),
                value.to_css()
            )),
            _ => None,
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Rule");
        s.field("kind", &self.kind_label());
        if let Ok(state) = self.inner.state.try_borrow() {
            s.field("name", &state.name).field("owner", &state.owner);
        }
        s.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::StyleValue;
    use pretty_assertions::assert_eq;
    use slotmap::SlotMap;

    fn container_id() -> ContainerId {
        let mut ids: SlotMap<ContainerId, ()> = SlotMap::with_key();
        ids.insert(())
    }

    #[test]
    fn categories() {
        let empty = DefinitionClass::new("Empty", |_| Ok(()));
        assert_eq!(Rule::class(Styleset::new()).category(), RuleCategory::Nameable);
        assert_eq!(Rule::counter().category(), RuleCategory::Nameable);
        assert_eq!(Rule::var("color", "red").category(), RuleCategory::Variable);
        assert_eq!(Rule::import("a.css", None).category(), RuleCategory::Early);
        assert_eq!(Rule::namespace("x", None).category(), RuleCategory::Early);
        assert_eq!(Rule::media("screen", &empty).category(), RuleCategory::Grouping);
        assert_eq!(Rule::tag("p", Styleset::new()).category(), RuleCategory::Other);
        assert_eq!(Rule::font_face(Styleset::new()).category(), RuleCategory::Other);
    }

    #[test]
    fn name_kinds() {
        assert_eq!(Rule::id(Styleset::new()).name_kind(), Some(NameKind::Id));
        assert_eq!(Rule::keyframes(vec![]).name_kind(), Some(NameKind::Animation));
        assert_eq!(Rule::var("color", "red").name_kind(), Some(NameKind::Var));
        assert_eq!(Rule::tag("p", Styleset::new()).name_kind(), None);
    }

    #[test]
    fn css_name_prefixes() {
        let class = Rule::class(Styleset::new());
        assert_eq!(class.css_name(), None);
        class.set_name("A_x".into());
        assert_eq!(class.css_name().as_deref(), Some(".A_x"));

        let var = Rule::var("color", "red");
        var.set_name("A_c".into());
        assert_eq!(var.css_name().as_deref(), Some("--A_c"));

        let anim = Rule::keyframes(vec![]);
        anim.set_name("A_spin".into());
        assert_eq!(anim.css_name().as_deref(), Some("A_spin"));
    }

    #[test]
    fn duplicate_copies_payload_but_not_state() {
        let rule = Rule::class_named(Styleset::new().with("color", "red"), "btn");
        rule.set_owner(container_id());
        rule.set_name("btn".into());

        let copy = rule.duplicate();
        assert!(!Rule::ptr_eq(&rule, &copy));
        assert!(copy.owner().is_none());
        assert!(copy.name().is_none());
        assert_eq!(copy.kind_label(), "class");
        assert!(matches!(copy.name_override(), Some(NameOverride::Literal(n)) if n == "btn"));
        assert!(rule.owner().is_some());
    }

    #[test]
    fn release_resets_state() {
        let rule = Rule::class(Styleset::new());
        rule.set_owner(container_id());
        rule.set_name("x".into());
        rule.release();
        assert!(!rule.is_processed());
        assert!(rule.name().is_none());
    }

    #[test]
    fn class_text_includes_nested_blocks() {
        let rule = Rule::class(
            Styleset::new()
                .with("color", "red")
                .with_nested(":hover", Styleset::new().with("color", "blue")),
        );
        rule.set_name("S_btn".into());
        assert_eq!(
            rule.css_texts(),
            vec![
                ".S_btn { color: red; }".to_owned(),
                ".S_btn:hover { color: blue; }".to_owned(),
            ]
        );
    }

    #[test]
    fn keyframes_text() {
        let rule = Rule::keyframes(vec![
            Keyframe::new(Waypoint::From, Styleset::new().with("opacity", 0)),
            Keyframe::new(Waypoint::Percent(50.0), Styleset::new().with("opacity", 0.5)),
            Keyframe::new(Waypoint::To, Styleset::new().with("opacity", 1)),
        ]);
        rule.set_name("S_fade".into());
        assert_eq!(
            rule.css_texts(),
            vec![
                "@keyframes S_fade { from { opacity: 0; } 50% { opacity: 0.5; } to { opacity: 1; } }"
                    .to_owned()
            ]
        );
    }

    #[test]
    fn at_rule_texts() {
        assert_eq!(
            Rule::import("base.css", Some("screen")).css_texts(),
            vec!["@import url(base.css) screen;".to_owned()]
        );
        assert_eq!(
            Rule::namespace("http://www.w3.org/2000/svg", Some("svg")).css_texts(),
            vec!["@namespace svg url(http://www.w3.org/2000/svg);".to_owned()]
        );
        assert_eq!(
            Rule::page(Some(":first"), Styleset::new().with("margin", "1in")).css_texts(),
            vec!["@page :first { margin: 1in; }".to_owned()]
        );
        assert_eq!(
            Rule::font_face(Styleset::new().with("fontFamily", StyleValue::string("Inter")))
                .css_texts(),
            vec!["@font-face { font-family: \"Inter\"; }".to_owned()]
        );
    }

    #[test]
    fn variables_counters_and_groups_have_no_standalone_text() {
        let empty = DefinitionClass::new("Empty", |_| Ok(()));
        assert!(Rule::var("color", "red").css_texts().is_empty());
        assert!(Rule::counter().css_texts().is_empty());
        let media = Rule::media("(max-width: 600px)", &empty);
        assert!(media.css_texts().is_empty());
        assert_eq!(media.group_text().as_deref(), Some("@media (max-width: 600px) {}"));
        assert_eq!(
            Rule::supports("(display: grid)", &empty).group_text().as_deref(),
            Some("@supports (display: grid) {}")
        );
    }

    #[test]
    fn var_declaration() {
        let var = Rule::var("padding", StyleValue::px(8.0));
        var.set_name("Theme_pad".into());
        assert_eq!(var.var_declaration().as_deref(), Some("--Theme_pad: 8px"));
        assert!(Rule::counter().var_declaration().is_none());
    }
}
