//! Style property values and their CSS text form.
//!
//! [`StyleValue`] is the typed value of a single style property. Values that
//! point at rules ([`StyleValue::Var`], [`StyleValue::NameOf`]) are resolved
//! lazily: the referenced rule's generated name is read when the value is
//! serialized, which happens at insertion time.

use std::fmt;

use crate::rules::Rule;

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// A CSS color.
#[derive(Debug, Clone, PartialEq)]
pub enum Color {
    /// Hex notation, stored without the leading `#` (e.g. `"1a1a2e"`).
    Hex(String),
    /// `rgb(r, g, b)`.
    Rgb(u8, u8, u8),
    /// `rgba(r, g, b, a)` with alpha in `0.0..=1.0`.
    Rgba(u8, u8, u8, f32),
    /// A named color keyword such as `red` or `transparent`.
    Named(String),
}

impl Color {
    /// Parse a hex color with or without the leading `#`.
    pub fn hex(value: impl AsRef<str>) -> Self {
        Color::Hex(value.as_ref().trim_start_matches('#').to_owned())
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Hex(hex) => write!(f, "#{hex}"),
            Color::Rgb(r, g, b) => write!(f, "rgb({r},{g},{b})"),
            Color::Rgba(r, g, b, a) => write!(f, "rgba({r},{g},{b},{})", a.clamp(0.0, 1.0)),
            Color::Named(name) => f.write_str(name),
        }
    }
}

// ---------------------------------------------------------------------------
// StyleValue
// ---------------------------------------------------------------------------

/// The typed value of one style property.
#[derive(Debug, Clone)]
pub enum StyleValue {
    /// An identifier like `bold`, `center`, `auto`.
    Keyword(String),
    /// A unitless number.
    Number(f64),
    /// A number with a unit suffix, e.g. `4px`, `50%`, `1.5em`.
    Dimension(f64, String),
    /// A color.
    Color(Color),
    /// A string, emitted double-quoted.
    Str(String),
    /// Text emitted verbatim.
    Raw(String),
    /// Space-separated values: `1px solid red`.
    List(Vec<StyleValue>),
    /// Comma-separated values: `"Arial", sans-serif`.
    CommaList(Vec<StyleValue>),
    /// Reference to a custom variable rule: `var(--name)`.
    Var(Rule),
    /// The bare generated name of a rule (animation names, counters).
    NameOf(Rule),
}

impl StyleValue {
    /// A keyword value.
    pub fn keyword(value: impl Into<String>) -> Self {
        StyleValue::Keyword(value.into())
    }

    /// A quoted string value.
    pub fn string(value: impl Into<String>) -> Self {
        StyleValue::Str(value.into())
    }

    /// A dimension with an arbitrary unit.
    pub fn dimension(value: f64, unit: impl Into<String>) -> Self {
        StyleValue::Dimension(value, unit.into())
    }

    /// A length in pixels.
    pub fn px(value: f64) -> Self {
        Self::dimension(value, "px")
    }

    /// A length in `em`.
    pub fn em(value: f64) -> Self {
        Self::dimension(value, "em")
    }

    /// A percentage.
    pub fn percent(value: f64) -> Self {
        Self::dimension(value, "%")
    }

    /// A hex color.
    pub fn hex(value: impl AsRef<str>) -> Self {
        StyleValue::Color(Color::hex(value))
    }

    /// A reference to a custom variable rule.
    pub fn var(rule: &Rule) -> Self {
        StyleValue::Var(rule.clone())
    }

    /// The generated name of a rule.
    pub fn name_of(rule: &Rule) -> Self {
        StyleValue::NameOf(rule.clone())
    }

    /// Serialize this value to CSS text.
    pub fn to_css(&self) -> String {
        match self {
            StyleValue::Keyword(s) | StyleValue::Raw(s) => s.clone(),
            StyleValue::Number(n) => format_number(*n),
            StyleValue::Dimension(n, unit) => format!("{}{unit}", format_number(*n)),
            StyleValue::Color(color) => color.to_string(),
            StyleValue::Str(s) => format!("\"{}\"", s.replace('"', "\\\"")),
            StyleValue::List(items) => join(items, " "),
            StyleValue::CommaList(items) => join(items, ","),
            StyleValue::Var(rule) => format!("var(--{})", rule_name(rule)),
            StyleValue::NameOf(rule) => rule_name(rule),
        }
    }
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

impl From<&str> for StyleValue {
    fn from(value: &str) -> Self {
        StyleValue::Raw(value.to_owned())
    }
}

impl From<String> for StyleValue {
    fn from(value: String) -> Self {
        StyleValue::Raw(value)
    }
}

impl From<f64> for StyleValue {
    fn from(value: f64) -> Self {
        StyleValue::Number(value)
    }
}

impl From<i32> for StyleValue {
    fn from(value: i32) -> Self {
        StyleValue::Number(f64::from(value))
    }
}

impl From<Color> for StyleValue {
    fn from(value: Color) -> Self {
        StyleValue::Color(value)
    }
}

impl<T: Into<StyleValue>> From<Vec<T>> for StyleValue {
    fn from(values: Vec<T>) -> Self {
        StyleValue::List(values.into_iter().map(Into::into).collect())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Format a number without a trailing `.0` for integral values.
fn format_number(n: f64) -> String {
    if n.is_finite() {
        format!("{n}")
    } else {
        "0".to_owned()
    }
}

fn join(items: &[StyleValue], separator: &str) -> String {
    items
        .iter()
        .map(StyleValue::to_css)
        .collect::<Vec<_>>()
        .join(separator)
}

fn rule_name(rule: &Rule) -> String {
    match rule.name() {
        Some(name) => name,
        None => {
            tracing::warn!(kind = rule.kind_label(), "value references a rule that has no name yet");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn numbers_drop_trailing_zero() {
        assert_eq!(StyleValue::Number(2.0).to_css(), "2");
        assert_eq!(StyleValue::Number(0.5).to_css(), "0.5");
        assert_eq!(StyleValue::Number(f64::NAN).to_css(), "0");
    }

    #[test]
    fn dimensions_append_unit() {
        assert_eq!(StyleValue::px(4.0).to_css(), "4px");
        assert_eq!(StyleValue::percent(50.0).to_css(), "50%");
        assert_eq!(StyleValue::em(1.5).to_css(), "1.5em");
    }

    #[test]
    fn colors() {
        assert_eq!(StyleValue::hex("#ff00aa").to_css(), "#ff00aa");
        assert_eq!(StyleValue::hex("abc").to_css(), "#abc");
        assert_eq!(StyleValue::Color(Color::Rgb(1, 2, 3)).to_css(), "rgb(1,2,3)");
        assert_eq!(
            StyleValue::Color(Color::Rgba(1, 2, 3, 1.5)).to_css(),
            "rgba(1,2,3,1)"
        );
        assert_eq!(StyleValue::Color(Color::Named("red".into())).to_css(), "red");
    }

    #[test]
    fn strings_are_quoted() {
        assert_eq!(StyleValue::string("a \"b\"").to_css(), "\"a \\\"b\\\"\"");
    }

    #[test]
    fn lists() {
        let border = StyleValue::List(vec![
            StyleValue::px(1.0),
            StyleValue::keyword("solid"),
            StyleValue::hex("000"),
        ]);
        assert_eq!(border.to_css(), "1px solid #000");

        let fonts = StyleValue::CommaList(vec![
            StyleValue::string("Arial"),
            StyleValue::keyword("sans-serif"),
        ]);
        assert_eq!(fonts.to_css(), "\"Arial\",sans-serif");
    }

    #[test]
    fn conversions() {
        assert_eq!(StyleValue::from("red").to_css(), "red");
        assert_eq!(StyleValue::from(3).to_css(), "3");
        assert_eq!(StyleValue::from(vec!["a", "b"]).to_css(), "a b");
    }

    #[test]
    fn rule_references_resolve_lazily() {
        let var = Rule::var("color", "red");
        let value = StyleValue::var(&var);
        assert_eq!(value.to_css(), "var(--)");

        var.set_name("Theme_fg".into());
        assert_eq!(value.to_css(), "var(--Theme_fg)");
        assert_eq!(StyleValue::name_of(&var).to_css(), "Theme_fg");
    }
}
