//! `styleset!` macro: parse declarations at compile time and generate a `Styleset`.

use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::{braced, Error, Ident, LitFloat, LitInt, LitStr, Result, Token};

// ---------------------------------------------------------------------------
// AST types
// ---------------------------------------------------------------------------

/// A single parsed value token.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CssValue {
    /// A bare identifier like `red`, `center`, `sans-serif`.
    Ident(String),
    /// A unitless number.
    Number(f64),
    /// A number followed by `%`.
    Percent(f64),
    /// A number with a unit suffix like `px`, `rem`, `s`.
    WithUnit(f64, String),
    /// A hex color, without the `#`.
    Hash(String),
    /// A quoted string literal.
    Str(String),
}

/// One `property: values [!important];` declaration.
#[derive(Debug, Clone)]
pub(crate) struct CssDeclaration {
    /// The property name in kebab-case (e.g. "text-align", "--accent").
    pub name: String,
    /// Comma-separated groups of space-separated values.
    pub groups: Vec<Vec<CssValue>>,
    pub important: bool,
}

/// A nested block: `":hover" { ... }`.
#[derive(Debug)]
pub(crate) struct CssNested {
    pub selector: String,
    pub body: CssInput,
}

#[derive(Debug)]
pub(crate) enum CssItem {
    Declaration(CssDeclaration),
    Nested(CssNested),
}

/// The input to the styleset! macro.
#[derive(Debug)]
pub(crate) struct CssInput {
    items: Vec<CssItem>,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

impl Parse for CssInput {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut items = Vec::new();
        while !input.is_empty() {
            if input.peek(LitStr) {
                let selector: LitStr = input.parse()?;
                let content;
                braced!(content in input);
                items.push(CssItem::Nested(CssNested {
                    selector: selector.value(),
                    body: content.parse()?,
                }));
            } else {
                items.push(CssItem::Declaration(parse_declaration(input)?));
            }
        }
        Ok(CssInput { items })
    }
}

/// Parse `property-name: values [!important];`.
fn parse_declaration(input: ParseStream) -> Result<CssDeclaration> {
    let mut name = String::new();
    while input.peek(Token![-]) {
        input.parse::<Token![-]>()?;
        name.push('-');
    }
    let first: Ident = input.parse()?;
    let name_span = first.span();
    name.push_str(&first.to_string());
    while input.peek(Token![-]) {
        input.parse::<Token![-]>()?;
        let next: Ident = input.parse()?;
        name.push('-');
        name.push_str(&next.to_string());
    }

    input.parse::<Token![:]>()?;

    let mut groups = vec![Vec::new()];
    let mut important = false;
    while !input.peek(Token![;]) {
        if input.peek(Token![!]) {
            input.parse::<Token![!]>()?;
            let flag: Ident = input.parse()?;
            if flag != "important" {
                return Err(Error::new(flag.span(), "expected `important` after `!`"));
            }
            important = true;
            continue;
        }
        if input.peek(Token![,]) {
            input.parse::<Token![,]>()?;
            groups.push(Vec::new());
            continue;
        }
        let value = parse_css_value(input)?;
        if let Some(group) = groups.last_mut() {
            group.push(value);
        }
    }
    input.parse::<Token![;]>()?;

    if groups.iter().any(Vec::is_empty) {
        return Err(Error::new(name_span, format!("property `{name}` has an empty value")));
    }

    Ok(CssDeclaration {
        name,
        groups,
        important,
    })
}

/// Parse a single value token.
fn parse_css_value(input: ParseStream) -> Result<CssValue> {
    // `#fff` is `#` + ident; `#1a1a2e` is `#` + an int literal with a suffix.
    if input.peek(Token![#]) {
        input.parse::<Token![#]>()?;
        let hex = if input.peek(Ident) {
            input.parse::<Ident>()?.to_string()
        } else if input.peek(LitInt) {
            let lit: LitInt = input.parse()?;
            let mut hex = lit.to_string();
            if input.peek(Ident) {
                hex.push_str(&input.parse::<Ident>()?.to_string());
            }
            hex
        } else {
            return Err(input.error("expected hex color value after `#`"));
        };
        return Ok(CssValue::Hash(hex));
    }

    if input.peek(LitStr) {
        let lit: LitStr = input.parse()?;
        return Ok(CssValue::Str(lit.value()));
    }

    let negative = if input.peek(Token![-]) && (input.peek2(LitInt) || input.peek2(LitFloat)) {
        input.parse::<Token![-]>()?;
        true
    } else {
        false
    };
    let sign = if negative { -1.0 } else { 1.0 };

    if input.peek(LitFloat) {
        let lit: LitFloat = input.parse()?;
        let value: f64 = lit.base10_digits().parse().map_err(|_| Error::new(lit.span(), "invalid number"))?;
        return number_with_unit(input, sign * value, lit.suffix());
    }

    if input.peek(LitInt) {
        let lit: LitInt = input.parse()?;
        let value: f64 = lit.base10_digits().parse().map_err(|_| Error::new(lit.span(), "invalid number"))?;
        return number_with_unit(input, sign * value, lit.suffix());
    }

    if input.peek(Ident) {
        let mut word = input.parse::<Ident>()?.to_string();
        // hyphenated keywords: `space-between`, `sans-serif`
        while input.peek(Token![-]) && input.peek2(Ident) {
            input.parse::<Token![-]>()?;
            word.push('-');
            word.push_str(&input.parse::<Ident>()?.to_string());
        }
        return Ok(CssValue::Ident(word));
    }

    Err(input.error("unexpected token in CSS value"))
}

fn number_with_unit(input: ParseStream, value: f64, suffix: &str) -> Result<CssValue> {
    if !suffix.is_empty() {
        return Ok(CssValue::WithUnit(value, suffix.to_owned()));
    }
    if input.peek(Token![%]) {
        input.parse::<Token![%]>()?;
        return Ok(CssValue::Percent(value));
    }
    Ok(CssValue::Number(value))
}

// ---------------------------------------------------------------------------
// Code generation
// ---------------------------------------------------------------------------

fn generate_value(value: &CssValue) -> TokenStream {
    match value {
        CssValue::Ident(word) => quote! { ::stylescope::css::StyleValue::keyword(#word) },
        CssValue::Number(n) => quote! { ::stylescope::css::StyleValue::Number(#n) },
        CssValue::Percent(n) => quote! { ::stylescope::css::StyleValue::percent(#n) },
        CssValue::WithUnit(n, unit) => {
            quote! { ::stylescope::css::StyleValue::dimension(#n, #unit) }
        }
        CssValue::Hash(hex) => quote! { ::stylescope::css::StyleValue::hex(#hex) },
        CssValue::Str(s) => quote! { ::stylescope::css::StyleValue::string(#s) },
    }
}

fn generate_group(values: &[CssValue]) -> TokenStream {
    match values {
        [single] => generate_value(single),
        many => {
            let items = many.iter().map(generate_value);
            quote! { ::stylescope::css::StyleValue::List(vec![#(#items),*]) }
        }
    }
}

fn generate_declaration(decl: &CssDeclaration) -> TokenStream {
    let name = &decl.name;
    let value = match decl.groups.as_slice() {
        [single] => generate_group(single),
        groups => {
            let items = groups.iter().map(|g| generate_group(g));
            quote! { ::stylescope::css::StyleValue::CommaList(vec![#(#items),*]) }
        }
    };
    if decl.important {
        quote! { .with_important(#name, #value) }
    } else {
        quote! { .with(#name, #value) }
    }
}

fn generate(input: &CssInput) -> TokenStream {
    let calls = input.items.iter().map(|item| match item {
        CssItem::Declaration(decl) => generate_declaration(decl),
        CssItem::Nested(nested) => {
            let selector = &nested.selector;
            let body = generate(&nested.body);
            quote! { .with_nested(#selector, #body) }
        }
    });
    quote! { ::stylescope::css::Styleset::new() #(#calls)* }
}

/// Entry point for the styleset! macro.
pub(crate) fn styleset_impl(input: TokenStream) -> Result<TokenStream> {
    let parsed: CssInput = syn::parse2(input)?;
    if parsed.items.is_empty() {
        return Err(Error::new(Span::call_site(), "styleset! needs at least one declaration"));
    }
    Ok(generate(&parsed))
}
