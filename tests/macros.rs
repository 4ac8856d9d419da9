//! Tests for the `styleset!` macro.
#![cfg(feature = "macros")]

use pretty_assertions::assert_eq;
use stylescope::css::Styleset;
use stylescope::{styleset, DefinitionClass, Rule, Runtime};

#[test]
fn test_macro_matches_builder() {
    let from_macro = styleset! {
        color: red;
        padding: 4px 8px;
        width: 50%;
        font-family: "Inter", sans-serif;
    };
    let block = from_macro.to_css_block();
    assert_eq!(
        block,
        "{ color: red; padding: 4px 8px; width: 50%; font-family: \"Inter\",sans-serif; }"
    );

    let by_hand = Styleset::new().with("color", "red");
    assert_eq!(styleset! { color: red; }.to_css_block(), by_hand.to_css_block());
}

#[test]
fn test_macro_important_hex_and_custom_properties() {
    let style = styleset! {
        background: #1a1a2e !important;
        --gutter: 12px;
    };
    assert_eq!(
        style.to_css_block(),
        "{ background: #1a1a2e !important; --gutter: 12px; }"
    );
}

#[test]
fn test_macro_nested_blocks_in_a_processed_rule() {
    let class = DefinitionClass::new("Link", |d| {
        d.add(
            "anchor",
            Rule::class(styleset! {
                color: blue;
                ":hover" {
                    color: navy;
                }
            }),
        );
        Ok(())
    });
    let mut rt = Runtime::default();
    rt.activate(&class).unwrap();

    insta::assert_snapshot!(rt.target().render(), @r"
    .Link_anchor { color: blue; }
    .Link_anchor:hover { color: navy; }
    ");
}
