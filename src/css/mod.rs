//! CSS text collaborators: property values, stylesets, selectors.

pub mod selector;
pub mod styleset;
pub mod value;

pub use selector::{Selector, SelectorItem};
pub use styleset::{css_property_name, Declaration, Styleset};
pub use value::{Color, StyleValue};
