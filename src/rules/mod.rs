//! Rule values and the name registry.

pub mod naming;
pub mod rule;

pub use naming::{NameGenerator, NamingMode, DEFAULT_PREFIX};
pub use rule::{Keyframe, NameKind, NameOverride, Rule, RuleCategory, RuleKind, Waypoint};
