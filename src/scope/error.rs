//! Errors raised while processing definitions.

use crate::definition::ConstructionError;
use crate::rules::NameKind;

/// Why a processing request produced no style sheet.
///
/// A failed request leaves nothing registered; it may be retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScopeError {
    #[error("failed to construct definition `{class}`: {source}")]
    Construction {
        class: String,
        source: ConstructionError,
    },

    #[error("property `{property}` already names a {existing}, cannot name a {requested}")]
    KindMismatch {
        property: String,
        existing: NameKind,
        requested: NameKind,
    },

    #[error("definition `{class}` references itself")]
    CircularReference { class: String },

    #[error("name override for `{property}` points at a rule without a name")]
    UnresolvedNameOverride { property: String },

    #[error("`{name}` is nested in a grouping rule and cannot be activated on its own")]
    NotTopLevel { name: String },

    #[error("style sheet does not belong to this runtime")]
    UnknownSheet,
}
