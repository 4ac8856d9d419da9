//! Name registry: collision-free identifier generation.
//!
//! A [`NameGenerator`] owns a monotonically increasing counter and the current
//! [`NamingMode`]. Switching modes only affects names generated afterwards;
//! the counter is never reset.

/// Default prefix for counter-based names.
pub const DEFAULT_PREFIX: &str = "n";

/// How scoped names are generated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NamingMode {
    /// Readable `{scope}_{property}` names.
    #[default]
    Verbose,
    /// Compact counter-based names: `{prefix}{counter}`.
    Compact {
        /// Prefix placed before the counter.
        prefix: String,
    },
}

impl NamingMode {
    /// Compact mode with the given prefix, or [`DEFAULT_PREFIX`] if `None` or empty.
    pub fn compact(prefix: Option<&str>) -> Self {
        let prefix = match prefix {
            Some(p) if !p.is_empty() => p.to_owned(),
            _ => DEFAULT_PREFIX.to_owned(),
        };
        NamingMode::Compact { prefix }
    }

    /// Whether this is the compact mode.
    pub fn is_compact(&self) -> bool {
        matches!(self, NamingMode::Compact { .. })
    }
}

/// Counter and naming-mode state.
#[derive(Debug)]
pub struct NameGenerator {
    next_id: u64,
    mode: NamingMode,
}

impl NameGenerator {
    /// Create a generator in the given mode with the counter at 1.
    pub fn new(mode: NamingMode) -> Self {
        Self { next_id: 1, mode }
    }

    /// The current naming mode.
    pub fn mode(&self) -> &NamingMode {
        &self.mode
    }

    /// Switch the naming mode.
    pub fn set_mode(&mut self, mode: NamingMode) {
        tracing::debug!(?mode, "naming mode changed");
        self.mode = mode;
    }

    /// The value the next generated name will use.
    pub fn peek(&self) -> u64 {
        self.next_id
    }

    /// A counter-based name using the current prefix.
    pub fn unique(&mut self) -> String {
        let prefix = match &self.mode {
            NamingMode::Compact { prefix } => prefix.as_str(),
            NamingMode::Verbose => DEFAULT_PREFIX,
        };
        let name = format!("{prefix}{}", self.next_id);
        self.next_id += 1;
        name
    }

    /// A name for `property` inside the scope named `scope`.
    ///
    /// Verbose mode pairs the two names; compact mode ignores both and draws
    /// from the counter.
    pub fn scoped(&mut self, scope: &str, property: &str) -> String {
        match self.mode {
            NamingMode::Verbose => format!("{scope}_{property}"),
            NamingMode::Compact { .. } => self.unique(),
        }
    }
}

impl Default for NameGenerator {
    fn default() -> Self {
        Self::new(NamingMode::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_names_are_monotonic() {
        let mut names = NameGenerator::default();
        assert_eq!(names.unique(), "n1");
        assert_eq!(names.unique(), "n2");
        assert_eq!(names.peek(), 3);
    }

    #[test]
    fn verbose_scoped_names_pair_scope_and_property() {
        let mut names = NameGenerator::default();
        assert_eq!(names.scoped("Theme", "primary"), "Theme_primary");
        // verbose scoped names do not consume the counter
        assert_eq!(names.peek(), 1);
    }

    #[test]
    fn compact_scoped_names_use_counter_and_prefix() {
        let mut names = NameGenerator::new(NamingMode::compact(Some("x")));
        assert_eq!(names.scoped("Theme", "primary"), "x1");
        assert_eq!(names.scoped("Theme", "primary"), "x2");
        assert_eq!(names.unique(), "x3");
    }

    #[test]
    fn empty_prefix_falls_back_to_default() {
        assert_eq!(
            NamingMode::compact(Some("")),
            NamingMode::Compact { prefix: "n".into() }
        );
        assert!(NamingMode::compact(None).is_compact());
        assert!(!NamingMode::Verbose.is_compact());
    }

    #[test]
    fn mode_switch_keeps_counter() {
        let mut names = NameGenerator::default();
        names.unique();
        names.set_mode(NamingMode::compact(None));
        assert_eq!(names.scoped("A", "b"), "n2");
        names.set_mode(NamingMode::Verbose);
        assert_eq!(names.scoped("A", "b"), "A_b");
        assert_eq!(names.unique(), "n3");
    }
}
