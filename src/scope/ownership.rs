//! Single ownership of rules, with copy-on-claim.
//!
//! A rule handle can be reachable from several definitions. The first
//! container to claim it becomes its owner; any later claimant receives a
//! structural copy. Everything claimed during one processing request is
//! logged in a [`Session`] so a failed request can be undone.

use super::container::ContainerId;
use crate::definition::{Definition, DefinitionKey, Property};
use crate::rules::Rule;

/// Bookkeeping for one processing request.
#[derive(Debug, Default)]
pub(crate) struct Session {
    pub containers: Vec<ContainerId>,
    pub instances: Vec<DefinitionKey>,
    pub rules: Vec<Rule>,
    /// Property maps as they were before the walker rewrote them.
    pub snapshots: Vec<(Definition, Vec<(String, Property)>)>,
}

/// Claim `rule` for `container`, returning the rule the container now owns.
pub(crate) fn claim(rule: &Rule, container: ContainerId, session: &mut Session) -> Rule {
    if let Some(owner) = rule.owner() {
        tracing::debug!(
            kind = rule.kind_label(),
            ?owner,
            ?container,
            "rule already owned, claiming a copy"
        );
        return claim(&rule.duplicate(), container, session);
    }
    rule.set_owner(container);
    session.rules.push(rule.clone());
    rule.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::Styleset;
    use slotmap::SlotMap;

    #[test]
    fn first_claim_keeps_the_handle() {
        let mut ids: SlotMap<ContainerId, ()> = SlotMap::with_key();
        let a = ids.insert(());
        let mut session = Session::default();

        let rule = Rule::class(Styleset::new());
        let owned = claim(&rule, a, &mut session);
        assert!(Rule::ptr_eq(&rule, &owned));
        assert_eq!(rule.owner(), Some(a));
        assert_eq!(session.rules.len(), 1);
    }

    #[test]
    fn second_claim_gets_a_copy() {
        let mut ids: SlotMap<ContainerId, ()> = SlotMap::with_key();
        let a = ids.insert(());
        let b = ids.insert(());
        let mut session = Session::default();

        let rule = Rule::class(Styleset::new().with("color", "red"));
        claim(&rule, a, &mut session);
        let copy = claim(&rule, b, &mut session);

        assert!(!Rule::ptr_eq(&rule, &copy));
        assert_eq!(rule.owner(), Some(a));
        assert_eq!(copy.owner(), Some(b));
        assert_eq!(copy.kind_label(), "class");
    }
}
