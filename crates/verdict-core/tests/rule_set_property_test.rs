//! Ordering and deduplication properties of `RuleSet`

use proptest::prelude::*;
use verdict_core::{Rule, RuleBuilder, RuleKey, RuleSet, condition};

fn arb_name() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("alpha".to_string()),
        Just("beta".to_string()),
        Just("gamma".to_string()),
        "[a-z]{1,6}",
    ]
}

fn arb_rules() -> impl Strategy<Value = Vec<(String, i32)>> {
    prop::collection::vec((arb_name(), -3i32..4), 0..24)
}

fn build(name: &str, priority: i32) -> Box<dyn Rule> {
    Box::new(RuleBuilder::new().name(name).priority(priority).when(condition::always).build())
}

proptest! {
    #[test]
    fn iteration_follows_firing_order(specs in arb_rules()) {
        let rules: RuleSet = specs.iter().map(|(name, priority)| build(name, *priority)).collect();
        let members: Vec<&dyn Rule> = rules.iter().collect();

        for pair in members.windows(2) {
            let (left, right) = (pair[0], pair[1]);
            prop_assert!(left.priority() <= right.priority());
            if left.priority() == right.priority() {
                prop_assert!(!(left.name().is_empty() && !right.name().is_empty()));
                if !left.name().is_empty() && !right.name().is_empty() {
                    prop_assert!(left.name() < right.name());
                }
            }
        }
    }

    #[test]
    fn identical_keys_collapse(specs in arb_rules()) {
        let rules: RuleSet = specs.iter().map(|(name, priority)| build(name, *priority)).collect();
        let mut distinct: Vec<RuleKey> =
            specs.iter().map(|(name, priority)| RuleKey::new(name.as_str(), *priority)).collect();
        distinct.sort();
        distinct.dedup();

        prop_assert_eq!(rules.len(), distinct.len());
        prop_assert_eq!(rules.keys().cloned().collect::<Vec<_>>(), distinct);
    }

    #[test]
    fn registering_twice_changes_nothing(name in arb_name(), priority in -3i32..4) {
        let mut rules = RuleSet::new();
        prop_assert!(rules.register_boxed(build(&name, priority)));
        prop_assert!(!rules.register_boxed(build(&name, priority)));
        prop_assert_eq!(rules.len(), 1);
    }
}
