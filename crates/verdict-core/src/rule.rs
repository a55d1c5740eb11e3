//! The rule capability and its identity contract
//!
//! A rule is identified by `(name, priority)`. Lower priorities fire first, equal
//! priorities fire in ascending name order and a missing name sorts after every present
//! one. A missing name is represented as the empty string across every rule variant; the
//! description is metadata only and never takes part in equality, ordering or hashing.

use crate::error::RuleError;
use crate::facts::Facts;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Name given to rules that do not declare one explicitly
pub const DEFAULT_NAME: &str = "rule";
/// Description given to rules that do not declare one explicitly
pub const DEFAULT_DESCRIPTION: &str = "description";
/// Priority given to rules that do not declare one explicitly
pub const DEFAULT_PRIORITY: i32 = i32::MAX - 1;

/// A named, prioritised condition + actions unit.
///
/// The provided `evaluate` never triggers and the provided `execute` does nothing, so a
/// rule only has to override the parts it needs.
pub trait Rule {
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        DEFAULT_DESCRIPTION
    }

    fn priority(&self) -> i32 {
        DEFAULT_PRIORITY
    }

    /// Decide whether the rule triggers on `facts`
    fn evaluate(&self, _facts: &Facts) -> anyhow::Result<bool> {
        Ok(false)
    }

    /// Run the rule's actions. May write derived facts.
    fn execute(&self, _facts: &mut Facts) -> anyhow::Result<()> {
        Ok(())
    }

    /// Identity key of this rule
    fn key(&self) -> RuleKey {
        RuleKey::new(self.name(), self.priority())
    }
}

/// `(priority, name)` identity of a rule, ordered the way rules fire
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuleKey {
    pub priority: i32,
    pub name: String,
}

impl RuleKey {
    pub fn new(name: impl Into<String>, priority: i32) -> Self {
        Self { priority, name: name.into() }
    }

    /// Whether the rule this key belongs to has no name
    pub fn is_unnamed(&self) -> bool {
        self.name.is_empty()
    }
}

impl Ord for RuleKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| self.is_unnamed().cmp(&other.is_unnamed()))
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl PartialOrd for RuleKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for RuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.priority)
    }
}

impl PartialEq for dyn Rule + '_ {
    fn eq(&self, other: &Self) -> bool {
        self.priority() == other.priority() && self.name() == other.name()
    }
}

impl Eq for dyn Rule + '_ {}

impl PartialOrd for dyn Rule + '_ {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for dyn Rule + '_ {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl Hash for dyn Rule + '_ {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name().hash(state);
        self.priority().hash(state);
    }
}

impl fmt::Display for dyn Rule + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rule{{name='{}', priority={}, description='{}'}}",
            self.name(),
            self.priority(),
            self.description()
        )
    }
}

impl fmt::Debug for dyn Rule + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Name, description and priority of a rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMetadata {
    pub name: String,
    pub description: String,
    pub priority: i32,
}

impl RuleMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl Default for RuleMetadata {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            priority: DEFAULT_PRIORITY,
        }
    }
}

/// Boxed condition of a [`DefaultRule`]
pub type ConditionFn = Box<dyn Fn(&Facts) -> anyhow::Result<bool>>;
/// Boxed action of a [`DefaultRule`]
pub type ActionFn = Box<dyn Fn(&mut Facts) -> anyhow::Result<()>>;

/// Ready-made conditions
pub mod condition {
    use crate::facts::Facts;

    /// Condition that always triggers
    pub fn always(_facts: &Facts) -> anyhow::Result<bool> {
        Ok(true)
    }

    /// Condition that never triggers
    pub fn never(_facts: &Facts) -> anyhow::Result<bool> {
        Ok(false)
    }
}

/// Rule made of one condition and a list of actions run in insertion order
pub struct DefaultRule {
    metadata: RuleMetadata,
    condition: Option<ConditionFn>,
    actions: Vec<ActionFn>,
}

impl DefaultRule {
    pub fn new(metadata: RuleMetadata) -> Self {
        Self { metadata, condition: None, actions: Vec::new() }
    }

    pub fn set_condition<F>(&mut self, condition: F)
    where
        F: Fn(&Facts) -> anyhow::Result<bool> + 'static,
    {
        self.condition = Some(Box::new(condition));
    }

    pub fn add_action<F>(&mut self, action: F)
    where
        F: Fn(&mut Facts) -> anyhow::Result<()> + 'static,
    {
        self.actions.push(Box::new(action));
    }

    pub(crate) fn from_parts(
        metadata: RuleMetadata,
        condition: Option<ConditionFn>,
        actions: Vec<ActionFn>,
    ) -> Self {
        Self { metadata, condition, actions }
    }

    pub fn action_count(&self) -> usize {
        self.actions.len()
    }
}

impl Rule for DefaultRule {
    fn name(&self) -> &str {
        &self.metadata.name
    }

    fn description(&self) -> &str {
        &self.metadata.description
    }

    fn priority(&self) -> i32 {
        self.metadata.priority
    }

    fn evaluate(&self, facts: &Facts) -> anyhow::Result<bool> {
        match &self.condition {
            Some(condition) => condition(facts),
            None => Err(RuleError::evaluation(self.name(), "rule has no condition").into()),
        }
    }

    fn execute(&self, facts: &mut Facts) -> anyhow::Result<()> {
        for action in &self.actions {
            action(facts)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct Named(&'static str, i32, &'static str);

    impl Rule for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn priority(&self) -> i32 {
            self.1
        }

        fn description(&self) -> &str {
            self.2
        }
    }

    #[test]
    fn keys_order_by_priority_then_name() {
        let mut keys = vec![
            RuleKey::new("b", 1),
            RuleKey::new("a", 2),
            RuleKey::new("a", 1),
            RuleKey::new("", 1),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![RuleKey::new("a", 1), RuleKey::new("b", 1), RuleKey::new("", 1), RuleKey::new("a", 2)]
        );
    }

    #[test]
    fn equality_ignores_description() {
        let first: Box<dyn Rule> = Box::new(Named("weather", 1, "take an umbrella"));
        let second: Box<dyn Rule> = Box::new(Named("weather", 1, "something else"));
        assert_eq!(&*first, &*second);

        let mut seen: HashSet<RuleKey> = HashSet::new();
        assert!(seen.insert(first.key()));
        assert!(!seen.insert(second.key()));
    }

    #[test]
    fn basic_rule_defaults() {
        let rule = Named("noop", DEFAULT_PRIORITY, DEFAULT_DESCRIPTION);
        let mut facts = Facts::new();
        assert!(!rule.evaluate(&facts).unwrap());
        rule.execute(&mut facts).unwrap();
        assert!(facts.is_empty());
    }

    #[test]
    fn display_renders_metadata() {
        let rule: &dyn Rule = &Named("weather", 1, "if rain, take an umbrella");
        assert_eq!(
            rule.to_string(),
            "Rule{name='weather', priority=1, description='if rain, take an umbrella'}"
        );
    }

    #[test]
    fn default_rule_without_condition_fails_evaluation() {
        let rule = DefaultRule::new(RuleMetadata::new("bare"));
        let err = rule.evaluate(&Facts::new()).unwrap_err();
        let err = err.downcast_ref::<RuleError>().unwrap();
        assert_eq!(err.category(), "evaluation");
    }

    #[test]
    fn default_rule_stops_at_first_failing_action() {
        let mut rule = DefaultRule::new(RuleMetadata::new("chain"));
        rule.set_condition(condition::always);
        rule.add_action(|facts: &mut Facts| {
            facts.put("first", true);
            Ok(())
        });
        rule.add_action(|_: &mut Facts| anyhow::bail!("boom"));
        rule.add_action(|facts: &mut Facts| {
            facts.put("third", true);
            Ok(())
        });

        let mut facts = Facts::new();
        assert!(rule.evaluate(&facts).unwrap());
        assert!(rule.execute(&mut facts).is_err());
        assert!(facts.contains("first"));
        assert!(!facts.contains("third"));
    }
}
