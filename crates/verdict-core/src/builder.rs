use crate::facts::Facts;
use crate::rule::{ActionFn, ConditionFn, DEFAULT_DESCRIPTION, DEFAULT_PRIORITY, DefaultRule, RuleMetadata};
use tracing::debug;

/// Fluent builder for [`DefaultRule`].
///
/// A rule built without [`RuleBuilder::name`] has a missing (empty) name and sorts after
/// named rules of the same priority.
///
/// ```
/// use verdict_core::{Facts, Rule, RuleBuilder};
///
/// let rule = RuleBuilder::new()
///     .name("weather rule")
///     .priority(1)
///     .when(|facts: &Facts| Ok(facts.get_bool("rain") == Some(true)))
///     .then(|facts: &mut Facts| {
///         facts.put("umbrella", true);
///         Ok(())
///     })
///     .build();
/// assert_eq!(rule.name(), "weather rule");
/// ```
pub struct RuleBuilder {
    name: String,
    description: String,
    priority: i32,
    condition: Option<ConditionFn>,
    actions: Vec<ActionFn>,
}

impl RuleBuilder {
    pub fn new() -> Self {
        Self {
            name: String::new(),
            description: DEFAULT_DESCRIPTION.to_string(),
            priority: DEFAULT_PRIORITY,
            condition: None,
            actions: Vec::new(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Set the condition, replacing any previous one
    pub fn when<F>(mut self, condition: F) -> Self
    where
        F: Fn(&Facts) -> anyhow::Result<bool> + 'static,
    {
        self.condition = Some(Box::new(condition));
        self
    }

    /// Append an action. Actions run in the order they were added.
    pub fn then<F>(mut self, action: F) -> Self
    where
        F: Fn(&mut Facts) -> anyhow::Result<()> + 'static,
    {
        self.actions.push(Box::new(action));
        self
    }

    pub fn build(self) -> DefaultRule {
        debug!(
            rule = %self.name,
            priority = self.priority,
            actions = self.actions.len(),
            has_condition = self.condition.is_some(),
            "Building rule"
        );
        let metadata = RuleMetadata {
            name: self.name,
            description: self.description,
            priority: self.priority,
        };
        DefaultRule::from_parts(metadata, self.condition, self.actions)
    }
}

impl Default for RuleBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{Rule, condition};

    #[test]
    fn builds_rule_with_metadata_and_ordered_actions() {
        let rule = RuleBuilder::new()
            .name("weather rule")
            .priority(1)
            .description("when rain, take an umbrella")
            .when(condition::always)
            .then(|facts: &mut Facts| {
                facts.put("log", "dear, take an umbrella please");
                Ok(())
            })
            .then(|facts: &mut Facts| {
                let previous = facts.get_str("log").unwrap_or_default().to_string();
                facts.put("log", format!("{previous} / 记得带雨伞"));
                Ok(())
            })
            .build();

        assert_eq!(rule.name(), "weather rule");
        assert_eq!(rule.priority(), 1);
        assert_eq!(rule.description(), "when rain, take an umbrella");
        assert_eq!(rule.action_count(), 2);

        let mut facts = Facts::new();
        assert!(rule.evaluate(&facts).unwrap());
        rule.execute(&mut facts).unwrap();
        assert_eq!(facts.get_str("log"), Some("dear, take an umbrella please / 记得带雨伞"));
    }

    #[test]
    fn unnamed_rule_keeps_defaults() {
        let rule = RuleBuilder::new().when(condition::never).build();
        assert!(rule.key().is_unnamed());
        assert_eq!(rule.priority(), DEFAULT_PRIORITY);
        assert_eq!(rule.description(), DEFAULT_DESCRIPTION);
    }
}
