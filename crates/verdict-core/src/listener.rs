//! Observer hooks around a firing pass
//!
//! Listeners are trusted caller code: they run synchronously, in registration order, and
//! a panicking listener is not isolated. Only [`RuleListener::before_evaluate`] can change
//! what the engine does, by vetoing a rule.

use crate::facts::Facts;
use crate::rule::Rule;
use crate::rule_set::RuleSet;
use tracing::debug;

/// Rule-level hooks. Every method has a no-op default.
pub trait RuleListener {
    /// Gate run before a rule is evaluated. Returning `false` skips the rule entirely.
    fn before_evaluate(&self, _rule: &dyn Rule, _facts: &Facts) -> bool {
        true
    }

    fn after_evaluate(&self, _rule: &dyn Rule, _facts: &Facts, _result: bool) {}

    /// The rule's condition failed; the rule counts as not triggered
    fn on_evaluation_error(&self, _rule: &dyn Rule, _facts: &Facts, _error: &anyhow::Error) {}

    fn before_execute(&self, _rule: &dyn Rule, _facts: &Facts) {}

    fn on_success(&self, _rule: &dyn Rule, _facts: &Facts) {}

    /// One of the rule's actions failed; later actions of the rule did not run
    fn on_failure(&self, _rule: &dyn Rule, _facts: &Facts, _error: &anyhow::Error) {}
}

/// Engine-level hooks, called once per firing pass
pub trait RulesEngineListener {
    fn before_evaluate(&self, _rules: &RuleSet, _facts: &Facts) {}

    fn after_execute(&self, _rules: &RuleSet, _facts: &Facts) {}
}

/// Logs every rule-level hook through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingRuleListener;

impl RuleListener for TracingRuleListener {
    fn before_evaluate(&self, rule: &dyn Rule, facts: &Facts) -> bool {
        debug!(rule = %rule.name(), %facts, "before evaluate");
        true
    }

    fn after_evaluate(&self, rule: &dyn Rule, facts: &Facts, result: bool) {
        debug!(rule = %rule.name(), %facts, result, "after evaluate");
    }

    fn on_evaluation_error(&self, rule: &dyn Rule, facts: &Facts, error: &anyhow::Error) {
        debug!(rule = %rule.name(), %facts, error = %format!("{error:#}"), "on evaluation error");
    }

    fn before_execute(&self, rule: &dyn Rule, facts: &Facts) {
        debug!(rule = %rule.name(), %facts, "before execute");
    }

    fn on_success(&self, rule: &dyn Rule, facts: &Facts) {
        debug!(rule = %rule.name(), %facts, "on success");
    }

    fn on_failure(&self, rule: &dyn Rule, facts: &Facts, error: &anyhow::Error) {
        debug!(rule = %rule.name(), %facts, error = %format!("{error:#}"), "on failure");
    }
}

impl RulesEngineListener for TracingRuleListener {
    fn before_evaluate(&self, rules: &RuleSet, facts: &Facts) {
        debug!(rules = rules.len(), %facts, "firing rules");
    }

    fn after_execute(&self, rules: &RuleSet, facts: &Facts) {
        debug!(rules = rules.len(), %facts, "rules fired");
    }
}
