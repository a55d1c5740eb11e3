//! The firing engine
//!
//! A firing pass walks the rule set in firing order. Per rule:
//!
//! ```text
//! gate ──veto──► skip
//!  │
//! evaluate ──error──► on_evaluation_error ──► next rule
//!  │ false ──► after_evaluate(false) ──► next rule
//!  │ true  ──► after_evaluate(true) ──► before_execute ──► execute
//!                                                          │ ok    ──► on_success ──► next rule
//!                                                          │ error ──► on_failure ──► next rule
//! ```
//!
//! Evaluation and execution failures are absorbed here and turned into listener
//! notifications; nothing a rule does can abort the pass. Firing is single-threaded and
//! the fact store is borrowed mutably for the whole pass, so concurrent passes over one
//! store are ruled out by the borrow checker.

use crate::config::RulesEngineParameters;
use crate::facts::Facts;
use crate::listener::{RuleListener, RulesEngineListener};
use crate::rule::{Rule, RuleKey};
use crate::rule_set::RuleSet;
use std::collections::BTreeMap;
use tracing::{debug, instrument, warn};

/// Common surface of the engines
pub trait RulesEngine {
    fn parameters(&self) -> &RulesEngineParameters;

    fn rule_listeners(&self) -> &[Box<dyn RuleListener>];

    fn engine_listeners(&self) -> &[Box<dyn RulesEngineListener>];

    /// Fire `rules` against `facts`
    fn fire(&self, rules: &RuleSet, facts: &mut Facts);

    /// Evaluate `rules` without executing them. Rules vetoed by a listener are absent
    /// from the result.
    fn check(&self, rules: &RuleSet, facts: &Facts) -> BTreeMap<RuleKey, bool>;
}

/// What happened to one rule of a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Outcome {
    applied: bool,
    stop: bool,
}

impl Outcome {
    const SKIPPED: Outcome = Outcome { applied: false, stop: false };
}

/// Fires every rule of a set once, in order
#[derive(Default)]
pub struct DefaultRulesEngine {
    parameters: RulesEngineParameters,
    rule_listeners: Vec<Box<dyn RuleListener>>,
    engine_listeners: Vec<Box<dyn RulesEngineListener>>,
}

impl DefaultRulesEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameters(parameters: RulesEngineParameters) -> Self {
        Self { parameters, ..Self::default() }
    }

    pub fn register_rule_listener(&mut self, listener: impl RuleListener + 'static) {
        self.rule_listeners.push(Box::new(listener));
    }

    pub fn register_engine_listener(&mut self, listener: impl RulesEngineListener + 'static) {
        self.engine_listeners.push(Box::new(listener));
    }

    pub fn parameters_mut(&mut self) -> &mut RulesEngineParameters {
        &mut self.parameters
    }

    pub(crate) fn notify_before_rules(&self, rules: &RuleSet, facts: &Facts) {
        for listener in &self.engine_listeners {
            listener.before_evaluate(rules, facts);
        }
    }

    pub(crate) fn notify_after_rules(&self, rules: &RuleSet, facts: &Facts) {
        for listener in &self.engine_listeners {
            listener.after_execute(rules, facts);
        }
    }

    /// Rule-level gate; the first veto wins and later listeners are not asked
    fn should_be_evaluated(&self, rule: &dyn Rule, facts: &Facts) -> bool {
        self.rule_listeners.iter().all(|listener| listener.before_evaluate(rule, facts))
    }

    /// Whether `rule` is within the priority threshold
    pub(crate) fn within_threshold(&self, rule: &dyn Rule) -> bool {
        rule.priority() <= self.parameters.priority_threshold
    }

    /// The per-rule loop, without the engine-level hooks. Returns how many rules executed
    /// successfully.
    pub(crate) fn do_fire<'r>(
        &self,
        rules: impl IntoIterator<Item = &'r dyn Rule>,
        facts: &mut Facts,
    ) -> usize {
        let mut applied = 0;
        for rule in rules {
            if !self.within_threshold(rule) {
                debug!(
                    rule = %rule.name(),
                    priority = rule.priority(),
                    threshold = self.parameters.priority_threshold,
                    "Rule priority threshold exceeded, skipping remaining rules"
                );
                break;
            }
            let outcome = self.fire_rule(rule, facts);
            if outcome.applied {
                applied += 1;
            }
            if outcome.stop {
                break;
            }
        }
        applied
    }

    fn fire_rule(&self, rule: &dyn Rule, facts: &mut Facts) -> Outcome {
        if !self.should_be_evaluated(rule, facts) {
            debug!(rule = %rule.name(), "Rule vetoed before evaluation");
            return Outcome::SKIPPED;
        }

        let triggered = match rule.evaluate(facts) {
            Ok(result) => {
                debug!(rule = %rule.name(), result, "Rule evaluated");
                for listener in &self.rule_listeners {
                    listener.after_evaluate(rule, facts, result);
                }
                result
            }
            Err(error) => {
                warn!(rule = %rule.name(), error = %format!("{error:#}"), "Rule evaluation failed");
                for listener in &self.rule_listeners {
                    listener.on_evaluation_error(rule, facts, &error);
                }
                false
            }
        };

        if !triggered {
            let stop = self.parameters.skip_on_first_non_triggered_rule;
            if stop {
                debug!(rule = %rule.name(), "Rule not triggered, skipping remaining rules");
            }
            return Outcome { applied: false, stop };
        }

        for listener in &self.rule_listeners {
            listener.before_execute(rule, facts);
        }
        match rule.execute(facts) {
            Ok(()) => {
                debug!(rule = %rule.name(), "Rule executed successfully");
                for listener in &self.rule_listeners {
                    listener.on_success(rule, facts);
                }
                let stop = self.parameters.skip_on_first_applied_rule;
                if stop {
                    debug!(rule = %rule.name(), "Rule applied, skipping remaining rules");
                }
                Outcome { applied: true, stop }
            }
            Err(error) => {
                warn!(rule = %rule.name(), error = %format!("{error:#}"), "Rule execution failed");
                for listener in &self.rule_listeners {
                    listener.on_failure(rule, facts, &error);
                }
                let stop = self.parameters.skip_on_first_failed_rule;
                if stop {
                    debug!(rule = %rule.name(), "Rule failed, skipping remaining rules");
                }
                Outcome { applied: false, stop }
            }
        }
    }

    pub(crate) fn do_check(&self, rules: &RuleSet, facts: &Facts) -> BTreeMap<RuleKey, bool> {
        let mut outcome = BTreeMap::new();
        for rule in rules {
            if !self.should_be_evaluated(rule, facts) {
                continue;
            }
            let result = rule.evaluate(facts).unwrap_or_else(|error| {
                warn!(rule = %rule.name(), error = %format!("{error:#}"), "Rule evaluation failed during check");
                false
            });
            outcome.insert(rule.key(), result);
        }
        outcome
    }
}

impl RulesEngine for DefaultRulesEngine {
    fn parameters(&self) -> &RulesEngineParameters {
        &self.parameters
    }

    fn rule_listeners(&self) -> &[Box<dyn RuleListener>] {
        &self.rule_listeners
    }

    fn engine_listeners(&self) -> &[Box<dyn RulesEngineListener>] {
        &self.engine_listeners
    }

    #[instrument(skip_all, fields(rules = rules.len(), facts = facts.len()))]
    fn fire(&self, rules: &RuleSet, facts: &mut Facts) {
        debug!(?rules, %facts, "Firing rules");
        self.notify_before_rules(rules, facts);
        let applied = self.do_fire(rules, facts);
        debug!(applied, "Rules fired");
        self.notify_after_rules(rules, facts);
    }

    #[instrument(skip_all, fields(rules = rules.len(), facts = facts.len()))]
    fn check(&self, rules: &RuleSet, facts: &Facts) -> BTreeMap<RuleKey, bool> {
        self.notify_before_rules(rules, facts);
        let outcome = self.do_check(rules, facts);
        self.notify_after_rules(rules, facts);
        outcome
    }
}
