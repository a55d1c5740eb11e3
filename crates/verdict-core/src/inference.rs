//! Forward-chaining engine
//!
//! Re-fires the rules whose conditions hold until none does. Each cycle selects the
//! candidates by evaluating every condition within the priority threshold (without
//! notifying listeners), then fires the candidates through a [`DefaultRulesEngine`], which
//! does notify rule listeners. Rules whose condition fails with an error are never
//! candidates. Rules above the priority threshold are never candidates. A cycle in which
//! no candidate executes successfully ends the run.

use crate::config::RulesEngineParameters;
use crate::engine::{DefaultRulesEngine, RulesEngine};
use crate::facts::Facts;
use crate::listener::{RuleListener, RulesEngineListener};
use crate::rule::{Rule, RuleKey};
use crate::rule_set::RuleSet;
use std::collections::BTreeMap;
use tracing::{debug, instrument, trace, warn};

#[derive(Default)]
pub struct InferenceRulesEngine {
    delegate: DefaultRulesEngine,
    engine_listeners: Vec<Box<dyn RulesEngineListener>>,
}

impl InferenceRulesEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameters(parameters: RulesEngineParameters) -> Self {
        Self { delegate: DefaultRulesEngine::with_parameters(parameters), ..Self::default() }
    }

    /// Rule listeners are notified by every cycle's firing pass
    pub fn register_rule_listener(&mut self, listener: impl RuleListener + 'static) {
        self.delegate.register_rule_listener(listener);
    }

    /// Engine listeners are notified once around the whole inference run
    pub fn register_engine_listener(&mut self, listener: impl RulesEngineListener + 'static) {
        self.engine_listeners.push(Box::new(listener));
    }

    fn select_candidates<'r>(&self, rules: &'r RuleSet, facts: &Facts) -> Vec<&'r dyn Rule> {
        rules
            .iter()
            .take_while(|rule| self.delegate.within_threshold(*rule))
            .filter(|rule| match rule.evaluate(facts) {
                Ok(triggered) => triggered,
                Err(error) => {
                    trace!(rule = %rule.name(), error = %format!("{error:#}"), "Not a candidate");
                    false
                }
            })
            .collect()
    }
}

impl RulesEngine for InferenceRulesEngine {
    fn parameters(&self) -> &RulesEngineParameters {
        self.delegate.parameters()
    }

    fn rule_listeners(&self) -> &[Box<dyn RuleListener>] {
        self.delegate.rule_listeners()
    }

    fn engine_listeners(&self) -> &[Box<dyn RulesEngineListener>] {
        &self.engine_listeners
    }

    #[instrument(skip_all, fields(rules = rules.len(), facts = facts.len()))]
    fn fire(&self, rules: &RuleSet, facts: &mut Facts) {
        for listener in &self.engine_listeners {
            listener.before_evaluate(rules, facts);
        }

        let max_cycles = self.parameters().max_inference_cycles;
        let mut cycles = 0usize;
        loop {
            if max_cycles.is_some_and(|max| cycles >= max) {
                warn!(cycles, "Inference cycle limit reached, stopping");
                break;
            }
            let candidates = self.select_candidates(rules, facts);
            if candidates.is_empty() {
                debug!(cycles, "No candidate rules left");
                break;
            }
            debug!(cycle = cycles + 1, candidates = candidates.len(), "Firing candidate rules");
            let applied = self.delegate.do_fire(candidates, facts);
            cycles += 1;
            if applied == 0 {
                debug!(cycles, "No candidate rule applied, facts unchanged");
                break;
            }
        }

        for listener in &self.engine_listeners {
            listener.after_execute(rules, facts);
        }
    }

    fn check(&self, rules: &RuleSet, facts: &Facts) -> BTreeMap<RuleKey, bool> {
        for listener in &self.engine_listeners {
            listener.before_evaluate(rules, facts);
        }
        let outcome = self.delegate.do_check(rules, facts);
        for listener in &self.engine_listeners {
            listener.after_execute(rules, facts);
        }
        outcome
    }
}
