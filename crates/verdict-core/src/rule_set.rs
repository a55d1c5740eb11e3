//! Ordered, duplicate-free rule collection
//!
//! Members are keyed by [`RuleKey`] in a `BTreeMap`, so iteration is always in firing
//! order and a second registration under an existing `(name, priority)` is a no-op.

use crate::adapter::{Candidate, RuleAdapter, RuleDeclaration};
use crate::error::RuleResult;
use crate::rule::{Rule, RuleKey};
use std::collections::BTreeMap;
use std::collections::btree_map::Values;
use std::fmt;
use tracing::debug;

#[derive(Default)]
pub struct RuleSet {
    rules: BTreeMap<RuleKey, Box<dyn Rule>>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule. Returns `false` if a rule with the same key was already present,
    /// in which case the set is unchanged.
    pub fn register<R: Rule + 'static>(&mut self, rule: R) -> bool {
        self.register_boxed(Box::new(rule))
    }

    pub fn register_boxed(&mut self, rule: Box<dyn Rule>) -> bool {
        let key = rule.key();
        if self.rules.contains_key(&key) {
            debug!(rule = %key, "Rule already registered, ignoring");
            return false;
        }
        debug!(rule = %key, "Registering rule");
        self.rules.insert(key, rule);
        true
    }

    /// Adapt a candidate and register the resulting rule
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a declared candidate is malformed.
    pub fn register_candidate(&mut self, candidate: Candidate) -> RuleResult<bool> {
        Ok(self.register_boxed(RuleAdapter::adapt(candidate)?))
    }

    /// Adapt a declared object and register it
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the declaration is malformed.
    pub fn register_declared<T: RuleDeclaration>(&mut self, target: T) -> RuleResult<bool> {
        Ok(self.register(RuleAdapter::adapt_declared(target)?))
    }

    /// Remove the member sharing `rule`'s key
    pub fn unregister(&mut self, rule: &dyn Rule) -> Option<Box<dyn Rule>> {
        self.unregister_key(&rule.key())
    }

    pub fn unregister_key(&mut self, key: &RuleKey) -> Option<Box<dyn Rule>> {
        let removed = self.rules.remove(key);
        if removed.is_some() {
            debug!(rule = %key, "Unregistered rule");
        }
        removed
    }

    /// Remove every member named `name`, whatever its priority. Returns how many went.
    pub fn unregister_by_name(&mut self, name: &str) -> usize {
        let before = self.rules.len();
        self.rules.retain(|key, _| key.name != name);
        let removed = before - self.rules.len();
        debug!(rule = name, removed, "Unregistered rules by name");
        removed
    }

    pub fn contains(&self, rule: &dyn Rule) -> bool {
        self.rules.contains_key(&rule.key())
    }

    pub fn get(&self, key: &RuleKey) -> Option<&dyn Rule> {
        self.rules.get(key).map(|rule| &**rule)
    }

    /// Members in firing order
    pub fn iter(&self) -> Iter<'_> {
        Iter { inner: self.rules.values() }
    }

    /// Keys in firing order
    pub fn keys(&self) -> impl Iterator<Item = &RuleKey> {
        self.rules.keys()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn clear(&mut self) {
        self.rules.clear();
    }
}

/// Iterator over the members of a [`RuleSet`] in firing order
pub struct Iter<'a> {
    inner: Values<'a, RuleKey, Box<dyn Rule>>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a dyn Rule;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|rule| &**rule)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a dyn Rule;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Box<dyn Rule>> for RuleSet {
    fn from_iter<I: IntoIterator<Item = Box<dyn Rule>>>(iter: I) -> Self {
        let mut rules = RuleSet::new();
        for rule in iter {
            rules.register_boxed(rule);
        }
        rules
    }
}

impl Extend<Box<dyn Rule>> for RuleSet {
    fn extend<I: IntoIterator<Item = Box<dyn Rule>>>(&mut self, iter: I) {
        for rule in iter {
            self.register_boxed(rule);
        }
    }
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
