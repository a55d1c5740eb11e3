//! Adaptation of declared objects into rules
//!
//! A type can become a rule in two ways: by implementing [`Rule`] directly, or by
//! implementing [`RuleDeclaration`], which describes the type's methods as tagged
//! callables:
//!
//! - exactly one method tagged [`MethodTag::Condition`], whose body returns a boolean;
//! - zero or more methods tagged [`MethodTag::Action`] with an explicit order;
//! - for every method, a parameter list where each [`Param`] is either bound to a named
//!   fact or unbound, in which case it receives the whole fact store.
//!
//! [`RuleAdapter`] scans the declaration once, validates it and builds an [`AdaptedRule`]
//! holding the resolved condition, the action table sorted by `(order, declaration
//! order)` and the parameter-binding plan of every method. Native rules pass through the
//! adapter untouched.
//!
//! ```text
//! Candidate::Native(rule)     ──────────────────────────────► rule
//! Candidate::Declared(object) ── scan methods ── validate ──► AdaptedRule<T>
//! ```
//!
//! Rules for the scan:
//! - no condition method is a configuration error;
//! - when several methods carry the condition tag, the first declared one wins and the
//!   others are ignored with a warning;
//! - a condition tag on a procedure body is a configuration error;
//! - an action tag on a predicate body is allowed, the boolean is discarded;
//! - two action entries with the same method name and the same order are one action;
//! - actions with equal order run in declaration order;
//! - more than one unbound (whole store) parameter on a method is a configuration error.

use crate::error::{RuleError, RuleResult};
use crate::facts::Facts;
use crate::rule::{Rule, RuleMetadata};
use anyhow::Context;
use std::cell::OnceCell;
use std::fmt;
use tracing::{debug, instrument, trace, warn};
use verdict_types::FactValue;

/// Binding of one method parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    /// Bound to the fact with this name
    Fact(String),
    /// Unbound: receives the whole fact store
    Facts,
}

/// Tag carried by a declared method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodTag {
    Condition,
    Action { order: i32 },
}

pub type PredicateFn<T> = Box<dyn Fn(&T, &Args<'_>) -> anyhow::Result<bool>>;
pub type ProcedureFn<T> = Box<dyn Fn(&T, &mut ArgsMut<'_>) -> anyhow::Result<()>>;

/// Callable body of a declared method
pub enum MethodBody<T> {
    /// Returns a boolean; may serve as condition or action
    Predicate(PredicateFn<T>),
    /// Returns nothing; may only serve as action
    Procedure(ProcedureFn<T>),
}

impl<T> MethodBody<T> {
    fn kind(&self) -> &'static str {
        match self {
            MethodBody::Predicate(_) => "predicate",
            MethodBody::Procedure(_) => "procedure",
        }
    }
}

/// One method of a declared rule object
pub struct MethodDecl<T> {
    name: String,
    tag: Option<MethodTag>,
    params: Vec<Param>,
    body: MethodBody<T>,
}

impl<T> MethodDecl<T> {
    /// Untagged method; ignored by the adapter unless tagged later
    pub fn new(name: impl Into<String>, body: MethodBody<T>) -> Self {
        Self { name: name.into(), tag: None, params: Vec::new(), body }
    }

    /// Method tagged as the rule's condition
    pub fn condition<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&T, &Args<'_>) -> anyhow::Result<bool> + 'static,
    {
        Self::new(name, MethodBody::Predicate(Box::new(predicate))).tagged(MethodTag::Condition)
    }

    /// Method tagged as an action with the given order
    pub fn action<F>(name: impl Into<String>, order: i32, procedure: F) -> Self
    where
        F: Fn(&T, &mut ArgsMut<'_>) -> anyhow::Result<()> + 'static,
    {
        Self::new(name, MethodBody::Procedure(Box::new(procedure)))
            .tagged(MethodTag::Action { order })
    }

    pub fn tagged(mut self, tag: MethodTag) -> Self {
        self.tag = Some(tag);
        self
    }

    /// Append a parameter bound to the fact `name`
    pub fn fact(mut self, name: impl Into<String>) -> Self {
        self.params.push(Param::Fact(name.into()));
        self
    }

    /// Append an unbound parameter receiving the whole fact store
    pub fn facts(mut self) -> Self {
        self.params.push(Param::Facts);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tag(&self) -> Option<MethodTag> {
        self.tag
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }
}

/// Declarative description of a plain object as a rule
pub trait RuleDeclaration: 'static {
    /// Rule-level metadata. Read lazily, once, by the adapted rule.
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata::default()
    }

    /// The object's methods in declaration order
    fn methods() -> Vec<MethodDecl<Self>>
    where
        Self: Sized;
}

/// Arguments of a condition, or of a predicate used as action
pub struct Args<'f> {
    values: Vec<Option<FactValue>>,
    facts: Option<&'f Facts>,
}

impl<'f> Args<'f> {
    /// Value of the fact-bound parameter at `index`; `None` for the store parameter
    pub fn get(&self, index: usize) -> Option<&FactValue> {
        self.values.get(index).and_then(Option::as_ref)
    }

    pub fn get_bool(&self, index: usize) -> Option<bool> {
        self.get(index).and_then(FactValue::as_bool)
    }

    pub fn get_integer(&self, index: usize) -> Option<i64> {
        self.get(index).and_then(FactValue::as_integer)
    }

    pub fn get_str(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(FactValue::as_str)
    }

    /// The whole fact store, if the method declared an unbound parameter
    pub fn facts(&self) -> Option<&'f Facts> {
        self.facts
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Arguments of a procedure action
pub struct ArgsMut<'f> {
    values: Vec<Option<FactValue>>,
    facts: Option<&'f mut Facts>,
}

impl ArgsMut<'_> {
    /// Value of the fact-bound parameter at `index`, as resolved before the call
    pub fn get(&self, index: usize) -> Option<&FactValue> {
        self.values.get(index).and_then(Option::as_ref)
    }

    pub fn get_bool(&self, index: usize) -> Option<bool> {
        self.get(index).and_then(FactValue::as_bool)
    }

    pub fn get_integer(&self, index: usize) -> Option<i64> {
        self.get(index).and_then(FactValue::as_integer)
    }

    pub fn get_str(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(FactValue::as_str)
    }

    pub fn facts(&self) -> Option<&Facts> {
        self.facts.as_deref()
    }

    /// Mutable fact store, if the method declared an unbound parameter
    pub fn facts_mut(&mut self) -> Option<&mut Facts> {
        self.facts.as_deref_mut()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

struct ConditionMethod<T> {
    name: String,
    params: Vec<Param>,
    predicate: PredicateFn<T>,
}

struct ActionMethod<T> {
    name: String,
    order: i32,
    params: Vec<Param>,
    body: MethodBody<T>,
}

/// Resolve a parameter plan against the store. Store parameters resolve to `None`.
fn resolve(params: &[Param], facts: &Facts) -> RuleResult<Vec<Option<FactValue>>> {
    params
        .iter()
        .map(|param| match param {
            Param::Fact(name) => facts.require(name).map(|value| Some(value.clone())),
            Param::Facts => Ok(None),
        })
        .collect()
}

fn wants_store(params: &[Param]) -> bool {
    params.contains(&Param::Facts)
}

/// Rule view over a declared object
pub struct AdaptedRule<T: RuleDeclaration> {
    target: T,
    metadata: OnceCell<RuleMetadata>,
    condition: ConditionMethod<T>,
    actions: Vec<ActionMethod<T>>,
}

impl<T: RuleDeclaration> AdaptedRule<T> {
    pub fn target(&self) -> &T {
        &self.target
    }

    /// Action method names in execution order
    pub fn action_names(&self) -> Vec<&str> {
        self.actions.iter().map(|action| action.name.as_str()).collect()
    }

    pub fn condition_name(&self) -> &str {
        &self.condition.name
    }

    fn metadata(&self) -> &RuleMetadata {
        self.metadata.get_or_init(|| self.target.metadata())
    }
}

impl<T: RuleDeclaration> Rule for AdaptedRule<T> {
    fn name(&self) -> &str {
        &self.metadata().name
    }

    fn description(&self) -> &str {
        &self.metadata().description
    }

    fn priority(&self) -> i32 {
        self.metadata().priority
    }

    fn evaluate(&self, facts: &Facts) -> anyhow::Result<bool> {
        let condition = &self.condition;
        let values = resolve(&condition.params, facts)?;
        let args = Args { values, facts: wants_store(&condition.params).then_some(facts) };
        trace!(rule = %self.name(), method = %condition.name, "Invoking condition");
        (condition.predicate)(&self.target, &args)
    }

    fn execute(&self, facts: &mut Facts) -> anyhow::Result<()> {
        for action in &self.actions {
            trace!(rule = %self.name(), method = %action.name, order = action.order, "Invoking action");
            let values = resolve(&action.params, facts)
                .with_context(|| format!("cannot bind parameters of action `{}`", action.name))?;
            let outcome = match &action.body {
                MethodBody::Procedure(procedure) => {
                    let store = if wants_store(&action.params) { Some(&mut *facts) } else { None };
                    let mut args = ArgsMut { values, facts: store };
                    procedure(&self.target, &mut args)
                }
                MethodBody::Predicate(predicate) => {
                    let args =
                        Args { values, facts: wants_store(&action.params).then_some(&*facts) };
                    predicate(&self.target, &args).map(|_| ())
                }
            };
            outcome.with_context(|| format!("action `{}` failed", action.name))?;
        }
        Ok(())
    }
}

impl<T: RuleDeclaration> fmt::Display for AdaptedRule<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self as &dyn Rule, f)
    }
}

impl<T: RuleDeclaration> fmt::Debug for AdaptedRule<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdaptedRule")
            .field("target", &std::any::type_name::<T>())
            .field("condition", &self.condition.name)
            .field("actions", &self.action_names())
            .finish()
    }
}

/// Type-erased declared object, so declared and native rules can travel together
pub trait Declared {
    fn into_rule(self: Box<Self>) -> RuleResult<Box<dyn Rule>>;
}

impl<T: RuleDeclaration> Declared for T {
    fn into_rule(self: Box<Self>) -> RuleResult<Box<dyn Rule>> {
        Ok(Box::new(RuleAdapter::adapt_declared(*self)?))
    }
}

/// Anything the adapter can turn into a rule
pub enum Candidate {
    Native(Box<dyn Rule>),
    Declared(Box<dyn Declared>),
}

impl Candidate {
    pub fn native(rule: impl Rule + 'static) -> Self {
        Candidate::Native(Box::new(rule))
    }

    pub fn declared(target: impl RuleDeclaration) -> Self {
        Candidate::Declared(Box::new(target))
    }
}

impl From<Box<dyn Rule>> for Candidate {
    fn from(rule: Box<dyn Rule>) -> Self {
        Candidate::Native(rule)
    }
}

/// Turns candidates into rules
pub struct RuleAdapter;

impl RuleAdapter {
    /// Adapt a candidate. Native rules are returned as-is.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a declared candidate is malformed.
    pub fn adapt(candidate: Candidate) -> RuleResult<Box<dyn Rule>> {
        match candidate {
            Candidate::Native(rule) => Ok(rule),
            Candidate::Declared(declared) => declared.into_rule(),
        }
    }

    /// Scan and validate a declared object once, building its rule view
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the declaration has no condition method, tags a
    /// procedure as condition, or has a method with more than one unbound parameter.
    #[instrument(skip(target), fields(declaration = std::any::type_name::<T>()))]
    pub fn adapt_declared<T: RuleDeclaration>(target: T) -> RuleResult<AdaptedRule<T>> {
        let declaration = std::any::type_name::<T>();
        let mut condition: Option<ConditionMethod<T>> = None;
        let mut actions: Vec<ActionMethod<T>> = Vec::new();

        for method in T::methods() {
            let store_params = method.params.iter().filter(|p| **p == Param::Facts).count();
            if store_params > 1 {
                return Err(RuleError::invalid_declaration(
                    declaration,
                    format!(
                        "method `{}` has {store_params} unbound parameters, at most one may receive the fact store",
                        method.name
                    ),
                ));
            }

            match method.tag {
                Some(MethodTag::Condition) => {
                    if let Some(existing) = &condition {
                        warn!(
                            kept = %existing.name,
                            ignored = %method.name,
                            "Several condition methods declared, keeping the first"
                        );
                        continue;
                    }
                    let MethodBody::Predicate(predicate) = method.body else {
                        return Err(RuleError::invalid_declaration(
                            declaration,
                            format!(
                                "condition method `{}` must return a boolean, found a {}",
                                method.name,
                                method.body.kind()
                            ),
                        ));
                    };
                    condition = Some(ConditionMethod {
                        name: method.name,
                        params: method.params,
                        predicate,
                    });
                }
                Some(MethodTag::Action { order }) => {
                    if actions.iter().any(|a| a.name == method.name && a.order == order) {
                        debug!(method = %method.name, order, "Duplicate action declaration ignored");
                        continue;
                    }
                    actions.push(ActionMethod {
                        name: method.name,
                        order,
                        params: method.params,
                        body: method.body,
                    });
                }
                None => trace!(method = %method.name, "Untagged method ignored"),
            }
        }

        let Some(condition) = condition else {
            return Err(RuleError::invalid_declaration(
                declaration,
                "no method is tagged as condition",
            ));
        };

        // Stable sort keeps declaration order among equal orders.
        actions.sort_by_key(|action| action.order);

        debug!(condition = %condition.name, actions = actions.len(), "Adapted declared rule");
        Ok(AdaptedRule { target, metadata: OnceCell::new(), condition, actions })
    }
}
