#![allow(missing_docs)]
//! Core of the Verdict rules engine.
//!
//! Rules are named, prioritised condition + actions units fired against a mutable
//! [`Facts`] store. This crate provides the rule capability, the adapter that turns
//! declared objects into rules, the ordered [`RuleSet`], and the single-pass and
//! forward-chaining engines with their listener hooks.

/// Adaptation of declared objects into rules
pub mod adapter;
/// Fluent construction of closure-backed rules
pub mod builder;
/// Engine parameters and their loading from files and environment
pub mod config;
/// Single-pass firing engine
pub mod engine;
/// Error types for configuration and rule failures
pub mod error;
/// The named-fact store
pub mod facts;
/// Forward-chaining engine
pub mod inference;
/// Rule-level and engine-level listener hooks
pub mod listener;
/// The rule capability, its identity and the default rule
pub mod rule;
/// Ordered, duplicate-free rule collection
pub mod rule_set;

pub use adapter::{
    AdaptedRule, Args, ArgsMut, Candidate, MethodBody, MethodDecl, MethodTag, Param, RuleAdapter,
    RuleDeclaration,
};
pub use builder::RuleBuilder;
pub use config::RulesEngineParameters;
pub use engine::{DefaultRulesEngine, RulesEngine};
pub use error::{RuleError, RuleResult};
pub use facts::{Fact, Facts};
pub use inference::InferenceRulesEngine;
pub use listener::{RuleListener, RulesEngineListener, TracingRuleListener};
pub use rule::{DefaultRule, Rule, RuleKey, RuleMetadata, condition};
pub use rule_set::RuleSet;
pub use verdict_types::FactValue;
