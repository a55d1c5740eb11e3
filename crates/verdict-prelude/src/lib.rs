//! Verdict Prelude
//!
//! This crate re-exports the most frequently used public items of the Verdict rules
//! engine (`verdict-core` and `verdict-types`). Applications can depend on
//! `verdict-prelude` to avoid long import lists and to stay insulated from internal
//! module reshuffles.

#![deny(missing_docs)]

// Fact store & value model ---------------------------------------------------------------------

pub use verdict_core::{Fact, Facts};
pub use verdict_types::FactValue;

// Rules ----------------------------------------------------------------------------------------

pub use verdict_core::{DefaultRule, Rule, RuleBuilder, RuleKey, RuleMetadata, RuleSet, condition};

// Declared rules -------------------------------------------------------------------------------

pub use verdict_core::{
    Args, ArgsMut, Candidate, MethodDecl, MethodTag, RuleAdapter, RuleDeclaration,
};

// Engines, listeners & parameters --------------------------------------------------------------

pub use verdict_core::{
    DefaultRulesEngine, InferenceRulesEngine, RuleListener, RulesEngine, RulesEngineListener,
    RulesEngineParameters, TracingRuleListener,
};

// Errors ---------------------------------------------------------------------------------------

pub use verdict_core::{RuleError, RuleResult};
