//! Error types for the Verdict core engine
//!
//! Only configuration problems escape to callers as errors. Everything that goes wrong
//! while a rule is being evaluated or executed is absorbed by the engine and reported to
//! rule listeners as an `anyhow::Error`; the variants below that describe rule-level
//! failures can be recovered from such an error with `downcast_ref::<RuleError>()`.

use thiserror::Error;

/// Error type for Verdict core operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// Malformed rule declaration or engine configuration
    #[error("Configuration error: {message}")]
    Configuration { message: String, rule_name: Option<String>, setting: Option<String> },

    /// A method parameter is bound to a fact that is not in the fact store
    #[error("No fact named '{fact_name}' found in known facts: {known_facts:?}")]
    NoSuchFact { fact_name: String, known_facts: Vec<String> },

    /// A condition could not produce a result
    #[error("Evaluation error in rule '{rule_name}': {message}")]
    Evaluation { rule_name: String, message: String },
}

impl RuleError {
    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            RuleError::Configuration { .. } => "configuration",
            RuleError::NoSuchFact { .. } => "no_such_fact",
            RuleError::Evaluation { .. } => "evaluation",
        }
    }

    /// Whether the engine can carry on after this error.
    ///
    /// Configuration errors need fixing by the caller; rule-level failures only cost the
    /// rule they happened in.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, RuleError::Configuration { .. })
    }

    /// Name of the missing fact, for `NoSuchFact` errors
    pub fn missing_fact(&self) -> Option<&str> {
        match self {
            RuleError::NoSuchFact { fact_name, .. } => Some(fact_name),
            _ => None,
        }
    }
}

/// Result type alias for core operations
pub type RuleResult<T> = Result<T, RuleError>;

/// Convenience constructors for common error scenarios
impl RuleError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into(), rule_name: None, setting: None }
    }

    /// Create a configuration error for a malformed rule declaration
    pub fn invalid_declaration(rule_name: &str, message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            rule_name: Some(rule_name.to_string()),
            setting: None,
        }
    }

    /// Create a configuration error for a bad engine setting
    pub fn invalid_setting(setting: &str, message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            rule_name: None,
            setting: Some(setting.to_string()),
        }
    }

    /// Create a missing fact error
    pub fn no_such_fact(fact_name: &str, known_facts: Vec<String>) -> Self {
        Self::NoSuchFact { fact_name: fact_name.to_string(), known_facts }
    }

    /// Create an evaluation error
    pub fn evaluation(rule_name: &str, message: impl Into<String>) -> Self {
        Self::Evaluation { rule_name: rule_name.to_string(), message: message.into() }
    }
}
