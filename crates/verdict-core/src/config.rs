//! Engine parameters
//!
//! Parameters can be built in code, loaded from a YAML or JSON file, or read from
//! `VERDICT_*` environment variables. Every field has a default, so partial documents are
//! fine.

use crate::error::{RuleError, RuleResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Options that short-circuit the per-rule loop of a firing pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesEngineParameters {
    /// Stop after the first rule that executed successfully
    pub skip_on_first_applied_rule: bool,
    /// Stop after the first rule whose execution failed
    pub skip_on_first_failed_rule: bool,
    /// Stop after the first rule that did not trigger (false or evaluation error)
    pub skip_on_first_non_triggered_rule: bool,
    /// Rules with a priority above this value are not fired
    pub priority_threshold: i32,
    /// Upper bound on inference cycles; `None` loops until no rule triggers
    pub max_inference_cycles: Option<usize>,
}

impl Default for RulesEngineParameters {
    fn default() -> Self {
        Self {
            skip_on_first_applied_rule: false,
            skip_on_first_failed_rule: false,
            skip_on_first_non_triggered_rule: false,
            priority_threshold: i32::MAX,
            max_inference_cycles: None,
        }
    }
}

const ENV_SKIP_ON_FIRST_APPLIED_RULE: &str = "VERDICT_SKIP_ON_FIRST_APPLIED_RULE";
const ENV_SKIP_ON_FIRST_FAILED_RULE: &str = "VERDICT_SKIP_ON_FIRST_FAILED_RULE";
const ENV_SKIP_ON_FIRST_NON_TRIGGERED_RULE: &str = "VERDICT_SKIP_ON_FIRST_NON_TRIGGERED_RULE";
const ENV_PRIORITY_THRESHOLD: &str = "VERDICT_PRIORITY_THRESHOLD";
const ENV_MAX_INFERENCE_CYCLES: &str = "VERDICT_MAX_INFERENCE_CYCLES";

impl RulesEngineParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_skip_on_first_applied_rule(mut self, skip: bool) -> Self {
        self.skip_on_first_applied_rule = skip;
        self
    }

    pub fn with_skip_on_first_failed_rule(mut self, skip: bool) -> Self {
        self.skip_on_first_failed_rule = skip;
        self
    }

    pub fn with_skip_on_first_non_triggered_rule(mut self, skip: bool) -> Self {
        self.skip_on_first_non_triggered_rule = skip;
        self
    }

    pub fn with_priority_threshold(mut self, threshold: i32) -> Self {
        self.priority_threshold = threshold;
        self
    }

    pub fn with_max_inference_cycles(mut self, cycles: usize) -> Self {
        self.max_inference_cycles = Some(cycles);
        self
    }

    /// Load parameters from a `.yaml`/`.yml` or `.json` file
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the file cannot be read, has an unsupported
    /// extension, or does not parse.
    pub fn from_file(path: impl AsRef<Path>) -> RuleResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            RuleError::configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or_default();
        let params = Self::parse(&content, extension)?;
        info!(path = %path.display(), ?params, "Loaded engine parameters");
        Ok(params)
    }

    /// Parse parameters from a document in the given format (`yaml`, `yml` or `json`)
    ///
    /// # Errors
    ///
    /// Returns a configuration error for unknown formats and malformed documents.
    pub fn parse(content: &str, format: &str) -> RuleResult<Self> {
        match format {
            "yaml" | "yml" => serde_yaml::from_str(content).map_err(|e| {
                RuleError::configuration(format!("invalid engine parameters: {e}"))
            }),
            "json" => serde_json::from_str(content).map_err(|e| {
                RuleError::configuration(format!("invalid engine parameters: {e}"))
            }),
            other => Err(RuleError::configuration(format!(
                "unsupported parameters format '{other}', expected yaml or json"
            ))),
        }
    }

    /// Defaults overlaid with the `VERDICT_*` environment variables
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the variable whose value does not parse.
    pub fn from_environment() -> RuleResult<Self> {
        Self::default().overlay(|name| std::env::var(name).ok())
    }

    /// Overlay values produced by `lookup` on top of `self`
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the variable whose value does not parse.
    pub fn overlay<F>(mut self, lookup: F) -> RuleResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_SKIP_ON_FIRST_APPLIED_RULE) {
            self.skip_on_first_applied_rule = parse_setting(ENV_SKIP_ON_FIRST_APPLIED_RULE, &value)?;
        }
        if let Some(value) = lookup(ENV_SKIP_ON_FIRST_FAILED_RULE) {
            self.skip_on_first_failed_rule = parse_setting(ENV_SKIP_ON_FIRST_FAILED_RULE, &value)?;
        }
        if let Some(value) = lookup(ENV_SKIP_ON_FIRST_NON_TRIGGERED_RULE) {
            self.skip_on_first_non_triggered_rule =
                parse_setting(ENV_SKIP_ON_FIRST_NON_TRIGGERED_RULE, &value)?;
        }
        if let Some(value) = lookup(ENV_PRIORITY_THRESHOLD) {
            self.priority_threshold = parse_setting(ENV_PRIORITY_THRESHOLD, &value)?;
        }
        if let Some(value) = lookup(ENV_MAX_INFERENCE_CYCLES) {
            self.max_inference_cycles = Some(parse_setting(ENV_MAX_INFERENCE_CYCLES, &value)?);
        }
        debug!(params = ?self, "Resolved engine parameters");
        Ok(self)
    }
}

fn parse_setting<T>(setting: &str, value: &str) -> RuleResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| RuleError::invalid_setting(setting, format!("cannot parse '{value}': {e}")))
}
