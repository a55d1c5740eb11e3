//! The fact store a firing pass operates over.
//!
//! `Facts` is a plain name → [`FactValue`] map. The engine borrows it mutably for the
//! duration of a pass so actions can write derived facts; it never replaces or snapshots
//! the caller's store.

use crate::error::{RuleError, RuleResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use verdict_types::FactValue;

/// A named fact, for callers that build facts before adding them to a store
#[derive(Debug, Clone, PartialEq)]
pub struct Fact {
    pub name: String,
    pub value: FactValue,
}

impl Fact {
    pub fn new(name: impl Into<String>, value: impl Into<FactValue>) -> Self {
        Self { name: name.into(), value: value.into() }
    }
}

/// Mutable bag of named facts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Facts {
    facts: HashMap<String, FactValue>,
}

impl Facts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a fact, returning the value it replaced
    pub fn put(&mut self, name: impl Into<String>, value: impl Into<FactValue>) -> Option<FactValue> {
        self.facts.insert(name.into(), value.into())
    }

    /// Add a prebuilt fact, returning the value it replaced
    pub fn add(&mut self, fact: Fact) -> Option<FactValue> {
        self.facts.insert(fact.name, fact.value)
    }

    /// Get a fact by name. `None` means the store has no mapping for `name`; a fact that
    /// is present with a `Null` value comes back as `Some(&FactValue::Null)`.
    pub fn get(&self, name: &str) -> Option<&FactValue> {
        self.facts.get(name)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(FactValue::as_bool)
    }

    pub fn get_integer(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(FactValue::as_integer)
    }

    pub fn get_float(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(FactValue::as_float)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FactValue::as_str)
    }

    /// Get a fact that must exist.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::NoSuchFact`] when there is no mapping for `name`.
    pub fn require(&self, name: &str) -> RuleResult<&FactValue> {
        self.get(name).ok_or_else(|| RuleError::no_such_fact(name, self.names()))
    }

    pub fn remove(&mut self, name: &str) -> Option<FactValue> {
        self.facts.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.facts.contains_key(name)
    }

    /// Read-only view of the underlying mapping
    pub fn as_map(&self) -> &HashMap<String, FactValue> {
        &self.facts
    }

    /// Fact names in ascending order
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.facts.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FactValue)> {
        self.facts.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    pub fn clear(&mut self) {
        self.facts.clear();
    }

    /// Parse facts from a JSON object document
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the document is not a JSON object of facts.
    pub fn from_json_str(json: &str) -> RuleResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| RuleError::configuration(format!("invalid facts document: {e}")))?;
        Self::try_from(&value)
    }

    /// Load facts from a JSON file
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the file cannot be read or parsed.
    pub fn from_json_file(path: impl AsRef<Path>) -> RuleResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            RuleError::configuration(format!("cannot read facts file {}: {e}", path.display()))
        })?;
        Self::from_json_str(&content)
    }

    /// Render as a JSON object
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.facts.iter().map(|(name, value)| (name.clone(), value.into())).collect(),
        )
    }
}

impl TryFrom<&serde_json::Value> for Facts {
    type Error = RuleError;

    fn try_from(value: &serde_json::Value) -> Result<Self, Self::Error> {
        let serde_json::Value::Object(map) = value else {
            return Err(RuleError::configuration("facts document must be a JSON object"));
        };
        let mut facts = Facts::new();
        for (name, raw) in map {
            let value = FactValue::try_from(raw).map_err(|e| {
                RuleError::configuration(format!("invalid value for fact '{name}': {e}"))
            })?;
            facts.put(name.clone(), value);
        }
        Ok(facts)
    }
}

impl FromIterator<Fact> for Facts {
    fn from_iter<I: IntoIterator<Item = Fact>>(iter: I) -> Self {
        let mut facts = Facts::new();
        for fact in iter {
            facts.add(fact);
        }
        facts
    }
}

impl<K: Into<String>, V: Into<FactValue>> Extend<(K, V)> for Facts {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.put(name, value);
        }
    }
}

impl fmt::Display for Facts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Facts{{")?;
        for (i, name) in self.names().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}={}", self.facts[name])?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_valued_fact_is_present() {
        let mut facts = Facts::new();
        facts.put("maybe", FactValue::Null);
        assert!(facts.contains("maybe"));
        assert_eq!(facts.get("maybe"), Some(&FactValue::Null));
        assert!(facts.require("maybe").is_ok());
        assert!(facts.get("absent").is_none());
    }

    #[test]
    fn require_lists_known_facts() {
        let mut facts = Facts::new();
        facts.put("rain", true);
        facts.put("name", "Ken");
        let err = facts.require("humidity").unwrap_err();
        assert_eq!(
            err,
            RuleError::NoSuchFact {
                fact_name: "humidity".to_string(),
                known_facts: vec!["name".to_string(), "rain".to_string()],
            }
        );
    }

    #[test]
    fn put_returns_previous_value() {
        let mut facts = Facts::new();
        assert_eq!(facts.put("temperature", 30), None);
        assert_eq!(facts.put("temperature", 29), Some(FactValue::Integer(30)));
        assert_eq!(facts.remove("temperature"), Some(FactValue::Integer(29)));
        assert!(facts.is_empty());
    }

    #[test]
    fn display_is_sorted_by_name() {
        let facts: Facts =
            vec![Fact::new("temperature", 30), Fact::new("rain", true)].into_iter().collect();
        assert_eq!(facts.to_string(), "Facts{rain=true, temperature=30}");
    }

    #[test]
    fn loads_from_json() {
        let facts = Facts::from_json_str(r#"{"rain": true, "temperature": 30}"#).unwrap();
        assert_eq!(facts.get_bool("rain"), Some(true));
        assert_eq!(facts.get_integer("temperature"), Some(30));

        let err = Facts::from_json_str("[1, 2]").unwrap_err();
        assert_eq!(err.category(), "configuration");
    }
}
