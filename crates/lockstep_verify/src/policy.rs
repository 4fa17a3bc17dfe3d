//! Field comparison policies.
//!
//! A policy table lists, in evaluation order, which trace columns are
//! compared and how. Tables serialize to JSON so new fields can be checked
//! without code changes:
//!
//! ```json
//! {"fields": [
//!   {"field": "price", "policy": "exact"},
//!   {"field": "moe_confidence", "policy": "tolerance"},
//!   {"field": "moe_action", "policy": {"categorical": {"labels": {"0": "HOLD"}}}}
//! ]}
//! ```

use crate::error::{VerifyError, VerifyResult};
use lockstep_core::CoreError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Columns that must match as trimmed strings by default
pub const EXACT_FIELDS: [&str; 6] = ["side", "price", "shares", "matched", "match_price", "match_qty"];

/// Columns compared within the float tolerance by default
pub const TOLERANCE_FIELDS: [&str; 1] = ["moe_confidence"];

/// Action codes of the decision column
pub const ACTION_LABELS: [(i64, &str); 3] = [(0, "HOLD"), (1, "BUY"), (2, "SELL")];

/// How one column is compared
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldPolicy {
    /// Trimmed string equality
    Exact,
    /// Absolute float difference at most the configured tolerance
    Tolerance,
    /// Integer category codes, truncated from floats
    Categorical {
        /// Display names for known codes
        #[serde(default)]
        labels: BTreeMap<i64, String>,
    },
}

impl FieldPolicy {
    /// Categorical policy over the HOLD/BUY/SELL action codes
    #[must_use]
    pub fn actions() -> Self {
        Self::Categorical {
            labels: ACTION_LABELS
                .iter()
                .map(|(code, name)| (*code, (*name).to_string()))
                .collect(),
        }
    }
}

/// One table entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRule {
    /// Column name
    pub field: String,
    /// Comparison applied to it
    pub policy: FieldPolicy,
}

/// Ordered set of field rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyTable {
    fields: Vec<FieldRule>,
}

impl PolicyTable {
    /// Table with no rules
    #[must_use]
    pub fn empty() -> Self {
        Self { fields: Vec::new() }
    }

    /// Add a rule, replacing any existing rule for the same field in place
    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>, policy: FieldPolicy) -> Self {
        let field = field.into();
        match self.fields.iter_mut().find(|rule| rule.field == field) {
            Some(rule) => rule.policy = policy,
            None => self.fields.push(FieldRule { field, policy }),
        }
        self
    }

    /// Rules in evaluation order
    #[must_use]
    pub fn rules(&self) -> &[FieldRule] {
        &self.fields
    }

    /// Policy for `field`
    #[must_use]
    pub fn policy(&self, field: &str) -> Option<&FieldPolicy> {
        self.fields
            .iter()
            .find(|rule| rule.field == field)
            .map(|rule| &rule.policy)
    }

    /// Parse a JSON table
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::Policy`] for invalid JSON, an empty table, a
    /// blank field name or a field listed twice
    pub fn from_json(json: &str) -> VerifyResult<Self> {
        let table: Self = serde_json::from_str(json)?;
        table.validate()?;
        Ok(table)
    }

    /// Load a JSON table from disk
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InputNotFound`] for a missing file, otherwise as
    /// [`PolicyTable::from_json`]
    pub fn from_path(path: impl AsRef<Path>) -> VerifyResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| CoreError::from_io(path, &e))?;
        let table = Self::from_json(&json)?;
        tracing::info!(path = %path.display(), rules = table.fields.len(), "policy table loaded");
        Ok(table)
    }

    /// Serialize as pretty JSON
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails
    pub fn to_json(&self) -> VerifyResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn validate(&self) -> VerifyResult<()> {
        if self.fields.is_empty() {
            return Err(VerifyError::Policy("table has no fields".to_string()));
        }
        let mut seen = HashSet::new();
        for rule in &self.fields {
            if rule.field.trim().is_empty() {
                return Err(VerifyError::Policy("blank field name".to_string()));
            }
            if !seen.insert(rule.field.as_str()) {
                return Err(VerifyError::Policy(format!("field '{}' listed twice", rule.field)));
            }
        }
        Ok(())
    }
}

impl Default for PolicyTable {
    fn default() -> Self {
        let table = EXACT_FIELDS
            .iter()
            .fold(Self::empty(), |table, field| table.with_field(*field, FieldPolicy::Exact));
        let table = TOLERANCE_FIELDS
            .iter()
            .fold(table, |table, field| table.with_field(*field, FieldPolicy::Tolerance));
        table.with_field("moe_action", FieldPolicy::actions())
    }
}
