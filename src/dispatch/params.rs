//! dispatch::params
//!
//! The parameter set built up during a dispatch.
//!
//! # Provenance
//!
//! Every value carries where it came from:
//!
//! - `Direct` - supplied by the caller on the command line
//! - `Context` - owned by the dispatcher (invoking channel/user)
//! - `Derived` - produced by the requirement resolver
//!
//! Direct values are never overwritten by context or derived writes, and a
//! derived write for a key that is already present is a no-op. This is what
//! makes resolution memoized and keeps caller intent authoritative.

use std::collections::BTreeMap;
use std::fmt;

/// A resolved parameter value: text or a boolean switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// A string value, positional or from a `--name value` pair.
    Text(String),
    /// A boolean switch, present (`true`) or defaulted.
    Switch(bool),
}

impl ParamValue {
    /// The text content, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            ParamValue::Switch(_) => None,
        }
    }

    /// The switch state, if this is a switch.
    pub fn as_switch(&self) -> Option<bool> {
        match self {
            ParamValue::Text(_) => None,
            ParamValue::Switch(b) => Some(*b),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Text(s) => write!(f, "{}", s),
            ParamValue::Switch(b) => write!(f, "{}", b),
        }
    }
}

/// Where a parameter value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// Supplied directly by the caller.
    Direct,
    /// Owned by the dispatcher (e.g. `channel`, `user`).
    Context,
    /// Produced by the requirement resolver.
    Derived,
}

/// Mapping from parameter name to resolved value, with provenance.
///
/// # Example
///
/// ```
/// use peon::dispatch::{ParamValue, ParameterSet};
///
/// let mut params = ParameterSet::new();
/// params.insert_direct("instance_name", ParamValue::Text("web-1".into()));
/// params.insert_derived("instance_name", ParamValue::Text("ignored".into()));
///
/// // The direct value wins.
/// assert_eq!(params.text("instance_name"), Some("web-1"));
/// assert!(!params.switch("dry_run"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ParameterSet {
    values: BTreeMap<String, (ParamValue, Provenance)>,
}

impl ParameterSet {
    /// Create an empty set.
    pub fn new() -> Self {
        ParameterSet::default()
    }

    /// Record a caller-supplied value. Overwrites any earlier value for the
    /// same key (a later direct write wins over an earlier one).
    pub fn insert_direct(&mut self, name: impl Into<String>, value: ParamValue) {
        self.values.insert(name.into(), (value, Provenance::Direct));
    }

    /// Seed a dispatcher-owned context value. Does not overwrite a direct
    /// value for the same key.
    pub fn insert_context(&mut self, name: impl Into<String>, value: ParamValue) {
        let name = name.into();
        if !self.values.contains_key(&name) {
            self.values.insert(name, (value, Provenance::Context));
        }
    }

    /// Record a resolver-produced value. A no-op when the key is already
    /// present, so a resolved value is never overwritten by a later
    /// resolution step and caller-supplied values always take precedence.
    pub fn insert_derived(&mut self, name: impl Into<String>, value: ParamValue) {
        let name = name.into();
        if !self.values.contains_key(&name) {
            self.values.insert(name, (value, Provenance::Derived));
        }
    }

    /// Whether a value is known for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// The value for `name`, if known.
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name).map(|(v, _)| v)
    }

    /// The text value for `name`, if known and textual.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ParamValue::as_text)
    }

    /// The switch state for `name`. Absent switches read as `false`.
    pub fn switch(&self, name: &str) -> bool {
        self.get(name).and_then(ParamValue::as_switch).unwrap_or(false)
    }

    /// Provenance of the value for `name`, if known.
    pub fn provenance(&self, name: &str) -> Option<Provenance> {
        self.values.get(name).map(|(_, p)| *p)
    }

    /// A copy of this set restricted to the given keys. Used when invoking a
    /// producing operation, which receives only its declared parameters.
    pub fn restrict_to(&self, names: &[String]) -> ParameterSet {
        let mut out = ParameterSet::new();
        for name in names {
            if let Some(entry) = self.values.get(name) {
                out.values.insert(name.clone(), entry.clone());
            }
        }
        out
    }

    /// Number of known values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(k, (v, _))| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> ParamValue {
        ParamValue::Text(s.to_string())
    }

    #[test]
    fn direct_overwrites_direct() {
        let mut params = ParameterSet::new();
        params.insert_direct("name", text("first"));
        params.insert_direct("name", text("second"));
        assert_eq!(params.text("name"), Some("second"));
    }

    #[test]
    fn derived_never_overwrites_direct() {
        let mut params = ParameterSet::new();
        params.insert_direct("name", text("direct"));
        params.insert_derived("name", text("derived"));
        assert_eq!(params.text("name"), Some("direct"));
        assert_eq!(params.provenance("name"), Some(Provenance::Direct));
    }

    #[test]
    fn derived_never_overwrites_derived() {
        let mut params = ParameterSet::new();
        params.insert_derived("id", text("i-0001"));
        params.insert_derived("id", text("i-0002"));
        assert_eq!(params.text("id"), Some("i-0001"));
    }

    #[test]
    fn context_never_overwrites_direct() {
        let mut params = ParameterSet::new();
        params.insert_direct("channel", text("override"));
        params.insert_context("channel", text("ABCDE33"));
        assert_eq!(params.text("channel"), Some("override"));
    }

    #[test]
    fn context_fills_vacant_key() {
        let mut params = ParameterSet::new();
        params.insert_context("channel", text("ABCDE33"));
        assert_eq!(params.text("channel"), Some("ABCDE33"));
        assert_eq!(params.provenance("channel"), Some(Provenance::Context));
    }

    #[test]
    fn absent_switch_reads_false() {
        let params = ParameterSet::new();
        assert!(!params.switch("dry_run"));
    }

    #[test]
    fn present_switch_reads_true() {
        let mut params = ParameterSet::new();
        params.insert_direct("force", ParamValue::Switch(true));
        assert!(params.switch("force"));
    }

    #[test]
    fn text_accessor_rejects_switches() {
        let mut params = ParameterSet::new();
        params.insert_direct("force", ParamValue::Switch(true));
        assert_eq!(params.text("force"), None);
    }

    #[test]
    fn restrict_to_keeps_only_named_keys() {
        let mut params = ParameterSet::new();
        params.insert_direct("a", text("1"));
        params.insert_direct("b", text("2"));
        params.insert_direct("c", text("3"));

        let restricted = params.restrict_to(&["a".to_string(), "c".to_string()]);
        assert_eq!(restricted.len(), 2);
        assert_eq!(restricted.text("a"), Some("1"));
        assert!(!restricted.contains("b"));
    }

    #[test]
    fn restrict_to_ignores_unknown_names() {
        let params = ParameterSet::new();
        let restricted = params.restrict_to(&["missing".to_string()]);
        assert!(restricted.is_empty());
    }
}
