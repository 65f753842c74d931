//! dispatch::extract
//!
//! Schema-driven parameter extraction from the tokenized command line.
//!
//! # Grammar
//!
//! `word [value]* [--name value]* [--switch]*`
//!
//! 1. A leading run of non-flag tokens binds positionally to the target
//!    operation's `required` names, left to right in declaration order.
//!    Positional consumption stops at the first token starting with `--`.
//! 2. Every `--name value` pair binds `value` under `name` and consumes
//!    exactly two tokens. Pairs are recorded even when `name` is not in the
//!    target's `required` list - operations consulted during requirement
//!    resolution may need them.
//! 3. A `--name` token matching a declared switch consumes one token and
//!    sets the switch. A non-switch flag with no following token is
//!    malformed input.
//! 4. Required names still unbound afterwards are handed to the resolver.
//!
//! Stray non-flag tokens in the flag region and positional values beyond
//! the `required` list are ignored.

use crate::plugin::OperationSchema;

use super::error::DispatchError;
use super::params::{ParamValue, ParameterSet};

/// The outcome of extraction: directly supplied values, the switches that
/// were set, and the required names the caller did not supply.
#[derive(Debug)]
pub struct Extraction {
    /// Directly supplied values (positional bindings and all flag pairs).
    pub params: ParameterSet,
    /// Switch names that were present.
    pub switches: Vec<String>,
    /// Required names with no bound value, in declaration order.
    pub unresolved: Vec<String>,
}

/// Extract parameters from the tokens following the command word.
///
/// # Errors
///
/// Returns [`DispatchError::MalformedInput`] when a non-switch flag is the
/// final token (no value to consume).
pub fn extract(tokens: &[String], schema: &OperationSchema) -> Result<Extraction, DispatchError> {
    let mut params = ParameterSet::new();
    let mut switches = Vec::new();

    // Positional run: bind to required names in declaration order.
    let mut idx = 0;
    let mut positional = schema.required().iter();
    while idx < tokens.len() && !tokens[idx].starts_with("--") {
        if let Some(name) = positional.next() {
            params.insert_direct(name.clone(), ParamValue::Text(tokens[idx].clone()));
        }
        idx += 1;
    }

    // Flag region: switches and `--name value` pairs.
    while idx < tokens.len() {
        let token = &tokens[idx];
        match token.strip_prefix("--") {
            Some(name) if schema.is_switch(name) => {
                switches.push(name.to_string());
                params.insert_direct(name, ParamValue::Switch(true));
                idx += 1;
            }
            Some(name) => {
                let value = tokens.get(idx + 1).ok_or_else(|| {
                    DispatchError::MalformedInput(format!("flag --{} has no value", name))
                })?;
                params.insert_direct(name, ParamValue::Text(value.clone()));
                idx += 2;
            }
            None => idx += 1,
        }
    }

    let unresolved = schema
        .required()
        .iter()
        .filter(|name| !params.contains(name))
        .cloned()
        .collect();

    Ok(Extraction {
        params,
        switches,
        unresolved,
    })
}
