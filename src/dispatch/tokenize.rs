//! dispatch::tokenize
//!
//! Shell-style tokenization of the raw command line.
//!
//! # Rules
//!
//! - Whitespace separates tokens
//! - A single- or double-quoted segment is part of one token; the quotes
//!   themselves are stripped
//! - An unterminated quote is [`DispatchError::MalformedInput`]
//!
//! Pure function, no side effects. This is deliberately not a full shell
//! grammar - no escapes, no expansion, no nesting of quote kinds beyond
//! "the other quote is literal inside a quoted segment".

use super::error::DispatchError;

/// Split a raw command line into tokens.
///
/// # Example
///
/// ```
/// use peon::dispatch::tokenize;
///
/// let tokens = tokenize(r#"stop "my instance" --force"#).unwrap();
/// assert_eq!(tokens, ["stop", "my instance", "--force"]);
/// ```
///
/// # Errors
///
/// Returns [`DispatchError::MalformedInput`] when a quote is never closed.
pub fn tokenize(raw: &str) -> Result<Vec<String>, DispatchError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;

    for ch in raw.chars() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => current.push(ch),
            None => match ch {
                '\'' | '"' => {
                    quote = Some(ch);
                    in_token = true;
                }
                c if c.is_whitespace() => {
                    if in_token {
                        tokens.push(std::mem::take(&mut current));
                        in_token = false;
                    }
                }
                c => {
                    current.push(c);
                    in_token = true;
                }
            },
        }
    }

    if quote.is_some() {
        return Err(DispatchError::MalformedInput(
            "unterminated quote".to_string(),
        ));
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}
