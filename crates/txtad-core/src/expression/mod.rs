//! String-typed expression interpreter.
//!
//! Expressions are evaluated by recursive splitting on the rightmost operator;
//! there is no token stream or AST. Values are plain strings, booleans are
//! `"1"` and `"0"`, and `{name}` placeholders are resolved through a built-in
//! table of fuzzy-match codes and an injected lookup.

mod operator;
mod order;

pub use operator::{Operator, last_operator};
pub use order::ensure_execution_order;

use tracing::debug;

use crate::error::ExpressionResult;
use crate::fuzzy::FuzzyMatch;
use crate::scan::{closing_bracket, opening_bracket, substitute_braces};

type Lookup<'a> = Box<dyn Fn(&str) -> Option<String> + 'a>;

/// Evaluates expressions against an optional substitution lookup.
#[derive(Default)]
pub struct Interpreter<'a> {
    lookup: Option<Lookup<'a>>,
}

impl<'a> Interpreter<'a> {
    /// Interpreter that only knows the built-in constants.
    pub fn new() -> Self {
        Self { lookup: None }
    }

    /// Interpreter resolving unknown `{name}` placeholders through `lookup`.
    pub fn with_lookup(lookup: impl Fn(&str) -> Option<String> + 'a) -> Self {
        Self {
            lookup: Some(Box::new(lookup)),
        }
    }

    /// Evaluate `expression` to its string value.
    pub fn evaluate(&self, expression: &str) -> ExpressionResult<String> {
        let ordered = ensure_execution_order(expression);
        let value = self.evaluate_ordered(&ordered)?;
        debug!(expression, %value, "evaluated");
        Ok(value)
    }

    /// Resolve every `{name}` in `input`; unknown names stay as written.
    pub fn substitute(&self, input: &str) -> String {
        substitute_braces(input, |name| self.resolve(name))
    }

    fn resolve(&self, name: &str) -> Option<String> {
        let builtin = match name {
            "no_match" => Some(FuzzyMatch::NoMatch),
            "direct" => Some(FuzzyMatch::Direct),
            "starts_with" => Some(FuzzyMatch::StartsWith),
            "contains" => Some(FuzzyMatch::Contains),
            "fuzzy" => Some(FuzzyMatch::Fuzzy),
            _ => None,
        };
        match builtin {
            Some(code) => Some(code.to_string()),
            None => self.lookup.as_ref().and_then(|lookup| lookup(name)),
        }
    }

    fn evaluate_ordered(&self, input: &str) -> ExpressionResult<String> {
        let Some((pos, op)) = last_operator(input) else {
            return Ok(self.strip_and_substitute(input));
        };

        // A leading minus is a sign, not a subtraction.
        if op == Operator::Sub && input[..pos].trim().is_empty() {
            return Ok(self.strip_and_substitute(input));
        }

        if let (Some(start), Some(end)) = (
            opening_bracket(input, pos, b'(', b')'),
            closing_bracket(input, pos, b'(', b')'),
        ) {
            let inner = self.evaluate_ordered(&input[start + 1..end])?;
            let rewritten = format!("{}{}{}", &input[..start], inner, &input[end + 1..]);
            return self.evaluate_ordered(&rewritten);
        }

        let left = self.evaluate_ordered(&input[..pos])?;
        let right = &input[pos + op.token().len()..];
        op.apply(
            &self.strip_and_substitute(&left),
            &self.strip_and_substitute(right),
        )
    }

    fn strip_and_substitute(&self, input: &str) -> String {
        let stripped = input.trim().trim_matches(')').trim_matches('(');
        self.substitute(stripped)
    }
}
