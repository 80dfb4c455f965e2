//! Precedence normalisation for `*` and `/`.
//!
//! The evaluator always splits on the rightmost operator, which groups
//! everything left to right with equal precedence. Wrapping each run of
//! multiplications and divisions in parentheses restores the usual binding.

use tracing::trace;

use super::operator::Operator;
use crate::scan::closing_bracket;

/// Parenthesise `*` and `/` together with their operands, recursing into
/// existing parentheses. Inputs without `*` or `/` are returned unchanged.
///
/// `"2+3*5"` becomes `"2+(3*5)"`, `"(1+1)*2+2"` becomes `"((1+1)*2)+2"`.
pub fn ensure_execution_order(input: &str) -> String {
    if !input.contains(['*', '/']) {
        return input.to_string();
    }

    let mut modified = String::with_capacity(input.len() + 4);
    let mut waiting = String::new();
    // Byte offset in `modified` right after the last seen operator.
    let mut last = 0usize;
    let mut i = 0usize;

    while let Some(c) = input[i..].chars().next() {
        if c == '(' {
            if let Some(end) = closing_bracket(input, i + 1, b'(', b')') {
                let inner = format!("({})", ensure_execution_order(&input[i + 1..end]));
                if waiting.is_empty() {
                    modified.push_str(&inner);
                } else {
                    waiting.push_str(&inner);
                }
                i = end + 1;
                continue;
            }
        }

        if c == '*' || c == '/' {
            if waiting.is_empty() {
                waiting = modified.split_off(char_boundary(&modified, last));
            } else {
                waiting = format!("({waiting})");
            }
        } else if let Some((op, idx)) = Operator::containing(c) {
            if !waiting.is_empty() {
                modified.push('(');
                modified.push_str(&waiting);
                modified.push(')');
                waiting.clear();
            }
            let len = op.token().len();
            last = modified.len() + if idx == 0 { len } else { len - idx };
        }

        if waiting.is_empty() {
            modified.push(c);
        } else {
            waiting.push(c);
        }
        i += c.len_utf8();
    }

    if !waiting.is_empty() {
        modified.push('(');
        modified.push_str(&waiting);
        modified.push(')');
    }
    trace!(input, output = %modified, "execution order");
    modified
}

fn char_boundary(s: &str, at: usize) -> usize {
    let mut at = at.min(s.len());
    while !s.is_char_boundary(at) {
        at += 1;
    }
    at
}
