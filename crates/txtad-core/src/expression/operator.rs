//! Operator table of the expression language.

use crate::error::{ExpressionError, ExpressionResult};
use crate::fuzzy::{FuzzyMatch, classify};
use crate::scan::split;

/// A binary operator. Every operand and result is a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `&&`
    And,
    /// `*`
    Mul,
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `/`
    Div,
    /// `:` list membership.
    InList,
    /// `<`
    Less,
    /// `<=`
    LessEq,
    /// `=` string equality.
    Eq,
    /// `>`
    Greater,
    /// `>=`
    GreaterEq,
    /// `||`
    Or,
    /// `~` fuzzy code of pattern against text.
    Fuzzy,
    /// `~:` fuzzy codes of a pattern against every list element.
    FuzzyList,
}

/// All operators in lexicographic token order. The split scan depends on it.
pub const TABLE: [Operator; 14] = [
    Operator::And,
    Operator::Mul,
    Operator::Add,
    Operator::Sub,
    Operator::Div,
    Operator::InList,
    Operator::Less,
    Operator::LessEq,
    Operator::Eq,
    Operator::Greater,
    Operator::GreaterEq,
    Operator::Or,
    Operator::Fuzzy,
    Operator::FuzzyList,
];

impl Operator {
    /// Token as written in expressions.
    pub fn token(self) -> &'static str {
        match self {
            Self::And => "&&",
            Self::Mul => "*",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Div => "/",
            Self::InList => ":",
            Self::Less => "<",
            Self::LessEq => "<=",
            Self::Eq => "=",
            Self::Greater => ">",
            Self::GreaterEq => ">=",
            Self::Or => "||",
            Self::Fuzzy => "~",
            Self::FuzzyList => "~:",
        }
    }

    /// First operator (in table order) whose token contains `c`, with the
    /// index of `c` inside that token.
    pub fn containing(c: char) -> Option<(Self, usize)> {
        TABLE
            .iter()
            .find_map(|op| op.token().find(c).map(|idx| (*op, idx)))
    }

    /// Apply the operator to already substituted operands.
    pub fn apply(self, left: &str, right: &str) -> ExpressionResult<String> {
        let value = match self {
            Self::Add => number(left)?.wrapping_add(number(right)?).to_string(),
            Self::Sub => number(left)?.wrapping_sub(number(right)?).to_string(),
            Self::Mul => number(left)?.wrapping_mul(number(right)?).to_string(),
            Self::Div => {
                let (l, r) = (number(left)?, number(right)?);
                if r == 0 {
                    return Err(ExpressionError::DivisionByZero);
                }
                l.wrapping_div(r).to_string()
            }
            Self::Less => flag(number(left)? < number(right)?),
            Self::LessEq => flag(number(left)? <= number(right)?),
            Self::Greater => flag(number(left)? > number(right)?),
            Self::GreaterEq => flag(number(left)? >= number(right)?),
            Self::Eq => flag(left == right),
            Self::And => flag(left == "1" && right == "1"),
            Self::Or => flag(left == "1" || right == "1"),
            Self::Fuzzy => classify(left, right).to_string(),
            Self::InList => in_list(left, right)?,
            Self::FuzzyList => fuzzy_list(left, right)?,
        };
        Ok(value)
    }
}

/// Rightmost operator in `input`. A candidate wins over the current choice
/// when it sits more than one byte further right, or overlaps it and is
/// longer (so `>=` beats `=` and `~:` beats `:`).
pub fn last_operator(input: &str) -> Option<(usize, Operator)> {
    let mut best: Option<(usize, Operator)> = None;
    for op in TABLE {
        let Some(pos) = input.rfind(op.token()) else {
            continue;
        };
        let wins = match best {
            None => true,
            Some((cur_pos, cur)) => {
                let diff = pos as isize - cur_pos as isize;
                diff > 1 || (diff.abs() <= 1 && op.token().len() > cur.token().len())
            }
        };
        if wins {
            best = Some((pos, op));
        }
    }
    best
}

fn number(value: &str) -> ExpressionResult<i64> {
    value
        .trim()
        .parse()
        .map_err(|_| ExpressionError::NotANumber(value.to_string()))
}

fn flag(value: bool) -> String {
    u8::from(value).to_string()
}

/// Contents of a bracketed list. An unbracketed operand is a one-element list.
fn list_body(list: &str) -> ExpressionResult<&str> {
    match list.strip_prefix('[') {
        Some(rest) => rest
            .strip_suffix(']')
            .ok_or_else(|| ExpressionError::MalformedList(list.to_string())),
        None => Ok(list),
    }
}

/// Contents of a list that must be bracketed.
fn bracketed(list: &str) -> ExpressionResult<&str> {
    list.strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| ExpressionError::MalformedList(list.to_string()))
}

fn in_list(left: &str, right: &str) -> ExpressionResult<String> {
    let alternatives = list_body(left)?;
    let elements = split(list_body(right)?, ";");
    let found = split(alternatives, "|").into_iter().any(|alt| {
        let alt = alt.trim();
        elements.iter().any(|elem| elem.trim() == alt)
    });
    Ok(flag(found))
}

fn fuzzy_list(pattern: &str, right: &str) -> ExpressionResult<String> {
    let codes: Vec<String> = split(bracketed(right)?, ";")
        .into_iter()
        .map(|elem| classify(pattern, elem.trim()))
        .filter(|m| *m != FuzzyMatch::NoMatch)
        .map(|m| m.to_string())
        .collect();
    Ok(format!("[{}]", codes.join(";")))
}
