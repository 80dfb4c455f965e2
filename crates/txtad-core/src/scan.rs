//! Small string scanners shared by the interpreter, the event queue and the
//! game layer. Brackets and delimiters are ASCII, so every returned index is
//! a valid char boundary.

/// Split `input` on `delimiter`, dropping empty segments except the last one.
///
/// `"a;;b"` yields `["a", "b"]`, `"a;"` yields `["a", ""]`.
pub fn split<'a>(input: &'a str, delimiter: &str) -> Vec<&'a str> {
    let mut parts = Vec::new();
    let mut rest = input;
    while let Some(pos) = rest.find(delimiter) {
        if pos != 0 {
            parts.push(&rest[..pos]);
        }
        rest = &rest[pos + delimiter.len()..];
    }
    parts.push(rest);
    parts
}

/// Find the `close` that balances an already opened bracket, scanning
/// forward from `from`.
pub fn closing_bracket(input: &str, from: usize, open: u8, close: u8) -> Option<usize> {
    let bytes = input.as_bytes();
    let mut depth = 0usize;
    for (i, &c) in bytes.iter().enumerate().skip(from) {
        if c == open {
            depth += 1;
        } else if c == close {
            if depth == 0 {
                return Some(i);
            }
            depth -= 1;
        }
    }
    None
}

/// Find the unbalanced `open` to the left of `at` (inclusive), scanning
/// backwards.
pub fn opening_bracket(input: &str, at: usize, open: u8, close: u8) -> Option<usize> {
    let bytes = input.as_bytes();
    let mut depth = 0usize;
    for i in (0..=at.min(bytes.len().checked_sub(1)?)).rev() {
        let c = bytes[i];
        if c == close {
            depth += 1;
        } else if c == open {
            if depth == 0 {
                return Some(i);
            }
            depth -= 1;
        }
    }
    None
}

/// Replace every `{name}` for which `resolve` returns a value. Unknown names
/// and unclosed braces stay as written.
pub fn substitute_braces(input: &str, mut resolve: impl FnMut(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    while let Some(offset) = input[i..].find('{') {
        let start = i + offset;
        out.push_str(&input[i..start]);
        match closing_bracket(input, start + 1, b'{', b'}') {
            Some(end) => {
                let name = &input[start + 1..end];
                match resolve(name) {
                    Some(value) => out.push_str(&value),
                    None => out.push_str(&input[start..=end]),
                }
                i = end + 1;
            }
            None => {
                out.push('{');
                i = start + 1;
            }
        }
    }
    out.push_str(&input[i..]);
    out
}
