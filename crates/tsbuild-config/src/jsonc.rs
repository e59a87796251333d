//! JSON with comments
//!
//! Project config files allow `//` and `/* */` comments and trailing commas.
//! Both are blanked out in place so that byte offsets, and therefore the
//! line/column of any parse error, still point into the original text.

use serde_json::{Map, Value};
use std::fmt;

/// A parse failure with a 1-based source position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsoncError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl fmt::Display for JsoncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{}): {}", self.line, self.column, self.message)
    }
}

impl std::error::Error for JsoncError {}

/// Parse config text into its top-level object
///
/// Blank input is an empty object.
pub fn parse_object(text: &str) -> Result<Map<String, Value>, JsoncError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let cleaned = strip_trailing_commas(&strip_comments(text)?);

    if cleaned.trim().is_empty() {
        return Ok(Map::new());
    }

    match serde_json::from_str::<Value>(&cleaned) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(JsoncError {
            line: 1,
            column: 1,
            message: "The root value of a config file must be an object".to_string(),
        }),
        Err(e) => {
            let suffix = format!(" at line {} column {}", e.line(), e.column());
            let message = e.to_string();
            let message = message.strip_suffix(&suffix).unwrap_or(&message).to_string();
            Err(JsoncError {
                line: e.line(),
                column: e.column(),
                message,
            })
        }
    }
}

/// Replace comments with spaces, keeping line breaks
pub fn strip_comments(text: &str) -> Result<String, JsoncError> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.char_indices().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some((idx, ch)) = chars.next() {
        if in_string {
            out.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match (ch, chars.peek().map(|&(_, c)| c)) {
            ('"', _) => {
                in_string = true;
                out.push(ch);
            }
            ('/', Some('/')) => {
                out.push_str("  ");
                chars.next();
                while let Some(&(_, c)) = chars.peek() {
                    if c == '\n' || c == '\r' {
                        break;
                    }
                    blank(&mut out, c);
                    chars.next();
                }
            }
            ('/', Some('*')) => {
                out.push_str("  ");
                chars.next();
                let mut closed = false;
                while let Some((_, c)) = chars.next() {
                    if c == '*' && chars.peek().map(|&(_, n)| n) == Some('/') {
                        chars.next();
                        out.push_str("  ");
                        closed = true;
                        break;
                    }
                    blank(&mut out, c);
                }
                if !closed {
                    let (line, column) = offset_to_line_col(text, idx);
                    return Err(JsoncError {
                        line,
                        column,
                        message: "Unterminated block comment".to_string(),
                    });
                }
            }
            _ => out.push(ch),
        }
    }

    Ok(out)
}

fn blank(out: &mut String, c: char) {
    if c == '\n' || c == '\r' {
        out.push(c);
    } else {
        out.extend(std::iter::repeat(' ').take(c.len_utf8()));
    }
}

/// Replace a comma that is followed only by whitespace and a closing bracket
fn strip_trailing_commas(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            out.push(ch);
            continue;
        }

        match ch {
            '"' => {
                in_string = true;
                out.push(ch);
            }
            ',' => {
                let next = bytes[idx + 1..]
                    .iter()
                    .find(|b| !b.is_ascii_whitespace())
                    .copied();
                if matches!(next, Some(b'}') | Some(b']')) {
                    out.push(' ');
                } else {
                    out.push(ch);
                }
            }
            _ => out.push(ch),
        }
    }

    out
}

/// Compute line and column from byte offset in source
pub fn offset_to_line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;
    for (i, ch) in source.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}
