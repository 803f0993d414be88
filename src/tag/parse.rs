//! Whitespace tokenizer for tag bodies

use crate::error::{ProximaError, ProximaResult};

/// Split a tag body on whitespace; double quotes group text and are stripped.
pub fn tokenize(input: &str) -> ProximaResult<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quoted = false;

    for c in input.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                in_token = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if quoted {
        return Err(ProximaError::tag_syntax(input, "unterminated quote"));
    }
    if in_token {
        tokens.push(current);
    }

    Ok(tokens)
}
