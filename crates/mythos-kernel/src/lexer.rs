//! Tokenizer for a single pipeline stage.
//!
//! Words are separated by whitespace. An unescaped `"` toggles a quoted
//! region in which whitespace is literal; the quotes themselves are dropped.
//! `\"` produces a literal quote. Any other backslash is kept as written.

/// Split a stage into words.
pub fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    // A quoted region can produce an empty word (`""`).
    let mut in_word = false;
    let mut in_quotes = false;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'"') => {
                chars.next();
                current.push('"');
                in_word = true;
            }
            '"' => {
                in_quotes = !in_quotes;
                in_word = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if in_word {
                    tokens.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if in_word {
        tokens.push(current);
    }
    tokens
}
