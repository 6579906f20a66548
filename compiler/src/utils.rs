use crate::error::IdlError;

pub fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{}\"", text))
}

pub fn error(msg: &str, line: usize, column: usize) -> IdlError {
    IdlError::ParseError {
        msg: msg.to_string(),
        line,
        column,
    }
}

/// Escapes Rust keywords, strict and reserved, by suffixing with an underscore.
pub fn escape_rust_keyword(s: &str) -> String {
    let keywords = [
        "as", "break", "const", "continue", "crate", "else",
        "enum", "extern", "false", "fn", "for", "if", "impl",
        "in", "let", "loop", "match", "mod", "move", "mut",
        "pub", "ref", "return", "self", "Self", "static",
        "struct", "super", "trait", "true", "type", "unsafe",
        "use", "where", "while", "async", "await", "dyn",
        "abstract", "become", "box", "do", "final", "macro",
        "override", "priv", "try", "typeof", "unsized", "virtual",
        "yield",
    ];
    if keywords.contains(&s) {
        format!("{}_", s)
    } else {
        s.to_string()
    }
}

/// Prefix of the per-message id and header constants.
pub fn const_prefix(message: &str) -> String {
    message.to_uppercase()
}

/// `read_file` -> `ReadFile`
pub fn camel_case(s: &str) -> String {
    s.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().to_string() + chars.as_str(),
            }
        })
        .collect()
}
