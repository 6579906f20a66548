use regex::Regex;
use lazy_static::lazy_static;
use crate::utils::{quote, error};
use crate::error::IdlError;

lazy_static! {
    pub static ref TOKEN_REGEX:    Regex = Regex::new(r"(\b0x[0-9A-Fa-f]+\b|\b\d+\b|->|[=;:,(){}]|\b[A-Za-z_][A-Za-z0-9_]*\b|//.*|\s+)").unwrap();
    pub static ref WHITESPACE_RX:  Regex = Regex::new(r"^(//.*|\s+)$").unwrap();
}

#[derive(Debug, PartialEq)]
pub struct Token {
    pub text:   String,
    pub line:   usize,
    pub column: usize,
}

/// Splits IDL text into tokens, dropping whitespace and `//` comments.
/// The last token is always an empty EOF marker.
pub fn tokenize_idl(text: &str) -> Result<Vec<Token>, IdlError> {
    let mut tokens = Vec::new();
    let mut line = 1;
    let mut column = 1;
    let mut last_end = 0;

    for mat in TOKEN_REGEX.find_iter(text) {
        let start = mat.start();
        let end   = mat.end();
        let part  = mat.as_str();

        if start > last_end {
            let unexpected = &text[last_end..start];
            return Err(error(
                &format!("Syntax error: {}", quote(unexpected)),
                line,
                column,
            ));
        }

        if !WHITESPACE_RX.is_match(part) {
            tokens.push(Token {
                text:   part.to_string(),
                line,
                column,
            });
        }

        let newline_count = part.matches('\n').count();
        if newline_count > 0 {
            line += newline_count;
            if let Some(last_line_part) = part.split('\n').last() {
                column = last_line_part.len() + 1;
            }
        } else {
            column += part.len();
        }

        last_end = end;
    }

    if last_end != text.len() {
        let unexpected = &text[last_end..];
        return Err(error(
            &format!("Syntax error: {}", quote(unexpected)),
            line,
            column,
        ));
    }

    tokens.push(Token {
        text:   "".to_string(),
        line,
        column,
    });
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_simple() {
        let input = "type cid = isize;";
        let expected = vec![
            Token { text: "type".into(),  line: 1, column: 1 },
            Token { text: "cid".into(),   line: 1, column: 6 },
            Token { text: "=".into(),     line: 1, column: 10 },
            Token { text: "isize".into(), line: 1, column: 12 },
            Token { text: ";".into(),     line: 1, column: 17 },
            Token { text: "".into(),      line: 1, column: 18 },
        ];
        let got = tokenize_idl(input).unwrap();
        assert_eq!(got, expected);
    }

    #[test]
    fn test_tokenize_signature() {
        let input = "rpc ping = 0x1 () -> (pong: u32);";
        let texts: Vec<String> = tokenize_idl(input)
            .unwrap()
            .into_iter()
            .map(|t| t.text)
            .collect();
        assert_eq!(
            texts,
            vec!["rpc", "ping", "=", "0x1", "(", ")", "->", "(", "pong", ":", "u32", ")", ";", ""]
        );
    }

    #[test]
    fn test_tokenize_tracks_lines_and_skips_comments() {
        let input = "// header\ninterface x = 1 {\n}";
        let got = tokenize_idl(input).unwrap();
        assert_eq!(got[0], Token { text: "interface".into(), line: 2, column: 1 });
        assert_eq!(got[4], Token { text: "{".into(), line: 2, column: 17 });
        assert_eq!(got[5], Token { text: "}".into(), line: 3, column: 1 });
    }

    #[test]
    fn test_tokenize_unexpected_text() {
        let input = "type x = u8 @";
        let err = tokenize_idl(input).unwrap_err();
        assert!(
            matches!(err, IdlError::ParseError { .. }),
            "expected a ParseError but got {:?}",
            err
        );
    }
}
