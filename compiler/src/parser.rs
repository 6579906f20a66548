use crate::{
    tokenizer::Token,
    types::{Interface, InterfaceAttrs, Message, MessageAttrs, MessageKind, Payload, TypeAlias},
    utils::{error, quote},
    error::IdlError,
};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref IDENTIFIER:        Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
    static ref EQUALS:            Regex = Regex::new(r"^=$").unwrap();
    static ref SEMICOLON:         Regex = Regex::new(r"^;$").unwrap();
    static ref COLON:             Regex = Regex::new(r"^:$").unwrap();
    static ref COMMA:             Regex = Regex::new(r"^,$").unwrap();
    static ref ARROW:             Regex = Regex::new(r"^->$").unwrap();
    static ref INTEGER:           Regex = Regex::new(r"^(0x[0-9A-Fa-f]+|\d+)$").unwrap();
    static ref LEFT_BRACE:        Regex = Regex::new(r"^\{$").unwrap();
    static ref RIGHT_BRACE:       Regex = Regex::new(r"^\}$").unwrap();
    static ref LEFT_PAREN:        Regex = Regex::new(r"^\($").unwrap();
    static ref RIGHT_PAREN:       Regex = Regex::new(r"^\)$").unwrap();
    static ref INTERFACE_KEYWORD: Regex = Regex::new(r"^interface$").unwrap();
    static ref TYPE_KEYWORD:      Regex = Regex::new(r"^type$").unwrap();
    static ref KIND_KEYWORD:      Regex = Regex::new(r"^(rpc|upcall|event)$").unwrap();
    static ref EOF:               Regex = Regex::new(r"^$").unwrap();
}

/// Parses a token stream produced by `tokenize_idl` into one `Interface`.
pub fn parse_idl(tokens: &[Token]) -> Result<Interface, IdlError> {
    let mut index = 0;

    // `tokenize_idl` always ends the stream with an EOF token; stay on it.
    fn current_token<'a>(tokens: &'a [Token], index: usize) -> Result<&'a Token, IdlError> {
        tokens
            .get(index)
            .or_else(|| tokens.last())
            .ok_or_else(|| error("Unexpected end of input", 0, 0))
    }

    fn eat(tokens: &[Token], index: &mut usize, test: &Regex) -> Result<bool, IdlError> {
        if test.is_match(&current_token(tokens, *index)?.text) {
            *index += 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect<'a>(
        tokens: &'a [Token],
        index: &mut usize,
        test: &Regex,
        expected: &str,
    ) -> Result<&'a Token, IdlError> {
        let tok = current_token(tokens, *index)?;
        if !eat(tokens, index, test)? {
            return Err(error(
                &format!("Expected {} but found {}", expected, quote(&tok.text)),
                tok.line,
                tok.column,
            ));
        }
        Ok(tok)
    }

    fn integer(tok: &Token, max: u64, what: &str) -> Result<u8, IdlError> {
        let parsed = match tok.text.strip_prefix("0x") {
            Some(hex) => u64::from_str_radix(hex, 16),
            None      => tok.text.parse::<u64>(),
        };
        match parsed {
            Ok(value) if value <= max => Ok(value as u8),
            _ => Err(error(
                &format!("Invalid {} {} (at most {})", what, quote(&tok.text), max),
                tok.line,
                tok.column,
            )),
        }
    }

    fn payload_list(tokens: &[Token], index: &mut usize) -> Result<Vec<Payload>, IdlError> {
        let mut payloads = Vec::new();
        expect(tokens, index, &LEFT_PAREN, "\"(\"")?;
        while !eat(tokens, index, &RIGHT_PAREN)? {
            if !payloads.is_empty() {
                expect(tokens, index, &COMMA, "\",\" or \")\"")?;
            }
            let name_tok = expect(tokens, index, &IDENTIFIER, "payload name")?;
            expect(tokens, index, &COLON, "\":\"")?;
            let type_tok = expect(tokens, index, &IDENTIFIER, "type name")?;
            payloads.push(Payload::new(&name_tok.text, &type_tok.text));
        }
        Ok(payloads)
    }

    // interface <name> = <id> {
    expect(tokens, &mut index, &INTERFACE_KEYWORD, "\"interface\"")?;
    let name_tok = expect(tokens, &mut index, &IDENTIFIER, "identifier")?;
    expect(tokens, &mut index, &EQUALS, "\"=\"")?;
    let id_tok = expect(tokens, &mut index, &INTEGER, "integer")?;
    let interface_id = integer(id_tok, u8::MAX as u64, "interface id")?;
    expect(tokens, &mut index, &LEFT_BRACE, "\"{\"")?;

    let mut types    = Vec::new();
    let mut messages = Vec::new();

    while !eat(tokens, &mut index, &RIGHT_BRACE)? {
        if eat(tokens, &mut index, &TYPE_KEYWORD)? {
            let alias_tok = expect(tokens, &mut index, &IDENTIFIER, "identifier")?;
            expect(tokens, &mut index, &EQUALS, "\"=\"")?;
            let target_tok = expect(tokens, &mut index, &IDENTIFIER, "type name")?;
            expect(tokens, &mut index, &SEMICOLON, "\";\"")?;
            types.push(TypeAlias {
                name:     alias_tok.text.clone(),
                alias_of: target_tok.text.clone(),
            });
            continue;
        }

        let kind_tok = expect(tokens, &mut index, &KIND_KEYWORD, "\"type\", \"rpc\", \"upcall\", \"event\" or \"}\"")?;
        let kind = MessageKind::from_keyword(&kind_tok.text)
            .ok_or_else(|| error("Unknown message kind", kind_tok.line, kind_tok.column))?;
        let msg_tok = expect(tokens, &mut index, &IDENTIFIER, "identifier")?;
        expect(tokens, &mut index, &EQUALS, "\"=\"")?;
        let method_tok = expect(tokens, &mut index, &INTEGER, "integer")?;
        let method_id = integer(method_tok, u8::MAX as u64, "method id")?;

        let request = payload_list(tokens, &mut index)?;
        let response = if eat(tokens, &mut index, &ARROW)? {
            payload_list(tokens, &mut index)?
        } else {
            Vec::new()
        };
        expect(tokens, &mut index, &SEMICOLON, "\";\"")?;

        messages.push(Message {
            name:     msg_tok.text.clone(),
            attrs:    MessageAttrs { kind, id: method_id },
            request,
            response,
            line:     msg_tok.line,
            column:   msg_tok.column,
        });
    }

    expect(tokens, &mut index, &EOF, "end of file")?;

    Ok(Interface {
        name:  name_tok.text.clone(),
        attrs: InterfaceAttrs { id: interface_id },
        types,
        messages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize_idl;

    fn parse(text: &str) -> Result<Interface, IdlError> {
        parse_idl(&tokenize_idl(text)?)
    }

    #[test]
    fn test_parse_interface() {
        let interface = parse(
            r#"
            interface fs = 0x10 {
                type handle = isize;
                rpc open = 1 (path: page) -> (handle: handle);
                rpc read = 2 (handle: handle, len: usize) -> (data: page, len: usize);
                event closed = 3 (handle: handle);
            }
            "#,
        )
        .unwrap();

        assert_eq!(interface.name, "fs");
        assert_eq!(interface.attrs.id, 16);
        assert_eq!(
            interface.types,
            vec![TypeAlias { name: "handle".into(), alias_of: "isize".into() }]
        );
        assert_eq!(interface.messages.len(), 3);

        let read = &interface.messages[1];
        assert_eq!(read.name, "read");
        assert_eq!(read.attrs.kind, MessageKind::Rpc);
        assert_eq!(read.attrs.id, 2);
        assert_eq!(
            read.request,
            vec![Payload::new("handle", "handle"), Payload::new("len", "usize")]
        );
        assert_eq!(
            read.response,
            vec![Payload::new("data", "page"), Payload::new("len", "usize")]
        );
        assert_eq!((read.line, read.column), (5, 21));

        let closed = &interface.messages[2];
        assert_eq!(closed.attrs.kind, MessageKind::Event);
        assert!(closed.response.is_empty());
    }

    #[test]
    fn test_parse_empty_interface() {
        let interface = parse("interface empty = 0 {}").unwrap();
        assert!(interface.types.is_empty());
        assert!(interface.messages.is_empty());
    }

    #[test]
    fn test_parse_rejects_large_interface_id() {
        let err = parse("interface big = 256 {}").unwrap_err();
        match err {
            IdlError::ParseError { msg, line, column } => {
                assert!(msg.contains("interface id"), "{}", msg);
                assert_eq!((line, column), (1, 17));
            }
            other => panic!("expected a ParseError but got {:?}", other),
        }
    }

    #[test]
    fn test_parse_reports_missing_semicolon() {
        let err = parse("interface x = 1 {\n  rpc a = 1 () -> ()\n}").unwrap_err();
        match err {
            IdlError::ParseError { msg, line, .. } => {
                assert_eq!(msg, "Expected \";\" but found \"}\"");
                assert_eq!(line, 3);
            }
            other => panic!("expected a ParseError but got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_trailing_tokens() {
        let err = parse("interface x = 1 {} type").unwrap_err();
        assert!(matches!(err, IdlError::ParseError { .. }));
    }

    #[test]
    fn test_parse_rejects_unknown_kind() {
        let err = parse("interface x = 1 { oneway a = 1 (); }").unwrap_err();
        assert!(matches!(err, IdlError::ParseError { .. }));
    }
}
