// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type-spec string parser.
//!
//! Turns strings such as `Vec<(AccountId32,u128)>` or `[u8;4]` into
//! [`TypeRef`]s. Grammar (whitespace-insensitive):
//!
//! ```text
//! type     := tuple | array | ident generics?
//! tuple    := '(' [type (',' type)* [',']] ')'
//! array    := '[' type ';' integer ']'
//! generics := '<' type (',' type)* '>'
//! ```
//!
//! `()` is `Null`, `(T)` is `T`, `(T,)` is a one-element tuple. Nesting is
//! limited to [`DEFAULT_MAX_DEPTH`] levels.

use crate::registry::descriptor::{PrimitiveKind, TypeDescriptor, TypeRef};
use crate::registry::DEFAULT_MAX_DEPTH;
use std::fmt;
use std::str::FromStr;

/// Malformed type-spec string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecError {
    /// Byte position in the input.
    pub position: usize,
    pub message: String,
}

impl SpecError {
    fn new(position: usize, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }
}

impl fmt::Display for SpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at position {}", self.message, self.position)
    }
}

impl std::error::Error for SpecError {}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Integer(usize),
    LAngle,
    RAngle,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Eof,
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() {
                self.next_char();
            } else {
                break;
            }
        }
    }

    /// Identifiers may carry `::` path segments (`T::AccountId`).
    fn read_identifier(&mut self) -> String {
        let start = self.pos;
        while let Some(ch) = self.peek_char() {
            if ch.is_alphanumeric() || ch == '_' || ch == ':' {
                self.next_char();
            } else {
                break;
            }
        }
        self.input[start..self.pos].to_string()
    }

    fn read_integer(&mut self) -> Result<Token, SpecError> {
        let start = self.pos;
        while let Some(ch) = self.peek_char() {
            if ch.is_ascii_digit() {
                self.next_char();
            } else {
                break;
            }
        }
        self.input[start..self.pos]
            .parse()
            .map(Token::Integer)
            .map_err(|_| SpecError::new(start, "array length out of range"))
    }

    /// Returns the token and its start position.
    fn next_token(&mut self) -> Result<(Token, usize), SpecError> {
        self.skip_whitespace();
        let start = self.pos;

        let ch = match self.peek_char() {
            Some(c) => c,
            None => return Ok((Token::Eof, start)),
        };

        let single = match ch {
            '<' => Some(Token::LAngle),
            '>' => Some(Token::RAngle),
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            '[' => Some(Token::LBracket),
            ']' => Some(Token::RBracket),
            ',' => Some(Token::Comma),
            ';' => Some(Token::Semicolon),
            _ => None,
        };
        if let Some(token) = single {
            self.next_char();
            return Ok((token, start));
        }

        if ch.is_ascii_digit() {
            return Ok((self.read_integer()?, start));
        }

        if ch.is_alphabetic() || ch == '_' {
            return Ok((Token::Ident(self.read_identifier()), start));
        }

        Err(SpecError::new(
            start,
            format!("unexpected character '{}'", ch),
        ))
    }
}

struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    position: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Result<Self, SpecError> {
        let mut lexer = Lexer::new(input);
        let (current, position) = lexer.next_token()?;
        Ok(Self {
            lexer,
            current,
            position,
            depth: 0,
        })
    }

    fn advance(&mut self) -> Result<(), SpecError> {
        let (token, position) = self.lexer.next_token()?;
        self.current = token;
        self.position = position;
        Ok(())
    }

    fn expect(&mut self, token: Token, what: &str) -> Result<(), SpecError> {
        if self.current != token {
            return Err(self.error(format!("expected {}, got {:?}", what, self.current)));
        }
        self.advance()
    }

    fn error(&self, message: impl Into<String>) -> SpecError {
        SpecError::new(self.position, message)
    }

    fn parse_type(&mut self) -> Result<TypeRef, SpecError> {
        if self.depth >= DEFAULT_MAX_DEPTH {
            return Err(self.error("type nested too deeply"));
        }
        self.depth += 1;
        let result = self.parse_nested();
        self.depth -= 1;
        result
    }

    fn parse_nested(&mut self) -> Result<TypeRef, SpecError> {
        match &self.current {
            Token::LParen => self.parse_tuple(),
            Token::LBracket => self.parse_array(),
            Token::Ident(name) => {
                let name = name.clone();
                let at = self.position;
                self.advance()?;
                if self.current == Token::LAngle {
                    let args = self.parse_generic_args()?;
                    apply_generic(&name, args).map_err(|msg| SpecError::new(at, msg))
                } else {
                    Ok(ident_type(name))
                }
            }
            other => Err(self.error(format!("expected type, got {:?}", other))),
        }
    }

    fn parse_tuple(&mut self) -> Result<TypeRef, SpecError> {
        self.advance()?;
        let mut elements = Vec::new();
        let mut trailing_comma = false;

        while self.current != Token::RParen {
            elements.push(self.parse_type()?);
            trailing_comma = false;
            match self.current {
                Token::Comma => {
                    self.advance()?;
                    trailing_comma = true;
                }
                Token::RParen => {}
                _ => return Err(self.error("expected ',' or ')' in tuple")),
            }
        }
        self.advance()?;

        Ok(match elements.len() {
            0 => PrimitiveKind::Null.into(),
            1 if !trailing_comma => elements.remove(0),
            _ => TypeDescriptor::Tuple(elements).into(),
        })
    }

    fn parse_array(&mut self) -> Result<TypeRef, SpecError> {
        self.advance()?;
        let element = self.parse_type()?;
        self.expect(Token::Semicolon, "';' in array type")?;
        let len = match self.current {
            Token::Integer(n) => n,
            _ => return Err(self.error("expected array length")),
        };
        self.advance()?;
        self.expect(Token::RBracket, "']'")?;

        if is_u8(&element) {
            Ok(PrimitiveKind::FixedBytes(len).into())
        } else {
            Ok(TypeDescriptor::FixedArray(element, len).into())
        }
    }

    fn parse_generic_args(&mut self) -> Result<Vec<TypeRef>, SpecError> {
        self.advance()?;
        let mut args = vec![self.parse_type()?];
        while self.current == Token::Comma {
            self.advance()?;
            args.push(self.parse_type()?);
        }
        self.expect(Token::RAngle, "'>'")?;
        Ok(args)
    }
}

fn is_u8(r: &TypeRef) -> bool {
    matches!(r, TypeRef::Inline(d) if **d == TypeDescriptor::Primitive(PrimitiveKind::U8))
}

fn ident_type(name: String) -> TypeRef {
    match PrimitiveKind::from_name(&name) {
        Some(kind) => kind.into(),
        None => TypeRef::Named(name),
    }
}

fn apply_generic(name: &str, mut args: Vec<TypeRef>) -> Result<TypeRef, String> {
    let arity = match name {
        "Result" | "BTreeMap" => 2,
        "Vec" | "Option" | "Compact" | "Box" | "BTreeSet" | "WrapperKeepOpaque"
        | "WrapperOpaque" => 1,
        _ => return Err(format!("unknown generic type {}", name)),
    };
    if args.len() != arity {
        return Err(format!(
            "{} takes {} type argument(s), got {}",
            name,
            arity,
            args.len()
        ));
    }

    let second = if arity == 2 { args.pop() } else { None };
    let first = args.remove(0);

    let desc = match (name, second) {
        ("Vec", _) if is_u8(&first) => TypeDescriptor::Primitive(PrimitiveKind::Bytes),
        ("Vec" | "BTreeSet", _) => TypeDescriptor::Sequence(first),
        ("Option", _) => TypeDescriptor::Option(first),
        ("Compact", _) => TypeDescriptor::Compact(first),
        ("Box", _) => return Ok(first),
        ("WrapperKeepOpaque" | "WrapperOpaque", _) => TypeDescriptor::Opaque(first),
        ("Result", Some(err)) => TypeDescriptor::Result(first, err),
        ("BTreeMap", Some(value)) => {
            TypeDescriptor::Sequence(TypeDescriptor::Tuple(vec![first, value]).into())
        }
        _ => return Err(format!("unknown generic type {}", name)),
    };
    Ok(desc.into())
}

/// Parse a type-spec string.
pub fn parse_type_spec(input: &str) -> Result<TypeRef, SpecError> {
    let mut parser = Parser::new(input)?;
    let ty = parser.parse_type()?;
    if parser.current != Token::Eof {
        return Err(parser.error(format!("unexpected trailing {:?}", parser.current)));
    }
    Ok(ty)
}

impl FromStr for TypeRef {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_type_spec(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> TypeRef {
        parse_type_spec(s).unwrap_or_else(|e| panic!("{}: {}", s, e))
    }

    fn prim(kind: PrimitiveKind) -> TypeRef {
        kind.into()
    }

    #[test]
    fn test_primitives_and_names() {
        assert_eq!(parse("u32"), prim(PrimitiveKind::U32));
        assert_eq!(parse(" Text "), prim(PrimitiveKind::Text));
        assert_eq!(parse("Null"), prim(PrimitiveKind::Null));
        assert_eq!(parse("()"), prim(PrimitiveKind::Null));
        assert_eq!(parse("AccountId32"), TypeRef::named("AccountId32"));
        assert_eq!(parse("T::Balance"), TypeRef::named("T::Balance"));
    }

    #[test]
    fn test_byte_shorthands() {
        assert_eq!(parse("Vec<u8>"), prim(PrimitiveKind::Bytes));
        assert_eq!(parse("[u8;32]"), prim(PrimitiveKind::FixedBytes(32)));
        assert_eq!(parse("[u8; 4]"), prim(PrimitiveKind::FixedBytes(4)));
    }

    #[test]
    fn test_composites() {
        assert_eq!(
            parse("([u8;4],Bytes)"),
            TypeDescriptor::Tuple(vec![
                prim(PrimitiveKind::FixedBytes(4)),
                prim(PrimitiveKind::Bytes)
            ])
            .into()
        );
        assert_eq!(
            parse("Result<Null, SpRuntimeDispatchError>"),
            TypeDescriptor::Result(
                prim(PrimitiveKind::Null),
                TypeRef::named("SpRuntimeDispatchError")
            )
            .into()
        );
        assert_eq!(
            parse("[u32;3]"),
            TypeDescriptor::FixedArray(prim(PrimitiveKind::U32), 3).into()
        );
        assert_eq!(
            parse("Option<Vec<H256>>"),
            TypeDescriptor::Option(TypeDescriptor::Sequence(TypeRef::named("H256")).into()).into()
        );
    }

    #[test]
    fn test_collection_shorthands() {
        assert_eq!(
            parse("BTreeMap<AccountId32, u32>").to_string(),
            "Vec<(AccountId32,u32)>"
        );
        assert_eq!(parse("BTreeSet<u16>").to_string(), "Vec<u16>");
        assert_eq!(parse("Box<Call>"), TypeRef::named("Call"));
        assert_eq!(
            parse("WrapperKeepOpaque<Call>").to_string(),
            "WrapperKeepOpaque<Call>"
        );
    }

    #[test]
    fn test_parenthesised_single_type() {
        assert_eq!(parse("(u8)"), prim(PrimitiveKind::U8));
        assert_eq!(
            parse("(u8,)"),
            TypeDescriptor::Tuple(vec![prim(PrimitiveKind::U8)]).into()
        );
    }

    #[test]
    fn test_display_parse_agree() {
        for spec in [
            "Vec<(u32,[u8;4],Bytes)>",
            "Option<Compact<u128>>",
            "Result<Null,Text>",
            "[H256;2]",
        ] {
            assert_eq!(parse(spec).to_string(), spec);
        }
    }

    #[test]
    fn test_malformed() {
        for bad in [
            "",
            "Vec<",
            "Vec<u8",
            "Vec<u8>>",
            "[u8;]",
            "[u8 4]",
            "(u8 u16)",
            "Result<u8>",
            "Frob<u8>",
            "u8 $",
        ] {
            assert!(parse_type_spec(bad).is_err(), "accepted {:?}", bad);
        }
        let err = parse_type_spec("Vec<u8;>").unwrap_err();
        assert_eq!(err.position, 6);
    }

    #[test]
    fn test_nesting_limit() {
        let nested = |open: &str, close: &str, n: usize| {
            format!("{}u8{}", open.repeat(n), close.repeat(n))
        };

        assert!(parse_type_spec(&nested("Vec<", ">", DEFAULT_MAX_DEPTH - 1)).is_ok());
        assert!(parse_type_spec(&nested("(", ")", DEFAULT_MAX_DEPTH - 1)).is_ok());

        for deep in [
            nested("Vec<", ">", DEFAULT_MAX_DEPTH),
            nested("(", ")", 200_000),
            nested("Vec<", ">", 200_000),
            nested("[", ";1]", 200_000),
        ] {
            let err = parse_type_spec(&deep).unwrap_err();
            assert_eq!(err.message, "type nested too deeply");
        }
    }

    #[test]
    fn test_from_str() {
        let r: TypeRef = "Compact<u64>".parse().unwrap();
        assert_eq!(r.to_string(), "Compact<u64>");
    }
}
