// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! STEP/IFC Parser using nom
//!
//! Zero-copy tokenization of entity instances and a scanner that walks the
//! DATA section without decoding attributes.

use nom::{
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, digit1, one_of},
    combinator::{map, map_res, opt, recognize},
    multi::separated_list0,
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};

use crate::error::{Error, Result};

/// STEP/IFC Token
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    /// Entity reference: #123
    EntityRef(u32),
    /// String literal with STEP escapes still in place: 'text'
    String(&'a str),
    /// Integer: 42
    Integer(i64),
    /// Float: 3.14
    Float(f64),
    /// Enum: .T., .F., .ELEMENT.
    Enum(&'a str),
    /// List: (1, 2, 3)
    List(Vec<Token<'a>>),
    /// Typed value: IFCLABEL('x'), IFCBOOLEAN(.T.)
    TypedValue(&'a str, Vec<Token<'a>>),
    /// Null value: $
    Null,
    /// Derived value: *
    Derived,
}

fn entity_ref(input: &str) -> IResult<&str, Token> {
    map(
        preceded(char('#'), map_res(digit1, |s: &str| s.parse::<u32>())),
        Token::EntityRef,
    )(input)
}

/// Parse string literal: 'text'
/// A doubled quote ('') is an escaped quote inside the literal.
fn string_literal(input: &str) -> IResult<&str, Token> {
    fn content(input: &str) -> IResult<&str, &str> {
        let bytes = input.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'\'' {
                if bytes.get(i + 1) == Some(&b'\'') {
                    i += 2;
                    continue;
                }
                return Ok((&input[i..], &input[..i]));
            }
            i += 1;
        }
        Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Char,
        )))
    }

    map(delimited(char('\''), content, char('\'')), Token::String)(input)
}

fn integer(input: &str) -> IResult<&str, Token> {
    map_res(
        recognize(tuple((opt(one_of("+-")), digit1))),
        |s: &str| s.parse::<i64>().map(Token::Integer),
    )(input)
}

/// Parse float: 3.14, -3.14, 1.5E-10, 0.
/// STEP allows a trailing dot without fraction digits.
fn float(input: &str) -> IResult<&str, Token> {
    map_res(
        recognize(tuple((
            opt(one_of("+-")),
            digit1,
            char('.'),
            opt(digit1),
            opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
        ))),
        |s: &str| s.parse::<f64>().map(Token::Float),
    )(input)
}

fn enum_value(input: &str) -> IResult<&str, Token> {
    map(
        delimited(
            char('.'),
            take_while1(|c: char| c.is_alphanumeric() || c == '_'),
            char('.'),
        ),
        Token::Enum,
    )(input)
}

fn null(input: &str) -> IResult<&str, Token> {
    map(char('$'), |_| Token::Null)(input)
}

fn derived(input: &str) -> IResult<&str, Token> {
    map(char('*'), |_| Token::Derived)(input)
}

fn typed_value(input: &str) -> IResult<&str, Token> {
    map(
        pair(
            take_while1(|c: char| c.is_alphanumeric() || c == '_'),
            arguments,
        ),
        |(type_name, args)| Token::TypedValue(type_name, args),
    )(input)
}

fn ws(input: &str) -> IResult<&str, ()> {
    map(take_while(|c: char| c.is_whitespace()), |_| ())(input)
}

fn token(input: &str) -> IResult<&str, Token> {
    delimited(
        ws,
        alt((
            float, // before integer, floats share the digit prefix
            integer,
            entity_ref,
            string_literal,
            enum_value,
            list,
            typed_value,
            null,
            derived,
        )),
        ws,
    )(input)
}

fn arguments(input: &str) -> IResult<&str, Vec<Token>> {
    delimited(
        char('('),
        separated_list0(delimited(ws, char(','), ws), token),
        preceded(ws, char(')')),
    )(input)
}

fn list(input: &str) -> IResult<&str, Token> {
    map(arguments, Token::List)(input)
}

/// Parse a complete entity instance
/// Example: #123=IFCWALL('guid',#2,'name',$,$,#10,#20,$);
///
/// Returns the id, the type keyword as written in the file and the
/// top-level arguments.
pub fn parse_entity(input: &str) -> Result<(u32, &str, Vec<Token>)> {
    let result: IResult<&str, (u32, &str, Vec<Token>)> = tuple((
        delimited(
            ws,
            preceded(char('#'), map_res(digit1, |s: &str| s.parse::<u32>())),
            ws,
        ),
        preceded(
            char('='),
            delimited(
                ws,
                take_while1(|c: char| c.is_alphanumeric() || c == '_'),
                ws,
            ),
        ),
        nom::sequence::terminated(arguments, tuple((ws, char(';')))),
    ))(input);

    match result {
        Ok((_, parsed)) => Ok(parsed),
        Err(e) => Err(Error::parse(0, format!("Failed to parse entity: {}", e))),
    }
}

/// Byte offset of the first instance in the DATA section
///
/// Content without a `DATA;` marker is scanned from the start.
pub fn data_section_start(content: &str) -> usize {
    let after_header = content.find("ENDSEC;").unwrap_or(0);
    content[after_header..]
        .find("DATA;")
        .map(|i| after_header + i + "DATA;".len())
        .unwrap_or(0)
}

/// Find the byte just past the `;` that terminates the instance starting at
/// `start`. Semicolons inside string literals are skipped.
pub(crate) fn find_instance_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut in_string = false;
    for (offset, &b) in bytes[start..].iter().enumerate() {
        match b {
            b'\'' => in_string = !in_string,
            b';' if !in_string => return Some(start + offset + 1),
            _ => {}
        }
    }
    None
}

/// Fast entity scanner - walks instances without decoding attributes
pub struct EntityScanner<'a> {
    content: &'a str,
    start: usize,
    position: usize,
}

impl<'a> EntityScanner<'a> {
    pub fn new(content: &'a str) -> Self {
        let start = data_section_start(content);
        Self {
            content,
            start,
            position: start,
        }
    }

    /// Scan for the next entity
    /// Returns (entity_id, type_name, instance_start, instance_end)
    pub fn next_entity(&mut self) -> Option<(u32, &'a str, usize, usize)> {
        let bytes = self.content.as_bytes();

        loop {
            let offset = memchr::memchr(b'#', &bytes[self.position..])?;
            let instance_start = self.position + offset;

            let mut pos = instance_start + 1;
            while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                pos += 1;
            }
            let id_end = pos;
            while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
                pos += 1;
            }

            if id_end == instance_start + 1 || bytes.get(pos) != Some(&b'=') {
                // Stray '#' outside an instance header (e.g. inside a comment)
                self.position = instance_start + 1;
                continue;
            }

            let instance_end = find_instance_end(bytes, pos)?;
            let id_text = &self.content[instance_start + 1..id_end];
            let Ok(id) = id_text.parse::<u32>() else {
                tracing::warn!(id = id_text, offset = instance_start, "instance id out of range, skipping");
                self.position = instance_end;
                continue;
            };

            let type_region = &self.content[pos + 1..instance_end];
            let Some(type_offset) = type_region.find(|c: char| !c.is_whitespace()) else {
                tracing::warn!(id, offset = instance_start, "instance without a type, skipping");
                self.position = instance_end;
                continue;
            };
            let type_start = pos + 1 + type_offset;
            let type_end = self.content[type_start..instance_end]
                .find(|c: char| c == '(' || c.is_whitespace())
                .map(|i| type_start + i)
                .unwrap_or(instance_end);

            self.position = instance_end;
            return Some((id, &self.content[type_start..type_end], instance_start, instance_end));
        }
    }

    /// Find all entities of a specific type (exact keyword match)
    pub fn find_by_type(&mut self, target_type: &str) -> Vec<(u32, usize, usize)> {
        let mut results = Vec::new();
        while let Some((id, type_name, start, end)) = self.next_entity() {
            if type_name.eq_ignore_ascii_case(target_type) {
                results.push((id, start, end));
            }
        }
        results
    }

    /// Count entities by type keyword
    pub fn count_by_type(&mut self) -> rustc_hash::FxHashMap<String, usize> {
        let mut counts = rustc_hash::FxHashMap::default();
        while let Some((_, type_name, _, _)) = self.next_entity() {
            *counts.entry(type_name.to_ascii_uppercase()).or_insert(0) += 1;
        }
        counts
    }

    /// Reset scanner to the beginning of the DATA section
    pub fn reset(&mut self) {
        self.position = self.start;
    }
}
