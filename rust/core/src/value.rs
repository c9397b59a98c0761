// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decoded attribute values and entities

use crate::parser::Token;
use crate::schema;

/// IFC entity attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// Entity reference
    EntityRef(u32),
    /// String value, STEP escapes resolved
    String(String),
    Integer(i64),
    Float(f64),
    /// Enum value without the surrounding dots
    Enum(String),
    List(Vec<AttributeValue>),
    /// Typed value such as IFCLABEL('x'), keeping the type keyword
    Typed(String, Box<AttributeValue>),
    /// Null/undefined ($)
    Null,
    /// Derived value (*)
    Derived,
}

impl AttributeValue {
    pub fn from_token(token: &Token) -> Self {
        match token {
            Token::EntityRef(id) => AttributeValue::EntityRef(*id),
            Token::String(s) => AttributeValue::String(decode_step_string(s)),
            Token::Integer(i) => AttributeValue::Integer(*i),
            Token::Float(f) => AttributeValue::Float(*f),
            Token::Enum(e) => AttributeValue::Enum(e.to_string()),
            Token::List(items) => AttributeValue::List(items.iter().map(Self::from_token).collect()),
            Token::TypedValue(type_name, args) => {
                let inner = match args.as_slice() {
                    [single] => Self::from_token(single),
                    many => AttributeValue::List(many.iter().map(Self::from_token).collect()),
                };
                AttributeValue::Typed(type_name.to_ascii_uppercase(), Box::new(inner))
            }
            Token::Null => AttributeValue::Null,
            Token::Derived => AttributeValue::Derived,
        }
    }

    /// Strip a typed-value wrapper, if any
    #[inline]
    pub fn untyped(&self) -> &AttributeValue {
        match self {
            AttributeValue::Typed(_, inner) => inner.untyped(),
            other => other,
        }
    }

    #[inline]
    pub fn as_entity_ref(&self) -> Option<u32> {
        match self {
            AttributeValue::EntityRef(id) => Some(*id),
            _ => None,
        }
    }

    /// Get as string, looking through typed values like IFCLABEL('x')
    #[inline]
    pub fn as_string(&self) -> Option<&str> {
        match self.untyped() {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_enum(&self) -> Option<&str> {
        match self.untyped() {
            AttributeValue::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// STEP booleans and logicals: .T. / .F. (.U. has no boolean value)
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self.as_enum()? {
            "T" | "TRUE" => Some(true),
            "F" | "FALSE" => Some(false),
            _ => None,
        }
    }

    #[inline]
    pub fn as_float(&self) -> Option<f64> {
        match self.untyped() {
            AttributeValue::Float(f) => Some(*f),
            AttributeValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    #[inline]
    pub fn as_int(&self) -> Option<i64> {
        match self.untyped() {
            AttributeValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    #[inline]
    pub fn as_list(&self) -> Option<&[AttributeValue]> {
        match self.untyped() {
            AttributeValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Check if null/derived
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null | AttributeValue::Derived)
    }

    /// Parse a list of coordinate triples; 2D points get z = 0
    pub fn parse_coordinate_list(coord_list: &[AttributeValue]) -> Vec<[f64; 3]> {
        coord_list
            .iter()
            .filter_map(|coord_attr| {
                let coord = coord_attr.as_list()?;
                let x = coord.first().and_then(|v| v.as_float())?;
                let y = coord.get(1).and_then(|v| v.as_float())?;
                let z = coord.get(2).and_then(|v| v.as_float()).unwrap_or(0.0);
                Some([x, y, z])
            })
            .collect()
    }

    /// Parse a list of 1-based index tuples into 0-based indices
    pub fn parse_index_list(face_list: &[AttributeValue]) -> Vec<Vec<u32>> {
        face_list
            .iter()
            .filter_map(|face| {
                face.as_list()?
                    .iter()
                    .map(|v| v.as_int().filter(|i| *i >= 1).map(|i| (i - 1) as u32))
                    .collect::<Option<Vec<u32>>>()
            })
            .collect()
    }
}

/// Resolve STEP string escapes: '' and \\, \X\hh (ISO 8859-1) and
/// \X2\hhhh...\X0\ (UTF-16). Unknown escapes are kept verbatim.
pub fn decode_step_string(raw: &str) -> String {
    if !raw.contains('\\') && !raw.contains("''") {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(c) = rest.chars().next() {
        if c == '\'' && rest.starts_with("''") {
            out.push('\'');
            rest = &rest[2..];
        } else if rest.starts_with("\\\\") {
            out.push('\\');
            rest = &rest[2..];
        } else if let Some(tail) = rest.strip_prefix("\\X2\\") {
            let end = tail.find("\\X0\\").unwrap_or(tail.len());
            let units: Vec<u16> = tail[..end]
                .as_bytes()
                .chunks(4)
                .filter_map(|chunk| std::str::from_utf8(chunk).ok())
                .filter_map(|hex| u16::from_str_radix(hex, 16).ok())
                .collect();
            out.extend(char::decode_utf16(units).map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER)));
            rest = tail.get(end + 4..).unwrap_or("");
        } else if let Some(decoded) = rest
            .strip_prefix("\\X\\")
            .and_then(|tail| tail.get(..2))
            .and_then(|hex| u8::from_str_radix(hex, 16).ok())
        {
            out.push(char::from(decoded));
            rest = &rest[5..];
        } else {
            out.push(c);
            rest = &rest[c.len_utf8()..];
        }
    }
    out
}

/// Decoded IFC entity with attributes
#[derive(Debug, Clone)]
pub struct DecodedEntity {
    pub id: u32,
    /// Type keyword, upper case (e.g. `IFCWALL`)
    pub type_name: String,
    pub attributes: Vec<AttributeValue>,
}

impl DecodedEntity {
    pub fn new(id: u32, type_name: &str, attributes: Vec<AttributeValue>) -> Self {
        Self {
            id,
            type_name: type_name.to_ascii_uppercase(),
            attributes,
        }
    }

    /// Exact type check, case-insensitive
    #[inline]
    pub fn is_type(&self, type_name: &str) -> bool {
        self.type_name.eq_ignore_ascii_case(type_name)
    }

    /// Type check including subtypes known to the schema tables
    pub fn is_a(&self, type_name: &str) -> bool {
        schema::is_subtype_of(&self.type_name, type_name)
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&AttributeValue> {
        self.attributes.get(index)
    }

    #[inline]
    pub fn get_ref(&self, index: usize) -> Option<u32> {
        self.get(index).and_then(|v| v.as_entity_ref())
    }

    #[inline]
    pub fn get_string(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(|v| v.as_string())
    }

    #[inline]
    pub fn get_float(&self, index: usize) -> Option<f64> {
        self.get(index).and_then(|v| v.as_float())
    }

    #[inline]
    pub fn get_list(&self, index: usize) -> Option<&[AttributeValue]> {
        self.get(index).and_then(|v| v.as_list())
    }

    /// Entity references held in a list attribute
    pub fn get_refs(&self, index: usize) -> Vec<u32> {
        self.get_list(index)
            .map(|items| items.iter().filter_map(|v| v.as_entity_ref()).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_step_string_escapes() {
        assert_eq!(decode_step_string("it''s"), "it's");
        assert_eq!(decode_step_string("a\\\\b"), "a\\b");
        assert_eq!(decode_step_string("Stra\\X\\DFe"), "Straße");
        assert_eq!(decode_step_string("\\X2\\00C400D6\\X0\\l"), "ÄÖl");
        assert_eq!(decode_step_string("plain"), "plain");
    }

    #[test]
    fn test_typed_value_unwraps() {
        let token = Token::TypedValue("IfcLabel", vec![Token::String("EI 60")]);
        let value = AttributeValue::from_token(&token);
        assert_eq!(value.as_string(), Some("EI 60"));
        match &value {
            AttributeValue::Typed(name, _) => assert_eq!(name, "IFCLABEL"),
            other => panic!("expected typed value, got {:?}", other),
        }

        let flag = AttributeValue::from_token(&Token::TypedValue("IFCBOOLEAN", vec![Token::Enum("T")]));
        assert_eq!(flag.as_bool(), Some(true));
    }

    #[test]
    fn test_parse_lists() {
        let coords = AttributeValue::List(vec![
            AttributeValue::List(vec![AttributeValue::Float(1.0), AttributeValue::Float(2.0)]),
            AttributeValue::List(vec![
                AttributeValue::Float(0.0),
                AttributeValue::Integer(1),
                AttributeValue::Float(3.5),
            ]),
        ]);
        let points = AttributeValue::parse_coordinate_list(coords.as_list().unwrap());
        assert_eq!(points, vec![[1.0, 2.0, 0.0], [0.0, 1.0, 3.5]]);

        let faces = vec![AttributeValue::List(vec![
            AttributeValue::Integer(1),
            AttributeValue::Integer(2),
            AttributeValue::Integer(3),
        ])];
        assert_eq!(AttributeValue::parse_index_list(&faces), vec![vec![0, 1, 2]]);
    }
}
