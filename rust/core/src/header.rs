// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! STEP header section

use std::fmt;

use crate::error::{Error, Result};
use crate::parser::{find_instance_end, parse_entity, Token};
use crate::value::decode_step_string;

const MAGIC: &str = "ISO-10303-21";

/// IFC schema declared in FILE_SCHEMA
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaVersion {
    Ifc2x3,
    Ifc4,
    Ifc4x3,
    /// Any other identifier, kept verbatim
    Other(String),
}

impl SchemaVersion {
    pub fn from_identifier(identifier: &str) -> Self {
        let upper = identifier.trim().to_ascii_uppercase();
        if upper.starts_with("IFC2X3") {
            SchemaVersion::Ifc2x3
        } else if upper.starts_with("IFC4X3") {
            SchemaVersion::Ifc4x3
        } else if upper.starts_with("IFC4") {
            SchemaVersion::Ifc4
        } else {
            SchemaVersion::Other(identifier.trim().to_string())
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaVersion::Ifc2x3 => f.write_str("IFC2X3"),
            SchemaVersion::Ifc4 => f.write_str("IFC4"),
            SchemaVersion::Ifc4x3 => f.write_str("IFC4X3"),
            SchemaVersion::Other(s) => f.write_str(s),
        }
    }
}

/// Parsed header section
#[derive(Debug, Clone, PartialEq)]
pub struct StepHeader {
    /// None when FILE_SCHEMA is absent or empty
    pub schema: Option<SchemaVersion>,
    /// FILE_NAME name field
    pub file_name: Option<String>,
    /// FILE_NAME originating_system field
    pub originating_system: Option<String>,
}

/// Parse the header section of a STEP exchange file
///
/// Fails with [`Error::MissingHeader`] when the content does not start with
/// the ISO-10303-21 magic.
pub fn parse_header(content: &str) -> Result<StepHeader> {
    if !content.trim_start().starts_with(MAGIC) {
        return Err(Error::MissingHeader);
    }

    let mut header = StepHeader {
        schema: None,
        file_name: None,
        originating_system: None,
    };

    let Some(start) = content.find("HEADER;") else {
        return Ok(header);
    };
    let end = content[start..]
        .find("ENDSEC;")
        .map(|i| start + i)
        .unwrap_or(content.len());

    let body = &content[start + "HEADER;".len()..end];
    let mut pos = 0;
    while let Some(record_end) = find_instance_end(body.as_bytes(), pos) {
        let record = body[pos..record_end].trim();
        pos = record_end;

        // Reuse the instance grammar by giving the record a dummy id
        let instance = format!("#0={}", record);
        let Ok((_, keyword, args)) = parse_entity(&instance) else {
            continue;
        };
        let args: Vec<Vec<String>> = args.into_iter().map(owned_string).collect();

        match keyword.to_ascii_uppercase().as_str() {
            "FILE_SCHEMA" => {
                header.schema = args
                    .first()
                    .and_then(|a| a.first())
                    .map(|s| SchemaVersion::from_identifier(s));
            }
            "FILE_NAME" => {
                header.file_name = args.first().and_then(|a| a.first().cloned());
                header.originating_system = args.get(5).and_then(|a| a.first().cloned());
            }
            _ => {}
        }
    }

    Ok(header)
}

/// Flatten a header argument to its string values
fn owned_string(token: Token) -> Vec<String> {
    match token {
        Token::String(s) => vec![decode_step_string(s)],
        Token::List(items) => items.into_iter().flat_map(owned_string).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header() {
        let content = "ISO-10303-21;\nHEADER;\n\
FILE_DESCRIPTION(('ViewDefinition [CoordinationView]'),'2;1');\n\
FILE_NAME('tower.ifc','2024-01-01T00:00:00',(''),(''),'lib','Revit','');\n\
FILE_SCHEMA(('IFC2X3'));\nENDSEC;\nDATA;\nENDSEC;\nEND-ISO-10303-21;\n";
        let header = parse_header(content).unwrap();
        assert_eq!(header.schema, Some(SchemaVersion::Ifc2x3));
        assert_eq!(header.file_name.as_deref(), Some("tower.ifc"));
        assert_eq!(header.originating_system.as_deref(), Some("Revit"));
    }

    #[test]
    fn test_schema_identifiers() {
        assert_eq!(SchemaVersion::from_identifier("IFC4X3_ADD2"), SchemaVersion::Ifc4x3);
        assert_eq!(SchemaVersion::from_identifier("IFC4"), SchemaVersion::Ifc4);
        assert_eq!(SchemaVersion::Ifc2x3.to_string(), "IFC2X3");
        assert_eq!(
            SchemaVersion::from_identifier("CONFIG_CONTROL_DESIGN"),
            SchemaVersion::Other("CONFIG_CONTROL_DESIGN".to_string())
        );
    }

    #[test]
    fn test_rejects_non_step_content() {
        assert!(matches!(parse_header("not a step file"), Err(Error::MissingHeader)));
    }
}
