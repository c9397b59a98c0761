// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Unit extraction for IFC files
//!
//! Reads the project length unit (IFCSIUNIT with an optional prefix, or an
//! IFCCONVERSIONBASEDUNIT) and reports its scale to metres and a plural
//! display name.

use crate::decoder::EntityDecoder;
use crate::error::Result;
use crate::value::DecodedEntity;

/// Project length unit
#[derive(Debug, Clone, PartialEq)]
pub struct LengthUnit {
    /// Multiplier from file units to metres
    pub scale: f64,
    /// Display name, e.g. "meters", "millimeters", "feet"
    pub name: String,
}

impl Default for LengthUnit {
    fn default() -> Self {
        Self {
            scale: 1.0,
            name: "meters".to_string(),
        }
    }
}

/// SI Prefix multipliers as defined in IFC specification
#[inline]
pub fn get_si_prefix_multiplier(prefix: &str) -> f64 {
    match prefix {
        "ATTO" => 1e-18,
        "FEMTO" => 1e-15,
        "PICO" => 1e-12,
        "NANO" => 1e-9,
        "MICRO" => 1e-6,
        "MILLI" => 1e-3,
        "CENTI" => 1e-2,
        "DECI" => 1e-1,
        "DECA" => 1e1,
        "HECTO" => 1e2,
        "KILO" => 1e3,
        "MEGA" => 1e6,
        "GIGA" => 1e9,
        "TERA" => 1e12,
        "PETA" => 1e15,
        "EXA" => 1e18,
        _ => 1.0,
    }
}

fn si_length_name(prefix: Option<&str>) -> String {
    match prefix {
        None => "meters".to_string(),
        Some(prefix) => format!("{}meters", prefix.to_ascii_lowercase()),
    }
}

fn conversion_unit_name(name: &str) -> String {
    match name.to_ascii_uppercase().as_str() {
        "FOOT" | "FEET" | "FOOT_US" => "feet".to_string(),
        "INCH" | "INCHES" => "inches".to_string(),
        "YARD" => "yards".to_string(),
        "MILE" => "miles".to_string(),
        _ => name.to_ascii_lowercase(),
    }
}

/// Extract the length unit of a project
///
/// Follows IFCPROJECT.UnitsInContext → IFCUNITASSIGNMENT → length unit.
/// Anything missing along the chain yields metres.
pub fn extract_length_unit(decoder: &mut EntityDecoder, project: &DecodedEntity) -> Result<LengthUnit> {
    // IfcProject attribute 8: UnitsInContext
    let Some(assignment) = decoder.resolve_attr(project, 8)? else {
        return Ok(LengthUnit::default());
    };
    if !assignment.is_type("IFCUNITASSIGNMENT") {
        return Ok(LengthUnit::default());
    }

    for unit_id in assignment.get_refs(0) {
        let unit = match decoder.decode_by_id(unit_id) {
            Ok(unit) => unit,
            Err(e) => {
                tracing::debug!(unit_id, error = %e, "skipping undecodable unit");
                continue;
            }
        };
        if let Some(length) = length_unit_of(decoder, &unit)? {
            return Ok(length);
        }
    }

    Ok(LengthUnit::default())
}

fn length_unit_of(decoder: &mut EntityDecoder, unit: &DecodedEntity) -> Result<Option<LengthUnit>> {
    // IfcNamedUnit attribute 1: UnitType
    if unit.get(1).and_then(|v| v.as_enum()) != Some("LENGTHUNIT") {
        return Ok(None);
    }

    if unit.is_type("IFCSIUNIT") {
        // IfcSIUnit attribute 2: Prefix
        let prefix = unit.get(2).and_then(|v| v.as_enum());
        return Ok(Some(LengthUnit {
            scale: prefix.map(get_si_prefix_multiplier).unwrap_or(1.0),
            name: si_length_name(prefix),
        }));
    }

    if unit.is_type("IFCCONVERSIONBASEDUNIT") {
        // Attribute 2: Name, attribute 3: ConversionFactor (IfcMeasureWithUnit)
        let name = unit.get_string(2).unwrap_or("unknown").to_string();
        let mut scale = 1.0;
        if let Some(factor) = decoder.resolve_attr(unit, 3)? {
            let value = factor.get_float(0).unwrap_or(1.0);
            let base = match decoder.resolve_attr(&factor, 1)? {
                Some(base_unit) => length_unit_of(decoder, &base_unit)?
                    .map(|u| u.scale)
                    .unwrap_or(1.0),
                None => 1.0,
            };
            scale = value * base;
        }
        return Ok(Some(LengthUnit {
            scale,
            name: conversion_unit_name(&name),
        }));
    }

    Ok(None)
}
