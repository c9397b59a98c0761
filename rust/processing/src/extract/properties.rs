// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Property extraction
//!
//! Direct attributes are written first, as strings. Property-set values are
//! applied afterwards in relationship order, so a property set overrides a
//! direct attribute of the same name and a later set overrides an earlier
//! one.

use std::collections::BTreeMap;

use crate::kernel::{EntityHandle, KernelResult, Value};
use crate::model::PropertyValue;
use crate::outcome::FieldOutcome;

pub type PropertyMap = BTreeMap<String, PropertyValue>;

pub fn extract_properties<E: EntityHandle>(entity: &E) -> FieldOutcome<PropertyMap> {
    match collect_properties(entity) {
        Ok(properties) => FieldOutcome::Ok(properties),
        Err(e) => {
            tracing::warn!(entity = entity.id(), error = %e, "property extraction failed");
            FieldOutcome::skipped(e)
        }
    }
}

fn collect_properties<E: EntityHandle>(entity: &E) -> KernelResult<PropertyMap> {
    let mut properties = PropertyMap::new();

    for name in entity.attribute_names() {
        if let Some(value) = entity.attribute(&name)? {
            properties.insert(name, PropertyValue::Text(value.to_string()));
        }
    }

    for pset in entity.property_sets()? {
        for (name, value) in pset.properties {
            match value {
                Some(value) => {
                    properties.insert(name, scalar(&value));
                }
                None => tracing::debug!(
                    entity = entity.id(),
                    pset = pset.name.as_deref().unwrap_or(""),
                    property = %name,
                    "property without nominal value"
                ),
            }
        }
    }

    Ok(properties)
}

/// Property-set value as a JSON scalar; anything non-scalar becomes text
pub fn scalar(value: &Value) -> PropertyValue {
    match value.unwrapped() {
        Value::Text(s) | Value::Enum(s) => PropertyValue::Text(s.clone()),
        Value::Integer(i) => PropertyValue::Integer(*i),
        Value::Real(r) => PropertyValue::Real(*r),
        Value::Boolean(b) => PropertyValue::Boolean(*b),
        other => PropertyValue::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_unwraps_defined_types() {
        let typed = Value::Typed {
            type_name: "IFCLENGTHMEASURE".into(),
            value: Box::new(Value::Real(0.2)),
        };
        assert_eq!(scalar(&typed), PropertyValue::Real(0.2));
        assert_eq!(scalar(&Value::Enum("TRUE".into())), PropertyValue::from("TRUE"));
        assert_eq!(
            scalar(&Value::List(vec![Value::Integer(1), Value::Integer(2)])),
            PropertyValue::from("(1, 2)")
        );
    }
}
