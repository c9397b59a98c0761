// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Placement and transform parsing
//!
//! IfcLocalPlacement chains, IfcAxis2Placement2D/3D and
//! IfcCartesianTransformationOperator3D are turned into nalgebra matrices.

use crate::error::{Error, Result};
use nalgebra::{Matrix4, Point3, Vector3};
use twin_bim_core::{DecodedEntity, EntityDecoder};

/// Maximum depth of an IfcLocalPlacement chain before it is treated as cyclic
pub const MAX_PLACEMENT_DEPTH: usize = 100;

/// Build a placement matrix from a location and optional Z / X directions
///
/// Axes are orthonormalized; a missing axis defaults to +Z, a missing or
/// degenerate reference direction to +X.
pub fn axis_placement_matrix(
    location: Point3<f64>,
    axis: Option<Vector3<f64>>,
    ref_direction: Option<Vector3<f64>>,
) -> Matrix4<f64> {
    let z_axis = axis
        .filter(|v| v.norm() > 1e-12)
        .map(|v| v.normalize())
        .unwrap_or_else(Vector3::z);
    let x_hint = ref_direction
        .filter(|v| v.norm() > 1e-12)
        .map(|v| v.normalize())
        .unwrap_or_else(Vector3::x);

    // Project X onto the plane perpendicular to Z
    let x_orthogonal = x_hint - z_axis * x_hint.dot(&z_axis);
    let x_axis = if x_orthogonal.norm() > 1e-6 {
        x_orthogonal.normalize()
    } else if z_axis.z.abs() < 0.9 {
        Vector3::z().cross(&z_axis).normalize()
    } else {
        Vector3::x().cross(&z_axis).normalize()
    };
    let y_axis = z_axis.cross(&x_axis).normalize();

    let mut transform = Matrix4::identity();
    for row in 0..3 {
        transform[(row, 0)] = x_axis[row];
        transform[(row, 1)] = y_axis[row];
        transform[(row, 2)] = z_axis[row];
        transform[(row, 3)] = location[row];
    }
    transform
}

/// Parse IfcAxis2Placement3D or IfcAxis2Placement2D into a matrix
pub fn parse_axis2_placement(
    placement: &DecodedEntity,
    decoder: &mut EntityDecoder,
) -> Result<Matrix4<f64>> {
    let location = parse_cartesian_point(placement, decoder, 0)?;

    if placement.is_type("IFCAXIS2PLACEMENT2D") {
        // 0: Location, 1: RefDirection
        let ref_direction = parse_optional_direction(placement, decoder, 1)?;
        return Ok(axis_placement_matrix(location, None, ref_direction));
    }
    if !placement.is_type("IFCAXIS2PLACEMENT3D") {
        return Err(Error::InvalidPlacement(format!(
            "expected IfcAxis2Placement, got {}",
            placement.type_name
        )));
    }

    // 0: Location, 1: Axis, 2: RefDirection
    let axis = parse_optional_direction(placement, decoder, 1)?;
    let ref_direction = parse_optional_direction(placement, decoder, 2)?;
    Ok(axis_placement_matrix(location, axis, ref_direction))
}

/// Parse the IfcCartesianPoint referenced by `attr_index`; 2D points get z = 0
pub fn parse_cartesian_point(
    parent: &DecodedEntity,
    decoder: &mut EntityDecoder,
    attr_index: usize,
) -> Result<Point3<f64>> {
    let point = decoder
        .resolve_attr(parent, attr_index)?
        .ok_or_else(|| Error::geometry(format!("#{} missing cartesian point", parent.id)))?;
    point_from_entity(&point)
}

/// Coordinates of an IfcCartesianPoint
pub fn point_from_entity(point: &DecodedEntity) -> Result<Point3<f64>> {
    if !point.is_type("IFCCARTESIANPOINT") {
        return Err(Error::geometry(format!(
            "Expected IfcCartesianPoint, got {}",
            point.type_name
        )));
    }
    let coords = point
        .get_list(0)
        .ok_or_else(|| Error::geometry("IfcCartesianPoint missing coordinates"))?;
    let x = coords.first().and_then(|v| v.as_float()).unwrap_or(0.0);
    let y = coords.get(1).and_then(|v| v.as_float()).unwrap_or(0.0);
    let z = coords.get(2).and_then(|v| v.as_float()).unwrap_or(0.0);
    Ok(Point3::new(x, y, z))
}

/// Parse IfcDirection (DirectionRatios)
pub fn parse_direction(direction: &DecodedEntity) -> Result<Vector3<f64>> {
    let ratios = direction
        .get_list(0)
        .ok_or_else(|| Error::geometry("IfcDirection missing ratios"))?;
    let x = ratios.first().and_then(|v| v.as_float()).unwrap_or(0.0);
    let y = ratios.get(1).and_then(|v| v.as_float()).unwrap_or(0.0);
    let z = ratios.get(2).and_then(|v| v.as_float()).unwrap_or(0.0);
    Ok(Vector3::new(x, y, z))
}

fn parse_optional_direction(
    parent: &DecodedEntity,
    decoder: &mut EntityDecoder,
    attr_index: usize,
) -> Result<Option<Vector3<f64>>> {
    match decoder.resolve_attr(parent, attr_index)? {
        Some(direction) => Ok(Some(parse_direction(&direction)?)),
        None => Ok(None),
    }
}

/// Resolve the world transform of an IfcLocalPlacement
///
/// The chain is composed parent-first (`parent * local`). Chains deeper than
/// [`MAX_PLACEMENT_DEPTH`] are rejected as cyclic.
pub fn resolve_placement(
    placement: &DecodedEntity,
    decoder: &mut EntityDecoder,
) -> Result<Matrix4<f64>> {
    resolve_placement_at_depth(placement, decoder, 0)
}

fn resolve_placement_at_depth(
    placement: &DecodedEntity,
    decoder: &mut EntityDecoder,
    depth: usize,
) -> Result<Matrix4<f64>> {
    if depth > MAX_PLACEMENT_DEPTH {
        return Err(Error::InvalidPlacement(format!(
            "placement chain at #{} exceeds {} levels",
            placement.id, MAX_PLACEMENT_DEPTH
        )));
    }
    if !placement.is_type("IFCLOCALPLACEMENT") {
        // Grid and linear placements resolve to identity
        tracing::debug!(placement = placement.id, kind = %placement.type_name, "unsupported placement");
        return Ok(Matrix4::identity());
    }

    // 0: PlacementRelTo, 1: RelativePlacement
    let parent = match decoder.resolve_attr(placement, 0)? {
        Some(parent) => resolve_placement_at_depth(&parent, decoder, depth + 1)?,
        None => Matrix4::identity(),
    };
    let local = match decoder.resolve_attr(placement, 1)? {
        Some(relative) => parse_axis2_placement(&relative, decoder)?,
        None => Matrix4::identity(),
    };
    Ok(parent * local)
}

/// World transform of a product (ObjectPlacement, attribute 5)
pub fn object_placement(product: &DecodedEntity, decoder: &mut EntityDecoder) -> Result<Matrix4<f64>> {
    match decoder.resolve_attr(product, 5)? {
        Some(placement) => resolve_placement(&placement, decoder),
        None => Ok(Matrix4::identity()),
    }
}

/// Parse IfcCartesianTransformationOperator3D (and the non-uniform variant)
///
/// 0: Axis1, 1: Axis2, 2: LocalOrigin, 3: Scale, 4: Axis3,
/// non-uniform adds 5: Scale2, 6: Scale3
pub fn parse_transformation_operator(
    operator: &DecodedEntity,
    decoder: &mut EntityDecoder,
) -> Result<Matrix4<f64>> {
    let x_axis = parse_optional_direction(operator, decoder, 0)?;
    let origin = parse_cartesian_point(operator, decoder, 2)?;
    let z_axis = parse_optional_direction(operator, decoder, 4)?;

    let scale = operator.get_float(3).unwrap_or(1.0);
    let (scale_y, scale_z) = if operator.is_type("IFCCARTESIANTRANSFORMATIONOPERATOR3DNONUNIFORM") {
        (
            operator.get_float(5).unwrap_or(scale),
            operator.get_float(6).unwrap_or(scale),
        )
    } else {
        (scale, scale)
    };

    let rotation = axis_placement_matrix(origin, z_axis, x_axis);
    let scaling = Matrix4::new_nonuniform_scaling(&Vector3::new(scale, scale_y, scale_z));
    Ok(rotation * scaling)
}
