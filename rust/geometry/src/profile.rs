// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D profile definitions for swept solids

use std::f64::consts::PI;

use crate::error::{Error, Result};
use crate::transform::parse_axis2_placement;
use nalgebra::{Point2, Point3};
use twin_bim_core::{AttributeValue, DecodedEntity, EntityDecoder};

/// Segments used to approximate circular profiles
const CIRCLE_SEGMENTS: usize = 24;

/// 2D Profile with optional holes
#[derive(Debug, Clone, PartialEq)]
pub struct Profile2D {
    pub outer: Vec<Point2<f64>>,
    pub holes: Vec<Vec<Point2<f64>>>,
}

impl Profile2D {
    pub fn new(outer: Vec<Point2<f64>>) -> Self {
        Self {
            outer,
            holes: Vec::new(),
        }
    }

    fn with_hole(mut self, hole: Vec<Point2<f64>>) -> Self {
        self.holes.push(hole);
        self
    }

    fn map_points(&mut self, f: impl Fn(&Point2<f64>) -> Point2<f64>) {
        for p in self.outer.iter_mut().chain(self.holes.iter_mut().flatten()) {
            *p = f(p);
        }
    }
}

fn rectangle(half_x: f64, half_y: f64) -> Vec<Point2<f64>> {
    vec![
        Point2::new(-half_x, -half_y),
        Point2::new(half_x, -half_y),
        Point2::new(half_x, half_y),
        Point2::new(-half_x, half_y),
    ]
}

fn circle(radius: f64) -> Vec<Point2<f64>> {
    (0..CIRCLE_SEGMENTS)
        .map(|i| {
            let angle = i as f64 * 2.0 * PI / CIRCLE_SEGMENTS as f64;
            Point2::new(radius * angle.cos(), radius * angle.sin())
        })
        .collect()
}

fn required_float(profile: &DecodedEntity, index: usize, what: &str) -> Result<f64> {
    profile
        .get_float(index)
        .filter(|v| v.is_finite())
        .ok_or_else(|| Error::InvalidProfile(format!("#{} missing {}", profile.id, what)))
}

/// Resolve an IfcProfileDef into a 2D outline
///
/// Supported: rectangle (and hollow), circle (and hollow), arbitrary closed
/// profiles with or without voids.
pub fn parse_profile(profile: &DecodedEntity, decoder: &mut EntityDecoder) -> Result<Profile2D> {
    // Parametric profiles: 0 ProfileType, 1 ProfileName, 2 Position, 3.. dimensions
    let mut parsed = match profile.type_name.as_str() {
        "IFCRECTANGLEPROFILEDEF" => {
            let x = required_float(profile, 3, "XDim")?;
            let y = required_float(profile, 4, "YDim")?;
            Profile2D::new(rectangle(x / 2.0, y / 2.0))
        }
        "IFCRECTANGLEHOLLOWPROFILEDEF" => {
            let (hx, hy) = (
                required_float(profile, 3, "XDim")? / 2.0,
                required_float(profile, 4, "YDim")? / 2.0,
            );
            let wall = required_float(profile, 5, "WallThickness")?;
            if wall >= hx || wall >= hy {
                return Err(Error::InvalidProfile(format!(
                    "#{} wall thickness {} exceeds half dimensions",
                    profile.id, wall
                )));
            }
            let mut hole = rectangle(hx - wall, hy - wall);
            hole.reverse();
            Profile2D::new(rectangle(hx, hy)).with_hole(hole)
        }
        "IFCCIRCLEPROFILEDEF" => Profile2D::new(circle(required_float(profile, 3, "Radius")?)),
        "IFCCIRCLEHOLLOWPROFILEDEF" => {
            let radius = required_float(profile, 3, "Radius")?;
            let wall = required_float(profile, 4, "WallThickness")?;
            if wall >= radius {
                return Err(Error::InvalidProfile(format!(
                    "#{} wall thickness {} exceeds radius {}",
                    profile.id, wall, radius
                )));
            }
            let mut hole = circle(radius - wall);
            hole.reverse();
            Profile2D::new(circle(radius)).with_hole(hole)
        }
        // 0 ProfileType, 1 ProfileName, 2 OuterCurve, (3 InnerCurves)
        "IFCARBITRARYCLOSEDPROFILEDEF" | "IFCARBITRARYPROFILEDEFWITHVOIDS" => {
            let outer_curve = decoder
                .resolve_attr(profile, 2)?
                .ok_or_else(|| Error::InvalidProfile(format!("#{} missing OuterCurve", profile.id)))?;
            let mut parsed = Profile2D::new(flatten_2d(curve_points(&outer_curve, decoder)?));
            if let Some(inner) = profile.get(3).filter(|v| !v.is_null()) {
                for curve in decoder.resolve_ref_list(inner)? {
                    parsed.holes.push(flatten_2d(curve_points(&curve, decoder)?));
                }
            }
            // Arbitrary profiles carry no Position
            return Ok(parsed);
        }
        other => {
            return Err(Error::InvalidProfile(format!("unsupported profile type {}", other)));
        }
    };

    if let Some(position) = decoder.resolve_attr(profile, 2)? {
        let matrix = parse_axis2_placement(&position, decoder)?;
        parsed.map_points(|p| {
            let q = matrix.transform_point(&Point3::new(p.x, p.y, 0.0));
            Point2::new(q.x, q.y)
        });
    }
    Ok(parsed)
}

fn flatten_2d(points: Vec<Point3<f64>>) -> Vec<Point2<f64>> {
    let mut flat: Vec<Point2<f64>> = points.into_iter().map(|p| Point2::new(p.x, p.y)).collect();
    // Closed curves repeat the first point
    if flat.len() > 1 && flat.first() == flat.last() {
        flat.pop();
    }
    flat
}

/// Points of a polyline-like curve
///
/// IfcPolyline (Points) and IfcIndexedPolyCurve (Points, Segments) are
/// supported; arc segments of indexed curves are taken as straight chords.
pub fn curve_points(curve: &DecodedEntity, decoder: &mut EntityDecoder) -> Result<Vec<Point3<f64>>> {
    match curve.type_name.as_str() {
        "IFCPOLYLINE" => {
            let mut points = Vec::new();
            for point in decoder.resolve_ref_list(curve.get(0).unwrap_or(&AttributeValue::Null))? {
                points.push(crate::transform::point_from_entity(&point)?);
            }
            Ok(points)
        }
        "IFCINDEXEDPOLYCURVE" => {
            let list = decoder
                .resolve_attr(curve, 0)?
                .ok_or_else(|| Error::geometry(format!("#{} missing Points", curve.id)))?;
            let coords = AttributeValue::parse_coordinate_list(list.get_list(0).unwrap_or(&[]));

            let Some(segments) = curve.get_list(1) else {
                return Ok(coords.into_iter().map(Point3::from).collect());
            };
            let mut order: Vec<usize> = Vec::new();
            for segment in segments {
                let indices = segment.as_list().unwrap_or(&[]);
                for index in indices.iter().filter_map(|v| v.as_int()) {
                    let index = (index - 1) as usize;
                    if order.last() != Some(&index) {
                        order.push(index);
                    }
                }
            }
            order
                .into_iter()
                .map(|i| {
                    coords
                        .get(i)
                        .map(|c| Point3::from(*c))
                        .ok_or_else(|| Error::geometry(format!("#{} index {} out of range", curve.id, i + 1)))
                })
                .collect()
        }
        other => Err(Error::UnsupportedItem(format!("curve type {}", other))),
    }
}
