// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Boolean result processor
//!
//! Only the first operand of IfcBooleanResult / IfcBooleanClippingResult is
//! meshed; the second operand is not subtracted. Half-space clipped walls
//! therefore keep their unclipped extent.

use crate::router::{GeometryProcessor, ItemContext};
use crate::{Error, Mesh, Result};
use twin_bim_core::{DecodedEntity, EntityDecoder};

/// Handles IfcBooleanResult and IfcBooleanClippingResult
///
/// Attributes: 0 Operator, 1 FirstOperand, 2 SecondOperand
pub struct BooleanResultProcessor;

impl GeometryProcessor for BooleanResultProcessor {
    fn process(&self, entity: &DecodedEntity, decoder: &mut EntityDecoder, ctx: &ItemContext<'_>) -> Result<Mesh> {
        let first = decoder
            .resolve_attr(entity, 1)?
            .ok_or_else(|| Error::geometry(format!("#{} missing FirstOperand", entity.id)))?;
        ctx.process_nested(&first, decoder)
    }

    fn supported_types(&self) -> &'static [&'static str] {
        &["IFCBOOLEANRESULT", "IFCBOOLEANCLIPPINGRESULT"]
    }
}
