// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::kernel::{EntityHandle, MaterialSelect};
use crate::model::Material;
use crate::outcome::FieldOutcome;

/// First single material associated with the entity
///
/// Layer sets and other composite selects are passed over.
pub fn extract_material<E: EntityHandle>(entity: &E) -> FieldOutcome<Material> {
    let associations = match entity.material_associations() {
        Ok(associations) => associations,
        Err(e) => {
            tracing::warn!(entity = entity.id(), error = %e, "material extraction failed");
            return FieldOutcome::skipped(e);
        }
    };

    for select in associations {
        match select {
            MaterialSelect::Material(data) => {
                return FieldOutcome::Ok(Material {
                    name: data.name.unwrap_or_default(),
                    description: data.description.unwrap_or_default(),
                    category: data.category.unwrap_or_default(),
                });
            }
            MaterialSelect::Other { type_name } => {
                tracing::debug!(entity = entity.id(), select = %type_name, "composite material not resolved");
            }
        }
    }

    FieldOutcome::Default
}
