// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::BTreeMap;

use crate::model::{BimModel, ModelSize, Statistics};

/// Element counts per type and the model extent
pub fn statistics(model: &BimModel) -> Statistics {
    let mut element_types: BTreeMap<String, usize> = BTreeMap::new();
    for element in &model.elements {
        *element_types.entry(element.element_type.clone()).or_default() += 1;
    }

    let [width, height, depth] = model.bounding_box.size;
    Statistics {
        total_elements: model.elements.len(),
        unique_types: element_types.len(),
        element_types,
        model_size: ModelSize { width, height, depth },
    }
}
