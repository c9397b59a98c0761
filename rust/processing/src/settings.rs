// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Processor configuration
//!
//! Settings are plain values owned by a processor instance and handed to the
//! kernel on every call.

use crate::category::ElementCategory;

/// Options passed to the kernel's shape generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeSettings {
    /// Return vertices in world coordinates
    pub use_world_coords: bool,
    /// Include curve items (axes, footprints) as edges
    pub include_curves: bool,
    /// Let the kernel assign default materials
    pub apply_default_materials: bool,
}

impl Default for ShapeSettings {
    fn default() -> Self {
        Self {
            use_world_coords: true,
            include_curves: true,
            apply_default_materials: true,
        }
    }
}

/// How storey floor area is computed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FloorAreaRule {
    /// Fixed contribution per contained slab with a generatable shape.
    /// Stand-in until real slab area is specified.
    PlaceholderPerSlab { area_per_slab: f64 },
}

impl FloorAreaRule {
    pub const DEFAULT_SLAB_AREA: f64 = 100.0;

    pub fn is_placeholder(&self) -> bool {
        matches!(self, FloorAreaRule::PlaceholderPerSlab { .. })
    }
}

impl Default for FloorAreaRule {
    fn default() -> Self {
        FloorAreaRule::PlaceholderPerSlab {
            area_per_slab: Self::DEFAULT_SLAB_AREA,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessorSettings {
    pub shape: ShapeSettings,
    /// Categories in extraction order
    pub categories: Vec<ElementCategory>,
    pub floor_area: FloorAreaRule,
    /// Extract elements of a category on the rayon pool (order is kept)
    pub parallel_elements: bool,
}

impl Default for ProcessorSettings {
    fn default() -> Self {
        Self {
            shape: ShapeSettings::default(),
            categories: ElementCategory::ALL.to_vec(),
            floor_area: FloorAreaRule::default(),
            parallel_elements: false,
        }
    }
}

impl ProcessorSettings {
    pub fn with_shape(mut self, shape: ShapeSettings) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_categories(mut self, categories: impl IntoIterator<Item = ElementCategory>) -> Self {
        self.categories = categories.into_iter().collect();
        self
    }

    pub fn with_floor_area(mut self, rule: FloorAreaRule) -> Self {
        self.floor_area = rule;
        self
    }

    pub fn with_parallel_elements(mut self, parallel: bool) -> Self {
        self.parallel_elements = parallel;
        self
    }
}
