// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity Decoder - On-demand entity parsing
//!
//! Entities are decoded lazily from byte offsets recorded by a single scan of
//! the DATA section.

use crate::error::{Error, Result};
use crate::parser::{parse_entity, EntityScanner};
use crate::value::{AttributeValue, DecodedEntity};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Pre-built entity index: entity id -> (start, end) byte offsets
pub type EntityIndex = FxHashMap<u32, (usize, usize)>;

/// Build entity index from content - one O(n) scan
pub fn build_entity_index(content: &str) -> EntityIndex {
    // Roughly one instance per 50 bytes
    let mut index = FxHashMap::with_capacity_and_hasher(content.len() / 50, Default::default());
    let mut scanner = EntityScanner::new(content);
    while let Some((id, _, start, end)) = scanner.next_entity() {
        index.insert(id, (start, end));
    }
    index
}

/// Decode a single instance from its source text
pub fn decode_instance(text: &str, position: usize) -> Result<DecodedEntity> {
    let (id, type_name, tokens) = parse_entity(text).map_err(|e| {
        Error::parse(
            position,
            format!("{}, input: {:?}", e, snippet(text, 100)),
        )
    })?;
    let attributes = tokens.iter().map(AttributeValue::from_token).collect();
    Ok(DecodedEntity::new(id, type_name, attributes))
}

/// At most `max_chars` characters of `text`
fn snippet(text: &str, max_chars: usize) -> &str {
    text.char_indices().nth(max_chars).map_or(text, |(i, _)| &text[..i])
}

/// Entity decoder with a per-instance cache
///
/// The index is shared through an `Arc` so several decoders (one per worker
/// thread) can run over the same content.
pub struct EntityDecoder<'a> {
    content: &'a str,
    cache: FxHashMap<u32, Arc<DecodedEntity>>,
    entity_index: Arc<EntityIndex>,
}

impl<'a> EntityDecoder<'a> {
    /// Create a decoder, scanning the content to build the index
    pub fn new(content: &'a str) -> Self {
        Self::with_arc_index(content, Arc::new(build_entity_index(content)))
    }

    /// Create decoder with shared Arc index (for parallel processing)
    pub fn with_arc_index(content: &'a str, index: Arc<EntityIndex>) -> Self {
        Self {
            content,
            cache: FxHashMap::default(),
            entity_index: index,
        }
    }

    /// Decode entity by ID - O(1) lookup using the entity index
    pub fn decode_by_id(&mut self, entity_id: u32) -> Result<Arc<DecodedEntity>> {
        if let Some(entity) = self.cache.get(&entity_id) {
            return Ok(Arc::clone(entity));
        }

        let (start, end) = self
            .entity_index
            .get(&entity_id)
            .copied()
            .ok_or(Error::EntityNotFound(entity_id))?;

        let entity = Arc::new(decode_instance(&self.content[start..end], start)?);
        self.cache.insert(entity_id, Arc::clone(&entity));
        Ok(entity)
    }

    /// Resolve entity reference (follow #ID)
    /// Returns None for null/derived values
    pub fn resolve_ref(&mut self, attr: &AttributeValue) -> Result<Option<Arc<DecodedEntity>>> {
        match attr.as_entity_ref() {
            Some(id) => Ok(Some(self.decode_by_id(id)?)),
            None => Ok(None),
        }
    }

    /// Resolve list of entity references, ignoring non-reference items
    pub fn resolve_ref_list(&mut self, attr: &AttributeValue) -> Result<Vec<Arc<DecodedEntity>>> {
        let list = attr
            .as_list()
            .ok_or_else(|| Error::parse(0, "Expected list"))?;

        let mut entities = Vec::with_capacity(list.len());
        for item in list {
            if let Some(id) = item.as_entity_ref() {
                entities.push(self.decode_by_id(id)?);
            }
        }
        Ok(entities)
    }

    /// Resolve the reference held in attribute `index` of `entity`
    pub fn resolve_attr(
        &mut self,
        entity: &DecodedEntity,
        index: usize,
    ) -> Result<Option<Arc<DecodedEntity>>> {
        match entity.get(index) {
            Some(attr) => self.resolve_ref(attr),
            None => Ok(None),
        }
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }

    /// Raw source text of an entity
    pub fn get_raw_content(&self, entity_id: u32) -> Option<&'a str> {
        let (start, end) = self.entity_index.get(&entity_id).copied()?;
        Some(&self.content[start..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTENT: &str = "ISO-10303-21;\nHEADER;\nENDSEC;\nDATA;\n\
#1=IFCCARTESIANPOINT((0.,0.,0.));\n\
#2=IFCDIRECTION((0.,0.,1.));\n\
#3=IFCAXIS2PLACEMENT3D(#1,#2,$);\n\
#4=IFCLOCALPLACEMENT($,#3);\n\
ENDSEC;\nEND-ISO-10303-21;\n";

    #[test]
    fn test_index_and_decode() {
        let index = build_entity_index(CONTENT);
        assert_eq!(index.len(), 4);

        let mut decoder = EntityDecoder::with_arc_index(CONTENT, Arc::new(index));
        let placement = decoder.decode_by_id(4).unwrap();
        assert!(placement.is_type("IfcLocalPlacement"));
        assert!(placement.get(0).unwrap().is_null());

        let axis = decoder.resolve_attr(&placement, 1).unwrap().unwrap();
        assert_eq!(axis.id, 3);
        assert_eq!(axis.get_ref(0), Some(1));
        assert_eq!(decoder.cache_size(), 2);
    }

    #[test]
    fn test_missing_entity() {
        let mut decoder = EntityDecoder::new(CONTENT);
        assert!(matches!(
            decoder.decode_by_id(99),
            Err(Error::EntityNotFound(99))
        ));
    }

    #[test]
    fn test_malformed_non_ascii_instance_is_an_error() {
        let text = format!("#5=IFCWALL('g',$,'a{}',$,$,$,$,@);", "é".repeat(60));
        let err = decode_instance(&text, 0).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
        assert!(err.to_string().contains("IFCWALL"));
    }
}
