use crate::{Drawing, DrawingEntity, ExtractionFilter};
use hashbrown::HashMap;

/// Selected entities of one entity type, in drawing order.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityGroup<'a> {
    pub entity_type: String,
    pub entities: Vec<&'a DrawingEntity>,
}

/// Entities selected by an [`ExtractionFilter`], grouped by entity type.
///
/// Groups appear in the order their type was first met in the drawing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedEntities<'a> {
    groups: Vec<EntityGroup<'a>>,
}

impl<'a> ExtractedEntities<'a> {
    pub fn groups(&self) -> &[EntityGroup<'a>] {
        &self.groups
    }

    /// Total number of selected entities across all groups.
    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.entities.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Select the entities of `drawing` that `filter` accepts.
pub fn extract<'a>(drawing: &'a Drawing, filter: &ExtractionFilter) -> ExtractedEntities<'a> {
    let mut groups: Vec<EntityGroup<'a>> = Vec::new();
    let mut slots: HashMap<&'a str, usize> = HashMap::new();

    for entity in drawing.entities() {
        let entity_type = entity.entity_type();
        if !filter.accepts(&entity.layer, entity_type, &entity.linetype) {
            continue;
        }

        let slot = *slots.entry(entity_type).or_insert_with(|| {
            groups.push(EntityGroup {
                entity_type: entity_type.to_string(),
                entities: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].entities.push(entity);
    }

    log::debug!(
        "extracted {} of {} entities in {} type group(s)",
        groups.iter().map(|g| g.entities.len()).sum::<usize>(),
        drawing.len(),
        groups.len()
    );

    ExtractedEntities { groups }
}
