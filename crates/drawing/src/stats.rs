use crate::Drawing;
use serde::Serialize;
use std::collections::BTreeMap;

/// Entity counts per layer, entity type and line type.
///
/// Used to author an [`ExtractionFilter`](crate::ExtractionFilter): the
/// nesting is the same, with counts in place of the accepted line-type sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DrawingStats {
    layers: BTreeMap<String, BTreeMap<String, BTreeMap<String, usize>>>,
}

impl DrawingStats {
    pub fn collect(drawing: &Drawing) -> Self {
        let mut layers: BTreeMap<String, BTreeMap<String, BTreeMap<String, usize>>> =
            BTreeMap::new();
        for entity in drawing.entities() {
            *layers
                .entry(entity.layer.clone())
                .or_default()
                .entry(entity.entity_type().to_string())
                .or_default()
                .entry(entity.linetype.clone())
                .or_default() += 1;
        }
        Self { layers }
    }

    /// Keep only the named layers.
    pub fn retain_layers<S: AsRef<str>>(&mut self, names: &[S]) {
        self.layers
            .retain(|layer, _| names.iter().any(|n| n.as_ref() == layer));
    }

    pub fn layer_names(&self) -> impl Iterator<Item = &str> {
        self.layers.keys().map(String::as_str)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
