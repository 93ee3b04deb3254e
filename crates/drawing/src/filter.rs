use crate::FilterError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

/// Which drawing entities count as walls.
///
/// Keyed by layer name, then entity-type name, holding the accepted
/// line-type names. The JSON form mirrors that nesting:
///
/// ```json
/// { "A-WALL": { "LINE": ["CONTINUOUS", "BYLAYER"], "LWPOLYLINE": ["BYLAYER"] } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractionFilter {
    layers: BTreeMap<String, BTreeMap<String, BTreeSet<String>>>,
}

impl ExtractionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, FilterError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FilterError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| FilterError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Accept `line_types` for `entity_type` on `layer`, merging with any
    /// existing rule for that layer.
    pub fn with_rule<I, S>(mut self, layer: &str, entity_type: &str, line_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.layers
            .entry(layer.to_string())
            .or_default()
            .entry(entity_type.to_string())
            .or_default()
            .extend(line_types.into_iter().map(Into::into));
        self
    }

    pub fn layers(&self) -> impl Iterator<Item = &str> {
        self.layers.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Whether an entity with the given attributes is selected.
    ///
    /// The first layer rule whose key equals `layer` decides: its entity
    /// types and line types are checked and no other rule is consulted.
    /// Layer keys are unique, so at most one rule can apply.
    pub fn accepts(&self, layer: &str, entity_type: &str, linetype: &str) -> bool {
        let Some(types) = self.layers.get(layer) else {
            return false;
        };
        types
            .get(entity_type)
            .is_some_and(|line_types| line_types.contains(linetype))
    }
}
