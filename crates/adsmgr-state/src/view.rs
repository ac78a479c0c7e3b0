//! Entities as the caller sees them: authoritative data with live overlays
//! laid on top.

use std::collections::HashMap;
use std::str::FromStr;

use adsmgr_core::{AggregatedEntity, MutationField};
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityView {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    /// Entity fields currently showing an unconfirmed value, sorted.
    pub pending_fields: Vec<String>,
}

impl EntityView {
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        !self.pending_fields.is_empty()
    }
}

/// Applies each entity's overlay (looked up by [`AggregatedEntity::overlay_key`])
/// over its serialized fields.
///
/// Overlay names are mutation field names and are translated to entity
/// field names (`budget` lands on `daily_budget`). Unknown names are applied
/// as-is. Neither input is modified.
#[must_use]
pub fn merge(
    entities: &[AggregatedEntity],
    overlays: &HashMap<String, Map<String, Value>>,
) -> Vec<EntityView> {
    entities
        .iter()
        .map(|entity| {
            let mut fields = match serde_json::to_value(entity) {
                Ok(Value::Object(map)) => map,
                _ => Map::new(),
            };

            let mut pending_fields = Vec::new();
            if let Some(overlay) = overlays.get(entity.overlay_key()) {
                for (name, value) in overlay {
                    let target = MutationField::from_str(name)
                        .map_or_else(|_| name.clone(), |f| f.entity_field().to_string());
                    fields.insert(target.clone(), value.clone());
                    pending_fields.push(target);
                }
                pending_fields.sort();
                pending_fields.dedup();
            }

            EntityView {
                fields,
                pending_fields,
            }
        })
        .collect()
}
