use serde::Serialize;

use super::{unsupported, Draft, DraftChange, DraftError, DraftField};
use crate::resource::{EntityId, Region};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegionDraft {
    pub name: String,
    pub health_center_id: Option<EntityId>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegionPayload<'a> {
    name: &'a str,
    health_center_id: Option<&'a EntityId>,
}

impl Draft for RegionDraft {
    type Entity = Region;

    const FIELDS: &'static [DraftField] = &[DraftField::Name, DraftField::HealthCenter];
    const REQUIRED: &'static [DraftField] = &[DraftField::HealthCenter, DraftField::Name];

    fn is_set(&self, field: DraftField) -> bool {
        match field {
            DraftField::Name => !self.name.is_empty(),
            DraftField::HealthCenter => self.health_center_id.is_some(),
            _ => false,
        }
    }

    fn apply(&mut self, change: DraftChange) -> Result<(), DraftError> {
        match change {
            DraftChange::Name(name) => self.name = name,
            DraftChange::HealthCenter(id) => self.health_center_id = id,
            other => return Err(unsupported(&other)),
        }
        Ok(())
    }

    fn from_entity(region: &Region) -> Self {
        Self {
            name: region.name.clone(),
            health_center_id: region.health_center_id.clone(),
        }
    }

    fn to_payload(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(RegionPayload {
            name: &self.name,
            health_center_id: self.health_center_id.as_ref(),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn selected(&self, field: DraftField) -> Vec<String> {
        match field {
            DraftField::HealthCenter => self
                .health_center_id
                .iter()
                .map(ToString::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }
}
