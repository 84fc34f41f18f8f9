use serde_json::json;

use super::{unsupported, Draft, DraftChange, DraftError, DraftField};
use crate::resource::Room;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoomDraft {
    pub name: String,
}

impl Draft for RoomDraft {
    type Entity = Room;

    const FIELDS: &'static [DraftField] = &[DraftField::Name];
    const REQUIRED: &'static [DraftField] = &[DraftField::Name];

    fn is_set(&self, field: DraftField) -> bool {
        field == DraftField::Name && !self.name.is_empty()
    }

    fn apply(&mut self, change: DraftChange) -> Result<(), DraftError> {
        match change {
            DraftChange::Name(name) => {
                self.name = name;
                Ok(())
            }
            other => Err(unsupported(&other)),
        }
    }

    fn from_entity(room: &Room) -> Self {
        Self {
            name: room.name.clone(),
        }
    }

    fn to_payload(&self) -> Result<serde_json::Value, serde_json::Error> {
        Ok(json!({ "name": self.name }))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_name_is_required() {
        let mut draft = RoomDraft::default();
        assert!(!draft.validate_create());
        draft.apply(DraftChange::Name("Exam 1".into())).unwrap();
        assert!(draft.validate_create());
        assert_eq!(draft.to_payload().unwrap(), json!({ "name": "Exam 1" }));
    }
}
