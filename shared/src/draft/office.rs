use chrono::NaiveTime;
use serde::Serialize;
use std::collections::BTreeSet;

use super::hours::{encode_hours, time_from_ticks};
use super::{unsupported, Draft, DraftChange, DraftError, DraftField};
use crate::resource::{EntityId, Office};
use crate::time_zones::is_us_time_zone;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OfficeDraft {
    pub name: String,
    pub region_id: Option<EntityId>,
    pub time_zone_iana: Option<String>,
    pub room_ids: BTreeSet<EntityId>,
    pub begin_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OfficePayload<'a> {
    name: &'a str,
    region_id: Option<&'a EntityId>,
    time_zone_iana: Option<&'a str>,
    room_ids: Vec<&'a EntityId>,
    begin_time: i64,
    end_time: i64,
}

impl Draft for OfficeDraft {
    type Entity = Office;

    const FIELDS: &'static [DraftField] = &[
        DraftField::Name,
        DraftField::Region,
        DraftField::TimeZone,
        DraftField::Rooms,
        DraftField::BeginTime,
        DraftField::EndTime,
    ];
    const REQUIRED: &'static [DraftField] =
        &[DraftField::Region, DraftField::Name, DraftField::TimeZone];

    fn is_set(&self, field: DraftField) -> bool {
        match field {
            DraftField::Name => !self.name.is_empty(),
            DraftField::Region => self.region_id.is_some(),
            DraftField::TimeZone => self.time_zone_iana.is_some(),
            DraftField::Rooms => !self.room_ids.is_empty(),
            DraftField::BeginTime => self.begin_time.is_some(),
            DraftField::EndTime => self.end_time.is_some(),
            DraftField::HealthCenter => false,
        }
    }

    fn apply(&mut self, change: DraftChange) -> Result<(), DraftError> {
        match change {
            DraftChange::Name(name) => self.name = name,
            DraftChange::Region(id) => self.region_id = id,
            DraftChange::TimeZone(Some(zone)) if !is_us_time_zone(&zone) => {
                return Err(DraftError::UnknownTimeZone(zone));
            }
            DraftChange::TimeZone(zone) => self.time_zone_iana = zone,
            DraftChange::Rooms(ids) => self.room_ids = ids.into_iter().collect(),
            DraftChange::BeginTime(time) => self.begin_time = time,
            DraftChange::EndTime(time) => self.end_time = time,
            other @ DraftChange::HealthCenter(_) => return Err(unsupported(&other)),
        }
        Ok(())
    }

    fn from_entity(office: &Office) -> Self {
        Self {
            name: office.name.clone(),
            region_id: office.region_id.clone(),
            time_zone_iana: office.time_zone_iana.clone(),
            room_ids: office.room_ids.iter().cloned().collect(),
            begin_time: time_from_ticks(office.begin_time),
            end_time: time_from_ticks(office.end_time),
        }
    }

    fn to_payload(&self) -> Result<serde_json::Value, serde_json::Error> {
        let hours = encode_hours(self.begin_time, self.end_time);
        serde_json::to_value(OfficePayload {
            name: &self.name,
            region_id: self.region_id.as_ref(),
            time_zone_iana: self.time_zone_iana.as_deref(),
            room_ids: self.room_ids.iter().collect(),
            begin_time: hours.begin_time,
            end_time: hours.end_time,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn selected(&self, field: DraftField) -> Vec<String> {
        match field {
            DraftField::Region => self.region_id.iter().map(ToString::to_string).collect(),
            DraftField::TimeZone => self.time_zone_iana.iter().cloned().collect(),
            DraftField::Rooms => self.room_ids.iter().map(ToString::to_string).collect(),
            _ => Vec::new(),
        }
    }

    fn time(&self, field: DraftField) -> Option<NaiveTime> {
        match field {
            DraftField::BeginTime => self.begin_time,
            DraftField::EndTime => self.end_time,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn complete() -> OfficeDraft {
        let mut draft = OfficeDraft::default();
        draft.apply(DraftChange::Name("Lobby".into())).unwrap();
        draft
            .apply(DraftChange::Region(Some(EntityId::new("r1"))))
            .unwrap();
        draft
            .apply(DraftChange::TimeZone(Some("America/Chicago".into())))
            .unwrap();
        draft
    }

    #[test]
    fn requires_region_name_and_time_zone() {
        let draft = OfficeDraft::default();
        assert_eq!(
            draft.missing_fields(),
            vec![DraftField::Region, DraftField::Name, DraftField::TimeZone]
        );
        assert!(!draft.validate_create());
        assert!(complete().validate_create());
    }

    #[test]
    fn rooms_and_hours_are_optional() {
        let mut draft = complete();
        draft.apply(DraftChange::Rooms(vec![])).unwrap();
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn payload_encodes_hours_and_rooms() {
        let mut draft = complete();
        draft
            .apply(DraftChange::Rooms(vec![EntityId::new("b"), EntityId::new("a")]))
            .unwrap();
        draft
            .apply(DraftChange::BeginTime(NaiveTime::from_hms_opt(9, 0, 0)))
            .unwrap();
        draft
            .apply(DraftChange::EndTime(NaiveTime::from_hms_opt(17, 0, 0)))
            .unwrap();

        assert_eq!(
            draft.to_payload().unwrap(),
            json!({
                "name": "Lobby",
                "regionId": "r1",
                "timeZoneIana": "America/Chicago",
                "roomIds": ["a", "b"],
                "beginTime": 324_000_000_000_i64,
                "endTime": 612_000_000_000_i64,
            })
        );
    }

    #[test]
    fn payload_drops_half_set_hours() {
        let mut draft = complete();
        draft
            .apply(DraftChange::BeginTime(NaiveTime::from_hms_opt(9, 0, 0)))
            .unwrap();
        let payload = draft.to_payload().unwrap();
        assert_eq!(payload["beginTime"], json!(0));
        assert_eq!(payload["endTime"], json!(0));
    }

    #[test]
    fn rejects_foreign_fields_and_zones() {
        let mut draft = OfficeDraft::default();
        assert_eq!(
            draft.apply(DraftChange::HealthCenter(None)),
            Err(DraftError::UnsupportedField {
                field: DraftField::HealthCenter
            })
        );
        assert!(matches!(
            draft.apply(DraftChange::TimeZone(Some("Mars/Olympus".into()))),
            Err(DraftError::UnknownTimeZone(_))
        ));
        assert_eq!(draft, OfficeDraft::default());
    }

    #[test]
    fn prefill_from_entity_decodes_hours() {
        let office = Office {
            id: EntityId::new("o1"),
            name: "Lobby".into(),
            region_id: Some(EntityId::new("r1")),
            region_name: None,
            time_zone_iana: Some("America/Denver".into()),
            room_ids: vec![EntityId::new("a")],
            begin_time: 324_000_000_000,
            end_time: 0,
        };
        let draft = OfficeDraft::from_entity(&office);
        assert_eq!(draft.begin_time, NaiveTime::from_hms_opt(9, 0, 0));
        assert_eq!(draft.end_time, None);
        assert_eq!(draft.selected(DraftField::Rooms), vec!["a".to_string()]);
    }

    #[test]
    fn clear_all_follows_any_set_field() {
        let mut draft = OfficeDraft::default();
        assert!(!draft.validate_clear_all());
        draft
            .apply(DraftChange::EndTime(NaiveTime::from_hms_opt(8, 0, 0)))
            .unwrap();
        assert!(draft.validate_clear_all());
        draft.clear();
        assert!(!draft.validate_clear_all());
    }

    proptest! {
        #[test]
        fn create_allowed_iff_required_fields_set(
            name in prop::option::of("[a-zA-Z ]{1,40}"),
            region in prop::option::of("[a-z0-9]{1,8}"),
            zone in prop::option::of(prop::sample::select(vec!["America/New_York", "America/Phoenix"])),
            rooms in prop::collection::vec("[a-z]{1,4}", 0..4),
        ) {
            let mut draft = OfficeDraft::default();
            draft.apply(DraftChange::Name(name.clone().unwrap_or_default())).unwrap();
            draft.apply(DraftChange::Region(region.clone().map(EntityId::new))).unwrap();
            draft.apply(DraftChange::TimeZone(zone.map(String::from))).unwrap();
            draft.apply(DraftChange::Rooms(rooms.into_iter().map(EntityId::new).collect())).unwrap();

            let expected = name.is_some() && region.is_some() && zone.is_some();
            prop_assert_eq!(draft.validate_create(), expected);
        }
    }
}
