//! Resource kinds, their entities and the per-resource configuration the
//! generic list controller is parameterised over.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::draft::{hours, Draft, DraftField, OfficeDraft, ReadOnlyDraft, RegionDraft, RoomDraft};
use crate::error::AdminError;
use crate::query::{SortDirection, Sorting};
use crate::reference::{OptionSource, SelectOption};

// --- Typed IDs ---

macro_rules! typed_id {
    ($name:ident) => {
        #[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

typed_id!(EntityId);

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    Office,
    Region,
    Room,
    HealthCenter,
    AuditLog,
}

impl ResourceKind {
    pub const ALL: [Self; 5] = [
        Self::Office,
        Self::Region,
        Self::Room,
        Self::HealthCenter,
        Self::AuditLog,
    ];

    /// Path segment of the remote service for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Office => "office",
            Self::Region => "region",
            Self::Room => "room",
            Self::HealthCenter => "health-center",
            Self::AuditLog => "audit-log",
        }
    }

    /// Singular lower-case noun used in user-facing copy.
    #[must_use]
    pub const fn noun(self) -> &'static str {
        match self {
            Self::Office => "office",
            Self::Region => "region",
            Self::Room => "room",
            Self::HealthCenter => "health center",
            Self::AuditLog => "audit log",
        }
    }

    /// Projects raw reference items of this kind into dropdown options.
    pub fn project_options(self, items: &[Value]) -> Result<Vec<SelectOption>, AdminError> {
        match self {
            Self::Office => project::<Offices>(items),
            Self::Region => project::<Regions>(items),
            Self::Room => project::<Rooms>(items),
            Self::HealthCenter => project::<HealthCenters>(items),
            Self::AuditLog => project::<AuditLogs>(items),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Table column; `sort_field` is the server-side field name sent in `Sorting`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Column {
    pub title: &'static str,
    pub sort_field: Option<&'static str>,
}

impl Column {
    const fn sortable(title: &'static str, field: &'static str) -> Self {
        Self {
            title,
            sort_field: Some(field),
        }
    }

    const fn plain(title: &'static str) -> Self {
        Self {
            title,
            sort_field: None,
        }
    }
}

/// Everything that differs between the resource screens.
pub trait Resource: 'static {
    const KIND: ResourceKind;
    const TITLE: &'static str;
    const DEFAULT_SORT: (&'static str, SortDirection);
    const COLUMNS: &'static [Column];
    /// Dropdowns on the create/edit form and where their options come from.
    const OPTION_SOURCES: &'static [(DraftField, OptionSource)] = &[];

    type Entity: Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + 'static;
    type Draft: Draft<Entity = Self::Entity>;

    fn id(entity: &Self::Entity) -> &EntityId;
    fn to_option(entity: &Self::Entity) -> SelectOption;
    fn cells(entity: &Self::Entity) -> Vec<String>;

    fn default_sorting() -> Sorting {
        Sorting::new(Self::DEFAULT_SORT.0, Self::DEFAULT_SORT.1)
    }

    fn is_mutable() -> bool {
        <Self::Draft as Draft>::MUTABLE
    }
}

pub fn decode_entity<R: Resource>(value: &Value) -> Result<R::Entity, AdminError> {
    R::Entity::deserialize(value).map_err(|e| AdminError::Decode {
        resource: R::KIND,
        reason: e.to_string(),
    })
}

pub fn decode_items<R: Resource>(items: &[Value]) -> Result<Vec<R::Entity>, AdminError> {
    items.iter().map(decode_entity::<R>).collect()
}

fn project<R: Resource>(items: &[Value]) -> Result<Vec<SelectOption>, AdminError> {
    items
        .iter()
        .map(|item| decode_entity::<R>(item).map(|entity| R::to_option(&entity)))
        .collect()
}

// --- Entities ---

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Office {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub region_id: Option<EntityId>,
    #[serde(default)]
    pub region_name: Option<String>,
    #[serde(default)]
    pub time_zone_iana: Option<String>,
    #[serde(default)]
    pub room_ids: Vec<EntityId>,
    /// Opening time in ticks since local midnight, `0` when unset.
    #[serde(default)]
    pub begin_time: i64,
    #[serde(default)]
    pub end_time: i64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub health_center_id: Option<EntityId>,
    #[serde(default)]
    pub health_center_name: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: EntityId,
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HealthCenter {
    pub id: EntityId,
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: EntityId,
    pub change_date: DateTime<Utc>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub entity_name: Option<String>,
    #[serde(default)]
    pub change_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

// --- Resources ---

pub struct Offices;
pub struct Regions;
pub struct Rooms;
pub struct HealthCenters;
pub struct AuditLogs;

impl Resource for Offices {
    const KIND: ResourceKind = ResourceKind::Office;
    const TITLE: &'static str = "Manage Offices";
    const DEFAULT_SORT: (&'static str, SortDirection) = ("Name", SortDirection::Asc);
    const COLUMNS: &'static [Column] = &[
        Column::sortable("Name", "Name"),
        Column::plain("Region"),
        Column::plain("Time Zone"),
        Column::plain("Hours"),
        Column::plain("Rooms"),
    ];
    const OPTION_SOURCES: &'static [(DraftField, OptionSource)] = &[
        (DraftField::TimeZone, OptionSource::UsTimeZones),
        (DraftField::Region, OptionSource::Remote(ResourceKind::Region)),
        (DraftField::Rooms, OptionSource::Remote(ResourceKind::Room)),
    ];

    type Entity = Office;
    type Draft = OfficeDraft;

    fn id(entity: &Office) -> &EntityId {
        &entity.id
    }

    fn to_option(entity: &Office) -> SelectOption {
        SelectOption::new(entity.id.as_str(), &entity.name)
    }

    fn cells(entity: &Office) -> Vec<String> {
        let hours = match (
            hours::time_from_ticks(entity.begin_time),
            hours::time_from_ticks(entity.end_time),
        ) {
            (Some(begin), Some(end)) => {
                format!("{} - {}", begin.format("%H:%M"), end.format("%H:%M"))
            }
            _ => String::new(),
        };

        vec![
            entity.name.clone(),
            entity.region_name.clone().unwrap_or_default(),
            entity.time_zone_iana.clone().unwrap_or_default(),
            hours,
            entity.room_ids.len().to_string(),
        ]
    }
}

impl Resource for Regions {
    const KIND: ResourceKind = ResourceKind::Region;
    const TITLE: &'static str = "Manage Regions";
    const DEFAULT_SORT: (&'static str, SortDirection) = ("Name", SortDirection::Asc);
    const COLUMNS: &'static [Column] = &[
        Column::sortable("Name", "Name"),
        Column::plain("Health Center"),
    ];
    const OPTION_SOURCES: &'static [(DraftField, OptionSource)] = &[(
        DraftField::HealthCenter,
        OptionSource::Remote(ResourceKind::HealthCenter),
    )];

    type Entity = Region;
    type Draft = RegionDraft;

    fn id(entity: &Region) -> &EntityId {
        &entity.id
    }

    fn to_option(entity: &Region) -> SelectOption {
        SelectOption::new(entity.id.as_str(), &entity.name)
    }

    fn cells(entity: &Region) -> Vec<String> {
        vec![
            entity.name.clone(),
            entity.health_center_name.clone().unwrap_or_default(),
        ]
    }
}

impl Resource for Rooms {
    const KIND: ResourceKind = ResourceKind::Room;
    const TITLE: &'static str = "Manage Rooms";
    const DEFAULT_SORT: (&'static str, SortDirection) = ("Name", SortDirection::Asc);
    const COLUMNS: &'static [Column] = &[Column::sortable("Name", "Name")];

    type Entity = Room;
    type Draft = RoomDraft;

    fn id(entity: &Room) -> &EntityId {
        &entity.id
    }

    fn to_option(entity: &Room) -> SelectOption {
        SelectOption::new(entity.id.as_str(), &entity.name)
    }

    fn cells(entity: &Room) -> Vec<String> {
        vec![entity.name.clone()]
    }
}

impl Resource for HealthCenters {
    const KIND: ResourceKind = ResourceKind::HealthCenter;
    const TITLE: &'static str = "Health Centers";
    const DEFAULT_SORT: (&'static str, SortDirection) = ("Name", SortDirection::Asc);
    const COLUMNS: &'static [Column] = &[Column::sortable("Name", "Name")];

    type Entity = HealthCenter;
    type Draft = ReadOnlyDraft<HealthCenter>;

    fn id(entity: &HealthCenter) -> &EntityId {
        &entity.id
    }

    fn to_option(entity: &HealthCenter) -> SelectOption {
        SelectOption::new(entity.id.as_str(), &entity.name)
    }

    fn cells(entity: &HealthCenter) -> Vec<String> {
        vec![entity.name.clone()]
    }
}

impl Resource for AuditLogs {
    const KIND: ResourceKind = ResourceKind::AuditLog;
    const TITLE: &'static str = "Audit Logs";
    const DEFAULT_SORT: (&'static str, SortDirection) = ("ChangeDate", SortDirection::Desc);
    const COLUMNS: &'static [Column] = &[
        Column::sortable("Date", "ChangeDate"),
        Column::sortable("User", "UserName"),
        Column::sortable("Entity", "EntityName"),
        Column::plain("Change"),
        Column::plain("Description"),
    ];

    type Entity = AuditLogEntry;
    type Draft = ReadOnlyDraft<AuditLogEntry>;

    fn id(entity: &AuditLogEntry) -> &EntityId {
        &entity.id
    }

    fn to_option(entity: &AuditLogEntry) -> SelectOption {
        let label = entity
            .entity_name
            .clone()
            .unwrap_or_else(|| entity.id.to_string());
        SelectOption::new(entity.id.as_str(), label)
    }

    fn cells(entity: &AuditLogEntry) -> Vec<String> {
        vec![
            entity.change_date.format("%Y-%m-%d %H:%M").to_string(),
            entity.user_name.clone().unwrap_or_default(),
            entity.entity_name.clone().unwrap_or_default(),
            entity.change_type.clone().unwrap_or_default(),
            entity.description.clone().unwrap_or_default(),
        ]
    }
}
