//! Create/edit form state shared by the resource screens.

pub mod hours;
mod office;
mod region;
mod room;

pub use self::office::OfficeDraft;
pub use self::region::RegionDraft;
pub use self::room::RoomDraft;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use thiserror::Error;

use crate::error::ValidationError;
use crate::resource::EntityId;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum DraftField {
    Name,
    HealthCenter,
    Region,
    TimeZone,
    Rooms,
    BeginTime,
    EndTime,
}

/// How a field is rendered and edited.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FieldInput {
    Text,
    Select,
    MultiSelect,
    Time,
}

impl DraftField {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::HealthCenter => "Health Center",
            Self::Region => "Region",
            Self::TimeZone => "Time Zone",
            Self::Rooms => "Rooms",
            Self::BeginTime => "Begin Time",
            Self::EndTime => "End Time",
        }
    }

    #[must_use]
    pub const fn input(self) -> FieldInput {
        match self {
            Self::Name => FieldInput::Text,
            Self::HealthCenter | Self::Region | Self::TimeZone => FieldInput::Select,
            Self::Rooms => FieldInput::MultiSelect,
            Self::BeginTime | Self::EndTime => FieldInput::Time,
        }
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single user edit to a form field.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum DraftChange {
    Name(String),
    HealthCenter(Option<EntityId>),
    Region(Option<EntityId>),
    TimeZone(Option<String>),
    Rooms(Vec<EntityId>),
    BeginTime(Option<NaiveTime>),
    EndTime(Option<NaiveTime>),
}

impl DraftChange {
    #[must_use]
    pub const fn field(&self) -> DraftField {
        match self {
            Self::Name(_) => DraftField::Name,
            Self::HealthCenter(_) => DraftField::HealthCenter,
            Self::Region(_) => DraftField::Region,
            Self::TimeZone(_) => DraftField::TimeZone,
            Self::Rooms(_) => DraftField::Rooms,
            Self::BeginTime(_) => DraftField::BeginTime,
            Self::EndTime(_) => DraftField::EndTime,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("the {field} field is not part of this form")]
    UnsupportedField { field: DraftField },

    #[error("unknown time zone `{0}`")]
    UnknownTimeZone(String),

    #[error("this resource cannot be edited")]
    ReadOnly,
}

/// Form model for one resource.
pub trait Draft: Clone + Default + PartialEq + fmt::Debug + Send + 'static {
    type Entity;

    const MUTABLE: bool = true;
    /// Fields shown on the form, in display order.
    const FIELDS: &'static [DraftField];
    /// Fields that must be set before the form can be submitted.
    const REQUIRED: &'static [DraftField];

    fn is_set(&self, field: DraftField) -> bool;

    fn apply(&mut self, change: DraftChange) -> Result<(), DraftError>;

    /// Prefill for the edit form.
    fn from_entity(entity: &Self::Entity) -> Self;

    /// Body sent on create and update.
    fn to_payload(&self) -> Result<serde_json::Value, serde_json::Error>;

    fn name(&self) -> &str {
        ""
    }

    /// Selected ids of a select field.
    fn selected(&self, _field: DraftField) -> Vec<String> {
        Vec::new()
    }

    fn time(&self, _field: DraftField) -> Option<NaiveTime> {
        None
    }

    fn missing_fields(&self) -> Vec<DraftField> {
        Self::REQUIRED
            .iter()
            .copied()
            .filter(|field| !self.is_set(*field))
            .collect()
    }

    /// Whether the form may be submitted.
    fn validate_create(&self) -> bool {
        Self::MUTABLE && self.missing_fields().is_empty()
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { missing })
        }
    }

    /// Whether any field differs from its default, which enables "clear all".
    fn validate_clear_all(&self) -> bool {
        *self != Self::default()
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

pub(crate) fn unsupported(change: &DraftChange) -> DraftError {
    DraftError::UnsupportedField {
        field: change.field(),
    }
}

/// Length of the name field and the advisory shown past the limit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NameCounter {
    pub length: usize,
    pub limit: usize,
}

impl NameCounter {
    #[must_use]
    pub fn new(name: &str, limit: usize) -> Self {
        Self {
            length: name.chars().count(),
            limit,
        }
    }

    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.length > self.limit
    }

    /// Advisory only; never blocks submission.
    #[must_use]
    pub fn warning(&self, noun: &str) -> Option<String> {
        self.is_over().then(|| {
            format!(
                "You have used {} characters. Please limit your {noun} names to {} characters.",
                self.length, self.limit
            )
        })
    }
}

/// Draft for resources the console only lists.
pub struct ReadOnlyDraft<E>(PhantomData<fn() -> E>);

impl<E> Default for ReadOnlyDraft<E> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<E> Clone for ReadOnlyDraft<E> {
    fn clone(&self) -> Self {
        Self::default()
    }
}

impl<E> PartialEq for ReadOnlyDraft<E> {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl<E> fmt::Debug for ReadOnlyDraft<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ReadOnlyDraft")
    }
}

impl<E: 'static> Draft for ReadOnlyDraft<E> {
    type Entity = E;

    const MUTABLE: bool = false;
    const FIELDS: &'static [DraftField] = &[];
    const REQUIRED: &'static [DraftField] = &[];

    fn is_set(&self, _field: DraftField) -> bool {
        false
    }

    fn apply(&mut self, _change: DraftChange) -> Result<(), DraftError> {
        Err(DraftError::ReadOnly)
    }

    fn from_entity(_entity: &E) -> Self {
        Self::default()
    }

    fn to_payload(&self) -> Result<serde_json::Value, serde_json::Error> {
        Ok(serde_json::Value::Null)
    }
}
