use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::draft::{Draft, DraftField, FieldInput, NameCounter};
use crate::model::UserRole;
use crate::query::{ListStatus, SortDirection, Sorting};
use crate::reference::{OptionSource, OptionsState, ReferenceData, SelectOption};
use crate::resource::{Column, EntityId, ResourceKind};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ViewModel {
    pub role: UserRole,
    pub can_manage: bool,
    pub screen: Option<ScreenView>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ScreenView {
    pub resource: ResourceKind,
    pub title: String,
    pub columns: Vec<ColumnView>,
    pub rows: Vec<RowView>,
    pub status: ListStatus,
    pub is_fetching: bool,
    pub total_count: u64,
    pub page: u32,
    pub pages: u32,
    pub show_pagination: bool,
    pub sorting: String,
    pub filter: String,
    pub search_pending: bool,
    /// Create form; absent for read-only resources and users.
    pub form: Option<FormView>,
    pub editor: Option<EditorView>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ColumnView {
    pub title: String,
    pub sort_field: Option<String>,
    /// Set on the column the list is currently sorted by.
    pub direction: Option<SortDirection>,
}

impl ColumnView {
    #[must_use]
    pub fn new(column: &Column, sorting: &Sorting) -> Self {
        let direction = column
            .sort_field
            .filter(|field| *field == sorting.field())
            .map(|_| sorting.direction());
        Self {
            title: column.title.to_string(),
            sort_field: column.sort_field.map(String::from),
            direction,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RowView {
    pub id: EntityId,
    pub cells: Vec<String>,
    pub editable: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum OptionsStatus {
    Loading,
    Ready,
    Unavailable { reason: String, retry: ResourceKind },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "input", rename_all = "snake_case")]
pub enum FieldValue {
    Text {
        value: String,
    },
    Select {
        multi: bool,
        options: Vec<SelectOption>,
        selected: Vec<SelectOption>,
        status: OptionsStatus,
    },
    Time {
        value: Option<NaiveTime>,
    },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct FieldView {
    pub field: DraftField,
    pub label: String,
    pub required: bool,
    pub value: FieldValue,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct FormView {
    pub fields: Vec<FieldView>,
    pub missing: Vec<DraftField>,
    pub name_length: usize,
    pub name_warning: Option<String>,
    pub submit_enabled: bool,
    pub clear_enabled: bool,
    pub submitting: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EditorView {
    pub id: EntityId,
    pub loading: bool,
    pub load_error: Option<String>,
    pub form: FormView,
}

/// Settings the form projection needs from the owning screen.
#[derive(Clone, Copy, Debug)]
pub struct FormContext<'a> {
    pub resource: ResourceKind,
    pub reference: &'a ReferenceData,
    pub name_limit: usize,
    pub submitting: bool,
}

pub fn form_view<D: Draft>(draft: &D, ctx: FormContext<'_>) -> FormView {
    let counter = NameCounter::new(draft.name(), ctx.name_limit);
    let fields = D::FIELDS
        .iter()
        .map(|field| FieldView {
            field: *field,
            label: field.label().to_string(),
            required: D::REQUIRED.contains(field),
            value: field_value(draft, *field, ctx.reference),
        })
        .collect();

    FormView {
        fields,
        missing: draft.missing_fields(),
        name_length: counter.length,
        name_warning: counter.warning(ctx.resource.noun()),
        submit_enabled: draft.validate_create() && !ctx.submitting,
        clear_enabled: draft.validate_clear_all() && !ctx.submitting,
        submitting: ctx.submitting,
    }
}

fn field_value<D: Draft>(draft: &D, field: DraftField, reference: &ReferenceData) -> FieldValue {
    match field.input() {
        FieldInput::Text => FieldValue::Text {
            value: draft.name().to_string(),
        },
        FieldInput::Time => FieldValue::Time {
            value: draft.time(field),
        },
        input @ (FieldInput::Select | FieldInput::MultiSelect) => {
            let selected = draft
                .selected(field)
                .into_iter()
                .map(|id| {
                    let text = reference.label(field, &id).unwrap_or(&id).to_string();
                    SelectOption::new(id, text)
                })
                .collect();
            FieldValue::Select {
                multi: input == FieldInput::MultiSelect,
                options: reference.options(field).to_vec(),
                selected,
                status: options_status(reference, field),
            }
        }
    }
}

fn options_status(reference: &ReferenceData, field: DraftField) -> OptionsStatus {
    match reference.get(field) {
        Some(list) => match (&list.state, list.source) {
            (OptionsState::Ready { .. }, _) => OptionsStatus::Ready,
            (OptionsState::Unavailable { reason }, OptionSource::Remote(retry)) => {
                OptionsStatus::Unavailable {
                    reason: reason.clone(),
                    retry,
                }
            }
            _ => OptionsStatus::Loading,
        },
        None => OptionsStatus::Loading,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::{DraftChange, OfficeDraft, RegionDraft};
    use crate::error::AdminError;
    use crate::query::RequestTicket;
    use crate::reference::OptionSource;

    fn region_reference() -> (ReferenceData, RequestTicket) {
        let mut data = ReferenceData::new(&[(
            DraftField::HealthCenter,
            OptionSource::Remote(ResourceKind::HealthCenter),
        )]);
        let (_, ticket) = data.begin_load()[0];
        (data, ticket)
    }

    fn ctx(reference: &ReferenceData) -> FormContext<'_> {
        FormContext {
            resource: ResourceKind::Region,
            reference,
            name_limit: 30,
            submitting: false,
        }
    }

    #[test]
    fn empty_form_disables_both_buttons() {
        let (reference, _) = region_reference();
        let view = form_view(&RegionDraft::default(), ctx(&reference));
        assert!(!view.submit_enabled);
        assert!(!view.clear_enabled);
        assert_eq!(view.missing, vec![DraftField::HealthCenter, DraftField::Name]);
        assert_eq!(view.fields.len(), 2);
        assert!(view.fields.iter().all(|f| f.required));
    }

    #[test]
    fn selected_ids_resolve_to_labels() {
        let (mut reference, ticket) = region_reference();
        reference.complete(
            ResourceKind::HealthCenter,
            ticket,
            Ok(vec![SelectOption::new("h1", "Main Campus")]),
        );
        let mut draft = RegionDraft::default();
        draft
            .apply(DraftChange::HealthCenter(Some(EntityId::new("h1"))))
            .unwrap();

        let view = form_view(&draft, ctx(&reference));
        let FieldValue::Select {
            selected, status, ..
        } = &view.fields[1].value
        else {
            panic!("health center should be a select");
        };
        assert_eq!(selected, &vec![SelectOption::new("h1", "Main Campus")]);
        assert_eq!(status, &OptionsStatus::Ready);
    }

    #[test]
    fn unavailable_options_offer_retry() {
        let (mut reference, ticket) = region_reference();
        reference.complete(
            ResourceKind::HealthCenter,
            ticket,
            Err(AdminError::ReferenceDataUnavailable {
                resource: ResourceKind::HealthCenter,
                reason: "offline".into(),
            }),
        );
        let view = form_view(&RegionDraft::default(), ctx(&reference));
        assert!(matches!(
            &view.fields[1].value,
            FieldValue::Select {
                status: OptionsStatus::Unavailable {
                    retry: ResourceKind::HealthCenter,
                    ..
                },
                ..
            }
        ));
    }

    #[test]
    fn long_names_warn_without_blocking() {
        let reference = ReferenceData::new(&[]);
        let mut draft = OfficeDraft::default();
        draft.apply(DraftChange::Name("x".repeat(35))).unwrap();
        let view = form_view(
            &draft,
            FormContext {
                resource: ResourceKind::Office,
                reference: &reference,
                name_limit: 30,
                submitting: false,
            },
        );
        assert_eq!(view.name_length, 35);
        assert_eq!(
            view.name_warning.as_deref(),
            Some("You have used 35 characters. Please limit your office names to 30 characters.")
        );
    }

    #[test]
    fn sorted_column_carries_direction() {
        let sorting = Sorting::new("Name", SortDirection::Desc);
        let column = Column {
            title: "Name",
            sort_field: Some("Name"),
        };
        assert_eq!(
            ColumnView::new(&column, &sorting).direction,
            Some(SortDirection::Desc)
        );
        let other = Column {
            title: "Region",
            sort_field: None,
        };
        assert_eq!(ColumnView::new(&other, &sorting).direction, None);
    }
}
