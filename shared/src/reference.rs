//! Dropdown option lists a form depends on, loaded once per screen mount.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::draft::DraftField;
use crate::error::AdminError;
use crate::query::{QueryParams, RequestTicket, SortDirection, Sorting, TicketCounter};
use crate::resource::ResourceKind;
use crate::time_zones::us_time_zone_options;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SelectOption {
    pub id: String,
    pub text: String,
}

impl SelectOption {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// Alphabetical by display text, ignoring case.
pub fn sort_options(options: &mut [SelectOption]) {
    options.sort_by_cached_key(|o| o.text.to_lowercase());
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(tag = "kind", content = "resource", rename_all = "snake_case")]
pub enum OptionSource {
    Remote(ResourceKind),
    UsTimeZones,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum OptionsState {
    #[default]
    NotLoaded,
    Loading,
    Ready {
        options: Vec<SelectOption>,
    },
    /// Load failed; distinct from a source that legitimately has no entries.
    Unavailable {
        reason: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReferenceOptions {
    pub field: DraftField,
    pub source: OptionSource,
    pub state: OptionsState,
}

/// Query used to load reference options: first page, large page size.
#[must_use]
pub fn reference_query(page_size: u32) -> QueryParams {
    QueryParams::first_page(Sorting::new("Name", SortDirection::Asc), page_size)
}

/// Projects and sorts the raw items of a remote source.
pub fn project(source: ResourceKind, items: &[Value]) -> Result<Vec<SelectOption>, AdminError> {
    let mut options = source.project_options(items)?;
    sort_options(&mut options);
    Ok(options)
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ReferenceData {
    lists: Vec<ReferenceOptions>,
    tickets: TicketCounter,
    /// Latest load issued per remote source; older responses are dropped.
    pending: Vec<(ResourceKind, RequestTicket)>,
}

impl ReferenceData {
    #[must_use]
    pub fn new(sources: &[(DraftField, OptionSource)]) -> Self {
        Self {
            lists: sources
                .iter()
                .map(|(field, source)| ReferenceOptions {
                    field: *field,
                    source: *source,
                    state: OptionsState::NotLoaded,
                })
                .collect(),
            tickets: TicketCounter::default(),
            pending: Vec::new(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReferenceOptions> {
        self.lists.iter()
    }

    /// Forgets every list and pending load. Tickets keep counting.
    pub fn reset(&mut self) {
        for list in &mut self.lists {
            list.state = OptionsState::NotLoaded;
        }
        self.pending.clear();
    }

    /// Starts a fresh load of every list. Static sources become ready at
    /// once; the remote kinds that must be fetched are returned, deduplicated,
    /// each with the ticket its response must carry.
    pub fn begin_load(&mut self) -> Vec<(ResourceKind, RequestTicket)> {
        let mut remote = Vec::new();
        for list in &mut self.lists {
            match list.source {
                OptionSource::UsTimeZones => {
                    list.state = OptionsState::Ready {
                        options: us_time_zone_options(),
                    };
                }
                OptionSource::Remote(kind) => {
                    list.state = OptionsState::Loading;
                    if !remote.contains(&kind) {
                        remote.push(kind);
                    }
                }
            }
        }
        remote
            .into_iter()
            .map(|kind| (kind, self.track(kind)))
            .collect()
    }

    /// Marks the lists fed by `source` as loading again. Returns `None` when
    /// the screen has no such source.
    pub fn begin_reload(&mut self, source: ResourceKind) -> Option<RequestTicket> {
        let mut found = false;
        for list in self.remote_lists_mut(source) {
            list.state = OptionsState::Loading;
            found = true;
        }
        found.then(|| self.track(source))
    }

    #[must_use]
    pub fn is_latest(&self, source: ResourceKind, ticket: RequestTicket) -> bool {
        self.pending.contains(&(source, ticket))
    }

    /// Applies a load result to every list fed by `source`, if `ticket` is
    /// the latest load of that source. Returns `false` for stale responses.
    pub fn complete(
        &mut self,
        source: ResourceKind,
        ticket: RequestTicket,
        result: Result<Vec<SelectOption>, AdminError>,
    ) -> bool {
        if !self.is_latest(source, ticket) {
            return false;
        }
        self.pending.retain(|(kind, _)| *kind != source);

        for list in self.remote_lists_mut(source) {
            list.state = match &result {
                Ok(options) => OptionsState::Ready {
                    options: options.clone(),
                },
                Err(AdminError::ReferenceDataUnavailable { reason, .. }) => {
                    OptionsState::Unavailable {
                        reason: reason.clone(),
                    }
                }
                Err(err) => OptionsState::Unavailable {
                    reason: err.to_string(),
                },
            };
        }
        true
    }

    #[must_use]
    pub fn get(&self, field: DraftField) -> Option<&ReferenceOptions> {
        self.lists.iter().find(|l| l.field == field)
    }

    /// Options for a field; empty while loading or when unavailable.
    #[must_use]
    pub fn options(&self, field: DraftField) -> &[SelectOption] {
        match self.get(field).map(|l| &l.state) {
            Some(OptionsState::Ready { options }) => options,
            _ => &[],
        }
    }

    #[must_use]
    pub fn label(&self, field: DraftField, id: &str) -> Option<&str> {
        self.options(field)
            .iter()
            .find(|o| o.id == id)
            .map(|o| o.text.as_str())
    }

    fn track(&mut self, source: ResourceKind) -> RequestTicket {
        let ticket = self.tickets.issue();
        self.pending.retain(|(kind, _)| *kind != source);
        self.pending.push((source, ticket));
        ticket
    }

    fn remote_lists_mut(&mut self, source: ResourceKind) -> impl Iterator<Item = &mut ReferenceOptions> {
        self.lists
            .iter_mut()
            .filter(move |l| l.source == OptionSource::Remote(source))
    }
}
