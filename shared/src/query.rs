//! List query parameters and the state of the fetched page.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SortingParseError {
    #[error("sorting is empty")]
    Empty,
    #[error("unknown sort direction `{0}`")]
    Direction(String),
    #[error("unexpected trailing input `{0}`")]
    Trailing(String),
}

/// Sort order as the service expects it: `"<Field> <ASC|DESC>"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Sorting {
    field: String,
    direction: SortDirection,
}

impl Sorting {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    #[must_use]
    pub const fn direction(&self) -> SortDirection {
        self.direction
    }

    /// Sorting applied when a column header is clicked: flips the direction
    /// of the current column, otherwise starts the new column ascending.
    #[must_use]
    pub fn clicked(&self, field: &str) -> Self {
        if self.field == field {
            Self::new(field, self.direction.toggled())
        } else {
            Self::new(field, SortDirection::Asc)
        }
    }
}

impl fmt::Display for Sorting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.direction.as_str())
    }
}

impl FromStr for Sorting {
    type Err = SortingParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let field = parts.next().ok_or(SortingParseError::Empty)?;
        let direction = match parts.next() {
            None => SortDirection::Asc,
            Some(d) if d.eq_ignore_ascii_case("asc") => SortDirection::Asc,
            Some(d) if d.eq_ignore_ascii_case("desc") => SortDirection::Desc,
            Some(d) => return Err(SortingParseError::Direction(d.to_string())),
        };
        if let Some(rest) = parts.next() {
            return Err(SortingParseError::Trailing(rest.to_string()));
        }
        Ok(Self::new(field, direction))
    }
}

impl Serialize for Sorting {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Sorting {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueryParams {
    pub sorting: Sorting,
    pub skip_count: u32,
    pub max_result_count: u32,
    pub filter: String,
}

impl QueryParams {
    pub fn first_page(sorting: Sorting, page_size: u32) -> Self {
        Self {
            sorting,
            skip_count: 0,
            max_result_count: page_size.max(1),
            filter: String::new(),
        }
    }

    /// 1-based page derived from the skip count.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.skip_count / self.max_result_count.max(1) + 1
    }

    #[must_use]
    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .append_pair("Sorting", &self.sorting.to_string())
            .append_pair("SkipCount", &self.skip_count.to_string())
            .append_pair("MaxResultCount", &self.max_result_count.to_string())
            .append_pair("Filter", &self.filter)
            .finish()
    }
}

#[must_use]
pub fn page_count(total_count: u64, max_result_count: u32) -> u32 {
    let per_page = u64::from(max_result_count);
    if per_page == 0 {
        return 0;
    }
    u32::try_from((total_count + per_page - 1) / per_page).unwrap_or(u32::MAX)
}

#[must_use]
pub const fn shows_pagination(pages: u32) -> bool {
    pages > 1
}

/// Query parameters of one list screen. Every setter is followed by a
/// refetch issued by the owning controller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryState {
    params: QueryParams,
    reset_page_on_sort: bool,
}

impl QueryState {
    pub fn new(sorting: Sorting, page_size: u32, reset_page_on_sort: bool) -> Self {
        Self {
            params: QueryParams::first_page(sorting, page_size),
            reset_page_on_sort,
        }
    }

    #[must_use]
    pub const fn params(&self) -> &QueryParams {
        &self.params
    }

    #[must_use]
    pub fn page(&self) -> u32 {
        self.params.page()
    }

    pub fn set_sorting(&mut self, sorting: Sorting) {
        self.params.sorting = sorting;
        if self.reset_page_on_sort {
            self.params.skip_count = 0;
        }
    }

    /// Moves to a 1-based page, clamped to the last page whose skip count
    /// and page number both fit, so the skip count stays a multiple of the
    /// page size.
    pub fn set_page(&mut self, page: u32) {
        let size = self.params.max_result_count.max(1);
        let index = page.saturating_sub(1).min((u32::MAX - 1) / size);
        self.params.skip_count = index * size;
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.params.filter = filter.into();
        self.params.skip_count = 0;
    }
}

/// Identifies one outbound request so its response can be matched later.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestTicket(u64);

impl RequestTicket {
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

/// Issues monotonically increasing tickets. Never reset, so a response to a
/// request made before a screen was remounted can never match a newer one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TicketCounter {
    issued: u64,
}

impl TicketCounter {
    pub fn issue(&mut self) -> RequestTicket {
        self.issued += 1;
        RequestTicket(self.issued)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ListStatus {
    NotLoaded,
    Loaded,
    Empty,
    Failed { message: String },
}

/// The most recently applied page of a list plus the in-flight marker.
/// Only the response to the latest issued request is ever applied.
#[derive(Clone, Debug)]
pub struct ListState<T> {
    items: Vec<T>,
    total_count: u64,
    status: ListStatus,
    tickets: TicketCounter,
    latest: Option<RequestTicket>,
    in_flight: bool,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
            status: ListStatus::NotLoaded,
            tickets: TicketCounter::default(),
            latest: None,
            in_flight: false,
        }
    }
}

impl<T> ListState<T> {
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    #[must_use]
    pub const fn total_count(&self) -> u64 {
        self.total_count
    }

    #[must_use]
    pub const fn status(&self) -> &ListStatus {
        &self.status
    }

    #[must_use]
    pub const fn is_fetching(&self) -> bool {
        self.in_flight
    }

    #[must_use]
    pub fn pages(&self, max_result_count: u32) -> u32 {
        page_count(self.total_count, max_result_count)
    }

    /// Drops the loaded page; the ticket counter keeps counting.
    pub fn clear(&mut self) {
        self.items.clear();
        self.total_count = 0;
        self.status = ListStatus::NotLoaded;
        self.latest = None;
        self.in_flight = false;
    }

    pub fn begin_fetch(&mut self) -> RequestTicket {
        let ticket = self.tickets.issue();
        self.latest = Some(ticket);
        self.in_flight = true;
        ticket
    }

    #[must_use]
    pub fn is_latest(&self, ticket: RequestTicket) -> bool {
        self.latest == Some(ticket)
    }

    /// Applies a page if `ticket` is the latest request. Returns `false` for
    /// stale responses, which leave the state untouched.
    pub fn accept(&mut self, ticket: RequestTicket, items: Vec<T>, total_count: u64) -> bool {
        if !self.is_latest(ticket) {
            return false;
        }
        self.status = if items.is_empty() {
            ListStatus::Empty
        } else {
            ListStatus::Loaded
        };
        self.items = items;
        self.total_count = total_count;
        self.in_flight = false;
        true
    }

    /// Records a failure of the latest request, keeping the previous rows.
    pub fn fail(&mut self, ticket: RequestTicket, message: impl Into<String>) -> bool {
        if !self.is_latest(ticket) {
            return false;
        }
        self.status = ListStatus::Failed {
            message: message.into(),
        };
        self.in_flight = false;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn state() -> QueryState {
        QueryState::new(Sorting::new("Name", SortDirection::Asc), 10, false)
    }

    #[test]
    fn sorting_round_trips_through_wire_string() {
        let sorting: Sorting = "ChangeDate desc".parse().unwrap();
        assert_eq!(sorting, Sorting::new("ChangeDate", SortDirection::Desc));
        assert_eq!(sorting.to_string(), "ChangeDate DESC");
        assert_eq!(
            serde_json::to_value(&sorting).unwrap(),
            serde_json::json!("ChangeDate DESC")
        );
        assert_eq!("Name".parse::<Sorting>().unwrap().direction(), SortDirection::Asc);
    }

    #[test]
    fn sorting_rejects_garbage() {
        assert_eq!("".parse::<Sorting>(), Err(SortingParseError::Empty));
        assert!(matches!(
            "Name UP".parse::<Sorting>(),
            Err(SortingParseError::Direction(_))
        ));
        assert!(matches!(
            "Name ASC extra".parse::<Sorting>(),
            Err(SortingParseError::Trailing(_))
        ));
    }

    #[test]
    fn clicking_a_header_toggles_or_restarts() {
        let sorting = Sorting::new("Name", SortDirection::Asc);
        assert_eq!(sorting.clicked("Name").to_string(), "Name DESC");
        assert_eq!(sorting.clicked("UserName").to_string(), "UserName ASC");
    }

    #[test]
    fn params_serialize_with_service_names() {
        let value = serde_json::to_value(state().params()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "Sorting": "Name ASC",
                "SkipCount": 0,
                "MaxResultCount": 10,
                "Filter": ""
            })
        );
    }

    #[test]
    fn query_string_is_url_encoded() {
        let mut state = state();
        state.set_filter("a&b");
        state.set_page(3);
        assert_eq!(
            state.params().to_query_string(),
            "Sorting=Name+ASC&SkipCount=20&MaxResultCount=10&Filter=a%26b"
        );
    }

    #[test]
    fn set_sorting_keeps_page_by_default() {
        let mut state = state();
        state.set_page(4);
        state.set_sorting(Sorting::new("Name", SortDirection::Desc));
        assert_eq!(state.page(), 4);

        let mut state = QueryState::new(Sorting::new("Name", SortDirection::Asc), 10, true);
        state.set_page(4);
        state.set_sorting(Sorting::new("Name", SortDirection::Desc));
        assert_eq!(state.page(), 1);
    }

    #[test]
    fn set_page_zero_clamps_to_first_page() {
        let mut state = state();
        state.set_page(0);
        assert_eq!(state.params().skip_count, 0);
    }

    #[test]
    fn huge_page_clamps_to_last_reachable_page() {
        let mut state = state();
        state.set_page(u32::MAX);
        assert_eq!(state.params().skip_count, 4_294_967_290);
        assert_eq!(state.page(), 429_496_730);

        let mut single = QueryState::new(Sorting::new("Name", SortDirection::Asc), 1, false);
        single.set_page(u32::MAX);
        assert_eq!(single.page(), u32::MAX);
    }

    #[test]
    fn pagination_shown_only_past_one_page() {
        assert_eq!(page_count(0, 10), 0);
        assert_eq!(page_count(10, 10), 1);
        assert_eq!(page_count(11, 10), 2);
        assert!(!shows_pagination(page_count(10, 10)));
        assert!(shows_pagination(page_count(11, 10)));
    }

    #[test]
    fn stale_responses_are_dropped() {
        let mut list = ListState::<u32>::default();
        let first = list.begin_fetch();
        let second = list.begin_fetch();

        assert!(!list.accept(first, vec![1], 1));
        assert_eq!(list.status(), &ListStatus::NotLoaded);
        assert!(list.is_fetching());

        assert!(list.accept(second, vec![2, 3], 2));
        assert_eq!(list.items(), &[2, 3]);
        assert!(!list.is_fetching());

        // A late failure for an older request must not clobber the result.
        assert!(!list.fail(first, "boom"));
        assert_eq!(list.status(), &ListStatus::Loaded);
    }

    #[test]
    fn empty_and_failed_are_distinct() {
        let mut list = ListState::<u32>::default();
        let ticket = list.begin_fetch();
        list.accept(ticket, vec![], 0);
        assert_eq!(list.status(), &ListStatus::Empty);

        let ticket = list.begin_fetch();
        list.fail(ticket, "offline");
        assert_eq!(
            list.status(),
            &ListStatus::Failed {
                message: "offline".into()
            }
        );
    }

    #[test]
    fn tickets_survive_clear() {
        let mut list = ListState::<u32>::default();
        let before = list.begin_fetch();
        list.clear();
        let after = list.begin_fetch();
        assert!(after > before);
        assert!(!list.accept(before, vec![1], 1));
    }

    proptest! {
        #[test]
        fn set_page_keeps_skip_invariant(page in 1u32..10_000, size in 1u32..500) {
            let mut state = QueryState::new(Sorting::new("Name", SortDirection::Asc), size, false);
            state.set_page(page);
            prop_assert_eq!(state.params().skip_count, (page - 1) * size);
            prop_assert_eq!(state.page(), page);
        }

        #[test]
        fn skip_is_a_multiple_of_page_size_for_any_page(page in any::<u32>(), size in 1u32..=1000) {
            let mut state = QueryState::new(Sorting::new("Name", SortDirection::Asc), size, false);
            state.set_page(page);
            let skip = state.params().skip_count;
            prop_assert_eq!(skip % size, 0);
            prop_assert_eq!(state.page(), skip / size + 1);
            prop_assert!(state.page() <= page.max(1));
        }

        #[test]
        fn set_filter_always_returns_to_first_page(page in 1u32..1000, filter in ".{0,20}") {
            let mut state = state();
            state.set_page(page);
            state.set_filter(filter.clone());
            prop_assert_eq!(state.params().skip_count, 0);
            prop_assert_eq!(&state.params().filter, &filter);
        }

        #[test]
        fn page_count_is_ceiling(total in 0u64..1_000_000, size in 1u32..1000) {
            let pages = u64::from(page_count(total, size));
            prop_assert!(pages * u64::from(size) >= total);
            prop_assert!(pages == 0 || (pages - 1) * u64::from(size) < total);
        }
    }
}
