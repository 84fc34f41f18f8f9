//! One generic controller per resource screen: list query, paging, search,
//! reference data, the create form and the edit form.

use tracing::{debug, info, instrument, warn};

use crate::capabilities::{Capabilities, Notification, ServiceOutput, ServiceResult, TimerId, TimerOutput};
use crate::config::AdminConfig;
use crate::debounce::{Debounce, DebounceToken};
use crate::draft::{Draft, DraftError};
use crate::error::{AdminError, AdminResult};
use crate::event::{Event, ScreenEvent};
use crate::mutation::{MutationTracker, Reaction};
use crate::query::{shows_pagination, ListState, QueryState, RequestTicket};
use crate::reference::{self, reference_query, ReferenceData};
use crate::resource::{decode_entity, decode_items, EntityId, Resource, ResourceKind};
use crate::view::{form_view, ColumnView, EditorView, FormContext, RowView, ScreenView};

/// What a screen needs to know about the app around it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScreenContext {
    pub config: AdminConfig,
    pub can_manage: bool,
}

/// Object-safe face of [`ResourceController`], so the app can route events
/// without knowing the resource type.
pub trait Screen {
    fn kind(&self) -> ResourceKind;
    fn handle(&mut self, event: ScreenEvent, ctx: ScreenContext, caps: &Capabilities);
    fn view(&self, ctx: ScreenContext) -> ScreenView;
}

#[derive(Clone, Debug)]
struct Editor<D> {
    id: EntityId,
    draft: D,
    loading: bool,
    dirty: bool,
    load_error: Option<String>,
}

pub struct ResourceController<R: Resource> {
    config: AdminConfig,
    mounted: bool,
    query: QueryState,
    list: ListState<R::Entity>,
    search: Debounce<String>,
    reference: ReferenceData,
    draft: R::Draft,
    create: MutationTracker,
    editor: Option<Editor<R::Draft>>,
    edit: MutationTracker,
}

impl<R: Resource> Default for ResourceController<R> {
    fn default() -> Self {
        Self::new(AdminConfig::default())
    }
}

fn search_timer_id(resource: ResourceKind, token: DebounceToken) -> TimerId {
    TimerId::new(format!("{resource}-search-{}", token.value()))
}

fn unexpected_output(resource: ResourceKind, output: &ServiceOutput) -> AdminError {
    let got = match output {
        ServiceOutput::Page(_) => "a page",
        ServiceOutput::Entity(_) => "an entity",
        ServiceOutput::Deleted => "a deletion",
    };
    AdminError::Decode {
        resource,
        reason: format!("got {got}"),
    }
}

impl<R: Resource> ResourceController<R> {
    #[must_use]
    pub fn new(config: AdminConfig) -> Self {
        Self {
            config,
            mounted: false,
            query: QueryState::new(R::default_sorting(), config.page_size, config.reset_page_on_sort),
            list: ListState::default(),
            search: Debounce::new(config.search_debounce()),
            reference: ReferenceData::new(R::OPTION_SOURCES),
            draft: R::Draft::default(),
            create: MutationTracker::default(),
            editor: None,
            edit: MutationTracker::default(),
        }
    }

    #[must_use]
    pub const fn is_mounted(&self) -> bool {
        self.mounted
    }

    #[must_use]
    pub const fn query(&self) -> &QueryState {
        &self.query
    }

    #[must_use]
    pub const fn list(&self) -> &ListState<R::Entity> {
        &self.list
    }

    #[must_use]
    pub const fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    #[must_use]
    pub const fn draft(&self) -> &R::Draft {
        &self.draft
    }

    #[must_use]
    pub fn editing(&self) -> Option<(&EntityId, &R::Draft)> {
        self.editor.as_ref().map(|e| (&e.id, &e.draft))
    }

    fn dispatch(&mut self, event: ScreenEvent, ctx: ScreenContext, caps: &Capabilities) -> AdminResult<()> {
        if event.is_mutating() {
            self.ensure_mutable(ctx)?;
        }
        match event {
            ScreenEvent::Opened => self.mount(ctx.config, caps),

            ScreenEvent::SortingChanged { sorting } => {
                self.query.set_sorting(sorting);
                self.fetch_list(caps);
            }
            ScreenEvent::PageChanged { page } => {
                self.query.set_page(page);
                self.fetch_list(caps);
            }
            ScreenEvent::SearchChanged { text } => self.schedule_search(text, caps),
            ScreenEvent::SearchTimer { token, output } => self.settle_search(token, &output, caps),
            ScreenEvent::ListRetryRequested => self.fetch_list(caps),
            ScreenEvent::ListLoaded { ticket, result } => self.apply_list(ticket, *result, caps),

            ScreenEvent::ReferenceRetryRequested { source } => {
                match self.reference.begin_reload(source) {
                    Some(ticket) => self.fetch_reference(source, ticket, caps),
                    None => debug!(resource = %R::KIND, %source, "no dropdown uses this source"),
                }
            }
            ScreenEvent::ReferenceLoaded {
                source,
                ticket,
                result,
            } => self.apply_reference(source, ticket, *result),

            ScreenEvent::DraftChanged { change } => self.draft.apply(change)?,
            ScreenEvent::DraftCleared => self.draft.clear(),
            ScreenEvent::CreateRequested => self.submit_create(caps)?,
            ScreenEvent::CreateCompleted { ticket, result } => {
                self.complete_create(ticket, *result, caps);
            }

            ScreenEvent::EditOpened { id } => self.open_editor(id, caps)?,
            ScreenEvent::EditLoaded { id, result } => self.apply_edit_loaded(&id, *result, caps),
            ScreenEvent::EditChanged { change } => {
                if let Some(editor) = self.editor.as_mut() {
                    editor.draft.apply(change)?;
                    editor.dirty = true;
                }
            }
            ScreenEvent::EditSubmitted => self.submit_edit(caps)?,
            ScreenEvent::DeleteRequested => self.submit_delete(caps)?,
            ScreenEvent::EditCompleted { id, ticket, result }
            | ScreenEvent::DeleteCompleted { id, ticket, result } => {
                self.complete_edit(&id, ticket, *result, caps);
            }
            ScreenEvent::EditClosed => self.editor = None,
        }
        Ok(())
    }

    fn ensure_mutable(&self, ctx: ScreenContext) -> AdminResult<()> {
        if !R::is_mutable() {
            return Err(DraftError::ReadOnly.into());
        }
        if !ctx.can_manage {
            return Err(AdminError::Forbidden { resource: R::KIND });
        }
        Ok(())
    }

    // --- Mount ---

    fn mount(&mut self, config: AdminConfig, caps: &Capabilities) {
        if let Some(token) = self.search.cancel() {
            caps.timer.cancel(search_timer_id(R::KIND, token));
        }
        self.config = config;
        self.query = QueryState::new(R::default_sorting(), config.page_size, config.reset_page_on_sort);
        self.list.clear();
        self.search.set_delay(config.search_debounce());
        self.reference.reset();
        self.draft.clear();
        self.editor = None;
        self.mounted = true;

        info!(resource = %R::KIND, sorting = %self.query.params().sorting, "screen opened");
        self.fetch_list(caps);
        for (source, ticket) in self.reference.begin_load() {
            self.fetch_reference(source, ticket, caps);
        }
    }

    // --- List ---

    fn fetch_list(&mut self, caps: &Capabilities) {
        let resource = R::KIND;
        let ticket = self.list.begin_fetch();
        let query = self.query.params().clone();
        debug!(
            %resource,
            ticket = ticket.value(),
            page = query.page(),
            sorting = %query.sorting,
            filter = %query.filter,
            "requesting list"
        );
        caps.service.list(resource, query, move |result| {
            Event::screen(
                resource,
                ScreenEvent::ListLoaded {
                    ticket,
                    result: Box::new(result),
                },
            )
        });
    }

    fn apply_list(&mut self, ticket: RequestTicket, result: ServiceResult, caps: &Capabilities) {
        if !self.list.is_latest(ticket) {
            debug!(resource = %R::KIND, ticket = ticket.value(), "dropping stale list response");
            return;
        }

        let page = result.map_err(AdminError::from).and_then(|output| match output {
            ServiceOutput::Page(page) => {
                decode_items::<R>(&page.items).map(|items| (items, page.total_count))
            }
            other => Err(unexpected_output(R::KIND, &other)),
        });

        match page {
            Ok((items, total_count)) => {
                debug!(resource = %R::KIND, rows = items.len(), total_count, "list loaded");
                self.list.accept(ticket, items, total_count);
            }
            Err(error) => {
                warn!(resource = %R::KIND, code = error.code(), %error, "list request failed");
                let remote = error.into_remote();
                self.list.fail(ticket, remote.message.clone());
                caps.notifier.notify(Notification::from_error(&remote));
            }
        }
    }

    // --- Search ---

    fn schedule_search(&mut self, text: String, caps: &Capabilities) {
        let resource = R::KIND;
        let scheduled = self.search.schedule(text);
        if let Some(previous) = scheduled.superseded {
            caps.timer.cancel(search_timer_id(resource, previous));
        }
        let token = scheduled.token;
        caps.timer.start(
            search_timer_id(resource, token),
            self.search.delay(),
            move |output| Event::screen(resource, ScreenEvent::SearchTimer { token, output }),
        );
    }

    fn settle_search(&mut self, token: DebounceToken, output: &TimerOutput, caps: &Capabilities) {
        if let TimerOutput::Cancelled { id } = output {
            debug!(resource = %R::KIND, %id, "search timer cancelled");
            return;
        }
        match self.search.settle(token) {
            Some(filter) => {
                self.query.set_filter(filter);
                self.fetch_list(caps);
            }
            None => debug!(resource = %R::KIND, token = token.value(), "superseded search timer"),
        }
    }

    // --- Reference data ---

    fn fetch_reference(&self, source: ResourceKind, ticket: RequestTicket, caps: &Capabilities) {
        let resource = R::KIND;
        debug!(%resource, %source, ticket = ticket.value(), "loading reference data");
        caps.service.list(
            source,
            reference_query(self.config.reference_page_size),
            move |result| {
                Event::screen(
                    resource,
                    ScreenEvent::ReferenceLoaded {
                        source,
                        ticket,
                        result: Box::new(result),
                    },
                )
            },
        );
    }

    fn apply_reference(&mut self, source: ResourceKind, ticket: RequestTicket, result: ServiceResult) {
        if !self.reference.is_latest(source, ticket) {
            debug!(resource = %R::KIND, %source, ticket = ticket.value(), "dropping stale reference data");
            return;
        }
        let options = result
            .map_err(AdminError::from)
            .and_then(|output| match output {
                ServiceOutput::Page(page) => reference::project(source, &page.items),
                other => Err(unexpected_output(source, &other)),
            })
            .map_err(|cause| AdminError::ReferenceDataUnavailable {
                resource: source,
                reason: cause.into_remote().message,
            });

        match &options {
            Ok(list) => debug!(resource = %R::KIND, %source, options = list.len(), "reference data ready"),
            Err(error) => warn!(resource = %R::KIND, %source, %error, "reference data unavailable"),
        }
        self.reference.complete(source, ticket, options);
    }

    // --- Create ---

    fn submit_create(&mut self, caps: &Capabilities) -> AdminResult<()> {
        let resource = R::KIND;
        self.draft.validate()?;
        let body = self.draft.to_payload().map_err(|e| AdminError::Payload {
            resource,
            reason: e.to_string(),
        })?;
        let ticket = self.create.begin().ok_or(AdminError::Busy { resource })?;

        info!(%resource, ticket = ticket.value(), "submitting create");
        caps.service.create(resource, body, move |result| {
            Event::screen(
                resource,
                ScreenEvent::CreateCompleted {
                    ticket,
                    result: Box::new(result),
                },
            )
        });
        Ok(())
    }

    fn complete_create(&mut self, ticket: RequestTicket, result: ServiceResult, caps: &Capabilities) {
        if !self.create.settle(ticket) {
            debug!(resource = %R::KIND, ticket = ticket.value(), "create outcome already handled");
            return;
        }
        let reaction = Reaction::for_result(result);
        info!(resource = %R::KIND, ticket = ticket.value(), kind = ?reaction.notification.kind, "create settled");

        caps.notifier.notify(reaction.notification);
        if reaction.refetch {
            self.fetch_list(caps);
        }
        if reaction.reset_draft {
            self.draft.clear();
        }
    }

    // --- Edit ---

    fn open_editor(&mut self, id: EntityId, caps: &Capabilities) -> AdminResult<()> {
        let resource = R::KIND;
        if self.edit.is_submitting() {
            return Err(AdminError::Busy { resource });
        }

        let draft = self
            .list
            .items()
            .iter()
            .find(|entity| R::id(entity) == &id)
            .map(<R::Draft as Draft>::from_entity)
            .unwrap_or_default();
        self.editor = Some(Editor {
            id: id.clone(),
            draft,
            loading: true,
            dirty: false,
            load_error: None,
        });

        debug!(%resource, %id, "loading entity for edit");
        caps.service.get(resource, id.clone(), move |result| {
            Event::screen(
                resource,
                ScreenEvent::EditLoaded {
                    id,
                    result: Box::new(result),
                },
            )
        });
        Ok(())
    }

    fn apply_edit_loaded(&mut self, id: &EntityId, result: ServiceResult, caps: &Capabilities) {
        let Some(editor) = self.editor.as_mut().filter(|e| &e.id == id) else {
            debug!(resource = %R::KIND, %id, "edit form closed before entity arrived");
            return;
        };
        editor.loading = false;

        let entity = result.map_err(AdminError::from).and_then(|output| match output {
            ServiceOutput::Entity(value) => decode_entity::<R>(&value),
            other => Err(unexpected_output(R::KIND, &other)),
        });

        match entity {
            Ok(entity) => {
                editor.load_error = None;
                if !editor.dirty {
                    editor.draft = <R::Draft as Draft>::from_entity(&entity);
                }
            }
            Err(error) => {
                warn!(resource = %R::KIND, %id, %error, "could not load entity for edit");
                let remote = error.into_remote();
                editor.load_error = Some(remote.message.clone());
                caps.notifier.notify(Notification::from_error(&remote));
            }
        }
    }

    fn submit_edit(&mut self, caps: &Capabilities) -> AdminResult<()> {
        let resource = R::KIND;
        let Some(editor) = self.editor.as_ref() else {
            debug!(%resource, "no edit form open");
            return Ok(());
        };
        editor.draft.validate()?;
        let body = editor.draft.to_payload().map_err(|e| AdminError::Payload {
            resource,
            reason: e.to_string(),
        })?;
        let ticket = self.edit.begin().ok_or(AdminError::Busy { resource })?;
        let id = editor.id.clone();

        info!(%resource, %id, ticket = ticket.value(), "submitting update");
        caps.service.update(resource, id.clone(), body, move |result| {
            Event::screen(
                resource,
                ScreenEvent::EditCompleted {
                    id,
                    ticket,
                    result: Box::new(result),
                },
            )
        });
        Ok(())
    }

    fn submit_delete(&mut self, caps: &Capabilities) -> AdminResult<()> {
        let resource = R::KIND;
        let Some(editor) = self.editor.as_ref() else {
            debug!(%resource, "no edit form open");
            return Ok(());
        };
        let ticket = self.edit.begin().ok_or(AdminError::Busy { resource })?;
        let id = editor.id.clone();

        info!(%resource, %id, ticket = ticket.value(), "submitting delete");
        caps.service.delete(resource, id.clone(), move |result| {
            Event::screen(
                resource,
                ScreenEvent::DeleteCompleted {
                    id,
                    ticket,
                    result: Box::new(result),
                },
            )
        });
        Ok(())
    }

    fn complete_edit(&mut self, id: &EntityId, ticket: RequestTicket, result: ServiceResult, caps: &Capabilities) {
        if !self.edit.settle(ticket) {
            debug!(resource = %R::KIND, ticket = ticket.value(), "edit outcome already handled");
            return;
        }
        let reaction = Reaction::for_result(result);
        info!(resource = %R::KIND, %id, kind = ?reaction.notification.kind, "edit settled");

        caps.notifier.notify(reaction.notification);
        if reaction.refetch {
            self.fetch_list(caps);
        }
        if reaction.reset_draft && self.editor.as_ref().is_some_and(|e| &e.id == id) {
            self.editor = None;
        }
    }

    // --- View ---

    fn form_context(&self, submitting: bool) -> FormContext<'_> {
        FormContext {
            resource: R::KIND,
            reference: &self.reference,
            name_limit: self.config.name_length_advisory,
            submitting,
        }
    }
}

impl<R: Resource> Screen for ResourceController<R> {
    fn kind(&self) -> ResourceKind {
        R::KIND
    }

    #[instrument(level = "debug", skip_all, fields(resource = %R::KIND, event = event.name()))]
    fn handle(&mut self, event: ScreenEvent, ctx: ScreenContext, caps: &Capabilities) {
        let name = event.name();
        if let Err(error) = self.dispatch(event, ctx, caps) {
            warn!(resource = %R::KIND, event = name, code = error.code(), %error, "event rejected");
        }
    }

    fn view(&self, ctx: ScreenContext) -> ScreenView {
        let params = self.query.params();
        let pages = self.list.pages(params.max_result_count);
        let editable = R::is_mutable() && ctx.can_manage;

        ScreenView {
            resource: R::KIND,
            title: R::TITLE.to_string(),
            columns: R::COLUMNS
                .iter()
                .map(|column| ColumnView::new(column, &params.sorting))
                .collect(),
            rows: self
                .list
                .items()
                .iter()
                .map(|entity| RowView {
                    id: R::id(entity).clone(),
                    cells: R::cells(entity),
                    editable,
                })
                .collect(),
            status: self.list.status().clone(),
            is_fetching: self.list.is_fetching(),
            total_count: self.list.total_count(),
            page: params.page(),
            pages,
            show_pagination: shows_pagination(pages),
            sorting: params.sorting.to_string(),
            filter: params.filter.clone(),
            search_pending: self.search.is_pending(),
            form: editable.then(|| form_view(&self.draft, self.form_context(self.create.is_submitting()))),
            editor: self.editor.as_ref().filter(|_| editable).map(|editor| EditorView {
                id: editor.id.clone(),
                loading: editor.loading,
                load_error: editor.load_error.clone(),
                form: form_view(&editor.draft, self.form_context(self.edit.is_submitting())),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{AuditLogs, Offices};

    #[test]
    fn starts_on_first_page_with_default_sort() {
        let controller = ResourceController::<Offices>::default();
        assert!(!controller.is_mounted());
        assert_eq!(controller.query().params().sorting.to_string(), "Name ASC");
        assert_eq!(controller.query().params().max_result_count, 10);
        assert_eq!(controller.reference().iter().count(), 3);
    }

    #[test]
    fn config_page_size_applies() {
        let config = AdminConfig {
            page_size: 25,
            ..AdminConfig::default()
        };
        let controller = ResourceController::<AuditLogs>::new(config);
        assert_eq!(controller.query().params().max_result_count, 25);
        assert_eq!(controller.query().params().sorting.to_string(), "ChangeDate DESC");
    }

    #[test]
    fn read_only_resources_have_no_form() {
        let controller = ResourceController::<AuditLogs>::default();
        let view = controller.view(ScreenContext {
            config: AdminConfig::default(),
            can_manage: true,
        });
        assert!(view.form.is_none());
        assert!(view.editor.is_none());
        assert_eq!(view.columns[0].direction, Some(crate::query::SortDirection::Desc));
    }

    #[test]
    fn support_users_get_no_form() {
        let controller = ResourceController::<Offices>::default();
        let ctx = ScreenContext {
            config: AdminConfig::default(),
            can_manage: false,
        };
        assert!(controller.view(ctx).form.is_none());
        assert!(controller.ensure_mutable(ctx).is_err());
    }

    #[test]
    fn search_timer_ids_are_unique_per_screen() {
        let mut debounce = Debounce::new(std::time::Duration::from_millis(1));
        let a = debounce.schedule(());
        let b = debounce.schedule(());
        assert_ne!(
            search_timer_id(ResourceKind::Office, a.token),
            search_timer_id(ResourceKind::Office, b.token)
        );
        assert_ne!(
            search_timer_id(ResourceKind::Office, a.token),
            search_timer_id(ResourceKind::Room, a.token)
        );
    }
}
