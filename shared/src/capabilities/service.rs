use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RemoteError;
use crate::query::QueryParams;
use crate::resource::{EntityId, ResourceKind};

const API_ROOT: &str = "api/app";

/// Request to the remote resource service. The shell performs it (usually
/// over HTTP, see [`ServiceOperation::method`] and [`ServiceOperation::path`])
/// and answers with a [`ServiceResult`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ServiceOperation {
    List {
        resource: ResourceKind,
        query: QueryParams,
    },
    Create {
        resource: ResourceKind,
        body: Value,
    },
    Get {
        resource: ResourceKind,
        id: EntityId,
    },
    Update {
        resource: ResourceKind,
        id: EntityId,
        body: Value,
    },
    Delete {
        resource: ResourceKind,
        id: EntityId,
    },
}

impl ServiceOperation {
    #[must_use]
    pub const fn resource(&self) -> ResourceKind {
        match self {
            Self::List { resource, .. }
            | Self::Create { resource, .. }
            | Self::Get { resource, .. }
            | Self::Update { resource, .. }
            | Self::Delete { resource, .. } => *resource,
        }
    }

    #[must_use]
    pub const fn method(&self) -> &'static str {
        match self {
            Self::List { .. } | Self::Get { .. } => "GET",
            Self::Create { .. } => "POST",
            Self::Update { .. } => "PUT",
            Self::Delete { .. } => "DELETE",
        }
    }

    /// Relative request path, including the query string for lists.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::List { resource, query } => {
                format!("{API_ROOT}/{resource}?{}", query.to_query_string())
            }
            Self::Create { resource, .. } => format!("{API_ROOT}/{resource}"),
            Self::Get { resource, id }
            | Self::Update { resource, id, .. }
            | Self::Delete { resource, id } => {
                let id: String = url::form_urlencoded::byte_serialize(id.as_str().as_bytes()).collect();
                format!("{API_ROOT}/{resource}/{id}")
            }
        }
    }

    #[must_use]
    pub const fn body(&self) -> Option<&Value> {
        match self {
            Self::Create { body, .. } | Self::Update { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// One page of a list as returned by the service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse {
    #[serde(default)]
    pub items: Vec<Value>,
    #[serde(default)]
    pub total_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ServiceOutput {
    Page(PageResponse),
    Entity(Value),
    Deleted,
}

pub type ServiceResult = Result<ServiceOutput, RemoteError>;

impl Operation for ServiceOperation {
    type Output = ServiceResult;
}

pub struct Service<Ev> {
    context: CapabilityContext<ServiceOperation, Ev>,
}

impl<Ev> Capability<Ev> for Service<Ev> {
    type Operation = ServiceOperation;
    type MappedSelf<MappedEv> = Service<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static,
    {
        Service::new(self.context.map_event(f))
    }
}

impl<Ev> Service<Ev> {
    pub fn new(context: CapabilityContext<ServiceOperation, Ev>) -> Self {
        Self { context }
    }
}

impl<Ev: Send + 'static> Service<Ev> {
    pub fn list<F>(&self, resource: ResourceKind, query: QueryParams, callback: F)
    where
        F: FnOnce(ServiceResult) -> Ev + Send + 'static,
    {
        self.dispatch(ServiceOperation::List { resource, query }, callback);
    }

    pub fn create<F>(&self, resource: ResourceKind, body: Value, callback: F)
    where
        F: FnOnce(ServiceResult) -> Ev + Send + 'static,
    {
        self.dispatch(ServiceOperation::Create { resource, body }, callback);
    }

    pub fn get<F>(&self, resource: ResourceKind, id: EntityId, callback: F)
    where
        F: FnOnce(ServiceResult) -> Ev + Send + 'static,
    {
        self.dispatch(ServiceOperation::Get { resource, id }, callback);
    }

    pub fn update<F>(&self, resource: ResourceKind, id: EntityId, body: Value, callback: F)
    where
        F: FnOnce(ServiceResult) -> Ev + Send + 'static,
    {
        self.dispatch(ServiceOperation::Update { resource, id, body }, callback);
    }

    pub fn delete<F>(&self, resource: ResourceKind, id: EntityId, callback: F)
    where
        F: FnOnce(ServiceResult) -> Ev + Send + 'static,
    {
        self.dispatch(ServiceOperation::Delete { resource, id }, callback);
    }

    fn dispatch<F>(&self, operation: ServiceOperation, callback: F)
    where
        F: FnOnce(ServiceResult) -> Ev + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let result = context.request_from_shell(operation).await;
            context.update_app(callback(result));
        });
    }
}
