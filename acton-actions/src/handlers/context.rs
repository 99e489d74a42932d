//! Per-request context

use crate::handlers::params::{ActionParams, RawParams};
use crate::presenters::ViewType;
use crate::repository::RecordId;
use crate::resource::{ResourceRegistry, ResourceType};

/// Everything an action needs to know about the current request
///
/// Built once per request. The routing resource is resolved here from the
/// matched route path and never looked up again.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    resource: Option<ResourceType>,
    matched_path: Option<String>,
    raw: RawParams,
    params: ActionParams,
    id: Option<RecordId>,
    view: Option<ViewType>,
}

impl RequestContext {
    /// Resolve the resource and split the parameters
    pub fn new(resources: &ResourceRegistry, matched_path: Option<&str>, raw: RawParams) -> Self {
        let resource = matched_path.and_then(|path| resources.resolve_path(path).cloned());
        let params = ActionParams::extract(&raw);
        let id = raw.get("id").and_then(RecordId::from_value);
        let view = raw.type_hint().map(ViewType::new);

        Self {
            resource,
            matched_path: matched_path.map(str::to_string),
            raw,
            params,
            id,
            view,
        }
    }

    /// Override the routing resource
    #[must_use]
    pub fn with_resource(mut self, resource: ResourceType) -> Self {
        self.resource = Some(resource);
        self
    }

    /// Resource addressed by the route, if any
    pub fn resource(&self) -> Option<&ResourceType> {
        self.resource.as_ref()
    }

    /// Route template that matched, e.g. `/orders/{id}`
    pub fn matched_path(&self) -> Option<&str> {
        self.matched_path.as_deref()
    }

    /// Every parameter of the request
    pub fn raw(&self) -> &RawParams {
        &self.raw
    }

    /// Parameters without routing keys
    pub fn params(&self) -> &ActionParams {
        &self.params
    }

    /// The `id` parameter
    pub fn id(&self) -> Option<&RecordId> {
        self.id.as_ref()
    }

    /// The view requested with `type`
    pub fn view(&self) -> Option<&ViewType> {
        self.view.as_ref()
    }
}
