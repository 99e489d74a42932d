//! Shared application state
//!
//! [`ActionsState`] bundles the configuration, the record store and the
//! startup-time registries. Everything is behind an `Arc` and never changes
//! after [`ActionsStateBuilder::build`], so cloning the state per request is
//! cheap and lock-free.

use std::fmt;
use std::sync::Arc;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::handlers::{ActionRequest, RequestContext, ResourceController};
use crate::jobs::{JobQueue, LocalJobQueue};
use crate::operations::OperationRegistry;
use crate::presenters::PresenterRegistry;
use crate::repository::RecordStore;
use crate::resource::ResourceRegistry;

/// State shared by every action handler
pub struct ActionsState<S> {
    config: Arc<Config>,
    store: Arc<S>,
    resources: Arc<ResourceRegistry>,
    presenters: Arc<PresenterRegistry>,
    operations: Arc<OperationRegistry>,
    jobs: Arc<dyn JobQueue>,
}

impl<S> Clone for ActionsState<S> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            store: Arc::clone(&self.store),
            resources: Arc::clone(&self.resources),
            presenters: Arc::clone(&self.presenters),
            operations: Arc::clone(&self.operations),
            jobs: Arc::clone(&self.jobs),
        }
    }
}

impl<S> fmt::Debug for ActionsState<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionsState")
            .field("service", &self.config.service.name)
            .field("resources", &self.resources.len())
            .field("presenters", &self.presenters.len())
            .field("operations", &self.operations.len())
            .finish_non_exhaustive()
    }
}

impl<S: RecordStore> ActionsState<S> {
    /// Create a state builder around a record store
    pub fn builder(store: S) -> ActionsStateBuilder<S> {
        ActionsStateBuilder::new(store)
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the record store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get the resource registry
    pub fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    /// Get the shared presenter registry
    pub fn presenters(&self) -> &Arc<PresenterRegistry> {
        &self.presenters
    }

    /// Get the operation registry
    pub fn operations(&self) -> &OperationRegistry {
        &self.operations
    }

    /// Get the job queue
    pub fn jobs(&self) -> &Arc<dyn JobQueue> {
        &self.jobs
    }

    /// Build the per-request controller for an extracted request
    pub fn controller(&self, request: ActionRequest) -> ResourceController<S> {
        let ctx = RequestContext::new(
            &self.resources,
            request.matched_path.as_deref(),
            request.raw,
        );
        ResourceController::new(self.clone(), ctx)
    }
}

/// Builder for [`ActionsState`]
pub struct ActionsStateBuilder<S> {
    store: S,
    config: Option<Config>,
    resources: ResourceRegistry,
    presenters: PresenterRegistry,
    operations: OperationRegistry,
    jobs: Option<Arc<dyn JobQueue>>,
}

impl<S: RecordStore> ActionsStateBuilder<S> {
    /// Create a builder around a record store
    pub fn new(store: S) -> Self {
        Self {
            store,
            config: None,
            resources: ResourceRegistry::new(),
            presenters: PresenterRegistry::new(),
            operations: OperationRegistry::new(),
            jobs: None,
        }
    }

    /// Set the configuration (defaults otherwise)
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the resource registry
    #[must_use]
    pub fn resources(mut self, resources: ResourceRegistry) -> Self {
        self.resources = resources;
        self
    }

    /// Set the presenter registry
    #[must_use]
    pub fn presenters(mut self, presenters: PresenterRegistry) -> Self {
        self.presenters = presenters;
        self
    }

    /// Set the operation registry
    #[must_use]
    pub fn operations(mut self, operations: OperationRegistry) -> Self {
        self.operations = operations;
        self
    }

    /// Use a specific job queue instead of the local one
    #[must_use]
    pub fn jobs(mut self, jobs: Arc<dyn JobQueue>) -> Self {
        self.jobs = Some(jobs);
        self
    }

    /// Validate the registries and assemble the state
    ///
    /// Fails if a registered resource has no presenter. Without an explicit
    /// job queue a [`LocalJobQueue`] is started, which requires a running
    /// Tokio runtime.
    pub fn build(self) -> Result<ActionsState<S>> {
        self.presenters.validate(&self.resources)?;

        let config = Arc::new(self.config.unwrap_or_default());
        let operations = Arc::new(self.operations);
        let jobs = match self.jobs {
            Some(jobs) => jobs,
            None => {
                tokio::runtime::Handle::try_current().map_err(|e| {
                    Error::Internal(format!("Local job queue needs a Tokio runtime: {e}"))
                })?;
                let queue = LocalJobQueue::start(Arc::clone(&operations), &config.jobs);
                Arc::new(queue) as Arc<dyn JobQueue>
            }
        };

        tracing::info!(
            resources = self.resources.len(),
            presenters = self.presenters.len(),
            operations = operations.len(),
            "action state built"
        );

        Ok(ActionsState {
            config,
            store: Arc::new(self.store),
            resources: Arc::new(self.resources),
            presenters: Arc::new(self.presenters),
            operations,
            jobs,
        })
    }
}
