//! Shared application state for the admin routes.

use crate::resource::{Registry, Resource};
use crate::roles::PermissionChecker;
use crate::store::PgStore;
use std::sync::{Arc, RwLock};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<PgStore>,
    /// Behind a lock so resources can be re-registered without a restart.
    pub registry: Arc<RwLock<Registry>>,
    /// Fallback checker for resources that carry no policy of their own.
    pub permissions: Arc<dyn PermissionChecker>,
}

impl AppState {
    pub fn new(
        store: PgStore,
        registry: Registry,
        permissions: impl PermissionChecker + 'static,
    ) -> Self {
        AppState {
            store: Arc::new(store),
            registry: Arc::new(RwLock::new(registry)),
            permissions: Arc::new(permissions),
        }
    }

    pub fn resource(&self, path_segment: &str) -> Option<Arc<Resource>> {
        self.registry
            .read()
            .expect("registry lock")
            .resource_by_path(path_segment)
            .cloned()
    }
}
