//! Resource configuration: binds a logical resource to a table, its
//! primary-key fields, and its handler slots.

use crate::crud::{
    DefaultDelete, DefaultFindMany, DefaultFindOne, DefaultSave, DeleteHandler, FindManyHandler,
    FindOneHandler, Flow, Listing, SaveHandler,
};
use crate::context::RequestContext;
use crate::error::AdminError;
use crate::meta::MetaValues;
use crate::roles::PermissionChecker;
use crate::store::Store;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// One primary-key field: logical name, database column, and an optional
/// PostgreSQL type name used to cast bound string parameters.
#[derive(Debug, Clone)]
pub struct PrimaryField {
    pub name: String,
    pub column: String,
    pub pg_type: Option<String>,
}

impl PrimaryField {
    pub fn new(name: impl Into<String>, column: impl Into<String>) -> Self {
        PrimaryField {
            name: name.into(),
            column: column.into(),
            pg_type: None,
        }
    }

    pub fn pg_type(mut self, pg_type: impl Into<String>) -> Self {
        self.pg_type = Some(pg_type.into());
        self
    }
}

/// A registered resource. Built fluently and added to a [`Registry`];
/// the four handler slots default to the built-in CRUD handlers and can be
/// replaced individually.
pub struct Resource {
    pub name: String,
    /// URL path segment the resource is mounted under. Defaults to the name.
    pub path_segment: String,
    pub schema_name: String,
    pub table_name: String,
    /// Declared primary-key fields, in key order. May be empty, in which
    /// case the dialect's auto-detected primary column is used.
    pub primary_fields: Vec<PrimaryField>,
    policy: Option<Arc<dyn PermissionChecker>>,
    find_one_handler: Arc<dyn FindOneHandler>,
    find_many_handler: Arc<dyn FindManyHandler>,
    save_handler: Arc<dyn SaveHandler>,
    delete_handler: Arc<dyn DeleteHandler>,
}

impl Resource {
    pub fn new(name: impl Into<String>, table_name: impl Into<String>) -> Self {
        let name = name.into();
        Resource {
            path_segment: name.clone(),
            name,
            schema_name: "public".into(),
            table_name: table_name.into(),
            primary_fields: Vec::new(),
            policy: None,
            find_one_handler: Arc::new(DefaultFindOne),
            find_many_handler: Arc::new(DefaultFindMany),
            save_handler: Arc::new(DefaultSave),
            delete_handler: Arc::new(DefaultDelete),
        }
    }

    pub fn path_segment(mut self, segment: impl Into<String>) -> Self {
        self.path_segment = segment.into();
        self
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema_name = schema.into();
        self
    }

    pub fn primary_field(mut self, field: PrimaryField) -> Self {
        self.primary_fields.push(field);
        self
    }

    /// Attach a per-resource permission policy. Without one, the caller's
    /// checker decides alone.
    pub fn policy(mut self, policy: impl PermissionChecker + 'static) -> Self {
        self.policy = Some(Arc::new(policy));
        self
    }

    pub fn find_one_handler(mut self, handler: impl FindOneHandler + 'static) -> Self {
        self.find_one_handler = Arc::new(handler);
        self
    }

    pub fn find_many_handler(mut self, handler: impl FindManyHandler + 'static) -> Self {
        self.find_many_handler = Arc::new(handler);
        self
    }

    pub fn save_handler(mut self, handler: impl SaveHandler + 'static) -> Self {
        self.save_handler = Arc::new(handler);
        self
    }

    pub fn delete_handler(mut self, handler: impl DeleteHandler + 'static) -> Self {
        self.delete_handler = Arc::new(handler);
        self
    }

    /// The resource's own policy when set, the fallback otherwise.
    pub fn checker<'a>(&'a self, fallback: &'a dyn PermissionChecker) -> &'a dyn PermissionChecker {
        match &self.policy {
            Some(policy) => policy.as_ref(),
            None => fallback,
        }
    }

    pub async fn call_find_one(
        &self,
        store: &dyn Store,
        permissions: &dyn PermissionChecker,
        meta_values: Option<&MetaValues>,
        ctx: &RequestContext,
    ) -> Result<Flow<Value>, AdminError> {
        self.find_one_handler
            .find_one(self, store, permissions, meta_values, ctx)
            .await
    }

    pub async fn call_find_many(
        &self,
        store: &dyn Store,
        permissions: &dyn PermissionChecker,
        ctx: &RequestContext,
    ) -> Result<Listing, AdminError> {
        self.find_many_handler
            .find_many(self, store, permissions, ctx)
            .await
    }

    pub async fn call_save(
        &self,
        store: &dyn Store,
        permissions: &dyn PermissionChecker,
        record: &Value,
        ctx: &RequestContext,
    ) -> Result<Value, AdminError> {
        self.save_handler
            .save(self, store, permissions, record, ctx)
            .await
    }

    pub async fn call_delete(
        &self,
        store: &dyn Store,
        permissions: &dyn PermissionChecker,
        ctx: &RequestContext,
    ) -> Result<(), AdminError> {
        self.delete_handler
            .delete(self, store, permissions, ctx)
            .await
    }
}

/// Registered resources with lookup by path segment.
#[derive(Default)]
pub struct Registry {
    resources: Vec<Arc<Resource>>,
    by_path: HashMap<String, Arc<Resource>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, resource: Resource) -> Arc<Resource> {
        let resource = Arc::new(resource);
        self.by_path
            .insert(resource.path_segment.clone(), resource.clone());
        self.resources.push(resource.clone());
        resource
    }

    pub fn resource_by_path(&self, path_segment: &str) -> Option<&Arc<Resource>> {
        self.by_path.get(path_segment)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Resource>> {
        self.resources.iter()
    }
}
