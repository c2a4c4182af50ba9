//! The default CRUD handlers: permission-gated find-one, find-many, save,
//! and delete over a [`Store`].

use crate::context::RequestContext;
use crate::error::AdminError;
use crate::meta::MetaValues;
use crate::resource::Resource;
use crate::roles::{Action, PermissionChecker};
use crate::sql::{primary_key_predicate, primary_key_predicate_from_meta, QueryDialect};
use crate::store::Store;
use async_trait::async_trait;
use serde_json::Value;

/// Handler control flow. `Stop` means the handler intentionally
/// short-circuited the chain (the destroy branch of find-one); it is not an
/// error and callers must not treat it as one.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow<T> {
    Continue(T),
    Stop,
}

impl<T> Flow<T> {
    pub fn is_stop(&self) -> bool {
        matches!(self, Flow::Stop)
    }

    pub fn into_continue(self) -> Option<T> {
        match self {
            Flow::Continue(v) => Some(v),
            Flow::Stop => None,
        }
    }
}

/// What find-many produced: the rows, or just the total for a count-only
/// request.
#[derive(Debug, Clone, PartialEq)]
pub enum Listing {
    Rows(Vec<Value>),
    Total(u64),
}

#[async_trait]
pub trait FindOneHandler: Send + Sync {
    async fn find_one(
        &self,
        resource: &Resource,
        store: &dyn Store,
        permissions: &dyn PermissionChecker,
        meta_values: Option<&MetaValues>,
        ctx: &RequestContext,
    ) -> Result<Flow<Value>, AdminError>;
}

#[async_trait]
pub trait FindManyHandler: Send + Sync {
    async fn find_many(
        &self,
        resource: &Resource,
        store: &dyn Store,
        permissions: &dyn PermissionChecker,
        ctx: &RequestContext,
    ) -> Result<Listing, AdminError>;
}

#[async_trait]
pub trait SaveHandler: Send + Sync {
    async fn save(
        &self,
        resource: &Resource,
        store: &dyn Store,
        permissions: &dyn PermissionChecker,
        record: &Value,
        ctx: &RequestContext,
    ) -> Result<Value, AdminError>;
}

#[async_trait]
pub trait DeleteHandler: Send + Sync {
    async fn delete(
        &self,
        resource: &Resource,
        store: &dyn Store,
        permissions: &dyn PermissionChecker,
        ctx: &RequestContext,
    ) -> Result<(), AdminError>;
}

/// Read-gated single-row fetch, with the destroy shortcut.
///
/// The predicate comes from the context's raw identifier, or from the
/// submitted meta values when present. Meta values carrying a truthy
/// `_destroy` marker turn the fetch into a delete (when allowed) and stop
/// further processing.
pub struct DefaultFindOne;

#[async_trait]
impl FindOneHandler for DefaultFindOne {
    async fn find_one(
        &self,
        resource: &Resource,
        store: &dyn Store,
        permissions: &dyn PermissionChecker,
        meta_values: Option<&MetaValues>,
        ctx: &RequestContext,
    ) -> Result<Flow<Value>, AdminError> {
        if !permissions.allows(Action::Read, ctx) {
            return Err(AdminError::PermissionDenied);
        }

        let predicate = match meta_values {
            None => primary_key_predicate(
                resource,
                store.dialect(),
                ctx.resource_id.as_deref().unwrap_or(""),
            ),
            Some(meta) => primary_key_predicate_from_meta(resource, store.dialect(), meta),
        };
        if predicate.is_empty() {
            return Err(AdminError::FailedToFind);
        }

        if let Some(meta) = meta_values {
            if meta.destroy_requested() && permissions.allows(Action::Delete, ctx) {
                store.delete(resource, &predicate).await?;
                return Ok(Flow::Stop);
            }
        }

        let row = store.fetch_one(resource, &predicate).await?;
        Ok(Flow::Continue(row))
    }
}

/// Read-gated listing: the total for count-only requests, otherwise all
/// rows ordered by primary key descending.
pub struct DefaultFindMany;

#[async_trait]
impl FindManyHandler for DefaultFindMany {
    async fn find_many(
        &self,
        resource: &Resource,
        store: &dyn Store,
        permissions: &dyn PermissionChecker,
        ctx: &RequestContext,
    ) -> Result<Listing, AdminError> {
        if !permissions.allows(Action::Read, ctx) {
            return Err(AdminError::PermissionDenied);
        }
        if ctx.counting {
            return Ok(Listing::Total(store.count(resource).await?));
        }
        Ok(Listing::Rows(store.fetch_all(resource).await?))
    }
}

/// Upsert, gated on `Create` when the record's key is unset and on
/// `Update` otherwise.
pub struct DefaultSave;

#[async_trait]
impl SaveHandler for DefaultSave {
    async fn save(
        &self,
        resource: &Resource,
        store: &dyn Store,
        permissions: &dyn PermissionChecker,
        record: &Value,
        ctx: &RequestContext,
    ) -> Result<Value, AdminError> {
        let action = if store.dialect().primary_key_zero(resource, record) {
            Action::Create
        } else {
            Action::Update
        };
        if !permissions.allows(action, ctx) {
            return Err(AdminError::PermissionDenied);
        }
        store.save(resource, record).await
    }
}

/// Delete permission gate. Row removal happens through the find-one destroy
/// branch; this default never touches the store and reports not-found.
/// Install a custom [`DeleteHandler`] on the resource to change that.
pub struct DefaultDelete;

#[async_trait]
impl DeleteHandler for DefaultDelete {
    async fn delete(
        &self,
        resource: &Resource,
        _store: &dyn Store,
        permissions: &dyn PermissionChecker,
        ctx: &RequestContext,
    ) -> Result<(), AdminError> {
        if permissions.allows(Action::Delete, ctx) {
            return Err(AdminError::NotFound(resource.name.clone()));
        }
        Err(AdminError::PermissionDenied)
    }
}
