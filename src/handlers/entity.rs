//! Entity CRUD handlers: list, read, save, and delete over registered
//! resources, routed through each resource's configured handler slots.

use crate::context::RequestContext;
use crate::crud::{Flow, Listing};
use crate::error::AdminError;
use crate::meta::{MetaValues, DESTROY_FIELD};
use crate::resource::Resource;
use crate::response::{count_only, success_created, success_many, success_one};
use crate::sql::QueryDialect;
use crate::state::AppState;
use crate::store::Store;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Header carrying the caller's comma-separated role names.
pub const ROLES_HEADER: &str = "x-curator-roles";

fn roles_from(headers: &HeaderMap) -> Vec<String> {
    headers
        .get(ROLES_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| {
            s.split(',')
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn lookup(state: &AppState, segment: &str) -> Result<Arc<Resource>, AdminError> {
    state
        .resource(segment)
        .ok_or_else(|| AdminError::NotFound(segment.to_string()))
}

fn body_to_object(value: Value) -> Result<Map<String, Value>, AdminError> {
    match value {
        Value::Object(m) => Ok(m),
        _ => Err(AdminError::BadRequest("body must be a JSON object".into())),
    }
}

pub async fn list(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Result<Response, AdminError> {
    let resource = lookup(&state, &segment)?;
    let counting = params
        .get("count")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false);
    let ctx = RequestContext::new()
        .with_roles(roles_from(&headers))
        .with_counting(counting);
    let checker = resource.checker(state.permissions.as_ref());
    match resource
        .call_find_many(state.store.as_ref(), checker, &ctx)
        .await?
    {
        Listing::Rows(rows) => Ok(success_many(rows).into_response()),
        Listing::Total(total) => Ok(count_only(total).into_response()),
    }
}

pub async fn read(
    State(state): State<AppState>,
    Path((segment, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Response, AdminError> {
    let resource = lookup(&state, &segment)?;
    let ctx = RequestContext::new()
        .with_roles(roles_from(&headers))
        .with_resource_id(id);
    let checker = resource.checker(state.permissions.as_ref());
    match resource
        .call_find_one(state.store.as_ref(), checker, None, &ctx)
        .await?
    {
        Flow::Continue(row) => Ok(success_one(row).into_response()),
        Flow::Stop => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

/// Create via save. A body carrying a truthy `_destroy` marker is routed
/// through find-one's destroy branch instead; on `Stop` nothing is saved.
pub async fn create(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Response, AdminError> {
    let resource = lookup(&state, &segment)?;
    let mut obj = body_to_object(body)?;
    let ctx = RequestContext::new().with_roles(roles_from(&headers));
    let checker = resource.checker(state.permissions.as_ref());

    let meta = MetaValues::from_object(&obj);
    if meta.destroy_requested() {
        if let Flow::Stop = resource
            .call_find_one(state.store.as_ref(), checker, Some(&meta), &ctx)
            .await?
        {
            return Ok(StatusCode::NO_CONTENT.into_response());
        }
    }

    obj.remove(DESTROY_FIELD);
    let row = resource
        .call_save(state.store.as_ref(), checker, &Value::Object(obj), &ctx)
        .await?;
    Ok(success_created(row).into_response())
}

pub async fn update(
    State(state): State<AppState>,
    Path((segment, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Response, AdminError> {
    let resource = lookup(&state, &segment)?;
    let mut obj = body_to_object(body)?;
    obj.remove(DESTROY_FIELD);

    // Single-key convenience: fill the key column from the path when the
    // body omits it. Composite keys must arrive in the body.
    if resource.primary_fields.len() <= 1 {
        let column = resource
            .primary_fields
            .first()
            .map(|f| f.column.clone())
            .or_else(|| {
                state
                    .store
                    .dialect()
                    .auto_primary_column()
                    .map(str::to_string)
            });
        if let Some(column) = column {
            obj.entry(column).or_insert(Value::String(id.clone()));
        }
    }

    let ctx = RequestContext::new()
        .with_roles(roles_from(&headers))
        .with_resource_id(id);
    let checker = resource.checker(state.permissions.as_ref());
    let row = resource
        .call_save(state.store.as_ref(), checker, &Value::Object(obj), &ctx)
        .await?;
    Ok(success_one(row).into_response())
}

pub async fn delete_one(
    State(state): State<AppState>,
    Path((segment, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Response, AdminError> {
    let resource = lookup(&state, &segment)?;
    let ctx = RequestContext::new()
        .with_roles(roles_from(&headers))
        .with_resource_id(id);
    let checker = resource.checker(state.permissions.as_ref());
    resource
        .call_delete(state.store.as_ref(), checker, &ctx)
        .await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
