//! Handler behavior against an in-memory store: permission gating, the
//! destroy shortcut, and the dispatch slots.

use async_trait::async_trait;
use curator_sdk::{
    Action, AdminError, Anyone, DeleteHandler, Flow, Listing, MetaValues, PermissionChecker,
    PgDialect, Predicate, PrimaryField, QueryDialect, RequestContext, Resource, RolePolicy, Store,
    DESTROY_FIELD,
};
use serde_json::{json, Value};
use std::sync::Mutex;

struct MockStore {
    dialect: PgDialect,
    rows: Vec<Value>,
    total: u64,
    calls: Mutex<Vec<String>>,
}

impl MockStore {
    fn empty() -> Self {
        Self::with_rows(Vec::new())
    }

    fn with_rows(rows: Vec<Value>) -> Self {
        MockStore {
            dialect: PgDialect,
            total: rows.len() as u64,
            rows,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Store for MockStore {
    fn dialect(&self) -> &dyn QueryDialect {
        &self.dialect
    }

    async fn fetch_one(
        &self,
        resource: &Resource,
        predicate: &Predicate,
    ) -> Result<Value, AdminError> {
        self.record(format!("fetch_one {:?}", predicate.params));
        self.rows
            .first()
            .cloned()
            .ok_or_else(|| AdminError::NotFound(resource.name.clone()))
    }

    async fn fetch_all(&self, _resource: &Resource) -> Result<Vec<Value>, AdminError> {
        self.record("fetch_all".into());
        Ok(self.rows.clone())
    }

    async fn count(&self, _resource: &Resource) -> Result<u64, AdminError> {
        self.record("count".into());
        Ok(self.total)
    }

    async fn save(&self, _resource: &Resource, record: &Value) -> Result<Value, AdminError> {
        self.record("save".into());
        Ok(record.clone())
    }

    async fn delete(
        &self,
        _resource: &Resource,
        predicate: &Predicate,
    ) -> Result<u64, AdminError> {
        self.record(format!("delete {:?}", predicate.params));
        Ok(1)
    }
}

fn books() -> Resource {
    Resource::new("books", "books").primary_field(PrimaryField::new("id", "id"))
}

fn admin_only() -> RolePolicy {
    RolePolicy::new().full_access(&["admin"])
}

fn ctx(roles: &[&str]) -> RequestContext {
    RequestContext::new().with_roles(roles.iter().copied())
}

fn destroy_meta(id: &str, marker: &str) -> MetaValues {
    let mut meta = MetaValues::new();
    meta.push("id", json!(id));
    meta.push(DESTROY_FIELD, json!(marker));
    meta
}

#[tokio::test]
async fn find_one_without_read_permission_never_touches_the_store() {
    let store = MockStore::with_rows(vec![json!({"id": 5})]);
    let res = books();
    let ctx = ctx(&["viewer"]).with_resource_id("5");

    let result = res.call_find_one(&store, &admin_only(), None, &ctx).await;

    assert!(matches!(result, Err(AdminError::PermissionDenied)));
    assert!(store.calls().is_empty(), "store was touched: {:?}", store.calls());
}

#[tokio::test]
async fn find_one_fetches_by_requested_identifier() {
    let row = json!({"id": 5, "title": "Dune"});
    let store = MockStore::with_rows(vec![row.clone()]);
    let res = books();
    let ctx = ctx(&[]).with_resource_id("5");

    let result = res.call_find_one(&store, &Anyone, None, &ctx).await.unwrap();

    assert_eq!(result, Flow::Continue(row));
    assert_eq!(store.calls(), vec!["fetch_one [\"5\"]"]);
}

#[tokio::test]
async fn find_one_without_identifier_is_failed_to_find() {
    let store = MockStore::empty();
    let res = books();

    let result = res.call_find_one(&store, &Anyone, None, &ctx(&[])).await;

    assert!(matches!(result, Err(AdminError::FailedToFind)));
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn find_one_propagates_store_not_found() {
    let store = MockStore::empty();
    let res = books();
    let ctx = ctx(&[]).with_resource_id("5");

    let result = res.call_find_one(&store, &Anyone, None, &ctx).await;

    assert!(matches!(result, Err(AdminError::NotFound(_))));
}

#[tokio::test]
async fn destroy_marker_deletes_and_stops() {
    let store = MockStore::with_rows(vec![json!({"id": 5})]);
    let res = books();
    let meta = destroy_meta("5", "1");

    let result = res
        .call_find_one(&store, &Anyone, Some(&meta), &ctx(&[]))
        .await
        .unwrap();

    assert!(result.is_stop());
    assert_eq!(store.calls(), vec!["delete [\"5\"]"]);
}

#[tokio::test]
async fn destroy_marker_zero_fetches_normally() {
    let store = MockStore::with_rows(vec![json!({"id": 5})]);
    let res = books();
    let meta = destroy_meta("5", "0");

    let result = res
        .call_find_one(&store, &Anyone, Some(&meta), &ctx(&[]))
        .await
        .unwrap();

    assert!(!result.is_stop());
    assert_eq!(store.calls(), vec!["fetch_one [\"5\"]"]);
}

#[tokio::test]
async fn destroy_without_delete_permission_falls_back_to_fetch() {
    let store = MockStore::with_rows(vec![json!({"id": 5})]);
    let res = books();
    let policy = RolePolicy::new().read_only(&["support"]);
    let meta = destroy_meta("5", "1");

    let result = res
        .call_find_one(&store, &policy, Some(&meta), &ctx(&["support"]))
        .await
        .unwrap();

    assert!(!result.is_stop());
    assert_eq!(store.calls(), vec!["fetch_one [\"5\"]"]);
}

#[tokio::test]
async fn find_many_returns_rows_newest_first_from_the_store() {
    let rows = vec![json!({"id": 2}), json!({"id": 1})];
    let store = MockStore::with_rows(rows.clone());
    let res = books();

    let listing = res.call_find_many(&store, &Anyone, &ctx(&[])).await.unwrap();

    assert_eq!(listing, Listing::Rows(rows));
    assert_eq!(store.calls(), vec!["fetch_all"]);
}

#[tokio::test]
async fn find_many_counting_returns_the_total_only() {
    let store = MockStore::with_rows(vec![json!({"id": 1}), json!({"id": 2})]);
    let res = books();
    let ctx = ctx(&[]).with_counting(true);

    let listing = res.call_find_many(&store, &Anyone, &ctx).await.unwrap();

    assert_eq!(listing, Listing::Total(2));
    assert_eq!(store.calls(), vec!["count"]);
}

#[tokio::test]
async fn find_many_without_read_permission_is_denied() {
    let store = MockStore::empty();
    let res = books();

    let result = res.call_find_many(&store, &admin_only(), &ctx(&[])).await;

    assert!(matches!(result, Err(AdminError::PermissionDenied)));
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn save_with_unset_key_requires_create() {
    let store = MockStore::empty();
    let res = books();
    let record = json!({"id": 0, "title": "Dune"});
    let creators = RolePolicy::new().allow(Action::Create, &["editor"]);

    let saved = res
        .call_save(&store, &creators, &record, &ctx(&["editor"]))
        .await
        .unwrap();

    assert_eq!(saved, record);
    assert_eq!(store.calls(), vec!["save"]);
}

#[tokio::test]
async fn save_with_unset_key_denied_without_create_does_not_persist() {
    let store = MockStore::empty();
    let res = books();
    let record = json!({"title": "Dune"});
    let updaters = RolePolicy::new().allow(Action::Update, &["editor"]);

    let result = res
        .call_save(&store, &updaters, &record, &ctx(&["editor"]))
        .await;

    assert!(matches!(result, Err(AdminError::PermissionDenied)));
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn save_with_set_key_requires_update() {
    let store = MockStore::empty();
    let res = books();
    let record = json!({"id": 5, "title": "Dune"});
    let creators = RolePolicy::new().allow(Action::Create, &["editor"]);

    let result = res
        .call_save(&store, &creators, &record, &ctx(&["editor"]))
        .await;

    assert!(matches!(result, Err(AdminError::PermissionDenied)));
    assert!(store.calls().is_empty());

    let updaters = RolePolicy::new().allow(Action::Update, &["editor"]);
    let saved = res
        .call_save(&store, &updaters, &record, &ctx(&["editor"]))
        .await
        .unwrap();
    assert_eq!(saved, record);
}

#[tokio::test]
async fn default_delete_reports_not_found_even_with_permission() {
    let store = MockStore::with_rows(vec![json!({"id": 5})]);
    let res = books();
    let ctx = ctx(&[]).with_resource_id("5");

    let result = res.call_delete(&store, &Anyone, &ctx).await;

    assert!(matches!(result, Err(AdminError::NotFound(_))));
    assert!(store.calls().is_empty(), "default delete must not touch the store");
}

#[tokio::test]
async fn default_delete_without_permission_is_denied() {
    let store = MockStore::empty();
    let res = books();

    let result = res.call_delete(&store, &admin_only(), &ctx(&["viewer"])).await;

    assert!(matches!(result, Err(AdminError::PermissionDenied)));
}

struct DeleteForReal;

#[async_trait]
impl DeleteHandler for DeleteForReal {
    async fn delete(
        &self,
        resource: &Resource,
        store: &dyn Store,
        permissions: &dyn PermissionChecker,
        ctx: &RequestContext,
    ) -> Result<(), AdminError> {
        if !permissions.allows(Action::Delete, ctx) {
            return Err(AdminError::PermissionDenied);
        }
        let predicate = curator_sdk::primary_key_predicate(
            resource,
            store.dialect(),
            ctx.resource_id.as_deref().unwrap_or(""),
        );
        store.delete(resource, &predicate).await?;
        Ok(())
    }
}

#[tokio::test]
async fn installed_delete_handler_replaces_the_default() {
    let store = MockStore::with_rows(vec![json!({"id": 5})]);
    let res = books().delete_handler(DeleteForReal);
    let ctx = ctx(&[]).with_resource_id("5");

    res.call_delete(&store, &Anyone, &ctx).await.unwrap();

    assert_eq!(store.calls(), vec!["delete [\"5\"]"]);
}

#[tokio::test]
async fn composite_key_round_trip_through_find_one() {
    let row = json!({"order_id": 1, "item_id": 2});
    let store = MockStore::with_rows(vec![row.clone()]);
    let res = Resource::new("order_items", "order_items")
        .primary_field(PrimaryField::new("order_id", "order_id"))
        .primary_field(PrimaryField::new("item_id", "item_id"));
    let ctx = ctx(&[]).with_resource_id("1,2");

    let result = res.call_find_one(&store, &Anyone, None, &ctx).await.unwrap();

    assert_eq!(result, Flow::Continue(row));
    assert_eq!(store.calls(), vec!["fetch_one [\"1\", \"2\"]"]);
}
