//! Curator SDK: resource-driven admin CRUD layer for PostgreSQL.

pub mod context;
pub mod crud;
pub mod error;
pub mod handlers;
pub mod meta;
pub mod resource;
pub mod response;
pub mod roles;
pub mod routes;
pub mod sql;
pub mod state;
pub mod store;

pub use context::RequestContext;
pub use crud::{
    DeleteHandler, FindManyHandler, FindOneHandler, Flow, Listing, SaveHandler,
};
pub use error::AdminError;
pub use meta::{MetaValue, MetaValues, DESTROY_FIELD};
pub use resource::{PrimaryField, Registry, Resource};
pub use roles::{Action, Anyone, PermissionChecker, RolePolicy};
pub use routes::{common_routes, common_routes_with_ready, entity_routes};
pub use sql::{
    primary_key_predicate, primary_key_predicate_from_meta, PgDialect, Predicate, QueryDialect,
};
pub use state::AppState;
pub use store::{PgStore, Store};
