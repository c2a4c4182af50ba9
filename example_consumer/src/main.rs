//! Example consumer: a separate Rust project that uses curator-sdk as a
//! dependency.
//!
//! Run from repo root: `cargo run -p example-consumer`
//! Or from this directory: `cargo run`

use curator_sdk::{
    common_routes_with_ready, entity_routes, Action, AppState, PgStore, PrimaryField, Registry,
    Resource, RolePolicy,
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("curator_sdk=info")),
        )
        .init();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/curator".into());
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    let mut registry = Registry::new();
    registry.register(
        Resource::new("products", "products")
            .primary_field(PrimaryField::new("id", "id").pg_type("int8")),
    );
    registry.register(
        Resource::new("order_items", "order_items")
            .primary_field(PrimaryField::new("order_id", "order_id").pg_type("int8"))
            .primary_field(PrimaryField::new("item_id", "item_id").pg_type("int8"))
            .policy(
                RolePolicy::new()
                    .full_access(&["admin"])
                    .read_only(&["support"])
                    .deny(Action::Delete, &["support"]),
            ),
    );

    let fallback = RolePolicy::new()
        .full_access(&["admin"])
        .read_only(&["viewer"]);
    let state = AppState::new(PgStore::new(pool), registry, fallback);

    let app = common_routes_with_ready(state.clone()).nest("/admin", entity_routes(state));
    let listener = TcpListener::bind("127.0.0.1:3000").await?;
    tracing::info!(
        "example consumer listening on http://{}",
        listener.local_addr()?
    );
    axum::serve(listener, app).await?;
    Ok(())
}
