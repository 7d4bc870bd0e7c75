//! scopegate demo server
//!
//! Serves a small in-memory blog API guarded by scopes, using keys issued
//! with `scopegate create-key`.
//!
//! # Usage
//!
//! ```bash
//! scopegate create-key --store keys.json --name reader --scope posts.read
//! scopegate-server --keys keys.json
//! curl -H "Authorization: Api-Key <key>" localhost:8080/posts
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Logging filter
//! - `SCOPEGATE_SERVER_HOST` / `SCOPEGATE_SERVER_PORT`: bind address
//! - `SCOPEGATE_KEY_STORE`: key store file
//! - `SCOPEGATE_AUTH_KEYWORD`, `SCOPEGATE_API_KEY_HEADER`,
//!   `SCOPEGATE_TRACK_LAST_USED`: authentication settings

use anyhow::{Context, Result};
use axum::{
    extract::Path,
    http::StatusCode,
    routing::{delete, get, post},
    Extension, Json,
};
use clap::Parser;
use parking_lot::RwLock;
use scopegate_api_server::{serve, ApiError, AppState, ScopedRouter, ServerConfig};
use scopegate_authz::store::InMemoryCredentialStore;
use scopegate_authz::{ApiKeyAuthenticator, AuthConfig, Principal, ScopeAuthorizer};
use scopegate_core::EndpointDescriptor;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// scopegate demo server
#[derive(Parser, Debug)]
#[command(name = "scopegate-server", version, about = "Scope-guarded demo API")]
struct Args {
    /// Host to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0", env = "SCOPEGATE_SERVER_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short = 'p', long, default_value = "8080", env = "SCOPEGATE_SERVER_PORT")]
    port: u16,

    /// Key store file written by `scopegate create-key`
    #[arg(long, env = "SCOPEGATE_KEY_STORE")]
    keys: PathBuf,

    /// Enable JSON logging format
    #[arg(long, env = "SCOPEGATE_LOG_JSON")]
    json_logs: bool,
}

#[derive(Debug, Clone, Serialize)]
struct Post {
    id: u64,
    title: String,
    author: String,
    published: bool,
}

#[derive(Debug, Deserialize)]
struct NewPost {
    title: String,
}

#[derive(Default)]
struct PostStore {
    posts: RwLock<Vec<Post>>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.json_logs);

    let store = InMemoryCredentialStore::load_json(&args.keys)
        .await
        .with_context(|| format!("loading key store {}", args.keys.display()))?;
    info!(keys = store.len(), "Loaded key store");

    let authn = ApiKeyAuthenticator::new(AuthConfig::from_env()?, Arc::new(store))?;
    let state = AppState::new(authn, ScopeAuthorizer::default());

    let router = build_router(state).layer(Extension(Arc::new(PostStore::default())));

    let config = ServerConfig {
        host: args.host,
        port: args.port,
    };
    serve(&config, router).await
}

fn build_router(state: AppState) -> axum::Router {
    let mut app = ScopedRouter::new(state);
    let posts = app.register(
        EndpointDescriptor::new("blog", "PostViewSet")
            .with_resource("posts")
            .with_handlers(["list", "create", "destroy"])
            .with_custom_action("publish"),
    );

    app.route("/posts", &posts, get(list_posts).post(create_post))
        .route("/posts/:id", &posts, delete(delete_post))
        .action("/posts/:id/publish", &posts, "publish", post(publish_post))
        .into_router()
}

async fn list_posts(Extension(store): Extension<Arc<PostStore>>) -> Json<Vec<Post>> {
    Json(store.posts.read().clone())
}

async fn create_post(
    Extension(store): Extension<Arc<PostStore>>,
    Extension(principal): Extension<Arc<Principal>>,
    Json(new): Json<NewPost>,
) -> (StatusCode, Json<Post>) {
    let mut posts = store.posts.write();
    let post = Post {
        id: posts.last().map_or(1, |p| p.id + 1),
        title: new.title,
        author: principal.id(),
        published: false,
    };
    posts.push(post.clone());
    (StatusCode::CREATED, Json(post))
}

async fn delete_post(
    Extension(store): Extension<Arc<PostStore>>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiError> {
    let mut posts = store.posts.write();
    let before = posts.len();
    posts.retain(|p| p.id != id);
    if posts.len() == before {
        return Err(ApiError::NotFound(format!("post {}", id)));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn publish_post(
    Extension(store): Extension<Arc<PostStore>>,
    Path(id): Path<u64>,
) -> Result<Json<Post>, ApiError> {
    let mut posts = store.posts.write();
    let post = posts
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or_else(|| ApiError::NotFound(format!("post {}", id)))?;
    post.published = true;
    Ok(Json(post.clone()))
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "scopegate_server=info,scopegate_api_server=info,scopegate_authz=info,tower_http=info".into()
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["scopegate-server", "--keys", "keys.json", "--port", "9090"]);
        assert_eq!(args.host, "0.0.0.0");
        assert_eq!(args.port, 9090);
        assert_eq!(args.keys, PathBuf::from("keys.json"));
        assert!(!args.json_logs);
    }
}
