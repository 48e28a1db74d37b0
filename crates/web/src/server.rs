//! HTTP server: routes and handlers for the to-do list pages

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Form, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::pages;
use crate::store::{list_url, ListId, ListStore, StoreError};

pub const DEFAULT_PLACEHOLDER: &str = "Enter a to-do item";

/// Web server configuration
#[derive(Debug, Clone)]
pub struct WebServerConfig {
    /// Placeholder text of the new item input box
    pub input_placeholder: String,
}

impl Default for WebServerConfig {
    fn default() -> Self {
        Self {
            input_placeholder: DEFAULT_PLACEHOLDER.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ListStore>,
    pub config: Arc<WebServerConfig>,
}

#[derive(Error, Debug)]
pub enum WebError {
    #[error("List not found: {0}")]
    NotFound(String),
}

impl From<ListId> for WebError {
    fn from(id: ListId) -> Self {
        WebError::NotFound(id.to_string())
    }
}

// Ids that are not numbers name no list, so they are 404s like unknown ones.
fn parse_list_id(raw: &str) -> Result<ListId, WebError> {
    raw.parse().map_err(|_| WebError::NotFound(raw.to_string()))
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self {
            WebError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()).into_response(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NewItemForm {
    #[serde(default)]
    pub item_text: String,
}

/// To-do list web server
pub struct WebServer {
    state: AppState,
}

impl WebServer {
    pub fn new(config: WebServerConfig) -> Self {
        Self::with_store(config, Arc::new(ListStore::new()))
    }

    /// Create a server backed by an existing store
    pub fn with_store(config: WebServerConfig, store: Arc<ListStore>) -> Self {
        Self {
            state: AppState {
                store,
                config: Arc::new(config),
            },
        }
    }

    pub fn store(&self) -> Arc<ListStore> {
        self.state.store.clone()
    }

    pub fn router(&self) -> Router {
        router(self.state.clone())
    }

    /// Bind `addr` and serve until the process exits
    pub async fn serve(self, addr: SocketAddr) -> anyhow::Result<()> {
        let listener = TcpListener::bind(addr).await?;
        info!("Listening on http://{}", listener.local_addr()?);
        axum::serve(listener, self.router()).await?;
        Ok(())
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve_listener<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
    }
}

pub async fn serve(addr: SocketAddr, cfg: WebServerConfig) -> anyhow::Result<()> {
    WebServer::new(cfg).serve(addr).await
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home_handler))
        .route("/health", get(health_handler))
        .route("/lists/new", post(new_list_handler))
        .route("/lists/:list_id", get(view_list_handler))
        .route("/lists/:list_id/", get(view_list_handler))
        .route("/lists/:list_id/add_item", post(add_item_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_handler() -> &'static str {
    "ok"
}

async fn home_handler(State(state): State<AppState>) -> Html<String> {
    Html(pages::home_page(&state.config.input_placeholder, None))
}

async fn new_list_handler(
    State(state): State<AppState>,
    Form(form): Form<NewItemForm>,
) -> Response {
    match state.store.create_list(&form.item_text) {
        Ok(id) => {
            info!("Started list {}", id);
            Redirect::to(&list_url(id)).into_response()
        }
        Err(e) => {
            warn!("Rejected new list: {}", e);
            let body = pages::home_page(&state.config.input_placeholder, Some(&e.to_string()));
            (StatusCode::BAD_REQUEST, Html(body)).into_response()
        }
    }
}

async fn view_list_handler(
    State(state): State<AppState>,
    Path(list_id): Path<String>,
) -> Result<Html<String>, WebError> {
    let id = parse_list_id(&list_id)?;
    let list = state.store.get(id).ok_or(WebError::from(id))?;
    Ok(Html(pages::list_page(&list, &state.config.input_placeholder, None)))
}

async fn add_item_handler(
    State(state): State<AppState>,
    Path(list_id): Path<String>,
    Form(form): Form<NewItemForm>,
) -> Result<Response, WebError> {
    let id = parse_list_id(&list_id)?;
    match state.store.add_item(id, &form.item_text) {
        Ok(_) => Ok(Redirect::to(&list_url(id)).into_response()),
        Err(StoreError::ListNotFound(id)) => Err(id.into()),
        Err(e @ StoreError::EmptyItem) => {
            warn!("Rejected item for list {}: {}", id, e);
            let list = state.store.get(id).ok_or(WebError::from(id))?;
            let body = pages::list_page(&list, &state.config.input_placeholder, Some(&e.to_string()));
            Ok((StatusCode::BAD_REQUEST, Html(body)).into_response())
        }
    }
}
