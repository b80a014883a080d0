use axum::{
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, put},
    Router,
};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use super::handlers::{self, AppState};
use crate::adapters::config::ProxyConfig;
use crate::adapters::edge::EdgeFunctionClient;
use crate::application::AppResult;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route(
            "/api/todos",
            get(handlers::list_todos).post(handlers::create_todo),
        )
        .route(
            "/api/todos/:id",
            put(handlers::update_todo).delete(handlers::delete_todo),
        )
        .layer(middleware::from_fn(trace_request))
        .with_state(state)
}

// One span per request so upstream logs can be tied back to the call that caused them.
async fn trace_request(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!(
        "request",
        %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    );

    async move {
        let response = next.run(request).await;
        tracing::info!(status = %response.status(), "handled");
        response
    }
    .instrument(span)
    .await
}

/// Binds the configured address and serves until the process is stopped.
pub async fn serve(config: ProxyConfig) -> AppResult<()> {
    let store = Arc::new(EdgeFunctionClient::new(&config)?);
    let app = router(AppState::new(store));

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server running on {} (upstream {})", addr, config.function_url());

    axum::serve(listener, app).await?;
    Ok(())
}
