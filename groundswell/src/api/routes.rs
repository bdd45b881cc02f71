use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::{frontend, handlers, AppState};

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/assistant", post(handlers::newsletter::create_newsletter))
        .route("/assistant/status", post(handlers::status::check_status))
        .route(
            "/assistant/status/serverless",
            post(handlers::status::serverless),
        )
        .route("/tavily", get(handlers::search::passthrough))
        .route("/health", get(handlers::health::health_check));

    Router::new()
        .route("/", get(frontend::serve_root))
        .route("/{*path}", get(frontend::serve_path))
        .nest("/api", api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
