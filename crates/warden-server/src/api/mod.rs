//! HTTP surface: routes under `/api/v1`, enveloped JSON responses.

pub mod extract;
pub mod handlers;
pub mod response;

use axum::Router;
use axum::routing::{get, post};
use surrealdb::Connection;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use warden_core::error::WardenError;

use crate::state::AppState;
use response::ApiError;

/// Routes only, with no middleware.
pub fn router<C: Connection>(state: AppState<C>) -> Router {
    let protected = Router::new()
        .route("/test", get(handlers::protected_test))
        .route("/getAllClients", get(handlers::list_clients::<C>))
        .route("/createClient", post(handlers::create_client::<C>))
        .route("/createClientUser", post(handlers::create_client_user::<C>))
        .route(
            "/clients/{client_id}/users",
            get(handlers::list_client_users::<C>),
        )
        .route(
            "/clients/{client_id}/config",
            get(handlers::get_client_config::<C>).put(handlers::put_client_config::<C>),
        );

    let v1 = Router::new()
        .route("/ping", get(handlers::ping))
        .route("/createUser", post(handlers::signup::<C>))
        .route("/login", post(handlers::login::<C>))
        .route("/client/userlogin", post(handlers::client_user_login::<C>))
        .route("/client/me", get(handlers::client_me))
        .nest("/protected", protected);

    Router::new()
        .nest("/api/v1", v1)
        .fallback(route_not_found)
        .with_state(state)
}

/// The full application: routes plus request tracing and CORS.
pub fn app<C: Connection>(state: AppState<C>) -> Router {
    router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn route_not_found() -> ApiError {
    ApiError(WardenError::not_found("Route not found"))
}
