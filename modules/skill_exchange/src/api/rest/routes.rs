use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::{Extension, Router};
use modkit::api::OpenApiRegistry;
use utoipa::OpenApi;

use crate::api::rest::handlers;
use crate::api::rest::openapi::SkillExchangeApiDoc;
use crate::domain::ports::SessionGuard;
use crate::domain::service::Service;

/// Mounts the exchange routes on `router` and publishes their OpenAPI document.
pub fn register_routes(
    router: Router,
    openapi: &dyn OpenApiRegistry,
    service: Arc<Service>,
    guard: Arc<dyn SessionGuard>,
) -> anyhow::Result<Router> {
    let routes = Router::new()
        .route("/api/auth/signup", post(handlers::signup))
        .route("/api/auth/update", put(handlers::update_profile))
        .route("/api/user/request", post(handlers::send_request))
        .route("/api/user/myrequests", get(handlers::my_requests))
        .route("/api/user/accept", post(handlers::accept_request))
        .route("/api/user/decline", post(handlers::decline_request))
        .route("/api/user/delete-accepted", post(handlers::delete_accepted))
        .route("/api/user/send-message", post(handlers::send_message))
        .route("/api/user/get-messages/{userId}", get(handlers::get_messages))
        .route("/api/user/rate-user", post(handlers::rate_user))
        .route("/api/user/get-user/{id}", get(handlers::get_user))
        .route("/api/user/all", get(handlers::list_users))
        .layer(Extension(service))
        .layer(Extension(guard));

    openapi.merge_document(SkillExchangeApiDoc::openapi());
    Ok(router.merge(routes))
}
