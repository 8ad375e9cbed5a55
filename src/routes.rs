// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{analytics, attempts, auth, practice, quiz},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Auth routes are public; everything else requires a bearer token.
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (pool, config, question supplier).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let quiz_routes = Router::new()
        .route("/topics", get(quiz::list_topics))
        .route("/start", post(quiz::start_quiz))
        .route("/answer", post(quiz::answer_question))
        .route("/finish", post(quiz::finish_quiz));

    let analytics_routes = Router::new()
        .route("/weak-areas", get(analytics::weak_areas))
        .route("/recommendations", get(analytics::recommendations))
        .route("/dashboard", get(analytics::dashboard));

    let protected = Router::new()
        .route("/practice", get(practice::practice_entry))
        .route("/attempts", get(attempts::list_my_attempts))
        .nest("/quiz", quiz_routes)
        .nest("/analytics", analytics_routes)
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api", protected)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
