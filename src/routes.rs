// src/routes.rs

use axum::{
    Router,
    http::Method,
    middleware,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    handlers::{admin, health, reports, responses},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Builds the HTTP surface.
///
/// * `/api/responses`: any signed-in student.
/// * `/api/admin/*`: signed-in and on the admin allowlist.
pub fn create_router(state: AppState) -> Router {
    // The quiz client is a static site served from another origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let response_routes = Router::new()
        .route("/", post(responses::submit_answer))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let admin_routes = Router::new()
        .route("/roster", post(admin::import_roster))
        .route("/reports/student", get(reports::student_report))
        .route(
            "/reports/student/document",
            get(reports::student_report_document),
        )
        .route("/reports/class", get(reports::class_report))
        .route("/stats", get(reports::class_stats))
        .route("/export/responses", get(reports::export_quiz_responses))
        // layers run bottom-up: authenticate, then check the allowlist
        .layer(middleware::from_fn_with_state(state.clone(), admin_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/", get(health::root))
        .route("/api/health", get(health::health))
        .nest("/api/responses", response_routes)
        .nest("/api/admin", admin_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
