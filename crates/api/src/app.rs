use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, patch, post},
    Router,
};
use shared::jwt::{JwtConfig, JwtError};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, require_user_auth,
    security_headers_middleware, trace_id, RateLimiterState,
};
use crate::routes::{
    auth, dashboard, health, members, organizations, questions, submissions, templates, users,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
    pub jwt: Arc<JwtConfig>,
}

/// Builds the router. Fails when the configured JWT keys cannot be parsed.
pub fn create_app(config: Config, pool: PgPool) -> Result<Router, JwtError> {
    let jwt = JwtConfig::from_rsa_pem(
        &config.jwt.private_key,
        &config.jwt.public_key,
        config.jwt.access_token_expiry_secs,
        config.jwt.refresh_token_expiry_secs,
        config.jwt.leeway_secs,
    )?;

    let config = Arc::new(config);

    let state = AppState {
        pool,
        rate_limiter: RateLimiterState::new(config.security.rate_limit_per_minute).map(Arc::new),
        config: config.clone(),
        jwt: Arc::new(jwt),
    };

    let cors = if config.security.cors_origins.is_empty() {
        // Development: any origin
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    const ORG: &str = "/api/v1/organizations/:org_id";

    // Tenant routes resolve membership through the OrgContext extractor
    let tenant_routes = Router::new()
        .route(ORG, get(organizations::get_organization))
        .route(
            &format!("{ORG}/members"),
            get(members::list_members).post(members::add_member),
        )
        .route(
            &format!("{ORG}/members/:user_id"),
            patch(members::update_member).delete(members::remove_member),
        )
        .route(
            &format!("{ORG}/questions"),
            get(questions::list_questions).post(questions::create_question),
        )
        .route(
            &format!("{ORG}/questions/:id"),
            get(questions::get_question)
                .patch(questions::update_question)
                .delete(questions::delete_question),
        )
        .route(
            &format!("{ORG}/templates"),
            get(templates::list_templates).post(templates::create_template),
        )
        .route(
            &format!("{ORG}/templates/:id"),
            get(templates::get_template)
                .put(templates::update_template)
                .delete(templates::delete_template),
        )
        .route(
            &format!("{ORG}/templates/:id/schema"),
            get(templates::get_template_schema),
        )
        .route(
            &format!("{ORG}/submissions"),
            get(submissions::list_submissions).post(submissions::create_submission),
        )
        .route(
            &format!("{ORG}/submissions/export"),
            get(submissions::export_submissions),
        )
        .route(
            &format!("{ORG}/submissions/aggregate"),
            get(submissions::aggregate_submissions),
        )
        .route(
            &format!("{ORG}/submissions/:id"),
            get(submissions::get_submission).delete(submissions::delete_submission),
        )
        .route(&format!("{ORG}/dashboard"), get(dashboard::get_dashboard));

    // Middleware order: auth runs first, then rate limiting (keyed on the user)
    let user_routes = Router::new()
        .route("/api/v1/users/me", get(users::get_current_user))
        .route(
            "/api/v1/organizations",
            get(organizations::list_organizations).post(organizations::create_organization),
        )
        .merge(tenant_routes)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_user_auth,
        ));

    let auth_routes = Router::new()
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/refresh", post(auth::refresh))
        .route("/api/v1/auth/logout", post(auth::logout));

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    // Global middleware (order matters: bottom layers run first)
    Ok(Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(user_routes)
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state))
}
