// app.rs - Router assembly
//
// Three security tiers, same as the handler tree:
// Public (optional token) → Protected (/api, JWT + live user check) → Elevated (/api/admin, staff only)

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, post},
    Router,
};
use sqlx::PgPool;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::{self, AppConfig};
use crate::handlers::{elevated, protected, public};
use crate::media::MediaStore;
use crate::middleware::{jwt_auth_middleware, require_staff_middleware, validate_user_middleware};

/// Shared handles every handler can reach through `State`
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub media: MediaStore,
}

impl AppState {
    pub fn new(pool: PgPool, media: MediaStore) -> Self {
        Self { pool, media }
    }
}

pub fn router(state: AppState) -> Router {
    let config = config::config();
    let media_service = ServeDir::new(state.media.root());
    let media_prefix = state.media.url_prefix().to_string();

    let mut app = Router::new()
        .merge(public_routes())
        .nest("/api", api_routes(state.clone()))
        .nest_service(&media_prefix, media_service)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.server.max_request_size_bytes))
        .layer(TraceLayer::new_for_http());

    if config.security.enable_cors {
        app = app.layer(cors_layer(config));
    }

    app.with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(public::blog::index))
        .route("/posts/:id", get(public::blog::post_detail))
        .route("/category/:slug", get(public::blog::category_posts))
        .route("/profile/:username", get(public::blog::profile))
        .route("/pages/about", get(public::pages::about))
        .route("/pages/rules", get(public::pages::rules))
        .route("/auth/registration", post(public::auth::registration))
        .route("/auth/login", post(public::auth::login))
        .route("/health", get(public::health::health))
}

fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/whoami", get(protected::auth::whoami))
        .route("/profile", get(protected::profile::show).patch(protected::profile::update))
        .route("/posts", post(protected::posts::create))
        .route(
            "/posts/:id",
            patch(protected::posts::update).delete(protected::posts::delete),
        )
        .route("/posts/:id/comments", post(protected::comments::create))
        .route(
            "/posts/:id/comments/:comment_id",
            patch(protected::comments::update).delete(protected::comments::delete),
        )
        .nest("/admin", admin_routes())
        // Layers run bottom-up: token first, then the live user check
        .layer(from_fn_with_state(state, validate_user_middleware))
        .layer(from_fn(jwt_auth_middleware))
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/:model",
            get(elevated::admin::list).post(elevated::admin::create),
        )
        .route(
            "/:model/:id",
            patch(elevated::admin::update).delete(elevated::admin::delete),
        )
        .layer(from_fn(require_staff_middleware))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if config.security.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::permissive().allow_origin(AllowOrigin::list(origins))
}
