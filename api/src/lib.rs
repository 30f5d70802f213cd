use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;

pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod server;
pub mod uploads;

use authz::PolicyEngine;
use database::Database;
use notify::Mailer;
use user::TokenService;

pub use server::{spawn_server, start_server, ApiConfig};
pub use uploads::UploadConfig;

/// Uploads can carry datasets, so the default 2 MB body cap is far too low.
const BODY_LIMIT: usize = 50 * 1024 * 1024;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub tokens: Arc<TokenService>,
    pub policy: Arc<PolicyEngine>,
    pub mailer: Arc<Mailer>,
    pub uploads: Arc<UploadConfig>,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health_check,
        handlers::session::login,
    ),
    components(
        schemas(
            models::HealthResponse,
            models::LoginRequest,
            models::TokenResponse,
            error::ApiErrorResponse,
        )
    ),
    tags(
        (name = "session", description = "Login and token issuing"),
        (name = "health", description = "Health check endpoints"),
    ),
    info(
        title = "Lab Website API",
        version = "1.0.0",
        description = "Public site reads and the authenticated dashboard API",
    ),
)]
pub struct ApiDoc;

/// Create the main router: the public site, the authenticated `/api`
/// surface, static images and the API docs.
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/profile",
            get(handlers::profile::get_profile).put(handlers::profile::put_profile),
        )
        .route("/avatar", post(handlers::profile::upload_avatar))
        .route(
            "/password",
            post(handlers::profile::change_password).delete(handlers::profile::reset_password),
        )
        .route(
            "/education",
            post(handlers::profile::add_education).delete(handlers::profile::delete_education),
        )
        .route(
            "/award",
            post(handlers::profile::add_award).delete(handlers::profile::delete_award),
        )
        .route(
            "/publication",
            post(handlers::profile::add_publication)
                .delete(handlers::profile::delete_publication),
        )
        .route(
            "/user",
            get(handlers::users::list_users)
                .post(handlers::users::upsert_user)
                .delete(handlers::users::delete_user),
        )
        .route(
            "/group",
            get(handlers::groups::get_groups)
                .post(handlers::groups::upsert_group)
                .delete(handlers::groups::delete_group),
        )
        .route(
            "/news",
            get(handlers::bulletins::news_list)
                .post(handlers::bulletins::news_upsert)
                .delete(handlers::bulletins::news_delete),
        )
        .route(
            "/achievement",
            get(handlers::bulletins::achievement_list)
                .post(handlers::bulletins::achievement_upsert)
                .delete(handlers::bulletins::achievement_delete),
        )
        .route(
            "/blog",
            get(handlers::blogs::blog_list)
                .post(handlers::blogs::blog_upsert)
                .delete(handlers::blogs::blog_delete),
        )
        .route("/image", post(handlers::files::upload_images))
        .route(
            "/carousel_image",
            get(handlers::files::carousel_list)
                .post(handlers::files::carousel_upload)
                .delete(handlers::files::carousel_delete),
        )
        .route(
            "/doc",
            get(handlers::files::docs_list)
                .post(handlers::files::upload_docs)
                .delete(handlers::files::doc_delete),
        )
        .route(
            "/file",
            get(handlers::files::file_download).delete(handlers::files::file_delete),
        )
        .route("/health", get(handlers::health::health_check))
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }));

    Router::new()
        .route("/", get(handlers::public::home))
        .route("/member", get(handlers::public::member))
        .route("/showmember", get(handlers::public::show_member))
        .route("/news", get(handlers::public::news))
        .route("/achievement", get(handlers::public::achievement))
        .route("/activity", get(handlers::public::activity))
        .route("/download", get(handlers::public::download))
        .route("/file", get(handlers::public::file_download))
        .route("/login", post(handlers::session::login))
        .route("/signup", post(handlers::session::signup))
        .nest("/api", api)
        .nest_service("/images", ServeDir::new(state.uploads.images_dir()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .with_state(state)
}
