/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use mathcms_api::{app::{build_router, AppState}, config::Config};
/// use mathcms_shared::store::Backend;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = sqlx::PgPool::connect(&config.database.url).await?;
/// let app = build_router(AppState::new(Backend::Postgres(pool), config));
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    middleware::{
        gate::{require_auth, Gate},
        security::SecurityHeadersLayer,
    },
    routes::{guard, resource, resource::Access},
    uploads::{UploadStore, DOCUMENTS, IMAGES},
};
use axum::{
    extract::{DefaultBodyLimit, FromRef},
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use mathcms_shared::{
    models::{
        category::Category, document::Document, event::Event, news::News,
        repository::Repository, researcher::Researcher, time_entry::TimeEntry, user::Role,
    },
    services::{
        crud::CrudService, dashboard::DashboardService, repositories::RepositoryService,
        users::UserService,
    },
    store::Backend,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Handlers extract the single service they need through `FromRef`.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub config: Arc<Config>,
    pub backend: Backend,

    pub news: CrudService<News>,
    pub events: CrudService<Event>,
    pub documents: CrudService<Document>,
    pub researchers: CrudService<Researcher>,
    pub categories: CrudService<Category>,
    pub time_entries: CrudService<TimeEntry>,

    /// Plain repository writes; reads go through `repositories`
    pub repository_crud: CrudService<Repository>,
    pub repositories: RepositoryService,

    pub dashboard: DashboardService,
    pub users: UserService,
    pub uploads: UploadStore,
}

impl AppState {
    pub fn new(backend: Backend, config: Config) -> Self {
        let news = CrudService::from_backend(&backend);
        let events = CrudService::from_backend(&backend);
        let documents = CrudService::from_backend(&backend);
        let researchers = CrudService::from_backend(&backend);
        let repository_crud = CrudService::from_backend(&backend);
        let categories = CrudService::from_backend(&backend);
        let time_entries = CrudService::from_backend(&backend);

        let dashboard = DashboardService::new(
            CrudService::clone(&news),
            CrudService::clone(&events),
            CrudService::clone(&documents),
            CrudService::clone(&researchers),
            CrudService::clone(&repository_crud),
            CrudService::clone(&categories),
            CrudService::clone(&time_entries),
        );
        let repositories = RepositoryService::new(
            CrudService::clone(&repository_crud),
            CrudService::clone(&researchers),
        );
        let users = UserService::from_backend(&backend, &config.jwt.secret, config.token_ttl());
        let uploads = UploadStore::new(config.uploads.dir.clone());

        Self {
            categories,
            time_entries,
            config: Arc::new(config),
            backend,
            news,
            events,
            documents,
            researchers,
            repository_crud,
            repositories,
            dashboard,
            users,
            uploads,
        }
    }
}

/// Builds the router with every route and the middleware stack
///
/// ```text
/// /
/// ├── GET /health
/// ├── /news, /events                  # generic CRUD, public reads
/// ├── /documents                      # + POST /upload, POST /:id/versions
/// ├── /researchers                    # + GET /leaderboard, POST /:id/avatar
/// ├── /repositories                   # populated reads, PUT /:id/visibility,
/// │                                   #   GET /owner/:researcherId
/// ├── /categories, /time-entries      # generic CRUD, token required for all verbs
/// ├── /uploads/images                 # POST (token)
/// ├── /admin/dashboard                # GET /, /activity, /researchers (admin)
/// └── /auth                           # POST /login, POST /register (admin), GET /me
/// ```
///
/// Middleware, outermost first: security headers, compression, CORS, tracing.
pub fn build_router(state: AppState) -> Router {
    use crate::routes::{auth, dashboard, documents, health, repositories, researchers, uploads};

    let gate = Gate::new(&state.config.jwt.secret);
    let admin = gate.role(Role::Admin);

    let document_files = DefaultBodyLimit::max(DOCUMENTS.body_limit());
    let image_files = DefaultBodyLimit::max(IMAGES.body_limit());

    let document_routes = resource::router::<Document>(&gate, Access::PublicReads)
        .route(
            "/upload",
            guard(post(uploads::upload_document).layer(document_files), &gate),
        )
        .route(
            "/:id/versions",
            guard(post(documents::add_version).layer(document_files), &gate),
        );

    let researcher_routes = resource::router::<Researcher>(&gate, Access::PublicReads)
        .route("/leaderboard", get(researchers::leaderboard))
        .route(
            "/:id/avatar",
            guard(post(researchers::upload_avatar).layer(image_files), &gate),
        );

    let repository_routes = Router::new()
        .route(
            "/",
            get(repositories::list).merge(guard(post(resource::create::<Repository>), &gate)),
        )
        .route("/search", get(resource::search::<Repository>))
        .route("/owner/:researcherId", get(repositories::by_owner))
        .route(
            "/:id",
            get(repositories::get_one).merge(guard(
                put(resource::update::<Repository>).delete(resource::remove::<Repository>),
                &gate,
            )),
        )
        .route(
            "/:id/visibility",
            guard(put(repositories::set_visibility), &gate),
        );

    let upload_routes = Router::new().route(
        "/images",
        guard(post(uploads::upload_image).layer(image_files), &gate),
    );

    let dashboard_routes = Router::new()
        .route("/", get(dashboard::stats))
        .route("/activity", get(dashboard::activity))
        .route("/researchers", get(dashboard::researchers))
        .route_layer(from_fn_with_state(admin.clone(), require_auth));

    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/register", guard(post(auth::register), &admin))
        .route("/me", guard(get(auth::me), &gate));

    let cors = if state.config.api.cors_origins.iter().any(|origin| origin == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/news", resource::router::<News>(&gate, Access::PublicReads))
        .nest("/events", resource::router::<Event>(&gate, Access::PublicReads))
        .nest("/documents", document_routes)
        .nest("/researchers", researcher_routes)
        .nest("/repositories", repository_routes)
        .nest("/categories", resource::router::<Category>(&gate, Access::Private))
        .nest("/time-entries", resource::router::<TimeEntry>(&gate, Access::Private))
        .nest("/uploads", upload_routes)
        .nest("/admin/dashboard", dashboard_routes)
        .nest("/auth", auth_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AdminConfig, ApiConfig, DatabaseConfig, JwtConfig, UploadConfig};

    fn config() -> Config {
        Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["https://math.example.org".to_string()],
                production: false,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/unused".to_string(),
                max_connections: 1,
            },
            jwt: JwtConfig {
                secret: "test-secret-key-at-least-32-bytes-long".to_string(),
                expiry_hours: 1,
            },
            uploads: UploadConfig {
                dir: std::env::temp_dir().join("mathcms-app-test"),
            },
            admin: Some(AdminConfig {
                email: "admin@math.example.org".to_string(),
                password: "bootstrap99".to_string(),
            }),
        }
    }

    #[test]
    fn test_state_extracts_services() {
        let state = AppState::new(Backend::memory(), config());

        let backend = Backend::from_ref(&state);
        assert_eq!(backend.name(), "memory");

        let uploads = UploadStore::from_ref(&state);
        assert!(uploads.root().ends_with("mathcms-app-test"));
    }

    #[test]
    fn test_router_builds_with_restricted_cors() {
        let _router = build_router(AppState::new(Backend::memory(), config()));
    }
}
