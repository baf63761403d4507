use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::database::{DatabaseError, DatabaseManager, MemoryStore, PgStore, Store};
use crate::handlers::{protected, public};
use crate::handlers::protected::resource::{routes, Access};
use crate::middleware::{authorize, Gate, GateState};
use crate::models::{
    AnnualConference, Attendance, Council, District, Family, History, LocalChurch, Membership, Ministry, User,
};
use crate::services::RecordService;
use crate::types::Role;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Store>,
    pub records: Arc<RecordService>,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, store: Arc<dyn Store>) -> Self {
        let records = Arc::new(RecordService::standard(store.clone()));
        Self { config, store, records }
    }

    /// PostgreSQL when `DATABASE_URL` is configured, the in-memory store otherwise
    pub async fn connect(config: Arc<AppConfig>) -> Result<Self, DatabaseError> {
        let store: Arc<dyn Store> = match &config.database.url {
            Some(_) => {
                let pool = DatabaseManager::connect(&config.database).await?;
                DatabaseManager::migrate(&pool).await?;
                Arc::new(PgStore::new(pool))
            }
            None => {
                tracing::warn!("DATABASE_URL not set, records are kept in memory only");
                Arc::new(MemoryStore::new())
            }
        };
        Ok(Self::new(config, store))
    }
}

const EVERYONE: &[Role] = Role::ALL;
const ADMIN: &[Role] = &[Role::Admin];
const ANNUAL_WRITERS: &[Role] = &[Role::Admin, Role::Annual];
const DISTRICT_WRITERS: &[Role] = &[Role::Admin, Role::Annual, Role::District];
const SCOPED_WRITERS: &[Role] = &[Role::Admin, Role::Annual, Role::District, Role::Local];

const ANNUAL_ACCESS: Access = Access {
    read: EVERYONE,
    create: ADMIN,
    update: ANNUAL_WRITERS,
    delete: ADMIN,
    own_entity_update: true,
};

const DISTRICT_ACCESS: Access = Access {
    read: EVERYONE,
    create: ANNUAL_WRITERS,
    update: DISTRICT_WRITERS,
    delete: ANNUAL_WRITERS,
    own_entity_update: false,
};

const CHURCH_ACCESS: Access = Access {
    read: EVERYONE,
    create: DISTRICT_WRITERS,
    update: SCOPED_WRITERS,
    delete: DISTRICT_WRITERS,
    own_entity_update: false,
};

/// Membership, ministry, family, council, attendance and history
const RECORD_ACCESS: Access = Access {
    read: EVERYONE,
    create: SCOPED_WRITERS,
    update: SCOPED_WRITERS,
    delete: SCOPED_WRITERS,
    own_entity_update: false,
};

const USER_ACCESS: Access = Access {
    read: ADMIN,
    create: ADMIN,
    update: ADMIN,
    delete: ADMIN,
    own_entity_update: false,
};

pub fn app(state: AppState) -> Router {
    let body_limit = state.config.api.max_request_size_bytes;
    let cors = cors_layer(&state.config);

    Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/auth/login", post(public::login))
        // Protected
        .merge(session_routes(&state))
        .merge(log_routes(&state))
        .nest("/annual", routes::<AnnualConference>(&state, ANNUAL_ACCESS))
        .nest("/district", routes::<District>(&state, DISTRICT_ACCESS))
        .nest("/localChurch", routes::<LocalChurch>(&state, CHURCH_ACCESS))
        .nest("/membership", routes::<Membership>(&state, RECORD_ACCESS))
        .nest("/ministry", routes::<Ministry>(&state, RECORD_ACCESS))
        .nest("/family", routes::<Family>(&state, RECORD_ACCESS))
        .nest("/council", routes::<Council>(&state, RECORD_ACCESS))
        .nest("/attendance", routes::<Attendance>(&state, RECORD_ACCESS))
        .nest("/history", routes::<History>(&state, RECORD_ACCESS))
        .nest("/user", routes::<User>(&state, USER_ACCESS))
        // Global middleware
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn session_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(protected::me))
        .route_layer(middleware::from_fn_with_state(GateState::new(state, Gate::new(EVERYONE)), authorize))
}

fn log_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/logs", get(protected::logs::list))
        .route("/logs/:id", get(protected::logs::show))
        .route_layer(middleware::from_fn_with_state(GateState::new(state, Gate::new(ADMIN)), authorize))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS];
    if config.security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::new().allow_origin(Any).allow_methods(methods).allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(methods)
        .allow_headers(Any)
}
