use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{
    middleware,
    routing::{post, put},
    Router,
};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod response;
pub mod users;

pub use auth::IssuedToken;
pub use response::{ApiResponse, AppError, ErrorResponse};
pub use users::{Gender, User};

pub const SEED_ACCOUNT: &str = "admin";
pub const SEED_PASSWORD: &str = "admin123";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// How long an issued token stays valid.
    pub token_ttl: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            token_ttl: Duration::from_secs(3600),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(secs) = std::env::var("TOKEN_TTL_SECS").ok().and_then(|v| v.parse().ok()) {
            config.token_ttl = Duration::from_secs(secs);
        }
        config
    }
}

#[derive(Debug, Default)]
pub struct Store {
    pub users: Vec<User>,
    pub tokens: HashMap<String, IssuedToken>,
}

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<RwLock<Store>>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let store = Store {
            users: vec![users::seed_admin()],
            tokens: HashMap::new(),
        };
        Self {
            db: Arc::new(RwLock::new(store)),
            config: Arc::new(config),
        }
    }
}

pub fn app() -> Router {
    app_with(ServerConfig::default())
}

pub fn app_with(config: ServerConfig) -> Router {
    let state = AppState::new(config);

    let protected = Router::new()
        .route("/users", axum::routing::get(users::list_users).post(users::create_user))
        .route("/users/{id}", put(users::update_user).delete(users::delete_user))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_auth));

    let api = Router::new()
        .route("/auth/login", post(auth::login))
        .merge(protected)
        .fallback(not_found);

    Router::new()
        .nest("/api", api)
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, ServerConfig::default()).await
}

pub async fn run_with(listener: TcpListener, config: ServerConfig) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(config)).await
}

async fn not_found() -> AppError {
    AppError::NotFound
}

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
