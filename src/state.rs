use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::rate_limit::LoginRateLimiter;
use crate::storage::BlobStore;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub storage: Arc<dyn BlobStore>,
    pub login_limiter: LoginRateLimiter,
}
