use crate::auth::otp::{LogNotifier, OtpNotifier};
use crate::auth::repo::{PgUserRepo, UserRepo};
use crate::config::AppConfig;
use crate::db::Database;
use crate::products::repo::{PgProductRepo, ProductRepo};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepo>,
    pub products: Arc<dyn ProductRepo>,
    pub notifier: Arc<dyn OtpNotifier>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn from_database(db: &Database, config: Arc<AppConfig>) -> Self {
        Self::from_parts(
            Arc::new(PgUserRepo::new(db.pool.clone())),
            Arc::new(PgProductRepo::new(db.pool.clone())),
            Arc::new(LogNotifier),
            config,
        )
    }

    pub fn from_parts(
        users: Arc<dyn UserRepo>,
        products: Arc<dyn ProductRepo>,
        notifier: Arc<dyn OtpNotifier>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            users,
            products,
            notifier,
            config,
        }
    }
}

#[cfg(test)]
pub use fake::{test_config, Fakes};
