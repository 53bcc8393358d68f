use std::sync::Arc;

use crate::config::Config;
use crate::db::repository::SharedRepository;
use crate::middleware::auth::{create_permission_cache, PermissionCache};

#[derive(Clone)]
pub struct AppState {
    pub repo: SharedRepository,
    pub config: Arc<Config>,
    pub permission_cache: PermissionCache,
}

impl AppState {
    pub fn new(repo: SharedRepository, config: Config) -> Self {
        Self {
            repo,
            config: Arc::new(config),
            permission_cache: create_permission_cache(),
        }
    }
}
