use std::sync::Arc;

use axum::Router;
use modkit::api::{LinkGenerator, RouteTable};
use tracing::{debug, info};

use crate::api::rest::routes;
use crate::config::UsersConfig;
use crate::domain::repo::UsersRepository;
use crate::domain::service::{Service, ServiceConfig};
use crate::infra::storage::memory_repo::InMemoryUsersRepository;

/// Users resource module: wires the repository into the domain service and
/// mounts the REST routes.
#[derive(Clone)]
pub struct UsersModule {
    config: UsersConfig,
    service: Arc<Service>,
}

impl UsersModule {
    pub fn new(config: UsersConfig, repo: Arc<dyn UsersRepository>) -> Self {
        info!("Initializing users module");
        debug!(
            "Loaded users config: base_path={}, default_page_size={}",
            config.base_path, config.default_page_size
        );

        let service = Service::new(
            repo,
            ServiceConfig {
                default_page_size: config.effective_page_size(),
            },
        );
        Self {
            config,
            service: Arc::new(service),
        }
    }

    /// Module backed by the in-process repository.
    pub fn in_memory(config: UsersConfig) -> Self {
        Self::new(config, Arc::new(InMemoryUsersRepository::new()))
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    pub fn base_path(&self) -> String {
        self.config.normalized_base_path()
    }

    /// Register the REST routes on `router`, recording them in `table`.
    pub fn register_rest(
        &self,
        router: Router,
        table: Arc<RouteTable>,
        links: Arc<dyn LinkGenerator>,
    ) -> Router {
        info!("Registering users REST routes");
        let base_path = self.base_path();
        let router = routes::register_routes(router, table, links, self.service(), &base_path);
        info!(%base_path, "Users REST routes registered successfully");
        router
    }
}
