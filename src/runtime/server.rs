//! Server mode
//!
//! Builds the relay application from an explicit [`StaticConfig`] and runs
//! it until actix-web's signal handling stops it.

use actix_web::{App, HttpServer, http::header, middleware::DefaultHeaders, web};
use anyhow::Result;
use tracing::{info, warn};

use crate::api::middleware::{AccessLog, RequestContextMiddleware};
use crate::api::services::{RelayState, relay_routes};
use crate::config::StaticConfig;
use crate::errors::RelayError;

/// Upper bound on worker threads regardless of configuration
const MAX_WORKERS: usize = 32;

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server(config: StaticConfig) -> Result<()> {
    let state = web::Data::new(RelayState::from_config(&config));
    let workers = config.server.workers.clamp(1, MAX_WORKERS);
    let bind_address = format!("{}:{}", config.server.host, config.server.port);

    if !config.proxy.trusted_proxies.is_empty() {
        info!(
            "Trusting forwarding headers from: {:?}",
            config.proxy.trusted_proxies
        );
    }
    warn!("Redirect destinations are not restricted to an allow-list");

    let trusted_proxies = config.proxy.trusted_proxies.clone();
    let server = HttpServer::new(move || {
        App::new()
            .wrap(AccessLog)
            // 外层，access log 落在 request span 内
            .wrap(RequestContextMiddleware::new(trusted_proxies.clone()))
            .wrap(DefaultHeaders::new().add((header::CACHE_CONTROL, "no-store")))
            .app_data(state.clone())
            .service(relay_routes())
    })
    .workers(workers)
    .shutdown_timeout(config.server.shutdown_timeout)
    .bind(bind_address.as_str())
    .map_err(|e| RelayError::server_bind(format!("{}: {}", bind_address, e)))?;

    info!(
        "Starting server at http://{} with {} workers",
        bind_address, workers
    );
    server.run().await?;

    info!("Server stopped");
    Ok(())
}
