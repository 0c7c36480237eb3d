//! Actix Web server hosting the gateway routes.

use crate::config::{DEFAULT_WORKERS, GatewayConfig};
use crate::error::{Error, Result};
use crate::gateway::dispatcher::Dispatcher;
use crate::gateway::http::auth::Authentication;
use crate::gateway::http::handlers;

use actix_cors::Cors;
use actix_web::{App, HttpServer, dev::ServerHandle, middleware, web::Data};
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Handle for a running HTTP gateway
pub struct HttpGatewayHandle {
    server: ServerHandle,
    task: JoinHandle<std::io::Result<()>>,
    addresses: Vec<SocketAddr>,
}

impl HttpGatewayHandle {
    /// Addresses the server is bound to
    pub fn addresses(&self) -> &[SocketAddr] {
        &self.addresses
    }

    /// Stop accepting connections and wait for the server to exit.
    ///
    /// Open interaction streams are given Actix's graceful shutdown window;
    /// the handlers behind them keep running in the dispatcher.
    pub async fn stop(self) {
        tracing::info!("Stopping HTTP gateway");
        self.server.stop(true).await;

        match self.task.await {
            Ok(Ok(())) => tracing::info!("HTTP gateway shut down"),
            Ok(Err(e)) => tracing::error!(error = %e, "HTTP gateway exited with an error"),
            Err(e) => tracing::error!(error = %e, "HTTP gateway task failed"),
        }
    }
}

/// HTTP gateway for command interactions
pub struct HttpGateway;

impl HttpGateway {
    /// Bind and start the gateway in a background task.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured address cannot be resolved or
    /// bound.
    pub fn start(config: GatewayConfig, dispatcher: Arc<Dispatcher>) -> Result<HttpGatewayHandle> {
        let addr_str = format!("{}:{}", config.address, config.port);
        let addr = addr_str
            .to_socket_addrs()
            .map_err(|e| Error::Other(format!("Failed to parse socket address: {}", e)))?
            .next()
            .ok_or_else(|| Error::Other(format!("Could not parse socket address: {}", addr_str)))?;

        let workers = config.workers.unwrap_or(DEFAULT_WORKERS);
        let config = Arc::new(config);
        let dispatcher = Data::new(dispatcher);

        tracing::info!(address = %addr_str, workers, "Starting HTTP gateway");

        let server_builder = HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(Authentication::new(config.clone()))
                .wrap(cors)
                .wrap(middleware::Logger::default())
                .app_data(dispatcher.clone())
                .configure(handlers::configure)
        })
        .workers(workers)
        .bind(addr)
        .map_err(|e| Error::Other(format!("Failed to bind server: {}", e)))?;

        let addresses = server_builder.addrs();
        let server = server_builder.run();
        let server_handle = server.handle();
        let task = tokio::spawn(server);

        tracing::info!(addresses = ?addresses, "HTTP gateway started");

        Ok(HttpGatewayHandle {
            server: server_handle,
            task,
            addresses,
        })
    }
}
