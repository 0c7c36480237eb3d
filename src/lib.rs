/*!
 # Skipper

 A chat-ops bot for game servers running as containers.

 ## Overview

 Skipper lets members of a chat channel look after the server bound to that
 channel:
 - `/server status` shows whether the server's container is running
 - `/server logs` uploads the container's buffered stdout and stderr
 - `/server restart` stops, kills if needed, and restarts the container,
   editing a single message as each step is reached

 Each server is configured with a display name, a container reference and
 the channel it answers in. Restarts of the same container are serialised;
 everything else runs concurrently.

 ## Basic Usage

 ```no_run
 use skipper::{Result, Skipper};

 #[tokio::main]
 async fn main() -> Result<()> {
     // Load the file named by SKIPPER_CONFIG_FILE_PATH
     let skipper = Skipper::from_env()?;

     // Register the command group with the configured guild
     skipper.install_commands().await?;

     // Serve interactions until Ctrl-C or SIGTERM
     skipper.serve().await
 }
 ```

 ## Modules

 - `config` - Configuration loading and validation
 - `registry` - Channel to server lookup
 - `runtime` - Container runtime capability and its Docker implementation
 - `lifecycle` - Status, logs and the restart state machine
 - `gateway` - Command handling, dispatch and the HTTP gateway
*/

pub mod config;
pub mod error;
pub mod gateway;
pub mod lifecycle;
pub mod registry;
pub mod runtime;

pub use config::Config;
pub use error::{Error, Result};
pub use gateway::{Command, CommandHandler, Dispatcher, Interaction, Reply};
pub use lifecycle::{RestartOutcome, ServerLifecycleController};
pub use registry::ServerRegistry;
pub use runtime::{ContainerRuntime, DockerRuntime};

use gateway::CommandInstaller;
use gateway::http::HttpGateway;
use std::path::Path;
use std::sync::Arc;

/// Wires the configuration, container runtime and gateway together.
///
/// This struct is the main entry point of the bot.
/// All public methods are instrumented with `tracing` spans.
pub struct Skipper {
    /// Validated configuration
    config: Config,
    /// Lifecycle controller shared by all handlers
    controller: Arc<ServerLifecycleController>,
    /// Task-per-invocation dispatcher
    dispatcher: Arc<Dispatcher>,
}

impl Skipper {
    /// Create Skipper from a configuration file path
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument(skip(path), fields(config_path = ?path.as_ref()))]
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self> {
        tracing::info!("Loading configuration from file");
        let config = Config::from_file(path)?;
        Self::new(config)
    }

    /// Create Skipper from the file named by `SKIPPER_CONFIG_FILE_PATH`
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument]
    pub fn from_env() -> Result<Self> {
        tracing::info!(variable = config::CONFIG_PATH_ENV, "Loading configuration from environment");
        let config = Config::from_env()?;
        Self::new(config)
    }

    /// Create Skipper talking to the Docker endpoint named in `config`
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument(skip(config), fields(num_servers = config.servers.len()))]
    pub fn new(config: Config) -> Result<Self> {
        config::validate_config(&config)?;
        let runtime = DockerRuntime::connect(&config.docker_endpoint)?;
        tracing::debug!(endpoint = runtime.endpoint(), "Using Docker runtime");
        Ok(Self::assemble(config, Arc::new(runtime)))
    }

    /// Create Skipper over an explicit container runtime
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument(skip(config, runtime), fields(num_servers = config.servers.len()))]
    pub fn with_runtime(config: Config, runtime: Arc<dyn ContainerRuntime>) -> Result<Self> {
        config::validate_config(&config)?;
        Ok(Self::assemble(config, runtime))
    }

    fn assemble(config: Config, runtime: Arc<dyn ContainerRuntime>) -> Self {
        let registry = Arc::new(ServerRegistry::from_config(&config));
        let controller = Arc::new(ServerLifecycleController::new(registry, runtime));
        let handler = Arc::new(CommandHandler::new(Arc::clone(&controller)));
        let dispatcher = Arc::new(Dispatcher::new(handler));

        tracing::info!(servers = config.servers.len(), "Skipper created");
        Self {
            config,
            controller,
            dispatcher,
        }
    }

    /// The configuration Skipper was created with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The lifecycle controller
    pub fn controller(&self) -> Arc<ServerLifecycleController> {
        Arc::clone(&self.controller)
    }

    /// The dispatcher gateways hand interactions to
    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        Arc::clone(&self.dispatcher)
    }

    /// Run the HTTP gateway until a shutdown signal arrives.
    ///
    /// On shutdown the gateway stops accepting requests first, then any
    /// in-flight interactions (restarts included) are allowed to finish.
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument(skip(self))]
    pub async fn serve(&self) -> Result<()> {
        let gateway = HttpGateway::start(self.config.gateway(), self.dispatcher())?;
        tracing::info!(addresses = ?gateway.addresses(), "Skipper is ready");

        shutdown_signal().await;
        tracing::info!("Shutdown signal received");

        gateway.stop().await;
        self.dispatcher.shutdown().await;

        tracing::info!("Skipper stopped");
        Ok(())
    }

    /// Register the `server` command group with the configured guild.
    ///
    /// Returns the number of commands the platform accepted.
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument(skip(self))]
    pub async fn install_commands(&self) -> Result<usize> {
        let installer = CommandInstaller::new(&self.config)?;
        installer.install().await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
