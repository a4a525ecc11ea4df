use anyhow::{anyhow, Context, Result};
use api_ingress::{ApiIngress, ApiIngressConfig};
use axum::Router;
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use modkit::api::{LinkGenerator, RouteLinks, RouteTable};
use runtime::{AppConfig, CliArgs};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use users::{UsersConfig, UsersModule};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Users Server - REST service for the user resource
#[derive(Parser)]
#[command(name = "users-server")]
#[command(about = "Users Server - REST service for the user resource")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // CLI args passed down to config/app
    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;

    // Apply CLI overrides (port / verbosity)
    config.apply_cli_overrides(&args);

    // Print config and exit if requested
    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    // Initialize logging
    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    runtime::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Users Server starting");

    // Execute command
    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(config),
    }
}

/// Typed module sections, validated together.
struct ModuleConfigs {
    ingress: ApiIngressConfig,
    users: UsersConfig,
    public_url: String,
}

fn module_configs(config: &AppConfig) -> Result<ModuleConfigs> {
    let ingress: ApiIngressConfig = config.module_config(api_ingress::MODULE_NAME)?;
    let users: UsersConfig = config.module_config(users::MODULE_NAME)?;
    let public_url = ingress.public_url_or(&config.server.host, config.server.port);
    Ok(ModuleConfigs {
        ingress,
        users,
        public_url,
    })
}

async fn resolve_listen_addr(host: &str, port: u16) -> Result<SocketAddr> {
    tokio::net::lookup_host((host, port))
        .await
        .with_context(|| format!("cannot resolve listen address {host}:{port}"))?
        .next()
        .ok_or_else(|| anyhow!("no address found for {host}:{port}"))
}

async fn run_server(config: AppConfig) -> Result<()> {
    tracing::info!("Initializing modules...");
    let modules = module_configs(&config)?;

    // Route table is shared by link generation and the Allow header
    let table = Arc::new(RouteTable::new());
    let links: Arc<dyn LinkGenerator> =
        Arc::new(RouteLinks::parse(&modules.public_url, table.clone())?);
    tracing::info!(public_url = %modules.public_url, "Link base configured");

    let users = UsersModule::in_memory(modules.users);
    let module_routes = users.register_rest(Router::new(), table.clone(), links);
    for op in table.operations() {
        tracing::debug!(
            method = %op.method,
            path = %op.path,
            operation_id = op.operation_id.as_deref().unwrap_or("-"),
            summary = op.summary.as_deref().unwrap_or("-"),
            "Route registered"
        );
    }

    let ingress = ApiIngress::new(modules.ingress, config.server.timeout_sec);
    let router = ingress.build_router(module_routes);

    let addr = resolve_listen_addr(&config.server.host, config.server.port).await?;
    let shutdown = async {
        if let Err(e) = api_ingress::shutdown::wait_for_shutdown().await {
            tracing::error!(error = %e, "Signal handling failed; shutting down");
        }
    };
    ingress.serve(router, addr, shutdown).await?;

    tracing::info!("Users Server stopped");
    Ok(())
}

fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    // AppConfig::load_* already normalized & created home_dir
    let modules = module_configs(&config)?;
    RouteLinks::parse(&modules.public_url, Arc::new(RouteTable::new()))?;

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("Server config:");
    println!("{}", config.to_yaml()?);

    Ok(())
}
