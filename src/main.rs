//! harmony-bridge main entry point
//!
//! This binary builds the router from configuration, registers the built-in
//! modules, and runs single requests or batch documents through it from the
//! command line.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use harmony_bridge::{
    config::Config,
    handlers::InfrastructureModule,
    router::{RawRequest, RawResponse},
    Method, Router, APP_NAME, VERSION,
};

const DEFAULT_CONFIG_PATH: &str = "bridge.toml";

/// In-process request router with batch execution
#[derive(Parser, Debug)]
#[command(name = APP_NAME, version = VERSION, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List registered routes
    Routes,

    /// Dispatch a single request
    Dispatch {
        /// Request method (GET, POST, PUT, DELETE)
        method: String,

        /// Request path, optionally with a query string
        path: String,

        /// Query parameter as key=value (repeatable)
        #[arg(short, long = "query", value_parser = parse_key_value)]
        query: Vec<(String, String)>,

        /// JSON request body
        #[arg(short, long)]
        body: Option<String>,
    },

    /// Run a batch document from a file, or `-` for stdin
    Batch {
        /// Batch document path
        file: String,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    debug!("Starting {} v{}", APP_NAME, VERSION);

    // Execute command
    if let Err(e) = run(cli) {
        error!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Initialize structured logging with tracing
///
/// Logs go to stderr so that response bodies on stdout stay parseable.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Run the CLI command
fn run(cli: Cli) -> anyhow::Result<()> {
    if let Commands::Version = cli.command {
        println!("{} v{}", APP_NAME, VERSION);
        return Ok(());
    }

    let config = load_config(&cli.config)?;
    let router = build_router(&config);

    let result = match cli.command {
        Commands::Routes => {
            for key in router.routes() {
                println!("{}", key);
            }
            Ok(())
        }
        Commands::Dispatch {
            method,
            path,
            query,
            body,
        } => {
            let method = Method::parse(&method)?;
            let mut request = RawRequest::new(method, &path);
            request.query.extend(query);
            if let Some(body) = body {
                request = request.with_body(body);
            }
            print_response(&router.dispatch(request));
            Ok(())
        }
        Commands::Batch { file } => {
            let document = read_document(&file)?;
            let request = RawRequest::new(Method::Post, "/batch").with_body(document);
            print_response(&router.dispatch(request));
            Ok(())
        }
        Commands::Version => Ok(()),
    };

    router.shutdown();
    result
}

/// Load configuration; a missing file at the default path means defaults
fn load_config(path: &str) -> anyhow::Result<Config> {
    if path == DEFAULT_CONFIG_PATH && !Path::new(path).exists() {
        debug!("No {} found, using default configuration", path);
        return Ok(Config::default());
    }

    info!("Loading configuration from {}", path);
    Config::from_file(path).with_context(|| format!("Failed to load configuration from {}", path))
}

/// Build the router and register the built-in modules
fn build_router(config: &Config) -> Arc<Router> {
    let router = Arc::new(Router::from_config(&config.server));
    router.register_module(Arc::new(InfrastructureModule::new(config)));
    info!("Router ready with {} route(s)", router.routes().len());
    router
}

fn read_document(file: &str) -> anyhow::Result<String> {
    if file == "-" {
        let mut document = String::new();
        std::io::stdin()
            .read_to_string(&mut document)
            .context("Failed to read batch document from stdin")?;
        return Ok(document);
    }

    std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file))
}

fn print_response(response: &RawResponse) {
    println!("{}", response.status);
    println!("{}", response.body);
}

fn parse_key_value(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{}'", arg)),
    }
}
