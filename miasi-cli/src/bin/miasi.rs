use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use miasi_cli::{
    api_client::ApiClient,
    config::{load_app_config, parse_assignment, read_payload},
};
use miasi_core::{
    CompiledExpression, SubmissionService, Value, Variables,
    catalog::{self, Catalog, CatalogStore, local_fs::LocalFsCatalog, sample::sample_catalog},
    config::{AppConfig, CatalogConfig},
    lint::lint_catalog,
};
use miasi_http::server::{ServerConfig, start_server};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the application config file (JSON)
    #[arg(short, long, env = "MIASI_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// API server URL; `submit` and `systems` go through the API when set
    #[arg(long, short = 'u', env = "MIASI_API_URL", global = true)]
    api_url: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Host address to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },

    /// Write the sample catalog to a file
    Seed {
        /// Catalog file to create
        #[arg(default_value = "catalog.json")]
        path: PathBuf,

        /// Replace an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Check a catalog for defective formulas, conditions and fields
    Check {
        /// Catalog file; defaults to the configured catalog
        path: Option<PathBuf>,
    },

    /// Evaluate an expression, e.g. `miasi eval "weight / height ** 2" weight=70 height=1.75`
    Eval {
        expression: String,

        /// Variables as name=value
        #[arg(value_parser = parse_assignment)]
        variables: Vec<(String, Value)>,
    },

    /// Submit form data to a system
    Submit {
        system_id: i64,

        /// JSON object, `@file` or `-` for stdin
        payload: String,
    },

    /// List the systems of the catalog
    Systems,
}

async fn open_catalog(config: &AppConfig) -> anyhow::Result<Catalog> {
    match &config.catalog {
        CatalogConfig::InMemory => Ok(sample_catalog()),
        CatalogConfig::LocalFs { path } => LocalFsCatalog::new(path.clone())
            .load()
            .await
            .with_context(|| format!("Failed to read catalog {}", path.display())),
    }
}

fn output_json<T: serde::Serialize>(data: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}

async fn seed(path: &PathBuf, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        bail!("{} already exists, use --force to replace it", path.display());
    }
    LocalFsCatalog::new(path.clone()).save(&sample_catalog()).await?;
    println!("Wrote sample catalog to {}", path.display());
    Ok(())
}

async fn check(path: Option<&PathBuf>, config: &AppConfig) -> anyhow::Result<()> {
    let catalog = match path {
        Some(path) => LocalFsCatalog::new(path.clone())
            .load()
            .await
            .with_context(|| format!("Failed to read catalog {}", path.display()))?,
        None => open_catalog(config).await?,
    };

    let issues = lint_catalog(&catalog, &config.engine);
    if issues.is_empty() {
        println!("{} systems checked, no issues found", catalog.systems.len());
        return Ok(());
    }
    for issue in &issues {
        println!("{}", issue);
    }
    bail!("{} issue(s) found", issues.len())
}

fn eval(expression: &str, variables: &[(String, Value)], config: &AppConfig) -> anyhow::Result<()> {
    let variables: Variables = variables.iter().cloned().collect();
    let compiled =
        CompiledExpression::compile_with_limit(expression, config.engine.max_expression_depth)?;
    let value = compiled.evaluate(&variables)?;
    println!("{}", value);
    Ok(())
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = load_app_config(cli.config.as_deref())?;

    match &cli.command {
        Commands::Serve { host, port } => {
            let server_config = ServerConfig {
                host: host.clone(),
                port: *port,
                engine: config.engine,
                catalog: config.catalog,
            };
            info!("Starting MIASI HTTP server on {}:{}", host, port);
            start_server(server_config)
                .await
                .map_err(|e| anyhow::anyhow!("{}", e))?;
        }

        Commands::Seed { path, force } => seed(path, *force).await?,

        Commands::Check { path } => check(path.as_ref(), &config).await?,

        Commands::Eval {
            expression,
            variables,
        } => eval(expression, variables, &config)?,

        Commands::Submit { system_id, payload } => {
            let payload = read_payload(payload).context("Failed to read payload")?;
            let outcome = match &cli.api_url {
                Some(url) => ApiClient::new(url).submit(*system_id, &payload).await?,
                None => {
                    let service =
                        SubmissionService::new(catalog::open(&config.catalog), config.engine);
                    service.submit(*system_id, &payload).await?
                }
            };
            output_json(&outcome)?;
        }

        Commands::Systems => {
            let systems = match &cli.api_url {
                Some(url) => ApiClient::new(url).list_systems().await?,
                None => catalog::open(&config.catalog).list_systems().await?,
            };
            output_json(&systems)?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(&cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
