use anyhow::{Context as AnyhowContext, Result};
use clap::{Parser, Subcommand};
use layerdeck_client::{CatalogApi, CollectionRequest, FetchOptions};
use layerdeck_protocol::{CatalogRoutes, Query};
use std::sync::Arc;

mod browse;
mod http;

use http::HttpCatalogApi;

#[derive(Parser)]
#[command(name = "layerdeck")]
#[command(about = "Browse and edit a catalog of layer entities", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for output)
    #[arg(long, global = true)]
    quiet: bool,

    /// Catalog server base URL (overrides LAYERDECK_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Entity kind used in permalinks
    #[arg(long, global = true, default_value = "layer")]
    kind: String,

    /// Collection endpoint name
    #[arg(long, global = true, default_value = "layers")]
    endpoint: String,

    /// Search also matches repository text content
    #[arg(long, global = true)]
    repo_text: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog entities, optionally filtered
    List {
        /// Search query; omit for an unfiltered listing
        #[arg(short, long)]
        query: Option<String>,
    },
    /// Print one entity's repository payload (readme, rules, schema)
    Show { id: String },
    /// Delete an entity
    Delete { id: String },
    /// Print navigation URLs for an entity
    Urls { id: String },
    /// Interactive browsing session on stdin
    Browse,
}

fn resolve_base_url(flag: Option<String>) -> String {
    flag.or_else(|| {
        std::env::var("LAYERDECK_BASE_URL")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    })
    .unwrap_or_else(|| "http://127.0.0.1:8080".to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let routes = CatalogRoutes {
        base_url: resolve_base_url(cli.base_url.clone()),
        kind: cli.kind.clone(),
        endpoint: cli.endpoint.clone(),
    };
    let options = FetchOptions {
        search_repo_text: cli.repo_text,
    };
    let api = Arc::new(HttpCatalogApi::new(routes.clone()));

    match cli.command {
        Commands::List { query } => run_list(api, options, query.as_deref()).await?,
        Commands::Show { id } => run_show(api, &id).await?,
        Commands::Delete { id } => run_delete(api, &id).await,
        Commands::Urls { id } => run_urls(&routes, &id)?,
        Commands::Browse => browse::run(api, options).await?,
    }

    Ok(())
}

async fn run_list(
    api: Arc<HttpCatalogApi>,
    options: FetchOptions,
    query: Option<&str>,
) -> Result<()> {
    let request = CollectionRequest::new(Query::new(query.unwrap_or("")), options);
    let entities = api
        .fetch_collection(&request)
        .await
        .context("collection fetch failed")?;
    println!("{}", serde_json::to_string_pretty(&entities)?);
    Ok(())
}

async fn run_show(api: Arc<HttpCatalogApi>, id: &str) -> Result<()> {
    let detail = api
        .fetch_detail(id)
        .await
        .with_context(|| format!("repository fetch for {id} failed"))?;
    println!("{}", serde_json::to_string_pretty(&detail)?);
    Ok(())
}

async fn run_delete(api: Arc<HttpCatalogApi>, id: &str) {
    match api.delete_entity(id).await {
        Ok(()) => println!("Removed"),
        Err(err) => {
            // the server's own words, verbatim
            eprintln!("{}", err.user_message());
            std::process::exit(1);
        }
    }
}

fn run_urls(routes: &CatalogRoutes, id: &str) -> Result<()> {
    let urls = serde_json::json!({
        "permalink": routes.permalink(id),
        "editor": routes.editor(id),
        "create": routes.create(),
        "entity": routes.entity(id),
        "detail": routes.detail(id),
    });
    println!("{}", serde_json::to_string_pretty(&urls)?);
    Ok(())
}
