//! HTTP server binary for product-catalog.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `CatalogConfig`, wires the model, search and store clients, and serves the
//! router.

use anyhow::{Context, Result};
use clap::Parser;
use product_catalog::{
    build_router, AppState, CatalogBuilder, CatalogConfig, LlmProductModel, ProductModel,
    SqliteCatalogStore,
};
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = "\
EXAMPLES:
  catalog-server
  catalog-server --port 9000 --database-url sqlite://catalog.db
  catalog-server --provider gemini --model gemini-2.0-flash --no-search

ENVIRONMENT:
  GEMINI_API_KEY / OPENAI_API_KEY / ANTHROPIC_API_KEY
                     Provider credentials (auto-detected when --provider is unset)
  PDFIUM_LIB_PATH    Path to libpdfium, needed by GET /export_pdf
  RUST_LOG           Overrides the log filter (e.g. product_catalog=debug)";

#[derive(Parser, Debug)]
#[command(
    name = "catalog-server",
    version,
    about = "Generate product catalog entries from images with Vision LLMs, served over HTTP",
    long_about = "Accepts product photos, asks a vision model for a structured catalog entry, \
tops up thin specifications from a web search, classifies the product, stores the result and \
exports the whole catalog as a PDF.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Address to bind.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on.
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    port: u16,

    /// SQLite database URL for catalog records.
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://catalog.db")]
    database_url: String,

    /// LLM model ID (e.g. gemini-2.0-flash, gpt-4.1-nano).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(
        long,
        env = "EDGEQUAKE_PROVIDER",
        long_help = "LLM provider. Auto-detected from API key env vars if not set.\n\
          Supported: openai, anthropic, gemini, azure, ollama, or any OpenAI-compatible URL."
    )]
    provider: Option<String>,

    /// Path to a text file replacing the built-in catalog prompt.
    #[arg(long, env = "CATALOG_PROMPT_FILE")]
    prompt_file: Option<PathBuf>,

    /// Max LLM output tokens per image.
    #[arg(long, env = "CATALOG_MAX_TOKENS", default_value_t = 2048)]
    max_tokens: usize,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "CATALOG_TEMPERATURE", default_value_t = 0.2)]
    temperature: f32,

    /// Per-image model call timeout in seconds.
    #[arg(long, env = "CATALOG_MODEL_TIMEOUT", default_value_t = 120)]
    model_timeout: u64,

    /// Never search the web for missing specifications.
    #[arg(long, env = "CATALOG_NO_SEARCH")]
    no_search: bool,

    /// Base URL of the search engine (`/search?q=` is appended).
    #[arg(long, env = "CATALOG_SEARCH_URL", default_value = "https://www.google.com")]
    search_url: String,

    /// Web search timeout in seconds.
    #[arg(long, env = "CATALOG_SEARCH_TIMEOUT", default_value_t = 10)]
    search_timeout: u64,

    /// Directory to keep a copy of every uploaded file.
    #[arg(long, env = "CATALOG_UPLOAD_DIR")]
    upload_dir: Option<PathBuf>,

    /// Maximum request body size in bytes.
    #[arg(long, env = "CATALOG_MAX_UPLOAD_BYTES", default_value_t = 32 * 1024 * 1024)]
    max_upload_bytes: usize,

    /// Emit logs as JSON lines.
    #[arg(long, env = "CATALOG_LOG_JSON")]
    log_json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "CATALOG_VERBOSE")]
    verbose: bool,

    /// Suppress all logs except errors.
    #[arg(short, long, env = "CATALOG_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let config = Arc::new(build_config(&cli).await?);

    let model: Arc<dyn ProductModel> = Arc::new(
        LlmProductModel::from_config(&config).context("Failed to initialise the vision model")?,
    );
    let store = Arc::new(
        SqliteCatalogStore::connect(&cli.database_url)
            .await
            .with_context(|| format!("Failed to open catalog store at {}", cli.database_url))?,
    );
    let builder = CatalogBuilder::with_web_search(model, store, Arc::clone(&config))
        .context("Failed to set up web search")?;
    builder
        .prepare()
        .await
        .context("Failed to prepare upload directory")?;

    let app = build_router(AppState::new(builder));

    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", cli.host, cli.port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

fn init_logging(cli: &Cli) {
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr);
    if cli.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn build_config(cli: &Cli) -> Result<CatalogConfig> {
    let mut builder = CatalogConfig::builder()
        .max_tokens(cli.max_tokens)
        .temperature(cli.temperature)
        .model_timeout_secs(cli.model_timeout)
        .search_enabled(!cli.no_search)
        .search_base_url(cli.search_url.clone())
        .search_timeout_secs(cli.search_timeout)
        .max_upload_bytes(cli.max_upload_bytes);

    if let Some(ref model) = cli.model {
        builder = builder.model(model.clone());
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider.clone());
    }
    if let Some(ref dir) = cli.upload_dir {
        builder = builder.upload_dir(dir.clone());
    }
    if let Some(ref path) = cli.prompt_file {
        let prompt = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read prompt from {:?}", path))?;
        builder = builder.prompt(prompt);
    }

    builder.build().context("Invalid configuration")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown requested");
}
