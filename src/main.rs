use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{
    fmt::{self, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use curriculum_wizard::api::{self, ProxyState, RateLimiter};
use curriculum_wizard::cli;
use curriculum_wizard::config::{GatewayConfig, ProxyConfig};
use curriculum_wizard::gateway::GatewayClient;
use curriculum_wizard::provider::ProviderClient;

const DEFAULT_PORT: u16 = 8787;
const DEFAULT_LOG_FILTER: &str = "curriculum_wizard=debug,tower_http=debug";

#[derive(Parser)]
#[command(name = "cwiz")]
#[command(about = "Backward-design curriculum planning with AI refinement")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the completion proxy
    Serve {
        /// Port for the proxy
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
    /// Run the wizard on a JSON course description and print the framework
    Plan {
        /// Path to the course description
        #[arg(short, long)]
        input: PathBuf,

        /// Completion proxy URL (overrides config and CWIZ_PROXY_URL)
        #[arg(long)]
        proxy_url: Option<String>,

        /// Provider API key; calls the provider directly instead of the proxy
        #[arg(long)]
        api_key: Option<String>,

        /// Print the framework as JSON instead of Markdown
        #[arg(long)]
        json: bool,
    },
}

/// `plan` prints the framework on stdout, so its logs go to stderr.
fn init_tracing(to_stderr: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let writer = if to_stderr {
        BoxMakeWriter::new(std::io::stderr)
    } else {
        BoxMakeWriter::new(std::io::stdout)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer))
        .init();
}

async fn serve(host: &str, port: u16) -> anyhow::Result<()> {
    let config = ProxyConfig::from_env();
    let provider =
        ProviderClient::new(config.provider.clone()).context("Failed to build provider client")?;
    if !provider.has_api_key() {
        tracing::warn!("No provider API key configured; completion requests will fail");
    }

    let rate_limiter = config.rate_limit.map(RateLimiter::per_minute);
    if let Some(limiter) = rate_limiter.clone() {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(limiter.window().max(Duration::from_secs(1)));
            loop {
                interval.tick().await;
                limiter.cleanup();
            }
        });
    }

    let app = api::create_router(ProxyState { provider }, rate_limiter);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Completion proxy listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn plan(
    input: PathBuf,
    proxy_url: Option<String>,
    api_key: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let input = cli::load_input(&input)?;

    let mut config = GatewayConfig::load();
    if proxy_url.is_some() {
        config.proxy_url = proxy_url;
    }
    if api_key.is_some() {
        config.api_key = api_key;
    }
    let backend = GatewayClient::from_config(&config)?;

    let state = cli::run_plan(&input, backend, config.assessment_format).await?;
    for error in state.errors() {
        tracing::warn!(category = %error.category, "{}", error.user_message);
    }

    let framework = state.framework();
    if json {
        println!("{}", serde_json::to_string_pretty(&framework)?);
    } else {
        print!("{}", framework.render_markdown());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(matches!(cli.command, Some(Commands::Plan { .. })));

    match cli.command {
        Some(Commands::Serve { port, host }) => serve(&host, port).await,
        Some(Commands::Plan {
            input,
            proxy_url,
            api_key,
            json,
        }) => plan(input, proxy_url, api_key, json).await,
        None => serve("127.0.0.1", DEFAULT_PORT).await,
    }
}
