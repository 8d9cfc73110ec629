use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ipl_analytics::assistant::{CricketAssistant, ResponseType};
use ipl_analytics::catalog::{CanonicalCatalog, CatalogHandle};
use ipl_analytics::config::AnalyticsConfig;
use ipl_analytics::executor::{PostgresCatalogSource, PostgresExecutor};
use ipl_analytics::llm::LlmClient;

#[derive(Parser)]
#[command(name = "ipl-analytics")]
#[command(about = "Natural-language cricket analytics over ball-by-ball data")]
struct Args {
    /// The analytics question in natural language
    question: String,

    /// Postgres connection string (or set DATABASE_URL)
    #[arg(long)]
    database_url: Option<String>,

    /// Statement timeout in seconds for query execution
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Generate SQL with the LLM fallback instead of the deterministic synthesizer
    #[arg(long)]
    use_llm: bool,

    /// API key for the completion service (or set OPENAI_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Print the generated SQL without executing it
    #[arg(long)]
    plan_only: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let mut config = AnalyticsConfig::from_env()?;
    if args.database_url.is_some() {
        config.database_url = args.database_url.clone();
    }

    let database_url = config
        .database_url
        .clone()
        .ok_or_else(|| anyhow!("DATABASE_URL is required (flag --database-url or env)"))?;

    info!("connecting and loading catalog");
    let executor = Arc::new(
        PostgresExecutor::connect(&database_url, Duration::from_secs(args.timeout)).await?,
    );
    let source = PostgresCatalogSource::new(executor.pool().clone());
    // Catalog load failure is fatal; an empty catalog would silently turn
    // every lookup into a miss.
    let catalog = CanonicalCatalog::load(&source).await?;
    let catalog = Arc::new(CatalogHandle::new(catalog));

    let mut assistant = CricketAssistant::new(&config, catalog);
    if !args.plan_only {
        assistant = assistant.with_executor(executor);
    }
    if args.use_llm {
        let api_key = args
            .api_key
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .unwrap_or_else(|| "dummy-api-key".to_string());
        assistant = assistant.with_llm(Arc::new(LlmClient::new(api_key)));
    }

    let response = if args.use_llm {
        assistant.answer_with_llm(&args.question).await?
    } else {
        assistant.answer(&args.question).await
    };

    println!("{}", response.title);
    println!();
    println!("{}", response.sql);
    println!();
    if !response.table.is_empty() {
        println!("{}", response.table);
        println!();
    }
    println!("{}", response.answer);

    if response.response_type == ResponseType::ExecutionError {
        std::process::exit(1);
    }
    Ok(())
}
