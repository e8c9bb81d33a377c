//! Interactive command-line interface for the finquery controller

use anyhow::Context;
use clap::Parser;
use finquery_core::{ControllerConfig, McpDataClient, QueryController};
use finquery_llm::providers::{GroqConfig, GroqProvider};
use std::io::{BufRead, Write};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "finquery")]
#[command(about = "Ask natural-language questions about public companies", long_about = None)]
struct Args {
    /// Base URL of the market data / ML service
    #[arg(long, default_value = "https://financial-mcp.onrender.com")]
    data_url: String,

    /// Model identifier for the completion service
    #[arg(long)]
    model: Option<String>,

    /// Run a single question instead of the interactive loop
    #[arg(short, long)]
    question: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    finquery_utils::init_tracing();

    let args = Args::parse();

    let provider = GroqProvider::with_config(
        GroqConfig::from_env().context("GROQ_API_KEY must be set")?,
    )?;

    let data_client = McpDataClient::new(&args.data_url)
        .map_err(|e| anyhow::anyhow!("failed to create data client: {e}"))?;

    let mut config_builder = ControllerConfig::builder();
    if let Some(model) = args.model {
        config_builder = config_builder.model(model);
    }
    let config = config_builder.build()?;

    let controller = QueryController::new(Arc::new(data_client), Arc::new(provider), config);

    let session_id = uuid::Uuid::new_v4().to_string();
    info!(%session_id, data_url = %args.data_url, "controller ready");

    if let Some(question) = args.question {
        let response = controller.handle_query(&session_id, &question).await;
        println!("{}", response.answer);
        return Ok(());
    }

    println!("finquery — ask about public companies (empty line to exit)");

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let question = line.trim();
        if question.is_empty() {
            break;
        }

        let response = controller.handle_query(&session_id, question).await;
        if !response.used_tools.is_empty() {
            info!(tools = ?response.used_tools, symbols = ?response.symbols, "tools used");
        }
        println!("{}\n", response.answer);
    }

    Ok(())
}
