//! Command-line interface for the stock newsletter crew

use anyhow::Context as _;
use clap::Parser;
use crew_newsletter::{NewsletterConfig, NewsletterCrew, ProviderKind};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "crew-cli")]
#[command(about = "Generate a stock newsletter with a crew of LLM analysts", long_about = None)]
struct Args {
    /// Ticker symbol to analyze
    #[arg(default_value = "AAPL")]
    ticker: String,

    /// Path to the keyring file with provider secrets
    #[arg(short, long, default_value = "api_settings/keyring.txt")]
    keyring: String,

    /// Backend for the analyst and writer roles (gemini or openai)
    #[arg(long, default_value = "gemini")]
    provider: String,

    /// Model for the analyst and writer roles
    #[arg(long)]
    model: Option<String>,

    /// Model for the crew manager pass
    #[arg(long)]
    manager_model: Option<String>,

    /// Print the intermediate task outputs as well
    #[arg(long)]
    show_tasks: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    crew_utils::init_tracing();

    let args = Args::parse();

    let provider = match args.provider.as_str() {
        "gemini" => ProviderKind::Gemini,
        "openai" => ProviderKind::OpenAi,
        other => anyhow::bail!("unknown provider '{other}', expected 'gemini' or 'openai'"),
    };

    let mut builder = NewsletterConfig::builder()
        .keyring_path(&args.keyring)
        .agent_provider(provider);
    if let Some(model) = args.model {
        builder = builder.agent_model(model);
    }
    if let Some(model) = args.manager_model {
        builder = builder.manager_model(model);
    }
    let config = builder.build()?;

    info!(ticker = %args.ticker, model = %config.agent_model, "Starting newsletter crew");

    let crew = NewsletterCrew::from_keyring(config)
        .with_context(|| format!("loading credentials from {}", args.keyring))?;
    let result = crew.run(&args.ticker).await?;

    if args.show_tasks {
        for (task, output) in &result.task_outputs {
            println!("=== {task} ===\n{output}\n");
        }
    }

    println!("{}", result.final_output);

    Ok(())
}
