//! Ponder CLI entry point

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ponder::agent::{AgentLoop, Conversation, DecisionEngine, ProviderRegistry};
use ponder::adapters::Session;
use ponder::config::Config;
use ponder::tools::ActionRegistry;
use ponder::ui;

#[derive(Parser)]
#[command(name = "ponder")]
#[command(about = "Visible, structured reasoning for LLM agents")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ~/.ponder/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init,

    /// Run the agent
    Run {
        /// Message to send to the agent
        #[arg(short, long)]
        message: Option<String>,

        /// Override the round-trip budget
        #[arg(long)]
        max_round_trips: Option<usize>,

        /// Print the final conversation as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the action catalog as JSON
    Catalog,

    /// Show configuration status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            let path = cli.config.unwrap_or_else(ponder::config::config_path);
            let path = ponder::config::init(&path)?;
            ui::print_success(&format!("Wrote default config to {:?}", path));
            ui::print_step("Set api_key there or export OPENAI_API_KEY, then run: ponder run -m \"Hello!\"");
        }

        Commands::Run { message, max_round_trips, json } => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(cap) = max_round_trips {
                config.max_round_trips = cap;
            }

            let engine = ProviderRegistry::create(&config)?;
            let registry = Arc::new(ActionRegistry::with_reasoning_actions());
            let agent = AgentLoop::from_config(engine, registry, &config);

            match message {
                Some(msg) => run_once(agent, &msg, json).await?,
                None => {
                    println!("Interactive mode (type 'exit' to quit)");
                    Session::new(agent).run_interactive().await?;
                }
            }
        }

        Commands::Catalog => {
            let registry = ActionRegistry::with_reasoning_actions();
            println!("{}", serde_json::to_string_pretty(registry.catalog())?);
        }

        Commands::Status => {
            let config = load_config(cli.config.as_deref())?;
            let path = cli.config.unwrap_or_else(ponder::config::config_path);

            println!("Ponder Status\n");
            println!("Config: {:?}{}", path, if path.exists() { "" } else { " (not found, using defaults)" });
            println!("Provider: {}", config.provider);
            println!("Model: {}", config.model);
            println!("Endpoint: {}", config.base_url);
            println!("API key: {}", if config.api_key.is_empty() { "not set" } else { "✓" });
            println!("Round-trip budget: {}", config.max_round_trips);
            println!("Engine retries: {}", config.max_engine_retries);
        }
    }

    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    let config = match path {
        Some(path) => {
            let mut config = ponder::config::load_from(path)?;
            config.apply_env();
            config
        }
        None => ponder::config::load()?,
    };
    Ok(config)
}

async fn run_once<E: DecisionEngine>(agent: AgentLoop<E>, message: &str, json: bool) -> Result<()> {
    let conversation = match agent.run(Conversation::from_user(message)).await {
        Ok(conversation) => conversation,
        Err(e) => {
            if let Some(partial) = e.partial_conversation() {
                ui::print_warning("Run failed; partial transcript follows");
                print_conversation(partial, json)?;
            }
            return Err(e.into());
        }
    };

    print_conversation(&conversation, json)
}

fn print_conversation(conversation: &Conversation, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(conversation)?);
    } else {
        println!("{}", ui::render_conversation(conversation));
    }
    Ok(())
}
