mod agent;

use agent::Agent;
use anyhow::{bail, Context};
use clap::{Arg, ArgAction, Command};
use filewright_core::{Config, Session};
use filewright_providers::{GeminiProvider, ProviderManager};
use std::io::{self, Write};
use std::sync::Arc;
use tracing::Level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = Command::new("filewright")
        .version("0.1.0")
        .about("LLM file-management assistant")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Sets a custom config file"),
        )
        .arg(
            Arg::new("model")
                .short('m')
                .long("model")
                .value_name("MODEL")
                .help("Sets the model to use"),
        )
        .arg(
            Arg::new("interactive")
                .short('i')
                .long("interactive")
                .action(ArgAction::SetTrue)
                .help("Start in interactive mode"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Enable debug logging"),
        )
        .arg(
            Arg::new("instruction")
                .num_args(0..)
                .help("Instruction for the assistant, e.g. \"create a folder named site\""),
        )
        .get_matches();

    let level = if matches.get_flag("verbose") {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let mut config = load_config(matches.get_one::<String>("config"))?;
    if let Err(e) = config.validate() {
        eprintln!("Warning: Configuration validation failed: {}", e);
    }

    if let Some(model) = matches.get_one::<String>("model") {
        if let Some(gemini) = config.providers.gemini.as_mut() {
            gemini.default_model = model.clone();
        }
    }

    let manager = Arc::new(ProviderManager::new(config.clone()));
    register_providers(&manager, &config).await?;

    let agent = Agent::new(manager.clone(), &config.agent);
    let session = Session::new();

    let instruction = matches
        .get_many::<String>("instruction")
        .map(|words| words.cloned().collect::<Vec<_>>().join(" "))
        .filter(|text| !text.is_empty());

    if matches.get_flag("interactive") || instruction.is_none() {
        start_interactive_mode(&agent, &manager, &session).await?;
    } else if let Some(instruction) = instruction {
        let answer = agent.run(&instruction, &session).await?;
        println!("{}", answer);
    }

    Ok(())
}

fn load_config(config_path: Option<&String>) -> anyhow::Result<Config> {
    match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path))?;
            Ok(config)
        }
        None => Ok(Config::load()?),
    }
}

async fn register_providers(manager: &ProviderManager, config: &Config) -> anyhow::Result<()> {
    let gemini_config = match &config.providers.gemini {
        Some(gemini) if gemini.enabled => gemini.clone(),
        _ => bail!("The gemini provider is disabled in the configuration"),
    };

    if std::env::var(&gemini_config.api_key_env).is_err() {
        bail!(
            "{} is not set in environment variables",
            gemini_config.api_key_env
        );
    }

    let provider = GeminiProvider::new(gemini_config)?;
    manager.register_provider(Arc::new(provider)).await;
    manager.set_current_provider("gemini").await?;

    Ok(())
}

async fn start_interactive_mode(
    agent: &Agent,
    manager: &Arc<ProviderManager>,
    session: &Session,
) -> anyhow::Result<()> {
    println!("Filewright - LLM file-management assistant");
    println!("Available commands: <instruction>, help, models, clear, quit");
    println!("Type 'help' for more information.\n");

    let stdin = io::stdin();

    loop {
        print!("filewright> ");
        io::stdout().flush()?;

        let mut input = String::new();
        match stdin.read_line(&mut input) {
            Ok(0) => break, // EOF
            Ok(_) => {
                let command = input.trim();
                if command.is_empty() {
                    continue;
                }

                match command {
                    "quit" | "exit" | "q" => break,
                    "help" => show_help(),
                    "models" => list_models(manager).await,
                    "clear" => {
                        session.clear().await;
                        println!("Session cleared.\n");
                    }
                    _ => match agent.run(command, session).await {
                        Ok(answer) => println!("\n{}\n", answer),
                        Err(e) => eprintln!("Error: {}", e),
                    },
                }
            }
            Err(e) => {
                eprintln!("Error reading input: {}", e);
                return Err(e.into());
            }
        }
    }

    Ok(())
}

fn show_help() {
    let help_text = r#"
Filewright - LLM file-management assistant

Commands:
  <instruction>   - Ask the assistant to create, write, or read files
  help            - Show this help message
  models          - List models supported by the current provider
  clear           - Clear the session transcript
  quit, exit, q   - Exit the application

Examples:
  create a folder named site
  inside site, create index.html with a basic HTML boilerplate
  read the content of site/index.html
"#;
    println!("{}", help_text.trim());
}

async fn list_models(manager: &Arc<ProviderManager>) {
    match manager.current_provider().await {
        Ok(provider) => {
            println!("\nModels for {}:", provider.name());
            for model in provider.supported_models() {
                println!("  {}", model);
            }
            println!();
        }
        Err(e) => eprintln!("Error: {}", e),
    }
}
