//! promptsynth CLI - compose model-specific prompts
//!
//! - `compose`: render structured JSON (file or stdin) for a target model
//! - `strategy`: show the structuring strategy for a model and style
//! - `generate`: idea -> structured fields (via an OpenAI-compatible backend) -> prompt
//! - `models`: list supported target models

use clap::{Parser, Subcommand};
use promptsynth::strategy::known_styles;
use promptsynth::{
    resolve_strategy, Composer, GeneratorConfig, PromptGenerator, StructuredPromptInput,
    TargetModel,
};
use std::error::Error;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Compose generation prompts tailored to a target model
#[derive(Parser, Debug)]
#[command(name = "promptsynth")]
#[command(about = "Compose model-specific image and video generation prompts")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compose a prompt from structured JSON
    Compose {
        /// Target model identifier
        #[arg(short, long, default_value = "sora")]
        model: String,

        /// JSON file with structured fields (reads stdin when omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Append a constraints clause; without a value the realism default is used
        #[arg(short, long, num_args = 0..=1, default_missing_value = "")]
        enforce: Option<String>,

        /// Reject unsupported model identifiers instead of composing generically
        #[arg(long)]
        strict: bool,
    },

    /// Show the structuring strategy for a model and style
    Strategy {
        /// Target model identifier
        #[arg(short, long)]
        model: String,

        /// Style tag
        #[arg(short, long, default_value = "")]
        style: String,

        /// Print the full system prompt
        #[arg(long)]
        show_prompt: bool,
    },

    /// Turn an idea into a prompt through an upstream chat model
    Generate {
        /// Free-form idea
        #[arg(short, long)]
        idea: String,

        /// Target model identifier
        #[arg(short, long, default_value = "sora")]
        model: String,

        /// Style tag
        #[arg(short, long, default_value = "")]
        style: String,

        /// Chat model used for structuring
        #[arg(short, long, default_value = "gpt-4o")]
        llm: String,

        /// Backend LLM URL (e.g., http://localhost:11434/v1 for Ollama)
        #[arg(short = 'u', long)]
        backend_url: Option<String>,

        /// Backend API key (optional, uses OPENAI_API_KEY env var if not provided)
        #[arg(short = 'k', long)]
        backend_key: Option<String>,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,

        /// Log the raw structuring response
        #[arg(short, long)]
        verbose: bool,
    },

    /// List supported target models
    Models,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing; RUST_LOG overrides the default level
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();

    match run(args.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Compose {
            model,
            input,
            enforce,
            strict,
        } => {
            if strict {
                model.parse::<TargetModel>()?;
            }
            let raw = match input {
                Some(path) => fs::read_to_string(path)?,
                None => {
                    let mut buf = String::new();
                    io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            let data: StructuredPromptInput = serde_json::from_str(&raw)?;
            let composer = Composer::default();
            let prompt = match enforce {
                Some(constraints) => composer.compose_enforced(&data, &model, Some(&constraints)),
                None => composer.compose(&data, &model),
            };
            println!("{prompt}");
        }

        Command::Strategy {
            model,
            style,
            show_prompt,
        } => {
            let strategy = resolve_strategy(&model, &style);
            println!("template:    {}", strategy.template.as_str());
            println!("temperature: {}", strategy.temperature);
            println!("max_tokens:  {}", strategy.max_tokens);
            if show_prompt {
                println!();
                println!("{}", strategy.system_prompt());
            }
        }

        Command::Generate {
            idea,
            model,
            style,
            llm,
            backend_url,
            backend_key,
            json,
            verbose,
        } => {
            let config = GeneratorConfig::new(llm).with_verbose(verbose);
            // Resolve API key from args or environment
            let key = backend_key.or_else(|| std::env::var("OPENAI_API_KEY").ok());
            let generator = match (backend_url.as_deref(), key.as_deref()) {
                (Some(url), Some(key)) => PromptGenerator::with_base_url_and_key(config, url, key)?,
                (Some(url), None) => PromptGenerator::with_base_url(config, url)?,
                (None, Some(key)) => PromptGenerator::with_api_key(config, key)?,
                (None, None) => PromptGenerator::new(config)?,
            };

            let result = generator.generate(&idea, &model, &style).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", result.prompt);
            }
        }

        Command::Models => {
            for model in TargetModel::SUPPORTED {
                let styles: Vec<&str> = known_styles(model).collect();
                println!(
                    "{:<12} {:<12} budget {:>4}  styles: {}",
                    model.as_str(),
                    model.display_name(),
                    model.budget(),
                    styles.join(", ")
                );
            }
            println!(
                "{:<12} {:<12} budget {:>4}  (fallback for unknown identifiers)",
                TargetModel::Generic.as_str(),
                TargetModel::Generic.display_name(),
                TargetModel::Generic.budget()
            );
        }
    }

    Ok(())
}
