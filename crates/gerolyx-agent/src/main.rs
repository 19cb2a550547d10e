//! Gerolyx: query understanding for longevity-compound questions.
//! Entry point for the command-line binary.

mod config;

use std::io::BufRead;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use gerolyx_query::{validate_query, DataOperation, PromptTemplate, QueryCategory, QueryContext, QueryEngine};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gerolyx", version, about = "Analyze natural-language questions about longevity compounds")]
struct Cli {
    /// Config file (defaults to ./gerolyx.toml when present)
    #[arg(long, env = "GEROLYX_CONFIG")]
    config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Skip the synonym rewrite of query text before extraction
    #[arg(long)]
    no_normalize: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze queries given as arguments, or one per line on stdin
    Analyze { queries: Vec<String> },
    /// Check a query for length and vocabulary problems
    Validate { query: String },
    /// Print example questions for every category
    Examples,
}

#[derive(Serialize)]
struct AnalysisOutput<'a> {
    query: &'a str,
    #[serde(flatten)]
    context: QueryContext,
    #[serde(skip_serializing_if = "Option::is_none")]
    operation: Option<DataOperation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    prompt_template: Option<PromptTemplate>,
}

fn init_logging(logging: &config::LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let line = if pretty { serde_json::to_string_pretty(value)? } else { serde_json::to_string(value)? };
    println!("{line}");
    Ok(())
}

fn read_stdin_queries() -> anyhow::Result<Vec<String>> {
    let mut queries = Vec::new();
    for line in std::io::stdin().lock().lines() {
        let line = line.context("Failed to read query from stdin")?;
        if !line.trim().is_empty() {
            queries.push(line);
        }
    }
    Ok(queries)
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = config::Config::load(cli.config.as_deref())?;
    if cli.pretty {
        config.output.pretty = true;
    }
    if cli.no_normalize {
        config.engine.normalize_query_text = false;
    }

    init_logging(&config.logging);
    info!("Gerolyx {} starting", env!("CARGO_PKG_VERSION"));

    match cli.command.unwrap_or(Command::Analyze { queries: Vec::new() }) {
        Command::Examples => {
            for category in QueryCategory::ALL.iter().filter(|c| !c.examples().is_empty()) {
                println!("{} ({})", category.primary_intent(), category);
                for example in category.examples() {
                    println!("  - {example}");
                }
            }
        }
        Command::Validate { query } => {
            print_json(&validate_query(&query), config.output.pretty)?;
        }
        Command::Analyze { queries } => {
            let queries = if queries.is_empty() { read_stdin_queries()? } else { queries };
            let engine = QueryEngine::from_config(&config.engine).context("Failed to build query engine")?;

            let refs: Vec<&str> = queries.iter().map(String::as_str).collect();
            for (query, context) in refs.iter().copied().zip(engine.analyze_batch(&refs)) {
                let (operation, prompt_template) = if config.output.include_operation {
                    (Some(context.operation()), Some(context.prompt_template()))
                } else {
                    (None, None)
                };
                let output = AnalysisOutput { query, context, operation, prompt_template };
                print_json(&output, config.output.pretty)?;
            }
            info!("Analyzed {} queries", refs.len());
        }
    }

    Ok(())
}
