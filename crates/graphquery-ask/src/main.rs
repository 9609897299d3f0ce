//! CLI entry point: ask questions about a Neo4j graph in plain English.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use graphquery_core::{Example, Settings};
use graphquery_graph::movies::MOVIES_CSV_URL;
use graphquery_graph::{GraphClient, GraphConfig};

use graphquery_ask::display::{
    format_history, format_outcome, format_questions, format_stats, outcome_json, OutputFormat,
};
use graphquery_ask::examples::SAMPLE_QUESTIONS;
use graphquery_ask::Session;

#[derive(Parser)]
#[command(name = "graphquery")]
#[command(about = "Ask questions about a Neo4j graph in plain English")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file prefix (default: graphquery).
    #[arg(short, long, default_value = "graphquery", global = true)]
    config: String,

    /// Output format for answers.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    format: OutputFormat,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    /// Run generated queries without EXPLAIN validation.
    #[arg(long, global = true)]
    no_validate: bool,

    /// JSON file of extra `{question, query}` examples.
    #[arg(long, global = true)]
    examples: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Answer a single question and exit.
    Ask {
        /// The question, e.g. "How many movies are there?"
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// Interactive session with history.
    Shell,
    /// Print the database schema as the model sees it.
    Schema,
    /// Print movie, actor, director and genre counts.
    Stats,
    /// Load the movie sample dataset.
    LoadMovies {
        /// CSV source.
        #[arg(long, default_value = MOVIES_CSV_URL)]
        url: String,
    },
    /// List sample questions.
    Examples,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    match &cli.command {
        Command::Examples => {
            println!("{}", format_questions(SAMPLE_QUESTIONS));
            return Ok(());
        }
        Command::Ask { question } => {
            let settings = Settings::load(&cli.config)?;
            let mut session = build_session(&cli, &settings)?;
            session.connect(&settings).await?;

            let question = question.join(" ");
            let outcome = session.run(&question).await?;
            match cli.format {
                OutputFormat::Table => println!("{}", format_outcome(&outcome)),
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&outcome_json(&question, &outcome))?
                ),
            }
        }
        Command::Shell => {
            let settings = Settings::load(&cli.config)?;
            let session = build_session(&cli, &settings)?;
            run_shell(session, &cli.config, &settings, cli.format).await?;
        }
        Command::Schema => {
            let graph = connect_graph(&cli.config).await?;
            let schema = graph.schema_text().await?;
            if schema.is_empty() {
                println!("(empty database)");
            } else {
                println!("{schema}");
            }
        }
        Command::Stats => {
            let graph = connect_graph(&cli.config).await?;
            println!("{}", format_stats(&graph.stats().await?));
        }
        Command::LoadMovies { url } => {
            let graph = connect_graph(&cli.config).await?;
            graph.load_movie_data(url).await?;
            println!("{}", format_stats(&graph.stats().await?));
        }
    }

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn build_session(cli: &Cli, settings: &Settings) -> anyhow::Result<Session> {
    let extra = match &cli.examples {
        Some(path) => load_examples(path)?,
        None => Vec::new(),
    };
    Ok(Session::new()
        .with_examples(&extra)
        .with_validation(settings.pipeline.validate_query && !cli.no_validate))
}

fn load_examples(path: &Path) -> anyhow::Result<Vec<Example>> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("reading {}: {e}", path.display()))?;
    let examples: Vec<Example> = serde_json::from_str(&raw)
        .map_err(|e| anyhow::anyhow!("parsing {}: {e}", path.display()))?;
    tracing::info!(count = examples.len(), path = %path.display(), "Custom examples loaded");
    Ok(examples)
}

async fn connect_graph(config_prefix: &str) -> anyhow::Result<GraphClient> {
    let settings = Settings::load(config_prefix)?;
    let creds = settings.require_credentials()?;
    let graph = GraphClient::connect(&GraphConfig::from_settings(&creds, &settings.neo4j)).await?;
    tracing::info!("Connected to Neo4j");
    Ok(graph)
}

async fn run_shell(
    mut session: Session,
    config_prefix: &str,
    settings: &Settings,
    format: OutputFormat,
) -> anyhow::Result<()> {
    println!("graphquery interactive shell");
    println!("Ask a question, or :help for commands. :quit to exit.\n");

    if let Err(e) = session.connect(settings).await {
        eprintln!("Not connected: {e}");
        eprintln!("Fix the configuration and use :connect to retry.");
    }

    let history_display = settings.pipeline.history_display;
    let stdin = std::io::stdin();
    let mut line = String::new();

    loop {
        eprint!("graphquery> ");

        line.clear();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let (command, arg) = match trimmed.split_once(char::is_whitespace) {
            Some((c, a)) => (c, a.trim()),
            None => (trimmed, ""),
        };

        match command {
            ":quit" | ":exit" | ":q" => break,
            ":help" | ":h" => print_help(),
            ":connect" => {
                let reconnected = match Settings::load(config_prefix) {
                    Ok(fresh) => session.connect(&fresh).await,
                    Err(e) => Err(e),
                };
                match reconnected {
                    Ok(()) => println!("Connected."),
                    Err(e) => eprintln!("Error: {e}"),
                }
            }
            ":disconnect" => {
                session.disconnect();
                println!("Disconnected.");
            }
            ":schema" => match session.schema() {
                Some("") => println!("(empty database)"),
                Some(schema) => println!("{schema}"),
                None => eprintln!("Error: not connected"),
            },
            ":refresh" => match session.refresh_schema().await {
                Ok(_) => println!("Schema refreshed."),
                Err(e) => eprintln!("Error: {e}"),
            },
            ":history" => {
                let n = if arg.is_empty() {
                    history_display
                } else {
                    match arg.parse::<usize>() {
                        Ok(n) => n,
                        Err(_) => {
                            eprintln!("Error: :history takes a number");
                            continue;
                        }
                    }
                };
                println!("{}", format_history(&session.recent(n)));
            }
            ":examples" => println!("{}", format_questions(SAMPLE_QUESTIONS)),
            ":stats" => match session.stats().await {
                Ok(stats) => println!("{}", format_stats(&stats)),
                Err(e) => eprintln!("Error: {e}"),
            },
            _ if command.starts_with(':') => {
                eprintln!("Unknown command {command}. Type :help for commands.");
            }
            _ => match session.run(trimmed).await {
                Ok(outcome) => match format {
                    OutputFormat::Table => println!("{}\n", format_outcome(&outcome)),
                    OutputFormat::Json => println!(
                        "{}",
                        serde_json::to_string_pretty(&outcome_json(trimmed, &outcome))?
                    ),
                },
                Err(e) => {
                    eprintln!("Error: {e}");
                    if e.is_connection() {
                        eprintln!("Use :connect once the configuration is fixed.");
                    }
                }
            },
        }
    }

    println!("Bye!");
    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  :connect      Reload configuration and connect to the database and model");
    println!("  :disconnect   Drop the connection, keeping history");
    println!("  :schema       Show the schema snapshot used in prompts");
    println!("  :refresh      Re-read the schema from the database");
    println!("  :history [n]  Show the most recent questions");
    println!("  :examples     List sample questions");
    println!("  :stats        Show movie/actor/director/genre counts");
    println!("  :quit         Exit the shell");
    println!("  <question>    Ask a question in plain English");
}
