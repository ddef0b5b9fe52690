//! RustedTutor CLI — the main entry point.
//!
//! Commands:
//! - `onboard`    — Initialize config
//! - `gateway`    — Start the HTTP API server
//! - `ask`        — Ask a question, or chat interactively
//! - `socratic`   — Get guiding questions instead of an answer
//! - `quiz`       — Generate a multiple-choice quiz
//! - `flashcards` — Generate study flashcards
//! - `evaluate`   — Score quiz answers and get feedback
//! - `doctor`     — Diagnose configuration

use clap::{Args, Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "rustedtutor",
    about = "RustedTutor — AI tutoring over your own study materials",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json: bool,
}

/// Who is asking and which materials to search.
#[derive(Args, Debug, Clone)]
pub struct Scope {
    /// Student id used for conversation memory and material lookup
    #[arg(short, long, env = "RUSTEDTUTOR_USER", default_value = "cli")]
    user: String,

    /// Restrict retrieval to one material
    #[arg(short, long)]
    material: Option<String>,

    /// Search all of the student's materials
    #[arg(long)]
    all_materials: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration
    Onboard,

    /// Start the HTTP gateway server
    Gateway {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Ask a question (interactive when no question is given)
    Ask {
        question: Option<String>,

        #[command(flatten)]
        scope: Scope,
    },

    /// Get Socratic guiding questions
    Socratic {
        question: String,

        #[command(flatten)]
        scope: Scope,
    },

    /// Generate a multiple-choice quiz
    Quiz {
        topic: String,

        /// Number of questions
        #[arg(short, long, default_value_t = 5)]
        num: usize,

        /// easy, medium or hard
        #[arg(short, long, default_value = "medium")]
        difficulty: String,

        #[command(flatten)]
        scope: Scope,
    },

    /// Generate flashcards
    Flashcards {
        topic: String,

        /// Number of cards
        #[arg(short, long, default_value_t = 10)]
        num: usize,

        #[command(flatten)]
        scope: Scope,
    },

    /// Score answers against a key, e.g. `--answers A,B,C --correct A,C,C`
    Evaluate {
        #[arg(long, value_delimiter = ',', required = true)]
        answers: Vec<String>,

        #[arg(long, value_delimiter = ',', required = true)]
        correct: Vec<String>,

        #[arg(short, long)]
        topic: String,
    },

    /// Diagnose configuration
    Doctor,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json);

    match cli.command {
        Commands::Onboard => commands::onboard::run()?,
        Commands::Gateway { port } => commands::gateway::run(port).await?,
        Commands::Ask { question, scope } => commands::ask::run(question, scope).await?,
        Commands::Socratic { question, scope } => {
            commands::study::socratic(question, scope).await?
        }
        Commands::Quiz {
            topic,
            num,
            difficulty,
            scope,
        } => commands::study::quiz(topic, num, difficulty, scope).await?,
        Commands::Flashcards { topic, num, scope } => {
            commands::study::flashcards(topic, num, scope).await?
        }
        Commands::Evaluate {
            answers,
            correct,
            topic,
        } => commands::study::evaluate(answers, correct, topic).await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}

/// Logs go to stderr so command output on stdout stays pipeable.
fn init_tracing(verbose: bool, json: bool) {
    let filter = if verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}
