//! CLI entry point for the MidiGent analysis pipeline.
//!
//! Designed for subprocess invocation from the generation front end:
//! reads compositions as JSON from stdin, writes JSON results to stdout.
//! Logs go to stderr.

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, EnvFilter};

use midigent_audit::{GenerationOutcome, GenerationSession};
use midigent_core::{Composition, MidigentConfig};
use midigent_uniqueness::UniquenessReport;
use midigent_variation::VariationEngine;

#[derive(Parser)]
#[command(name = "midigent-audit")]
#[command(about = "Uniqueness and genre authenticity checks for generated compositions")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Override the session ID.
    #[arg(long, global = true)]
    session_id: Option<String>,

    /// Config file prefix (default: midigent).
    #[arg(short, long, default_value = "midigent", global = true)]
    config: String,
}

#[derive(Subcommand)]
enum Command {
    /// Fingerprint and score compositions (reads one JSON composition or an array from stdin).
    Audit {
        /// Print the human-readable history summary to stderr.
        #[arg(long)]
        summary: bool,
    },
    /// Print the genre rule table as JSON.
    Genres,
    /// Seed a number of generations and print the seed info.
    Seeds {
        #[arg(long, default_value_t = 1)]
        count: u32,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AuditInput {
    Many(Vec<Composition>),
    One(Box<Composition>),
}

#[derive(Serialize)]
struct AuditOutput<'a> {
    session_id: &'a str,
    outcomes: Vec<GenerationOutcome>,
    report: UniquenessReport,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = MidigentConfig::load(&cli.config)?;
    if cli.session_id.is_some() {
        config.session_id = cli.session_id.clone();
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    match cli.command {
        Command::Audit { summary } => {
            let session = GenerationSession::from_config(&config)?;
            let input = std::io::read_to_string(std::io::stdin())?;
            let compositions = match serde_json::from_str::<AuditInput>(&input)? {
                AuditInput::Many(list) => list,
                AuditInput::One(one) => vec![*one],
            };

            let outcomes = compositions.iter().map(|c| session.audit(c)).collect();
            let output = AuditOutput {
                session_id: session.session_id(),
                outcomes,
                report: session.uniqueness_report(),
            };
            println!("{}", serde_json::to_string(&output)?);

            if summary {
                eprint!("{}", session.history_summary());
            }
        }
        Command::Genres => {
            let session = GenerationSession::from_config(&config)?;
            println!("{}", serde_json::to_string_pretty(session.rules())?);
        }
        Command::Seeds { count } => {
            let session_id = config
                .session_id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            let mut engine = VariationEngine::new(session_id);
            for _ in 0..count {
                engine.initialize_generation();
            }
            println!("{}", serde_json::to_string(&engine.get_seed_info())?);
        }
    }

    Ok(())
}
