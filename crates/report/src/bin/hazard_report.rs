use anyhow::Result;
use clap::{Parser, Subcommand};
use report::{AppConfig, run_clean, run_extraction, write_all};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "hazard_report",
    version,
    about = "Extract food-chemical hazard evidence from generator responses"
)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean a raw article table into the document table
    Clean {
        /// Headerless query,doi,title,abstract,year table
        #[arg(long)]
        input: PathBuf,
        /// Destination for doc_id,doi,clean_abstract
        #[arg(long)]
        output: PathBuf,
    },
    /// Parse responses for every configured subject and export the evidence
    Extract {
        /// Headerless name,identifier table
        #[arg(long)]
        lexicon: PathBuf,
        /// Cleaned document table
        #[arg(long)]
        documents: PathBuf,
        /// JSON config; defaults apply when omitted
        #[arg(long)]
        config: Option<PathBuf>,
        /// Overrides export.output_dir
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .init();

    match cli.command {
        Commands::Clean { input, output } => {
            let count = run_clean(&input, &output).await?;
            info!(documents = count, output = ?output, "Corpus cleaned");
        }
        Commands::Extract {
            lexicon,
            documents,
            config,
            output_dir,
        } => {
            let mut config = AppConfig::load(config.as_deref()).await?;
            if let Some(dir) = output_dir {
                config.export.output_dir = dir;
            }

            let reports = run_extraction(&config, &lexicon, &documents).await?;
            let written = write_all(&config.export.output_dir, &reports, &config.export.delimiter)?;
            for report in &reports {
                println!(
                    "{:<14} {:>5} responses {:>5} parsed {:>6} relations {:>5} identifiers",
                    report.subject,
                    report.stats.responses,
                    report.stats.parsed(),
                    report.stats.resolved_relations,
                    report.table.len()
                );
            }
            info!(files = written.len(), dir = ?config.export.output_dir, "Export complete");
        }
    }

    Ok(())
}
