use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use phrasetract::config::RunConfig;
use phrasetract::output::{print_query_report, print_run_summary};
use phrasetract::pipeline::{self, QueryOptions};
use phrasetract::query::DocumentColumns;
use phrasetract::utils::DEFAULT_MASK;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "phrasetract")]
#[command(about = "Keyword, phrase and regex extraction over pipe-delimited text tables")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Hide progress bars
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a configured extraction and write its reports
    Run {
        /// Properties or JSON configuration file
        #[arg(short, long)]
        config: PathBuf,

        /// Write reports here instead of the configured OutputDir
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Also build the word-pair index and its frequency report
        #[arg(long)]
        word_pairs: bool,
    },
    /// Index a document table and print the documents matching a query
    Query {
        /// Pipe-delimited document table
        #[arg(long)]
        text_file: PathBuf,

        /// Column holding the document text
        #[arg(long, default_value = "text")]
        text_column: String,

        /// Column holding the row id (rows are numbered from 0 otherwise)
        #[arg(long)]
        id_column: Option<String>,

        /// Separator mask of the tokenizer
        #[arg(long, default_value = DEFAULT_MASK)]
        mask: String,

        /// Match documents containing all words in any order
        #[arg(short, long)]
        all: bool,

        /// Query words
        #[arg(required = true, trailing_var_arg = true)]
        words: Vec<String>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let color = !cli.no_color;

    match cli.command {
        Commands::Run {
            config,
            output_dir,
            word_pairs,
        } => {
            let mut run_config = RunConfig::load(&config)
                .with_context(|| format!("Failed to load configuration {}", config.display()))?;
            if let Some(dir) = output_dir {
                run_config.output_dir = dir;
            }
            if word_pairs {
                run_config.word_pairs = true;
            }

            let summary = pipeline::run(&run_config, cli.quiet)?;
            print_run_summary(&summary, color)?;
        }
        Commands::Query {
            text_file,
            text_column,
            id_column,
            mask,
            all,
            words,
        } => {
            let options = QueryOptions {
                text_file,
                columns: DocumentColumns::new(text_column, id_column),
                mask,
                all,
                words,
            };
            let report = pipeline::query(&options, cli.quiet)?;
            print_query_report(&report, color)?;
        }
    }

    Ok(())
}
