//! tablesim CLI - Find similar tables in a metadata catalog
//!
//! Usage:
//!   tablesim compare <tables.json> [--config <file>] [--embeddings <vectors.json>] [--use-embeddings] [--format text|json]
//!   tablesim pair <tables.json> <table-a> <table-b> [--detailed]
//!
//! Examples:
//!   tablesim compare catalog.json
//!   tablesim compare catalog.json --embeddings vectors.json --use-embeddings --format json
//!   tablesim pair catalog.json orders orders_v2 --detailed

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tablesim::config::Settings;
use tablesim::driver::SimilarityDriver;
use tablesim::similarity::{CheckOptions, StaticEmbeddings};
use tablesim::{SimilarityEngine, TableInfo};

#[derive(Parser)]
#[command(name = "tablesim")]
#[command(about = "tablesim - Two-phase table and column similarity for metadata catalogs")]
#[command(version)]
struct Cli {
    /// Config file (defaults to TABLESIM_CONFIG, ./tablesim.toml, then the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare every pair of tables in a catalog file
    Compare {
        /// JSON array of tables
        file: PathBuf,

        /// JSON object of column id to vector
        #[arg(short, long)]
        embeddings: Option<PathBuf>,

        /// Consult embeddings in the detailed pass
        #[arg(long)]
        use_embeddings: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Explain the score of one table pair
    Pair {
        /// JSON array of tables
        file: PathBuf,

        table_a: String,

        table_b: String,

        /// Run the detailed pass instead of pruning only
        #[arg(short, long)]
        detailed: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// One line per pair
    Text,
    /// Full report as JSON
    Json,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so JSON output stays clean; RUST_LOG overrides the level
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let settings = match load_settings(cli.config.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Compare {
            file,
            embeddings,
            use_embeddings,
            format,
        } => cmd_compare(settings, file, embeddings, use_embeddings, format).await,
        Commands::Pair {
            file,
            table_a,
            table_b,
            detailed,
        } => cmd_pair(settings, file, &table_a, &table_b, detailed),
    }
}

fn load_settings(path: Option<&Path>) -> Result<Settings, tablesim::config::SettingsError> {
    let settings = match path {
        Some(path) => Settings::from_file(path)?,
        None => Settings::load()?,
    };
    settings.validate()?;
    Ok(settings)
}

fn read_tables(file: &Path) -> Option<Vec<TableInfo>> {
    let source = match fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", file.display(), e);
            return None;
        }
    };
    match serde_json::from_str(&source) {
        Ok(tables) => Some(tables),
        Err(e) => {
            eprintln!("Error parsing tables in '{}': {}", file.display(), e);
            None
        }
    }
}

async fn cmd_compare(
    mut settings: Settings,
    file: PathBuf,
    embeddings: Option<PathBuf>,
    use_embeddings: bool,
    format: OutputFormat,
) -> ExitCode {
    let Some(tables) = read_tables(&file) else {
        return ExitCode::FAILURE;
    };

    settings.engine.use_embeddings |= use_embeddings;
    let driver = match SimilarityDriver::from_settings(&settings) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let provider: StaticEmbeddings = match &embeddings {
        Some(path) => match fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|s| serde_json::from_str(&s).map_err(|e| e.to_string()))
        {
            Ok(provider) => provider,
            Err(e) => {
                eprintln!("Error reading embeddings '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => StaticEmbeddings::default(),
    };

    let report = driver.run_with_provider(&tables, &provider).await;

    match format {
        OutputFormat::Text => {
            print!("{}", report.render_text());
            let similar = report.similar_pairs().count();
            println!();
            println!("{} pairs, {} similar", report.len(), similar);
        }
        OutputFormat::Json => match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing report: {}", e);
                return ExitCode::FAILURE;
            }
        },
    }
    ExitCode::SUCCESS
}

fn cmd_pair(
    settings: Settings,
    file: PathBuf,
    table_a: &str,
    table_b: &str,
    detailed: bool,
) -> ExitCode {
    let Some(tables) = read_tables(&file) else {
        return ExitCode::FAILURE;
    };

    let find = |id: &str| tables.iter().find(|t| t.table_id() == id);
    let (Some(a), Some(b)) = (find(table_a), find(table_b)) else {
        eprintln!("Tables '{}' and '{}' must both be in '{}'", table_a, table_b, file.display());
        return ExitCode::FAILURE;
    };

    let engine = match settings.to_config().map_err(|e| e.to_string()).and_then(|c| {
        SimilarityEngine::new(c).map_err(|e| e.to_string())
    }) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let options = if detailed {
        CheckOptions::detailed(false)
    } else {
        CheckOptions::pruning()
    };
    let (result, columns) = engine.check_similarity(a, b, options);
    let thresholds = engine.thresholds();

    println!("{} vs {} ({:?})", result.table_a, result.table_b, result.mode);
    println!("  score: {:.3} -> {}", result.score, result.label(thresholds));
    if let Some(note) = &result.note {
        println!("  note: {}", note);
    }
    println!();
    println!("Pruning signals:");
    for e in &result.evidence {
        match e.outcome.score() {
            Some(score) => println!("  - {:<18} {:.3} (weight {})", e.signal, score, e.weight),
            None => println!("  - {:<18} skipped (weight {})", e.signal, e.weight),
        }
    }

    if !columns.is_empty() {
        println!();
        println!("Matched columns:");
        for column in columns.values() {
            let score = column
                .score
                .map_or_else(|| "null".to_string(), |s| format!("{:.3}", s));
            println!(
                "  - {} ~ {}: {} ({})",
                column.column_a,
                column.column_b,
                score,
                column.label(thresholds.column)
            );
        }
    }
    for id in result.unmatched_a.iter().chain(&result.unmatched_b) {
        println!("  - {} unmatched", id);
    }

    ExitCode::SUCCESS
}
