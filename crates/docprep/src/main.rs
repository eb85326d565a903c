//! docprep - document preparation CLI
//!
//! Turns PDFs into chunk files ready for retrieval, and talks to the hosted
//! document index.
//!
//! Usage:
//!   docprep extract <pdf>            Extract text from a PDF
//!   docprep chunk <file|dir>         Split text or PDFs into chunk files
//!   docprep embed <chunks.json|dir>  Attach embeddings to chunk files
//!   docprep info <chunks.json>       Summarize a chunk file
//!   docprep insert <resource>        Add a resource to the remote collection
//!   docprep query "question"         Ask the remote collection a question

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use colored::Colorize;
use docprep_core::{
    config::{default_config_path, load_config},
    chunk_file_info, extract_text_from_pdf, output_path_for, process_directory,
    process_document, save_text_to_file, ChunkFileInfo, CollectionClient, Config,
    EmbeddingGenerator, EstimatorKind, OpenAiBackend, ProcessSummary,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "docprep")]
#[command(about = "Prepare PDF documents for retrieval")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug); RUST_LOG also works
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract text from a PDF into a .txt file
    Extract {
        /// PDF to extract
        input: PathBuf,

        /// Output file (default: next to the input, with .txt)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Split a text file, a PDF, or every such file in a directory into chunks
    Chunk {
        /// File or directory to process
        path: PathBuf,

        /// Directory for chunk files
        #[arg(short = 'o', long, value_name = "DIR")]
        out_dir: Option<PathBuf>,

        /// Also save text extracted from PDFs into this directory
        #[arg(long, value_name = "DIR")]
        text_dir: Option<PathBuf>,

        #[command(flatten)]
        chunking: ChunkArgs,

        /// Print summaries as JSON
        #[arg(long)]
        json: bool,
    },
    /// Attach embeddings to every chunk of a chunk file, or of every chunk
    /// file in a directory
    Embed {
        /// Chunk file produced by `chunk`, or a directory of them
        input: PathBuf,

        /// Output file (default: <input>_with_embeddings.json); files only
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Embedding model
        #[arg(long, value_name = "MODEL")]
        model: Option<String>,

        /// Texts per API request
        #[arg(long)]
        batch_size: Option<usize>,
    },
    /// Show chunk and embedding counts plus sample chunks of a chunk file
    Info {
        /// Chunk file, with or without embeddings
        file: PathBuf,

        /// Number of sample chunks to show
        #[arg(short = 'n', long, default_value = "2")]
        samples: usize,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a resource (usually a document URL) to the remote collection
    Insert {
        /// Resource to insert
        resource: String,

        /// Resource type understood by the service
        #[arg(long = "type", default_value = "file")]
        resource_type: String,

        /// Collection id (default: config or WETRO_COLLECTION_ID)
        #[arg(long)]
        collection: Option<String>,
    },
    /// Ask a question against the remote collection
    Query {
        /// The question
        question: String,

        /// Collection id (default: config or WETRO_COLLECTION_ID)
        #[arg(long)]
        collection: Option<String>,

        /// Model used by the service to answer
        #[arg(long, value_name = "MODEL")]
        model: Option<String>,
    },
}

/// Chunking overrides; anything unset falls back to the config file.
#[derive(Args, Clone, Default)]
struct ChunkArgs {
    /// Maximum characters per chunk
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Characters repeated between consecutive chunks
    #[arg(long)]
    overlap: Option<usize>,

    /// Segment separator
    #[arg(long)]
    separator: Option<String>,

    /// Measure chunks in estimated tokens instead of characters
    #[arg(long)]
    by_tokens: bool,

    /// Maximum estimated tokens per chunk (with --by-tokens)
    #[arg(long)]
    max_tokens: Option<usize>,

    /// Token overlap between chunks (with --by-tokens)
    #[arg(long)]
    overlap_tokens: Option<usize>,

    /// Token estimator: chars or multilingual
    #[arg(long, value_name = "NAME")]
    estimator: Option<String>,
}

fn load_cli_config(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Ok(path) => path,
            Err(_) => return Ok(Config::default()),
        },
    };
    load_config(&path)
}

fn apply_chunk_args(config: &mut Config, args: &ChunkArgs) -> Result<()> {
    let chunking = config.chunking.get_or_insert_with(Default::default);

    if args.chunk_size.is_some() {
        chunking.chunk_size = args.chunk_size;
    }
    if args.overlap.is_some() {
        chunking.chunk_overlap = args.overlap;
    }
    if args.separator.is_some() {
        chunking.separator = args.separator.clone();
    }
    if args.by_tokens {
        chunking.by_tokens = Some(true);
    }
    if args.max_tokens.is_some() {
        chunking.max_tokens = args.max_tokens;
    }
    if args.overlap_tokens.is_some() {
        chunking.overlap_tokens = args.overlap_tokens;
    }
    if let Some(name) = &args.estimator {
        chunking.estimator = Some(name.parse::<EstimatorKind>()?);
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    let mut config = load_cli_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Extract { input, output } => cmd_extract(&input, output),
        Commands::Chunk {
            path,
            out_dir,
            text_dir,
            chunking,
            json,
        } => {
            apply_chunk_args(&mut config, &chunking)?;
            let paths = config.paths.get_or_insert_with(Default::default);
            if out_dir.is_some() {
                paths.output_dir = out_dir;
            }
            if text_dir.is_some() {
                paths.text_dir = text_dir;
            }
            cmd_chunk(&config, &path, json)
        }
        Commands::Embed {
            input,
            output,
            model,
            batch_size,
        } => {
            let embeddings = config.embeddings.get_or_insert_with(Default::default);
            if model.is_some() {
                embeddings.model = model;
            }
            if batch_size.is_some() {
                embeddings.batch_size = batch_size;
            }
            cmd_embed(&config, &input, output.as_deref())
        }
        Commands::Info {
            file,
            samples,
            json,
        } => cmd_info(&file, samples, json),
        Commands::Insert {
            resource,
            resource_type,
            collection,
        } => cmd_insert(&config, &resource, &resource_type, collection),
        Commands::Query {
            question,
            collection,
            model,
        } => cmd_query(&config, &question, collection, model),
    }
}

fn cmd_extract(input: &Path, output: Option<PathBuf>) -> Result<()> {
    let output = match output {
        Some(path) => path,
        None => output_path_for(input, None, Some("txt"))?,
    };

    let text = extract_text_from_pdf(input)?;
    save_text_to_file(&text, &output)?;

    println!(
        "{} {} characters to {}",
        "Extracted".green().bold(),
        text.chars().count(),
        output.display()
    );
    Ok(())
}

fn print_summary(summary: &ProcessSummary) {
    println!(
        "{} {} → {} ({} chunks, {} chars)",
        "✓".green(),
        summary.source.display(),
        summary.output.display(),
        summary.chunk_count.to_string().cyan(),
        summary.char_count
    );
}

fn summary_json(summary: &ProcessSummary) -> serde_json::Value {
    serde_json::json!({
        "source": summary.source.display().to_string(),
        "output": summary.output.display().to_string(),
        "chunk_count": summary.chunk_count,
        "char_count": summary.char_count,
    })
}

fn cmd_chunk(config: &Config, path: &Path, json: bool) -> Result<()> {
    let options = config.process_options()?;

    if !path.is_dir() {
        let summary = process_document(path, &options)?;
        if json {
            println!("{}", serde_json::to_string_pretty(&summary_json(&summary))?);
        } else {
            print_summary(&summary);
        }
        return Ok(());
    }

    let report = process_directory(path, &options)?;

    if json {
        let failed: Vec<_> = report
            .failed
            .iter()
            .map(|(file, error)| serde_json::json!({"source": file.display().to_string(), "error": error}))
            .collect();
        let processed: Vec<_> = report.processed.iter().map(summary_json).collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "processed": processed,
                "failed": failed,
            }))?
        );
    } else {
        for summary in &report.processed {
            print_summary(summary);
        }
        for (file, error) in &report.failed {
            println!("{} {}: {}", "✗".red(), file.display(), error);
        }
        println!(
            "{} {} processed, {} failed",
            "Done:".bold(),
            report.processed.len().to_string().green(),
            report.failed.len().to_string().yellow()
        );
    }

    if !report.failed.is_empty() {
        bail!("{} of the files in {} failed", report.failed.len(), path.display());
    }
    Ok(())
}

fn cmd_embed(config: &Config, input: &Path, output: Option<&Path>) -> Result<()> {
    if input.is_dir() && output.is_some() {
        bail!("--output only applies to a single chunk file, not {}", input.display());
    }

    let backend = OpenAiBackend::from_env()?
        .with_model(config.embedding_model())
        .with_base_url(config.embedding_base_url())
        .with_timeout(config.embedding_timeout());
    let generator = EmbeddingGenerator::with_options(backend, config.embedding_options());

    if !input.is_dir() {
        let output = generator.process_chunks_file(input, output)?;
        println!("{} {}", "Embeddings saved to".green().bold(), output.display());
        return Ok(());
    }

    let report = generator.process_chunks_directory(input)?;
    for output in &report.processed {
        println!("{} {}", "✓".green(), output.display());
    }
    for (file, error) in &report.failed {
        println!("{} {}: {}", "✗".red(), file.display(), error);
    }
    println!(
        "{} {} embedded, {} failed",
        "Done:".bold(),
        report.processed.len().to_string().green(),
        report.failed.len().to_string().yellow()
    );

    if !report.failed.is_empty() {
        bail!("{} of the chunk files in {} failed", report.failed.len(), input.display());
    }
    Ok(())
}

fn info_json(info: &ChunkFileInfo) -> serde_json::Value {
    let samples: Vec<_> = info
        .samples
        .iter()
        .map(|sample| {
            serde_json::json!({
                "index": sample.index,
                "char_count": sample.char_count,
                "preview": sample.preview,
                "metadata": sample.metadata,
            })
        })
        .collect();
    serde_json::json!({
        "chunk_count": info.chunk_count,
        "embedded_count": info.embedded_count,
        "embedding_dimensions": info.embedding_dimensions,
        "first_values": info.first_values,
        "samples": samples,
    })
}

fn cmd_info(file: &Path, samples: usize, json: bool) -> Result<()> {
    let info = chunk_file_info(file, samples)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info_json(&info))?);
        return Ok(());
    }

    println!("{} {}", "File:".bold(), file.display());
    println!("Chunks: {}", info.chunk_count.to_string().cyan());
    match info.embedding_dimensions {
        Some(dimensions) => {
            println!(
                "Embedded: {} ({} dimensions)",
                info.embedded_count, dimensions
            );
            println!("First values: {:?}", info.first_values);
        }
        None => println!("Embedded: {}", "none".yellow()),
    }

    for sample in &info.samples {
        println!();
        println!(
            "{} {} ({} chars)",
            "Chunk".bold(),
            sample.index,
            sample.char_count
        );
        println!("  {}...", sample.preview);
        println!(
            "  metadata: {}",
            serde_json::to_string(&sample.metadata)?.dimmed()
        );
    }
    Ok(())
}

fn collection_client(config: &Config) -> Result<CollectionClient> {
    Ok(CollectionClient::from_env()?
        .with_base_url(config.collection_base_url())
        .with_timeout(config.collection_timeout()))
}

fn resolve_collection(config: &Config, collection: Option<String>) -> Result<String> {
    collection
        .or_else(|| config.collection_id())
        .context("No collection id: pass --collection, set [collection] collection_id, or set WETRO_COLLECTION_ID")
}

fn cmd_insert(
    config: &Config,
    resource: &str,
    resource_type: &str,
    collection: Option<String>,
) -> Result<()> {
    let collection_id = resolve_collection(config, collection)?;
    let reply = collection_client(config)?.insert_resource(&collection_id, resource, resource_type)?;

    println!("{}", serde_json::to_string_pretty(&reply)?);
    Ok(())
}

fn cmd_query(
    config: &Config,
    question: &str,
    collection: Option<String>,
    model: Option<String>,
) -> Result<()> {
    let collection_id = resolve_collection(config, collection)?;
    let model = model.unwrap_or_else(|| config.query_model());
    let answer = collection_client(config)?.query(&collection_id, question, &model)?;

    println!("{answer}");
    Ok(())
}
