#![forbid(unsafe_code)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use merge_bench::cache::ResponseCache;
use merge_bench::dataset::{self, load_jsonl};
use merge_bench::eval::{run_eval, EvalOptions};
use merge_bench::language::Language;
use merge_bench::model::create_model;

#[derive(Parser)]
#[command(name = "merge-bench", version, about = "Merge conflict resolution benchmark harness")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a model on a language dataset
    Eval {
        /// Model identifier (e.g. "anthropic/claude-3.5-sonnet", "api/deepseek-r1")
        #[arg(long)]
        model_name: String,

        /// Programming language to evaluate
        #[arg(long, value_enum)]
        language: CliLanguage,

        /// Directory for evaluation outputs
        #[arg(long, default_value = "eval_outputs")]
        output_dir: PathBuf,

        /// Dataset split to evaluate
        #[arg(long, default_value = "test")]
        split: String,

        /// Explicit dataset path (JSONL); overrides the conventional layout
        #[arg(long)]
        dataset: Option<PathBuf>,

        /// Maximum number of parallel workers for API calls
        #[arg(long, default_value_t = 32)]
        max_workers: usize,

        /// Maximum number of samples to evaluate
        #[arg(long)]
        max_samples: Option<usize>,

        /// Response cache root (default: MERGE_BENCH_CACHE_DIR or query_cache)
        #[arg(long)]
        cache_dir: Option<PathBuf>,
    },
    /// Scan the response cache for empty or malformed entries
    CacheScan {
        #[arg(long)]
        cache_dir: Option<PathBuf>,
    },
    /// Delete empty or malformed cache entries
    CacheClean {
        #[arg(long)]
        cache_dir: Option<PathBuf>,

        /// Report what would be deleted without deleting
        #[arg(long)]
        dry_run: bool,
    },
}

/// CLI-facing language enum (clap::ValueEnum).
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliLanguage {
    Javascript,
    Typescript,
    Java,
    C,
    Cpp,
    Csharp,
    Rust,
    Php,
    Go,
    Python,
    Ruby,
}

impl From<CliLanguage> for Language {
    fn from(value: CliLanguage) -> Self {
        match value {
            CliLanguage::Javascript => Language::JavaScript,
            CliLanguage::Typescript => Language::TypeScript,
            CliLanguage::Java => Language::Java,
            CliLanguage::C => Language::C,
            CliLanguage::Cpp => Language::Cpp,
            CliLanguage::Csharp => Language::CSharp,
            CliLanguage::Rust => Language::Rust,
            CliLanguage::Php => Language::Php,
            CliLanguage::Go => Language::Go,
            CliLanguage::Python => Language::Python,
            CliLanguage::Ruby => Language::Ruby,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Eval {
            model_name,
            language,
            output_dir,
            split,
            dataset,
            max_workers,
            max_samples,
            cache_dir,
        } => {
            let language = Language::from(language);
            let cache =
                ResponseCache::new(cache_dir.unwrap_or_else(ResponseCache::default_root));

            // Configuration errors (missing credentials, unreachable local
            // setup) abort here, before any dataset work or API calls.
            let model = create_model(&model_name, cache)?;

            let dataset_path = match dataset {
                Some(path) => path,
                None => dataset::default_dataset_path(language, &split)
                    .ok_or("no dataset layout for this language; pass --dataset")?,
            };
            if !dataset_path.exists() {
                return Err(format!(
                    "dataset not found at {}; the {language} dataset may not have been built yet",
                    dataset_path.display()
                )
                .into());
            }
            let examples = load_jsonl(&dataset_path)?;

            let opts = EvalOptions {
                model_name: model_name.clone(),
                language,
                dataset: dataset_path.display().to_string(),
                split: split.clone(),
                output_dir: output_dir
                    .join(language.as_str())
                    .join(&split)
                    .join(&model_name),
                max_workers,
                max_samples,
            };
            let summary = run_eval(&model, &examples, &opts).await?;
            print!("{}", summary.render());
        }
        Commands::CacheScan { cache_dir } => {
            let cache =
                ResponseCache::new(cache_dir.unwrap_or_else(ResponseCache::default_root));
            let report = cache.scan()?;
            for (model, stats) in &report.models {
                println!(
                    "{model}: {} entries ({} valid, {} empty, {} malformed, {} unreadable)",
                    stats.total,
                    stats.valid,
                    stats.empty_results,
                    stats.malformed_json,
                    stats.unreadable
                );
            }
            println!(
                "total: {} entries, {} problematic",
                report.total_entries,
                report.problematic.len()
            );
        }
        Commands::CacheClean { cache_dir, dry_run } => {
            let cache =
                ResponseCache::new(cache_dir.unwrap_or_else(ResponseCache::default_root));
            let stats = cache.clean(dry_run)?;
            if dry_run {
                println!(
                    "would delete {} of {} entries",
                    stats.deleted, stats.examined
                );
            } else {
                println!("deleted {} of {} entries", stats.deleted, stats.examined);
            }
        }
    }

    Ok(())
}
