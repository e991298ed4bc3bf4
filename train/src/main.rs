use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use clap::Parser;
use prodcat::{
    CategoryAliases, ExtractionParams, Normalization, SolverType, TrainingConfig,
    TrainingPipeline,
};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(about = "A program to train product category classifiers.")]
struct Args {
    /// A CSV file with `product_title` and `category_label` columns
    #[arg(long)]
    data: PathBuf,

    /// The directory to write the trained artifacts to
    #[arg(long)]
    model: PathBuf,

    /// Minimum number of occurrences of a keyword within its category
    #[arg(long, default_value = "20")]
    min_count: usize,

    /// Upper bound of the ratio of occurrences in other categories
    #[arg(long, default_value = "0.2")]
    max_ratio: f64,

    /// Maximum number of keywords per category
    #[arg(long, default_value = "30")]
    max_keywords: usize,

    /// The epsilon stopping criterion for classifier training
    #[arg(long, default_value = "0.0001")]
    eps: f64,

    /// The cost hyperparameter for classifier training
    #[arg(long, default_value = "1.0")]
    cost: f64,

    /// The SVM solver. {1, 2, 3, 4, 5} (see LIBLINEAR documentation for more details)
    #[arg(long, default_value = "1")]
    solver: SolverType,

    /// Only lowercase titles and collapse whitespace.
    #[arg(long)]
    no_norm: bool,

    /// A headerless CSV of `alias,category` pairs added to the built-in aliases
    #[arg(long)]
    aliases: Option<PathBuf>,

    /// The zstd compression level of the artifacts
    #[arg(long, default_value = "19")]
    zstd_level: i32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut aliases = CategoryAliases::default();
    if let Some(path) = &args.aliases {
        info!(?path, "loading aliases");
        aliases.extend_from_csv(BufReader::new(File::open(path)?))?;
    }
    let config = TrainingConfig {
        extraction: ExtractionParams {
            min_count: args.min_count,
            max_ratio: args.max_ratio,
            max_keywords: args.max_keywords,
        },
        epsilon: args.eps,
        cost: args.cost,
        solver: args.solver,
        normalization: if args.no_norm {
            Normalization::LowercaseOnly
        } else {
            Normalization::Standard
        },
        aliases,
        zstd_level: args.zstd_level,
    };

    info!(path = ?args.data, "loading dataset");
    let f = BufReader::new(File::open(&args.data)?);
    let mut pipeline = TrainingPipeline::new(config)?;
    let bundle = pipeline.run(f, &args.model)?;

    for entry in bundle.keywords().iter() {
        info!(
            category = entry.category(),
            keywords = ?entry.keywords(),
            "category keywords"
        );
    }
    eprintln!(
        "Model saved to {:?} (run {:016x})",
        args.model,
        bundle.header().run_id()
    );

    Ok(())
}
