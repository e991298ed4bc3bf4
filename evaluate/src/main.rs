use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use clap::Parser;
use prodcat::{ArtifactBundle, CategoryAliases, CorpusReader, Evaluator, Predictor};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(about = "A program to evaluate the accuracy of product category classifiers.")]
struct Args {
    /// The directory of the trained artifacts
    #[arg(long)]
    model: PathBuf,

    /// A CSV file with `product_title` and `category_label` columns
    #[arg(long)]
    data: PathBuf,

    /// A headerless CSV of `alias,category` pairs added to the built-in aliases
    #[arg(long)]
    aliases: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let bundle = ArtifactBundle::read_dir(&args.model)?;
    let predictor = Predictor::new(bundle)?;

    let mut aliases = CategoryAliases::default();
    if let Some(path) = &args.aliases {
        aliases.extend_from_csv(BufReader::new(File::open(path)?))?;
    }
    info!(path = ?args.data, "loading dataset");
    let reader = CorpusReader::new(*predictor.features().normalizer(), aliases);
    let corpus = reader.read(BufReader::new(File::open(&args.data)?))?;

    let mut evaluator = Evaluator::new(predictor.classifier().labels());
    evaluator.push_corpus(&predictor, &corpus)?;
    println!("{}", evaluator.report());

    Ok(())
}
