#![cfg_attr(docsrs, feature(doc_cfg))]

//! # prodcat
//!
//! prodcat assigns product titles to categories with a linear classifier over TF-IDF terms,
//! augmented with one binary indicator per category that fires when the title contains one of
//! the category's keywords.
//!
//! ## Examples
//!
//! ```no_run
//! use prodcat::{ArtifactBundle, Predictor};
//!
//! let bundle = ArtifactBundle::read_dir("model").unwrap();
//! let predictor = Predictor::new(bundle).unwrap();
//!
//! println!("{}", predictor.predict("Samsung Galaxy S10 128GB Prism White").unwrap());
//! ```
//!
//! Training requires **crate feature** `train`. For more details, see [`TrainingPipeline`].

mod bundle;
mod classifier;
mod corpus;
mod evaluation;
mod feature;
mod keywords;
mod normalize;
mod predictor;
mod schema;
mod service;
mod utils;
mod vectorizer;

#[cfg(feature = "train")]
mod pipeline;
#[cfg(feature = "train")]
mod trainer;

pub mod errors;
pub mod string_filters;

pub use bundle::{ArtifactBundle, BundleHeader, CLASSIFIER_FILE, KEYWORDS_FILE, SCHEMA_FILE};
pub use classifier::Classifier;
pub use corpus::{
    sanitize_column_name, CategoryAliases, Corpus, CorpusReader, TitleRecord, LABEL_COLUMN,
    TITLE_COLUMN,
};
pub use evaluation::{CategoryScores, EvaluationReport, Evaluator};
pub use feature::{FeatureBuilder, FeatureRecord};
pub use keywords::{
    tokenize, CategoryKeywordTable, CategoryKeywords, ExtractionParams, KeywordExtractor,
};
pub use normalize::{normalize_label, Normalization, TitleNormalizer};
pub use predictor::Predictor;
pub use schema::{derive_column_name, BinaryFeatureSchema, SchemaColumn};
pub use service::{PredictionService, ServiceState, EXIT_SENTINEL};
pub use vectorizer::{analyze, TfidfVectorizer};

#[cfg(feature = "train")]
pub use pipeline::{TrainingConfig, TrainingPipeline, TrainingStage};
#[cfg(feature = "train")]
pub use trainer::{SolverType, Trainer};
