//! End-to-end training run.

use core::hash::{Hash, Hasher};
use std::io::Read;
use std::path::Path;

use tracing::info;

use crate::bundle::{ArtifactBundle, BundleHeader};
use crate::corpus::{CategoryAliases, Corpus, CorpusReader};
use crate::errors::{ProdcatError, Result};
use crate::feature::FeatureBuilder;
use crate::keywords::{ExtractionParams, KeywordExtractor};
use crate::normalize::{Normalization, TitleNormalizer};
use crate::schema::BinaryFeatureSchema;
use crate::trainer::{SolverType, Trainer};
use crate::utils::FingerprintHasher;

/// Stage of a [`TrainingPipeline`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrainingStage {
    Idle,
    Loading,
    Extracting,
    BuildingFeatures,
    Fitting,
    Persisted,
}

/// Parameters of a training run.
#[derive(Clone, Debug)]
pub struct TrainingConfig {
    pub extraction: ExtractionParams,

    /// The tolerance of the termination criterion.
    pub epsilon: f64,

    /// The parameter C.
    pub cost: f64,

    pub solver: SolverType,
    pub normalization: Normalization,
    pub aliases: CategoryAliases,

    /// zstd compression level of the written artifacts.
    pub zstd_level: i32,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            extraction: ExtractionParams::default(),
            epsilon: 1e-4,
            cost: 1.0,
            solver: SolverType::default(),
            normalization: Normalization::default(),
            aliases: CategoryAliases::default(),
            zstd_level: 19,
        }
    }
}

/// Trains a classifier from a CSV corpus and persists the artifacts.
///
/// The run is linear and all-or-nothing: any failure aborts it and nothing is written unless
/// fitting succeeded.
///
/// # Examples
///
/// ```no_run
/// use std::fs::File;
///
/// use prodcat::{TrainingConfig, TrainingPipeline};
///
/// let mut pipeline = TrainingPipeline::new(TrainingConfig::default()).unwrap();
/// let bundle = pipeline
///     .run(File::open("data/products.csv").unwrap(), "model")
///     .unwrap();
/// println!("{:016x}", bundle.header().run_id());
/// ```
#[cfg_attr(docsrs, doc(cfg(feature = "train")))]
pub struct TrainingPipeline {
    config: TrainingConfig,
    extractor: KeywordExtractor,
    stage: TrainingStage,
}

impl TrainingPipeline {
    /// Creates a new pipeline.
    ///
    /// # Errors
    ///
    /// [`ProdcatError::InvalidArgument`] will be returned if a parameter is out of range.
    pub fn new(config: TrainingConfig) -> Result<Self> {
        let extractor = KeywordExtractor::new(config.extraction)?;
        if !(config.epsilon.is_finite() && config.epsilon > 0.0) {
            return Err(ProdcatError::invalid_argument(
                "epsilon",
                "must be a positive finite number",
            ));
        }
        if !(config.cost.is_finite() && config.cost > 0.0) {
            return Err(ProdcatError::invalid_argument(
                "cost",
                "must be a positive finite number",
            ));
        }
        Ok(Self {
            config,
            extractor,
            stage: TrainingStage::Idle,
        })
    }

    pub const fn stage(&self) -> TrainingStage {
        self.stage
    }

    pub const fn config(&self) -> &TrainingConfig {
        &self.config
    }

    fn enter(&mut self, stage: TrainingStage) {
        info!(from = ?self.stage, to = ?stage, "training stage");
        self.stage = stage;
    }

    /// Computes the identifier of a run over `corpus` with the current parameters.
    pub fn run_id(&self, corpus: &Corpus) -> u64 {
        let mut hasher = FingerprintHasher::new();
        corpus.fingerprint().hash(&mut hasher);
        self.config.extraction.min_count.hash(&mut hasher);
        self.config.extraction.max_ratio.to_bits().hash(&mut hasher);
        self.config.extraction.max_keywords.hash(&mut hasher);
        self.config.epsilon.to_bits().hash(&mut hasher);
        self.config.cost.to_bits().hash(&mut hasher);
        (self.config.solver as u8).hash(&mut hasher);
        (self.config.normalization as u8).hash(&mut hasher);
        hasher.finish()
    }

    /// Trains from a CSV source without persisting.
    ///
    /// # Errors
    ///
    /// If the pipeline was already used, the data is unusable, or LIBLINEAR fails, an error
    /// variant will be returned.
    pub fn fit<R>(&mut self, rdr: R) -> Result<ArtifactBundle>
    where
        R: Read,
    {
        if self.stage != TrainingStage::Idle {
            return Err(ProdcatError::invalid_argument(
                "pipeline",
                "a pipeline can only run once",
            ));
        }

        self.enter(TrainingStage::Loading);
        let normalizer = TitleNormalizer::new(self.config.normalization);
        let corpus = CorpusReader::new(normalizer, self.config.aliases.clone()).read(rdr)?;
        let n_categories = corpus.categories().len();
        if n_categories < 2 {
            return Err(ProdcatError::invalid_data(format!(
                "at least two categories are required, but the corpus has {n_categories}"
            )));
        }
        info!(n_records = corpus.len(), n_categories, "loaded corpus");

        self.enter(TrainingStage::Extracting);
        let keywords = self.extractor.extract(&corpus);
        let schema = BinaryFeatureSchema::from_table(&keywords);

        self.enter(TrainingStage::BuildingFeatures);
        let header = BundleHeader::new(self.run_id(&corpus), self.config.normalization);
        let builder = FeatureBuilder::new(&keywords, &schema, normalizer)?;
        let mut trainer = Trainer::new(builder.n_indicators());
        for record in corpus.records() {
            trainer.push_record(builder.build_normalized(record.title.clone()), &record.label)?;
        }

        self.enter(TrainingStage::Fitting);
        let classifier = trainer.train(self.config.epsilon, self.config.cost, self.config.solver)?;

        ArtifactBundle::new(header, classifier, keywords, schema)
    }

    /// Trains from a CSV source and writes the artifacts into `dir`.
    ///
    /// # Errors
    ///
    /// See [`TrainingPipeline::fit`] and [`ArtifactBundle::write_dir`].
    pub fn run<R, P>(&mut self, rdr: R, dir: P) -> Result<ArtifactBundle>
    where
        R: Read,
        P: AsRef<Path>,
    {
        let bundle = self.fit(rdr)?;
        bundle.write_dir(dir, self.config.zstd_level)?;
        self.enter(TrainingStage::Persisted);
        Ok(bundle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::predictor::Predictor;
    use crate::service::PredictionService;

    fn corpus_csv() -> String {
        let mut csv = String::from("Product ID,Product Title, Category Label,_Number of Views\n");
        for i in 0..25 {
            csv.push_str(&format!("{i},Samsung Galaxy Smartphone {i} GB,Phone,3\n"));
            csv.push_str(&format!("{i},Sony Bravia Television {i} inch,TV,5\n"));
            csv.push_str(&format!("{i},Intel Core Processor i{i},cpu,1\n"));
        }
        // Duplicate after cleaning.
        csv.push_str("99,SONY bravia television 0 inch!,tvs,2\n");
        csv
    }

    #[test]
    fn test_pipeline_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut pipeline = TrainingPipeline::new(TrainingConfig::default()).unwrap();
        assert_eq!(TrainingStage::Idle, pipeline.stage());

        let bundle = pipeline.run(corpus_csv().as_bytes(), dir.path()).unwrap();
        assert_eq!(TrainingStage::Persisted, pipeline.stage());

        assert_eq!(
            vec!["mobile phones", "tvs", "cpus"],
            bundle.keywords().categories().collect::<Vec<_>>()
        );
        let phones = bundle.keywords().get("mobile phones").unwrap();
        assert!(phones.contains(&"smartphone".to_string()));
        assert!(phones.iter().all(|w| w.chars().all(char::is_alphabetic)));
        assert_eq!(
            vec!["has_mobile_phones_word", "has_tvs_word", "has_cpus_word"],
            bundle.schema().names().collect::<Vec<_>>()
        );
        assert_eq!(3, bundle.classifier().n_indicators());

        let predictor = Predictor::new(bundle.clone()).unwrap();
        assert_eq!(
            "mobile phones",
            predictor.predict("Refurbished Smartphone Unlocked").unwrap()
        );
        assert_eq!(
            &[1u8, 0, 0][..],
            predictor.encode("Refurbished Smartphone Unlocked").indicators()
        );

        let mut service = PredictionService::new();
        service.load_dir(dir.path()).unwrap();
        let mut output = vec![];
        service
            .run(&b"sony television\nintel processor\nexit\n"[..], &mut output)
            .unwrap();
        assert_eq!("tvs\ncpus\n", String::from_utf8(output).unwrap());
    }

    #[test]
    fn test_pipeline_run_id_is_stable() {
        let mut pipeline1 = TrainingPipeline::new(TrainingConfig::default()).unwrap();
        let mut pipeline2 = TrainingPipeline::new(TrainingConfig::default()).unwrap();
        let bundle1 = pipeline1.fit(corpus_csv().as_bytes()).unwrap();
        let bundle2 = pipeline2.fit(corpus_csv().as_bytes()).unwrap();

        assert_eq!(bundle1.header(), bundle2.header());
        assert_eq!(TrainingStage::Fitting, pipeline1.stage());

        let config = TrainingConfig {
            cost: 0.5,
            ..TrainingConfig::default()
        };
        let mut pipeline3 = TrainingPipeline::new(config).unwrap();
        let bundle3 = pipeline3.fit(corpus_csv().as_bytes()).unwrap();
        assert_ne!(bundle1.header().run_id(), bundle3.header().run_id());
    }

    #[test]
    fn test_pipeline_runs_once() {
        let mut pipeline = TrainingPipeline::new(TrainingConfig::default()).unwrap();
        pipeline.fit(corpus_csv().as_bytes()).unwrap();

        assert!(pipeline.fit(corpus_csv().as_bytes()).is_err());
    }

    #[test]
    fn test_pipeline_single_category() {
        let mut pipeline = TrainingPipeline::new(TrainingConfig::default()).unwrap();
        let result = pipeline.fit("product_title,category_label\nsony tv,tvs\nlg tv,tv\n".as_bytes());

        assert_eq!(
            "InvalidDataError: at least two categories are required, but the corpus has 1",
            &result.err().unwrap().to_string()
        );
        assert_eq!(TrainingStage::Loading, pipeline.stage());
    }

    #[test]
    fn test_pipeline_missing_column() {
        let mut pipeline = TrainingPipeline::new(TrainingConfig::default()).unwrap();
        let result = pipeline.fit("title,category_label\nsony tv,tvs\n".as_bytes());

        assert!(matches!(result.err().unwrap(), ProdcatError::InvalidData(_)));
    }

    #[test]
    fn test_pipeline_invalid_params() {
        let config = TrainingConfig {
            epsilon: 0.0,
            ..TrainingConfig::default()
        };

        assert!(TrainingPipeline::new(config).is_err());
    }
}
