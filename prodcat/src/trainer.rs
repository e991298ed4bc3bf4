use std::str::FromStr;

use liblinear::LibLinearModel;
use tracing::info;

use crate::classifier::Classifier;
use crate::errors::{ProdcatError, Result};
use crate::feature::FeatureRecord;
use crate::utils::Indexer;
use crate::vectorizer::TfidfVectorizer;

/// Linear SVM solvers, numbered as LIBLINEAR numbers them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SolverType {
    /// Dual coordinate descent on the squared hinge loss, L2 penalty.
    #[default]
    SquaredHingeDual = 1,

    /// Newton method on the squared hinge loss, L2 penalty.
    SquaredHingePrimal = 2,

    /// Dual coordinate descent on the hinge loss, L2 penalty.
    HingeDual = 3,

    /// Multi-class SVM by Crammer and Singer.
    CrammerSinger = 4,

    /// Squared hinge loss with an L1 penalty, which yields sparse weights.
    SquaredHingeSparse = 5,
}

impl FromStr for SolverType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "1" => Self::SquaredHingeDual,
            "2" => Self::SquaredHingePrimal,
            "3" => Self::HingeDual,
            "4" => Self::CrammerSinger,
            "5" => Self::SquaredHingeSparse,
            _ => return Err(format!("`{s}` is not an SVM solver; use 1, 2, 3, 4 or 5")),
        })
    }
}

impl From<SolverType> for liblinear::SolverType {
    fn from(solver: SolverType) -> Self {
        match solver {
            SolverType::SquaredHingeDual => Self::L2R_L2LOSS_SVC_DUAL,
            SolverType::SquaredHingePrimal => Self::L2R_L2LOSS_SVC,
            SolverType::HingeDual => Self::L2R_L1LOSS_SVC_DUAL,
            SolverType::CrammerSinger => Self::MCSVM_CS,
            SolverType::SquaredHingeSparse => Self::L1R_L2LOSS_SVC,
        }
    }
}

/// Trainer of [`Classifier`].
///
/// # Examples
///
/// ```no_run
/// use prodcat::{
///     BinaryFeatureSchema, Corpus, ExtractionParams, FeatureBuilder, KeywordExtractor,
///     SolverType, TitleNormalizer, Trainer,
/// };
///
/// # let corpus = Corpus::default();
/// let table = KeywordExtractor::new(ExtractionParams::default()).unwrap().extract(&corpus);
/// let schema = BinaryFeatureSchema::from_table(&table);
/// let builder = FeatureBuilder::new(&table, &schema, TitleNormalizer::default()).unwrap();
///
/// let mut trainer = Trainer::new(builder.n_indicators());
/// for record in corpus.records() {
///     trainer
///         .push_record(builder.build_normalized(record.title.clone()), &record.label)
///         .unwrap();
/// }
/// let classifier = trainer
///     .train(1e-4, 1.0, SolverType::SquaredHingeDual)
///     .unwrap();
/// ```
#[cfg_attr(docsrs, doc(cfg(feature = "train")))]
pub struct Trainer {
    n_indicators: usize,
    label_ids: Indexer<String>,
    records: Vec<FeatureRecord>,
    ys: Vec<f64>,
}

impl Trainer {
    /// Creates a new trainer for records with `n_indicators` indicator fields.
    pub fn new(n_indicators: usize) -> Self {
        Self {
            n_indicators,
            label_ids: Indexer::new(),
            records: vec![],
            ys: vec![],
        }
    }

    /// Adds a labeled record.
    ///
    /// # Errors
    ///
    /// [`ProdcatError::ArtifactMismatch`] will be returned if the record was built with a
    /// different schema.
    pub fn push_record(&mut self, record: FeatureRecord, label: &str) -> Result<()> {
        if record.indicators().len() != self.n_indicators {
            return Err(ProdcatError::artifact_mismatch(format!(
                "record has {} indicators but the trainer expects {}",
                record.indicators().len(),
                self.n_indicators,
            )));
        }
        let id = self.label_ids.get_id(label);
        self.records.push(record);
        self.ys.push(id as f64);
        Ok(())
    }

    pub fn n_examples(&self) -> usize {
        self.records.len()
    }

    pub fn n_classes(&self) -> usize {
        self.label_ids.len()
    }

    /// Fits the TF-IDF transform and the linear model.
    ///
    /// # Arguments
    ///
    /// * `epsilon` - The tolerance of the termination criterion.
    /// * `cost` - The parameter C.
    /// * `solver` - Solver type.
    ///
    /// # Returns
    ///
    /// A trained classifier.
    ///
    /// # Errors
    ///
    /// [`ProdcatError::InvalidArgument`] will be returned if fewer than two classes were given,
    /// and [`ProdcatError::InvalidModel`] if LIBLINEAR fails.
    pub fn train(self, epsilon: f64, cost: f64, solver: SolverType) -> Result<Classifier> {
        if self.label_ids.len() < 2 {
            return Err(ProdcatError::invalid_argument(
                "records",
                "at least two categories are required",
            ));
        }
        let vectorizer = TfidfVectorizer::fit(self.records.iter().map(|r| r.product_title()));
        let n_text = vectorizer.n_features();
        info!(
            n_examples = self.records.len(),
            n_text_features = n_text,
            n_indicators = self.n_indicators,
            "fitted tf-idf vocabulary"
        );

        let mut xs = Vec::with_capacity(self.records.len());
        for record in &self.records {
            let mut x = vec![];
            for (idx, v) in vectorizer.transform(record.product_title()) {
                x.push((u32::try_from(idx + 1)?, v));
            }
            for (k, &ind) in record.indicators().iter().enumerate() {
                if ind != 0 {
                    x.push((u32::try_from(n_text + k + 1)?, 1.0));
                }
            }
            xs.push(x);
        }

        let mut builder = liblinear::Builder::new();
        let training_input = liblinear::util::TrainingInput::from_sparse_features(self.ys, xs)
            .map_err(|e| ProdcatError::invalid_model(format!("liblinear error: {e:?}")))?;
        builder.problem().input_data(training_input).bias(1.0);
        builder
            .parameters()
            .solver_type(solver.into())
            .stopping_criterion(epsilon)
            .constraints_violation_cost(cost);
        liblinear::toggle_liblinear_stdout_output(false);
        let model = builder
            .build_model()
            .map_err(|e| ProdcatError::invalid_model(e.to_string()));
        liblinear::toggle_liblinear_stdout_output(true);
        let model = model?;

        let n_dims = n_text + self.n_indicators;
        let n_classes = self.label_ids.len();
        let mut weights = vec![vec![0.0; n_dims]; n_classes];
        let mut bias = vec![0.0; n_classes];
        for (i, &cls) in model.labels().iter().enumerate() {
            let label_idx = i32::try_from(i)?;
            let cls = usize::try_from(cls)?;
            bias[cls] = model.label_bias(label_idx);
            for (fid, w) in weights[cls].iter_mut().enumerate() {
                *w = model.feature_coefficient(i32::try_from(fid + 1)?, label_idx);
            }
        }

        let classifier = Classifier {
            vectorizer,
            n_indicators: self.n_indicators,
            labels: self.label_ids.into_keys(),
            weights,
            bias,
        };
        classifier.validate()?;
        Ok(classifier)
    }
}
