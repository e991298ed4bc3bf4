//! Linear classifier over TF-IDF terms and keyword indicators.

use bincode::{Decode, Encode};

use crate::errors::{ProdcatError, Result};
use crate::feature::FeatureRecord;
use crate::vectorizer::TfidfVectorizer;

/// Trained classifier.
///
/// The input vector is the TF-IDF vector of the title followed by the keyword indicators in
/// schema order. Each class has one weight per input dimension and a bias; the class with the
/// highest score wins, and ties go to the class that appeared first in the training data.
#[derive(Clone, Debug, PartialEq, Encode, Decode)]
pub struct Classifier {
    pub(crate) vectorizer: TfidfVectorizer,
    pub(crate) n_indicators: usize,
    pub(crate) labels: Vec<String>,
    pub(crate) weights: Vec<Vec<f64>>,
    pub(crate) bias: Vec<f64>,
}

impl Classifier {
    /// Category labels in class order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Number of indicator fields this classifier was trained with.
    pub const fn n_indicators(&self) -> usize {
        self.n_indicators
    }

    pub const fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    fn n_dims(&self) -> usize {
        self.vectorizer.n_features() + self.n_indicators
    }

    /// Computes the score of every class.
    ///
    /// # Errors
    ///
    /// [`ProdcatError::ArtifactMismatch`] will be returned if the record does not have the number
    /// of indicators the classifier was trained with.
    pub fn decision_function(&self, record: &FeatureRecord) -> Result<Vec<f64>> {
        if record.indicators().len() != self.n_indicators {
            return Err(ProdcatError::artifact_mismatch(format!(
                "record has {} indicators but the classifier expects {}",
                record.indicators().len(),
                self.n_indicators,
            )));
        }
        let text = self.vectorizer.transform(record.product_title());
        let offset = self.vectorizer.n_features();
        let scores = self
            .weights
            .iter()
            .zip(&self.bias)
            .map(|(weights, &bias)| {
                let mut score = bias;
                for &(idx, v) in &text {
                    score += weights[idx] * v;
                }
                for (k, &x) in record.indicators().iter().enumerate() {
                    if x != 0 {
                        score += weights[offset + k];
                    }
                }
                score
            })
            .collect();
        Ok(scores)
    }

    /// Predicts the category of a record.
    ///
    /// # Errors
    ///
    /// See [`Classifier::decision_function`].
    pub fn predict(&self, record: &FeatureRecord) -> Result<&str> {
        let scores = self.decision_function(record)?;
        let mut best = 0;
        for (i, &score) in scores.iter().enumerate().skip(1) {
            if score > scores[best] {
                best = i;
            }
        }
        Ok(&self.labels[best])
    }

    /// Checks the internal consistency of a decoded classifier.
    pub(crate) fn validate(&self) -> Result<()> {
        self.vectorizer.validate()?;
        if self.labels.is_empty() {
            return Err(ProdcatError::invalid_model("classifier has no class"));
        }
        if self.weights.len() != self.labels.len() || self.bias.len() != self.labels.len() {
            return Err(ProdcatError::invalid_model(
                "the number of weight vectors does not match the number of classes",
            ));
        }
        let n_dims = self.n_dims();
        if self.weights.iter().any(|w| w.len() != n_dims) {
            return Err(ProdcatError::invalid_model(format!(
                "weight vectors must have {n_dims} dimensions",
            )));
        }
        Ok(())
    }
}
