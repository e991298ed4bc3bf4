use crate::bundle::ArtifactBundle;
use crate::classifier::Classifier;
use crate::errors::Result;
use crate::feature::{FeatureBuilder, FeatureRecord};

/// Predictor.
///
/// Holds the classifier of a bundle together with a [`FeatureBuilder`] compiled from the same
/// bundle, so every query is encoded with the layout the classifier was trained with.
#[derive(Clone, Debug)]
pub struct Predictor {
    builder: FeatureBuilder,
    classifier: Classifier,
    run_id: u64,
}

impl Predictor {
    /// Creates a new predictor.
    ///
    /// # Arguments
    ///
    /// * `bundle` - Artifacts of one training run.
    ///
    /// # Errors
    ///
    /// [`crate::errors::ProdcatError::ArtifactMismatch`] will be returned if the feature layout
    /// cannot be compiled.
    pub fn new(bundle: ArtifactBundle) -> Result<Self> {
        let builder = bundle.feature_builder()?;
        let run_id = bundle.header().run_id();
        Ok(Self {
            builder,
            classifier: bundle.classifier().clone(),
            run_id,
        })
    }

    pub const fn features(&self) -> &FeatureBuilder {
        &self.builder
    }

    pub const fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub const fn run_id(&self) -> u64 {
        self.run_id
    }

    /// Encodes a raw title.
    pub fn encode(&self, title: &str) -> FeatureRecord {
        self.builder.build(title)
    }

    /// Predicts the category of a raw title.
    ///
    /// # Errors
    ///
    /// [`crate::errors::ProdcatError::ArtifactMismatch`] will be returned if the encoded record
    /// does not fit the classifier.
    pub fn predict(&self, title: &str) -> Result<&str> {
        let record = self.builder.build(title);
        self.classifier.predict(&record)
    }
}
