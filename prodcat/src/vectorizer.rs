//! TF-IDF vectorization of titles.

use std::collections::BTreeMap;

use bincode::{Decode, Encode};

use crate::errors::{ProdcatError, Result};

/// Splits text into terms: runs of two or more word characters.
pub fn analyze(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|term| term.chars().nth(1).is_some())
}

/// A fitted TF-IDF transform.
///
/// The vocabulary is sorted, so a term's column is its position in the vocabulary. Document
/// vectors are L2-normalized and `idf = ln((1 + n_docs) / (1 + df)) + 1`.
#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct TfidfVectorizer {
    vocabulary: Vec<String>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Fits the vocabulary and the inverse document frequencies.
    ///
    /// # Arguments
    ///
    /// * `docs` - Training documents.
    ///
    /// # Returns
    ///
    /// A fitted vectorizer.
    pub fn fit<I, S>(docs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut dfs: BTreeMap<String, usize> = BTreeMap::new();
        let mut n_docs = 0;
        for doc in docs {
            n_docs += 1;
            let mut terms: Vec<&str> = analyze(doc.as_ref()).collect();
            terms.sort_unstable();
            terms.dedup();
            for term in terms {
                if let Some(df) = dfs.get_mut(term) {
                    *df += 1;
                } else {
                    dfs.insert(term.to_string(), 1);
                }
            }
        }
        let n_docs = n_docs as f64;
        let mut vocabulary = Vec::with_capacity(dfs.len());
        let mut idf = Vec::with_capacity(dfs.len());
        for (term, df) in dfs {
            vocabulary.push(term);
            idf.push(((1.0 + n_docs) / (1.0 + df as f64)).ln() + 1.0);
        }
        Self { vocabulary, idf }
    }

    /// Number of output dimensions.
    pub fn n_features(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    /// Returns the column of a term.
    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.vocabulary
            .binary_search_by(|w| w.as_str().cmp(term))
            .ok()
    }

    /// Transforms a document into a sparse vector sorted by column. Unknown terms are ignored.
    pub fn transform(&self, doc: &str) -> Vec<(usize, f64)> {
        let mut tf: BTreeMap<usize, f64> = BTreeMap::new();
        for term in analyze(doc) {
            if let Some(idx) = self.term_index(term) {
                *tf.entry(idx).or_insert(0.0) += 1.0;
            }
        }
        let mut vec: Vec<(usize, f64)> = tf
            .into_iter()
            .map(|(idx, count)| (idx, count * self.idf[idx]))
            .collect();
        let norm = vec.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, v) in &mut vec {
                *v /= norm;
            }
        }
        vec
    }

    /// Checks the internal consistency of a decoded vectorizer.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.vocabulary.len() != self.idf.len() {
            return Err(ProdcatError::invalid_model(
                "vocabulary and idf sizes differ",
            ));
        }
        if self.vocabulary.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ProdcatError::invalid_model(
                "vocabulary is not sorted",
            ));
        }
        Ok(())
    }
}
