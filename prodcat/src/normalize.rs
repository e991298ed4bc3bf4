//! Title and label normalization shared by training and prediction.

use bincode::{Decode, Encode};

use crate::string_filters::{AlphanumericFilter, MemoryUnitFilter, StringFilter, WhitespaceFilter};

/// Normalization applied to titles. It is stored with the artifacts so that prediction reproduces
/// the training-time text exactly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Encode, Decode)]
pub enum Normalization {
    /// Lowercase, collapse whitespace, join memory sizes and drop non-alphanumeric characters.
    Standard,

    /// Lowercase and collapse whitespace only.
    LowercaseOnly,
}

impl Default for Normalization {
    fn default() -> Self {
        Self::Standard
    }
}

/// Applies a [`Normalization`] to titles.
#[derive(Clone, Copy, Debug, Default)]
pub struct TitleNormalizer {
    normalization: Normalization,
    whitespace: WhitespaceFilter,
    memory_unit: MemoryUnitFilter,
    alphanumeric: AlphanumericFilter,
}

impl TitleNormalizer {
    /// Creates a new normalizer.
    pub const fn new(normalization: Normalization) -> Self {
        Self {
            normalization,
            whitespace: WhitespaceFilter::new(),
            memory_unit: MemoryUnitFilter::new(),
            alphanumeric: AlphanumericFilter::new(),
        }
    }

    pub const fn normalization(&self) -> Normalization {
        self.normalization
    }

    /// Normalizes a title.
    ///
    /// # Arguments
    ///
    /// * `title` - A raw title.
    ///
    /// # Returns
    ///
    /// The normalized title.
    pub fn normalize(&self, title: &str) -> String {
        let s = self.whitespace.filter(title.to_lowercase());
        match self.normalization {
            Normalization::Standard => {
                let s = self.memory_unit.filter(s);
                let s = self.alphanumeric.filter(s);
                self.whitespace.filter(s)
            }
            Normalization::LowercaseOnly => s,
        }
    }
}

/// Lowercases and trims a category label.
pub fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_standard() {
        let normalizer = TitleNormalizer::new(Normalization::Standard);

        assert_eq!(
            "samsung galaxy s10 128gb prism white",
            normalizer.normalize("  Samsung Galaxy S10 - 128 GB  (Prism White) "),
        );
    }

    #[test]
    fn test_normalize_standard_slash_unit() {
        let normalizer = TitleNormalizer::new(Normalization::Standard);

        assert_eq!("iphone 7 32 gb", normalizer.normalize("iPhone 7 32/GB"));
    }

    #[test]
    fn test_normalize_lowercase_only() {
        let normalizer = TitleNormalizer::new(Normalization::LowercaseOnly);

        assert_eq!(
            "samsung galaxy s10 - 128 gb",
            normalizer.normalize(" Samsung  Galaxy S10 - 128 GB "),
        );
    }

    #[test]
    fn test_normalize_empty() {
        let normalizer = TitleNormalizer::default();

        assert_eq!("", normalizer.normalize("   "));
        assert_eq!("", normalizer.normalize("!!!"));
    }

    #[test]
    fn test_normalize_label() {
        assert_eq!("mobile phones", normalize_label("  Mobile Phones "));
    }
}
