//! Category-specific keyword extraction.

use bincode::{Decode, Encode};
use hashbrown::HashMap;
use tracing::{debug, info};

use crate::corpus::Corpus;
use crate::errors::{ProdcatError, Result};
use crate::utils::Indexer;

/// Splits a normalized title into tokens.
///
/// This is the only tokenizer used for keyword counting and keyword matching, in training and in
/// prediction alike.
pub fn tokenize(title: &str) -> impl Iterator<Item = &str> {
    title.split_whitespace()
}

/// Thresholds of [`KeywordExtractor`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExtractionParams {
    /// A keyword must occur at least this many times in its category.
    pub min_count: usize,

    /// Upper bound (exclusive) of `count_out / (count_in + 1)`.
    pub max_ratio: f64,

    /// Maximum number of keywords kept per category.
    pub max_keywords: usize,
}

impl Default for ExtractionParams {
    fn default() -> Self {
        Self {
            min_count: 20,
            max_ratio: 0.2,
            max_keywords: 30,
        }
    }
}

/// Keywords of a single category, strongest first.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode)]
pub struct CategoryKeywords {
    pub(crate) category: String,
    pub(crate) keywords: Vec<String>,
}

impl CategoryKeywords {
    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

/// Mapping from categories to their keywords, in first-encountered category order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct CategoryKeywordTable {
    entries: Vec<CategoryKeywords>,
}

impl CategoryKeywordTable {
    /// Creates a table from `(category, keywords)` pairs.
    ///
    /// # Errors
    ///
    /// [`ProdcatError::InvalidArgument`] will be returned if a category appears twice.
    pub fn new<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, Vec<String>)>,
    {
        let mut table = Self::default();
        for (category, keywords) in entries {
            if table.get(&category).is_some() {
                return Err(ProdcatError::invalid_argument(
                    "entries",
                    format!("duplicate category `{category}`"),
                ));
            }
            table.entries.push(CategoryKeywords { category, keywords });
        }
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryKeywords> {
        self.entries.iter()
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.category.as_str())
    }

    /// Gets keywords of a category.
    pub fn get(&self, category: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|e| e.category == category)
            .map(|e| e.keywords.as_slice())
    }
}

struct TokenCounts<'a> {
    words: Indexer<&'a str>,
    counts: Vec<usize>,
}

impl<'a> TokenCounts<'a> {
    fn new() -> Self {
        Self {
            words: Indexer::new(),
            counts: vec![],
        }
    }

    fn add(&mut self, word: &'a str) {
        let id = self.words.get_id(&word);
        if id == self.counts.len() {
            self.counts.push(0);
        }
        self.counts[id] += 1;
    }
}

fn is_keyword_shape(word: &str) -> bool {
    word.chars().count() > 2 && word.chars().all(char::is_alphabetic)
}

/// Extracts words that are frequent in one category and rare in all others.
///
/// # Examples
///
/// ```
/// use prodcat::{Corpus, ExtractionParams, KeywordExtractor, TitleRecord};
///
/// let mut records = vec![];
/// for _ in 0..3 {
///     records.push(TitleRecord::new("oled television", "tvs"));
///     records.push(TitleRecord::new("quad core processor", "cpus"));
/// }
/// let corpus = Corpus::from_records(records);
///
/// let params = ExtractionParams { min_count: 3, ..ExtractionParams::default() };
/// let table = KeywordExtractor::new(params).unwrap().extract(&corpus);
///
/// assert_eq!(Some(&["oled".to_string(), "television".to_string()][..]), table.get("tvs"));
/// ```
pub struct KeywordExtractor {
    params: ExtractionParams,
}

impl KeywordExtractor {
    /// Creates a new extractor.
    ///
    /// # Errors
    ///
    /// [`ProdcatError::InvalidArgument`] will be returned if `max_ratio` is not a positive finite
    /// number.
    pub fn new(params: ExtractionParams) -> Result<Self> {
        if !params.max_ratio.is_finite() || params.max_ratio <= 0.0 {
            return Err(ProdcatError::invalid_argument(
                "max_ratio",
                "must be a positive finite number",
            ));
        }
        Ok(Self { params })
    }

    pub const fn params(&self) -> &ExtractionParams {
        &self.params
    }

    /// Computes the keyword table of a corpus.
    ///
    /// # Arguments
    ///
    /// * `corpus` - Normalized training rows.
    ///
    /// # Returns
    ///
    /// One entry per category in first-encountered order. Categories without a qualifying word
    /// get an empty list.
    pub fn extract(&self, corpus: &Corpus) -> CategoryKeywordTable {
        let mut categories = Indexer::<&str>::new();
        let mut per_category: Vec<TokenCounts> = vec![];
        let mut totals: HashMap<&str, usize> = HashMap::new();
        for record in corpus.records() {
            let cid = categories.get_id(&record.label.as_str());
            if cid == per_category.len() {
                per_category.push(TokenCounts::new());
            }
            for word in tokenize(&record.title) {
                per_category[cid].add(word);
                *totals.entry(word).or_insert(0) += 1;
            }
        }

        let mut entries = Vec::with_capacity(categories.len());
        for (category, counts) in categories.keys().iter().zip(per_category) {
            let mut candidates = vec![];
            for (&word, &count_in) in counts.words.keys().iter().zip(&counts.counts) {
                let count_out = totals[word] - count_in;
                let ratio = count_out as f64 / (count_in + 1) as f64;
                if count_in >= self.params.min_count
                    && ratio < self.params.max_ratio
                    && is_keyword_shape(word)
                {
                    candidates.push((word, count_in));
                }
            }
            // Stable, so ties keep the first-encountered order.
            candidates.sort_by(|a, b| b.1.cmp(&a.1));
            candidates.truncate(self.params.max_keywords);
            debug!(
                category = *category,
                n_vocab = counts.words.len(),
                n_keywords = candidates.len(),
                "extracted keywords"
            );
            entries.push(CategoryKeywords {
                category: category.to_string(),
                keywords: candidates.into_iter().map(|(w, _)| w.to_string()).collect(),
            });
        }
        info!(
            n_categories = entries.len(),
            n_keywords = entries.iter().map(|e| e.keywords.len()).sum::<usize>(),
            "built keyword table"
        );
        CategoryKeywordTable { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::corpus::TitleRecord;

    fn push_titles(records: &mut Vec<TitleRecord>, title: &str, label: &str, n: usize) {
        for _ in 0..n {
            records.push(TitleRecord::new(title, label));
        }
    }

    fn count(corpus: &Corpus, word: &str, category: &str, inside: bool) -> usize {
        corpus
            .records()
            .iter()
            .filter(|r| (r.label == category) == inside)
            .map(|r| tokenize(&r.title).filter(|&t| t == word).count())
            .sum()
    }

    fn phone_corpus() -> Corpus {
        let mut records = vec![];
        push_titles(&mut records, "smartphone unlocked", "mobile phones", 15);
        push_titles(&mut records, "smartphone dual sim", "mobile phones", 10);
        push_titles(&mut records, "samsung smartphone", "tvs", 2);
        push_titles(&mut records, "samsung oled television", "tvs", 25);
        push_titles(&mut records, "intel processor", "cpus", 21);
        Corpus::from_records(records)
    }

    #[test]
    fn test_extractor_new_invalid_ratio() {
        let params = ExtractionParams {
            max_ratio: f64::NAN,
            ..ExtractionParams::default()
        };
        let extractor = KeywordExtractor::new(params);

        assert!(extractor.is_err());
        assert_eq!(
            "InvalidArgumentError: max_ratio: must be a positive finite number",
            &extractor.err().unwrap().to_string()
        );
    }

    #[test]
    fn test_extract_selects_smartphone() {
        let corpus = phone_corpus();
        let table = KeywordExtractor::new(ExtractionParams::default())
            .unwrap()
            .extract(&corpus);

        // count_in = 25, count_out = 2, ratio = 2 / 26.
        assert_eq!(25, count(&corpus, "smartphone", "mobile phones", true));
        assert_eq!(2, count(&corpus, "smartphone", "mobile phones", false));
        assert_eq!(
            Some(&["smartphone".to_string()][..]),
            table.get("mobile phones")
        );
    }

    #[test]
    fn test_extract_below_min_count() {
        let corpus = phone_corpus();
        let table = KeywordExtractor::new(ExtractionParams::default())
            .unwrap()
            .extract(&corpus);

        // "unlocked" occurs 15 times and only in "mobile phones".
        let keywords = table.get("mobile phones").unwrap();
        assert!(!keywords.contains(&"unlocked".to_string()));
        assert!(!keywords.contains(&"dual".to_string()));
    }

    #[test]
    fn test_extract_disjoint_words() {
        let corpus = phone_corpus();
        let table = KeywordExtractor::new(ExtractionParams::default())
            .unwrap()
            .extract(&corpus);

        // "samsung" has 27 occurrences in "tvs" and none elsewhere.
        let expected = vec!["samsung", "oled", "television"];
        assert_eq!(expected, table.get("tvs").unwrap());
        assert_eq!(vec!["intel", "processor"], table.get("cpus").unwrap());
    }

    #[test]
    fn test_extract_ratio_filter() {
        let mut records = vec![];
        push_titles(&mut records, "washer", "washing machines", 20);
        push_titles(&mut records, "washer", "dishwashers", 5);
        let corpus = Corpus::from_records(records);
        let table = KeywordExtractor::new(ExtractionParams::default())
            .unwrap()
            .extract(&corpus);

        // ratio = 5 / 21 >= 0.2
        assert_eq!(Some(&[][..]), table.get("washing machines"));
        assert_eq!(vec!["washing machines", "dishwashers"], table.categories().collect::<Vec<_>>());
    }

    #[test]
    fn test_extract_shape_filter() {
        let mut records = vec![];
        push_titles(&mut records, "lg 4k 55 led oled", "tvs", 20);
        push_titles(&mut records, "ryzen", "cpus", 20);
        let corpus = Corpus::from_records(records);
        let table = KeywordExtractor::new(ExtractionParams::default())
            .unwrap()
            .extract(&corpus);

        assert_eq!(vec!["led", "oled"], table.get("tvs").unwrap());
    }

    #[test]
    fn test_extract_ordering_and_truncation() {
        let mut records = vec![];
        push_titles(&mut records, "alpha beta", "a", 20);
        push_titles(&mut records, "gamma beta", "a", 5);
        push_titles(&mut records, "delta", "a", 20);
        push_titles(&mut records, "other", "b", 20);
        let corpus = Corpus::from_records(records);
        let params = ExtractionParams {
            max_keywords: 2,
            ..ExtractionParams::default()
        };
        let table = KeywordExtractor::new(params).unwrap().extract(&corpus);

        // beta: 25, alpha: 20, delta: 20 (alpha seen first), gamma: 5
        assert_eq!(vec!["beta", "alpha"], table.get("a").unwrap());
    }

    #[test]
    fn test_extract_bounded_and_sound() {
        let mut records = vec![];
        let words: Vec<String> = (0..40)
            .map(|i| format!("word{}", char::from(b'a' + (i % 26) as u8)).repeat(1 + i / 26))
            .collect();
        for w in &words {
            push_titles(&mut records, &format!("{w} common"), "big", 20);
        }
        push_titles(&mut records, "common", "small", 300);
        let corpus = Corpus::from_records(records);
        let params = ExtractionParams::default();
        let table = KeywordExtractor::new(params).unwrap().extract(&corpus);

        for entry in table.iter() {
            assert!(entry.keywords().len() <= 30);
            for w in entry.keywords() {
                let count_in = count(&corpus, w, entry.category(), true);
                let count_out = count(&corpus, w, entry.category(), false);
                assert!(count_in >= 20);
                assert!((count_out as f64 / (count_in + 1) as f64) < 0.2);
                assert!(w.chars().all(char::is_alphabetic));
                assert!(w.chars().count() > 2);
            }
        }
        assert_eq!(Some(&[][..]), table.get("small"));
    }

    #[test]
    fn test_table_duplicate_category() {
        let table = CategoryKeywordTable::new(vec![
            ("tvs".to_string(), vec![]),
            ("tvs".to_string(), vec!["oled".to_string()]),
        ]);

        assert!(table.is_err());
    }
}
