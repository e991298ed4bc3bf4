//! Labeled product titles.

use core::hash::{Hash, Hasher};
use std::io::Read;

use hashbrown::{HashMap, HashSet};
use tracing::{debug, info};

use crate::errors::{ProdcatError, Result};
use crate::normalize::{normalize_label, TitleNormalizer};
use crate::utils::{FingerprintHasher, Indexer};

pub const TITLE_COLUMN: &str = "product_title";
pub const LABEL_COLUMN: &str = "category_label";

// Spelling variants seen in merchant feeds.
const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("mobile phone", "mobile phones"),
    ("phone", "mobile phones"),
    ("phones", "mobile phones"),
    ("smartphones", "mobile phones"),
    ("fridge freezer", "fridge freezers"),
    ("fridge", "fridge freezers"),
    ("fridges", "fridge freezers"),
    ("freezer", "fridge freezers"),
    ("freezers", "fridge freezers"),
    ("washing machine", "washing machines"),
    ("cpu", "cpus"),
    ("tv", "tvs"),
    ("digital camera", "digital cameras"),
    ("microwave", "microwaves"),
];

/// Sanitizes a column name of a tabular dataset.
///
/// Trims, lowercases, strips leading underscores, replaces spaces and hyphens with underscores,
/// and drops the remaining characters outside `[a-zA-Z0-9_]`.
pub fn sanitize_column_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .trim_start_matches('_')
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

/// Mapping from label variants to canonical category names.
#[derive(Clone, Debug)]
pub struct CategoryAliases {
    map: HashMap<String, String>,
}

impl CategoryAliases {
    /// Creates an empty alias table.
    pub fn empty() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Adds an alias. Both sides are normalized like labels.
    pub fn insert(&mut self, alias: &str, canonical: &str) {
        self.map
            .insert(normalize_label(alias), normalize_label(canonical));
    }

    /// Reads `alias,canonical` rows from a headerless CSV source.
    ///
    /// # Errors
    ///
    /// When `rdr` generates an error or a row does not have two fields, an error variant will
    /// be returned.
    pub fn extend_from_csv<R>(&mut self, rdr: R) -> Result<()>
    where
        R: Read,
    {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(rdr);
        for record in rdr.records() {
            let record = record?;
            match (record.get(0), record.get(1)) {
                (Some(alias), Some(canonical)) => self.insert(alias, canonical),
                _ => {
                    return Err(ProdcatError::invalid_data(format!(
                        "alias row {:?} must have two fields",
                        record.position().map(|p| p.line()),
                    )))
                }
            }
        }
        Ok(())
    }

    /// Returns the canonical category name of a raw label.
    pub fn canonicalize(&self, label: &str) -> String {
        let label = normalize_label(label);
        match self.map.get(&label) {
            Some(canonical) => canonical.clone(),
            None => label,
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl Default for CategoryAliases {
    fn default() -> Self {
        let mut aliases = Self::empty();
        for (alias, canonical) in DEFAULT_ALIASES {
            aliases.insert(alias, canonical);
        }
        aliases
    }
}

/// A normalized title and its category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TitleRecord {
    pub title: String,
    pub label: String,
}

impl TitleRecord {
    pub fn new<T, L>(title: T, label: L) -> Self
    where
        T: Into<String>,
        L: Into<String>,
    {
        Self {
            title: title.into(),
            label: label.into(),
        }
    }
}

/// Normalized training rows.
#[derive(Clone, Debug, Default)]
pub struct Corpus {
    records: Vec<TitleRecord>,
}

impl Corpus {
    /// Creates a corpus from already normalized records.
    pub fn from_records(records: Vec<TitleRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[TitleRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns category names in first-encountered order.
    pub fn categories(&self) -> Vec<String> {
        let mut categories = Indexer::<String>::new();
        for record in &self.records {
            categories.get_id(record.label.as_str());
        }
        categories.into_keys()
    }

    /// Computes a fingerprint of the rows. Identical corpora give identical values.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = FingerprintHasher::new();
        self.records.len().hash(&mut hasher);
        for record in &self.records {
            record.title.hash(&mut hasher);
            record.label.hash(&mut hasher);
        }
        hasher.finish()
    }
}

/// Loads a [`Corpus`] from CSV.
pub struct CorpusReader {
    normalizer: TitleNormalizer,
    aliases: CategoryAliases,
}

impl CorpusReader {
    pub fn new(normalizer: TitleNormalizer, aliases: CategoryAliases) -> Self {
        Self {
            normalizer,
            aliases,
        }
    }

    /// Reads labeled titles from a CSV source with a header row.
    ///
    /// Rows with an empty title or label and rows whose normalized title was already seen are
    /// dropped. Columns other than `product_title` and `category_label` are ignored.
    ///
    /// # Errors
    ///
    /// If the required columns are missing, the CSV is malformed, or no row remains, an error
    /// variant will be returned.
    pub fn read<R>(&self, rdr: R) -> Result<Corpus>
    where
        R: Read,
    {
        let mut rdr = csv::Reader::from_reader(rdr);
        let headers: Vec<String> = rdr.headers()?.iter().map(sanitize_column_name).collect();
        let find_column = |name: &str| {
            headers.iter().position(|h| h == name).ok_or_else(|| {
                ProdcatError::invalid_data(format!("missing column `{name}` in {headers:?}"))
            })
        };
        let title_idx = find_column(TITLE_COLUMN)?;
        let label_idx = find_column(LABEL_COLUMN)?;

        let mut records = vec![];
        let mut seen = HashSet::new();
        let mut n_rows = 0;
        let mut n_dropped = 0;
        for row in rdr.records() {
            let row = row?;
            n_rows += 1;
            let raw_title = row.get(title_idx).unwrap_or_default();
            let raw_label = row.get(label_idx).unwrap_or_default();
            if raw_title.trim().is_empty() || raw_label.trim().is_empty() {
                n_dropped += 1;
                continue;
            }
            let title = self.normalizer.normalize(raw_title);
            if title.is_empty() || !seen.insert(title.clone()) {
                n_dropped += 1;
                continue;
            }
            records.push(TitleRecord {
                title,
                label: self.aliases.canonicalize(raw_label),
            });
        }
        debug!(n_rows, n_dropped, "read corpus rows");
        if records.is_empty() {
            return Err(ProdcatError::invalid_data("no usable rows in the dataset"));
        }
        let corpus = Corpus::from_records(records);
        info!(
            n_records = corpus.len(),
            n_categories = corpus.categories().len(),
            "loaded corpus"
        );
        Ok(corpus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::normalize::Normalization;

    #[test]
    fn test_sanitize_column_name() {
        assert_eq!("product_title", sanitize_column_name(" Product Title "));
        assert_eq!("category_label", sanitize_column_name("_Category-Label"));
        assert_eq!("number_of_views_", sanitize_column_name("Number of Views (#)"));
        assert_eq!("merchant_id", sanitize_column_name("__merchant id"));
    }

    #[test]
    fn test_aliases_default() {
        let aliases = CategoryAliases::default();

        assert_eq!("mobile phones", aliases.canonicalize(" Smartphones"));
        assert_eq!("fridge freezers", aliases.canonicalize("Fridge"));
        assert_eq!("tvs", aliases.canonicalize("TVs"));
        assert_eq!("kettles", aliases.canonicalize("Kettles"));
    }

    #[test]
    fn test_aliases_extend_from_csv() {
        let mut aliases = CategoryAliases::empty();
        aliases
            .extend_from_csv("Laptop,laptops\nnotebook, Laptops\n".as_bytes())
            .unwrap();

        assert_eq!(2, aliases.len());
        assert_eq!("laptops", aliases.canonicalize("notebook"));
    }

    #[test]
    fn test_aliases_extend_from_csv_short_row() {
        let mut aliases = CategoryAliases::empty();
        let result = aliases.extend_from_csv("laptop\n".as_bytes());

        assert!(result.is_err());
    }

    #[test]
    fn test_corpus_categories_first_encountered() {
        let corpus = Corpus::from_records(vec![
            TitleRecord::new("a", "tvs"),
            TitleRecord::new("b", "cpus"),
            TitleRecord::new("c", "tvs"),
            TitleRecord::new("d", "mobile phones"),
        ]);

        assert_eq!(vec!["tvs", "cpus", "mobile phones"], corpus.categories());
    }

    #[test]
    fn test_corpus_fingerprint() {
        let c1 = Corpus::from_records(vec![TitleRecord::new("a", "tvs")]);
        let c2 = Corpus::from_records(vec![TitleRecord::new("a", "tvs")]);
        let c3 = Corpus::from_records(vec![TitleRecord::new("a", "cpus")]);

        assert_eq!(c1.fingerprint(), c2.fingerprint());
        assert_ne!(c1.fingerprint(), c3.fingerprint());
    }

    #[test]
    fn test_corpus_reader() {
        let data = "\
Product ID, Product Title,Merchant ID, Category Label
1,Apple iPhone 8 Plus 64 GB,1,Mobile Phone
2,Bosch WAN28281GB Washing Machine,2,washing machine
3,apple iphone 8 plus 64gb,3,Smartphones
4,,4,TVs
5,Samsung UE55 TV,5,
6,Intel Core i7-8700K,6,CPU
";
        let reader = CorpusReader::new(
            TitleNormalizer::new(Normalization::Standard),
            CategoryAliases::default(),
        );
        let corpus = reader.read(data.as_bytes()).unwrap();

        let expected = vec![
            TitleRecord::new("apple iphone 8 plus 64gb", "mobile phones"),
            TitleRecord::new("bosch wan28281gb washing machine", "washing machines"),
            TitleRecord::new("intel core i7 8700k", "cpus"),
        ];
        assert_eq!(expected, corpus.records());
    }

    #[test]
    fn test_corpus_reader_missing_column() {
        let reader = CorpusReader::new(TitleNormalizer::default(), CategoryAliases::default());
        let result = reader.read("title,category_label\nfoo,bar\n".as_bytes());

        assert!(result.is_err());
        assert!(result
            .err()
            .unwrap()
            .to_string()
            .starts_with("InvalidDataError: missing column `product_title`"));
    }

    #[test]
    fn test_corpus_reader_empty() {
        let reader = CorpusReader::new(TitleNormalizer::default(), CategoryAliases::default());
        let result = reader.read("product_title,category_label\n".as_bytes());

        assert_eq!(
            "InvalidDataError: no usable rows in the dataset",
            &result.err().unwrap().to_string()
        );
    }
}
