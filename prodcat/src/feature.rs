//! Construction of feature records from titles.

use hashbrown::HashSet;

use crate::errors::{ProdcatError, Result};
use crate::keywords::{tokenize, CategoryKeywordTable};
use crate::normalize::TitleNormalizer;
use crate::schema::BinaryFeatureSchema;

/// A title and one binary indicator per schema column.
///
/// Records are only created by [`FeatureBuilder`], so the number of indicators always equals the
/// number of schema columns the builder was compiled from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeatureRecord {
    product_title: String,
    indicators: Vec<u8>,
}

impl FeatureRecord {
    pub fn product_title(&self) -> &str {
        &self.product_title
    }

    pub fn indicators(&self) -> &[u8] {
        &self.indicators
    }

    /// Number of fields: the title plus every indicator.
    pub fn n_fields(&self) -> usize {
        1 + self.indicators.len()
    }
}

#[derive(Clone, Debug)]
struct ColumnMatcher {
    name: String,
    keywords: Vec<String>,
}

/// Builds [`FeatureRecord`]s with a fixed layout compiled from a schema.
#[derive(Clone, Debug)]
pub struct FeatureBuilder {
    normalizer: TitleNormalizer,
    columns: Vec<ColumnMatcher>,
}

impl FeatureBuilder {
    /// Compiles the layout of a schema.
    ///
    /// # Arguments
    ///
    /// * `table` - Keyword table.
    /// * `schema` - Binary feature schema.
    /// * `normalizer` - The normalizer the training titles were processed with.
    ///
    /// # Errors
    ///
    /// [`ProdcatError::ArtifactMismatch`] will be returned if a column refers to a category that
    /// is absent from `table`.
    pub fn new(
        table: &CategoryKeywordTable,
        schema: &BinaryFeatureSchema,
        normalizer: TitleNormalizer,
    ) -> Result<Self> {
        let mut columns = Vec::with_capacity(schema.len());
        for column in schema.columns() {
            let keywords = table.get(column.category()).ok_or_else(|| {
                ProdcatError::artifact_mismatch(format!(
                    "column `{}` refers to category `{}` missing from the keyword table",
                    column.name(),
                    column.category(),
                ))
            })?;
            columns.push(ColumnMatcher {
                name: column.name().to_string(),
                keywords: keywords.to_vec(),
            });
        }
        Ok(Self {
            normalizer,
            columns,
        })
    }

    pub const fn normalizer(&self) -> &TitleNormalizer {
        &self.normalizer
    }

    /// Number of indicators of every record this builder creates.
    pub fn n_indicators(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Builds a record from a raw title.
    pub fn build(&self, title: &str) -> FeatureRecord {
        self.build_normalized(self.normalizer.normalize(title))
    }

    /// Builds a record from a title that has already been normalized.
    pub fn build_normalized(&self, title: String) -> FeatureRecord {
        let indicators = {
            let tokens: HashSet<&str> = tokenize(&title).collect();
            self.columns
                .iter()
                .map(|c| u8::from(c.keywords.iter().any(|k| tokens.contains(k.as_str()))))
                .collect()
        };
        FeatureRecord {
            product_title: title,
            indicators,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::normalize::Normalization;
    use crate::schema::SchemaColumn;

    fn table() -> CategoryKeywordTable {
        CategoryKeywordTable::new(vec![
            (
                "mobile phones".to_string(),
                vec!["smartphone".to_string(), "unlocked".to_string()],
            ),
            ("tvs".to_string(), vec!["television".to_string()]),
            ("cpus".to_string(), vec![]),
        ])
        .unwrap()
    }

    #[test]
    fn test_build_keyword_hit() {
        let table = table();
        let schema = BinaryFeatureSchema::from_table(&table);
        let builder = FeatureBuilder::new(&table, &schema, TitleNormalizer::default()).unwrap();
        let record = builder.build("Refurbished Smartphone Unlocked");

        assert_eq!("refurbished smartphone unlocked", record.product_title());
        assert_eq!(&[1u8, 0, 0][..], record.indicators());
        assert_eq!(4, record.n_fields());
        assert_eq!(
            vec!["has_mobile_phones_word", "has_tvs_word", "has_cpus_word"],
            builder.column_names().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_build_normalized_skips_normalizer() {
        let table = table();
        let schema = BinaryFeatureSchema::from_table(&table);
        let builder = FeatureBuilder::new(&table, &schema, TitleNormalizer::default()).unwrap();
        let record = builder.build_normalized("Unlocked smartphone, television".to_string());

        assert_eq!("Unlocked smartphone, television", record.product_title());
        assert_eq!(&[0u8, 1, 0][..], record.indicators());
    }

    #[test]
    fn test_build_whole_token_only() {
        let table = table();
        let schema = BinaryFeatureSchema::from_table(&table);
        let builder = FeatureBuilder::new(&table, &schema, TitleNormalizer::default()).unwrap();
        let record = builder.build("smartphones and televisions");

        assert_eq!(&[0u8, 0, 0][..], record.indicators());
    }

    #[test]
    fn test_build_punctuation_adjacent() {
        let table = table();
        let schema = BinaryFeatureSchema::from_table(&table);
        let builder = FeatureBuilder::new(&table, &schema, TitleNormalizer::default()).unwrap();
        let record = builder.build("4K Television, 55\"");

        assert_eq!("4k television 55", record.product_title());
        assert_eq!(&[0u8, 1, 0][..], record.indicators());
    }

    #[test]
    fn test_build_lowercase_only_keeps_punctuation() {
        let table = table();
        let schema = BinaryFeatureSchema::from_table(&table);
        let builder = FeatureBuilder::new(
            &table,
            &schema,
            TitleNormalizer::new(Normalization::LowercaseOnly),
        )
        .unwrap();
        let record = builder.build("4K Television, 55\"");

        assert_eq!(&[0u8, 0, 0][..], record.indicators());
    }

    #[test]
    fn test_build_empty_title() {
        let table = table();
        let schema = BinaryFeatureSchema::from_table(&table);
        let builder = FeatureBuilder::new(&table, &schema, TitleNormalizer::default()).unwrap();
        let record = builder.build("   ");

        assert_eq!("", record.product_title());
        assert_eq!(&[0u8, 0, 0][..], record.indicators());
    }

    #[test]
    fn test_build_deterministic() {
        let table = table();
        let schema = BinaryFeatureSchema::from_table(&table);
        let builder = FeatureBuilder::new(&table, &schema, TitleNormalizer::default()).unwrap();

        assert_eq!(
            builder.build("sony television"),
            builder.build("sony television")
        );
    }

    #[test]
    fn test_builder_schema_drift() {
        let table = table();
        let schema = BinaryFeatureSchema::from_columns(vec![
            SchemaColumn::new("mobile phones"),
            SchemaColumn::new("washing machines"),
        ]);
        let builder = FeatureBuilder::new(&table, &schema, TitleNormalizer::default());

        assert!(matches!(
            builder.err().unwrap(),
            ProdcatError::ArtifactMismatch(_)
        ));
    }
}
