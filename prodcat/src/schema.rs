//! Binary feature columns derived from the keyword table.

use bincode::{Decode, Encode};

use crate::errors::{ProdcatError, Result};
use crate::keywords::CategoryKeywordTable;

/// Derives the column name of a category, e.g. `mobile phones` -> `has_mobile_phones_word`.
pub fn derive_column_name(category: &str) -> String {
    format!("has_{}_word", category.replace(' ', "_"))
}

/// A binary column and the category it was derived from.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode)]
pub struct SchemaColumn {
    pub(crate) name: String,
    pub(crate) category: String,
}

impl SchemaColumn {
    pub fn new<S>(category: S) -> Self
    where
        S: Into<String>,
    {
        let category = category.into();
        Self {
            name: derive_column_name(&category),
            category,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &str {
        &self.category
    }
}

/// Ordered binary feature columns, one per category.
///
/// The category of each column is stored next to its name, so it is never recovered from the
/// name itself.
#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct BinaryFeatureSchema {
    columns: Vec<SchemaColumn>,
}

impl BinaryFeatureSchema {
    /// Derives a schema from a keyword table. Categories without keywords also get a column.
    pub fn from_table(table: &CategoryKeywordTable) -> Self {
        Self {
            columns: table.categories().map(SchemaColumn::new).collect(),
        }
    }

    /// Creates a schema from explicit columns.
    pub fn from_columns(columns: Vec<SchemaColumn>) -> Self {
        Self { columns }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[SchemaColumn] {
        &self.columns
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Checks that the schema has exactly one column per category of `table`, in table order.
    ///
    /// # Errors
    ///
    /// [`ProdcatError::ArtifactMismatch`] will be returned on any difference.
    pub fn validate(&self, table: &CategoryKeywordTable) -> Result<()> {
        if self.columns.len() != table.len() {
            return Err(ProdcatError::artifact_mismatch(format!(
                "schema has {} columns but the keyword table has {} categories",
                self.columns.len(),
                table.len(),
            )));
        }
        for (column, category) in self.columns.iter().zip(table.categories()) {
            if column.category != category || column.name != derive_column_name(category) {
                return Err(ProdcatError::artifact_mismatch(format!(
                    "column `{}` ({}) does not match category `{}`",
                    column.name, column.category, category,
                )));
            }
        }
        Ok(())
    }
}
