//! Persisted artifacts: classifier, keyword table and schema.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use bincode::{Decode, Encode};
use tracing::info;

use crate::classifier::Classifier;
use crate::errors::{ProdcatError, Result};
use crate::feature::FeatureBuilder;
use crate::keywords::CategoryKeywordTable;
use crate::normalize::{Normalization, TitleNormalizer};
use crate::schema::BinaryFeatureSchema;

pub const CLASSIFIER_FILE: &str = "classifier.bin";
pub const KEYWORDS_FILE: &str = "keywords.bin";
pub const SCHEMA_FILE: &str = "schema.bin";

const MAGIC: [u8; 8] = *b"PRODCAT\0";
const FORMAT_VERSION: u32 = 1;

/// Header written at the top of every artifact file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Encode, Decode)]
pub struct BundleHeader {
    magic: [u8; 8],
    format_version: u32,
    run_id: u64,
    normalization: Normalization,
}

impl BundleHeader {
    pub const fn new(run_id: u64, normalization: Normalization) -> Self {
        Self {
            magic: MAGIC,
            format_version: FORMAT_VERSION,
            run_id,
            normalization,
        }
    }

    /// Identifier of the training run the artifacts come from.
    pub const fn run_id(&self) -> u64 {
        self.run_id
    }

    pub const fn normalization(&self) -> Normalization {
        self.normalization
    }
}

fn write_artifact<W, T>(wtr: &mut W, header: &BundleHeader, payload: &T) -> Result<()>
where
    W: Write,
    T: Encode,
{
    let config = bincode::config::standard();
    bincode::encode_into_std_write(header, wtr, config)?;
    bincode::encode_into_std_write(payload, wtr, config)?;
    Ok(())
}

fn read_artifact<R, T>(rdr: &mut R, name: &str) -> Result<(BundleHeader, T)>
where
    R: Read,
    T: Decode<()>,
{
    let config = bincode::config::standard();
    let header: BundleHeader = bincode::decode_from_std_read(rdr, config)?;
    if header.magic != MAGIC {
        return Err(ProdcatError::invalid_model(format!(
            "{name} is not a prodcat artifact"
        )));
    }
    if header.format_version != FORMAT_VERSION {
        return Err(ProdcatError::invalid_model(format!(
            "{name} has format version {} but {FORMAT_VERSION} is supported",
            header.format_version,
        )));
    }
    let payload = bincode::decode_from_std_read(rdr, config)?;
    Ok((header, payload))
}

/// The trio of artifacts produced by one training run.
///
/// A bundle is validated whenever it is created or loaded, so a value of this type always has a
/// schema matching its keyword table and a classifier trained with that schema.
#[derive(Clone, Debug)]
pub struct ArtifactBundle {
    header: BundleHeader,
    classifier: Classifier,
    keywords: CategoryKeywordTable,
    schema: BinaryFeatureSchema,
}

impl ArtifactBundle {
    /// Creates a bundle.
    ///
    /// # Errors
    ///
    /// [`ProdcatError::ArtifactMismatch`] will be returned if the parts do not fit together.
    pub fn new(
        header: BundleHeader,
        classifier: Classifier,
        keywords: CategoryKeywordTable,
        schema: BinaryFeatureSchema,
    ) -> Result<Self> {
        let bundle = Self {
            header,
            classifier,
            keywords,
            schema,
        };
        bundle.validate()?;
        Ok(bundle)
    }

    fn validate(&self) -> Result<()> {
        self.classifier.validate()?;
        self.schema.validate(&self.keywords)?;
        if self.classifier.n_indicators() != self.schema.len() {
            return Err(ProdcatError::artifact_mismatch(format!(
                "classifier was trained with {} indicators but the schema has {} columns",
                self.classifier.n_indicators(),
                self.schema.len(),
            )));
        }
        Ok(())
    }

    pub const fn header(&self) -> &BundleHeader {
        &self.header
    }

    pub const fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub const fn keywords(&self) -> &CategoryKeywordTable {
        &self.keywords
    }

    pub const fn schema(&self) -> &BinaryFeatureSchema {
        &self.schema
    }

    /// Compiles the feature layout of this bundle.
    ///
    /// # Errors
    ///
    /// [`ProdcatError::ArtifactMismatch`] will be returned if the schema refers to an unknown
    /// category.
    pub fn feature_builder(&self) -> Result<FeatureBuilder> {
        FeatureBuilder::new(
            &self.keywords,
            &self.schema,
            TitleNormalizer::new(self.header.normalization),
        )
    }

    /// Writes the three artifacts into a directory, creating it if necessary.
    ///
    /// # Arguments
    ///
    /// * `dir` - Output directory.
    /// * `level` - zstd compression level.
    ///
    /// # Errors
    ///
    /// When a file cannot be written, an error variant will be returned.
    pub fn write_dir<P>(&self, dir: P, level: i32) -> Result<()>
    where
        P: AsRef<Path>,
    {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        Self::write_file(&dir.join(CLASSIFIER_FILE), level, &self.header, &self.classifier)?;
        Self::write_file(&dir.join(KEYWORDS_FILE), level, &self.header, &self.keywords)?;
        Self::write_file(&dir.join(SCHEMA_FILE), level, &self.header, &self.schema)?;
        info!(dir = %dir.display(), run_id = self.header.run_id, "wrote artifacts");
        Ok(())
    }

    fn write_file<T>(path: &Path, level: i32, header: &BundleHeader, payload: &T) -> Result<()>
    where
        T: Encode,
    {
        let mut f = zstd::Encoder::new(BufWriter::new(File::create(path)?), level)?;
        write_artifact(&mut f, header, payload)?;
        f.finish()?.flush()?;
        Ok(())
    }

    /// Loads the three artifacts from a directory.
    ///
    /// # Errors
    ///
    /// [`ProdcatError::ArtifactMismatch`] will be returned if the files come from different
    /// training runs or do not fit together. I/O and decoding errors are returned as is.
    pub fn read_dir<P>(dir: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let dir = dir.as_ref();
        let (header, classifier) = Self::read_file(&dir.join(CLASSIFIER_FILE), CLASSIFIER_FILE)?;
        let (keywords_header, keywords) = Self::read_file(&dir.join(KEYWORDS_FILE), KEYWORDS_FILE)?;
        let (schema_header, schema) = Self::read_file(&dir.join(SCHEMA_FILE), SCHEMA_FILE)?;
        for (name, other) in [(KEYWORDS_FILE, keywords_header), (SCHEMA_FILE, schema_header)] {
            if other != header {
                return Err(ProdcatError::artifact_mismatch(format!(
                    "{name} (run {:016x}) does not belong to {CLASSIFIER_FILE} (run {:016x})",
                    other.run_id, header.run_id,
                )));
            }
        }
        let bundle = Self::new(header, classifier, keywords, schema)?;
        info!(
            dir = %dir.display(),
            run_id = header.run_id,
            n_categories = bundle.schema.len(),
            "loaded artifacts"
        );
        Ok(bundle)
    }

    fn read_file<T>(path: &Path, name: &str) -> Result<(BundleHeader, T)>
    where
        T: Decode<()>,
    {
        let mut f = zstd::Decoder::new(BufReader::new(File::open(path)?))?;
        read_artifact(&mut f, name)
    }
}
