//! Fixture loading.
//!
//! A manifest maps collection names to JSON files (each a top-level array of
//! documents in MongoDB extended JSON). Seeding replaces each listed
//! collection with the file's documents, then creates the query indexes.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use bson::{Bson, Document};
use mongodb::Database;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument};

use crate::db::{self, RepositoryError, collections};

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// A manifest or fixture file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A fixture file is not a JSON array of objects.
    #[error("invalid fixture {file}: {source}")]
    Json {
        file: String,
        #[source]
        source: FixtureError,
    },

    /// The manifest is not valid YAML of the expected shape.
    #[error("invalid manifest: {0}")]
    Manifest(String),

    /// Repository error.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Why a fixture file could not be turned into documents.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("malformed JSON: {0}")]
    Syntax(#[from] serde_json::Error),

    #[error("expected a top-level JSON array")]
    NotAnArray,

    #[error("element {index} is a {kind}, not an object")]
    NotAnObject { index: usize, kind: String },

    #[error("element {index}: {source}")]
    ExtendedJson {
        index: usize,
        #[source]
        source: bson::extjson::de::Error,
    },
}

impl From<mongodb::error::Error> for SeedError {
    fn from(e: mongodb::error::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}

/// Which file seeds which collection.
///
/// ```yaml
/// collections:
///   customers: customers.json
///   stores: stores.json
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedManifest {
    pub collections: BTreeMap<String, String>,
}

impl Default for SeedManifest {
    /// Every collection the queries read, each from `<name>.json`.
    fn default() -> Self {
        let collections = [
            collections::ADDRESSES,
            collections::CUSTOMERS,
            collections::DELIVERY_TASKS,
            collections::INVENTORY_LOGS,
            collections::PARTNERS,
            collections::PAST_ORDERS,
            collections::PRODUCTS,
            collections::RATINGS,
            collections::STORES,
        ]
        .into_iter()
        .map(|name| (name.to_string(), format!("{name}.json")))
        .collect();
        Self { collections }
    }
}

impl SeedManifest {
    /// Parse a manifest from YAML.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Manifest` if the YAML is invalid or lists no
    /// collections.
    pub fn from_yaml(content: &str) -> Result<Self, SeedError> {
        let manifest: Self = serde_yaml::from_str(content)
            .map_err(|e| SeedError::Manifest(format!("Failed to parse YAML: {e}")))?;
        if manifest.collections.is_empty() {
            return Err(SeedError::Manifest("no collections listed".to_string()));
        }
        Ok(manifest)
    }

    /// Read and parse a manifest file.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Io` if the file cannot be read, otherwise as
    /// [`SeedManifest::from_yaml`].
    pub async fn load(path: &Path) -> Result<Self, SeedError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| SeedError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_yaml(&content)
    }
}

/// Documents inserted per collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub collections: BTreeMap<String, usize>,
}

impl SeedReport {
    /// Documents inserted across all collections.
    #[must_use]
    pub fn total(&self) -> usize {
        self.collections.values().sum()
    }
}

/// Replace every collection in `manifest` with its fixture file from
/// `fixtures_dir`, then ensure indexes.
///
/// All files are read and parsed before anything is dropped, so a bad
/// fixture leaves the database untouched.
///
/// # Errors
///
/// Returns `SeedError::Io` / `SeedError::Json` for unreadable or malformed
/// fixtures, `SeedError::Repository` if a drop, insert or index fails.
#[instrument(skip(db, manifest), fields(dir = %fixtures_dir.display(), collections = manifest.collections.len()))]
pub async fn seed_from_manifest(
    db: &Database,
    fixtures_dir: &Path,
    manifest: &SeedManifest,
) -> Result<SeedReport, SeedError> {
    let mut loaded = Vec::with_capacity(manifest.collections.len());
    for (collection, file) in &manifest.collections {
        let path = fixtures_dir.join(file);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(source) => return Err(SeedError::Io { path, source }),
        };
        let docs = parse_fixture(&content).map_err(|source| SeedError::Json {
            file: file.clone(),
            source,
        })?;
        loaded.push((collection.as_str(), docs));
    }

    let mut report = SeedReport::default();
    for (collection, docs) in loaded {
        let coll = db.collection::<Document>(collection);
        coll.drop().await?;
        let count = docs.len();
        if !docs.is_empty() {
            coll.insert_many(docs).await?;
        }
        info!(collection, count, "Collection reloaded");
        report.collections.insert(collection.to_string(), count);
    }

    db::ensure_indexes(db).await?;
    info!(total = report.total(), "All collections have been reloaded");
    Ok(report)
}

/// Parse a fixture file: a JSON array of objects in extended JSON
/// (`{"$oid": ...}`, `{"$date": ...}` become native BSON values).
fn parse_fixture(content: &str) -> Result<Vec<Document>, FixtureError> {
    let value: serde_json::Value = serde_json::from_str(content)?;
    let serde_json::Value::Array(items) = value else {
        return Err(FixtureError::NotAnArray);
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match Bson::try_from(item) {
            Ok(Bson::Document(doc)) => Ok(doc),
            Ok(other) => Err(FixtureError::NotAnObject {
                index,
                kind: format!("{:?}", other.element_type()),
            }),
            Err(source) => Err(FixtureError::ExtendedJson { index, source }),
        })
        .collect()
}
