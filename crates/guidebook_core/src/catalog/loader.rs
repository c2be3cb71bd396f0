//! Catalog fetch and once-per-session caching.
//!
//! # Responsibility
//! - Fetch the bundled sight/souvenir JSON through a pluggable source.
//! - Share one decoded catalog between all callers of a session.
//!
//! # Invariants
//! - Each catalog is decoded at most once; repeated or concurrent loads reuse
//!   the first successful result.
//! - A failed load is not cached, so callers can retry.

use super::Catalog;
use crate::model::catalog::{ItemType, Sight, Souvenir};
use log::{error, info};
use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Catalog fetch/decode failures.
#[derive(Debug)]
pub enum CatalogError {
    /// Source could not be read.
    Io {
        kind: ItemType,
        source: std::io::Error,
    },
    /// Source is not a JSON array (or object) of catalog records.
    Parse { kind: ItemType, message: String },
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { kind, source } => write!(f, "failed to read {kind} catalog: {source}"),
            Self::Parse { kind, message } => {
                write!(f, "failed to parse {kind} catalog: {message}")
            }
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { .. } => None,
        }
    }
}

/// Provider of raw catalog bytes.
pub trait CatalogSource {
    fn fetch(&self, kind: ItemType) -> Result<Vec<u8>, CatalogError>;
}

/// Reads catalogs from JSON files on disk.
#[derive(Debug, Clone)]
pub struct FileCatalogSource {
    pub sights_path: PathBuf,
    pub souvenirs_path: PathBuf,
}

impl FileCatalogSource {
    pub fn new(sights_path: impl Into<PathBuf>, souvenirs_path: impl Into<PathBuf>) -> Self {
        Self {
            sights_path: sights_path.into(),
            souvenirs_path: souvenirs_path.into(),
        }
    }
}

impl CatalogSource for FileCatalogSource {
    fn fetch(&self, kind: ItemType) -> Result<Vec<u8>, CatalogError> {
        let path = match kind {
            ItemType::Sight => &self.sights_path,
            ItemType::Souvenir => &self.souvenirs_path,
        };
        std::fs::read(path).map_err(|source| CatalogError::Io { kind, source })
    }
}

/// Serves catalogs from bytes already in memory (bundled assets, tests).
#[derive(Debug, Clone, Default)]
pub struct StaticCatalogSource {
    sights: Vec<u8>,
    souvenirs: Vec<u8>,
}

impl StaticCatalogSource {
    pub fn new(sights: impl Into<Vec<u8>>, souvenirs: impl Into<Vec<u8>>) -> Self {
        Self {
            sights: sights.into(),
            souvenirs: souvenirs.into(),
        }
    }
}

impl CatalogSource for StaticCatalogSource {
    fn fetch(&self, kind: ItemType) -> Result<Vec<u8>, CatalogError> {
        Ok(match kind {
            ItemType::Sight => self.sights.clone(),
            ItemType::Souvenir => self.souvenirs.clone(),
        })
    }
}

/// Session-scoped catalog cache.
pub struct CatalogLoader<Src: CatalogSource> {
    source: Src,
    sights: OnceCell<Arc<Vec<Sight>>>,
    souvenirs: OnceCell<Arc<Vec<Souvenir>>>,
}

impl<Src: CatalogSource> CatalogLoader<Src> {
    pub fn new(source: Src) -> Self {
        Self {
            source,
            sights: OnceCell::new(),
            souvenirs: OnceCell::new(),
        }
    }

    /// Loads (or reuses) the sight catalog.
    pub fn sights(&self) -> Result<Arc<Vec<Sight>>, CatalogError> {
        self.sights
            .get_or_try_init(|| self.fetch_decoded(ItemType::Sight).map(Arc::new))
            .cloned()
    }

    /// Loads (or reuses) the souvenir catalog.
    pub fn souvenirs(&self) -> Result<Arc<Vec<Souvenir>>, CatalogError> {
        self.souvenirs
            .get_or_try_init(|| self.fetch_decoded(ItemType::Souvenir).map(Arc::new))
            .cloned()
    }

    /// Loads both catalogs into one owned snapshot.
    pub fn catalog(&self) -> Result<Catalog, CatalogError> {
        Ok(Catalog::new(
            self.sights()?.as_ref().clone(),
            self.souvenirs()?.as_ref().clone(),
        ))
    }

    /// Whether `kind` has been loaded in this session.
    pub fn is_loaded(&self, kind: ItemType) -> bool {
        match kind {
            ItemType::Sight => self.sights.get().is_some(),
            ItemType::Souvenir => self.souvenirs.get().is_some(),
        }
    }

    fn fetch_decoded<T: DeserializeOwned>(&self, kind: ItemType) -> Result<Vec<T>, CatalogError> {
        let started_at = Instant::now();
        let result = self
            .source
            .fetch(kind)
            .and_then(|bytes| decode_records(kind, &bytes));
        match &result {
            Ok(items) => info!(
                "event=catalog_load module=catalog status=ok kind={kind} count={} duration_ms={}",
                items.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=catalog_load module=catalog status=error kind={kind} duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            ),
        }
        result
    }
}

/// Decodes a JSON array, or an object whose values are the records.
fn decode_records<T: DeserializeOwned>(
    kind: ItemType,
    bytes: &[u8],
) -> Result<Vec<T>, CatalogError> {
    let parse_error = |err: serde_json::Error| CatalogError::Parse {
        kind,
        message: err.to_string(),
    };
    let value: Value = serde_json::from_slice(bytes).map_err(parse_error)?;
    let records = match value {
        Value::Array(records) => records,
        Value::Object(map) => map.into_iter().map(|(_, record)| record).collect(),
        other => {
            return Err(CatalogError::Parse {
                kind,
                message: format!("expected array or object, got {}", json_kind(&other)),
            })
        }
    };
    records
        .into_iter()
        .map(|record| serde_json::from_value(record).map_err(parse_error))
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::{CatalogError, CatalogLoader, CatalogSource, StaticCatalogSource};
    use crate::model::catalog::ItemType;
    use std::cell::Cell;

    struct CountingSource {
        calls: Cell<usize>,
        fail_first: bool,
    }

    impl CatalogSource for CountingSource {
        fn fetch(&self, _kind: ItemType) -> Result<Vec<u8>, CatalogError> {
            let call = self.calls.get();
            self.calls.set(call + 1);
            if self.fail_first && call == 0 {
                return Err(CatalogError::Parse {
                    kind: ItemType::Sight,
                    message: "simulated".to_string(),
                });
            }
            Ok(br#"[{"id":"1","name":"Nijo-jo","name_kana":"","description":""}]"#.to_vec())
        }
    }

    #[test]
    fn repeated_loads_fetch_once() {
        let loader = CatalogLoader::new(CountingSource {
            calls: Cell::new(0),
            fail_first: false,
        });
        assert_eq!(loader.sights().unwrap().len(), 1);
        assert_eq!(loader.sights().unwrap().len(), 1);
        assert_eq!(loader.source.calls.get(), 1);
        assert!(loader.is_loaded(ItemType::Sight));
        assert!(!loader.is_loaded(ItemType::Souvenir));
    }

    #[test]
    fn failed_load_can_be_retried() {
        let loader = CatalogLoader::new(CountingSource {
            calls: Cell::new(0),
            fail_first: true,
        });
        assert!(loader.sights().is_err());
        assert!(!loader.is_loaded(ItemType::Sight));
        assert_eq!(loader.sights().unwrap()[0].name, "Nijo-jo");
    }

    #[test]
    fn object_of_records_is_accepted() {
        let loader = CatalogLoader::new(StaticCatalogSource::new(
            "[]",
            r#"{"0":{"id":"s1","name":"Yatsuhashi","name_kana":"やつはし","description":"cinnamon sweet"}}"#,
        ));
        let catalog = loader.catalog().unwrap();
        assert!(catalog.sights.is_empty());
        assert_eq!(catalog.souvenirs[0].id, "s1");
    }

    #[test]
    fn scalar_json_is_rejected() {
        let loader = CatalogLoader::new(StaticCatalogSource::new("42", "[]"));
        let err = loader.sights().unwrap_err();
        assert!(err.to_string().contains("expected array or object"));
    }
}
