use {
    crate::models::token::StoredEntry,
    log::{debug, warn},
    serde_json::Value,
    std::{
        collections::HashSet,
        fs, io,
        path::{Path, PathBuf},
    },
    thiserror::Error,
};

pub const DEFAULT_STORE_FILE: &str = "safe_to_buy.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write record file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize records: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Append-only, mint-unique collection of qualifying tokens.
pub trait RecordStore: Send + Sync {
    /// Persists `entry` unless its mint is already recorded.
    ///
    /// Returns `Ok(true)` when a record was written. Write failures are
    /// returned, never swallowed.
    fn append_if_absent(&self, entry: &StoredEntry) -> Result<bool, StoreError>;

    fn load_entries(&self) -> Vec<StoredEntry>;
}

/// Record store backed by a single pretty-printed JSON array.
///
/// Every append re-reads and rewrites the whole file, so only one writer per
/// file is supported.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> JsonFileStore {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw records as stored. A missing, unreadable or corrupt file reads as empty.
    fn load_raw(&self) -> Vec<Value> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!("Unable to read {}: {}, treating as empty", self.path.display(), e);
                return Vec::new();
            }
        };
        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Array(items)) => items,
            Ok(_) => {
                warn!("{} does not hold a JSON array, treating as empty", self.path.display());
                Vec::new()
            }
            Err(e) => {
                warn!("Corrupt record file {}: {}, treating as empty", self.path.display(), e);
                Vec::new()
            }
        }
    }

    fn write_all(&self, records: &[Value]) -> Result<(), StoreError> {
        let io_err = |source: io::Error| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        let body = serde_json::to_string_pretty(records)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let mut tmp_name = self.path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = self.path.with_file_name(tmp_name);

        fs::write(&tmp_path, body).map_err(io_err)?;
        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(io_err(e));
        }
        Ok(())
    }
}

fn recorded_mints(records: &[Value]) -> HashSet<&str> {
    records
        .iter()
        .filter_map(|record| record.get("mint").and_then(Value::as_str))
        .collect()
}

impl RecordStore for JsonFileStore {
    fn append_if_absent(&self, entry: &StoredEntry) -> Result<bool, StoreError> {
        let mut records = self.load_raw();
        if recorded_mints(&records).contains(entry.mint.as_str()) {
            debug!("{} already recorded in {}", entry.mint, self.path.display());
            return Ok(false);
        }
        records.push(serde_json::to_value(entry)?);
        self.write_all(&records)?;
        Ok(true)
    }

    fn load_entries(&self) -> Vec<StoredEntry> {
        self.load_raw()
            .into_iter()
            .filter_map(|record| serde_json::from_value(record).ok())
            .collect()
    }
}
