use std::{path::PathBuf, str::FromStr};

use thiserror::Error;

pub mod file;
pub mod memory;

use file::FileStorage;
use memory::MemoryStorage;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Unable to initialize persistence: {0}")]
    UnableToInitializePersistence(String),

    #[error("Unable to write transaction: {0}")]
    UnableToWriteTransaction(String),

    #[error("Unable to sync transaction buffer to persistent storage: {0}")]
    UnableToSyncTransactionBufferToPersistentStorage(String),

    #[error("Unable to load previous transactions: {0}")]
    UnableToLoadPreviousTransactions(String),

    #[error("Unable to discard transaction: {0}")]
    UnableToDiscardTransaction(String),
}

pub fn io_to_generic_error(error: std::io::Error) -> String {
    format!("{} ({:?})", error, error.kind())
}

/// Backing store for the transaction log
pub trait Storage {
    // Called on DB start-up, should be idempotent
    fn init(&mut self) -> StorageResult<()>;

    fn transaction_write(&mut self, transaction: &[u8]) -> StorageResult<()>;
    fn transaction_sync(&self) -> StorageResult<()>;
    /// Drops the last `length` bytes written, used when a write could not be synced
    fn transaction_discard(&mut self, length: usize) -> StorageResult<()>;
    /// Returns every transaction line written so far
    fn transaction_load(&mut self) -> StorageResult<String>;
}

#[derive(Error, Debug, PartialEq)]
pub enum StoreConfigError {
    #[error("Unsupported store scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Store uri is missing a path: {0}")]
    MissingPath(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum StorageEngine {
    /// Keeps the transaction log in memory, data is lost on restart
    Memory,
    /// Appends the transaction log to a file inside the directory
    File(PathBuf),
}

impl StorageEngine {
    pub fn get_engine(&self) -> Box<dyn Storage + Send> {
        match self {
            StorageEngine::Memory => Box::new(MemoryStorage::default()),
            StorageEngine::File(path) => Box::new(FileStorage::new(path.clone())),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            StorageEngine::Memory => "memory".to_string(),
            StorageEngine::File(path) => format!("file [{}]", path.display()),
        }
    }
}

/// Parses a store connection string
///
/// - `memory://`
/// - `file://<directory>`
/// - `<directory>`, shorthand for `file://<directory>`
impl FromStr for StorageEngine {
    type Err = StoreConfigError;

    fn from_str(uri: &str) -> Result<Self, Self::Err> {
        match uri.split_once("://") {
            Some(("memory", _)) => Ok(StorageEngine::Memory),
            Some(("file", path)) => {
                if path.is_empty() {
                    return Err(StoreConfigError::MissingPath(uri.to_string()));
                }

                Ok(StorageEngine::File(PathBuf::from(path)))
            }
            Some((scheme, _)) => Err(StoreConfigError::UnsupportedScheme(scheme.to_string())),
            None if uri.is_empty() => Err(StoreConfigError::MissingPath(uri.to_string())),
            None => Ok(StorageEngine::File(PathBuf::from(uri))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("memory://", StorageEngine::Memory)]
    #[case("file://data", StorageEngine::File(PathBuf::from("data")))]
    #[case("file:///var/lib/phonebook", StorageEngine::File(PathBuf::from("/var/lib/phonebook")))]
    #[case("./data", StorageEngine::File(PathBuf::from("./data")))]
    fn parses_store_uri(#[case] uri: &str, #[case] expected: StorageEngine) {
        assert_eq!(uri.parse::<StorageEngine>(), Ok(expected));
    }

    #[test]
    fn rejects_unknown_scheme() {
        assert_eq!(
            "mongodb://localhost:27017/phonebook".parse::<StorageEngine>(),
            Err(StoreConfigError::UnsupportedScheme("mongodb".to_string()))
        );
    }

    #[test]
    fn rejects_empty_path() {
        assert_eq!(
            "file://".parse::<StorageEngine>(),
            Err(StoreConfigError::MissingPath("file://".to_string()))
        );
    }
}
