use std::{
    fs::{File, OpenOptions},
    io::{ErrorKind, Read, Write},
    path::PathBuf,
};

use super::{io_to_generic_error, Storage, StorageError, StorageResult};

pub struct FileStorage {
    base_path: PathBuf,
    log_file: Option<File>,
    transaction_file_path: PathBuf,
}

impl FileStorage {
    pub fn new(base_path: PathBuf) -> Self {
        let transaction_file_path = base_path.join("transaction_log.json");

        Self {
            base_path,
            log_file: None,
            transaction_file_path,
        }
    }

    fn log_file(&mut self) -> StorageResult<&mut File> {
        match self.log_file {
            Some(ref mut file) => Ok(file),
            None => Err(StorageError::UnableToWriteTransaction(
                "storage has not been initialized".to_string(),
            )),
        }
    }
}

impl Storage for FileStorage {
    fn init(&mut self) -> StorageResult<()> {
        std::fs::create_dir_all(&self.base_path)
            .map_err(|e| StorageError::UnableToInitializePersistence(io_to_generic_error(e)))?;

        let log_file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.transaction_file_path)
            .map_err(|e| StorageError::UnableToInitializePersistence(io_to_generic_error(e)))?;

        self.log_file = Some(log_file);

        Ok(())
    }

    fn transaction_write(&mut self, transaction: &[u8]) -> StorageResult<()> {
        let file = self.log_file()?;

        let length_before_write = file
            .metadata()
            .map_err(|e| StorageError::UnableToWriteTransaction(io_to_generic_error(e)))?
            .len();

        // Buffered OS write, is not 'durable' without the fsync
        if let Err(err) = file.write_all(transaction) {
            // A partial line would make the log unreadable on restore
            let _ = file.set_len(length_before_write);

            return Err(StorageError::UnableToWriteTransaction(io_to_generic_error(
                err,
            )));
        }

        Ok(())
    }

    fn transaction_sync(&self) -> StorageResult<()> {
        if let Some(file) = &self.log_file {
            file.sync_all().map_err(|e| {
                StorageError::UnableToSyncTransactionBufferToPersistentStorage(io_to_generic_error(
                    e,
                ))
            })?;
        }

        Ok(())
    }

    fn transaction_discard(&mut self, length: usize) -> StorageResult<()> {
        let file = self.log_file()?;

        let discard =
            |e: std::io::Error| StorageError::UnableToDiscardTransaction(io_to_generic_error(e));

        let current_length = file.metadata().map_err(discard)?.len();

        file.set_len(current_length.saturating_sub(length as u64))
            .map_err(discard)?;

        file.sync_all().map_err(discard)
    }

    // File may or may not exist
    fn transaction_load(&mut self) -> StorageResult<String> {
        let mut contents = String::new();

        let mut file = match File::open(&self.transaction_file_path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(contents),
            Err(err) => {
                return Err(StorageError::UnableToLoadPreviousTransactions(
                    io_to_generic_error(err),
                ))
            }
        };

        file.read_to_string(&mut contents)
            .map_err(|e| StorageError::UnableToLoadPreviousTransactions(io_to_generic_error(e)))?;

        Ok(contents)
    }
}
