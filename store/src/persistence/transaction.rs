use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::consts::TransactionId;
use crate::model::statement::Statement;

use super::storage::{Storage, StorageError};

#[derive(Debug, Clone, PartialEq)]
pub enum TransactionWriteMode {
    /// Writes the log and performs an fsync before the mutation is acknowledged
    Sync,
    /// Writes the log, lets the OS buffer the writes
    OSBuffered,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Transaction {
    pub transaction_id: TransactionId,
    pub statement: Statement,
}

#[derive(Error, Debug)]
pub enum TransactionLogError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Unable to encode transaction: {0}")]
    Encode(String),

    #[error("Corrupt transaction on line {line}: {message}")]
    Corrupt { line: usize, message: String },

    /// The transaction could not be synced, and could not be removed from the log either
    #[error("Transaction left in log after failed sync: {sync}, {discard}")]
    Unsynced {
        sync: StorageError,
        discard: StorageError,
    },
}

/// Append-only log of committed mutations, one JSON transaction per line
pub struct TransactionLog {
    write_mode: TransactionWriteMode,
    storage: Box<dyn Storage + Send>,
    size: usize,
}

impl TransactionLog {
    pub fn new(storage: Box<dyn Storage + Send>, write_mode: TransactionWriteMode) -> Self {
        Self {
            write_mode,
            storage,
            size: 0,
        }
    }

    pub fn init(&mut self) -> Result<(), TransactionLogError> {
        Ok(self.storage.init()?)
    }

    pub fn commit(
        &mut self,
        transaction_id: &TransactionId,
        statement: &Statement,
    ) -> Result<(), TransactionLogError> {
        let transaction = Transaction {
            transaction_id: transaction_id.clone(),
            statement: statement.clone(),
        };

        let transaction_json_line = format!(
            "{}\n",
            serde_json::to_string(&transaction)
                .map_err(|e| TransactionLogError::Encode(e.to_string()))?
        );

        self.storage
            .transaction_write(transaction_json_line.as_bytes())?;

        // The mutation is only acknowledged once it is on disk
        if self.write_mode == TransactionWriteMode::Sync {
            if let Err(sync) = self.storage.transaction_sync() {
                if let Err(discard) = self
                    .storage
                    .transaction_discard(transaction_json_line.len())
                {
                    self.size += 1;

                    return Err(TransactionLogError::Unsynced { sync, discard });
                }

                return Err(sync.into());
            }
        }

        self.size += 1;

        Ok(())
    }

    pub fn restore(&mut self) -> Result<Vec<Transaction>, TransactionLogError> {
        let mut transactions: Vec<Transaction> = vec![];

        let transactions_data = self.storage.transaction_load()?;

        for (index, transaction_string) in transactions_data.split('\n').enumerate() {
            if transaction_string.is_empty() {
                continue;
            }

            let transaction = serde_json::from_str(transaction_string).map_err(|e| {
                TransactionLogError::Corrupt {
                    line: index + 1,
                    message: e.to_string(),
                }
            })?;

            transactions.push(transaction);
        }

        self.size = transactions.len();

        Ok(transactions)
    }

    /// Number of transactions in the log
    pub fn get_size(&self) -> usize {
        self.size
    }
}
