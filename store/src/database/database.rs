use std::{thread, time::Instant};

use num_format::{Locale, ToFormattedString};
use thiserror::Error;

use crate::{
    consts::consts::TransactionId,
    model::statement::{Statement, StatementResult},
    persistence::{
        storage::Storage,
        transaction::{Transaction, TransactionLog, TransactionLogError},
    },
};

use super::{
    commands::{
        Control, DatabaseCommand, DatabaseCommandRequest, DatabaseCommandResponse,
        StatementRejection,
    },
    options::DatabaseOptions,
    request_manager::RequestManager,
    table::table::{ApplyErrors, PersonTable},
};

#[derive(Error, Debug)]
pub enum DatabaseStartupError {
    #[error("Unable to open transaction log: {0}")]
    TransactionLog(#[from] TransactionLogError),

    #[error("Unable to replay transaction {0}: {1}")]
    Replay(TransactionId, ApplyErrors),

    #[error("Unable to spawn database thread: {0}")]
    Thread(std::io::Error),
}

pub struct Database {
    pub(crate) person_table: PersonTable,
    transaction_log: TransactionLog,
    current_transaction_id: TransactionId,
    database_options: DatabaseOptions,
}

impl Database {
    pub fn new(options: DatabaseOptions) -> Result<Self, DatabaseStartupError> {
        let storage = options.storage_engine.get_engine();

        Self::from_storage(storage, options)
    }

    /// Opens the database on top of an already constructed storage backend
    pub fn from_storage(
        storage: Box<dyn Storage + Send>,
        options: DatabaseOptions,
    ) -> Result<Self, DatabaseStartupError> {
        let mut transaction_log = TransactionLog::new(storage, options.write_mode.clone());

        transaction_log.init()?;

        let mut database = Self {
            person_table: PersonTable::new(),
            transaction_log,
            current_transaction_id: TransactionId(0),
            database_options: options,
        };

        if database.database_options.restore {
            database.restore()?;
        }

        Ok(database)
    }

    fn restore(&mut self) -> Result<(), DatabaseStartupError> {
        log::info!(
            "Storage Engine: [{}]",
            self.database_options.storage_engine.describe()
        );

        let now = Instant::now();

        let restored_transactions = self.transaction_log.restore()?;
        let restored_transaction_count = restored_transactions.len();

        for Transaction {
            transaction_id,
            statement,
        } in restored_transactions
        {
            self.person_table
                .apply(statement, transaction_id.clone())
                .map_err(|e| DatabaseStartupError::Replay(transaction_id.clone(), e))?;

            self.current_transaction_id = transaction_id;
        }

        log::info!(
            "✅ Successful Restore [Duration: {}ms]",
            now.elapsed().as_millis(),
        );

        log::info!(
            "📀 Data               [Rows: {}, TransactionsReplayed: {}, CurrentTxId: {}]",
            self.person_table
                .person_rows
                .len()
                .to_formatted_string(&Locale::en),
            restored_transaction_count.to_formatted_string(&Locale::en),
            self.current_transaction_id
                .to_number()
                .to_formatted_string(&Locale::en)
        );

        Ok(())
    }

    /// Moves the database onto its own thread, returns the handle used to talk to it
    pub fn run(self) -> Result<RequestManager, DatabaseStartupError> {
        let (database_sender, database_receiver) = flume::unbounded::<DatabaseCommandRequest>();

        thread::Builder::new()
            .name("Database".to_string())
            .spawn(move || self.listen(database_receiver))
            .map_err(DatabaseStartupError::Thread)?;

        Ok(RequestManager::new(database_sender))
    }

    fn listen(mut self, database_receiver: flume::Receiver<DatabaseCommandRequest>) {
        // Exits on shutdown, or once every request manager has been dropped
        while let Ok(DatabaseCommandRequest { resolver, command }) = database_receiver.recv() {
            log::debug!("Received command: {:?}", command);

            let response = match command {
                DatabaseCommand::Statement(statement) => self.process_statement(statement),
                DatabaseCommand::Control(Control::Shutdown) => {
                    // Commands queued behind the shutdown are dropped, their callers see a disconnected database
                    database_receiver.drain().for_each(drop);
                    drop(database_receiver);

                    let _ = resolver.send(DatabaseCommandResponse::ControlSuccess(
                        "Successfully shutdown database".to_string(),
                    ));

                    return;
                }
            };

            // The requester may have gone away, the statement has still been applied
            let _ = resolver.send(response);
        }
    }

    pub fn process_statement(&mut self, statement: Statement) -> DatabaseCommandResponse {
        if statement.is_query() {
            return match self
                .person_table
                .apply(statement, self.current_transaction_id.clone())
            {
                Ok(result) => DatabaseCommandResponse::Commit(result),
                Err(err) => DatabaseCommandResponse::Rejected(to_rejection(err)),
            };
        }

        if let Err(err) = self.person_table.verify(&statement) {
            log::info!("⚠️  Rejected: {}", err);

            return DatabaseCommandResponse::Rejected(to_rejection(err));
        }

        if self.person_table.is_no_op(&statement) {
            return DatabaseCommandResponse::Commit(StatementResult::Removed(None));
        }

        let applying_transaction_id = self.current_transaction_id.increment();

        // Mutations are written to the log before they are applied, a failed write leaves the table untouched
        match self
            .transaction_log
            .commit(&applying_transaction_id, &statement)
        {
            Ok(()) => {}
            Err(err @ TransactionLogError::Unsynced { .. }) => {
                log::error!(
                    "❌ Unsynced transaction kept in log: [TX: {}] {}",
                    &applying_transaction_id,
                    err
                );

                // It will be replayed on restart, so the table has to match
                self.current_transaction_id = applying_transaction_id.clone();

                if let Err(apply_err) = self
                    .person_table
                    .apply(statement, applying_transaction_id)
                {
                    log::error!("❌ Unable to apply unsynced transaction: {}", apply_err);
                }

                return DatabaseCommandResponse::StorageFailure(err.to_string());
            }
            Err(err) => {
                log::error!(
                    "❌ Unable to write transaction: [TX: {}] {}",
                    &applying_transaction_id,
                    err
                );

                return DatabaseCommandResponse::StorageFailure(err.to_string());
            }
        }

        self.current_transaction_id = applying_transaction_id.clone();

        match self
            .person_table
            .apply(statement, applying_transaction_id.clone())
        {
            Ok(result) => {
                log::info!("✅ Committed: [TX: {}]", &applying_transaction_id);

                DatabaseCommandResponse::Commit(result)
            }
            Err(err) => DatabaseCommandResponse::Rejected(to_rejection(err)),
        }
    }
}

fn to_rejection(err: ApplyErrors) -> StatementRejection {
    match err {
        ApplyErrors::ValidationFailed(_) => StatementRejection::Validation(err.to_string()),
        ApplyErrors::CannotCreateWhenAlreadyExists(_) => {
            StatementRejection::Conflict(err.to_string())
        }
    }
}
