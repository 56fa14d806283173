use thiserror::Error;

use crate::{
    consts::consts::EntityId,
    model::{
        person::Person,
        statement::{Statement, StatementResult},
    },
};

use super::commands::{
    Control, DatabaseCommand, DatabaseCommandRequest, DatabaseCommandResponse, StatementRejection,
};

#[derive(Error, Debug, PartialEq)]
pub enum RequestManagerError {
    /// Record failed the table's validation, the message is meant for the caller
    #[error("{0}")]
    Validation(String),
    #[error("Rejected statement: {0}")]
    Conflict(String),
    #[error("Storage failure: {0}")]
    Storage(String),
    #[error("Database is not running")]
    DatabaseDisconnected,
    #[error("Database returned a result that does not match the statement")]
    UnexpectedResult,
}

/// Goal of the request manager is to provide a simple interface for interacting with the database
///
/// Every method sends a single command to the database thread and waits for its answer. The
/// typed methods (`send_add`, `send_get`, ...) map the generic `StatementResult` back to the
/// value the statement produces.
#[derive(Clone)]
pub struct RequestManager {
    database_sender: flume::Sender<DatabaseCommandRequest>,
}

impl RequestManager {
    pub fn new(database_sender: flume::Sender<DatabaseCommandRequest>) -> Self {
        Self { database_sender }
    }

    /// Creates a person, the id is assigned here rather than by the caller
    pub async fn send_add(
        &self,
        name: String,
        number: String,
    ) -> Result<Person, RequestManagerError> {
        match self
            .send_statement(Statement::Add(Person::new(name, number)))
            .await?
        {
            StatementResult::Single(person) => Ok(person),
            _ => Err(RequestManagerError::UnexpectedResult),
        }
    }

    /// Returns the removed person, `None` when there was nothing to remove
    pub async fn send_remove(&self, id: EntityId) -> Result<Option<Person>, RequestManagerError> {
        match self.send_statement(Statement::Remove(id)).await? {
            StatementResult::Removed(person) => Ok(person),
            _ => Err(RequestManagerError::UnexpectedResult),
        }
    }

    pub async fn send_get(&self, id: EntityId) -> Result<Option<Person>, RequestManagerError> {
        match self.send_statement(Statement::Get(id)).await? {
            StatementResult::GetSingle(person) => Ok(person),
            _ => Err(RequestManagerError::UnexpectedResult),
        }
    }

    pub async fn send_list(&self) -> Result<Vec<Person>, RequestManagerError> {
        match self.send_statement(Statement::List).await? {
            StatementResult::List(people) => Ok(people),
            _ => Err(RequestManagerError::UnexpectedResult),
        }
    }

    pub async fn send_count(&self) -> Result<usize, RequestManagerError> {
        match self.send_statement(Statement::Count).await? {
            StatementResult::Count(count) => Ok(count),
            _ => Err(RequestManagerError::UnexpectedResult),
        }
    }

    /// Sends a single statement to the database and returns its result
    pub async fn send_statement(
        &self,
        statement: Statement,
    ) -> Result<StatementResult, RequestManagerError> {
        let response = self
            .send_command(DatabaseCommand::Statement(statement))?
            .await
            .map_err(|_| RequestManagerError::DatabaseDisconnected)?;

        match response {
            DatabaseCommandResponse::Commit(result) => Ok(result),
            DatabaseCommandResponse::Rejected(StatementRejection::Validation(message)) => {
                Err(RequestManagerError::Validation(message))
            }
            DatabaseCommandResponse::Rejected(StatementRejection::Conflict(message)) => {
                Err(RequestManagerError::Conflict(message))
            }
            DatabaseCommandResponse::StorageFailure(message) => {
                Err(RequestManagerError::Storage(message))
            }
            DatabaseCommandResponse::ControlSuccess(_) => {
                Err(RequestManagerError::UnexpectedResult)
            }
        }
    }

    /// Sends a shutdown request to the database and blocks until the database has stopped
    pub fn send_shutdown_request(&self) -> Result<String, RequestManagerError> {
        let response = self
            .send_command(DatabaseCommand::Control(Control::Shutdown))?
            .recv()
            .map_err(|_| RequestManagerError::DatabaseDisconnected)?;

        match response {
            DatabaseCommandResponse::ControlSuccess(message) => Ok(message),
            _ => Err(RequestManagerError::UnexpectedResult),
        }
    }

    fn send_command(
        &self,
        command: DatabaseCommand,
    ) -> Result<oneshot::Receiver<DatabaseCommandResponse>, RequestManagerError> {
        let (resolver, receiver) = oneshot::channel::<DatabaseCommandResponse>();

        // The database responds on the receiver once it has processed the command
        self.database_sender
            .send(DatabaseCommandRequest { resolver, command })
            .map_err(|_| RequestManagerError::DatabaseDisconnected)?;

        Ok(receiver)
    }
}
