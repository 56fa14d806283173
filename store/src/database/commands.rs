use crate::model::statement::{Statement, StatementResult};

/// Database commands are how we interact with the database thread
///
/// The majority of interactions happen via statements (e.g. add, remove, get, etc), the
/// remaining commands control the database itself (e.g. shutdown).
#[derive(Debug)]
pub enum DatabaseCommand {
    /// Runs a single statement and returns its result
    Statement(Statement),

    /// Commands that control the database
    Control(Control),
}

#[derive(Debug)]
pub enum Control {
    /// Stops the database thread, requests sent before the shutdown are answered first
    Shutdown,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DatabaseCommandResponse {
    /// Statement applied (and logged, for mutations)
    Commit(StatementResult),
    /// Statement rejected by the table, nothing was changed
    Rejected(StatementRejection),
    /// Statement could not be written to the transaction log, nothing was changed
    StorageFailure(String),
    /// Successfully performed the control
    ControlSuccess(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum StatementRejection {
    Validation(String),
    Conflict(String),
}

pub struct DatabaseCommandRequest {
    pub resolver: oneshot::Sender<DatabaseCommandResponse>,
    pub command: DatabaseCommand,
}
