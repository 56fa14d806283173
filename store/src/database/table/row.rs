use crate::{consts::consts::TransactionId, model::person::Person};

#[derive(Clone, Debug, PartialEq)]
pub struct PersonRow {
    pub person: Person,
    /// Transaction that created the row, used to keep list results in insertion order
    pub transaction_id: TransactionId,
}

impl PersonRow {
    pub fn new(person: Person, transaction_id: TransactionId) -> Self {
        PersonRow {
            person,
            transaction_id,
        }
    }
}
