use serde::{Deserialize, Serialize};

use crate::consts::consts::EntityId;

use super::person::Person;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Statement {
    Add(Person),
    /// Removing a record that does not exist is not an error
    Remove(EntityId),
    Get(EntityId),
    /// Returns every person, oldest first
    List,
    Count,
}

impl Statement {
    pub fn is_query(&self) -> bool {
        !self.is_mutation()
    }

    pub fn is_mutation(&self) -> bool {
        match self {
            Statement::Add(_) | Statement::Remove(_) => true,
            Statement::Get(_) | Statement::List | Statement::Count => false,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum StatementResult {
    Single(Person),
    Removed(Option<Person>),
    GetSingle(Option<Person>),
    List(Vec<Person>),
    Count(usize),
}
