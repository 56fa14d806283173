use serde::{Deserialize, Serialize};

use crate::consts::consts::EntityId;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Person {
    pub id: EntityId,
    pub name: String,
    pub number: String,
}

impl Person {
    /// Creates a person with a freshly assigned id
    pub fn new(name: String, number: String) -> Self {
        Person {
            id: EntityId::new(),
            name,
            number,
        }
    }

    pub fn new_test() -> Self {
        Person::new("Arto Hellas".to_string(), "040-123456".to_string())
    }
}
