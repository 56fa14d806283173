use std::collections::HashMap;
use thiserror::Error;

use crate::{
    consts::consts::{EntityId, TransactionId},
    model::{
        person::Person,
        statement::{Statement, StatementResult},
    },
};

use super::row::PersonRow;

#[derive(Error, Debug, PartialEq)]
pub enum ApplyErrors {
    // CRUD - CREATE
    #[error("Cannot create, record already exists: {0}")]
    CannotCreateWhenAlreadyExists(EntityId),

    // Constraints
    #[error("Person validation failed: {0}: {0} is required")]
    ValidationFailed(String),
}

pub struct PersonTable {
    pub person_rows: HashMap<EntityId, PersonRow>,
}

impl PersonTable {
    pub fn new() -> Self {
        Self {
            person_rows: HashMap::new(),
        }
    }

    /// Checks that a statement can be applied without changing the table
    pub fn verify(&self, statement: &Statement) -> Result<(), ApplyErrors> {
        if let Statement::Add(person) = statement {
            validate_person(person)?;

            if self.person_rows.contains_key(&person.id) {
                return Err(ApplyErrors::CannotCreateWhenAlreadyExists(person.id.clone()));
            }
        }

        Ok(())
    }

    /// True for a mutation that would leave the table as it is, e.g. removing a missing person
    pub fn is_no_op(&self, statement: &Statement) -> bool {
        match statement {
            Statement::Remove(id) => !self.person_rows.contains_key(id),
            _ => false,
        }
    }

    // Mutations are broken up into 2 steps
    //  - Verifying validity / constraints
    //  - Applying the statement
    pub fn apply(
        &mut self,
        statement: Statement,
        transaction_id: TransactionId,
    ) -> Result<StatementResult, ApplyErrors> {
        self.verify(&statement)?;

        let statement_result = match statement {
            Statement::Add(person) => {
                self.person_rows.insert(
                    person.id.clone(),
                    PersonRow::new(person.clone(), transaction_id),
                );

                StatementResult::Single(person)
            }
            Statement::Remove(id) => {
                let removed = self.person_rows.remove(&id).map(|row| row.person);

                StatementResult::Removed(removed)
            }
            Statement::Get(id) => {
                let person = self.person_rows.get(&id).map(|row| row.person.clone());

                StatementResult::GetSingle(person)
            }
            Statement::List => {
                let mut rows: Vec<&PersonRow> = self.person_rows.values().collect();

                rows.sort_by(|a, b| a.transaction_id.cmp(&b.transaction_id));

                StatementResult::List(rows.into_iter().map(|row| row.person.clone()).collect())
            }
            Statement::Count => StatementResult::Count(self.person_rows.len()),
        };

        Ok(statement_result)
    }
}

impl Default for PersonTable {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_person(person: &Person) -> Result<(), ApplyErrors> {
    if person.name.trim().is_empty() {
        return Err(ApplyErrors::ValidationFailed("name".to_string()));
    }

    if person.number.trim().is_empty() {
        return Err(ApplyErrors::ValidationFailed("number".to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    mod add {
        use super::*;

        #[test]
        fn adding_item_creates_row_at_transaction() {
            // Given an empty table
            let mut table = PersonTable::new();

            // When we add an item
            let person = Person::new_test();

            let result = table
                .apply(Statement::Add(person.clone()), TransactionId(1))
                .expect("should add to an empty table");

            // Then the row exists, stamped with the transaction id
            assert_eq!(result, StatementResult::Single(person.clone()));

            assert_eq!(
                table.person_rows.get(&person.id),
                Some(&PersonRow::new(person, TransactionId(1)))
            );
        }

        #[test]
        fn adding_item_with_existing_id_fails() {
            let mut table = PersonTable::new();

            let person = Person::new_test();

            table
                .apply(Statement::Add(person.clone()), TransactionId(1))
                .unwrap();

            let result = table
                .apply(Statement::Add(person.clone()), TransactionId(2))
                .err()
                .expect("should error");

            assert_eq!(result, ApplyErrors::CannotCreateWhenAlreadyExists(person.id));
        }

        #[rstest]
        #[case("", "040-123456", "name")]
        #[case("   ", "040-123456", "name")]
        #[case("Arto Hellas", "", "number")]
        #[case("", "", "name")]
        fn adding_item_with_missing_field_fails(
            #[case] name: &str,
            #[case] number: &str,
            #[case] field: &str,
        ) {
            // Given an empty table
            let mut table = PersonTable::new();

            // When we add a person missing a field
            let person = Person::new(name.to_string(), number.to_string());

            let result = table
                .apply(Statement::Add(person), TransactionId(1))
                .err()
                .expect("should fail validation");

            // Then validation fails on that field and nothing is stored
            assert_eq!(result, ApplyErrors::ValidationFailed(field.to_string()));
            assert!(table.person_rows.is_empty());
        }

        #[test]
        fn verify_does_not_change_the_table() {
            let table = PersonTable::new();

            table
                .verify(&Statement::Add(Person::new_test()))
                .expect("should be valid");

            assert!(table.person_rows.is_empty());
        }

        #[test]
        fn validation_message_names_the_field() {
            let error = ApplyErrors::ValidationFailed("number".to_string());

            assert_eq!(
                error.to_string(),
                "Person validation failed: number: number is required"
            );
        }
    }

    mod remove {
        use super::*;

        #[test]
        fn removing_item_returns_it() {
            let mut table = PersonTable::new();

            let person = Person::new_test();

            table
                .apply(Statement::Add(person.clone()), TransactionId(1))
                .unwrap();

            let result = table
                .apply(Statement::Remove(person.id.clone()), TransactionId(2))
                .unwrap();

            assert_eq!(result, StatementResult::Removed(Some(person)));
            assert!(table.person_rows.is_empty());
        }

        #[test]
        fn removing_missing_item_is_not_an_error() {
            let mut table = PersonTable::new();

            let result = table
                .apply(Statement::Remove(EntityId::new()), TransactionId(1))
                .expect("remove should be idempotent");

            assert_eq!(result, StatementResult::Removed(None));
        }

        #[test]
        fn only_removing_a_missing_item_is_a_no_op() {
            let mut table = PersonTable::new();

            let person = Person::new_test();

            assert!(!table.is_no_op(&Statement::Add(person.clone())));
            assert!(table.is_no_op(&Statement::Remove(person.id.clone())));

            table
                .apply(Statement::Add(person.clone()), TransactionId(1))
                .unwrap();

            assert!(!table.is_no_op(&Statement::Remove(person.id)));
        }
    }

    mod query {
        use super::*;

        #[test]
        fn get_returns_none_for_missing_item() {
            let mut table = PersonTable::new();

            let result = table
                .apply(Statement::Get(EntityId::new()), TransactionId(1))
                .unwrap();

            assert_eq!(result, StatementResult::GetSingle(None));
        }

        #[test]
        fn list_returns_people_in_insertion_order() {
            // Given a table with three people added in order
            let mut table = PersonTable::new();

            let people: Vec<Person> = (1..=3)
                .map(|i| Person::new(format!("Person {}", i), format!("{}", i)))
                .collect();

            for (index, person) in people.iter().enumerate() {
                table
                    .apply(Statement::Add(person.clone()), TransactionId(index + 1))
                    .unwrap();
            }

            // When we list
            let result = table.apply(Statement::List, TransactionId(4)).unwrap();

            // Then they come back oldest first
            assert_eq!(result, StatementResult::List(people));
        }

        #[test]
        fn count_matches_rows() {
            let mut table = PersonTable::new();

            table
                .apply(Statement::Add(Person::new_test()), TransactionId(1))
                .unwrap();
            table
                .apply(Statement::Add(Person::new_test()), TransactionId(2))
                .unwrap();

            let result = table.apply(Statement::Count, TransactionId(3)).unwrap();

            assert_eq!(result, StatementResult::Count(2));
        }
    }
}
