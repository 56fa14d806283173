//! Thin async wrapper over the phonebook HTTP API, one request per call
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use store::{consts::consts::EntityId, model::person::Person};
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3001/api/persons";

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct NewPerson {
    pub name: String,
    pub number: String,
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server responded with {status}: {body}")]
    Status { status: StatusCode, body: String },
}

#[derive(Clone, Debug)]
pub struct PersonService {
    client: Client,
    base_url: String,
}

impl PersonService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    pub async fn get_all(&self) -> Result<Vec<Person>, ClientError> {
        let response = self.client.get(&self.base_url).send().await?;

        Ok(check_status(response).await?.json().await?)
    }

    pub async fn create(&self, new_person: &NewPerson) -> Result<Person, ClientError> {
        let response = self
            .client
            .post(&self.base_url)
            .json(new_person)
            .send()
            .await?;

        Ok(check_status(response).await?.json().await?)
    }

    /// Returns the response body, which the server leaves empty
    pub async fn delete_person(&self, id: &EntityId) -> Result<String, ClientError> {
        let response = self
            .client
            .delete(format!("{}/{}", self.base_url, id))
            .send()
            .await?;

        Ok(check_status(response).await?.text().await?)
    }
}

impl Default for PersonService {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

async fn check_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    log::debug!("{} responded with {}", response.url(), status);

    let body = response.text().await.unwrap_or_default();

    Err(ClientError::Status { status, body })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{dev::ServerHandle, rt, web::Data, App, HttpServer};
    use phonebook_server::routes::configure;
    use store::{
        database::{database::Database, options::DatabaseOptions},
        persistence::storage::StorageEngine,
    };

    async fn start_server() -> (PersonService, ServerHandle) {
        let options = DatabaseOptions::default()
            .set_storage_engine(StorageEngine::Memory)
            .set_restore(false);

        let request_manager = Database::new(options).unwrap().run().unwrap();

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = HttpServer::new(move || {
            App::new()
                .app_data(Data::new(request_manager.clone()))
                .configure(configure)
        })
        .workers(1)
        .disable_signals()
        .listen(listener)
        .unwrap()
        .run();

        let handle = server.handle();

        rt::spawn(server);

        let service = PersonService::new(format!("http://127.0.0.1:{}/api/persons", port));

        (service, handle)
    }

    #[test]
    fn default_points_at_local_server() {
        let service = PersonService::default();

        assert_eq!(service.base_url, "http://localhost:3001/api/persons");
    }

    #[actix_web::test]
    async fn create_get_all_delete() {
        let (service, handle) = start_server().await;

        // Create
        let created = service
            .create(&NewPerson {
                name: "Ada".to_string(),
                number: "123".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(created.name, "Ada");
        assert_eq!(created.number, "123");

        // Listed
        assert_eq!(service.get_all().await.unwrap(), vec![created.clone()]);

        // Deleted, with an empty body
        assert_eq!(service.delete_person(&created.id).await.unwrap(), "");
        assert!(service.get_all().await.unwrap().is_empty());

        handle.stop(true).await;
    }

    #[actix_web::test]
    async fn rejected_create_is_a_status_error() {
        let (service, handle) = start_server().await;

        let result = service
            .create(&NewPerson {
                name: "".to_string(),
                number: "123".to_string(),
            })
            .await;

        match result {
            Err(ClientError::Status { status, body }) => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(body, r#"{"error":"name or number is missing"}"#);
            }
            other => panic!("expected a status error, got {:?}", other),
        }

        handle.stop(true).await;
    }

    #[actix_web::test]
    async fn unreachable_server_is_a_transport_error() {
        // Nothing listens on the discard port
        let service = PersonService::new("http://127.0.0.1:9/api/persons");

        let result = service.get_all().await;

        assert!(matches!(result, Err(ClientError::Transport(_))));
    }
}
