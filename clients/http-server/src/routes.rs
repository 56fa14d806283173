use actix_web::{
    delete, get,
    middleware::Logger,
    post,
    web::{self, Data},
    HttpResponse,
};
use actix_web_lab::respond::Html;
use chrono::{DateTime, Local};
use serde::Deserialize;
use store::{consts::consts::EntityId, database::request_manager::RequestManager};

use crate::errors::{ApiError, FETCH_DATA_FAILED, FETCH_INFO_FAILED};

/// Body accepted by `POST /api/persons`, fields are checked in the handler
#[derive(Deserialize, Debug, Default)]
pub struct NewPersonRequest {
    pub name: Option<String>,
    pub number: Option<String>,
}

impl NewPersonRequest {
    /// Returns `(name, number)` when both are present and non-empty
    pub fn into_fields(self) -> Result<(String, String), ApiError> {
        match (self.name, self.number) {
            (Some(name), Some(number)) if !name.is_empty() && !number.is_empty() => {
                Ok((name, number))
            }
            _ => Err(ApiError::MissingField),
        }
    }
}

/// Fetch every person
#[get("/api/persons")]
async fn get_persons(request_manager: Data<RequestManager>) -> Result<HttpResponse, ApiError> {
    let people = request_manager
        .send_list()
        .await
        .map_err(ApiError::store_fault(FETCH_DATA_FAILED))?;

    Ok(HttpResponse::Ok().json(people))
}

#[get("/api/persons/{id}")]
async fn get_person(
    request_manager: Data<RequestManager>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id: EntityId = id.parse()?;

    match request_manager.send_get(id).await? {
        Some(person) => Ok(HttpResponse::Ok().json(person)),
        None => Err(ApiError::NotFound),
    }
}

/// Deleting a person that does not exist still answers 204
#[delete("/api/persons/{id}")]
async fn delete_person(
    request_manager: Data<RequestManager>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id: EntityId = id.parse()?;

    request_manager.send_remove(id).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// The raw body is logged before it is parsed, so rejected bodies show up too
#[post("/api/persons")]
async fn create_person(
    request_manager: Data<RequestManager>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    log::info!("POST /api/persons body: {}", String::from_utf8_lossy(&body));

    let request: NewPersonRequest = serde_json::from_slice(&body)
        .map_err(|err| ApiError::MalformedBody(err.to_string()))?;

    let (name, number) = request.into_fields()?;

    let person = request_manager.send_add(name, number).await?;

    Ok(HttpResponse::Ok().json(person))
}

/// Short HTML summary of the phonebook
#[get("/info")]
async fn info(request_manager: Data<RequestManager>) -> Result<Html, ApiError> {
    let date = Local::now();

    let count = request_manager
        .send_count()
        .await
        .map_err(ApiError::store_fault(FETCH_INFO_FAILED))?;

    Ok(Html(info_fragment(count, date)))
}

pub fn info_fragment(count: usize, date: DateTime<Local>) -> String {
    format!(
        "<p>Phonebook has info for {} people</p>\n<p>{}</p>\n",
        count,
        date.format("%a %b %d %Y %H:%M:%S GMT%z")
    )
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_persons)
        .service(get_person)
        .service(delete_person)
        .service(create_person)
        .service(info);
}

/// Access log line: method, path, status, response size and latency
pub fn request_logger() -> Logger {
    Logger::new("%{method}xi %U %s %b - %D ms")
        .custom_request_replace("method", |req| req.method().to_string())
}
