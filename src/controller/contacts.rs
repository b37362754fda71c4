use actix_web::dev::HttpServiceFactory;
use actix_web::http::StatusCode;
use actix_web::{get, post, web, HttpResponse, Responder, ResponseError};

use serde_json::json;

use sqlx::PgPool;

use thiserror::Error;

use uuid::Uuid;

use crate::error::Error;
use crate::model::{ContactCriteria, CtmsResponse, IdentityResponse, NewContact};
use crate::repo::ContactsRepo;

/// Read endpoint for all contact details in basket format
#[tracing::instrument(name = "Read a contact", skip(pool))]
#[get("/{email_id}")]
async fn read(
    pool: web::Data<PgPool>,
    path: web::Path<(Uuid,)>,
) -> Result<impl Responder, ContactError> {
    let (email_id,) = path.into_inner();

    let contact = ContactsRepo::get_contact_by_email_id(pool.get_ref(), email_id)
        .await?
        .ok_or(ContactError::UnknownContactId)?;

    Ok(HttpResponse::Ok().json(CtmsResponse::from(contact)))
}

/// Multi-identifier lookup endpoint; every query parameter is optional,
/// but at least one must be supplied
#[tracing::instrument(name = "Find contacts by any identifier", skip(pool))]
#[get("")]
async fn find(
    pool: web::Data<PgPool>,
    criteria: web::Query<ContactCriteria>,
) -> Result<impl Responder, ContactError> {
    let contacts = ContactsRepo::get_contacts_by_any_id(pool.get_ref(), &criteria).await?;

    let responses: Vec<CtmsResponse> = contacts.into_iter().map(CtmsResponse::from).collect();

    Ok(HttpResponse::Ok().json(responses))
}

/// Create endpoint for new contacts; the identity row and every supplied
/// sub-entity payload persist as one atomic unit
#[tracing::instrument(name = "Create a new contact", skip(pool, new_contact))]
#[post("")]
async fn create(
    pool: web::Data<PgPool>,
    new_contact: web::Json<NewContact>,
) -> Result<impl Responder, ContactError> {
    let email_id = ContactsRepo::create_contact(pool.get_ref(), &new_contact).await?;

    let contact = ContactsRepo::get_contact_by_email_id(pool.get_ref(), email_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("contact {} missing after create", email_id))?;

    Ok(HttpResponse::Created().json(CtmsResponse::from(contact)))
}

/// Read endpoint for the identity keys associated with a contact
#[tracing::instrument(name = "Read a contact's identities", skip(pool))]
#[get("/{email_id}")]
async fn read_identity(
    pool: web::Data<PgPool>,
    path: web::Path<(Uuid,)>,
) -> Result<impl Responder, ContactError> {
    let (email_id,) = path.into_inner();

    let contact = ContactsRepo::get_contact_by_email_id(pool.get_ref(), email_id)
        .await?
        .ok_or(ContactError::UnknownContactId)?;

    Ok(HttpResponse::Ok().json(IdentityResponse::from(&contact)))
}

#[derive(Debug, Error)]
pub enum ContactError {
    #[error("Unknown contact_id")]
    UnknownContactId,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal Server Error")]
    DatabaseError(#[source] sqlx::Error),

    #[error("Internal Server Error")]
    Other(#[from] anyhow::Error),
}

impl From<Error> for ContactError {
    fn from(e: Error) -> Self {
        match e {
            Error::ParsingError(msg) | Error::ConstraintViolation(msg) => Self::BadRequest(msg),
            Error::MissingIdentifiers => {
                Self::BadRequest("at least one contact identifier is required".into())
            }
            Error::Conflict(msg) => Self::Conflict(msg),
            Error::DatabaseError(e) => Self::DatabaseError(e),
        }
    }
}

impl ResponseError for ContactError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::UnknownContactId => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::DatabaseError(_) | Self::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "detail": self.to_string() }))
    }
}

/// Contact API endpoints
pub fn ctms_scope() -> impl HttpServiceFactory {
    web::scope("/ctms")
        .service(find)
        .service(create)
        .service(read)
}

/// Identity projection endpoints
pub fn identity_scope() -> impl HttpServiceFactory {
    web::scope("/identity").service(read_identity)
}
