//! Registration and login handlers.
//!
//! ```text
//! POST /register  email=ada@example.com&name=Ada&password=secret
//! POST /login     email=ada@example.com&password=secret
//! POST /logout
//! ```
//!
//! Both accept form-encoded bodies and establish a signed session cookie on
//! success. Every other route requires that cookie.

use actix_web::{post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::auth::{hash_password, verify_password};
use crate::domain::{EmailAddress, Error, NewUser};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::{map_user_store_error, UserResponse};
use crate::inbound::http::validation::{missing_field_error, FieldName};
use crate::inbound::http::ApiResult;

/// Registration form body for `POST /register`.
#[derive(Debug, Deserialize, Serialize)]
pub struct RegisterForm {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Login form body for `POST /login`.
#[derive(Debug, Deserialize, Serialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

fn require_non_empty(value: &str, field: FieldName) -> Result<&str, Error> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(missing_field_error(field));
    }
    Ok(trimmed)
}

fn parse_email(raw: &str) -> Result<EmailAddress, Error> {
    EmailAddress::new(raw).map_err(|err| Error::invalid_request(err.to_string()))
}

/// Create an account and log the new user in.
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<RegisterForm>,
) -> ApiResult<HttpResponse> {
    let form = form.into_inner();
    let name = require_non_empty(&form.name, FieldName::new("name"))?;
    let password = require_non_empty(&form.password, FieldName::new("password"))?;
    let email = parse_email(&form.email)?;

    let password_hash = hash_password(password)
        .map_err(|err| Error::internal(format!("password hashing failed: {err}")))?;
    let new_user = NewUser::new(email, name, password_hash)
        .map_err(|err| Error::invalid_request(err.to_string()))?;

    let user = state
        .users
        .create(&new_user)
        .await
        .map_err(map_user_store_error)?;
    session.persist_user(user.id)?;
    info!(user_id = %user.id, "user registered");
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// Verify credentials and establish a session cookie.
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<LoginForm>,
) -> ApiResult<HttpResponse> {
    let form = form.into_inner();
    let password = require_non_empty(&form.password, FieldName::new("password"))?;
    let email = parse_email(&form.email)?;

    let user = state
        .users
        .find_by_email(&email)
        .await
        .map_err(map_user_store_error)?
        .ok_or_else(|| Error::unauthorized("invalid credentials"))?;

    let verified = verify_password(&user.password_hash, password)
        .map_err(|err| Error::internal(format!("stored credential check failed: {err}")))?;
    if !verified {
        return Err(Error::unauthorized("invalid credentials"));
    }

    session.persist_user(user.id)?;
    Ok(HttpResponse::Ok().finish())
}

/// Drop the session cookie, logging the user out.
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}
