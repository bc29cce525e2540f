//! User management handlers.
//!
//! ```text
//! POST /users {"email":"ada@example.com","name":"Ada","passwordHash":"..."}
//! PUT /users/{user_id}
//! DELETE /users/{user_id}
//! ```
//!
//! These are administrative endpoints over raw user records; interactive
//! signup goes through `POST /register` instead.

use actix_web::{delete, post, put, web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::domain::ports::UserRepositoryError;
use crate::domain::{EmailAddress, Error, NewUser, User, UserId};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// User record payload for create and replace requests.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub email: String,
    pub name: String,
    pub password_hash: String,
}

/// Stored user representation returned to clients.
///
/// The password hash is never echoed back.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub email: EmailAddress,
    pub name: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.as_i64(),
            email: user.email,
            name: user.name,
        }
    }
}

/// Map user store failures to transport-agnostic domain errors.
pub(crate) fn map_user_store_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { .. } => {
            Error::service_unavailable("user store unavailable")
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user store query failed: {message}"))
        }
        UserRepositoryError::DuplicateEmail { email } => {
            Error::conflict(format!("a user with email '{email}' already exists"))
        }
        UserRepositoryError::NotFound { id } => Error::not_found(format!("user {id} not found")),
    }
}

fn record_to_new_user(record: UserRecord) -> Result<NewUser, Error> {
    let email =
        EmailAddress::new(record.email).map_err(|err| Error::invalid_request(err.to_string()))?;
    NewUser::new(email, record.name, record.password_hash)
        .map_err(|err| Error::invalid_request(err.to_string()))
}

/// Create a user record verbatim.
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<UserRecord>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    let new_user = record_to_new_user(payload.into_inner())?;
    let user = state
        .users
        .create(&new_user)
        .await
        .map_err(map_user_store_error)?;
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// Replace every field of an existing user.
#[put("/users/{user_id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    payload: web::Json<UserRecord>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    let id = UserId::new(path.into_inner())
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    let record = record_to_new_user(payload.into_inner())?;
    let user = User {
        id,
        email: record.email,
        name: record.name,
        password_hash: record.password_hash,
    };
    state
        .users
        .update(&user)
        .await
        .map_err(map_user_store_error)?;
    Ok(HttpResponse::NoContent().finish())
}

/// Delete a user row.
#[delete("/users/{user_id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    let id = UserId::new(path.into_inner())
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    state
        .users
        .delete(id)
        .await
        .map_err(map_user_store_error)?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{test as actix_test, web, App, HttpResponse as TestResponse};
    use mockall::predicate::eq;
    use serde_json::Value;

    use crate::domain::ports::{MockExpenseRepository, MockUserRepository};
    use crate::inbound::http::session::SessionContext;

    fn state_with_users(users: MockUserRepository) -> HttpState {
        HttpState::new(Arc::new(users), Arc::new(MockExpenseRepository::new()))
    }

    fn test_app(
        state: HttpState,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .wrap(crate::inbound::http::test_utils::test_session_middleware())
            .app_data(web::Data::new(state))
            .route(
                "/test-login",
                web::get().to(|session: SessionContext| async move {
                    session.persist_user(UserId::new(9).expect("fixture id"))?;
                    Ok::<_, Error>(TestResponse::Ok())
                }),
            )
            .service(create_user)
            .service(update_user)
            .service(delete_user)
    }

    async fn session_cookie<S>(app: &S) -> actix_web::cookie::Cookie<'static>
    where
        S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
    {
        let response = actix_test::call_service(
            app,
            actix_test::TestRequest::get().uri("/test-login").to_request(),
        )
        .await;
        response
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "token")
            .expect("session cookie set")
            .into_owned()
    }

    fn record() -> UserRecord {
        UserRecord {
            email: "ada@example.com".into(),
            name: "Ada".into(),
            password_hash: "$argon2id$stub".into(),
        }
    }

    #[actix_web::test]
    async fn create_returns_record_without_hash() {
        let mut users = MockUserRepository::new();
        users.expect_create().returning(|new_user| {
            Ok(User {
                id: UserId::new(4).expect("fixture id"),
                email: new_user.email.clone(),
                name: new_user.name.clone(),
                password_hash: new_user.password_hash.clone(),
            })
        });
        let app = actix_test::init_service(test_app(state_with_users(users))).await;
        let cookie = session_cookie(&app).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/users")
                .cookie(cookie)
                .set_json(record())
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = actix_test::read_body(response).await;
        let value: Value = serde_json::from_slice(&body).expect("user payload");
        assert_eq!(value.get("id").and_then(Value::as_i64), Some(4));
        assert!(value.get("passwordHash").is_none(), "hash never echoed");
    }

    #[actix_web::test]
    async fn create_requires_session() {
        let app =
            actix_test::init_service(test_app(state_with_users(MockUserRepository::new()))).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/users")
                .set_json(record())
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn update_missing_user_is_not_found() {
        let mut users = MockUserRepository::new();
        users
            .expect_update()
            .returning(|user| Err(UserRepositoryError::NotFound {
                id: user.id.as_i64(),
            }));
        let app = actix_test::init_service(test_app(state_with_users(users))).await;
        let cookie = session_cookie(&app).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::put()
                .uri("/users/42")
                .cookie(cookie)
                .set_json(record())
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn delete_returns_no_content() {
        let mut users = MockUserRepository::new();
        users
            .expect_delete()
            .with(eq(UserId::new(7).expect("fixture id")))
            .returning(|_| Ok(()));
        let app = actix_test::init_service(test_app(state_with_users(users))).await;
        let cookie = session_cookie(&app).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri("/users/7")
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
