//! Recurring expense and occurrence handlers.
//!
//! ```text
//! POST /regular_expenses {"name":"rent","frequency":"1 month","amount":50000,"nextDate":"2026-09-01"}
//! DELETE /regular_expenses/{id}
//! GET /users/{user_id}/regular_expenses
//! GET /users/{user_id}/expenses?start_date=2026-01-01&end_date=2026-12-31
//! ```
//!
//! Reads are scoped to the session user: requesting another user's data
//! returns `403 Forbidden`.

use actix_web::{delete, get, post, web, HttpResponse};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::ports::ExpenseRepositoryError;
use crate::domain::{
    Amount, DateRange, Error, ExpenseOccurrence, Frequency, NewRecurringExpense, RecurringExpense,
    RegularExpenseId, UserId,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_date, FieldName};
use crate::inbound::http::ApiResult;

/// Definition payload for `POST /regular_expenses`.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub frequency: Frequency,
    pub amount: Amount,
    pub next_date: NaiveDate,
}

/// Stored definition representation returned to clients.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionResponse {
    pub id: RegularExpenseId,
    pub user_id: UserId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub frequency: Frequency,
    pub amount: Amount,
    pub next_date: Option<NaiveDate>,
}

impl From<RecurringExpense> for DefinitionResponse {
    fn from(definition: RecurringExpense) -> Self {
        Self {
            id: definition.id,
            user_id: definition.user_id,
            name: definition.name,
            description: definition.description,
            frequency: definition.frequency,
            amount: definition.amount,
            next_date: definition.next_date,
        }
    }
}

/// Stored occurrence representation returned to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OccurrenceResponse {
    pub id: i64,
    pub user_id: UserId,
    pub regular_expense_id: RegularExpenseId,
    pub date: NaiveDate,
}

impl From<ExpenseOccurrence> for OccurrenceResponse {
    fn from(occurrence: ExpenseOccurrence) -> Self {
        Self {
            id: occurrence.id,
            user_id: occurrence.user_id,
            regular_expense_id: occurrence.regular_expense_id,
            date: occurrence.date,
        }
    }
}

/// Date-range query string for the occurrences listing.
#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub start_date: String,
    pub end_date: String,
}

fn map_expense_store_error(error: ExpenseRepositoryError) -> Error {
    match error {
        ExpenseRepositoryError::Connection { .. } => {
            Error::service_unavailable("expense store unavailable")
        }
        ExpenseRepositoryError::Query { message } => {
            Error::internal(format!("expense store query failed: {message}"))
        }
        ExpenseRepositoryError::NotFound { id } => {
            Error::not_found(format!("regular expense {id} not found"))
        }
    }
}

fn require_own_data(session: &SessionContext, path_user: UserId) -> Result<UserId, Error> {
    let session_user = session.require_user_id()?;
    if session_user != path_user {
        return Err(Error::forbidden("cannot access another user's data"));
    }
    Ok(session_user)
}

/// Register a recurring payment obligation for the session user.
#[post("/regular_expenses")]
pub async fn create_definition(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<DefinitionRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let request = payload.into_inner();
    let definition = NewRecurringExpense::new(
        user_id,
        request.name,
        request.description,
        request.frequency,
        request.amount,
        request.next_date,
    )
    .map_err(|err| Error::invalid_request(err.to_string()))?;

    let stored = state
        .expenses
        .create_definition(&definition)
        .await
        .map_err(map_expense_store_error)?;
    Ok(HttpResponse::Created().json(DefinitionResponse::from(stored)))
}

/// Stop future occurrences of one of the session user's definitions.
///
/// The row is kept so existing occurrences stay attributable. Another
/// user's definition answers 404, never 204.
#[delete("/regular_expenses/{id}")]
pub async fn delete_definition(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let id = RegularExpenseId::new(path.into_inner())
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    state
        .expenses
        .deactivate_definition(user_id, id)
        .await
        .map_err(map_expense_store_error)?;
    Ok(HttpResponse::NoContent().finish())
}

/// List the session user's active definitions.
#[get("/users/{user_id}/regular_expenses")]
pub async fn list_definitions(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<web::Json<Vec<DefinitionResponse>>> {
    let path_user =
        UserId::new(path.into_inner()).map_err(|err| Error::invalid_request(err.to_string()))?;
    let user_id = require_own_data(&session, path_user)?;

    let definitions = state
        .expenses
        .active_definitions(user_id)
        .await
        .map_err(map_expense_store_error)?;
    Ok(web::Json(
        definitions.into_iter().map(DefinitionResponse::from).collect(),
    ))
}

/// List the session user's occurrences within an inclusive date range.
#[get("/users/{user_id}/expenses")]
pub async fn list_occurrences(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    query: web::Query<RangeQuery>,
) -> ApiResult<web::Json<Vec<OccurrenceResponse>>> {
    let path_user =
        UserId::new(path.into_inner()).map_err(|err| Error::invalid_request(err.to_string()))?;
    let user_id = require_own_data(&session, path_user)?;

    let start = parse_date(&query.start_date, FieldName::new("start_date"))?;
    let end = parse_date(&query.end_date, FieldName::new("end_date"))?;
    let range = DateRange::new(start, end).map_err(|err| Error::invalid_request(err.to_string()))?;

    let occurrences = state
        .expenses
        .occurrences_in_range(user_id, range)
        .await
        .map_err(map_expense_store_error)?;
    Ok(web::Json(
        occurrences.into_iter().map(OccurrenceResponse::from).collect(),
    ))
}
