// src/handlers/records.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    models::ledger::{
        AmountSign, EditForm, EntryForm, FinancialRecord, OrderField, RecordOrder, RecordQuery,
    },
};

// ---
// Parâmetros: GET /api/records
// ---
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct RecordsParams {
    /// Filtra por situação de pagamento
    pub paid: Option<bool>,
    /// `positive` (entradas) ou `negative` (saídas)
    pub sign: Option<AmountSign>,
    /// `created_at`, `due_date` ou `amount` (padrão: created_at)
    pub order_by: Option<OrderField>,
    /// Padrão: decrescente
    pub ascending: Option<bool>,
}

impl RecordsParams {
    fn into_query(self) -> RecordQuery {
        RecordQuery {
            paid: self.paid,
            sign: self.sign,
            order: Some(RecordOrder {
                field: self.order_by.unwrap_or(OrderField::CreatedAt),
                ascending: self.ascending.unwrap_or(false),
            }),
        }
    }
}

// GET /api/records
#[utoipa::path(
    get,
    path = "/api/records",
    tag = "Lançamentos",
    params(RecordsParams),
    responses(
        (status = 200, description = "Lançamentos filtrados e ordenados", body = Vec<FinancialRecord>),
        (status = 503, description = "Serviço de dados indisponível")
    )
)]
pub async fn list_records(
    State(app_state): State<AppState>,
    Query(params): Query<RecordsParams>,
) -> Result<impl IntoResponse, AppError> {
    let records = app_state
        .ledger_service
        .fetch_records(&params.into_query())
        .await?;

    Ok((StatusCode::OK, Json(records)))
}

// POST /api/records
#[utoipa::path(
    post,
    path = "/api/records",
    tag = "Lançamentos",
    request_body = EntryForm,
    responses(
        (status = 201, description = "Lançamento criado", body = FinancialRecord),
        (status = 400, description = "Formulário inválido"),
        (status = 409, description = "Violação de restrição no banco")
    )
)]
pub async fn create_record(
    State(app_state): State<AppState>,
    Json(form): Json<EntryForm>,
) -> Result<impl IntoResponse, AppError> {
    let created = app_state.ledger_service.create_record(form).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

// PUT /api/records/{id}
#[utoipa::path(
    put,
    path = "/api/records/{id}",
    tag = "Lançamentos",
    request_body = EditForm,
    params(
        ("id" = Uuid, Path, description = "ID do lançamento")
    ),
    responses(
        (status = 204, description = "Lançamento atualizado"),
        (status = 400, description = "Formulário inválido"),
        (status = 404, description = "Lançamento não encontrado")
    )
)]
pub async fn edit_record(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(form): Json<EditForm>,
) -> Result<impl IntoResponse, AppError> {
    app_state.ledger_service.edit_record(id, form).await?;
    Ok(StatusCode::NO_CONTENT)
}

// PATCH /api/records/{id}/pay
#[utoipa::path(
    patch,
    path = "/api/records/{id}/pay",
    tag = "Lançamentos",
    params(
        ("id" = Uuid, Path, description = "ID do lançamento")
    ),
    responses(
        (status = 204, description = "Marcado como pago"),
        (status = 404, description = "Lançamento não encontrado")
    )
)]
pub async fn mark_paid(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let now = app_state.clock.now();
    app_state.ledger_service.mark_paid(id, now).await?;
    Ok(StatusCode::NO_CONTENT)
}

// DELETE /api/records/{id}
#[utoipa::path(
    delete,
    path = "/api/records/{id}",
    tag = "Lançamentos",
    params(
        ("id" = Uuid, Path, description = "ID do lançamento")
    ),
    responses(
        (status = 204, description = "Lançamento excluído"),
        (status = 404, description = "Lançamento não encontrado")
    )
)]
pub async fn delete_record(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.ledger_service.delete_record(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
