// src/handlers/dashboard.rs

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{
    common::error::AppError,
    config::AppState,
    // Importamos os models para referenciar no Swagger
    models::{
        dashboard::{DashboardView, ForecastView, PayablesView, ReportRow},
        ledger::KNOWN_SECTORS,
    },
    services::report::report_csv,
};

// GET /api/health
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Painel",
    responses((status = 200, description = "Serviço no ar", body = String))
)]
pub async fn health() -> &'static str {
    "OK"
}

// GET /api/dashboard
#[utoipa::path(
    get,
    path = "/api/dashboard",
    tag = "Painel",
    responses(
        (status = 200, description = "Totais, cards e lançamentos com situação de vencimento", body = DashboardView),
        (status = 503, description = "Serviço de dados indisponível")
    )
)]
pub async fn get_dashboard(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let today = app_state.clock.today();
    let view = app_state.ledger_service.dashboard(today).await?;
    Ok((StatusCode::OK, Json(view)))
}

// GET /api/payables
#[utoipa::path(
    get,
    path = "/api/payables",
    tag = "Painel",
    responses(
        (status = 200, description = "Contas a pagar por vencimento", body = PayablesView),
        (status = 503, description = "Serviço de dados indisponível")
    )
)]
pub async fn get_payables(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let today = app_state.clock.today();
    let view = app_state.ledger_service.payables(today).await?;
    Ok((StatusCode::OK, Json(view)))
}

// GET /api/forecast
#[utoipa::path(
    get,
    path = "/api/forecast",
    tag = "Painel",
    responses((status = 200, description = "Previsão de faturamento", body = ForecastView))
)]
pub async fn get_forecast(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let view = app_state.ledger_service.forecast().await?;
    Ok((StatusCode::OK, Json(view)))
}

// GET /api/sectors
#[utoipa::path(
    get,
    path = "/api/sectors",
    tag = "Painel",
    responses((status = 200, description = "Setores sugeridos no formulário", body = Vec<String>))
)]
pub async fn list_sectors() -> impl IntoResponse {
    Json(KNOWN_SECTORS)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Json,
    Csv,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportParams {
    /// Padrão: primeiro dia do mês corrente
    pub start: Option<NaiveDate>,
    /// Padrão: hoje
    pub end: Option<NaiveDate>,
    #[serde(default)]
    pub format: ReportFormat,
}

// GET /api/report
#[utoipa::path(
    get,
    path = "/api/report",
    tag = "Painel",
    params(ReportParams),
    responses(
        (status = 200, description = "Relatório do período (JSON ou CSV)", body = Vec<ReportRow>),
        (status = 400, description = "Período inválido")
    )
)]
pub async fn get_report(
    State(app_state): State<AppState>,
    Query(params): Query<ReportParams>,
) -> Result<Response, AppError> {
    let start = params.start.unwrap_or_else(|| app_state.clock.first_day_of_month());
    let end = params.end.unwrap_or_else(|| app_state.clock.today());
    let rows = app_state.ledger_service.report(start, end).await?;

    match params.format {
        ReportFormat::Json => Ok(Json(rows).into_response()),
        ReportFormat::Csv => {
            let csv = report_csv(&rows)?;
            let disposition = format!(
                "attachment; filename=\"relatorio_{}_{}.csv\"",
                start.format("%Y-%m-%d"),
                end.format("%Y-%m-%d")
            );
            let headers = [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ];
            Ok((headers, csv).into_response())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, FixedOffset, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use crate::{
        common::clock::LocalClock,
        db::MemoryLedgerStore,
        models::ledger::{DueDate, FinancialRecord, RecordStatus},
    };

    use super::*;

    fn clock() -> LocalClock {
        LocalClock::new(FixedOffset::west_opt(3 * 3600).unwrap())
    }

    fn record(amount: Decimal, paid: bool, due: Option<NaiveDate>) -> FinancialRecord {
        FinancialRecord {
            id: Uuid::new_v4(),
            description: "Gás de cozinha".into(),
            sector: "Fixos".into(),
            amount: Some(amount),
            due_date: due.map(DueDate::Valid),
            created_at: Utc::now(),
            paid,
            status: RecordStatus::from_paid(paid).as_str().into(),
            payment_method: None,
            invoice_number: None,
            notes: None,
            payment_date: None,
        }
    }

    fn state_with(records: Vec<FinancialRecord>) -> AppState {
        AppState::with_store(Arc::new(MemoryLedgerStore::with_records(records)), clock())
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn dashboard_serializes_camel_case_totals() {
        let today = clock().today();
        let state = state_with(vec![
            record(dec!(100), true, None),
            record(dec!(-50), false, Some(today)),
            record(dec!(-30), false, Some(today - Duration::days(2))),
        ]);

        let response = get_dashboard(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["totals"]["payable"].as_f64(), Some(80.0));
        assert_eq!(body["totals"]["profit"].as_f64(), Some(20.0));
        assert_eq!(body["cards"][3]["formatted"], "R$ 80,00");
        assert!(body.get("warning").is_none());
    }

    #[tokio::test]
    async fn payables_lists_only_unpaid_expenses() {
        let today = clock().today();
        let state = state_with(vec![
            record(dec!(100), true, None),
            record(dec!(-50), false, Some(today + Duration::days(1))),
            record(dec!(-70), true, Some(today)),
        ]);

        let response = get_payables(State(state)).await.into_response();
        let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["entries"].as_array().map(Vec::len), Some(1));
        assert_eq!(body["entries"][0]["due"]["label"], "Em 1 dia");
        assert_eq!(body["formattedTotal"], "R$ 50,00");
    }

    #[tokio::test]
    async fn report_as_csv_sets_content_type() {
        let today = clock().today();
        let state = state_with(vec![record(dec!(-485), false, Some(today))]);
        let params = ReportParams {
            start: Some(today),
            end: Some(today),
            format: ReportFormat::Csv,
        };

        let response = get_report(State(state), Query(params)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/csv; charset=utf-8"
        );
        let csv = body_text(response).await;
        assert!(csv.starts_with("DATA,DESCRIÇÃO,SETOR,VALOR,STATUS\n"));
        assert!(csv.contains("\"R$ 485,00\",PENDENTE"));
    }

    #[tokio::test]
    async fn inverted_report_period_is_bad_request() {
        let today = clock().today();
        let params = ReportParams {
            start: Some(today),
            end: Some(today - Duration::days(1)),
            format: ReportFormat::Json,
        };

        let response = get_report(State(state_with(Vec::new())), Query(params))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn sectors_include_default() {
        let response = list_sectors().await.into_response();
        let body: Vec<String> = serde_json::from_str(&body_text(response).await).unwrap();
        assert!(body.iter().any(|sector| sector == "Fixos"));
    }
}
