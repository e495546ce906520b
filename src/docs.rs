// src/docs.rs

use utoipa::OpenApi;
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Caderno da Confeitaria",
        description = "Livro-caixa: lançamentos, painel, contas a pagar e relatórios"
    ),
    paths(
        // --- Painel ---
        handlers::dashboard::health,
        handlers::dashboard::get_dashboard,
        handlers::dashboard::get_payables,
        handlers::dashboard::get_forecast,
        handlers::dashboard::get_report,
        handlers::dashboard::list_sectors,

        // --- Lançamentos ---
        handlers::records::list_records,
        handlers::records::create_record,
        handlers::records::edit_record,
        handlers::records::mark_paid,
        handlers::records::delete_record,
    ),
    components(
        schemas(
            // --- Lançamentos ---
            models::ledger::FinancialRecord,
            models::ledger::EntryKind,
            models::ledger::EntryForm,
            models::ledger::EditForm,
            models::ledger::AmountSign,
            models::ledger::OrderField,

            // --- Painel ---
            models::dashboard::Totals,
            models::dashboard::SummaryCard,
            models::dashboard::DueStatus,
            models::dashboard::RecordView,
            models::dashboard::DashboardView,
            models::dashboard::PayableEntry,
            models::dashboard::PayablesView,
            models::dashboard::Forecast,
            models::dashboard::ForecastView,
            models::dashboard::ReportRow,
            handlers::dashboard::ReportFormat,
        )
    ),
    tags(
        (name = "Lançamentos", description = "Cadastro, edição, pagamento e exclusão de lançamentos"),
        (name = "Painel", description = "Totais, contas a pagar, previsão e relatórios")
    )
)]
pub struct ApiDoc;
