// src/models/dashboard.rs

use serde::Serialize;
use rust_decimal::Decimal;
use utoipa::ToSchema;

use crate::models::ledger::FinancialRecord;

// 1. Totais do painel (os Cards do Topo)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    #[schema(example = "100.00")]
    pub income: Decimal,   // Entradas
    #[schema(example = "80.00")]
    pub expense: Decimal,  // Saídas (magnitude)
    #[schema(example = "20.00")]
    pub profit: Decimal,   // Lucro = entradas - saídas
    #[schema(example = "80.00")]
    pub payable: Decimal,  // A Pagar (saídas não quitadas)
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SummaryCard {
    #[schema(example = "Entradas")]
    pub title: String,
    pub value: Decimal,
    #[schema(example = "R$ 1.234,56")]
    pub formatted: String,
}

// Situação de vencimento pronta para exibir
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DueStatus {
    #[schema(example = "dueInDays")]
    pub bucket: String,
    #[schema(example = 5)]
    pub days_until: Option<i64>,
    #[schema(example = "Em 5 dias")]
    pub label: String,
    #[schema(example = "upcoming")]
    pub style: String,
}

// 2. Linha da tabela de lançamentos
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordView {
    pub record: FinancialRecord,
    #[schema(example = "Saída")]
    pub flow: String,
    #[schema(example = "R$ 320,50")]
    pub formatted_amount: String,
    #[schema(example = "Pendente")]
    pub status_label: String,
    pub due: DueStatus,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub totals: Totals,
    pub cards: Vec<SummaryCard>,
    pub records: Vec<RecordView>,
    // Preenchido quando a atualização falhou e a lista anterior foi mantida
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "Não foi possível atualizar; exibindo os dados anteriores.")]
    pub warning: Option<String>,
}

// 3. Contas a pagar
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayableEntry {
    pub record: FinancialRecord,
    #[schema(example = "485.00")]
    pub amount_due: Decimal,
    #[schema(example = "R$ 485,00")]
    pub formatted_amount: String,
    pub due: DueStatus,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayablesView {
    pub total: Decimal,
    pub formatted_total: String,
    pub entries: Vec<PayableEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

// 4. Previsão de faturamento
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Forecast {
    #[schema(example = "1100.00")]
    pub projected_revenue: Decimal,
    pub formatted_projected_revenue: String,
    #[schema(example = "33.33")]
    pub daily_average_income: Decimal,
    #[schema(example = "1000.00")]
    pub monthly_projection: Decimal,
    #[schema(example = "Baixo")]
    pub operational_risk: String,
    #[schema(example = "Estável")]
    pub health: String,
    #[schema(example = "Aumentar estoque de insumos")]
    pub tip: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForecastView {
    #[schema(example = "Sem dados suficientes")]
    pub message: Option<String>,
    pub forecast: Option<Forecast>,
}

// 5. Relatório por período (mesmas colunas do relatório impresso)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    #[schema(example = "14/02/2026")]
    pub date: String,
    pub description: String,
    pub sector: String,
    #[schema(example = "R$ 485,00")]
    pub amount: String,
    #[schema(example = "PENDENTE")]
    pub status: String,
}
