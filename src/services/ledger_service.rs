// src/services/ledger_service.rs

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::{currency::format_brl, error::AppError},
    db::LedgerStore,
    models::{
        dashboard::{
            DashboardView, ForecastView, PayableEntry, PayablesView, RecordView, ReportRow,
            SummaryCard, Totals,
        },
        ledger::{EditForm, EntryForm, FinancialRecord, RecordPatch, RecordQuery},
    },
    services::{
        classification::{aggregate, classify_due_date, filter_payables, forecast, reference_date, report_rows},
        view_state::ViewState,
    },
};

const STALE_WARNING: &str = "Não foi possível atualizar; exibindo os dados anteriores.";

type RecordList = ViewState<Vec<FinancialRecord>>;

// Controla as telas: busca no serviço de dados, passa pelo motor de
// classificação e mantém uma cópia da lista de cada tela.
#[derive(Clone)]
pub struct LedgerService {
    store: Arc<dyn LedgerStore>,
    dashboard_view: RecordList,
    payables_view: RecordList,
}

impl LedgerService {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self {
            store,
            dashboard_view: ViewState::new(),
            payables_view: ViewState::new(),
        }
    }

    /// Busca uma lista para a tela.
    ///
    /// Se a busca falhar e a tela já tiver carregado antes, devolve a lista
    /// anterior com um aviso. Sem lista anterior, o erro sobe.
    async fn load(
        &self,
        view: &RecordList,
        query: &RecordQuery,
    ) -> Result<(Vec<FinancialRecord>, Option<String>), AppError> {
        let ticket = view.begin().await;

        match self.store.fetch_records(query).await {
            Ok(records) => {
                if !view.complete(ticket, records).await {
                    tracing::debug!("Resposta obsoleta descartada (leitura {:?})", ticket);
                }
                Ok((view.current().await, None))
            }
            Err(e) => {
                view.fail(ticket, e.to_string()).await;
                let snapshot = view.snapshot().await;
                if snapshot.generation == 0 {
                    return Err(e.into());
                }
                tracing::warn!(
                    "⚠️ Falha ao atualizar a lista, mantendo a da leitura {} ({:?})",
                    snapshot.generation,
                    snapshot.phase
                );
                Ok((snapshot.data, Some(STALE_WARNING.to_string())))
            }
        }
    }

    pub async fn fetch_records(&self, query: &RecordQuery) -> Result<Vec<FinancialRecord>, AppError> {
        Ok(self.store.fetch_records(query).await?)
    }

    pub async fn dashboard(&self, today: NaiveDate) -> Result<DashboardView, AppError> {
        let (records, warning) = self.load(&self.dashboard_view, &RecordQuery::all()).await?;
        let totals = aggregate(&records);

        let rows = records
            .into_iter()
            .map(|record| {
                let due = classify_due_date(record.due_date.as_ref(), today).into();
                RecordView {
                    flow: record.kind().map_or("-", |kind| kind.label()).to_string(),
                    formatted_amount: format_brl(record.amount_or_zero().abs()),
                    status_label: record.record_status().as_str().to_string(),
                    due,
                    record,
                }
            })
            .collect();

        Ok(DashboardView {
            totals,
            cards: summary_cards(&totals),
            records: rows,
            warning,
        })
    }

    pub async fn payables(&self, today: NaiveDate) -> Result<PayablesView, AppError> {
        let (records, warning) = self.load(&self.payables_view, &RecordQuery::payables()).await?;

        let entries: Vec<PayableEntry> = filter_payables(&records)
            .into_iter()
            .map(|record| {
                let amount_due = record.amount_or_zero().abs();
                PayableEntry {
                    amount_due,
                    formatted_amount: format_brl(amount_due),
                    due: classify_due_date(record.due_date.as_ref(), today).into(),
                    record,
                }
            })
            .collect();
        let total = entries
            .iter()
            .fold(Decimal::ZERO, |total, entry| total.saturating_add(entry.amount_due));

        Ok(PayablesView {
            total,
            formatted_total: format_brl(total),
            entries,
            warning,
        })
    }

    pub async fn create_record(&self, form: EntryForm) -> Result<FinancialRecord, AppError> {
        let new_record = form.into_new_record()?;
        let created = self.store.insert_record(new_record).await?;
        tracing::info!(
            "✅ Lançamento {} criado: {} ({})",
            created.id,
            created.description,
            format_brl(created.amount_or_zero())
        );

        let for_dashboard = created.clone();
        self.dashboard_view
            .reconcile(move |records| records.insert(0, for_dashboard))
            .await;

        if created.is_payable() {
            let for_payables = created.clone();
            self.payables_view
                .reconcile(move |records| {
                    records.push(for_payables);
                    RecordQuery::payables().sort(records);
                })
                .await;
        }

        Ok(created)
    }

    pub async fn edit_record(&self, id: Uuid, form: EditForm) -> Result<(), AppError> {
        let patch = form.into_patch()?;
        self.store.update_record(id, patch.clone()).await?;
        tracing::info!("✏️ Lançamento {} atualizado", id);

        self.reconcile_patch(id, &patch).await;
        Ok(())
    }

    pub async fn mark_paid(&self, id: Uuid, now: DateTime<Utc>) -> Result<(), AppError> {
        let patch = RecordPatch::mark_paid(now);
        self.store.update_record(id, patch.clone()).await?;
        tracing::info!("💸 Lançamento {} marcado como pago", id);

        self.reconcile_patch(id, &patch).await;
        Ok(())
    }

    pub async fn delete_record(&self, id: Uuid) -> Result<(), AppError> {
        self.store.delete_record(id).await?;
        tracing::info!("🗑️ Lançamento {} excluído", id);

        self.dashboard_view
            .reconcile(|records| records.retain(|record| record.id != id))
            .await;
        self.payables_view
            .reconcile(|records| records.retain(|record| record.id != id))
            .await;
        Ok(())
    }

    pub async fn forecast(&self) -> Result<ForecastView, AppError> {
        let records = self.store.fetch_records(&RecordQuery::all()).await?;

        Ok(match forecast(&records) {
            Some(forecast) => ForecastView { message: None, forecast: Some(forecast) },
            None => ForecastView {
                message: Some("Sem dados suficientes".to_string()),
                forecast: None,
            },
        })
    }

    /// Relatório do período `[start, end]`, em ordem de data de referência.
    pub async fn report(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<ReportRow>, AppError> {
        if start > end {
            return Err(AppError::InvalidInput(format!(
                "Período inválido: {} é depois de {}",
                start.format("%d/%m/%Y"),
                end.format("%d/%m/%Y")
            )));
        }

        let mut records = self.store.fetch_records(&RecordQuery::all()).await?;
        records.sort_by_key(reference_date);
        Ok(report_rows(&records, start, end))
    }

    // Aplica a mesma alteração nas listas locais das duas telas.
    // Um lançamento que deixou de ser "a pagar" sai da lista de contas.
    async fn reconcile_patch(&self, id: Uuid, patch: &RecordPatch) {
        let mut patched = None;
        self.dashboard_view
            .reconcile(|records| {
                if let Some(record) = records.iter_mut().find(|record| record.id == id) {
                    patch.apply_to(record);
                    patched = Some(record.clone());
                }
            })
            .await;

        self.payables_view
            .reconcile(|records| {
                let updated = patched.or_else(|| {
                    records.iter().find(|record| record.id == id).cloned().map(|mut record| {
                        patch.apply_to(&mut record);
                        record
                    })
                });
                records.retain(|record| record.id != id);
                if let Some(record) = updated.filter(FinancialRecord::is_payable) {
                    records.push(record);
                    RecordQuery::payables().sort(records);
                }
            })
            .await;
    }
}

fn summary_cards(totals: &Totals) -> Vec<SummaryCard> {
    [
        ("Entradas", totals.income),
        ("Saídas", totals.expense),
        ("Lucro", totals.profit),
        ("A Pagar", totals.payable),
    ]
    .into_iter()
    .map(|(title, value)| SummaryCard {
        title: title.to_string(),
        value,
        formatted: format_brl(value),
    })
    .collect()
}
