// src/db/memory_repo.rs

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    common::error::StoreError,
    db::store::LedgerStore,
    models::ledger::{FinancialRecord, NewRecord, RecordPatch, RecordQuery},
};

/// Serviço de dados em memória (`LEDGER_STORE=memory`). Some ao reiniciar.
#[derive(Clone, Default)]
pub struct MemoryLedgerStore {
    records: Arc<RwLock<Vec<FinancialRecord>>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<FinancialRecord>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }

    /// Carrega uma exportação JSON da tabela `financial_records`.
    ///
    /// Linhas sujas (valor em texto, data ilegível, `paid` nulo) entram como
    /// estão; quem decide como exibi-las é o motor de classificação.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let records: Vec<FinancialRecord> = serde_json::from_str(json)?;
        Ok(Self::with_records(records))
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn fetch_records(&self, query: &RecordQuery) -> Result<Vec<FinancialRecord>, StoreError> {
        let records = self.records.read().await;
        let mut selected: Vec<FinancialRecord> = records
            .iter()
            .filter(|record| query.matches(record))
            .cloned()
            .collect();
        query.sort(&mut selected);
        Ok(selected)
    }

    async fn insert_record(&self, record: NewRecord) -> Result<FinancialRecord, StoreError> {
        let created = record.into_record(Uuid::new_v4(), Utc::now());
        self.records.write().await.push(created.clone());
        Ok(created)
    }

    async fn update_record(&self, id: Uuid, patch: RecordPatch) -> Result<(), StoreError> {
        if patch.is_empty() {
            return Err(StoreError::Constraint("atualização sem nenhum campo".to_string()));
        }

        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or(StoreError::NotFound(id))?;
        patch.apply_to(record);
        Ok(())
    }

    async fn delete_record(&self, id: Uuid) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|record| record.id != id);
        if records.len() == before {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::models::ledger::{AmountSign, DueDate, OrderField, RecordOrder};

    use super::*;

    fn new_record(amount: Decimal, paid: bool, due: Option<NaiveDate>) -> NewRecord {
        NewRecord {
            description: "Compra de farinha e açúcar".into(),
            sector: "Variáveis".into(),
            amount,
            due_date: due,
            paid,
            payment_method: None,
            invoice_number: None,
            notes: None,
            payment_date: None,
        }
    }

    #[tokio::test]
    async fn insert_assigns_id_and_status() {
        let store = MemoryLedgerStore::new();
        let created = store.insert_record(new_record(dec!(-320.5), false, None)).await.unwrap();
        assert_eq!(created.status, "Pendente");

        let all = store.fetch_records(&RecordQuery::default()).await.unwrap();
        assert_eq!(all, vec![created]);
    }

    #[tokio::test]
    async fn payables_round_trip_iff_negative_and_unpaid() {
        let store = MemoryLedgerStore::new();
        let cases = [
            (dec!(-50), false, true),
            (dec!(-50), true, false),
            (dec!(50), false, false),
            (dec!(0), false, false),
        ];

        for (amount, paid, expected) in cases {
            let created = store.insert_record(new_record(amount, paid, None)).await.unwrap();
            let payables = store.fetch_records(&RecordQuery::payables()).await.unwrap();
            assert_eq!(payables.iter().any(|r| r.id == created.id), expected, "{amount} paid={paid}");
        }
    }

    #[tokio::test]
    async fn fetch_filters_and_orders() {
        let store = MemoryLedgerStore::new();
        store.insert_record(new_record(dec!(10), true, None)).await.unwrap();
        store.insert_record(new_record(dec!(30), true, None)).await.unwrap();
        store.insert_record(new_record(dec!(-5), false, None)).await.unwrap();

        let query = RecordQuery {
            sign: Some(AmountSign::Positive),
            order: Some(RecordOrder { field: OrderField::Amount, ascending: false }),
            ..RecordQuery::default()
        };
        let incomes = store.fetch_records(&query).await.unwrap();
        let amounts: Vec<_> = incomes.iter().map(|r| r.amount).collect();
        assert_eq!(amounts, vec![Some(dec!(30)), Some(dec!(10))]);
    }

    #[tokio::test]
    async fn update_and_delete_unknown_id_is_not_found() {
        let store = MemoryLedgerStore::new();
        let missing = Uuid::new_v4();
        let patch = RecordPatch::mark_paid(Utc::now());

        assert!(matches!(
            store.update_record(missing, patch).await,
            Err(StoreError::NotFound(id)) if id == missing
        ));
        assert!(matches!(
            store.delete_record(missing).await,
            Err(StoreError::NotFound(id)) if id == missing
        ));
    }

    #[tokio::test]
    async fn bundled_seed_loads_with_lenient_fields() {
        let store = MemoryLedgerStore::from_json(include_str!("../../seed/financial_records.json")).unwrap();

        let payables = store.fetch_records(&RecordQuery::payables()).await.unwrap();
        let amounts: Vec<_> = payables.iter().map(|r| r.amount).collect();
        // "-320,50" vem como texto; `paid: null` conta como não pago
        assert_eq!(amounts, vec![Some(dec!(-485)), Some(dec!(-320.50))]);
    }

    #[tokio::test]
    async fn unreadable_seed_date_is_kept_as_invalid() {
        let json = r#"[{
            "id": "0b7c1f0e-3f7a-4b7e-9c1d-2f6a5c1e9a09",
            "description": "Gás",
            "amount": -90,
            "due_date": "semana que vem",
            "created_at": "2026-02-03T12:00:00Z"
        }]"#;
        let store = MemoryLedgerStore::from_json(json).unwrap();

        let records = store.fetch_records(&RecordQuery::payables()).await.unwrap();
        assert_eq!(records[0].due_date, Some(DueDate::Invalid("semana que vem".into())));
        assert!(MemoryLedgerStore::from_json("{}").is_err());
    }

    #[tokio::test]
    async fn empty_patch_is_rejected_without_touching_data() {
        let store = MemoryLedgerStore::new();
        let created = store.insert_record(new_record(dec!(-5), false, None)).await.unwrap();
        assert!(matches!(
            store.update_record(created.id, RecordPatch::default()).await,
            Err(StoreError::Constraint(_))
        ));
        let all = store.fetch_records(&RecordQuery::default()).await.unwrap();
        assert_eq!(all, vec![created]);
    }
}
