// src/db/store.rs

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::error::StoreError,
    models::ledger::{FinancialRecord, NewRecord, RecordPatch, RecordQuery},
};

/// Fronteira com o serviço de dados que guarda a tabela `financial_records`.
///
/// Cada chamada é aplicada por inteiro ou não é aplicada. Não há retentativa:
/// quem chama decide se relê ou ajusta a cópia local.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn fetch_records(&self, query: &RecordQuery) -> Result<Vec<FinancialRecord>, StoreError>;

    async fn insert_record(&self, record: NewRecord) -> Result<FinancialRecord, StoreError>;

    /// `StoreError::NotFound` se nenhum lançamento tiver esse id.
    async fn update_record(&self, id: Uuid, patch: RecordPatch) -> Result<(), StoreError>;

    async fn delete_record(&self, id: Uuid) -> Result<(), StoreError>;
}
