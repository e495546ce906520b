// src/db/ledger_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::StoreError,
    db::store::LedgerStore,
    models::ledger::{
        AmountSign, DueDate, FinancialRecord, NewRecord, PaymentMethod, RecordPatch, RecordQuery,
        RecordStatus,
    },
};

const RECORD_COLUMNS: &str = "id, description, sector, amount, due_date, created_at, paid, \
                              status, payment_method, invoice_number, notes, payment_date";

// Linha crua da tabela: quase tudo pode vir nulo do banco hospedado
#[derive(Debug, FromRow)]
struct RecordRow {
    id: Uuid,
    description: Option<String>,
    sector: Option<String>,
    amount: Option<Decimal>,
    due_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    paid: Option<bool>,
    status: Option<String>,
    payment_method: Option<String>,
    invoice_number: Option<String>,
    notes: Option<String>,
    payment_date: Option<DateTime<Utc>>,
}

impl From<RecordRow> for FinancialRecord {
    fn from(row: RecordRow) -> Self {
        let paid = row.paid.unwrap_or(false);
        FinancialRecord {
            id: row.id,
            description: row.description.unwrap_or_default(),
            sector: row.sector.unwrap_or_default(),
            amount: row.amount,
            due_date: row.due_date.map(DueDate::Valid),
            created_at: row.created_at,
            paid,
            status: row
                .status
                .unwrap_or_else(|| RecordStatus::from_paid(paid).as_str().to_string()),
            payment_method: row.payment_method.map(PaymentMethod::from),
            invoice_number: row.invoice_number,
            notes: row.notes,
            payment_date: row.payment_date,
        }
    }
}

// O repositório do livro-caixa, responsável pela tabela 'financial_records'
#[derive(Clone)]
pub struct PgLedgerRepository {
    pool: PgPool,
}

impl PgLedgerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerStore for PgLedgerRepository {
    async fn fetch_records(&self, query: &RecordQuery) -> Result<Vec<FinancialRecord>, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {RECORD_COLUMNS} FROM financial_records WHERE TRUE"
        ));

        if let Some(paid) = query.paid {
            builder.push(" AND COALESCE(paid, FALSE) = ").push_bind(paid);
        }
        match query.sign {
            Some(AmountSign::Positive) => {
                builder.push(" AND amount > 0");
            }
            Some(AmountSign::Negative) => {
                builder.push(" AND amount < 0");
            }
            None => {}
        }
        if let Some(order) = query.order {
            builder
                .push(" ORDER BY ")
                .push(order.field.column())
                .push(if order.ascending { " ASC" } else { " DESC" })
                .push(" NULLS LAST");
        }

        let rows = builder
            .build_query_as::<RecordRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(FinancialRecord::from).collect())
    }

    async fn insert_record(&self, record: NewRecord) -> Result<FinancialRecord, StoreError> {
        let status = record.status();
        let sql = format!(
            r#"
            INSERT INTO financial_records (
                description, sector, amount, due_date, paid, status,
                payment_method, invoice_number, notes, payment_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {RECORD_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, RecordRow>(&sql)
            .bind(record.description)
            .bind(record.sector)
            .bind(record.amount)
            .bind(record.due_date)
            .bind(record.paid)
            .bind(status.as_str())
            .bind(record.payment_method.map(String::from))
            .bind(record.invoice_number)
            .bind(record.notes)
            .bind(record.payment_date)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }

    async fn update_record(&self, id: Uuid, patch: RecordPatch) -> Result<(), StoreError> {
        if patch.is_empty() {
            return Err(StoreError::Constraint("atualização sem nenhum campo".to_string()));
        }
        let status = patch.status();

        // Um único UPDATE: ou todos os campos mudam, ou nenhum
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE financial_records SET ");
        {
            let mut fields = builder.separated(", ");
            if let Some(description) = patch.description {
                fields.push("description = ").push_bind_unseparated(description);
            }
            if let Some(sector) = patch.sector {
                fields.push("sector = ").push_bind_unseparated(sector);
            }
            if let Some(amount) = patch.amount {
                fields.push("amount = ").push_bind_unseparated(amount);
            }
            if let Some(due_date) = patch.due_date {
                fields.push("due_date = ").push_bind_unseparated(due_date);
            }
            if let Some(paid) = patch.paid {
                fields.push("paid = ").push_bind_unseparated(paid);
            }
            if let Some(status) = status {
                fields.push("status = ").push_bind_unseparated(status.as_str());
            }
            if let Some(payment_method) = patch.payment_method {
                fields
                    .push("payment_method = ")
                    .push_bind_unseparated(payment_method.map(String::from));
            }
            if let Some(invoice_number) = patch.invoice_number {
                fields.push("invoice_number = ").push_bind_unseparated(invoice_number);
            }
            if let Some(notes) = patch.notes {
                fields.push("notes = ").push_bind_unseparated(notes);
            }
            if let Some(payment_date) = patch.payment_date {
                fields.push("payment_date = ").push_bind_unseparated(payment_date);
            }
        }
        builder.push(" WHERE id = ").push_bind(id);

        let result = builder.build().execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn delete_record(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM financial_records WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}
