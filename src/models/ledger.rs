// src/models/ledger.rs

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use rust_decimal_macros::dec;

use crate::common::{currency::parse_brl_amount, error::AppError, lenient};

// Setor padrão do formulário de lançamento
pub const DEFAULT_SECTOR: &str = "Fixos";

// Setores extraídos da planilha da confeitaria (o conjunto é aberto)
pub const KNOWN_SECTORS: &[&str] = &[
    "Bonificações",
    "Departamento Pessoal",
    "Divulgação/Marketing",
    "Enel",
    "Fixos",
    "Impostos Empresa",
    "Manutenção",
    "Melhorias",
    "Motoboy",
    "Taxas Bancárias",
    "Taxas ifood",
    "Variáveis",
];

// --- Enums ---

/// Vencimento de um lançamento.
///
/// Datas que não puderam ser lidas são mantidas como `Invalid` com o texto
/// original, para o motor classificar em vez de falhar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DueDate {
    Valid(NaiveDate),
    Invalid(String),
}

impl DueDate {
    /// Lê datas exportadas pelo banco hospedado ou pela planilha.
    ///
    /// Timestamps com fuso (RFC 3339) valem pela data civil *no fuso em que
    /// foram escritos*, não no fuso configurado do servidor: quem gravou
    /// `2026-02-27T23:30:00-03:00` quis dizer dia 27.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();

        if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            return Self::Valid(date);
        }
        // Formato da planilha antiga (dd/mm/aaaa)
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%d/%m/%Y") {
            return Self::Valid(date);
        }
        if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
            return Self::Valid(timestamp.date_naive());
        }
        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(timestamp) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Self::Valid(timestamp.date());
            }
        }

        Self::Invalid(raw.to_string())
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            DueDate::Valid(date) => Some(*date),
            DueDate::Invalid(_) => None,
        }
    }
}

impl From<NaiveDate> for DueDate {
    fn from(date: NaiveDate) -> Self {
        DueDate::Valid(date)
    }
}

impl fmt::Display for DueDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DueDate::Valid(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            DueDate::Invalid(raw) => f.write_str(raw),
        }
    }
}

impl Serialize for DueDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Espelho textual de `paid`. Sempre derivado na escrita, nunca lido para lógica.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum RecordStatus {
    Pago,
    Pendente,
}

impl RecordStatus {
    pub fn from_paid(paid: bool) -> Self {
        if paid { RecordStatus::Pago } else { RecordStatus::Pendente }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Pago => "Pago",
            RecordStatus::Pendente => "Pendente",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentMethod {
    Pix,
    Dinheiro,
    CartaoCredito,
    Boleto,
    Outro(String),
}

impl PaymentMethod {
    pub fn as_str(&self) -> &str {
        match self {
            PaymentMethod::Pix => "PIX",
            PaymentMethod::Dinheiro => "Dinheiro",
            PaymentMethod::CartaoCredito => "Cartão de Crédito",
            PaymentMethod::Boleto => "Boleto",
            PaymentMethod::Outro(other) => other,
        }
    }
}

impl From<String> for PaymentMethod {
    fn from(raw: String) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "pix" => PaymentMethod::Pix,
            "dinheiro" | "cash" => PaymentMethod::Dinheiro,
            "cartão de crédito" | "cartao de credito" | "cartão" | "card" => PaymentMethod::CartaoCredito,
            "boleto" => PaymentMethod::Boleto,
            _ => PaymentMethod::Outro(raw),
        }
    }
}

impl From<PaymentMethod> for String {
    fn from(method: PaymentMethod) -> Self {
        match method {
            PaymentMethod::Outro(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

/// Direção do lançamento no formulário (entrada = receita, saída = despesa).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Entrada,
    #[serde(alias = "saída")]
    Saida,
}

impl EntryKind {
    /// Aplica o sinal ao valor digitado (sempre tratado como magnitude).
    pub fn signed(&self, magnitude: Decimal) -> Decimal {
        match self {
            EntryKind::Entrada => magnitude.abs(),
            EntryKind::Saida => -magnitude.abs(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EntryKind::Entrada => "Entrada",
            EntryKind::Saida => "Saída",
        }
    }
}

// --- Structs ---

/// Um lançamento da tabela `financial_records`.
///
/// Os nomes dos campos (snake_case) são o contrato com o serviço de dados.
/// `amount` ausente ou malformado vira `None` e conta como zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FinancialRecord {
    pub id: Uuid,

    #[serde(default)]
    #[schema(example = "Compra de farinha e açúcar")]
    pub description: String,

    #[serde(default)]
    #[schema(example = "Variáveis")]
    pub sector: String,

    #[serde(default, deserialize_with = "lenient::amount")]
    #[schema(example = "-320.50")]
    pub amount: Option<Decimal>,

    #[serde(default, deserialize_with = "lenient::due_date")]
    #[schema(value_type = Option<String>, format = Date, example = "2026-02-27")]
    pub due_date: Option<DueDate>,

    pub created_at: DateTime<Utc>,

    #[serde(default, deserialize_with = "lenient::flag")]
    pub paid: bool,

    #[serde(default)]
    #[schema(example = "Pendente")]
    pub status: String,

    #[serde(default)]
    #[schema(value_type = Option<String>, example = "PIX")]
    pub payment_method: Option<PaymentMethod>,

    #[serde(default)]
    #[schema(example = "000.123.456")]
    pub invoice_number: Option<String>,

    #[serde(default)]
    pub notes: Option<String>,

    #[serde(default)]
    pub payment_date: Option<DateTime<Utc>>,
}

impl FinancialRecord {
    pub fn amount_or_zero(&self) -> Decimal {
        self.amount.unwrap_or(Decimal::ZERO)
    }

    pub fn is_income(&self) -> bool {
        self.amount_or_zero() > Decimal::ZERO
    }

    pub fn is_expense(&self) -> bool {
        self.amount_or_zero() < Decimal::ZERO
    }

    /// Despesa ainda não quitada: aparece na tela de contas a pagar.
    pub fn is_payable(&self) -> bool {
        self.is_expense() && !self.paid
    }

    pub fn kind(&self) -> Option<EntryKind> {
        match self.amount_or_zero().cmp(&Decimal::ZERO) {
            Ordering::Greater => Some(EntryKind::Entrada),
            Ordering::Less => Some(EntryKind::Saida),
            Ordering::Equal => None,
        }
    }

    pub fn record_status(&self) -> RecordStatus {
        RecordStatus::from_paid(self.paid)
    }
}

/// Campos de um lançamento novo. `id` e `created_at` são do serviço de dados.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub description: String,
    pub sector: String,
    pub amount: Decimal,
    pub due_date: Option<NaiveDate>,
    pub paid: bool,
    pub payment_method: Option<PaymentMethod>,
    pub invoice_number: Option<String>,
    pub notes: Option<String>,
    pub payment_date: Option<DateTime<Utc>>,
}

impl NewRecord {
    pub fn status(&self) -> RecordStatus {
        RecordStatus::from_paid(self.paid)
    }

    pub fn into_record(self, id: Uuid, created_at: DateTime<Utc>) -> FinancialRecord {
        let status = self.status().as_str().to_string();
        FinancialRecord {
            id,
            description: self.description,
            sector: self.sector,
            amount: Some(self.amount),
            due_date: self.due_date.map(DueDate::Valid),
            created_at,
            paid: self.paid,
            status,
            payment_method: self.payment_method,
            invoice_number: self.invoice_number,
            notes: self.notes,
            payment_date: self.payment_date,
        }
    }
}

/// Atualização parcial. `None` = não mexe; `Some(None)` = limpa a coluna.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPatch {
    pub description: Option<String>,
    pub sector: Option<String>,
    pub amount: Option<Decimal>,
    pub due_date: Option<Option<NaiveDate>>,
    pub paid: Option<bool>,
    pub payment_method: Option<Option<PaymentMethod>>,
    pub invoice_number: Option<Option<String>>,
    pub notes: Option<Option<String>>,
    pub payment_date: Option<Option<DateTime<Utc>>>,
}

impl RecordPatch {
    /// Ação "Pagar": paid=true, status="Pago", payment_date=agora.
    pub fn mark_paid(now: DateTime<Utc>) -> Self {
        Self {
            paid: Some(true),
            payment_date: Some(Some(now)),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// O status textual acompanha `paid` sempre que ele é escrito.
    pub fn status(&self) -> Option<RecordStatus> {
        self.paid.map(RecordStatus::from_paid)
    }

    pub fn apply_to(&self, record: &mut FinancialRecord) {
        if let Some(description) = &self.description {
            record.description = description.clone();
        }
        if let Some(sector) = &self.sector {
            record.sector = sector.clone();
        }
        if let Some(amount) = self.amount {
            record.amount = Some(amount);
        }
        if let Some(due_date) = self.due_date {
            record.due_date = due_date.map(DueDate::Valid);
        }
        if let Some(paid) = self.paid {
            record.paid = paid;
            record.status = RecordStatus::from_paid(paid).as_str().to_string();
        }
        if let Some(payment_method) = &self.payment_method {
            record.payment_method = payment_method.clone();
        }
        if let Some(invoice_number) = &self.invoice_number {
            record.invoice_number = invoice_number.clone();
        }
        if let Some(notes) = &self.notes {
            record.notes = notes.clone();
        }
        if let Some(payment_date) = self.payment_date {
            record.payment_date = payment_date;
        }
    }
}

// --- Consulta ao serviço de dados ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AmountSign {
    Positive,
    Negative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderField {
    CreatedAt,
    DueDate,
    Amount,
}

impl OrderField {
    pub fn column(&self) -> &'static str {
        match self {
            OrderField::CreatedAt => "created_at",
            OrderField::DueDate => "due_date",
            OrderField::Amount => "amount",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordOrder {
    pub field: OrderField,
    pub ascending: bool,
}

/// Filtro + ordenação de uma leitura. Nulos sempre vão para o fim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordQuery {
    pub paid: Option<bool>,
    pub sign: Option<AmountSign>,
    pub order: Option<RecordOrder>,
}

impl RecordQuery {
    /// Tabela inteira, mais recentes primeiro (painel).
    pub fn all() -> Self {
        Self {
            order: Some(RecordOrder { field: OrderField::CreatedAt, ascending: false }),
            ..Self::default()
        }
    }

    /// `paid = false AND amount < 0`, por vencimento crescente (contas a pagar).
    pub fn payables() -> Self {
        Self {
            paid: Some(false),
            sign: Some(AmountSign::Negative),
            order: Some(RecordOrder { field: OrderField::DueDate, ascending: true }),
        }
    }

    pub fn matches(&self, record: &FinancialRecord) -> bool {
        let paid_ok = self.paid.is_none_or(|paid| record.paid == paid);
        let sign_ok = match self.sign {
            None => true,
            Some(AmountSign::Positive) => record.is_income(),
            Some(AmountSign::Negative) => record.is_expense(),
        };
        paid_ok && sign_ok
    }

    /// Ordenação estável equivalente ao `ORDER BY ... NULLS LAST` do banco.
    pub fn sort(&self, records: &mut [FinancialRecord]) {
        let Some(order) = self.order else {
            return;
        };

        records.sort_by(|a, b| match order.field {
            OrderField::CreatedAt => nulls_last(Some(a.created_at), Some(b.created_at), order.ascending),
            OrderField::DueDate => nulls_last(
                a.due_date.as_ref().and_then(DueDate::date),
                b.due_date.as_ref().and_then(DueDate::date),
                order.ascending,
            ),
            OrderField::Amount => nulls_last(a.amount, b.amount, order.ascending),
        });
    }
}

fn nulls_last<T: Ord>(a: Option<T>, b: Option<T>, ascending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if ascending => a.cmp(&b),
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

// --- Formulários ---

fn default_sector() -> String {
    DEFAULT_SECTOR.to_string()
}

// A coluna `amount` é NUMERIC(14,2): |valor| < 10^12, no máximo 2 casas
const AMOUNT_LIMIT: Decimal = dec!(1000000000000);
const AMOUNT_MAX_SCALE: u32 = 2;

fn form_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

fn validate_amount_text(value: &str) -> Result<(), ValidationError> {
    let Some(amount) = parse_brl_amount(value) else {
        return Err(form_error("amount", "O valor informado não é um número válido."));
    };
    if amount.abs() >= AMOUNT_LIMIT {
        return Err(form_error("range", "O valor deve ser menor que R$ 1.000.000.000.000,00."));
    }
    if amount.normalize().scale() > AMOUNT_MAX_SCALE {
        return Err(form_error("scale", "O valor aceita no máximo duas casas decimais."));
    }
    Ok(())
}

// `length(min = 1)` aceitaria "   ", que vira "" depois do trim
fn validate_description(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(form_error("length", "A descrição é obrigatória."));
    }
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

/// Formulário "Novo Lançamento".
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntryForm {
    #[schema(example = "saida")]
    pub kind: EntryKind,

    #[validate(custom(function = "validate_description"))]
    #[schema(example = "Conta de luz - Enel")]
    pub description: String,

    // Magnitude digitada; o sinal vem de `kind`
    #[serde(deserialize_with = "lenient::text")]
    #[validate(
        length(min = 1, message = "O valor é obrigatório."),
        custom(function = "validate_amount_text")
    )]
    #[schema(value_type = String, example = "485,00")]
    pub value: String,

    #[serde(default = "default_sector")]
    #[validate(length(min = 1, message = "O setor é obrigatório."))]
    #[schema(example = "Enel")]
    pub sector: String,

    #[serde(default)]
    #[schema(value_type = Option<String>, example = "Boleto")]
    pub payment_method: Option<PaymentMethod>,

    #[serde(default)]
    #[schema(value_type = Option<String>, format = Date, example = "2026-02-14")]
    pub due_date: Option<NaiveDate>,

    #[serde(default)]
    pub invoice_number: Option<String>,

    #[serde(default)]
    pub notes: Option<String>,
}

impl EntryForm {
    fn amount(&self) -> Result<Decimal, AppError> {
        parse_brl_amount(&self.value)
            .map(|magnitude| self.kind.signed(magnitude))
            .ok_or_else(|| AppError::InvalidInput(format!("Valor inválido: '{}'", self.value)))
    }

    /// Saída nasce pendente; entrada nasce paga.
    pub fn into_new_record(self) -> Result<NewRecord, AppError> {
        self.validate()?;
        let amount = self.amount()?;
        let paid = self.kind == EntryKind::Entrada;

        Ok(NewRecord {
            description: self.description.trim().to_string(),
            sector: self.sector,
            amount,
            due_date: self.due_date,
            paid,
            payment_method: Some(self.payment_method.unwrap_or(PaymentMethod::Pix)),
            invoice_number: non_blank(self.invoice_number),
            notes: non_blank(self.notes),
            payment_date: None,
        })
    }
}

/// Formulário de edição: substitui todos os campos editáveis.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditForm {
    pub kind: EntryKind,

    #[validate(custom(function = "validate_description"))]
    pub description: String,

    #[serde(deserialize_with = "lenient::text")]
    #[validate(
        length(min = 1, message = "O valor é obrigatório."),
        custom(function = "validate_amount_text")
    )]
    #[schema(value_type = String, example = "320,50")]
    pub value: String,

    #[validate(length(min = 1, message = "O setor é obrigatório."))]
    pub sector: String,

    pub paid: bool,

    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub payment_method: Option<PaymentMethod>,

    #[serde(default)]
    #[schema(value_type = Option<String>, format = Date)]
    pub due_date: Option<NaiveDate>,

    #[serde(default)]
    pub invoice_number: Option<String>,

    #[serde(default)]
    pub notes: Option<String>,
}

impl EditForm {
    /// Voltar para "não pago" limpa `payment_date`; marcar como pago pela
    /// edição mantém a data que já existir.
    pub fn into_patch(self) -> Result<RecordPatch, AppError> {
        self.validate()?;
        let magnitude = parse_brl_amount(&self.value)
            .ok_or_else(|| AppError::InvalidInput(format!("Valor inválido: '{}'", self.value)))?;

        Ok(RecordPatch {
            description: Some(self.description.trim().to_string()),
            sector: Some(self.sector),
            amount: Some(self.kind.signed(magnitude)),
            due_date: Some(self.due_date),
            paid: Some(self.paid),
            payment_method: Some(self.payment_method),
            invoice_number: Some(non_blank(self.invoice_number)),
            notes: Some(non_blank(self.notes)),
            payment_date: if self.paid { None } else { Some(None) },
        })
    }
}
