// src/services/classification.rs
//
// Motor de classificação do livro-caixa: funções puras e totais.
// Nada aqui lê o relógio, faz I/O ou retorna erro; dado malformado
// vira zero ou uma variante própria.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::{
    common::currency::format_brl,
    models::{
        dashboard::{DueStatus, Forecast, ReportRow, Totals},
        ledger::{DueDate, FinancialRecord},
    },
};

pub const MILLIS_PER_DAY: i64 = 86_400_000;

// Regras da previsão (as mesmas da planilha de inteligência)
const GROWTH_FACTOR: Decimal = dec!(1.1);
const RESTOCK_THRESHOLD: Decimal = dec!(1000);
const DAYS_PER_MONTH: Decimal = dec!(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueBucket {
    NoDueDate,
    InvalidDate,
    Overdue,
    DueToday,
    DueInDays(i64),
}

impl DueBucket {
    pub fn key(&self) -> &'static str {
        match self {
            DueBucket::NoDueDate => "noDueDate",
            DueBucket::InvalidDate => "invalidDate",
            DueBucket::Overdue => "overdue",
            DueBucket::DueToday => "dueToday",
            DueBucket::DueInDays(_) => "dueInDays",
        }
    }

    pub fn label(&self) -> String {
        match self {
            DueBucket::NoDueDate => "Sem vencimento".to_string(),
            DueBucket::InvalidDate => "Data inválida".to_string(),
            DueBucket::Overdue => "Vencida".to_string(),
            DueBucket::DueToday => "Hoje".to_string(),
            DueBucket::DueInDays(1) => "Em 1 dia".to_string(),
            DueBucket::DueInDays(days) => format!("Em {} dias", days),
        }
    }

    pub fn style(&self) -> &'static str {
        match self {
            DueBucket::NoDueDate => "unscheduled",
            DueBucket::InvalidDate => "invalid",
            DueBucket::Overdue => "overdue",
            DueBucket::DueToday => "due-today",
            DueBucket::DueInDays(_) => "upcoming",
        }
    }

    pub fn days_until(&self) -> Option<i64> {
        match self {
            DueBucket::DueToday => Some(0),
            DueBucket::DueInDays(days) => Some(*days),
            _ => None,
        }
    }
}

impl From<DueBucket> for DueStatus {
    fn from(bucket: DueBucket) -> Self {
        DueStatus {
            bucket: bucket.key().to_string(),
            days_until: bucket.days_until(),
            label: bucket.label(),
            style: bucket.style().to_string(),
        }
    }
}

/// Classifica um vencimento em relação a `today` (sempre informado por quem chama).
///
/// A diferença é `ceil((vencimento - hoje) / 86_400_000 ms)`, com as duas
/// datas à meia-noite.
pub fn classify_due_date(due_date: Option<&DueDate>, today: NaiveDate) -> DueBucket {
    let due = match due_date {
        None => return DueBucket::NoDueDate,
        Some(DueDate::Invalid(_)) => return DueBucket::InvalidDate,
        Some(DueDate::Valid(date)) => *date,
    };

    let diff_ms = due
        .and_time(NaiveTime::MIN)
        .signed_duration_since(today.and_time(NaiveTime::MIN))
        .num_milliseconds();

    match ceil_days(diff_ms) {
        days if days < 0 => DueBucket::Overdue,
        0 => DueBucket::DueToday,
        days => DueBucket::DueInDays(days),
    }
}

// Divisão inteira trunca em direção a zero: para negativos isso já é o teto.
fn ceil_days(diff_ms: i64) -> i64 {
    let days = diff_ms / MILLIS_PER_DAY;
    if diff_ms % MILLIS_PER_DAY > 0 { days + 1 } else { days }
}

impl Totals {
    /// Contribuição de um único lançamento.
    pub fn of(record: &FinancialRecord) -> Self {
        let amount = record.amount_or_zero();
        let mut totals = Totals::default();

        if amount > Decimal::ZERO {
            totals.income = amount;
        } else if amount < Decimal::ZERO {
            totals.expense = amount.abs();
            if !record.paid {
                totals.payable = amount.abs();
            }
        }
        totals.profit = totals.income - totals.expense;
        totals
    }

    /// Soma de dois agregados parciais (associativa e comutativa).
    ///
    /// As somas saturam em `Decimal::MAX` em vez de estourar; o lucro é
    /// sempre recalculado como entradas - saídas.
    pub fn merge(self, other: Self) -> Self {
        let income = self.income.saturating_add(other.income);
        let expense = self.expense.saturating_add(other.expense);
        Totals {
            income,
            expense,
            profit: income.saturating_sub(expense),
            payable: self.payable.saturating_add(other.payable),
        }
    }
}

pub fn aggregate<'a, I>(records: I) -> Totals
where
    I: IntoIterator<Item = &'a FinancialRecord>,
{
    records
        .into_iter()
        .map(Totals::of)
        .fold(Totals::default(), Totals::merge)
}

/// Despesas não quitadas por vencimento crescente.
///
/// Datas válidas primeiro, depois datas ilegíveis, por último sem vencimento
/// (conta sem data não é urgente). A ordenação é estável.
pub fn filter_payables<'a, I>(records: I) -> Vec<FinancialRecord>
where
    I: IntoIterator<Item = &'a FinancialRecord>,
{
    let mut payables: Vec<FinancialRecord> = records
        .into_iter()
        .filter(|record| record.is_payable())
        .cloned()
        .collect();

    payables.sort_by_key(|record| match &record.due_date {
        Some(DueDate::Valid(date)) => (0, Some(*date)),
        Some(DueDate::Invalid(_)) => (1, None),
        None => (2, None),
    });
    payables
}

/// Projeção de faturamento. `None` quando não há lançamentos.
pub fn forecast<'a, I>(records: I) -> Option<Forecast>
where
    I: IntoIterator<Item = &'a FinancialRecord>,
{
    let mut iter = records.into_iter().peekable();
    iter.peek()?;

    let totals = aggregate(iter);
    let projected_revenue = totals.income.saturating_mul(GROWTH_FACTOR).round_dp(2);
    let daily_average = totals.income / DAYS_PER_MONTH;
    let daily_average_income = daily_average.round_dp(2);
    let monthly_projection = daily_average.saturating_mul(DAYS_PER_MONTH).round_dp(2);

    let operational_risk = if totals.income > totals.expense { "Baixo" } else { "Alto" };
    let health = if monthly_projection > Decimal::ZERO { "Estável" } else { "Alerta" };
    let tip = if totals.income > RESTOCK_THRESHOLD {
        "Aumentar estoque de insumos"
    } else {
        "Focar em vendas"
    };

    Some(Forecast {
        projected_revenue,
        formatted_projected_revenue: format_brl(projected_revenue),
        daily_average_income,
        monthly_projection,
        operational_risk: operational_risk.to_string(),
        health: health.to_string(),
        tip: tip.to_string(),
    })
}

/// Data de referência do relatório: vencimento, ou a data de criação.
pub fn reference_date(record: &FinancialRecord) -> NaiveDate {
    record
        .due_date
        .as_ref()
        .and_then(DueDate::date)
        .unwrap_or_else(|| record.created_at.date_naive())
}

/// Linhas do relatório para o período `[start, end]` (inclusive).
pub fn report_rows<'a, I>(records: I, start: NaiveDate, end: NaiveDate) -> Vec<ReportRow>
where
    I: IntoIterator<Item = &'a FinancialRecord>,
{
    records
        .into_iter()
        .filter(|record| {
            let date = reference_date(record);
            date >= start && date <= end
        })
        .map(|record| ReportRow {
            date: reference_date(record).format("%d/%m/%Y").to_string(),
            description: record.description.clone(),
            sector: record.sector.clone(),
            amount: format_brl(record.amount_or_zero().abs()),
            status: if record.paid { "PAGO" } else { "PENDENTE" }.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use uuid::Uuid;

    use crate::models::ledger::RecordStatus;

    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 20).unwrap()
    }

    fn record(amount: Option<Decimal>, paid: bool, due: Option<NaiveDate>) -> FinancialRecord {
        FinancialRecord {
            id: Uuid::new_v4(),
            description: "lançamento".into(),
            sector: "Fixos".into(),
            amount,
            due_date: due.map(DueDate::Valid),
            created_at: Utc.with_ymd_and_hms(2026, 2, 10, 15, 0, 0).unwrap(),
            paid,
            status: RecordStatus::from_paid(paid).as_str().into(),
            payment_method: None,
            invoice_number: None,
            notes: None,
            payment_date: None,
        }
    }

    #[test]
    fn missing_due_date_has_its_own_bucket() {
        assert_eq!(classify_due_date(None, today()), DueBucket::NoDueDate);
    }

    #[test]
    fn invalid_due_date_has_its_own_bucket() {
        let invalid = DueDate::Invalid("31/02".into());
        assert_eq!(classify_due_date(Some(&invalid), today()), DueBucket::InvalidDate);
    }

    #[test]
    fn same_day_is_due_today() {
        let due = DueDate::Valid(today());
        assert_eq!(classify_due_date(Some(&due), today()), DueBucket::DueToday);
    }

    #[test]
    fn past_day_is_overdue() {
        let due = DueDate::Valid(today() - Duration::days(1));
        let bucket = classify_due_date(Some(&due), today());
        assert_eq!(bucket, DueBucket::Overdue);
        assert_eq!(bucket.label(), "Vencida");
        assert_eq!(bucket.days_until(), None);
    }

    #[test]
    fn future_day_counts_whole_days() {
        let due = DueDate::Valid(today() + Duration::days(5));
        let bucket = classify_due_date(Some(&due), today());
        assert_eq!(bucket, DueBucket::DueInDays(5));
        assert_eq!(bucket.label(), "Em 5 dias");

        let tomorrow = DueDate::Valid(today() + Duration::days(1));
        assert_eq!(classify_due_date(Some(&tomorrow), today()).label(), "Em 1 dia");
    }

    #[test]
    fn day_difference_rounds_up() {
        assert_eq!(ceil_days(0), 0);
        assert_eq!(ceil_days(1), 1);
        assert_eq!(ceil_days(MILLIS_PER_DAY), 1);
        assert_eq!(ceil_days(MILLIS_PER_DAY + 3_600_000), 2);
        assert_eq!(ceil_days(-1), 0);
        assert_eq!(ceil_days(-MILLIS_PER_DAY), -1);
        assert_eq!(ceil_days(-MILLIS_PER_DAY - 1), -1);
    }

    #[test]
    fn aggregate_of_nothing_is_zero() {
        let totals = aggregate(&Vec::new());
        assert_eq!(totals, Totals::default());
        assert_eq!(totals.income, Decimal::ZERO);
        assert_eq!(totals.payable, Decimal::ZERO);
    }

    #[test]
    fn zero_and_missing_amounts_contribute_nothing() {
        let records = vec![record(Some(dec!(0)), false, None), record(None, false, None)];
        assert_eq!(aggregate(&records), Totals::default());
    }

    #[test]
    fn paid_expenses_never_count_as_payable() {
        let records = vec![
            record(Some(dec!(-40)), true, None),
            record(Some(dec!(25)), true, None),
        ];
        let totals = aggregate(&records);
        assert_eq!(totals.expense, dec!(40));
        assert_eq!(totals.payable, Decimal::ZERO);
    }

    #[test]
    fn profit_is_exact_difference() {
        let records = vec![
            record(Some(dec!(0.1)), true, None),
            record(Some(dec!(0.2)), true, None),
            record(Some(dec!(-0.3)), false, None),
            record(Some(dec!(1234.567)), true, None),
        ];
        let totals = aggregate(&records);
        assert_eq!(totals.income - totals.expense, totals.profit);
        assert_eq!(totals.profit, dec!(1234.567));
    }

    #[test]
    fn aggregation_order_does_not_matter() {
        let records = vec![
            record(Some(dec!(100)), true, None),
            record(Some(dec!(-50)), false, None),
            record(Some(dec!(-30)), true, None),
        ];
        let forward = aggregate(&records);
        let backward = aggregate(records.iter().rev());
        let split = aggregate(&records[..1]).merge(aggregate(&records[1..]));
        assert_eq!(forward, backward);
        assert_eq!(forward, split);
    }

    #[test]
    fn example_scenario() {
        let records = vec![
            record(Some(dec!(100)), true, None),
            record(Some(dec!(-50)), false, Some(today())),
            record(Some(dec!(-30)), false, Some(today() - Duration::days(2))),
        ];

        let totals = aggregate(&records);
        assert_eq!(totals.income, dec!(100));
        assert_eq!(totals.expense, dec!(80));
        assert_eq!(totals.profit, dec!(20));
        assert_eq!(totals.payable, dec!(80));

        let payables = filter_payables(&records);
        assert_eq!(payables.len(), 2);
        assert_eq!(payables[0].amount, Some(dec!(-30)));
        assert_eq!(payables[1].amount, Some(dec!(-50)));

        let buckets: Vec<_> = payables
            .iter()
            .map(|p| classify_due_date(p.due_date.as_ref(), today()))
            .collect();
        assert_eq!(buckets, vec![DueBucket::Overdue, DueBucket::DueToday]);
    }

    #[test]
    fn payables_exclude_paid_and_non_negative_and_sort_undated_last() {
        let mut invalid = record(Some(dec!(-5)), false, None);
        invalid.due_date = Some(DueDate::Invalid("??".into()));
        let records = vec![
            record(Some(dec!(-10)), false, None),
            record(Some(dec!(-20)), true, Some(today())),
            record(Some(dec!(15)), false, Some(today())),
            invalid,
            record(Some(dec!(-7)), false, Some(today() + Duration::days(3))),
            record(Some(dec!(-9)), false, Some(today() - Duration::days(3))),
        ];

        let payables = filter_payables(&records);
        let amounts: Vec<_> = payables.iter().map(|p| p.amount).collect();
        assert_eq!(
            amounts,
            vec![Some(dec!(-9)), Some(dec!(-7)), Some(dec!(-5)), Some(dec!(-10))]
        );
        assert!(payables.iter().all(|p| !p.paid && p.amount_or_zero() < Decimal::ZERO));
    }

    #[test]
    fn huge_amounts_saturate_instead_of_overflowing() {
        let records = [
            record(Some(Decimal::MAX), true, None),
            record(Some(Decimal::MAX), true, None),
            record(Some(Decimal::MIN), false, None),
            record(Some(Decimal::MIN), false, None),
        ];

        let totals = aggregate(&records);
        assert_eq!(totals.income, Decimal::MAX);
        assert_eq!(totals.expense, Decimal::MAX);
        assert_eq!(totals.payable, Decimal::MAX);
        assert_eq!(totals.profit, Decimal::ZERO);
    }

    #[test]
    fn forecast_of_huge_income_does_not_overflow() {
        let forecast = forecast(&[record(Some(Decimal::MAX), true, None)]).unwrap();
        assert_eq!(forecast.projected_revenue, Decimal::MAX.round_dp(2));
        assert_eq!(forecast.operational_risk, "Baixo");
        assert_eq!(forecast.health, "Estável");
    }

    #[test]
    fn forecast_needs_data() {
        assert_eq!(forecast(&Vec::new()), None);
    }

    #[test]
    fn forecast_projects_growth_and_flags_risk() {
        let healthy = vec![record(Some(dec!(1500)), true, None), record(Some(dec!(-200)), false, None)];
        let projection = forecast(&healthy).unwrap();
        assert_eq!(projection.projected_revenue, dec!(1650.00));
        assert_eq!(projection.daily_average_income, dec!(50.00));
        assert_eq!(projection.operational_risk, "Baixo");
        assert_eq!(projection.health, "Estável");
        assert_eq!(projection.tip, "Aumentar estoque de insumos");

        let risky = vec![record(Some(dec!(-300)), false, None)];
        let projection = forecast(&risky).unwrap();
        assert_eq!(projection.projected_revenue, Decimal::ZERO);
        assert_eq!(projection.operational_risk, "Alto");
        assert_eq!(projection.health, "Alerta");
        assert_eq!(projection.tip, "Focar em vendas");
    }

    #[test]
    fn report_uses_due_date_or_creation_date() {
        let start = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 2, 15).unwrap();
        let records = vec![
            // sem vencimento: usa created_at (10/02)
            record(Some(dec!(10)), true, None),
            record(Some(dec!(-485)), false, NaiveDate::from_ymd_opt(2026, 2, 14)),
            record(Some(dec!(-320.5)), false, NaiveDate::from_ymd_opt(2026, 2, 27)),
        ];

        let rows = report_rows(&records, start, end);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, "10/02/2026");
        assert_eq!(rows[0].status, "PAGO");
        assert_eq!(rows[1].date, "14/02/2026");
        assert_eq!(rows[1].amount, "R$ 485,00");
        assert_eq!(rows[1].status, "PENDENTE");
    }
}
