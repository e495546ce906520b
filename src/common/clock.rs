// src/common/clock.rs

use anyhow::{anyhow, Context};
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc};

// Relógio "de parede" da confeitaria. Só os handlers leem o relógio;
// o motor de classificação sempre recebe `today` como parâmetro.
#[derive(Debug, Clone, Copy)]
pub struct LocalClock {
    offset: FixedOffset,
}

impl LocalClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    /// Data civil de hoje no fuso configurado (meia-noite local).
    pub fn today(&self) -> NaiveDate {
        self.now().with_timezone(&self.offset).date_naive()
    }

    /// Primeiro dia do mês corrente (início padrão do relatório).
    pub fn first_day_of_month(&self) -> NaiveDate {
        let today = self.today();
        today.with_day(1).unwrap_or(today)
    }
}

/// Lê um deslocamento no formato `-03:00`, `+0530` ou `Z`.
pub fn parse_utc_offset(raw: &str) -> anyhow::Result<FixedOffset> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0).ok_or_else(|| anyhow!("offset UTC inválido"));
    }

    let (sign, rest) = match raw.chars().next() {
        Some('+') => (1, &raw[1..]),
        Some('-') => (-1, &raw[1..]),
        _ => return Err(anyhow!("Offset '{}' deve começar com '+' ou '-'", raw)),
    };

    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(anyhow!("Offset '{}' deve conter apenas dígitos", raw));
    }
    let (hours, minutes) = match digits.len() {
        2 => (&digits[..2], "0"),
        4 => (&digits[..2], &digits[2..]),
        _ => return Err(anyhow!("Offset '{}' fora do formato ±HH:MM", raw)),
    };

    let hours: i32 = hours.parse().with_context(|| format!("Horas inválidas em '{}'", raw))?;
    let minutes: i32 = minutes.parse().with_context(|| format!("Minutos inválidos em '{}'", raw))?;

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
        .ok_or_else(|| anyhow!("Offset '{}' fora do intervalo permitido", raw))
}
