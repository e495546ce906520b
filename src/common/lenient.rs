// src/common/lenient.rs
//
// Desserializadores tolerantes para os campos que chegam "sujos" do banco
// hospedado (valor como texto, data em formatos variados, `paid` nulo).
// Nenhum deles falha: o que não é reconhecido vira `None`/`false`/`Invalid`.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::{common::currency::parse_brl_amount, models::ledger::DueDate};

pub fn amount<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(decimal_from_value))
}

pub fn due_date<'de, D>(deserializer: D) -> Result<Option<DueDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(raw)) if raw.trim().is_empty() => None,
        Some(Value::String(raw)) => Some(DueDate::parse(&raw)),
        Some(other) => Some(DueDate::Invalid(other.to_string())),
    })
}

pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(flag)) => flag,
        Some(Value::String(text)) => matches!(text.trim().to_lowercase().as_str(), "true" | "1" | "pago"),
        Some(Value::Number(number)) => number.as_i64() == Some(1),
        _ => false,
    })
}

/// Aceita texto ou número (o formulário do navegador manda os dois).
pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(text)) => text,
        Some(Value::Number(number)) => number.to_string(),
        _ => String::new(),
    })
}

fn decimal_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(number) => {
            let text = number.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .ok()
        }
        Value::String(text) => parse_brl_amount(text),
        _ => None,
    }
}
