// src/common/currency.rs

use std::str::FromStr;

use num_format::{Locale, ToFormattedString};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Formata um valor em reais no padrão pt-BR: `R$ 1.234,56` / `-R$ 1.234,56`.
///
/// Sempre com duas casas decimais (arredondamento "meio para longe do zero",
/// igual ao `toLocaleString` do navegador).
pub fn format_brl(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };

    let magnitude = rounded.abs();
    let integer = magnitude.trunc();
    let cents = ((magnitude - integer) * Decimal::ONE_HUNDRED)
        .trunc()
        .to_u32()
        .unwrap_or(0);

    // Valores fora do u64 ficam sem separador de milhar
    let integer_part = integer
        .to_u64()
        .map(|value| value.to_formatted_string(&Locale::pt))
        .unwrap_or_else(|| integer.to_string());

    format!("{sign}R$ {integer_part},{cents:02}")
}

/// Lê um valor digitado no formulário ("12,50", "1.234,56", "R$ 10", "12.5").
///
/// Quando há vírgula ela é o separador decimal e os pontos são milhares.
/// Retorna `None` para texto que não é número.
pub fn parse_brl_amount(text: &str) -> Option<Decimal> {
    let cleaned: String = text
        .trim()
        .trim_start_matches("R$")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    let normalized = if cleaned.contains(',') {
        cleaned.replace('.', "").replace(',', ".")
    } else {
        cleaned
    };

    Decimal::from_str(&normalized)
        .or_else(|_| Decimal::from_scientific(&normalized))
        .ok()
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn formats_thousands_and_cents() {
        assert_eq!(format_brl(dec!(1234.56)), "R$ 1.234,56");
        assert_eq!(format_brl(dec!(320.5)), "R$ 320,50");
        assert_eq!(format_brl(dec!(0)), "R$ 0,00");
        assert_eq!(format_brl(dec!(1000000)), "R$ 1.000.000,00");
    }

    #[test]
    fn formats_negative_values_with_leading_sign() {
        assert_eq!(format_brl(dec!(-485)), "-R$ 485,00");
        assert_eq!(format_brl(dec!(-0.001)), "R$ 0,00");
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(format_brl(dec!(10.005)), "R$ 10,01");
        assert_eq!(format_brl(dec!(-10.005)), "-R$ 10,01");
    }

    #[test]
    fn parses_form_input() {
        assert_eq!(parse_brl_amount("12,50"), Some(dec!(12.50)));
        assert_eq!(parse_brl_amount("1.234,56"), Some(dec!(1234.56)));
        assert_eq!(parse_brl_amount(" R$ 10 "), Some(dec!(10)));
        assert_eq!(parse_brl_amount("320.5"), Some(dec!(320.5)));
        assert_eq!(parse_brl_amount("-30"), Some(dec!(-30)));
    }

    #[test]
    fn rejects_non_numeric_input() {
        assert_eq!(parse_brl_amount(""), None);
        assert_eq!(parse_brl_amount("abc"), None);
        assert_eq!(parse_brl_amount("R$"), None);
    }
}
