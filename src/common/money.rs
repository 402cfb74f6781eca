// src/common/money.rs

//! Aritmética monetária em ponto fixo.
//!
//! Toda divisão do sistema passa por aqui: arredonda para centavos
//! (meio para cima) e devolve zero quando o denominador não é positivo.

use rust_decimal::{Decimal, RoundingStrategy};

/// Casas decimais de qualquer valor resultante de divisão.
pub const MONEY_SCALE: u32 = 2;

/// Arredonda para centavos, meio para cima (HALF_UP).
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Divisão protegida: `numerator / denominator` arredondado para centavos,
/// ou zero se o denominador for zero ou negativo.
pub fn safe_div(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    // checked_div só falha em overflow; tratamos como divisão impossível
    numerator
        .checked_div(denominator)
        .map(round_money)
        .unwrap_or(Decimal::ZERO)
}

/// Converte um percentual em [0, 100] para fração (10 -> 0.10).
pub fn percent_to_fraction(percent: Decimal) -> Decimal {
    safe_div(percent, Decimal::ONE_HUNDRED)
}

/// Quanto `part` representa de `total`, em percentual com 2 casas.
pub fn percent_of(part: Decimal, total: Decimal) -> Decimal {
    safe_div(part * Decimal::ONE_HUNDRED, total)
}

/// Soma uma sequência de valores.
pub fn sum<I>(values: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    values.into_iter().fold(Decimal::ZERO, |acc, v| acc + v)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn rounds_half_up() {
        assert_eq!(round_money(d("1.005")), d("1.01"));
        assert_eq!(round_money(d("1.004")), d("1.00"));
        assert_eq!(round_money(d("-1.005")), d("-1.01"));
    }

    #[test]
    fn safe_div_guards_zero_and_negative() {
        assert_eq!(safe_div(d("10"), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(safe_div(d("10"), d("-2")), Decimal::ZERO);
        assert_eq!(safe_div(d("10"), d("3")), d("3.33"));
        assert_eq!(safe_div(d("135.00"), d("3")), d("45.00"));
    }

    #[test]
    fn percent_helpers() {
        assert_eq!(percent_to_fraction(d("10")), d("0.10"));
        assert_eq!(percent_to_fraction(d("12.345")), d("0.12"));
        assert_eq!(percent_of(d("45"), d("135")), d("33.33"));
        assert_eq!(percent_of(d("45"), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn sum_of_empty_is_zero() {
        assert_eq!(sum(Vec::new()), Decimal::ZERO);
        assert_eq!(sum(vec![d("1.10"), d("2.20")]), d("3.30"));
    }
}
