use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

/// Format an amount in the Brazilian convention: R$ 1.234,56
pub fn money(val: Decimal) -> String {
    let negative = val.is_sign_negative() && !val.is_zero();
    let cents = format!(
        "{:.2}",
        val.abs().round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    );
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut grouped = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    let grouped: String = grouped.chars().rev().collect();

    if negative {
        format!("-R$ {grouped},{dec_part}")
    } else {
        format!("R$ {grouped},{dec_part}")
    }
}

pub fn date(d: NaiveDate) -> String {
    d.format("%d/%m/%Y").to_string()
}
