//! Number formatting for the dashboard page

use rust_decimal::Decimal;

/// Format with a fixed number of decimals and `,` thousands separators,
/// e.g. `1234567.5` with 0 decimals gives `1,234,568`
pub fn format_amount(value: Decimal, decimals: u32) -> String {
    let rounded = value.round_dp(decimals);
    let rounded = if rounded.is_zero() { Decimal::ZERO } else { rounded };
    let text = format!("{:.*}", decimals as usize, rounded);

    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (digits, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

/// Percentage with two decimals, e.g. `-3.13 %`
pub fn format_pct(value: Decimal) -> String {
    format!("{} %", format_amount(value, 2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_thousands_separators() {
        assert_eq!(format_amount(dec("1234567.5"), 0), "1,234,568");
        assert_eq!(format_amount(dec("999"), 0), "999");
        assert_eq!(format_amount(dec("1000"), 0), "1,000");
        assert_eq!(format_amount(dec("-45210.4"), 0), "-45,210");
        assert_eq!(format_amount(dec("0"), 0), "0");
    }

    #[test]
    fn test_decimals_are_padded() {
        assert_eq!(format_amount(dec("12"), 2), "12.00");
        assert_eq!(format_amount(dec("1234.5"), 2), "1,234.50");
    }

    #[test]
    fn test_negative_zero_is_plain_zero() {
        assert_eq!(format_amount(dec("-0.4"), 0), "0");
    }

    #[test]
    fn test_pct() {
        assert_eq!(format_pct(dec("-3.125")), "-3.12 %");
        assert_eq!(format_pct(Decimal::ZERO), "0.00 %");
    }
}
