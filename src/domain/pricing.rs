//! Weight-based line pricing
//!
//! Catalog prices are quoted per kilogram and shoppers pick a package size
//! from the product's weight options. Weight tokens are free text, so the
//! parser is lenient and never fails: anything it cannot read is priced at
//! the flat base price.

use rust_decimal::Decimal;
use std::str::FromStr;

/// Price of one package of `weight` at `base_per_kg`.
///
/// `"2kg"` scales by 2, `"500g"` by 0.5. A token without a readable leading
/// number, or without a `g`/`kg` unit, yields `base_per_kg` unchanged. No
/// rounding is applied.
pub fn price_for_weight(base_per_kg: Decimal, weight: &str) -> Decimal {
    let Some(magnitude) = leading_number(weight) else { return base_per_kg };

    let unit = weight.to_lowercase();
    let kilograms = if unit.contains("kg") {
        Some(magnitude)
    } else if unit.contains('g') {
        magnitude.checked_div(Decimal::ONE_THOUSAND)
    } else {
        None
    };

    kilograms
        .and_then(|kg| base_per_kg.checked_mul(kg))
        .unwrap_or(base_per_kg)
}

/// Longest float literal at the start of `text`, after leading whitespace.
fn leading_number(text: &str) -> Option<Decimal> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while bytes.get(i).is_some_and(u8::is_ascii_digit) { i += 1; }
        i
    };

    let mut pos = 0;
    let negative = match bytes.first() {
        Some(b'-') => { pos = 1; true }
        Some(b'+') => { pos = 1; false }
        _ => false,
    };

    let int_end = digits_from(pos);
    let integer = &s[pos..int_end];
    pos = int_end;

    let mut fraction = "";
    if bytes.get(pos) == Some(&b'.') {
        let frac_end = digits_from(pos + 1);
        fraction = &s[pos + 1..frac_end];
        if !integer.is_empty() || !fraction.is_empty() { pos = frac_end; }
    }
    if integer.is_empty() && fraction.is_empty() { return None; }

    let mut literal = String::with_capacity(pos + 2);
    if negative { literal.push('-'); }
    literal.push_str(if integer.is_empty() { "0" } else { integer });
    if !fraction.is_empty() {
        literal.push('.');
        literal.push_str(fraction);
    }

    if matches!(bytes.get(pos), Some(b'e' | b'E')) {
        let mut exp_pos = pos + 1;
        if matches!(bytes.get(exp_pos), Some(b'+' | b'-')) { exp_pos += 1; }
        let exp_end = digits_from(exp_pos);
        if exp_end > exp_pos {
            literal.push('e');
            literal.push_str(&s[pos + 1..exp_end]);
            return Decimal::from_scientific(&literal).ok();
        }
    }

    Decimal::from_str(&literal).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(value: i64) -> Decimal { Decimal::from(value) }

    #[test]
    fn kilograms_scale_directly() {
        assert_eq!(price_for_weight(d(100), "2kg"), d(200));
        assert_eq!(price_for_weight(d(300), "1kg"), d(300));
        assert_eq!(price_for_weight(d(400), "1.5kg"), d(600));
    }

    #[test]
    fn grams_scale_by_thousandths() {
        assert_eq!(price_for_weight(d(100), "500g"), d(50));
        assert_eq!(price_for_weight(d(400), "500g"), d(200));
        assert_eq!(price_for_weight(d(800), "250g"), d(200));
    }

    #[test]
    fn unit_match_is_case_insensitive() {
        assert_eq!(price_for_weight(d(100), "2KG"), d(200));
        assert_eq!(price_for_weight(d(100), "500G"), d(50));
        assert_eq!(price_for_weight(d(100), " 250 g"), d(25));
    }

    #[test]
    fn unreadable_tokens_fall_back_to_base_price() {
        assert_eq!(price_for_weight(d(100), "abc"), d(100));
        assert_eq!(price_for_weight(d(100), ""), d(100));
        assert_eq!(price_for_weight(d(100), "kg"), d(100));
        assert_eq!(price_for_weight(d(100), ".g"), d(100));
    }

    #[test]
    fn numbers_without_a_mass_unit_fall_back_to_base_price() {
        assert_eq!(price_for_weight(d(100), "12"), d(100));
        assert_eq!(price_for_weight(d(100), "6 pieces"), d(100));
    }

    #[test]
    fn leading_number_follows_float_prefix_rules() {
        assert_eq!(leading_number(".5kg"), Some(Decimal::new(5, 1)));
        assert_eq!(leading_number("1.kg"), Some(d(1)));
        assert_eq!(leading_number("1e3g"), Some(d(1000)));
        assert_eq!(leading_number("2e"), Some(d(2)));
        assert_eq!(leading_number("-3"), Some(d(-3)));
        assert_eq!(leading_number("x1"), None);
    }

    #[test]
    fn no_rounding_is_applied() {
        let base = Decimal::new(999, 2);
        assert_eq!(price_for_weight(base, "333g"), Decimal::new(332667, 5));
    }
}
