//! Rupee display formatting
//!
//! Amounts use Indian digit grouping (`₹12,34,567`) and compact
//! crore / lakh / thousand suffixes.

pub const RUPEE: &str = "₹";

const CRORE: f64 = 10_000_000.0;
const LAKH: f64 = 100_000.0;
const THOUSAND: f64 = 1_000.0;

/// Enough fraction digits to print any finite f64 exactly
const EXACT_DIGITS: usize = 1100;

/// Full rupee amount, no fraction digits, rounded half away from zero
///
/// Negative values (including negative zero) carry a leading `-`;
/// non-finite values render as `₹NaN` / `₹∞`.
pub fn format_currency(amount: f64) -> String {
    if amount.is_nan() {
        return format!("{RUPEE}NaN");
    }
    let sign = if amount.is_sign_negative() { "-" } else { "" };
    if amount.is_infinite() {
        return format!("{sign}{RUPEE}∞");
    }

    let digits = format!("{:.0}", amount.abs().round());
    format!("{sign}{RUPEE}{}", group_indian(&digits))
}

/// Compact amount scaled into crore, lakh or thousand
///
/// Bands are inclusive at their lower bound and checked largest first;
/// anything below 1000 (negatives included) falls back to [`format_currency`].
pub fn format_compact_currency(amount: f64) -> String {
    if amount >= CRORE {
        format!("{RUPEE}{}Cr", to_fixed(amount / CRORE, 1))
    } else if amount >= LAKH {
        format!("{RUPEE}{}L", to_fixed(amount / LAKH, 1))
    } else if amount >= THOUSAND {
        format!("{RUPEE}{}K", to_fixed(amount / THOUSAND, 1))
    } else {
        format_currency(amount)
    }
}

/// Signed percentage with one decimal, e.g. `0.1` -> `+10.0%`
pub fn format_percent(fraction: f64) -> String {
    let pct = fraction * 100.0;
    let sign = if pct > 0.0 { "+" } else { "" };
    format!("{sign}{}%", to_fixed(pct, 1))
}

/// Fixed-point rendering that rounds ties upward on the exact binary value
///
/// Matches the browser's `Number.prototype.toFixed`, which differs from
/// `format!("{:.1}")` on exact ties (`1.25` -> `1.3`, not `1.2`).
pub fn to_fixed(value: f64, digits: usize) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let sign = if value < 0.0 { "-" } else { "" };
    let exact = format!("{:.*}", EXACT_DIGITS, value.abs());
    let (int_part, frac_part) = exact.split_once('.').unwrap_or((exact.as_str(), ""));

    let mut kept: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().take(digits))
        .collect();
    let round_up = frac_part.as_bytes().get(digits).is_some_and(|&d| d >= b'5');

    let mut int_len = int_part.len();
    if round_up {
        let mut carry = true;
        for d in kept.iter_mut().rev() {
            if *d == b'9' {
                *d = b'0';
            } else {
                *d += 1;
                carry = false;
                break;
            }
        }
        if carry {
            kept.insert(0, b'1');
            int_len += 1;
        }
    }

    let (int_digits, frac_digits) = kept.split_at(int_len);
    let int_str = std::str::from_utf8(int_digits).unwrap_or("0");
    if digits == 0 {
        format!("{sign}{int_str}")
    } else {
        let frac_str = std::str::from_utf8(frac_digits).unwrap_or("");
        format!("{sign}{int_str}.{frac_str}")
    }
}

/// Group a plain digit string the Indian way: last three, then pairs
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);

    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 2 {
        groups.push(&head[end - 2..end]);
        end -= 2;
    }
    groups.push(&head[..end]);
    groups.reverse();

    format!("{},{}", groups.join(","), tail)
}
