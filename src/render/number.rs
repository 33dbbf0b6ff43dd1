//! Textual forms for aggregated values.
//!
//! - grouped: `+1,234.50` / `-7.00` / `0.00` (gain-style)
//! - plain:   `4.6` (rating-style)
//!
//! Both round on the exact binary value, half to even, which is what Rust's
//! `{:.N}` formatting does.

/// Thousands-grouped, two decimals, `+` for positive and `-` for negative.
///
/// The sign follows the unrounded value, so `0.001` renders as `+0.00` and
/// only an exact zero renders without a sign.
pub fn format_grouped(value: f64) -> String {
    let sign = if value > 0.0 {
        "+"
    } else if value < 0.0 {
        "-"
    } else {
        ""
    };

    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    format!("{}{}.{}", sign, group_thousands(int_part), frac_part)
}

/// One decimal, no grouping, no explicit `+`.
pub fn format_plain(value: f64) -> String {
    let out = format!("{:.1}", value);
    // -0.04 and -0.0 both print as "-0.0"; there is nothing negative left.
    if out == "-0.0" { "0.0".to_string() } else { out }
}

fn group_thousands(digits: &str) -> String {
    // Non-digit renderings (inf, NaN) pass through as-is.
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return digits.to_string();
    }

    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
