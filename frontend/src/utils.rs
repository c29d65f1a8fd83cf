use std::cell::RefCell;

use gloo_timers::callback::Timeout;
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Brazilian phone mask applied while the user types.
///
/// Partial input is masked as far as it goes: `(11`, `(11) 9876`,
/// `(11) 9876-5`. Ten digits give a landline `(DD) DDDD-DDDD`, eleven a
/// mobile `(DD) DDDDD-DDDD`. Anything longer is left as bare digits so the
/// validator can reject it.
pub fn format_phone(raw: &str) -> String {
    let digits = digits_only(raw);
    let len = digits.len();
    match len {
        0 => String::new(),
        1..=2 => format!("({}", digits),
        3..=6 => format!("({}) {}", &digits[..2], &digits[2..]),
        7..=10 => format!("({}) {}-{}", &digits[..2], &digits[2..6], &digits[6..]),
        11 => format!("({}) {}-{}", &digits[..2], &digits[2..7], &digits[7..]),
        _ => digits,
    }
}

/// Reads a masked currency input as cents: every digit counts and the last
/// two are the fractional part. Saturates instead of overflowing.
pub fn parse_cents(raw: &str) -> i64 {
    raw.chars()
        .filter_map(|c| c.to_digit(10))
        .fold(0i64, |acc, d| acc.saturating_mul(10).saturating_add(d as i64))
}

pub fn parse_currency_input(raw: &str) -> f64 {
    parse_cents(raw) as f64 / 100.0
}

pub fn format_brl(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    format_cents((value * 100.0).round() as i64)
}

pub fn format_currency_brl(raw: &str) -> String {
    format_cents(parse_cents(raw))
}

fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let integer = (abs / 100).to_string();
    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, ch) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    format!("{}R$ {},{:02}", sign, grouped, abs % 100)
}

/// Thousands-separated integer, pt-BR style (`12.000`).
pub fn format_count(value: u32) -> String {
    let text = value.to_string();
    let mut out = String::new();
    for (i, ch) in text.chars().enumerate() {
        if i > 0 && (text.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

pub fn format_duration(seconds: u32) -> String {
    format!("{}m {}s", seconds / 60, seconds % 60)
}

/// Trailing-edge debounce: each call replaces the pending one.
#[derive(Default)]
pub struct Debouncer {
    wait_ms: u32,
    pending: RefCell<Option<Timeout>>,
}

impl Debouncer {
    pub fn new(wait_ms: u32) -> Self {
        Self {
            wait_ms,
            pending: RefCell::new(None),
        }
    }

    pub fn call<F: FnOnce() + 'static>(&self, f: F) {
        // Dropping the previous Timeout clears it.
        let timeout = Timeout::new(self.wait_ms, f);
        self.pending.borrow_mut().replace(timeout);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_pattern_accepts_common_addresses() {
        assert!(is_valid_email("ana@escola.com.br"));
        assert!(is_valid_email("a.b+c@d.io"));
    }

    #[test]
    fn email_pattern_rejects_malformed_addresses() {
        for bad in ["ana", "ana@", "ana@escola", "@escola.com", "ana @escola.com", "ana@@escola.com", "ana@escola."] {
            assert!(!is_valid_email(bad), "{bad} should be rejected");
        }
    }

    #[test]
    fn phone_mask_matches_landline_and_mobile() {
        assert_eq!(format_phone("11987654321"), "(11) 98765-4321");
        assert_eq!(format_phone("1133334444"), "(11) 3333-4444");
        assert_eq!(format_phone("(11) 98765-4321"), "(11) 98765-4321");
    }

    #[test]
    fn phone_mask_is_incremental() {
        assert_eq!(format_phone(""), "");
        assert_eq!(format_phone("1"), "(1");
        assert_eq!(format_phone("11"), "(11");
        assert_eq!(format_phone("119"), "(11) 9");
        assert_eq!(format_phone("119876"), "(11) 9876");
        assert_eq!(format_phone("1198765"), "(11) 9876-5");
        assert_eq!(format_phone("119876543210"), "119876543210");
    }

    #[test]
    fn currency_input_treats_last_two_digits_as_cents() {
        assert_eq!(parse_currency_input("1234567"), 12345.67);
        assert_eq!(parse_currency_input("R$ 12.345,67"), 12345.67);
        assert_eq!(parse_currency_input(""), 0.0);
        assert_eq!(format_currency_brl("1234567"), "R$ 12.345,67");
    }

    #[test]
    fn currency_display_round_trips() {
        let display = format_brl(parse_currency_input("1234567"));
        assert_eq!(display, "R$ 12.345,67");
        assert_eq!(format_brl(parse_currency_input(&display)), display);
        assert_eq!(format_brl(0.0), "R$ 0,00");
        assert_eq!(format_brl(-1000.0), "-R$ 1.000,00");
        assert_eq!(format_brl(1_000_000.5), "R$ 1.000.000,50");
    }

    #[test]
    fn counts_and_durations() {
        assert_eq!(format_count(12000), "12.000");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_duration(125), "2m 5s");
    }
}
