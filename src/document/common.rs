//! Common utilities for document generation.
//!
//! Brazilian currency and date formatting, plus the filename and static
//! asset helpers shared by the generator and the HTTP layer.

use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::style::LOGO_FILE;

const MONTHS: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

const ZERO_CURRENCY: &str = "R$ 0,00";

/// A date as it may reach the formatter: already parsed, or raw user text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateValue {
    Date(NaiveDate),
    Text(String),
}

impl From<NaiveDate> for DateValue {
    fn from(date: NaiveDate) -> Self {
        DateValue::Date(date)
    }
}

impl From<&str> for DateValue {
    fn from(text: &str) -> Self {
        DateValue::Text(text.to_string())
    }
}

impl From<String> for DateValue {
    fn from(text: String) -> Self {
        DateValue::Text(text)
    }
}

/// Format a value as Brazilian currency, e.g. `R$ 1.234,50`.
///
/// Rounds half away from zero to cents. Negative amounts are not valid
/// contract values and format as `R$ 0,00`.
pub fn format_currency(value: Decimal) -> String {
    if value.is_sign_negative() && !value.is_zero() {
        return ZERO_CURRENCY.to_string();
    }

    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    let plain = rounded.abs().to_string();
    let (integer, fraction) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, ch) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("R$ {grouped},{fraction}")
}

/// Format raw currency input (`"R$ 1.234,56"`, `"1234,56"`, `"1234.56"`).
///
/// Unparsable input formats as `R$ 0,00`.
pub fn format_currency_input(input: &str) -> String {
    match parse_currency(input) {
        Some(value) => format_currency(value),
        None => ZERO_CURRENCY.to_string(),
    }
}

/// Parse a Brazilian currency string into an exact decimal.
///
/// With a comma present, dots are thousands separators and the comma is the
/// decimal mark. Without one, a single dot followed by exactly three digits
/// is read as a thousands separator, any other single dot as the decimal
/// mark.
pub fn parse_currency(input: &str) -> Option<Decimal> {
    let cleaned: String = input
        .trim()
        .trim_start_matches("R$")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    let normalized = if cleaned.contains(',') {
        if cleaned.matches(',').count() > 1 {
            return None;
        }
        cleaned.replace('.', "").replace(',', ".")
    } else {
        let dots = cleaned.matches('.').count();
        let thousands_only = match cleaned.rsplit_once('.') {
            Some((_, tail)) => dots > 1 || tail.len() == 3,
            None => false,
        };
        if thousands_only {
            cleaned.replace('.', "")
        } else {
            cleaned
        }
    };

    if !normalized
        .chars()
        .all(|c| c.is_ascii_digit() || c == '.' || c == '-')
    {
        return None;
    }

    Decimal::from_str(&normalized).ok()
}

/// Parse `YYYY-MM-DD` or `DD/MM/YYYY`, ignoring surrounding whitespace.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%d/%m/%Y"))
        .ok()
}

/// Format a date in Portuguese, e.g. `1 de janeiro de 2025`, or
/// `janeiro de 2025` without the day.
///
/// Text in `YYYY-MM-DD` or `DD/MM/YYYY` is parsed first; other text comes
/// back unchanged. A missing or empty value formats as `N/A`.
pub fn format_date(value: Option<DateValue>, include_day: bool) -> String {
    let date = match value {
        None => return "N/A".to_string(),
        Some(DateValue::Date(date)) => date,
        Some(DateValue::Text(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return "N/A".to_string();
            }
            match parse_date(trimmed) {
                Some(date) => date,
                None => return text,
            }
        }
    };

    let month = MONTHS[date.month0() as usize];
    if include_day {
        format!("{} de {} de {}", date.day(), month, date.year())
    } else {
        format!("{} de {}", month, date.year())
    }
}

/// Sanitize a string for use in a download filename.
///
/// Spaces become underscores and `/` and `.` are dropped before the result
/// goes through `sanitize_filename`. An empty result yields `fallback`.
pub fn sanitize_filename(name: &str, fallback: &str) -> String {
    let replaced: String = name
        .trim()
        .chars()
        .filter(|c| *c != '/' && *c != '.')
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();

    let options = ::sanitize_filename::Options {
        truncate: true,
        windows: true,
        replacement: "",
    };
    let cleaned = ::sanitize_filename::sanitize_with_options(replaced, options);

    if cleaned.trim_matches('_').is_empty() {
        fallback.to_string()
    } else {
        cleaned
    }
}

/// Download name for a contract PDF.
pub fn contract_filename(party_name: &str) -> String {
    format!("Contrato_{}.pdf", sanitize_filename(party_name, "documento"))
}

/// Location of the header logo, if it exists under `static_dir`.
pub fn find_logo(static_dir: &Path) -> Option<PathBuf> {
    let path = static_dir.join(LOGO_FILE);
    if path.is_file() {
        Some(path)
    } else {
        log::debug!("no logo found at {}", path.display());
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_format_currency_groups_thousands() {
        assert_eq!(format_currency(Decimal::new(12345, 1)), "R$ 1.234,50");
        assert_eq!(format_currency(Decimal::new(123456789, 2)), "R$ 1.234.567,89");
        assert_eq!(format_currency(Decimal::ZERO), "R$ 0,00");
        assert_eq!(format_currency(Decimal::new(999, 0)), "R$ 999,00");
    }

    #[test]
    fn test_format_currency_rounds_half_away_from_zero() {
        assert_eq!(format_currency(Decimal::new(10005, 3)), "R$ 10,01");
        assert_eq!(format_currency(Decimal::new(10004, 3)), "R$ 10,00");
        assert_eq!(format_currency(Decimal::new(999995, 3)), "R$ 1.000,00");
    }

    #[test]
    fn test_format_currency_negative_is_zero() {
        assert_eq!(format_currency(Decimal::new(-500, 2)), "R$ 0,00");
    }

    #[test]
    fn test_parse_currency_variants() {
        assert_eq!(parse_currency("R$ 1.234,56"), Some(Decimal::new(123456, 2)));
        assert_eq!(parse_currency("1234,56"), Some(Decimal::new(123456, 2)));
        assert_eq!(parse_currency("1234.56"), Some(Decimal::new(123456, 2)));
        assert_eq!(parse_currency("1.234"), Some(Decimal::new(1234, 0)));
        assert_eq!(parse_currency("1.234.567"), Some(Decimal::new(1234567, 0)));
        assert_eq!(parse_currency("abc"), None);
        assert_eq!(parse_currency(""), None);
        assert_eq!(parse_currency("1,2,3"), None);
    }

    #[test]
    fn test_format_currency_input_fallback() {
        assert_eq!(format_currency_input("R$ 2.500,00"), "R$ 2.500,00");
        assert_eq!(format_currency_input("dois mil"), "R$ 0,00");
    }

    #[test]
    fn test_format_date_variants() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert_eq!(format_date(Some(date.into()), true), "1 de janeiro de 2025");
        assert_eq!(format_date(Some(date.into()), false), "janeiro de 2025");
        assert_eq!(format_date(Some("2024-03-15".into()), true), "15 de março de 2024");
        assert_eq!(format_date(Some("25/12/2023".into()), true), "25 de dezembro de 2023");
        assert_eq!(format_date(Some("amanhã".into()), true), "amanhã");
        assert_eq!(format_date(Some("".into()), true), "N/A");
        assert_eq!(format_date(None, true), "N/A");
    }

    #[test]
    fn test_parse_date_accepts_iso_and_brazilian_forms() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 15);
        assert_eq!(parse_date("2025-03-15"), expected);
        assert_eq!(parse_date(" 15/03/2025 "), expected);
        assert_eq!(parse_date("31/02/2025"), None);
        assert_eq!(parse_date("15-03-2025"), None);
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("ACME Ltda.", "documento"), "ACME_Ltda");
        assert_eq!(sanitize_filename("A/B Serviços", "documento"), "AB_Serviços");
        assert_eq!(sanitize_filename("  ", "documento"), "documento");
        assert_eq!(sanitize_filename("...", "documento"), "documento");
    }

    #[test]
    fn test_contract_filename() {
        assert_eq!(contract_filename("Condomínio Azul"), "Contrato_Condomínio_Azul.pdf");
    }
}
