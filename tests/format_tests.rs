use chrono::NaiveDate;
use contrato_server::document::common::{
    contract_filename, format_currency, format_currency_input, format_date, parse_currency,
    DateValue,
};
use rust_decimal::Decimal;
use std::str::FromStr;

fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap()
}

#[test]
fn test_currency_uses_brazilian_separators() {
    assert_eq!(format_currency(dec("1234.5")), "R$ 1.234,50");
    assert_eq!(format_currency(dec("0")), "R$ 0,00");
    assert_eq!(format_currency(dec("999")), "R$ 999,00");
    assert_eq!(format_currency(dec("1000000")), "R$ 1.000.000,00");
}

#[test]
fn test_currency_shape_holds_for_many_amounts() {
    for raw in ["0.004", "0.005", "7", "12.3", "1234.5", "98765.432", "123456789.99"] {
        let formatted = format_currency(dec(raw));
        let digits = formatted.strip_prefix("R$ ").expect("currency prefix");

        let (integer, cents) = digits.split_once(',').expect("decimal comma");
        assert_eq!(digits.matches(',').count(), 1, "{formatted}");
        assert_eq!(cents.len(), 2, "{formatted}");
        assert!(cents.chars().all(|c| c.is_ascii_digit()));

        let groups: Vec<&str> = integer.split('.').collect();
        assert!(!groups[0].is_empty() && groups[0].len() <= 3, "{formatted}");
        assert!(groups[1..].iter().all(|g| g.len() == 3), "{formatted}");
    }
}

#[test]
fn test_currency_rounds_half_away_from_zero() {
    assert_eq!(format_currency(dec("0.005")), "R$ 0,01");
    assert_eq!(format_currency(dec("2.675")), "R$ 2,68");
}

#[test]
fn test_user_typed_currency_is_normalised() {
    assert_eq!(parse_currency("R$ 1.234,50"), Some(dec("1234.50")));
    assert_eq!(parse_currency("1.500"), Some(dec("1500")));
    assert_eq!(parse_currency("1500.75"), Some(dec("1500.75")));
    assert_eq!(parse_currency("mil reais"), None);
    assert_eq!(format_currency_input("1234,5"), "R$ 1.234,50");
}

#[test]
fn test_dates_in_portuguese() {
    let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    assert_eq!(format_date(Some(date.into()), true), "1 de janeiro de 2025");
    assert_eq!(format_date(Some(date.into()), false), "janeiro de 2025");
    assert_eq!(
        format_date(Some(DateValue::from("15/03/2025")), true),
        "15 de março de 2025"
    );
}

#[test]
fn test_missing_or_unparsable_dates() {
    assert_eq!(format_date(None, true), "N/A");
    assert_eq!(format_date(Some("".into()), false), "N/A");
    assert_eq!(format_date(Some("em breve".into()), true), "em breve");
}

#[test]
fn test_download_name_is_filesystem_safe() {
    assert_eq!(
        contract_filename("Condomínio Edifício Azul"),
        "Contrato_Condomínio_Edifício_Azul.pdf"
    );
    assert_eq!(contract_filename("A/B. C"), "Contrato_AB_C.pdf");
    assert_eq!(contract_filename("   "), "Contrato_documento.pdf");
}
