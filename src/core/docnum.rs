//! Document number derivation

use chrono::NaiveDate;

pub const DEFAULT_PREFIX: &str = "PIM";
pub const DEFAULT_REGION_SUFFIX: &str = "KSA001";

/// Build the default document number: `<prefix><yymmdd><suffix>`
pub fn default_document_number(prefix: &str, date: NaiveDate, suffix: &str) -> String {
    format!("{}{}{}", prefix, date.format("%y%m%d"), suffix)
}

/// Use the override when it has visible content, the default otherwise
pub fn resolve_document_number(requested: Option<&str>, default: String) -> String {
    match requested.map(str::trim) {
        Some(number) if !number.is_empty() => number.to_string(),
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_document_number() {
        let date = NaiveDate::from_ymd_opt(2025, 8, 27).unwrap();
        assert_eq!(
            default_document_number(DEFAULT_PREFIX, date, DEFAULT_REGION_SUFFIX),
            "PIM250827KSA001"
        );
    }

    #[test]
    fn test_resolve_document_number() {
        let default = || "PIM250827KSA001".to_string();
        assert_eq!(resolve_document_number(None, default()), "PIM250827KSA001");
        assert_eq!(resolve_document_number(Some("   "), default()), "PIM250827KSA001");
        assert_eq!(resolve_document_number(Some(" PI-7 "), default()), "PI-7");
    }
}
