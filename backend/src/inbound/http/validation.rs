//! Shared validation helpers for inbound HTTP adapters.

use chrono::NaiveDate;
use serde_json::json;

use crate::domain::Error;

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("missing required field: {field}")).with_details(json!({
        "field": field,
        "code": "missing_field",
    }))
}

pub(crate) fn invalid_date_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("{field} must be a YYYY-MM-DD date")).with_details(json!({
        "field": field,
        "value": value,
        "code": "invalid_date",
    }))
}

/// Parse a calendar date from its ISO `YYYY-MM-DD` form.
pub(crate) fn parse_date(value: &str, field: FieldName) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| invalid_date_error(field, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::Value;

    #[rstest]
    fn parses_iso_date() {
        let date = parse_date("2026-08-26", FieldName::new("start_date")).expect("parses");
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 8, 26).expect("valid"));
    }

    #[rstest]
    #[case("26/08/2026")]
    #[case("2026-13-01")]
    #[case("tomorrow")]
    fn rejects_malformed_dates(#[case] raw: &str) {
        let error = parse_date(raw, FieldName::new("end_date")).expect_err("rejected");
        let details = serde_json::to_value(&error).expect("serialises");
        assert_eq!(
            details["details"]["code"],
            Value::String("invalid_date".into())
        );
        assert_eq!(details["details"]["field"], Value::String("end_date".into()));
    }
}
