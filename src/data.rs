use std::fmt;

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::schema::ColumnType;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Text(String),
    Timestamp(NaiveDateTime),
}

impl Value {
    pub fn as_display(&self) -> String {
        match self {
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Text(s) => s.clone(),
            Value::Timestamp(ts) => ts.format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    /// Numeric view of the value; text and timestamps have none.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

pub fn parse_naive_datetime(value: &str) -> Result<NaiveDateTime> {
    const DATETIME_FORMATS: &[&str] = &[
        TIMESTAMP_FORMAT,
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%SZ",
        "%Y-%m-%d %H:%M",
    ];
    for fmt in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, fmt) {
            return Ok(parsed);
        }
    }
    Err(anyhow!("Failed to parse '{value}' as timestamp"))
}

/// Parses a raw cell against its declared type. Empty input is a missing value.
pub fn parse_typed_value(value: &str, ty: &ColumnType) -> Result<Option<Value>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let parsed = match ty {
        ColumnType::Text => Value::Text(value.to_string()),
        ColumnType::Integer => {
            let parsed: i64 = trimmed
                .parse()
                .with_context(|| format!("Failed to parse '{value}' as integer"))?;
            Value::Integer(parsed)
        }
        ColumnType::Float => {
            let parsed: f64 = trimmed
                .parse()
                .with_context(|| format!("Failed to parse '{value}' as float"))?;
            Value::Float(parsed)
        }
        ColumnType::Timestamp => Value::Timestamp(parse_naive_datetime(trimmed)?),
    };
    Ok(Some(parsed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn parse_typed_value_treats_blank_as_missing() {
        assert_eq!(parse_typed_value("", &ColumnType::Integer).unwrap(), None);
        assert_eq!(parse_typed_value("   ", &ColumnType::Text).unwrap(), None);
    }

    #[test]
    fn parse_typed_value_reads_api_strings() {
        assert_eq!(
            parse_typed_value("1337", &ColumnType::Integer).unwrap(),
            Some(Value::Integer(1337))
        );
        assert_eq!(
            parse_typed_value("5.25", &ColumnType::Float).unwrap(),
            Some(Value::Float(5.25))
        );
        assert!(parse_typed_value("fast", &ColumnType::Float).is_err());
        assert!(parse_typed_value("1.5", &ColumnType::Integer).is_err());
    }

    #[test]
    fn parse_naive_datetime_accepts_mysql_and_iso() {
        let expected = NaiveDate::from_ymd_opt(2014, 3, 9)
            .unwrap()
            .and_hms_opt(21, 4, 5)
            .unwrap();
        assert_eq!(parse_naive_datetime("2014-03-09 21:04:05").unwrap(), expected);
        assert_eq!(parse_naive_datetime("2014-03-09T21:04:05Z").unwrap(), expected);
        assert!(parse_naive_datetime("yesterday").is_err());
    }

    #[test]
    fn integer_view_accepts_whole_floats_only() {
        assert_eq!(Value::Float(3.0).as_i64(), Some(3));
        assert_eq!(Value::Float(3.5).as_i64(), None);
        assert_eq!(Value::Text("3".into()).as_f64(), None);
    }
}
