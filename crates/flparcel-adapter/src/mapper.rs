//! Maps county attributes onto the canonical parcel record.
//!
//! Missing, null, and blank attributes become [`flparcel_core::Field::Unknown`].
//! A present value that cannot be coerced to the field's kind is a
//! [`LookupError::MappingError`]: it means the county's schema drifted.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate};
use flparcel_core::{CanonicalField, Field, FieldValue, ParcelRecord, ParcelRecordBuilder};
use rust_decimal::Decimal;
use serde_json::Value;

use crate::error::LookupError;
use crate::identifier::ParcelIdentifier;
use crate::registry::{AttributeOrigin, Coercion, CountyProfile};
use crate::types::RawParcel;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y%m%d"];

/// Builds the canonical record for one matched parcel.
///
/// Rules are applied in field-map order. For a field named by several rules,
/// the first rule whose attribute holds a value decides it.
///
/// # Errors
///
/// Returns [`LookupError::MappingError`] naming the first field whose source
/// value cannot be coerced.
pub(crate) fn map_record(
    profile: &CountyProfile,
    id: &ParcelIdentifier,
    raw: &RawParcel,
) -> Result<ParcelRecord, LookupError> {
    let mapping_error = |field: CanonicalField, cause: String| LookupError::MappingError {
        county: profile.key,
        field,
        cause,
    };

    let mut builder =
        ParcelRecordBuilder::new(profile.key, id.normalized(), id.display(), raw.fetched_at);
    let mut decided: Vec<CanonicalField> = Vec::with_capacity(profile.field_map.len());

    for rule in profile.field_map {
        if decided.contains(&rule.field) {
            continue;
        }
        let source = match rule.origin {
            AttributeOrigin::Layer => Some(&raw.layer),
            AttributeOrigin::Related => raw.related.as_ref(),
        };
        let Some(value) = source.and_then(|attrs| attrs.get(rule.attribute)) else {
            continue;
        };

        let coerced = coerce(rule.coercion, value)
            .map_err(|cause| mapping_error(rule.field, format!("{}: {cause}", rule.attribute)))?;
        let Some(coerced) = coerced else {
            continue;
        };

        builder
            .set(rule.field, coerced)
            .map_err(|e| mapping_error(rule.field, e.to_string()))?;
        decided.push(rule.field);
    }

    let mut record = builder.build();
    if record.property_card_url.is_unknown() {
        if let Some(template) = profile.property_card_template {
            record.property_card_url =
                Field::Known(template.replace("{parcel_id}", id.display()));
        }
    }
    Ok(record)
}

/// Applies one coercion to a source value.
///
/// `Ok(None)` means the value is null or blank and the field stays unknown.
///
/// # Errors
///
/// Returns a description of the value if it is present but unusable.
pub(crate) fn coerce(coercion: Coercion, value: &Value) -> Result<Option<FieldValue>, String> {
    if is_blank(value) {
        return Ok(None);
    }
    match coercion {
        Coercion::Trim => text(value).map(|s| Some(FieldValue::Text(s))),
        Coercion::Integer => integer(value).map(|n| Some(FieldValue::Integer(n))),
        Coercion::Decimal => {
            decimal(value, |s| s.replace(',', "")).map(|d| Some(FieldValue::Decimal(d)))
        }
        Coercion::Currency => decimal(value, |s| {
            s.chars()
                .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
                .collect()
        })
        .map(|d| Some(FieldValue::Decimal(d))),
        Coercion::Measure => decimal(value, |s| {
            s.split_whitespace()
                .next()
                .unwrap_or_default()
                .replace(',', "")
        })
        .map(|d| Some(FieldValue::Decimal(d))),
        Coercion::Date => date(value).map(|d| Some(FieldValue::Date(d))),
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn text(value: &Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s.trim().to_owned()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(format!("expected text, got {other}")),
    }
}

fn integer(value: &Value) -> Result<i64, String> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            n.as_f64()
                .and_then(whole_f64_to_i64)
                .ok_or_else(|| format!("expected a whole number, got {n}"))
        }
        Value::String(s) => {
            let cleaned = s.trim().replace(',', "");
            cleaned
                .parse::<i64>()
                .ok()
                .or_else(|| cleaned.parse::<f64>().ok().and_then(whole_f64_to_i64))
                .ok_or_else(|| format!("expected a whole number, got '{s}'"))
        }
        other => Err(format!("expected a whole number, got {other}")),
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::float_cmp
)]
fn whole_f64_to_i64(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(s)
        .ok()
        .or_else(|| Decimal::from_scientific(s).ok())
}

fn decimal(value: &Value, clean: impl Fn(&str) -> String) -> Result<Decimal, String> {
    match value {
        Value::Number(n) => {
            parse_decimal(&n.to_string()).ok_or_else(|| format!("expected a number, got {n}"))
        }
        Value::String(s) => {
            parse_decimal(&clean(s.trim())).ok_or_else(|| format!("expected a number, got '{s}'"))
        }
        other => Err(format!("expected a number, got {other}")),
    }
}

fn date(value: &Value) -> Result<NaiveDate, String> {
    match value {
        Value::Number(n) => {
            let millis = n
                .as_i64()
                .or_else(|| n.as_f64().and_then(|f| whole_f64_to_i64(f.trunc())))
                .ok_or_else(|| format!("expected epoch milliseconds, got {n}"))?;
            epoch_millis_to_date(millis)
                .ok_or_else(|| format!("epoch milliseconds out of range: {millis}"))
        }
        Value::String(s) => parse_date_str(s.trim()).ok_or_else(|| format!("unrecognized date '{s}'")),
        other => Err(format!("expected a date, got {other}")),
    }
}

fn epoch_millis_to_date(millis: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(millis).map(|dt| dt.date_naive())
}

fn parse_date_str(s: &str) -> Option<NaiveDate> {
    let parse = |candidate: &str| {
        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(candidate, fmt).ok())
    };

    if let Some(d) = parse(s) {
        return Some(d);
    }
    // Date-time strings: "2021-03-04T00:00:00", "03/04/2021 12:00:00 AM".
    let head = s.split(['T', ' ']).next().unwrap_or_default();
    if head != s {
        if let Some(d) = parse(head) {
            return Some(d);
        }
    }
    // Epoch milliseconds sent as text.
    if s.len() > 8 && s.chars().all(|c| c.is_ascii_digit() || c == '-') {
        return s.parse::<i64>().ok().and_then(epoch_millis_to_date);
    }
    None
}
