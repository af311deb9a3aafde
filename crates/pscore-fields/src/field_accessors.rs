use crate::field_value::{FieldSet, FieldValue};

pub const ASSIGNEE_FIELD_ID: &str = "assignee";

/// Assignee details used to personalize score comments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignee {
    pub account_id: Option<String>,
    pub display_name: Option<String>,
}

/// Reads a field as text.
///
/// Strings are returned verbatim, objects yield their `name` then `value` property,
/// and any other shape falls back to its rendered form. Blank ids, absent fields and
/// JSON `null` yield `None`.
pub fn get_string(fields: &FieldSet, field_id: &str) -> Option<String> {
    if field_id.trim().is_empty() {
        return None;
    }
    let value = fields.get(field_id)?;
    match value {
        FieldValue::Null => None,
        FieldValue::String(text) => Some(text.clone()),
        FieldValue::Object(properties) => Some(
            properties
                .get("name")
                .and_then(scalar_text)
                .or_else(|| properties.get("value").and_then(scalar_text))
                .unwrap_or_else(|| value.to_string()),
        ),
        other => Some(other.to_string()),
    }
}

/// Reads a field as a number.
///
/// Accepts numbers, numeric strings, objects whose `value` or `name` holds a number,
/// and arrays whose first element is numeric. Everything else yields `None`.
pub fn get_number(fields: &FieldSet, field_id: &str) -> Option<f64> {
    if field_id.trim().is_empty() {
        return None;
    }
    match fields.get(field_id)? {
        FieldValue::Object(properties) => properties
            .get("value")
            .and_then(scalar_number)
            .or_else(|| properties.get("name").and_then(scalar_number)),
        FieldValue::Array(items) => items.first().and_then(scalar_number),
        other => scalar_number(other),
    }
}

/// Trimmed, case-insensitive equality; blank values never match.
pub fn is_match(actual: Option<&str>, expected: Option<&str>) -> bool {
    let (Some(actual), Some(expected)) = (actual, expected) else {
        return false;
    };
    let actual = actual.trim();
    let expected = expected.trim();
    if actual.is_empty() || expected.is_empty() {
        return false;
    }
    actual == expected || actual.to_lowercase() == expected.to_lowercase()
}

/// Formats with at most four decimals and no trailing zeros; `None` renders as `null`.
pub fn format_number(value: Option<f64>) -> String {
    let Some(value) = value else {
        return "null".to_string();
    };
    if !value.is_finite() {
        return value.to_string();
    }
    let scaled = value * 10_000.0;
    let rounded = if scaled.is_finite() {
        scaled.round() / 10_000.0
    } else {
        value
    };
    let mut rendered = format!("{rounded:.4}");
    if rendered.contains('.') {
        rendered = rendered
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string();
    }
    if rendered == "-0" {
        rendered = "0".to_string();
    }
    rendered
}

/// Extracts `assignee.accountId` and `assignee.displayName` when they are strings.
pub fn get_assignee(fields: &FieldSet) -> Assignee {
    let Some(assignee) = fields.get(ASSIGNEE_FIELD_ID) else {
        return Assignee::default();
    };
    let text = |key: &str| {
        assignee
            .property(key)
            .and_then(FieldValue::as_str)
            .map(str::to_string)
    };
    Assignee {
        account_id: text("accountId"),
        display_name: text("displayName"),
    }
}

fn scalar_text(value: &FieldValue) -> Option<String> {
    match value {
        FieldValue::String(text) => Some(text.clone()),
        FieldValue::Number(number) => Some(number.to_string()),
        FieldValue::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn scalar_number(value: &FieldValue) -> Option<f64> {
    match value {
        FieldValue::Number(number) => number.as_f64().filter(|number| number.is_finite()),
        FieldValue::String(text) => parse_number(text),
        _ => None,
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}
