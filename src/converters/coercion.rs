//! Scalar coercion
//!
//! Converts XML text and attribute strings to typed data values and back.
//! The typed direction recognises null, booleans, integers and floats and
//! otherwise keeps the original string, so it never fails.

use serde_json::{Number, Value as JsonValue};

use crate::error::{Error, Result};

/// How XML strings become data scalars
#[derive(Debug, Clone, Copy, Default)]
pub enum FromString {
    /// Recognise null, booleans and numbers (see [`from_string`])
    #[default]
    Typed,
    /// Keep every string as a string
    Raw,
    /// Apply a caller supplied function
    Custom(fn(&str) -> JsonValue),
}

impl FromString {
    /// Coerce an optional XML string. Absent values are always `null`.
    pub fn apply(&self, value: Option<&str>) -> JsonValue {
        match (self, value) {
            (_, None) => JsonValue::Null,
            (Self::Typed, Some(s)) => from_string(s),
            (Self::Raw, Some(s)) => JsonValue::String(s.to_string()),
            (Self::Custom(f), Some(s)) => f(s),
        }
    }
}

/// How data scalars become XML strings
#[derive(Debug, Clone, Copy, Default)]
pub enum ToXmlString {
    /// Canonical rendering (see [`to_string`])
    #[default]
    Canonical,
    /// Apply a caller supplied function
    Custom(fn(&JsonValue) -> String),
}

impl ToXmlString {
    /// Render a scalar as an XML string.
    ///
    /// Lists and mappings are not scalars and are rejected.
    pub fn apply(&self, value: &JsonValue) -> Result<String> {
        if !is_scalar(value) {
            return Err(Error::MalformedInput(format!(
                "expected a scalar value, found {}",
                kind_of(value)
            )));
        }
        Ok(match self {
            Self::Canonical => to_string(value).unwrap_or_default(),
            Self::Custom(f) => f(value),
        })
    }
}

/// Convert an XML string value to null, boolean, integer, float or string.
///
/// Rules, in order:
/// 1. empty → `null`
/// 2. `true` / `false` in any case, ignoring surrounding whitespace → boolean
/// 3. anything starting with `0` after trimming and dropping a sign → the
///    original string, so codes such as `007` keep their zeros (`"0"` and
///    `"-0"` stay strings too)
/// 4. base-10 integer → integer; digits beyond 64 bits keep the original
///    string rather than losing precision as a float
/// 5. float → float
/// 6. otherwise the original string
pub fn from_string(value: &str) -> JsonValue {
    if value.is_empty() {
        return JsonValue::Null;
    }

    let std_value = value.trim().to_lowercase();
    match std_value.as_str() {
        "true" => return JsonValue::Bool(true),
        "false" => return JsonValue::Bool(false),
        _ => {}
    }

    let unsigned = std_value
        .strip_prefix(|c: char| c == '+' || c == '-')
        .unwrap_or(std_value.as_str());
    if unsigned.starts_with('0') {
        return JsonValue::String(value.to_string());
    }
    if let Ok(int) = std_value.parse::<i64>() {
        return JsonValue::from(int);
    }
    if let Ok(int) = std_value.parse::<u64>() {
        return JsonValue::from(int);
    }
    if !unsigned.is_empty() && unsigned.bytes().all(|b| b.is_ascii_digit()) {
        return JsonValue::String(value.to_string());
    }
    if let Some(float) = std_value
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
    {
        return JsonValue::Number(float);
    }

    JsonValue::String(value.to_string())
}

/// Convert a scalar to its XML string form.
///
/// Booleans become `true`/`false`, null becomes the empty string and
/// numbers keep their JSON rendering (`1.0` stays `1.0`). Returns `None`
/// for lists and mappings.
pub fn to_string(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => Some(String::new()),
        JsonValue::Bool(true) => Some("true".to_string()),
        JsonValue::Bool(false) => Some("false".to_string()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Array(_) | JsonValue::Object(_) => None,
    }
}

/// Whether a data node is a bare scalar
pub fn is_scalar(value: &JsonValue) -> bool {
    !matches!(value, JsonValue::Array(_) | JsonValue::Object(_))
}

pub(crate) fn kind_of(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "a list",
        JsonValue::Object(_) => "a mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_string_basic_types() {
        assert_eq!(from_string(""), JsonValue::Null);
        assert_eq!(from_string("true"), json!(true));
        assert_eq!(from_string("FALSE"), json!(false));
        assert_eq!(from_string(" True "), json!(true));
        assert_eq!(from_string("42"), json!(42));
        assert_eq!(from_string("-7"), json!(-7));
        assert_eq!(from_string("3.14"), json!(3.14));
        assert_eq!(from_string("1.0"), json!(1.0));
        assert_eq!(from_string("Deka"), json!("Deka"));
    }

    #[test]
    fn test_from_string_keeps_leading_zeros() {
        assert_eq!(from_string("007"), json!("007"));
        assert_eq!(from_string("0123"), json!("0123"));
        assert_eq!(from_string("0.5"), json!("0.5"));
    }

    #[test]
    fn test_from_string_zero_stays_a_string() {
        // literal leading-zero rule: "0" is protected like "007"
        assert_eq!(from_string("0"), json!("0"));
        // a signed zero would come back as "0", so it is protected as well
        assert_eq!(from_string("-0"), json!("-0"));
        assert_eq!(from_string("+0"), json!("+0"));
        assert_eq!(from_string("-007"), json!("-007"));
        assert_eq!(from_string("-0.5"), json!("-0.5"));
    }

    #[test]
    fn test_from_string_keeps_original_on_fallthrough() {
        assert_eq!(from_string(" hello "), json!(" hello "));
        assert_eq!(from_string("   "), json!("   "));
        assert_eq!(from_string("nan"), json!("nan"));
        assert_eq!(from_string("inf"), json!("inf"));
        assert_eq!(from_string("12abc"), json!("12abc"));
    }

    #[test]
    fn test_from_string_trims_numbers() {
        assert_eq!(from_string(" 12 "), json!(12));
        assert_eq!(from_string("1.73\n"), json!(1.73));
    }

    #[test]
    fn test_from_string_large_integers() {
        assert_eq!(from_string("18446744073709551615"), json!(u64::MAX));
        assert_eq!(from_string("-9223372036854775808"), json!(i64::MIN));
        assert_eq!(from_string("1e3"), json!(1000.0));
    }

    #[test]
    fn test_from_string_keeps_oversized_integers() {
        assert_eq!(
            from_string("12345678901234567890123"),
            json!("12345678901234567890123")
        );
        assert_eq!(
            from_string(" -98765432109876543210 "),
            json!(" -98765432109876543210 ")
        );
        // A written-out float is still a float
        assert_eq!(from_string("12345678901234567890123.0"), json!(1.2345678901234568e22));
    }

    #[test]
    fn test_from_string_modes() {
        assert_eq!(FromString::Typed.apply(Some("1")), json!(1));
        assert_eq!(FromString::Raw.apply(Some("1")), json!("1"));
        assert_eq!(FromString::Raw.apply(Some("")), json!(""));
        assert_eq!(FromString::Raw.apply(None), JsonValue::Null);

        fn shout(s: &str) -> JsonValue {
            JsonValue::String(s.to_uppercase())
        }
        assert_eq!(FromString::Custom(shout).apply(Some("abc")), json!("ABC"));
    }

    #[test]
    fn test_to_string() {
        assert_eq!(to_string(&json!(true)).unwrap(), "true");
        assert_eq!(to_string(&json!(false)).unwrap(), "false");
        assert_eq!(to_string(&json!(1)).unwrap(), "1");
        assert_eq!(to_string(&json!(1.0)).unwrap(), "1.0");
        assert_eq!(to_string(&json!(1.73)).unwrap(), "1.73");
        assert_eq!(to_string(&json!("x")).unwrap(), "x");
        assert_eq!(to_string(&JsonValue::Null).unwrap(), "");
        assert!(to_string(&json!([1])).is_none());
    }

    #[test]
    fn test_to_xml_string_modes() {
        fn capitalized_bools(value: &JsonValue) -> String {
            match value {
                JsonValue::Bool(true) => "True".to_string(),
                JsonValue::Bool(false) => "False".to_string(),
                other => other.to_string(),
            }
        }
        assert_eq!(ToXmlString::Canonical.apply(&json!(true)).unwrap(), "true");
        assert_eq!(ToXmlString::Custom(capitalized_bools).apply(&json!(true)).unwrap(), "True");
        assert!(matches!(
            ToXmlString::Canonical.apply(&json!({"a": 1})),
            Err(Error::MalformedInput(_))
        ));
    }
}
